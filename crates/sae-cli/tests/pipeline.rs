//! Integration tests for the per-project pipeline.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use anyhow::anyhow;
use sae_cli::pipeline::{ProjectOptions, process_project, run_projects};
use sae_cli::plan::write_plan_csv;
use sae_cli::types::ProjectStatus;
use sae_model::{Assignment, RejectionReason, SaeRecord};
use sae_numbering::NumberingEngine;
use sae_redcap::{GatewayError, ImportOutcome, SaeGateway};

/// In-memory project standing in for a REDCap API.
#[derive(Default)]
struct FakeGateway {
    records: Vec<SaeRecord>,
    study_numbers: BTreeMap<String, String>,
    /// Records the fake pretends to reject on import.
    reject_on_import: usize,
    fail_export: bool,
    study_number_calls: Cell<usize>,
    imported: RefCell<Vec<Assignment>>,
}

impl FakeGateway {
    fn new(records: Vec<SaeRecord>, study_numbers: &[(&str, &str)]) -> Self {
        Self {
            records,
            study_numbers: study_numbers
                .iter()
                .map(|(id, sn)| ((*id).to_string(), (*sn).to_string()))
                .collect(),
            ..Self::default()
        }
    }
}

impl SaeGateway for FakeGateway {
    fn fetch_completed_sae_reports(&self) -> sae_redcap::Result<Vec<SaeRecord>> {
        if self.fail_export {
            return Err(GatewayError::Unauthorized(
                "You do not have permissions to use the API".to_string(),
            ));
        }
        Ok(self.records.clone())
    }

    fn fetch_study_numbers(
        &self,
        record_ids: &[String],
    ) -> sae_redcap::Result<BTreeMap<String, String>> {
        self.study_number_calls.set(self.study_number_calls.get() + 1);
        Ok(self
            .study_numbers
            .iter()
            .filter(|(id, _)| record_ids.contains(id))
            .map(|(id, sn)| (id.clone(), sn.clone()))
            .collect())
    }

    fn persist_sae_numbers(&self, assignments: &[Assignment]) -> sae_redcap::Result<ImportOutcome> {
        self.imported.borrow_mut().extend_from_slice(assignments);
        let saved = ImportOutcome::new(assignments, 0).requested;
        Ok(ImportOutcome::new(
            assignments,
            saved - self.reject_on_import.min(saved),
        ))
    }
}

fn imported_numbers(gateway: &FakeGateway) -> Vec<String> {
    gateway
        .imported
        .borrow()
        .iter()
        .map(|a| a.sae_number.to_string())
        .collect()
}

fn sample_gateway() -> FakeGateway {
    FakeGateway::new(
        vec![
            SaeRecord::new("1", 1)
                .with_report_type("1")
                .with_sae_number("ICA-0001-01"),
            SaeRecord::new("1", 2).with_report_type("2"),
            SaeRecord::new("1", 3).with_report_type("1"),
            SaeRecord::new("2", 1).with_report_type("1"),
        ],
        &[("1", "ICA-0001"), ("2", "ICA-0002")],
    )
}

#[test]
fn numbers_and_imports_project() {
    let gateway = sample_gateway();

    let result = process_project(
        "HF01",
        &gateway,
        &NumberingEngine::default(),
        &ProjectOptions::default(),
    )
    .expect("process project");

    assert_eq!(result.status, ProjectStatus::Imported);
    assert_eq!(result.fetched, 4);
    assert_eq!(result.participants, 2);
    assert_eq!(result.already_numbered, 1);
    assert_eq!(
        imported_numbers(&gateway),
        ["ICA-0001-01", "ICA-0001-02", "ICA-0002-01"]
    );
    assert_eq!(
        result.import,
        Some(ImportOutcome {
            rows: 3,
            requested: 2,
            imported: 2
        })
    );
    assert!(!result.has_errors());
}

#[test]
fn empty_project_skips_study_number_fetch() {
    let gateway = FakeGateway::default();

    let result = process_project(
        "HF02",
        &gateway,
        &NumberingEngine::default(),
        &ProjectOptions::default(),
    )
    .expect("process project");

    assert_eq!(result.status, ProjectStatus::NoReports);
    assert!(result.assignments.is_empty());
    assert_eq!(gateway.study_number_calls.get(), 0);
    assert!(gateway.imported.borrow().is_empty());
}

#[test]
fn dry_run_never_imports() {
    let gateway = sample_gateway();
    let options = ProjectOptions {
        dry_run: true,
        strict: false,
    };

    let result = process_project("HF01", &gateway, &NumberingEngine::default(), &options)
        .expect("process project");

    assert_eq!(result.status, ProjectStatus::Planned);
    assert_eq!(result.assignments.len(), 3);
    assert!(gateway.imported.borrow().is_empty());
}

#[test]
fn fully_numbered_project_is_up_to_date() {
    let gateway = FakeGateway::new(
        vec![SaeRecord::new("1", 1).with_sae_number("ICA-0001-01")],
        &[("1", "ICA-0001")],
    );

    let result = process_project(
        "HF01",
        &gateway,
        &NumberingEngine::default(),
        &ProjectOptions::default(),
    )
    .expect("process project");

    assert_eq!(result.status, ProjectStatus::UpToDate);
    assert!(gateway.imported.borrow().is_empty());
}

#[test]
fn rejected_reports_are_reported_and_rest_imported() {
    let mut gateway = sample_gateway();
    gateway.records.push(SaeRecord::new("3", 1).with_report_type("1"));

    let result = process_project(
        "HF01",
        &gateway,
        &NumberingEngine::default(),
        &ProjectOptions::default(),
    )
    .expect("process project");

    assert_eq!(result.status, ProjectStatus::Imported);
    assert_eq!(imported_numbers(&gateway).len(), 3);
    assert_eq!(result.rejections.len(), 1);
    assert_eq!(result.rejections[0].record_id, "3");
    assert_eq!(result.rejections[0].reason, RejectionReason::MissingStudyNumber);
    assert!(result.has_errors());
}

#[test]
fn strict_mode_aborts_on_rejections() {
    let mut gateway = sample_gateway();
    gateway.records.push(SaeRecord::new("3", 1).with_report_type("1"));
    let options = ProjectOptions {
        dry_run: false,
        strict: true,
    };

    let result = process_project("HF01", &gateway, &NumberingEngine::default(), &options)
        .expect("process project");

    assert!(matches!(result.status, ProjectStatus::Failed(_)));
    assert!(gateway.imported.borrow().is_empty());
}

#[test]
fn partial_import_is_an_error() {
    let mut gateway = sample_gateway();
    gateway.reject_on_import = 1;

    let result = process_project(
        "HF01",
        &gateway,
        &NumberingEngine::default(),
        &ProjectOptions::default(),
    )
    .expect("process project");

    let import = result.import.expect("import outcome");
    assert_eq!(import.failed(), 1);
    assert!(result.has_errors());
}

#[test]
fn instances_of_one_participant_are_a_complete_import() {
    let gateway = FakeGateway::new(
        vec![
            SaeRecord::new("10", 1).with_report_type("1"),
            SaeRecord::new("10", 2).with_report_type("2"),
        ],
        &[("10", "ICA-0010")],
    );

    let result = process_project(
        "HF01",
        &gateway,
        &NumberingEngine::default(),
        &ProjectOptions::default(),
    )
    .expect("process project");

    assert_eq!(imported_numbers(&gateway), ["ICA-0010-01", "ICA-0010-01"]);
    let import = result.import.expect("import outcome");
    assert_eq!((import.rows, import.requested, import.imported), (2, 1, 1));
    assert!(!import.is_partial());
    assert!(!result.has_errors());
}

#[test]
fn failing_project_does_not_stop_others() {
    let keys = vec!["A".to_string(), "B".to_string(), "C".to_string()];
    let engine = NumberingEngine::default();

    let results = run_projects(&keys, &engine, &ProjectOptions::default(), |key| match key {
        "A" => Ok(FakeGateway {
            fail_export: true,
            ..FakeGateway::default()
        }),
        "B" => Err(anyhow!("project B: read token from $REDCAP_TOKEN_B")),
        _ => Ok(sample_gateway()),
    });

    let statuses: Vec<(&str, &ProjectStatus)> = results
        .iter()
        .map(|r| (r.key.as_str(), &r.status))
        .collect();
    assert_eq!(statuses.len(), 3);
    assert!(matches!(
        statuses[0],
        ("A", ProjectStatus::Failed(message)) if message.contains("permissions")
    ));
    assert!(matches!(statuses[1], ("B", ProjectStatus::Failed(_))));
    assert_eq!(statuses[2], ("C", &ProjectStatus::Imported));
    assert_eq!(results[2].assignments.len(), 3);
}

#[test]
fn plan_csv_lists_assignments() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plan.csv");
    let gateway = FakeGateway::new(
        vec![
            SaeRecord::new("7", 1).with_report_type("1"),
            SaeRecord::new("7", 2)
                .with_report_type("2")
                .with_sae_number("ICA-0007"),
        ],
        &[("7", "ICA-0007")],
    );
    let options = ProjectOptions {
        dry_run: true,
        strict: false,
    };
    let result = process_project("HF01", &gateway, &NumberingEngine::default(), &options)
        .expect("process project");

    let rows = write_plan_csv(&path, &[result]).expect("write plan");

    assert_eq!(rows, 2);
    let content = std::fs::read_to_string(&path).expect("read plan");
    assert_eq!(
        content,
        "project,record_id,redcap_event_name,redcap_repeat_instance,sae_number,replaces\n\
         HF01,7,adverse_events_arm_1,1,ICA-0007-01,\n\
         HF01,7,adverse_events_arm_1,2,ICA-0007-01,ICA-0007\n"
    );
}
