//! Per-project numbering cycle with explicit stages.
//!
//! Each project goes through these stages in order:
//! 1. **Fetch reports**: export completed SAE reports
//! 2. **Fetch study numbers**: export study numbers of the involved participants
//! 3. **Number**: join both exports and run the numbering engine
//! 4. **Import**: write the new SAE numbers back
//!
//! Projects are independent. A failing project is recorded and the run moves
//! on to the next one.

use std::time::Instant;

use anyhow::{Context, Result};
use sae_numbering::{NumberingEngine, join_study_numbers, participant_ids};
use sae_redcap::SaeGateway;
use tracing::{error, info, info_span, trace, warn};

use crate::logging::redact_value;
use crate::types::{ProjectResult, ProjectStatus};

/// Switches that change what a project cycle is allowed to do.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectOptions {
    /// Compute numbers without writing them back.
    pub dry_run: bool,
    /// Abort the project before writing when any report is rejected.
    pub strict: bool,
}

/// Run the fetch, number and import cycle for one project.
///
/// # Errors
///
/// Returns an error when a gateway call fails. Nothing is written in that case
/// unless the failure happened during the import itself.
pub fn process_project<G>(
    key: &str,
    gateway: &G,
    engine: &NumberingEngine,
    options: &ProjectOptions,
) -> Result<ProjectResult>
where
    G: SaeGateway + ?Sized,
{
    let started = Instant::now();
    let mut result = ProjectResult::new(key, ProjectStatus::NoReports);

    info!("getting SAE records");
    let records = gateway
        .fetch_completed_sae_reports()
        .context("export completed SAE reports")?;
    result.fetched = records.len();
    if records.is_empty() {
        info!("no completed SAE reports, nothing to do");
        return Ok(result);
    }

    let record_ids = participant_ids(&records);
    info!(
        reports = records.len(),
        participants = record_ids.len(),
        "getting study numbers of SAEs"
    );
    let study_numbers = gateway
        .fetch_study_numbers(&record_ids)
        .context("export study numbers")?;
    let missing = record_ids
        .iter()
        .filter(|id| !study_numbers.contains_key(id.as_str()))
        .count();
    if missing > 0 {
        warn!(participants = missing, "participants with SAE reports have no study number");
    }

    let joined = join_study_numbers(records, &study_numbers);
    let outcome = engine.number(&joined);
    result.participants = outcome.participants;
    result.already_numbered = outcome.already_numbered;
    result.assignments = outcome.assignments;
    result.rejections = outcome.rejections;

    for assignment in &result.assignments {
        let sae_number = assignment.sae_number.to_string();
        trace!(
            record_id = %assignment.record_id,
            repeat_instance = assignment.repeat_instance,
            sae_number = redact_value(&sae_number),
            "planned SAE number"
        );
    }
    if !result.rejections.is_empty() {
        warn!(
            rejected = result.rejections.len(),
            "SAE reports could not be numbered"
        );
        if options.strict {
            result.status = ProjectStatus::Failed(format!(
                "{} SAE reports rejected in strict mode",
                result.rejections.len()
            ));
            error!("strict mode: no SAE numbers written");
            return Ok(result);
        }
    }

    if result.assignments.is_empty() {
        info!("all completed SAE reports are already numbered");
        result.status = ProjectStatus::UpToDate;
        return Ok(result);
    }

    if options.dry_run {
        info!(
            assignments = result.assignments.len(),
            "dry run: SAE numbers not imported"
        );
        result.status = ProjectStatus::Planned;
        return Ok(result);
    }

    info!(assignments = result.assignments.len(), "importing SAE numbers");
    let import = gateway
        .persist_sae_numbers(&result.assignments)
        .context("import SAE numbers")?;
    if import.is_partial() {
        warn!(
            records = import.requested,
            imported = import.imported,
            failed = import.failed(),
            "REDCap saved only part of the SAE numbers"
        );
    } else {
        info!(%import, elapsed = ?started.elapsed(), "SAE numbers imported");
    }
    result.import = Some(import);
    result.status = ProjectStatus::Imported;
    Ok(result)
}

/// Process every project in `keys`, connecting to each through `connect`.
///
/// A failure in one project (connecting, fetching or importing) is logged
/// with the project key and recorded as [`ProjectStatus::Failed`]; later
/// projects still run.
pub fn run_projects<G, F>(
    keys: &[String],
    engine: &NumberingEngine,
    options: &ProjectOptions,
    mut connect: F,
) -> Vec<ProjectResult>
where
    G: SaeGateway,
    F: FnMut(&str) -> Result<G>,
{
    let mut results = Vec::with_capacity(keys.len());
    for key in keys {
        let span = info_span!("project", project = %key);
        let _guard = span.enter();
        let outcome =
            connect(key).and_then(|gateway| process_project(key, &gateway, engine, options));
        match outcome {
            Ok(result) => results.push(result),
            Err(err) => {
                let message = format!("{err:#}");
                error!(project = %key, error = %message, "project processing failed");
                results.push(ProjectResult::failed(key.clone(), message));
            }
        }
    }
    results
}
