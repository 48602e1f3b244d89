//! The data access seam between the numbering pipeline and a project.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use sae_model::{Assignment, SaeRecord};

use crate::error::Result;

/// Outcome of writing SAE numbers back to a project.
///
/// REDCap counts saved records, not rows: several repeat instances of one
/// participant count once. Completeness is therefore judged per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportOutcome {
    /// Rows sent.
    pub rows: usize,
    /// Distinct records among the rows sent.
    pub requested: usize,
    /// Records the project reports as saved.
    pub imported: usize,
}

impl ImportOutcome {
    /// Outcome for `assignments` when the project reports `imported` saved records.
    pub fn new(assignments: &[Assignment], imported: usize) -> Self {
        let records: BTreeSet<&str> = assignments.iter().map(|a| a.record_id.as_str()).collect();
        Self {
            rows: assignments.len(),
            requested: records.len(),
            imported,
        }
    }

    pub fn failed(&self) -> usize {
        self.requested.saturating_sub(self.imported)
    }

    pub fn is_partial(&self) -> bool {
        self.imported < self.requested
    }
}

impl fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} records imported ({} rows)",
            self.imported, self.requested, self.rows
        )
    }
}

/// Reads SAE reports from a project and writes SAE numbers back.
///
/// One gateway value is bound to one project.
pub trait SaeGateway {
    /// Completed SAE reports, in export order.
    fn fetch_completed_sae_reports(&self) -> Result<Vec<SaeRecord>>;

    /// Study numbers of the given participants. Participants without one are absent.
    fn fetch_study_numbers(&self, record_ids: &[String]) -> Result<BTreeMap<String, String>>;

    /// Write the assignments. Not retried on failure.
    fn persist_sae_numbers(&self, assignments: &[Assignment]) -> Result<ImportOutcome>;
}

#[cfg(test)]
mod tests {
    use sae_model::SaeNumber;

    use super::*;

    fn assignment(record_id: &str, instance: u32) -> Assignment {
        Assignment {
            record_id: record_id.to_string(),
            event_name: "adverse_events_arm_1".to_string(),
            repeat_instrument: "sae".to_string(),
            repeat_instance: instance,
            sae_number: SaeNumber::new("S1", instance).unwrap(),
            replaces: None,
        }
    }

    #[test]
    fn instances_of_one_record_count_once() {
        let assignments = [assignment("10", 1), assignment("10", 2)];

        let outcome = ImportOutcome::new(&assignments, 1);

        assert_eq!(outcome.rows, 2);
        assert_eq!(outcome.requested, 1);
        assert!(!outcome.is_partial());
        assert_eq!(outcome.failed(), 0);
    }

    #[test]
    fn missing_record_is_partial() {
        let assignments = [assignment("10", 1), assignment("10", 2), assignment("11", 1)];

        let outcome = ImportOutcome::new(&assignments, 1);

        assert!(outcome.is_partial());
        assert_eq!(outcome.failed(), 1);
        assert_eq!(outcome.to_string(), "1/2 records imported (3 rows)");
    }
}
