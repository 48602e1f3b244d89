//! Joins SAE reports with participant study numbers.

use std::collections::{BTreeMap, BTreeSet};

use sae_model::SaeRecord;

/// Study number per participant (`record_id`).
pub type StudyNumbers = BTreeMap<String, String>;

/// An SAE report together with its participant's study number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedRecord {
    pub record: SaeRecord,
    pub study_number: Option<String>,
}

impl NumberedRecord {
    pub fn new(record: SaeRecord, study_number: Option<String>) -> Self {
        Self {
            record,
            study_number,
        }
    }

    pub fn record_id(&self) -> &str {
        &self.record.record_id
    }
}

/// Distinct participant ids of `records`, in ascending order.
pub fn participant_ids(records: &[SaeRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.record_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Attach study numbers to reports, keeping input order.
///
/// Unlike an inner join, reports of participants without a study number are
/// kept (with `None`) so the engine can flag them instead of dropping them.
pub fn join_study_numbers(
    records: Vec<SaeRecord>,
    study_numbers: &StudyNumbers,
) -> Vec<NumberedRecord> {
    records
        .into_iter()
        .map(|record| {
            let study_number = study_numbers
                .get(&record.record_id)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string);
            NumberedRecord::new(record, study_number)
        })
        .collect()
}
