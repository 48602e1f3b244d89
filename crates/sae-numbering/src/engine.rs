//! The SAE numbering pass.
//!
//! Each participant group is walked in capture order while tracking the last
//! SAE number seen for that participant. Well-formed existing numbers that
//! belong to the participant's study number are taken as-is and only move
//! that state forward. Every other report gets a
//! new number derived from the state and its report type:
//!
//! - no number seen yet: `<study_number>-01`
//! - initial report: last sequence + 1
//! - follow-up report: last sequence

use sae_model::{
    Assignment, FormTarget, MAX_SEQUENCE, ModelError, RejectedRecord, RejectionReason,
    ReportType, SaeNumber,
};
use tracing::{debug, trace, warn};

use crate::group::partition_by_participant;
use crate::join::NumberedRecord;

/// Result of one numbering pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberingOutcome {
    /// New numbers to write back, grouped by participant in capture order.
    pub assignments: Vec<Assignment>,
    /// Reports that needed a number but could not get one.
    pub rejections: Vec<RejectedRecord>,
    /// Reports that already carried a well-formed number.
    pub already_numbered: usize,
    pub participants: usize,
}

impl NumberingOutcome {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Numbering state of one participant. Never shared between groups.
#[derive(Debug, Default)]
struct GroupState {
    last_assigned: Option<SaeNumber>,
}

enum Visit {
    AlreadyNumbered,
    Assigned(Assignment),
    Rejected(RejectedRecord),
}

#[derive(Debug, Clone, Default)]
pub struct NumberingEngine {
    target: FormTarget,
}

impl NumberingEngine {
    pub fn new(target: FormTarget) -> Self {
        Self { target }
    }

    /// Compute SAE numbers for every report that lacks a well-formed one.
    pub fn number(&self, records: &[NumberedRecord]) -> NumberingOutcome {
        let groups = partition_by_participant(records);
        let mut outcome = NumberingOutcome {
            participants: groups.len(),
            ..NumberingOutcome::default()
        };

        for (record_id, group) in groups {
            trace!(record_id, reports = group.len(), "numbering participant");
            group
                .into_iter()
                .fold(GroupState::default(), |mut state, record| {
                    match self.visit(&mut state, record) {
                        Visit::AlreadyNumbered => outcome.already_numbered += 1,
                        Visit::Assigned(assignment) => outcome.assignments.push(assignment),
                        Visit::Rejected(rejected) => outcome.rejections.push(rejected),
                    }
                    state
                });
        }

        debug!(
            participants = outcome.participants,
            assigned = outcome.assignments.len(),
            rejected = outcome.rejections.len(),
            already_numbered = outcome.already_numbered,
            "numbering pass finished"
        );
        outcome
    }

    fn visit(&self, state: &mut GroupState, numbered: &NumberedRecord) -> Visit {
        let record = &numbered.record;
        let mut replaces = None;
        if let Some(existing) = record.existing_number() {
            match existing_number(existing, numbered.study_number.as_deref()) {
                Some(number) => {
                    state.last_assigned = Some(number);
                    return Visit::AlreadyNumbered;
                }
                None => {
                    warn!(
                        record_id = %record.record_id,
                        repeat_instance = record.repeat_instance,
                        "replacing malformed SAE number"
                    );
                    replaces = Some(existing.to_string());
                }
            }
        }

        match next_number(state.last_assigned.as_ref(), numbered) {
            Ok(sae_number) => {
                debug!(
                    record_id = %record.record_id,
                    repeat_instance = record.repeat_instance,
                    sequence = sae_number.sequence(),
                    "assigned SAE number"
                );
                state.last_assigned = Some(sae_number.clone());
                Visit::Assigned(Assignment {
                    record_id: record.record_id.clone(),
                    event_name: self.target.event_name.clone(),
                    repeat_instrument: self.target.repeat_instrument.clone(),
                    repeat_instance: record.repeat_instance,
                    sae_number,
                    replaces,
                })
            }
            Err(reason) => {
                warn!(
                    record_id = %record.record_id,
                    repeat_instance = record.repeat_instance,
                    %reason,
                    "cannot number SAE report"
                );
                Visit::Rejected(RejectedRecord {
                    record_id: record.record_id.clone(),
                    repeat_instance: record.repeat_instance,
                    reason,
                })
            }
        }
    }
}

/// Parse an existing number and check it against the participant's study
/// number. A bare study number that happens to end in `-NN` fails the check.
fn existing_number(value: &str, study_number: Option<&str>) -> Option<SaeNumber> {
    let number = SaeNumber::parse(value).ok()?;
    match study_number {
        Some(study_number) if number.study_number() != study_number.trim() => None,
        _ => Some(number),
    }
}

fn next_number(
    last_assigned: Option<&SaeNumber>,
    numbered: &NumberedRecord,
) -> Result<SaeNumber, RejectionReason> {
    let study_number = numbered
        .study_number
        .as_deref()
        .ok_or(RejectionReason::MissingStudyNumber)?;
    let report_type = match numbered.record.report_type.as_deref() {
        Some(code) => Some(
            ReportType::from_code(code)
                .ok_or_else(|| RejectionReason::UnknownReportType(code.to_string()))?,
        ),
        None => None,
    };

    // No lookback beyond this run: a follow-up seen first still starts at 01.
    let sequence = match (last_assigned, report_type) {
        (None, _) => 1,
        (Some(_), None) => return Err(RejectionReason::MissingReportType),
        (Some(last), Some(ReportType::Initial)) => last.sequence() + 1,
        (Some(last), Some(ReportType::FollowUp)) => last.sequence(),
    };

    SaeNumber::new(study_number, sequence).map_err(|error| match error {
        ModelError::InvalidSequence(_) => RejectionReason::SequenceExhausted(MAX_SEQUENCE),
        ModelError::BlankStudyNumber | ModelError::MalformedSaeNumber { .. } => {
            RejectionReason::MissingStudyNumber
        }
    })
}
