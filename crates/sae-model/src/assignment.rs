//! Numbering output: write instructions and rejected records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::number::SaeNumber;

/// Event holding the repeating SAE form.
pub const DEFAULT_EVENT_NAME: &str = "adverse_events_arm_1";
/// Repeating instrument name of the SAE form.
pub const DEFAULT_REPEAT_INSTRUMENT: &str = "sae";

/// Fixed labels every write-back row carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormTarget {
    pub event_name: String,
    pub repeat_instrument: String,
}

impl Default for FormTarget {
    fn default() -> Self {
        Self {
            event_name: DEFAULT_EVENT_NAME.to_string(),
            repeat_instrument: DEFAULT_REPEAT_INSTRUMENT.to_string(),
        }
    }
}

/// A newly computed SAE number for one report instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub record_id: String,
    pub event_name: String,
    pub repeat_instrument: String,
    pub repeat_instance: u32,
    pub sae_number: SaeNumber,
    /// Malformed value this assignment overwrites.
    #[serde(skip)]
    pub replaces: Option<String>,
}

/// A report that needed a number but could not be numbered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub record_id: String,
    pub repeat_instance: u32,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("participant has no study number")]
    MissingStudyNumber,
    #[error("report type is missing")]
    MissingReportType,
    #[error("unknown report type code {0:?}")]
    UnknownReportType(String),
    #[error("no SAE sequence left after {0:02}")]
    SequenceExhausted(u32),
}
