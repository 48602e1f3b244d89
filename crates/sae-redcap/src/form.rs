//! REDCap field names and the per-trial form layout.

use sae_model::{DEFAULT_EVENT_NAME, DEFAULT_REPEAT_INSTRUMENT, FormTarget};
use serde::{Deserialize, Serialize};

pub const RECORD_ID_FIELD: &str = "record_id";
pub const SAE_NUMBER_FIELD: &str = "sae_number";
pub const REPORT_TYPE_FIELD: &str = "sae_report_type";
pub const COMPLETE_FIELD: &str = "sae_complete";
pub const STUDY_NUMBER_FIELD: &str = "study_number";

/// REDCap value of `sae_complete` for a finalized report.
pub const DEFAULT_COMPLETED_VALUE: &str = "2";

/// Where the SAE form lives in a project and when a report counts as completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedcapForm {
    pub event_name: String,
    pub repeat_instrument: String,
    pub completed_value: String,
}

impl Default for RedcapForm {
    fn default() -> Self {
        Self {
            event_name: DEFAULT_EVENT_NAME.to_string(),
            repeat_instrument: DEFAULT_REPEAT_INSTRUMENT.to_string(),
            completed_value: DEFAULT_COMPLETED_VALUE.to_string(),
        }
    }
}

impl RedcapForm {
    /// Labels the numbering engine stamps on every assignment.
    pub fn target(&self) -> FormTarget {
        FormTarget {
            event_name: self.event_name.clone(),
            repeat_instrument: self.repeat_instrument.clone(),
        }
    }

    /// `filterLogic` selecting completed SAE reports.
    pub fn completed_filter(&self) -> String {
        format!("[{COMPLETE_FIELD}] = '{}'", self.completed_value)
    }

    /// `filterLogic` selecting records with a study number.
    pub fn study_number_filter(&self) -> String {
        format!("[{STUDY_NUMBER_FIELD}] != ''")
    }
}
