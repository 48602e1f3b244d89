use serde::{Deserialize, Serialize};

/// One completed instance of the repeating SAE form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaeRecord {
    /// Participant identifier. Shared by every report of the participant.
    pub record_id: String,
    pub repeat_instance: u32,
    /// Raw `sae_report_type` code, `None` when left blank.
    pub report_type: Option<String>,
    /// Raw `sae_number` value, `None` when not yet numbered.
    pub sae_number: Option<String>,
}

impl SaeRecord {
    pub fn new(record_id: impl Into<String>, repeat_instance: u32) -> Self {
        Self {
            record_id: record_id.into(),
            repeat_instance,
            report_type: None,
            sae_number: None,
        }
    }

    #[must_use]
    pub fn with_report_type(mut self, code: impl Into<String>) -> Self {
        self.report_type = non_blank(code.into());
        self
    }

    #[must_use]
    pub fn with_sae_number(mut self, value: impl Into<String>) -> Self {
        self.sae_number = non_blank(value.into());
        self
    }

    /// Existing SAE number, ignoring whitespace-only values.
    pub fn existing_number(&self) -> Option<&str> {
        self.sae_number
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Returns `None` for empty or whitespace-only strings.
pub fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}
