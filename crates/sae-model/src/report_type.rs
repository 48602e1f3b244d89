//! SAE report type codes.

use std::fmt;

/// Code for a new (initial) report on an adverse event.
pub const INITIAL_CODE: &str = "1";
/// Code for a follow-up report on an already reported event.
pub const FOLLOW_UP_CODE: &str = "2";
/// Code for additional information on an already reported event.
pub const ADDITIONAL_INFO_CODE: &str = "3";

/// How a report relates to the adverse events already numbered for a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportType {
    /// Opens a new, distinct adverse event.
    Initial,
    /// Adds information to the most recently numbered event.
    FollowUp,
}

impl ReportType {
    /// Resolve a raw `sae_report_type` code. Returns `None` for unknown codes.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            INITIAL_CODE => Some(Self::Initial),
            FOLLOW_UP_CODE | ADDITIONAL_INFO_CODE => Some(Self::FollowUp),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::FollowUp => "follow-up",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
