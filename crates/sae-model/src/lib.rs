//! Domain types for SAE numbering.

pub mod assignment;
pub mod error;
pub mod number;
pub mod record;
pub mod report_type;

pub use assignment::{
    Assignment, DEFAULT_EVENT_NAME, DEFAULT_REPEAT_INSTRUMENT, FormTarget, RejectedRecord,
    RejectionReason,
};
pub use error::{ModelError, Result};
pub use number::{MAX_SEQUENCE, SaeNumber};
pub use record::{SaeRecord, non_blank};
pub use report_type::ReportType;
