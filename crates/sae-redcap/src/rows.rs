//! Wire rows of REDCap `flat` JSON exports and imports.
//!
//! REDCap exports every value as a string, though some versions send
//! `redcap_repeat_instance` as a number. Fields are read leniently and
//! validated when converted into model types.

use std::collections::BTreeMap;

use sae_model::{Assignment, SaeRecord, non_blank};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::{GatewayError, Result};

/// One exported row of the SAE form.
#[derive(Debug, Clone, Deserialize)]
pub struct SaeRow {
    #[serde(deserialize_with = "lenient_string")]
    pub record_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub redcap_repeat_instrument: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub redcap_repeat_instance: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sae_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sae_report_type: String,
}

impl SaeRow {
    /// Convert into an [`SaeRecord`]. Rows of other instruments yield `None`.
    pub fn into_record(self, repeat_instrument: &str) -> Result<Option<SaeRecord>> {
        if self.redcap_repeat_instrument.trim() != repeat_instrument {
            return Ok(None);
        }
        let instance = self.redcap_repeat_instance.trim();
        let repeat_instance = match instance.parse::<u32>() {
            Ok(value) if value > 0 => value,
            _ => {
                return Err(GatewayError::InvalidRow {
                    record_id: self.record_id,
                    reason: format!("invalid redcap_repeat_instance {instance:?}"),
                });
            }
        };
        Ok(Some(SaeRecord {
            record_id: self.record_id.trim().to_string(),
            repeat_instance,
            report_type: non_blank(self.sae_report_type),
            sae_number: non_blank(self.sae_number),
        }))
    }
}

/// Convert exported SAE rows into records, in export order.
pub fn sae_records(rows: Vec<SaeRow>, repeat_instrument: &str) -> Result<Vec<SaeRecord>> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(record) = row.into_record(repeat_instrument)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// One exported row carrying a participant's study number.
#[derive(Debug, Clone, Deserialize)]
pub struct StudyNumberRow {
    #[serde(deserialize_with = "lenient_string")]
    pub record_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub study_number: String,
}

/// Collapse study number rows to one value per participant.
///
/// Longitudinal projects export one row per event; the first non-blank value
/// wins and disagreeing later values are logged.
pub fn study_numbers(rows: Vec<StudyNumberRow>) -> BTreeMap<String, String> {
    let mut numbers: BTreeMap<String, String> = BTreeMap::new();
    for row in rows {
        let Some(study_number) = non_blank(row.study_number) else {
            continue;
        };
        let record_id = row.record_id.trim().to_string();
        match numbers.get(&record_id) {
            Some(existing) if *existing != study_number => {
                // Values stay out of the log; only the participant is named.
                warn!(record_id = %record_id, "conflicting study numbers, keeping the first");
            }
            Some(_) => {}
            None => {
                numbers.insert(record_id, study_number);
            }
        }
    }
    numbers
}

/// One row written back by the import call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRow<'a> {
    pub record_id: &'a str,
    pub redcap_event_name: &'a str,
    pub redcap_repeat_instrument: &'a str,
    pub redcap_repeat_instance: u32,
    pub sae_number: String,
}

impl<'a> From<&'a Assignment> for ImportRow<'a> {
    fn from(assignment: &'a Assignment) -> Self {
        Self {
            record_id: &assignment.record_id,
            redcap_event_name: &assignment.event_name,
            redcap_repeat_instrument: &assignment.repeat_instrument,
            redcap_repeat_instance: assignment.repeat_instance,
            sae_number: assignment.sae_number.to_string(),
        }
    }
}

/// Response of an import with `returnContent=count`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportResponse {
    #[serde(deserialize_with = "lenient_count")]
    pub count: usize,
}

/// Body REDCap sends alongside error statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<usize, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    match &value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid count {value}"))),
        serde_json::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid count {s:?}"))),
        _ => Err(serde::de::Error::custom(format!("invalid count {value}"))),
    }
}
