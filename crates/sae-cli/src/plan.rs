//! CSV export of planned SAE numbers.

use std::path::Path;

use anyhow::{Context, Result};

use crate::types::ProjectResult;

const HEADER: [&str; 6] = [
    "project",
    "record_id",
    "redcap_event_name",
    "redcap_repeat_instance",
    "sae_number",
    "replaces",
];

/// Write every planned assignment of `results` to `path`. Returns the row count.
pub fn write_plan_csv(path: &Path, results: &[ProjectResult]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create plan csv: {}", path.display()))?;
    writer.write_record(HEADER).context("write plan header")?;
    let mut rows = 0usize;
    for result in results {
        for assignment in &result.assignments {
            let repeat_instance = assignment.repeat_instance.to_string();
            let sae_number = assignment.sae_number.to_string();
            writer
                .write_record([
                    result.key.as_str(),
                    assignment.record_id.as_str(),
                    assignment.event_name.as_str(),
                    repeat_instance.as_str(),
                    sae_number.as_str(),
                    assignment.replaces.as_deref().unwrap_or(""),
                ])
                .with_context(|| format!("write plan row: {}", path.display()))?;
            rows += 1;
        }
    }
    writer
        .flush()
        .with_context(|| format!("flush plan csv: {}", path.display()))?;
    Ok(rows)
}
