//! Partitioning of reports into participant groups.

use std::collections::BTreeMap;

use crate::join::NumberedRecord;

/// Group reports by participant. Records keep their input order within a
/// group regardless of how participants interleave in the input.
pub fn partition_by_participant(
    records: &[NumberedRecord],
) -> BTreeMap<&str, Vec<&NumberedRecord>> {
    let mut groups: BTreeMap<&str, Vec<&NumberedRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.record_id()).or_default().push(record);
    }
    groups
}
