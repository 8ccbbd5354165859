use std::borrow::Borrow;
use std::collections::BTreeSet;

use ev_core::models::{GroupSelector, VehicleRecord, ALL_GROUPS};

/// Keep the records belonging to `selector`, in their original order.
///
/// [`GroupSelector::All`] returns every record. A concrete group keeps only the
/// records whose group key equals it exactly; an empty result is valid.
pub fn filter_records<'a, R>(records: &'a [R], selector: &GroupSelector) -> Vec<&'a VehicleRecord>
where
    R: Borrow<VehicleRecord>,
{
    records
        .iter()
        .map(|r| {
            let record: &'a VehicleRecord = r.borrow();
            record
        })
        .filter(|record| selector.matches(record))
        .collect()
}

/// The selectable groups: `"All"` followed by every distinct non-empty group
/// key, sorted.
pub fn available_groups<R: Borrow<VehicleRecord>>(records: &[R]) -> Vec<String> {
    let unique: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| {
            let record: &VehicleRecord = r.borrow();
            record.group_key()
        })
        .filter(|key| *key != ALL_GROUPS)
        .collect();

    std::iter::once(ALL_GROUPS.to_string())
        .chain(unique.into_iter().map(str::to_string))
        .collect()
}
