use std::collections::BTreeMap;

use super::record::{FieldKey, FieldValue, FormRecord};

/// Changed fields only; the payload of a partial update.
pub type PartialRecord = BTreeMap<FieldKey, FieldValue>;

/// Keys of `original` whose value differs in `current`, with the current value.
///
/// Keys that only exist in `current` are ignored. A key missing from
/// `current` is reported as [`FieldValue::Null`].
pub fn compute_delta<T>(original: &T, current: &T) -> PartialRecord
where
    T: FormRecord,
{
    original
        .field_keys()
        .into_iter()
        .filter_map(|key| {
            let before = original.field_value(&key).unwrap_or_default();
            let after = current.field_value(&key).unwrap_or_default();
            (before != after).then_some((key, after))
        })
        .collect()
}
