//! Exact-duplicate removal within one category harvest.

use std::collections::HashSet;

use crate::record::ProductRecord;

/// Remove exact duplicates, keeping the first occurrence and the relative
/// order of everything else.
///
/// Equality is structural over all fields; two records differing only in
/// price formatting are distinct. Runs in O(n) via a hash seen-set keyed on
/// the full field tuple.
pub fn dedupe(records: Vec<ProductRecord>) -> Vec<ProductRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(record.dedupe_key()) {
            unique.push(record);
        }
    }
    unique
}
