//! Top-N selection by review count.

use crate::record::ProductRecord;

/// Default number of records kept per category harvest.
pub const DEFAULT_TOP_N: usize = 10;

/// Sort by review count descending and keep the first `top_n` records.
///
/// The sort must be stable so that records tied on review count keep their
/// pre-sort relative order (`Vec::sort_by` guarantees this). Fewer than
/// `top_n` inputs are returned whole; empty input yields empty output.
pub fn rank_top_n(mut records: Vec<ProductRecord>, top_n: usize) -> Vec<ProductRecord> {
    records.sort_by(|a, b| b.review_count.cmp(&a.review_count));
    records.truncate(top_n);
    records
}
