//! Merging and ranking of results from several providers.

use std::cmp::Reverse;

use super::TorrentRecord;

/// Merge per-provider results into one ranked list.
///
/// Records are concatenated in provider order, ranked by seed count
/// (descending, absent as zero) with a stable sort so ties keep their
/// arrival order, then capped to `row_limit`.
pub fn merge_results<I>(per_provider: I, row_limit: usize) -> Vec<TorrentRecord>
where
    I: IntoIterator<Item = Vec<TorrentRecord>>,
{
    let mut merged: Vec<TorrentRecord> = per_provider.into_iter().flatten().collect();
    merged.sort_by_key(|r| Reverse(r.rank_seeds()));
    merged.truncate(row_limit);
    merged
}
