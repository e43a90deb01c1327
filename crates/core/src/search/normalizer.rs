//! Normalization of raw provider output into tagged records.

use crate::provider::{ProviderId, RawRecord};

use super::{MagnetRef, TorrentRecord};

/// Tag a raw record with its source provider and validate optional fields.
///
/// Blank text becomes absent and negative counts (indexers use -1 for
/// "unknown") become absent.
pub fn normalize_record(raw: RawRecord, provider: &ProviderId) -> TorrentRecord {
    TorrentRecord {
        title: raw.title.trim().to_string(),
        size_text: non_blank(raw.size),
        seeds: non_negative(raw.seeds),
        peers: non_negative(raw.peers),
        uploaded_at: non_blank(raw.time),
        provider: provider.clone(),
        magnet_ref: MagnetRef {
            magnet_uri: non_blank(raw.magnet_uri),
            download_url: non_blank(raw.download_url),
        },
        description: non_blank(raw.description),
        detail_link: non_blank(raw.details_url),
    }
}

/// Normalize every record of one provider response.
pub fn normalize_all(raw: Vec<RawRecord>, provider: &ProviderId) -> Vec<TorrentRecord> {
    raw.into_iter()
        .map(|r| normalize_record(r, provider))
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_negative(value: Option<i64>) -> Option<u64> {
    value.and_then(|v| u64::try_from(v).ok())
}
