//! Types for the search orchestration layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::provider::{Category, ProviderId};

/// Opaque handle used to resolve a magnet URI after selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagnetRef {
    /// Magnet URI, when the provider returned one directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet_uri: Option<String>,
    /// Download link that may redirect to a magnet URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// One discovered torrent, tagged with the provider it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentRecord {
    pub title: String,
    /// Free-form size text as reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peers: Option<u64>,
    /// Upload time as text; parsed lazily for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
    pub provider: ProviderId,
    pub magnet_ref: MagnetRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_link: Option<String>,
}

impl TorrentRecord {
    /// Seed count used for ranking; absent counts rank as zero.
    pub fn rank_seeds(&self) -> u64 {
        self.seeds.unwrap_or(0)
    }
}

/// Ordered list of distinct provider identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSet(Vec<ProviderId>);

impl ProviderSet {
    /// Build a provider set, keeping the first occurrence of duplicates.
    pub fn new<I, P>(providers: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = P>,
        P: Into<ProviderId>,
    {
        let mut distinct: Vec<ProviderId> = Vec::new();
        for provider in providers {
            let provider = provider.into();
            if !distinct.contains(&provider) {
                distinct.push(provider);
            }
        }

        if distinct.is_empty() {
            return Err(SearchError::EmptyProviderSet);
        }
        Ok(Self(distinct))
    }

    pub fn as_slice(&self) -> &[ProviderId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, provider: &ProviderId) -> bool {
        self.0.contains(provider)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderId> {
        self.0.iter()
    }
}

/// An immutable search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    query: String,
    category: Category,
    row_limit: usize,
    truncate_width: usize,
}

impl SearchRequest {
    pub fn new(
        query: impl Into<String>,
        category: Category,
        row_limit: usize,
        truncate_width: usize,
    ) -> Result<Self, SearchError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(SearchError::InvalidRequest("query cannot be empty".to_string()));
        }
        if row_limit == 0 {
            return Err(SearchError::InvalidRequest("row limit must be positive".to_string()));
        }
        if truncate_width == 0 {
            return Err(SearchError::InvalidRequest(
                "truncate width must be positive".to_string(),
            ));
        }

        Ok(Self {
            query,
            category,
            row_limit,
            truncate_width,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn row_limit(&self) -> usize {
        self.row_limit
    }

    pub fn truncate_width(&self) -> usize {
        self.truncate_width
    }
}

/// How the orchestrator picks providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMode {
    /// Try providers one at a time, moving on when one yields nothing.
    /// `start` moves the given provider to the front of the chain.
    Fallback { start: Option<ProviderId> },
    /// Query every provider concurrently and merge the results.
    AllProviders,
}

impl SearchMode {
    pub fn is_all_providers(&self) -> bool {
        matches!(self, SearchMode::AllProviders)
    }
}

/// What happened when one provider was queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptStatus {
    Found { count: usize },
    Empty,
    Failed { error: String },
    TimedOut,
}

impl AttemptStatus {
    pub fn is_found(&self) -> bool {
        matches!(self, AttemptStatus::Found { .. })
    }
}

/// One provider call made during a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderAttempt {
    pub provider: ProviderId,
    pub limit: usize,
    pub status: AttemptStatus,
    pub finished_at: DateTime<Utc>,
}

/// Ranked, capped result of a search. Empty means "not found".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub records: Vec<TorrentRecord>,
    /// Provider calls in the order they settled (fallback) or were issued
    /// (all providers).
    pub attempts: Vec<ProviderAttempt>,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Provider that produced the records in fallback mode.
    pub fn winning_provider(&self) -> Option<&ProviderId> {
        self.attempts
            .iter()
            .rev()
            .find(|a| a.status.is_found())
            .map(|a| &a.provider)
    }

    /// True when every provider in `providers` answered and had nothing.
    /// Failed or timed-out calls do not count as answers.
    pub fn settled_empty_on(&self, providers: &ProviderSet) -> bool {
        providers.as_slice().iter().all(|provider| {
            self.attempts
                .iter()
                .any(|a| &a.provider == provider && a.status == AttemptStatus::Empty)
        })
    }
}

/// States of the sequential fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackState {
    Idle,
    Querying(ProviderId),
    Exhausted,
    Succeeded,
}

impl fmt::Display for FallbackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackState::Idle => f.write_str("idle"),
            FallbackState::Querying(p) => write!(f, "querying({})", p),
            FallbackState::Exhausted => f.write_str("exhausted"),
            FallbackState::Succeeded => f.write_str("succeeded"),
        }
    }
}

/// Errors raised while building search inputs.
///
/// Provider failures never surface here; they are recorded as attempts.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Provider set cannot be empty")]
    EmptyProviderSet,

    #[error("Invalid search request: {0}")]
    InvalidRequest(String),

    #[error("Provider not in provider set: {0}")]
    UnknownProvider(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_set_dedups_preserving_order() {
        let set = ProviderSet::new(["b", "a", "b", "c", "a"]).unwrap();
        let ids: Vec<&str> = set.iter().map(|p| p.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_provider_set_rejects_empty() {
        let result = ProviderSet::new(Vec::<ProviderId>::new());
        assert!(matches!(result, Err(SearchError::EmptyProviderSet)));
    }

    #[test]
    fn test_search_request_validation() {
        assert!(SearchRequest::new("ubuntu", Category::All, 30, 40).is_ok());
        assert!(SearchRequest::new("  ", Category::All, 30, 40).is_err());
        assert!(SearchRequest::new("ubuntu", Category::All, 0, 40).is_err());
        assert!(SearchRequest::new("ubuntu", Category::All, 30, 0).is_err());
    }

    #[test]
    fn test_winning_provider_is_last_found_attempt() {
        let outcome = SearchOutcome {
            records: vec![],
            attempts: vec![
                ProviderAttempt {
                    provider: "a".into(),
                    limit: 10,
                    status: AttemptStatus::Empty,
                    finished_at: Utc::now(),
                },
                ProviderAttempt {
                    provider: "b".into(),
                    limit: 10,
                    status: AttemptStatus::Found { count: 2 },
                    finished_at: Utc::now(),
                },
            ],
        };
        assert_eq!(outcome.winning_provider(), Some(&ProviderId::from("b")));
    }

    #[test]
    fn test_settled_empty_needs_an_empty_answer_from_every_provider() {
        let attempt = |provider: &str, status| ProviderAttempt {
            provider: provider.into(),
            limit: 10,
            status,
            finished_at: Utc::now(),
        };
        let providers = ProviderSet::new(["a", "b"]).unwrap();

        let all_empty = SearchOutcome {
            records: vec![],
            attempts: vec![
                attempt("b", AttemptStatus::Empty),
                attempt("a", AttemptStatus::Empty),
            ],
        };
        assert!(all_empty.settled_empty_on(&providers));

        let one_timed_out = SearchOutcome {
            records: vec![],
            attempts: vec![
                attempt("a", AttemptStatus::Empty),
                attempt("b", AttemptStatus::TimedOut),
            ],
        };
        assert!(!one_timed_out.settled_empty_on(&providers));

        let partial = SearchOutcome {
            records: vec![],
            attempts: vec![attempt("a", AttemptStatus::Empty)],
        };
        assert!(!partial.settled_empty_on(&providers));
    }

    #[test]
    fn test_attempt_status_serialization() {
        let json = serde_json::to_string(&AttemptStatus::Found { count: 3 }).unwrap();
        assert_eq!(json, r#"{"status":"found","count":3}"#);
        let json = serde_json::to_string(&AttemptStatus::TimedOut).unwrap();
        assert_eq!(json, r#"{"status":"timed_out"}"#);
    }
}
