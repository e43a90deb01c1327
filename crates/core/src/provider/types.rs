//! Types for the provider capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::search::TorrentRecord;

/// Identifier of a torrent-index provider (e.g. a Jackett indexer id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProviderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Content category used to narrow a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Movies,
    Tv,
    Music,
    Games,
    Apps,
    Books,
    Top100,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::All,
        Category::Movies,
        Category::Tv,
        Category::Music,
        Category::Games,
        Category::Apps,
        Category::Books,
        Category::Top100,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Movies => "Movies",
            Category::Tv => "TV",
            Category::Music => "Music",
            Category::Games => "Games",
            Category::Apps => "Apps",
            Category::Books => "Books",
            Category::Top100 => "Top100",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// One query issued to the active provider(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuery {
    pub query: String,
    pub category: Category,
    pub limit: usize,
}

/// A record exactly as a provider returned it, before normalization.
///
/// Raw records never carry the provider they came from; that tag is added
/// by [`crate::search::normalize_record`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub title: String,
    /// Free-form size text ("1.2 GB", "734003200 B", ...).
    pub size: Option<String>,
    /// Signed because some indexers report -1 for "unknown".
    pub seeds: Option<i64>,
    pub peers: Option<i64>,
    pub time: Option<String>,
    pub magnet_uri: Option<String>,
    /// Download link that may redirect to a magnet URI.
    pub download_url: Option<String>,
    pub description: Option<String>,
    pub details_url: Option<String>,
}

/// Snapshot of the providers enabled by [`ProviderClient::activate`].
///
/// Every search is issued against the snapshot it was activated with, so
/// concurrent calls never observe each other's activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveProviders {
    providers: Vec<ProviderId>,
}

impl ActiveProviders {
    pub fn new(providers: Vec<ProviderId>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[ProviderId] {
        &self.providers
    }

    pub fn contains(&self, provider: &ProviderId) -> bool {
        self.providers.contains(provider)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Errors that can occur while talking to a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Provider API error: {0}")]
    ApiError(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("No provider is active")]
    NoActiveProvider,

    #[error("No magnet link available for \"{0}\"")]
    MagnetUnavailable(String),

    #[error("Request timeout")]
    Timeout,
}

/// Capability to query torrent-index providers.
///
/// Implementations keep enabled/disabled state across calls; callers must
/// [`activate`](ProviderClient::activate) the intended set before each query.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Enable exactly `providers`, disable every other provider, and return
    /// the resulting snapshot.
    fn activate(&self, providers: &[ProviderId]) -> ActiveProviders;

    /// Search the providers in `active`.
    async fn search(
        &self,
        active: &ActiveProviders,
        query: &ProviderQuery,
    ) -> Result<Vec<RawRecord>, ProviderError>;

    /// Resolve the magnet URI for a record found earlier.
    async fn resolve_magnet(
        &self,
        active: &ActiveProviders,
        record: &TorrentRecord,
    ) -> Result<String, ProviderError>;
}
