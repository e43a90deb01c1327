//! Jackett provider client: every provider id is a Jackett indexer id.

use async_trait::async_trait;
use reqwest::{redirect, Client, StatusCode};
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::JackettConfig;
use crate::search::TorrentRecord;

use super::{
    ActiveProviders, Category, ProviderClient, ProviderError, ProviderId, ProviderQuery, RawRecord,
};

/// Jackett-backed implementation of [`ProviderClient`].
pub struct JackettProvider {
    client: Client,
    /// Same settings, but never follows redirects (magnet resolution).
    resolver: Client,
    config: JackettConfig,
    enabled: RwLock<Vec<ProviderId>>,
}

impl JackettProvider {
    /// Create a new JackettProvider with the given configuration.
    pub fn new(config: JackettConfig) -> Result<Self, ProviderError> {
        let timeout = Duration::from_secs(config.timeout_secs as u64);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;
        let resolver = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            resolver,
            config,
            enabled: RwLock::new(Vec::new()),
        })
    }

    /// Providers enabled by the most recent activation.
    pub fn enabled(&self) -> Vec<ProviderId> {
        match self.enabled.read() {
            Ok(enabled) => enabled.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Build the Jackett API URL for a search.
    fn build_search_url(&self, query: &ProviderQuery, indexer: &ProviderId) -> String {
        let mut url = format!(
            "{}/api/v2.0/indexers/{}/results?apikey={}&Query={}",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(indexer.as_str()),
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(&query.query)
        );

        for cat_id in category_to_torznab_ids(query.category) {
            url.push_str(&format!("&Category[]={}", cat_id));
        }

        url
    }

    /// Search a single indexer.
    async fn search_indexer(
        &self,
        query: &ProviderQuery,
        indexer: &ProviderId,
    ) -> Result<Vec<RawRecord>, ProviderError> {
        let url = self.build_search_url(query, indexer);
        debug!(provider = %indexer, "Searching Jackett");

        let response = self.client.get(&url).send().await.map_err(map_request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let jackett_response: JackettResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        debug!(
            provider = %indexer,
            results = jackett_response.Results.len(),
            "Jackett search complete"
        );

        Ok(jackett_response
            .Results
            .into_iter()
            .take(query.limit)
            .map(into_raw_record)
            .collect())
    }
}

#[async_trait]
impl ProviderClient for JackettProvider {
    fn name(&self) -> &str {
        "jackett"
    }

    fn activate(&self, providers: &[ProviderId]) -> ActiveProviders {
        let mut enabled = match self.enabled.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        enabled.clear();
        enabled.extend(providers.iter().cloned());
        ActiveProviders::new(enabled.clone())
    }

    async fn search(
        &self,
        active: &ActiveProviders,
        query: &ProviderQuery,
    ) -> Result<Vec<RawRecord>, ProviderError> {
        if active.is_empty() {
            return Err(ProviderError::NoActiveProvider);
        }

        let results = futures::future::join_all(
            active
                .providers()
                .iter()
                .map(|indexer| self.search_indexer(query, indexer)),
        )
        .await;

        let mut records = Vec::new();
        let mut last_error = None;
        for (indexer, result) in active.providers().iter().zip(results) {
            match result {
                Ok(mut found) => records.append(&mut found),
                Err(e) => {
                    warn!(provider = %indexer, error = %e, "Indexer search failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if records.is_empty() => Err(e),
            _ => Ok(records),
        }
    }

    async fn resolve_magnet(
        &self,
        active: &ActiveProviders,
        record: &TorrentRecord,
    ) -> Result<String, ProviderError> {
        if !active.contains(&record.provider) {
            return Err(ProviderError::NoActiveProvider);
        }

        if let Some(uri) = &record.magnet_ref.magnet_uri {
            return Ok(uri.clone());
        }

        let Some(link) = &record.magnet_ref.download_url else {
            return Err(ProviderError::MagnetUnavailable(record.title.clone()));
        };

        let response = self.resolver.get(link).send().await.map_err(map_request_error)?;
        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok());
            if let Some(location) = location.filter(|l| l.starts_with("magnet:")) {
                return Ok(location.to_string());
            }
        } else if status != StatusCode::OK {
            return Err(ProviderError::ApiError(format!("HTTP {}", status)));
        }

        // A 200 here is a .torrent file, which carries no magnet URI.
        Err(ProviderError::MagnetUnavailable(record.title.clone()))
    }
}

fn map_request_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else if e.is_connect() {
        ProviderError::ConnectionFailed(e.to_string())
    } else {
        ProviderError::ApiError(e.to_string())
    }
}

/// Map our categories to Torznab category IDs.
fn category_to_torznab_ids(cat: Category) -> Vec<i32> {
    match cat {
        Category::All | Category::Top100 => vec![],
        Category::Movies => vec![2000],
        Category::Tv => vec![5000],
        Category::Music => vec![3000],
        Category::Games => vec![1000, 4050], // Console, PC/Games
        Category::Apps => vec![4000],
        Category::Books => vec![7000],
    }
}

fn into_raw_record(r: JackettResult) -> RawRecord {
    RawRecord {
        title: r.Title,
        size: r.Size.map(|bytes| format!("{} B", bytes)),
        seeds: r.Seeders,
        // Jackett's Peers count includes seeders
        peers: r.Peers.map(|p| (p - r.Seeders.unwrap_or(0).max(0)).max(0)),
        time: r.PublishDate,
        magnet_uri: r.MagnetUri,
        download_url: r.Link,
        description: r.Description,
        details_url: r.Details,
    }
}

// Jackett API response types
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResponse {
    Results: Vec<JackettResult>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResult {
    Title: String,
    MagnetUri: Option<String>,
    Link: Option<String>,
    Size: Option<i64>,
    Seeders: Option<i64>,
    Peers: Option<i64>,
    PublishDate: Option<String>,
    Description: Option<String>,
    Details: Option<String>,
}
