//! Mock provider client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::provider::{
    ActiveProviders, ProviderClient, ProviderError, ProviderId, ProviderQuery, RawRecord,
};
use crate::search::TorrentRecord;

/// A recorded search call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// First provider of the activation the call was issued with.
    pub provider: ProviderId,
    /// Full activation snapshot.
    pub active: Vec<ProviderId>,
    /// The query that was sent.
    pub query: ProviderQuery,
    /// When the call was issued.
    pub timestamp: Instant,
}

#[derive(Default)]
struct MockState {
    results: HashMap<ProviderId, Vec<RawRecord>>,
    failures: HashMap<ProviderId, String>,
    delays: HashMap<ProviderId, Duration>,
    magnets: HashMap<String, String>,
    magnet_failure: Option<String>,
    enabled: Vec<ProviderId>,
    activations: Vec<Vec<ProviderId>>,
    calls: Vec<RecordedCall>,
    resolved: Vec<(ProviderId, String)>,
}

/// Mock implementation of the [`ProviderClient`] trait.
///
/// Provides controllable behavior for testing:
/// - Scripted results, failures, and delays per provider
/// - Records every activation and search call in issue order
/// - Magnet resolution from a title -> magnet map
///
/// Providers without scripted results answer with an empty list.
///
/// # Example
///
/// ```rust,ignore
/// use magnetize_core::testing::{fixtures, MockProviderClient};
///
/// let client = MockProviderClient::new();
/// client.set_results("1337x", vec![fixtures::raw("Ubuntu", Some(10))]);
/// client.fail_provider("thepiratebay", "connection refused");
///
/// // Run the orchestrator ...
///
/// assert_eq!(client.call_order(), vec!["thepiratebay", "1337x"]);
/// ```
#[derive(Default)]
pub struct MockProviderClient {
    state: Mutex<MockState>,
}

impl std::fmt::Debug for MockProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProviderClient")
            .field("state", &"<state>")
            .finish()
    }
}

impl MockProviderClient {
    /// Create a new mock client with no scripted behavior.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Set the records a provider returns.
    pub fn set_results(&self, provider: &str, results: Vec<RawRecord>) {
        self.state().results.insert(provider.into(), results);
    }

    /// Make every search against `provider` fail.
    pub fn fail_provider(&self, provider: &str, error: &str) {
        self.state()
            .failures
            .insert(provider.into(), error.to_string());
    }

    /// Delay every search against `provider`.
    pub fn set_delay(&self, provider: &str, delay: Duration) {
        self.state().delays.insert(provider.into(), delay);
    }

    /// Map a record title to the magnet URI returned on resolution.
    pub fn set_magnet(&self, title: &str, magnet: &str) {
        self.state()
            .magnets
            .insert(title.to_string(), magnet.to_string());
    }

    /// Make every magnet resolution fail.
    pub fn fail_magnets(&self, error: &str) {
        self.state().magnet_failure = Some(error.to_string());
    }

    /// Get recorded search calls.
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// Provider ids in the order their searches were issued.
    pub fn call_order(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .map(|c| c.provider.to_string())
            .collect()
    }

    /// Get the number of searches performed.
    pub fn search_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Every activation, in order.
    pub fn activations(&self) -> Vec<Vec<ProviderId>> {
        self.state().activations.clone()
    }

    /// Providers enabled right now.
    pub fn enabled(&self) -> Vec<ProviderId> {
        self.state().enabled.clone()
    }

    /// (provider, title) pairs for every magnet resolution attempted.
    pub fn resolved(&self) -> Vec<(ProviderId, String)> {
        self.state().resolved.clone()
    }

    /// Clear recorded calls and activations.
    pub fn clear_recorded(&self) {
        let mut state = self.state();
        state.calls.clear();
        state.activations.clear();
        state.resolved.clear();
    }
}

#[async_trait]
impl ProviderClient for MockProviderClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn activate(&self, providers: &[ProviderId]) -> ActiveProviders {
        let mut state = self.state();
        state.enabled = providers.to_vec();
        state.activations.push(providers.to_vec());
        ActiveProviders::new(providers.to_vec())
    }

    async fn search(
        &self,
        active: &ActiveProviders,
        query: &ProviderQuery,
    ) -> Result<Vec<RawRecord>, ProviderError> {
        let Some(first) = active.providers().first().cloned() else {
            return Err(ProviderError::NoActiveProvider);
        };

        let delay = {
            let mut state = self.state();
            state.calls.push(RecordedCall {
                provider: first,
                active: active.providers().to_vec(),
                query: query.clone(),
                timestamp: Instant::now(),
            });
            active
                .providers()
                .iter()
                .filter_map(|p| state.delays.get(p).copied())
                .max()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state();
        let mut records = Vec::new();
        let mut error = None;
        for provider in active.providers() {
            if let Some(message) = state.failures.get(provider) {
                error = Some(ProviderError::ApiError(message.clone()));
                continue;
            }
            if let Some(found) = state.results.get(provider) {
                records.extend(found.iter().take(query.limit).cloned());
            }
        }

        match error {
            Some(e) if records.is_empty() => Err(e),
            _ => Ok(records),
        }
    }

    async fn resolve_magnet(
        &self,
        active: &ActiveProviders,
        record: &TorrentRecord,
    ) -> Result<String, ProviderError> {
        let mut state = self.state();
        state
            .resolved
            .push((record.provider.clone(), record.title.clone()));

        if !active.contains(&record.provider) {
            return Err(ProviderError::NoActiveProvider);
        }
        if let Some(message) = &state.magnet_failure {
            return Err(ProviderError::ApiError(message.clone()));
        }

        state
            .magnets
            .get(&record.title)
            .cloned()
            .or_else(|| record.magnet_ref.magnet_uri.clone())
            .ok_or_else(|| ProviderError::MagnetUnavailable(record.title.clone()))
    }
}
