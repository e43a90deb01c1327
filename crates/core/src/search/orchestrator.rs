//! Provider orchestration: sequential fallback and parallel fan-out.
//!
//! Fallback mode walks the provider chain one provider at a time and stops
//! at the first non-empty answer. All-providers mode queries every provider
//! concurrently with a share of the row limit and waits for every call to
//! settle before merging. Provider errors and timeouts are never raised;
//! they are recorded as attempts and treated like an empty answer.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::provider::{ProviderClient, ProviderError, ProviderId, ProviderQuery};

use super::aggregator::merge_results;
use super::normalizer::normalize_all;
use super::{
    AttemptStatus, FallbackState, ProviderAttempt, ProviderSet, SearchError, SearchMode,
    SearchOutcome, SearchRequest, TorrentRecord,
};

/// Sequential provider chain driven by [`FallbackState`] transitions.
#[derive(Debug)]
pub struct FallbackChain {
    remaining: VecDeque<ProviderId>,
    state: FallbackState,
}

impl FallbackChain {
    pub fn new(order: Vec<ProviderId>) -> Self {
        Self {
            remaining: order.into(),
            state: FallbackState::Idle,
        }
    }

    pub fn state(&self) -> &FallbackState {
        &self.state
    }

    /// Move to the next untried provider, or to `Exhausted`.
    ///
    /// The returned provider is removed from the candidate set, so a chain
    /// never revisits a provider.
    pub fn advance(&mut self) -> Option<ProviderId> {
        if matches!(self.state, FallbackState::Succeeded | FallbackState::Exhausted) {
            return None;
        }

        match self.remaining.pop_front() {
            Some(next) => {
                self.state = FallbackState::Querying(next.clone());
                Some(next)
            }
            None => {
                self.state = FallbackState::Exhausted;
                None
            }
        }
    }

    /// The current provider answered with records.
    pub fn succeed(&mut self) {
        if matches!(self.state, FallbackState::Querying(_)) {
            self.state = FallbackState::Succeeded;
        }
    }
}

/// Decides which provider(s) to call and combines their answers.
pub struct SearchOrchestrator {
    client: Arc<dyn ProviderClient>,
    providers: ProviderSet,
    call_timeout: Option<Duration>,
}

impl SearchOrchestrator {
    pub fn new(client: Arc<dyn ProviderClient>, providers: ProviderSet) -> Self {
        Self {
            client,
            providers,
            call_timeout: None,
        }
    }

    /// Bound every provider call; a call past the deadline counts as failed.
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    pub fn client(&self) -> &Arc<dyn ProviderClient> {
        &self.client
    }

    /// Rows requested from each provider in all-providers mode.
    pub fn per_provider_limit(row_limit: usize, provider_count: usize) -> usize {
        row_limit.div_ceil(provider_count.max(1))
    }

    /// Provider order for fallback mode, optionally starting at `start`.
    pub fn fallback_order(&self, start: Option<&ProviderId>) -> Result<Vec<ProviderId>, SearchError> {
        let mut order: Vec<ProviderId> = self.providers.iter().cloned().collect();
        if let Some(start) = start {
            let idx = order
                .iter()
                .position(|p| p == start)
                .ok_or_else(|| SearchError::UnknownProvider(start.to_string()))?;
            let first = order.remove(idx);
            order.insert(0, first);
        }
        Ok(order)
    }

    /// Run a search. An empty outcome means no provider yielded anything.
    pub async fn search(
        &self,
        request: &SearchRequest,
        mode: &SearchMode,
    ) -> Result<SearchOutcome, SearchError> {
        match mode {
            SearchMode::Fallback { start } => {
                let order = self.fallback_order(start.as_ref())?;
                Ok(self.search_with_fallback(request, order).await)
            }
            SearchMode::AllProviders => Ok(self.search_all(request).await),
        }
    }

    async fn search_with_fallback(
        &self,
        request: &SearchRequest,
        order: Vec<ProviderId>,
    ) -> SearchOutcome {
        let mut chain = FallbackChain::new(order);
        let mut attempts = Vec::new();

        while let Some(provider) = chain.advance() {
            let (mut records, attempt) = self
                .query_provider(&provider, request, request.row_limit())
                .await;
            attempts.push(attempt);

            if !records.is_empty() {
                chain.succeed();
                records.truncate(request.row_limit());
                debug!(provider = %provider, results = records.len(), "Fallback chain succeeded");
                return SearchOutcome { records, attempts };
            }
            info!(provider = %provider, "Provider yielded nothing, trying next");
        }

        debug!(attempts = attempts.len(), state = %chain.state(), "Fallback chain exhausted");
        SearchOutcome {
            records: Vec::new(),
            attempts,
        }
    }

    async fn search_all(&self, request: &SearchRequest) -> SearchOutcome {
        let limit = Self::per_provider_limit(request.row_limit(), self.providers.len());
        info!(
            providers = self.providers.len(),
            limit = limit,
            query = %request.query(),
            "Searching all providers"
        );

        let calls = self
            .providers
            .iter()
            .map(|provider| self.query_provider(provider, request, limit));
        let settled = futures::future::join_all(calls).await;

        let mut attempts = Vec::with_capacity(settled.len());
        let mut per_provider = Vec::with_capacity(settled.len());
        for (records, attempt) in settled {
            attempts.push(attempt);
            per_provider.push(records);
        }

        SearchOutcome {
            records: merge_results(per_provider, request.row_limit()),
            attempts,
        }
    }

    /// Activate `provider` alone and query it. Never fails: errors become
    /// an empty result plus a failed attempt.
    async fn query_provider(
        &self,
        provider: &ProviderId,
        request: &SearchRequest,
        limit: usize,
    ) -> (Vec<TorrentRecord>, ProviderAttempt) {
        let active = self.client.activate(std::slice::from_ref(provider));
        let query = ProviderQuery {
            query: request.query().to_string(),
            category: request.category(),
            limit,
        };
        debug!(provider = %provider, limit = limit, "Querying provider");

        let call = self.client.search(&active, &query);
        let result = match self.call_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, call).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout),
            },
            None => call.await,
        };

        let (records, status) = match result {
            Ok(raw) if raw.is_empty() => (Vec::new(), AttemptStatus::Empty),
            Ok(raw) => {
                let records = normalize_all(raw, provider);
                let count = records.len();
                (records, AttemptStatus::Found { count })
            }
            Err(ProviderError::Timeout) => {
                warn!(provider = %provider, "Provider search timed out");
                (Vec::new(), AttemptStatus::TimedOut)
            }
            Err(e) => {
                warn!(provider = %provider, error = %e, "Provider search failed");
                (
                    Vec::new(),
                    AttemptStatus::Failed {
                        error: e.to_string(),
                    },
                )
            }
        };

        let attempt = ProviderAttempt {
            provider: provider.clone(),
            limit,
            status,
            finished_at: Utc::now(),
        };
        (records, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Category;
    use crate::testing::{fixtures, MockProviderClient};

    fn request(rows: usize) -> SearchRequest {
        SearchRequest::new("ubuntu", Category::All, rows, 40).unwrap()
    }

    fn orchestrator(client: &Arc<MockProviderClient>, ids: &[&str]) -> SearchOrchestrator {
        let client: Arc<dyn ProviderClient> = client.clone();
        SearchOrchestrator::new(client, ProviderSet::new(ids.iter().copied()).unwrap())
    }

    #[test]
    fn test_fallback_chain_transitions() {
        let mut chain = FallbackChain::new(vec!["a".into(), "b".into()]);
        assert_eq!(chain.state(), &FallbackState::Idle);

        assert_eq!(chain.advance(), Some("a".into()));
        assert_eq!(chain.state(), &FallbackState::Querying("a".into()));

        assert_eq!(chain.advance(), Some("b".into()));
        chain.succeed();
        assert_eq!(chain.state(), &FallbackState::Succeeded);
        assert_eq!(chain.advance(), None);
    }

    #[test]
    fn test_fallback_chain_exhausts() {
        let mut chain = FallbackChain::new(vec!["a".into()]);
        assert!(chain.advance().is_some());
        assert!(chain.advance().is_none());
        assert_eq!(chain.state(), &FallbackState::Exhausted);
        // Succeed after exhaustion is ignored
        chain.succeed();
        assert_eq!(chain.state(), &FallbackState::Exhausted);
    }

    #[test]
    fn test_per_provider_limit_rounds_up() {
        assert_eq!(SearchOrchestrator::per_provider_limit(10, 2), 5);
        assert_eq!(SearchOrchestrator::per_provider_limit(30, 8), 4);
        assert_eq!(SearchOrchestrator::per_provider_limit(1, 3), 1);
        assert_eq!(SearchOrchestrator::per_provider_limit(7, 7), 1);
    }

    #[test]
    fn test_fallback_order_starts_at_requested_provider() {
        let client = Arc::new(MockProviderClient::new());
        let orch = orchestrator(&client, &["a", "b", "c"]);

        let order = orch.fallback_order(Some(&"b".into())).unwrap();
        let ids: Vec<_> = order.iter().map(|p| p.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);

        let err = orch.fallback_order(Some(&"z".into())).unwrap_err();
        assert!(matches!(err, SearchError::UnknownProvider(_)));
    }

    #[tokio::test]
    async fn test_fallback_skips_failing_provider() {
        let client = Arc::new(MockProviderClient::new());
        client.fail_provider("a", "connection refused");
        client.set_results("b", vec![fixtures::raw("b1", Some(4))]);
        let orch = orchestrator(&client, &["a", "b"]);

        let outcome = orch
            .search(&request(30), &SearchMode::Fallback { start: None })
            .await
            .unwrap();

        assert_eq!(outcome.len(), 1);
        assert_eq!(outcome.records[0].provider.as_str(), "b");
        assert!(matches!(outcome.attempts[0].status, AttemptStatus::Failed { .. }));
        assert_eq!(outcome.winning_provider(), Some(&"b".into()));
    }

    #[tokio::test]
    async fn test_fallback_returns_provider_order_untouched() {
        let client = Arc::new(MockProviderClient::new());
        client.set_results(
            "a",
            vec![fixtures::raw("low", Some(1)), fixtures::raw("high", Some(9))],
        );
        let orch = orchestrator(&client, &["a"]);

        let outcome = orch
            .search(&request(30), &SearchMode::Fallback { start: None })
            .await
            .unwrap();
        let titles: Vec<_> = outcome.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["low", "high"]);
    }

    #[tokio::test]
    async fn test_call_timeout_counts_as_failure() {
        let client = Arc::new(MockProviderClient::new());
        client.set_results("slow", vec![fixtures::raw("late", Some(1))]);
        client.set_delay("slow", Duration::from_millis(200));
        client.set_results("fast", vec![fixtures::raw("quick", Some(1))]);
        let orch = orchestrator(&client, &["slow", "fast"])
            .with_call_timeout(Some(Duration::from_millis(20)));

        let outcome = orch
            .search(&request(30), &SearchMode::Fallback { start: None })
            .await
            .unwrap();

        assert_eq!(outcome.attempts[0].status, AttemptStatus::TimedOut);
        assert_eq!(outcome.records[0].title, "quick");
    }

    #[tokio::test]
    async fn test_all_providers_activates_one_provider_per_call() {
        let client = Arc::new(MockProviderClient::new());
        client.set_results("a", vec![fixtures::raw("a1", Some(1))]);
        client.set_results("b", vec![fixtures::raw("b1", Some(2))]);
        let orch = orchestrator(&client, &["a", "b"]);

        orch.search(&request(10), &SearchMode::AllProviders)
            .await
            .unwrap();

        for call in client.recorded_calls() {
            assert_eq!(call.active.len(), 1);
            assert_eq!(call.active[0], call.provider);
        }
    }
}
