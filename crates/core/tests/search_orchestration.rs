//! Search orchestration integration tests.
//!
//! These tests drive the orchestrator against the mock provider client in
//! both modes and check call order, activation isolation, and ranking.

use std::sync::Arc;
use std::time::Duration;

use magnetize_core::{
    search::{AttemptStatus, ProviderSet},
    testing::{fixtures, MockProviderClient},
    Category, ProviderClient, SearchMode, SearchOrchestrator, SearchRequest,
};

/// Test helper owning a mock client and an orchestrator over it.
struct TestHarness {
    client: Arc<MockProviderClient>,
    orchestrator: SearchOrchestrator,
}

impl TestHarness {
    fn new(providers: &[&str]) -> Self {
        let client = Arc::new(MockProviderClient::new());
        let dyn_client: Arc<dyn ProviderClient> = client.clone();
        let providers =
            ProviderSet::new(providers.iter().copied()).expect("Provider set should be valid");

        Self {
            client,
            orchestrator: SearchOrchestrator::new(dyn_client, providers),
        }
    }

    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.orchestrator = self.orchestrator.with_call_timeout(Some(timeout));
        self
    }

    fn request(&self, rows: usize) -> SearchRequest {
        SearchRequest::new("ubuntu", Category::All, rows, 40).expect("Request should be valid")
    }
}

fn seeds(records: &[magnetize_core::TorrentRecord]) -> Vec<Option<u64>> {
    records.iter().map(|r| r.seeds).collect()
}

#[tokio::test]
async fn test_fallback_stops_at_first_non_empty_provider() {
    let harness = TestHarness::new(&["A", "B", "C"]);
    harness.client.set_results(
        "C",
        vec![
            fixtures::raw("c1", Some(3)),
            fixtures::raw("c2", Some(9)),
            fixtures::raw("c3", Some(1)),
        ],
    );

    let outcome = harness
        .orchestrator
        .search(&harness.request(30), &SearchMode::Fallback { start: None })
        .await
        .expect("Search should run");

    assert_eq!(outcome.len(), 3);
    assert_eq!(harness.client.call_order(), vec!["A", "B", "C"]);
    assert_eq!(outcome.winning_provider().map(|p| p.as_str()), Some("C"));
    assert!(outcome.records.iter().all(|r| r.provider.as_str() == "C"));
    // Fallback keeps provider order
    assert_eq!(seeds(&outcome.records), vec![Some(3), Some(9), Some(1)]);

    for call in harness.client.recorded_calls() {
        assert_eq!(call.active, vec![call.provider.clone()]);
        assert_eq!(call.query.limit, 30);
    }
}

#[tokio::test]
async fn test_fallback_from_start_provider_never_revisits() {
    let harness = TestHarness::new(&["A", "B", "C"]);

    let outcome = harness
        .orchestrator
        .search(
            &harness.request(30),
            &SearchMode::Fallback {
                start: Some("B".into()),
            },
        )
        .await
        .expect("Search should run");

    assert!(outcome.is_empty());
    assert_eq!(harness.client.call_order(), vec!["B", "A", "C"]);
    assert_eq!(outcome.attempts.len(), 3);
    assert!(outcome
        .attempts
        .iter()
        .all(|a| a.status == AttemptStatus::Empty));
}

#[tokio::test]
async fn test_fallback_start_outside_set_is_rejected() {
    let harness = TestHarness::new(&["A", "B"]);

    let result = harness
        .orchestrator
        .search(
            &harness.request(30),
            &SearchMode::Fallback {
                start: Some("Z".into()),
            },
        )
        .await;

    assert!(result.is_err());
    assert_eq!(harness.client.search_count(), 0);
}

#[tokio::test]
async fn test_failures_and_timeouts_fall_through() {
    let harness = TestHarness::new(&["A", "B", "C"]).with_timeout(Duration::from_millis(20));
    harness.client.fail_provider("A", "connection refused");
    harness
        .client
        .set_results("B", vec![fixtures::raw("slow", Some(1))]);
    harness.client.set_delay("B", Duration::from_millis(500));
    harness
        .client
        .set_results("C", vec![fixtures::raw("c1", Some(2))]);

    let outcome = harness
        .orchestrator
        .search(&harness.request(30), &SearchMode::Fallback { start: None })
        .await
        .expect("Search should run");

    assert_eq!(outcome.len(), 1);
    assert_eq!(outcome.records[0].title, "c1");
    assert!(matches!(
        outcome.attempts[0].status,
        AttemptStatus::Failed { .. }
    ));
    assert_eq!(outcome.attempts[1].status, AttemptStatus::TimedOut);
    assert_eq!(outcome.attempts[2].status, AttemptStatus::Found { count: 1 });
}

#[tokio::test]
async fn test_all_providers_splits_limit_and_ranks_by_seeds() {
    let harness = TestHarness::new(&["A", "B"]);
    harness.client.set_results(
        "A",
        vec![fixtures::raw("a10", Some(10)), fixtures::raw("a3", Some(3))],
    );
    harness.client.set_results(
        "B",
        vec![fixtures::raw("b5", Some(5)), fixtures::raw("b1", Some(1))],
    );

    let outcome = harness
        .orchestrator
        .search(&harness.request(10), &SearchMode::AllProviders)
        .await
        .expect("Search should run");

    assert_eq!(
        seeds(&outcome.records),
        vec![Some(10), Some(5), Some(3), Some(1)]
    );
    let calls = harness.client.recorded_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.query.limit == 5));
}

#[tokio::test]
async fn test_all_providers_isolates_activation_per_call() {
    let harness = TestHarness::new(&["A", "B", "C"]);
    for (provider, delay) in [("A", 30), ("B", 10), ("C", 20)] {
        harness
            .client
            .set_results(provider, vec![fixtures::raw(provider, Some(delay))]);
        harness
            .client
            .set_delay(provider, Duration::from_millis(delay as u64));
    }

    let outcome = harness
        .orchestrator
        .search(&harness.request(30), &SearchMode::AllProviders)
        .await
        .expect("Search should run");

    assert_eq!(outcome.len(), 3);
    for call in harness.client.recorded_calls() {
        assert_eq!(call.active, vec![call.provider.clone()]);
    }
    // Every record keeps the provider that actually answered
    for record in &outcome.records {
        assert_eq!(record.title, record.provider.as_str());
    }
}

#[tokio::test]
async fn test_all_providers_caps_rows_and_survives_failures() {
    let harness = TestHarness::new(&["A", "B", "C"]);
    harness.client.fail_provider("B", "HTTP 500");
    harness.client.set_results(
        "A",
        (0..10).map(|i| fixtures::raw(&format!("a{}", i), Some(i))).collect(),
    );
    harness.client.set_results(
        "C",
        (0..10)
            .map(|i| fixtures::raw(&format!("c{}", i), Some(100 + i)))
            .collect(),
    );

    let outcome = harness
        .orchestrator
        .search(&harness.request(5), &SearchMode::AllProviders)
        .await
        .expect("Search should run");

    // Each provider is capped at ceil(5 / 3) = 2 rows
    assert_eq!(outcome.len(), 4);
    assert!(outcome
        .records
        .windows(2)
        .all(|w| w[0].rank_seeds() >= w[1].rank_seeds()));
    assert!(matches!(
        outcome.attempts[1].status,
        AttemptStatus::Failed { .. }
    ));
}

#[tokio::test]
async fn test_all_providers_all_empty_is_not_found() {
    let harness = TestHarness::new(&["A", "B", "C"]);

    let outcome = harness
        .orchestrator
        .search(&harness.request(30), &SearchMode::AllProviders)
        .await
        .expect("Search should run");

    assert!(outcome.is_empty());
    assert_eq!(outcome.attempts.len(), 3);
    assert_eq!(harness.client.search_count(), 3);
}
