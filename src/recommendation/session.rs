use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::aggregator::RecommendationAggregator;
use super::{RecommendationOutcome, RecommendationQuery};

/// Generation stamp handed out by `LatestQueryGate::begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket(u64);

/// "Latest query wins" bookkeeping. Each `begin` supersedes every ticket issued before it.
#[derive(Debug, Default)]
pub struct LatestQueryGate {
    generation: AtomicU64,
}

impl LatestQueryGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> QueryTicket {
        QueryTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }
}

/// Aggregator plus a gate, for callers that switch sources faster than responses arrive.
pub struct RecommendationSession {
    aggregator: RecommendationAggregator,
    gate: LatestQueryGate,
}

impl RecommendationSession {
    pub fn new(aggregator: RecommendationAggregator) -> Self {
        Self {
            aggregator,
            gate: LatestQueryGate::new(),
        }
    }

    pub fn aggregator(&self) -> &RecommendationAggregator {
        &self.aggregator
    }

    /// Returns `None` when a newer query was started while this one was in flight.
    pub async fn fetch(&self, query: &RecommendationQuery) -> Option<RecommendationOutcome> {
        let ticket = self.gate.begin();
        let outcome = self.aggregator.fetch(query).await;
        if self.gate.is_current(ticket) {
            Some(outcome)
        } else {
            debug!(source = %query.source, "dropping superseded recommendation outcome");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_connection::ApiConnectionError;
    use crate::recommendation::{PreferenceFilter, RecommendationBackend, RecommendationSource};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// History blocks until released; every other source answers immediately.
    struct GatedBackend {
        release_history: Notify,
    }

    #[async_trait]
    impl RecommendationBackend for GatedBackend {
        async fn personalized(&self, _: usize) -> Result<Value, ApiConnectionError> {
            Ok(json!([{ "id": "p1" }]))
        }
        async fn by_history(&self, _: usize) -> Result<Value, ApiConnectionError> {
            self.release_history.notified().await;
            Ok(json!([{ "id": "h1" }]))
        }
        async fn by_preferences(&self, _: &PreferenceFilter, _: usize) -> Result<Value, ApiConnectionError> {
            Ok(json!([]))
        }
        async fn trending(&self, _: usize) -> Result<Value, ApiConnectionError> {
            Ok(json!([{ "id": "t1" }]))
        }
    }

    #[test]
    fn test_gate_only_honours_newest_ticket() {
        let gate = LatestQueryGate::new();
        let first = gate.begin();
        assert!(gate.is_current(first));
        let second = gate.begin();
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
    }

    #[tokio::test]
    async fn test_stale_outcome_is_dropped() {
        let backend = Arc::new(GatedBackend {
            release_history: Notify::new(),
        });
        let session = RecommendationSession::new(RecommendationAggregator::new(backend.clone()));
        let history = RecommendationQuery::new(RecommendationSource::History, 8).unwrap();
        let trending = RecommendationQuery::new(RecommendationSource::Trending, 8).unwrap();

        let (stale, fresh) = tokio::join!(session.fetch(&history), async {
            let fresh = session.fetch(&trending).await;
            backend.release_history.notify_one();
            fresh
        });

        assert_eq!(stale, None);
        let fresh = fresh.expect("newest query should be delivered");
        assert_eq!(fresh.items()[0].id().as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_ungated_fetch_always_returns_outcome() {
        let backend = Arc::new(GatedBackend {
            release_history: Notify::new(),
        });
        let session = RecommendationSession::new(RecommendationAggregator::new(backend.clone()));
        let history = RecommendationQuery::new(RecommendationSource::History, 8).unwrap();
        let trending = RecommendationQuery::new(RecommendationSource::Trending, 8).unwrap();

        let (plain, fresh) = tokio::join!(session.aggregator().fetch(&history), async {
            let fresh = session.fetch(&trending).await;
            backend.release_history.notify_one();
            fresh
        });

        assert_eq!(plain.items()[0].id().as_deref(), Some("h1"));
        assert!(fresh.is_some());
    }

    #[tokio::test]
    async fn test_single_query_is_delivered() {
        let backend = Arc::new(GatedBackend {
            release_history: Notify::new(),
        });
        let session = RecommendationSession::new(RecommendationAggregator::new(backend));
        let query = RecommendationQuery::new(RecommendationSource::Personalized, 4).unwrap();
        let outcome = session.fetch(&query).await.unwrap();
        assert_eq!(outcome.items().len(), 1);
    }
}
