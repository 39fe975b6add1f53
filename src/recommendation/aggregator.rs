use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::{
    EmptyReason, PreferenceFilter, RecipeSummary, RecommendationOutcome, RecommendationQuery,
    RecommendationSource,
};
use crate::api_connection::endpoints::{
    HISTORY_RECOMMENDATIONS_PATH, PREFERENCE_RECOMMENDATIONS_PATH, RECOMMENDATIONS_PATH,
    TRENDING_RECOMMENDATIONS_PATH,
};
use crate::api_connection::{ApiConnectionError, BackendClient};

/// The four recommendation endpoints. Each returns the raw, not yet normalized, response.
#[async_trait]
pub trait RecommendationBackend: Send + Sync {
    async fn personalized(&self, limit: usize) -> Result<Value, ApiConnectionError>;
    async fn by_history(&self, limit: usize) -> Result<Value, ApiConnectionError>;
    async fn by_preferences(
        &self,
        preferences: &PreferenceFilter,
        limit: usize,
    ) -> Result<Value, ApiConnectionError>;
    async fn trending(&self, limit: usize) -> Result<Value, ApiConnectionError>;
}

#[async_trait]
impl RecommendationBackend for BackendClient {
    async fn personalized(&self, limit: usize) -> Result<Value, ApiConnectionError> {
        let query = [("type", "personalized".to_string()), ("limit", limit.to_string())];
        self.get_json(RECOMMENDATIONS_PATH, &query).await
    }

    async fn by_history(&self, limit: usize) -> Result<Value, ApiConnectionError> {
        self.get_json(HISTORY_RECOMMENDATIONS_PATH, &[("limit", limit.to_string())])
            .await
    }

    async fn by_preferences(
        &self,
        preferences: &PreferenceFilter,
        limit: usize,
    ) -> Result<Value, ApiConnectionError> {
        let mut query: Vec<(String, String)> = preferences
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        query.push(("limit".to_string(), limit.to_string()));
        self.get_json(PREFERENCE_RECOMMENDATIONS_PATH, &query).await
    }

    async fn trending(&self, limit: usize) -> Result<Value, ApiConnectionError> {
        self.get_json(TRENDING_RECOMMENDATIONS_PATH, &[("limit", limit.to_string())])
            .await
    }
}

/// Turns any recommendation response into a flat list.
///
/// Bare arrays are used as-is; objects use their `content` field when it is set,
/// otherwise the object itself counts as one entry. `null` and scalars give nothing.
pub fn normalize_envelope(response: Value) -> Vec<RecipeSummary> {
    match response {
        Value::Array(items) => items.into_iter().map(RecipeSummary).collect(),
        Value::Object(mut object) => match object.remove("content") {
            Some(Value::Array(items)) => items.into_iter().map(RecipeSummary).collect(),
            Some(Value::Object(inner)) => vec![RecipeSummary(Value::Object(inner))],
            _ => vec![RecipeSummary(Value::Object(object))],
        },
        _ => Vec::new(),
    }
}

/// Dispatches a query to the right source and classifies the result. Single attempt, no retries.
#[derive(Clone)]
pub struct RecommendationAggregator {
    backend: Arc<dyn RecommendationBackend>,
}

impl RecommendationAggregator {
    pub fn new(backend: Arc<dyn RecommendationBackend>) -> Self {
        Self { backend }
    }

    pub async fn fetch(&self, query: &RecommendationQuery) -> RecommendationOutcome {
        debug!(
            source = %query.source,
            limit = query.limit,
            context_recipe = query.context_recipe_id.as_deref().unwrap_or("-"),
            "fetching recommendations"
        );

        let response = match query.source {
            RecommendationSource::History => self.backend.by_history(query.limit).await,
            RecommendationSource::Preferences => {
                self.backend
                    .by_preferences(&query.preferences, query.limit)
                    .await
            }
            RecommendationSource::Trending => self.backend.trending(query.limit).await,
            RecommendationSource::Personalized => self.backend.personalized(query.limit).await,
        };

        match response {
            Ok(body) => classify_items(query.source, normalize_envelope(body)),
            Err(err) => classify_error(query.source, &err),
        }
    }
}

fn classify_items(source: RecommendationSource, items: Vec<RecipeSummary>) -> RecommendationOutcome {
    if !items.is_empty() {
        return RecommendationOutcome::Success { items };
    }

    let reason = match source {
        RecommendationSource::History => {
            info!("no recipes in viewing history yet");
            EmptyReason::NoHistory
        }
        RecommendationSource::Preferences => EmptyReason::NoPreferences,
        _ => EmptyReason::None,
    };
    RecommendationOutcome::Empty { reason }
}

fn classify_error(source: RecommendationSource, err: &ApiConnectionError) -> RecommendationOutcome {
    // 401 only has its own state for history, other sources report a plain failure
    if source == RecommendationSource::History && err.is_unauthorized() {
        info!("history recommendations need an authenticated session");
        return RecommendationOutcome::Unauthorized;
    }

    error!(source = %source, error = %err, "recommendation request failed");
    RecommendationOutcome::Failure {
        message: source.failure_message().to_string(),
    }
}
