use std::sync::Arc;

use crate::api_connection::{ApiConnectionError, BackendClient};
use crate::chat::{render, ChatAssistant, ChatDocument};
use crate::config::ClientConfig;
use crate::recommendation::{
    RecommendationAggregator, RecommendationOutcome, RecommendationQuery, RecommendationSession,
};
use crate::substitution::{SubstitutionResolver, SubstitutionResult, SubstitutionRuleTable};

/// Everything a UI needs, wired to one backend client.
///
/// The rule table is shared read-only state; pass the same `Arc` to several
/// instances to avoid rebuilding it.
pub struct RecipeAssist {
    resolver: SubstitutionResolver,
    recommendations: RecommendationSession,
    chat: ChatAssistant,
}

impl RecipeAssist {
    pub fn new(config: &ClientConfig, rules: Arc<SubstitutionRuleTable>) -> Result<Self, ApiConnectionError> {
        let client = BackendClient::new(config)?;
        Ok(Self::with_client(client, rules))
    }

    pub fn with_client(client: BackendClient, rules: Arc<SubstitutionRuleTable>) -> Self {
        let shared = Arc::new(client.clone());
        Self {
            resolver: SubstitutionResolver::new(rules, shared.clone()),
            recommendations: RecommendationSession::new(RecommendationAggregator::new(shared)),
            chat: ChatAssistant::new(client),
        }
    }

    pub fn resolver(&self) -> &SubstitutionResolver {
        &self.resolver
    }

    pub fn chat(&self) -> &ChatAssistant {
        &self.chat
    }

    pub async fn resolve_substitutions(&self, ingredient_name: &str, use_ai: bool) -> SubstitutionResult {
        self.resolver.resolve(ingredient_name, use_ai).await
    }

    pub async fn fetch_recommendations(&self, query: &RecommendationQuery) -> RecommendationOutcome {
        self.recommendations.aggregator().fetch(query).await
    }

    /// Like `fetch_recommendations`, for callers that switch sources while a fetch is in flight.
    /// `None` means a later call superseded this one before it finished.
    pub async fn fetch_latest_recommendations(
        &self,
        query: &RecommendationQuery,
    ) -> Option<RecommendationOutcome> {
        self.recommendations.fetch(query).await
    }

    pub fn render_chat_message(&self, text: &str) -> ChatDocument {
        render(text)
    }
}
