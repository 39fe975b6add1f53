use std::sync::Arc;
use tracing::debug;

use super::reconciler::{AiSubstitutionService, SubstitutionReconciler};
use super::rules::SubstitutionRuleTable;
use super::{SubstitutionOrigin, SubstitutionQuery, SubstitutionResult};

/// What the UI can offer for an ingredient before anything is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstitutionAvailability {
    pub rule_based_available: bool,
    pub ai_recommended: bool,
}

impl SubstitutionAvailability {
    // Both sources are worth offering, so the UI shows an AI toggle
    pub fn offers_ai_toggle(&self) -> bool {
        self.rule_based_available && self.ai_recommended
    }
}

/// Entry point for substitution lookups.
///
/// Rule-based answers are returned without touching the network unless AI is explicitly
/// requested. Otherwise the request goes through the `SubstitutionReconciler`.
#[derive(Clone)]
pub struct SubstitutionResolver {
    rules: Arc<SubstitutionRuleTable>,
    reconciler: SubstitutionReconciler,
}

impl SubstitutionResolver {
    pub fn new(rules: Arc<SubstitutionRuleTable>, service: Arc<dyn AiSubstitutionService>) -> Self {
        let reconciler = SubstitutionReconciler::new(Arc::clone(&rules), service);
        Self { rules, reconciler }
    }

    pub fn rules(&self) -> &SubstitutionRuleTable {
        &self.rules
    }

    /// AI is recommended for any non-blank name that is not an exact table key.
    /// Partial matches still count as "use AI".
    pub fn should_use_ai_substitution(&self, ingredient_name: &str) -> bool {
        !ingredient_name.trim().is_empty() && !self.rules.has_exact(ingredient_name)
    }

    pub fn availability(&self, ingredient_name: &str) -> SubstitutionAvailability {
        SubstitutionAvailability {
            rule_based_available: !self.rules.lookup(ingredient_name).is_empty(),
            ai_recommended: self.should_use_ai_substitution(ingredient_name),
        }
    }

    pub async fn resolve_query(&self, query: SubstitutionQuery) -> SubstitutionResult {
        self.resolve(&query.raw_ingredient_name, query.use_ai).await
    }

    pub async fn resolve(&self, ingredient_name: &str, want_ai: bool) -> SubstitutionResult {
        if ingredient_name.trim().is_empty() {
            return SubstitutionResult::empty();
        }

        let rule_based = self.rules.lookup(ingredient_name);
        if !rule_based.is_empty() && !want_ai {
            debug!(ingredient = ingredient_name, "answered from rule table");
            return SubstitutionResult::new(rule_based, SubstitutionOrigin::Rule);
        }

        if want_ai || self.should_use_ai_substitution(ingredient_name) {
            return self.reconciler.reconcile(ingredient_name, want_ai).await;
        }

        // Exact key with no candidates: nothing to ask the backend about
        SubstitutionResult::new(rule_based, SubstitutionOrigin::Rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_connection::ApiConnectionError;
    use crate::substitution::rules::{SubstitutionCandidate, SubstitutionRule};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        calls: AtomicUsize,
        last_use_ai: Mutex<Option<bool>>,
    }

    #[async_trait]
    impl AiSubstitutionService for RecordingService {
        async fn fetch_substitutions(&self, _: &str, use_ai: bool) -> Result<Value, ApiConnectionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_use_ai.lock().unwrap() = Some(use_ai);
            Ok(json!({ "substitutions": [{ "ingredient": "Remote Pick", "ratio": "1:1" }] }))
        }
    }

    fn resolver_with(table: SubstitutionRuleTable) -> (SubstitutionResolver, Arc<RecordingService>) {
        let service = Arc::new(RecordingService::default());
        let resolver = SubstitutionResolver::new(Arc::new(table), service.clone());
        (resolver, service)
    }

    #[tokio::test]
    async fn test_rule_hit_without_ai_makes_no_call() {
        let (resolver, service) = resolver_with(SubstitutionRuleTable::with_defaults());
        for name in ["butter", "Unsalted Butter", "egg", "brown sugar"] {
            let result = resolver.resolve(name, false).await;
            assert_eq!(result.origin, SubstitutionOrigin::Rule);
            assert!(!result.is_empty());
        }
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_name_is_empty_without_call() {
        let (resolver, service) = resolver_with(SubstitutionRuleTable::with_defaults());
        let result = resolver.resolve("   ", true).await;
        assert_eq!(result, SubstitutionResult::empty());
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_ingredient_goes_remote_without_ai_flag() {
        let (resolver, service) = resolver_with(SubstitutionRuleTable::with_defaults());
        let result = resolver.resolve("saffron", false).await;
        assert_eq!(result.origin, SubstitutionOrigin::Ai);
        assert_eq!(result.candidates[0].substitute_name, "Remote Pick");
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*service.last_use_ai.lock().unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_explicit_ai_request_goes_remote_even_with_rules() {
        let (resolver, service) = resolver_with(SubstitutionRuleTable::with_defaults());
        let result = resolver
            .resolve_query(SubstitutionQuery::new("butter", true))
            .await;
        assert_eq!(result.origin, SubstitutionOrigin::Ai);
        assert_eq!(*service.last_use_ai.lock().unwrap(), Some(true));
    }

    #[tokio::test]
    async fn test_exact_key_with_no_candidates_stays_local() {
        let table = SubstitutionRuleTable::from_rules(vec![SubstitutionRule {
            ingredient_key: "water".to_string(),
            candidates: Vec::new(),
        }]);
        let (resolver, service) = resolver_with(table);
        let result = resolver.resolve("water", false).await;
        assert!(result.is_empty());
        assert_eq!(result.origin, SubstitutionOrigin::Rule);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_should_use_ai_only_suppressed_by_exact_key() {
        let (resolver, _) = resolver_with(SubstitutionRuleTable::with_defaults());
        assert!(!resolver.should_use_ai_substitution("butter"));
        assert!(!resolver.should_use_ai_substitution(" MILK "));
        assert!(resolver.should_use_ai_substitution("unsalted butter"));
        assert!(resolver.should_use_ai_substitution("saffron"));
        assert!(!resolver.should_use_ai_substitution(""));
    }

    #[test]
    fn test_availability_flags() {
        let table = SubstitutionRuleTable::from_rules(vec![SubstitutionRule {
            ingredient_key: "butter".to_string(),
            candidates: vec![SubstitutionCandidate::new("Ghee", "1:1", "")],
        }]);
        let (resolver, _) = resolver_with(table);

        let partial = resolver.availability("salted butter");
        assert!(partial.rule_based_available && partial.ai_recommended);
        assert!(partial.offers_ai_toggle());

        let exact = resolver.availability("butter");
        assert!(exact.rule_based_available);
        assert!(!exact.offers_ai_toggle());

        let unknown = resolver.availability("yuzu");
        assert!(!unknown.rule_based_available && unknown.ai_recommended);
    }
}
