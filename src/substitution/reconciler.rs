use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use super::rules::{SubstitutionCandidate, SubstitutionRuleTable};
use super::{SubstitutionNotice, SubstitutionOrigin, SubstitutionResult};
use crate::api_connection::endpoints::SUBSTITUTIONS_PATH;
use crate::api_connection::{ApiConnectionError, BackendClient};

// Field names the backend has been seen to use for each candidate attribute
const NAME_FIELDS: &[&str] = &["ingredient", "substitute", "name"];
const NOTE_FIELDS: &[&str] = &["note", "description"];

/// Remote substitution lookup. The backend decides whether to involve its AI model based on `use_ai`.
#[async_trait]
pub trait AiSubstitutionService: Send + Sync {
    async fn fetch_substitutions(
        &self,
        ingredient_name: &str,
        use_ai: bool,
    ) -> Result<Value, ApiConnectionError>;
}

#[async_trait]
impl AiSubstitutionService for BackendClient {
    async fn fetch_substitutions(
        &self,
        ingredient_name: &str,
        use_ai: bool,
    ) -> Result<Value, ApiConnectionError> {
        let use_ai = use_ai.to_string();
        let query = [("ingredient", ingredient_name), ("useAI", use_ai.as_str())];
        self.get_json(SUBSTITUTIONS_PATH, &query).await
    }
}

/// Pulls candidates out of a substitution response.
///
/// Accepts `{"substitutions": [...]}` or a bare array; anything else yields no candidates.
/// Entries without a usable name are dropped.
pub fn extract_candidates(response: &Value) -> Vec<SubstitutionCandidate> {
    let entries: &[Value] = match response {
        Value::Array(items) => items.as_slice(),
        Value::Object(object) => match object.get("substitutions") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    entries.iter().filter_map(candidate_from_value).collect()
}

fn candidate_from_value(value: &Value) -> Option<SubstitutionCandidate> {
    match value {
        Value::String(name) if !name.trim().is_empty() => Some(SubstitutionCandidate {
            substitute_name: name.trim().to_string(),
            ratio: String::new(),
            note: String::new(),
        }),
        Value::Object(object) => Some(SubstitutionCandidate {
            substitute_name: first_text(object, NAME_FIELDS)?,
            ratio: first_text(object, &["ratio"]).unwrap_or_default(),
            note: first_text(object, NOTE_FIELDS).unwrap_or_default(),
        }),
        _ => None,
    }
}

fn first_text(object: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match object.get(*field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Merges the remote answer with the rule table. Never fails: every path ends in a result.
#[derive(Clone)]
pub struct SubstitutionReconciler {
    rules: Arc<SubstitutionRuleTable>,
    service: Arc<dyn AiSubstitutionService>,
}

impl SubstitutionReconciler {
    pub fn new(rules: Arc<SubstitutionRuleTable>, service: Arc<dyn AiSubstitutionService>) -> Self {
        Self { rules, service }
    }

    pub async fn reconcile(&self, ingredient_name: &str, want_ai: bool) -> SubstitutionResult {
        // Kept in reserve in case the remote answer is empty or fails
        let rule_based = self.rules.lookup(ingredient_name);

        match self.service.fetch_substitutions(ingredient_name, want_ai).await {
            Ok(response) => {
                let remote = extract_candidates(&response);
                debug!(
                    ingredient = ingredient_name,
                    remote = remote.len(),
                    rule_based = rule_based.len(),
                    "substitution service answered"
                );
                if remote.is_empty() && !rule_based.is_empty() {
                    SubstitutionResult::new(rule_based, SubstitutionOrigin::RuleFallback)
                } else {
                    SubstitutionResult::new(remote, SubstitutionOrigin::Ai)
                }
            }
            Err(err) => {
                warn!(ingredient = ingredient_name, error = %err, "substitution service failed");
                if rule_based.is_empty() {
                    SubstitutionResult::new(Vec::new(), SubstitutionOrigin::RuleFallback)
                        .with_notice(SubstitutionNotice::NoneFound)
                } else {
                    SubstitutionResult::new(rule_based, SubstitutionOrigin::RuleFallback)
                        .with_notice(SubstitutionNotice::AiUnavailable)
                }
            }
        }
    }
}
