pub mod reconciler;
pub mod resolver;
pub mod rules;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use reconciler::{extract_candidates, AiSubstitutionService, SubstitutionReconciler};
pub use resolver::{SubstitutionAvailability, SubstitutionResolver};
pub use rules::{
    normalize_ingredient_name, SubstitutionCandidate, SubstitutionRule, SubstitutionRuleTable,
};

/// A single substitution request, consumed by `SubstitutionResolver::resolve_query`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionQuery {
    pub raw_ingredient_name: String,
    pub use_ai: bool,
}

impl SubstitutionQuery {
    pub fn new(raw_ingredient_name: impl Into<String>, use_ai: bool) -> Self {
        Self {
            raw_ingredient_name: raw_ingredient_name.into(),
            use_ai,
        }
    }
}

/// Where a result came from. Only used for labeling in the UI.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SubstitutionOrigin {
    Rule,
    Ai,
    RuleFallback,
}

impl fmt::Display for SubstitutionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubstitutionOrigin::Rule => "rule",
            SubstitutionOrigin::Ai => "ai",
            SubstitutionOrigin::RuleFallback => "rule-fallback",
        };
        f.write_str(label)
    }
}

/// Non-blocking message the UI may show next to a degraded result.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionNotice {
    AiUnavailable,
    NoneFound,
}

impl SubstitutionNotice {
    pub fn message(&self) -> &'static str {
        match self {
            SubstitutionNotice::AiUnavailable => "Using rule-based substitutions (AI unavailable)",
            SubstitutionNotice::NoneFound => "No substitutions found for this ingredient",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SubstitutionResult {
    pub candidates: Vec<SubstitutionCandidate>,
    pub origin: SubstitutionOrigin,
    pub notice: Option<SubstitutionNotice>,
}

impl SubstitutionResult {
    pub fn new(candidates: Vec<SubstitutionCandidate>, origin: SubstitutionOrigin) -> Self {
        Self {
            candidates,
            origin,
            notice: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), SubstitutionOrigin::Rule)
    }

    pub fn with_notice(mut self, notice: SubstitutionNotice) -> Self {
        self.notice = Some(notice);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
