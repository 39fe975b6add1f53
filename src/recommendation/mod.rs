pub mod aggregator;
pub mod session;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub use aggregator::{normalize_envelope, RecommendationAggregator, RecommendationBackend};
pub use session::{LatestQueryGate, QueryTicket, RecommendationSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    #[default]
    Personalized,
    History,
    Preferences,
    Trending,
}

impl RecommendationSource {
    pub const ALL: [RecommendationSource; 4] = [
        RecommendationSource::Personalized,
        RecommendationSource::History,
        RecommendationSource::Preferences,
        RecommendationSource::Trending,
    ];

    /// Unknown selectors fall back to `Personalized`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "history" => RecommendationSource::History,
            "preferences" => RecommendationSource::Preferences,
            "trending" => RecommendationSource::Trending,
            _ => RecommendationSource::Personalized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationSource::Personalized => "personalized",
            RecommendationSource::History => "history",
            RecommendationSource::Preferences => "preferences",
            RecommendationSource::Trending => "trending",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecommendationSource::Personalized => "For You",
            RecommendationSource::History => "Based on History",
            RecommendationSource::Preferences => "Your Preferences",
            RecommendationSource::Trending => "Trending Now",
        }
    }

    // Shown instead of the raw transport error
    pub fn failure_message(&self) -> &'static str {
        match self {
            RecommendationSource::History => "Failed to load your viewing history",
            RecommendationSource::Preferences => "Failed to load recommendations for your preferences",
            RecommendationSource::Trending => "Failed to load trending recipes",
            RecommendationSource::Personalized => "Failed to load recommendations",
        }
    }
}

impl fmt::Display for RecommendationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend recipe record. Passed through untouched apart from a few convenience accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeSummary(pub Value);

impl RecipeSummary {
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get("description").and_then(Value::as_str)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }
}

/// Extra query parameters for the preferences source. Empty by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceFilter(pub BTreeMap<String, String>);

impl PreferenceFilter {
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("recommendation limit must be greater than zero")]
    ZeroLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationQuery {
    pub source: RecommendationSource,
    pub limit: usize,
    pub context_recipe_id: Option<String>,
    pub preferences: PreferenceFilter,
}

impl RecommendationQuery {
    pub fn new(source: RecommendationSource, limit: usize) -> Result<Self, QueryError> {
        if limit == 0 {
            return Err(QueryError::ZeroLimit);
        }
        Ok(Self {
            source,
            limit,
            context_recipe_id: None,
            preferences: PreferenceFilter::default(),
        })
    }

    pub fn with_context_recipe(mut self, recipe_id: impl Into<String>) -> Self {
        self.context_recipe_id = Some(recipe_id.into());
        self
    }

    pub fn with_preferences(mut self, preferences: PreferenceFilter) -> Self {
        self.preferences = preferences;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    NoHistory,
    NoPreferences,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecommendationOutcome {
    Success { items: Vec<RecipeSummary> },
    Empty { reason: EmptyReason },
    Unauthorized,
    Failure { message: String },
}

impl RecommendationOutcome {
    pub fn items(&self) -> &[RecipeSummary] {
        match self {
            RecommendationOutcome::Success { items } => items,
            _ => &[],
        }
    }

    /// Text for the empty/error state. `None` when there are items to show.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            RecommendationOutcome::Success { .. } => None,
            RecommendationOutcome::Empty { reason } => Some(match reason {
                EmptyReason::NoHistory => {
                    "No viewing history found. Click on some recipes first to see them in your history!"
                }
                EmptyReason::NoPreferences => {
                    "No preferences set. Go to your profile to set dietary preferences!"
                }
                EmptyReason::None => "No recommendations available at the moment.",
            }),
            RecommendationOutcome::Unauthorized => Some("Please log in to see your viewing history"),
            RecommendationOutcome::Failure { message } => Some(message.as_str()),
        }
    }
}
