use serde::{Deserialize, Serialize};

// Paths are relative to the configured API url
pub const SUBSTITUTIONS_PATH: &str = "recipes/substitutions";
pub const RECOMMENDATIONS_PATH: &str = "recipes/recommendations";
pub const HISTORY_RECOMMENDATIONS_PATH: &str = "recipes/recommendations/history";
pub const PREFERENCE_RECOMMENDATIONS_PATH: &str = "recipes/recommendations/preferences";
pub const TRENDING_RECOMMENDATIONS_PATH: &str = "recipes/recommendations/trending";
pub const RECIPE_SUGGESTIONS_PATH: &str = "ai-chat/recipe-suggestions";
pub const GENERAL_CHAT_PATH: &str = "ai-chat/general-chat";
pub const QUICK_SUGGESTIONS_PATH: &str = "ai-chat/quick-suggestions";

pub const RECIPE_SUGGESTION_CHAT_TYPE: &str = "recipe_suggestion";
pub const GENERAL_CHAT_TYPE: &str = "general_chat";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSuggestionRequest {
    pub ingredients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,
    pub dietary_restrictions: Vec<String>,
    pub chat_type: String,
}

impl RecipeSuggestionRequest {
    pub fn new(ingredients: Vec<String>) -> Self {
        Self {
            ingredients,
            meal_type: None,
            dietary_restrictions: Vec::new(),
            chat_type: RECIPE_SUGGESTION_CHAT_TYPE.to_string(),
        }
    }

    pub fn with_meal_type(mut self, meal_type: impl Into<String>) -> Self {
        self.meal_type = Some(meal_type.into());
        self
    }

    pub fn with_dietary_restrictions(mut self, restrictions: Vec<String>) -> Self {
        self.dietary_restrictions = restrictions;
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneralChatRequest {
    pub message: String,
    pub chat_type: String,
}

impl GeneralChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            chat_type: GENERAL_CHAT_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSuggestion {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default)]
    pub message: String,
    // The backend sends null here when it has nothing to suggest
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recipe_suggestions: Vec<RecipeSuggestion>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
