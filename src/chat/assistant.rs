use tracing::{debug, warn};

use super::renderer::{render, ChatDocument};
use crate::api_connection::endpoints::{
    ChatResponse, GeneralChatRequest, RecipeSuggestion, RecipeSuggestionRequest, GENERAL_CHAT_PATH,
    QUICK_SUGGESTIONS_PATH, RECIPE_SUGGESTIONS_PATH,
};
use crate::api_connection::{ApiConnectionError, BackendClient};

/// Rendered assistant answer plus any structured recipe suggestions that came with it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub document: ChatDocument,
    pub suggestions: Vec<RecipeSuggestion>,
}

impl From<ChatResponse> for AssistantReply {
    fn from(response: ChatResponse) -> Self {
        Self {
            document: render(&response.message),
            suggestions: response.recipe_suggestions,
        }
    }
}

/// Client for the AI chat endpoints. Errors are returned as-is; wording an apology is up to the caller.
#[derive(Debug, Clone)]
pub struct ChatAssistant {
    client: BackendClient,
}

impl ChatAssistant {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub async fn recipe_suggestions(
        &self,
        request: &RecipeSuggestionRequest,
    ) -> Result<AssistantReply, ApiConnectionError> {
        debug!(ingredients = request.ingredients.len(), "requesting recipe suggestions");
        let value = self.client.post_json(RECIPE_SUGGESTIONS_PATH, request).await?;
        decode_reply(value)
    }

    pub async fn general_chat(&self, message: &str) -> Result<AssistantReply, ApiConnectionError> {
        let value = self
            .client
            .post_json(GENERAL_CHAT_PATH, &GeneralChatRequest::new(message))
            .await?;
        decode_reply(value)
    }

    pub async fn quick_suggestions(
        &self,
        ingredients: &str,
        meal_type: Option<&str>,
        dietary: Option<&str>,
    ) -> Result<AssistantReply, ApiConnectionError> {
        let mut query = vec![("ingredients", ingredients)];
        if let Some(meal_type) = meal_type {
            query.push(("mealType", meal_type));
        }
        if let Some(dietary) = dietary {
            query.push(("dietary", dietary));
        }
        let value = self.client.get_json(QUICK_SUGGESTIONS_PATH, &query).await?;
        decode_reply(value)
    }
}

fn decode_reply(value: serde_json::Value) -> Result<AssistantReply, ApiConnectionError> {
    let response: ChatResponse = serde_json::from_value(value).map_err(|err| {
        warn!(error = %err, "chat response did not match the expected shape");
        ApiConnectionError::SerializationError(err)
    })?;
    Ok(response.into())
}
