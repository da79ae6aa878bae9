use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{ApiError, ApiJson, AppState};
use crate::chat::{ask_assistant, ChatMessage};
use crate::models::{Recipe, RecipeCreate};

pub const API_KEY_HEADER: &str = "x-openai-key";

/// Routes mounted at /chat
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/respond", post(chat_with_assistant))
        .route("/recipes", post(save_chat_recipe))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub model: Option<String>,
    /// Store every returned suggestion through the recipe repository.
    ///
    /// Suggestions are saved one at a time. If a save fails, the ones stored
    /// before it stay stored and the request fails with a 500; their ids are
    /// logged.
    #[serde(default)]
    pub save_suggestions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(default)]
    pub suggestions: Vec<RecipeCreate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub saved: Vec<Recipe>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecipeSaveRequest {
    pub recipe: RecipeCreate,
}

// A non-empty header wins over the configured key even when it is only
// whitespace; the chosen key is trimmed afterwards, so that case is missing.
fn resolve_api_key(headers: &HeaderMap, configured: Option<&str>) -> Option<String> {
    let from_header = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|key| !key.is_empty());
    from_header
        .or(configured)
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

pub async fn chat_with_assistant(
    State(ctx): State<AppState>,
    headers: HeaderMap,
    ApiJson(chat_request): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let api_key = resolve_api_key(&headers, ctx.settings.openai_api_key.as_deref())
        .ok_or(ApiError::MissingApiKey)?;

    let reply = ask_assistant(
        &ctx.completions,
        &api_key,
        chat_request.model.as_deref(),
        &chat_request.messages,
    )
    .await?;

    let mut saved = Vec::new();
    if chat_request.save_suggestions {
        for suggestion in &reply.suggestions {
            match ctx.repository.create_recipe(suggestion.clone()).await {
                Ok(recipe) => saved.push(recipe),
                Err(err) => {
                    let saved_ids: Vec<_> = saved.iter().map(|recipe| recipe.id).collect();
                    error!(
                        saved = ?saved_ids,
                        "saving assistant suggestions stopped after {} of {}",
                        saved.len(),
                        reply.suggestions.len()
                    );
                    return Err(err.into());
                }
            }
        }
        info!(count = saved.len(), "saved assistant suggestions");
    }

    Ok(Json(ChatResponse {
        reply: reply.reply,
        suggestions: reply.suggestions,
        saved,
    }))
}

pub async fn save_chat_recipe(
    State(ctx): State<AppState>,
    ApiJson(request): ApiJson<ChatRecipeSaveRequest>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    let recipe_in = request.recipe.validate()?;
    let recipe = ctx.repository.create_recipe(recipe_in).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_resolve_api_key_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static(" sk-header "));
        assert_eq!(
            resolve_api_key(&headers, Some("sk-config")).as_deref(),
            Some("sk-header")
        );
    }

    #[test]
    fn test_resolve_api_key_falls_back_to_settings() {
        assert_eq!(
            resolve_api_key(&HeaderMap::new(), Some(" sk-config ")).as_deref(),
            Some("sk-config")
        );

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static(""));
        assert_eq!(
            resolve_api_key(&headers, Some("sk-config")).as_deref(),
            Some("sk-config")
        );
        assert_eq!(resolve_api_key(&HeaderMap::new(), Some("  ")), None);
        assert_eq!(resolve_api_key(&HeaderMap::new(), None), None);
    }

    #[test]
    fn test_resolve_api_key_whitespace_header_is_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("   "));
        assert_eq!(resolve_api_key(&headers, Some("sk-config")), None);
    }
}
