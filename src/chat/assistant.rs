use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::connection::{ApiConnectionError, CompletionClient};
use super::endpoints::{
    ChatCompletionRequest, ChatMessage, JsonSchema, JsonSchemaDefinition, ResponseFormat,
};
use crate::models::RecipeCreate;

pub const MAX_SUGGESTIONS: usize = 3;

pub const SYSTEM_PROMPT: &str = "You are KitchenPal, a helpful culinary assistant. \
Always respond with a JSON object that contains a short natural-language \"reply\" and \
a \"suggestions\" array with up to three structured recipes. Each recipe has a \"title\", \
an optional \"description\", and non-empty \"ingredients\" and \"steps\" arrays of strings, \
plus a \"tags\" array. The reply should summarize what you created or how you improved \
an incoming recipe. The JSON object must be the only content in your response.";

/// What the assistant said, with only the suggestions that pass recipe validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub reply: String,
    #[serde(default)]
    pub suggestions: Vec<RecipeCreate>,
}

#[derive(Debug, Deserialize)]
struct RawReply {
    reply: String,
    #[serde(default)]
    suggestions: Vec<serde_json::Value>,
}

fn reply_schema() -> JsonSchemaDefinition {
    let strings = |description: &str| JsonSchema::array(description, JsonSchema::string("One item."));

    let mut recipe = JsonSchema::object(vec![
        ("title", JsonSchema::string("Recipe title, at most 100 characters.")),
        ("description", JsonSchema::string("Optional short description.")),
        ("ingredients", strings("Ingredients, one per item.")),
        ("steps", strings("Preparation steps in order.")),
        ("tags", strings("Short tags such as 'quick' or 'vegetarian'.")),
    ]);
    recipe.required.retain(|field| field != "description");

    JsonSchemaDefinition {
        name: "kitchen_pal_reply".to_string(),
        strict: Some(false),
        schema: JsonSchema::object(vec![
            ("reply", JsonSchema::string("Short natural-language answer.")),
            ("suggestions", JsonSchema::array("Up to three recipes.", recipe)),
        ]),
    }
}

/// Prepends the system prompt to the caller's conversation.
pub fn build_request(model: &str, messages: &[ChatMessage]) -> ChatCompletionRequest {
    let mut conversation = Vec::with_capacity(messages.len() + 1);
    conversation.push(ChatMessage::system(SYSTEM_PROMPT));
    conversation.extend(messages.iter().cloned());

    ChatCompletionRequest {
        model: model.to_string(),
        messages: conversation,
        response_format: Some(ResponseFormat {
            format_type: "json_schema".to_string(),
            json_schema: Some(reply_schema()),
        }),
        temperature: None,
        max_tokens: None,
    }
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.ends_with("```") {
        return trimmed;
    }
    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    inner.trim_end_matches("```").trim()
}

/// Decodes a completion's text. Invalid suggestions are dropped, and at most
/// [`MAX_SUGGESTIONS`] are kept.
pub fn parse_assistant_reply(content: &str) -> Result<AssistantReply, ApiConnectionError> {
    let content = strip_code_fences(content);
    if content.is_empty() {
        return Err(ApiConnectionError::EmptyCompletion(
            "content is empty".to_string(),
        ));
    }
    let raw: RawReply = serde_json::from_str(content)?;

    let mut suggestions = Vec::new();
    for (index, value) in raw.suggestions.into_iter().enumerate() {
        let checked = serde_json::from_value::<RecipeCreate>(value)
            .map_err(|e| e.to_string())
            .and_then(|recipe| recipe.validate().map_err(|e| e.to_string()));
        match checked {
            Ok(recipe) if suggestions.len() < MAX_SUGGESTIONS => suggestions.push(recipe),
            Ok(recipe) => debug!(title = %recipe.title, "dropping suggestion beyond limit"),
            Err(reason) => warn!(index, %reason, "dropping invalid recipe suggestion"),
        }
    }

    Ok(AssistantReply {
        reply: raw.reply,
        suggestions,
    })
}

/// Sends the conversation to the completion API and decodes the first choice.
pub async fn ask_assistant(
    client: &CompletionClient,
    api_key: &str,
    model: Option<&str>,
    messages: &[ChatMessage],
) -> Result<AssistantReply, ApiConnectionError> {
    let model = model.unwrap_or(client.default_model());
    let request = build_request(model, messages);
    let response = client.call_chat_completion(api_key, &request).await?;

    let Some(choice) = response.choices.into_iter().next() else {
        return Err(ApiConnectionError::EmptyCompletion(
            "no choices in response".to_string(),
        ));
    };
    let content = choice.message.content.ok_or_else(|| {
        ApiConnectionError::EmptyCompletion(format!(
            "choice has no content (finish reason: {})",
            choice.finish_reason.as_deref().unwrap_or("unknown")
        ))
    })?;
    debug!(model = %response.model, "assistant replied");
    parse_assistant_reply(&content)
}
