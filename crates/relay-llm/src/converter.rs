//! Conversion between relay turns and the OpenAI chat-completions wire format.

use relay_core::messages::ConversationTurn;
use relay_core::ResponderError;
use serde::Deserialize;
use serde_json::{json, Value};

/// Generation knobs forwarded to the API when set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationOptions {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// Build the request body. The role becomes a leading system message, followed
/// by the conversation in order.
pub fn build_request_body(
    model: &str,
    role: &str,
    conversation: &[ConversationTurn],
    options: &GenerationOptions,
) -> Value {
    let mut messages = Vec::with_capacity(conversation.len() + 1);
    if !role.is_empty() {
        messages.push(json!({ "role": "system", "content": role }));
    }
    for turn in conversation {
        messages.push(json!({ "role": turn.role.as_str(), "content": turn.content }));
    }

    let mut body = json!({
        "model": model,
        "messages": messages,
    });
    if let Some(t) = options.temperature {
        body["temperature"] = json!(t);
    }
    if let Some(m) = options.max_tokens {
        body["max_tokens"] = json!(m);
    }
    body
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Extract the first choice's text from a completion response body.
pub fn parse_completion(body: &str) -> Result<String, ResponderError> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| ResponderError::new(format!("malformed response: {e}")))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ResponderError::new("malformed response: no message content"))
}

/// Turn a non-success HTTP status into an opaque responder error. The API's
/// own error message is preferred over the raw body when present.
pub fn status_error(status: u16, body: &str) -> ResponderError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    if detail.is_empty() {
        ResponderError::new(format!("HTTP {status}"))
    } else {
        ResponderError::new(format!("HTTP {status}: {detail}"))
    }
}
