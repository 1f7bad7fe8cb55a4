use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use relay_core::messages::ConversationTurn;
use relay_core::responder::Responder;
use relay_core::security::{env_vars, ApiKey};
use relay_core::{MissingCredentialError, ResponderError};

use crate::auth;
use crate::converter::{self, GenerationOptions};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Settings for [`OpenAiResponder`].
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub model: String,
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub request_timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: env_vars::OPENAI_API_KEY.to_string(),
            temperature: None,
            max_tokens: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Responder backed by the OpenAI chat-completions endpoint.
pub struct OpenAiResponder {
    client: Client,
    api_key: ApiKey,
    model: String,
    endpoint: String,
    options: GenerationOptions,
}

impl OpenAiResponder {
    pub fn new(api_key: ApiKey, config: OpenAiConfig) -> Self {
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Self {
            client: Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(config.request_timeout)
                .build()
                .expect("failed to build HTTP client"),
            api_key,
            model: config.model,
            endpoint,
            options: GenerationOptions {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
        }
    }

    /// Build a responder, reading the API key from `config.api_key_env`.
    /// Fails before any request is made when the key is absent.
    pub fn from_env(config: OpenAiConfig) -> Result<Self, MissingCredentialError> {
        let api_key = auth::resolve_api_key(&config.api_key_env)?;
        Ok(Self::new(api_key, config))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Responder for OpenAiResponder {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, role, conversation), fields(model = %self.model, turns = conversation.len()))]
    async fn respond(
        &self,
        role: &str,
        conversation: &[ConversationTurn],
    ) -> Result<String, ResponderError> {
        let body = converter::build_request_body(&self.model, role, conversation, &self.options);

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.0.expose_secret())
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ResponderError::new(format!("network error: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ResponderError::new(format!("network error: {e}")))?;

        if !status.is_success() {
            return Err(converter::status_error(status.as_u16(), &text));
        }

        let content = converter::parse_completion(&text)?;
        debug!(chars = content.len(), "completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responder_properties() {
        let responder = OpenAiResponder::new(ApiKey::new("sk-test"), OpenAiConfig::default());
        assert_eq!(responder.name(), "openai");
        assert_eq!(responder.model(), "gpt-4o");
        assert_eq!(responder.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn trailing_slash_in_base_url() {
        let config = OpenAiConfig {
            base_url: "http://localhost:8080/v1/".into(),
            model: "local-model".into(),
            ..Default::default()
        };
        let responder = OpenAiResponder::new(ApiKey::new("k"), config);
        assert_eq!(responder.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(responder.model(), "local-model");
    }

    #[test]
    fn from_env_fails_without_credential() {
        let config = OpenAiConfig {
            api_key_env: "RELAY_TEST_NO_SUCH_KEY_7C21".into(),
            ..Default::default()
        };
        let err = OpenAiResponder::from_env(config).err().unwrap();
        assert_eq!(err.var, "RELAY_TEST_NO_SUCH_KEY_7C21");
    }

    #[tokio::test]
    async fn unreachable_host_is_responder_error() {
        let config = OpenAiConfig {
            base_url: "http://127.0.0.1:1".into(),
            request_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let responder = OpenAiResponder::new(ApiKey::new("k"), config);
        let err = responder
            .respond("role", &[ConversationTurn::user("hi")])
            .await
            .unwrap_err();
        assert!(err.message.starts_with("network error"), "got: {err}");
    }

    #[test]
    fn default_config_values() {
        let config = OpenAiConfig::default();
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.temperature.is_none());
    }
}
