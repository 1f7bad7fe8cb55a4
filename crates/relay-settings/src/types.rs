//! Settings type definitions.
//!
//! Field names are camelCase in JSON. Every section implements [`Default`],
//! and `#[serde(default)]` lets a settings file specify only what it changes.

use relay_core::{validate_stages, ConfigError, Stage, StageSpec};
use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;

/// Root settings type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelaySettings {
    pub responder: ResponderSettings,
    pub pipeline: PipelineSettings,
    pub logging: LoggingSettings,
}

impl RelaySettings {
    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.responder.model.trim().is_empty() {
            return Err(SettingsError::InvalidValue("responder.model is empty".into()));
        }
        if !(1..=3600).contains(&self.responder.timeout_secs) {
            return Err(SettingsError::InvalidValue(format!(
                "responder.timeoutSecs must be between 1 and 3600, got {}",
                self.responder.timeout_secs
            )));
        }
        if self.responder.api_key_env.trim().is_empty() {
            return Err(SettingsError::InvalidValue("responder.apiKeyEnv is empty".into()));
        }
        if self.pipeline.seed_prompt.trim().is_empty() {
            return Err(ConfigError::EmptySeedPrompt.into());
        }
        Ok(())
    }
}

/// Text-generation backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponderSettings {
    pub model: String,
    pub base_url: String,
    /// Name of the environment variable that holds the API key.
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: None,
            max_tokens: None,
            timeout_secs: 120,
        }
    }
}

/// The stage chain and the prompt that starts it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSettings {
    pub seed_prompt: String,
    pub stages: Vec<StageSpec>,
}

impl PipelineSettings {
    /// Validate and convert the configured stages.
    pub fn build_stages(&self) -> Result<Vec<Stage>, ConfigError> {
        let stages = self
            .stages
            .iter()
            .cloned()
            .map(Stage::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        validate_stages(&stages)?;
        Ok(stages)
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            seed_prompt: DEFAULT_SEED_PROMPT.to_string(),
            stages: default_stages(),
        }
    }
}

pub const DEFAULT_SEED_PROMPT: &str = "As the CEO, I need an analysis of the current US automobile market trends to inform our new car model development.";

/// Market analysis, then product recommendations, then the launch strategy.
pub fn default_stages() -> Vec<StageSpec> {
    vec![
        StageSpec::new(
            "MarketTrendsAnalyst",
            "Analyze current market trends in the US automobile industry, focusing on consumer preferences, emerging technologies, and competitor offerings.",
        )
        .with_handoff("{input}"),
        StageSpec::new(
            "ProductDevelopmentConsultant",
            "Based on market trends, recommend features, specifications, and design elements for a new car model that will appeal to US consumers.",
        )
        .with_handoff("Based on the market trends analysis: {input}, what features and specifications should our new car model have to succeed in the US market?"),
        StageSpec::new(
            "LaunchStrategyAdvisor",
            "Develop a launch strategy for the new car model, considering the recommended features and current market conditions.",
        )
        .with_handoff("Given the recommended features and specifications: {input}, develop a marketing and launch strategy for the US market."),
    ]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// tracing level name; RUST_LOG still wins when set.
    pub level: String,
    /// JSON-formatted diagnostic logs.
    pub json: bool,
    /// Plain-text stage log. An empty string in the settings file disables it.
    pub log_file: Option<String>,
    /// SQLite database for stage results. Off unless a path is given.
    pub results_db: Option<String>,
    /// Print each stage's response to stdout.
    pub console: bool,
}

impl LoggingSettings {
    /// Turn blank paths into `None`. A `null` in the file is skipped by the
    /// merge, so `""` is how a file switches a default path off.
    pub fn clear_blank_paths(&mut self) {
        for path in [&mut self.log_file, &mut self.results_db] {
            if path.as_deref().is_some_and(|p| p.trim().is_empty()) {
                *path = None;
            }
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_file: Some("agent_logs.log".to_string()),
            results_db: None,
            console: true,
        }
    }
}
