/// Invalid pipeline definition. Always raised before any stage executes.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("pipeline has no stages")]
    EmptyPipeline,
    #[error("stage name must not be empty")]
    EmptyStageName,
    #[error("duplicate stage name: {0}")]
    DuplicateStageName(String),
    #[error("stage {stage} has empty instructions")]
    EmptyInstructions { stage: String },
    #[error("handoff template for stage {stage} is missing the {{input}} placeholder")]
    HandoffMissingInput { stage: String },
    #[error("seed prompt must not be empty")]
    EmptySeedPrompt,
}

impl ConfigError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::EmptyPipeline => "empty_pipeline",
            Self::EmptyStageName => "empty_stage_name",
            Self::DuplicateStageName(_) => "duplicate_stage_name",
            Self::EmptyInstructions { .. } => "empty_instructions",
            Self::HandoffMissingInput { .. } => "handoff_missing_input",
            Self::EmptySeedPrompt => "empty_seed_prompt",
        }
    }
}

/// A single generation call failed. Transport, auth, rate-limit and malformed
/// responses all collapse into this one opaque category.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ResponderError {
    pub message: String,
}

impl ResponderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The responder could not be constructed because its credential is absent.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{var} is not set in environment variables")]
pub struct MissingCredentialError {
    pub var: String,
}

impl MissingCredentialError {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}
