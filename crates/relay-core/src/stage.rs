use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Placeholder a handoff template must contain.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Optional placeholder substituted with the previous stage's name.
pub const PREVIOUS_STAGE_PLACEHOLDER: &str = "{previous_stage}";

/// Unvalidated stage definition as it appears in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    pub name: String,
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff: Option<String>,
}

impl StageSpec {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            handoff: None,
        }
    }

    pub fn with_handoff(mut self, template: impl Into<String>) -> Self {
        self.handoff = Some(template.into());
        self
    }
}

/// One step of a pipeline: a name plus the instructions handed to the
/// responder as its role. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StageSpec", into = "StageSpec")]
pub struct Stage {
    name: String,
    instructions: String,
    handoff: Option<String>,
}

impl Stage {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        let instructions = instructions.into();

        if name.trim().is_empty() {
            return Err(ConfigError::EmptyStageName);
        }
        if instructions.trim().is_empty() {
            return Err(ConfigError::EmptyInstructions { stage: name });
        }

        Ok(Self {
            name,
            instructions,
            handoff: None,
        })
    }

    /// Attach a prompt template used to frame the incoming output for this stage.
    pub fn with_handoff(mut self, template: impl Into<String>) -> Result<Self, ConfigError> {
        let template = template.into();
        if !template.contains(INPUT_PLACEHOLDER) {
            return Err(ConfigError::HandoffMissingInput { stage: self.name });
        }
        self.handoff = Some(template);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn handoff(&self) -> Option<&str> {
        self.handoff.as_deref()
    }
}

impl TryFrom<StageSpec> for Stage {
    type Error = ConfigError;

    fn try_from(spec: StageSpec) -> Result<Self, Self::Error> {
        let stage = Stage::new(spec.name, spec.instructions)?;
        match spec.handoff {
            Some(template) => stage.with_handoff(template),
            None => Ok(stage),
        }
    }
}

impl From<Stage> for StageSpec {
    fn from(stage: Stage) -> Self {
        Self {
            name: stage.name,
            instructions: stage.instructions,
            handoff: stage.handoff,
        }
    }
}

/// Check pipeline-level constraints: at least one stage, unique names.
pub fn validate_stages(stages: &[Stage]) -> Result<(), ConfigError> {
    if stages.is_empty() {
        return Err(ConfigError::EmptyPipeline);
    }

    let mut seen = HashSet::with_capacity(stages.len());
    for stage in stages {
        if !seen.insert(stage.name()) {
            return Err(ConfigError::DuplicateStageName(stage.name().to_string()));
        }
    }
    Ok(())
}
