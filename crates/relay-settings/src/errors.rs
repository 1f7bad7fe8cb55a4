use relay_core::ConfigError;
use thiserror::Error;

/// Why a settings file or override could not be turned into [`RelaySettings`](crate::RelaySettings).
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Parsed, but out of range or empty where a value is required.
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
    #[error("invalid pipeline: {0}")]
    Pipeline(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, SettingsError>;
