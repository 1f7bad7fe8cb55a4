use relay_core::security::ApiKey;
use relay_core::MissingCredentialError;

/// Resolve an API key from the named environment variable.
///
/// Unset and blank values are both treated as missing.
pub fn resolve_api_key(var: &str) -> Result<ApiKey, MissingCredentialError> {
    resolve_api_key_with(var, |name| std::env::var(name).ok())
}

/// Same as [`resolve_api_key`] but reads through `lookup`, so callers (and
/// tests) can supply their own environment.
pub fn resolve_api_key_with<F>(var: &str, lookup: F) -> Result<ApiKey, MissingCredentialError>
where
    F: FnOnce(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(ApiKey::new(value.trim())),
        _ => Err(MissingCredentialError::new(var)),
    }
}
