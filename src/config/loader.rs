//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variables checked, in order, for the upstream credential.
pub const CREDENTIAL_VARS: [&str; 2] = ["PUBLICAI_API_KEY", "publicai"];

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    let config: RelayConfig = toml::from_str(content)?;
    finish(config, env_credential())
}

/// Default configuration plus the environment credential.
pub fn from_env() -> Result<RelayConfig, ConfigError> {
    finish(RelayConfig::default(), env_credential())
}

fn finish(mut config: RelayConfig, credential: Option<String>) -> Result<RelayConfig, ConfigError> {
    apply_credential(&mut config, credential);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// The environment credential wins over one written in the file; an empty
/// value counts as absent.
pub fn apply_credential(config: &mut RelayConfig, credential: Option<String>) {
    if let Some(key) = credential.filter(|k| !k.trim().is_empty()) {
        config.upstream.api_key = Some(key);
    }
    if config.upstream.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
        config.upstream.api_key = None;
    }
}

fn env_credential() -> Option<String> {
    first_credential(|var| std::env::var(var).ok())
}

/// First non-blank value among [`CREDENTIAL_VARS`]; a blank variable does
/// not hide the ones after it.
fn first_credential(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    CREDENTIAL_VARS
        .iter()
        .copied()
        .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()))
}
