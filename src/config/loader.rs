//! Configuration and snapshot loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, validate_snapshot, ValidationError};
use crate::snapshot::{Snapshot, SCHEMA_VERSION};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Snapshot parse error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load and validate service configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = read(path)?;
    let config: ServiceConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a snapshot document and report its problems.
///
/// Only syntax errors fail. A schema version mismatch or dangling reference
/// is logged and the snapshot is returned as-is.
pub fn parse_snapshot(content: &str) -> Result<Snapshot, ConfigError> {
    let snapshot: Snapshot = serde_json::from_str(content)?;

    if snapshot.schema_version != SCHEMA_VERSION {
        tracing::warn!(
            found = snapshot.schema_version,
            expected = SCHEMA_VERSION,
            "Snapshot schema version mismatch; using it unmigrated"
        );
    }
    for problem in validate_snapshot(&snapshot) {
        tracing::warn!(field = %problem.field, "Snapshot problem: {}", problem.message);
    }

    Ok(snapshot)
}

/// Load a snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, ConfigError> {
    let snapshot = parse_snapshot(&read(path)?)?;
    tracing::info!(
        path = %path.display(),
        profiles = snapshot.profiles.len(),
        rules = snapshot.rules.len(),
        tab_overrides = snapshot.tab_overrides.len(),
        group_overrides = snapshot.group_overrides.len(),
        "Snapshot loaded"
    );
    Ok(snapshot)
}
