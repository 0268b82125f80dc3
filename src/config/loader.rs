//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

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
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    load_layered(path, None)
}

/// Load a base file and an optional overlay, then validate the result.
///
/// The overlay is merged table by table, so it only needs the keys it
/// changes. A missing overlay file is not an error.
pub fn load_layered(base: &Path, overlay: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut table = read_table(base)?;

    if let Some(overlay) = overlay.filter(|p| p.exists()) {
        tracing::debug!(path = %overlay.display(), "Applying config overlay");
        merge_tables(&mut table, read_table(overlay)?);
    }

    let config: ServiceConfig = toml::Value::Table(table).try_into()?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
