//! Load the service description from JSON text or a file.

use crate::config::{validate, ServiceConfig};
use crate::error::ConfigError;
use std::path::Path;

impl ServiceConfig {
    /// Parse and validate a service description.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Load(e.to_string()))?;
        validate(&config)?;
        Ok(config)
    }
}

/// Read `path` (a JSON file) into a validated [`ServiceConfig`].
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<ServiceConfig, ConfigError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    let config = ServiceConfig::from_json(&text)?;
    tracing::info!(path = %path.display(), entities = config.entities.len(), "loaded service config");
    Ok(config)
}
