//! Configuration for the merge service

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MergeConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Text extraction configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024,
        }
    }
}

/// Text extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Time allowed for pdf-extract before falling back to lopdf
    pub pdf_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pdf_timeout_secs: 60,
        }
    }
}

impl ExtractionConfig {
    pub fn pdf_timeout(&self) -> Duration {
        Duration::from_secs(self.pdf_timeout_secs)
    }
}

impl MergeConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Load defaults, then an optional TOML file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Cannot read {}: {}", path.display(), e))
                })?;
                tracing::info!("Loaded configuration from {}", path.display());
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `CP_MERGE_HOST`, `CP_MERGE_PORT` and the runtime's `PORT`.
    /// `CP_MERGE_PORT` takes precedence over `PORT`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("CP_MERGE_HOST") {
            self.server.host = host;
        }

        for key in ["PORT", "CP_MERGE_PORT"] {
            if let Some(port) = lookup(key) {
                self.server.port = port
                    .trim()
                    .parse()
                    .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", key, port, e)))?;
            }
        }

        Ok(())
    }

    /// Socket address string for the listener
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
