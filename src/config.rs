use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_MODEL_ID: &str = "qwen-plus";

/// Optional defaults stored on disk at `~/.config/cmdclever/config.json`.
/// Everything here can be overridden by environment variables or flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub api_base: Option<String>,

    #[serde(default)]
    pub model_id: Option<String>,
}

impl ConfigFile {
    /// Load the config file if present and parseable, defaults otherwise.
    /// A corrupt file is reported but never fatal.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!(
                        "Warning: failed to parse {}: {}. Using defaults.",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("cmdclever");
            path.push("config.json");
            path
        })
    }
}

/// Fully resolved agent configuration. Construction fails when no API
/// credentials can be found anywhere, which is the one fatal startup error.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_key: String,
    pub api_base: String,
    pub model_id: String,
    pub verbose: bool,
}

impl AgentConfig {
    /// Resolve configuration with precedence: explicit arguments, then
    /// `AGNO_API_KEY` / `AGNO_API_BASE` environment variables, then the
    /// config file.
    pub fn resolve(
        api_key: Option<String>,
        api_base: Option<String>,
        model_id: Option<String>,
        verbose: bool,
    ) -> Result<Self> {
        let file = ConfigFile::load();

        let api_key = api_key
            .or_else(|| std::env::var("AGNO_API_KEY").ok())
            .or(file.api_key)
            .ok_or_else(|| {
                anyhow!(
                    "API key must be provided through the AGNO_API_KEY environment variable or --api-key"
                )
            })?;

        let api_base = api_base
            .or_else(|| std::env::var("AGNO_API_BASE").ok())
            .or(file.api_base)
            .ok_or_else(|| {
                anyhow!(
                    "API base URL must be provided through the AGNO_API_BASE environment variable or --api-base"
                )
            })?;

        let model_id = model_id
            .or(file.model_id)
            .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

        Ok(Self {
            api_key,
            api_base,
            model_id,
            verbose,
        })
    }
}
