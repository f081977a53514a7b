//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for aide
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation backend base URL
    pub backend_url: Option<String>,
    /// API key sent to the backend
    pub api_key: Option<String>,
    /// Execute planned actions without confirmation
    pub auto_execute: Option<bool>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aide")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for AIDE_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("AIDE_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            backend_url: Some("http://localhost:8000".to_string()),
            api_key: None,
            auto_execute: Some(false),
        };

        default_config.save()?;
        Ok(path)
    }

    /// API key from config, falling back to the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("AIDE_API_KEY").ok())
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# aide configuration file
# Place at ~/.config/aide/config.toml (Linux/Mac) or %APPDATA%\aide\config.toml (Windows)

# Generation backend base URL
backend_url = "http://localhost:8000"

# Execute planned actions without confirmation (off by default)
auto_execute = false

# API key (optional - AIDE_API_KEY environment variable also works)
# api_key = "..."
"#
}
