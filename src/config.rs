//! Daemon configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file, then
//! `VISIONARY_`-prefixed environment variables (nested keys split on `__`,
//! e.g. `VISIONARY_GEMINI__API_KEY`).

use std::net::SocketAddr;
use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::gemini::DEFAULT_MODEL;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "visionary.toml";

/// Gemini API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; falls back to `GEMINI_API_KEY` when unset
    pub api_key: Option<String>,
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Model selected in a fresh studio's settings
    pub default_model: String,
    pub gemini: GeminiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            default_model: DEFAULT_MODEL.to_string(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl Config {
    /// Provider stack for a given config file
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("VISIONARY_").split("__"))
    }

    /// Load configuration; a missing file is not an error
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let mut config: Config = Self::figment(path).extract()?;

        if config.gemini.api_key.is_none() {
            config.gemini.api_key = std::env::var("GEMINI_API_KEY").ok();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.default_model, "gemini-2.5-flash-image");
        assert_eq!(config.gemini.timeout_secs, 120);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config: Config = Config::figment(&dir.path().join("absent.toml"))
            .extract()
            .unwrap();
        assert_eq!(config.bind_addr, Config::default().bind_addr);
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
bind_addr = "0.0.0.0:9100"
default_model = "gemini-3-pro-image-preview"

[gemini]
base_url = "http://localhost:9999"
timeout_secs = 10
"#
        )
        .unwrap();

        let config: Config = Config::figment(file.path()).extract().unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:9100");
        assert_eq!(config.default_model, "gemini-3-pro-image-preview");
        assert_eq!(config.gemini.base_url, "http://localhost:9999");
        assert_eq!(config.gemini.timeout_secs, 10);
    }
}
