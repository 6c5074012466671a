//! Configuration file for the CLI
//!
//! ```toml
//! [balancer]
//! strategy = "sliding_window"
//! window_size = 8
//! batch_size = 500
//! type_order = ["video", "image", "article"]
//!
//! [input]
//! type_field = "content_type"
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use typebalancer_common::BalancerConfig;

/// Default log level for the CLI
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub balancer: BalancerConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    /// Key holding each item's type
    #[serde(default = "default_type_field")]
    pub type_field: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            type_field: default_type_field(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_type_field() -> String {
    "type".to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl FileConfig {
    /// Parse a TOML document
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse config file")
    }

    /// Load `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typebalancer_common::StrategyKind;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FileConfig::parse("").unwrap();
        assert_eq!(config.balancer, BalancerConfig::default());
        assert_eq!(config.input.type_field, "type");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_full_file() {
        let config = FileConfig::parse(
            r#"
            [balancer]
            strategy = "sliding_window"
            window_size = 8
            type_order = ["video", "image"]

            [input]
            type_field = "content_type"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.balancer.strategy, StrategyKind::SlidingWindow);
        assert_eq!(config.balancer.window_size, Some(8));
        assert_eq!(config.balancer.batch_size, 1000);
        assert_eq!(config.input.type_field, "content_type");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_bad_file_is_an_error() {
        assert!(FileConfig::parse("[balancer]\nbatch_size = \"many\"").is_err());
        assert!(FileConfig::load(Some(Path::new("/nonexistent/typebalancer.toml"))).is_err());
        assert!(FileConfig::load(None).is_ok());
    }
}
