//! Configuration management for pdftriage.
//!
//! Settings come from an optional TOML file (auto-discovered under the
//! user config directory, or given explicitly), with CLI flags taking
//! precedence. Provider credentials are resolved from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::batch::{default_workers, DEFAULT_PATTERN};
use crate::llm::LlmConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,
}

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Fixed worker count; `None` derives one from available
    /// parallelism (capped at 8).
    #[serde(default)]
    pub workers: Option<usize>,
    /// File pattern for directory inputs.
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Recurse into subdirectories of directory inputs.
    #[serde(default)]
    pub recursive: bool,
    /// Per-file analysis budget in seconds; `None` means unbounded.
    #[serde(default)]
    pub per_file_timeout_secs: Option<u64>,
    /// AI extraction settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: None,
            pattern: default_pattern(),
            recursive: false,
            per_file_timeout_secs: None,
            llm: LlmConfig::default(),
        }
    }
}

impl Settings {
    /// Resolve the effective worker count, CLI override first.
    ///
    /// An explicit 0 anywhere is a configuration error, not a request
    /// for auto-detection.
    pub fn resolve_workers(&self, cli_override: Option<usize>) -> Result<usize, ConfigError> {
        match cli_override.or(self.workers) {
            Some(0) => Err(ConfigError::InvalidWorkerCount),
            Some(n) => Ok(n),
            None => Ok(default_workers()),
        }
    }

    pub fn per_file_timeout(&self) -> Option<Duration> {
        self.per_file_timeout_secs.map(Duration::from_secs)
    }
}

/// Default config file location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdftriage").join("config.toml"))
}

/// Load settings from an explicit path, the default location, or
/// built-in defaults when no file exists.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match explicit {
        Some(p) => {
            let expanded = shellexpand::tilde(&p.to_string_lossy()).into_owned();
            let expanded = PathBuf::from(expanded);
            if !expanded.exists() {
                return Err(ConfigError::NotFound(expanded));
            }
            Some(expanded)
        }
        None => default_config_path().filter(|p| p.exists()),
    };

    match path {
        Some(path) => {
            debug!("Loading settings from {}", path.display());
            let raw = std::fs::read_to_string(&path)?;
            Ok(toml::from_str(&raw)?)
        }
        None => Ok(Settings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.pattern, "*.pdf");
        assert!(!settings.recursive);
        assert!(settings.workers.is_none());
        assert!(settings.per_file_timeout().is_none());
    }

    #[test]
    fn parses_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            workers = 4
            recursive = true

            [llm]
            model = "claude-3-5-sonnet-20241022"
            "#,
        )
        .unwrap();
        assert_eq!(settings.workers, Some(4));
        assert!(settings.recursive);
        assert_eq!(settings.pattern, "*.pdf");
        assert!(settings.llm.model.contains("sonnet"));
    }

    #[test]
    fn worker_resolution() {
        let settings = Settings {
            workers: Some(3),
            ..Default::default()
        };
        assert_eq!(settings.resolve_workers(None).unwrap(), 3);
        assert_eq!(settings.resolve_workers(Some(6)).unwrap(), 6);
        assert!(matches!(
            settings.resolve_workers(Some(0)),
            Err(ConfigError::InvalidWorkerCount)
        ));

        let auto = Settings::default().resolve_workers(None).unwrap();
        assert!((1..=8).contains(&auto));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_settings(Some(Path::new("/no/such/config.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
