//! CLI configuration.
//!
//! Loaded from environment variables with sensible defaults. All settings
//! can be overridden via `RENAISSANCE_*` environment variables, and the data
//! directory also by `--data-dir`.

use std::path::PathBuf;

use renaissance_core::UnresolvedPathPolicy;

/// Where client storage lives when nothing else is configured.
pub const DEFAULT_DATA_DIR: &str = ".renaissance";

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Root directory of the file-backed client storage.
    pub data_dir: PathBuf,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// Treat updates to unresolved content paths as errors.
    pub strict_paths: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RENAISSANCE_DATA_DIR`: storage directory (default: `./.renaissance`)
    /// - `RENAISSANCE_LOG_LEVEL`: log filter (default: `warn`)
    /// - `RENAISSANCE_LOG_FORMAT`: `text` or `json` (default: `text`)
    /// - `RENAISSANCE_STRICT_PATHS`: fail on unresolved content paths
    ///   (default: `false`, debug builds always fail)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from any variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("RENAISSANCE_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let log_level = lookup("RENAISSANCE_LOG_LEVEL").unwrap_or_else(|| "warn".to_owned());

        let log_format = match lookup("RENAISSANCE_LOG_FORMAT").as_deref() {
            Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let strict_paths = lookup("RENAISSANCE_STRICT_PATHS")
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        Self {
            data_dir,
            log_level,
            log_format,
            strict_paths,
        }
    }

    /// Replace the data directory if one was given on the command line.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    /// How the content store treats updates to paths that do not resolve.
    #[must_use]
    pub fn path_policy(&self) -> UnresolvedPathPolicy {
        if self.strict_paths {
            UnresolvedPathPolicy::Fail
        } else {
            UnresolvedPathPolicy::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> CliConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        CliConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]);
        assert_eq!(config.data_dir, PathBuf::from(".renaissance"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(!config.strict_paths);
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("RENAISSANCE_DATA_DIR", "/tmp/site"),
            ("RENAISSANCE_LOG_LEVEL", "debug"),
            ("RENAISSANCE_LOG_FORMAT", "JSON"),
            ("RENAISSANCE_STRICT_PATHS", "true"),
        ]);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/site"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.path_policy(), UnresolvedPathPolicy::Fail);
    }

    #[test]
    fn flag_overrides_env_data_dir() {
        let config = config(&[("RENAISSANCE_DATA_DIR", "/tmp/env")])
            .with_data_dir(Some(PathBuf::from("/tmp/flag")));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/flag"));

        let config = config.with_data_dir(None);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/flag"));
    }

    #[test]
    fn blank_data_dir_falls_back_to_default() {
        let config = config(&[("RENAISSANCE_DATA_DIR", "  ")]);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }
}
