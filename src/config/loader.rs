//! Configuration file loading with precedence handling.

use crate::syntax::DEFAULT_MAX_STRING_LENGTH;
use crate::tokenization::Pepper;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "LDAPLOG_CONFIG";

/// Environment variable holding the tokenization pepper.
pub const PEPPER_ENV_VAR: &str = "LDAPLOG_PEPPER";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// The pepper file could not be read. The error never includes file contents.
    #[error("Failed to read pepper file at {path}: {reason}")]
    PepperRead {
        /// Path of the pepper file.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Tokenization was requested but no pepper is configured.
    #[error("Tokenization requires a pepper: set {PEPPER_ENV_VAR} or pepper_file")]
    MissingPepper,
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/ldaplog/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Maximum sanitized length of string values, in characters.
    #[serde(default)]
    pub max_string_length: Option<usize>,

    /// File whose contents are the tokenization pepper.
    #[serde(default)]
    pub pepper_file: Option<PathBuf>,

    /// Fields redacted by `ldaplog redact` when no `--redact` flag is given.
    #[serde(default)]
    pub redact_fields: Option<Vec<String>>,

    /// Fields tokenized by `ldaplog redact` when no `--tokenize` flag is given.
    #[serde(default)]
    pub tokenize_fields: Option<Vec<String>>,

    /// File for diagnostics. Diagnostics go to stderr when unset.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Skip records that fail to parse instead of aborting.
    #[serde(default)]
    pub skip_malformed: Option<bool>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Maximum sanitized length of string values.
    pub max_string_length: usize,
    /// File whose contents are the tokenization pepper.
    pub pepper_file: Option<PathBuf>,
    /// Pepper supplied directly (environment). Takes precedence over `pepper_file`.
    pub pepper: Option<Pepper>,
    /// Fields to redact.
    pub redact_fields: Vec<String>,
    /// Fields to tokenize.
    pub tokenize_fields: Vec<String>,
    /// File for diagnostics, or `None` for stderr.
    pub log_file_path: Option<PathBuf>,
    /// Skip records that fail to parse.
    pub skip_malformed: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            pepper_file: None,
            pepper: None,
            redact_fields: Vec::new(),
            tokenize_fields: Vec::new(),
            log_file_path: None,
            skip_malformed: true,
        }
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/ldaplog/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ldaplog").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `LDAPLOG_CONFIG` environment variable
/// 3. Default path `~/.config/ldaplog/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `LDAPLOG_PEPPER`: tokenization pepper, used as UTF-8 bytes
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(pepper) = std::env::var(PEPPER_ENV_VAR) {
        config.pepper = Some(Pepper::new(pepper));
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        max_string_length: config
            .max_string_length
            .unwrap_or(defaults.max_string_length),
        pepper_file: config.pepper_file.or(defaults.pepper_file),
        pepper: defaults.pepper,
        redact_fields: config.redact_fields.unwrap_or(defaults.redact_fields),
        tokenize_fields: config.tokenize_fields.unwrap_or(defaults.tokenize_fields),
        log_file_path: config.log_file_path.or(defaults.log_file_path),
        skip_malformed: config.skip_malformed.unwrap_or(defaults.skip_malformed),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    max_string_length: Option<usize>,
    redact_fields: Option<Vec<String>>,
    tokenize_fields: Option<Vec<String>>,
    strict: bool,
) -> ResolvedConfig {
    if let Some(max) = max_string_length {
        config.max_string_length = max;
    }

    if let Some(fields) = redact_fields {
        config.redact_fields = fields;
    }

    if let Some(fields) = tokenize_fields {
        config.tokenize_fields = fields;
    }

    if strict {
        config.skip_malformed = false;
    }

    config
}

/// The pepper to tokenize with, if one is configured.
///
/// A pepper from the environment wins over `pepper_file`. Trailing line breaks are
/// stripped from the file contents.
///
/// # Errors
///
/// Returns `ConfigError::PepperRead` if `pepper_file` is set but unreadable.
pub fn resolve_pepper(config: &ResolvedConfig) -> Result<Option<Pepper>, ConfigError> {
    if let Some(pepper) = &config.pepper {
        return Ok(Some(pepper.clone()));
    }

    let Some(path) = &config.pepper_file else {
        return Ok(None);
    };

    let mut bytes = std::fs::read(path).map_err(|e| ConfigError::PepperRead {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    while matches!(bytes.last(), Some(b'\n' | b'\r')) {
        bytes.pop();
    }

    Ok(Some(Pepper::new(bytes)))
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

#[cfg(test)]
mod log_path_tests {
    use super::*;

    #[test]
    fn diagnostics_default_to_stderr() {
        assert_eq!(ResolvedConfig::default().log_file_path, None);
        assert_eq!(merge_config(Some(ConfigFile::default())).log_file_path, None);
    }

    #[test]
    fn config_file_log_path_is_used() {
        let custom_path = PathBuf::from("/custom/path/to/app.log");
        let config_file = ConfigFile {
            log_file_path: Some(custom_path.clone()),
            ..ConfigFile::default()
        };

        let resolved = merge_config(Some(config_file));
        assert_eq!(resolved.log_file_path, Some(custom_path));
    }
}
