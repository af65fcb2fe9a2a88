//! Configuration file reading and parsing.
//!
//! This module handles locating, reading, and parsing INI-format configuration files,
//! with support for layered overrides.

use std::env;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use thiserror::Error;

use super::{BucketsConfig, Config, GithubConfig, Limit, NetworkConfig, NotifyConfig, S3Settings};
use crate::source_control::DEFAULT_API_URL;

// =============================================================================
// Constants - Default Values
// =============================================================================

const DEFAULT_MAX_CONCURRENT_REQUESTS: u32 = 16;
const DEFAULT_NOTIFY_SUBJECT: &str = "Transfer complete.";

const ENV_CONFIG_FILE: &str = "GIT2S3_CONFIG_FILE";
const DEFAULT_CONFIG_FILENAME: &str = ".git2s3config";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid integer '{value}': {source}")]
    InvalidInteger {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("invalid override key '{key}': {message}")]
    InvalidOverrideKey { key: String, message: String },

    #[error("invalid override '{0}': expected key=value")]
    InvalidOverride(String),
}

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// ConfigSource
// =============================================================================

/// Specifies how to locate and layer configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// Explicit config file path from CLI. If specified and doesn't exist, error.
    /// If None, fall back to GIT2S3_CONFIG_FILE env var, then ~/.git2s3config.
    pub config_file: Option<PathBuf>,

    /// Additional override config file (layered on top of base config).
    pub override_file: Option<PathBuf>,

    /// Individual key=value overrides (applied last).
    /// Keys use dot-notation: "github.owner", "network.max_concurrent_requests"
    pub overrides: Vec<(String, String)>,
}

/// Split a `key=value` override argument.
pub fn parse_override(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ConfigError::InvalidOverride(arg.to_string())),
    }
}

// =============================================================================
// Value Parsing
// =============================================================================

/// Parse an optional limit value. Returns Inherit if the key is not present.
fn parse_limit_u32(ini: &Ini, section: &str, key: &str) -> Result<Limit<u32>> {
    match ini.get(section, key) {
        None => Ok(Limit::Inherit),
        Some(v) => parse_limit_value_u32(&v),
    }
}

fn parse_limit_value_u32(value: &str) -> Result<Limit<u32>> {
    if value.eq_ignore_ascii_case("none") {
        Ok(Limit::Disabled)
    } else {
        let v: u32 = value.parse().map_err(|e| ConfigError::InvalidInteger {
            value: value.to_string(),
            source: e,
        })?;
        Ok(Limit::Value(v))
    }
}

/// Parse a comma-separated string into a Vec of trimmed strings.
fn parse_comma_separated(s: &str) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Treat blank values as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Config File Resolution
// =============================================================================

/// Information about how the config file was resolved.
#[derive(Debug)]
pub struct ResolvedConfigFile {
    /// The path to the config file, if one was found.
    pub path: Option<PathBuf>,
    /// Warning message if env var pointed to nonexistent file.
    pub warning: Option<String>,
}

/// Resolve which config file to use based on the ConfigSource and environment.
fn resolve_config_file(source: &ConfigSource) -> Result<ResolvedConfigFile> {
    // If explicit path provided, it must exist
    if let Some(ref path) = source.config_file {
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path.clone()),
                warning: None,
            });
        } else {
            return Err(ConfigError::FileNotFound(path.clone()));
        }
    }

    if let Ok(env_path) = env::var(ENV_CONFIG_FILE) {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path),
                warning: None,
            });
        } else {
            // Warn but continue with defaults
            return Ok(ResolvedConfigFile {
                path: None,
                warning: Some(format!(
                    "config file specified by {} does not exist: {}",
                    ENV_CONFIG_FILE, env_path
                )),
            });
        }
    }

    if let Some(home) = home_dir() {
        let default_path = home.join(DEFAULT_CONFIG_FILENAME);
        if default_path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(default_path),
                warning: None,
            });
        }
    }

    Ok(ResolvedConfigFile {
        path: None,
        warning: None,
    })
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

// =============================================================================
// Default Config
// =============================================================================

/// Create a Config with all default values.
pub(super) fn default_config() -> Config {
    Config {
        github: GithubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            owner: None,
            token: None,
            token_file: None,
        },
        s3: S3Settings::default(),
        buckets: BucketsConfig::default(),
        network: NetworkConfig {
            max_concurrent_requests: Limit::Value(DEFAULT_MAX_CONCURRENT_REQUESTS),
        },
        notify: NotifyConfig {
            topic_arn: None,
            subject: DEFAULT_NOTIFY_SUBJECT.to_string(),
            region: None,
            endpoint_url: None,
        },
    }
}

// =============================================================================
// INI Parsing
// =============================================================================

/// Apply an INI file's contents to a Config, layering on top of existing values.
pub(super) fn apply_ini_to_config(config: &mut Config, ini: &Ini) -> Result<()> {
    // [github] section
    if let Some(api_url) = non_empty(ini.get("github", "api_url")) {
        config.github.api_url = api_url;
    }
    if let Some(owner) = non_empty(ini.get("github", "owner")) {
        config.github.owner = Some(owner);
    }
    if let Some(token) = non_empty(ini.get("github", "token")) {
        config.github.token = Some(token);
    }
    if let Some(token_file) = non_empty(ini.get("github", "token_file")) {
        config.github.token_file = Some(PathBuf::from(token_file));
    }

    // [s3] section
    if let Some(endpoint_url) = non_empty(ini.get("s3", "endpoint_url")) {
        config.s3.endpoint_url = Some(endpoint_url);
    }
    if let Some(region) = non_empty(ini.get("s3", "region")) {
        config.s3.region = Some(region);
    }

    // [buckets] section
    if let Some(names) = ini.get("buckets", "suffixed_repositories") {
        config.buckets.suffixed_repositories = parse_comma_separated(&names);
    }

    // [network] section
    let max_concurrent_requests = parse_limit_u32(ini, "network", "max_concurrent_requests")?;
    if !matches!(max_concurrent_requests, Limit::Inherit) {
        config.network.max_concurrent_requests = max_concurrent_requests;
    }

    // [notify] section
    if let Some(topic_arn) = non_empty(ini.get("notify", "topic_arn")) {
        config.notify.topic_arn = Some(topic_arn);
    }
    if let Some(subject) = non_empty(ini.get("notify", "subject")) {
        config.notify.subject = subject;
    }
    if let Some(region) = non_empty(ini.get("notify", "region")) {
        config.notify.region = Some(region);
    }
    if let Some(endpoint_url) = non_empty(ini.get("notify", "endpoint_url")) {
        config.notify.endpoint_url = Some(endpoint_url);
    }

    Ok(())
}

/// Load and parse an INI file.
fn load_ini(path: &Path) -> Result<Ini> {
    let mut ini = Ini::new();
    ini.load(path).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e,
    })?;
    Ok(ini)
}

// =============================================================================
// Override Application
// =============================================================================

/// Apply a single key=value override to the config.
fn apply_override(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.splitn(2, '.').collect();

    match parts.as_slice() {
        ["github", param] => apply_github_override(config, param, value),
        ["s3", param] => apply_s3_override(config, param, value),
        ["buckets", param] => apply_buckets_override(config, param, value),
        ["network", param] => apply_network_override(config, param, value),
        ["notify", param] => apply_notify_override(config, param, value),
        _ => Err(ConfigError::InvalidOverrideKey {
            key: key.to_string(),
            message: "unrecognized key format".to_string(),
        }),
    }
}

fn unknown_parameter(section: &str, param: &str) -> ConfigError {
    ConfigError::InvalidOverrideKey {
        key: format!("{}.{}", section, param),
        message: "unknown parameter".to_string(),
    }
}

fn apply_github_override(config: &mut Config, param: &str, value: &str) -> Result<()> {
    match param {
        "api_url" => config.github.api_url = value.to_string(),
        "owner" => config.github.owner = non_empty(Some(value.to_string())),
        "token" => config.github.token = non_empty(Some(value.to_string())),
        "token_file" => {
            config.github.token_file = non_empty(Some(value.to_string())).map(PathBuf::from)
        }
        _ => return Err(unknown_parameter("github", param)),
    }
    Ok(())
}

fn apply_s3_override(config: &mut Config, param: &str, value: &str) -> Result<()> {
    match param {
        "endpoint_url" => config.s3.endpoint_url = non_empty(Some(value.to_string())),
        "region" => config.s3.region = non_empty(Some(value.to_string())),
        _ => return Err(unknown_parameter("s3", param)),
    }
    Ok(())
}

fn apply_buckets_override(config: &mut Config, param: &str, value: &str) -> Result<()> {
    match param {
        "suffixed_repositories" => {
            config.buckets.suffixed_repositories = parse_comma_separated(value);
            Ok(())
        }
        _ => Err(unknown_parameter("buckets", param)),
    }
}

fn apply_network_override(config: &mut Config, param: &str, value: &str) -> Result<()> {
    match param {
        "max_concurrent_requests" => {
            config.network.max_concurrent_requests = parse_limit_value_u32(value)?;
            Ok(())
        }
        _ => Err(unknown_parameter("network", param)),
    }
}

fn apply_notify_override(config: &mut Config, param: &str, value: &str) -> Result<()> {
    match param {
        "topic_arn" => config.notify.topic_arn = non_empty(Some(value.to_string())),
        "subject" => config.notify.subject = value.to_string(),
        "region" => config.notify.region = non_empty(Some(value.to_string())),
        "endpoint_url" => config.notify.endpoint_url = non_empty(Some(value.to_string())),
        _ => return Err(unknown_parameter("notify", param)),
    }
    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

/// Result of reading configuration, including any warnings.
#[derive(Debug)]
pub struct ConfigResult {
    /// The parsed configuration.
    pub config: Config,
    /// Any warnings generated during config loading.
    pub warnings: Vec<String>,
}

/// Read and parse configuration from the specified sources.
///
/// Configuration is layered in this order:
/// 1. Built-in defaults
/// 2. Base config file (from CLI, env var, or ~/.git2s3config)
/// 3. Override config file (if specified)
/// 4. Individual overrides (applied last)
pub fn read_config(source: &ConfigSource) -> Result<ConfigResult> {
    let mut warnings = Vec::new();

    let mut config = default_config();

    let resolved = resolve_config_file(source)?;
    if let Some(warning) = resolved.warning {
        warnings.push(warning);
    }
    if let Some(ref path) = resolved.path {
        let ini = load_ini(path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    if let Some(ref override_path) = source.override_file {
        if !override_path.exists() {
            return Err(ConfigError::FileNotFound(override_path.clone()));
        }
        let ini = load_ini(override_path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    for (key, value) in &source.overrides {
        apply_override(&mut config, key, value)?;
    }

    Ok(ConfigResult { config, warnings })
}

// =============================================================================
// Tests
// =============================================================================
