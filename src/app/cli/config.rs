//! Layered configuration
//!
//! Built-in defaults, then the TOML configuration file, then command-line
//! flags (and their environment variables). The file is optional unless
//! named explicitly with `--config-file`.
//!
//! ```toml
//! api-url = "https://attendance.example.edu/api"
//! frames-dir = "/var/lib/rollcall/frames"
//! cooldown-ms = 2000
//! log-level = "info"
//! ```

use crate::app::cli::args::Args;
use crate::backend::client::DEFAULT_REQUEST_TIMEOUT;
use crate::core::error_handling::ContextualError;
use crate::core::logging::{LOG_FORMATS, LOG_LEVELS};
use crate::decoder::source::DEFAULT_FRAME_INTERVAL;
use crate::session::controller::{SessionSettings, DEFAULT_COOLDOWN, DEFAULT_RESUME_DELAY};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const KNOWN_KEYS: [&str; 11] = [
    "api-url",
    "token",
    "frames-dir",
    "frame-interval-ms",
    "cooldown-ms",
    "resume-delay-ms",
    "request-timeout-secs",
    "log-level",
    "log-file",
    "log-format",
    "color",
];

/// Configuration problem the operator has to fix
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn invalid_value(key: &str, expected: &str) -> Self {
        Self::new(format!("Configuration key '{}' must be {}", key, expected))
    }
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// Effective settings after all layers are applied
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub token: Option<String>,
    pub frames_dir: Option<PathBuf>,
    pub frame_interval: Duration,
    pub cooldown: Duration,
    pub resume_delay: Duration,
    pub request_timeout: Duration,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub log_format: Option<String>,
    /// `None` decides by whether stdout is a terminal
    pub color: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            frames_dir: None,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            cooldown: DEFAULT_COOLDOWN,
            resume_delay: DEFAULT_RESUME_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_level: None,
            log_file: None,
            log_format: None,
            color: None,
        }
    }
}

impl Settings {
    /// Defaults, overlaid with the configuration file, overlaid with `args`
    pub async fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        if let Some(config) = load_config_file(args.config_file.as_deref()).await? {
            settings.apply_toml_values(&config)?;
        }
        settings.apply_args(args)?;
        Ok(settings)
    }

    /// Apply TOML configuration values
    pub fn apply_toml_values(&mut self, config: &toml::Table) -> Result<(), ConfigError> {
        for key in config.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                log::warn!("Ignoring unknown configuration key '{}'", key);
            }
        }

        if let Some(api_url) = string_value(config, "api-url")? {
            self.api_url = api_url.to_string();
        }
        if let Some(token) = string_value(config, "token")? {
            self.token = Some(token.to_string());
        }
        if let Some(dir) = string_value(config, "frames-dir")? {
            self.frames_dir = Some(PathBuf::from(dir));
        }
        if let Some(ms) = integer_value(config, "frame-interval-ms", 1)? {
            self.frame_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = integer_value(config, "cooldown-ms", 0)? {
            self.cooldown = Duration::from_millis(ms);
        }
        if let Some(ms) = integer_value(config, "resume-delay-ms", 0)? {
            self.resume_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = integer_value(config, "request-timeout-secs", 1)? {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(level) = string_value(config, "log-level")? {
            self.log_level = Some(one_of(level, "log-level", &LOG_LEVELS)?);
        }
        if let Some(format) = string_value(config, "log-format")? {
            self.log_format = Some(one_of(format, "log-format", &LOG_FORMATS)?);
        }
        if let Some(file) = string_value(config, "log-file")? {
            self.log_file = log_file_path(Path::new(file));
        }
        if let Some(value) = config.get("color") {
            let color = value
                .as_bool()
                .ok_or_else(|| ConfigError::invalid_value("color", "true or false"))?;
            self.color = Some(color);
        }
        Ok(())
    }

    /// Apply command-line flags, which win over the configuration file
    pub fn apply_args(&mut self, args: &Args) -> Result<(), ConfigError> {
        if let Some(api_url) = &args.api_url {
            self.api_url = api_url.clone();
        }
        if let Some(token) = &args.token {
            self.token = Some(token.clone());
        }
        if let Some(dir) = args.frames_dir() {
            self.frames_dir = Some(dir.clone());
        }
        if let Some(ms) = args.frame_interval_ms {
            if ms == 0 {
                return Err(ConfigError::new("--frame-interval-ms must be at least 1"));
            }
            self.frame_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = args.cooldown_ms {
            self.cooldown = Duration::from_millis(ms);
        }
        if let Some(ms) = args.resume_delay_ms {
            self.resume_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = args.request_timeout_secs {
            if secs == 0 {
                return Err(ConfigError::new("--request-timeout-secs must be at least 1"));
            }
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(level) = &args.log_level {
            self.log_level = Some(level.clone());
        }
        if let Some(format) = &args.log_format {
            self.log_format = Some(format.clone());
        }
        if let Some(file) = &args.log_file {
            self.log_file = log_file_path(file);
        }
        if let Some(color) = args.color_choice() {
            self.color = Some(color);
        }
        Ok(())
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            cooldown: self.cooldown,
            resume_delay: self.resume_delay,
        }
    }
}

/// `<config dir>/Rollcall/rollcall.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Rollcall").join("rollcall.toml"))
}

/// Read the named configuration file, or the default one if it exists
pub async fn load_config_file(path: Option<&Path>) -> Result<Option<toml::Table>, ConfigError> {
    let path = match path {
        Some(path) if !path.exists() => {
            return Err(ConfigError::new(format!(
                "The specified configuration file does not exist: {}",
                path.display()
            )));
        }
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    log::debug!("Loading configuration from {}", path.display());
    let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
        ConfigError::new(format!(
            "Error reading configuration file {}: {}",
            path.display(),
            e
        ))
    })?;
    let config = toml::from_str::<toml::Table>(&contents).map_err(|e| {
        ConfigError::new(format!(
            "Error parsing configuration file {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(Some(config))
}

fn string_value<'a>(config: &'a toml::Table, key: &str) -> Result<Option<&'a str>, ConfigError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| ConfigError::invalid_value(key, "a string")),
    }
}

fn integer_value(
    config: &toml::Table,
    key: &str,
    minimum: u64,
) -> Result<Option<u64>, ConfigError> {
    let Some(value) = config.get(key) else {
        return Ok(None);
    };
    value
        .as_integer()
        .and_then(|n| u64::try_from(n).ok())
        .filter(|n| *n >= minimum)
        .map(Some)
        .ok_or_else(|| {
            ConfigError::invalid_value(key, &format!("an integer of at least {}", minimum))
        })
}

fn one_of(value: &str, key: &str, allowed: &[&str]) -> Result<String, ConfigError> {
    if allowed.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(ConfigError::invalid_value(
            key,
            &format!("one of {}", allowed.join(", ")),
        ))
    }
}

/// "none" and "-" disable file logging
fn log_file_path(path: &Path) -> Option<PathBuf> {
    match path.to_str() {
        Some(s) if s.eq_ignore_ascii_case("none") || s == "-" => None,
        _ => Some(path.to_path_buf()),
    }
}
