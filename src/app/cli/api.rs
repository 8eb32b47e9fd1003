//! CLI API
//!
//! Argument and configuration types used by startup and the command handlers.

pub use crate::app::cli::args::{Args, Command, ScanCommand};
pub use crate::app::cli::config::{default_config_path, ConfigError, Settings, DEFAULT_API_URL};
