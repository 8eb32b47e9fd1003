//! Command-line arguments
//!
//! Global options apply to every subcommand and override the configuration
//! file; see [`Settings::resolve`](super::config::Settings::resolve).

use crate::backend::types::StudentId;
use crate::core::logging::{LOG_FORMATS, LOG_LEVELS};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "rollcall")]
#[command(about = "Record and review student attendance by scanning QR codes")]
#[command(version, long_version = crate::core::version::long_version())]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Base URL of the attendance API
    #[arg(long = "api-url", value_name = "URL", env = "ROLLCALL_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Access token from `rollcall login`
    #[arg(
        long = "token",
        value_name = "TOKEN",
        env = "ROLLCALL_TOKEN",
        hide_env_values = true,
        global = true
    )]
    pub token: Option<String>,

    /// Milliseconds between frame directory polls
    #[arg(long = "frame-interval-ms", value_name = "MS", global = true)]
    pub frame_interval_ms: Option<u64>,

    /// Milliseconds between a recorded attendance and the attendance view
    #[arg(long = "cooldown-ms", value_name = "MS", global = true)]
    pub cooldown_ms: Option<u64>,

    /// Milliseconds before the camera restarts after a failed submission
    #[arg(long = "resume-delay-ms", value_name = "MS", global = true)]
    pub resume_delay_ms: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long = "request-timeout-secs", value_name = "SECONDS", global = true)]
    pub request_timeout_secs: Option<u64>,

    /// Force coloured output
    #[arg(long = "color", action = ArgAction::SetTrue, global = true)]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", action = ArgAction::SetTrue, conflicts_with = "color", global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(long = "log-level", value_name = "LEVEL", value_parser = LOG_LEVELS, global = true)]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = LOG_FORMATS, global = true)]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log in as staff and print the access token
    Login {
        /// Staff password (read from stdin when omitted)
        #[arg(long = "password", value_name = "PASSWORD")]
        password: Option<String>,
    },

    /// List students
    Students {
        /// Only students whose name, phone or remarks match
        #[arg(short = 's', long = "search", value_name = "TERM")]
        search: Option<String>,
    },

    /// Show a student with their attendance history
    Student { id: StudentId },

    /// Replace a student's remarks
    Remarks { id: StudentId, text: String },

    /// Show a student's attendance history
    Attendance { id: StudentId },

    /// Record attendance by scanning a QR code
    #[command(subcommand)]
    Scan(ScanCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ScanCommand {
    /// Scan a QR code in an image file
    Image { file: PathBuf },

    /// Scan QR codes from a directory of captured camera frames
    ///
    /// Reads `start`, `stop`, `retry` and `quit` from stdin.
    Camera {
        /// Directory the capture tool writes frames into
        #[arg(long = "frames-dir", value_name = "DIR")]
        frames_dir: Option<PathBuf>,
    },
}

impl Args {
    /// Colour preference from the flags; `None` means decide by terminal
    pub fn color_choice(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// `--frames-dir` of `scan camera`, if given
    pub fn frames_dir(&self) -> Option<&PathBuf> {
        match &self.command {
            Command::Scan(ScanCommand::Camera { frames_dir }) => frames_dir.as_ref(),
            _ => None,
        }
    }
}
