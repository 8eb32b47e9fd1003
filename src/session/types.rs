//! Scan session data types

use crate::backend::types::StudentId;
use std::fmt;

/// Lifecycle of one scanning session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanSessionState {
    Idle,
    PermissionPending,
    PermissionDenied,
    Scanning,
    Submitting,
    Cooldown,
}

impl fmt::Display for ScanSessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanSessionState::Idle => "idle",
            ScanSessionState::PermissionPending => "waiting for camera permission",
            ScanSessionState::PermissionDenied => "camera access denied",
            ScanSessionState::Scanning => "scanning",
            ScanSessionState::Submitting => "recording attendance",
            ScanSessionState::Cooldown => "recorded",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    #[default]
    Camera,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

/// Operator-facing message about the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Where the session hands over once attendance is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Attendance(StudentId),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Attendance(id) => write!(f, "/attendance/{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StateChanged(ScanSessionState),
    Status(StatusMessage),
    Navigate(Route),
}

pub enum SessionCommand {
    /// Start the camera (camera mode)
    RequestScan,
    /// Ask for camera permission again after a denial
    RetryPermission,
    StopScan,
    SelectMode(ScanMode),
    /// Decode and submit an uploaded image (upload mode)
    UploadImage(Vec<u8>),
}

impl fmt::Debug for SessionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionCommand::RequestScan => f.write_str("RequestScan"),
            SessionCommand::RetryPermission => f.write_str("RetryPermission"),
            SessionCommand::StopScan => f.write_str("StopScan"),
            SessionCommand::SelectMode(mode) => f.debug_tuple("SelectMode").field(mode).finish(),
            SessionCommand::UploadImage(bytes) => write!(f, "UploadImage({} bytes)", bytes.len()),
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Attendance was recorded and the cooldown elapsed
    Navigated(StudentId),
    /// The session was closed before navigating
    TornDown,
}
