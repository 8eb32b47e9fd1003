//! Scan session API
//!
//! Public surface of the session module for the CLI.

pub use crate::session::capabilities::{PathPermission, PermissionSource, PermissionState};
pub use crate::session::controller::{
    ScanSession, ScanSessionController, SessionSettings, DEFAULT_COOLDOWN, DEFAULT_RESUME_DELAY,
};
pub use crate::session::error::{PayloadError, PayloadResult};
pub use crate::session::payload::extract_student_id;
pub use crate::session::types::{
    Route, ScanMode, ScanSessionState, SessionCommand, SessionEvent, SessionOutcome,
    StatusKind, StatusMessage,
};
