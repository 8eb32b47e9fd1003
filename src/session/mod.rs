//! Scan session
//!
//! Drives one attendance scanning session: camera permission, the
//! continuous decode subscription or an uploaded image, payload
//! interpretation, a single attendance submission per scan and the
//! cooldown before handing over to the attendance view.
//!
//! The controller runs as one task that owns all session state. Callers talk
//! to it through [`SessionCommand`]s and observe it through
//! [`SessionEvent`]s.

pub mod api;
pub mod capabilities;
pub mod controller;
pub mod error;
pub mod payload;
pub mod types;

pub use capabilities::{PathPermission, PermissionSource, PermissionState};
pub use controller::{ScanSession, ScanSessionController, SessionSettings};
pub use error::PayloadError;
pub use payload::extract_student_id;
pub use types::{
    Route, ScanMode, ScanSessionState, SessionCommand, SessionEvent, SessionOutcome,
    StatusKind, StatusMessage,
};

#[cfg(test)]
mod tests;
