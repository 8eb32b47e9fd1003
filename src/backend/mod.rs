//! Register API client
//!
//! Typed access to the attendance backend: staff login, the student register,
//! remarks editing, attendance history and attendance recording. The scan
//! session only depends on the narrow [`AttendanceRecorder`] trait so it can
//! be driven by test doubles.

pub mod api;
pub mod client;
pub mod error;
pub mod filter;
pub mod traits;
pub mod types;

pub use client::BackendClient;
pub use error::{ApiError, ApiResult};
pub use traits::AttendanceRecorder;
pub use types::{
    Acknowledgment, AttendanceRecord, AttendanceView, LoginResponse, Student, StudentDetail,
    StudentId,
};

#[cfg(test)]
mod tests;
