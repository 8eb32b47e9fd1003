//! Backend API
//!
//! Public surface of the backend module for the application layer.

pub use crate::backend::client::{BackendClient, DEFAULT_REQUEST_TIMEOUT};
pub use crate::backend::error::{ApiError, ApiResult};
pub use crate::backend::filter::filter_students;
pub use crate::backend::traits::AttendanceRecorder;
pub use crate::backend::types::{
    Acknowledgment, AttendanceRecord, AttendanceView, LoginResponse, Student, StudentDetail,
    StudentId,
};
