//! Seams the scan session depends on

use crate::backend::error::ApiResult;
use crate::backend::types::{Acknowledgment, StudentId};

/// Creates attendance records
///
/// Implementations are not expected to be idempotent: every successful call
/// creates one record.
#[async_trait::async_trait]
pub trait AttendanceRecorder: Send + Sync {
    async fn record_attendance(&self, student: StudentId) -> ApiResult<Acknowledgment>;
}
