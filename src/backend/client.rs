//! HTTP client for the register API

use crate::backend::error::{ApiError, ApiResult};
use crate::backend::traits::AttendanceRecorder;
use crate::backend::types::{
    Acknowledgment, AttendanceRecord, AttendanceView, ErrorBody, LoginRequest, LoginResponse,
    RemarksUpdate, Student, StudentDetail, StudentId,
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the register backend
///
/// The bearer token is attached to every request once set; endpoints that
/// require it fail with [`ApiError::MissingToken`] before any request is sent.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ApiError::InvalidUrl {
                url: base_url.to_string(),
                message: "only http:// and https:// are supported".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: trimmed.to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /login`; the returned token is not stored on this client
    pub async fn login(&self, password: &str) -> ApiResult<LoginResponse> {
        let request = self
            .http
            .post(self.url("/login"))
            .json(&LoginRequest { password });
        self.send(request).await
    }

    /// `GET /students`
    pub async fn list_students(&self) -> ApiResult<Vec<Student>> {
        let request = self.authorize_optional(self.http.get(self.url("/students")));
        self.send(request).await
    }

    /// `GET /student/{id}`
    pub async fn get_student(&self, id: StudentId) -> ApiResult<StudentDetail> {
        let request =
            self.authorize_optional(self.http.get(self.url(&format!("/student/{}", id))));
        self.send(request).await
    }

    /// `PUT /student/{id}` with the new remarks
    pub async fn update_remarks(&self, id: StudentId, remarks: &str) -> ApiResult<StudentDetail> {
        let request = self
            .authorize(self.http.put(self.url(&format!("/student/{}", id))))?
            .json(&RemarksUpdate { remarks });
        self.send(request).await
    }

    /// `GET /attendance/{id}`
    pub async fn list_attendance(&self, id: StudentId) -> ApiResult<Vec<AttendanceRecord>> {
        let request = self.authorize(self.http.get(self.url(&format!("/attendance/{}", id))))?;
        self.send(request).await
    }

    /// `POST /attendance/{id}`; every call creates a new record
    pub async fn record_attendance(&self, id: StudentId) -> ApiResult<Acknowledgment> {
        let request = self
            .authorize(self.http.post(self.url(&format!("/attendance/{}", id))))?
            .json(&serde_json::json!({}));
        self.send(request).await
    }

    /// Student detail and attendance history, fetched concurrently
    pub async fn attendance_view(&self, id: StudentId) -> ApiResult<AttendanceView> {
        let (student, records) =
            tokio::try_join!(self.get_student(id), self.list_attendance(id))?;
        Ok(AttendanceView { student, records })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> ApiResult<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;
        Ok(request.bearer_auth(token))
    }

    fn authorize_optional(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await.map_err(|e| ApiError::Transport {
            message: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Transport {
            message: format!("Failed to read response body: {}", e),
        })?;
        log::debug!("Backend answered HTTP {} ({} bytes)", status.as_u16(), body.len());

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|error_body| error_body.detail_text());
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ApiError::Unauthorized { detail }
                }
                _ => ApiError::Rejected {
                    status: status.as_u16(),
                    detail,
                },
            });
        }

        let body = if body.trim().is_empty() { "null" } else { &body };
        serde_json::from_str(body).map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl AttendanceRecorder for BackendClient {
    async fn record_attendance(&self, student: StudentId) -> ApiResult<Acknowledgment> {
        BackendClient::record_attendance(self, student).await
    }
}
