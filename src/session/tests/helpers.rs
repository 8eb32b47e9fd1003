//! Scan session test harness
//!
//! Camera frames come from [`ChannelSource`] and are "decoded" by width with
//! [`ScriptedDecoder`], so each test scripts exactly which payloads the
//! session sees.

use crate::backend::error::{ApiError, ApiResult};
use crate::backend::traits::AttendanceRecorder;
use crate::backend::types::{Acknowledgment, StudentId};
use crate::decoder::adapter::DecoderAdapter;
use crate::decoder::error::{DecodeError, DecodeResult};
use crate::decoder::tests::helpers::{ChannelSource, ScriptedDecoder};
use crate::session::capabilities::{PermissionSource, PermissionState};
use crate::session::controller::{ScanSession, ScanSessionController, SessionSettings};
use crate::session::types::{ScanMode, ScanSessionState, SessionEvent, StatusKind};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Semaphore};

/// Longest a test waits for an event before failing
const PATIENCE: Duration = Duration::from_secs(60);

/// Frame widths and the payload each one decodes to
pub const PAYLOADS: &[(u32, &str)] = &[
    (42, r#"{"id": 42}"#),
    (7, r#"{"studentId": "7"}"#),
    (1138, "STU-1138-X"),
    (13, "no numbers here"),
    (14, "still no numbers"),
];

pub fn id(value: u64) -> StudentId {
    StudentId::new(value).unwrap()
}

/// Records calls; optionally fails or waits for a permit before answering
#[derive(Default)]
pub struct ScriptedRecorder {
    calls: Mutex<Vec<StudentId>>,
    failures: Mutex<VecDeque<ApiError>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedRecorder {
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Fail the first calls with `errors`, in order; succeed afterwards
    pub fn failing(errors: Vec<ApiError>) -> Self {
        Self {
            failures: Mutex::new(errors.into()),
            ..Self::default()
        }
    }

    /// Hold every call until a permit is added to `gate`
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<StudentId> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AttendanceRecorder for ScriptedRecorder {
    async fn record_attendance(&self, student: StudentId) -> ApiResult<Acknowledgment> {
        self.calls.lock().unwrap().push(student);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(Acknowledgment(serde_json::json!({ "student_id": student }))),
        }
    }
}

/// Permission source the test can grant or revoke at will
pub struct ScriptedPermissions {
    state: watch::Sender<PermissionState>,
    grant_on_request: bool,
    requests: AtomicUsize,
}

impl ScriptedPermissions {
    pub fn new(initial: PermissionState, grant_on_request: bool) -> Self {
        Self {
            state: watch::Sender::new(initial),
            grant_on_request,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn granted() -> Self {
        Self::new(PermissionState::Granted, true)
    }

    pub fn revoke(&self) {
        self.state.send_replace(PermissionState::Denied);
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PermissionSource for ScriptedPermissions {
    async fn query(&self) -> PermissionState {
        *self.state.borrow()
    }

    async fn request(&self) -> DecodeResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.grant_on_request {
            self.state.send_replace(PermissionState::Granted);
            Ok(())
        } else {
            Err(DecodeError::device("permission dismissed"))
        }
    }

    fn changes(&self) -> Option<watch::Receiver<PermissionState>> {
        Some(self.state.subscribe())
    }
}

pub struct Harness {
    pub session: ScanSession,
    pub source: ChannelSource,
    pub decoder: Arc<ScriptedDecoder>,
    pub recorder: Arc<ScriptedRecorder>,
    pub permissions: Arc<ScriptedPermissions>,
}

pub fn camera_session(recorder: ScriptedRecorder, permissions: ScriptedPermissions) -> Harness {
    start(recorder, permissions, ScanMode::Camera)
}

pub fn upload_session(recorder: ScriptedRecorder) -> Harness {
    start(recorder, ScriptedPermissions::granted(), ScanMode::Upload)
}

fn start(recorder: ScriptedRecorder, permissions: ScriptedPermissions, mode: ScanMode) -> Harness {
    let source = ChannelSource::new();
    let decoder = Arc::new(ScriptedDecoder::new(PAYLOADS));
    let recorder = Arc::new(recorder);
    let permissions = Arc::new(permissions);

    let session = ScanSessionController::new(
        DecoderAdapter::new(decoder.clone()),
        recorder.clone(),
        SessionSettings::default(),
    )
    .with_camera(Arc::new(source.clone()), permissions.clone())
    .with_mode(mode)
    .spawn();

    Harness {
        session,
        source,
        decoder,
        recorder,
        permissions,
    }
}

/// Collect events up to and including the first one matching `done`
pub async fn events_until(
    session: &mut ScanSession,
    done: impl Fn(&SessionEvent) -> bool,
) -> Vec<SessionEvent> {
    let collect = async {
        let mut seen = Vec::new();
        while let Some(event) = session.next_event().await {
            let finished = done(&event);
            seen.push(event);
            if finished {
                return seen;
            }
        }
        panic!("session ended early; events: {:?}", seen);
    };
    tokio::time::timeout(PATIENCE, collect)
        .await
        .expect("timed out waiting for session event")
}

pub async fn wait_for_state(
    session: &mut ScanSession,
    state: ScanSessionState,
) -> Vec<SessionEvent> {
    events_until(session, |event| *event == SessionEvent::StateChanged(state)).await
}

/// Texts of the status messages of `kind` among `events`
pub fn statuses(events: &[SessionEvent], kind: StatusKind) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Status(message) if message.kind == kind => Some(message.text.clone()),
            _ => None,
        })
        .collect()
}

/// True when the session emits nothing for `quiet`
pub async fn stays_quiet(session: &mut ScanSession, quiet: Duration) -> bool {
    tokio::time::timeout(quiet, session.next_event())
        .await
        .is_err()
}
