//! Scan session controller
//!
//! One task owns the whole session. Its loop waits on five sources at once:
//! operator commands, the decode subscription, the in-flight submission,
//! permission changes and the two deadlines (camera resume after a failed
//! submission, navigation after a successful one). Because the subscription
//! is stopped before a submission starts, frames decoded while the request
//! is pending are never read and at most one submission is ever in flight.

use crate::backend::error::ApiResult;
use crate::backend::traits::AttendanceRecorder;
use crate::backend::types::{Acknowledgment, StudentId};
use crate::core::error_handling::describe_error;
use crate::decoder::adapter::DecoderAdapter;
use crate::decoder::error::{DecodeError, DecodeResult};
use crate::decoder::source::VideoSource;
use crate::decoder::subscription::DecodeSubscription;
use crate::decoder::types::{FrameDecode, ScanPayload};
use crate::session::capabilities::{PermissionSource, PermissionState};
use crate::session::payload::extract_student_id;
use crate::session::types::{
    Route, ScanMode, ScanSessionState, SessionCommand, SessionEvent, SessionOutcome,
    StatusMessage,
};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use std::future::pending;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(2);
pub const DEFAULT_RESUME_DELAY: Duration = Duration::from_secs(3);

const COMMAND_BUFFER: usize = 16;

const CAMERA_STARTED: &str = "Camera started. Point at a QR code to scan.";
const CAMERA_DENIED: &str =
    "Camera access denied. Please enable camera permissions to scan QR codes.";
const SCANNER_STOPPED: &str = "Scanner stopped.";
const CODE_IN_IMAGE: &str = "QR code detected in image!";
const SUBMISSION_FAILED: &str = "Failed to record attendance";
const SUBMISSION_PENDING: &str = "Attendance is being recorded. Please wait.";

/// Session timings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Delay between a recorded attendance and navigation
    pub cooldown: Duration,
    /// Delay before the camera restarts after a failed submission
    pub resume_delay: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            resume_delay: DEFAULT_RESUME_DELAY,
        }
    }
}

#[derive(Clone)]
struct Camera {
    video: Arc<dyn VideoSource>,
    permissions: Arc<dyn PermissionSource>,
}

/// Configures and starts a scan session
pub struct ScanSessionController {
    decoder: DecoderAdapter,
    recorder: Arc<dyn AttendanceRecorder>,
    camera: Option<Camera>,
    mode: ScanMode,
    settings: SessionSettings,
}

impl ScanSessionController {
    pub fn new(
        decoder: DecoderAdapter,
        recorder: Arc<dyn AttendanceRecorder>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            decoder,
            recorder,
            camera: None,
            mode: ScanMode::default(),
            settings,
        }
    }

    pub fn with_camera(
        mut self,
        video: Arc<dyn VideoSource>,
        permissions: Arc<dyn PermissionSource>,
    ) -> Self {
        self.camera = Some(Camera { video, permissions });
        self
    }

    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    /// Run the session on its own task
    pub fn spawn(self) -> ScanSession {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(command_rx, event_tx));

        ScanSession {
            commands: command_tx,
            events: event_rx,
            task,
        }
    }

    /// Drive the session until it navigates away or `commands` closes
    ///
    /// Closing `commands` tears the session down: the camera is released,
    /// an in-flight submission is abandoned and pending deadlines are
    /// cancelled.
    pub async fn run(
        self,
        commands: mpsc::Receiver<SessionCommand>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> SessionOutcome {
        let mut session = ActiveSession {
            decoder: self.decoder,
            recorder: self.recorder,
            camera: self.camera,
            mode: self.mode,
            settings: self.settings,
            state: ScanSessionState::Idle,
            events,
            subscription: None,
            submission: None,
            permission_changes: None,
            resume_at: None,
            navigate_at: None,
            last_invalid: None,
        };
        session.run(commands).await
    }
}

type Submission = (StudentId, ApiResult<Acknowledgment>);

struct ActiveSession {
    decoder: DecoderAdapter,
    recorder: Arc<dyn AttendanceRecorder>,
    camera: Option<Camera>,
    mode: ScanMode,
    settings: SessionSettings,
    state: ScanSessionState,
    events: mpsc::UnboundedSender<SessionEvent>,
    subscription: Option<DecodeSubscription>,
    submission: Option<BoxFuture<'static, Submission>>,
    permission_changes: Option<watch::Receiver<PermissionState>>,
    resume_at: Option<Instant>,
    navigate_at: Option<(Instant, StudentId)>,
    /// Last rejected payload in camera mode, reported only once in a row
    last_invalid: Option<ScanPayload>,
}

impl ActiveSession {
    async fn run(&mut self, mut commands: mpsc::Receiver<SessionCommand>) -> SessionOutcome {
        self.state = self.settle_mode().await;
        self.emit(SessionEvent::StateChanged(self.state));

        let outcome = loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break SessionOutcome::TornDown,
                },
                decoded = next_decode(&mut self.subscription) => self.handle_decode(decoded),
                (student, result) = next_submission(&mut self.submission) => {
                    self.finish_submission(student, result)
                }
                change = next_permission_change(&mut self.permission_changes) => {
                    self.handle_permission_change(change)
                }
                _ = deadline(self.resume_at) => {
                    self.resume_at = None;
                    self.begin_scan().await;
                }
                _ = deadline(self.navigate_at.map(|(at, _)| at)) => {
                    if let Some((_, student)) = self.navigate_at.take() {
                        self.emit(SessionEvent::Navigate(Route::Attendance(student)));
                        break SessionOutcome::Navigated(student);
                    }
                }
            }
        };

        self.teardown();
        outcome
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        log::debug!("Command {:?} while {}", command, self.state);
        match command {
            SessionCommand::RequestScan | SessionCommand::RetryPermission => {
                self.request_scan().await
            }
            SessionCommand::StopScan => self.stop_scan(),
            SessionCommand::SelectMode(mode) => self.select_mode(mode).await,
            SessionCommand::UploadImage(bytes) => self.upload_image(bytes).await,
        }
    }

    /// State for the current mode; subscribes to permission changes in camera mode
    async fn settle_mode(&mut self) -> ScanSessionState {
        self.permission_changes = None;
        let permissions = match self.mode {
            ScanMode::Camera => self.camera.as_ref().map(|c| c.permissions.clone()),
            ScanMode::Upload => None,
        };
        let Some(permissions) = permissions else {
            return ScanSessionState::Idle;
        };

        self.permission_changes = permissions.changes();
        match permissions.query().await {
            PermissionState::Denied => ScanSessionState::PermissionDenied,
            PermissionState::Granted | PermissionState::Prompt => ScanSessionState::Idle,
        }
    }

    async fn request_scan(&mut self) {
        if self.mode != ScanMode::Camera {
            self.status(StatusMessage::error(
                "Switch to camera mode to scan with the camera.",
            ));
            return;
        }
        match self.state {
            ScanSessionState::Submitting => self.status(StatusMessage::info(SUBMISSION_PENDING)),
            ScanSessionState::Scanning | ScanSessionState::PermissionPending => {}
            ScanSessionState::Idle
            | ScanSessionState::PermissionDenied
            | ScanSessionState::Cooldown => {
                self.cancel_deadlines();
                self.begin_scan().await;
            }
        }
    }

    /// PermissionPending, then Scanning or PermissionDenied
    async fn begin_scan(&mut self) {
        let Some(Camera { video, permissions }) = self.camera.clone() else {
            self.set_state(ScanSessionState::Idle);
            self.status(StatusMessage::error(
                "No camera is configured for this session.",
            ));
            return;
        };

        self.stop_subscription();
        self.set_state(ScanSessionState::PermissionPending);

        let granted = match permissions.query().await {
            PermissionState::Granted => Ok(()),
            PermissionState::Denied | PermissionState::Prompt => permissions.request().await,
        };
        if let Err(e) = granted {
            log::info!("Camera permission refused: {}", e);
            self.status(StatusMessage::error(CAMERA_DENIED));
            self.set_state(ScanSessionState::PermissionDenied);
            return;
        }

        match self.decoder.start_continuous_decode(video.as_ref()) {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                self.last_invalid = None;
                self.set_state(ScanSessionState::Scanning);
                self.status(StatusMessage::info(CAMERA_STARTED));
            }
            Err(e) => self.camera_lost(&e),
        }
    }

    fn stop_scan(&mut self) {
        if self.state == ScanSessionState::Submitting {
            self.status(StatusMessage::info(SUBMISSION_PENDING));
            return;
        }

        let was_active =
            self.subscription.is_some() || self.resume_at.is_some() || self.navigate_at.is_some();
        self.cancel_deadlines();
        self.stop_subscription();
        if matches!(
            self.state,
            ScanSessionState::Scanning | ScanSessionState::Cooldown
        ) {
            self.set_state(ScanSessionState::Idle);
        }
        if was_active {
            self.status(StatusMessage::info(SCANNER_STOPPED));
        }
    }

    async fn select_mode(&mut self, mode: ScanMode) {
        if self.state == ScanSessionState::Submitting {
            self.status(StatusMessage::info(SUBMISSION_PENDING));
            return;
        }

        self.cancel_deadlines();
        self.stop_subscription();
        self.mode = mode;
        self.last_invalid = None;
        let state = self.settle_mode().await;
        self.set_state(state);
    }

    async fn upload_image(&mut self, bytes: Vec<u8>) {
        if self.mode != ScanMode::Upload {
            self.status(StatusMessage::error(
                "Switch to upload mode to scan an image.",
            ));
            return;
        }
        if self.state == ScanSessionState::Submitting {
            self.status(StatusMessage::info(SUBMISSION_PENDING));
            return;
        }

        self.cancel_deadlines();
        self.set_state(ScanSessionState::Idle);

        match self.decoder.decode_still_image(bytes).await {
            Ok(payload) => {
                self.status(StatusMessage::success(CODE_IN_IMAGE));
                if let Some(student) = self.interpret(&payload) {
                    self.submit(student);
                }
            }
            Err(e) => self.status(StatusMessage::error(describe_error(
                &e,
                "Failed to scan image",
            ))),
        }
    }

    fn handle_decode(&mut self, decoded: Option<DecodeResult<FrameDecode>>) {
        match decoded {
            Some(Ok(FrameDecode::NoCode)) => {}
            Some(Ok(FrameDecode::Decoded(payload))) => {
                if self.state != ScanSessionState::Scanning {
                    return;
                }
                if let Some(student) = self.interpret(&payload) {
                    self.submit(student);
                }
            }
            Some(Err(e)) => self.camera_lost(&e),
            None => self.camera_lost(&DecodeError::device("camera feed ended")),
        }
    }

    fn interpret(&mut self, payload: &ScanPayload) -> Option<StudentId> {
        match extract_student_id(payload.as_str()) {
            Ok(student) => {
                self.last_invalid = None;
                Some(student)
            }
            Err(e) => {
                let repeated =
                    self.mode == ScanMode::Camera && self.last_invalid.as_ref() == Some(payload);
                if !repeated {
                    log::info!("Rejected QR payload {:?}", e.payload());
                    self.status(StatusMessage::error(describe_error(&e, "Invalid QR code")));
                }
                self.last_invalid = Some(payload.clone());
                None
            }
        }
    }

    fn submit(&mut self, student: StudentId) {
        self.stop_subscription();
        self.set_state(ScanSessionState::Submitting);
        log::info!("Recording attendance for student {}", student);

        let recorder = self.recorder.clone();
        self.submission =
            Some(async move { (student, recorder.record_attendance(student).await) }.boxed());
    }

    fn finish_submission(&mut self, student: StudentId, result: ApiResult<Acknowledgment>) {
        self.submission = None;
        match result {
            Ok(_) => {
                self.status(StatusMessage::success(format!(
                    "Attendance recorded successfully for student {}!",
                    student
                )));
                self.set_state(ScanSessionState::Cooldown);
                self.navigate_at = Some((Instant::now() + self.settings.cooldown, student));
            }
            Err(e) => {
                log::warn!("Attendance recording failed for student {}: {}", student, e);
                self.status(StatusMessage::error(e.detail_or(SUBMISSION_FAILED)));
                self.set_state(ScanSessionState::Idle);
                if self.mode == ScanMode::Camera {
                    self.resume_at = Some(Instant::now() + self.settings.resume_delay);
                }
            }
        }
    }

    fn handle_permission_change(&mut self, change: Option<PermissionState>) {
        match change {
            None => self.permission_changes = None,
            Some(PermissionState::Denied) => {
                if matches!(
                    self.state,
                    ScanSessionState::Scanning | ScanSessionState::Idle
                ) {
                    log::info!("Camera permission revoked");
                    self.stop_subscription();
                    self.resume_at = None;
                    self.status(StatusMessage::error(CAMERA_DENIED));
                    self.set_state(ScanSessionState::PermissionDenied);
                }
            }
            Some(PermissionState::Granted) => {
                if self.state == ScanSessionState::PermissionDenied {
                    self.set_state(ScanSessionState::Idle);
                }
            }
            Some(PermissionState::Prompt) => {}
        }
    }

    /// Device failure or refusal: release the camera and report denial
    fn camera_lost(&mut self, error: &DecodeError) {
        log::warn!("{}", error);
        self.stop_subscription();
        self.resume_at = None;
        self.status(StatusMessage::error(error.to_string()));
        self.set_state(ScanSessionState::PermissionDenied);
    }

    fn stop_subscription(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.stop();
        }
    }

    fn cancel_deadlines(&mut self) {
        self.resume_at = None;
        if let Some((_, student)) = self.navigate_at.take() {
            log::debug!("Cancelled navigation to student {}", student);
        }
    }

    fn teardown(&mut self) {
        self.stop_subscription();
        if self.submission.take().is_some() {
            log::debug!("Abandoned in-flight submission");
        }
        self.cancel_deadlines();
        log::debug!("Scan session ended while {}", self.state);
    }

    fn set_state(&mut self, state: ScanSessionState) {
        if self.state != state {
            log::debug!("Scan session: {} -> {}", self.state, state);
            self.state = state;
            self.emit(SessionEvent::StateChanged(state));
        }
    }

    fn status(&self, message: StatusMessage) {
        self.emit(SessionEvent::Status(message));
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine; the session keeps its own state
        let _ = self.events.send(event);
    }
}

async fn next_decode(
    subscription: &mut Option<DecodeSubscription>,
) -> Option<DecodeResult<FrameDecode>> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => pending().await,
    }
}

async fn next_submission(submission: &mut Option<BoxFuture<'static, Submission>>) -> Submission {
    match submission {
        Some(submission) => submission.await,
        None => pending().await,
    }
}

async fn next_permission_change(
    changes: &mut Option<watch::Receiver<PermissionState>>,
) -> Option<PermissionState> {
    match changes {
        Some(changes) => match changes.changed().await {
            Ok(()) => Some(*changes.borrow_and_update()),
            Err(_) => None,
        },
        None => pending().await,
    }
}

async fn deadline(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => pending().await,
    }
}

/// Handle to a running scan session
pub struct ScanSession {
    commands: mpsc::Sender<SessionCommand>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    task: JoinHandle<SessionOutcome>,
}

impl ScanSession {
    /// Queue a command; false once the session has ended
    pub async fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Next session event; `None` once the session has ended
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Close the session and wait for it to release its resources
    ///
    /// Returns the navigation outcome if the session already navigated.
    pub async fn teardown(self) -> SessionOutcome {
        let ScanSession { commands, task, .. } = self;
        drop(commands);
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Scan session task failed: {}", e);
                SessionOutcome::TornDown
            }
        }
    }
}
