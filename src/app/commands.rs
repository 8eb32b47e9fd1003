//! Subcommand handlers

use crate::app::cli::args::{Command, ScanCommand};
use crate::app::cli::config::{ConfigError, Settings};
use crate::app::error::{AppError, AppResult};
use crate::app::render;
use crate::backend::client::BackendClient;
use crate::backend::filter::filter_students;
use crate::backend::types::StudentId;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::styles::StyleRole;
use crate::decoder::adapter::{is_image_path, DecoderAdapter};
use crate::decoder::error::DecodeError;
use crate::decoder::qr::RqrrDecoder;
use crate::decoder::source::FrameDirectorySource;
use crate::session::capabilities::PathPermission;
use crate::session::controller::{ScanSession, ScanSessionController};
use crate::session::types::{
    Route, ScanMode, SessionCommand, SessionEvent, SessionOutcome, StatusKind,
};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const CAMERA_HELP: &str = "Commands: start, stop, retry, quit (Ctrl-C also quits)";

/// Line typed by the operator during a camera session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorInput {
    Session(SessionCommandKind),
    Quit,
}

/// Operator commands that map onto session commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommandKind {
    Start,
    Stop,
    Retry,
}

impl SessionCommandKind {
    fn command(self) -> SessionCommand {
        match self {
            SessionCommandKind::Start => SessionCommand::RequestScan,
            SessionCommandKind::Stop => SessionCommand::StopScan,
            SessionCommandKind::Retry => SessionCommand::RetryPermission,
        }
    }
}

/// `None` for blank or unknown input
pub fn parse_operator_input(line: &str) -> Option<OperatorInput> {
    match line.trim().to_ascii_lowercase().as_str() {
        "start" | "scan" => Some(OperatorInput::Session(SessionCommandKind::Start)),
        "stop" => Some(OperatorInput::Session(SessionCommandKind::Stop)),
        "retry" => Some(OperatorInput::Session(SessionCommandKind::Retry)),
        "quit" | "exit" | "q" => Some(OperatorInput::Quit),
        _ => None,
    }
}

/// Runs one subcommand against the backend
pub struct CommandRunner {
    settings: Settings,
    client: BackendClient,
    color: bool,
}

impl CommandRunner {
    pub fn new(settings: Settings, color: bool) -> AppResult<Self> {
        let mut client = BackendClient::new(&settings.api_url, settings.request_timeout)?;
        if let Some(token) = &settings.token {
            client = client.with_token(token.clone());
        }
        Ok(Self {
            settings,
            client,
            color,
        })
    }

    pub async fn run(&self, command: &Command) -> AppResult<()> {
        log::debug!("Running {:?} against {}", command, self.client.base_url());
        match command {
            Command::Login { password } => self.login(password.as_deref()).await,
            Command::Students { search } => self.students(search.as_deref()).await,
            Command::Student { id } => self.show_attendance_view(*id).await,
            Command::Remarks { id, text } => self.remarks(*id, text).await,
            Command::Attendance { id } => self.attendance(*id).await,
            Command::Scan(ScanCommand::Image { file }) => self.scan_image(file).await,
            Command::Scan(ScanCommand::Camera { .. }) => self.scan_camera().await,
        }
    }

    async fn login(&self, password: Option<&str>) -> AppResult<()> {
        let password = match password {
            Some(password) => password.to_string(),
            None => read_password().await?,
        };
        let response = self.client.login(&password).await?;
        log::info!("Logged in to {}", self.client.base_url());
        println!("{}", response.access_token);
        Ok(())
    }

    async fn students(&self, search: Option<&str>) -> AppResult<()> {
        let students = self.client.list_students().await?;
        let matching = filter_students(&students, search.unwrap_or(""));
        print!("{}", render::render_students(&matching, self.color));
        Ok(())
    }

    async fn remarks(&self, id: StudentId, text: &str) -> AppResult<()> {
        let student = self.client.update_remarks(id, text).await?;
        println!(
            "{}",
            StyleRole::Success.paint("Remarks updated.", self.color)
        );
        print!("{}", render::render_student(&student, self.color));
        Ok(())
    }

    async fn attendance(&self, id: StudentId) -> AppResult<()> {
        let records = self.client.list_attendance(id).await?;
        print!("{}", render::render_attendance(&records, self.color));
        Ok(())
    }

    async fn show_attendance_view(&self, id: StudentId) -> AppResult<()> {
        let view = self.client.attendance_view(id).await?;
        print!("{}", render::render_attendance_view(&view, self.color));
        Ok(())
    }

    fn session_controller(&self) -> ScanSessionController {
        ScanSessionController::new(
            DecoderAdapter::new(Arc::new(RqrrDecoder)),
            Arc::new(self.client.clone()),
            self.settings.session_settings(),
        )
    }

    async fn scan_image(&self, file: &Path) -> AppResult<()> {
        if !is_image_path(file) {
            let reason = format!("{} is not an image", file.display());
            return Err(DecodeError::invalid_input(reason).into());
        }
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| AppError::io(format!("Cannot read {}", file.display()), e))?;

        let mut session = self
            .session_controller()
            .with_mode(ScanMode::Upload)
            .spawn();
        if !session.send(SessionCommand::UploadImage(bytes)).await {
            return Err(session_ended());
        }

        while let Some(event) = session.next_event().await {
            self.print_event(&event);
            match event {
                SessionEvent::Status(message) if message.kind == StatusKind::Error => {
                    session.teardown().await;
                    return Err(AppError::ScanFailed {
                        message: message.text,
                    });
                }
                SessionEvent::Navigate(Route::Attendance(id)) => {
                    session.teardown().await;
                    return self.show_attendance_view(id).await;
                }
                _ => {}
            }
        }
        session.teardown().await;
        Ok(())
    }

    async fn scan_camera(&self) -> AppResult<()> {
        let frames_dir = self.settings.frames_dir.clone().ok_or_else(|| {
            ConfigError::new(
                "No frame directory configured; pass --frames-dir or set frames-dir in the configuration file",
            )
        })?;
        let source = Arc::new(FrameDirectorySource::new(
            &frames_dir,
            self.settings.frame_interval,
        ));
        let permissions = Arc::new(PathPermission::new(&frames_dir));
        log::info!("Scanning frames from {}", source.dir().display());

        let mut session = self
            .session_controller()
            .with_camera(source, permissions)
            .with_mode(ScanMode::Camera)
            .spawn();
        println!("{}", StyleRole::Dim.paint(CAMERA_HELP, self.color));
        if !session.send(SessionCommand::RequestScan).await {
            return Err(session_ended());
        }

        let outcome = ShutdownCoordinator::guard(|shutdown_rx| async move {
            self.operate(&mut session, shutdown_rx).await;
            Ok::<_, AppError>(session.teardown().await)
        })
        .await?;

        match outcome {
            SessionOutcome::Navigated(id) => self.show_attendance_view(id).await,
            SessionOutcome::TornDown => Ok(()),
        }
    }

    /// Relay operator input and print events until the session ends
    async fn operate(
        &self,
        session: &mut ScanSession,
        mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
    ) {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                event = session.next_event() => match event {
                    Some(event) => self.print_event(&event),
                    None => return,
                },
                line = lines.next_line() => match line {
                    Ok(Some(line)) => match parse_operator_input(&line) {
                        Some(OperatorInput::Session(kind)) => {
                            if !session.send(kind.command()).await {
                                log::warn!("Scan session ended; ignoring '{}'", line.trim());
                                eprintln!("{}", StyleRole::Error.paint(
                                    "The scan session has ended.",
                                    self.color,
                                ));
                                return;
                            }
                        }
                        Some(OperatorInput::Quit) => return,
                        None if line.trim().is_empty() => {}
                        None => eprintln!("{}", StyleRole::Error.paint(
                            &format!("Unknown command '{}'. {}", line.trim(), CAMERA_HELP),
                            self.color,
                        )),
                    },
                    // End of input closes the session
                    Ok(None) => return,
                    Err(e) => {
                        log::warn!("Cannot read operator input: {}", e);
                        return;
                    }
                },
                _ = shutdown_rx.recv() => {
                    log::info!("Shutdown requested; closing scan session");
                    return;
                }
            }
        }
    }

    fn print_event(&self, event: &SessionEvent) {
        if let Some(line) = render::render_event(event, self.color) {
            println!("{}", line);
        }
    }
}

fn session_ended() -> AppError {
    AppError::ScanFailed {
        message: "Scan session ended unexpectedly".to_string(),
    }
}

async fn read_password() -> AppResult<String> {
    eprint!("Password: ");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match lines.next_line().await {
        Ok(Some(line)) if !line.is_empty() => Ok(line),
        Ok(_) => Err(AppError::Io {
            message: "No password given on stdin".to_string(),
        }),
        Err(e) => Err(AppError::io("Cannot read password", e)),
    }
}
