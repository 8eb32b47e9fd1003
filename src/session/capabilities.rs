//! Capabilities the scan session needs from its environment

use crate::decoder::error::{DecodeError, DecodeResult};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// Not decided yet; a request may grant it
    Prompt,
}

/// Camera permission as seen by the session
#[async_trait::async_trait]
pub trait PermissionSource: Send + Sync {
    async fn query(&self) -> PermissionState;

    /// Ask for access; `Err` means access was refused
    async fn request(&self) -> DecodeResult<()>;

    /// Live permission updates, for sources that can revoke mid-session
    fn changes(&self) -> Option<watch::Receiver<PermissionState>> {
        None
    }
}

/// Permission to read a frame directory
///
/// Granted when the directory is readable, denied when the OS refuses
/// access. A missing directory is undecided: `request()` creates it.
#[derive(Debug, Clone)]
pub struct PathPermission {
    dir: PathBuf,
}

impl PathPermission {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait::async_trait]
impl PermissionSource for PathPermission {
    async fn query(&self) -> PermissionState {
        match tokio::fs::read_dir(&self.dir).await {
            Ok(_) => PermissionState::Granted,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => PermissionState::Denied,
            Err(e) => {
                log::debug!("Frame directory {}: {}", self.dir.display(), e);
                PermissionState::Prompt
            }
        }
    }

    async fn request(&self) -> DecodeResult<()> {
        let refused =
            |e: std::io::Error| DecodeError::device(format!("{}: {}", self.dir.display(), e));
        tokio::fs::create_dir_all(&self.dir).await.map_err(refused)?;
        tokio::fs::read_dir(&self.dir).await.map_err(refused)?;
        Ok(())
    }
}
