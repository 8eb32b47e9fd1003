//! Video sources
//!
//! A [`VideoSource`] hands out a [`FrameFeed`]: a channel of frames plus a
//! [`DeviceLease`] that releases the device when stopped or dropped. A source
//! serves at most one feed at a time.

use crate::decoder::error::{DecodeError, DecodeResult};
use crate::decoder::types::Frame;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(200);

/// Frames buffered between the source and the decode worker
const FRAME_BUFFER: usize = 4;

/// Capability that acquires a camera-like device
pub trait VideoSource: Send + Sync {
    /// Acquire the device and start delivering frames
    ///
    /// Fails with [`DecodeError::Device`] when the device is missing, not
    /// accessible or already owned by another feed.
    fn open(&self) -> DecodeResult<FrameFeed>;
}

/// Live frames from an acquired device
pub struct FrameFeed {
    /// `Err` items report device loss; the feed ends after one
    pub frames: mpsc::Receiver<DecodeResult<Frame>>,
    pub lease: DeviceLease,
}

/// Ownership of an acquired device
///
/// `release()` runs the release action exactly once; dropping the lease
/// releases it too.
pub struct DeviceLease {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl DeviceLease {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }
}

impl Drop for DeviceLease {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for DeviceLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceLease")
            .field("released", &self.is_released())
            .finish()
    }
}

/// Treats a directory of captured frames as a camera
///
/// An external capture tool writes frames (PNG, JPEG, ...) into the
/// directory; each new file is read once, in name order, at most once per
/// polling interval. The directory disappearing is reported as device loss.
pub struct FrameDirectorySource {
    dir: PathBuf,
    interval: Duration,
    in_use: Arc<AtomicBool>,
}

impl FrameDirectorySource {
    pub fn new(dir: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            interval,
            in_use: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use.load(Ordering::Acquire)
    }
}

impl VideoSource for FrameDirectorySource {
    fn open(&self) -> DecodeResult<FrameFeed> {
        std::fs::read_dir(&self.dir).map_err(|e| {
            DecodeError::device(format!("cannot read {}: {}", self.dir.display(), e))
        })?;

        if self
            .in_use
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DecodeError::device(format!(
                "{} is already in use by another scan",
                self.dir.display()
            )));
        }

        // Files already present belong to an earlier session
        let seen = list_frame_files(&self.dir).unwrap_or_default();
        let (tx, rx) = mpsc::channel(FRAME_BUFFER);
        let poller = tokio::spawn(poll_directory(
            self.dir.clone(),
            self.interval,
            seen.into_iter().collect(),
            tx,
        ));

        let in_use = self.in_use.clone();
        let dir = self.dir.clone();
        let lease = DeviceLease::new(move || {
            poller.abort();
            in_use.store(false, Ordering::Release);
            log::debug!("Released frame source {}", dir.display());
        });

        log::debug!("Acquired frame source {}", self.dir.display());
        Ok(FrameFeed { frames: rx, lease })
    }
}

async fn poll_directory(
    dir: PathBuf,
    interval: Duration,
    mut seen: HashSet<PathBuf>,
    tx: mpsc::Sender<DecodeResult<Frame>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tx.closed() => return,
            _ = ticker.tick() => {}
        }

        let files = match list_frame_files(&dir) {
            Ok(files) => files,
            Err(e) => {
                let _ = tx
                    .send(Err(DecodeError::device(format!(
                        "lost {}: {}",
                        dir.display(),
                        e
                    ))))
                    .await;
                return;
            }
        };

        for path in files {
            if !seen.insert(path.clone()) {
                continue;
            }
            match read_frame(&path).await {
                Ok(frame) => {
                    if tx.send(Ok(frame)).await.is_err() {
                        return;
                    }
                }
                // Half-written or non-image files are skipped, not fatal
                Err(e) => log::debug!("Skipping frame {}: {}", path.display(), e),
            }
        }
    }
}

fn list_frame_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && super::adapter::is_image_path(path))
        .collect();
    files.sort();
    Ok(files)
}

async fn read_frame(path: &Path) -> Result<Frame, String> {
    let bytes = tokio::fs::read(path).await.map_err(|e| e.to_string())?;
    image::load_from_memory(&bytes).map_err(|e| e.to_string())
}
