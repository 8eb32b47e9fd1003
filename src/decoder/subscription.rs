//! Continuous decode subscription

use crate::decoder::error::DecodeResult;
use crate::decoder::source::DeviceLease;
use crate::decoder::types::FrameDecode;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Lazy, cancellable sequence of decode results from a live feed
///
/// Yields `Ok(FrameDecode::Decoded(..))` or `Ok(FrameDecode::NoCode)` for
/// every frame, and a single `Err(DecodeError::Device)` if the device is
/// lost. The stream ends after `stop()`; results still buffered at that point
/// are discarded.
pub struct DecodeSubscription {
    results: mpsc::Receiver<DecodeResult<FrameDecode>>,
    lease: DeviceLease,
    worker: Option<JoinHandle<()>>,
    stopped: bool,
}

impl DecodeSubscription {
    pub fn new(
        results: mpsc::Receiver<DecodeResult<FrameDecode>>,
        lease: DeviceLease,
        worker: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            results,
            lease,
            worker,
            stopped: false,
        }
    }

    /// Release the device and halt decoding; safe to call repeatedly
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.lease.release();
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
        self.results.close();
        log::debug!("Decode subscription stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Stream for DecodeSubscription {
    type Item = DecodeResult<FrameDecode>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.stopped {
            return Poll::Ready(None);
        }
        this.results.poll_recv(cx)
    }
}

impl Drop for DecodeSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}
