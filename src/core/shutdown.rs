//! Shutdown coordination
//!
//! A camera session runs until the operator quits or the process receives a
//! termination signal. The coordinator turns signals into a broadcast so the
//! session can release the camera before the process exits.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Exit status used when a signal forces an immediate exit
const FORCED_EXIT_CODE: i32 = 130;

/// What a received signal does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalAction {
    /// Ask the guarded work to wind down
    Broadcast,
    /// Exit the process now
    Exit,
}

/// Coordinates graceful shutdown across the application
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: Arc<AtomicBool>,
    /// Set once the guarded work has finished; later signals exit directly
    released: Arc<AtomicBool>,
    signal_count: Arc<AtomicUsize>,
}

impl ShutdownCoordinator {
    pub fn new() -> (Self, broadcast::Receiver<()>) {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(8);
        let coordinator = Self {
            shutdown_tx,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            released: Arc::new(AtomicBool::new(false)),
            signal_count: Arc::new(AtomicUsize::new(0)),
        };
        (coordinator, shutdown_rx)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Release);
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Run `future_fn` with signal handlers installed
    ///
    /// The closure receives the shutdown receiver; the first signal is
    /// broadcast, a second one exits the process. Once the closure's future
    /// has completed (or been dropped) any signal exits the process, since
    /// the installed handlers stay registered for the process lifetime.
    pub async fn guard<F, Fut, R, E>(future_fn: F) -> Result<R, E>
    where
        F: FnOnce(broadcast::Receiver<()>) -> Fut,
        Fut: std::future::Future<Output = Result<R, E>>,
    {
        let (coordinator, shutdown_rx) = Self::new();
        coordinator.install_signal_handlers();
        let _release = ReleaseOnDrop(coordinator.released.clone());
        future_fn(shutdown_rx).await
    }

    fn install_signal_handlers(&self) {
        #[cfg(unix)]
        {
            // Restore default SIGPIPE so piping output into `head` exits quietly
            unsafe {
                libc::signal(libc::SIGPIPE, libc::SIG_DFL);
            }

            use tokio::signal::unix::{signal, SignalKind};
            for kind in [
                SignalKind::interrupt(),
                SignalKind::terminate(),
                SignalKind::hangup(),
            ] {
                let handler = self.handler();
                tokio::spawn(async move {
                    if let Ok(mut sig) = signal(kind) {
                        while sig.recv().await.is_some() {
                            handler.on_signal();
                        }
                    }
                });
            }
        }

        #[cfg(not(unix))]
        {
            let handler = self.handler();
            tokio::spawn(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    handler.on_signal();
                }
            });
        }
    }

    fn handler(&self) -> SignalHandler {
        SignalHandler {
            tx: self.shutdown_tx.clone(),
            requested: self.shutdown_requested.clone(),
            released: self.released.clone(),
            count: self.signal_count.clone(),
        }
    }
}

/// Marks the guarded work as finished when dropped
struct ReleaseOnDrop(Arc<AtomicBool>);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

struct SignalHandler {
    tx: broadcast::Sender<()>,
    requested: Arc<AtomicBool>,
    released: Arc<AtomicBool>,
    count: Arc<AtomicUsize>,
}

impl SignalHandler {
    fn action(&self) -> SignalAction {
        let previous = self.count.fetch_add(1, Ordering::AcqRel);
        if self.released.load(Ordering::Acquire) || previous >= 1 {
            SignalAction::Exit
        } else {
            SignalAction::Broadcast
        }
    }

    fn on_signal(&self) {
        match self.action() {
            SignalAction::Broadcast => {
                self.requested.store(true, Ordering::Release);
                let _ = self.tx.send(());
                log::info!("Interrupt received; shutting down (press Ctrl-C again to force)");
            }
            SignalAction::Exit => {
                log::warn!("Interrupt received; exiting");
                std::process::exit(FORCED_EXIT_CODE);
            }
        }
    }
}
