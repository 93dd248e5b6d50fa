//! Background expiry sweep with explicit lifecycle.
//!
//! The sweeper owns one tokio task that wakes on a fixed interval and purges
//! expired entries. `start` and `stop` are explicit; dropping the sweeper
//! cancels the task.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::ttl::Expiring;
use crate::error::{CommonError, CommonResult};

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

struct SweepTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Periodically purges an [`Expiring`] store
pub struct CacheSweeper {
    target: Arc<dyn Expiring>,
    interval: Duration,
    task: Mutex<Option<SweepTask>>,
}

impl CacheSweeper {
    pub fn new(target: Arc<dyn Expiring>, interval: Duration) -> Self {
        Self { target, interval, task: Mutex::new(None) }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the sweep task on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweeper is already running or the interval is
    /// zero.
    #[instrument(skip(self), fields(interval_secs = self.interval.as_secs()))]
    pub fn start(&self) -> CommonResult<()> {
        if self.interval.is_zero() {
            return Err(CommonError::config("Sweep interval must be positive"));
        }

        let mut guard = self.task.lock().map_err(|_| CommonError::internal("sweeper lock poisoned"))?;
        if guard.as_ref().is_some_and(|task| !task.handle.is_finished()) {
            return Err(CommonError::config("Cache sweeper already running"));
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Self::sweep_loop(
            Arc::clone(&self.target),
            self.interval,
            cancel.clone(),
        ));
        *guard = Some(SweepTask { cancel, handle });

        info!("Cache sweeper started");
        Ok(())
    }

    /// Cancel the sweep task and wait for it to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweeper is not running, the task panicked, or
    /// it did not stop within five seconds.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> CommonResult<()> {
        let task = self
            .task
            .lock()
            .map_err(|_| CommonError::internal("sweeper lock poisoned"))?
            .take()
            .ok_or_else(|| CommonError::config("Cache sweeper not running"))?;

        task.cancel.cancel();

        match tokio::time::timeout(STOP_TIMEOUT, task.handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "Cache sweeper task panicked");
                return Err(CommonError::internal(format!("Cache sweeper task panicked: {e}")));
            }
            Err(_) => {
                warn!("Cache sweeper did not stop within timeout");
                return Err(CommonError::timeout("cache_sweeper", STOP_TIMEOUT));
            }
        }

        info!("Cache sweeper stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .map(|guard| guard.as_ref().is_some_and(|task| !task.handle.is_finished()))
            .unwrap_or(false)
    }

    async fn sweep_loop(target: Arc<dyn Expiring>, interval: Duration, cancel: CancellationToken) {
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Cache sweep loop cancelled");
                    break;
                }
                () = tokio::time::sleep(interval) => {
                    let removed = target.purge_expired();
                    if removed > 0 {
                        debug!(removed, "Purged expired cache entries");
                    }
                }
            }
        }
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.task.lock() {
            if let Some(task) = guard.take() {
                task.cancel.cancel();
            }
        }
    }
}

impl std::fmt::Debug for CacheSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheSweeper")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
