//! Build-timestamp poller.
//!
//! Watches the modification time of a single marker file that the asset
//! build touches when it finishes. Polling a single file keeps the watcher
//! independent of how the build writes its outputs: partially written files
//! never trigger a reload, only the final touch of the marker does.
//!
//! The first successful observation only establishes a baseline. A marker
//! that disappears (for example while the build wipes its output directory)
//! is skipped without forgetting the baseline.

use rand::Rng;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Timing of the poll loop.
///
/// Every tick waits `interval` plus a uniformly drawn extra delay in
/// `[0, jitter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval: Duration,
    pub jitter: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(400),
            jitter: Duration::from_millis(100),
        }
    }
}

impl PollerConfig {
    /// Draw the delay before the next tick.
    pub fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..jitter_ms)
        };
        self.interval + Duration::from_millis(extra)
    }
}

/// A detected change of the marker's modification time, in epoch millis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampChange {
    pub current: u64,
    pub previous: Option<u64>,
}

/// Last observed modification time. Owned by a single poll loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollStatus {
    timestamp: Option<u64>,
}

impl PollStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last observed timestamp, if any observation succeeded yet.
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    /// Fold one tick's observation into the status.
    ///
    /// `None` means the file was absent this tick. Returns the change to
    /// report, if any.
    pub fn observe(&mut self, observed: Option<u64>) -> Option<TimestampChange> {
        let current = observed?;
        match self.timestamp {
            None => {
                self.timestamp = Some(current);
                None
            }
            Some(last) if last == current => None,
            previous => {
                self.timestamp = Some(current);
                Some(TimestampChange { current, previous })
            }
        }
    }
}

/// Read a file's modification time in epoch millis.
///
/// Returns `Ok(None)` when the file does not exist; every other error is
/// returned to the caller.
pub async fn read_timestamp(path: &Path) -> io::Result<Option<u64>> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let modified = metadata.modified()?;
    let millis = modified
        .duration_since(UNIX_EPOCH)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        .as_millis();
    Ok(Some(millis as u64))
}

/// Background poll loop over one file.
pub struct TimestampPoller;

impl TimestampPoller {
    /// Start polling `path` on the current tokio runtime.
    ///
    /// Returns immediately. `on_change` runs on the poll task, once per
    /// detected change. The loop ends when the handle is stopped or dropped,
    /// or with an error on any I/O failure other than the file being absent.
    pub fn spawn<F>(path: impl Into<PathBuf>, config: PollerConfig, on_change: F) -> PollerHandle
    where
        F: FnMut(TimestampChange) + Send + 'static,
    {
        let path = path.into();
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(poll_loop(path, config, on_change, stop_rx));
        PollerHandle {
            stop_tx: Some(stop_tx),
            task,
        }
    }
}

async fn poll_loop<F>(
    path: PathBuf,
    config: PollerConfig,
    mut on_change: F,
    mut stop_rx: oneshot::Receiver<()>,
) -> io::Result<()>
where
    F: FnMut(TimestampChange),
{
    let mut status = PollStatus::new();
    tracing::debug!("Polling {} for changes", path.display());

    loop {
        let observed = read_timestamp(&path).await.inspect_err(|e| {
            tracing::error!("Polling {} failed: {}", path.display(), e);
        })?;

        if let Some(change) = status.observe(observed) {
            tracing::debug!(
                "{} changed: {:?} -> {}",
                path.display(),
                change.previous,
                change.current
            );
            on_change(change);
        }

        tokio::select! {
            _ = tokio::time::sleep(config.next_delay()) => {}
            // Fires on an explicit stop and when the handle is dropped.
            _ = &mut stop_rx => {
                tracing::debug!("Stopped polling {}", path.display());
                return Ok(());
            }
        }
    }
}

/// Handle to a running poll loop.
pub struct PollerHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<io::Result<()>>,
}

impl PollerHandle {
    /// Whether the loop has ended, either stopped or failed.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop and wait for it to end.
    ///
    /// Returns the loop's own error if it had already failed.
    pub async fn stop(mut self) -> io::Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        self.join().await
    }

    /// Wait for the loop to end without asking it to stop.
    pub async fn join(self) -> io::Result<()> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(io::Error::other(e)),
        }
    }
}
