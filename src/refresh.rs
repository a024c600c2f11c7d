//! Blocking wrapper around the runtime's asynchronous refresh
//!
//! The runtime re-links components on one of its own threads and reports
//! back through a one-shot callback. The barrier gives that callback the
//! sending half of a single-slot channel and blocks on the receiving half,
//! so the orchestrator wakes exactly once, after the refresh is done.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::ComponentRecord;
use crate::error::{Result, refresh as refresh_error};
use crate::runtime::HostRuntime;

/// Waits for a refresh to complete, optionally bounded by a timeout
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshBarrier {
    timeout: Option<Duration>,
}

impl RefreshBarrier {
    /// `None` waits for as long as the runtime takes
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Refresh `records` and block until the runtime signals completion.
    ///
    /// An empty set is a no-op. Fails with `RefreshTimeout` when the signal
    /// does not arrive in time and with `RefreshFailed` when the runtime
    /// drops the callback without calling it.
    pub fn refresh<R>(&self, runtime: &R, records: &[ComponentRecord]) -> Result<()>
    where
        R: HostRuntime + ?Sized,
    {
        if records.is_empty() {
            return Ok(());
        }

        let (done_tx, done_rx) = mpsc::sync_channel::<()>(1);
        runtime.request_refresh(
            records,
            Box::new(move || {
                // The waiter may have given up already; nothing left to tell.
                let _ = done_tx.send(());
            }),
        )?;

        let started = Instant::now();
        let received = match self.timeout {
            Some(timeout) => done_rx.recv_timeout(timeout),
            None => done_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(()) => {
                debug!(
                    "Refresh of {} component(s) completed in {:?}",
                    records.len(),
                    started.elapsed()
                );
                Ok(())
            }
            Err(RecvTimeoutError::Timeout) => Err(refresh_error::timeout(started.elapsed())),
            Err(RecvTimeoutError::Disconnected) => Err(refresh_error::failed(
                "runtime dropped the completion callback without signalling",
            )),
        }
    }
}
