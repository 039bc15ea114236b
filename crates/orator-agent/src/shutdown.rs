// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal handling and drain of in-flight assessments.
//!
//! SIGTERM and SIGINT cancel a [`CancellationToken`] that the serve loop
//! watches. In-flight event tasks are never aborted; the loop waits for the
//! [`TaskTracker`] to empty, bounded by a drain timeout.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Installs handlers for SIGTERM and SIGINT.
///
/// Returns a token that is cancelled when either signal arrives.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT, initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Closes the tracker and waits up to `timeout` for tracked tasks.
///
/// Returns `true` if every task finished in time.
pub async fn drain(tracker: &TaskTracker, timeout: Duration) -> bool {
    tracker.close();
    if tracker.is_empty() {
        info!("no in-flight events to drain");
        return true;
    }
    info!(count = tracker.len(), "waiting for in-flight events");
    match tokio::time::timeout(timeout, tracker.wait()).await {
        Ok(()) => {
            info!("all in-flight events completed");
            true
        }
        Err(_) => {
            warn!(remaining = tracker.len(), "drain timeout reached");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn install_signal_handler_returns_token() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }

    #[tokio::test]
    async fn drain_empty_tracker() {
        let tracker = TaskTracker::new();
        assert!(drain(&tracker, Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn drain_waits_for_tasks() {
        let tracker = TaskTracker::new();
        tracker.spawn(async {
            tokio::time::sleep(Duration::from_millis(30)).await;
        });
        assert!(drain(&tracker, Duration::from_secs(5)).await);
        assert!(tracker.is_empty());
    }

    #[tokio::test]
    async fn drain_times_out() {
        let tracker = TaskTracker::new();
        tracker.spawn(async {
            tokio::time::sleep(Duration::from_secs(10)).await;
        });
        assert!(!drain(&tracker, Duration::from_millis(20)).await);
    }
}
