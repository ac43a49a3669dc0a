//! Server lifecycle state and request draining.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tracing::{info, warn};

/// Lifecycle of the server: `Starting -> Ready -> Draining -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Starting,
    Ready,
    /// Shutdown requested; finishing requests already accepted.
    Draining,
    Stopped,
}

impl HealthState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

/// Shared between the router (which counts requests) and `serve` (which
/// moves the lifecycle along and waits for the count to reach zero).
#[derive(Debug)]
pub struct ShutdownController {
    in_flight: Arc<AtomicU64>,
    health_state: ArcSwap<HealthState>,
}

impl ShutdownController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(AtomicU64::new(0)),
            health_state: ArcSwap::from_pointee(HealthState::Starting),
        }
    }

    pub fn set_ready(&self) {
        self.health_state.store(Arc::new(HealthState::Ready));
    }

    pub fn trigger_shutdown(&self) {
        self.health_state.store(Arc::new(HealthState::Draining));
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.health_state.load()
    }

    /// Counts one request until the guard drops.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Polls until no request is in flight or `timeout` passes.
    ///
    /// Moves to `Stopped` and returns `true` on a clean drain; leaves the
    /// state at `Draining` and returns `false` on timeout.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.in_flight_count() > 0 {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.health_state.store(Arc::new(HealthState::Stopped));
        true
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Resolves on Ctrl-C, or on SIGTERM under Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl-C"),
        () = terminate => info!("received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_moves_forward() {
        let controller = ShutdownController::new();
        assert_eq!(controller.health_state(), HealthState::Starting);
        controller.set_ready();
        assert_eq!(controller.health_state().as_str(), "ready");
        controller.trigger_shutdown();
        assert_eq!(controller.health_state().as_str(), "draining");
    }

    #[test]
    fn guards_count_requests() {
        let controller = ShutdownController::new();
        let first = controller.in_flight_guard();
        let second = controller.in_flight_guard();
        assert_eq!(controller.in_flight_count(), 2);
        drop(first);
        drop(second);
        assert_eq!(controller.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn drain_waits_for_last_request() {
        let controller = ShutdownController::new();
        let guard = controller.in_flight_guard();
        controller.trigger_shutdown();

        let release = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(guard);
        });

        assert!(controller.wait_for_drain(Duration::from_secs(2)).await);
        assert_eq!(controller.health_state(), HealthState::Stopped);
        release.await.unwrap();
    }

    #[tokio::test]
    async fn drain_gives_up_after_timeout() {
        let controller = ShutdownController::new();
        let _guard = controller.in_flight_guard();
        controller.trigger_shutdown();

        assert!(!controller.wait_for_drain(Duration::from_millis(50)).await);
        assert_eq!(controller.health_state(), HealthState::Draining);
    }
}
