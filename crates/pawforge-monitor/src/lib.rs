//! Background session watchdog for Pawforge.
//!
//! A [`SessionMonitor`] owns one spawned task that wakes on a fixed
//! interval (default: every 60 seconds) and enforces two limits against
//! vault-persisted timestamps:
//!
//! - **absolute session age** — a session older than 24 hours is force
//!   logged out no matter how active the user is;
//! - **inactivity** — more than 30 minutes without recorded activity
//!   ends the session.
//!
//! The monitor never touches the vault or the network itself. It talks
//! to the auth core through the [`SessionProbe`] trait, which keeps the
//! dependency arrow pointing the right way: the session manager
//! implements the probe and owns the monitor, not vice versa.
//!
//! # Lifecycle
//!
//! The task stops itself when the probe reports the session gone
//! (logout from anywhere, including a force-logout the monitor itself
//! triggered), or when [`SessionMonitor::stop`] is called. `stop` only
//! signals; it never blocks on the task. Dropping the monitor value
//! also signals, so an abandoned monitor cannot leak its task.
//!
//! # Integration
//!
//! ```ignore
//! let monitor = SessionMonitor::spawn(MonitorConfig::default(), probe);
//! // ... later, on logout:
//! monitor.stop();
//! ```

use std::ops::ControlFlow;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use pawforge_vault::VaultError;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing knobs for the session watchdog.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// How often the watchdog wakes up and checks.
    pub check_interval: Duration,
    /// Maximum absolute session age before force logout.
    pub session_timeout: Duration,
    /// Maximum time without recorded activity before force logout.
    pub idle_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            session_timeout: Duration::from_secs(24 * 60 * 60),
            idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

// ---------------------------------------------------------------------------
// Probe trait
// ---------------------------------------------------------------------------

/// Why the watchdog ended a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The session exceeded its absolute lifetime.
    SessionExpired,
    /// The user went idle past the inactivity limit.
    Inactive,
}

impl LogoutReason {
    /// Human-readable label for logs and UI events.
    pub fn label(self) -> &'static str {
        match self {
            Self::SessionExpired => "session_expired",
            Self::Inactive => "inactive",
        }
    }
}

/// What the watchdog needs from the auth core.
///
/// Timestamps are epoch milliseconds, matching what the session store
/// persists. `Ok(None)` means "not recorded" and the corresponding
/// check is skipped; `Err` means the vault read failed and the whole
/// tick is skipped (a flaky keystore must not log people out — and
/// must not kill the watchdog either).
pub trait SessionProbe: Send + Sync + 'static {
    /// Is there an authenticated session right now? `Ok(false)` stops
    /// the watchdog for good; `Err` skips the tick like any other
    /// failed read.
    fn is_authenticated(&self) -> impl Future<Output = Result<bool, VaultError>> + Send;

    /// When the current session started.
    fn session_started_at(
        &self,
    ) -> impl Future<Output = Result<Option<u64>, VaultError>> + Send;

    /// When user activity was last recorded.
    fn last_activity_at(
        &self,
    ) -> impl Future<Output = Result<Option<u64>, VaultError>> + Send;

    /// Record that the session is still live at this instant.
    fn touch_activity(&self) -> impl Future<Output = Result<(), VaultError>> + Send;

    /// End the session now. Must be safe to call when the session is
    /// already gone.
    fn force_logout(&self, reason: LogoutReason) -> impl Future<Output = ()> + Send;
}

/// A shared probe is still a probe, so the manager can hand the
/// watchdog a clone of its own `Arc`ed internals.
impl<P: SessionProbe> SessionProbe for std::sync::Arc<P> {
    fn is_authenticated(&self) -> impl Future<Output = Result<bool, VaultError>> + Send {
        (**self).is_authenticated()
    }

    fn session_started_at(
        &self,
    ) -> impl Future<Output = Result<Option<u64>, VaultError>> + Send {
        (**self).session_started_at()
    }

    fn last_activity_at(
        &self,
    ) -> impl Future<Output = Result<Option<u64>, VaultError>> + Send {
        (**self).last_activity_at()
    }

    fn touch_activity(&self) -> impl Future<Output = Result<(), VaultError>> + Send {
        (**self).touch_activity()
    }

    fn force_logout(&self, reason: LogoutReason) -> impl Future<Output = ()> + Send {
        (**self).force_logout(reason)
    }
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// Handle to the spawned watchdog task.
///
/// One monitor per authenticated session. Owning this value is what
/// keeps the watchdog conceptually alive; [`stop`](Self::stop) or drop
/// signals it to exit at the next opportunity.
pub struct SessionMonitor {
    shutdown: watch::Sender<()>,
}

impl SessionMonitor {
    /// Spawns the watchdog task and returns its handle.
    pub fn spawn<P: SessionProbe>(config: MonitorConfig, probe: P) -> Self {
        let (shutdown, mut signal) = watch::channel(());

        // First check fires one full interval from now, not
        // immediately — login itself just established freshness. The
        // ticker is anchored here, before the task is spawned, so the
        // interval counts from the spawn call rather than from
        // whenever the scheduler first polls the task.
        let start = time::Instant::now() + config.check_interval;
        let mut ticker = time::interval_at(start, config.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::spawn(async move {
            debug!(
                interval_s = config.check_interval.as_secs(),
                "session monitor started"
            );

            loop {
                tokio::select! {
                    res = signal.changed() => {
                        // Err means the handle was dropped; both mean stop.
                        let _ = res;
                        break;
                    }
                    _ = ticker.tick() => {
                        if check_session(&config, &probe).await.is_break() {
                            break;
                        }
                    }
                }
            }

            debug!("session monitor stopped");
        });

        Self { shutdown }
    }

    /// Signals the watchdog to stop. Idempotent; returns immediately
    /// without waiting for the task to observe the signal.
    pub fn stop(&self) {
        let _ = self.shutdown.send(());
    }

    /// Whether the watchdog task is still running. Becomes `false`
    /// shortly after the task exits for any reason.
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_closed()
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        // Dropping the sender closes the channel; the task sees it on
        // its next wakeup. Nothing to do, but make the intent explicit.
        self.stop();
    }
}

/// One watchdog tick. `Break` means the task should exit.
async fn check_session<P: SessionProbe>(
    config: &MonitorConfig,
    probe: &P,
) -> ControlFlow<()> {
    match probe.is_authenticated().await {
        Ok(true) => {}
        Ok(false) => {
            debug!("session gone, monitor exiting");
            return ControlFlow::Break(());
        }
        Err(e) => {
            // Could not tell. Ending the watchdog here would leave a
            // still-present session unsupervised forever; try again
            // next interval instead.
            warn!(error = %e, "authentication read failed, skipping check");
            return ControlFlow::Continue(());
        }
    }

    let now = epoch_ms();

    // Absolute session age.
    match probe.session_started_at().await {
        Ok(Some(started)) => {
            let age = now.saturating_sub(started);
            if age > config.session_timeout.as_millis() as u64 {
                info!(age_ms = age, "session exceeded maximum age, forcing logout");
                probe.force_logout(LogoutReason::SessionExpired).await;
                return ControlFlow::Break(());
            }
        }
        Ok(None) => {}
        Err(e) => {
            // Flaky storage is not a reason to end a session. Skip the
            // whole tick and try again next interval.
            warn!(error = %e, "session start read failed, skipping check");
            return ControlFlow::Continue(());
        }
    }

    // Inactivity.
    match probe.last_activity_at().await {
        Ok(Some(last)) => {
            let idle = now.saturating_sub(last);
            if idle > config.idle_timeout.as_millis() as u64 {
                info!(idle_ms = idle, "session idle past limit, forcing logout");
                probe.force_logout(LogoutReason::Inactive).await;
                return ControlFlow::Break(());
            }
        }
        Ok(None) => {}
        Err(e) => {
            warn!(error = %e, "last activity read failed, skipping check");
            return ControlFlow::Continue(());
        }
    }

    // Session healthy: the check itself counts as liveness, so push the
    // activity marker forward. A write failure only costs precision.
    if let Err(e) = probe.touch_activity().await {
        warn!(error = %e, "activity refresh failed");
    }

    ControlFlow::Continue(())
}

/// Current wall-clock time in epoch milliseconds.
fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
