//! Integration tests for the session watchdog.
//!
//! Uses `start_paused` so the 60-second check interval can be driven
//! with `tokio::time::advance`. The probe timestamps are wall-clock
//! (the monitor compares against `SystemTime`), so expired/idle cases
//! are staged by backdating the mock's timestamps, not by moving the
//! clock.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use pawforge_monitor::{LogoutReason, MonitorConfig, SessionMonitor, SessionProbe};
use pawforge_vault::VaultError;

// =========================================================================
// Helpers
// =========================================================================

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// Scriptable auth core standing in for the real session manager.
///
/// Timestamp zero means "not recorded".
struct MockProbe {
    authenticated: AtomicBool,
    session_start: AtomicU64,
    last_activity: AtomicU64,
    fail_reads: AtomicBool,
    fail_auth_read: AtomicBool,
    touch_count: AtomicUsize,
    logout_count: AtomicUsize,
    logout_reason: Mutex<Option<LogoutReason>>,
}

impl MockProbe {
    /// A healthy session that just started.
    fn healthy() -> Arc<Self> {
        let now = now_ms();
        Arc::new(Self {
            authenticated: AtomicBool::new(true),
            session_start: AtomicU64::new(now),
            last_activity: AtomicU64::new(now),
            fail_reads: AtomicBool::new(false),
            fail_auth_read: AtomicBool::new(false),
            touch_count: AtomicUsize::new(0),
            logout_count: AtomicUsize::new(0),
            logout_reason: Mutex::new(None),
        })
    }

    fn touches(&self) -> usize {
        self.touch_count.load(Ordering::SeqCst)
    }

    fn logouts(&self) -> usize {
        self.logout_count.load(Ordering::SeqCst)
    }

    fn reason(&self) -> Option<LogoutReason> {
        *self.logout_reason.lock().unwrap()
    }
}

impl SessionProbe for MockProbe {
    async fn is_authenticated(&self) -> Result<bool, VaultError> {
        if self.fail_auth_read.load(Ordering::SeqCst) {
            return Err(VaultError::Read("keystore offline".into()));
        }
        Ok(self.authenticated.load(Ordering::SeqCst))
    }

    async fn session_started_at(&self) -> Result<Option<u64>, VaultError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(VaultError::Read("keystore offline".into()));
        }
        match self.session_start.load(Ordering::SeqCst) {
            0 => Ok(None),
            ts => Ok(Some(ts)),
        }
    }

    async fn last_activity_at(&self) -> Result<Option<u64>, VaultError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(VaultError::Read("keystore offline".into()));
        }
        match self.last_activity.load(Ordering::SeqCst) {
            0 => Ok(None),
            ts => Ok(Some(ts)),
        }
    }

    async fn touch_activity(&self) -> Result<(), VaultError> {
        self.touch_count.fetch_add(1, Ordering::SeqCst);
        self.last_activity.store(now_ms(), Ordering::SeqCst);
        Ok(())
    }

    async fn force_logout(&self, reason: LogoutReason) {
        self.logout_count.fetch_add(1, Ordering::SeqCst);
        self.authenticated.store(false, Ordering::SeqCst);
        *self.logout_reason.lock().unwrap() = Some(reason);
    }
}

/// Yield enough times for the spawned watchdog task to observe a timer
/// or shutdown signal on the current-thread test runtime.
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Advance past one check interval and let the watchdog run its tick.
async fn run_one_tick() {
    tokio::time::advance(Duration::from_secs(61)).await;
    settle().await;
}

// =========================================================================
// Healthy session
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_healthy_session_touches_activity_each_tick() {
    let probe = MockProbe::healthy();
    let monitor = SessionMonitor::spawn(MonitorConfig::default(), probe.clone());

    run_one_tick().await;
    run_one_tick().await;

    assert_eq!(probe.touches(), 2);
    assert_eq!(probe.logouts(), 0);
    assert!(monitor.is_running());

    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_no_check_before_first_interval() {
    let probe = MockProbe::healthy();
    let monitor = SessionMonitor::spawn(MonitorConfig::default(), probe.clone());

    // Half an interval: the watchdog must not have fired yet.
    tokio::time::advance(Duration::from_secs(30)).await;
    settle().await;

    assert_eq!(probe.touches(), 0);
    monitor.stop();
}

// =========================================================================
// Exit conditions
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_monitor_exits_when_session_is_gone() {
    let probe = MockProbe::healthy();
    let monitor = SessionMonitor::spawn(MonitorConfig::default(), probe.clone());

    // Logout happened elsewhere (user tapped "sign out").
    probe.authenticated.store(false, Ordering::SeqCst);

    run_one_tick().await;

    assert!(!monitor.is_running());
    assert_eq!(probe.logouts(), 0, "monitor observed the logout, didn't cause one");
}

#[tokio::test(start_paused = true)]
async fn test_session_past_maximum_age_is_force_logged_out() {
    let probe = MockProbe::healthy();
    // Session started 25 hours ago; the 24-hour cap applies even
    // though activity is current.
    probe
        .session_start
        .store(now_ms() - 25 * 60 * 60 * 1000, Ordering::SeqCst);

    let monitor = SessionMonitor::spawn(MonitorConfig::default(), probe.clone());
    run_one_tick().await;

    assert_eq!(probe.logouts(), 1);
    assert_eq!(probe.reason(), Some(LogoutReason::SessionExpired));
    assert!(!monitor.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_idle_session_is_force_logged_out() {
    let probe = MockProbe::healthy();
    // Last activity 31 minutes ago against the 30-minute limit.
    probe
        .last_activity
        .store(now_ms() - 31 * 60 * 1000, Ordering::SeqCst);

    let monitor = SessionMonitor::spawn(MonitorConfig::default(), probe.clone());
    run_one_tick().await;

    assert_eq!(probe.logouts(), 1);
    assert_eq!(probe.reason(), Some(LogoutReason::Inactive));
    assert!(!monitor.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_active_session_within_age_limit_survives() {
    let probe = MockProbe::healthy();
    // 23 hours old but active: below the cap, stays alive.
    probe
        .session_start
        .store(now_ms() - 23 * 60 * 60 * 1000, Ordering::SeqCst);

    let monitor = SessionMonitor::spawn(MonitorConfig::default(), probe.clone());
    run_one_tick().await;

    assert_eq!(probe.logouts(), 0);
    assert!(monitor.is_running());
    monitor.stop();
}

// =========================================================================
// Storage failures
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_read_failure_skips_tick_without_logout() {
    let probe = MockProbe::healthy();
    // Backdate so a successful read WOULD expire the session. The
    // failing read must prevent that, not trigger it.
    probe
        .session_start
        .store(now_ms() - 25 * 60 * 60 * 1000, Ordering::SeqCst);
    probe.fail_reads.store(true, Ordering::SeqCst);

    let monitor = SessionMonitor::spawn(MonitorConfig::default(), probe.clone());
    run_one_tick().await;
    run_one_tick().await;

    assert_eq!(probe.logouts(), 0);
    assert_eq!(probe.touches(), 0, "a skipped tick records nothing");
    assert!(monitor.is_running(), "flaky storage must not kill the monitor");

    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_authentication_read_failure_keeps_monitor_alive() {
    let probe = MockProbe::healthy();
    probe.fail_auth_read.store(true, Ordering::SeqCst);

    let monitor = SessionMonitor::spawn(MonitorConfig::default(), probe.clone());
    run_one_tick().await;
    run_one_tick().await;

    // The session is still authenticated; the watchdog must not
    // mistake the failed read for a logout and exit for good.
    assert!(monitor.is_running());
    assert_eq!(probe.logouts(), 0);
    assert_eq!(probe.touches(), 0, "a skipped tick records nothing");

    // Storage recovers: supervision resumes on the next tick.
    probe.fail_auth_read.store(false, Ordering::SeqCst);
    run_one_tick().await;

    assert_eq!(probe.touches(), 1);
    assert!(monitor.is_running());

    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_recovered_storage_resumes_enforcement() {
    let probe = MockProbe::healthy();
    probe
        .last_activity
        .store(now_ms() - 31 * 60 * 1000, Ordering::SeqCst);
    probe.fail_reads.store(true, Ordering::SeqCst);

    let monitor = SessionMonitor::spawn(MonitorConfig::default(), probe.clone());
    run_one_tick().await;
    assert_eq!(probe.logouts(), 0);

    probe.fail_reads.store(false, Ordering::SeqCst);
    run_one_tick().await;

    assert_eq!(probe.logouts(), 1);
    assert_eq!(probe.reason(), Some(LogoutReason::Inactive));
    assert!(!monitor.is_running());
}

// =========================================================================
// Missing timestamps
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_missing_timestamps_skip_their_checks() {
    let probe = MockProbe::healthy();
    probe.session_start.store(0, Ordering::SeqCst);
    probe.last_activity.store(0, Ordering::SeqCst);

    let monitor = SessionMonitor::spawn(MonitorConfig::default(), probe.clone());
    run_one_tick().await;

    // Neither limit can be evaluated; the tick still refreshes activity.
    assert_eq!(probe.logouts(), 0);
    assert_eq!(probe.touches(), 1);
    assert!(monitor.is_running());

    monitor.stop();
}

// =========================================================================
// stop()
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent_and_terminates_the_task() {
    let probe = MockProbe::healthy();
    let monitor = SessionMonitor::spawn(MonitorConfig::default(), probe.clone());

    monitor.stop();
    monitor.stop();
    settle().await;

    assert!(!monitor.is_running());

    // No further ticks after stop.
    run_one_tick().await;
    assert_eq!(probe.touches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_custom_intervals_are_honored() {
    let probe = MockProbe::healthy();
    let config = MonitorConfig {
        check_interval: Duration::from_secs(5),
        ..MonitorConfig::default()
    };
    let monitor = SessionMonitor::spawn(config, probe.clone());

    tokio::time::advance(Duration::from_secs(6)).await;
    settle().await;

    assert_eq!(probe.touches(), 1);
    monitor.stop();
}
