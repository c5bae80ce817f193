//! The auth session manager: the one front door for authentication.
//!
//! Ties the layers together: backend API calls ([`AuthApi`]), durable
//! session state ([`SessionStore`]), biometric gating
//! ([`BiometricGate`]), and the background watchdog
//! ([`SessionMonitor`]). The app holds exactly one of these (cheaply
//! cloneable, all state behind an `Arc`) and calls it from any task.
//!
//! # Concurrency model
//!
//! - Token refresh is serialized behind an async mutex: two tasks that
//!   both notice an expiring token produce one refresh call, not a race
//!   where the loser submits an already-rotated (dead) refresh token.
//! - Logout bumps an epoch counter. A refresh that completes after a
//!   logout sees the epoch moved and discards its new tokens instead of
//!   resurrecting the session.
//! - The watchdog talks back through [`SessionProbe`], implemented on
//!   the shared inner state, so it observes logouts from anywhere and
//!   stops itself.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use pawforge_biometric::{BiometricGate, BiometricProvider};
use pawforge_claims as claims;
use pawforge_claims::TokenValidation;
use pawforge_monitor::{LogoutReason, MonitorConfig, SessionMonitor, SessionProbe};
use pawforge_vault::{CredentialVault, VaultError};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::api::AuthApi;
use crate::error::AuthError;
use crate::store::{SessionStore, now_ms};
use crate::types::{
    AuthSession, BiometricCredential, Credentials, RegisterData,
    ResetPasswordData, UserSnapshot, UserUpdate,
};

/// How many times a token refresh is attempted before giving up.
const REFRESH_ATTEMPTS: u32 = 3;

/// Backoff step between refresh attempts (0ms, 200ms, 400ms).
const REFRESH_BACKOFF: Duration = Duration::from_millis(200);

// ---------------------------------------------------------------------------
// Shared inner state
// ---------------------------------------------------------------------------

struct Inner<A, V, P>
where
    A: AuthApi,
    V: CredentialVault,
    P: BiometricProvider,
{
    api: A,
    store: SessionStore<Arc<V>>,
    gate: BiometricGate<P, Arc<V>>,
    monitor_config: MonitorConfig,
    /// Serializes refresh/rotation so concurrent callers can't burn the
    /// single-use refresh token against each other.
    refresh_lock: tokio::sync::Mutex<()>,
    /// The running watchdog, if any. `std::sync::Mutex` because it is
    /// only touched in short non-await critical sections.
    monitor: std::sync::Mutex<Option<SessionMonitor>>,
    /// Bumped on every logout. In-flight refreshes compare it before
    /// persisting; a mismatch means the session they were refreshing no
    /// longer exists.
    logout_epoch: AtomicU64,
}

impl<A, V, P> Inner<A, V, P>
where
    A: AuthApi,
    V: CredentialVault,
    P: BiometricProvider,
{
    /// Tears the session down: epoch bump, watchdog stop, best-effort
    /// server-side revocation, local clear. Infallible by design — the
    /// user asked to be logged out, so they get logged out.
    async fn end_session(&self, why: &str) {
        self.logout_epoch.fetch_add(1, Ordering::SeqCst);

        if let Some(monitor) = lock_unpoisoned(&self.monitor).take() {
            monitor.stop();
        }

        if let Some(refresh) = self.store.refresh_token().await {
            if let Err(e) = self.api.logout(&refresh).await {
                warn!(error = %e, "server-side token revocation failed");
            }
        }

        self.store.clear_session().await;
        info!(reason = why, "session ended");
    }
}

/// Watchdog's view of the session. The monitor crate's `Arc` blanket
/// impl lets the manager hand its shared inner state straight to
/// [`SessionMonitor::spawn`].
impl<A, V, P> SessionProbe for Inner<A, V, P>
where
    A: AuthApi,
    V: CredentialVault,
    P: BiometricProvider,
{
    async fn is_authenticated(&self) -> Result<bool, VaultError> {
        // The strict variant: the watchdog must not mistake a flaky
        // keystore for a logout and stop supervising for good.
        self.store.session_present().await
    }

    async fn session_started_at(&self) -> Result<Option<u64>, VaultError> {
        self.store.session_started_at().await
    }

    async fn last_activity_at(&self) -> Result<Option<u64>, VaultError> {
        self.store.last_activity_at().await
    }

    async fn touch_activity(&self) -> Result<(), VaultError> {
        self.store.touch_activity().await
    }

    async fn force_logout(&self, reason: LogoutReason) {
        self.end_session(reason.label()).await;
    }
}

/// Takes the lock even if a panicking thread poisoned it — the
/// `Option<SessionMonitor>` inside is valid in every intermediate state.
fn lock_unpoisoned<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// The app-facing authentication core.
///
/// Generic over its three seams — backend client, credential vault,
/// biometric provider — so the whole state machine runs against mocks
/// in tests and against platform implementations in the app.
pub struct AuthSessionManager<A, V, P>
where
    A: AuthApi,
    V: CredentialVault,
    P: BiometricProvider,
{
    inner: Arc<Inner<A, V, P>>,
}

impl<A, V, P> Clone for AuthSessionManager<A, V, P>
where
    A: AuthApi,
    V: CredentialVault,
    P: BiometricProvider,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, V, P> AuthSessionManager<A, V, P>
where
    A: AuthApi,
    V: CredentialVault,
    P: BiometricProvider,
{
    /// Builds the manager with the default watchdog timings (60s
    /// checks, 24h session cap, 30min idle limit).
    pub fn new(api: A, vault: V, provider: P) -> Self {
        Self::with_monitor_config(api, vault, provider, MonitorConfig::default())
    }

    /// Builds the manager with custom watchdog timings. Mostly for
    /// tests; production uses [`new`](Self::new).
    pub fn with_monitor_config(
        api: A,
        vault: V,
        provider: P,
        monitor_config: MonitorConfig,
    ) -> Self {
        let vault = Arc::new(vault);
        Self {
            inner: Arc::new(Inner {
                api,
                store: SessionStore::new(Arc::clone(&vault)),
                gate: BiometricGate::new(provider, vault),
                monitor_config,
                refresh_lock: tokio::sync::Mutex::new(()),
                monitor: std::sync::Mutex::new(None),
                logout_epoch: AtomicU64::new(0),
            }),
        }
    }

    // -- Login / register / logout ----------------------------------------

    /// Email/password login. On success the session is persisted, the
    /// 24-hour window starts, and the watchdog is running.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserSnapshot, AuthError> {
        let payload = self.inner.api.login(credentials).await?;
        self.inner.store.persist_session(&payload).await?;
        self.start_monitoring();
        info!(user_id = %payload.user.id, "login succeeded");
        Ok(payload.user)
    }

    /// Creates an account and logs it in. The password confirmation is
    /// checked locally first; a mismatch never reaches the network.
    pub async fn register(&self, data: &RegisterData) -> Result<UserSnapshot, AuthError> {
        if data.password != data.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".into()));
        }

        let payload = self.inner.api.register(data).await?;
        self.inner.store.persist_session(&payload).await?;
        self.start_monitoring();
        info!(user_id = %payload.user.id, "registration succeeded");
        Ok(payload.user)
    }

    /// Logs out. Always succeeds locally: server-side revocation is
    /// attempted but a dead network can't keep a user signed in.
    /// Biometric enrollment survives — it belongs to the device.
    pub async fn logout(&self) {
        self.inner.end_session("user logout").await;
    }

    // -- Token refresh -----------------------------------------------------

    /// Refreshes the token pair, returning the new access token.
    ///
    /// Up to three attempts with 0/200/400ms backoff; the first success
    /// short-circuits. Returns `None` when there is no refresh token or
    /// all attempts fail — and on exhaustion the stored credentials are
    /// **kept**, so a connectivity blip in a tunnel doesn't log anyone
    /// out. The session cap and idle limit still bound how long a
    /// stale session can linger.
    pub async fn refresh_token(&self) -> Option<String> {
        let _guard = self.inner.refresh_lock.lock().await;
        let epoch = self.inner.logout_epoch.load(Ordering::SeqCst);

        let refresh = self.inner.store.refresh_token().await?;

        for attempt in 1..=REFRESH_ATTEMPTS {
            if attempt > 1 {
                tokio::time::sleep(REFRESH_BACKOFF * (attempt - 1)).await;
            }

            match self.inner.api.refresh(&refresh).await {
                Ok(tokens) => {
                    if self.inner.logout_epoch.load(Ordering::SeqCst) != epoch {
                        // Logged out while the request was in flight.
                        // Persisting now would resurrect a dead session.
                        debug!("logout during refresh, discarding new tokens");
                        return None;
                    }
                    if let Err(e) = self.inner.store.persist_tokens(&tokens).await {
                        warn!(error = %e, "refreshed tokens could not be persisted");
                        return None;
                    }
                    debug!(attempt, "token refresh succeeded");
                    return Some(tokens.access_token);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "token refresh attempt failed");
                }
            }
        }

        warn!("token refresh exhausted all attempts, keeping credentials");
        None
    }

    /// Explicitly extends the session: one refresh attempt that, on
    /// success, also restarts the 24-hour window. This is the *only*
    /// operation that moves `session_start_time` of a live session.
    ///
    /// A failed rotation ends the session — the caller asked to prove
    /// the session is still good, and the backend said no.
    pub async fn rotate_tokens(&self) -> Result<(), AuthError> {
        let _guard = self.inner.refresh_lock.lock().await;
        let epoch = self.inner.logout_epoch.load(Ordering::SeqCst);

        let Some(refresh) = self.inner.store.refresh_token().await else {
            return Err(AuthError::Validation("No session to extend".into()));
        };

        match self.inner.api.refresh(&refresh).await {
            Ok(tokens) => {
                if self.inner.logout_epoch.load(Ordering::SeqCst) != epoch {
                    return Err(AuthError::Validation("Session ended".into()));
                }
                self.inner.store.persist_tokens(&tokens).await?;
                self.inner.store.reset_session_window().await?;
                info!("session extended, 24-hour window restarted");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "session extension rejected, logging out");
                self.inner.end_session("rotation failed").await;
                Err(e.into())
            }
        }
    }

    /// Returns an access token that is valid and not about to expire,
    /// refreshing first if needed. `None` means no session, or the
    /// needed refresh failed.
    pub async fn ensure_valid_token(&self) -> Option<String> {
        let token = self.inner.store.access_token().await?;
        let validation = claims::validate(&token);
        if validation.is_valid && !claims::should_refresh(&token) {
            return Some(token);
        }
        self.refresh_token().await
    }

    /// Validates the stored access token's shape and expiry. No
    /// session reads as an invalid (but not expired) result.
    pub async fn validate_access_token(&self) -> TokenValidation {
        match self.inner.store.access_token().await {
            Some(token) => claims::validate(&token),
            None => TokenValidation {
                is_valid: false,
                is_expired: false,
                expires_at: None,
                expires_in_ms: 0,
                claims: None,
                error: Some("No access token".into()),
            },
        }
    }

    /// Whether the stored access token is inside the proactive refresh
    /// window (expiring within 5 minutes, but not yet expired).
    pub async fn needs_token_refresh(&self) -> bool {
        match self.inner.store.access_token().await {
            Some(token) => claims::should_refresh(&token),
            None => false,
        }
    }

    // -- Biometric login ---------------------------------------------------

    /// Logs in by biometric prompt instead of password.
    ///
    /// No network traffic happens until the user has passed the prompt:
    /// the stored credential is only unlocked and submitted afterwards.
    pub async fn login_with_biometrics(&self) -> Result<UserSnapshot, AuthError> {
        if !self.is_biometric_enabled().await {
            return Err(AuthError::BiometricUnavailable);
        }
        let caps = self.inner.gate.check_support().await;
        if !caps.available() {
            return Err(AuthError::BiometricUnavailable);
        }

        let outcome = self
            .inner
            .gate
            .authenticate(Some("Log in to PawfectMatch"))
            .await;
        if !outcome.success {
            warn!(
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "biometric prompt failed"
            );
            return Err(AuthError::BiometricFailed);
        }

        let Some(cred) = self.inner.store.biometric_credential().await else {
            warn!("biometric enabled but no stored credential");
            return Err(AuthError::BiometricFailed);
        };

        let payload = self
            .inner
            .api
            .biometric_login(&cred.email, &cred.biometric_token)
            .await
            .map_err(|e| {
                warn!(error = %e, "biometric credential rejected by backend");
                AuthError::BiometricFailed
            })?;

        self.inner.store.persist_session(&payload).await?;
        self.start_monitoring();
        info!(user_id = %payload.user.id, "biometric login succeeded");
        Ok(payload.user)
    }

    /// Enables biometric login for the signed-in user: fresh prompt,
    /// then a device-local credential is generated and stored. Returns
    /// `false` on any failure — this backs a settings toggle that
    /// simply stays off.
    pub async fn enable_biometric_authentication(&self) -> bool {
        let Some(user) = self.inner.store.user().await else {
            warn!("cannot enable biometric login without a signed-in user");
            return false;
        };

        if !self.inner.gate.enable().await {
            return false;
        }

        let cred = BiometricCredential {
            email: user.email,
            biometric_token: generate_biometric_token(),
        };
        if let Err(e) = self.inner.store.save_biometric_credential(&cred).await {
            warn!(error = %e, "biometric credential could not be stored");
            // Roll the flag back rather than leave enabled-but-unusable.
            self.inner.gate.disable().await;
            return false;
        }
        true
    }

    /// Disables biometric login and discards the stored credential.
    pub async fn disable_biometric_authentication(&self) {
        self.inner.gate.disable().await;
        self.inner.store.clear_biometric_credential().await;
    }

    /// Biometric login is usable: the flag is on *and* a credential is
    /// actually stored.
    pub async fn is_biometric_enabled(&self) -> bool {
        self.inner.gate.is_enabled().await
            && self.inner.store.biometric_credential().await.is_some()
    }

    // -- Session state ----------------------------------------------------

    /// Restores a persisted session on app startup.
    ///
    /// Partial state (token without user, or vice versa) is cleared and
    /// reads as logged out. An expired access token triggers a refresh;
    /// if that fails, `None` — but credentials are kept for a later
    /// attempt with better connectivity.
    pub async fn restore(&self) -> Option<AuthSession> {
        let token = self.inner.store.access_token().await;
        let user = self.inner.store.user().await;

        let (token, user) = match (token, user) {
            (Some(token), Some(user)) => (token, user),
            (None, None) => return None,
            _ => {
                warn!("partial session state found, clearing");
                self.inner.store.clear_session().await;
                return None;
            }
        };

        if claims::is_expired(&token) {
            debug!("stored access token expired, refreshing");
            self.refresh_token().await?;
        }

        self.record_user_activity().await;
        self.start_monitoring();

        let session_started_at = self.inner.store.session_started_at().await.ok().flatten();
        let last_activity_at = self.inner.store.last_activity_at().await.ok().flatten();

        info!(user_id = %user.id, "session restored");
        Some(AuthSession {
            user,
            session_started_at,
            last_activity_at,
        })
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.store.is_authenticated().await
    }

    pub async fn get_access_token(&self) -> Option<String> {
        self.inner.store.access_token().await
    }

    pub async fn get_current_user(&self) -> Option<UserSnapshot> {
        self.inner.store.user().await
    }

    /// Applies a partial profile update to the cached snapshot.
    pub async fn update_user(&self, update: &UserUpdate) -> Result<UserSnapshot, AuthError> {
        let Some(mut user) = self.inner.store.user().await else {
            return Err(AuthError::Validation("No authenticated user".into()));
        };
        update.apply_to(&mut user);
        self.inner.store.save_user(&user).await?;
        Ok(user)
    }

    /// Pushes the inactivity marker forward. Call on meaningful user
    /// interaction; a failed write only costs idle-tracking precision.
    pub async fn record_user_activity(&self) {
        if let Err(e) = self.inner.store.touch_activity().await {
            warn!(error = %e, "activity write failed");
        }
    }

    /// Whether the session watchdog task is running.
    pub fn is_monitoring(&self) -> bool {
        lock_unpoisoned(&self.inner.monitor)
            .as_ref()
            .is_some_and(|m| m.is_running())
    }

    // -- Password recovery -------------------------------------------------

    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        self.inner.api.forgot_password(email).await?;
        Ok(())
    }

    pub async fn reset_password(&self, data: &ResetPasswordData) -> Result<(), AuthError> {
        if data.password != data.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".into()));
        }
        self.inner.api.reset_password(data).await?;
        Ok(())
    }

    // -- Internals ---------------------------------------------------------

    /// Starts the watchdog if it isn't already running. Idempotent;
    /// repeated logins reuse the live task instead of stacking tasks.
    fn start_monitoring(&self) {
        let mut guard = lock_unpoisoned(&self.inner.monitor);
        if guard.as_ref().is_some_and(|m| m.is_running()) {
            return;
        }
        *guard = Some(SessionMonitor::spawn(
            self.inner.monitor_config.clone(),
            Arc::clone(&self.inner),
        ));
    }
}

/// Device-local biometric credential token: timestamp prefix plus a
/// random alphanumeric suffix. Opaque to everyone but the backend that
/// registered it.
fn generate_biometric_token() -> String {
    let suffix: String = rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(11)
        .map(char::from)
        .collect();
    format!("{}{suffix}", now_ms())
}

// =========================================================================
// Tests
// =========================================================================
