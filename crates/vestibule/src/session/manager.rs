//! The session manager: orchestrates credentials, identity, permissions,
//! and the rotation policy into one observable state machine.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::auth::{AccessToken, CredentialHolder, Credentials, RefreshToken};
use crate::authz::{PermissionResolver, PermissionSet};
use crate::error::{AuthError, Error};
use crate::http::endpoints::{
    self, LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RefreshResponse,
    RegisterRequest,
};
use crate::http::ApiClient;
use crate::identity::{Identity, SnapshotCache};
use crate::policy::{self, PasswordAudit};
use crate::storage::Storage;
use crate::types::ServerUrl;

use super::{RotationPrompt, SessionState};

/// Upper bound on the projected size of the authorization header for the
/// live identity fetch. Beyond this, intermediaries start rejecting the
/// request outright, so the manager falls back to degraded mode instead.
pub const MAX_BEARER_HEADER_BYTES: usize = 8 * 1024;

const BEARER_HEADER_PREFIX: &str = "Authorization: Bearer ";

fn projected_bearer_len(token: &AccessToken) -> usize {
    BEARER_HEADER_PREFIX.len() + token.len()
}

/// Orchestrator of the signed-in session.
///
/// Owns the credential holder, the identity snapshot cache, and the
/// permission resolver, and drives them through the session state machine:
/// bootstrap via [`initialize`](Self::initialize), then
/// [`login`](Self::login) / [`refresh`](Self::refresh) /
/// [`logout`](Self::logout). The externally observable state is available
/// through [`state`](Self::state) and the other read-only accessors.
///
/// Cheap to clone (internal `Arc`) and safe to share across tasks.
/// `initialize` and `login` are each single-flight: concurrent calls
/// collapse into one execution, and a superseded operation can never
/// overwrite the state written by a newer one.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    client: ApiClient,
    credentials: CredentialHolder,
    snapshot: SnapshotCache,
    permissions: PermissionResolver,
    state: RwLock<SessionState>,
    rotation: RwLock<Option<RotationPrompt>>,
    loading: AtomicBool,
    // Bumped at the start of every mutating operation; state writes carrying
    // an older epoch are discarded as stale.
    epoch: AtomicU64,
    // true once initialize() has completed
    init_guard: Mutex<bool>,
    login_guard: Mutex<()>,
}

impl SessionManager {
    /// Create a manager for `server`, persisting session state in `storage`.
    ///
    /// Any credential pair already persisted in `storage` is rehydrated into
    /// the credential holder; call [`initialize`](Self::initialize) to turn
    /// it into a live session.
    pub fn new(server: ServerUrl, storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(Inner {
                client: ApiClient::new(server),
                credentials: CredentialHolder::new(storage.clone()),
                snapshot: SnapshotCache::new(storage),
                permissions: PermissionResolver::new(),
                state: RwLock::new(SessionState::Uninitialized),
                rotation: RwLock::new(None),
                loading: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
                init_guard: Mutex::new(false),
                login_guard: Mutex::new(()),
            }),
        }
    }

    // ========================================================================
    // Observables
    // ========================================================================

    /// The current session state.
    pub fn state(&self) -> SessionState {
        self.inner.state.read().unwrap().clone()
    }

    /// The current identity, if authenticated.
    pub fn identity(&self) -> Option<Identity> {
        self.state().identity().cloned()
    }

    /// True while `initialize` or `login` is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::SeqCst)
    }

    /// The pending password-rotation prompt, if the policy requires one.
    pub fn password_rotation(&self) -> Option<RotationPrompt> {
        self.inner.rotation.read().unwrap().clone()
    }

    /// Dismiss the password-rotation prompt.
    pub fn dismiss_password_rotation(&self) {
        *self.inner.rotation.write().unwrap() = None;
    }

    /// True if the cached permission set grants `permission`.
    ///
    /// Fail-closed: with no cached set, only ever `false`.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.inner.permissions.has_permission(permission)
    }

    /// The cached permission set, if any.
    pub fn permissions(&self) -> Option<PermissionSet> {
        self.inner.permissions.cached()
    }

    // ========================================================================
    // Lifecycle operations
    // ========================================================================

    /// Bootstrap the session from persisted state.
    ///
    /// Single-flight: concurrent invocations collapse into one execution and
    /// later calls return immediately. Never surfaces an error; every
    /// failure path degrades to [`SessionState::Unauthenticated`].
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        let mut done = self.inner.init_guard.lock().await;
        if *done {
            debug!("session already initialized");
            return;
        }

        let epoch = self.begin();
        self.inner.loading.store(true, Ordering::SeqCst);
        self.set_state(epoch, SessionState::Initializing);

        let state = self.initialize_inner(epoch).await;
        info!(authenticated = state.is_authenticated(), "session initialized");
        self.set_state(epoch, state);

        self.inner.loading.store(false, Ordering::SeqCst);
        *done = true;
    }

    async fn initialize_inner(&self, epoch: u64) -> SessionState {
        let access = match self.inner.credentials.access() {
            Some(access) => access,
            None => {
                // An access credential may still be recoverable from a
                // surviving refresh credential.
                if self.inner.credentials.refresh_token().is_none() {
                    return SessionState::Unauthenticated;
                }
                match self.try_refresh().await {
                    Ok(access) => access,
                    Err(e) => {
                        warn!(error = %e, "refresh failed during initialization");
                        self.clear_session();
                        return SessionState::Unauthenticated;
                    }
                }
            }
        };

        let snapshot = self.inner.snapshot.read();

        if projected_bearer_len(&access) > MAX_BEARER_HEADER_BYTES {
            if let Some(identity) = snapshot {
                info!("access credential exceeds header budget; adopting cached snapshot");
                self.refresh_permissions_best_effort(&access).await;
                return SessionState::DegradedAuthenticated(identity);
            }
            // No snapshot to adopt; the live fetch is the only option left.
        } else if let Some(identity) = snapshot {
            // Instant value while the live fetch resolves.
            self.set_state(epoch, SessionState::DegradedAuthenticated(identity));
        }

        match self.fetch_identity(&access).await {
            Ok(identity) => {
                self.refresh_permissions_best_effort(&access).await;
                SessionState::Authenticated(identity)
            }
            Err(first) => {
                debug!(error = %first, "live identity fetch failed; attempting one refresh");
                let retried = match self.try_refresh().await {
                    Ok(access) => self.fetch_identity(&access).await.map(|i| (access, i)),
                    Err(e) => Err(e),
                };
                match retried {
                    Ok((access, identity)) => {
                        self.refresh_permissions_best_effort(&access).await;
                        SessionState::Authenticated(identity)
                    }
                    Err(e) => {
                        warn!(error = %e, "session recovery failed; signing out");
                        self.clear_session();
                        SessionState::Unauthenticated
                    }
                }
            }
        }
    }

    /// Sign in with email and password.
    ///
    /// Single-flight; a login while already authenticated is a no-op.
    ///
    /// # Errors
    ///
    /// Failures from the credential-issuing endpoint are rethrown raw; run
    /// them through [`classify`](crate::classify::classify) at the UI
    /// boundary before display. Permission and password-audit failures are
    /// logged and swallowed, never fatal to sign-in.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<(), Error> {
        let _guard = self.inner.login_guard.lock().await;

        if self.state().is_authenticated() {
            debug!("already authenticated; login is a no-op");
            return Ok(());
        }

        let epoch = self.begin();
        self.inner.loading.store(true, Ordering::SeqCst);
        let result = self.login_inner(epoch, credentials).await;
        self.inner.loading.store(false, Ordering::SeqCst);
        result
    }

    async fn login_inner(&self, epoch: u64, credentials: &Credentials) -> Result<(), Error> {
        let request = LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        };
        let response: LoginResponse = self.inner.client.post(endpoints::LOGIN, &request).await?;

        let access = AccessToken::new(response.access_token);
        self.inner
            .credentials
            .set(access.clone(), RefreshToken::new(response.refresh_token));

        if projected_bearer_len(&access) > MAX_BEARER_HEADER_BYTES {
            info!("issued access credential exceeds header budget; entering degraded mode");
            let identity = Identity::synthetic(
                credentials.email(),
                response.is_super_admin.unwrap_or(false),
                Utc::now(),
            );
            self.inner.snapshot.store(&identity);
            self.resolve_grants(&access, &identity).await;
            self.set_state(epoch, SessionState::DegradedAuthenticated(identity));
            return Ok(());
        }

        let identity = match self.fetch_identity(&access).await {
            Ok(identity) => identity,
            Err(e) => {
                // A failed sign-in must not leave a resumable credential
                // pair behind: a held credential implies an identity.
                self.clear_session();
                return Err(e);
            }
        };
        self.resolve_grants(&access, &identity).await;
        info!("signed in");
        self.set_state(epoch, SessionState::Authenticated(identity));
        Ok(())
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Rethrown raw for classification at the UI boundary.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn register(&self, credentials: &Credentials) -> Result<(), Error> {
        let request = RegisterRequest {
            email: credentials.email(),
            password: credentials.password(),
        };
        self.inner
            .client
            .post_no_response(endpoints::REGISTER, &request)
            .await
    }

    /// Exchange the refresh credential for a new access credential and
    /// re-fetch the identity.
    ///
    /// Never surfaces an error: any failure clears the session and resolves
    /// to [`SessionState::Unauthenticated`].
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        let epoch = self.begin();

        let result = match self.try_refresh().await {
            Ok(access) => self.fetch_identity(&access).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(identity) => {
                debug!("session refreshed");
                self.set_state(epoch, SessionState::Authenticated(identity));
            }
            Err(e) => {
                warn!(error = %e, "refresh failed; signing out");
                self.clear_session();
                self.set_state(epoch, SessionState::Unauthenticated);
            }
        }
    }

    /// Sign out.
    ///
    /// The logout endpoint is called best-effort; local credentials and
    /// caches are cleared unconditionally.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let epoch = self.begin();

        if let Some(refresh) = self.inner.credentials.refresh_token() {
            let request = LogoutRequest {
                refresh_token: refresh.as_str(),
            };
            if let Err(e) = self
                .inner
                .client
                .post_no_response(endpoints::LOGOUT, &request)
                .await
            {
                debug!(error = %e, "logout endpoint failed; clearing local session anyway");
            }
        }

        self.clear_session();
        info!("signed out");
        self.set_state(epoch, SessionState::Unauthenticated);
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Start a mutating operation, invalidating any still-running older one.
    fn begin(&self) -> u64 {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Commit `state` unless a newer operation has started since `epoch`.
    fn set_state(&self, epoch: u64, state: SessionState) {
        if self.inner.epoch.load(Ordering::SeqCst) == epoch {
            *self.inner.state.write().unwrap() = state;
        } else {
            debug!("discarding stale session state from superseded operation");
        }
    }

    async fn fetch_identity(&self, access: &AccessToken) -> Result<Identity, Error> {
        let identity: Identity = self
            .inner
            .client
            .get_authed(endpoints::ME, access.as_str())
            .await?;
        self.inner.snapshot.store(&identity);
        Ok(identity)
    }

    async fn try_refresh(&self) -> Result<AccessToken, Error> {
        let refresh = self
            .inner
            .credentials
            .refresh_token()
            .ok_or(AuthError::MissingRefreshCredential)?;

        let request = RefreshRequest {
            refresh_token: refresh.as_str(),
        };
        let response: RefreshResponse =
            self.inner.client.post(endpoints::REFRESH, &request).await?;

        let access = AccessToken::new(response.access_token);
        self.inner.credentials.set_access(access.clone());
        Ok(access)
    }

    async fn refresh_permissions_best_effort(&self, access: &AccessToken) {
        if let Err(e) = self
            .inner
            .permissions
            .fetch_and_cache(&self.inner.client, access.as_str())
            .await
        {
            warn!(error = %e, "permission fetch failed; continuing with no permissions");
        }
    }

    /// Best-effort permission fetch and rotation-policy evaluation after the
    /// identity is resolved. Failures are logged and swallowed.
    async fn resolve_grants(&self, access: &AccessToken, identity: &Identity) {
        self.refresh_permissions_best_effort(access).await;

        match self
            .inner
            .client
            .get_authed::<PasswordAudit>(endpoints::PASSWORD_AUDIT, access.as_str())
            .await
        {
            Ok(audit) => {
                let decision = policy::evaluate(identity.is_super_admin, &audit, Utc::now());
                if decision.must_rotate {
                    info!(days = ?decision.last_update_days, "password rotation required");
                    *self.inner.rotation.write().unwrap() = Some(RotationPrompt {
                        role: identity.role().to_string(),
                        last_update_days: decision.last_update_days,
                    });
                }
            }
            Err(e) => warn!(error = %e, "password audit unavailable; skipping rotation check"),
        }
    }

    /// Clear credentials, snapshot, permission cache, and the rotation
    /// prompt. Run on every path into `Unauthenticated`.
    fn clear_session(&self) {
        self.inner.credentials.clear();
        self.inner.snapshot.clear();
        self.inner.permissions.clear();
        *self.inner.rotation.write().unwrap() = None;
    }
}

// Custom Debug impl that stays clear of the held credentials
impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("server", self.inner.client.server())
            .field("state", &*self.inner.state.read().unwrap())
            .finish_non_exhaustive()
    }
}
