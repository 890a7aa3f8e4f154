//! Auth service - OTP login flow and the only writer of the session store

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::result::{Error, Outcome};
use crate::domain::{
    CancelToken, LoginGrant, OtpCode, OtpSent, PersistedSession, PhoneNumber, User,
};
use crate::ports::{AuthGateway, SessionPersistence};
use crate::store::SessionStore;

/// Auth service for OTP login and session lifecycle
///
/// Every public operation returns an [`Outcome`] or a plain value; nothing
/// here fails by returning `Err` or panicking. No retries are attempted.
pub struct AuthService {
    gateway: Arc<dyn AuthGateway>,
    store: Arc<SessionStore>,
    persistence: Arc<dyn SessionPersistence>,
}

impl AuthService {
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        store: Arc<SessionStore>,
        persistence: Arc<dyn SessionPersistence>,
    ) -> Self {
        Self {
            gateway,
            store,
            persistence,
        }
    }

    /// Request a one-time code for `phone_number`
    ///
    /// Malformed numbers are rejected without a network call.
    pub async fn send_otp(&self, phone_number: &str) -> Outcome<OtpSent> {
        let phone = match PhoneNumber::parse(phone_number) {
            Ok(phone) => phone,
            Err(e) => return Outcome::from_error(e),
        };

        let result = self.gateway.request_otp(&phone).await;
        if let Err(e) = &result {
            warn!(error = %e, "OTP request failed");
        }
        result.into()
    }

    /// Confirm a code with the backend
    ///
    /// Does not touch the session; pair with [`save_session`](Self::save_session)
    /// or use [`login`](Self::login).
    pub async fn verify_otp(&self, phone_number: &str, code: &str) -> Outcome<LoginGrant> {
        let phone = match PhoneNumber::parse(phone_number) {
            Ok(phone) => phone,
            Err(e) => return Outcome::from_error(e),
        };
        let code = match OtpCode::parse(code) {
            Ok(code) => code,
            Err(e) => return Outcome::from_error(e),
        };

        let result = self.gateway.verify_otp(&phone, &code).await;
        if let Err(e) = &result {
            warn!(error = %e, "OTP verification failed");
        }
        result.into()
    }

    /// Make `grant` the current session
    ///
    /// Publishes the user to the store, arms the bearer credential and
    /// persists both. A persistence failure is logged but does not undo
    /// the in-memory login.
    pub fn save_session(&self, grant: LoginGrant) {
        let LoginGrant { user, token } = grant;

        self.gateway.set_bearer(Some(&token));
        if let Err(e) = self
            .persistence
            .save(&PersistedSession::new(token.clone(), user.clone()))
        {
            warn!(error = %e, "Failed to persist session; it will not survive a restart");
        }

        info!(user_id = user.id, token = %token.fingerprint(), "Session started");
        self.store.set_user(Some(user));
    }

    /// Verify `code` and, if the attempt is still wanted, start the session
    ///
    /// A cancelled attempt never publishes to the store, even when the
    /// backend accepted the code.
    pub async fn login(&self, phone_number: &str, code: &str, cancel: &CancelToken) -> Outcome<User> {
        if cancel.is_cancelled() {
            return cancelled();
        }

        let grant = match self.verify_otp(phone_number, code).await {
            Outcome::Success(grant) => grant,
            Outcome::Failure { message, cause } => return Outcome::Failure { message, cause },
        };

        if cancel.is_cancelled() {
            info!("Sign-in cancelled after verification; discarding grant");
            return cancelled();
        }

        let user = grant.user.clone();
        self.save_session(grant);
        Outcome::success(user)
    }

    /// Reload the session persisted by a previous run
    ///
    /// Returns the restored user, or `None` when there is nothing usable.
    pub fn restore_session(&self) -> Option<User> {
        match self.persistence.load() {
            Ok(Some(session)) => {
                self.gateway.set_bearer(Some(&session.token));
                info!(user_id = session.user.id, "Session restored");
                self.store.set_user(Some(session.user.clone()));
                Some(session.user)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to load persisted session");
                None
            }
        }
    }

    /// End the session and forget the stored token
    pub fn logout(&self) {
        self.store.clear_user();
        self.gateway.set_bearer(None);
        if let Err(e) = self.persistence.clear() {
            warn!(error = %e, "Failed to clear persisted session");
        }
        info!("Session ended");
    }

    // === Read facade over the store ===

    pub fn is_logged_in(&self) -> bool {
        self.store.is_logged_in()
    }

    pub fn current_user(&self) -> Option<User> {
        self.store.current_user()
    }

    pub fn current_user_id(&self) -> Option<i64> {
        self.store.user_id()
    }
}

fn cancelled<T>() -> Outcome<T> {
    Outcome::Failure {
        message: "Sign-in was cancelled".to_string(),
        cause: Some(Error::Cancelled),
    }
}
