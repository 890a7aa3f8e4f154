//! Session snapshot and credential types

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::user::User;

/// Immutable view of "who is logged in"
///
/// The login flag is derived from the presence of a user, so a snapshot
/// can never claim to be logged in without a user or the reverse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    user: Option<Arc<User>>,
}

impl SessionSnapshot {
    /// The initial `(absent, false)` snapshot
    pub fn logged_out() -> Self {
        Self { user: None }
    }

    pub fn logged_in(user: User) -> Self {
        Self {
            user: Some(Arc::new(user)),
        }
    }

    /// `(user, true)` for `Some`, `(absent, false)` for `None`
    pub fn from_user(user: Option<User>) -> Self {
        match user {
            Some(user) => Self::logged_in(user),
            None => Self::logged_out(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_deref()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.name.as_str())
    }

    /// Defaults to `false` when nobody is logged in
    pub fn is_elderly(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_elderly)
    }
}

/// Opaque bearer credential returned by a successful OTP verification
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short stable identifier safe to put in logs
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..6])
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthToken({})", self.fingerprint())
    }
}

/// What a successful OTP verification hands back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub user: User,
    pub token: AuthToken,
}

/// Confirmation that an OTP was dispatched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpSent {
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Session record kept by the persistence collaborator across restarts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub token: AuthToken,
    pub user: User,
    pub saved_at: DateTime<Utc>,
}

impl PersistedSession {
    pub fn new(token: AuthToken, user: User) -> Self {
        Self {
            token,
            user,
            saved_at: Utc::now(),
        }
    }
}
