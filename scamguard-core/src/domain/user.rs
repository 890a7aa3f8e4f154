//! User domain model

use serde::{Deserialize, Serialize};

/// Profile snapshot of an authenticated user
///
/// Values are replaced wholesale on login/logout; nothing mutates a user
/// field-by-field once it has been published to the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Elderly users get simplified flows and stronger warnings.
    #[serde(default)]
    pub is_elderly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl User {
    pub fn new(id: i64, name: impl Into<String>, is_elderly: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_elderly,
            phone_number: None,
            email: None,
            avatar_url: None,
        }
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
