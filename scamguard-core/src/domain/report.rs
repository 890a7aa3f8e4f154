//! Suspicious phone number reports

use serde::{Deserialize, Serialize};

use super::phone::PhoneNumber;
use super::result::{Error, Result};

const MAX_REASON_CHARS: usize = 500;

/// A validated report ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneReport {
    pub phone_number: PhoneNumber,
    pub reason: String,
    /// Set when a user is logged in; anonymous reports are allowed.
    pub reporter_id: Option<i64>,
}

impl PhoneReport {
    pub fn new(phone_number: &str, reason: &str, reporter_id: Option<i64>) -> Result<Self> {
        let phone_number = PhoneNumber::parse(phone_number)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::validation("Please describe why this number is suspicious"));
        }
        if reason.chars().count() > MAX_REASON_CHARS {
            return Err(Error::validation(format!(
                "Reason must be at most {} characters",
                MAX_REASON_CHARS
            )));
        }

        Ok(Self {
            phone_number,
            reason: reason.to_string(),
            reporter_id,
        })
    }
}

/// Result of a report submission
///
/// Always well formed: callers branch on `success` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOutcome {
    pub success: bool,
    pub message: String,
}

impl ReportOutcome {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
