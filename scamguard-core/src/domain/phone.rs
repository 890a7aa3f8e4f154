//! Validated phone number and OTP code inputs
//!
//! Raw strings from the UI are checked here before any network call is made.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

const PHONE_PATTERN: &str = r"^\+?[0-9]{8,15}$";
const OTP_PATTERN: &str = r"^[0-9]{4,8}$";

/// A phone number normalized to digits with an optional leading `+`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and normalize a phone number typed by a user
    ///
    /// Spaces, dashes, dots and parentheses are stripped before checking
    /// for 8 to 15 digits.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("Phone number is required"));
        }

        let normalized: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();

        let re = Regex::new(PHONE_PATTERN).map_err(|e| Error::Other(e.to_string()))?;
        if !re.is_match(&normalized) {
            return Err(Error::validation(format!("Invalid phone number: {}", trimmed)));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A one-time password as typed by the user
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("OTP code is required"));
        }

        let re = Regex::new(OTP_PATTERN).map_err(|e| Error::Other(e.to_string()))?;
        if !re.is_match(trimmed) {
            return Err(Error::validation("OTP code must be 4 to 8 digits"));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes never show up in logs or panics.
impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(****)")
    }
}
