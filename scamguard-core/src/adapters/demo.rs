//! Offline demo backend
//!
//! Answers every gateway call locally with deterministic data, so the
//! app can be explored without an account or a network connection:
//! - any well-formed phone number receives an OTP
//! - code `123456` logs in as the demo user
//! - image verdicts depend on the description and image size
//! - reports are accepted

use async_trait::async_trait;

use crate::domain::result::{Error, Result};
use crate::domain::{
    AuthToken, ImageUpload, LoginGrant, OtpCode, OtpSent, PhoneNumber, PhoneReport,
    ReportOutcome, User, VerificationResult,
};
use crate::ports::{AuthGateway, ReportGateway, VerificationGateway};

/// OTP accepted in demo mode
pub const DEMO_OTP: &str = "123456";

const DEMO_TOKEN: &str = "demo-session-token";

const SCAM_KEYWORDS: &[&str] = &[
    "bank", "otp", "prize", "winner", "urgent", "transfer", "police", "verify your account",
];

/// Demo user returned by a successful demo login
pub fn demo_user(phone: &PhoneNumber) -> User {
    User::new(1001, "Demo User", false).with_phone_number(phone.as_str())
}

/// Gateway implementation that never leaves the process
#[derive(Debug, Default, Clone)]
pub struct DemoBackend;

impl DemoBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuthGateway for DemoBackend {
    async fn request_otp(&self, phone: &PhoneNumber) -> Result<OtpSent> {
        Ok(OtpSent {
            phone_number: phone.as_str().to_string(),
            expires_in_secs: Some(300),
            message: Some(format!("Demo mode: use code {}", DEMO_OTP)),
        })
    }

    async fn verify_otp(&self, phone: &PhoneNumber, code: &OtpCode) -> Result<LoginGrant> {
        if code.as_str() != DEMO_OTP {
            return Err(Error::server(Some(400), "Invalid OTP code"));
        }
        Ok(LoginGrant {
            user: demo_user(phone),
            token: AuthToken::new(DEMO_TOKEN),
        })
    }
}

#[async_trait]
impl VerificationGateway for DemoBackend {
    async fn upload_image(&self, upload: &ImageUpload) -> Result<VerificationResult> {
        let description = upload
            .description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        let hits: Vec<&str> = SCAM_KEYWORDS
            .iter()
            .copied()
            .filter(|k| description.contains(k))
            .collect();

        // Keyword hits dominate; image size only nudges the score
        let size_factor = (upload.bytes.len() % 100) as f64 / 1000.0;
        let confidence = (0.2 + 0.25 * hits.len() as f64 + size_factor).min(0.99);

        let (is_scam, risk_level) = match hits.len() {
            0 => (false, "low"),
            1 => (true, "medium"),
            _ => (true, "high"),
        };

        let explanation = if hits.is_empty() {
            "No common scam patterns found in the description".to_string()
        } else {
            format!("Matched scam patterns: {}", hits.join(", "))
        };

        Ok(VerificationResult {
            id: Some(format!("demo-{}", upload.bytes.len())),
            is_scam: Some(is_scam),
            risk_level: Some(risk_level.to_string()),
            confidence: Some(confidence),
            explanation: Some(explanation),
            extra: serde_json::Map::new(),
        })
    }
}

#[async_trait]
impl ReportGateway for DemoBackend {
    async fn submit_phone_report(&self, report: &PhoneReport) -> Result<ReportOutcome> {
        Ok(ReportOutcome::accepted(format!(
            "Demo mode: report for {} recorded locally",
            report.phone_number
        )))
    }
}
