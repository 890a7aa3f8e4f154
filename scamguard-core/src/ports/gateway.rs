//! Network gateway ports - one per backend capability
//!
//! Each call is a single request to the backend that resolves either to a
//! structured payload or to an [`Error`](crate::domain::result::Error).
//! Gateways never touch the session store.

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{
    AuthToken, ImageUpload, LoginGrant, OtpCode, OtpSent, PhoneNumber, PhoneReport,
    ReportOutcome, VerificationResult,
};

/// OTP login endpoints
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Ask the backend to text a one-time code to `phone`
    async fn request_otp(&self, phone: &PhoneNumber) -> Result<OtpSent>;

    /// Exchange a code for a user profile and bearer token
    async fn verify_otp(&self, phone: &PhoneNumber, code: &OtpCode) -> Result<LoginGrant>;

    /// Arm (or disarm with `None`) the credential attached to later calls
    ///
    /// Backends without authenticated endpoints can ignore this.
    fn set_bearer(&self, _token: Option<&AuthToken>) {}
}

/// Image analysis endpoint
#[async_trait]
pub trait VerificationGateway: Send + Sync {
    async fn upload_image(&self, upload: &ImageUpload) -> Result<VerificationResult>;
}

/// Phone report endpoint
#[async_trait]
pub trait ReportGateway: Send + Sync {
    async fn submit_phone_report(&self, report: &PhoneReport) -> Result<ReportOutcome>;
}
