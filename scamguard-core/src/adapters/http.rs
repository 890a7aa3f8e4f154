//! ScamGuard HTTP API client
//!
//! Implements every gateway port against the ScamGuard REST backend.
//! One request per operation; no retries happen here.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    AuthToken, ImageUpload, LoginGrant, OtpCode, OtpSent, PhoneNumber, PhoneReport,
    ReportOutcome, User, VerificationResult,
};
use crate::ports::{AuthGateway, ReportGateway, VerificationGateway};

// =============================================================================
// Wire models
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendOtpRequest<'a> {
    phone_number: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendOtpResponse {
    #[serde(default = "default_true")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOtpRequest<'a> {
    phone_number: &'a str,
    otp: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyOtpResponse {
    #[serde(default = "default_true")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PhoneReportRequest<'a> {
    phone_number: &'a str,
    reason: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reporter_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct PhoneReportResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Error body shapes the backend uses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// HttpBackend
// =============================================================================

/// reqwest-backed implementation of the gateway ports
#[derive(Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    bearer: RwLock<Option<AuthToken>>,
}

impl HttpBackend {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("scamguard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn current_bearer(&self) -> Option<AuthToken> {
        self.bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Send a request and decode a JSON body, mapping failures to the taxonomy
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, endpoint: &str) -> Result<T> {
        let request_id = Uuid::new_v4();
        debug!(%request_id, endpoint, "Sending request");

        let mut request = request.header("X-Request-Id", request_id.to_string());
        if let Some(token) = self.current_bearer() {
            request = request.bearer_auth(token.as_str());
        }

        let response = request.send().await.map_err(map_request_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_request_error)?;
        debug!(%request_id, endpoint, status, "Received response");

        if !(200..300).contains(&status) {
            return Err(server_error(status, &body));
        }

        serde_json::from_slice(&body).map_err(|e| {
            Error::server(
                Some(status),
                format!("Unexpected response from server: {}", e),
            )
        })
    }
}

#[async_trait]
impl AuthGateway for HttpBackend {
    async fn request_otp(&self, phone: &PhoneNumber) -> Result<OtpSent> {
        let request = self.client.post(self.url("/auth/otp/send")).json(&SendOtpRequest {
            phone_number: phone.as_str(),
        });
        let response: SendOtpResponse = self.send(request, "otp.send").await?;

        if !response.success {
            return Err(Error::server(
                None,
                response
                    .message
                    .unwrap_or_else(|| "Could not send a verification code".to_string()),
            ));
        }

        Ok(OtpSent {
            phone_number: phone.as_str().to_string(),
            expires_in_secs: response.expires_in,
            message: response.message,
        })
    }

    async fn verify_otp(&self, phone: &PhoneNumber, code: &OtpCode) -> Result<LoginGrant> {
        let request = self.client.post(self.url("/auth/otp/verify")).json(&VerifyOtpRequest {
            phone_number: phone.as_str(),
            otp: code.as_str(),
        });
        let response: VerifyOtpResponse = self.send(request, "otp.verify").await?;

        match response {
            VerifyOtpResponse {
                success: true,
                token: Some(token),
                user: Some(user),
                ..
            } => Ok(LoginGrant {
                user,
                token: AuthToken::new(token),
            }),
            VerifyOtpResponse { message, .. } => Err(Error::server(
                None,
                message.unwrap_or_else(|| "Invalid or expired OTP code".to_string()),
            )),
        }
    }

    fn set_bearer(&self, token: Option<&AuthToken>) {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = token.cloned();
    }
}

#[async_trait]
impl VerificationGateway for HttpBackend {
    async fn upload_image(&self, upload: &ImageUpload) -> Result<VerificationResult> {
        let image = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(upload.format.mime_type())
            .map_err(|e| Error::Other(format!("Invalid image part: {}", e)))?;

        let mut form = Form::new()
            .part("image", image)
            .text("userId", upload.user_id.to_string());
        if let Some(description) = &upload.description {
            form = form.text("description", description.clone());
        }

        let request = self.client.post(self.url("/verifications/image")).multipart(form);
        self.send(request, "verifications.image").await
    }
}

#[async_trait]
impl ReportGateway for HttpBackend {
    async fn submit_phone_report(&self, report: &PhoneReport) -> Result<ReportOutcome> {
        let request = self.client.post(self.url("/reports/phone")).json(&PhoneReportRequest {
            phone_number: report.phone_number.as_str(),
            reason: &report.reason,
            reporter_id: report.reporter_id,
        });
        let response: PhoneReportResponse = self.send(request, "reports.phone").await?;

        let message = response.message.unwrap_or_else(|| {
            if response.success {
                "Report submitted. Thank you for helping protect others.".to_string()
            } else {
                "The report was not accepted".to_string()
            }
        });

        Ok(ReportOutcome {
            success: response.success,
            message,
        })
    }
}

/// Map request errors to transport failures
fn map_request_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::transport("Request timed out")
    } else if error.is_connect() {
        Error::transport("Unable to connect to ScamGuard servers")
    } else {
        Error::transport(format!("Request failed: {}", error))
    }
}

/// Build a server error, preferring the message the server sent
fn server_error(status: u16, body: &[u8]) -> Error {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let server_message = parsed
        .message
        .or(parsed.detail)
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty());

    let message = server_message.unwrap_or_else(|| match status {
        401 => "Your session has expired. Please log in again.".to_string(),
        403 => "You do not have permission to do that.".to_string(),
        404 => "The requested resource was not found.".to_string(),
        413 => "The image is too large to upload.".to_string(),
        429 => "Too many requests. Please wait a moment and try again.".to_string(),
        500..=599 => "ScamGuard servers are having trouble. Please try again later.".to_string(),
        _ => format!("Request failed with HTTP {}", status),
    });

    Error::server(Some(status), message)
}
