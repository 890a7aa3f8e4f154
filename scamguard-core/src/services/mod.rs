//! Service layer - business logic orchestration
//!
//! Services coordinate domain validation and port calls. Each returns
//! outcomes instead of errors, so callers branch on success or failure.

mod auth;
mod report;
mod verification;

pub use auth::AuthService;
pub use report::ReportService;
pub use verification::VerificationService;
