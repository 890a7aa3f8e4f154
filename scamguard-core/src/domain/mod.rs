//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod cancel;
mod phone;
mod report;
mod session;
mod user;
mod verification;
pub mod result;

pub use cancel::CancelToken;
pub use phone::{OtpCode, PhoneNumber};
pub use report::{PhoneReport, ReportOutcome};
pub use session::{AuthToken, LoginGrant, OtpSent, PersistedSession, SessionSnapshot};
pub use user::User;
pub use verification::{ImageFormat, ImageRef, ImageUpload, VerificationResult, MAX_IMAGE_BYTES};
