//! Report service - submit suspicious phone numbers
//!
//! This is a boundary adapter: whatever happens underneath (validation,
//! transport, server errors, even a panicking gateway), the caller gets a
//! well-formed [`ReportOutcome`] and branches on `success` alone.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::{PhoneReport, ReportOutcome};
use crate::ports::ReportGateway;
use crate::store::SessionStore;

const UNEXPECTED_FAILURE_MESSAGE: &str =
    "Something went wrong while submitting the report. Please try again.";

/// Report service for phone number reports
pub struct ReportService {
    gateway: Arc<dyn ReportGateway>,
    store: Arc<SessionStore>,
}

impl ReportService {
    pub fn new(gateway: Arc<dyn ReportGateway>, store: Arc<SessionStore>) -> Self {
        Self { gateway, store }
    }

    /// Report `phone_number` as suspicious
    ///
    /// The logged-in user, if any, is attached as the reporter.
    pub async fn submit_phone_report(&self, phone_number: &str, reason: &str) -> ReportOutcome {
        let report = match PhoneReport::new(phone_number, reason, self.store.user_id()) {
            Ok(report) => report,
            Err(e) => return ReportOutcome::rejected(e.user_message()),
        };

        // Run the call on its own task so a panic below becomes a JoinError.
        let gateway = Arc::clone(&self.gateway);
        let mut task = AbortOnDrop(tokio::spawn(async move {
            gateway.submit_phone_report(&report).await
        }));

        match (&mut task.0).await {
            Ok(Ok(outcome)) if outcome.message.trim().is_empty() => {
                let message = if outcome.success {
                    "Report submitted"
                } else {
                    "The report was not accepted"
                };
                ReportOutcome {
                    success: outcome.success,
                    message: message.to_string(),
                }
            }
            Ok(Ok(outcome)) => {
                info!(success = outcome.success, "Phone report submitted");
                outcome
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Phone report failed");
                ReportOutcome::rejected(e.user_message())
            }
            Err(e) => {
                warn!(error = %e, "Phone report task did not complete");
                ReportOutcome::rejected(UNEXPECTED_FAILURE_MESSAGE)
            }
        }
    }
}

/// Aborts the wrapped task if the caller stops waiting for it
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
