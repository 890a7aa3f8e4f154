//! ScamGuard Core - session, authentication and verification logic
//!
//! This crate implements the client core following hexagonal architecture:
//!
//! - **domain**: Core entities (User, SessionSnapshot, Outcome, etc.)
//! - **store**: The observable session store
//! - **ports**: Trait definitions for external dependencies (gateways, persistence)
//! - **services**: Business logic orchestration (auth, verification, report)
//! - **adapters**: Concrete implementations (HTTP, JSON file, demo)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::demo::DemoBackend;
use adapters::file_session::FileSessionStore;
use adapters::http::HttpBackend;
use config::Config;
use ports::{AuthGateway, ReportGateway, SessionPersistence, VerificationGateway};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, Outcome};
pub use domain::{
    CancelToken, ImageRef, OtpSent, ReportOutcome, SessionSnapshot, User, VerificationResult,
};
pub use store::{SessionStore, SubscriptionId};

/// Main context for ScamGuard operations
///
/// Created once at process start. It owns the session store and hands the
/// same store handle to every service that needs it; UI code reads and
/// subscribes through `store` and acts through the services.
pub struct ScamGuardContext {
    pub config: Config,
    pub store: Arc<SessionStore>,
    pub auth_service: AuthService,
    pub verification_service: VerificationService,
    pub report_service: ReportService,
}

impl ScamGuardContext {
    /// Create a context from the settings in `data_dir`
    ///
    /// Picks the demo or HTTP backend from config and restores any session
    /// saved by a previous run.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;

        let context = if config.demo_mode {
            let persistence = Arc::new(FileSessionStore::demo(data_dir));
            Self::with_backend(config, Arc::new(DemoBackend::new()), persistence)
        } else {
            let backend = HttpBackend::new(&config.api_base_url, config.api_timeout)
                .context("Failed to create API client")?;
            let persistence = Arc::new(FileSessionStore::new(data_dir));
            Self::with_backend(config, Arc::new(backend), persistence)
        };

        context.auth_service.restore_session();
        Ok(context)
    }

    /// Wire services around a single backend implementing every gateway
    pub fn with_backend<B>(
        config: Config,
        backend: Arc<B>,
        persistence: Arc<dyn SessionPersistence>,
    ) -> Self
    where
        B: AuthGateway + VerificationGateway + ReportGateway + 'static,
    {
        let store = Arc::new(SessionStore::new());

        let auth_service = AuthService::new(backend.clone(), Arc::clone(&store), persistence);
        let verification_service = VerificationService::new(backend.clone());
        let report_service = ReportService::new(backend, Arc::clone(&store));

        Self {
            config,
            store,
            auth_service,
            verification_service,
            report_service,
        }
    }
}
