//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the three gateway ports
//! - JSON file for SessionPersistence
//! - Demo backend for offline use

pub mod demo;
pub mod file_session;
pub mod http;

#[cfg(test)]
pub mod mock_backend;
