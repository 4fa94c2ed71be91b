//! EcoCharge Client Library
//!
//! This library provides the HTTP transport and the drivers sitting
//! between the core state machines and the charging-network backend:
//! credential storage, the authenticated API client, the login gate,
//! the terminal submit driver, and the dashboard telemetry poller.

mod auth;
mod credentials;
mod http;
mod poller;
mod terminal;

pub use crate::auth::AuthGate;
pub use crate::credentials::CredentialStore;
pub use crate::http::ApiClient;
pub use crate::poller::TelemetryPoller;
pub use crate::terminal::Terminal;

/// Default backend address when no configuration is provided.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
