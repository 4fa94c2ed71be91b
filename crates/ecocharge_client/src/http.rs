use std::sync::Arc;

use ecocharge_core::{SessionRequest, SessionResult, TelemetrySnapshot, TerminalError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::CredentialStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Thin HTTP transport for the charging-network backend.
///
/// Every outgoing request carries `Authorization: Bearer <token>` when a
/// credential is present in the store and no authorization header at all
/// otherwise. No local timeout is enforced; a hung call stalls only the
/// attempt that issued it.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, credentials: Arc<CredentialStore>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("ecocharge-term/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        ApiClient {
            http,
            base_url: base_url.into(),
            credentials,
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials.get() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn transport_error(err: reqwest::Error) -> TerminalError {
        TerminalError::ConnectionFailed {
            reason: err.to_string(),
        }
    }

    /// Request a charging slot for a vehicle via `POST /connect`.
    ///
    /// A 503 means the grid is at capacity and the driver should retry
    /// later; every other failure is reported as a generic connection
    /// failure.
    pub async fn connect_vehicle(
        &self,
        request: &SessionRequest,
    ) -> Result<SessionResult, TerminalError> {
        tracing::info!("POST /connect for vehicle {}", request.vehicle_id);
        let response = self
            .authorize(self.http.post(self.url("/connect")))
            .json(request)
            .send()
            .await
            .map_err(Self::transport_error)?;

        match response.status() {
            status if status.is_success() => {
                response.json().await.map_err(Self::transport_error)
            }
            StatusCode::SERVICE_UNAVAILABLE => Err(TerminalError::GridCapacityExceeded),
            status => Err(TerminalError::ConnectionFailed {
                reason: format!("Backend returned {}", status),
            }),
        }
    }

    /// Exchange operator credentials for a bearer token via
    /// `POST /admin/login`. Any non-success response is an
    /// invalid-credentials signal.
    pub async fn admin_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<String, TerminalError> {
        tracing::info!("POST /admin/login for user {}", username);
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self
            .http
            .post(self.url("/admin/login"))
            .json(&body)
            .send()
            .await
            .map_err(|_| TerminalError::InvalidCredentials)?;

        if !response.status().is_success() {
            return Err(TerminalError::InvalidCredentials);
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|_| TerminalError::InvalidCredentials)?;
        Ok(login.token)
    }

    /// Fetch one telemetry snapshot from `GET /admin/dashboard_stats`.
    pub async fn dashboard_stats(&self) -> Result<TelemetrySnapshot, TerminalError> {
        let response = self
            .authorize(self.http.get(self.url("/admin/dashboard_stats")))
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(TerminalError::ConnectionFailed {
                reason: format!("Backend returned {}", response.status()),
            });
        }

        response.json().await.map_err(Self::transport_error)
    }
}
