use ecocharge_core::TerminalError;

use crate::ApiClient;

/// Gates access to the operator dashboard.
///
/// Entry to the telemetry view goes through [`AuthGate::check_access`],
/// which consults only the credential store; the caller redirects to the
/// login flow on [`TerminalError::Unauthenticated`].
#[derive(Debug, Clone)]
pub struct AuthGate {
    api: ApiClient,
}

impl AuthGate {
    pub fn new(api: ApiClient) -> Self {
        AuthGate { api }
    }

    /// Check for a stored credential. Never issues a network call; an
    /// expired token is only discovered when a request fails.
    pub fn check_access(&self) -> Result<(), TerminalError> {
        match self.api.credentials().get() {
            Some(_) => Ok(()),
            None => Err(TerminalError::Unauthenticated),
        }
    }

    /// Exchange operator credentials for a bearer token and store it.
    ///
    /// On failure nothing is stored; a previously held token is left
    /// untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), TerminalError> {
        let token = self.api.admin_login(username, password).await?;
        self.api.credentials().set(token);
        tracing::info!("Operator {} logged in", username);
        Ok(())
    }

    /// Drop the stored credential. Unconditionally succeeds.
    pub fn logout(&self) {
        tracing::info!("Operator logged out");
        self.api.credentials().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CredentialStore;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::Arc;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn gate_with(base_url: String) -> AuthGate {
        AuthGate::new(ApiClient::new(
            base_url,
            Arc::new(CredentialStore::in_memory()),
        ))
    }

    #[tokio::test]
    async fn test_check_access_without_credential() {
        // Base URL is unreachable on purpose: the gate check must not
        // touch the network at all.
        let gate = gate_with("http://127.0.0.1:9".to_string());

        match gate.check_access() {
            Err(TerminalError::Unauthenticated) => {}
            other => panic!("Expected Unauthenticated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let router = Router::new().route(
            "/admin/login",
            post(|| async { Json(serde_json::json!({"token": "tok-99"})) }),
        );
        let base_url = serve(router).await;
        let gate = gate_with(base_url);

        gate.login("admin", "secret").await.unwrap();
        assert!(gate.check_access().is_ok());
    }

    #[tokio::test]
    async fn test_failed_login_stores_nothing() {
        let router = Router::new().route(
            "/admin/login",
            post(|| async { axum::http::StatusCode::UNAUTHORIZED }),
        );
        let base_url = serve(router).await;
        let gate = gate_with(base_url);

        match gate.login("admin", "wrong").await {
            Err(TerminalError::InvalidCredentials) => {}
            other => panic!("Expected InvalidCredentials, got {:?}", other),
        }
        match gate.check_access() {
            Err(TerminalError::Unauthenticated) => {}
            other => panic!("Expected Unauthenticated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_logout_clears_credential() {
        let router = Router::new().route(
            "/admin/login",
            post(|| async { Json(serde_json::json!({"token": "tok-99"})) }),
        );
        let base_url = serve(router).await;
        let gate = gate_with(base_url);

        gate.login("admin", "secret").await.unwrap();
        gate.logout();
        // Repeated logout stays harmless
        gate.logout();

        match gate.check_access() {
            Err(TerminalError::Unauthenticated) => {}
            other => panic!("Expected Unauthenticated, got {:?}", other),
        }
    }
}
