use std::sync::Mutex;

use ecocharge_core::{
    ChargingMode, RequestPhase, SessionResult, SubmitAction, TerminalError, TerminalState,
};

use crate::ApiClient;

/// Drives one physical charging-terminal form against the backend.
///
/// Wraps the synchronous [`TerminalState`] machine and performs the
/// `/connect` round-trip for it. The state lock is never held across an
/// await; the in-flight guard inside the state machine is what keeps a
/// second `submit` from issuing a duplicate request.
#[derive(Debug)]
pub struct Terminal {
    state: Mutex<TerminalState>,
    api: ApiClient,
}

impl Terminal {
    pub fn new(api: ApiClient) -> Self {
        Terminal {
            state: Mutex::new(TerminalState::new()),
            api,
        }
    }

    pub fn input(&self, segment: usize, raw: &str) {
        self.state.lock().unwrap().input(segment, raw);
    }

    pub fn backspace_at_empty(&self, segment: usize) {
        self.state.lock().unwrap().backspace_at_empty(segment);
    }

    pub fn select_mode(&self, mode: ChargingMode) {
        self.state.lock().unwrap().select_mode(mode);
    }

    pub fn set_custom_kwh(&self, kwh: u32) {
        self.state.lock().unwrap().set_custom_kwh(kwh);
    }

    pub fn phase(&self) -> RequestPhase {
        self.state.lock().unwrap().phase()
    }

    pub fn result(&self) -> Option<SessionResult> {
        self.state.lock().unwrap().result().cloned()
    }

    pub fn last_error(&self) -> Option<TerminalError> {
        self.state.lock().unwrap().last_error().cloned()
    }

    pub fn reset(&self) {
        self.state.lock().unwrap().reset();
    }

    /// Submit the current form.
    ///
    /// Returns `Ok(Some(result))` on success, `Ok(None)` when the call
    /// was ignored because an attempt is already in flight or has
    /// already succeeded, and the surfaced failure otherwise. Exactly
    /// one network call is issued per accepted attempt; retrying is a
    /// manual action.
    pub async fn submit(&self) -> Result<Option<SessionResult>, TerminalError> {
        let request = match self.state.lock().unwrap().begin_submit()? {
            SubmitAction::Dispatch(request) => request,
            SubmitAction::Ignored => return Ok(None),
        };

        match self.api.connect_vehicle(&request).await {
            Ok(result) => {
                self.state.lock().unwrap().complete_submit(result.clone());
                Ok(Some(result))
            }
            Err(error) => {
                self.state.lock().unwrap().fail_submit(error.clone());
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CredentialStore;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn terminal_with(base_url: String) -> Terminal {
        Terminal::new(ApiClient::new(
            base_url,
            Arc::new(CredentialStore::in_memory()),
        ))
    }

    fn enter_vehicle(terminal: &Terminal) {
        terminal.input(0, "MH");
        terminal.input(1, "12");
        terminal.input(2, "AB");
        terminal.input(3, "1234");
    }

    fn slot_response() -> serde_json::Value {
        serde_json::json!({
            "Slot_ID": "S-05",
            "Initial_Source": "GRID_CONVENTIONAL",
            "Est_Bill": 300.0
        })
    }

    #[tokio::test]
    async fn test_submit_success() {
        let router = Router::new().route("/connect", post(|| async { Json(slot_response()) }));
        let base_url = serve(router).await;
        let terminal = terminal_with(base_url);
        enter_vehicle(&terminal);

        let result = terminal.submit().await.unwrap().unwrap();
        assert_eq!(result.slot_id, "S-05");
        assert_eq!(terminal.phase(), RequestPhase::Success);
        assert!(terminal.result().is_some());
    }

    #[tokio::test]
    async fn test_submit_incomplete_identifier_skips_network() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/connect",
            post(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Json(slot_response()) }
            }),
        );
        let base_url = serve(router).await;
        let terminal = terminal_with(base_url);
        terminal.input(0, "MH");

        match terminal.submit().await {
            Err(TerminalError::IncompleteIdentifier) => {}
            other => panic!("Expected IncompleteIdentifier, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_grid_capacity_keeps_form_editable() {
        let router = Router::new().route(
            "/connect",
            post(|| async { axum::http::StatusCode::SERVICE_UNAVAILABLE }),
        );
        let base_url = serve(router).await;
        let terminal = terminal_with(base_url);
        enter_vehicle(&terminal);

        match terminal.submit().await {
            Err(TerminalError::GridCapacityExceeded) => {}
            other => panic!("Expected GridCapacityExceeded, got {:?}", other),
        }
        assert_eq!(terminal.phase(), RequestPhase::Editing);
        assert!(terminal.result().is_none());
        assert_eq!(
            terminal.last_error(),
            Some(TerminalError::GridCapacityExceeded)
        );
    }

    #[tokio::test]
    async fn test_concurrent_submits_issue_one_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/connect",
            post(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    // Hold the first request open long enough for the
                    // second submit to observe the in-flight state
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Json(slot_response())
                }
            }),
        );
        let base_url = serve(router).await;
        let terminal = Arc::new(terminal_with(base_url));
        enter_vehicle(&terminal);

        let first = {
            let terminal = terminal.clone();
            tokio::spawn(async move { terminal.submit().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = terminal.submit().await;

        // The overlapping call is ignored without touching the network
        assert!(matches!(second, Ok(None)));
        let first = first.await.unwrap().unwrap().unwrap();
        assert_eq!(first.slot_id, "S-05");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reset_after_success() {
        let router = Router::new().route("/connect", post(|| async { Json(slot_response()) }));
        let base_url = serve(router).await;
        let terminal = terminal_with(base_url);
        enter_vehicle(&terminal);
        terminal.select_mode(ChargingMode::Custom);
        terminal.set_custom_kwh(75);

        terminal.submit().await.unwrap();
        terminal.reset();

        assert_eq!(terminal.phase(), RequestPhase::Editing);
        assert!(terminal.result().is_none());
    }
}
