mod identifier;
mod models;

pub use crate::identifier::{SegmentKind, VehicleIdComposer};
pub use crate::models::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerminalError {
    #[error("Vehicle identifier is incomplete")]
    IncompleteIdentifier,
    #[error("Grid capacity reached, please wait")]
    GridCapacityExceeded,
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("No operator credential present")]
    Unauthenticated,
}

/// Lifecycle of one session-request attempt.
///
/// A failed attempt returns to `Editing` with the failure recorded as
/// the last error, so the form stays reusable without an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestPhase {
    #[default]
    Editing,
    Submitting,
    Success,
}

/// Outcome of [`TerminalState::begin_submit`].
#[derive(Debug, Clone)]
pub enum SubmitAction {
    /// Attempt accepted: dispatch this request, then report back via
    /// [`TerminalState::complete_submit`] or [`TerminalState::fail_submit`].
    Dispatch(SessionRequest),
    /// A submit is already in flight (or the attempt already succeeded);
    /// the call is an idempotent no-op.
    Ignored,
}

/// State machine behind the driver-facing charging terminal form.
///
/// Owns the identifier composer, the selected charging mode and custom
/// energy limit, and the submit lifecycle. All transitions are
/// synchronous; the network round-trip happens between `begin_submit`
/// and `complete_submit`/`fail_submit`.
#[derive(Debug, Clone, Default)]
pub struct TerminalState {
    composer: VehicleIdComposer,
    mode: ChargingMode,
    envelope: KwhEnvelope,
    custom_kwh: Option<u32>,
    phase: RequestPhase,
    result: Option<SessionResult>,
    last_error: Option<TerminalError>,
}

impl TerminalState {
    pub fn new() -> Self {
        TerminalState::default()
    }

    pub fn composer(&self) -> &VehicleIdComposer {
        &self.composer
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    pub fn mode(&self) -> ChargingMode {
        self.mode
    }

    pub fn custom_kwh(&self) -> u32 {
        self.custom_kwh.unwrap_or(self.envelope.default)
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&TerminalError> {
        self.last_error.as_ref()
    }

    /// Forward a keystroke to the identifier composer. Editing only.
    pub fn input(&mut self, segment: usize, raw: &str) {
        if self.phase == RequestPhase::Editing {
            self.composer.input(segment, raw);
        }
    }

    pub fn backspace_at_empty(&mut self, segment: usize) {
        if self.phase == RequestPhase::Editing {
            self.composer.backspace_at_empty(segment);
        }
    }

    /// Select a charging mode. Editing only.
    ///
    /// Switching away from `Custom` keeps the stored energy limit in
    /// memory; it is simply ignored at submit time.
    pub fn select_mode(&mut self, mode: ChargingMode) {
        if self.phase == RequestPhase::Editing {
            self.mode = mode;
        }
    }

    /// Store a custom energy limit, clamped and step-quantized.
    ///
    /// Only meaningful while the `Custom` mode is selected; otherwise
    /// the call is ignored.
    pub fn set_custom_kwh(&mut self, kwh: u32) {
        if self.phase == RequestPhase::Editing && self.mode == ChargingMode::Custom {
            self.custom_kwh = Some(self.envelope.quantize(kwh));
        }
    }

    /// Start a submit attempt.
    ///
    /// Fails locally with [`TerminalError::IncompleteIdentifier`] before
    /// any network contact when the identifier is not fully entered.
    /// While an attempt is in flight (or after success) the call is an
    /// idempotent no-op, so one physical connection event can never
    /// produce two sessions.
    pub fn begin_submit(&mut self) -> Result<SubmitAction, TerminalError> {
        if self.phase != RequestPhase::Editing {
            return Ok(SubmitAction::Ignored);
        }

        let vehicle_id = self.composer.compose()?;
        let custom_kwh = match self.mode {
            ChargingMode::Custom => self.custom_kwh(),
            _ => 0,
        };

        tracing::info!("Submitting session request for vehicle {}", vehicle_id);
        self.phase = RequestPhase::Submitting;
        self.last_error = None;

        Ok(SubmitAction::Dispatch(SessionRequest {
            vehicle_id,
            mode: self.mode,
            custom_kwh,
        }))
    }

    /// Record a successful backend response for the in-flight attempt.
    pub fn complete_submit(&mut self, result: SessionResult) {
        if self.phase != RequestPhase::Submitting {
            return;
        }
        tracing::info!("Session request accepted, slot {}", result.slot_id);
        self.result = Some(result);
        self.phase = RequestPhase::Success;
    }

    /// Record a failed attempt and return the form to `Editing`.
    pub fn fail_submit(&mut self, error: TerminalError) {
        if self.phase != RequestPhase::Submitting {
            return;
        }
        tracing::info!("Session request failed: {}", error);
        self.last_error = Some(error);
        self.phase = RequestPhase::Editing;
    }

    /// Clear the form back to its initial state.
    ///
    /// Valid from `Editing` or `Success`; ignored while a submit is in
    /// flight.
    pub fn reset(&mut self) {
        if self.phase == RequestPhase::Submitting {
            return;
        }
        self.composer.reset();
        self.mode = ChargingMode::default();
        self.custom_kwh = None;
        self.result = None;
        self.last_error = None;
        self.phase = RequestPhase::Editing;
    }
}
