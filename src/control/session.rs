use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::types::PanelError;

use super::auth::{ActionKind, Authorizer};

/// Where a password-gated action currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingAuth { action: ActionKind, since: Instant },
    Authorized { action: ActionKind },
    Applying { action: ActionKind },
    Rejected { action: ActionKind },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingAuth { .. } => "awaiting authorization",
            SessionState::Authorized { .. } => "authorized",
            SessionState::Applying { .. } => "applying",
            SessionState::Rejected { .. } => "rejected",
        }
    }
}

/// `Idle → AwaitingAuth → Authorized → Applying → Idle`, or
/// `AwaitingAuth → Rejected → Idle`.
///
/// A prompt left open longer than `timeout` rejects whatever is submitted
/// afterwards. `None` keeps the prompt open indefinitely.
#[derive(Debug, Clone)]
pub struct ControlSession {
    state: SessionState,
    timeout: Option<Duration>,
}

impl ControlSession {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            state: SessionState::Idle,
            timeout,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Open the prompt for `action`. Re-requesting while a prompt is open
    /// replaces the pending action.
    pub fn request(&mut self, action: ActionKind) -> Result<(), PanelError> {
        match self.state {
            SessionState::Idle
            | SessionState::Rejected { .. }
            | SessionState::AwaitingAuth { .. } => {
                debug!(action = action.as_str(), "Awaiting password");
                self.state = SessionState::AwaitingAuth {
                    action,
                    since: Instant::now(),
                };
                Ok(())
            }
            other => Err(self.invalid("request an action", other)),
        }
    }

    /// Check `secret` for the pending action.
    pub fn submit(
        &mut self,
        secret: &str,
        authorizer: &dyn Authorizer,
    ) -> Result<ActionKind, PanelError> {
        let SessionState::AwaitingAuth { action, since } = self.state else {
            return Err(self.invalid("submit a password", self.state));
        };

        if let Some(timeout) = self.timeout {
            if since.elapsed() >= timeout {
                self.state = SessionState::Rejected { action };
                return Err(PanelError::AuthTimeout);
            }
        }

        match authorizer.authorize(action, secret) {
            Ok(()) => {
                info!(action = action.as_str(), "Password is correct");
                self.state = SessionState::Authorized { action };
                Ok(action)
            }
            Err(err) => {
                self.state = SessionState::Rejected { action };
                Err(err)
            }
        }
    }

    pub fn begin_apply(&mut self) -> Result<ActionKind, PanelError> {
        let SessionState::Authorized { action } = self.state else {
            return Err(self.invalid("apply", self.state));
        };
        self.state = SessionState::Applying { action };
        Ok(action)
    }

    pub fn finish(&mut self) -> Result<(), PanelError> {
        match self.state {
            SessionState::Applying { .. } | SessionState::Rejected { .. } => {
                self.state = SessionState::Idle;
                Ok(())
            }
            other => Err(self.invalid("finish", other)),
        }
    }

    /// Close the prompt without submitting anything.
    pub fn cancel(&mut self) {
        if matches!(
            self.state,
            SessionState::AwaitingAuth { .. } | SessionState::Rejected { .. }
        ) {
            self.state = SessionState::Idle;
        }
    }

    fn invalid(&self, action: &'static str, state: SessionState) -> PanelError {
        PanelError::InvalidTransition {
            action,
            state: state.name(),
        }
    }
}
