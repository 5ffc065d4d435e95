use thiserror::Error;

/// Errors produced by the telemetry client and the control surface.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{route} returned {status}")]
    Status { route: String, status: u16 },

    #[error("Failed to parse response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("{name} {value} is outside the accepted range {min}..={max}")]
    Range {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Incorrect password")]
    Unauthorized,

    #[error("Manual mode still active, switch to AUTO on the panel to gain remote access")]
    ModeConflict,

    #[error("Endpoint not configured yet")]
    NotConfigured,

    #[error("No displayed value for {0} yet")]
    NoDisplayedValue(&'static str),

    #[error("A request from this poller is already in flight")]
    Busy,

    #[error("Password prompt expired")]
    AuthTimeout,

    #[error("Cannot {action} while session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used to decide how an error is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request failed or returned a non-2xx status.
    Transport,
    /// Body was not JSON or did not have the expected shape.
    Parse,
    /// Proposed setpoint outside its bounds.
    Range,
    /// Secret mismatch or expired prompt.
    Authorization,
    /// Remote control attempted while the unit is in manual mode.
    ModeConflict,
    /// Everything that never leaves the process.
    Local,
}

impl PanelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PanelError::Http(_) | PanelError::Status { .. } => ErrorKind::Transport,
            PanelError::Parse(_) | PanelError::Shape(_) => ErrorKind::Parse,
            PanelError::Range { .. } => ErrorKind::Range,
            PanelError::Unauthorized | PanelError::AuthTimeout => ErrorKind::Authorization,
            PanelError::ModeConflict => ErrorKind::ModeConflict,
            PanelError::NotConfigured
            | PanelError::NoDisplayedValue(_)
            | PanelError::Busy
            | PanelError::InvalidTransition { .. }
            | PanelError::Config(_)
            | PanelError::Io(_) => ErrorKind::Local,
        }
    }

    /// Errors that only ever show up as the connectivity indicator and are
    /// retried on the next cycle.
    pub fn is_connectivity(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::Parse)
    }
}
