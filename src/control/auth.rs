use serde::Serialize;
use tokio::sync::watch;
use tracing::warn;

use crate::config::Config;
use crate::types::PanelError;

/// What the operator asked the password prompt to unlock.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    /// Show the setpoint adjustment controls.
    Set,
    /// Hide them again.
    Done,
    On,
    Off,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Set => "SET",
            ActionKind::Done => "DONE",
            ActionKind::On => "ON",
            ActionKind::Off => "OFF",
        }
    }
}

/// Decides whether an operator may perform an action.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, action: ActionKind, secret: &str) -> Result<(), PanelError>;
}

/// Compares the operator's input with the `password` of the configuration
/// document.
///
/// This is not access control. The password is shipped to every client
/// that can read the configuration, and the endpoint itself accepts writes
/// from anyone who can reach it. Protecting the unit requires the server to
/// check credentials.
#[derive(Debug, Clone)]
pub struct SharedSecret {
    source: SecretSource,
}

#[derive(Debug, Clone)]
enum SecretSource {
    Fixed(String),
    Config(watch::Receiver<Config>),
}

impl SharedSecret {
    pub fn fixed(secret: impl Into<String>) -> Self {
        Self {
            source: SecretSource::Fixed(secret.into()),
        }
    }

    /// Re-read the password from the published configuration on every check.
    pub fn from_config(config: watch::Receiver<Config>) -> Self {
        Self {
            source: SecretSource::Config(config),
        }
    }

    fn expected(&self) -> String {
        match &self.source {
            SecretSource::Fixed(secret) => secret.clone(),
            SecretSource::Config(config) => config.borrow().password.clone(),
        }
    }
}

impl Authorizer for SharedSecret {
    fn authorize(&self, action: ActionKind, secret: &str) -> Result<(), PanelError> {
        let expected = self.expected();
        // No password loaded yet means nothing matches.
        if expected.is_empty() || expected != secret {
            warn!(action = action.as_str(), "Incorrect password");
            return Err(PanelError::Unauthorized);
        }
        Ok(())
    }
}
