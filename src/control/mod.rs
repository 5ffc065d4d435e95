mod auth;
mod commander;
mod panel;
mod session;
mod setpoint;

pub use auth::{ActionKind, Authorizer, SharedSecret};
pub use commander::SetpointCommander;
pub use panel::{ActionOutcome, ControlPanel};
pub use session::{ControlSession, SessionState};
pub use setpoint::{Setpoint, SetpointKind};
