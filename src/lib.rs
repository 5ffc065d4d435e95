//! Polling telemetry client and setpoint commander for HVAC and flowmeter
//! panels served over HTTP on the local network.

pub mod config;
pub mod control;
pub mod telemetry;
pub mod types;

pub use types::{ErrorKind, PanelError};
