mod delta;
mod indicator;
mod poller;

pub use delta::DeltaTracker;
pub use indicator::{ConnectionState, ConnectivityIndicator, IndicatorChange};
pub use poller::{Decoder, PollerHandle, PollerStats, TelemetryPoller};
