pub mod api;
mod core;
mod helpers;
mod http;
mod models;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use self::core::{
    ConnectionState, ConnectivityIndicator, Decoder, DeltaTracker, IndicatorChange,
    PollerHandle, PollerStats, TelemetryPoller,
};
pub use helpers::{
    build_url, format_relative_time, format_value, CONTROL_PORT, FILTER_WARNING_THRESHOLD,
};
pub use http::HttpClient;
pub use models::{
    ControlMode, Entry, EquipmentStatus, FilterStatus, FlowmeterReadings, HistoryFilter,
    HistoryRow, HvacReadings, Reading, Record, Series, SeriesSummary, SetpointSettings, Snapshot,
    UnitInfo,
};
pub use transport::{Request, Transport};
