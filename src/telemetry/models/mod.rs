mod flowmeter;
mod hvac;
mod snapshot;

pub use flowmeter::{FlowmeterReadings, HistoryFilter, HistoryRow, SeriesSummary};
pub use hvac::{
    ControlMode, EquipmentStatus, FilterStatus, HvacReadings, SetpointSettings, UnitInfo,
};
pub use snapshot::{Entry, Reading, Record, Series, Snapshot};
