//! Route names exposed by the panel flows.

/// Environmental readings and equipment run flags, `[0]` holds the record.
pub const HVAC_DATA: &str = "getData";
/// Outdoor unit status, timers and the auto/manual switch, `[0]` holds the record.
pub const HVAC_INFO: &str = "getInfoData";
/// Currently applied setpoints, `[0]` holds the record.
pub const HVAC_SETTINGS: &str = "getDataSetting";
/// Inlet flowmeter series `[0..=3]` and the history table at `[4]`.
pub const FLOWMETER_IN: &str = "RequestFlowmeterINData";

pub const SET_TEMP_CATHLAB: &str = "setDataTemp";
pub const SET_RH_CATHLAB: &str = "setDataRH";
pub const SET_TEMP_MACHINE: &str = "setDataTempM";
pub const SET_RH_MACHINE: &str = "setDataRHM";
/// Unit on/off, `value=1` switches on, `value=0` off.
pub const SET_UNIT_STATUS: &str = "setUnitStat";

/// Query parameter carrying the written value.
pub const VALUE_PARAM: &str = "value";
