use serde::Serialize;

use crate::telemetry::helpers::FILTER_WARNING_THRESHOLD;
use crate::types::PanelError;

use super::snapshot::{Reading, Record, Snapshot};

/// Cleanliness of an air filter, derived from its pressure drop.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterStatus {
    Good,
    Warning,
}

impl FilterStatus {
    pub fn from_pressure(pressure: f64) -> Self {
        if pressure >= FILTER_WARNING_THRESHOLD {
            FilterStatus::Warning
        } else {
            FilterStatus::Good
        }
    }
}

/// Whether the unit accepts commands from the dashboard.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    Auto,
    /// Local panel override; the default until the first info poll lands.
    #[default]
    Manual,
}

impl ControlMode {
    pub fn remote_control_enabled(self) -> bool {
        self == ControlMode::Auto
    }
}

/// Run flags of the air handling equipment.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct EquipmentStatus {
    pub outdoor_unit: bool,
    pub ahu: bool,
    pub booster_fan: bool,
    pub exhaust_fan: bool,
    pub heater_1: bool,
    pub heater_2: bool,
}

/// Environmental readings served by `getData`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HvacReadings {
    pub temp_cathlab: f64,
    pub temp_machine: f64,
    pub rh_cathlab: f64,
    pub rh_machine: f64,
    pub pre_filter: f64,
    pub hepa_filter: f64,
    pub equipment: EquipmentStatus,
}

impl HvacReadings {
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, PanelError> {
        let record = snapshot.record(0)?;
        Ok(Self {
            temp_cathlab: record.number("Temp_Cathlab")?,
            temp_machine: record.number("Temp_Machine")?,
            rh_cathlab: record.number("RH_Cathlab")?,
            rh_machine: record.number("RH_Machine")?,
            pre_filter: record.number("Pre_Filter")?,
            hepa_filter: record.number("HEPA_Filter")?,
            equipment: EquipmentStatus {
                outdoor_unit: record.flag("Outdoor_Unit")?,
                ahu: record.flag("AHU_Status")?,
                booster_fan: record.flag("Booster_Fan")?,
                exhaust_fan: record.flag("Exhaust_Fan")?,
                heater_1: record.flag("Heater_1")?,
                heater_2: record.flag("Heater_2")?,
            },
        })
    }

    pub fn pre_filter_status(&self) -> FilterStatus {
        FilterStatus::from_pressure(self.pre_filter)
    }

    pub fn hepa_filter_status(&self) -> FilterStatus {
        FilterStatus::from_pressure(self.hepa_filter)
    }
}

/// Outdoor unit settings served by `getInfoData`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UnitInfo {
    pub mode: String,
    pub turbo: String,
    pub swing: String,
    pub quiet: String,
    pub sleep: String,
    pub timer_on_1: String,
    pub timer_on_2: String,
    pub timer_off_1: String,
    pub timer_off_2: String,
    pub delay_timer: String,
    pub fan: String,
    pub unit_on: bool,
    pub control_mode: ControlMode,
}

impl UnitInfo {
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, PanelError> {
        let record = snapshot.record(0)?;
        // Only a numeric 1 hands control to the client; "1" stays manual.
        let control_mode = match record.get("AutoManual") {
            Some(Reading::Number(value)) if *value == 1.0 => ControlMode::Auto,
            Some(_) => ControlMode::Manual,
            None => return Err(PanelError::Shape("field AutoManual missing".to_string())),
        };

        Ok(Self {
            mode: optional_text(record, "Mode"),
            turbo: optional_text(record, "Turbo"),
            swing: optional_text(record, "Swing"),
            quiet: optional_text(record, "Quiet"),
            sleep: optional_text(record, "Sleep"),
            timer_on_1: optional_text(record, "TimerON1"),
            timer_on_2: optional_text(record, "TimerON2"),
            timer_off_1: optional_text(record, "TimerOFF1"),
            timer_off_2: optional_text(record, "TimerOFF2"),
            delay_timer: optional_text(record, "DelayTimer"),
            fan: optional_text(record, "Fan"),
            unit_on: record.flag("UnitStatus")?,
            control_mode,
        })
    }
}

fn optional_text(record: &Record, field: &str) -> String {
    record.text(field).unwrap_or_default()
}

/// Setpoints currently applied by the controller, served by `getDataSetting`.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct SetpointSettings {
    pub temp_cathlab: f64,
    pub rh_cathlab: f64,
    pub temp_machine: f64,
    pub rh_machine: f64,
}

impl SetpointSettings {
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, PanelError> {
        let record = snapshot.record(0)?;
        Ok(Self {
            temp_cathlab: record.number("TempCathlab")?,
            rh_cathlab: record.number("RHCathlab")?,
            temp_machine: record.number("TempMachine")?,
            rh_machine: record.number("RHMachine")?,
        })
    }
}
