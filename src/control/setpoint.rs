use serde::Serialize;

use crate::telemetry::api::{SET_RH_CATHLAB, SET_RH_MACHINE, SET_TEMP_CATHLAB, SET_TEMP_MACHINE};
use crate::telemetry::SetpointSettings;
use crate::types::PanelError;

/// The operator-adjustable quantities on the HVAC page.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SetpointKind {
    CathlabTemperature,
    CathlabHumidity,
    MachineTemperature,
    MachineHumidity,
}

impl SetpointKind {
    pub const ALL: [SetpointKind; 4] = [
        SetpointKind::CathlabTemperature,
        SetpointKind::CathlabHumidity,
        SetpointKind::MachineTemperature,
        SetpointKind::MachineHumidity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SetpointKind::CathlabTemperature => "Cathlab temperature",
            SetpointKind::CathlabHumidity => "Cathlab humidity",
            SetpointKind::MachineTemperature => "Machine room temperature",
            SetpointKind::MachineHumidity => "Machine room humidity",
        }
    }

    /// Route the new value is written to.
    pub fn route(self) -> &'static str {
        match self {
            SetpointKind::CathlabTemperature => SET_TEMP_CATHLAB,
            SetpointKind::CathlabHumidity => SET_RH_CATHLAB,
            SetpointKind::MachineTemperature => SET_TEMP_MACHINE,
            SetpointKind::MachineHumidity => SET_RH_MACHINE,
        }
    }

    /// Accepted range: 18..=26 °C for temperatures, 50..=60 %RH for humidity.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            SetpointKind::CathlabTemperature | SetpointKind::MachineTemperature => (18.0, 26.0),
            SetpointKind::CathlabHumidity | SetpointKind::MachineHumidity => (50.0, 60.0),
        }
    }

    /// The applied value for this quantity in a `getDataSetting` poll.
    pub fn applied(self, settings: &SetpointSettings) -> f64 {
        match self {
            SetpointKind::CathlabTemperature => settings.temp_cathlab,
            SetpointKind::CathlabHumidity => settings.rh_cathlab,
            SetpointKind::MachineTemperature => settings.temp_machine,
            SetpointKind::MachineHumidity => settings.rh_machine,
        }
    }
}

/// A displayed target value with the range it may be moved within.
///
/// `value` belongs to the operator and only moves through [`apply`](Self::apply).
/// `applied` is what the controller last reported and is refreshed by polls.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Setpoint {
    pub name: String,
    pub value: f64,
    pub applied: f64,
    pub min: f64,
    pub max: f64,
}

impl Setpoint {
    pub fn new(name: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            value,
            applied: value,
            min,
            max,
        }
    }

    pub fn for_kind(kind: SetpointKind, value: f64) -> Self {
        let (min, max) = kind.bounds();
        Self::new(kind.name(), value, min, max)
    }

    /// Validate `value + delta` without touching the displayed value.
    pub fn propose_change(&self, delta: f64) -> Result<f64, PanelError> {
        let proposed = self.value + delta;
        if !proposed.is_finite() || proposed < self.min || proposed > self.max {
            return Err(PanelError::Range {
                name: self.name.clone(),
                value: proposed,
                min: self.min,
                max: self.max,
            });
        }
        Ok(proposed)
    }

    /// Validate and, when accepted, update the displayed value right away.
    pub fn apply(&mut self, delta: f64) -> Result<f64, PanelError> {
        let accepted = self.propose_change(delta)?;
        self.value = accepted;
        Ok(accepted)
    }

    /// Record the value the controller reports as applied. The displayed
    /// value is left alone.
    pub fn observe(&mut self, applied: f64) {
        self.applied = applied;
    }

    /// True while the controller has not caught up with the displayed value.
    pub fn is_pending(&self) -> bool {
        self.value != self.applied
    }
}
