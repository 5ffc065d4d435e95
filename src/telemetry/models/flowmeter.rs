use serde::Serialize;

use crate::types::PanelError;

use super::snapshot::{Record, Series, Snapshot};

const VALUE_FIELD: &str = "Value";
const TIME_FIELD: &str = "time";
const DEVICE_FIELD: &str = "deviceID";

/// Latest point of one flowmeter series and its change from the point before.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SeriesSummary {
    pub latest: f64,
    pub time: Option<String>,
    pub delta: f64,
    pub points: usize,
}

impl SeriesSummary {
    fn from_series(index: usize, series: &Series) -> Result<Self, PanelError> {
        let latest = series
            .latest()
            .ok_or_else(|| PanelError::Shape(format!("series {index} is empty")))?;
        Ok(Self {
            latest: latest.number(VALUE_FIELD)?,
            time: latest.text(TIME_FIELD).ok(),
            delta: series.latest_delta(VALUE_FIELD),
            points: series.len(),
        })
    }
}

/// Which rows of the history table to show.
#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryFilter {
    #[default]
    All,
    FlowRate,
    Totalizer,
    Density,
    Temperature,
}

impl HistoryFilter {
    /// `deviceID` the filter keeps, `None` for [`HistoryFilter::All`].
    pub fn device_id(self) -> Option<&'static str> {
        match self {
            HistoryFilter::All => None,
            HistoryFilter::FlowRate => Some("FlowRate"),
            HistoryFilter::Totalizer => Some("Totalizer"),
            HistoryFilter::Density => Some("Density"),
            HistoryFilter::Temperature => Some("Temp"),
        }
    }

    pub fn matches(self, row: &HistoryRow) -> bool {
        self.device_id()
            .map_or(true, |device_id| row.device_id == device_id)
    }
}

/// One row of the history table.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HistoryRow {
    pub time: Option<String>,
    pub device_id: String,
    pub value: f64,
}

impl HistoryRow {
    fn from_record(record: &Record) -> Result<Self, PanelError> {
        Ok(Self {
            time: record.text(TIME_FIELD).ok(),
            device_id: record.text(DEVICE_FIELD)?,
            value: record.number(VALUE_FIELD)?,
        })
    }
}

/// Inlet flowmeter page served by `RequestFlowmeterINData`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FlowmeterReadings {
    /// t/h
    pub flow_rate: SeriesSummary,
    /// m³
    pub totalizer: SeriesSummary,
    /// g/cm³
    pub density: SeriesSummary,
    /// °C
    pub temperature: SeriesSummary,
    /// Empty when the response carries no history table.
    pub history: Vec<HistoryRow>,
}

impl FlowmeterReadings {
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, PanelError> {
        let summary = |index: usize| SeriesSummary::from_series(index, snapshot.series(index)?);
        let history = match snapshot.series(4) {
            Ok(series) => series
                .points()
                .iter()
                .map(HistoryRow::from_record)
                .collect::<Result<Vec<_>, _>>()?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            flow_rate: summary(0)?,
            totalizer: summary(1)?,
            density: summary(2)?,
            temperature: summary(3)?,
            history,
        })
    }

    /// History rows in server order, restricted to `filter`.
    pub fn history_for(&self, filter: HistoryFilter) -> impl Iterator<Item = &HistoryRow> + '_ {
        self.history.iter().filter(move |row| filter.matches(row))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn summarises_each_series() {
        let snapshot = Snapshot::from_value(json!([
            [{"time": "08:00", "Value": 120.5}, {"time": "08:05", "Value": 122.0}],
            [{"time": "08:05", "Value": 5000}],
            [{"time": "08:00", "Value": 1.2}, {"time": "08:05", "Value": 1.0}],
            [{"time": "08:05", "Value": 31}],
            [{"time": "08:05", "deviceID": "FlowRate", "Value": 122.0}]
        ]))
        .unwrap();

        let readings = FlowmeterReadings::from_snapshot(&snapshot).unwrap();
        assert_eq!(readings.flow_rate.latest, 122.0);
        assert_eq!(readings.flow_rate.delta, 1.5);
        assert_eq!(readings.flow_rate.time.as_deref(), Some("08:05"));
        assert_eq!(readings.totalizer.delta, 0.0);
        assert!((readings.density.delta + 0.2).abs() < 1e-9);
        assert_eq!(readings.temperature.points, 1);
        assert_eq!(readings.history.len(), 1);
    }

    fn with_history() -> FlowmeterReadings {
        let snapshot = Snapshot::from_value(json!([
            [{"time": "08:05", "Value": 122.0}],
            [{"time": "08:05", "Value": 5000}],
            [{"time": "08:05", "Value": 1.0}],
            [{"time": "08:05", "Value": 31}],
            [
                {"time": "08:00", "deviceID": "FlowRate", "Value": 120.5},
                {"time": "08:00", "deviceID": "Totalizer", "Value": 4990},
                {"time": "08:00", "deviceID": "Density", "Value": 1.2},
                {"time": "08:00", "deviceID": "Temp", "Value": 30},
                {"time": "08:05", "deviceID": "FlowRate", "Value": 122.0}
            ]
        ]))
        .unwrap();
        FlowmeterReadings::from_snapshot(&snapshot).unwrap()
    }

    fn values(readings: &FlowmeterReadings, filter: HistoryFilter) -> Vec<f64> {
        readings.history_for(filter).map(|row| row.value).collect()
    }

    #[test]
    fn history_filter_keeps_matching_devices() {
        let readings = with_history();
        assert_eq!(readings.history.len(), 5);
        assert_eq!(
            values(&readings, HistoryFilter::All),
            vec![120.5, 4990.0, 1.2, 30.0, 122.0]
        );
        assert_eq!(values(&readings, HistoryFilter::FlowRate), vec![120.5, 122.0]);
        assert_eq!(values(&readings, HistoryFilter::Totalizer), vec![4990.0]);
        assert_eq!(values(&readings, HistoryFilter::Density), vec![1.2]);
        assert_eq!(values(&readings, HistoryFilter::Temperature), vec![30.0]);

        let row = readings.history_for(HistoryFilter::Temperature).next().unwrap();
        assert_eq!(row.device_id, "Temp");
        assert_eq!(row.time.as_deref(), Some("08:00"));
    }

    #[test]
    fn history_is_optional() {
        let snapshot = Snapshot::from_value(json!([
            [{"Value": 1}], [{"Value": 2}], [{"Value": 3}], [{"Value": 4}]
        ]))
        .unwrap();
        let readings = FlowmeterReadings::from_snapshot(&snapshot).unwrap();
        assert_eq!(readings.history_for(HistoryFilter::All).count(), 0);
    }

    #[test]
    fn history_row_without_device_is_shape_error() {
        let snapshot = Snapshot::from_value(json!([
            [{"Value": 1}], [{"Value": 2}], [{"Value": 3}], [{"Value": 4}],
            [{"time": "08:00", "Value": 9}]
        ]))
        .unwrap();
        assert!(matches!(
            FlowmeterReadings::from_snapshot(&snapshot),
            Err(PanelError::Shape(_))
        ));
    }

    #[test]
    fn empty_series_is_shape_error() {
        let snapshot = Snapshot::from_value(json!([[], [], [], []])).unwrap();
        assert!(matches!(
            FlowmeterReadings::from_snapshot(&snapshot),
            Err(PanelError::Shape(_))
        ));
    }
}
