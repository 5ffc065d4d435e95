use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::PanelError;

/// One parsed telemetry response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub entries: Vec<Entry>,
    pub received_at: DateTime<Utc>,
}

/// Top-level element of a response array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    Record(Record),
    Series(Series),
}

/// Named readings, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Reading>,
}

/// A time-ordered list of records, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    points: Vec<Record>,
}

/// A single named value as sent by the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl Snapshot {
    /// Parse a response body. Either the whole body is accepted or nothing is.
    pub fn from_value(value: Value) -> Result<Self, PanelError> {
        Self::from_value_at(value, Utc::now())
    }

    pub fn from_value_at(value: Value, received_at: DateTime<Utc>) -> Result<Self, PanelError> {
        let Value::Array(items) = value else {
            return Err(PanelError::Shape(format!(
                "expected a JSON array, got {}",
                kind_of(&value)
            )));
        };

        let entries = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| Entry::from_value(index, item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            entries,
            received_at,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&self, index: usize) -> Result<&Record, PanelError> {
        match self.entries.get(index) {
            Some(Entry::Record(record)) => Ok(record),
            Some(Entry::Series(_)) => Err(PanelError::Shape(format!(
                "entry {index} is a series, expected a record"
            ))),
            None => Err(PanelError::Shape(format!("entry {index} is missing"))),
        }
    }

    pub fn series(&self, index: usize) -> Result<&Series, PanelError> {
        match self.entries.get(index) {
            Some(Entry::Series(series)) => Ok(series),
            Some(Entry::Record(_)) => Err(PanelError::Shape(format!(
                "entry {index} is a record, expected a series"
            ))),
            None => Err(PanelError::Shape(format!("entry {index} is missing"))),
        }
    }

    pub fn value(&self, index: usize, field: &str) -> Option<&Reading> {
        self.record(index).ok().and_then(|record| record.get(field))
    }
}

impl Entry {
    fn from_value(index: usize, value: Value) -> Result<Self, PanelError> {
        match value {
            Value::Object(map) => Ok(Entry::Record(Record::from_map(index, map)?)),
            Value::Array(items) => {
                let points = items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(map) => Record::from_map(index, map),
                        other => Err(PanelError::Shape(format!(
                            "entry {index} holds {}, expected records",
                            kind_of(&other)
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Entry::Series(Series { points }))
            }
            other => Err(PanelError::Shape(format!(
                "entry {index} is {}, expected a record or a series",
                kind_of(&other)
            ))),
        }
    }
}

impl Record {
    fn from_map(index: usize, map: Map<String, Value>) -> Result<Self, PanelError> {
        let mut fields = BTreeMap::new();
        for (name, value) in map {
            let reading = match value {
                Value::Number(number) => Reading::Number(number.as_f64().unwrap_or(f64::NAN)),
                Value::String(text) => Reading::Text(text),
                Value::Bool(flag) => Reading::Bool(flag),
                Value::Null => Reading::Null,
                other => {
                    return Err(PanelError::Shape(format!(
                        "field {name} in entry {index} is {}",
                        kind_of(&other)
                    )))
                }
            };
            fields.insert(name, reading);
        }
        Ok(Self { fields })
    }

    pub fn get(&self, field: &str) -> Option<&Reading> {
        self.fields.get(field)
    }

    /// Numeric value of `field`; missing or non-numeric fields are a shape error.
    pub fn number(&self, field: &str) -> Result<f64, PanelError> {
        self.get(field)
            .and_then(Reading::as_f64)
            .ok_or_else(|| PanelError::Shape(format!("field {field} missing or not numeric")))
    }

    pub fn text(&self, field: &str) -> Result<String, PanelError> {
        match self.get(field) {
            Some(Reading::Text(text)) => Ok(text.clone()),
            Some(Reading::Number(number)) => Ok(number.to_string()),
            Some(Reading::Bool(flag)) => Ok(flag.to_string()),
            Some(Reading::Null) | None => {
                Err(PanelError::Shape(format!("field {field} missing")))
            }
        }
    }

    pub fn flag(&self, field: &str) -> Result<bool, PanelError> {
        self.get(field)
            .map(Reading::is_on)
            .ok_or_else(|| PanelError::Shape(format!("field {field} missing")))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Reading)> {
        self.fields.iter().map(|(name, reading)| (name.as_str(), reading))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Series {
    pub fn points(&self) -> &[Record] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&Record> {
        self.points.last()
    }

    /// Change between the last two points of `field`. Zero with fewer than
    /// two numeric points.
    pub fn latest_delta(&self, field: &str) -> f64 {
        let mut values = self
            .points
            .iter()
            .rev()
            .filter_map(|point| point.get(field).and_then(Reading::as_f64));
        match (values.next(), values.next()) {
            (Some(current), Some(previous)) => current - previous,
            _ => 0.0,
        }
    }
}

impl Reading {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Reading::Number(number) if number.is_finite() => Some(*number),
            Reading::Number(_) => None,
            Reading::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Reading::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            Reading::Null => None,
        }
    }

    /// Run flags arrive as `1`/`0`, `"1"`/`"0"` or `"ON"`/`"OFF"`.
    pub fn is_on(&self) -> bool {
        match self {
            Reading::Text(text) if text.trim().eq_ignore_ascii_case("on") => true,
            other => other.as_f64() == Some(1.0),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
