use chrono::{DateTime, Utc};

use crate::config::EndpointConfig;

/// Port the telemetry flows listen on.
pub const CONTROL_PORT: u16 = 1880;

/// Filter pressure at or above which a filter is reported as needing attention.
pub const FILTER_WARNING_THRESHOLD: f64 = 180.0;

pub fn build_url(endpoint: &EndpointConfig, route: &str) -> String {
    format!(
        "{}/{}",
        endpoint.base_url(),
        route.trim_start_matches('/')
    )
}

/// Render a setpoint for the `value` query parameter. Whole numbers go out
/// without a fractional part, matching what the panel flows expect.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

pub fn format_relative_time(when: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(when);
    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        format!("{} min ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{} h ago", duration.num_hours())
    } else {
        format!("{} d ago", duration.num_days())
    }
}
