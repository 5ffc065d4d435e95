use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::EndpointSource;
use crate::telemetry::api::{SET_UNIT_STATUS, VALUE_PARAM};
use crate::telemetry::{build_url, format_value, ControlMode, Request, Transport};
use crate::types::PanelError;

use super::setpoint::Setpoint;

/// Validates setpoint changes and writes them to the panel flows.
///
/// Writes are fire-and-forget: a failed write is logged and returned, but
/// whatever the caller already displayed stays as it is.
#[derive(Clone)]
pub struct SetpointCommander {
    transport: Arc<dyn Transport>,
    endpoint: EndpointSource,
}

impl SetpointCommander {
    pub fn new(transport: Arc<dyn Transport>, endpoint: EndpointSource) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// `setpoint.value + delta` if it stays within `[min, max]`.
    pub fn propose_change(setpoint: &Setpoint, delta: f64) -> Result<f64, PanelError> {
        setpoint.propose_change(delta)
    }

    /// Write `value` to `route` as `GET {route}?value={value}`.
    ///
    /// Refused with [`PanelError::ModeConflict`] before any request is made
    /// while the unit is in manual mode.
    pub async fn commit(
        &self,
        route: &str,
        value: f64,
        mode: ControlMode,
    ) -> Result<(), PanelError> {
        if !mode.remote_control_enabled() {
            warn!(
                route = %route,
                "Manual mode still active, switch to AUTO on the panel to gain remote access"
            );
            return Err(PanelError::ModeConflict);
        }

        let Some(endpoint) = self.endpoint.current() else {
            warn!(route = %route, "Endpoint not configured, dropping write");
            return Err(PanelError::NotConfigured);
        };

        let request = Request::get(build_url(&endpoint, route), route)
            .with_query(VALUE_PARAM, format_value(value));

        match self.transport.get_json(&request).await {
            Ok(body) => {
                info!(route = %route, value, "Updated successfully");
                debug!(route = %route, body = %body, "Write response");
                Ok(())
            }
            Err(err) => {
                warn!(route = %route, value, error = ?err, "There was a problem updating");
                Err(err)
            }
        }
    }

    /// Switch the outdoor unit on or off.
    pub async fn switch_unit(&self, on: bool, mode: ControlMode) -> Result<(), PanelError> {
        self.commit(SET_UNIT_STATUS, if on { 1.0 } else { 0.0 }, mode)
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::Config;
    use crate::telemetry::testing::{Scripted, ScriptedTransport};

    fn commander(transport: Arc<ScriptedTransport>) -> SetpointCommander {
        SetpointCommander::new(
            transport,
            EndpointSource::fixed(Config {
                server_ip: "192.168.1.40".to_string(),
                ..Config::default()
            }),
        )
    }

    #[tokio::test]
    async fn commit_sends_value_as_query() {
        let transport = Arc::new(ScriptedTransport::new([Scripted::Json(json!({"ok": true}))]));
        commander(transport.clone())
            .commit("setDataTemp", 23.0, ControlMode::Auto)
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://192.168.1.40:1880/setDataTemp");
        assert_eq!(requests[0].query, vec![("value", "23".to_string())]);
    }

    #[tokio::test]
    async fn manual_mode_emits_no_request() {
        let transport = Arc::new(ScriptedTransport::new([Scripted::Json(json!({}))]));
        let commander = commander(transport.clone());

        let err = commander
            .commit("setDataRH", 55.0, ControlMode::Manual)
            .await
            .unwrap_err();
        assert!(matches!(err, PanelError::ModeConflict));

        let err = commander
            .switch_unit(true, ControlMode::Manual)
            .await
            .unwrap_err();
        assert!(matches!(err, PanelError::ModeConflict));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn unconfigured_endpoint_emits_no_request() {
        let transport = Arc::new(ScriptedTransport::new([]));
        let commander =
            SetpointCommander::new(transport.clone(), EndpointSource::fixed(Config::default()));

        let err = commander
            .commit("setDataTemp", 22.0, ControlMode::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, PanelError::NotConfigured));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn failed_write_is_returned() {
        let transport = Arc::new(ScriptedTransport::new([Scripted::Status(500)]));
        let err = commander(transport)
            .commit("setDataTemp", 22.0, ControlMode::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, PanelError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn switch_unit_writes_flag() {
        let transport = Arc::new(ScriptedTransport::new([
            Scripted::Json(json!({})),
            Scripted::Json(json!({})),
        ]));
        let commander = commander(transport.clone());
        commander.switch_unit(true, ControlMode::Auto).await.unwrap();
        commander.switch_unit(false, ControlMode::Auto).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url, "http://192.168.1.40:1880/setUnitStat");
        assert_eq!(requests[0].query, vec![("value", "1".to_string())]);
        assert_eq!(requests[1].query, vec![("value", "0".to_string())]);
    }

    #[test]
    fn propose_change_rejects_out_of_range() {
        let setpoint = Setpoint::new("Temperature", 26.0, 18.0, 26.0);
        assert!(matches!(
            SetpointCommander::propose_change(&setpoint, 1.0),
            Err(PanelError::Range { .. })
        ));
        assert_eq!(SetpointCommander::propose_change(&setpoint, -1.0).unwrap(), 25.0);
    }
}
