use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::telemetry::{ControlMode, SetpointSettings, UnitInfo};
use crate::types::PanelError;

use super::auth::{ActionKind, Authorizer};
use super::commander::SetpointCommander;
use super::session::{ControlSession, SessionState};
use super::setpoint::{Setpoint, SetpointKind};

/// What an authorized action ended up doing.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    AdjustmentEnabled,
    AdjustmentDisabled,
    UnitSwitched { on: bool },
}

/// Page-level control state: the password prompt, the adjustable
/// setpoints and the last auto/manual reading from the unit.
pub struct ControlPanel<A: Authorizer> {
    commander: SetpointCommander,
    authorizer: A,
    session: ControlSession,
    setpoints: HashMap<SetpointKind, Setpoint>,
    mode: ControlMode,
    unit_on: Option<bool>,
    adjusting: bool,
}

impl<A: Authorizer> ControlPanel<A> {
    pub fn new(commander: SetpointCommander, authorizer: A, auth_timeout: Option<Duration>) -> Self {
        Self {
            commander,
            authorizer,
            session: ControlSession::new(auth_timeout),
            setpoints: HashMap::new(),
            mode: ControlMode::default(),
            unit_on: None,
            adjusting: false,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn unit_on(&self) -> Option<bool> {
        self.unit_on
    }

    pub fn is_adjusting(&self) -> bool {
        self.adjusting
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Displayed value of `kind`, once the controller has reported one.
    pub fn setpoint(&self, kind: SetpointKind) -> Option<&Setpoint> {
        self.setpoints.get(&kind)
    }

    pub fn observe_info(&mut self, info: &UnitInfo) {
        if self.mode != info.control_mode {
            info!(mode = ?info.control_mode, "Control mode changed");
        }
        self.mode = info.control_mode;
        self.unit_on = Some(info.unit_on);
    }

    /// Feed a `getDataSetting` poll in. The first poll seeds the displayed
    /// values; later ones only refresh what the controller has applied.
    pub fn observe_settings(&mut self, settings: &SetpointSettings) {
        for kind in SetpointKind::ALL {
            let applied = kind.applied(settings);
            self.setpoints
                .entry(kind)
                .and_modify(|setpoint| setpoint.observe(applied))
                .or_insert_with(|| Setpoint::for_kind(kind, applied));
        }
    }

    /// Open the password prompt for `action`.
    pub fn request(&mut self, action: ActionKind) -> Result<(), PanelError> {
        self.session.request(action)
    }

    pub fn cancel(&mut self) {
        self.session.cancel();
    }

    /// Check the password for the pending action and carry it out.
    pub async fn submit_secret(&mut self, secret: &str) -> Result<ActionOutcome, PanelError> {
        if let Err(err) = self.session.submit(secret, &self.authorizer) {
            self.session.cancel();
            return Err(err);
        }
        let action = self.session.begin_apply()?;

        let outcome = match action {
            ActionKind::Set => {
                self.adjusting = true;
                Ok(ActionOutcome::AdjustmentEnabled)
            }
            ActionKind::Done => {
                self.adjusting = false;
                Ok(ActionOutcome::AdjustmentDisabled)
            }
            ActionKind::On | ActionKind::Off => {
                let on = action == ActionKind::On;
                self.commander
                    .switch_unit(on, self.mode)
                    .await
                    .map(|()| ActionOutcome::UnitSwitched { on })
            }
        };

        self.session.finish()?;
        outcome
    }

    /// Move `kind` by `delta`, update the display and write the new value.
    ///
    /// The displayed value keeps the new value even when the write fails.
    pub async fn adjust(&mut self, kind: SetpointKind, delta: f64) -> Result<f64, PanelError> {
        if !self.adjusting {
            return Err(PanelError::Unauthorized);
        }
        if !self.mode.remote_control_enabled() {
            warn!(setpoint = kind.name(), "Adjustment refused in manual mode");
            return Err(PanelError::ModeConflict);
        }

        let setpoint = self
            .setpoints
            .get_mut(&kind)
            .ok_or(PanelError::NoDisplayedValue(kind.name()))?;
        let accepted = setpoint.apply(delta)?;

        self.commander
            .commit(kind.route(), accepted, self.mode)
            .await?;
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::config::{Config, EndpointSource};
    use crate::control::auth::SharedSecret;
    use crate::telemetry::testing::{Scripted, ScriptedTransport};

    fn panel(transport: Arc<ScriptedTransport>) -> ControlPanel<SharedSecret> {
        let commander = SetpointCommander::new(
            transport,
            EndpointSource::fixed(Config {
                server_ip: "10.0.0.5".to_string(),
                ..Config::default()
            }),
        );
        ControlPanel::new(commander, SharedSecret::fixed("pw"), None)
    }

    fn info(auto_manual: u8) -> UnitInfo {
        UnitInfo {
            mode: "COOL".to_string(),
            turbo: String::new(),
            swing: String::new(),
            quiet: String::new(),
            sleep: String::new(),
            timer_on_1: String::new(),
            timer_on_2: String::new(),
            timer_off_1: String::new(),
            timer_off_2: String::new(),
            delay_timer: String::new(),
            fan: String::new(),
            unit_on: true,
            control_mode: if auto_manual == 1 {
                ControlMode::Auto
            } else {
                ControlMode::Manual
            },
        }
    }

    fn settings(temp: f64) -> SetpointSettings {
        SetpointSettings {
            temp_cathlab: temp,
            rh_cathlab: 55.0,
            temp_machine: 21.0,
            rh_machine: 52.0,
        }
    }

    async fn unlock(panel: &mut ControlPanel<SharedSecret>) {
        panel.request(ActionKind::Set).unwrap();
        assert_eq!(
            panel.submit_secret("pw").await.unwrap(),
            ActionOutcome::AdjustmentEnabled
        );
    }

    #[tokio::test]
    async fn adjustment_requires_set() {
        let transport = Arc::new(ScriptedTransport::new([]));
        let mut panel = panel(transport.clone());
        panel.observe_info(&info(1));
        panel.observe_settings(&settings(22.0));

        assert!(matches!(
            panel.adjust(SetpointKind::CathlabTemperature, 1.0).await,
            Err(PanelError::Unauthorized)
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn failed_write_keeps_optimistic_value() {
        let transport = Arc::new(ScriptedTransport::new([Scripted::Status(500)]));
        let mut panel = panel(transport.clone());
        panel.observe_info(&info(1));
        panel.observe_settings(&settings(22.0));
        unlock(&mut panel).await;

        let err = panel
            .adjust(SetpointKind::CathlabTemperature, 1.0)
            .await
            .unwrap_err();
        assert!(matches!(err, PanelError::Status { status: 500, .. }));
        assert_eq!(
            panel.setpoint(SetpointKind::CathlabTemperature).unwrap().value,
            23.0
        );
        assert_eq!(transport.requests()[0].query, vec![("value", "23".to_string())]);
    }

    #[tokio::test]
    async fn out_of_range_adjustment_changes_nothing() {
        let transport = Arc::new(ScriptedTransport::new([]));
        let mut panel = panel(transport.clone());
        panel.observe_info(&info(1));
        panel.observe_settings(&settings(26.0));
        unlock(&mut panel).await;

        for _ in 0..2 {
            assert!(matches!(
                panel.adjust(SetpointKind::CathlabTemperature, 1.0).await,
                Err(PanelError::Range { .. })
            ));
        }
        assert_eq!(
            panel.setpoint(SetpointKind::CathlabTemperature).unwrap().value,
            26.0
        );
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn manual_mode_blocks_adjustment_and_switching() {
        let transport = Arc::new(ScriptedTransport::new([]));
        let mut panel = panel(transport.clone());
        panel.observe_info(&info(0));
        panel.observe_settings(&settings(22.0));
        unlock(&mut panel).await;

        assert!(matches!(
            panel.adjust(SetpointKind::CathlabHumidity, 1.0).await,
            Err(PanelError::ModeConflict)
        ));
        assert_eq!(
            panel.setpoint(SetpointKind::CathlabHumidity).unwrap().value,
            55.0
        );

        panel.request(ActionKind::Off).unwrap();
        assert!(matches!(
            panel.submit_secret("pw").await,
            Err(PanelError::ModeConflict)
        ));
        assert_eq!(panel.session_state(), SessionState::Idle);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn wrong_password_does_nothing() {
        let transport = Arc::new(ScriptedTransport::new([]));
        let mut panel = panel(transport.clone());
        panel.observe_info(&info(1));

        panel.request(ActionKind::On).unwrap();
        assert!(matches!(
            panel.submit_secret("guess").await,
            Err(PanelError::Unauthorized)
        ));
        assert_eq!(panel.session_state(), SessionState::Idle);
        assert!(!panel.is_adjusting());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn on_off_switches_the_unit() {
        let transport = Arc::new(ScriptedTransport::new([Scripted::Json(json!({"ok": 1}))]));
        let mut panel = panel(transport.clone());
        panel.observe_info(&info(1));

        panel.request(ActionKind::On).unwrap();
        assert_eq!(
            panel.submit_secret("pw").await.unwrap(),
            ActionOutcome::UnitSwitched { on: true }
        );
        let requests = transport.requests();
        assert_eq!(requests[0].url, "http://10.0.0.5:1880/setUnitStat");
    }

    #[tokio::test]
    async fn done_disables_adjustment() {
        let transport = Arc::new(ScriptedTransport::new([]));
        let mut panel = panel(transport);
        unlock(&mut panel).await;
        assert!(panel.is_adjusting());

        panel.request(ActionKind::Done).unwrap();
        assert_eq!(
            panel.submit_secret("pw").await.unwrap(),
            ActionOutcome::AdjustmentDisabled
        );
        assert!(!panel.is_adjusting());
    }

    #[tokio::test]
    async fn adjustment_before_settings_is_refused() {
        let transport = Arc::new(ScriptedTransport::new([]));
        let mut panel = panel(transport);
        panel.observe_info(&info(1));
        unlock(&mut panel).await;

        assert!(matches!(
            panel.adjust(SetpointKind::MachineTemperature, 1.0).await,
            Err(PanelError::NoDisplayedValue(_))
        ));
    }

    #[tokio::test]
    async fn stale_poll_does_not_undo_adjustment() {
        let transport = Arc::new(ScriptedTransport::new([Scripted::Json(json!({}))]));
        let mut panel = panel(transport);
        panel.observe_info(&info(1));
        panel.observe_settings(&settings(22.0));
        unlock(&mut panel).await;

        panel
            .adjust(SetpointKind::CathlabTemperature, 1.0)
            .await
            .unwrap();

        // The controller has not applied the write yet.
        panel.observe_settings(&settings(22.0));
        let setpoint = panel.setpoint(SetpointKind::CathlabTemperature).unwrap();
        assert_eq!(setpoint.value, 23.0);
        assert_eq!(setpoint.applied, 22.0);

        panel.observe_settings(&settings(23.0));
        let setpoint = panel.setpoint(SetpointKind::CathlabTemperature).unwrap();
        assert_eq!(setpoint.value, 23.0);
        assert!(!setpoint.is_pending());
    }
}
