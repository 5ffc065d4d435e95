use serde::{Deserialize, Serialize};

use crate::telemetry::CONTROL_PORT;

/// Configuration document shared by every page: where the telemetry
/// endpoint lives, the operator password and the displayed unit name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, rename = "serverIP")]
    pub server_ip: String,

    #[serde(default)]
    pub password: String,

    #[serde(default, rename = "unitID")]
    pub unit_id: String,

    #[serde(default = "default_control_port")]
    pub control_port: u16,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_config_refresh_ms")]
    pub config_refresh_ms: u64,

    #[serde(default = "default_auth_timeout_secs")]
    pub auth_timeout_secs: Option<u64>,

    #[serde(default = "default_pages")]
    pub pages: Vec<Page>,
}

/// Dashboards the monitor polls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Hvac,
    Flowmeter,
}

/// Where telemetry reads and setpoint writes are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub host: String,
    pub control_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_ip: String::new(),
            password: String::new(),
            unit_id: String::new(),
            control_port: default_control_port(),
            poll_interval_ms: default_poll_interval_ms(),
            config_refresh_ms: default_config_refresh_ms(),
            auth_timeout_secs: default_auth_timeout_secs(),
            pages: default_pages(),
        }
    }
}

fn default_control_port() -> u16 {
    CONTROL_PORT
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_config_refresh_ms() -> u64 {
    1000
}

fn default_auth_timeout_secs() -> Option<u64> {
    Some(60)
}

fn default_pages() -> Vec<Page> {
    vec![Page::Hvac]
}

impl Config {
    /// The endpoint this configuration points at, or `None` while the
    /// server address is still empty.
    pub fn endpoint(&self) -> Option<EndpointConfig> {
        let host = self.server_ip.trim();
        if host.is_empty() {
            return None;
        }
        Some(EndpointConfig {
            host: host.to_string(),
            control_port: self.control_port,
        })
    }
}

impl EndpointConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            control_port: CONTROL_PORT,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host.trim_end_matches('/'), self.control_port)
    }
}
