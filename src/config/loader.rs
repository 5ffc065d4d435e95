use std::env;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::types::PanelError;

use super::Config;

impl Config {
    /// Load configuration from the given config.json.
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load(path: &Path) -> Self {
        match Self::try_load(path).await {
            Ok(config) => {
                info!(
                    server = %config.server_ip,
                    unit = %config.unit_id,
                    port = config.control_port,
                    "Loaded configuration"
                );
                config
            }
            Err(err) => {
                warn!(error = ?err, "Failed to load config.json, using defaults");
                Self::default().with_env_overrides()
            }
        }
    }

    pub async fn try_load(path: &Path) -> Result<Self, PanelError> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default().with_env_overrides());
        }

        let contents = fs::read_to_string(path)
            .await
            .map_err(|err| PanelError::Config(format!("Failed to read config file: {err}")))?;

        let config: Config = serde_json::from_str(&contents)
            .map_err(|err| PanelError::Config(format!("Failed to parse config.json: {err}")))?;

        if config.poll_interval_ms == 0 {
            return Err(PanelError::Config(
                "pollIntervalMs must be greater than zero".to_string(),
            ));
        }

        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(server) = env::var("PANEL_SERVER_IP") {
            let trimmed = server.trim();
            if !trimmed.is_empty() {
                self.server_ip = trimmed.to_string();
            }
        }
        self
    }
}
