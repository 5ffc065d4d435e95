use std::env;
use std::path::PathBuf;

use tracing::{debug, warn};

/// Get the path to the config.json file.
/// `PANEL_CONFIG` wins; otherwise the file sits in the app directory
/// (parent of the folder holding the executable).
pub fn get_config_path() -> PathBuf {
    if let Ok(custom) = env::var("PANEL_CONFIG") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            debug!(path = %trimmed, "Using PANEL_CONFIG");
            return PathBuf::from(trimmed);
        }
    }

    // Executable is at: app_root/bin/telemetry-panel
    // Config should be at: app_root/config.json
    if let Ok(exe_path) = env::current_exe() {
        debug!(path = %exe_path.display(), "Executable path detected");

        if let Some(app_root) = exe_path.parent().and_then(|bin_dir| bin_dir.parent()) {
            let config_path = app_root.join("config.json");
            if config_path.exists() {
                debug!(path = %config_path.display(), "Found config next to app root");
                return config_path;
            }
        }
    }

    warn!("Using fallback: looking for config.json in current directory");
    PathBuf::from("config.json")
}
