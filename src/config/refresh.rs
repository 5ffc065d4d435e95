//! Periodic re-read of config.json, published through a watch channel.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{Config, EndpointConfig};

/// Read side of the shared configuration. Cheap to clone; every read looks
/// at the latest published document.
#[derive(Debug, Clone)]
pub struct EndpointSource {
    config: watch::Receiver<Config>,
}

impl EndpointSource {
    pub fn new(config: watch::Receiver<Config>) -> Self {
        Self { config }
    }

    /// A source that never changes, for callers that already know the host.
    pub fn fixed(config: Config) -> Self {
        let (_tx, rx) = watch::channel(config);
        Self { config: rx }
    }

    /// Current endpoint, or `None` while the server address is empty.
    pub fn current(&self) -> Option<EndpointConfig> {
        self.config.borrow().endpoint()
    }

    pub fn config(&self) -> Config {
        self.config.borrow().clone()
    }

    pub fn receiver(&self) -> watch::Receiver<Config> {
        self.config.clone()
    }
}

/// Background task keeping the published configuration fresh.
pub struct ConfigRefresher {
    sender: watch::Sender<Config>,
    task: JoinHandle<()>,
}

impl ConfigRefresher {
    /// Publish `initial` right away, then re-read `path` every `every`.
    /// A failed read keeps the last good document.
    pub fn spawn(path: PathBuf, initial: Config, every: Duration) -> Self {
        let (sender, _rx) = watch::channel(initial);
        let task = tokio::spawn(refresh_loop(path, sender.clone(), every));
        Self { sender, task }
    }

    pub fn source(&self) -> EndpointSource {
        EndpointSource::new(self.sender.subscribe())
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for ConfigRefresher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn refresh_loop(path: PathBuf, sender: watch::Sender<Config>, every: Duration) {
    loop {
        sleep(every).await;

        match Config::try_load(&path).await {
            Ok(config) => {
                let changed = sender.send_if_modified(|current| {
                    if *current == config {
                        return false;
                    }
                    *current = config;
                    true
                });
                if changed {
                    info!(path = %path.display(), "Configuration changed");
                } else {
                    debug!(path = %path.display(), "Configuration unchanged");
                }
            }
            Err(err) => {
                warn!(error = ?err, "Failed to refresh configuration, keeping previous");
            }
        }
    }
}
