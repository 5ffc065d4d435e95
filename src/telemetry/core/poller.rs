use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::select;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::EndpointSource;
use crate::types::PanelError;

use super::super::helpers::build_url;
use super::super::models::Snapshot;
use super::super::transport::{Request, Transport};
use super::indicator::{ConnectionState, ConnectivityIndicator, IndicatorChange};

/// Counters reported when a poller task finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerStats {
    pub cycles: u64,
    pub successes: u64,
    pub failures: u64,
    pub skipped: u64,
}

/// Turns a parsed snapshot into the view a route is expected to serve.
pub type Decoder<T> = fn(Snapshot) -> Result<T, PanelError>;

/// Repeatedly reads one route and hands each decoded view to a callback.
///
/// A cycle only succeeds once the body has been decoded into `T`; a body that
/// is valid JSON but lacks the route's fields is a failed cycle.
///
/// Requests from one poller never overlap: the next cycle is scheduled
/// `interval` after the previous one resolved, and [`poll_once`](Self::poll_once)
/// refuses to start while another request is in flight.
pub struct TelemetryPoller<T = Snapshot> {
    transport: Arc<dyn Transport>,
    endpoint: EndpointSource,
    route: String,
    interval: Duration,
    decode: Decoder<T>,
    busy: AtomicBool,
    indicator: Mutex<ConnectivityIndicator>,
    connection: watch::Sender<ConnectionState>,
}

/// Owner side of a running poller. Dropping it stops the poller too.
pub struct PollerHandle {
    route: String,
    stop: watch::Sender<bool>,
    connection: watch::Receiver<ConnectionState>,
    task: JoinHandle<PollerStats>,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TelemetryPoller<Snapshot> {
    /// Poller that hands out raw snapshots.
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: EndpointSource,
        route: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self::with_decoder(transport, endpoint, route, interval, Ok)
    }
}

impl<T: Send + 'static> TelemetryPoller<T> {
    pub fn with_decoder(
        transport: Arc<dyn Transport>,
        endpoint: EndpointSource,
        route: impl Into<String>,
        interval: Duration,
        decode: Decoder<T>,
    ) -> Self {
        let (connection, _rx) = watch::channel(ConnectionState::default());
        Self {
            transport,
            endpoint,
            route: route.into(),
            interval,
            decode,
            busy: AtomicBool::new(false),
            indicator: Mutex::new(ConnectivityIndicator::default()),
            connection,
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.connection.borrow()
    }

    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    /// Run a single cycle.
    ///
    /// Returns `Ok(None)` without issuing a request while no endpoint is
    /// configured, and [`PanelError::Busy`] if a request from this poller is
    /// already in flight.
    pub async fn poll_once(&self) -> Result<Option<T>, PanelError> {
        let Some(endpoint) = self.endpoint.current() else {
            debug!(route = %self.route, "Endpoint not configured, skipping poll");
            return Ok(None);
        };

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PanelError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let request = Request::get(build_url(&endpoint, &self.route), &self.route);
        let result = match self.transport.get_json(&request).await {
            Ok(body) => Snapshot::from_value(body).and_then(self.decode),
            Err(err) => Err(err),
        };

        match &result {
            Ok(_) => self.record(true),
            Err(err) => {
                debug!(route = %self.route, error = ?err, "Poll failed");
                self.record(false);
            }
        }

        result.map(Some)
    }

    fn record(&self, success: bool) {
        let (change, state, failures) = {
            let mut indicator = match self.indicator.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let change = if success {
                indicator.record_success()
            } else {
                indicator.record_failure()
            };
            (change, indicator.state(), indicator.consecutive_failures())
        };

        match change {
            IndicatorChange::Shown => {
                warn!(route = %self.route, "Connecting...");
            }
            IndicatorChange::Hidden => {
                info!(route = %self.route, "Connection restored");
            }
            IndicatorChange::Unchanged if !success => {
                debug!(route = %self.route, failures, "Still unreachable");
            }
            IndicatorChange::Unchanged => {}
        }

        self.connection.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    /// Spawn the polling loop on the current runtime.
    ///
    /// `on_snapshot` runs once per successful cycle, `on_error` once per
    /// failed one, decode failures included. Neither runs for cycles skipped
    /// because no endpoint is configured yet.
    pub fn start<S, E>(self, mut on_snapshot: S, mut on_error: E) -> PollerHandle
    where
        S: FnMut(T) + Send + 'static,
        E: FnMut(&PanelError) + Send + 'static,
    {
        let (stop, mut stopped) = watch::channel(false);
        let connection = self.subscribe_connection();
        let route = self.route.clone();
        let poller = self;

        let task = tokio::spawn(async move {
            let mut stats = PollerStats::default();
            info!(route = %poller.route, interval_ms = poller.interval.as_millis() as u64, "Poller started");

            loop {
                if *stopped.borrow() {
                    break;
                }

                let outcome = select! {
                    biased;
                    _ = stopped.changed() => break,
                    outcome = poller.poll_once() => outcome,
                };

                stats.cycles += 1;
                match outcome {
                    Ok(Some(view)) => {
                        stats.successes += 1;
                        on_snapshot(view);
                    }
                    Ok(None) | Err(PanelError::Busy) => stats.skipped += 1,
                    Err(err) => {
                        stats.failures += 1;
                        on_error(&err);
                    }
                }

                select! {
                    biased;
                    _ = stopped.changed() => break,
                    _ = sleep(poller.interval) => {}
                }
            }

            info!(route = %poller.route, cycles = stats.cycles, "Poller stopped");
            stats
        });

        PollerHandle {
            route,
            stop,
            connection,
            task,
        }
    }
}

impl PollerHandle {
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Prevent further cycles and cancel any request in flight.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    pub fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the polling task to end. Call [`stop`](Self::stop) first.
    pub async fn join(self) -> PollerStats {
        match self.task.await {
            Ok(stats) => stats,
            Err(err) => {
                warn!(route = %self.route, error = ?err, "Poller task ended abnormally");
                PollerStats::default()
            }
        }
    }
}
