use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use telemetry_panel::config::{get_config_path, Config, ConfigRefresher, EndpointSource, Page};
use telemetry_panel::telemetry::api::{FLOWMETER_IN, HVAC_DATA, HVAC_INFO, HVAC_SETTINGS};
use telemetry_panel::telemetry::{
    format_relative_time, Decoder, DeltaTracker, FilterStatus, FlowmeterReadings, HistoryFilter,
    HttpClient, HvacReadings, PollerHandle, SetpointSettings, TelemetryPoller, Transport, UnitInfo,
};
use telemetry_panel::PanelError;

const MIN_CONFIG_REFRESH: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<(), PanelError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = get_config_path();
    let config = Config::load(&path).await;
    let refresher = ConfigRefresher::spawn(
        path,
        config.clone(),
        Duration::from_millis(config.config_refresh_ms).max(MIN_CONFIG_REFRESH),
    );
    let source = refresher.source();
    let transport: Arc<dyn Transport> = Arc::new(HttpClient::new()?);
    let interval = Duration::from_millis(config.poll_interval_ms);

    let mut handles = Vec::new();
    for page in &config.pages {
        match page {
            Page::Hvac => {
                handles.push(watch_route(
                    &transport,
                    &source,
                    HVAC_DATA,
                    interval,
                    |snapshot| HvacReadings::from_snapshot(&snapshot),
                    log_hvac,
                ));
                handles.push(watch_route(
                    &transport,
                    &source,
                    HVAC_INFO,
                    interval,
                    |snapshot| UnitInfo::from_snapshot(&snapshot),
                    log_info,
                ));
                handles.push(watch_route(
                    &transport,
                    &source,
                    HVAC_SETTINGS,
                    interval,
                    |snapshot| SetpointSettings::from_snapshot(&snapshot),
                    log_settings,
                ));
            }
            Page::Flowmeter => {
                let mut totals = DeltaTracker::new();
                handles.push(watch_route(
                    &transport,
                    &source,
                    FLOWMETER_IN,
                    interval,
                    |snapshot| FlowmeterReadings::from_snapshot(&snapshot),
                    move |readings| log_flowmeter(readings, &mut totals),
                ));
            }
        }
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    for handle in &handles {
        handle.stop();
    }
    for handle in handles {
        let route = handle.route().to_string();
        let stats = handle.join().await;
        info!(
            route = %route,
            cycles = stats.cycles,
            successes = stats.successes,
            failures = stats.failures,
            "Poller summary"
        );
    }
    refresher.stop();

    Ok(())
}

/// Start a poller whose decoded views go to `render`, logging how stale the
/// last good reading is whenever a cycle fails.
fn watch_route<T, R>(
    transport: &Arc<dyn Transport>,
    source: &EndpointSource,
    route: &'static str,
    interval: Duration,
    decode: Decoder<T>,
    mut render: R,
) -> PollerHandle
where
    T: Send + 'static,
    R: FnMut(T) + Send + 'static,
{
    let last_update: Arc<Mutex<Option<DateTime<Utc>>>> = Arc::new(Mutex::new(None));
    let poller =
        TelemetryPoller::with_decoder(transport.clone(), source.clone(), route, interval, decode);

    let on_snapshot = {
        let last_update = last_update.clone();
        move |view: T| {
            if let Ok(mut last) = last_update.lock() {
                *last = Some(Utc::now());
            }
            render(view);
        }
    };

    let on_error = move |err: &PanelError| {
        let last = last_update.lock().ok().and_then(|last| *last);
        match last {
            Some(when) => debug!(
                route,
                error = %err,
                last_update = %format_relative_time(when, Utc::now()),
                "Poll failed, showing stale values"
            ),
            None => debug!(route, error = %err, "Poll failed, no values yet"),
        }
    };

    poller.start(on_snapshot, on_error)
}

fn log_hvac(readings: HvacReadings) {
    info!(
        temp_cathlab = readings.temp_cathlab,
        temp_machine = readings.temp_machine,
        rh_cathlab = readings.rh_cathlab,
        rh_machine = readings.rh_machine,
        ahu = readings.equipment.ahu,
        outdoor_unit = readings.equipment.outdoor_unit,
        "Environment"
    );
    if readings.pre_filter_status() == FilterStatus::Warning {
        warn!(pressure = readings.pre_filter, "Pre-filter needs attention");
    }
    if readings.hepa_filter_status() == FilterStatus::Warning {
        warn!(pressure = readings.hepa_filter, "HEPA filter needs attention");
    }
}

fn log_info(info: UnitInfo) {
    info!(
        mode = %info.mode,
        fan = %info.fan,
        unit_on = info.unit_on,
        control = ?info.control_mode,
        "Outdoor unit"
    );
}

fn log_settings(settings: SetpointSettings) {
    info!(
        temp_cathlab = settings.temp_cathlab,
        rh_cathlab = settings.rh_cathlab,
        temp_machine = settings.temp_machine,
        rh_machine = settings.rh_machine,
        "Applied setpoints"
    );
}

fn log_flowmeter(readings: FlowmeterReadings, totals: &mut DeltaTracker) {
    let since_last_poll = totals.update("totalizer", readings.totalizer.latest);
    info!(
        flow_rate = readings.flow_rate.latest,
        flow_delta = readings.flow_rate.delta,
        totalizer = readings.totalizer.latest,
        totalizer_since_last_poll = since_last_poll,
        density = readings.density.latest,
        temperature = readings.temperature.latest,
        history_rows = readings.history_for(HistoryFilter::All).count(),
        at = readings.flow_rate.time.as_deref().unwrap_or("-"),
        "Flowmeter inlet"
    );
}
