//! Periodic device sampling
//!
//! Each poller is an independent task. Driver reads run on the blocking
//! pool, results travel to the surface's event loop as [`Event`]s.

use crate::app::{Event, Sample};
use crate::config::PollingConfig;
use crate::driver::DriverClient;
use log::{debug, info};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

/// Read lifecycle, connectivity and status label in one go
pub fn sample(driver: &dyn DriverClient) -> Sample {
    Sample {
        state: driver.state(),
        connected: driver.is_modem_connected(),
        status_label: driver.status_label(),
    }
}

/// Start the lifecycle, log and log-trim pollers
pub fn spawn_all(
    driver: Arc<dyn DriverClient>,
    config: &PollingConfig,
    events: UnboundedSender<Event>,
    cancel_token: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let state_driver = driver.clone();
    let log_driver = driver;

    vec![
        spawn_periodic(
            "state",
            config.state_interval,
            events.clone(),
            cancel_token.clone(),
            move || {
                let driver = state_driver.clone();
                async move {
                    tokio::task::spawn_blocking(move || sample(driver.as_ref()))
                        .await
                        .ok()
                        .map(Event::Sampled)
                }
            },
        ),
        spawn_periodic(
            "log",
            config.log_interval,
            events.clone(),
            cancel_token.clone(),
            move || {
                let driver = log_driver.clone();
                async move {
                    match tokio::task::spawn_blocking(move || driver.radio_log()).await {
                        Ok(Ok(fragment)) if !fragment.is_empty() => {
                            Some(Event::LogFragment(fragment))
                        }
                        Ok(Ok(_)) => None,
                        Ok(Err(e)) => {
                            debug!("log read skipped: {e}");
                            None
                        }
                        Err(_) => None,
                    }
                }
            },
        ),
        spawn_periodic(
            "log trim",
            config.log_trim_interval,
            events,
            cancel_token,
            || async { Some(Event::TrimLog) },
        ),
    ]
}

/// Run `tick` every `period` until cancelled, forwarding what it produces
fn spawn_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    events: UnboundedSender<Event>,
    cancel_token: CancellationToken,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Option<Event>> + Send + 'static,
{
    tokio::spawn(async move {
        info!("{name} poller started every {period:?}");

        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = interval.tick() => {
                    let event = tokio::select! {
                        _ = cancel_token.cancelled() => break,
                        event = tick() => event,
                    };

                    if let Some(event) = event {
                        if events.send(event).is_err() {
                            debug!("{name} poller: event loop gone");
                            break;
                        }
                    }
                }
            }
        }

        info!("{name} poller stopped");
    })
}
