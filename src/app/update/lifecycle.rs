use log::{debug, info, warn};

use crate::app::events::Sample;
use crate::app::model::{DEFAULT_POWER, POWER_RANGE, RadioConfiguration, ToggleGuard};
use crate::app::{Command, Model};
use crate::driver::{DriverClient, DriverResult};
use crate::services::keys::KeyService;
use crate::settings::{PersistedSettings, SettingsStore};

use super::toggle;

/// Handle initialization - load persisted settings and restore the radio selection
pub fn handle_initialize(
    model: &mut Model,
    driver: &dyn DriverClient,
    store: &dyn SettingsStore,
) -> Command {
    model.persisted = match store.load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!("failed to load settings, using defaults: {e:#}");
            model.set_notice("Stored settings could not be read");
            PersistedSettings::default()
        }
    };

    model.working = None;
    model.toggle = ToggleGuard::default();

    toggle::restore(model, driver)
}

/// Handle a poll sample - drives the lifecycle state machine
///
/// A failed read leaves its part of the model untouched.
pub fn handle_sampled(
    sample: Sample,
    model: &mut Model,
    driver: &dyn DriverClient,
    store: &dyn SettingsStore,
) -> Command {
    let mut changed = false;

    match sample.connected {
        Ok(connected) if connected != model.is_connected => {
            model.is_connected = connected;
            changed = true;
        }
        Ok(_) => {}
        Err(e) => debug!("connectivity unchanged: {e}"),
    }

    match sample.status_label {
        Ok(label) if label != model.status_label => {
            model.status_label = label;
            changed = true;
        }
        Ok(_) => {}
        Err(e) => debug!("status label unchanged: {e}"),
    }

    let state = match sample.state {
        Ok(state) => state,
        Err(e) => {
            debug!("lifecycle unchanged: {e}");
            return Command::render_if(changed);
        }
    };

    if state != model.lifecycle {
        info!("lifecycle changed: {} -> {state}", model.lifecycle);
        model.lifecycle = state;
        changed = true;
    }

    if !state.is_interactive() {
        if model.working.take().is_some() {
            debug!("discarding working configuration");
            model.recommendation = None;
            model.invalid_fields.clear();
            model.pairing.visible = false;
            changed = true;
        }
        return Command::render_if(changed);
    }

    // READY: seed once, never clobber edits in progress
    if model.working.is_none() {
        changed |= seed_working(model, driver, store);
    }

    Command::render_if(changed)
}

struct Observed {
    frequency: i32,
    bandwidth: f32,
    power: Option<i32>,
    network_id: Option<String>,
}

fn observe(driver: &dyn DriverClient) -> DriverResult<Observed> {
    Ok(Observed {
        frequency: driver.frequency()?,
        bandwidth: driver.bandwidth()?,
        power: driver
            .power()
            .inspect_err(|e| warn!("failed to read power: {e}"))
            .ok(),
        network_id: driver
            .network_id()
            .inspect_err(|e| warn!("failed to read network id: {e}"))
            .ok(),
    })
}

/// Build the working copy from observed and persisted values. Returns
/// `false` if the radio could not be read; the next READY tick retries.
fn seed_working(model: &mut Model, driver: &dyn DriverClient, store: &dyn SettingsStore) -> bool {
    let observed = match observe(driver) {
        Ok(observed) => observed,
        Err(e) => {
            warn!("failed to seed configuration: {e}");
            return false;
        }
    };

    model.supported_frequencies = driver.supported_frequencies().unwrap_or_else(|e| {
        warn!("failed to read supported frequencies: {e}");
        Vec::new()
    });
    model.supported_bandwidths = driver.supported_bandwidths().unwrap_or_else(|e| {
        warn!("failed to read supported bandwidths: {e}");
        Vec::new()
    });

    let transmit_power = observed
        .power
        .and_then(|dbm| u8::try_from(dbm).ok())
        .filter(|dbm| POWER_RANGE.contains(dbm))
        .unwrap_or(DEFAULT_POWER);

    let network_name = observed
        .network_id
        .filter(|id| !id.is_empty())
        .or_else(|| model.persisted.network_id.clone())
        .unwrap_or_default();

    let network_key = match model.persisted.network_pass.clone().filter(|k| !k.is_empty()) {
        Some(key) => key,
        None => match KeyService::ensure_key(store, &mut model.persisted) {
            Ok(key) => key,
            Err(e) => {
                warn!("failed to provide network key: {e:#}");
                model.set_notice("Failed to generate a network key");
                String::new()
            }
        },
    };

    info!(
        "seeding working configuration: {} MHz, {} MHz bandwidth, {transmit_power} dBm",
        observed.frequency, observed.bandwidth
    );

    model.working = Some(RadioConfiguration {
        frequency: observed.frequency,
        bandwidth: observed.bandwidth,
        transmit_power,
        network_name,
        network_key,
    });
    model.invalid_fields.clear();

    true
}
