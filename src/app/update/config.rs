use log::{debug, info, warn};
use serde_valid::Validate;

use crate::app::events::ConfigEdit;
use crate::app::model::{ConfigField, POWER_RANGE};
use crate::app::{Command, Model};
use crate::driver::{DriverClient, DriverResult};
use crate::services::keys::KeyService;
use crate::settings::SettingsStore;

/// Handle a field edit - parse raw input into the working configuration
///
/// Unparseable input marks the field invalid, which blocks the next commit
/// until the field is corrected.
pub fn handle_edit(edit: ConfigEdit, model: &mut Model) -> Command {
    let field = edit.field();

    let Some(working) = model.working.as_mut() else {
        debug!("ignoring {field} edit without working configuration");
        return Command::Done;
    };

    let result = match edit {
        ConfigEdit::Frequency(raw) => raw
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|f| {
                model.supported_frequencies.is_empty() || model.supported_frequencies.contains(f)
            })
            .map(|f| working.frequency = f)
            .ok_or(raw),
        ConfigEdit::Bandwidth(raw) => raw
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|bw| {
                model.supported_bandwidths.is_empty() || model.supported_bandwidths.contains(bw)
            })
            .map(|bw| working.bandwidth = bw)
            .ok_or(raw),
        ConfigEdit::TransmitPower(raw) => raw
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|dbm| POWER_RANGE.contains(dbm))
            .map(|dbm| working.transmit_power = dbm)
            .ok_or(raw),
        ConfigEdit::NetworkName(name) => {
            working.network_name = name;
            Ok(())
        }
        ConfigEdit::NetworkKey(key) => {
            working.network_key = key;
            Ok(())
        }
    };

    match result {
        Ok(()) => model.invalid_fields.retain(|f| *f != field),
        Err(raw) => {
            warn!("invalid {field}: {raw:?}");
            if !model.invalid_fields.contains(&field) {
                model.invalid_fields.push(field);
            }
            model.set_notice(format!("Invalid {field}: {raw}"));
        }
    }

    Command::Render
}

/// Handle commit - push the working configuration to the radio and the settings store
///
/// Steps run in a fixed order and a failed step does not stop the ones after it.
pub fn handle_commit(
    model: &mut Model,
    driver: &dyn DriverClient,
    store: &dyn SettingsStore,
) -> Command {
    if !model.lifecycle.is_interactive() {
        return model.notice_and_render("Radio is not ready");
    }

    let Some(working) = model.working.clone() else {
        return model.notice_and_render("Radio is not ready");
    };

    if let Some(field) = model.invalid_fields.first() {
        warn!("commit discarded: invalid {field}");
        let notice = format!("Invalid {field}, nothing was applied");
        return model.notice_and_render(notice);
    }

    if let Err(e) = working.validate() {
        warn!("commit discarded: {e}");
        return model.notice_and_render("Invalid configuration, nothing was applied");
    }

    let mut failed = Vec::new();

    info!(
        "commit: frequency {} MHz, bandwidth {} MHz",
        working.frequency, working.bandwidth
    );
    step(
        &mut failed,
        "frequency",
        driver.set_frequency_and_bandwidth(working.frequency, working.bandwidth),
    );

    info!("commit: network name {}", working.network_name);
    step(
        &mut failed,
        "network name",
        driver.set_network_name(&working.network_name),
    );

    info!("commit: network key");
    step(
        &mut failed,
        "network key",
        driver.set_network_password(&working.network_key),
    );

    let mut updated = model.persisted.clone();
    updated.network_id = Some(working.network_name.clone());
    updated.network_pass = Some(working.network_key.clone());
    match store.save(&updated) {
        Ok(()) => {
            info!("commit: settings persisted");
            model.persisted = updated;
        }
        Err(e) => {
            warn!("commit: failed to persist settings: {e:#}");
            failed.push("settings");
        }
    }

    info!("commit: apply settings");
    step(&mut failed, "apply", driver.apply_settings());

    info!("commit: output power {} dBm", working.transmit_power);
    step(
        &mut failed,
        "power",
        driver.set_output_power(working.transmit_power),
    );

    let notice = if failed.is_empty() {
        format!("Power set to {}", working.transmit_power)
    } else {
        format!(
            "Power set to {} (failed: {})",
            working.transmit_power,
            failed.join(", ")
        )
    };

    model.notice_and_render(notice)
}

fn step(failed: &mut Vec<&'static str>, name: &'static str, result: DriverResult<()>) {
    if let Err(e) = result {
        warn!("commit: {e}");
        failed.push(name);
    }
}

/// Handle key regeneration - replaces the presented and the persisted key
///
/// The new key reaches the radio only with the next commit.
pub fn handle_regenerate_key(model: &mut Model, store: &dyn SettingsStore) -> Command {
    match KeyService::rotate(store, &mut model.persisted) {
        Ok(key) => {
            info!("network key regenerated");
            if let Some(working) = model.working.as_mut() {
                working.network_key = key;
            }
            model.invalid_fields.retain(|f| *f != ConfigField::NetworkKey);
            model.notice_and_render("New network key generated")
        }
        Err(e) => {
            warn!("failed to regenerate network key: {e:#}");
            model.notice_and_render("Failed to generate a network key")
        }
    }
}
