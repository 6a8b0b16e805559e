use log::{debug, info, warn};

use crate::app::model::ToggleGuard;
use crate::app::{Command, Model};
use crate::driver::{DriverClient, RadioType};
use crate::settings::SettingsStore;

/// Restore the persisted radio selection into the model and issue the one
/// reconciling enable call
pub fn restore(model: &mut Model, driver: &dyn DriverClient) -> Command {
    let enabled = model.persisted.radio_enabled;
    let radio_type = model.persisted.radio_selection;

    info!("restoring radio selection: enabled={enabled}, type={radio_type:?}");

    model.radio_enabled = enabled;
    model.radio_type = radio_type;
    model.toggle = ToggleGuard {
        initialized: true,
        last_enabled: enabled,
    };

    if let Err(e) = driver.enable_radio(enabled, radio_type) {
        warn!("failed to restore radio selection: {e}");
        model.set_notice(format!("Failed to restore radio: {e}"));
    }

    Command::Render
}

/// Handle the enable-radio toggle
///
/// The first observation after initialization only restores. Afterwards a
/// callback that repeats the last checked state is dropped.
pub fn handle_radio_toggled(
    checked: bool,
    type_a: bool,
    type_b: bool,
    model: &mut Model,
    driver: &dyn DriverClient,
    store: &dyn SettingsStore,
) -> Command {
    if !model.toggle.initialized {
        return restore(model, driver);
    }

    if checked == model.toggle.last_enabled {
        debug!("ignoring redundant toggle callback");
        return Command::Done;
    }

    let radio_type = RadioType::from_selectors(type_a, type_b);
    info!(
        "{} radio, type={radio_type:?}",
        if checked { "enabling" } else { "disabling" }
    );

    model.toggle.last_enabled = checked;
    model.radio_enabled = checked;
    model.radio_type = radio_type;

    if let Err(e) = driver.enable_radio(checked, radio_type) {
        warn!("failed to switch radio: {e}");
        model.set_notice(format!("Failed to switch radio: {e}"));
    }

    let mut updated = model.persisted.clone();
    updated.radio_enabled = checked;
    updated.radio_selection = radio_type;

    match store.save(&updated) {
        Ok(()) => model.persisted = updated,
        Err(e) => {
            warn!("failed to persist radio selection: {e:#}");
            model.set_notice("Failed to save radio selection");
        }
    }

    Command::Render
}
