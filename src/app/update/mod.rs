mod config;
mod lifecycle;
mod pairing;
mod radio_log;
mod scan;
mod toggle;
mod ui;

use crate::driver::DriverClient;
use crate::settings::SettingsStore;

use super::Command;
use super::events::Event;
use super::model::Model;

/// Main update dispatcher - routes events to domain-specific handlers
pub fn update(
    event: Event,
    model: &mut Model,
    driver: &dyn DriverClient,
    store: &dyn SettingsStore,
) -> Command {
    match event {
        // Initialization
        Event::Initialize => lifecycle::handle_initialize(model, driver, store),

        // Polling domain
        Event::Sampled(sample) => lifecycle::handle_sampled(sample, model, driver, store),
        Event::LogFragment(fragment) => radio_log::handle_fragment(&fragment, model),
        Event::TrimLog => radio_log::handle_trim(model),
        Event::ClearLog => radio_log::handle_clear(model),

        // Configuration domain
        Event::Edit(edit) => config::handle_edit(edit, model),
        Event::Commit => config::handle_commit(model, driver, store),
        Event::RegenerateKey => config::handle_regenerate_key(model, store),
        Event::RadioToggled {
            checked,
            type_a,
            type_b,
        } => toggle::handle_radio_toggled(checked, type_a, type_b, model, driver, store),

        // Channel scan domain
        Event::ScanRequested => scan::handle_scan_requested(model),
        Event::ScanCompleted(result) => scan::handle_scan_completed(result, model),
        Event::RecommendationAccepted => scan::handle_recommendation_accepted(model),
        Event::RecommendationDeclined => scan::handle_recommendation_declined(model),

        // Pairing domain
        Event::ShowPairing { width, height } => pairing::handle_show(width, height, model),
        Event::PairingSizeChanged(size) => pairing::handle_resize(size, model),
        Event::HidePairing => pairing::handle_hide(model),

        // UI actions domain
        Event::VisibilityChanged(visible) => ui::handle_visibility_changed(visible, model),
        Event::ClearNotice => ui::handle_clear_notice(model),
    }
}
