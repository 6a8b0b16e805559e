use serde::Serialize;

use crate::driver::{LifecycleState, RadioType};
use crate::services::pairing::{PairingInput, PairingService};

use super::model::{ConfigField, Model, POWER_RANGE, RadioConfiguration};

pub const CONNECTED_LABEL: &str = "Drone Connected";
pub const DISCONNECTED_LABEL: &str = "Drone Disconnected";

/// Pairing image content, rebuilt on every view
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PairingView {
    pub payload: String,
    pub size: u32,
}

/// Everything the display layer needs to draw one frame
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub lifecycle: LifecycleState,
    pub controls_enabled: bool,
    pub connectivity_label: String,
    pub status_label: String,

    pub working: Option<RadioConfiguration>,
    pub invalid_fields: Vec<ConfigField>,
    pub frequency_options: Vec<i32>,
    pub bandwidth_options: Vec<f32>,
    pub power_options: Vec<u8>,
    /// network key, bandwidth and frequency inputs
    pub link_fields_visible: bool,

    pub radio_enabled: bool,
    pub radio_type: RadioType,
    pub selectors_enabled: bool,
    pub selectors_visible: bool,

    pub commit_visible: bool,
    pub pairing_enabled: bool,
    pub pairing: Option<PairingView>,

    pub is_scanning: bool,
    pub recommendation_prompt: Option<String>,
    pub notice: Option<String>,

    /// present only while the surface is visible
    pub log: Option<String>,
}

/// Project the model onto a view model
pub fn view(model: &Model) -> ViewModel {
    let controls_enabled = model.controls_enabled();
    let pairing_open = model.pairing.visible && controls_enabled;

    ViewModel {
        lifecycle: model.lifecycle,
        controls_enabled,
        connectivity_label: if model.is_connected {
            CONNECTED_LABEL
        } else {
            DISCONNECTED_LABEL
        }
        .to_string(),
        status_label: model.status_label.clone(),

        working: model.working.clone(),
        invalid_fields: model.invalid_fields.clone(),
        frequency_options: model.supported_frequencies.clone(),
        bandwidth_options: model.supported_bandwidths.clone(),
        power_options: POWER_RANGE.collect(),
        link_fields_visible: model.radio_type != RadioType::TypeB,

        radio_enabled: model.radio_enabled,
        radio_type: model.radio_type,
        selectors_enabled: !model.radio_enabled,
        selectors_visible: !pairing_open,

        commit_visible: !pairing_open,
        pairing_enabled: controls_enabled && !pairing_open,
        pairing: pairing_open.then(|| pairing_view(model)).flatten(),

        is_scanning: model.is_scanning,
        recommendation_prompt: model
            .recommendation
            .map(|f| format!("The best available frequency is {f}")),
        notice: model.notice.clone(),

        log: model.is_visible.then(|| model.log.text().to_string()),
    }
}

fn pairing_view(model: &Model) -> Option<PairingView> {
    let working = model.working.as_ref()?;
    let size = model.pairing.size?;

    let payload = PairingService::build_payload(&PairingInput {
        network_name: &working.network_name,
        network_key: &working.network_key,
        frequency: working.frequency,
        power: working.transmit_power,
        bandwidth: working.bandwidth,
        radio_type: model.radio_type,
        station_address: &model.station_address,
    });

    Some(PairingView { payload, size })
}
