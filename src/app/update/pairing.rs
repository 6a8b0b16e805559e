use crate::app::model::PairingState;
use crate::app::{Command, Model};
use crate::services::pairing::PairingService;

/// Handle showing the pairing image - sized to the shorter display side
pub fn handle_show(width: u32, height: u32, model: &mut Model) -> Command {
    if !model.controls_enabled() {
        return model.notice_and_render("Radio is not ready");
    }

    update_field!(
        model.pairing,
        PairingState {
            visible: true,
            size: Some(PairingService::initial_size(width, height)),
        }
    )
}

/// Handle a user size change - clamped before the image is rebuilt
pub fn handle_resize(requested: u32, model: &mut Model) -> Command {
    update_field!(model.pairing.size, Some(PairingService::clamp_size(requested)))
}

pub fn handle_hide(model: &mut Model) -> Command {
    update_field!(model.pairing.visible, false)
}
