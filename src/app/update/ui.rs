use crate::app::{Command, Model};

/// Handle surface visibility changes
pub fn handle_visibility_changed(visible: bool, model: &mut Model) -> Command {
    update_field!(model.is_visible, visible)
}

pub fn handle_clear_notice(model: &mut Model) -> Command {
    update_field!(model.notice, None)
}
