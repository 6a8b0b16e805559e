use crate::app::{Command, Model};

/// Handle a fragment read from the radio log
pub fn handle_fragment(fragment: &str, model: &mut Model) -> Command {
    Command::render_if(model.log.append(fragment))
}

/// Handle the periodic log trim
pub fn handle_trim(model: &mut Model) -> Command {
    Command::render_if(model.log.trim())
}

pub fn handle_clear(model: &mut Model) -> Command {
    Command::render_if(model.log.clear())
}
