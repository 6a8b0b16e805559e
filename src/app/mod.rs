//! Configuration reconciler
//!
//! All state lives in [`Model`] and changes only through [`update`], which
//! runs on the surface's single event-loop thread. Background work is
//! requested through the returned [`Command`] and reports back as an
//! [`Event`].

#[macro_use]
mod macros;
mod events;
mod model;
mod update;
mod view;

#[cfg(test)]
mod tests;

pub use events::{ConfigEdit, Event, Sample};
pub use model::{
    ConfigField, DEFAULT_POWER, Model, POWER_RANGE, PairingState, RadioConfiguration, ToggleGuard,
};
pub use update::update;
pub use view::{PairingView, ViewModel, view};

use crate::services::scan::ScanRequest;

/// Follow-up work requested by an update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// nothing observable changed
    Done,
    /// the view must be rebuilt
    Render,
    /// the view must be rebuilt and a channel scan started in the background
    Scan(ScanRequest),
}

impl Command {
    pub fn render_if(changed: bool) -> Self {
        if changed { Command::Render } else { Command::Done }
    }
}
