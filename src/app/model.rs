use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::{fmt, ops::RangeInclusive};

use crate::driver::{LifecycleState, RadioType};
use crate::services::log_buffer::LogBuffer;
use crate::settings::PersistedSettings;

/// Transmit power choices offered to the user, in dBm
pub const POWER_RANGE: RangeInclusive<u8> = 7..=30;
/// Power used when the radio reports a value outside [`POWER_RANGE`]
pub const DEFAULT_POWER: u8 = 7;

/// User-editable radio settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RadioConfiguration {
    pub frequency: i32,
    pub bandwidth: f32,
    #[validate(minimum = 7)]
    #[validate(maximum = 30)]
    pub transmit_power: u8,
    pub network_name: String,
    pub network_key: String,
}

/// Fields the user can edit in the working configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ConfigField {
    Frequency,
    Bandwidth,
    TransmitPower,
    NetworkName,
    NetworkKey,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigField::Frequency => "frequency",
            ConfigField::Bandwidth => "bandwidth",
            ConfigField::TransmitPower => "transmit power",
            ConfigField::NetworkName => "network name",
            ConfigField::NetworkKey => "network key",
        };
        f.write_str(name)
    }
}

/// Suppresses the enable-radio echo that follows restoring the persisted
/// selection into the UI.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ToggleGuard {
    /// persisted selection has been restored since the last initialization
    pub initialized: bool,
    /// checked state of the last toggle that reached the driver
    pub last_enabled: bool,
}

/// Pairing image state (UI state)
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct PairingState {
    pub visible: bool,
    /// square image dimension, set on first render
    pub size: Option<u32>,
}

/// Reconciler state, owned by the surface's event loop
#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct Model {
    // Device state
    pub lifecycle: LifecycleState,
    pub is_connected: bool,
    pub status_label: String,
    pub supported_frequencies: Vec<i32>,
    pub supported_bandwidths: Vec<f32>,

    // Configuration state
    /// Seeded on entering READY, discarded on leaving it
    pub working: Option<RadioConfiguration>,
    /// Last state written to the settings store
    #[serde(skip)]
    pub persisted: PersistedSettings,
    pub invalid_fields: Vec<ConfigField>,

    // Radio selection state
    pub radio_enabled: bool,
    pub radio_type: RadioType,
    pub toggle: ToggleGuard,

    // Scan state
    pub is_scanning: bool,
    pub recommendation: Option<i32>,

    // Pairing state
    pub pairing: PairingState,
    pub station_address: String,

    // Log state
    pub log: LogBuffer,

    // UI state
    pub is_visible: bool,
    pub notice: Option<String>,
}

impl Model {
    pub fn new(station_address: impl Into<String>) -> Self {
        Model {
            station_address: station_address.into(),
            ..Default::default()
        }
    }

    /// Configuration controls accept input only with a seeded working copy
    /// on a READY radio.
    pub fn controls_enabled(&self) -> bool {
        self.lifecycle.is_interactive() && self.working.is_some()
    }

    /// Set a transient notice for the user
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Set a notice and return a render command
    pub fn notice_and_render(&mut self, notice: impl Into<String>) -> super::Command {
        self.set_notice(notice);
        super::Command::Render
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configuration() -> RadioConfiguration {
        RadioConfiguration {
            frequency: 1640,
            bandwidth: 5.0,
            transmit_power: 20,
            network_name: "mesh".to_string(),
            network_key: "AbCdEfGhIjKlMnOp".to_string(),
        }
    }

    #[test]
    fn valid_configuration_passes() {
        assert!(configuration().validate().is_ok());
    }

    #[test]
    fn power_outside_range_fails_validation() {
        for power in [6, 31] {
            let config = RadioConfiguration {
                transmit_power: power,
                ..configuration()
            };
            assert!(config.validate().is_err(), "{power}");
        }
    }

    #[test]
    fn empty_network_fields_pass_validation() {
        let config = RadioConfiguration {
            network_name: String::new(),
            network_key: String::new(),
            ..configuration()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn controls_need_ready_and_working_copy() {
        let mut model = Model::new("192.168.20.4");
        model.lifecycle = LifecycleState::Ready;
        assert!(!model.controls_enabled());

        model.working = Some(configuration());
        assert!(model.controls_enabled());

        model.lifecycle = LifecycleState::Configuring;
        assert!(!model.controls_enabled());
    }
}
