//! Pairing payload assembly and pairing image sizing

use crate::driver::RadioType;

pub const FIELD_SEPARATOR: &str = "//";
pub const PROTOCOL_TAG: &str = "station";
pub const MIN_IMAGE_SIZE: u32 = 100;
pub const MAX_IMAGE_SIZE: u32 = 500;

/// Inputs of a pairing payload, borrowed from the current configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairingInput<'a> {
    pub network_name: &'a str,
    pub network_key: &'a str,
    pub frequency: i32,
    pub power: u8,
    pub bandwidth: f32,
    pub radio_type: RadioType,
    pub station_address: &'a str,
}

/// Service for building the credential string handed to a joining station
pub struct PairingService;

impl PairingService {
    /// Build the delimited payload
    ///
    /// Format: `name//key//freq//power//bandwidth//station//address`
    pub fn build_payload(input: &PairingInput<'_>) -> String {
        [
            input.network_name.to_string(),
            input.network_key.to_string(),
            input.frequency.to_string(),
            input.power.to_string(),
            Self::format_bandwidth(input.bandwidth, input.radio_type),
            PROTOCOL_TAG.to_string(),
            input.station_address.to_string(),
        ]
        .join(FIELD_SEPARATOR)
    }

    /// TYPE_A radios take whole megahertz, everything else one decimal place.
    pub fn format_bandwidth(bandwidth: f32, radio_type: RadioType) -> String {
        match radio_type {
            RadioType::TypeA => format!("{bandwidth:.0}"),
            RadioType::None | RadioType::TypeB => format!("{bandwidth:.1}"),
        }
    }

    /// Square image dimension used on first render
    pub fn initial_size(width: u32, height: u32) -> u32 {
        width.min(height)
    }

    /// Clamp a user-requested image dimension
    pub fn clamp_size(requested: u32) -> u32 {
        requested.clamp(MIN_IMAGE_SIZE, MAX_IMAGE_SIZE)
    }
}
