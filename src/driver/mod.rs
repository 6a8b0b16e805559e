//! Call contract of the native radio driver.
//!
//! Every call is synchronous and may block briefly. The native surface signals
//! failures through sentinel values; those are translated at the boundary
//! (see [`native`]) so everything above this module only ever sees
//! [`DriverResult`].

pub mod native;
pub mod simulated;

#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::{fmt, str::FromStr, sync::Arc};

pub type DriverResult<T> = Result<T, DriverError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverError {
    /// no radio is attached or the driver did not answer
    Unavailable { call: &'static str },
    /// the driver answered with a value outside its documented domain
    InvalidValue { call: &'static str, value: String },
    /// the driver refused a write and returned a non-zero status
    Rejected { call: &'static str, code: i32 },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Unavailable { call } => write!(f, "{call}: driver unavailable"),
            DriverError::InvalidValue { call, value } => {
                write!(f, "{call}: invalid value '{value}'")
            }
            DriverError::Rejected { call, code } => write!(f, "{call}: rejected with code {code}"),
        }
    }
}

impl std::error::Error for DriverError {}

/// Coarse device status reported by the driver.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    #[default]
    Unknown,
    Booting,
    Configuring,
    Ready,
    Removed,
}

impl LifecycleState {
    /// Only a ready radio accepts configuration.
    pub fn is_interactive(self) -> bool {
        matches!(self, LifecycleState::Ready)
    }
}

impl FromStr for LifecycleState {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "UNKNOWN" => Ok(LifecycleState::Unknown),
            "BOOTING" => Ok(LifecycleState::Booting),
            "CONFIGURING" => Ok(LifecycleState::Configuring),
            "REMOVED" => Ok(LifecycleState::Removed),
            // an operating radio reports its link state instead of READY
            "READY" | "CONNECTED" | "DISCONNECTED" | "SCANNING" => Ok(LifecycleState::Ready),
            other => Err(DriverError::InvalidValue {
                call: "getState",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Unknown => "UNKNOWN",
            LifecycleState::Booting => "BOOTING",
            LifecycleState::Configuring => "CONFIGURING",
            LifecycleState::Ready => "READY",
            LifecycleState::Removed => "REMOVED",
        };
        f.write_str(name)
    }
}

/// Radio hardware family selected by the user. The discriminants are the
/// codes the driver's `enableRadio` call expects.
#[derive(Clone, Copy, Debug, Default, Deserialize_repr, PartialEq, Eq, Serialize_repr)]
#[repr(u8)]
pub enum RadioType {
    /// neither selector active
    #[default]
    None = 0,
    TypeA = 1,
    TypeB = 3,
}

impl RadioType {
    /// Derive the type from the two mutually exclusive selectors.
    pub fn from_selectors(type_a: bool, type_b: bool) -> Self {
        if type_a {
            RadioType::TypeA
        } else if type_b {
            RadioType::TypeB
        } else {
            RadioType::None
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Ordering the driver applies to scan candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum ScanSort {
    Quality = 1,
}

#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait DriverClient: Send + Sync {
    fn state(&self) -> DriverResult<LifecycleState>;
    fn is_modem_connected(&self) -> DriverResult<bool>;
    fn status_label(&self) -> DriverResult<String>;
    fn supported_frequencies(&self) -> DriverResult<Vec<i32>>;
    fn supported_bandwidths(&self) -> DriverResult<Vec<f32>>;
    fn frequency(&self) -> DriverResult<i32>;
    fn bandwidth(&self) -> DriverResult<f32>;
    fn power(&self) -> DriverResult<i32>;
    fn network_id(&self) -> DriverResult<String>;
    fn set_frequency_and_bandwidth(&self, frequency: i32, bandwidth: f32) -> DriverResult<()>;
    fn set_network_name(&self, name: &str) -> DriverResult<()>;
    fn set_network_password(&self, password: &str) -> DriverResult<()>;
    fn apply_settings(&self) -> DriverResult<()>;
    fn set_output_power(&self, dbm: u8) -> DriverResult<()>;
    fn enable_radio(&self, enable: bool, radio_type: RadioType) -> DriverResult<()>;
    fn scan_channels(&self, sort: ScanSort, count: u32, bandwidth: f32)
    -> DriverResult<Vec<i32>>;
    fn radio_log(&self) -> DriverResult<String>;
}

impl<T: DriverClient + ?Sized> DriverClient for Arc<T> {
    fn state(&self) -> DriverResult<LifecycleState> {
        (**self).state()
    }
    fn is_modem_connected(&self) -> DriverResult<bool> {
        (**self).is_modem_connected()
    }
    fn status_label(&self) -> DriverResult<String> {
        (**self).status_label()
    }
    fn supported_frequencies(&self) -> DriverResult<Vec<i32>> {
        (**self).supported_frequencies()
    }
    fn supported_bandwidths(&self) -> DriverResult<Vec<f32>> {
        (**self).supported_bandwidths()
    }
    fn frequency(&self) -> DriverResult<i32> {
        (**self).frequency()
    }
    fn bandwidth(&self) -> DriverResult<f32> {
        (**self).bandwidth()
    }
    fn power(&self) -> DriverResult<i32> {
        (**self).power()
    }
    fn network_id(&self) -> DriverResult<String> {
        (**self).network_id()
    }
    fn set_frequency_and_bandwidth(&self, frequency: i32, bandwidth: f32) -> DriverResult<()> {
        (**self).set_frequency_and_bandwidth(frequency, bandwidth)
    }
    fn set_network_name(&self, name: &str) -> DriverResult<()> {
        (**self).set_network_name(name)
    }
    fn set_network_password(&self, password: &str) -> DriverResult<()> {
        (**self).set_network_password(password)
    }
    fn apply_settings(&self) -> DriverResult<()> {
        (**self).apply_settings()
    }
    fn set_output_power(&self, dbm: u8) -> DriverResult<()> {
        (**self).set_output_power(dbm)
    }
    fn enable_radio(&self, enable: bool, radio_type: RadioType) -> DriverResult<()> {
        (**self).enable_radio(enable, radio_type)
    }
    fn scan_channels(
        &self,
        sort: ScanSort,
        count: u32,
        bandwidth: f32,
    ) -> DriverResult<Vec<i32>> {
        (**self).scan_channels(sort, count, bandwidth)
    }
    fn radio_log(&self) -> DriverResult<String> {
        (**self).radio_log()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod lifecycle_state {
        use super::*;

        #[test]
        fn parses_documented_names() {
            assert_eq!("UNKNOWN".parse(), Ok(LifecycleState::Unknown));
            assert_eq!("BOOTING".parse(), Ok(LifecycleState::Booting));
            assert_eq!("CONFIGURING".parse(), Ok(LifecycleState::Configuring));
            assert_eq!("READY".parse(), Ok(LifecycleState::Ready));
            assert_eq!("REMOVED".parse(), Ok(LifecycleState::Removed));
        }

        #[test]
        fn link_states_count_as_ready() {
            for name in ["CONNECTED", "DISCONNECTED", "SCANNING"] {
                assert_eq!(name.parse(), Ok(LifecycleState::Ready), "{name}");
            }
        }

        #[test]
        fn garbage_is_rejected() {
            let err = "\u{fffd}READY?".parse::<LifecycleState>().unwrap_err();
            assert!(matches!(
                err,
                DriverError::InvalidValue {
                    call: "getState",
                    ..
                }
            ));
        }

        #[test]
        fn only_ready_is_interactive() {
            assert!(LifecycleState::Ready.is_interactive());
            for state in [
                LifecycleState::Unknown,
                LifecycleState::Booting,
                LifecycleState::Configuring,
                LifecycleState::Removed,
            ] {
                assert!(!state.is_interactive(), "{state}");
            }
        }
    }

    mod radio_type {
        use super::*;

        #[test]
        fn derives_from_selectors() {
            assert_eq!(RadioType::from_selectors(true, false), RadioType::TypeA);
            assert_eq!(RadioType::from_selectors(false, true), RadioType::TypeB);
            assert_eq!(RadioType::from_selectors(false, false), RadioType::None);
        }

        #[test]
        fn codes_match_driver_contract() {
            assert_eq!(RadioType::None.code(), 0);
            assert_eq!(RadioType::TypeA.code(), 1);
            assert_eq!(RadioType::TypeB.code(), 3);
        }

        #[test]
        fn serializes_as_code() {
            assert_eq!(serde_json::to_string(&RadioType::TypeB).unwrap(), "3");
            assert_eq!(
                serde_json::from_str::<RadioType>("1").unwrap(),
                RadioType::TypeA
            );
        }
    }
}
