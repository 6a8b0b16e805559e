//! Adapter from the sentinel-valued native surface to [`DriverClient`].
//!
//! The native layer never raises: a missing radio shows up as an empty state
//! name, a `[0]` frequency/bandwidth list, a negative reading or a non-zero
//! status code. [`NativeDriverClient`] maps each of those onto a
//! [`DriverError`].

use super::{DriverClient, DriverError, DriverResult, LifecycleState, RadioType, ScanSort};
use log::{debug, warn};
#[cfg(test)]
use mockall::automock;

/// Raw call surface of the native radio library.
#[cfg_attr(test, automock)]
pub trait RadioPort: Send + Sync {
    /// `false` while no radio instance exists inside the native layer
    fn radio_present(&self) -> bool;
    fn get_state(&self) -> String;
    fn is_modem_connected(&self) -> bool;
    fn status_string(&self) -> String;
    fn get_supported_freqs(&self) -> Vec<i32>;
    fn get_supported_bws(&self) -> Vec<f32>;
    fn get_freq(&self) -> i32;
    fn get_bw(&self) -> f32;
    fn get_power(&self) -> i32;
    fn get_network_id(&self) -> Option<String>;
    fn set_freq_bw(&self, freq: i32, bw: f32) -> i32;
    fn set_network_name(&self, name: &str);
    fn set_network_password(&self, password: &str);
    fn apply_settings(&self);
    fn set_output_power(&self, dbm: i32);
    fn enable_radio(&self, enable: bool, radio: i32) -> i32;
    fn scan_channels(&self, sort: i32, count: i32, bw: f32) -> Vec<i32>;
    fn get_radio_log(&self) -> String;
}

#[derive(Clone)]
pub struct NativeDriverClient<P> {
    port: P,
}

impl<P: RadioPort> NativeDriverClient<P> {
    const GET_STATE: &str = "getState";
    const STATUS_STRING: &str = "stringFromJNI";
    const GET_SUPPORTED_FREQS: &str = "getSupportedFreqs";
    const GET_SUPPORTED_BWS: &str = "getSupportedBWs";
    const GET_FREQ: &str = "getFreq";
    const GET_BW: &str = "getBW";
    const GET_POWER: &str = "getPower";
    const GET_NETWORK_ID: &str = "getNetworkID";
    const SET_FREQ_BW: &str = "setFreqBW";
    const SET_NETWORK_NAME: &str = "setNetworkName";
    const SET_NETWORK_PASSWORD: &str = "setNetworkPassword";
    const APPLY_SETTINGS: &str = "applySettings";
    const SET_OUTPUT_POWER: &str = "SetOutputPower";
    const ENABLE_RADIO: &str = "enableRadio";
    const SCAN_CHANNELS: &str = "scanChannels";

    pub fn new(port: P) -> Self {
        NativeDriverClient { port }
    }

    /// Most native calls dereference the radio instance unchecked, so they
    /// are only issued once presence is confirmed.
    fn require_radio(&self, call: &'static str) -> DriverResult<()> {
        if self.port.radio_present() {
            Ok(())
        } else {
            debug!("{call}: no radio present");
            Err(DriverError::Unavailable { call })
        }
    }

    /// A list containing only `0` is what the native layer answers without a radio.
    fn non_placeholder<T: Copy + PartialEq + Default>(
        call: &'static str,
        values: Vec<T>,
    ) -> DriverResult<Vec<T>> {
        if values.is_empty() || values.iter().all(|v| *v == T::default()) {
            Err(DriverError::Unavailable { call })
        } else {
            Ok(values)
        }
    }

    fn status(call: &'static str, code: i32) -> DriverResult<()> {
        if code == 0 {
            Ok(())
        } else {
            warn!("{call} returned {code}");
            Err(DriverError::Rejected { call, code })
        }
    }
}

impl<P: RadioPort> DriverClient for NativeDriverClient<P> {
    fn state(&self) -> DriverResult<LifecycleState> {
        let name = self.port.get_state();
        if name.is_empty() {
            return Err(DriverError::Unavailable {
                call: Self::GET_STATE,
            });
        }
        name.parse()
    }

    fn is_modem_connected(&self) -> DriverResult<bool> {
        // the native side already folds "no radio" into false
        Ok(self.port.is_modem_connected())
    }

    fn status_label(&self) -> DriverResult<String> {
        let label = self.port.status_string();
        if label.is_empty() {
            Err(DriverError::Unavailable {
                call: Self::STATUS_STRING,
            })
        } else {
            Ok(label)
        }
    }

    fn supported_frequencies(&self) -> DriverResult<Vec<i32>> {
        Self::non_placeholder(Self::GET_SUPPORTED_FREQS, self.port.get_supported_freqs())
    }

    fn supported_bandwidths(&self) -> DriverResult<Vec<f32>> {
        let bws = self.port.get_supported_bws();
        if bws.iter().any(|bw| !bw.is_finite()) {
            return Err(DriverError::InvalidValue {
                call: Self::GET_SUPPORTED_BWS,
                value: format!("{bws:?}"),
            });
        }
        Self::non_placeholder(Self::GET_SUPPORTED_BWS, bws)
    }

    fn frequency(&self) -> DriverResult<i32> {
        self.require_radio(Self::GET_FREQ)?;
        match self.port.get_freq() {
            freq if freq > 0 => Ok(freq),
            freq => Err(DriverError::InvalidValue {
                call: Self::GET_FREQ,
                value: freq.to_string(),
            }),
        }
    }

    fn bandwidth(&self) -> DriverResult<f32> {
        self.require_radio(Self::GET_BW)?;
        match self.port.get_bw() {
            bw if bw.is_finite() && bw > 0.0 => Ok(bw),
            bw => Err(DriverError::InvalidValue {
                call: Self::GET_BW,
                value: bw.to_string(),
            }),
        }
    }

    fn power(&self) -> DriverResult<i32> {
        self.require_radio(Self::GET_POWER)?;
        match self.port.get_power() {
            dbm if dbm >= 0 => Ok(dbm),
            dbm => Err(DriverError::InvalidValue {
                call: Self::GET_POWER,
                value: dbm.to_string(),
            }),
        }
    }

    fn network_id(&self) -> DriverResult<String> {
        self.require_radio(Self::GET_NETWORK_ID)?;
        self.port.get_network_id().ok_or(DriverError::Unavailable {
            call: Self::GET_NETWORK_ID,
        })
    }

    fn set_frequency_and_bandwidth(&self, frequency: i32, bandwidth: f32) -> DriverResult<()> {
        self.require_radio(Self::SET_FREQ_BW)?;
        Self::status(
            Self::SET_FREQ_BW,
            self.port.set_freq_bw(frequency, bandwidth),
        )
    }

    fn set_network_name(&self, name: &str) -> DriverResult<()> {
        self.require_radio(Self::SET_NETWORK_NAME)?;
        self.port.set_network_name(name);
        Ok(())
    }

    fn set_network_password(&self, password: &str) -> DriverResult<()> {
        self.require_radio(Self::SET_NETWORK_PASSWORD)?;
        self.port.set_network_password(password);
        Ok(())
    }

    fn apply_settings(&self) -> DriverResult<()> {
        self.require_radio(Self::APPLY_SETTINGS)?;
        self.port.apply_settings();
        Ok(())
    }

    fn set_output_power(&self, dbm: u8) -> DriverResult<()> {
        self.require_radio(Self::SET_OUTPUT_POWER)?;
        self.port.set_output_power(i32::from(dbm));
        Ok(())
    }

    fn enable_radio(&self, enable: bool, radio_type: RadioType) -> DriverResult<()> {
        Self::status(
            Self::ENABLE_RADIO,
            self.port
                .enable_radio(enable, i32::from(radio_type.code())),
        )
    }

    fn scan_channels(
        &self,
        sort: ScanSort,
        count: u32,
        bandwidth: f32,
    ) -> DriverResult<Vec<i32>> {
        self.require_radio(Self::SCAN_CHANNELS)?;
        let count = i32::try_from(count).map_err(|_| DriverError::InvalidValue {
            call: Self::SCAN_CHANNELS,
            value: count.to_string(),
        })?;
        // an empty answer is a legitimate "nothing found"
        Ok(self.port.scan_channels(sort as i32, count, bandwidth))
    }

    fn radio_log(&self) -> DriverResult<String> {
        Ok(self.port.get_radio_log())
    }
}
