//! In-process stand-in for the native radio library.
//!
//! Boots through BOOTING and CONFIGURING after being enabled, then reports a
//! link state. Staged network settings only take effect on `apply_settings`,
//! which sends the radio through CONFIGURING again. The link only comes up on
//! [`SimulatedRadio::CONNECT_FREQUENCY`].

use super::native::RadioPort;
use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

#[derive(Clone, Copy, Debug)]
pub struct Timings {
    pub detect: Duration,
    pub boot: Duration,
    pub configure: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            detect: Duration::from_millis(1000),
            boot: Duration::from_millis(2000),
            configure: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Default)]
struct Staged {
    frequency: Option<(i32, f32)>,
    network_id: Option<String>,
    network_password: Option<String>,
}

#[derive(Debug)]
struct Active {
    radio: i32,
    enabled_at: Instant,
    reconfigure_until: Option<Instant>,
}

#[derive(Debug)]
struct Inner {
    active: Option<Active>,
    frequency: i32,
    bandwidth: f32,
    power: i32,
    network_id: String,
    staged: Staged,
    log: String,
}

pub struct SimulatedRadio {
    timings: Timings,
    inner: Mutex<Inner>,
}

impl Default for SimulatedRadio {
    fn default() -> Self {
        Self::new(Timings::default())
    }
}

impl SimulatedRadio {
    pub const CONNECT_FREQUENCY: i32 = 1640;
    const FIRST_FREQUENCY: i32 = 1631;
    const LAST_FREQUENCY: i32 = 1720;
    const BANDWIDTHS: [f32; 7] = [3.0, 5.0, 10.0, 15.0, 20.0, 26.0, 40.0];

    pub fn new(timings: Timings) -> Self {
        SimulatedRadio {
            timings,
            inner: Mutex::new(Inner {
                active: None,
                frequency: 1641,
                bandwidth: 5.0,
                power: 20,
                network_id: String::new(),
                staged: Staged::default(),
                log: String::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_name(&self, inner: &Inner) -> &'static str {
        let Some(active) = &inner.active else {
            return "UNKNOWN";
        };

        let elapsed = active.enabled_at.elapsed();
        let booting = self.timings.detect;
        let configuring = booting + self.timings.boot;
        let operating = configuring + self.timings.configure;

        if elapsed < booting {
            "UNKNOWN"
        } else if elapsed < configuring {
            "BOOTING"
        } else if elapsed < operating
            || active
                .reconfigure_until
                .is_some_and(|until| Instant::now() < until)
        {
            "CONFIGURING"
        } else if inner.frequency == Self::CONNECT_FREQUENCY {
            "CONNECTED"
        } else {
            "DISCONNECTED"
        }
    }

    fn model_name(radio: i32) -> &'static str {
        match radio {
            1 => "PDDL2450",
            3 => "SBS 356-380 MHz",
            _ => "FAKE",
        }
    }

    fn supported_frequencies() -> impl Iterator<Item = i32> {
        Self::FIRST_FREQUENCY..=Self::LAST_FREQUENCY
    }

    fn log(inner: &mut Inner, line: impl AsRef<str>) {
        inner.log.push_str(line.as_ref());
        inner.log.push('\n');
    }

    /// Deterministic pseudo interference level per channel, lower is better.
    fn interference(frequency: i32, bandwidth: f32) -> i32 {
        (frequency * 7919 + bandwidth as i32 * 31).rem_euclid(97)
    }
}

impl RadioPort for SimulatedRadio {
    fn radio_present(&self) -> bool {
        self.lock().active.is_some()
    }

    fn get_state(&self) -> String {
        let inner = self.lock();
        self.state_name(&inner).to_string()
    }

    fn is_modem_connected(&self) -> bool {
        let inner = self.lock();
        self.state_name(&inner) == "CONNECTED"
    }

    fn status_string(&self) -> String {
        let inner = self.lock();
        let Some(active) = &inner.active else {
            return "DISABLED".to_string();
        };

        match self.state_name(&inner) {
            "BOOTING" => format!("{} : Initializing!", Self::model_name(active.radio)),
            "CONFIGURING" => format!("{} : Configuring!", Self::model_name(active.radio)),
            _ => Self::model_name(active.radio).to_string(),
        }
    }

    fn get_supported_freqs(&self) -> Vec<i32> {
        if self.radio_present() {
            Self::supported_frequencies().collect()
        } else {
            vec![0]
        }
    }

    fn get_supported_bws(&self) -> Vec<f32> {
        if self.radio_present() {
            Self::BANDWIDTHS.to_vec()
        } else {
            vec![0.0]
        }
    }

    fn get_freq(&self) -> i32 {
        self.lock().frequency
    }

    fn get_bw(&self) -> f32 {
        self.lock().bandwidth
    }

    fn get_power(&self) -> i32 {
        self.lock().power
    }

    fn get_network_id(&self) -> Option<String> {
        Some(self.lock().network_id.clone())
    }

    fn set_freq_bw(&self, freq: i32, bw: f32) -> i32 {
        let mut inner = self.lock();
        let freq_ok = Self::supported_frequencies().any(|f| f == freq);
        let bw_ok = Self::BANDWIDTHS.contains(&bw);

        if freq_ok && bw_ok {
            inner.staged.frequency = Some((freq, bw));
            Self::log(&mut inner, format!("staged frequency {freq} MHz / {bw} MHz"));
            0
        } else {
            Self::log(&mut inner, format!("rejected frequency {freq} MHz / {bw} MHz"));
            -1
        }
    }

    fn set_network_name(&self, name: &str) {
        let mut inner = self.lock();
        inner.staged.network_id = Some(name.to_string());
        Self::log(&mut inner, format!("Setting mesh id to: {name}"));
    }

    fn set_network_password(&self, password: &str) {
        self.lock().staged.network_password = Some(password.to_string());
    }

    fn apply_settings(&self) {
        let mut inner = self.lock();
        let staged = std::mem::take(&mut inner.staged);

        if let Some((freq, bw)) = staged.frequency {
            inner.frequency = freq;
            inner.bandwidth = bw;
        }
        if let Some(id) = staged.network_id {
            inner.network_id = id;
        }
        if staged.network_password.is_some() {
            Self::log(&mut inner, "network password updated");
        }

        let until = Instant::now() + self.timings.configure;
        if let Some(active) = inner.active.as_mut() {
            active.reconfigure_until = Some(until);
        }
        Self::log(&mut inner, "restarting services");
    }

    fn set_output_power(&self, dbm: i32) {
        let mut inner = self.lock();
        inner.power = dbm;
        Self::log(&mut inner, format!("setting output power to: {dbm}"));
    }

    fn enable_radio(&self, enable: bool, radio: i32) -> i32 {
        let mut inner = self.lock();

        if !enable {
            inner.active = None;
            Self::log(&mut inner, "radio disabled");
            return 0;
        }

        if !matches!(radio, 0 | 1 | 3) {
            Self::log(&mut inner, format!("unsupported radio type {radio}"));
            return -1;
        }

        inner.active = Some(Active {
            radio,
            enabled_at: Instant::now(),
            reconfigure_until: None,
        });
        Self::log(
            &mut inner,
            format!("{} handler active", Self::model_name(radio)),
        );
        0
    }

    fn scan_channels(&self, _sort: i32, count: i32, bw: f32) -> Vec<i32> {
        let mut channels: Vec<i32> = Self::supported_frequencies().collect();
        channels.sort_by_key(|f| (Self::interference(*f, bw), *f));
        channels.truncate(usize::try_from(count).unwrap_or_default());

        let mut inner = self.lock();
        Self::log(
            &mut inner,
            format!("scan finished with {} candidates", channels.len()),
        );
        channels
    }

    fn get_radio_log(&self) -> String {
        std::mem::take(&mut self.lock().log)
    }
}
