use anyhow::{Context, Result};
use std::{env, path::PathBuf, sync::OnceLock, time::Duration};

/// Application configuration loaded and validated at startup
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Settings store location
    pub settings_path: PathBuf,

    /// Polling cadence
    pub polling: PollingConfig,

    /// Pairing payload configuration
    pub pairing: PairingConfig,

    /// Display area the headless shell pretends to render into
    pub display: DisplayConfig,
}

#[derive(Clone, Debug)]
pub struct PollingConfig {
    pub state_interval: Duration,
    pub log_interval: Duration,
    pub log_trim_interval: Duration,
}

#[derive(Clone, Debug)]
pub struct PairingConfig {
    pub station_address: String,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        PollingConfig {
            state_interval: Duration::from_millis(500),
            log_interval: Duration::from_millis(200),
            log_trim_interval: Duration::from_secs(10),
        }
    }
}

impl Default for PairingConfig {
    fn default() -> Self {
        PairingConfig {
            station_address: "192.168.20.4".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            width: 1080,
            height: 1920,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            settings_path: PathBuf::from("radio-link-ui.json"),
            polling: PollingConfig::default(),
            pairing: PairingConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get or load the application configuration
    ///
    /// Returns a reference to the cached configuration. On first call, it loads
    /// and validates all configuration from environment variables.
    ///
    /// # Panics
    /// Panics if configuration loading fails. The application cannot run
    /// without a valid configuration.
    pub fn get() -> &'static Self {
        static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();
        APP_CONFIG
            .get_or_init(|| Self::load().expect("failed to load application configuration"))
    }

    /// Load all configuration from environment variables, bypassing the cache
    pub fn load() -> Result<Self> {
        let settings_path = env::var("RADIO_SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default().settings_path);

        Ok(Self {
            settings_path,
            polling: PollingConfig::load()?,
            pairing: PairingConfig::load()?,
            display: DisplayConfig::load()?,
        })
    }
}

impl PollingConfig {
    fn load() -> Result<Self> {
        let defaults = Self::default();

        let state_interval = env_millis("RADIO_STATE_POLL_MS")?.unwrap_or(defaults.state_interval);
        let log_interval = env_millis("RADIO_LOG_POLL_MS")?.unwrap_or(defaults.log_interval);
        let log_trim_interval = env::var("RADIO_LOG_TRIM_SECS")
            .ok()
            .map(|secs| {
                secs.parse::<u64>()
                    .context("failed to parse RADIO_LOG_TRIM_SECS: invalid format")
            })
            .transpose()?
            .map(Duration::from_secs)
            .unwrap_or(defaults.log_trim_interval);

        anyhow::ensure!(
            !state_interval.is_zero() && !log_interval.is_zero() && !log_trim_interval.is_zero(),
            "failed to load polling config: intervals must be non-zero"
        );

        Ok(Self {
            state_interval,
            log_interval,
            log_trim_interval,
        })
    }
}

impl PairingConfig {
    fn load() -> Result<Self> {
        let station_address = env::var("RADIO_STATION_ADDRESS")
            .unwrap_or_else(|_| Self::default().station_address);

        anyhow::ensure!(
            !station_address.contains("//"),
            "failed to load pairing config: station address must not contain the field separator"
        );

        Ok(Self { station_address })
    }
}

impl DisplayConfig {
    fn load() -> Result<Self> {
        let defaults = Self::default();

        let width = match env::var("RADIO_DISPLAY_WIDTH") {
            Ok(width) => width
                .parse::<u32>()
                .context("failed to parse RADIO_DISPLAY_WIDTH: invalid format")?,
            Err(_) => defaults.width,
        };

        let height = match env::var("RADIO_DISPLAY_HEIGHT") {
            Ok(height) => height
                .parse::<u32>()
                .context("failed to parse RADIO_DISPLAY_HEIGHT: invalid format")?,
            Err(_) => defaults.height,
        };

        Ok(Self { width, height })
    }
}

fn env_millis(name: &str) -> Result<Option<Duration>> {
    env::var(name)
        .ok()
        .map(|ms| {
            ms.parse::<u64>()
                .map(Duration::from_millis)
                .context(format!("failed to parse {name}: invalid format"))
        })
        .transpose()
}
