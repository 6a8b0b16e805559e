//! Durable storage of the last user configuration.

use crate::driver::RadioType;
use anyhow::{Context, Result};
use log::{debug, info};
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

/// Key/value record as it is written to disk.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct PersistedSettings {
    #[serde(rename = "networkID", default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    #[serde(rename = "networkPass", default, skip_serializing_if = "Option::is_none")]
    pub network_pass: Option<String>,
    #[serde(rename = "radioEnabled", default)]
    pub radio_enabled: bool,
    #[serde(rename = "radioSelection", default)]
    pub radio_selection: RadioType,
    #[serde(rename = "encryptionKey", default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
}

#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait SettingsStore: Send {
    fn load(&self) -> Result<PersistedSettings>;
    fn save(&self, settings: &PersistedSettings) -> Result<()>;
}

/// JSON file store that replaces the file atomically on every save.
#[derive(Clone, Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSettingsStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<PersistedSettings> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no settings found at {:?}, using defaults", self.path);
                return Ok(PersistedSettings::default());
            }
            Err(e) => {
                return Err(e).context(format!("failed to read settings file: {:?}", self.path));
            }
        };

        serde_json::from_str(&content)
            .context(format!("failed to parse settings file: {:?}", self.path))
    }

    fn save(&self, settings: &PersistedSettings) -> Result<()> {
        debug!("save settings to {:?}", self.path);

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).context("failed to create settings directory")?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path).context("failed to create temp settings file")?;

        serde_json::to_writer_pretty(&mut file, settings)
            .context("failed to serialize settings")?;
        file.flush().context("failed to write settings file")?;
        file.sync_all().context("failed to sync settings file")?;

        fs::rename(&temp_path, &self.path).context("failed to replace settings file")
    }
}
