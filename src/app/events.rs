use crate::driver::{DriverResult, LifecycleState};

use super::model::ConfigField;

/// One reading of the periodic device poll. Each read may fail on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub state: DriverResult<LifecycleState>,
    pub connected: DriverResult<bool>,
    pub status_label: DriverResult<String>,
}

/// Raw user input for one field of the working configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEdit {
    Frequency(String),
    Bandwidth(String),
    TransmitPower(String),
    NetworkName(String),
    NetworkKey(String),
}

impl ConfigEdit {
    pub fn field(&self) -> ConfigField {
        match self {
            ConfigEdit::Frequency(_) => ConfigField::Frequency,
            ConfigEdit::Bandwidth(_) => ConfigField::Bandwidth,
            ConfigEdit::TransmitPower(_) => ConfigField::TransmitPower,
            ConfigEdit::NetworkName(_) => ConfigField::NetworkName,
            ConfigEdit::NetworkKey(_) => ConfigField::NetworkKey,
        }
    }
}

/// Events that can happen in the app
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // Initialization
    Initialize,

    // Polling
    Sampled(Sample),
    LogFragment(String),
    TrimLog,

    // Surface
    VisibilityChanged(bool),

    // Configuration
    Edit(ConfigEdit),
    Commit,
    RadioToggled {
        checked: bool,
        type_a: bool,
        type_b: bool,
    },
    RegenerateKey,

    // Channel scan
    ScanRequested,
    ScanCompleted(DriverResult<Vec<i32>>),
    RecommendationAccepted,
    RecommendationDeclined,

    // Pairing
    ShowPairing {
        width: u32,
        height: u32,
    },
    PairingSizeChanged(u32),
    HidePairing,

    // UI actions
    ClearLog,
    ClearNotice,
}
