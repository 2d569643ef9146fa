use crate::consts::{DEFAULT_MAX_RETRIES, DEFAULT_REFERENCE_IMPEDANCE};
use crate::error::ConfigError;
use crate::sweep::Averaging;
use chrono::Local;
use serde::{Deserialize, Serialize};
use simple_error::{bail, SimpleError};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SweepMode {
    #[default]
    Single,
    /// Sweep again after each completed sweep until stopped
    Continuous,
}

impl SweepMode {
    pub fn to_str(&self) -> &str {
        match self {
            SweepMode::Single => "single",
            SweepMode::Continuous => "continuous",
        }
    }
}

impl FromStr for SweepMode {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(SweepMode::Single),
            "continuous" | "cont" => Ok(SweepMode::Continuous),
            _ => bail!("string not a valid sweep mode"),
        }
    }
}

impl fmt::Display for SweepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SweepSettings {
    /// Name put in front of the timestamp of each sweep's source label
    #[serde(default)]
    pub title: String,
    pub mode: SweepMode,
    pub averaging: Averaging,
    /// Retries of a segment after a transient device error
    pub max_retries: u32,
    /// Wait after opening the device, milliseconds
    pub settle_delay_ms: u64,
    pub reference_impedance: f64,
}

impl Default for SweepSettings {
    fn default() -> Self {
        SweepSettings {
            title: String::new(),
            mode: SweepMode::Single,
            averaging: Averaging::none(),
            max_retries: DEFAULT_MAX_RETRIES,
            settle_delay_ms: 0,
            reference_impedance: DEFAULT_REFERENCE_IMPEDANCE,
        }
    }
}

impl SweepSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.averaging.validate()
    }

    /// `"<title> <local time>"`, or the local time alone without a title
    pub fn source_label(&self) -> String {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S");
        if self.title.is_empty() {
            now.to_string()
        } else {
            format!("{} {}", self.title, now)
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepSettingsBuilder {
    settings: SweepSettings,
}

impl SweepSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.settings.title = title.to_string();
        self
    }

    pub fn mode(mut self, mode: SweepMode) -> Self {
        self.settings.mode = mode;
        self
    }

    pub fn averaging(mut self, averaging: Averaging) -> Self {
        self.settings.averaging = averaging;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.settings.max_retries = max_retries;
        self
    }

    pub fn settle_delay_ms(mut self, settle_delay_ms: u64) -> Self {
        self.settings.settle_delay_ms = settle_delay_ms;
        self
    }

    pub fn reference_impedance(mut self, reference_impedance: f64) -> Self {
        self.settings.reference_impedance = reference_impedance;
        self
    }

    pub fn build(self) -> SweepSettings {
        self.settings
    }
}
