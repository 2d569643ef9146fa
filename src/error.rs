use crate::calibration::{CalibrationMethod, CalibrationRole};
use crate::sweep::SweepState;
use std::fmt;

/// Errors from frequency text parsing
#[derive(Clone, Debug, PartialEq)]
pub enum ParseError {
    MalformedNumber(String),
    UnknownUnit(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MalformedNumber(text) => write!(f, "Malformed number: {:?}", text),
            ParseError::UnknownUnit(text) => write!(f, "Unknown unit: {:?}", text),
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors from reading or writing touchstone files
#[derive(Clone, Debug, PartialEq)]
pub enum FormatError {
    IllegalOptionLine(String),
    NotAnOptionLine(String),
    RowArityMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    InvalidNumber {
        line: usize,
        token: String,
    },
    Io(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::IllegalOptionLine(line) => write!(f, "Illegal option line: {}", line),
            FormatError::NotAnOptionLine(line) => write!(f, "Not an option line: {}", line),
            FormatError::RowArityMismatch {
                line,
                expected,
                found,
            } => write!(
                f,
                "Line {}: expected {} values per row, found {}",
                line, expected, found
            ),
            FormatError::InvalidNumber { line, token } => {
                write!(f, "Line {}: invalid number {:?}", line, token)
            }
            FormatError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        FormatError::Io(err.to_string())
    }
}

/// Errors from deriving or applying a correction model
#[derive(Clone, Debug, PartialEq)]
pub enum CalibrationError {
    IncompleteStandardSet {
        method: CalibrationMethod,
        missing: Vec<CalibrationRole>,
    },
    FrequencyOutOfCalibrationRange {
        frequency: u64,
        min: u64,
        max: u64,
    },
    InvalidStandardData {
        role: CalibrationRole,
        reason: String,
    },
    SingularStandards {
        frequency: u64,
    },
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::IncompleteStandardSet { method, missing } => {
                let names: Vec<&str> = missing.iter().map(|role| role.to_str()).collect();
                write!(
                    f,
                    "Incomplete standard set for {} calibration, missing: {}",
                    method,
                    names.join(", ")
                )
            }
            CalibrationError::FrequencyOutOfCalibrationRange {
                frequency,
                min,
                max,
            } => write!(
                f,
                "Frequency {} Hz outside calibrated range {}..={} Hz",
                frequency, min, max
            ),
            CalibrationError::InvalidStandardData { role, reason } => {
                write!(f, "Invalid {} standard data: {}", role, reason)
            }
            CalibrationError::SingularStandards { frequency } => write!(
                f,
                "Standards do not determine the error terms at {} Hz",
                frequency
            ),
        }
    }
}

impl std::error::Error for CalibrationError {}

/// Errors reported by a device adapter
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceError {
    Transient(String),
    Fatal(String),
}

impl DeviceError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, DeviceError::Fatal(_))
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Transient(msg) => write!(f, "Transient device error: {}", msg),
            DeviceError::Fatal(msg) => write!(f, "Fatal device error: {}", msg),
        }
    }
}

impl std::error::Error for DeviceError {}

/// Errors from validating sweep configuration
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    InvalidAveragingParameters { count: usize, truncate: usize },
    SegmentTooLarge { points: usize, max: usize },
    EmptyPlan,
    InvalidRange { start: u64, stop: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidAveragingParameters { count, truncate } => write!(
                f,
                "Invalid averaging parameters: {} readings with {} truncated",
                count, truncate
            ),
            ConfigError::SegmentTooLarge { points, max } => write!(
                f,
                "Segment of {} points exceeds device batch size of {}",
                points, max
            ),
            ConfigError::EmptyPlan => write!(f, "Sweep plan has no frequencies"),
            ConfigError::InvalidRange { start, stop } => {
                write!(f, "Invalid sweep range {} Hz to {} Hz", start, stop)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors from time domain analysis
#[derive(Clone, Debug, PartialEq)]
pub enum TdrError {
    InsufficientData { points: usize, required: usize },
    InvalidVelocityFactor(f64),
}

impl fmt::Display for TdrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TdrError::InsufficientData { points, required } => write!(
                f,
                "Insufficient data for TDR: {} points, at least {} required",
                points, required
            ),
            TdrError::InvalidVelocityFactor(vf) => {
                write!(f, "Velocity factor {} must be in (0, 1]", vf)
            }
        }
    }
}

impl std::error::Error for TdrError {}

/// Errors returned by the sweep worker control surface
#[derive(Clone, Debug, PartialEq)]
pub enum SweepError {
    InvalidState(SweepState),
    Config(ConfigError),
    Calibration(CalibrationError),
    Device(DeviceError),
    Spawn(String),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::InvalidState(state) => {
                write!(f, "Cannot start a sweep while {}", state)
            }
            SweepError::Config(err) => write!(f, "{}", err),
            SweepError::Calibration(err) => write!(f, "{}", err),
            SweepError::Device(err) => write!(f, "{}", err),
            SweepError::Spawn(msg) => write!(f, "Failed to spawn sweep thread: {}", msg),
        }
    }
}

impl std::error::Error for SweepError {}

impl From<ConfigError> for SweepError {
    fn from(err: ConfigError) -> Self {
        SweepError::Config(err)
    }
}

impl From<CalibrationError> for SweepError {
    fn from(err: CalibrationError) -> Self {
        SweepError::Calibration(err)
    }
}

impl From<DeviceError> for SweepError {
    fn from(err: DeviceError) -> Self {
        SweepError::Device(err)
    }
}
