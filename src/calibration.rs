//! Error correction from measured calibration standards.
//!
//! Reverse standards are measured with the device under test flipped, so
//! their `s11` holds the port 2 reflection and their `s21` the reverse
//! transmission.

mod model;
mod standard;

pub use self::model::{CorrectionModel, ErrorTerms};
pub use self::standard::{
    CalibrationRole, CalibrationSet, CalibrationStandard, LoadModel, OpenModel, ShortModel,
    StandardModels, StandardModelsBuilder, ThroughModel,
};

use crate::datapoint::Datapoint;
use crate::error::CalibrationError;
use serde::{Deserialize, Serialize};
use simple_error::{bail, SimpleError};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum CalibrationMethod {
    /// Reflection tracking from a short alone
    Short,
    /// Directivity, source match and reflection tracking
    #[default]
    Sol,
    /// SOL plus isolation, load match and transmission tracking
    Solt,
    /// Twelve terms, forward and reverse
    FullTwoPort,
}

impl CalibrationMethod {
    pub fn to_str(&self) -> &str {
        match self {
            CalibrationMethod::Short => "Short",
            CalibrationMethod::Sol => "SOL",
            CalibrationMethod::Solt => "SOLT",
            CalibrationMethod::FullTwoPort => "Full two-port",
        }
    }

    pub fn required_roles(&self) -> &'static [CalibrationRole] {
        use CalibrationRole::*;
        match self {
            CalibrationMethod::Short => &[Short],
            CalibrationMethod::Sol => &[Short, Open, Load],
            CalibrationMethod::Solt => &[Short, Open, Load, Through, Isolation],
            CalibrationMethod::FullTwoPort => &[
                Short,
                Open,
                Load,
                Through,
                Isolation,
                ReverseShort,
                ReverseOpen,
                ReverseLoad,
                ReverseThrough,
                ReverseIsolation,
            ],
        }
    }

    /// Whether the method corrects S21
    pub fn corrects_transmission(&self) -> bool {
        matches!(self, CalibrationMethod::Solt | CalibrationMethod::FullTwoPort)
    }
}

impl FromStr for CalibrationMethod {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(CalibrationMethod::Short),
            "sol" => Ok(CalibrationMethod::Sol),
            "solt" => Ok(CalibrationMethod::Solt),
            "full two-port" | "full" | "12-term" => Ok(CalibrationMethod::FullTwoPort),
            _ => bail!("string not a valid calibration method"),
        }
    }
}

impl fmt::Display for CalibrationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Solve the error terms of `method` from measured standards
pub fn derive_model(
    standards: &CalibrationSet,
    method: CalibrationMethod,
    models: &StandardModels,
) -> Result<CorrectionModel, CalibrationError> {
    CorrectionModel::derive(standards, method, models)
}

/// Correct a raw reflection reading
pub fn apply(model: &CorrectionModel, raw: &Datapoint) -> Result<Datapoint, CalibrationError> {
    model.apply(raw)
}

/// Correct a raw transmission reading given the raw reflection at the same frequency
pub fn apply_transmission(
    model: &CorrectionModel,
    s11_raw: &Datapoint,
    s21_raw: &Datapoint,
) -> Result<Datapoint, CalibrationError> {
    model.apply_transmission(s11_raw, s21_raw)
}

pub fn apply_pair(
    model: &CorrectionModel,
    s11_raw: &Datapoint,
    s21_raw: &Datapoint,
) -> Result<(Datapoint, Datapoint), CalibrationError> {
    model.apply_pair(s11_raw, s21_raw)
}

/// Twelve term correction of `[s11, s21, s12, s22]`
pub fn apply_two_port(
    model: &CorrectionModel,
    raw: &[Datapoint; 4],
) -> Result<[Datapoint; 4], CalibrationError> {
    model.apply_two_port(raw)
}
