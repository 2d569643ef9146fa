use crate::error::FormatError;
use crate::math::{db_to_mag, from_polar_deg, mag_to_db};
use crate::parameter::RFParameter;
use crate::scale::Scale;
use num::complex::{c64, Complex64};
use serde::{Deserialize, Serialize};
use simple_error::{bail, SimpleError};
use std::{fmt, str::FromStr};

/// Unit of the frequency column
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum FrequencyUnit {
    Hz,
    KHz,
    MHz,
    #[default]
    GHz,
}

impl FrequencyUnit {
    pub fn to_str(&self) -> &str {
        match self {
            FrequencyUnit::Hz => "HZ",
            FrequencyUnit::KHz => "KHZ",
            FrequencyUnit::MHz => "MHZ",
            FrequencyUnit::GHz => "GHZ",
        }
    }

    pub fn scale(&self) -> Scale {
        match self {
            FrequencyUnit::Hz => Scale::Base,
            FrequencyUnit::KHz => Scale::Kilo,
            FrequencyUnit::MHz => Scale::Mega,
            FrequencyUnit::GHz => Scale::Giga,
        }
    }

    /// Hz per unit
    pub fn factor(&self) -> f64 {
        self.scale().multiplier()
    }
}

impl FromStr for FrequencyUnit {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hz" => Ok(FrequencyUnit::Hz),
            "khz" => Ok(FrequencyUnit::KHz),
            "mhz" => Ok(FrequencyUnit::MHz),
            "ghz" => Ok(FrequencyUnit::GHz),
            _ => bail!("string not a valid frequency unit"),
        }
    }
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Representation of the complex pairs in a data row
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum DataFormat {
    /// magnitude, angle in degrees
    #[default]
    MagAng,
    /// dB, angle in degrees
    DbAng,
    /// real, imaginary
    ReIm,
}

impl DataFormat {
    pub fn to_str(&self) -> &str {
        match self {
            DataFormat::MagAng => "MA",
            DataFormat::DbAng => "DB",
            DataFormat::ReIm => "RI",
        }
    }

    pub fn parse(&self, x: f64, y: f64) -> Complex64 {
        match self {
            DataFormat::MagAng => from_polar_deg(x, y),
            DataFormat::DbAng => from_polar_deg(db_to_mag(x), y),
            DataFormat::ReIm => c64(x, y),
        }
    }

    pub fn render(&self, z: Complex64) -> (f64, f64) {
        match self {
            DataFormat::MagAng => (z.norm(), z.arg().to_degrees()),
            DataFormat::DbAng => (mag_to_db(z.norm()), z.arg().to_degrees()),
            DataFormat::ReIm => (z.re, z.im),
        }
    }
}

impl FromStr for DataFormat {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ma" => Ok(DataFormat::MagAng),
            "db" => Ok(DataFormat::DbAng),
            "ri" => Ok(DataFormat::ReIm),
            _ => bail!("string not a valid data format"),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// What a single option line token sets
#[derive(Clone, Copy, Debug, PartialEq)]
enum OptionToken {
    Unit(FrequencyUnit),
    Parameter(RFParameter),
    Format(DataFormat),
    Resistance,
}

const OPTION_TOKENS: [(&str, OptionToken); 13] = [
    ("hz", OptionToken::Unit(FrequencyUnit::Hz)),
    ("khz", OptionToken::Unit(FrequencyUnit::KHz)),
    ("mhz", OptionToken::Unit(FrequencyUnit::MHz)),
    ("ghz", OptionToken::Unit(FrequencyUnit::GHz)),
    ("s", OptionToken::Parameter(RFParameter::S)),
    ("y", OptionToken::Parameter(RFParameter::Y)),
    ("z", OptionToken::Parameter(RFParameter::Z)),
    ("g", OptionToken::Parameter(RFParameter::G)),
    ("h", OptionToken::Parameter(RFParameter::H)),
    ("db", OptionToken::Format(DataFormat::DbAng)),
    ("ma", OptionToken::Format(DataFormat::MagAng)),
    ("ri", OptionToken::Format(DataFormat::ReIm)),
    ("r", OptionToken::Resistance),
];

impl OptionToken {
    fn classify(token: &str) -> Option<OptionToken> {
        OPTION_TOKENS
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, kind)| *kind)
    }
}

/// Touchstone option line, `# <unit> <parameter> <format> R <resistance>`
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Options {
    pub unit: FrequencyUnit,
    pub parameter: RFParameter,
    pub format: DataFormat,
    pub resistance: f64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            unit: FrequencyUnit::GHz,
            parameter: RFParameter::S,
            format: DataFormat::MagAng,
            resistance: 50.0,
        }
    }
}

impl Options {
    /// Options written by a normalized export
    pub fn normalized(resistance: f64) -> Self {
        Options {
            unit: FrequencyUnit::Hz,
            parameter: RFParameter::S,
            format: DataFormat::ReIm,
            resistance,
        }
    }

    /// Hz per unit of the frequency column
    pub fn factor(&self) -> f64 {
        self.unit.factor()
    }

    /// Apply an option line. Tokens may come in any order and case, each
    /// field at most once. Fields not named keep their value. On error
    /// nothing changes.
    pub fn parse(&mut self, line: &str) -> Result<(), FormatError> {
        let Some(body) = line.strip_prefix('#') else {
            return Err(FormatError::NotAnOptionLine(line.to_string()));
        };
        let illegal = || FormatError::IllegalOptionLine(line.to_string());

        let mut parsed = *self;
        let (mut unit, mut parameter, mut format, mut resistance) = (false, false, false, false);
        let lowered = body.to_lowercase();
        let mut tokens = lowered.split_whitespace();
        while let Some(token) = tokens.next() {
            match OptionToken::classify(token).ok_or_else(illegal)? {
                OptionToken::Unit(val) if !unit => {
                    parsed.unit = val;
                    unit = true;
                }
                OptionToken::Parameter(val) if !parameter => {
                    parsed.parameter = val;
                    parameter = true;
                }
                OptionToken::Format(val) if !format => {
                    parsed.format = val;
                    format = true;
                }
                OptionToken::Resistance if !resistance => {
                    let val: f64 = tokens
                        .next()
                        .and_then(|t| t.parse().ok())
                        .ok_or_else(illegal)?;
                    if !(val.is_finite() && val > 0.0) {
                        return Err(illegal());
                    }
                    parsed.resistance = val;
                    resistance = true;
                }
                _ => return Err(illegal()),
            }
        }
        *self = parsed;
        Ok(())
    }
}

impl FromStr for Options {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut options = Options::default();
        options.parse(s)?;
        Ok(options)
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "# {} {} {} R {}",
            self.unit, self.parameter, self.format, self.resistance
        )
    }
}
