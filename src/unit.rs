use crate::scale::Scale;
use serde::{Deserialize, Serialize};
use simple_error::{bail, SimpleError};
use std::fmt;
use std::str::FromStr;

/// Descriptor of unit
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub enum Unit {
    #[default]
    None, // No Unit
    Hz,      // Frequency in Hz
    Degree,  // Angle in degrees
    Second,  // Time in seconds
    Meter,   // Length in meters
    Farad,   // Capacitance in farads
    Henry,   // Inductance in henries
    Ohm,     // Resistance in ohms
    Siemens, // Conductance in siemens
    Decibel, // Logarithmic ratio
}

impl Unit {
    pub fn to_str(&self) -> &str {
        match self {
            Unit::None => "",
            Unit::Hz => "Hz",
            Unit::Degree => "°",
            Unit::Second => "s",
            Unit::Meter => "m",
            Unit::Farad => "F",
            Unit::Henry => "H",
            Unit::Ohm => "Ω",
            Unit::Siemens => "S",
            Unit::Decibel => "dB",
        }
    }

    /// Logarithmic and angular units are never given an SI prefix
    pub fn takes_prefix(&self) -> bool {
        !matches!(self, Unit::Degree | Unit::Decibel)
    }
}

impl FromStr for Unit {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Unit::None),
            "HZ" | "Hz" | "hz" => Ok(Unit::Hz),
            "Degree" | "degree" | "deg" | "°" => Ok(Unit::Degree),
            "Second" | "second" | "sec" | "s" => Ok(Unit::Second),
            "Meter" | "meter" | "m" => Ok(Unit::Meter),
            "Farad" | "farad" | "F" => Ok(Unit::Farad),
            "Henry" | "henry" | "H" => Ok(Unit::Henry),
            "Ohm" | "ohm" | "Ω" => Ok(Unit::Ohm),
            "Siemens" | "siemens" | "S" => Ok(Unit::Siemens),
            "Decibel" | "decibel" | "dB" | "db" => Ok(Unit::Decibel),
            _ => bail!("string not a valid unit"),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Encapsulation of a value with a unit, displayed with the best fitting SI
/// prefix and a fixed number of significant digits. Value is stored unscaled.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct UnitVal {
    val: f64,
    unit: Unit,
    digits: usize,
}

impl UnitVal {
    pub fn new(val: f64, unit: Unit) -> Self {
        UnitVal {
            val,
            unit,
            digits: 5,
        }
    }

    pub fn val(&self) -> f64 {
        self.val
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn digits(&self) -> usize {
        self.digits
    }

    /// Prefix chosen for display
    pub fn scale(&self) -> Scale {
        if !self.unit.takes_prefix() || self.val == 0.0 || !self.val.is_finite() {
            return Scale::Base;
        }
        Scale::best_fit(self.val, &Scale::ALL)
    }

    fn render(&self, scale: Scale) -> String {
        let mantissa = scale.scale(self.val);
        let int_digits = if mantissa.abs() < 1.0 {
            1
        } else {
            mantissa.abs().log10().floor() as usize + 1
        };
        let decimals = self.digits.saturating_sub(int_digits);
        format!("{:.*}", decimals, mantissa)
    }
}

impl fmt::Display for UnitVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.val.is_finite() {
            return write!(f, "{} {}", self.val, self.unit);
        }
        let mut scale = self.scale();
        let mut text = self.render(scale);
        // rounding may carry into the next prefix, e.g. 999.996 -> 1000.0
        if self.unit.takes_prefix() && text.trim_start_matches('-').starts_with("1000") {
            if let Some(next) = Scale::ALL.iter().find(|s| s.exponent() == scale.exponent() + 3) {
                scale = *next;
                text = self.render(scale);
            }
        }
        write!(f, "{} {}{}", text, scale, self.unit)
    }
}

/// Builder for [`UnitVal`]
#[derive(Clone, Copy, Debug, Default)]
pub struct UnitValBuilder {
    val: f64,
    unit: Unit,
    digits: Option<usize>,
}

impl UnitValBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn val(mut self, val: f64) -> Self {
        self.val = val;
        self
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn digits(mut self, digits: usize) -> Self {
        self.digits = Some(digits.max(1));
        self
    }

    pub fn build(self) -> UnitVal {
        UnitVal {
            val: self.val,
            unit: self.unit,
            digits: self.digits.unwrap_or(5),
        }
    }
}
