use serde::{Deserialize, Serialize};
use simple_error::{bail, SimpleError};
use std::{fmt, str::FromStr};

/// Descriptor of SI scaling
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Scale {
    Yocto,
    Zepto,
    Atto,
    Femto,
    Pico,
    Nano,
    Micro,
    Milli,
    #[default]
    Base,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
    Zetta,
    Yotta,
}

impl Scale {
    /// Prefixes ordered from smallest to largest
    pub const ALL: [Scale; 17] = [
        Scale::Yocto,
        Scale::Zepto,
        Scale::Atto,
        Scale::Femto,
        Scale::Pico,
        Scale::Nano,
        Scale::Micro,
        Scale::Milli,
        Scale::Base,
        Scale::Kilo,
        Scale::Mega,
        Scale::Giga,
        Scale::Tera,
        Scale::Peta,
        Scale::Exa,
        Scale::Zetta,
        Scale::Yotta,
    ];

    /// Prefixes used when displaying frequencies
    pub const FREQUENCY_DISPLAY: [Scale; 4] = [Scale::Base, Scale::Kilo, Scale::Mega, Scale::Giga];

    pub fn to_str(&self) -> &str {
        match self {
            Scale::Yocto => "y",
            Scale::Zepto => "z",
            Scale::Atto => "a",
            Scale::Femto => "f",
            Scale::Pico => "p",
            Scale::Nano => "n",
            Scale::Micro => "µ",
            Scale::Milli => "m",
            Scale::Base => "",
            Scale::Kilo => "k",
            Scale::Mega => "M",
            Scale::Giga => "G",
            Scale::Tera => "T",
            Scale::Peta => "P",
            Scale::Exa => "E",
            Scale::Zetta => "Z",
            Scale::Yotta => "Y",
        }
    }

    /// Power of ten of the prefix
    /// Scale::Pico = -12
    pub fn exponent(&self) -> i32 {
        match self {
            Scale::Yocto => -24,
            Scale::Zepto => -21,
            Scale::Atto => -18,
            Scale::Femto => -15,
            Scale::Pico => -12,
            Scale::Nano => -9,
            Scale::Micro => -6,
            Scale::Milli => -3,
            Scale::Base => 0,
            Scale::Kilo => 3,
            Scale::Mega => 6,
            Scale::Giga => 9,
            Scale::Tera => 12,
            Scale::Peta => 15,
            Scale::Exa => 18,
            Scale::Zetta => 21,
            Scale::Yotta => 24,
        }
    }

    /// Provides multiplier for scale
    /// Scale::Pico = 1e-12
    pub fn multiplier(&self) -> f64 {
        10f64.powi(self.exponent())
    }

    pub fn scale(&self, val: f64) -> f64 {
        val / self.multiplier()
    }

    pub fn unscale(&self, val: f64) -> f64 {
        val * self.multiplier()
    }

    /// Strict, case-sensitive prefix lookup. `K` is accepted as kilo and
    /// both the micro sign and the greek mu as micro.
    pub fn from_symbol(symbol: &str) -> Option<Scale> {
        match symbol {
            "y" => Some(Scale::Yocto),
            "z" => Some(Scale::Zepto),
            "a" => Some(Scale::Atto),
            "f" => Some(Scale::Femto),
            "p" => Some(Scale::Pico),
            "n" => Some(Scale::Nano),
            "µ" | "μ" => Some(Scale::Micro),
            "m" => Some(Scale::Milli),
            "" => Some(Scale::Base),
            "k" | "K" => Some(Scale::Kilo),
            "M" => Some(Scale::Mega),
            "G" => Some(Scale::Giga),
            "T" => Some(Scale::Tera),
            "P" => Some(Scale::Peta),
            "E" => Some(Scale::Exa),
            "Z" => Some(Scale::Zetta),
            "Y" => Some(Scale::Yotta),
            _ => None,
        }
    }

    /// Largest prefix from `choices` whose multiplier does not exceed `val`.
    /// Falls back to the first choice.
    pub fn best_fit(val: f64, choices: &[Scale]) -> Scale {
        let mag = val.abs();
        let mut best = choices.first().copied().unwrap_or_default();
        for scale in choices {
            if mag >= scale.multiplier() {
                best = *scale;
            }
        }
        best
    }
}

impl FromStr for Scale {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(scale) = Scale::from_symbol(s) {
            return Ok(scale);
        }
        match s.to_lowercase().as_str() {
            "yocto" => Ok(Scale::Yocto),
            "zepto" => Ok(Scale::Zepto),
            "atto" => Ok(Scale::Atto),
            "femto" => Ok(Scale::Femto),
            "pico" => Ok(Scale::Pico),
            "nano" => Ok(Scale::Nano),
            "micro" | "u" => Ok(Scale::Micro),
            "milli" => Ok(Scale::Milli),
            "base" => Ok(Scale::Base),
            "kilo" => Ok(Scale::Kilo),
            "mega" => Ok(Scale::Mega),
            "giga" => Ok(Scale::Giga),
            "tera" => Ok(Scale::Tera),
            "peta" => Ok(Scale::Peta),
            "exa" => Ok(Scale::Exa),
            "zetta" => Ok(Scale::Zetta),
            "yotta" => Ok(Scale::Yotta),
            _ => bail!("string not a valid scale"),
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}
