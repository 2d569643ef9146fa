use core::fmt;
use serde::{Deserialize, Serialize};
use simple_error::{bail, SimpleError};
use std::str::FromStr;

/// Network parameter carried by a touchstone file
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize, Eq, Hash)]
pub enum RFParameter {
    G,
    H,
    #[default]
    S,
    Y,
    Z,
}

impl RFParameter {
    pub fn to_str(&self) -> &str {
        match self {
            RFParameter::G => "G",
            RFParameter::H => "H",
            RFParameter::S => "S",
            RFParameter::Y => "Y",
            RFParameter::Z => "Z",
        }
    }
}

impl FromStr for RFParameter {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "g" => Ok(RFParameter::G),
            "h" => Ok(RFParameter::H),
            "s" => Ok(RFParameter::S),
            "y" => Ok(RFParameter::Y),
            "z" => Ok(RFParameter::Z),
            _ => bail!("string not a valid option line parameter"),
        }
    }
}

impl fmt::Display for RFParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}
