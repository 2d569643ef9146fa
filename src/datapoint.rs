use crate::derived::{self, ReturnLoss, Vswr};
use num::complex::{c64, Complex64};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One complex S-parameter sample at a frequency in Hz
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Datapoint {
    pub frequency: u64,
    pub re: f64,
    pub im: f64,
}

impl Datapoint {
    pub fn new(frequency: u64, re: f64, im: f64) -> Self {
        Datapoint { frequency, re, im }
    }

    pub fn from_complex(frequency: u64, z: Complex64) -> Self {
        Datapoint {
            frequency,
            re: z.re,
            im: z.im,
        }
    }

    pub fn z(&self) -> Complex64 {
        c64(self.re, self.im)
    }

    pub fn magnitude(&self) -> f64 {
        self.z().norm()
    }

    /// Phase in radians, (-pi, pi]
    pub fn phase(&self) -> f64 {
        self.z().arg()
    }

    pub fn phase_degrees(&self) -> f64 {
        self.phase().to_degrees()
    }

    pub fn gain_db(&self) -> Option<f64> {
        derived::gain_db(self.z())
    }

    pub fn vswr(&self) -> Vswr {
        derived::vswr(self.z())
    }

    pub fn return_loss_db(&self) -> ReturnLoss {
        derived::return_loss_db(self.vswr())
    }

    pub fn impedance(&self, z0: f64) -> Option<Complex64> {
        derived::impedance(self.z(), z0)
    }

    pub fn q_factor(&self, z0: f64) -> Option<f64> {
        self.impedance(z0).and_then(derived::q_factor)
    }

    /// Angular frequency in rad/s
    pub fn omega(&self) -> f64 {
        std::f64::consts::TAU * self.frequency as f64
    }
}

impl fmt::Display for Datapoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.frequency, self.re, self.im)
    }
}
