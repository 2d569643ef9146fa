//! Time domain reflectometry from a swept S11 measurement.

use crate::consts::{DEFAULT_REFERENCE_IMPEDANCE, SPEED_OF_LIGHT, TDR_FFT_POINTS, TDR_MIN_POINTS};
use crate::datapoint::Datapoint;
use crate::error::TdrError;
use crate::math::{blackman, linspace};
use ndarray::Array1;
use num::complex::Complex64;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct TdrSettings {
    /// Velocity of propagation as a fraction of c
    pub velocity_factor: f64,
    pub reference_impedance: f64,
}

impl Default for TdrSettings {
    fn default() -> Self {
        Self {
            velocity_factor: 0.66,
            reference_impedance: DEFAULT_REFERENCE_IMPEDANCE,
        }
    }
}

impl TdrSettings {
    pub fn with_velocity_factor(mut self, velocity_factor: f64) -> Self {
        self.velocity_factor = velocity_factor;
        self
    }

    pub fn with_reference_impedance(mut self, reference_impedance: f64) -> Self {
        self.reference_impedance = reference_impedance;
        self
    }
}

#[derive(Clone, Debug)]
pub struct TdrResult {
    /// |h(t)| of the windowed reflection
    pub impulse: Array1<f64>,
    pub step_response: Array1<f64>,
    /// `None` where the step response reaches 1
    pub step_impedance: Vec<Option<f64>>,
    /// Seconds
    pub time: Array1<f64>,
    /// Meters of round trip travel
    pub distance: Array1<f64>,
    pub peak_index: usize,
    /// Estimated one way length to the strongest reflection, meters
    pub cable_length: f64,
}

/// Estimate the distance to the strongest reflection in `s11`.
///
/// The points must be evenly spaced in frequency. At least
/// [`TDR_MIN_POINTS`] are required, and many more for useful resolution.
pub fn estimate(s11: &[Datapoint], settings: &TdrSettings) -> Result<TdrResult, TdrError> {
    let vf = settings.velocity_factor;
    if !(vf > 0.0 && vf <= 1.0) {
        return Err(TdrError::InvalidVelocityFactor(vf));
    }
    let insufficient = TdrError::InsufficientData {
        points: s11.len(),
        required: TDR_MIN_POINTS,
    };
    if s11.len() < TDR_MIN_POINTS {
        return Err(insufficient);
    }
    let step = s11[1].frequency as f64 - s11[0].frequency as f64;
    if step <= 0.0 {
        return Err(insufficient);
    }

    let n = TDR_FFT_POINTS.max(s11.len().next_power_of_two());
    let window = blackman(s11.len());
    let mut buffer: Vec<Complex64> = vec![Complex64::ZERO; n];
    for (i, (p, w)) in s11.iter().zip(window.iter()).enumerate() {
        buffer[i] = p.z() * *w;
    }
    let mut planner = FftPlanner::<f64>::new();
    let ifft = planner.plan_fft_inverse(n);
    ifft.process(&mut buffer);

    let scale = 1.0 / n as f64;
    let impulse = Array1::from_iter(buffer.iter().map(|c| c.norm() * scale));
    let mut acc = 0.0;
    let step_response = impulse.mapv(|v| {
        acc += v;
        acc
    });
    let z0 = settings.reference_impedance;
    let step_impedance = step_response
        .iter()
        .map(|&s| {
            if s == 1.0 {
                None
            } else {
                Some(z0 * (1.0 + s) / (1.0 - s))
            }
        })
        .collect();

    let time = linspace(0.0, 1.0 / step, n);
    let distance = time.mapv(|t| t * vf * SPEED_OF_LIGHT);

    let peak_index = impulse
        .iter()
        .enumerate()
        .fold((0, f64::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0;
    let cable_length = distance[peak_index] / 2.0;
    debug!(points = s11.len(), fft = n, peak_index, cable_length, "tdr estimate");

    Ok(TdrResult {
        impulse,
        step_response,
        step_impedance,
        time,
        distance,
        peak_index,
        cable_length,
    })
}
