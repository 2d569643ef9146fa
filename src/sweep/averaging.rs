use crate::error::ConfigError;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use num::complex::Complex64;
use serde::{Deserialize, Serialize};

/// Read each segment `count` times and average, after discarding the
/// `truncate` readings farthest from the mean at each frequency
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Averaging {
    pub count: usize,
    pub truncate: usize,
}

impl Default for Averaging {
    fn default() -> Self {
        Averaging::none()
    }
}

impl Averaging {
    pub fn new(count: usize, truncate: usize) -> Result<Averaging, ConfigError> {
        let averaging = Averaging { count, truncate };
        averaging.validate()?;
        Ok(averaging)
    }

    pub fn none() -> Self {
        Averaging {
            count: 1,
            truncate: 0,
        }
    }

    pub fn presets() -> [Averaging; 5] {
        [
            Averaging::none(),
            Averaging {
                count: 3,
                truncate: 0,
            },
            Averaging {
                count: 5,
                truncate: 2,
            },
            Averaging {
                count: 9,
                truncate: 4,
            },
            Averaging {
                count: 25,
                truncate: 6,
            },
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 || self.truncate >= self.count {
            return Err(ConfigError::InvalidAveragingParameters {
                count: self.count,
                truncate: self.truncate,
            });
        }
        Ok(())
    }

    /// Truncated mean of one frequency's readings
    pub fn truncated_mean(&self, samples: ArrayView1<Complex64>) -> Complex64 {
        let n = samples.len();
        if n == 0 {
            return Complex64::ZERO;
        }
        let mean = samples.sum() / n as f64;
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            let da = (samples[a] - mean).norm();
            let db = (samples[b] - mean).norm();
            da.total_cmp(&db)
        });
        let keep = n - self.truncate.min(n - 1);
        let sum: Complex64 = order[..keep].iter().map(|&i| samples[i]).sum();
        sum / keep as f64
    }

    /// Reduce readings laid out as replicates x frequencies to one value
    /// per frequency
    pub fn reduce(&self, samples: &Array2<Complex64>) -> Array1<Complex64> {
        samples
            .axis_iter(Axis(1))
            .map(|column| self.truncated_mean(column))
            .collect()
    }
}
