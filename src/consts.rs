//! Physical constants and fixed sizes shared across the crate.

/// Speed of light in vacuum, m/s
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Reference impedance assumed when none is given, ohms
pub const DEFAULT_REFERENCE_IMPEDANCE: f64 = 50.0;

/// Number of points the device returns in one batch read
pub const SEGMENT_POINTS: usize = 101;

/// Length of the zero padded inverse transform used for TDR
pub const TDR_FFT_POINTS: usize = 1 << 14;

/// Fewest S11 points a TDR estimate accepts
pub const TDR_MIN_POINTS: usize = 2;

/// Significant digits shown when formatting a frequency
pub const FREQUENCY_DIGITS: usize = 5;

/// Significant digits shown by the short frequency format
pub const FREQUENCY_SHORT_DIGITS: usize = 4;

/// Retries of a segment after a transient device error
pub const DEFAULT_MAX_RETRIES: u32 = 3;

pub const NEAR_ZERO: f64 = 1e-12;
