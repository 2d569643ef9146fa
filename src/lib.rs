//! Core of a vector network analyzer front end: frequency text, touchstone
//! files, calibration, derived quantities and background sweeping.
pub mod calibration;
pub mod consts;
pub mod datapoint;
pub mod derived;
pub mod error;
pub mod frequency;
pub mod math;
pub mod parameter;
pub mod prelude;
pub mod scale;
pub mod sweep;
pub mod tdr;
pub mod touchstone;
pub mod unit;

#[cfg(test)]
pub mod util;
