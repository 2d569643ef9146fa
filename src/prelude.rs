//! vnakit prelude.
//!
//! This module contains the most used types and functions that you can
//! import easily as a group.
//!
//! ```
//! use vnakit::prelude::*;
//!
//! let hz = parse_frequency("2.4GHz").unwrap();
//! assert_eq!(format_frequency(hz), "2.4000GHz");
//! ```

#[doc(no_inline)]
pub use crate::calibration::{
    derive_model, CalibrationMethod, CalibrationRole, CalibrationSet, CalibrationStandard,
    CorrectionModel, StandardModels, StandardModelsBuilder,
};

#[doc(no_inline)]
pub use crate::datapoint::Datapoint;

#[doc(no_inline)]
pub use crate::derived::{ReturnLoss, SweepSummary, Vswr};

#[doc(no_inline)]
pub use crate::error::{
    CalibrationError, ConfigError, DeviceError, FormatError, ParseError, SweepError, TdrError,
};

#[doc(no_inline)]
pub use crate::frequency::{
    format_frequency, format_short, parse as parse_frequency, BandPadding, SweepRange,
};

#[doc(no_inline)]
pub use crate::parameter::RFParameter;

#[doc(no_inline)]
pub use crate::scale::Scale;

#[doc(no_inline)]
pub use crate::sweep::{
    Averaging, CancellationToken, Device, Reading, SimulatedDevice, SweepDataset, SweepEvent,
    SweepMode, SweepPlan, SweepSettings, SweepSettingsBuilder, SweepState, SweepWorker,
};

#[doc(no_inline)]
pub use crate::tdr::{TdrResult, TdrSettings};

#[doc(no_inline)]
pub use crate::touchstone::{DataFormat, FrequencyUnit, Options, Touchstone, WriteMode};

#[doc(no_inline)]
pub use crate::unit::{Unit, UnitVal, UnitValBuilder};
