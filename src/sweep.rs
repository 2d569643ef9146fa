//! Background sweep acquisition.
//!
//! A [`SweepWorker`] drives a [`Device`] through a [`SweepPlan`] on its own
//! thread, publishes each finished dataset to a [`DatasetSlot`] and reports
//! progress as [`SweepEvent`]s.

mod averaging;
mod device;
mod plan;
mod settings;
mod slot;
mod worker;

pub use self::averaging::Averaging;
pub use self::device::{Device, Reading, SimulatedDevice};
pub use self::plan::{Segment, SweepPlan};
pub use self::settings::{SweepMode, SweepSettings, SweepSettingsBuilder};
pub use self::slot::DatasetSlot;
pub use self::worker::SweepWorker;

use crate::datapoint::Datapoint;
use crate::touchstone::{Options, Touchstone};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::{fmt, str::FromStr};
use simple_error::{bail, SimpleError};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SweepState {
    #[default]
    Idle,
    Running,
    Completed,
    Stopped,
    /// The device is still connected, a new sweep may start
    FailedRecoverable,
    /// The device was closed, call `reconnect` first
    FailedFatal,
}

impl SweepState {
    pub fn to_str(&self) -> &str {
        match self {
            SweepState::Idle => "idle",
            SweepState::Running => "running",
            SweepState::Completed => "completed",
            SweepState::Stopped => "stopped",
            SweepState::FailedRecoverable => "failed (recoverable)",
            SweepState::FailedFatal => "failed (fatal)",
        }
    }

    pub fn can_start(&self) -> bool {
        matches!(
            self,
            SweepState::Idle
                | SweepState::Completed
                | SweepState::Stopped
                | SweepState::FailedRecoverable
        )
    }
}

impl FromStr for SweepState {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(SweepState::Idle),
            "running" => Ok(SweepState::Running),
            "completed" => Ok(SweepState::Completed),
            "stopped" => Ok(SweepState::Stopped),
            "failed (recoverable)" => Ok(SweepState::FailedRecoverable),
            "failed (fatal)" => Ok(SweepState::FailedFatal),
            _ => bail!("string not a valid sweep state"),
        }
    }
}

impl fmt::Display for SweepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Notifications sent from the sweep thread
#[derive(Clone, Debug, PartialEq)]
pub enum SweepEvent {
    /// `sweep` counts the sweeps run by this worker, starting at 1
    Started { sweep: u64 },
    /// `segment` segments of `segments` are done
    Progress { segment: usize, segments: usize },
    /// `complete` is false for the partial dataset of a stopped sweep
    Published { version: u64, complete: bool },
    Completed,
    Stopped,
    Failed { recoverable: bool, message: String },
    /// The reference trace was set or, when `set` is false, cleared
    ReferenceChanged { version: u64, set: bool },
}

/// Cooperative stop flag shared with the sweep thread
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Reflection and transmission of one sweep. Both sequences always have the
/// same length and frequencies. `source` names where the data came from,
/// a sweep label or a file name.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SweepDataset {
    s11: Vec<Datapoint>,
    s21: Vec<Datapoint>,
    #[serde(default)]
    source: String,
}

impl SweepDataset {
    /// Transmission points missing from `s21` are stored as zero at the
    /// reflection frequencies
    pub fn new(s11: Vec<Datapoint>, s21: Vec<Datapoint>) -> Self {
        let s21 = s11
            .iter()
            .enumerate()
            .map(|(i, p)| match s21.get(i) {
                Some(t) => Datapoint::new(p.frequency, t.re, t.im),
                None => Datapoint::new(p.frequency, 0.0, 0.0),
            })
            .collect();
        SweepDataset {
            s11,
            s21,
            source: String::new(),
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// `"<source> @ <n> points"`, empty without a source
    pub fn label(&self) -> String {
        if self.source.is_empty() {
            String::new()
        } else {
            format!("{} @ {} points", self.source, self.len())
        }
    }

    /// Join per segment `(s11, s21)` points in plan order. The final point
    /// of every segment but the last is dropped, then repeated frequencies
    /// keep their first occurrence.
    pub fn stitch(segments: &[Vec<(Datapoint, Datapoint)>]) -> Self {
        let mut seen: HashSet<u64> = HashSet::new();
        let mut dataset = SweepDataset::default();
        let last = segments.len().saturating_sub(1);
        for (idx, segment) in segments.iter().enumerate() {
            let keep = if idx == last {
                segment.len()
            } else {
                segment.len().saturating_sub(1)
            };
            for (s11, s21) in &segment[..keep] {
                if seen.insert(s11.frequency) {
                    dataset.s11.push(*s11);
                    dataset.s21.push(*s21);
                }
            }
        }
        dataset
    }

    /// The file name becomes the source
    pub fn from_touchstone(ts: &Touchstone) -> Self {
        SweepDataset::new(ts.s11().to_vec(), ts.s21().to_vec()).with_source(ts.filename())
    }

    /// One port file when no transmission was measured, two port otherwise
    pub fn to_touchstone(&self, resistance: f64) -> Touchstone {
        let mut ts = Touchstone::default();
        ts.set_options(Options::normalized(resistance));
        let s21 = if self.has_transmission() {
            self.s21.clone()
        } else {
            vec![]
        };
        ts.set_data(self.s11.clone(), s21);
        ts
    }

    pub fn s11(&self) -> &[Datapoint] {
        &self.s11
    }

    pub fn s21(&self) -> &[Datapoint] {
        &self.s21
    }

    pub fn len(&self) -> usize {
        self.s11.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s11.is_empty()
    }

    pub fn frequencies(&self) -> Vec<u64> {
        self.s11.iter().map(|p| p.frequency).collect()
    }

    pub fn has_transmission(&self) -> bool {
        self.s21.iter().any(|p| p.re != 0.0 || p.im != 0.0)
    }
}
