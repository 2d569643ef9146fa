use crate::consts::SEGMENT_POINTS;
use crate::error::ConfigError;
use crate::frequency::SweepRange;
use serde::{Deserialize, Serialize};

/// Frequencies read in one device batch
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Segment {
    frequencies: Vec<u64>,
}

impl Segment {
    pub fn new(frequencies: Vec<u64>) -> Result<Segment, ConfigError> {
        if frequencies.is_empty() {
            return Err(ConfigError::EmptyPlan);
        }
        if frequencies.len() > SEGMENT_POINTS {
            return Err(ConfigError::SegmentTooLarge {
                points: frequencies.len(),
                max: SEGMENT_POINTS,
            });
        }
        Ok(Segment { frequencies })
    }

    pub fn frequencies(&self) -> &[u64] {
        &self.frequencies
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn start(&self) -> u64 {
        self.frequencies[0]
    }

    pub fn stop(&self) -> u64 {
        self.frequencies[self.frequencies.len() - 1]
    }
}

/// Segments read in order. The last frequency of a segment is the first
/// of the next.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SweepPlan {
    segments: Vec<Segment>,
}

impl SweepPlan {
    pub fn new(segments: Vec<Segment>) -> Result<SweepPlan, ConfigError> {
        if segments.is_empty() {
            return Err(ConfigError::EmptyPlan);
        }
        Ok(SweepPlan { segments })
    }

    /// `segments` full segments evenly spaced over `range`
    pub fn linear(range: SweepRange, segments: usize) -> Result<SweepPlan, ConfigError> {
        if segments == 0 {
            return Err(ConfigError::EmptyPlan);
        }
        let intervals = (segments * (SEGMENT_POINTS - 1)) as u128;
        let span = range.span() as u128;
        let frequencies: Vec<u64> = (0..=intervals)
            .map(|i| range.start() + (span * i / intervals) as u64)
            .collect();
        SweepPlan::from_frequencies(&frequencies)
    }

    /// Chunk an explicit list into overlapping segments of at most
    /// [`SEGMENT_POINTS`]
    pub fn from_frequencies(frequencies: &[u64]) -> Result<SweepPlan, ConfigError> {
        if frequencies.is_empty() {
            return Err(ConfigError::EmptyPlan);
        }
        let mut segments = vec![];
        let mut first = 0;
        loop {
            let end = (first + SEGMENT_POINTS).min(frequencies.len());
            segments.push(Segment::new(frequencies[first..end].to_vec())?);
            if end == frequencies.len() {
                break;
            }
            first = end - 1;
        }
        SweepPlan::new(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start(&self) -> u64 {
        self.segments.iter().map(|s| s.start()).min().unwrap_or_default()
    }

    pub fn stop(&self) -> u64 {
        self.segments.iter().map(|s| s.stop()).max().unwrap_or_default()
    }
}
