use crate::error::DeviceError;
use num::complex::Complex64;
use std::collections::VecDeque;
use std::fmt;
use std::thread;
use std::time::Duration;

/// One raw sample read from the analyzer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    pub frequency: u64,
    pub s11: Complex64,
    /// `None` on single port hardware
    pub s21: Option<Complex64>,
}

/// Adapter to a vector network analyzer.
///
/// Timeouts are reported as [`DeviceError::Transient`]. A fatal error means
/// the connection is gone.
pub trait Device: Send {
    fn open(&mut self) -> Result<(), DeviceError>;

    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Frequencies the analyzer is currently set to sweep
    fn read_frequencies(&mut self) -> Result<Vec<u64>, DeviceError>;

    fn read_point(&mut self, frequency: u64) -> Result<Reading, DeviceError>;

    /// Read one batch, in the order given
    fn read_segment(&mut self, frequencies: &[u64]) -> Result<Vec<Reading>, DeviceError> {
        frequencies.iter().map(|&f| self.read_point(f)).collect()
    }
}

type Response = Box<dyn Fn(u64) -> (Complex64, Option<Complex64>) + Send>;

/// Device answering from a response function, with optional read latency
/// and queued faults
pub struct SimulatedDevice {
    open: bool,
    frequencies: Vec<u64>,
    response: Response,
    read_delay: Duration,
    faults: VecDeque<DeviceError>,
    reads: usize,
}

impl SimulatedDevice {
    pub fn new<F>(response: F) -> Self
    where
        F: Fn(u64) -> (Complex64, Option<Complex64>) + Send + 'static,
    {
        SimulatedDevice {
            open: false,
            frequencies: vec![],
            response: Box::new(response),
            read_delay: Duration::ZERO,
            faults: VecDeque::new(),
            reads: 0,
        }
    }

    /// Sleep this long on every segment read
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn with_frequencies(mut self, frequencies: Vec<u64>) -> Self {
        self.frequencies = frequencies;
        self
    }

    /// Fail the next segment read with `fault`. Faults are used in order.
    pub fn push_fault(&mut self, fault: DeviceError) {
        self.faults.push_back(fault);
    }

    /// Segment reads attempted so far, failed ones included
    pub fn reads(&self) -> usize {
        self.reads
    }

    fn check_open(&self) -> Result<(), DeviceError> {
        if self.open {
            Ok(())
        } else {
            Err(DeviceError::Fatal("device not open".to_string()))
        }
    }
}

impl fmt::Debug for SimulatedDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedDevice")
            .field("open", &self.open)
            .field("read_delay", &self.read_delay)
            .field("faults", &self.faults)
            .field("reads", &self.reads)
            .finish()
    }
}

impl Device for SimulatedDevice {
    fn open(&mut self) -> Result<(), DeviceError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn read_frequencies(&mut self) -> Result<Vec<u64>, DeviceError> {
        self.check_open()?;
        Ok(self.frequencies.clone())
    }

    fn read_point(&mut self, frequency: u64) -> Result<Reading, DeviceError> {
        self.check_open()?;
        let (s11, s21) = (self.response)(frequency);
        Ok(Reading {
            frequency,
            s11,
            s21,
        })
    }

    fn read_segment(&mut self, frequencies: &[u64]) -> Result<Vec<Reading>, DeviceError> {
        self.check_open()?;
        self.reads += 1;
        if !self.read_delay.is_zero() {
            thread::sleep(self.read_delay);
        }
        if let Some(fault) = self.faults.pop_front() {
            return Err(fault);
        }
        frequencies.iter().map(|&f| self.read_point(f)).collect()
    }
}
