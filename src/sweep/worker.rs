use crate::calibration::CorrectionModel;
use crate::datapoint::Datapoint;
use crate::error::{CalibrationError, DeviceError, SweepError};
use crate::touchstone::Touchstone;
use crate::sweep::{
    CancellationToken, DatasetSlot, Device, Reading, Segment, SweepDataset, SweepEvent, SweepMode,
    SweepPlan, SweepSettings, SweepState,
};
use crossbeam_channel::{Receiver, Sender};
use ndarray::Array2;
use num::complex::Complex64;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Runs sweeps of a device on a background thread named `vna-sweep`.
///
/// The device is locked by the thread for the whole run. Results are
/// published to the dataset slot and progress is sent as events.
pub struct SweepWorker<D: Device + 'static> {
    device: Arc<Mutex<D>>,
    state: Arc<Mutex<SweepState>>,
    slot: Arc<DatasetSlot>,
    reference: DatasetSlot,
    settings: SweepSettings,
    calibration: Option<Arc<CorrectionModel>>,
    token: CancellationToken,
    sweeps: Arc<AtomicU64>,
    events_tx: Sender<SweepEvent>,
    events_rx: Receiver<SweepEvent>,
    thread: Option<JoinHandle<()>>,
}

impl<D: Device + 'static> SweepWorker<D> {
    pub fn new(device: D, settings: SweepSettings) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        SweepWorker {
            device: Arc::new(Mutex::new(device)),
            state: Arc::new(Mutex::new(SweepState::Idle)),
            slot: Arc::new(DatasetSlot::new()),
            reference: DatasetSlot::new(),
            settings,
            calibration: None,
            token: CancellationToken::new(),
            sweeps: Arc::new(AtomicU64::new(0)),
            events_tx,
            events_rx,
            thread: None,
        }
    }

    pub fn settings(&self) -> &SweepSettings {
        &self.settings
    }

    /// Used from the next `start`
    pub fn set_settings(&mut self, settings: SweepSettings) -> Result<(), SweepError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Used from the next `start`
    pub fn set_calibration(&mut self, calibration: Option<Arc<CorrectionModel>>) {
        self.calibration = calibration;
    }

    pub fn calibration(&self) -> Option<&Arc<CorrectionModel>> {
        self.calibration.as_ref()
    }

    pub fn state(&self) -> SweepState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn dataset(&self) -> Arc<SweepDataset> {
        self.slot.snapshot()
    }

    pub fn version(&self) -> u64 {
        self.slot.version()
    }

    pub fn slot(&self) -> Arc<DatasetSlot> {
        Arc::clone(&self.slot)
    }

    /// Publish a dataset that did not come from a sweep, such as a loaded file
    pub fn publish(&self, dataset: SweepDataset) -> u64 {
        let version = self.slot.publish(dataset);
        let _ = self.events_tx.send(SweepEvent::Published {
            version,
            complete: true,
        });
        version
    }

    pub fn reset_dataset(&self) -> u64 {
        self.slot.reset()
    }

    /// Reference trace, empty when none is set
    pub fn reference(&self) -> Arc<SweepDataset> {
        self.reference.snapshot()
    }

    pub fn has_reference(&self) -> bool {
        !self.reference.snapshot().is_empty()
    }

    /// Keep `dataset`, such as a loaded file, as the reference trace
    pub fn set_reference(&self, dataset: SweepDataset) -> u64 {
        info!(source = dataset.source(), points = dataset.len(), "reference set");
        let version = self.reference.publish(dataset);
        let _ = self
            .events_tx
            .send(SweepEvent::ReferenceChanged { version, set: true });
        version
    }

    /// Keep the current dataset, with its source, as the reference trace
    pub fn set_reference_from_current(&self) -> u64 {
        self.set_reference(SweepDataset::clone(&self.dataset()))
    }

    pub fn reset_reference(&self) -> u64 {
        let version = self.reference.reset();
        info!("reference cleared");
        let _ = self
            .events_tx
            .send(SweepEvent::ReferenceChanged { version, set: false });
        version
    }

    /// Current dataset as a touchstone file at the configured reference
    /// impedance
    pub fn touchstone(&self) -> Touchstone {
        self.dataset().to_touchstone(self.settings.reference_impedance)
    }

    pub fn start(&mut self, plan: SweepPlan) -> Result<(), SweepError> {
        let state = self.state();
        if self.is_running() || !state.can_start() {
            return Err(SweepError::InvalidState(state));
        }
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        self.settings.validate()?;
        if let Some(model) = &self.calibration {
            for frequency in [plan.start(), plan.stop()] {
                if !model.covers(frequency, frequency) {
                    return Err(CalibrationError::FrequencyOutOfCalibrationRange {
                        frequency,
                        min: model.min_frequency(),
                        max: model.max_frequency(),
                    }
                    .into());
                }
            }
        }
        let opened = {
            let mut device = self.device.lock();
            if device.is_open() {
                false
            } else {
                device.open()?;
                true
            }
        };

        self.token.reset();
        *self.state.lock() = SweepState::Running;
        info!(
            segments = plan.len(),
            start = plan.start(),
            stop = plan.stop(),
            mode = %self.settings.mode,
            calibrated = self.calibration.is_some(),
            "sweep started"
        );
        let run = SweepRun {
            device: Arc::clone(&self.device),
            state: Arc::clone(&self.state),
            slot: Arc::clone(&self.slot),
            settings: self.settings.clone(),
            calibration: self.calibration.clone(),
            token: self.token.clone(),
            sweeps: Arc::clone(&self.sweeps),
            events: self.events_tx.clone(),
            plan,
            settle: opened,
        };
        match thread::Builder::new()
            .name("vna-sweep".to_string())
            .spawn(move || run.run())
        {
            Ok(handle) => {
                self.thread = Some(handle);
                Ok(())
            }
            Err(err) => {
                *self.state.lock() = state;
                Err(SweepError::Spawn(err.to_string()))
            }
        }
    }

    /// Ask the running sweep to stop after its current segment
    pub fn stop(&self) {
        if self.is_running() {
            info!("sweep stop requested");
        }
        self.token.cancel();
    }

    /// Block until the sweep thread exits. In continuous mode that is
    /// only after `stop`.
    pub fn wait(&mut self) -> SweepState {
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                error!("sweep thread panicked");
                *self.state.lock() = SweepState::FailedFatal;
            }
        }
        self.state()
    }

    /// Reopen the device after a fatal failure and return to idle
    pub fn reconnect(&mut self) -> Result<(), SweepError> {
        let state = self.state();
        if self.is_running() || state == SweepState::Running {
            return Err(SweepError::InvalidState(state));
        }
        let mut device = self.device.lock();
        device.close();
        device.open()?;
        *self.state.lock() = SweepState::Idle;
        info!("device reconnected");
        Ok(())
    }

    pub fn try_event(&self) -> Option<SweepEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Block until the next event
    pub fn next_event(&self) -> Option<SweepEvent> {
        self.events_rx.recv().ok()
    }

    pub fn next_event_timeout(&self, timeout: Duration) -> Option<SweepEvent> {
        self.events_rx.recv_timeout(timeout).ok()
    }

    /// Stop any sweep and hand back the device
    pub fn into_device(mut self) -> Option<D> {
        self.stop();
        self.wait();
        let device = Arc::clone(&self.device);
        drop(self);
        Arc::try_unwrap(device).ok().map(Mutex::into_inner)
    }
}

impl<D: Device + 'static> Drop for SweepWorker<D> {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// How a single pass over the plan ended
enum Outcome {
    Completed(SweepDataset),
    Stopped(SweepDataset),
    Failed(DeviceError),
}

/// State moved into the sweep thread
struct SweepRun<D: Device> {
    device: Arc<Mutex<D>>,
    state: Arc<Mutex<SweepState>>,
    slot: Arc<DatasetSlot>,
    settings: SweepSettings,
    calibration: Option<Arc<CorrectionModel>>,
    token: CancellationToken,
    sweeps: Arc<AtomicU64>,
    events: Sender<SweepEvent>,
    plan: SweepPlan,
    settle: bool,
}

impl<D: Device> SweepRun<D> {
    fn run(self) {
        let mut device = self.device.lock();
        if self.settle && self.settings.settle_delay_ms > 0 {
            thread::sleep(Duration::from_millis(self.settings.settle_delay_ms));
        }
        loop {
            let sweep = self.sweeps.fetch_add(1, Ordering::AcqRel) + 1;
            self.emit(SweepEvent::Started { sweep });

            match self.sweep_once(&mut *device) {
                Outcome::Completed(dataset) => {
                    let points = dataset.len();
                    self.publish(dataset, true);
                    self.set_state(SweepState::Completed);
                    info!(sweep, points, "sweep completed");
                    self.emit(SweepEvent::Completed);
                    if self.settings.mode == SweepMode::Single {
                        break;
                    }
                    if self.token.is_cancelled() {
                        self.set_state(SweepState::Stopped);
                        info!(sweep, "continuous sweep stopped");
                        self.emit(SweepEvent::Stopped);
                        break;
                    }
                    self.set_state(SweepState::Running);
                }
                Outcome::Stopped(dataset) => {
                    let points = dataset.len();
                    self.publish(dataset, false);
                    self.set_state(SweepState::Stopped);
                    info!(sweep, points, "sweep stopped");
                    self.emit(SweepEvent::Stopped);
                    break;
                }
                Outcome::Failed(err) => {
                    let recoverable = !err.is_fatal();
                    if recoverable {
                        self.set_state(SweepState::FailedRecoverable);
                    } else {
                        device.close();
                        self.set_state(SweepState::FailedFatal);
                        error!(sweep, %err, "sweep failed, device closed");
                    }
                    self.emit(SweepEvent::Failed {
                        recoverable,
                        message: err.to_string(),
                    });
                    break;
                }
            }
        }
    }

    fn sweep_once(&self, device: &mut D) -> Outcome {
        let segments = self.plan.len();
        let mut done: Vec<Vec<(Datapoint, Datapoint)>> = Vec::with_capacity(segments);
        for (idx, segment) in self.plan.segments().iter().enumerate() {
            if self.token.is_cancelled() {
                return Outcome::Stopped(SweepDataset::stitch(&done));
            }
            let points = match self.read_averaged(device, segment) {
                Ok(points) => points,
                Err(err) => return Outcome::Failed(err),
            };
            debug!(
                segment = idx + 1,
                segments,
                start = segment.start(),
                stop = segment.stop(),
                "segment read"
            );
            done.push(points);
            self.emit(SweepEvent::Progress {
                segment: idx + 1,
                segments,
            });
        }
        Outcome::Completed(SweepDataset::stitch(&done))
    }

    /// Read a segment `count` times, reduce, then correct
    fn read_averaged(
        &self,
        device: &mut D,
        segment: &Segment,
    ) -> Result<Vec<(Datapoint, Datapoint)>, DeviceError> {
        let averaging = self.settings.averaging;
        let n = segment.len();
        let mut s11 = Array2::<Complex64>::zeros((averaging.count, n));
        let mut s21 = Array2::<Complex64>::zeros((averaging.count, n));
        let mut frequencies = segment.frequencies().to_vec();
        for row in 0..averaging.count {
            let readings = self.read_with_retry(device, segment)?;
            for (col, reading) in readings.iter().enumerate() {
                s11[[row, col]] = reading.s11;
                s21[[row, col]] = reading.s21.unwrap_or(Complex64::ZERO);
                if row == 0 {
                    frequencies[col] = reading.frequency;
                }
            }
        }
        let s11 = averaging.reduce(&s11);
        let s21 = averaging.reduce(&s21);

        frequencies
            .iter()
            .zip(s11.iter().zip(s21.iter()))
            .map(|(&f, (&z11, &z21))| {
                let raw = (Datapoint::from_complex(f, z11), Datapoint::from_complex(f, z21));
                match &self.calibration {
                    Some(model) => model
                        .apply_pair(&raw.0, &raw.1)
                        .map_err(|err| DeviceError::Transient(err.to_string())),
                    None => Ok(raw),
                }
            })
            .collect()
    }

    fn read_with_retry(&self, device: &mut D, segment: &Segment) -> Result<Vec<Reading>, DeviceError> {
        let max_retries = self.settings.max_retries;
        let mut attempt = 0;
        loop {
            let result = device.read_segment(segment.frequencies()).and_then(|readings| {
                if readings.len() == segment.len() {
                    Ok(readings)
                } else {
                    Err(DeviceError::Transient(format!(
                        "expected {} points, read {}",
                        segment.len(),
                        readings.len()
                    )))
                }
            });
            match result {
                Ok(readings) => return Ok(readings),
                Err(DeviceError::Transient(msg)) if attempt < max_retries => {
                    attempt += 1;
                    warn!(attempt, max_retries, %msg, "retrying segment");
                }
                Err(err) => {
                    if !err.is_fatal() {
                        warn!(max_retries, %err, "segment retries exhausted");
                    }
                    return Err(err);
                }
            }
        }
    }

    fn publish(&self, dataset: SweepDataset, complete: bool) {
        let dataset = dataset.with_source(&self.settings.source_label());
        let version = self.slot.publish(dataset);
        self.emit(SweepEvent::Published { version, complete });
    }

    fn set_state(&self, state: SweepState) {
        *self.state.lock() = state;
    }

    fn emit(&self, event: SweepEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::calibration::{CalibrationMethod, CalibrationRole, CalibrationSet, CalibrationStandard, StandardModels};
    use crate::consts::SEGMENT_POINTS;
    use crate::frequency::SweepRange;
    use crate::sweep::{Averaging, SimulatedDevice, SweepSettingsBuilder};
    use crate::touchstone::WriteMode;
    use num::complex::c64;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn device() -> SimulatedDevice {
        SimulatedDevice::new(|f| (c64(0.5, f as f64 * 1e-9), Some(c64(0.25, 0.0))))
    }

    fn plan(segments: usize) -> SweepPlan {
        let range = SweepRange::from_start_stop(1_000_000, 1_000_000 + segments as u64 * 1_000_000).unwrap();
        SweepPlan::linear(range, segments).unwrap()
    }

    fn drain(worker: &SweepWorker<SimulatedDevice>) -> Vec<SweepEvent> {
        let mut events = vec![];
        while let Some(event) = worker.try_event() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_single_sweep() {
        let mut worker = SweepWorker::new(device(), SweepSettings::default());
        assert_eq!(worker.state(), SweepState::Idle);
        worker.start(plan(3)).unwrap();
        assert_eq!(worker.wait(), SweepState::Completed);

        let dataset = worker.dataset();
        assert_eq!(dataset.len(), 3 * (SEGMENT_POINTS - 1) + 1);
        assert_eq!(dataset.s21().len(), dataset.len());
        assert_eq!(worker.version(), 1);
        for pair in dataset.frequencies().windows(2) {
            assert!(pair[1] > pair[0]);
        }

        let events = drain(&worker);
        assert_eq!(events[0], SweepEvent::Started { sweep: 1 });
        assert!(events.contains(&SweepEvent::Progress {
            segment: 3,
            segments: 3
        }));
        assert!(events.contains(&SweepEvent::Published {
            version: 1,
            complete: true
        }));
        assert_eq!(events.last(), Some(&SweepEvent::Completed));

        worker.start(plan(1)).unwrap();
        assert_eq!(worker.wait(), SweepState::Completed);
        assert_eq!(worker.version(), 2);
    }

    #[test]
    fn test_transient_retry() {
        let mut sim = device();
        sim.push_fault(DeviceError::Transient("timeout".to_string()));
        sim.push_fault(DeviceError::Transient("timeout".to_string()));
        let mut worker = SweepWorker::new(sim, SweepSettings::default());
        worker.start(plan(2)).unwrap();
        assert_eq!(worker.wait(), SweepState::Completed);
        let device = worker.into_device().unwrap();
        assert_eq!(device.reads(), 4);
    }

    #[test]
    fn test_retries_exhausted() {
        let mut sim = device();
        for _ in 0..3 {
            sim.push_fault(DeviceError::Transient("timeout".to_string()));
        }
        let settings = SweepSettingsBuilder::new().max_retries(2).build();
        let mut worker = SweepWorker::new(sim, settings);
        worker.start(plan(2)).unwrap();
        assert_eq!(worker.wait(), SweepState::FailedRecoverable);
        assert_eq!(worker.version(), 0);
        let events = drain(&worker);
        assert!(matches!(
            events.last(),
            Some(SweepEvent::Failed {
                recoverable: true,
                ..
            })
        ));

        // the device is still open, a new sweep may start
        worker.start(plan(1)).unwrap();
        assert_eq!(worker.wait(), SweepState::Completed);
    }

    #[test]
    fn test_fatal_error() {
        let mut sim = device();
        sim.push_fault(DeviceError::Fatal("unplugged".to_string()));
        let mut worker = SweepWorker::new(sim, SweepSettings::default());
        worker.start(plan(2)).unwrap();
        assert_eq!(worker.wait(), SweepState::FailedFatal);
        assert!(!worker.device.lock().is_open());
        assert_eq!(
            worker.start(plan(1)),
            Err(SweepError::InvalidState(SweepState::FailedFatal))
        );

        worker.reconnect().unwrap();
        assert!(worker.device.lock().is_open());
        assert_eq!(worker.state(), SweepState::Idle);
        worker.start(plan(1)).unwrap();
        assert_eq!(worker.wait(), SweepState::Completed);
    }

    #[test]
    fn test_fatal_error_closes_device() {
        let mut sim = device();
        sim.push_fault(DeviceError::Fatal("unplugged".to_string()));
        let mut worker = SweepWorker::new(sim, SweepSettings::default());
        worker.start(plan(1)).unwrap();
        assert_eq!(worker.wait(), SweepState::FailedFatal);
        let device = worker.into_device().unwrap();
        assert!(!device.is_open());
        assert_eq!(device.reads(), 1);
    }

    #[test]
    fn test_published_sweep_has_source() {
        let settings = SweepSettingsBuilder::new().title("dipole").build();
        let mut worker = SweepWorker::new(device(), settings);
        worker.start(plan(1)).unwrap();
        assert_eq!(worker.wait(), SweepState::Completed);
        let dataset = worker.dataset();
        assert!(dataset.source().starts_with("dipole "));
        assert!(dataset.label().ends_with(&format!(" @ {} points", SEGMENT_POINTS)));
    }

    #[test]
    fn test_reference_trace() {
        let mut worker = SweepWorker::new(device(), SweepSettings::default());
        assert!(!worker.has_reference());
        worker.start(plan(1)).unwrap();
        worker.wait();
        drain(&worker);

        let version = worker.set_reference_from_current();
        assert_eq!(version, 1);
        assert!(worker.has_reference());
        assert_eq!(*worker.reference(), *worker.dataset());

        // a later sweep leaves the reference alone
        worker.start(plan(2)).unwrap();
        worker.wait();
        assert_eq!(worker.reference().len(), SEGMENT_POINTS);
        assert_eq!(worker.dataset().len(), 2 * (SEGMENT_POINTS - 1) + 1);

        let loaded = SweepDataset::new(vec![Datapoint::new(5, 0.1, 0.0)], vec![]).with_source("open.s1p");
        assert_eq!(worker.set_reference(loaded), 2);
        assert_eq!(worker.reference().label(), "open.s1p @ 1 points");

        assert_eq!(worker.reset_reference(), 3);
        assert!(!worker.has_reference());
        let events = drain(&worker);
        assert!(events.contains(&SweepEvent::ReferenceChanged { version: 1, set: true }));
        assert_eq!(events.last(), Some(&SweepEvent::ReferenceChanged { version: 3, set: false }));
    }

    #[test]
    fn test_touchstone_uses_reference_impedance() {
        let settings = SweepSettingsBuilder::new().reference_impedance(75.0).build();
        let mut worker = SweepWorker::new(device(), settings);
        worker.start(plan(1)).unwrap();
        worker.wait();
        let ts = worker.touchstone();
        assert_eq!(ts.options().resistance, 75.0);
        let text = ts.to_string_with(2, WriteMode::Normalized).unwrap();
        assert!(text.starts_with("# Hz S RI R 75\n"), "{}", text);
    }

    #[test]
    fn test_stop_publishes_partial() {
        let sim = device().with_read_delay(Duration::from_millis(30));
        let mut worker = SweepWorker::new(sim, SweepSettings::default());
        worker.start(plan(6)).unwrap();
        assert_eq!(
            worker.start(plan(1)),
            Err(SweepError::InvalidState(SweepState::Running))
        );
        loop {
            match worker.next_event_timeout(TIMEOUT) {
                Some(SweepEvent::Progress { .. }) => break,
                Some(_) => continue,
                None => panic!("no progress from sweep"),
            }
        }
        worker.stop();
        assert_eq!(worker.wait(), SweepState::Stopped);

        let dataset = worker.dataset();
        assert!(!dataset.is_empty());
        assert!(dataset.len() < 6 * (SEGMENT_POINTS - 1) + 1);
        assert_eq!(dataset.len() % (SEGMENT_POINTS - 1), 1);
        assert_eq!(dataset.s11().len(), dataset.s21().len());
        let events = drain(&worker);
        assert!(events.contains(&SweepEvent::Published {
            version: 1,
            complete: false
        }));
        assert_eq!(events.last(), Some(&SweepEvent::Stopped));
    }

    #[test]
    fn test_continuous_until_stopped() {
        let settings = SweepSettingsBuilder::new().mode(SweepMode::Continuous).build();
        let mut worker = SweepWorker::new(device().with_read_delay(Duration::from_millis(2)), settings);
        worker.start(plan(1)).unwrap();
        let mut completed = 0;
        while completed < 3 {
            match worker.next_event_timeout(TIMEOUT) {
                Some(SweepEvent::Completed) => completed += 1,
                Some(_) => continue,
                None => panic!("continuous sweep stalled"),
            }
        }
        worker.stop();
        assert_eq!(worker.wait(), SweepState::Stopped);
        assert!(worker.version() >= 3);
    }

    #[test]
    fn test_averaging_applied() {
        let settings = SweepSettingsBuilder::new()
            .averaging(Averaging::new(3, 1).unwrap())
            .build();
        let mut worker = SweepWorker::new(device(), settings);
        worker.start(plan(1)).unwrap();
        assert_eq!(worker.wait(), SweepState::Completed);
        let device = worker.into_device().unwrap();
        assert_eq!(device.reads(), 3);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = SweepSettingsBuilder::new()
            .averaging(Averaging {
                count: 1,
                truncate: 1,
            })
            .build();
        let mut worker = SweepWorker::new(device(), settings);
        assert!(matches!(worker.start(plan(1)), Err(SweepError::Config(_))));
        assert_eq!(worker.state(), SweepState::Idle);
    }

    #[test]
    fn test_calibration_coverage() {
        let grid = [1_000_000u64, 2_000_000];
        let sweep = |z: Complex64| -> Vec<Datapoint> {
            grid.iter().map(|&f| Datapoint::from_complex(f, z)).collect()
        };
        let set = CalibrationSet::new()
            .with(CalibrationStandard::new(CalibrationRole::Short, sweep(c64(-1.0, 0.0)), vec![]))
            .with(CalibrationStandard::new(CalibrationRole::Open, sweep(c64(1.0, 0.0)), vec![]))
            .with(CalibrationStandard::new(CalibrationRole::Load, sweep(Complex64::ZERO), vec![]));
        let model = CorrectionModel::derive(&set, CalibrationMethod::Sol, &StandardModels::default()).unwrap();

        let mut worker = SweepWorker::new(device(), SweepSettings::default());
        worker.set_calibration(Some(Arc::new(model)));
        assert_eq!(
            worker.start(plan(2)),
            Err(SweepError::Calibration(
                CalibrationError::FrequencyOutOfCalibrationRange {
                    frequency: 3_000_000,
                    min: 1_000_000,
                    max: 2_000_000
                }
            ))
        );
        worker.start(plan(1)).unwrap();
        assert_eq!(worker.wait(), SweepState::Completed);
        assert_eq!(worker.dataset().len(), SEGMENT_POINTS);
    }
}
