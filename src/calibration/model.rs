use crate::calibration::{CalibrationMethod, CalibrationRole, CalibrationSet, StandardModels};
use crate::consts::NEAR_ZERO;
use crate::datapoint::Datapoint;
use crate::error::CalibrationError;
use crate::math::{lerp_c64, solve3};
use ndarray::Array1;
use num::complex::Complex64;
use tracing::{debug, info, warn};

/// Error terms of one port direction at one frequency.
///
/// The raw reflection is `e00 + e10e01 S / (1 - e11 S)` and the raw
/// transmission of a DUT with a matched output is
/// `e30 + e10e32 S21 / (1 - e11 S11)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorTerms {
    pub frequency: u64,
    /// e00
    pub directivity: Complex64,
    /// e11
    pub source_match: Complex64,
    /// e10e01
    pub reflection_tracking: Complex64,
    /// e30
    pub isolation: Complex64,
    /// e22
    pub load_match: Complex64,
    /// e10e32
    pub transmission_tracking: Complex64,
}

impl ErrorTerms {
    /// e00 e11 - e10e01
    pub fn delta_e(&self) -> Complex64 {
        self.directivity * self.source_match - self.reflection_tracking
    }

    pub fn correct_reflection(&self, sm: Complex64) -> Complex64 {
        (sm - self.directivity) / (sm * self.source_match - self.delta_e())
    }

    /// Enhanced response correction using the corrected reflection `s11`
    pub fn correct_transmission(&self, s21m: Complex64, s11: Complex64) -> Complex64 {
        (s21m - self.isolation) / self.transmission_tracking * (1.0 - self.source_match * s11)
    }
}

/// Term columns over the calibration grid
#[derive(Clone, Debug, PartialEq)]
struct TermColumns {
    e00: Array1<Complex64>,
    e11: Array1<Complex64>,
    e10e01: Array1<Complex64>,
    e30: Array1<Complex64>,
    e22: Array1<Complex64>,
    e10e32: Array1<Complex64>,
}

impl TermColumns {
    fn new(n: usize) -> Self {
        TermColumns {
            e00: Array1::zeros(n),
            e11: Array1::zeros(n),
            e10e01: Array1::ones(n),
            e30: Array1::zeros(n),
            e22: Array1::zeros(n),
            e10e32: Array1::ones(n),
        }
    }

    fn at(&self, frequency: u64, idx: usize) -> ErrorTerms {
        ErrorTerms {
            frequency,
            directivity: self.e00[idx],
            source_match: self.e11[idx],
            reflection_tracking: self.e10e01[idx],
            isolation: self.e30[idx],
            load_match: self.e22[idx],
            transmission_tracking: self.e10e32[idx],
        }
    }

    fn lerp(&self, frequency: u64, lo: usize, hi: usize, t: f64) -> ErrorTerms {
        let l = |col: &Array1<Complex64>| lerp_c64(col[lo], col[hi], t);
        ErrorTerms {
            frequency,
            directivity: l(&self.e00),
            source_match: l(&self.e11),
            reflection_tracking: l(&self.e10e01),
            isolation: l(&self.e30),
            load_match: l(&self.e22),
            transmission_tracking: l(&self.e10e32),
        }
    }
}

/// Error terms solved from a calibration set, immutable once derived
#[derive(Clone, Debug, PartialEq)]
pub struct CorrectionModel {
    method: CalibrationMethod,
    frequencies: Vec<u64>,
    forward: TermColumns,
    reverse: Option<TermColumns>,
}

impl CorrectionModel {
    pub fn derive(
        standards: &CalibrationSet,
        method: CalibrationMethod,
        models: &StandardModels,
    ) -> Result<CorrectionModel, CalibrationError> {
        let missing = standards.missing(method);
        if !missing.is_empty() {
            return Err(CalibrationError::IncompleteStandardSet { method, missing });
        }
        let grid = frequency_grid(standards)?;
        for role in method.required_roles() {
            check_grid(standards, *role, &grid)?;
        }

        let forward = solve_port(standards, method, models, &grid, Port::Forward)?;
        let reverse = match method {
            CalibrationMethod::FullTwoPort => {
                Some(solve_port(standards, method, models, &grid, Port::Reverse)?)
            }
            _ => None,
        };
        info!(
            method = %method,
            points = grid.len(),
            start = grid[0],
            stop = grid[grid.len() - 1],
            "derived correction model"
        );
        Ok(CorrectionModel {
            method,
            frequencies: grid,
            forward,
            reverse,
        })
    }

    pub fn method(&self) -> CalibrationMethod {
        self.method
    }

    pub fn frequencies(&self) -> &[u64] {
        &self.frequencies
    }

    pub fn min_frequency(&self) -> u64 {
        self.frequencies[0]
    }

    pub fn max_frequency(&self) -> u64 {
        self.frequencies[self.frequencies.len() - 1]
    }

    /// Whether every frequency in `[start, stop]` can be corrected
    pub fn covers(&self, start: u64, stop: u64) -> bool {
        start >= self.min_frequency() && stop <= self.max_frequency()
    }

    /// Forward terms at `frequency`, interpolated between grid points
    pub fn terms_at(&self, frequency: u64) -> Result<ErrorTerms, CalibrationError> {
        self.interpolate(&self.forward, frequency)
    }

    /// Reverse terms at `frequency`, `None` unless the model is two port
    pub fn reverse_terms_at(&self, frequency: u64) -> Result<Option<ErrorTerms>, CalibrationError> {
        match &self.reverse {
            Some(cols) => self.interpolate(cols, frequency).map(Some),
            None => Ok(None),
        }
    }

    fn interpolate(&self, cols: &TermColumns, frequency: u64) -> Result<ErrorTerms, CalibrationError> {
        if !self.covers(frequency, frequency) {
            return Err(CalibrationError::FrequencyOutOfCalibrationRange {
                frequency,
                min: self.min_frequency(),
                max: self.max_frequency(),
            });
        }
        let hi = self.frequencies.partition_point(|&f| f < frequency);
        if self.frequencies[hi] == frequency {
            return Ok(cols.at(frequency, hi));
        }
        let lo = hi - 1;
        let (f_lo, f_hi) = (self.frequencies[lo], self.frequencies[hi]);
        let t = (frequency - f_lo) as f64 / (f_hi - f_lo) as f64;
        Ok(cols.lerp(frequency, lo, hi, t))
    }

    pub fn apply(&self, raw: &Datapoint) -> Result<Datapoint, CalibrationError> {
        let terms = self.terms_at(raw.frequency)?;
        Ok(Datapoint::from_complex(
            raw.frequency,
            terms.correct_reflection(raw.z()),
        ))
    }

    /// S21 passes through unchanged unless the method measured a through
    pub fn apply_transmission(
        &self,
        s11_raw: &Datapoint,
        s21_raw: &Datapoint,
    ) -> Result<Datapoint, CalibrationError> {
        if !self.method.corrects_transmission() {
            return Ok(*s21_raw);
        }
        let terms = self.terms_at(s21_raw.frequency)?;
        let s11 = terms.correct_reflection(s11_raw.z());
        Ok(Datapoint::from_complex(
            s21_raw.frequency,
            terms.correct_transmission(s21_raw.z(), s11),
        ))
    }

    pub fn apply_pair(
        &self,
        s11_raw: &Datapoint,
        s21_raw: &Datapoint,
    ) -> Result<(Datapoint, Datapoint), CalibrationError> {
        Ok((self.apply(s11_raw)?, self.apply_transmission(s11_raw, s21_raw)?))
    }

    /// Twelve term correction of raw `[s11, s21, s12, s22]`
    pub fn apply_two_port(&self, raw: &[Datapoint; 4]) -> Result<[Datapoint; 4], CalibrationError> {
        let frequency = raw[0].frequency;
        let fwd = self.terms_at(frequency)?;
        let Some(rev) = self.reverse_terms_at(frequency)? else {
            let held: Vec<CalibrationRole> = CalibrationMethod::FullTwoPort
                .required_roles()
                .iter()
                .filter(|role| !self.method.required_roles().contains(role))
                .copied()
                .collect();
            return Err(CalibrationError::IncompleteStandardSet {
                method: CalibrationMethod::FullTwoPort,
                missing: held,
            });
        };

        let s11p = (raw[0].z() - fwd.directivity) / fwd.reflection_tracking;
        let s21p = (raw[1].z() - fwd.isolation) / fwd.transmission_tracking;
        let s12p = (raw[2].z() - rev.isolation) / rev.transmission_tracking;
        let s22p = (raw[3].z() - rev.directivity) / rev.reflection_tracking;
        let (esf, elf) = (fwd.source_match, fwd.load_match);
        let (esr, elr) = (rev.source_match, rev.load_match);

        let d = (1.0 + s11p * esf) * (1.0 + s22p * esr) - s21p * s12p * elf * elr;
        if d.norm() < NEAR_ZERO {
            return Err(CalibrationError::SingularStandards { frequency });
        }
        let s11 = (s11p * (1.0 + s22p * esr) - elf * s21p * s12p) / d;
        let s21 = s21p * (1.0 + s22p * (esr - elf)) / d;
        let s12 = s12p * (1.0 + s11p * (esf - elr)) / d;
        let s22 = (s22p * (1.0 + s11p * esf) - elr * s21p * s12p) / d;
        Ok([
            Datapoint::from_complex(frequency, s11),
            Datapoint::from_complex(raw[1].frequency, s21),
            Datapoint::from_complex(raw[2].frequency, s12),
            Datapoint::from_complex(raw[3].frequency, s22),
        ])
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Port {
    Forward,
    Reverse,
}

impl Port {
    fn roles(&self) -> [CalibrationRole; 5] {
        use CalibrationRole::*;
        match self {
            Port::Forward => [Short, Open, Load, Through, Isolation],
            Port::Reverse => [ReverseShort, ReverseOpen, ReverseLoad, ReverseThrough, ReverseIsolation],
        }
    }
}

fn singular(frequency: u64) -> CalibrationError {
    warn!(frequency, "standards are singular");
    CalibrationError::SingularStandards { frequency }
}

fn frequency_grid(standards: &CalibrationSet) -> Result<Vec<u64>, CalibrationError> {
    let invalid = |reason: &str| CalibrationError::InvalidStandardData {
        role: CalibrationRole::Short,
        reason: reason.to_string(),
    };
    let grid = standards
        .get(CalibrationRole::Short)
        .map(|s| s.frequencies())
        .unwrap_or_default();
    if grid.is_empty() {
        return Err(invalid("no data points"));
    }
    if grid.windows(2).any(|w| w[1] <= w[0]) {
        return Err(invalid("frequencies not strictly ascending"));
    }
    Ok(grid)
}

fn check_grid(
    standards: &CalibrationSet,
    role: CalibrationRole,
    grid: &[u64],
) -> Result<(), CalibrationError> {
    let invalid = |reason: &str| CalibrationError::InvalidStandardData {
        role,
        reason: reason.to_string(),
    };
    let matches = |data: &[Datapoint]| {
        data.len() == grid.len() && data.iter().zip(grid).all(|(p, f)| p.frequency == *f)
    };
    let Some(standard) = standards.get(role) else {
        return Err(invalid("missing"));
    };
    if role.uses_reflection() && !matches(&standard.s11) {
        return Err(invalid("reflection data does not match the short's frequencies"));
    }
    if role.uses_transmission() && !matches(&standard.s21) {
        return Err(invalid("transmission data does not match the short's frequencies"));
    }
    Ok(())
}

fn solve_port(
    standards: &CalibrationSet,
    method: CalibrationMethod,
    models: &StandardModels,
    grid: &[u64],
    port: Port,
) -> Result<TermColumns, CalibrationError> {
    let [short, open, load, through, isolation] = port.roles();
    let s11 = |role: CalibrationRole, idx: usize| -> Complex64 {
        standards.get(role).map_or(Complex64::ZERO, |s| s.s11[idx].z())
    };
    let s21 = |role: CalibrationRole, idx: usize| -> Complex64 {
        standards.get(role).map_or(Complex64::ZERO, |s| s.s21[idx].z())
    };

    let mut cols = TermColumns::new(grid.len());
    for (idx, &frequency) in grid.iter().enumerate() {
        let gs = models.short_gamma(frequency);

        if method == CalibrationMethod::Short {
            let sm = s11(short, idx);
            if sm.norm() < NEAR_ZERO {
                return Err(singular(frequency));
            }
            cols.e10e01[idx] = sm / gs;
            continue;
        }

        // sm = e00 + s sm e11 - s dE
        let measured = [
            (gs, s11(short, idx)),
            (models.open_gamma(frequency), s11(open, idx)),
            (models.load_gamma(frequency), s11(load, idx)),
        ];
        let a = measured.map(|(s, sm)| [Complex64::ONE, s * sm, -s]);
        let b = measured.map(|(_, sm)| sm);
        let [e00, e11, delta_e] = solve3(&a, &b).ok_or_else(|| singular(frequency))?;
        let e10e01 = e00 * e11 - delta_e;
        if e10e01.norm() < NEAR_ZERO {
            return Err(singular(frequency));
        }
        cols.e00[idx] = e00;
        cols.e11[idx] = e11;
        cols.e10e01[idx] = e10e01;

        if method.corrects_transmission() {
            let t = models.through_s21(frequency);
            let e30 = s21(isolation, idx);
            let seen = (s11(through, idx) - e00) / (s11(through, idx) * e11 - delta_e);
            let e22 = seen / (t * t);
            let e10e32 = (s21(through, idx) - e30) * (1.0 - e11 * e22 * t * t) / t;
            if e10e32.norm() < NEAR_ZERO {
                return Err(singular(frequency));
            }
            cols.e30[idx] = e30;
            cols.e22[idx] = e22;
            cols.e10e32[idx] = e10e32;
        }
    }
    debug!(method = %method, ?port, points = grid.len(), "solved error terms");
    Ok(cols)
}
