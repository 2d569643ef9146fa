//! Electrical quantities derived from corrected S-parameters.
//!
//! Everything here is a pure function of one point, or of a point and its
//! neighbours. Conditions that have no finite value (a total reflection, a
//! shorted resistance) are reported as explicit variants or `None`, never
//! as infinities or NaN.

use crate::datapoint::Datapoint;
use crate::math::wrap_phase;
use crate::unit::{Unit, UnitVal};
use num::complex::Complex64;
use serde::Serialize;
use std::f64::consts::TAU;
use std::fmt;

/// Voltage standing wave ratio
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Vswr {
    Finite(f64),
    /// Total reflection, |Γ| >= 1
    Infinite,
}

impl Vswr {
    pub fn value(&self) -> Option<f64> {
        match self {
            Vswr::Finite(v) => Some(*v),
            Vswr::Infinite => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Vswr::Infinite)
    }
}

impl fmt::Display for Vswr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vswr::Finite(v) => write!(f, "{:.3}", v),
            Vswr::Infinite => write!(f, "∞"),
        }
    }
}

/// Return loss in dB
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum ReturnLoss {
    Finite(f64),
    /// No finite value: a perfect match, or total reflection
    Infinite,
}

impl ReturnLoss {
    pub fn value(&self) -> Option<f64> {
        match self {
            ReturnLoss::Finite(v) => Some(*v),
            ReturnLoss::Infinite => None,
        }
    }
}

impl fmt::Display for ReturnLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnLoss::Finite(v) => write!(f, "{:.3} dB", v),
            ReturnLoss::Infinite => write!(f, "∞ dB"),
        }
    }
}

pub fn vswr(gamma: Complex64) -> Vswr {
    let mag = gamma.norm();
    // also catches NaN
    if !(mag < 1.0) {
        return Vswr::Infinite;
    }
    Vswr::Finite((1.0 + mag) / (1.0 - mag))
}

/// Defined only for a finite VSWR above 1
pub fn return_loss_db(vswr: Vswr) -> ReturnLoss {
    match vswr {
        Vswr::Finite(v) if v > 1.0 => ReturnLoss::Finite(20.0 * ((v - 1.0) / (v + 1.0)).log10()),
        _ => ReturnLoss::Infinite,
    }
}

/// Transmission gain in dB, `None` when nothing is transmitted
pub fn gain_db(s21: Complex64) -> Option<f64> {
    let mag = s21.norm();
    if mag > 0.0 {
        Some(20.0 * mag.log10())
    } else {
        None
    }
}

/// Impedance seen through reflection coefficient `gamma`, `None` for an open
pub fn impedance(gamma: Complex64, z0: f64) -> Option<Complex64> {
    let den = Complex64::ONE - gamma;
    if den == Complex64::ZERO {
        return None;
    }
    Some(z0 * (Complex64::ONE + gamma) / den)
}

pub fn resistance(gamma: Complex64, z0: f64) -> Option<f64> {
    impedance(gamma, z0).map(|z| z.re)
}

pub fn reactance(gamma: Complex64, z0: f64) -> Option<f64> {
    impedance(gamma, z0).map(|z| z.im)
}

pub fn admittance(z: Complex64) -> Option<Complex64> {
    if z == Complex64::ZERO {
        return None;
    }
    Some(z.inv())
}

/// |X/R|, `None` for a purely reactive impedance
pub fn q_factor(z: Complex64) -> Option<f64> {
    if z.re == 0.0 {
        return None;
    }
    Some((z.im / z.re).abs())
}

/// Capacitance with reactance `x` at `frequency`
pub fn capacitive_equivalent(x: f64, frequency: u64) -> Option<f64> {
    let omega = TAU * frequency as f64;
    if x == 0.0 || omega == 0.0 {
        return None;
    }
    Some(-1.0 / (omega * x))
}

/// Inductance with reactance `x` at `frequency`
pub fn inductive_equivalent(x: f64, frequency: u64) -> Option<f64> {
    let omega = TAU * frequency as f64;
    if omega == 0.0 {
        return None;
    }
    Some(x / omega)
}

/// Resistance of the equivalent parallel circuit
pub fn parallel_resistance(z: Complex64) -> Option<f64> {
    if z.re == 0.0 {
        return None;
    }
    Some(z.norm_sqr() / z.re)
}

/// Reactance of the equivalent parallel circuit
pub fn parallel_reactance(z: Complex64) -> Option<f64> {
    if z.im == 0.0 {
        return None;
    }
    Some(z.norm_sqr() / z.im)
}

/// Series capacitor or inductor equivalent to the reactance of `z`
pub fn series_equivalent(z: Complex64, frequency: u64) -> Option<UnitVal> {
    if z.im < 0.0 {
        capacitive_equivalent(z.im, frequency).map(|c| UnitVal::new(c, Unit::Farad))
    } else if z.im > 0.0 {
        inductive_equivalent(z.im, frequency).map(|l| UnitVal::new(l, Unit::Henry))
    } else {
        None
    }
}

/// Group delay in seconds at `index`, from the phase difference of its two
/// neighbours. `None` at either end of the sequence.
pub fn group_delay(points: &[Datapoint], index: usize) -> Option<f64> {
    if index == 0 || index + 1 >= points.len() {
        return None;
    }
    let before = &points[index - 1];
    let after = &points[index + 1];
    let delta_freq = after.frequency as f64 - before.frequency as f64;
    if delta_freq == 0.0 {
        return None;
    }
    let delta_angle = wrap_phase(after.phase() - before.phase());
    Some(-delta_angle / (TAU * delta_freq))
}

pub fn group_delays(points: &[Datapoint]) -> Vec<Option<f64>> {
    (0..points.len()).map(|i| group_delay(points, i)).collect()
}

/// Index of the point closest in frequency, first one on a tie
pub fn nearest_index(points: &[Datapoint], frequency: u64) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| p.frequency.abs_diff(frequency))
        .map(|(i, _)| i)
}

/// Extremes of a sweep, as shown next to the charts
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SweepSummary {
    /// (frequency, vswr)
    pub min_vswr: Option<(u64, f64)>,
    /// (frequency, dB)
    pub min_gain: Option<(u64, f64)>,
    /// (frequency, dB)
    pub max_gain: Option<(u64, f64)>,
}

impl SweepSummary {
    pub fn from_sweep(s11: &[Datapoint], s21: &[Datapoint]) -> Self {
        let mut summary = SweepSummary::default();
        for p in s11 {
            if let Vswr::Finite(v) = p.vswr() {
                if summary.min_vswr.map_or(true, |(_, min)| v < min) {
                    summary.min_vswr = Some((p.frequency, v));
                }
            }
        }
        for p in s21 {
            if let Some(g) = p.gain_db() {
                if summary.min_gain.map_or(true, |(_, min)| g < min) {
                    summary.min_gain = Some((p.frequency, g));
                }
                if summary.max_gain.map_or(true, |(_, max)| g > max) {
                    summary.max_gain = Some((p.frequency, g));
                }
            }
        }
        summary
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::{comp_c64, comp_f64};
    use float_cmp::F64Margin;
    use num::complex::c64;

    const MARGIN: F64Margin = F64Margin {
        epsilon: 1e-9,
        ulps: 4,
    };

    #[test]
    fn test_vswr() {
        match vswr(c64(0.5, 0.0)) {
            Vswr::Finite(v) => comp_f64(&v, &3.0, MARGIN, "vswr", "0.5"),
            Vswr::Infinite => panic!("finite expected"),
        }
        assert_eq!(vswr(Complex64::ZERO), Vswr::Finite(1.0));
        assert_eq!(vswr(c64(0.0, -1.0)), Vswr::Infinite);
        assert_eq!(vswr(c64(1.2, 0.0)), Vswr::Infinite);
        assert_eq!(vswr(c64(f64::NAN, 0.0)), Vswr::Infinite);
    }

    #[test]
    fn test_vswr_approaching_total_reflection() {
        for k in 1..20 {
            let gamma = c64(1.0 - 10f64.powi(-k), 0.0);
            match vswr(gamma) {
                Vswr::Finite(v) => assert!(v.is_finite() && v > 1.0, "k = {}", k),
                Vswr::Infinite => assert_eq!(gamma.norm(), 1.0, "k = {}", k),
            }
        }
        assert_eq!(vswr(Complex64::ONE), Vswr::Infinite);
    }

    #[test]
    fn test_return_loss() {
        match return_loss_db(Vswr::Finite(3.0)) {
            ReturnLoss::Finite(rl) => comp_f64(&rl, &(20.0 * 0.5f64.log10()), MARGIN, "rl", "3"),
            ReturnLoss::Infinite => panic!("finite expected"),
        }
        assert_eq!(return_loss_db(Vswr::Finite(1.0)), ReturnLoss::Infinite);
        assert_eq!(return_loss_db(Vswr::Infinite), ReturnLoss::Infinite);
        assert_eq!(ReturnLoss::Infinite.to_string(), "∞ dB");
        assert_eq!(Vswr::Infinite.to_string(), "∞");
        assert_eq!(Vswr::Finite(1.5).to_string(), "1.500");
    }

    #[test]
    fn test_return_loss_total_reflection() {
        for gamma in [c64(1.0, 0.0), c64(0.0, -1.0), c64(1.5, 0.0)] {
            assert_eq!(return_loss_db(vswr(gamma)), ReturnLoss::Infinite, "{}", gamma);
        }
        assert!(matches!(return_loss_db(vswr(c64(0.999, 0.0))), ReturnLoss::Finite(_)));
    }

    #[test]
    fn test_gain() {
        comp_f64(&gain_db(c64(0.1, 0.0)).unwrap(), &-20.0, MARGIN, "gain", "0.1");
        comp_f64(&gain_db(c64(0.0, 10.0)).unwrap(), &20.0, MARGIN, "gain", "10j");
        assert_eq!(gain_db(Complex64::ZERO), None);
    }

    #[test]
    fn test_impedance() {
        comp_c64(&impedance(Complex64::ZERO, 50.0).unwrap(), &c64(50.0, 0.0), MARGIN, "z", "match");
        comp_c64(&impedance(c64(-1.0, 0.0), 50.0).unwrap(), &c64(0.0, 0.0), MARGIN, "z", "short");
        comp_c64(&impedance(c64(0.0, 1.0), 50.0).unwrap(), &c64(0.0, 50.0), MARGIN, "z", "j");
        assert_eq!(impedance(Complex64::ONE, 50.0), None);
        comp_f64(&reactance(c64(0.0, 1.0), 50.0).unwrap(), &50.0, MARGIN, "z", "x");
        comp_f64(&resistance(Complex64::ZERO, 75.0).unwrap(), &75.0, MARGIN, "z", "r");
        comp_c64(&admittance(c64(50.0, 0.0)).unwrap(), &c64(0.02, 0.0), MARGIN, "y", "50");
        assert_eq!(admittance(Complex64::ZERO), None);
    }

    #[test]
    fn test_marker_quantities() {
        let z = c64(25.0, -50.0);
        comp_f64(&q_factor(z).unwrap(), &2.0, MARGIN, "q", "rc");
        assert_eq!(q_factor(c64(0.0, 10.0)), None);
        comp_f64(&parallel_resistance(z).unwrap(), &125.0, MARGIN, "parallel", "r");
        comp_f64(&parallel_reactance(z).unwrap(), &-62.5, MARGIN, "parallel", "x");

        let c = capacitive_equivalent(-100.0, 1_000_000).unwrap();
        comp_f64(&c, &(1.0 / (TAU * 1e8)), MARGIN, "equivalent", "c");
        let l = inductive_equivalent(100.0, 1_000_000).unwrap();
        comp_f64(&l, &(100.0 / (TAU * 1e6)), MARGIN, "equivalent", "l");
        assert_eq!(capacitive_equivalent(0.0, 1_000_000), None);
        assert_eq!(inductive_equivalent(1.0, 0), None);
    }

    #[test]
    fn test_series_equivalent() {
        let cap = series_equivalent(c64(50.0, -100.0), 1_000_000).unwrap();
        assert_eq!(cap.unit(), Unit::Farad);
        assert_eq!(cap.to_string(), "1.5915 nF");
        let ind = series_equivalent(c64(50.0, 100.0), 1_000_000).unwrap();
        assert_eq!(ind.unit(), Unit::Henry);
        assert_eq!(ind.to_string(), "15.915 µH");
        assert!(series_equivalent(c64(50.0, 0.0), 1_000_000).is_none());
    }

    #[test]
    fn test_group_delay() {
        let tau = 1e-9;
        let points: Vec<Datapoint> = (0..50u64)
            .map(|i| {
                let f = 1_000_000 + i * 10_000_000;
                Datapoint::from_complex(f, Complex64::from_polar(0.9, -TAU * f as f64 * tau))
            })
            .collect();
        let delays = group_delays(&points);
        assert_eq!(delays.len(), points.len());
        assert_eq!(delays[0], None);
        assert_eq!(delays[49], None);
        for d in &delays[1..49] {
            comp_f64(&d.unwrap(), &tau, F64Margin { epsilon: 1e-15, ulps: 4 }, "group_delay", "mid");
        }
    }

    #[test]
    fn test_group_delay_degenerate() {
        let points = vec![Datapoint::new(100, 1.0, 0.0); 3];
        assert_eq!(group_delay(&points, 1), None);
        assert_eq!(group_delay(&points[..1], 0), None);
        assert_eq!(group_delay(&[], 0), None);
    }

    #[test]
    fn test_nearest_index() {
        let points: Vec<Datapoint> = [100u64, 200, 300, 400]
            .iter()
            .map(|&f| Datapoint::new(f, 0.0, 0.0))
            .collect();
        assert_eq!(nearest_index(&points, 0), Some(0));
        assert_eq!(nearest_index(&points, 240), Some(1));
        assert_eq!(nearest_index(&points, 250), Some(1));
        assert_eq!(nearest_index(&points, 10_000), Some(3));
        assert_eq!(nearest_index(&[], 10), None);
    }

    #[test]
    fn test_summary() {
        let s11 = vec![
            Datapoint::new(100, 0.5, 0.0),
            Datapoint::new(200, 0.1, 0.0),
            Datapoint::new(300, 1.0, 0.0),
        ];
        let s21 = vec![
            Datapoint::new(100, 0.1, 0.0),
            Datapoint::new(200, 1.0, 0.0),
            Datapoint::new(300, 0.0, 0.0),
        ];
        let summary = SweepSummary::from_sweep(&s11, &s21);
        assert_eq!(summary.min_vswr.unwrap().0, 200);
        assert_eq!(summary.min_gain.unwrap().0, 100);
        assert_eq!(summary.max_gain.unwrap().0, 200);
        assert_eq!(SweepSummary::from_sweep(&[], &[]), SweepSummary::default());
    }
}
