use crate::calibration::CalibrationMethod;
use crate::consts::DEFAULT_REFERENCE_IMPEDANCE;
use crate::datapoint::Datapoint;
use crate::math::{gamma_from_z, jw};
use crate::touchstone::Touchstone;
use num::complex::{c64, Complex64};
use serde::{Deserialize, Serialize};
use simple_error::{bail, SimpleError};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum CalibrationRole {
    Short,
    Open,
    Load,
    Through,
    Isolation,
    ReverseShort,
    ReverseOpen,
    ReverseLoad,
    ReverseThrough,
    ReverseIsolation,
}

impl CalibrationRole {
    pub const ALL: [CalibrationRole; 10] = [
        CalibrationRole::Short,
        CalibrationRole::Open,
        CalibrationRole::Load,
        CalibrationRole::Through,
        CalibrationRole::Isolation,
        CalibrationRole::ReverseShort,
        CalibrationRole::ReverseOpen,
        CalibrationRole::ReverseLoad,
        CalibrationRole::ReverseThrough,
        CalibrationRole::ReverseIsolation,
    ];

    pub fn to_str(&self) -> &str {
        match self {
            CalibrationRole::Short => "short",
            CalibrationRole::Open => "open",
            CalibrationRole::Load => "load",
            CalibrationRole::Through => "through",
            CalibrationRole::Isolation => "isolation",
            CalibrationRole::ReverseShort => "reverse short",
            CalibrationRole::ReverseOpen => "reverse open",
            CalibrationRole::ReverseLoad => "reverse load",
            CalibrationRole::ReverseThrough => "reverse through",
            CalibrationRole::ReverseIsolation => "reverse isolation",
        }
    }

    /// Whether the S21 of this standard enters the error terms
    pub fn uses_transmission(&self) -> bool {
        matches!(
            self,
            CalibrationRole::Through
                | CalibrationRole::Isolation
                | CalibrationRole::ReverseThrough
                | CalibrationRole::ReverseIsolation
        )
    }

    /// Whether the S11 of this standard enters the error terms
    pub fn uses_reflection(&self) -> bool {
        !matches!(
            self,
            CalibrationRole::Isolation | CalibrationRole::ReverseIsolation
        )
    }
}

impl FromStr for CalibrationRole {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase().replace(['_', '-'], " ");
        match CalibrationRole::ALL
            .iter()
            .find(|role| role.to_str() == lowered || (lowered == "thru" && **role == CalibrationRole::Through))
        {
            Some(role) => Ok(*role),
            None => bail!("string not a valid calibration role"),
        }
    }
}

impl fmt::Display for CalibrationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Raw sweep of one standard
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CalibrationStandard {
    pub role: CalibrationRole,
    pub s11: Vec<Datapoint>,
    /// Empty when the standard was measured on one port
    pub s21: Vec<Datapoint>,
}

impl CalibrationStandard {
    pub fn new(role: CalibrationRole, s11: Vec<Datapoint>, s21: Vec<Datapoint>) -> Self {
        CalibrationStandard { role, s11, s21 }
    }

    pub fn from_touchstone(role: CalibrationRole, ts: &Touchstone) -> Self {
        CalibrationStandard {
            role,
            s11: ts.s11().to_vec(),
            s21: ts.s21().to_vec(),
        }
    }

    pub fn frequencies(&self) -> Vec<u64> {
        self.s11.iter().map(|p| p.frequency).collect()
    }
}

/// Measured standards keyed by role. Inserting a role again replaces it.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct CalibrationSet {
    standards: BTreeMap<CalibrationRole, CalibrationStandard>,
}

impl CalibrationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, standard: CalibrationStandard) -> Option<CalibrationStandard> {
        self.standards.insert(standard.role, standard)
    }

    pub fn with(mut self, standard: CalibrationStandard) -> Self {
        self.insert(standard);
        self
    }

    pub fn get(&self, role: CalibrationRole) -> Option<&CalibrationStandard> {
        self.standards.get(&role)
    }

    pub fn remove(&mut self, role: CalibrationRole) -> Option<CalibrationStandard> {
        self.standards.remove(&role)
    }

    pub fn clear(&mut self) {
        self.standards.clear();
    }

    pub fn roles(&self) -> Vec<CalibrationRole> {
        self.standards.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.standards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.standards.is_empty()
    }

    /// Roles `method` needs that are not in the set, in the method's order
    pub fn missing(&self, method: CalibrationMethod) -> Vec<CalibrationRole> {
        method
            .required_roles()
            .iter()
            .filter(|role| !self.standards.contains_key(role))
            .copied()
            .collect()
    }

    pub fn is_complete(&self, method: CalibrationMethod) -> bool {
        self.missing(method).is_empty()
    }
}

/// Open standard, fringing capacitance `C0 + C1 f + C2 f^2 + C3 f^3`
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct OpenModel {
    /// 1e-15 F
    pub c0: f64,
    /// 1e-27 F/Hz
    pub c1: f64,
    /// 1e-36 F/Hz^2
    pub c2: f64,
    /// 1e-45 F/Hz^3
    pub c3: f64,
    /// Offset delay, seconds
    pub delay: f64,
}

impl OpenModel {
    pub fn capacitance(&self, frequency: f64) -> f64 {
        let f = frequency;
        self.c0 * 1e-15 + self.c1 * 1e-27 * f + self.c2 * 1e-36 * f * f + self.c3 * 1e-45 * f * f * f
    }

    pub fn gamma(&self, frequency: f64, z0: f64) -> Complex64 {
        let ycz = jw(frequency) * self.capacitance(frequency) * z0;
        (1.0 - ycz) / (1.0 + ycz) * offset(frequency, self.delay)
    }
}

/// Short standard, inductance `L0 + L1 f + L2 f^2 + L3 f^3`
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ShortModel {
    /// 1e-12 H
    pub l0: f64,
    /// 1e-24 H/Hz
    pub l1: f64,
    /// 1e-33 H/Hz^2
    pub l2: f64,
    /// 1e-42 H/Hz^3
    pub l3: f64,
    /// Offset delay, seconds
    pub delay: f64,
}

impl ShortModel {
    pub fn inductance(&self, frequency: f64) -> f64 {
        let f = frequency;
        self.l0 * 1e-12 + self.l1 * 1e-24 * f + self.l2 * 1e-33 * f * f + self.l3 * 1e-42 * f * f * f
    }

    pub fn gamma(&self, frequency: f64, z0: f64) -> Complex64 {
        let z = jw(frequency) * self.inductance(frequency);
        gamma_from_z(z, z0) * offset(frequency, self.delay)
    }
}

/// Load standard, `resistance` in series with `inductance`, shunted by
/// `capacitance`
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct LoadModel {
    pub resistance: f64,
    pub inductance: f64,
    pub capacitance: f64,
    pub delay: f64,
}

impl Default for LoadModel {
    fn default() -> Self {
        LoadModel {
            resistance: DEFAULT_REFERENCE_IMPEDANCE,
            inductance: 0.0,
            capacitance: 0.0,
            delay: 0.0,
        }
    }
}

impl LoadModel {
    pub fn gamma(&self, frequency: f64, z0: f64) -> Complex64 {
        let w = jw(frequency);
        let series = c64(self.resistance, 0.0) + w * self.inductance;
        let z = series / (1.0 + w * self.capacitance * series);
        gamma_from_z(z, z0) * offset(frequency, self.delay)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ThroughModel {
    /// One way delay, seconds
    pub delay: f64,
}

impl ThroughModel {
    pub fn s21(&self, frequency: f64) -> Complex64 {
        (-jw(frequency) * self.delay).exp()
    }
}

/// Two way phase of an offset line
fn offset(frequency: f64, delay: f64) -> Complex64 {
    (-jw(frequency) * 2.0 * delay).exp()
}

/// Ideal responses of the calibration kit
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct StandardModels {
    pub open: OpenModel,
    pub short: ShortModel,
    pub load: LoadModel,
    pub through: ThroughModel,
    pub reference_impedance: f64,
}

impl Default for StandardModels {
    fn default() -> Self {
        StandardModels {
            open: OpenModel::default(),
            short: ShortModel::default(),
            load: LoadModel::default(),
            through: ThroughModel::default(),
            reference_impedance: DEFAULT_REFERENCE_IMPEDANCE,
        }
    }
}

impl StandardModels {
    pub fn open_gamma(&self, frequency: u64) -> Complex64 {
        self.open.gamma(frequency as f64, self.reference_impedance)
    }

    pub fn short_gamma(&self, frequency: u64) -> Complex64 {
        self.short.gamma(frequency as f64, self.reference_impedance)
    }

    pub fn load_gamma(&self, frequency: u64) -> Complex64 {
        self.load.gamma(frequency as f64, self.reference_impedance)
    }

    pub fn through_s21(&self, frequency: u64) -> Complex64 {
        self.through.s21(frequency as f64)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StandardModelsBuilder {
    models: StandardModels,
}

impl StandardModelsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(mut self, open: OpenModel) -> Self {
        self.models.open = open;
        self
    }

    pub fn short(mut self, short: ShortModel) -> Self {
        self.models.short = short;
        self
    }

    pub fn load(mut self, load: LoadModel) -> Self {
        self.models.load = load;
        self
    }

    pub fn through(mut self, through: ThroughModel) -> Self {
        self.models.through = through;
        self
    }

    pub fn reference_impedance(mut self, z0: f64) -> Self {
        self.models.reference_impedance = z0;
        self
    }

    pub fn build(self) -> StandardModels {
        self.models
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::comp_c64;
    use float_cmp::F64Margin;

    const MARGIN: F64Margin = F64Margin {
        epsilon: 1e-12,
        ulps: 4,
    };

    #[test]
    fn test_ideal_defaults() {
        let models = StandardModels::default();
        for f in [0, 1_000_000, 900_000_000] {
            comp_c64(&models.open_gamma(f), &c64(1.0, 0.0), MARGIN, "ideal", "open");
            comp_c64(&models.short_gamma(f), &c64(-1.0, 0.0), MARGIN, "ideal", "short");
            comp_c64(&models.load_gamma(f), &c64(0.0, 0.0), MARGIN, "ideal", "load");
            comp_c64(&models.through_s21(f), &c64(1.0, 0.0), MARGIN, "ideal", "through");
        }
    }

    #[test]
    fn test_open_capacitance() {
        let open = OpenModel {
            c0: 50.0,
            c1: 0.0,
            c2: 0.0,
            c3: 0.0,
            delay: 0.0,
        };
        let f = 1e9;
        let z = 1.0 / (jw(f) * 50e-15);
        let exemplar = gamma_from_z(z, 50.0);
        comp_c64(&open.gamma(f, 50.0), &exemplar, MARGIN, "open", "c0");
        comp_c64(&open.gamma(0.0, 50.0), &c64(1.0, 0.0), MARGIN, "open", "dc");
        assert!((open.gamma(f, 50.0).norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_polynomial_units() {
        let f = 1e9;
        let open = OpenModel {
            c0: 1.0,
            c1: 1.0,
            c2: 1.0,
            c3: 1.0,
            delay: 0.0,
        };
        let exemplar = 1e-15 + 3e-18;
        assert!((open.capacitance(f) - exemplar).abs() < exemplar * 1e-12);
        let short = ShortModel {
            l0: 1.0,
            l1: 1.0,
            l2: 1.0,
            l3: 1.0,
            delay: 0.0,
        };
        let exemplar = 1e-12 + 3e-15;
        assert!((short.inductance(f) - exemplar).abs() < exemplar * 1e-12);
    }

    #[test]
    fn test_offset_delay() {
        let short = ShortModel {
            delay: 25e-12,
            ..Default::default()
        };
        // quarter wave round trip at 5 GHz
        let gamma = short.gamma(5e9, 50.0);
        comp_c64(&gamma, &c64(0.0, 1.0), MARGIN, "short", "delay");
    }

    #[test]
    fn test_set_missing() {
        let mut set = CalibrationSet::new();
        set.insert(CalibrationStandard::new(CalibrationRole::Short, vec![], vec![]));
        assert_eq!(
            set.missing(CalibrationMethod::Sol),
            vec![CalibrationRole::Open, CalibrationRole::Load]
        );
        assert!(set.is_complete(CalibrationMethod::Short));
        assert_eq!(set.len(), 1);
        set.remove(CalibrationRole::Short);
        assert!(set.is_empty());
    }

    #[test]
    fn test_role_names() {
        assert_eq!(CalibrationRole::ReverseLoad.to_string(), "reverse load");
        assert_eq!(
            CalibrationRole::from_str("Reverse_Short").unwrap(),
            CalibrationRole::ReverseShort
        );
        assert_eq!(CalibrationRole::from_str("thru").unwrap(), CalibrationRole::Through);
        assert!(CalibrationRole::from_str("match").is_err());
    }

    #[test]
    fn test_models_serde() {
        let models = StandardModelsBuilder::new()
            .open(OpenModel {
                c0: 40.0,
                ..Default::default()
            })
            .reference_impedance(75.0)
            .build();
        let text = serde_json::to_string(&models).unwrap();
        let back: StandardModels = serde_json::from_str(&text).unwrap();
        assert_eq!(back, models);
    }
}
