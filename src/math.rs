use crate::consts::NEAR_ZERO;
use ndarray::Array1;
use num::complex::{c64, Complex64};
use std::f64::consts::{PI, TAU};

/// Wrap an angle in radians into (-pi, pi]
pub fn wrap_phase(phi: f64) -> f64 {
    let wrapped = (phi + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

pub fn from_polar_deg(r: f64, theta: f64) -> Complex64 {
    Complex64::from_polar(r, theta.to_radians())
}

pub fn db_to_mag(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

pub fn mag_to_db(mag: f64) -> f64 {
    20.0 * mag.log10()
}

pub fn lerp_c64(a: Complex64, b: Complex64, t: f64) -> Complex64 {
    a + (b - a) * t
}

/// Reflection coefficient of impedance `z` against reference `z0`
pub fn gamma_from_z(z: Complex64, z0: f64) -> Complex64 {
    (z - z0) / (z + z0)
}

fn det3(m: &[[Complex64; 3]; 3]) -> Complex64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Solve the 3x3 complex system `a x = b` by Cramer's rule.
/// Returns `None` when the determinant vanishes.
pub fn solve3(a: &[[Complex64; 3]; 3], b: &[Complex64; 3]) -> Option<[Complex64; 3]> {
    let det = det3(a);
    if det.norm() < NEAR_ZERO {
        return None;
    }
    let mut x = [Complex64::ZERO; 3];
    for (col, xi) in x.iter_mut().enumerate() {
        let mut m = *a;
        for row in 0..3 {
            m[row][col] = b[row];
        }
        *xi = det3(&m) / det;
    }
    Some(x)
}

/// Symmetric Blackman window of length `n`
pub fn blackman(n: usize) -> Array1<f64> {
    match n {
        0 => Array1::zeros(0),
        1 => Array1::ones(1),
        _ => {
            let m = (n - 1) as f64;
            Array1::from_shape_fn(n, |i| {
                let x = i as f64 / m;
                0.42 - 0.5 * (TAU * x).cos() + 0.08 * (2.0 * TAU * x).cos()
            })
        }
    }
}

/// Evenly spaced values over `[start, stop]`, endpoints included
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    match n {
        0 => Array1::zeros(0),
        1 => Array1::from_elem(1, start),
        _ => Array1::linspace(start, stop, n),
    }
}

pub fn jw(frequency: f64) -> Complex64 {
    c64(0.0, TAU * frequency)
}
