use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array2;
use num::complex::{c64, Complex64};
use std::io::Cursor;
use std::time::Duration;

use vnakit::calibration::{self, CalibrationMethod, CalibrationRole, CalibrationSet, CalibrationStandard};
use vnakit::prelude::*;
use vnakit::sweep::Averaging;
use vnakit::tdr::{self, TdrSettings};

const E00: Complex64 = Complex64 { re: 0.04, im: 0.01 };
const E11: Complex64 = Complex64 { re: -0.08, im: 0.05 };
const E10E01: Complex64 = Complex64 { re: 0.7, im: -0.3 };

fn frequencies(points: usize) -> Vec<u64> {
    (0..points as u64).map(|i| 1_000_000 + i * 1_000_000).collect()
}

fn measured(frequencies: &[u64], gamma: Complex64) -> Vec<Datapoint> {
    let raw = E00 + E10E01 * gamma / (1.0 - E11 * gamma);
    frequencies
        .iter()
        .map(|&f| Datapoint::from_complex(f, raw))
        .collect()
}

fn open_line(frequencies: &[u64]) -> Vec<Datapoint> {
    frequencies
        .iter()
        .map(|&f| {
            let phase = -2.0 * std::f64::consts::TAU * f as f64 * 20e-9;
            Datapoint::from_complex(f, Complex64::from_polar(0.9, phase))
        })
        .collect()
}

fn touchstone_text(points: usize) -> String {
    let mut text = String::from("! bench\n# Hz S RI R 50\n");
    for f in frequencies(points) {
        text.push_str(&format!("{} 0.1 -0.2 0.7 0.3 0 0 0 0\n", f));
    }
    text
}

fn bench_frequency_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("frequency_text");
    for text in ["2.4GHz", "145.525 MHz", "10k", "1e9"] {
        group.bench_with_input(BenchmarkId::new("parse", text), &text, |b, text| {
            b.iter(|| black_box(parse_frequency(black_box(text))))
        });
    }
    group.bench_function("format", |b| {
        b.iter(|| black_box(format_frequency(black_box(2_412_345_678))))
    });
    group.finish();
}

fn bench_touchstone(c: &mut Criterion) {
    let mut group = c.benchmark_group("touchstone");
    for points in [101, 1001, 10001] {
        let text = touchstone_text(points);
        group.throughput(Throughput::Elements(points as u64));
        group.bench_with_input(BenchmarkId::new("parse", points), &text, |b, text| {
            b.iter(|| black_box(Touchstone::from_reader(Cursor::new(black_box(text.as_bytes())))))
        });
    }
    group.finish();
}

fn bench_calibration(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibration");
    group.measurement_time(Duration::from_secs(10));
    for points in [101, 1001] {
        let grid = frequencies(points);
        let set = CalibrationSet::new()
            .with(CalibrationStandard::new(CalibrationRole::Short, measured(&grid, c64(-1.0, 0.0)), vec![]))
            .with(CalibrationStandard::new(CalibrationRole::Open, measured(&grid, c64(1.0, 0.0)), vec![]))
            .with(CalibrationStandard::new(CalibrationRole::Load, measured(&grid, Complex64::ZERO), vec![]));
        let models = StandardModels::default();
        group.throughput(Throughput::Elements(points as u64));
        group.bench_with_input(BenchmarkId::new("derive_sol", points), &set, |b, set| {
            b.iter(|| black_box(calibration::derive_model(black_box(set), CalibrationMethod::Sol, &models)))
        });

        if let Ok(model) = calibration::derive_model(&set, CalibrationMethod::Sol, &models) {
            let raw = measured(&grid, c64(0.3, 0.2));
            group.bench_with_input(BenchmarkId::new("apply_sol", points), &raw, |b, raw| {
                b.iter(|| {
                    let corrected: Vec<_> = raw
                        .iter()
                        .map(|p| calibration::apply(&model, black_box(p)))
                        .collect();
                    black_box(corrected)
                })
            });
        }
    }
    group.finish();
}

fn bench_tdr(c: &mut Criterion) {
    let mut group = c.benchmark_group("tdr");
    let settings = TdrSettings::default();
    for points in [101, 401, 1001] {
        let s11 = open_line(&frequencies(points));
        group.bench_with_input(BenchmarkId::new("estimate", points), &s11, |b, s11| {
            b.iter(|| black_box(tdr::estimate(black_box(s11), &settings)))
        });
    }
    group.finish();
}

fn bench_averaging(c: &mut Criterion) {
    let mut group = c.benchmark_group("averaging");
    for averaging in Averaging::presets() {
        let samples = Array2::from_shape_fn((averaging.count, 101), |(r, f)| {
            c64(1.0 + 0.01 * r as f64, -0.001 * f as f64)
        });
        group.bench_with_input(
            BenchmarkId::new("reduce", format!("{}x{}", averaging.count, averaging.truncate)),
            &samples,
            |b, samples| b.iter(|| black_box(averaging.reduce(black_box(samples)))),
        );
    }
    group.finish();
}

criterion_group!(
    vna_benches,
    bench_frequency_text,
    bench_touchstone,
    bench_calibration,
    bench_tdr,
    bench_averaging,
);
criterion_main!(vna_benches);
