use float_cmp::{approx_eq, F64Margin};
use num::complex::{c64, Complex64};
use std::f64::consts::TAU;
use vnakit::datapoint::Datapoint;
use vnakit::derived::{self, Vswr};
use vnakit::error::ParseError;
use vnakit::frequency::{format, format_frequency, parse, SweepRange};
use vnakit::tdr::{self, TdrSettings};

#[test]
fn test_parse_and_format() {
    assert_eq!(parse("12.345kHz").unwrap(), 12345);
    assert_eq!(format(12345, 3), "12.345kHz");
    assert_eq!(parse("123kHz").unwrap(), 123000);
    assert_eq!(parse("123KHz").unwrap(), 123000);
    assert_eq!(parse("123e-3").unwrap(), 0);
    assert_eq!(parse("100000e-5").unwrap(), 1);
    assert_eq!(parse("123aHz").unwrap(), 0);
}

#[test]
fn test_malformed_numbers() {
    for text in ["123..Hz", "123...Hz", "1.23.Hz"] {
        assert!(
            matches!(parse(text), Err(ParseError::MalformedNumber(_))),
            "{}",
            text
        );
    }
    assert!(matches!(parse("123xHz"), Err(ParseError::UnknownUnit(_))));
}

#[test]
fn test_canonical_round_trip() {
    for hz in [1u64, 999, 1_000, 12_000, 145_000_000, 1_000_000_000] {
        assert_eq!(parse(&format_frequency(hz)).unwrap(), hz, "{}", hz);
    }
    let range = SweepRange::parse("1MHz", "30MHz").unwrap();
    assert_eq!(range.span(), 29_000_000);
    assert!(SweepRange::parse("30MHz", "1MHz").is_err());
}

#[test]
fn test_vswr_infinite_at_total_reflection() {
    assert_eq!(derived::vswr(c64(1.0, 0.0)), Vswr::Infinite);
    assert_eq!(Datapoint::new(1, -1.0, 0.0).vswr(), Vswr::Infinite);
    assert!(!derived::vswr(c64(0.999, 0.0)).is_infinite());
}

#[test]
fn test_group_delay_of_delay_line() {
    let delay = 3e-9;
    let points: Vec<Datapoint> = (0..51u64)
        .map(|i| {
            let f = 1_000_000 + i * 1_000_000;
            Datapoint::from_complex(f, Complex64::from_polar(0.8, -TAU * f as f64 * delay))
        })
        .collect();
    let margin = F64Margin {
        epsilon: 1e-15,
        ulps: 4,
    };
    for idx in 1..50 {
        let gd = derived::group_delay(&points, idx).unwrap();
        assert!(approx_eq!(f64, gd, delay, margin), "{} {}", idx, gd);
    }
    assert_eq!(derived::group_delay(&points, 0), None);
}

#[test]
fn test_tdr_open_cable() {
    let settings = TdrSettings::default();
    let length = 4.0;
    let delay = 2.0 * length / (settings.velocity_factor * vnakit::consts::SPEED_OF_LIGHT);
    let s11: Vec<Datapoint> = (0..401u64)
        .map(|i| {
            let f = 50_000 + i * 2_000_000;
            Datapoint::from_complex(f, Complex64::from_polar(1.0, -TAU * f as f64 * delay))
        })
        .collect();
    let result = tdr::estimate(&s11, &settings).unwrap();
    assert!((result.cable_length - length).abs() < 0.05, "{}", result.cable_length);
}
