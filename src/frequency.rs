use crate::consts::{FREQUENCY_DIGITS, FREQUENCY_SHORT_DIGITS};
use crate::error::{ConfigError, ParseError};
use crate::scale::Scale;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static FREQUENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<int>[0-9]*)(?:\.(?<frac>[0-9]*))?(?:e(?<exp>[+-]?[0-9]+))?\s*(?<unit>.*)$")
        .expect("Invalid regex!")
});

// Keeps 10^decimals * u64::MAX inside u128
const MAX_DECIMALS: usize = 18;

fn pow10(exp: u32) -> Option<u128> {
    10u128.checked_pow(exp)
}

fn digit_count(val: u128) -> usize {
    let mut n = 1;
    let mut v = val / 10;
    while v > 0 {
        n += 1;
        v /= 10;
    }
    n
}

/// Parse a frequency into integer Hz with full 128 bit precision.
///
/// Accepts plain decimals (`123`, `123.`, `.5`), an optional SI prefix and
/// an optional `Hz` suffix (`12.345kHz`, `123KHz`, `2.4 GHz`), and exponent
/// notation (`123e3`, `100000e-5`). Sub-Hz results truncate to 0, values
/// beyond `u128` saturate.
///
/// Only a lower case `e` starts an exponent. An upper case `E` is the exa
/// prefix, so `1E` is 10^18 Hz and `1E3` is an unknown unit.
pub fn parse_wide(text: &str) -> Result<u128, ParseError> {
    let trimmed = text.trim();
    let caps = FREQUENCY_RE
        .captures(trimmed)
        .ok_or_else(|| ParseError::MalformedNumber(text.to_string()))?;

    let int = caps.name("int").map_or("", |m| m.as_str());
    let frac = caps.name("frac").map_or("", |m| m.as_str());
    if int.is_empty() && frac.is_empty() {
        return Err(ParseError::MalformedNumber(text.to_string()));
    }

    let unit = caps.name("unit").map_or("", |m| m.as_str());
    if unit.starts_with('.') {
        return Err(ParseError::MalformedNumber(text.to_string()));
    }
    let prefix = if unit.to_ascii_lowercase().ends_with("hz") {
        unit[..unit.len() - 2].trim_end()
    } else {
        unit
    };
    let scale =
        Scale::from_symbol(prefix).ok_or_else(|| ParseError::UnknownUnit(text.to_string()))?;

    let exp: i64 = match caps.name("exp") {
        Some(m) => m.as_str().parse().unwrap_or(if m.as_str().starts_with('-') {
            i64::MIN / 2
        } else {
            i64::MAX / 2
        }),
        None => 0,
    };

    // Trailing fraction zeros carry no value
    let frac = frac.trim_end_matches('0');
    let mut mantissa: u128 = 0;
    // Digits past the u128 range, each one a power of ten on the exponent
    let mut dropped: i64 = 0;
    for c in int.chars().chain(frac.chars()) {
        if dropped > 0 {
            dropped += 1;
            continue;
        }
        let digit = u128::from(c.to_digit(10).unwrap_or(0));
        match mantissa.checked_mul(10).and_then(|m| m.checked_add(digit)) {
            Some(m) => mantissa = m,
            None => dropped = 1,
        }
    }
    if mantissa == 0 {
        return Ok(0);
    }

    let total_exp = exp
        .saturating_add(i64::from(scale.exponent()))
        .saturating_sub(frac.len() as i64)
        .saturating_add(dropped);
    if total_exp >= 0 {
        let factor = u32::try_from(total_exp).ok().and_then(pow10);
        Ok(factor
            .and_then(|f| mantissa.checked_mul(f))
            .unwrap_or(u128::MAX))
    } else {
        let divisor = u32::try_from(-total_exp).ok().and_then(pow10);
        Ok(divisor.map_or(0, |d| mantissa / d))
    }
}

/// Parse a frequency into integer Hz, saturating at `u64::MAX`.
///
/// ```
/// use vnakit::frequency::parse;
///
/// assert_eq!(parse("12.345kHz").unwrap(), 12345);
/// assert_eq!(parse("123KHz").unwrap(), 123000);
/// assert_eq!(parse("100000e-5").unwrap(), 1);
/// ```
pub fn parse(text: &str) -> Result<u64, ParseError> {
    parse_wide(text).map(|hz| u64::try_from(hz).unwrap_or(u64::MAX))
}

fn format_significant(hz: u64, min_digits: usize, significant: usize) -> String {
    let value = u128::from(hz);
    let scales = Scale::FREQUENCY_DISPLAY;
    let divisor_of = |scale: Scale| pow10(scale.exponent().unsigned_abs()).unwrap_or(1);

    let mut idx = scales
        .iter()
        .rposition(|s| value >= divisor_of(*s))
        .unwrap_or(0);
    let mut int_digits = digit_count(value / divisor_of(scales[idx]));
    loop {
        let scale = scales[idx];
        let divisor = divisor_of(scale);
        let decimals = min_digits
            .max(significant.saturating_sub(int_digits))
            .min(MAX_DECIMALS);
        let unit = pow10(decimals as u32).unwrap_or(1);
        let rounded = (value * unit + divisor / 2) / divisor;
        let int_part = rounded / unit;
        let digits = digit_count(int_part);
        if digits > int_digits {
            if int_part >= 1000 && idx + 1 < scales.len() {
                idx += 1;
                int_digits = digit_count(value / divisor_of(scales[idx]));
            } else {
                int_digits = digits;
            }
            continue;
        }
        let frac = rounded % unit;
        return if decimals == 0 {
            format!("{}{}Hz", int_part, scale)
        } else {
            format!("{}.{:0width$}{}Hz", int_part, frac, scale, width = decimals)
        };
    }
}

/// Format integer Hz for display using the `"", k, M, G` prefixes.
///
/// At least `min_digits` decimals are shown, and enough to give five
/// significant digits. Trailing zeros are kept.
///
/// ```
/// use vnakit::frequency::format;
///
/// assert_eq!(format(12345, 3), "12.345kHz");
/// assert_eq!(format(123456789, 2), "123.46MHz");
/// ```
pub fn format(hz: u64, min_digits: usize) -> String {
    format_significant(hz, min_digits, FREQUENCY_DIGITS)
}

pub fn format_frequency(hz: u64) -> String {
    format(hz, 2)
}

/// Compact four digit form for axis labels
pub fn format_short(hz: u64) -> String {
    format_significant(hz, 0, FREQUENCY_SHORT_DIGITS)
}

/// Extra room added around a band, as a share of its span
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub enum BandPadding {
    #[default]
    None,
    Narrow,
    Wide,
    Full,
}

impl BandPadding {
    pub fn fraction(&self) -> f64 {
        match self {
            BandPadding::None => 0.0,
            BandPadding::Narrow => 0.10,
            BandPadding::Wide => 0.25,
            BandPadding::Full => 1.0,
        }
    }
}

/// Start and stop of a sweep in Hz
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct SweepRange {
    start: u64,
    stop: u64,
}

impl SweepRange {
    pub fn from_start_stop(start: u64, stop: u64) -> Result<SweepRange, ConfigError> {
        if start >= stop {
            return Err(ConfigError::InvalidRange { start, stop });
        }
        Ok(SweepRange { start, stop })
    }

    pub fn from_center_span(center: u64, span: u64) -> Result<SweepRange, ConfigError> {
        let half = span / 2;
        let start = center
            .checked_sub(half)
            .ok_or(ConfigError::InvalidRange { start: 0, stop: center.saturating_add(half) })?;
        let stop = center
            .checked_add(span - half)
            .ok_or(ConfigError::InvalidRange { start, stop: u64::MAX })?;
        SweepRange::from_start_stop(start, stop)
    }

    /// Parse start and stop from frequency text
    pub fn parse(start: &str, stop: &str) -> Result<SweepRange, Box<dyn std::error::Error>> {
        Ok(SweepRange::from_start_stop(parse(start)?, parse(stop)?)?)
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn stop(&self) -> u64 {
        self.stop
    }

    pub fn center(&self) -> u64 {
        self.start + (self.stop - self.start) / 2
    }

    pub fn span(&self) -> u64 {
        self.stop - self.start
    }

    /// Spacing of a sweep made of `segments` overlapping segments of
    /// `points` points each
    pub fn step(&self, segments: usize, points: usize) -> f64 {
        let intervals = segments * points.saturating_sub(1);
        if intervals == 0 {
            return 0.0;
        }
        self.span() as f64 / intervals as f64
    }

    /// Widen the band by `padding` of its span, split evenly on both sides.
    /// The start never drops below 1 Hz.
    pub fn padded(&self, padding: BandPadding) -> SweepRange {
        let pad = (self.span() as f64 * padding.fraction() / 2.0).round() as u64;
        SweepRange {
            start: self.start.saturating_sub(pad).max(1),
            stop: self.stop.saturating_add(pad),
        }
    }
}
