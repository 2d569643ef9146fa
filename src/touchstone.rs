//! Reading and writing touchstone (`.s1p`, `.s2p`) files.

mod options;

pub use self::options::{DataFormat, FrequencyUnit, Options};

use crate::datapoint::Datapoint;
use crate::error::FormatError;
use num::complex::Complex64;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Option line used when writing a file
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum WriteMode {
    /// `# Hz S RI R <resistance>` with integer Hz rows
    #[default]
    Normalized,
    /// The options the file was loaded with
    Preserve,
}

/// Contents of a touchstone file. Rows are kept in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct Touchstone {
    filename: String,
    comments: Vec<String>,
    options: Options,
    nports: usize,
    // s11, s21, s12, s22
    sdata: [Vec<Datapoint>; 4],
}

impl Default for Touchstone {
    fn default() -> Self {
        Touchstone {
            filename: String::new(),
            comments: vec![],
            options: Options::default(),
            nports: 1,
            sdata: Default::default(),
        }
    }
}

impl Touchstone {
    pub fn new(filename: &str) -> Self {
        Touchstone {
            filename: filename.to_string(),
            ..Default::default()
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Touchstone, FormatError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut ts = Touchstone::from_reader(BufReader::new(file))?;
        ts.filename = path.display().to_string();
        info!(
            path = %path.display(),
            nports = ts.nports,
            points = ts.s11().len(),
            "loaded touchstone file"
        );
        Ok(ts)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Touchstone, FormatError> {
        let mut ts = Touchstone::default();
        let mut seen_options = false;
        let mut seen_data = false;
        let mut width: Option<usize> = None;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let lineno = idx + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('!') {
                ts.comments.push(line.to_string());
                continue;
            }
            if line.starts_with('#') {
                if seen_options || seen_data {
                    return Err(FormatError::IllegalOptionLine(line.to_string()));
                }
                ts.options.parse(line)?;
                seen_options = true;
                debug!(options = %ts.options, "option line");
                continue;
            }
            seen_data = true;

            let data = line.split('!').next().unwrap_or_default();
            let values = data
                .split_whitespace()
                .map(|token| match f64::from_str(token) {
                    Ok(v) if v.is_finite() => Ok(v),
                    _ => Err(FormatError::InvalidNumber {
                        line: lineno,
                        token: token.to_string(),
                    }),
                })
                .collect::<Result<Vec<f64>, FormatError>>()?;

            let expected = match width {
                Some(w) => w,
                None if values.len() == 3 || values.len() == 9 => {
                    width = Some(values.len());
                    values.len()
                }
                None => {
                    return Err(FormatError::RowArityMismatch {
                        line: lineno,
                        expected: if values.len() < 6 { 3 } else { 9 },
                        found: values.len(),
                    })
                }
            };
            if values.len() != expected {
                return Err(FormatError::RowArityMismatch {
                    line: lineno,
                    expected,
                    found: values.len(),
                });
            }

            let hz = (values[0] * ts.options.factor()).round();
            if !(0.0..=u64::MAX as f64).contains(&hz) {
                return Err(FormatError::InvalidNumber {
                    line: lineno,
                    token: data.split_whitespace().next().unwrap_or_default().to_string(),
                });
            }
            let frequency = hz as u64;
            for (k, pair) in values[1..].chunks_exact(2).enumerate() {
                let z = ts.options.format.parse(pair[0], pair[1]);
                ts.sdata[k].push(Datapoint::from_complex(frequency, z));
            }
        }
        ts.nports = if width == Some(9) { 2 } else { 1 };
        Ok(ts)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn add_comment(&mut self, comment: &str) {
        if comment.starts_with('!') {
            self.comments.push(comment.to_string());
        } else {
            self.comments.push(format!("! {}", comment));
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    pub fn nports(&self) -> usize {
        self.nports
    }

    pub fn s11(&self) -> &[Datapoint] {
        &self.sdata[0]
    }

    pub fn s21(&self) -> &[Datapoint] {
        &self.sdata[1]
    }

    pub fn s12(&self) -> &[Datapoint] {
        &self.sdata[2]
    }

    pub fn s22(&self) -> &[Datapoint] {
        &self.sdata[3]
    }

    /// Replace the data with a reflection and optional transmission sweep
    pub fn set_data(&mut self, s11: Vec<Datapoint>, s21: Vec<Datapoint>) {
        self.nports = if s21.is_empty() { 1 } else { 2 };
        self.sdata = [s11, s21, vec![], vec![]];
    }

    pub fn set_two_port(
        &mut self,
        s11: Vec<Datapoint>,
        s21: Vec<Datapoint>,
        s12: Vec<Datapoint>,
        s22: Vec<Datapoint>,
    ) {
        self.nports = 2;
        self.sdata = [s11, s21, s12, s22];
    }

    /// Write the file with `nports` ports. Comments come first, then the
    /// option line, then one row per strictly increasing frequency. Two port
    /// columns without data are written as zero.
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        nports: usize,
        mode: WriteMode,
    ) -> Result<(), FormatError> {
        let options = match mode {
            WriteMode::Normalized => Options::normalized(self.options.resistance),
            WriteMode::Preserve => self.options,
        };
        for comment in &self.comments {
            writeln!(writer, "{}", comment)?;
        }
        match mode {
            WriteMode::Normalized => writeln!(writer, "# Hz S RI R {}", options.resistance)?,
            WriteMode::Preserve => writeln!(writer, "{}", options)?,
        }

        let columns = if nports >= 2 { 4 } else { 1 };
        let mut last: Option<u64> = None;
        for (i, point) in self.s11().iter().enumerate() {
            if last.is_some_and(|f| point.frequency <= f) {
                continue;
            }
            last = Some(point.frequency);

            match mode {
                WriteMode::Normalized => write!(writer, "{}", point.frequency)?,
                WriteMode::Preserve => {
                    write!(writer, "{}", point.frequency as f64 / options.factor())?
                }
            }
            for k in 0..columns {
                let z = self.sdata[k].get(i).map_or(Complex64::ZERO, |p| p.z());
                let (x, y) = options.format.render(z);
                write!(writer, " {} {}", x, y)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(
        &self,
        path: P,
        nports: usize,
        mode: WriteMode,
    ) -> Result<(), FormatError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, nports, mode)?;
        writer.flush()?;
        info!(path = %path.display(), nports, points = self.s11().len(), "saved touchstone file");
        Ok(())
    }

    pub fn to_string_with(&self, nports: usize, mode: WriteMode) -> Result<String, FormatError> {
        let mut buf: Vec<u8> = vec![];
        self.write_to(&mut buf, nports, mode)?;
        String::from_utf8(buf).map_err(|err| FormatError::Io(err.to_string()))
    }
}

impl FromStr for Touchstone {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Touchstone::from_reader(s.as_bytes())
    }
}

/// Write a reflection sweep as a normalized one port file
pub fn export_s1p<P: AsRef<Path>>(
    path: P,
    s11: &[Datapoint],
    resistance: f64,
) -> Result<(), FormatError> {
    let mut ts = Touchstone::new("");
    ts.set_options(Options::normalized(resistance));
    ts.set_data(s11.to_vec(), vec![]);
    ts.save(path, 1, WriteMode::Normalized)
}

/// Write a reflection and transmission sweep as a normalized two port file
pub fn export_s2p<P: AsRef<Path>>(
    path: P,
    s11: &[Datapoint],
    s21: &[Datapoint],
    resistance: f64,
) -> Result<(), FormatError> {
    let mut ts = Touchstone::new("");
    ts.set_options(Options::normalized(resistance));
    ts.set_data(s11.to_vec(), s21.to_vec());
    ts.save(path, 2, WriteMode::Normalized)
}
