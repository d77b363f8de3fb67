//! Run configuration.
//!
//! A [`RecorderConfig`] is immutable once validated. It can be built in code
//! (see [`crate::builder::ConfigBuilder`]), loaded from TOML, or derived from
//! the host's raw positional parameter array via [`HostParams`].

use crate::error::{LogResult, LoggerError};
use crate::format::ValueFormat;
use crate::invariant_ppt::{assert_invariant, CONFIG_VALIDATED};
use crate::kind::ElementKind;
use crate::slot::SlotGrid;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Validated logger settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Number of input channels (port width).
    pub channels: usize,
    /// Start of the sample window.
    pub start_time: f64,
    /// End of the sample window (inclusive).
    pub end_time: f64,
    /// Spacing of the slot grid.
    pub sample_period: f64,
    /// Element kind, stored as its code `0..=8`.
    pub kind: ElementKind,
    /// Destination of the drain.
    pub output_path: PathBuf,
    /// printf-style format applied to every element.
    pub format: String,
}

impl RecorderConfig {
    /// Check every invariant of the configuration.
    ///
    /// On success returns the parsed value format, so callers parse it once.
    pub fn validate(&self) -> LogResult<ValueFormat> {
        if self.channels < 1 {
            return Err(LoggerError::config(
                "The number of channels must be greater than zero",
            ));
        }
        if !self.start_time.is_finite() || !self.end_time.is_finite() {
            return Err(LoggerError::config("[T_start T_end] must be finite"));
        }
        if self.start_time < 0.0 || self.end_time < 0.0 {
            return Err(LoggerError::config("[T_start T_end] must be non negative"));
        }
        if self.start_time >= self.end_time {
            return Err(LoggerError::config("T_end must be greater than T_start"));
        }
        if !(self.sample_period.is_finite() && self.sample_period > 0.0) {
            return Err(LoggerError::config(
                "The sampling time must be greater than zero",
            ));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(LoggerError::config("The output file name must not be empty"));
        }
        let format = ValueFormat::parse(&self.format)?;

        assert_invariant(
            CONFIG_VALIDATED,
            true,
            "Configuration validated before allocation",
            Some("validate"),
        );
        Ok(format)
    }

    /// The slot grid of the sample window.
    pub fn grid(&self) -> SlotGrid {
        SlotGrid::new(self.start_time, self.end_time, self.sample_period)
    }

    /// Number of buffer rows.
    pub fn slot_count(&self) -> usize {
        self.grid().slot_count()
    }

    /// Parse and validate a TOML document.
    ///
    /// ```toml
    /// channels = 2
    /// start_time = 0.0
    /// end_time = 1.0
    /// sample_period = 0.5
    /// kind = 0
    /// output_path = "out.dat"
    /// format = "%f "
    /// ```
    pub fn from_toml_str(text: &str) -> LogResult<Self> {
        let config: RecorderConfig = toml::from_str(text)
            .map_err(|e| LoggerError::config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> LogResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoggerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading recorder configuration");
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> LogResult<String> {
        toml::to_string(self)
            .map_err(|e| LoggerError::config(format!("Cannot serialize configuration: {}", e)))
    }
}

/// One raw host parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Dense real array.
    Real(Vec<f64>),
    /// Complex array, as (re, im) pairs.
    Complex(Vec<(f64, f64)>),
    /// Sparse real array, stored densely.
    Sparse(Vec<f64>),
    /// Character array.
    Text(String),
}

impl ParamValue {
    /// Real scalar shorthand.
    pub fn scalar(v: f64) -> Self {
        ParamValue::Real(vec![v])
    }

    /// Real array shorthand.
    pub fn vector(values: &[f64]) -> Self {
        ParamValue::Real(values.to_vec())
    }

    /// Text shorthand.
    pub fn text(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }

    fn real_finite(&self) -> LogResult<&[f64]> {
        match self {
            ParamValue::Real(values)
                if !values.is_empty() && values.iter().all(|v| v.is_finite()) =>
            {
                Ok(values.as_slice())
            }
            _ => Err(LoggerError::config("Parameters must be real finite vectors")),
        }
    }

    fn real_scalar(&self) -> LogResult<f64> {
        match self.real_finite()? {
            [v] => Ok(*v),
            _ => Err(LoggerError::config("The parameter must be a scalar")),
        }
    }

    fn string(&self, what: &str) -> LogResult<String> {
        match self {
            ParamValue::Text(s) => Ok(s.clone()),
            _ => Err(LoggerError::config(format!("The {} must be a string", what))),
        }
    }
}

/// The host's positional parameter array, in declaration order:
/// channel count, `[T_start T_end]`, sampling time, file name, format
/// string, input type code.
#[derive(Debug, Clone, PartialEq)]
pub struct HostParams {
    values: Vec<ParamValue>,
}

/// Number of parameters the block declares.
pub const PARAM_COUNT: usize = 6;

impl HostParams {
    pub fn new(values: Vec<ParamValue>) -> Self {
        Self { values }
    }

    /// Parameters for a typical run.
    pub fn standard(
        channels: usize,
        window: [f64; 2],
        sample_period: f64,
        output_path: &str,
        format: &str,
        kind_code: u8,
    ) -> Self {
        Self::new(vec![
            ParamValue::scalar(channels as f64),
            ParamValue::vector(&window),
            ParamValue::scalar(sample_period),
            ParamValue::text(output_path),
            ParamValue::text(format),
            ParamValue::scalar(kind_code as f64),
        ])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Apply the block's parameter checks and produce a validated config.
    pub fn validate(&self) -> LogResult<RecorderConfig> {
        if self.values.len() != PARAM_COUNT {
            return Err(LoggerError::config(format!(
                "Expected {} parameters, got {}",
                PARAM_COUNT,
                self.values.len()
            )));
        }
        // The numeric parameters must all be real finite arrays before any
        // individual check runs.
        for idx in [0, 1, 2, 5] {
            self.values[idx].real_finite()?;
        }

        let channels = self.values[0].real_scalar()?;
        if channels < 1.0 {
            return Err(LoggerError::config(
                "The number of channels must be greater than zero",
            ));
        }
        if channels.fract() != 0.0 {
            return Err(LoggerError::config("The number of channels must be an integer"));
        }

        let window = self.values[1].real_finite()?;
        let [start_time, end_time] = match window {
            [a, b] => [*a, *b],
            _ => {
                return Err(LoggerError::config(
                    "[T_start T_end] must be a two element vector",
                ))
            }
        };

        let sample_period = self.values[2].real_scalar()?;
        let output_path = self.values[3].string("file name")?;
        let format = self.values[4].string("format string")?;

        let code = self.values[5].real_scalar()?;
        if code.fract() != 0.0 || !(0.0..=8.0).contains(&code) {
            return Err(LoggerError::config(
                "The input type must be an integer between 0 and 8",
            ));
        }
        let kind = ElementKind::from_code(code as u8)?;

        let config = RecorderConfig {
            channels: channels as usize,
            start_time,
            end_time,
            sample_period,
            kind,
            output_path: PathBuf::from(output_path),
            format,
        };
        config.validate()?;
        Ok(config)
    }
}
