//! Builder API for recorder configurations.

use crate::config::RecorderConfig;
use crate::error::{LogResult, LoggerError};
use crate::kind::ElementKind;
use std::path::PathBuf;

/// Fluent builder for a [`RecorderConfig`].
///
/// Unset fields default to one `double` channel over `[0, 1]` sampled every
/// `0.1`, formatted with `"%f "`. The output path has no default.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    channels: usize,
    window: (f64, f64),
    sample_period: f64,
    kind: ElementKind,
    output_path: Option<PathBuf>,
    format: String,
}

impl ConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            channels: 1,
            window: (0.0, 1.0),
            sample_period: 0.1,
            kind: ElementKind::Double,
            output_path: None,
            format: "%f ".to_string(),
        }
    }

    pub fn channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    /// Set the inclusive sample window.
    pub fn window(mut self, start_time: f64, end_time: f64) -> Self {
        self.window = (start_time, end_time);
        self
    }

    pub fn sample_period(mut self, sample_period: f64) -> Self {
        self.sample_period = sample_period;
        self
    }

    pub fn kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the kind from its configuration code.
    pub fn kind_code(mut self, code: u8) -> LogResult<Self> {
        self.kind = ElementKind::from_code(code)?;
        Ok(self)
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn format(mut self, format: &str) -> Self {
        self.format = format.to_string();
        self
    }

    /// Validate and build.
    pub fn build(self) -> LogResult<RecorderConfig> {
        let output_path = self
            .output_path
            .ok_or_else(|| LoggerError::config("An output file name is required"))?;
        let config = RecorderConfig {
            channels: self.channels,
            start_time: self.window.0,
            end_time: self.window.1,
            sample_period: self.sample_period,
            kind: self.kind,
            output_path,
            format: self.format,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
