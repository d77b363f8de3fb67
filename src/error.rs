//! Error types for the logger.
//!
//! `LoggerError` covers the stages a run passes through: setup
//! (`Configuration`), start (`Allocation`), per-step capture (`Dispatch`,
//! `InputWidth`) and drain (`Io`). `Lifecycle` flags host callbacks made out
//! of order. Everything except `Io` aborts the run; an `Io` error only loses
//! the persisted artifact.

use crate::kind::ElementKind;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias for results using the logger error type.
pub type LogResult<T> = std::result::Result<T, LoggerError>;

#[derive(Error, Debug)]
pub enum LoggerError {
    /// A setup parameter is missing, malformed or out of range.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The sample buffer could not be reserved.
    #[error("Could not allocate memory for {elements} {kind} elements")]
    Allocation {
        elements: usize,
        kind: ElementKind,
    },

    /// A value of the wrong element kind reached the buffer.
    #[error("Input port type unrecognized: expected {expected}, got {found}")]
    Dispatch {
        expected: ElementKind,
        found: ElementKind,
    },

    /// The host delivered a vector whose width differs from the channel count.
    #[error("Input width mismatch: expected {expected} channels, got {found}")]
    InputWidth { expected: usize, found: usize },

    /// The output file could not be opened or written.
    #[error("Could not write the data file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A host callback arrived out of order.
    #[error("Lifecycle error: {0}")]
    Lifecycle(&'static str),
}

impl LoggerError {
    /// Shorthand for a configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        LoggerError::Configuration(message.into())
    }

    /// Returns true if the host must abort the run on this error.
    ///
    /// Only drain-time I/O failures are survivable: the simulation result
    /// stands, the logged data is lost.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LoggerError::Io { .. })
    }
}
