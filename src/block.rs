//! Host block: the simulation engine's callback contract and the save-data
//! block that implements it.
//!
//! A host drives a block through a fixed sequence: read its port and sample
//! time declarations, call `start` once, call `output` once per scheduled
//! step, then call `terminate` exactly once.

use crate::config::{HostParams, RecorderConfig};
use crate::drain::DrainReport;
use crate::error::{LogResult, LoggerError};
use crate::invariant_ppt::{assert_invariant, BLOCK_LIFECYCLE};
use crate::kind::ElementKind;
use crate::recorder::{InputFrame, Recorder};
use std::mem;

/// Declaration of the block's single input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPortSpec {
    pub width: usize,
    pub kind: ElementKind,
    /// Port values are read in the same step they are produced.
    pub direct_feedthrough: bool,
}

/// Discrete sample time the host schedules the block at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleTime {
    pub period: f64,
    pub offset: f64,
}

/// Callbacks a simulation host invokes on a block.
pub trait HostBlock {
    fn input_port(&self) -> InputPortSpec;
    fn sample_time(&self) -> SampleTime;
    /// Called once before the first step.
    fn start(&mut self) -> LogResult<()>;
    /// Called once per scheduled step with the current port values.
    fn output(&mut self, t: f64, input: InputFrame<'_>) -> LogResult<()>;
    /// Called once at the end of the run, including after an aborted step.
    /// Returns `None` when the block never started.
    fn terminate(&mut self) -> LogResult<Option<DrainReport>>;
}

#[derive(Debug)]
enum BlockState {
    Configured,
    Running(Recorder),
    Terminated,
}

impl BlockState {
    fn name(&self) -> &'static str {
        match self {
            BlockState::Configured => "configured",
            BlockState::Running(_) => "running",
            BlockState::Terminated => "terminated",
        }
    }
}

/// Logs its input port to a text file at the end of the run.
#[derive(Debug)]
pub struct SaveDataBlock {
    config: RecorderConfig,
    state: BlockState,
}

impl SaveDataBlock {
    /// Build a block from an already assembled configuration.
    pub fn new(config: RecorderConfig) -> LogResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: BlockState::Configured,
        })
    }

    /// Build a block from the host's raw parameter array.
    pub fn from_params(params: &HostParams) -> LogResult<Self> {
        Self::new(params.validate()?)
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// The live recorder, between `start` and `terminate`.
    pub fn recorder(&self) -> Option<&Recorder> {
        match &self.state {
            BlockState::Running(rec) => Some(rec),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, BlockState::Running(_))
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, BlockState::Terminated)
    }
}

impl HostBlock for SaveDataBlock {
    fn input_port(&self) -> InputPortSpec {
        InputPortSpec {
            width: self.config.channels,
            kind: self.config.kind,
            direct_feedthrough: true,
        }
    }

    fn sample_time(&self) -> SampleTime {
        SampleTime {
            period: self.config.sample_period,
            offset: 0.0,
        }
    }

    fn start(&mut self) -> LogResult<()> {
        match self.state {
            BlockState::Configured => {
                let rec = Recorder::start(self.config.clone())?;
                let port = self.input_port();
                assert_invariant(
                    BLOCK_LIFECYCLE,
                    rec.buffer().channels() == port.width && rec.buffer().kind() == port.kind,
                    "Started buffer matches the declared input port",
                    Some("SaveDataBlock::start"),
                );
                self.state = BlockState::Running(rec);
                tracing::debug!(state = self.state.name(), "block started");
                Ok(())
            }
            _ => Err(LoggerError::Lifecycle("start called on a block that already started")),
        }
    }

    #[inline]
    fn output(&mut self, t: f64, input: InputFrame<'_>) -> LogResult<()> {
        match &mut self.state {
            BlockState::Running(rec) => rec.record_frame(t, input).map(|_| ()),
            _ => Err(LoggerError::Lifecycle("output called outside a running block")),
        }
    }

    fn terminate(&mut self) -> LogResult<Option<DrainReport>> {
        let previous = mem::replace(&mut self.state, BlockState::Terminated);
        tracing::debug!(from = previous.name(), "block terminating");
        match previous {
            BlockState::Running(rec) => {
                let drained = rec.finish();
                if let Ok(report) = &drained {
                    assert_invariant(
                        BLOCK_LIFECYCLE,
                        report.rows == self.config.slot_count()
                            && report.channels == self.config.channels,
                        "Terminate drains every configured slot and channel",
                        Some("SaveDataBlock::terminate"),
                    );
                }
                drained.map(Some)
            }
            BlockState::Configured => Ok(None),
            BlockState::Terminated => {
                Err(LoggerError::Lifecycle("terminate called more than once"))
            }
        }
    }
}
