//! Fixed-step host harness: drives a [`HostBlock`] the way a simulation
//! engine would.

use crate::block::{HostBlock, InputPortSpec};
use crate::buffer::Store;
use crate::drain::DrainReport;
use crate::error::{LogResult, LoggerError};
use crate::kind::Element;
use crate::recorder::InputFrame;

/// Preallocated port storage the host refills before every step.
#[derive(Debug, Clone, PartialEq)]
pub struct PortValues {
    store: Store,
}

impl PortValues {
    /// Zeroed storage matching a port declaration.
    pub fn zeroed(port: &InputPortSpec) -> LogResult<Self> {
        let store = Store::zeroed(port.kind, port.width).map_err(|_| LoggerError::Allocation {
            elements: port.width,
            kind: port.kind,
        })?;
        Ok(Self { store })
    }

    /// Mutable access to the values, if `T` is the port's element type.
    pub fn values_mut<T: Element>(&mut self) -> Option<&mut [T]> {
        T::cells_mut(&mut self.store)
    }

    pub fn values<T: Element>(&self) -> Option<&[T]> {
        T::cells(&self.store)
    }

    /// Borrow the current values as a step frame.
    pub fn frame(&self) -> InputFrame<'_> {
        match &self.store {
            Store::Double(v) => InputFrame::Double(v),
            Store::Single(v) => InputFrame::Single(v),
            Store::Int8(v) => InputFrame::Int8(v),
            Store::Uint8(v) => InputFrame::Uint8(v),
            Store::Int16(v) => InputFrame::Int16(v),
            Store::Uint16(v) => InputFrame::Uint16(v),
            Store::Int32(v) => InputFrame::Int32(v),
            Store::Uint32(v) => InputFrame::Uint32(v),
            Store::Boolean(v) => InputFrame::Boolean(v),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Steps delivered to the block.
    pub steps: usize,
    /// Drain result reported by `terminate`.
    pub drain: Option<DrainReport>,
}

/// Schedules a block at its sample time from `t = offset` up to a stop time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStepHost {
    stop_time: f64,
}

impl FixedStepHost {
    pub fn new(stop_time: f64) -> Self {
        Self { stop_time }
    }

    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    /// Run `block` to the stop time, filling its port through `source`.
    ///
    /// A failing step aborts the run: `terminate` is still called and the
    /// step's error is returned.
    pub fn run<B, F>(&self, block: &mut B, mut source: F) -> LogResult<RunSummary>
    where
        B: HostBlock,
        F: FnMut(f64, &mut PortValues),
    {
        let port = block.input_port();
        let sample = block.sample_time();
        if sample.period <= 0.0 || !sample.period.is_finite() {
            return Err(LoggerError::config("The sampling time must be greater than zero"));
        }
        if !self.stop_time.is_finite() {
            return Err(LoggerError::config("The stop time must be finite"));
        }
        let mut values = PortValues::zeroed(&port)?;

        block.start()?;
        tracing::debug!(
            period = sample.period,
            offset = sample.offset,
            stop = self.stop_time,
            "host run started"
        );

        // Absorbs accumulated rounding in `k * period` near the stop time.
        let limit = self.stop_time + sample.period * 1e-9;
        let mut steps = 0;
        loop {
            let t = sample.offset + steps as f64 * sample.period;
            if t > limit {
                break;
            }
            source(t, &mut values);
            if let Err(err) = block.output(t, values.frame()) {
                tracing::error!(time = t, error = %err, "step failed, aborting run");
                if let Err(term_err) = block.terminate() {
                    tracing::warn!(error = %term_err, "terminate after abort failed");
                }
                return Err(err);
            }
            steps += 1;
        }

        let drain = block.terminate()?;
        tracing::debug!(steps, "host run finished");
        Ok(RunSummary { steps, drain })
    }
}
