//! Recorder: per-step capture of one sample vector into its slot.

// IMPORTANT: Do not call assert_invariant, tracing or anything that allocates
// in `record`/`record_frame`. They run inside the host's step budget.

use crate::buffer::SampleBuffer;
use crate::config::RecorderConfig;
use crate::drain::{drain, drain_to, DrainReport};
use crate::error::{LogResult, LoggerError};
use crate::format::ValueFormat;
use crate::kind::{Element, ElementKind};
use crate::slot::SlotGrid;
use std::io::Write;

/// One step's worth of port values, borrowed from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFrame<'a> {
    Double(&'a [f64]),
    Single(&'a [f32]),
    Int8(&'a [i8]),
    Uint8(&'a [u8]),
    Int16(&'a [i16]),
    Uint16(&'a [u16]),
    Int32(&'a [i32]),
    Uint32(&'a [u32]),
    Boolean(&'a [bool]),
}

impl InputFrame<'_> {
    /// Element kind carried by the frame.
    pub fn kind(&self) -> ElementKind {
        match self {
            InputFrame::Double(_) => ElementKind::Double,
            InputFrame::Single(_) => ElementKind::Single,
            InputFrame::Int8(_) => ElementKind::Int8,
            InputFrame::Uint8(_) => ElementKind::Uint8,
            InputFrame::Int16(_) => ElementKind::Int16,
            InputFrame::Uint16(_) => ElementKind::Uint16,
            InputFrame::Int32(_) => ElementKind::Int32,
            InputFrame::Uint32(_) => ElementKind::Uint32,
            InputFrame::Boolean(_) => ElementKind::Boolean,
        }
    }

    /// Number of channel values.
    pub fn len(&self) -> usize {
        match self {
            InputFrame::Double(v) => v.len(),
            InputFrame::Single(v) => v.len(),
            InputFrame::Int8(v) => v.len(),
            InputFrame::Uint8(v) => v.len(),
            InputFrame::Int16(v) => v.len(),
            InputFrame::Uint16(v) => v.len(),
            InputFrame::Int32(v) => v.len(),
            InputFrame::Uint32(v) => v.len(),
            InputFrame::Boolean(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! frame_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a [$ty]> for InputFrame<'a> {
                fn from(values: &'a [$ty]) -> Self {
                    InputFrame::$variant(values)
                }
            }
        )*
    };
}

frame_from!(
    f64 => Double,
    f32 => Single,
    i8 => Int8,
    u8 => Uint8,
    i16 => Int16,
    u16 => Uint16,
    i32 => Int32,
    u32 => Uint32,
    bool => Boolean,
);

/// Owns the run's buffer between start and drain.
#[derive(Debug)]
pub struct Recorder {
    config: RecorderConfig,
    grid: SlotGrid,
    format: ValueFormat,
    buffer: SampleBuffer,
}

impl Recorder {
    /// Validate `config` and allocate the zeroed buffer.
    ///
    /// Nothing is allocated if validation fails.
    pub fn start(config: RecorderConfig) -> LogResult<Self> {
        let format = config.validate()?;
        let grid = config.grid();
        let buffer = SampleBuffer::allocate(grid.slot_count(), config.channels, config.kind)?;
        tracing::info!(
            channels = config.channels,
            start = grid.start_time(),
            end = grid.end_time(),
            period = grid.sample_period(),
            slots = grid.slot_count(),
            path = %config.output_path.display(),
            "recorder started"
        );
        Ok(Self {
            config,
            grid,
            format,
            buffer,
        })
    }

    /// Capture one sample vector at time `t`.
    ///
    /// Returns the slot written, or `None` when `t` lies outside the sample
    /// window (the buffer is left untouched). A value type that does not match
    /// the configured kind is a [`LoggerError::Dispatch`]; a vector of the
    /// wrong width is a [`LoggerError::InputWidth`]. Both are fatal.
    #[inline]
    pub fn record<T: Element>(&mut self, t: f64, inputs: &[T]) -> LogResult<Option<usize>> {
        let slot = match self.grid.slot_of(t) {
            Some(slot) => slot,
            None => return Ok(None),
        };
        if inputs.len() != self.config.channels {
            return Err(LoggerError::InputWidth {
                expected: self.config.channels,
                found: inputs.len(),
            });
        }
        self.buffer.row_mut::<T>(slot)?.copy_from_slice(inputs);
        Ok(Some(slot))
    }

    /// Capture an untyped port frame; dispatches once on its kind.
    #[inline]
    pub fn record_frame(&mut self, t: f64, frame: InputFrame<'_>) -> LogResult<Option<usize>> {
        match frame {
            InputFrame::Double(v) => self.record(t, v),
            InputFrame::Single(v) => self.record(t, v),
            InputFrame::Int8(v) => self.record(t, v),
            InputFrame::Uint8(v) => self.record(t, v),
            InputFrame::Int16(v) => self.record(t, v),
            InputFrame::Uint16(v) => self.record(t, v),
            InputFrame::Int32(v) => self.record(t, v),
            InputFrame::Uint32(v) => self.record(t, v),
            InputFrame::Boolean(v) => self.record(t, v),
        }
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn grid(&self) -> SlotGrid {
        self.grid
    }

    pub fn format(&self) -> &ValueFormat {
        &self.format
    }

    /// Read-only view of the buffer.
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// Drain the buffer to the configured output path, then release it.
    pub fn finish(self) -> LogResult<DrainReport> {
        drain(self.buffer, &self.config.output_path, &self.format)
    }

    /// Drain the buffer to `writer` instead of the configured path.
    pub fn finish_to<W: Write>(self, writer: W) -> LogResult<DrainReport> {
        drain_to(self.buffer, writer, &self.format)
    }
}
