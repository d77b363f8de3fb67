//! Slot-indexed sample logger for fixed-step simulation engines.
//!
//! A run validates its configuration, allocates one zeroed buffer of
//! `slot_count × channels` elements, records each step's input vector into
//! the slot nearest its time without allocating, and drains the buffer to a
//! text file once at teardown.

pub mod block;
pub mod buffer;
pub mod builder;
pub mod config;
pub mod drain;
pub mod error;
pub mod format;
#[doc(hidden)]
pub mod harness;
#[doc(hidden)]
pub mod invariant_ppt;
pub mod kind;
pub mod recorder;
pub mod slot;

pub use block::{HostBlock, InputPortSpec, SampleTime, SaveDataBlock};
pub use buffer::SampleBuffer;
pub use builder::ConfigBuilder;
pub use config::{HostParams, ParamValue, RecorderConfig};
pub use drain::{drain, drain_to, DrainReport};
pub use error::{LogResult, LoggerError};
pub use format::ValueFormat;
pub use kind::{Element, ElementKind, Scalar};
pub use recorder::{InputFrame, Recorder};
pub use slot::{slot_count, slot_for, SlotGrid};
