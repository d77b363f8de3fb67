//! Sample buffer: one flat, row-major, zero-initialized store per run.
//!
//! The buffer holds `slot_count × channels` elements of a single
//! [`ElementKind`]. It is allocated once before the first step, written in
//! place by the recorder and consumed by the drain, which releases it.

use crate::error::{LogResult, LoggerError};
use crate::invariant_ppt::{assert_invariant, BUFFER_RELEASED, BUFFER_SIZED, BUFFER_ZEROED};
use crate::kind::{Element, ElementKind, Scalar};
use std::collections::TryReserveError;

/// Typed backing storage, one variant per element kind.
#[doc(hidden)]
#[derive(Debug, Clone, PartialEq)]
pub enum Store {
    Double(Vec<f64>),
    Single(Vec<f32>),
    Int8(Vec<i8>),
    Uint8(Vec<u8>),
    Int16(Vec<i16>),
    Uint16(Vec<u16>),
    Int32(Vec<i32>),
    Uint32(Vec<u32>),
    Boolean(Vec<bool>),
}

macro_rules! match_store {
    ($store:expr, $cells:ident => $body:expr) => {
        match $store {
            Store::Double($cells) => $body,
            Store::Single($cells) => $body,
            Store::Int8($cells) => $body,
            Store::Uint8($cells) => $body,
            Store::Int16($cells) => $body,
            Store::Uint16($cells) => $body,
            Store::Int32($cells) => $body,
            Store::Uint32($cells) => $body,
            Store::Boolean($cells) => $body,
        }
    };
}

fn zeroed<T: Element>(len: usize) -> Result<Vec<T>, TryReserveError> {
    let mut cells = Vec::new();
    cells.try_reserve_exact(len)?;
    cells.resize(len, T::default());
    Ok(cells)
}

impl Store {
    pub(crate) fn zeroed(kind: ElementKind, len: usize) -> Result<Self, TryReserveError> {
        Ok(match kind {
            ElementKind::Double => Store::Double(zeroed(len)?),
            ElementKind::Single => Store::Single(zeroed(len)?),
            ElementKind::Int8 => Store::Int8(zeroed(len)?),
            ElementKind::Uint8 => Store::Uint8(zeroed(len)?),
            ElementKind::Int16 => Store::Int16(zeroed(len)?),
            ElementKind::Uint16 => Store::Uint16(zeroed(len)?),
            ElementKind::Int32 => Store::Int32(zeroed(len)?),
            ElementKind::Uint32 => Store::Uint32(zeroed(len)?),
            ElementKind::Boolean => Store::Boolean(zeroed(len)?),
        })
    }

    pub(crate) fn kind(&self) -> ElementKind {
        match self {
            Store::Double(_) => ElementKind::Double,
            Store::Single(_) => ElementKind::Single,
            Store::Int8(_) => ElementKind::Int8,
            Store::Uint8(_) => ElementKind::Uint8,
            Store::Int16(_) => ElementKind::Int16,
            Store::Uint16(_) => ElementKind::Uint16,
            Store::Int32(_) => ElementKind::Int32,
            Store::Uint32(_) => ElementKind::Uint32,
            Store::Boolean(_) => ElementKind::Boolean,
        }
    }

    fn len(&self) -> usize {
        match_store!(self, cells => cells.len())
    }

    fn is_zeroed(&self) -> bool {
        match_store!(self, cells => cells.iter().all(|c| *c == Default::default()))
    }

    fn row(&self, start: usize, end: usize) -> Row<'_> {
        match self {
            Store::Double(c) => Row::Double(&c[start..end]),
            Store::Single(c) => Row::Single(&c[start..end]),
            Store::Int8(c) => Row::Int8(&c[start..end]),
            Store::Uint8(c) => Row::Uint8(&c[start..end]),
            Store::Int16(c) => Row::Int16(&c[start..end]),
            Store::Uint16(c) => Row::Uint16(&c[start..end]),
            Store::Int32(c) => Row::Int32(&c[start..end]),
            Store::Uint32(c) => Row::Uint32(&c[start..end]),
            Store::Boolean(c) => Row::Boolean(&c[start..end]),
        }
    }
}

/// The run's sample buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    store: Store,
    slots: usize,
    channels: usize,
}

impl SampleBuffer {
    /// Allocate `slot_count × channels` zeroed elements of `kind`.
    ///
    /// Fails with [`LoggerError::Allocation`] if the element count overflows
    /// or the memory cannot be reserved.
    pub fn allocate(slot_count: usize, channels: usize, kind: ElementKind) -> LogResult<Self> {
        if slot_count == 0 || channels == 0 {
            return Err(LoggerError::config(
                "Buffer dimensions must be greater than zero",
            ));
        }
        let elements = slot_count
            .checked_mul(channels)
            .ok_or(LoggerError::Allocation {
                elements: usize::MAX,
                kind,
            })?;
        let store =
            Store::zeroed(kind, elements).map_err(|_| LoggerError::Allocation { elements, kind })?;

        assert_invariant(
            BUFFER_SIZED,
            store.len() == elements,
            "Buffer holds slot_count * channels elements",
            Some("allocate"),
        );
        assert_invariant(
            BUFFER_ZEROED,
            store.is_zeroed(),
            "Buffer is zeroed before the first step",
            Some("allocate"),
        );
        tracing::info!(
            slots = slot_count,
            channels,
            kind = %kind,
            bytes = elements * kind.width(),
            "sample buffer allocated"
        );

        Ok(Self {
            store,
            slots: slot_count,
            channels,
        })
    }

    /// Number of rows (time slots).
    pub fn slot_count(&self) -> usize {
        self.slots
    }

    /// Number of columns (channels).
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Element kind of every cell.
    pub fn kind(&self) -> ElementKind {
        self.store.kind()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Always false for an allocated buffer.
    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Size of the store in bytes.
    pub fn byte_len(&self) -> usize {
        self.len() * self.kind().width()
    }

    /// True if every cell still holds its zero value.
    pub fn is_zeroed(&self) -> bool {
        self.store.is_zeroed()
    }

    /// Typed view of the whole store, or `None` if `T` is the wrong kind.
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::cells(&self.store)
    }

    /// Mutable typed view of one row.
    ///
    /// The slot index is not validated beyond a debug assertion; callers
    /// derive it from the slot grid.
    #[inline]
    pub fn row_mut<T: Element>(&mut self, slot: usize) -> LogResult<&mut [T]> {
        debug_assert!(slot < self.slots, "slot {} out of {}", slot, self.slots);
        let channels = self.channels;
        let configured = self.store.kind();
        let cells = T::cells_mut(&mut self.store).ok_or_else(|| LoggerError::Dispatch {
            expected: configured,
            found: T::KIND,
        })?;
        let start = slot * channels;
        Ok(&mut cells[start..start + channels])
    }

    /// Write one element at (`slot`, `channel`).
    ///
    /// Indices are checked by debug assertions only.
    #[inline]
    pub fn write_cell<T: Element>(
        &mut self,
        slot: usize,
        channel: usize,
        value: T,
    ) -> LogResult<()> {
        debug_assert!(
            channel < self.channels,
            "channel {} out of {}",
            channel,
            self.channels
        );
        self.row_mut::<T>(slot)?[channel] = value;
        Ok(())
    }

    /// Read one element back, or `None` for the wrong kind or a bad index.
    pub fn get<T: Element>(&self, slot: usize, channel: usize) -> Option<T> {
        if slot >= self.slots || channel >= self.channels {
            return None;
        }
        T::cells(&self.store).map(|cells| cells[slot * self.channels + channel])
    }

    /// Read one element back, widened for formatting.
    pub fn cell(&self, slot: usize, channel: usize) -> Option<Scalar> {
        if slot >= self.slots || channel >= self.channels {
            return None;
        }
        Some(self.row(slot).scalar(channel))
    }

    /// One row as a typed view.
    pub fn row(&self, slot: usize) -> Row<'_> {
        let start = slot * self.channels;
        self.store.row(start, start + self.channels)
    }

    /// Rows in slot order `0..slot_count`.
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            buffer: self,
            next: 0,
        }
    }

    /// Free the storage. Consuming `self` rules out any later access.
    pub fn release(self) {
        let bytes = self.byte_len();
        let expected = self.slots * self.channels * self.kind().width();
        drop(self);
        assert_invariant(
            BUFFER_RELEASED,
            bytes == expected,
            "Released bytes match slot_count * channels * width",
            Some("release"),
        );
        tracing::debug!(bytes, "sample buffer released");
    }
}

/// A borrowed row of `channels` elements in channel order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Row<'a> {
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

impl<'a> Row<'a> {
    /// Number of elements in the row.
    pub fn len(&self) -> usize {
        match self {
            Row::Double(c) => c.len(),
            Row::Single(c) => c.len(),
            Row::Int8(c) => c.len(),
            Row::Uint8(c) => c.len(),
            Row::Int16(c) => c.len(),
            Row::Uint16(c) => c.len(),
            Row::Int32(c) => c.len(),
            Row::Uint32(c) => c.len(),
            Row::Boolean(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `channel`, widened.
    pub fn scalar(&self, channel: usize) -> Scalar {
        match self {
            Row::Double(c) => c[channel].to_scalar(),
            Row::Single(c) => c[channel].to_scalar(),
            Row::Int8(c) => c[channel].to_scalar(),
            Row::Uint8(c) => c[channel].to_scalar(),
            Row::Int16(c) => c[channel].to_scalar(),
            Row::Uint16(c) => c[channel].to_scalar(),
            Row::Int32(c) => c[channel].to_scalar(),
            Row::Uint32(c) => c[channel].to_scalar(),
            Row::Boolean(c) => c[channel].to_scalar(),
        }
    }

    /// All elements of the row, widened, in channel order.
    pub fn scalars(self) -> impl Iterator<Item = Scalar> + 'a {
        (0..self.len()).map(move |j| self.scalar(j))
    }
}

/// Single-pass iterator over the rows of a [`SampleBuffer`].
#[derive(Debug)]
pub struct Rows<'a> {
    buffer: &'a SampleBuffer,
    next: usize,
}

impl<'a> Iterator for Rows<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.buffer.slots {
            return None;
        }
        let row = self.buffer.row(self.next);
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.buffer.slots - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Rows<'_> {}
