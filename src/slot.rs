//! Time-to-slot mapping.
//!
//! Buffer sizing and slot indexing round with different constants:
//! `+1.5` counts the inclusive grid points of the window, `+0.5` picks the
//! nearest grid point for a timestamp that drifted off the nominal grid.
//! Both are kept as is; unifying them moves the edge slots.

/// Row index for timestamp `t`: `floor((t - start) / period + 0.5)`.
///
/// `t` is expected to lie in the sample window; see [`SlotGrid::slot_of`]
/// for the checked form.
#[inline]
pub fn slot_for(t: f64, start_time: f64, sample_period: f64) -> usize {
    ((t - start_time) / sample_period + 0.5).floor() as usize
}

/// Number of grid points in `[start, end]`: `floor((end - start) / period + 1.5)`.
///
/// Saturates at `usize::MAX` for windows too fine to count.
pub fn slot_count(start_time: f64, end_time: f64, sample_period: f64) -> usize {
    ((end_time - start_time) / sample_period + 1.5).floor() as usize
}

/// The sample window and its discretization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotGrid {
    start: f64,
    end: f64,
    period: f64,
    slots: usize,
}

impl SlotGrid {
    /// Build a grid from a validated window and period.
    pub fn new(start_time: f64, end_time: f64, sample_period: f64) -> Self {
        Self {
            start: start_time,
            end: end_time,
            period: sample_period,
            slots: slot_count(start_time, end_time, sample_period),
        }
    }

    pub fn start_time(&self) -> f64 {
        self.start
    }

    pub fn end_time(&self) -> f64 {
        self.end
    }

    pub fn sample_period(&self) -> f64 {
        self.period
    }

    /// Number of rows the buffer needs.
    pub fn slot_count(&self) -> usize {
        self.slots
    }

    /// True if `t` lies in the inclusive window. NaN is outside.
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }

    /// Slot for `t`, or `None` outside the window.
    #[inline]
    pub fn slot_of(&self, t: f64) -> Option<usize> {
        if !self.contains(t) {
            return None;
        }
        let slot = slot_for(t, self.start, self.period);
        debug_assert!(slot < self.slots, "slot {} out of {}", slot, self.slots);
        Some(slot)
    }

    /// Nominal time of a slot.
    pub fn time_of(&self, slot: usize) -> f64 {
        self.start + slot as f64 * self.period
    }
}
