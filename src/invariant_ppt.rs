//! PPT Invariant System: setup/teardown invariant enforcement with contract tracking.
//!
//! Invariants are asserted on the cold paths only (validation, allocation,
//! drain, release). The per-step recorder path never touches this module:
//! the log sits behind a mutex.

#[cfg(feature = "ppt")]
use lazy_static::lazy_static;
#[cfg(feature = "ppt")]
use std::collections::HashSet;
#[cfg(feature = "ppt")]
use std::sync::Mutex;

// Invariant constants for contract tracking.
pub const CONFIG_VALIDATED: u32 = 1;
pub const BUFFER_SIZED: u32 = 2;
pub const BUFFER_ZEROED: u32 = 3;
pub const DRAIN_ROW_COUNT: u32 = 4;
pub const BUFFER_RELEASED: u32 = 5;
pub const BLOCK_LIFECYCLE: u32 = 6;

#[cfg(feature = "ppt")]
lazy_static! {
    static ref INVARIANT_LOG: Mutex<HashSet<u32>> = Mutex::new(HashSet::new());
}

#[cfg(feature = "ppt")]
/// Assert an invariant: logs it and panics on failure.
pub(crate) fn assert_invariant(id: u32, condition: bool, message: &str, context: Option<&str>) {
    if !condition {
        let full_message = if let Some(ctx) = context {
            format!("Invariant {} failed: {} (context: {})", id, message, ctx)
        } else {
            format!("Invariant {} failed: {}", id, message)
        };
        tracing::error!("{}", full_message);
        panic!("{}", full_message);
    }
    // A poisoned log only loses bookkeeping; keep going.
    if let Ok(mut log) = INVARIANT_LOG.lock() {
        log.insert(id);
    }
}

#[cfg(not(feature = "ppt"))]
/// Assert an invariant: checks condition and panics on failure.
pub fn assert_invariant(_id: u32, condition: bool, message: &str, _context: Option<&str>) {
    if !condition {
        panic!("Invariant failed: {}", message);
    }
}

#[cfg(feature = "ppt")]
/// Contract test: checks that specified invariants were asserted.
pub fn contract_test(test_name: &str, required_invariants: &[u32]) {
    let missing: Vec<u32> = {
        let log = INVARIANT_LOG.lock().unwrap_or_else(|e| e.into_inner());
        required_invariants
            .iter()
            .copied()
            .filter(|inv| !log.contains(inv))
            .collect()
    };
    if !missing.is_empty() {
        panic!(
            "Contract test '{}' failed: invariants not enforced: {:?}",
            test_name,
            missing
                .iter()
                .map(|&id| invariant_name(id))
                .collect::<Vec<_>>()
        );
    }
}

#[cfg(not(feature = "ppt"))]
/// Contract test: no-op when PPT feature is disabled.
pub fn contract_test(_test_name: &str, _required_invariants: &[u32]) {}

/// Maps invariant ID to human-readable name (for diagnostics only).
pub const fn invariant_name(id: u32) -> &'static str {
    match id {
        CONFIG_VALIDATED => "CONFIG_VALIDATED",
        BUFFER_SIZED => "BUFFER_SIZED",
        BUFFER_ZEROED => "BUFFER_ZEROED",
        DRAIN_ROW_COUNT => "DRAIN_ROW_COUNT",
        BUFFER_RELEASED => "BUFFER_RELEASED",
        BLOCK_LIFECYCLE => "BLOCK_LIFECYCLE",
        _ => "UNKNOWN",
    }
}
