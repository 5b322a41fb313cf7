//! Single "operation in flight" flag shared by every trigger of one view

use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::StudioError;

/// At most one lifecycle operation at a time
#[derive(Debug, Default)]
pub struct OperationGate {
    in_flight: AtomicBool,
}

impl OperationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the flag, or fail with `Busy` if another operation holds it.
    /// The flag is released when the guard drops, whether the operation
    /// succeeded, failed or was cancelled.
    pub fn try_begin(&self) -> Result<OperationGuard<'_>, StudioError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| OperationGuard { gate: self })
            .map_err(|_| StudioError::Busy)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Held for the duration of one operation
#[derive(Debug)]
pub struct OperationGuard<'a> {
    gate: &'a OperationGate,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}
