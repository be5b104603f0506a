//! Single-slot detection gate.
//!
//! At most one detected code is presented to the user at a time. The gate is
//! claimed with a compare-and-swap when a decode result yields a valid code
//! and released when the user acknowledges the presentation. Decode
//! completions may arrive on any thread; the acknowledgement usually arrives
//! on the UI context. Both sides share the gate through an `Arc`.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::code::{Barcode, DetectedCode};

/// Gate admitting one presentation at a time.
#[derive(Debug, Default)]
pub struct DetectionGate {
    presenting: AtomicBool,
}

impl DetectionGate {
    /// Create an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a presentation currently holds the gate.
    pub fn is_presenting(&self) -> bool {
        self.presenting.load(Ordering::Acquire)
    }

    /// Claim the gate. Returns `false` if a presentation already holds it.
    pub fn try_claim(&self) -> bool {
        self.presenting.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }

    /// Release the gate. Returns whether it was held.
    pub fn release(&self) -> bool {
        self.presenting.swap(false, Ordering::AcqRel)
    }

    /// Offer one frame's decode results.
    ///
    /// Candidates are visited in decoder order. Those without a payload are
    /// skipped. The first candidate that claims the gate is returned for
    /// presentation; if the gate is already held the batch is dropped.
    pub fn offer<I>(&self, results: I) -> Option<DetectedCode>
    where
        I: IntoIterator<Item = Barcode>,
    {
        for barcode in results {
            let Ok(code) = DetectedCode::try_from(barcode) else {
                continue;
            };

            if self.try_claim() {
                tracing::debug!(format = %code.format(), value_type = %code.value_type(), "gate claimed");
                return Some(code);
            }

            tracing::trace!(format = %code.format(), "presentation in progress, detection dropped");
            return None;
        }
        None
    }
}
