//! Scripted decoder with seeded fault injection.
//!
//! [`SimDecoder`] reads the [`Scene`](crate::Scene) carried by each
//! [`SimFrame`] and reports its codes, filtered by the [`DecoderOptions`] it
//! was built with. A seeded failure rate injects decode errors for chaos
//! testing; the same seed always fails the same calls.

use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use codescan_core::{Barcode, DecodeError, Decoder, DecoderOptions};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::SimFrame;

struct Chaos {
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    rng: Mutex<ChaCha8Rng>,
}

/// Decoder reporting each frame's scripted codes.
pub struct SimDecoder {
    options: DecoderOptions,
    chaos: Option<Chaos>,
    calls: AtomicU64,
}

impl SimDecoder {
    /// Create a decoder with the given options and no injected faults.
    pub fn new(options: DecoderOptions) -> Self {
        Self { options, chaos: None, calls: AtomicU64::new(0) }
    }

    /// Fail decodes with probability `failure_rate`, clamped to [0.0, 1.0].
    /// The same seed always fails the same calls.
    #[must_use]
    pub fn with_chaos_seed(mut self, failure_rate: f64, seed: u64) -> Self {
        self.chaos = Some(Chaos {
            failure_rate: failure_rate.clamp(0.0, 1.0),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        });
        self
    }

    /// Decode calls made so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn inject_fault(&self) -> bool {
        self.chaos.as_ref().is_some_and(|chaos| {
            chaos.rng.lock().unwrap_or_else(PoisonError::into_inner).gen_bool(chaos.failure_rate)
        })
    }

    fn visible(&self, frame: &SimFrame) -> Vec<Barcode> {
        frame
            .scene()
            .codes
            .iter()
            .filter(|code| self.options.formats.contains(code.barcode.format))
            .filter(|code| !code.potential || self.options.enable_all_potential_barcodes)
            .map(|code| code.barcode.clone())
            .collect()
    }
}

impl Decoder<SimFrame> for SimDecoder {
    async fn process(&self, frame: &SimFrame) -> Result<Vec<Barcode>, DecodeError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let faulted = self.inject_fault();
        let scene = frame.scene();

        if !scene.decode_latency.is_zero() {
            tokio::time::sleep(scene.decode_latency).await;
        }

        if faulted {
            return Err(DecodeError::Failed("injected decoder fault".into()));
        }
        if scene.unreadable {
            return Err(DecodeError::Failed(format!("frame {} unreadable", frame.id())));
        }
        Ok(self.visible(frame))
    }
}
