//! Frame pipeline.
//!
//! A dedicated worker pulls frames from the [`FrameSource`], submits each to
//! the [`Decoder`] and offers the results to the [`DetectionGate`]. Admitted
//! codes are forwarded to the runtime over a channel.
//!
//! # Frame ownership
//!
//! Each frame is wrapped in a [`FrameLease`] as soon as it leaves the source
//! and released once its decode attempt is over, whatever the outcome. A
//! decode task aborted on shutdown drops its lease, which releases the frame
//! too.
//!
//! # Concurrency
//!
//! At most `max_in_flight` decodes run at once. With one slot the worker is
//! strictly serial; with more, completions arrive in any order and the gate's
//! compare-and-swap decides which detection is presented.

use std::{sync::Arc, time::Duration};

use codescan_core::{
    Barcode, DecodeError, Decoder, DetectedCode, DetectionGate, Frame, FrameLease, FrameSource,
    PipelineConfig,
};
use tokio::{
    sync::{mpsc, oneshot},
    task::{JoinError, JoinSet},
};

/// Result of one frame's trip through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Decoder found nothing with a payload.
    Empty,
    /// A detection claimed the gate and was forwarded.
    Presented,
    /// Valid detections dropped because a presentation holds the gate.
    Suppressed,
    /// Decode failed or timed out.
    Failed,
}

/// Counters reported when the pipeline stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineStats {
    /// Frames taken from the source.
    pub frames: u64,
    /// Frames with nothing to present.
    pub empty: u64,
    /// Frames whose detection was presented.
    pub presented: u64,
    /// Frames whose detections were dropped by the gate.
    pub suppressed: u64,
    /// Frames whose decode failed or timed out.
    pub failed: u64,
    /// Decodes abandoned at shutdown.
    pub aborted: u64,
}

impl PipelineStats {
    fn record(&mut self, joined: Result<FrameOutcome, JoinError>) {
        match joined {
            Ok(FrameOutcome::Empty) => self.empty += 1,
            Ok(FrameOutcome::Presented) => self.presented += 1,
            Ok(FrameOutcome::Suppressed) => self.suppressed += 1,
            Ok(FrameOutcome::Failed) => self.failed += 1,
            Err(error) if error.is_cancelled() => self.aborted += 1,
            Err(error) => {
                tracing::error!(%error, "decode task panicked");
                self.failed += 1;
            },
        }
    }
}

/// Frame worker connecting source, decoder and gate.
pub struct FramePipeline<S, D>
where
    S: FrameSource,
    D: Decoder<S::Frame>,
{
    source: S,
    decoder: Arc<D>,
    gate: Arc<DetectionGate>,
    detections: mpsc::Sender<DetectedCode>,
    config: PipelineConfig,
}

impl<S, D> FramePipeline<S, D>
where
    S: FrameSource,
    D: Decoder<S::Frame>,
{
    /// Create a pipeline forwarding admitted codes to `detections`.
    pub fn new(
        source: S,
        decoder: Arc<D>,
        gate: Arc<DetectionGate>,
        detections: mpsc::Sender<DetectedCode>,
        config: PipelineConfig,
    ) -> Self {
        Self { source, decoder, gate, detections, config }
    }

    /// Run until the source ends or `stop` fires.
    ///
    /// When the source ends, in-flight decodes are allowed to finish. When
    /// stopped, in-flight decodes are aborted. Every frame taken from the
    /// source is released before this returns.
    pub async fn run(self, mut stop: oneshot::Receiver<()>) -> PipelineStats {
        let Self { mut source, decoder, gate, detections, config } = self;
        let slots = config.max_in_flight.max(1);
        let mut in_flight = JoinSet::new();
        let mut stats = PipelineStats::default();

        tracing::info!(max_in_flight = slots, timeout = ?config.decode_timeout, "frame pipeline started");

        loop {
            while in_flight.len() >= slots {
                tokio::select! {
                    _ = &mut stop => return Self::abort(in_flight, stats).await,
                    Some(joined) = in_flight.join_next() => stats.record(joined),
                }
            }

            let next = tokio::select! {
                _ = &mut stop => return Self::abort(in_flight, stats).await,
                frame = source.next_frame() => frame,
            };
            let Some(frame) = next else {
                tracing::info!("frame source ended");
                break;
            };

            stats.frames += 1;
            in_flight.spawn(decode_frame(
                FrameLease::new(frame),
                Arc::clone(&decoder),
                Arc::clone(&gate),
                detections.clone(),
                config.decode_timeout,
            ));
        }

        while let Some(joined) = in_flight.join_next().await {
            stats.record(joined);
        }
        tracing::info!(?stats, "frame pipeline drained");
        stats
    }

    async fn abort(mut in_flight: JoinSet<FrameOutcome>, mut stats: PipelineStats) -> PipelineStats {
        in_flight.abort_all();
        while let Some(joined) = in_flight.join_next().await {
            stats.record(joined);
        }
        tracing::info!(?stats, "frame pipeline stopped");
        stats
    }
}

/// Decode one leased frame and offer the result to the gate.
async fn decode_frame<F, D>(
    lease: FrameLease<F>,
    decoder: Arc<D>,
    gate: Arc<DetectionGate>,
    detections: mpsc::Sender<DetectedCode>,
    timeout: Option<Duration>,
) -> FrameOutcome
where
    F: Frame,
    D: Decoder<F>,
{
    let Some(frame) = lease.frame() else {
        return FrameOutcome::Empty;
    };
    let rotation = frame.rotation();

    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, decoder.process(frame))
            .await
            .unwrap_or(Err(DecodeError::TimedOut(limit))),
        None => decoder.process(frame).await,
    };
    lease.release();

    let results = match result {
        Ok(results) => results,
        Err(error) => {
            tracing::warn!(%error, rotation = rotation.degrees(), "decode failed");
            return FrameOutcome::Failed;
        },
    };

    let has_candidate = results.iter().any(Barcode::has_payload);
    match gate.offer(results) {
        Some(code) => {
            if detections.send(code).await.is_err() {
                tracing::debug!("runtime gone, detection discarded");
            }
            FrameOutcome::Presented
        },
        None if has_candidate => FrameOutcome::Suppressed,
        None => FrameOutcome::Empty,
    }
}
