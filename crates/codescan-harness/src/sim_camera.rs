//! Scripted camera for deterministic pipeline testing.
//!
//! [`SimCamera`] plays back a list of [`Scene`]s as frames. Each
//! [`SimFrame`] reports its release to a shared [`ReleaseLog`], so tests can
//! assert that every frame handed out was released exactly once.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use codescan_core::{Barcode, Frame, FrameSource, Rotation};
use tokio::sync::Notify;

/// A code visible in a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedCode {
    /// What the decoder reports.
    pub barcode: Barcode,
    /// Only reported when the decoder looks for partially obscured codes.
    pub potential: bool,
}

/// What the camera sees in one frame and how the decoder fares on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scene {
    /// Codes in view, in decoder order.
    pub codes: Vec<ScriptedCode>,
    /// Decoder fails on this frame.
    pub unreadable: bool,
    /// Time the decoder spends on this frame.
    pub decode_latency: Duration,
}

impl Scene {
    /// Scene with nothing in view.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scene with one fully visible code.
    pub fn code(barcode: Barcode) -> Self {
        Self::empty().with_code(barcode)
    }

    /// Scene the decoder cannot process.
    pub fn unreadable() -> Self {
        Self { unreadable: true, ..Self::default() }
    }

    /// Add a fully visible code.
    #[must_use]
    pub fn with_code(mut self, barcode: Barcode) -> Self {
        self.codes.push(ScriptedCode { barcode, potential: false });
        self
    }

    /// Add a partially obscured code.
    #[must_use]
    pub fn with_potential(mut self, barcode: Barcode) -> Self {
        self.codes.push(ScriptedCode { barcode, potential: true });
        self
    }

    /// Set the decode latency.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.decode_latency = latency;
        self
    }
}

#[derive(Default)]
struct ReleaseState {
    issued: u64,
    released: HashMap<u64, u32>,
}

/// Shared record of frames issued and released.
#[derive(Clone, Default)]
pub struct ReleaseLog {
    state: Arc<Mutex<ReleaseState>>,
    changed: Arc<Notify>,
}

impl ReleaseLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ReleaseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue(&self) -> u64 {
        let mut state = self.lock();
        state.issued += 1;
        state.issued
    }

    fn record(&self, id: u64) {
        *self.lock().released.entry(id).or_default() += 1;
        self.changed.notify_waiters();
    }

    /// Frames handed out so far.
    pub fn issued(&self) -> u64 {
        self.lock().issued
    }

    /// Total release calls across all frames.
    pub fn released(&self) -> u64 {
        self.lock().released.values().map(|&count| u64::from(count)).sum()
    }

    /// Release calls for one frame.
    pub fn release_count(&self, id: u64) -> u32 {
        self.lock().released.get(&id).copied().unwrap_or(0)
    }

    /// Frames handed out and not yet released.
    pub fn outstanding(&self) -> u64 {
        let state = self.lock();
        (1..=state.issued).filter(|id| !state.released.contains_key(id)).count() as u64
    }

    /// Every issued frame was released exactly once.
    pub fn all_released_once(&self) -> bool {
        let state = self.lock();
        state.released.len() as u64 == state.issued
            && (1..=state.issued).all(|id| state.released.get(&id) == Some(&1))
    }

    /// Wait until at least `count` releases have been recorded.
    pub async fn wait_for_releases(&self, count: u64) {
        loop {
            let changed = self.changed.notified();
            if self.released() >= count {
                return;
            }
            changed.await;
        }
    }
}

impl std::fmt::Debug for ReleaseLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseLog")
            .field("issued", &self.issued())
            .field("released", &self.released())
            .finish()
    }
}

/// Frame produced by [`SimCamera`].
#[derive(Debug)]
pub struct SimFrame {
    id: u64,
    rotation: Rotation,
    scene: Scene,
    releases: ReleaseLog,
}

impl SimFrame {
    /// Sequence number, starting at 1.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Scripted scene content.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

impl Frame for SimFrame {
    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn release(self) {
        tracing::trace!(frame = self.id, "frame released");
        self.releases.record(self.id);
    }
}

/// Scripted frame source.
///
/// Frames are produced in script order, each after its configured delay.
/// Once the script is exhausted the stream ends, unless the camera was built
/// with [`SimCamera::keep_open`], in which case it waits forever.
pub struct SimCamera {
    script: VecDeque<(Duration, Scene)>,
    rotation: Rotation,
    releases: ReleaseLog,
    keep_open: bool,
}

impl SimCamera {
    /// Create a camera reporting releases to `releases`.
    pub fn new(releases: ReleaseLog) -> Self {
        Self { script: VecDeque::new(), rotation: Rotation::Deg90, releases, keep_open: false }
    }

    /// Queue a frame delivered immediately.
    #[must_use]
    pub fn frame(self, scene: Scene) -> Self {
        self.frame_after(Duration::ZERO, scene)
    }

    /// Queue a frame delivered `delay` after the previous one.
    #[must_use]
    pub fn frame_after(mut self, delay: Duration, scene: Scene) -> Self {
        self.script.push_back((delay, scene));
        self
    }

    /// Queue `count` copies of a scene at a fixed interval.
    #[must_use]
    pub fn repeat(mut self, count: usize, interval: Duration, scene: &Scene) -> Self {
        for _ in 0..count {
            self.script.push_back((interval, scene.clone()));
        }
        self
    }

    /// Rotation reported by every frame.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Keep the stream open after the script is exhausted.
    #[must_use]
    pub fn keep_open(mut self) -> Self {
        self.keep_open = true;
        self
    }
}

impl FrameSource for SimCamera {
    type Frame = SimFrame;

    async fn next_frame(&mut self) -> Option<SimFrame> {
        let Some(&(delay, _)) = self.script.front() else {
            if self.keep_open {
                std::future::pending::<()>().await;
            }
            return None;
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        // Taken only after the wait, so a cancelled call leaves the script intact.
        let (_, scene) = self.script.pop_front()?;
        let id = self.releases.issue();
        tracing::trace!(frame = id, "frame captured");
        Some(SimFrame { id, rotation: self.rotation, scene, releases: self.releases.clone() })
    }
}
