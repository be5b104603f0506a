//! Camera frame contracts and exactly-once release.
//!
//! A frame is owned by the pipeline from the moment the source hands it over
//! until it is released back. The source stalls while frames are outstanding,
//! so every frame must be released exactly once whatever the decode outcome.
//! [`FrameLease`] ties release to scope: it releases on drop, which covers
//! success, failure, timeout and task cancellation alike.

use std::future::Future;

/// Clockwise rotation needed to display a frame upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    /// Upright.
    #[default]
    Deg0,
    /// 90 degrees.
    Deg90,
    /// 180 degrees.
    Deg180,
    /// 270 degrees.
    Deg270,
}

impl Rotation {
    /// Normalise arbitrary degrees to the nearest quarter turn at or below.
    pub fn from_degrees(degrees: u32) -> Self {
        match (degrees % 360) / 90 {
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// Rotation in degrees.
    pub fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

/// One captured camera image.
///
/// `release` consumes the frame, so a frame cannot be released twice.
pub trait Frame: Send + Sync + 'static {
    /// Rotation metadata reported by the camera.
    fn rotation(&self) -> Rotation;

    /// Return the frame's buffer to the source.
    fn release(self);
}

/// Sequential stream of camera frames.
pub trait FrameSource: Send + 'static {
    /// Frame type produced by this source.
    type Frame: Frame;

    /// Wait for the next frame. `None` once the stream has stopped.
    ///
    /// Must be cancel-safe: the pipeline drops this future when it stops. A
    /// frame counts as handed out only once the future completes with it, so
    /// a cancelled call must not capture a frame that then goes unreleased.
    fn next_frame(&mut self) -> impl Future<Output = Option<Self::Frame>> + Send;
}

/// Scoped ownership of a frame. Releases the frame when dropped.
#[derive(Debug)]
pub struct FrameLease<F: Frame> {
    frame: Option<F>,
}

impl<F: Frame> FrameLease<F> {
    /// Take ownership of a frame.
    pub fn new(frame: F) -> Self {
        Self { frame: Some(frame) }
    }

    /// Borrow the leased frame.
    pub fn frame(&self) -> Option<&F> {
        self.frame.as_ref()
    }

    /// Release now rather than at end of scope.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.release();
        }
    }
}

impl<F: Frame> Drop for FrameLease<F> {
    fn drop(&mut self) {
        self.release_inner();
    }
}
