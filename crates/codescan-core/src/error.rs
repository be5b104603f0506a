//! Error types for the scanner core.
//!
//! Every failure here is terminal at the point where it is caught: decode
//! failures are logged and the frame released, bind failures degrade the
//! camera output. None are retried.

use std::time::Duration;

use thiserror::Error;

use crate::camera::BindRequest;

/// Errors reported for a single frame's decode attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The decoder service rejected or failed the frame
    #[error("decoder failed: {0}")]
    Failed(String),

    /// Decode did not complete within the configured timeout
    #[error("decode timed out after {0:?}")]
    TimedOut(Duration),
}

/// Errors binding camera use cases to the device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// Camera provider is not available (closed, in use, not yet ready)
    #[error("camera unavailable: {0}")]
    Unavailable(String),

    /// Device cannot satisfy the request (e.g. no flash unit for torch)
    #[error("{request:?} not supported by device")]
    Unsupported {
        /// Request the device refused
        request: BindRequest,
    },

    /// Provider rejected the use case combination
    #[error("bind rejected: {0}")]
    Rejected(String),
}

/// Invalid configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Pipeline must allow at least one decode in flight
    #[error("max_in_flight must be at least 1")]
    NoDecodeSlots,

    /// Decoder configured with no symbologies
    #[error("decoder format set is empty")]
    NoFormats,

    /// Feedback durations must be non-zero
    #[error("{0} duration must be non-zero")]
    ZeroDuration(&'static str),

    /// Tone volume out of range
    #[error("tone volume {0} exceeds 100")]
    VolumeOutOfRange(u8),
}
