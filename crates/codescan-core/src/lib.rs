//! Core logic for the live code scanner.
//!
//! Pure, I/O-free building blocks shared by the application runtime and the
//! simulation harness.
//!
//! # Components
//!
//! - [`DetectionGate`]: single-slot gate admitting at most one presented code
//! - [`CameraSession`]: camera output binding state machine (preview, analysis,
//!   torch)
//! - [`Frame`], [`FrameSource`], [`Decoder`]: contracts for the external camera
//!   and decoder collaborators
//! - [`FrameLease`]: exactly-once frame release
//! - [`ScannerConfig`]: configuration for feedback, pipeline and camera

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod camera;
pub mod code;
pub mod config;
pub mod decoder;
pub mod error;
pub mod feedback;
pub mod frame;
pub mod gate;

pub use camera::{BindRequest, BindingState, CameraAction, CameraSession, Transition};
pub use code::{Barcode, BarcodeFormat, DetectedCode, FormatSet, ValueType};
pub use config::{
    CameraConfig, FeedbackConfig, LensFacing, PipelineConfig, ScannerConfig, ToneConfig,
    ToneKind, TorchFailurePolicy,
};
pub use decoder::{Decoder, DecoderOptions};
pub use error::{BindError, ConfigError, DecodeError};
pub use feedback::Dialog;
pub use frame::{Frame, FrameLease, FrameSource, Rotation};
pub use gate::DetectionGate;
