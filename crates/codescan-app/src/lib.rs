//! Application layer for the code scanner
//!
//! Pure state machines and a generic runtime that drive the scanner, so the
//! same orchestration code runs against real platform I/O and against the
//! deterministic simulation harness.
//!
//! # Components
//!
//! - [`App`]: UI state machine (permission flow, result dialog, torch)
//! - [`FramePipeline`]: frame worker feeding the decoder and the detection gate
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod event;
mod pipeline;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use driver::Driver;
pub use event::AppEvent;
pub use pipeline::{FrameOutcome, FramePipeline, PipelineStats};
pub use runtime::Runtime;
pub use state::{PermissionState, PermissionStatus};
