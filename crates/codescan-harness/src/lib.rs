//! Deterministic simulation harness for the code scanner.
//!
//! Scripted implementations of the camera, decoder and platform traits so the
//! real [`codescan_app::Runtime`] and frame pipeline can be exercised under
//! controlled timing.
//!
//! - [`SimCamera`] plays back [`Scene`]s and tracks frame release in a
//!   [`ReleaseLog`].
//! - [`SimDecoder`] reports each scene's codes, optionally failing at a seeded
//!   rate.
//! - [`SimDriver`] records platform effects and takes user input through a
//!   [`SimHandle`].
//!
//! Run scenarios under `#[tokio::test(start_paused = true)]` so scripted
//! delays and decode latencies advance instantly and in a fixed order.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod sim_camera;
pub mod sim_decoder;
pub mod sim_driver;

pub use sim_camera::{ReleaseLog, Scene, ScriptedCode, SimCamera, SimFrame};
pub use sim_decoder::SimDecoder;
pub use sim_driver::{Effect, EffectLog, RenderSnapshot, SimDriver, SimDriverError, SimHandle};
