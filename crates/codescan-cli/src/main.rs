//! Headless code scanner binary.
//!
//! Runs the scanner runtime against a simulated camera that shows the codes
//! given on the command line. Dialogs are acknowledged automatically and every
//! feedback action is logged.
//!
//! # Usage
//!
//! ```bash
//! # One QR code in view for 30 frames
//! codescan-sim --code QR_CODE/URL/https://example.com
//!
//! # Two codes, three concurrent decodes, a fifth of decodes failing
//! codescan-sim --code EAN_13/PRODUCT/4006381333931 --code QR_CODE/TEXT/hello \
//!     --max-in-flight 3 --chaos 0.2
//! ```

mod args;
mod driver;

use std::time::Duration;

use clap::Parser;
use codescan_app::Runtime;
use codescan_core::Rotation;
use codescan_harness::{ReleaseLog, Scene, SimCamera, SimDecoder, SimDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{args::Args, driver::TracingDriver};

/// Scripted camera showing the requested codes in turn.
fn camera(args: &Args, releases: ReleaseLog) -> SimCamera {
    let interval = Duration::from_millis(args.frame_interval_ms);
    let latency = Duration::from_millis(args.decode_latency_ms);

    let rotation = Rotation::from_degrees(args.rotation);

    (0..args.frames).fold(SimCamera::new(releases).with_rotation(rotation), |camera, index| {
        let scene = match args.codes.get(index % args.codes.len().max(1)) {
            Some(code) => Scene::code(code.0.clone()),
            None => Scene::empty(),
        };
        camera.frame_after(interval, scene.with_latency(latency))
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = args.scanner_config()?;
    if args.codes.is_empty() {
        tracing::warn!("no --code given, camera will see nothing");
    }

    let releases = ReleaseLog::new();
    let source = camera(&args, releases.clone());
    let decoder = SimDecoder::new(config.decoder).with_chaos_seed(args.chaos, args.seed);
    let (driver, handle) = SimDriver::new();
    let driver = TracingDriver::new(driver.auto_acknowledge(Duration::from_millis(args.ack_after_ms)));

    let runtime = Runtime::new(driver, source, decoder, &config, env!("CARGO_PKG_VERSION"));
    tracing::info!(label = %runtime.app().version_label(), frames = args.frames, "codescan-sim starting");
    let task = tokio::spawn(runtime.run());

    if let Some(delay) = args.torch_after_ms {
        let torch = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            torch.press_torch();
        });
    }

    releases.wait_for_releases(args.frames as u64).await;
    tokio::time::sleep(Duration::from_millis(args.ack_after_ms)).await;
    handle.quit();

    let stats = task.await??;
    let log = handle.log();
    tracing::info!(
        ?stats,
        dialogs = log.dialogs().len(),
        tones = log.tones(),
        vibrations = log.vibrations(),
        "codescan-sim finished"
    );

    Ok(())
}
