//! Command line arguments.

use std::{str::FromStr, time::Duration};

use clap::{Parser, ValueEnum};
use codescan_core::{
    Barcode, BarcodeFormat, CameraConfig, ConfigError, LensFacing, PipelineConfig, ScannerConfig,
    TorchFailurePolicy, ValueType,
};
use thiserror::Error;

/// Scan scripted barcodes through the full scanner runtime.
#[derive(Parser, Debug)]
#[command(name = "codescan-sim")]
#[command(about = "Headless barcode scanner over a simulated camera")]
#[command(version)]
pub struct Args {
    /// Code in view, as FORMAT/TYPE/VALUE (e.g. QR_CODE/URL/https://example.com).
    /// Repeat to cycle through several codes.
    #[arg(short, long = "code")]
    pub codes: Vec<CodeArg>,

    /// Frames to capture
    #[arg(short, long, default_value = "30")]
    pub frames: usize,

    /// Interval between frames in milliseconds
    #[arg(long, default_value = "33")]
    pub frame_interval_ms: u64,

    /// Decoder latency per frame in milliseconds
    #[arg(long, default_value = "5")]
    pub decode_latency_ms: u64,

    /// Delay before the simulated user acknowledges a dialog, in milliseconds
    #[arg(long, default_value = "250")]
    pub ack_after_ms: u64,

    /// Maximum concurrent decodes
    #[arg(long, default_value = "1")]
    pub max_in_flight: usize,

    /// Abandon decodes taking longer than this, in milliseconds
    #[arg(long)]
    pub decode_timeout_ms: Option<u64>,

    /// Fraction of decodes that fail (0.0 to 1.0)
    #[arg(long, default_value = "0.0")]
    pub chaos: f64,

    /// Seed for injected decode failures
    #[arg(long, default_value = "1")]
    pub seed: u64,

    /// Torch state after a failed rebind
    #[arg(long, value_enum, default_value = "keep")]
    pub torch_failure: TorchPolicyArg,

    /// Camera to bind
    #[arg(long, value_enum, default_value = "back")]
    pub lens: LensArg,

    /// Frame rotation reported by the camera, in degrees
    #[arg(long, default_value = "90")]
    pub rotation: u32,

    /// Press the torch button after this many milliseconds
    #[arg(long)]
    pub torch_after_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Scanner configuration selected by these arguments.
    pub fn scanner_config(&self) -> Result<ScannerConfig, ConfigError> {
        let config = ScannerConfig {
            pipeline: PipelineConfig {
                max_in_flight: self.max_in_flight,
                decode_timeout: self.decode_timeout_ms.map(Duration::from_millis),
            },
            camera: CameraConfig {
                lens: self.lens.into(),
                torch_failure: self.torch_failure.into(),
            },
            ..ScannerConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}

/// Camera lens names.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LensArg {
    /// Rear camera.
    Back,
    /// Front camera.
    Front,
}

impl From<LensArg> for LensFacing {
    fn from(arg: LensArg) -> Self {
        match arg {
            LensArg::Back => Self::Back,
            LensArg::Front => Self::Front,
        }
    }
}

/// Torch failure policy names.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum TorchPolicyArg {
    /// Keep the requested torch state.
    Keep,
    /// Restore the previous torch state.
    Rollback,
}

impl From<TorchPolicyArg> for TorchFailurePolicy {
    fn from(arg: TorchPolicyArg) -> Self {
        match arg {
            TorchPolicyArg::Keep => Self::KeepRequested,
            TorchPolicyArg::Rollback => Self::RollBack,
        }
    }
}

/// Reasons a `--code` value is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeArgError {
    /// Fewer than three `/`-separated parts.
    #[error("expected FORMAT/TYPE/VALUE, got {0:?}")]
    Malformed(String),

    /// Format or type label not recognised.
    #[error("{0}")]
    UnknownLabel(String),
}

/// One scripted code parsed from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeArg(pub Barcode);

impl FromStr for CodeArg {
    type Err = CodeArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '/');
        let (Some(format), Some(value_type), Some(raw_value)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(CodeArgError::Malformed(s.to_owned()));
        };

        let format = format.parse::<BarcodeFormat>().map_err(CodeArgError::UnknownLabel)?;
        let value_type = value_type.parse::<ValueType>().map_err(CodeArgError::UnknownLabel)?;
        Ok(Self(Barcode::new(format, value_type, raw_value)))
    }
}
