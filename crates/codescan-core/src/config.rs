//! Scanner configuration.
//!
//! Defaults reproduce the reference behaviour: short alert tone, half-second
//! vibration, all formats including potential codes, one decode in flight,
//! no decode timeout, back camera, and an optimistic torch flag on failure.

use std::time::Duration;

use crate::{decoder::DecoderOptions, error::ConfigError};

/// Tone played before vibration.
pub const DEFAULT_TONE_DURATION: Duration = Duration::from_millis(200);

/// Vibration pulse length.
pub const DEFAULT_VIBRATION: Duration = Duration::from_millis(500);

/// Tone volume, percent of stream maximum.
pub const DEFAULT_TONE_VOLUME: u8 = 100;

/// Tone shape played on detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToneKind {
    /// Short two-pitch alert ("call guard").
    #[default]
    AlertCallGuard,
}

/// Audible feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneConfig {
    /// Tone shape.
    pub kind: ToneKind,
    /// Volume in percent (0-100).
    pub volume: u8,
    /// How long the tone plays.
    pub duration: Duration,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self { kind: ToneKind::default(), volume: DEFAULT_TONE_VOLUME, duration: DEFAULT_TONE_DURATION }
    }
}

/// Tone and haptic feedback on detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackConfig {
    /// Tone played first.
    pub tone: ToneConfig,
    /// Vibration pulse length.
    pub vibration: Duration,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self { tone: ToneConfig::default(), vibration: DEFAULT_VIBRATION }
    }
}

/// Frame pipeline tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Frames decoded concurrently. 1 is a strictly serial worker.
    pub max_in_flight: usize,
    /// Abandon a decode after this long. `None` waits indefinitely.
    pub decode_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_in_flight: 1, decode_timeout: None }
    }
}

/// Which physical camera to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LensFacing {
    /// Rear camera.
    #[default]
    Back,
    /// Front camera.
    Front,
}

/// What the torch flag reports after a failed torch rebind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TorchFailurePolicy {
    /// Keep the requested value even though the hardware may disagree.
    #[default]
    KeepRequested,
    /// Restore the value held before the toggle.
    RollBack,
}

/// Camera binding options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraConfig {
    /// Camera to bind.
    pub lens: LensFacing,
    /// Torch flag handling on rebind failure.
    pub torch_failure: TorchFailurePolicy,
}

/// Complete scanner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScannerConfig {
    /// Detection feedback.
    pub feedback: FeedbackConfig,
    /// Decoder construction options.
    pub decoder: DecoderOptions,
    /// Frame pipeline tuning.
    pub pipeline: PipelineConfig,
    /// Camera binding options.
    pub camera: CameraConfig,
}

impl ScannerConfig {
    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.max_in_flight == 0 {
            return Err(ConfigError::NoDecodeSlots);
        }
        if self.decoder.formats.is_empty() {
            return Err(ConfigError::NoFormats);
        }
        if self.feedback.tone.volume > 100 {
            return Err(ConfigError::VolumeOutOfRange(self.feedback.tone.volume));
        }
        if self.feedback.tone.duration.is_zero() {
            return Err(ConfigError::ZeroDuration("tone"));
        }
        if self.feedback.vibration.is_zero() {
            return Err(ConfigError::ZeroDuration("vibration"));
        }
        if self.pipeline.decode_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroDuration("decode timeout"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::FormatSet;

    #[test]
    fn defaults_match_reference_behaviour() {
        let config = ScannerConfig::default();
        assert_eq!(config.feedback.tone.duration, Duration::from_millis(200));
        assert_eq!(config.feedback.tone.volume, 100);
        assert_eq!(config.feedback.vibration, Duration::from_millis(500));
        assert_eq!(config.decoder.formats, FormatSet::ALL);
        assert!(config.decoder.enable_all_potential_barcodes);
        assert_eq!(config.pipeline.max_in_flight, 1);
        assert_eq!(config.pipeline.decode_timeout, None);
        assert_eq!(config.camera.lens, LensFacing::Back);
        assert_eq!(config.camera.torch_failure, TorchFailurePolicy::KeepRequested);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = ScannerConfig::default();
        config.pipeline.max_in_flight = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoDecodeSlots));

        let mut config = ScannerConfig::default();
        config.decoder.formats = FormatSet::empty();
        assert_eq!(config.validate(), Err(ConfigError::NoFormats));

        let mut config = ScannerConfig::default();
        config.feedback.tone.volume = 150;
        assert_eq!(config.validate(), Err(ConfigError::VolumeOutOfRange(150)));

        let mut config = ScannerConfig::default();
        config.feedback.vibration = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration("vibration")));

        let mut config = ScannerConfig::default();
        config.pipeline.decode_timeout = Some(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration("decode timeout")));
    }
}
