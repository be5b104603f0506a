//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use std::time::Duration;

use codescan_core::{CameraAction, Dialog, ToneConfig};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Ask the user for camera access.
    RequestPermission,

    /// Explain why camera access is needed before sending the user to
    /// settings.
    ShowPermissionRationale,

    /// Open the platform settings surface for this application.
    OpenSettings,

    /// Bind or unbind camera use cases.
    Camera(CameraAction),

    /// Start pulling frames into the decoder.
    StartAnalysis,

    /// Stop the frame pipeline.
    StopAnalysis,

    /// Play the detection tone.
    PlayTone(ToneConfig),

    /// Pulse the vibration motor.
    Vibrate(Duration),

    /// Show the blocking result dialog.
    ShowDialog(Dialog),
}
