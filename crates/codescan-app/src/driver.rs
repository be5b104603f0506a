//! Driver trait for abstracting platform I/O.
//!
//! The [`Driver`] trait decouples the application runtime from the platform:
//! camera provider, permission prompts, audio, vibration and the dialog
//! surface. Each frontend implements the trait, while the generic
//! [`crate::Runtime`] handles all orchestration.

use std::{future::Future, time::Duration};

use codescan_core::{BindError, BindRequest, Dialog, LensFacing, ToneConfig};

use crate::{App, AppEvent, PermissionStatus};

/// Abstracts platform operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs on a device and in simulation.
///
/// # Errors
///
/// [`Driver::Error`] signals that the user interface itself is gone and ends
/// the runtime. Camera failures are reported separately as [`BindError`] and
/// never end the runtime.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next user event.
    ///
    /// Returns `None` once the user interface has shut down.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Current camera permission.
    fn camera_permission(&self) -> PermissionStatus;

    /// Prompt for camera access. The answer arrives as
    /// [`AppEvent::PermissionResult`].
    fn request_permission(&mut self) -> Result<(), Self::Error>;

    /// Explain the camera requirement. Acceptance arrives as
    /// [`AppEvent::RationaleAccepted`].
    fn show_permission_rationale(&mut self) -> Result<(), Self::Error>;

    /// Open the platform settings surface for this application.
    fn open_settings(&mut self) -> Result<(), Self::Error>;

    /// Bind camera use cases on the given lens.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unavailable or refuses the request.
    fn bind(&mut self, lens: LensFacing, request: BindRequest) -> Result<(), BindError>;

    /// Release every bound use case.
    fn unbind_all(&mut self);

    /// Play the detection tone.
    fn play_tone(&mut self, tone: &ToneConfig) -> Result<(), Self::Error>;

    /// Pulse the vibration motor.
    fn vibrate(&mut self, duration: Duration) -> Result<(), Self::Error>;

    /// Show the blocking result dialog. Acknowledgement arrives as
    /// [`AppEvent::DialogAcknowledged`].
    fn show_dialog(&mut self, dialog: &Dialog) -> Result<(), Self::Error>;

    /// Render the application state.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Tear down platform resources.
    fn stop(&mut self);
}
