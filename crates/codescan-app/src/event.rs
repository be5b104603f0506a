//! Application input events.
//!
//! This module defines [`AppEvent`], the inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from three sources:
//! - User interactions (torch button, dialog acknowledgement, permission
//!   prompts).
//! - Camera binding results reported by the driver.
//! - Detections admitted by the frame pipeline.

use codescan_core::{BindError, BindRequest, DetectedCode};

use crate::PermissionStatus;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Application launched with this camera permission.
    Launched {
        /// Permission at launch.
        permission: PermissionStatus,
    },

    /// Answer to a permission request.
    PermissionResult {
        /// Whether the user granted camera access.
        granted: bool,
    },

    /// User accepted the permission rationale prompt.
    RationaleAccepted,

    /// Driver finished a bind request.
    BindCompleted {
        /// Request that was executed.
        request: BindRequest,
        /// Outcome reported by the camera provider.
        result: Result<(), BindError>,
    },

    /// Frame pipeline admitted a detection through the gate.
    CodeDetected(DetectedCode),

    /// User acknowledged the result dialog.
    DialogAcknowledged,

    /// User pressed the torch button.
    TorchPressed,

    /// User left the application.
    Quit,
}
