//! Observable application state types.

/// Camera permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Camera access granted.
    Granted,
    /// Camera access not granted.
    Denied {
        /// The platform advises explaining the request before asking again.
        show_rationale: bool,
    },
}

/// Where the App is in the permission flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// Not yet checked.
    #[default]
    Unknown,
    /// Waiting for the user to answer a permission request.
    Requested,
    /// Rationale shown, waiting for the user to go to settings.
    RationaleShown,
    /// Camera access granted.
    Granted,
    /// User refused camera access. The pipeline never starts.
    Denied,
}
