//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the scanner completely decoupled from camera, decoder and UI
//! mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute. The
//! only state it shares is the [`DetectionGate`], which the frame pipeline
//! claims from its worker and the App releases on acknowledgement.
//!
//! # Responsibilities
//!
//! - Walks the camera permission flow.
//! - Owns the camera binding session and the torch flag.
//! - Presents admitted detections (tone, vibration, dialog) and re-opens the
//!   gate when the dialog is acknowledged.

use std::sync::Arc;

use codescan_core::{
    Barcode, BindingState, CameraSession, DetectedCode, DetectionGate, Dialog, FeedbackConfig,
    LensFacing, ScannerConfig,
};

use crate::{AppAction, AppEvent, PermissionState, PermissionStatus};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Application version shown on the main screen.
    version: String,
    /// Position in the permission flow.
    permission: PermissionState,
    /// Camera use case bindings and torch flag.
    camera: CameraSession,
    /// Gate shared with the frame pipeline.
    gate: Arc<DetectionGate>,
    /// Tone and vibration settings.
    feedback: FeedbackConfig,
    /// Dialog currently shown. `None` if nothing is presented.
    dialog: Option<Dialog>,
    /// Frame pipeline has been started.
    analysis_running: bool,
}

impl App {
    /// Create a new App sharing `gate` with the frame pipeline.
    pub fn new(version: impl Into<String>, config: &ScannerConfig, gate: Arc<DetectionGate>) -> Self {
        Self {
            version: version.into(),
            permission: PermissionState::Unknown,
            camera: CameraSession::new(config.camera),
            gate,
            feedback: config.feedback,
            dialog: None,
            analysis_running: false,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Launched { permission } => match permission {
                PermissionStatus::Granted => self.start_camera(),
                PermissionStatus::Denied { show_rationale: true } => {
                    self.permission = PermissionState::RationaleShown;
                    vec![AppAction::ShowPermissionRationale, AppAction::Render]
                },
                PermissionStatus::Denied { show_rationale: false } => {
                    self.permission = PermissionState::Requested;
                    vec![AppAction::RequestPermission, AppAction::Render]
                },
            },
            AppEvent::PermissionResult { granted: true } => self.start_camera(),
            AppEvent::PermissionResult { granted: false } => {
                tracing::info!("camera permission refused");
                self.permission = PermissionState::Denied;
                vec![AppAction::Render]
            },
            AppEvent::RationaleAccepted => vec![AppAction::OpenSettings],
            AppEvent::BindCompleted { request, result } => {
                let transition = self.camera.on_bind_result(request, result);
                if transition.analysis_started() && !self.analysis_running {
                    self.analysis_running = true;
                    vec![AppAction::StartAnalysis, AppAction::Render]
                } else {
                    vec![AppAction::Render]
                }
            },
            AppEvent::CodeDetected(code) => self.present(code),
            AppEvent::DialogAcknowledged => self.acknowledge(),
            AppEvent::TorchPressed => self.toggle_torch(),
            AppEvent::Quit => self.quit(),
        }
    }

    /// Offer one frame's decode results through the gate and present the
    /// admitted code, if any.
    ///
    /// Equivalent to the pipeline's gate offer followed by
    /// [`AppEvent::CodeDetected`], for callers that decode on the UI context.
    pub fn on_decode_result(&mut self, results: Vec<Barcode>) -> Vec<AppAction> {
        match self.gate.offer(results) {
            Some(code) => self.present(code),
            None => vec![],
        }
    }

    /// Present a code that has claimed the gate: tone, vibration, then the
    /// blocking dialog.
    pub fn present(&mut self, code: DetectedCode) -> Vec<AppAction> {
        if let Some(shown) = &self.dialog {
            tracing::warn!(shown = %shown.title, dropped = %code.title(), "dialog already shown");
            return vec![];
        }

        let dialog = Dialog::for_code(&code);
        tracing::info!(title = %dialog.title, "presenting detected code");
        self.dialog = Some(dialog.clone());

        vec![
            AppAction::PlayTone(self.feedback.tone),
            AppAction::Vibrate(self.feedback.vibration),
            AppAction::ShowDialog(dialog),
            AppAction::Render,
        ]
    }

    /// Dismiss the dialog and re-open the gate.
    ///
    /// Without a dialog on screen the gate stays as it is: a detection that
    /// already claimed it may still be on its way to [`App::present`].
    pub fn acknowledge(&mut self) -> Vec<AppAction> {
        if self.dialog.take().is_none() {
            tracing::debug!("acknowledgement without a dialog ignored");
            return vec![AppAction::Render];
        }
        if !self.gate.release() {
            tracing::debug!("acknowledged with gate already open");
        }
        vec![AppAction::Render]
    }

    /// Flip the torch and rebind the camera outputs with it.
    ///
    /// Ignored until camera permission is granted.
    pub fn toggle_torch(&mut self) -> Vec<AppAction> {
        if self.permission != PermissionState::Granted {
            tracing::debug!(permission = ?self.permission, "torch pressed without camera access");
            return vec![AppAction::Render];
        }

        let mut actions: Vec<_> =
            self.camera.toggle_torch().into_iter().map(AppAction::Camera).collect();
        actions.push(AppAction::Render);
        actions
    }

    /// Unbind the camera, stop the pipeline and quit.
    pub fn quit(&mut self) -> Vec<AppAction> {
        let mut actions: Vec<_> = self.camera.stop().into_iter().map(AppAction::Camera).collect();
        if self.analysis_running {
            self.analysis_running = false;
            actions.push(AppAction::StopAnalysis);
        }
        actions.push(AppAction::Quit);
        actions
    }

    fn start_camera(&mut self) -> Vec<AppAction> {
        self.permission = PermissionState::Granted;
        let mut actions: Vec<_> = self.camera.start().into_iter().map(AppAction::Camera).collect();
        actions.push(AppAction::Render);
        actions
    }

    /// Application version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Version line shown under the preview: `"(Version x.y.z)"`.
    pub fn version_label(&self) -> String {
        format!("(Version {})", self.version)
    }

    /// Position in the permission flow.
    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    /// Camera use cases currently bound.
    pub fn binding_state(&self) -> BindingState {
        self.camera.state()
    }

    /// Camera to bind.
    pub fn lens(&self) -> LensFacing {
        self.camera.lens()
    }

    /// Torch flag driving the torch button icon.
    pub fn torch_enabled(&self) -> bool {
        self.camera.torch_enabled()
    }

    /// Dialog currently shown. `None` if nothing is presented.
    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    /// Whether a presentation holds the gate.
    pub fn is_presenting(&self) -> bool {
        self.gate.is_presenting()
    }

    /// Whether the frame pipeline has been started.
    pub fn analysis_running(&self) -> bool {
        self.analysis_running
    }
}
