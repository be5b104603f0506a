//! Camera output binding state machine.
//!
//! Tracks which use cases (preview, analysis) are bound to the camera and
//! whether the torch is lit. Uses the action pattern: methods return the
//! [`CameraAction`]s the driver must execute, and the driver reports each
//! outcome back through [`CameraSession::on_bind_result`]. Transitions are
//! idempotent; requesting what is already bound produces no action.
//!
//! # State Machine
//!
//! ```text
//!               Preview  ┌─────────────┐  Analysis
//!           ┌──────────> │ PreviewOnly │ ───────────┐
//!           │            └─────────────┘            ↓
//! ┌─────────┐                             ┌────────────────────┐  Full(on)  ┌─────────────────────────────┐
//! │ Unbound │                             │ PreviewAndAnalysis │ ─────────> │ PreviewAndAnalysisWithTorch │
//! └─────────┘                             └────────────────────┘ <───────── └─────────────────────────────┘
//!      ↑    │   Analysis ┌──────────────┐  Preview  ↑                Full(off)
//!      │    └──────────> │ AnalysisOnly │ ──────────┘
//!      │                 └──────────────┘
//!      └──── Unbind (from any state)
//! ```
//!
//! A full rebind (`Full`) binds both use cases at once and is reachable from
//! every state.

use crate::{
    config::{CameraConfig, LensFacing, TorchFailurePolicy},
    error::BindError,
};

/// Use case combination to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindRequest {
    /// Preview surface only.
    Preview,
    /// Frame analysis only.
    Analysis,
    /// Preview and analysis together, with the torch on or off.
    Full {
        /// Torch lit after binding.
        torch: bool,
    },
}

/// Instructions for the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraAction {
    /// Bind use cases and report the result.
    Bind(BindRequest),
    /// Release every bound use case.
    Unbind,
}

/// Use cases currently bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingState {
    /// Nothing bound.
    #[default]
    Unbound,
    /// Preview bound, analysis failed or not yet bound.
    PreviewOnly,
    /// Analysis bound, preview failed or not yet bound.
    AnalysisOnly,
    /// Both bound, torch off.
    PreviewAndAnalysis,
    /// Both bound, torch on.
    PreviewAndAnalysisWithTorch,
}

impl BindingState {
    /// State after `request` succeeds.
    pub fn after(self, request: BindRequest) -> Self {
        match (self, request) {
            (_, BindRequest::Full { torch: true }) => Self::PreviewAndAnalysisWithTorch,
            (_, BindRequest::Full { torch: false }) => Self::PreviewAndAnalysis,
            (Self::Unbound, BindRequest::Preview) => Self::PreviewOnly,
            (Self::Unbound, BindRequest::Analysis) => Self::AnalysisOnly,
            (Self::AnalysisOnly, BindRequest::Preview) | (Self::PreviewOnly, BindRequest::Analysis) => {
                Self::PreviewAndAnalysis
            },
            (state, _) => state,
        }
    }

    /// Preview surface bound.
    pub fn has_preview(self) -> bool {
        !matches!(self, Self::Unbound | Self::AnalysisOnly)
    }

    /// Frame analysis bound.
    pub fn has_analysis(self) -> bool {
        !matches!(self, Self::Unbound | Self::PreviewOnly)
    }

    /// Torch lit.
    pub fn has_torch(self) -> bool {
        self == Self::PreviewAndAnalysisWithTorch
    }
}

/// Binding state change reported by [`CameraSession::on_bind_result`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before the result was applied.
    pub from: BindingState,
    /// State after the result was applied.
    pub to: BindingState,
}

impl Transition {
    /// Analysis became available with this transition.
    pub fn analysis_started(&self) -> bool {
        !self.from.has_analysis() && self.to.has_analysis()
    }
}

/// Camera binding state machine.
///
/// Pure state machine, no I/O. The torch flag follows user intent and may
/// disagree with hardware after a failed rebind, depending on
/// [`TorchFailurePolicy`].
#[derive(Debug, Clone)]
pub struct CameraSession {
    state: BindingState,
    torch: bool,
    config: CameraConfig,
}

impl CameraSession {
    /// Unbound session with the torch off.
    pub fn new(config: CameraConfig) -> Self {
        Self { state: BindingState::Unbound, torch: false, config }
    }

    /// Use cases currently bound.
    pub fn state(&self) -> BindingState {
        self.state
    }

    /// Torch flag as last requested by the user.
    pub fn torch_enabled(&self) -> bool {
        self.torch
    }

    /// Camera this session binds.
    pub fn lens(&self) -> LensFacing {
        self.config.lens
    }

    /// Bind whichever of preview and analysis is not yet bound.
    pub fn start(&self) -> Vec<CameraAction> {
        let mut actions = Vec::with_capacity(2);
        if !self.state.has_preview() {
            actions.push(CameraAction::Bind(BindRequest::Preview));
        }
        if !self.state.has_analysis() {
            actions.push(CameraAction::Bind(BindRequest::Analysis));
        }
        actions
    }

    /// Flip the torch flag and rebind the full output stack with it.
    pub fn toggle_torch(&mut self) -> Vec<CameraAction> {
        self.torch = !self.torch;
        tracing::debug!(torch = self.torch, "torch toggled");
        vec![CameraAction::Bind(BindRequest::Full { torch: self.torch })]
    }

    /// Request a torch state. No action if the torch is already there.
    pub fn set_torch(&mut self, on: bool) -> Vec<CameraAction> {
        if self.torch == on && self.state.has_torch() == on && self.state.has_analysis() {
            return Vec::new();
        }
        self.torch = on;
        vec![CameraAction::Bind(BindRequest::Full { torch: on })]
    }

    /// Apply the outcome of a [`CameraAction::Bind`].
    ///
    /// Failures leave the binding state untouched. A failed full rebind
    /// applies the configured [`TorchFailurePolicy`] to the torch flag.
    pub fn on_bind_result(
        &mut self,
        request: BindRequest,
        result: Result<(), BindError>,
    ) -> Transition {
        let from = self.state;
        match result {
            Ok(()) => {
                self.state = from.after(request);
                tracing::debug!(?request, ?from, to = ?self.state, "camera bound");
            },
            Err(error) => {
                tracing::warn!(?request, %error, "camera bind failed");
                if let BindRequest::Full { torch } = request
                    && self.config.torch_failure == TorchFailurePolicy::RollBack
                    && self.torch == torch
                {
                    self.torch = !torch;
                }
            },
        }
        Transition { from, to: self.state }
    }

    /// Unbind everything. The torch goes dark with the camera.
    pub fn stop(&mut self) -> Vec<CameraAction> {
        self.torch = false;
        if self.state == BindingState::Unbound {
            return Vec::new();
        }
        self.state = BindingState::Unbound;
        vec![CameraAction::Unbind]
    }
}
