//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` stands in for the device frontend. It implements [`Driver`] so
//! the same [`codescan_app::Runtime`] orchestration code runs on a device and
//! in simulation. User input is injected through a [`SimHandle`]; every
//! platform call is recorded in an [`EffectLog`] for assertions.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use codescan_app::{App, AppEvent, Driver, PermissionStatus};
use codescan_core::{BindError, BindRequest, BindingState, Dialog, LensFacing, ToneConfig};
use tokio::sync::mpsc;

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// UI state captured on each render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSnapshot {
    /// Bound camera use cases.
    pub binding: BindingState,
    /// Torch indicator.
    pub torch: bool,
    /// Gate held by a presentation.
    pub presenting: bool,
    /// Title of the dialog on screen.
    pub dialog: Option<String>,
}

impl RenderSnapshot {
    fn of(app: &App) -> Self {
        Self {
            binding: app.binding_state(),
            torch: app.torch_enabled(),
            presenting: app.is_presenting(),
            dialog: app.dialog().map(|dialog| dialog.title.clone()),
        }
    }
}

/// Platform call observed by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Permission prompt shown.
    PermissionRequested,
    /// Permission rationale shown.
    RationaleShown,
    /// Settings surface opened.
    SettingsOpened,
    /// Use cases bound.
    Bound {
        /// Lens bound.
        lens: LensFacing,
        /// Request executed.
        request: BindRequest,
    },
    /// Bind refused by the camera provider.
    BindFailed(BindRequest),
    /// All use cases unbound.
    Unbound,
    /// Tone played.
    Tone(ToneConfig),
    /// Vibration pulsed.
    Vibration(Duration),
    /// Dialog shown.
    Dialog(Dialog),
    /// UI rendered.
    Rendered(RenderSnapshot),
    /// Driver stopped.
    Stopped,
}

/// Shared, append-only record of driver effects.
#[derive(Debug, Clone, Default)]
pub struct EffectLog {
    effects: Arc<Mutex<Vec<Effect>>>,
}

impl EffectLog {
    fn push(&self, effect: Effect) {
        self.effects.lock().unwrap_or_else(PoisonError::into_inner).push(effect);
    }

    /// All effects in order.
    pub fn effects(&self) -> Vec<Effect> {
        self.effects.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Effects matching a predicate.
    pub fn count(&self, predicate: impl Fn(&Effect) -> bool) -> usize {
        let effects = self.effects.lock().unwrap_or_else(PoisonError::into_inner);
        effects.iter().filter(|effect| predicate(effect)).count()
    }

    /// Dialogs shown, in order.
    pub fn dialogs(&self) -> Vec<Dialog> {
        self.effects()
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::Dialog(dialog) => Some(dialog),
                _ => None,
            })
            .collect()
    }

    /// Successful bind requests, in order.
    pub fn binds(&self) -> Vec<BindRequest> {
        self.effects()
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::Bound { request, .. } => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Tones played.
    pub fn tones(&self) -> usize {
        self.count(|effect| matches!(effect, Effect::Tone(_)))
    }

    /// Vibrations pulsed.
    pub fn vibrations(&self) -> usize {
        self.count(|effect| matches!(effect, Effect::Vibration(_)))
    }

    /// Most recent render.
    pub fn last_render(&self) -> Option<RenderSnapshot> {
        self.effects().into_iter().rev().find_map(|effect| match effect {
            Effect::Rendered(snapshot) => Some(snapshot),
            _ => None,
        })
    }
}

/// Injects user input into a [`SimDriver`].
///
/// Dropping every handle closes the simulated UI, which the runtime treats as
/// the user leaving.
#[derive(Debug, Clone)]
pub struct SimHandle {
    events: mpsc::UnboundedSender<AppEvent>,
    log: EffectLog,
}

impl SimHandle {
    /// Inject an event. Returns `false` if the runtime has exited.
    pub fn send(&self, event: AppEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Acknowledge the dialog on screen.
    pub fn acknowledge(&self) -> bool {
        self.send(AppEvent::DialogAcknowledged)
    }

    /// Press the torch button.
    pub fn press_torch(&self) -> bool {
        self.send(AppEvent::TorchPressed)
    }

    /// Leave the application.
    pub fn quit(&self) -> bool {
        self.send(AppEvent::Quit)
    }

    /// Effects recorded by the driver.
    pub fn log(&self) -> &EffectLog {
        &self.log
    }
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] trait so the same [`codescan_app::Runtime`]
/// orchestration code runs on a device and in simulation tests.
pub struct SimDriver {
    events: mpsc::UnboundedReceiver<AppEvent>,
    /// Used for replies the simulated user gives on their own.
    replies: mpsc::WeakUnboundedSender<AppEvent>,
    log: EffectLog,
    permission: PermissionStatus,
    permission_answer: Option<bool>,
    accept_rationale: bool,
    failing_binds: Vec<BindRequest>,
    feedback_fails: bool,
    auto_ack: Option<Duration>,
}

impl SimDriver {
    /// Create a driver with camera permission granted and its input handle.
    pub fn new() -> (Self, SimHandle) {
        let (tx, events) = mpsc::unbounded_channel();
        let log = EffectLog::default();
        let driver = Self {
            events,
            replies: tx.downgrade(),
            log: log.clone(),
            permission: PermissionStatus::Granted,
            permission_answer: None,
            accept_rationale: false,
            failing_binds: Vec::new(),
            feedback_fails: false,
            auto_ack: None,
        };
        (driver, SimHandle { events: tx, log })
    }

    /// Permission reported at launch.
    #[must_use]
    pub fn with_permission(mut self, permission: PermissionStatus) -> Self {
        self.permission = permission;
        self
    }

    /// Answer permission prompts as the user would.
    #[must_use]
    pub fn answer_permission(mut self, granted: bool) -> Self {
        self.permission_answer = Some(granted);
        self
    }

    /// Accept the permission rationale as soon as it is shown.
    #[must_use]
    pub fn accept_rationale(mut self) -> Self {
        self.accept_rationale = true;
        self
    }

    /// Make the camera provider refuse this request.
    #[must_use]
    pub fn fail_bind(mut self, request: BindRequest) -> Self {
        self.failing_binds.push(request);
        self
    }

    /// Make tone and vibration calls fail.
    #[must_use]
    pub fn fail_feedback(mut self) -> Self {
        self.feedback_fails = true;
        self
    }

    /// Acknowledge every dialog `delay` after it is shown.
    #[must_use]
    pub fn auto_acknowledge(mut self, delay: Duration) -> Self {
        self.auto_ack = Some(delay);
        self
    }

    /// Effects recorded by this driver.
    pub fn log(&self) -> &EffectLog {
        &self.log
    }

    fn reply(&self, event: AppEvent) {
        if let Some(tx) = self.replies.upgrade()
            && tx.send(event).is_err()
        {
            tracing::debug!("simulated UI closed, reply dropped");
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.events.recv().await)
    }

    fn camera_permission(&self) -> PermissionStatus {
        self.permission
    }

    fn request_permission(&mut self) -> Result<(), Self::Error> {
        self.log.push(Effect::PermissionRequested);
        if let Some(granted) = self.permission_answer {
            self.reply(AppEvent::PermissionResult { granted });
        }
        Ok(())
    }

    fn show_permission_rationale(&mut self) -> Result<(), Self::Error> {
        self.log.push(Effect::RationaleShown);
        if self.accept_rationale {
            self.reply(AppEvent::RationaleAccepted);
        }
        Ok(())
    }

    fn open_settings(&mut self) -> Result<(), Self::Error> {
        self.log.push(Effect::SettingsOpened);
        Ok(())
    }

    fn bind(&mut self, lens: LensFacing, request: BindRequest) -> Result<(), BindError> {
        if self.failing_binds.contains(&request) {
            self.log.push(Effect::BindFailed(request));
            return Err(BindError::Rejected(format!("{request:?} refused by simulated provider")));
        }
        self.log.push(Effect::Bound { lens, request });
        Ok(())
    }

    fn unbind_all(&mut self) {
        self.log.push(Effect::Unbound);
    }

    fn play_tone(&mut self, tone: &ToneConfig) -> Result<(), Self::Error> {
        if self.feedback_fails {
            return Err(SimDriverError("no audio output".into()));
        }
        self.log.push(Effect::Tone(*tone));
        Ok(())
    }

    fn vibrate(&mut self, duration: Duration) -> Result<(), Self::Error> {
        if self.feedback_fails {
            return Err(SimDriverError("no vibrator".into()));
        }
        self.log.push(Effect::Vibration(duration));
        Ok(())
    }

    fn show_dialog(&mut self, dialog: &Dialog) -> Result<(), Self::Error> {
        self.log.push(Effect::Dialog(dialog.clone()));

        if let Some(delay) = self.auto_ack
            && let Some(tx) = self.replies.upgrade()
        {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if tx.send(AppEvent::DialogAcknowledged).is_err() {
                    tracing::debug!("simulated UI closed before acknowledgement");
                }
            });
        }
        Ok(())
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.log.push(Effect::Rendered(RenderSnapshot::of(app)));
        Ok(())
    }

    fn stop(&mut self) {
        self.log.push(Effect::Stopped);
    }
}
