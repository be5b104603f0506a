//! Driver decorator that logs every platform effect.

use std::{future::Future, time::Duration};

use codescan_app::{App, AppEvent, Driver, PermissionStatus};
use codescan_core::{BindError, BindRequest, Dialog, LensFacing, ToneConfig};

/// Wraps a driver and reports each call through `tracing`.
pub struct TracingDriver<D> {
    inner: D,
}

impl<D: Driver> TracingDriver<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<D: Driver> Driver for TracingDriver<D> {
    type Error = D::Error;

    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send {
        self.inner.poll_event()
    }

    fn camera_permission(&self) -> PermissionStatus {
        self.inner.camera_permission()
    }

    fn request_permission(&mut self) -> Result<(), Self::Error> {
        tracing::info!("requesting camera permission");
        self.inner.request_permission()
    }

    fn show_permission_rationale(&mut self) -> Result<(), Self::Error> {
        tracing::info!("camera permission rationale shown");
        self.inner.show_permission_rationale()
    }

    fn open_settings(&mut self) -> Result<(), Self::Error> {
        tracing::info!("opening application settings");
        self.inner.open_settings()
    }

    fn bind(&mut self, lens: LensFacing, request: BindRequest) -> Result<(), BindError> {
        let result = self.inner.bind(lens, request);
        match &result {
            Ok(()) => tracing::info!(?lens, ?request, "camera bound"),
            Err(error) => tracing::warn!(?lens, ?request, %error, "camera bind failed"),
        }
        result
    }

    fn unbind_all(&mut self) {
        tracing::info!("camera unbound");
        self.inner.unbind_all();
    }

    fn play_tone(&mut self, tone: &ToneConfig) -> Result<(), Self::Error> {
        tracing::info!(
            kind = ?tone.kind,
            volume = tone.volume,
            duration_ms = tone.duration.as_millis() as u64,
            "tone"
        );
        self.inner.play_tone(tone)
    }

    fn vibrate(&mut self, duration: Duration) -> Result<(), Self::Error> {
        tracing::info!(duration_ms = duration.as_millis() as u64, "vibrate");
        self.inner.vibrate(duration)
    }

    fn show_dialog(&mut self, dialog: &Dialog) -> Result<(), Self::Error> {
        tracing::info!(
            title = %dialog.title,
            message = %dialog.message,
            confirm = %dialog.confirm_label,
            "dialog shown"
        );
        self.inner.show_dialog(dialog)
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        tracing::trace!(
            binding = ?app.binding_state(),
            torch = app.torch_enabled(),
            presenting = app.is_presenting(),
            label = %app.version_label(),
            "render"
        );
        self.inner.render(app)
    }

    fn stop(&mut self) {
        tracing::info!("driver stopped");
        self.inner.stop();
    }
}
