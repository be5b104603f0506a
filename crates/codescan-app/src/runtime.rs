//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: scanner state machine
//! - [`FramePipeline`]: frame worker feeding the detection gate
//! - [`Driver`]: Platform-specific I/O

use std::{collections::VecDeque, sync::Arc};

use codescan_core::{
    CameraAction, Decoder, DetectedCode, DetectionGate, FrameSource, PipelineConfig, ScannerConfig,
};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{App, AppAction, AppEvent, Driver, FramePipeline, PipelineStats};

/// Detections buffered between the pipeline and the event loop.
const DETECTION_BUFFER: usize = 8;

/// Running frame pipeline.
struct PipelineHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<PipelineStats>,
}

/// Input selected by one turn of the event loop.
enum Input<E> {
    Ui(Result<Option<AppEvent>, E>),
    Detection(DetectedCode),
}

/// Generic runtime that orchestrates App, frame pipeline, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `S`: Camera frame source
/// - `C`: Barcode decoder for the source's frames
pub struct Runtime<D, S, C>
where
    D: Driver,
    S: FrameSource,
    C: Decoder<S::Frame>,
{
    driver: D,
    app: App,
    /// Taken when the pipeline starts.
    source: Option<S>,
    decoder: Arc<C>,
    gate: Arc<DetectionGate>,
    pipeline_config: PipelineConfig,
    detections_tx: mpsc::Sender<DetectedCode>,
    detections_rx: mpsc::Receiver<DetectedCode>,
    pipeline: Option<PipelineHandle>,
}

impl<D, S, C> Runtime<D, S, C>
where
    D: Driver,
    S: FrameSource,
    C: Decoder<S::Frame>,
{
    /// Create a new runtime. The config is expected to be validated.
    pub fn new(
        driver: D,
        source: S,
        decoder: C,
        config: &ScannerConfig,
        version: impl Into<String>,
    ) -> Self {
        let gate = Arc::new(DetectionGate::new());
        let app = App::new(version, config, Arc::clone(&gate));
        let (detections_tx, detections_rx) = mpsc::channel(DETECTION_BUFFER);

        Self {
            driver,
            app,
            source: Some(source),
            decoder: Arc::new(decoder),
            gate,
            pipeline_config: config.pipeline,
            detections_tx,
            detections_rx,
            pipeline: None,
        }
    }

    /// Run the main event loop until the user quits or the UI goes away.
    ///
    /// On exit the frame pipeline is stopped and awaited, so every frame it
    /// took has been released. Returns the pipeline counters if it ran.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters a UI I/O error. The pipeline
    /// is still shut down first.
    pub async fn run(mut self) -> Result<Option<PipelineStats>, D::Error> {
        tracing::info!(version = self.app.version(), "scanner starting");

        let result = self.event_loop().await;
        let stats = self.shutdown().await;
        result.map(|()| stats)
    }

    async fn event_loop(&mut self) -> Result<(), D::Error> {
        let permission = self.driver.camera_permission();
        if self.dispatch(AppEvent::Launched { permission })? {
            return Ok(());
        }

        loop {
            let input = tokio::select! {
                event = self.driver.poll_event() => Input::Ui(event),
                Some(code) = self.detections_rx.recv() => Input::Detection(code),
            };

            let event = match input {
                Input::Ui(event) => event?.unwrap_or(AppEvent::Quit),
                Input::Detection(code) => AppEvent::CodeDetected(code),
            };

            if self.dispatch(event)? {
                return Ok(());
            }
        }
    }

    /// Feed one event to the App and execute the resulting actions, including
    /// any produced by bind results along the way.
    ///
    /// Returns `true` if should quit.
    fn dispatch(&mut self, event: AppEvent) -> Result<bool, D::Error> {
        let mut pending: VecDeque<AppAction> = self.app.handle(event).into();
        let mut quit = false;

        while let Some(action) = pending.pop_front() {
            match action {
                AppAction::Render => self.driver.render(&self.app)?,
                AppAction::Quit => quit = true,
                AppAction::RequestPermission => self.driver.request_permission()?,
                AppAction::ShowPermissionRationale => self.driver.show_permission_rationale()?,
                AppAction::OpenSettings => self.driver.open_settings()?,
                AppAction::Camera(CameraAction::Bind(request)) => {
                    let result = self.driver.bind(self.app.lens(), request);
                    pending.extend(self.app.handle(AppEvent::BindCompleted { request, result }));
                },
                AppAction::Camera(CameraAction::Unbind) => self.driver.unbind_all(),
                AppAction::StartAnalysis => self.start_analysis(),
                AppAction::StopAnalysis => self.stop_analysis(),
                AppAction::PlayTone(tone) => {
                    if let Err(error) = self.driver.play_tone(&tone) {
                        tracing::warn!(%error, "tone failed");
                    }
                },
                AppAction::Vibrate(duration) => {
                    if let Err(error) = self.driver.vibrate(duration) {
                        tracing::warn!(%error, "vibration failed");
                    }
                },
                AppAction::ShowDialog(dialog) => self.driver.show_dialog(&dialog)?,
            }
        }
        Ok(quit)
    }

    fn start_analysis(&mut self) {
        let Some(source) = self.source.take() else {
            tracing::warn!("frame pipeline already started");
            return;
        };

        let (stop, stop_rx) = oneshot::channel();
        let pipeline = FramePipeline::new(
            source,
            Arc::clone(&self.decoder),
            Arc::clone(&self.gate),
            self.detections_tx.clone(),
            self.pipeline_config,
        );
        let task = tokio::spawn(pipeline.run(stop_rx));
        self.pipeline = Some(PipelineHandle { stop: Some(stop), task });
    }

    fn stop_analysis(&mut self) {
        let Some(stop) = self.pipeline.as_mut().and_then(|handle| handle.stop.take()) else {
            return;
        };
        if stop.send(()).is_err() {
            tracing::debug!("frame pipeline already finished");
        }
    }

    async fn shutdown(&mut self) -> Option<PipelineStats> {
        self.stop_analysis();

        let stats = match self.pipeline.take() {
            Some(handle) => match handle.task.await {
                Ok(stats) => Some(stats),
                Err(error) => {
                    tracing::error!(%error, "frame pipeline task failed");
                    None
                },
            },
            None => None,
        };

        self.driver.stop();
        tracing::info!(?stats, "scanner stopped");
        stats
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }
}
