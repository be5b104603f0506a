//! End-to-end runtime scenarios under simulated time.
//!
//! # Test Strategy
//!
//! Each test wires the real [`Runtime`] and frame pipeline to the simulation
//! harness:
//! 1. Script camera frames and their decode outcomes
//! 2. Drive the simulated user through a [`SimHandle`]
//! 3. Quit and collect the pipeline counters
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks that verify:
//! - Feedback (tone, vibration, dialog) fires once per admitted code
//! - Every frame taken from the camera was released exactly once
//! - Camera bindings match the user's actions

use std::time::Duration;

use codescan_app::{PermissionStatus, PipelineStats, Runtime};
use codescan_core::{
    Barcode, BarcodeFormat, BindRequest, DecoderOptions, FormatSet, LensFacing, PipelineConfig,
    ScannerConfig, TorchFailurePolicy, ValueType,
};
use codescan_harness::{
    Effect, ReleaseLog, Scene, SimCamera, SimDecoder, SimDriver, SimDriverError, SimHandle,
};
use tokio::task::JoinHandle;

type RunResult = Result<Option<PipelineStats>, SimDriverError>;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn qr(value: &str) -> Barcode {
    Barcode::new(BarcodeFormat::QrCode, ValueType::Text, value)
}

fn launch(driver: SimDriver, camera: SimCamera, config: ScannerConfig) -> JoinHandle<RunResult> {
    let decoder = SimDecoder::new(config.decoder);
    tokio::spawn(Runtime::new(driver, camera, decoder, &config, "1.0").run())
}

async fn quit(handle: &SimHandle, task: JoinHandle<RunResult>) -> Option<PipelineStats> {
    assert!(handle.quit());
    task.await.expect("runtime task").expect("driver error")
}

fn concurrent(max_in_flight: usize, decode_timeout: Option<Duration>) -> ScannerConfig {
    ScannerConfig {
        pipeline: PipelineConfig { max_in_flight, decode_timeout },
        ..ScannerConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn code_presented_once_until_acknowledged() {
    let releases = ReleaseLog::new();
    let camera = SimCamera::new(releases.clone()).repeat(10, ms(10), &Scene::code(qr("XYZ")));
    let (driver, handle) = SimDriver::new();
    let task = launch(driver, camera, ScannerConfig::default());

    tokio::time::sleep(ms(35)).await;
    let log = handle.log();
    assert_eq!(log.dialogs().len(), 1);
    assert_eq!(log.tones(), 1);
    assert_eq!(log.vibrations(), 1);
    assert_eq!(log.dialogs()[0].title, "QR_CODE / TEXT");
    assert_eq!(log.dialogs()[0].message, "XYZ");

    assert!(handle.acknowledge());
    tokio::time::sleep(ms(30)).await;
    assert_eq!(log.dialogs().len(), 2);
    assert_eq!(log.tones(), 2);

    let stats = quit(&handle, task).await.expect("pipeline ran");
    assert_eq!(stats.presented, 2);
    assert_eq!(stats.frames, releases.issued());
    assert!(releases.all_released_once());
    assert_eq!(handle.log().effects().last(), Some(&Effect::Stopped));
}

#[tokio::test(start_paused = true)]
async fn granted_launch_binds_preview_then_analysis() {
    let releases = ReleaseLog::new();
    let (driver, handle) = SimDriver::new();
    let task = launch(driver, SimCamera::new(releases.clone()), ScannerConfig::default());

    tokio::time::sleep(ms(10)).await;
    assert_eq!(handle.log().binds(), vec![BindRequest::Preview, BindRequest::Analysis]);

    let stats = quit(&handle, task).await.expect("pipeline ran");
    assert_eq!(stats, PipelineStats::default());
    assert!(handle.log().effects().contains(&Effect::Unbound));
}

#[tokio::test(start_paused = true)]
async fn configured_lens_is_bound() {
    let mut config = ScannerConfig::default();
    config.camera.lens = LensFacing::Front;
    let (driver, handle) = SimDriver::new();
    let task = launch(driver, SimCamera::new(ReleaseLog::new()).keep_open(), config);

    tokio::time::sleep(ms(10)).await;
    assert!(handle.press_torch());
    tokio::time::sleep(ms(10)).await;

    let lenses: Vec<_> = handle
        .log()
        .effects()
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Bound { lens, .. } => Some(lens),
            _ => None,
        })
        .collect();
    assert_eq!(lenses, vec![LensFacing::Front; 3]);
    assert!(quit(&handle, task).await.is_some());
}

#[tokio::test(start_paused = true)]
async fn torch_toggle_rebinds_full_stack() {
    let releases = ReleaseLog::new();
    let camera = SimCamera::new(releases.clone()).keep_open();
    let (driver, handle) = SimDriver::new();
    let task = launch(driver, camera, ScannerConfig::default());

    tokio::time::sleep(ms(10)).await;
    assert!(handle.press_torch());
    tokio::time::sleep(ms(10)).await;
    assert_eq!(handle.log().last_render().map(|render| render.torch), Some(true));

    assert!(handle.press_torch());
    tokio::time::sleep(ms(10)).await;
    assert_eq!(handle.log().last_render().map(|render| render.torch), Some(false));

    assert_eq!(handle.log().binds(), vec![
        BindRequest::Preview,
        BindRequest::Analysis,
        BindRequest::Full { torch: true },
        BindRequest::Full { torch: false },
    ]);
    assert!(quit(&handle, task).await.is_some());
}

#[tokio::test(start_paused = true)]
async fn failed_torch_rebind_follows_policy() {
    let cases = [(TorchFailurePolicy::KeepRequested, true), (TorchFailurePolicy::RollBack, false)];
    for (policy, expected) in cases {
        let mut config = ScannerConfig::default();
        config.camera.torch_failure = policy;
        let (driver, handle) = SimDriver::new();
        let driver = driver.fail_bind(BindRequest::Full { torch: true });
        let task = launch(driver, SimCamera::new(ReleaseLog::new()).keep_open(), config);

        tokio::time::sleep(ms(10)).await;
        assert!(handle.press_torch());
        tokio::time::sleep(ms(10)).await;

        let render = handle.log().last_render().expect("rendered");
        assert_eq!(render.torch, expected, "policy {policy:?}");
        assert!(render.binding.has_analysis());
        assert_eq!(handle.log().count(|effect| matches!(effect, Effect::BindFailed(_))), 1);
        assert!(quit(&handle, task).await.is_some());
    }
}

#[tokio::test(start_paused = true)]
async fn failed_preview_bind_still_scans() {
    let releases = ReleaseLog::new();
    let camera = SimCamera::new(releases.clone()).frame_after(ms(10), Scene::code(qr("ABC")));
    let (driver, handle) = SimDriver::new();
    let driver = driver.fail_bind(BindRequest::Preview);
    let task = launch(driver, camera, ScannerConfig::default());

    tokio::time::sleep(ms(20)).await;
    assert_eq!(handle.log().binds(), vec![BindRequest::Analysis]);
    assert_eq!(handle.log().dialogs().len(), 1);

    let stats = quit(&handle, task).await.expect("pipeline ran");
    assert_eq!(stats.presented, 1);
    assert!(releases.all_released_once());
}

#[tokio::test(start_paused = true)]
async fn out_of_order_completions_present_one_code() {
    let releases = ReleaseLog::new();
    let camera = SimCamera::new(releases.clone())
        .frame(Scene::code(qr("A")).with_latency(ms(300)))
        .frame(Scene::code(qr("B")).with_latency(ms(100)))
        .frame(Scene::code(qr("C")).with_latency(ms(200)));
    let (driver, handle) = SimDriver::new();
    let task = launch(driver, camera, concurrent(3, None));

    tokio::time::sleep(ms(400)).await;
    let dialogs = handle.log().dialogs();
    assert_eq!(dialogs.len(), 1);
    assert_eq!(dialogs[0].message, "B");

    let stats = quit(&handle, task).await.expect("pipeline ran");
    assert_eq!(stats.frames, 3);
    assert_eq!(stats.presented, 1);
    assert_eq!(stats.suppressed, 2);
    assert!(releases.all_released_once());
}

#[tokio::test(start_paused = true)]
async fn stop_with_decodes_in_flight_releases_every_frame() {
    let releases = ReleaseLog::new();
    let slow = Scene::code(qr("SLOW")).with_latency(Duration::from_secs(5));
    let camera = SimCamera::new(releases.clone()).repeat(8, ms(10), &slow).keep_open();
    let (driver, handle) = SimDriver::new();
    let task = launch(driver, camera, concurrent(4, None));

    tokio::time::sleep(ms(100)).await;
    assert_eq!(releases.outstanding(), 4);

    let stats = quit(&handle, task).await.expect("pipeline ran");
    assert_eq!(stats.aborted, 4);
    assert_eq!(stats.presented, 0);
    assert!(releases.all_released_once());
    assert!(handle.log().dialogs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn decode_timeout_releases_frame() {
    let releases = ReleaseLog::new();
    let stalled = Scene::code(qr("LATE")).with_latency(Duration::from_secs(10));
    let camera = SimCamera::new(releases.clone())
        .frame(stalled)
        .frame_after(ms(10), Scene::code(qr("ON TIME")));
    let (driver, handle) = SimDriver::new();
    let task = launch(driver, camera, concurrent(1, Some(ms(50))));

    releases.wait_for_releases(2).await;
    tokio::time::sleep(ms(10)).await;
    assert_eq!(handle.log().dialogs().len(), 1);
    assert_eq!(handle.log().dialogs()[0].message, "ON TIME");

    let stats = quit(&handle, task).await.expect("pipeline ran");
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.presented, 1);
    assert!(releases.all_released_once());
}

#[tokio::test(start_paused = true)]
async fn decode_failures_do_not_stop_scanning() {
    let releases = ReleaseLog::new();
    let camera = SimCamera::new(releases.clone())
        .frame(Scene::unreadable())
        .frame(Scene::empty())
        .frame(Scene::unreadable())
        .frame_after(ms(10), Scene::code(qr("FOUND")));
    let (driver, handle) = SimDriver::new();
    let task = launch(driver, camera, ScannerConfig::default());

    tokio::time::sleep(ms(50)).await;
    assert_eq!(handle.log().dialogs().len(), 1);

    let stats = quit(&handle, task).await.expect("pipeline ran");
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.empty, 1);
    assert_eq!(stats.presented, 1);
    assert!(releases.all_released_once());
}

#[tokio::test(start_paused = true)]
async fn filtered_formats_are_never_presented() {
    let releases = ReleaseLog::new();
    let ean = Barcode::new(BarcodeFormat::Ean13, ValueType::Product, "4006381333931");
    let camera = SimCamera::new(releases.clone())
        .frame(Scene::code(qr("HIDDEN")))
        .frame_after(ms(10), Scene::code(ean));
    let mut config = ScannerConfig::default();
    config.decoder = DecoderOptions {
        formats: FormatSet::of([BarcodeFormat::Ean13]),
        ..DecoderOptions::default()
    };
    let (driver, handle) = SimDriver::new();
    let task = launch(driver, camera, config);

    tokio::time::sleep(ms(30)).await;
    let dialogs = handle.log().dialogs();
    assert_eq!(dialogs.len(), 1);
    assert_eq!(dialogs[0].title, "EAN_13 / PRODUCT");

    let stats = quit(&handle, task).await.expect("pipeline ran");
    assert_eq!(stats.empty, 1);
}

#[tokio::test(start_paused = true)]
async fn feedback_failure_still_shows_dialog() {
    let camera = SimCamera::new(ReleaseLog::new()).frame(Scene::code(qr("QUIET")));
    let (driver, handle) = SimDriver::new();
    let task = launch(driver.fail_feedback(), camera, ScannerConfig::default());

    tokio::time::sleep(ms(10)).await;
    assert_eq!(handle.log().tones(), 0);
    assert_eq!(handle.log().vibrations(), 0);
    assert_eq!(handle.log().dialogs().len(), 1);
    assert!(quit(&handle, task).await.is_some());
}

#[tokio::test(start_paused = true)]
async fn refused_permission_never_starts_pipeline() {
    let releases = ReleaseLog::new();
    let camera = SimCamera::new(releases.clone()).frame(Scene::code(qr("NOPE")));
    let (driver, handle) = SimDriver::new();
    let driver = driver
        .with_permission(PermissionStatus::Denied { show_rationale: false })
        .answer_permission(false);
    let task = launch(driver, camera, ScannerConfig::default());

    tokio::time::sleep(ms(20)).await;
    assert!(quit(&handle, task).await.is_none());
    assert!(handle.log().binds().is_empty());
    assert!(handle.log().effects().contains(&Effect::PermissionRequested));
    assert_eq!(releases.issued(), 0);
}

#[tokio::test(start_paused = true)]
async fn permission_granted_on_request_starts_camera() {
    let (driver, handle) = SimDriver::new();
    let driver = driver
        .with_permission(PermissionStatus::Denied { show_rationale: false })
        .answer_permission(true);
    let task = launch(driver, SimCamera::new(ReleaseLog::new()), ScannerConfig::default());

    tokio::time::sleep(ms(10)).await;
    assert_eq!(handle.log().binds(), vec![BindRequest::Preview, BindRequest::Analysis]);
    assert!(quit(&handle, task).await.is_some());
}

#[tokio::test(start_paused = true)]
async fn rationale_leads_to_settings() {
    let (driver, handle) = SimDriver::new();
    let driver =
        driver.with_permission(PermissionStatus::Denied { show_rationale: true }).accept_rationale();
    let task = launch(driver, SimCamera::new(ReleaseLog::new()), ScannerConfig::default());

    tokio::time::sleep(ms(10)).await;
    let effects = handle.log().effects();
    assert!(effects.contains(&Effect::RationaleShown));
    assert!(effects.contains(&Effect::SettingsOpened));
    assert!(handle.log().binds().is_empty());
    assert!(quit(&handle, task).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn closing_the_ui_shuts_down() {
    let releases = ReleaseLog::new();
    let camera = SimCamera::new(releases.clone()).keep_open();
    let (driver, handle) = SimDriver::new();
    let log = handle.log().clone();
    let task = launch(driver, camera, ScannerConfig::default());

    tokio::time::sleep(ms(10)).await;
    drop(handle);

    let stats = task.await.expect("runtime task").expect("driver error");
    assert_eq!(stats, Some(PipelineStats::default()));
    let effects = log.effects();
    assert!(effects.contains(&Effect::Unbound));
    assert_eq!(effects.last(), Some(&Effect::Stopped));
}
