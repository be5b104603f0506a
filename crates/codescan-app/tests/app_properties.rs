//! Property-based tests for App state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences.
//! Decode results go through the shared gate exactly as the frame pipeline
//! delivers them.

use std::sync::Arc;

use codescan_app::{App, AppAction, AppEvent, PermissionState, PermissionStatus};
use codescan_core::{
    Barcode, BarcodeFormat, BindError, BindRequest, CameraAction, DetectionGate, ScannerConfig,
    ValueType,
};
use proptest::prelude::*;

/// One step of simulated input.
#[derive(Debug, Clone)]
enum Step {
    Event(AppEvent),
    Decoded(Vec<Barcode>),
}

fn barcode_strategy() -> impl Strategy<Value = Barcode> {
    (
        prop::sample::select(BarcodeFormat::CONCRETE.to_vec()),
        prop::sample::select(ValueType::KNOWN.to_vec()),
        prop_oneof![1 => Just(None), 1 => Just(Some(String::new())), 4 => "[A-Z0-9]{1,8}".prop_map(Some)],
    )
        .prop_map(|(format, value_type, raw_value)| Barcode { format, value_type, raw_value })
}

fn request_strategy() -> impl Strategy<Value = BindRequest> {
    prop_oneof![
        Just(BindRequest::Preview),
        Just(BindRequest::Analysis),
        any::<bool>().prop_map(|torch| BindRequest::Full { torch }),
    ]
}

fn event_strategy() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        1 => any::<bool>().prop_map(|granted| AppEvent::PermissionResult { granted }),
        1 => Just(AppEvent::RationaleAccepted),
        3 => (request_strategy(), any::<bool>()).prop_map(|(request, ok)| AppEvent::BindCompleted {
            request,
            result: if ok { Ok(()) } else { Err(BindError::Rejected("simulated".into())) },
        }),
        3 => Just(AppEvent::DialogAcknowledged),
        2 => Just(AppEvent::TorchPressed),
    ]
}

/// Events a user produces; bind results come from the camera instead.
fn user_event_strategy() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        1 => any::<bool>().prop_map(|granted| AppEvent::PermissionResult { granted }),
        1 => Just(AppEvent::RationaleAccepted),
        2 => Just(AppEvent::DialogAcknowledged),
        2 => Just(AppEvent::TorchPressed),
    ]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => event_strategy().prop_map(Step::Event),
        4 => prop::collection::vec(barcode_strategy(), 0..4).prop_map(Step::Decoded),
    ]
}

fn launch_strategy() -> impl Strategy<Value = PermissionStatus> {
    prop_oneof![
        2 => Just(PermissionStatus::Granted),
        1 => any::<bool>().prop_map(|show_rationale| PermissionStatus::Denied { show_rationale }),
    ]
}

fn count(actions: &[AppAction], predicate: impl Fn(&AppAction) -> bool) -> usize {
    actions.iter().filter(|action| predicate(action)).count()
}

proptest! {
    /// A dialog is on screen exactly when the gate is held, and at most one
    /// dialog is shown per acknowledgement.
    #[test]
    fn prop_one_presentation_per_acknowledgement(
        launch in launch_strategy(),
        steps in prop::collection::vec(step_strategy(), 0..60),
    ) {
        let mut app = App::new("1.0", &ScannerConfig::default(), Arc::new(DetectionGate::new()));
        let _ = app.handle(AppEvent::Launched { permission: launch });
        let mut shown_since_ack = 0;

        for step in steps {
            let acknowledged = matches!(step, Step::Event(AppEvent::DialogAcknowledged));
            let actions = match step.clone() {
                Step::Event(event) => app.handle(event),
                Step::Decoded(results) => app.on_decode_result(results),
            };

            if acknowledged {
                shown_since_ack = 0;
            }
            let dialogs = count(&actions, |action| matches!(action, AppAction::ShowDialog(_)));
            shown_since_ack += dialogs;

            prop_assert!(shown_since_ack <= 1, "second dialog after {:?}", step);
            prop_assert_eq!(app.dialog().is_some(), app.is_presenting());
            if dialogs == 1 {
                prop_assert_eq!(count(&actions, |action| matches!(action, AppAction::PlayTone(_))), 1);
                prop_assert_eq!(count(&actions, |action| matches!(action, AppAction::Vibrate(_))), 1);
            }
        }
    }

    /// The frame pipeline is started at most once, and only with camera
    /// access.
    #[test]
    fn prop_pipeline_starts_once_with_permission(
        launch in launch_strategy(),
        events in prop::collection::vec(user_event_strategy(), 0..60),
        outcomes in prop::collection::vec(any::<bool>(), 1..16),
    ) {
        let mut app = App::new("1.0", &ScannerConfig::default(), Arc::new(DetectionGate::new()));
        let mut outcomes = outcomes.into_iter().cycle();
        let mut starts = 0;

        for event in std::iter::once(AppEvent::Launched { permission: launch }).chain(events) {
            let mut pending = app.handle(event);
            while let Some(action) = pending.pop() {
                match action {
                    AppAction::Camera(CameraAction::Bind(request)) => {
                        let result = if outcomes.next().unwrap_or(true) {
                            Ok(())
                        } else {
                            Err(BindError::Unavailable("simulated".into()))
                        };
                        pending.extend(app.handle(AppEvent::BindCompleted { request, result }));
                    },
                    AppAction::StartAnalysis => {
                        prop_assert_eq!(app.permission(), PermissionState::Granted);
                        starts += 1;
                    },
                    _ => {},
                }
            }
            prop_assert!(starts <= 1);
            prop_assert_eq!(app.analysis_running(), starts == 1);
        }
    }

    /// Under the default policy the torch indicator follows button presses
    /// made with camera access, whatever the camera reports.
    #[test]
    fn prop_torch_follows_presses(
        events in prop::collection::vec(event_strategy(), 0..60),
    ) {
        let mut app = App::new("1.0", &ScannerConfig::default(), Arc::new(DetectionGate::new()));
        let _ = app.handle(AppEvent::Launched { permission: PermissionStatus::Granted });
        let mut expected = false;

        for event in events {
            if matches!(event, AppEvent::TorchPressed) && app.permission() == PermissionState::Granted {
                expected = !expected;
            }
            let _ = app.handle(event);
            prop_assert_eq!(app.torch_enabled(), expected);
        }
    }
}
