//! Property-based tests for the detection gate and camera session.

use codescan_core::{
    Barcode, BarcodeFormat, BindError, BindRequest, CameraAction, CameraConfig, CameraSession,
    DetectionGate, ValueType,
};
use proptest::prelude::*;

fn barcode_strategy() -> impl Strategy<Value = Barcode> {
    (
        prop::sample::select(BarcodeFormat::CONCRETE.to_vec()),
        prop::sample::select(ValueType::KNOWN.to_vec()),
        prop_oneof![1 => Just(None), 1 => Just(Some(String::new())), 3 => "[ -~]{1,12}".prop_map(Some)],
    )
        .prop_map(|(format, value_type, raw_value)| Barcode { format, value_type, raw_value })
}

fn batch_strategy() -> impl Strategy<Value = Vec<Barcode>> {
    prop::collection::vec(barcode_strategy(), 0..6)
}

proptest! {
    /// An open gate admits the first candidate with a payload and closes.
    #[test]
    fn prop_open_gate_admits_first_payload(batch in batch_strategy()) {
        let gate = DetectionGate::new();
        let expected = batch.iter().find(|barcode| barcode.has_payload()).cloned();

        let admitted = gate.offer(batch);

        prop_assert_eq!(admitted.is_some(), expected.is_some());
        prop_assert_eq!(gate.is_presenting(), expected.is_some());
        if let (Some(code), Some(barcode)) = (admitted, expected) {
            prop_assert_eq!(code.format(), barcode.format);
            prop_assert_eq!(code.value_type(), barcode.value_type);
            prop_assert_eq!(Some(code.raw_value()), barcode.raw_value.as_deref());
        }
    }

    /// A held gate admits nothing, whatever the batch holds.
    #[test]
    fn prop_held_gate_admits_nothing(batches in prop::collection::vec(batch_strategy(), 0..20)) {
        let gate = DetectionGate::new();
        prop_assert!(gate.try_claim());

        for batch in batches {
            prop_assert!(gate.offer(batch).is_none());
            prop_assert!(gate.is_presenting());
        }
    }

    /// Each release enables exactly one further presentation.
    #[test]
    fn prop_release_enables_one_presentation(
        batches in prop::collection::vec(batch_strategy(), 0..40),
        releases in prop::collection::vec(any::<bool>(), 0..40),
    ) {
        let gate = DetectionGate::new();
        let mut admitted_since_release = 0;

        let releases = releases.into_iter().chain(std::iter::repeat(false));
        for (batch, release) in batches.into_iter().zip(releases) {
            if release && gate.release() {
                admitted_since_release = 0;
            }
            if gate.offer(batch).is_some() {
                admitted_since_release += 1;
            }
            prop_assert!(admitted_since_release <= 1);
            prop_assert_eq!(gate.is_presenting(), admitted_since_release == 1);
        }
    }

    /// Toggling the torch an even number of times restores it, with one
    /// rebind per press.
    #[test]
    fn prop_torch_toggles_pair_up(
        presses in 0usize..12,
        failures in prop::collection::vec(any::<bool>(), 12),
    ) {
        let mut session = CameraSession::new(CameraConfig::default());
        let mut rebinds = 0;

        for failed in failures.into_iter().take(presses) {
            for action in session.toggle_torch() {
                let CameraAction::Bind(request) = action else { continue };
                prop_assert!(
                    matches!(request, BindRequest::Full { .. }),
                    "expected full rebind, got {:?}",
                    request
                );
                rebinds += 1;
                let result = if failed { Err(BindError::Rejected("busy".into())) } else { Ok(()) };
                let _ = session.on_bind_result(request, result);
            }
        }

        prop_assert_eq!(rebinds, presses);
        prop_assert_eq!(session.torch_enabled(), presses % 2 == 1);
    }
}
