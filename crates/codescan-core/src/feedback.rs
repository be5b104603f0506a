//! Result dialog model.

use crate::code::DetectedCode;

/// Label of the single acknowledgement button.
pub const CONFIRM_LABEL: &str = "OK";

/// Modal dialog presenting a detected code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    /// `"<format> / <type>"`.
    pub title: String,
    /// Raw payload.
    pub message: String,
    /// Label of the acknowledgement action.
    pub confirm_label: String,
    /// Whether a tap outside the dialog dismisses it.
    pub cancelable: bool,
}

impl Dialog {
    /// Non-cancelable dialog for a detected code.
    pub fn for_code(code: &DetectedCode) -> Self {
        Self {
            title: code.title(),
            message: code.raw_value().to_string(),
            confirm_label: CONFIRM_LABEL.to_string(),
            cancelable: false,
        }
    }
}
