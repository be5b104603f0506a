//! Decoder service contract.

use std::future::Future;

use crate::{
    code::{Barcode, FormatSet},
    error::DecodeError,
    frame::Frame,
};

/// Options a decoder is constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Symbologies to report.
    pub formats: FormatSet,
    /// Also report partially obscured ("potential") codes.
    pub enable_all_potential_barcodes: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self { formats: FormatSet::ALL, enable_all_potential_barcodes: true }
    }
}

/// Asynchronous barcode decoder.
///
/// Implementations may run decodes concurrently; results for different frames
/// can complete in any order.
pub trait Decoder<F: Frame>: Send + Sync + 'static {
    /// Decode one frame. An empty vector means nothing was found.
    fn process(&self, frame: &F) -> impl Future<Output = Result<Vec<Barcode>, DecodeError>> + Send;
}
