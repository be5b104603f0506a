//! Barcode classification and detected payloads.
//!
//! [`Barcode`] is what the decoder service reports for one frame; its payload
//! may be missing or empty. [`DetectedCode`] is the validated form handed to
//! the user interface and always carries a non-empty payload.
//!
//! Format and value type tags use the decoder's integer codes on the wire and
//! render through fixed labels shown in the result dialog title.

use std::{fmt, str::FromStr};

/// Symbology reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    /// Decoder could not classify the symbology.
    Unknown,
    /// Wildcard used in decoder configuration, never in results.
    AllFormats,
    /// Code 128.
    Code128,
    /// Code 39.
    Code39,
    /// Code 93.
    Code93,
    /// Codabar.
    Codabar,
    /// Data Matrix.
    DataMatrix,
    /// EAN-13.
    Ean13,
    /// EAN-8.
    Ean8,
    /// Interleaved 2 of 5.
    Itf,
    /// QR code.
    QrCode,
    /// UPC-A.
    UpcA,
    /// UPC-E.
    UpcE,
    /// PDF417.
    Pdf417,
    /// Aztec.
    Aztec,
    /// Code not known to this build.
    Other(i32),
}

impl BarcodeFormat {
    /// Every concrete symbology, in decoder bit order.
    pub const CONCRETE: [BarcodeFormat; 13] = [
        Self::Code128,
        Self::Code39,
        Self::Code93,
        Self::Codabar,
        Self::DataMatrix,
        Self::Ean13,
        Self::Ean8,
        Self::Itf,
        Self::QrCode,
        Self::UpcA,
        Self::UpcE,
        Self::Pdf417,
        Self::Aztec,
    ];

    /// Map a decoder wire code to a format.
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => Self::Unknown,
            0 => Self::AllFormats,
            1 => Self::Code128,
            2 => Self::Code39,
            4 => Self::Code93,
            8 => Self::Codabar,
            16 => Self::DataMatrix,
            32 => Self::Ean13,
            64 => Self::Ean8,
            128 => Self::Itf,
            256 => Self::QrCode,
            512 => Self::UpcA,
            1024 => Self::UpcE,
            2048 => Self::Pdf417,
            4096 => Self::Aztec,
            other => Self::Other(other),
        }
    }

    /// Decoder wire code.
    pub fn code(self) -> i32 {
        match self {
            Self::Unknown => -1,
            Self::AllFormats => 0,
            Self::Code128 => 1,
            Self::Code39 => 2,
            Self::Code93 => 4,
            Self::Codabar => 8,
            Self::DataMatrix => 16,
            Self::Ean13 => 32,
            Self::Ean8 => 64,
            Self::Itf => 128,
            Self::QrCode => 256,
            Self::UpcA => 512,
            Self::UpcE => 1024,
            Self::Pdf417 => 2048,
            Self::Aztec => 4096,
            Self::Other(code) => code,
        }
    }

    /// Label shown in the result dialog title.
    ///
    /// The 1D "FORMAT_" prefixes and the empty wildcard label are part of the
    /// user-visible format and kept as-is.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::AllFormats => "",
            Self::Code128 => "FORMAT_CODE_128",
            Self::Code39 => "FORMAT_CODE_39",
            Self::Code93 => "FORMAT_CODE_93",
            Self::Codabar => "FORMAT_CODABAR",
            Self::DataMatrix => "DATA_MATRIX",
            Self::Ean13 => "EAN_13",
            Self::Ean8 => "EAN_8",
            Self::Itf => "ITF",
            Self::QrCode => "QR_CODE",
            Self::UpcA => "UPC_A",
            Self::UpcE => "UPC_E",
            Self::Pdf417 => "PDF417",
            Self::Aztec => "AZTEC",
            Self::Other(_) => "Unknown",
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BarcodeFormat {
    type Err = String;

    /// Parse a dialog label. `ALL_FORMATS` names the wildcard.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "ALL_FORMATS" {
            return Ok(Self::AllFormats);
        }
        Self::CONCRETE
            .into_iter()
            .chain([Self::Unknown])
            .find(|format| format.label() == s)
            .ok_or_else(|| format!("unknown barcode format: {s}"))
    }
}

/// Semantic content type reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Unclassified content.
    Unknown,
    /// vCard or MeCard contact.
    ContactInfo,
    /// E-mail address or message.
    Email,
    /// ISBN.
    Isbn,
    /// Phone number.
    Phone,
    /// Product code.
    Product,
    /// SMS message.
    Sms,
    /// Plain text.
    Text,
    /// URL bookmark.
    Url,
    /// Wi-Fi network credentials.
    Wifi,
    /// Geographic coordinates.
    Geo,
    /// Calendar event.
    CalendarEvent,
    /// Driver license data.
    DriverLicense,
    /// Code not known to this build.
    Other(i32),
}

impl ValueType {
    /// Every known value type, in decoder code order.
    pub const KNOWN: [ValueType; 13] = [
        Self::Unknown,
        Self::ContactInfo,
        Self::Email,
        Self::Isbn,
        Self::Phone,
        Self::Product,
        Self::Sms,
        Self::Text,
        Self::Url,
        Self::Wifi,
        Self::Geo,
        Self::CalendarEvent,
        Self::DriverLicense,
    ];

    /// Map a decoder wire code to a value type.
    pub fn from_code(code: i32) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::KNOWN.get(index).copied())
            .unwrap_or(Self::Other(code))
    }

    /// Decoder wire code.
    pub fn code(self) -> i32 {
        match self {
            Self::Other(code) => code,
            known => Self::KNOWN.iter().position(|t| *t == known).map_or(-1, |i| i as i32),
        }
    }

    /// Label shown in the result dialog title.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::ContactInfo => "CONTACT_INFO",
            Self::Email => "EMAIL",
            Self::Isbn => "ISBN",
            Self::Phone => "PHONE",
            Self::Product => "PRODUCT",
            Self::Sms => "SMS",
            Self::Text => "TEXT",
            Self::Url => "URL",
            Self::Wifi => "WIFI",
            Self::Geo => "GEO",
            Self::CalendarEvent => "CALENDAR_EVENT",
            Self::DriverLicense => "DRIVER_LICENSE",
            Self::Other(_) => "Unknown",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::KNOWN
            .into_iter()
            .find(|value_type| value_type.label() == s)
            .ok_or_else(|| format!("unknown value type: {s}"))
    }
}

/// Set of symbologies a decoder is configured to recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSet(u32);

impl FormatSet {
    /// Every supported symbology.
    pub const ALL: FormatSet = FormatSet(0x1FFF);

    /// Empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Set containing exactly the given formats.
    pub fn of(formats: impl IntoIterator<Item = BarcodeFormat>) -> Self {
        formats.into_iter().fold(Self::empty(), Self::with)
    }

    /// Add a format. [`BarcodeFormat::AllFormats`] adds every symbology.
    #[must_use]
    pub fn with(self, format: BarcodeFormat) -> Self {
        match format {
            BarcodeFormat::AllFormats => Self::ALL,
            other => Self(self.0 | Self::bit(other)),
        }
    }

    /// Whether results of this format should be reported.
    ///
    /// The full set reports every result, including formats without a bit of
    /// their own such as [`BarcodeFormat::Unknown`].
    pub fn contains(self, format: BarcodeFormat) -> bool {
        if self.is_all() {
            return true;
        }
        let bit = Self::bit(format);
        bit != 0 && self.0 & bit == bit
    }

    /// Every symbology selected.
    pub fn is_all(self) -> bool {
        self == Self::ALL
    }

    /// No format selected.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn bit(format: BarcodeFormat) -> u32 {
        match format.code() {
            code @ 1..=4096 if (code as u32).is_power_of_two() => code as u32,
            _ => 0,
        }
    }
}

impl Default for FormatSet {
    fn default() -> Self {
        Self::ALL
    }
}

/// One decoder result. The payload may be absent or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barcode {
    /// Symbology.
    pub format: BarcodeFormat,
    /// Semantic content type.
    pub value_type: ValueType,
    /// Raw payload. `None` if the decoder could not extract one.
    pub raw_value: Option<String>,
}

impl Barcode {
    /// Barcode with a payload.
    pub fn new(format: BarcodeFormat, value_type: ValueType, raw_value: impl Into<String>) -> Self {
        Self { format, value_type, raw_value: Some(raw_value.into()) }
    }

    /// Barcode located without a readable payload.
    pub fn without_payload(format: BarcodeFormat, value_type: ValueType) -> Self {
        Self { format, value_type, raw_value: None }
    }

    /// Whether the barcode carries a non-empty payload.
    pub fn has_payload(&self) -> bool {
        self.raw_value.as_deref().is_some_and(|raw| !raw.is_empty())
    }
}

/// A detection admitted for presentation.
///
/// Constructed only from a non-empty payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedCode {
    format: BarcodeFormat,
    value_type: ValueType,
    raw_value: String,
}

impl DetectedCode {
    /// Validate a payload. `None` if it is empty.
    pub fn new(format: BarcodeFormat, value_type: ValueType, raw_value: String) -> Option<Self> {
        (!raw_value.is_empty()).then_some(Self { format, value_type, raw_value })
    }

    /// Symbology.
    pub fn format(&self) -> BarcodeFormat {
        self.format
    }

    /// Semantic content type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Non-empty raw payload.
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// Dialog title: `"<format> / <type>"`.
    pub fn title(&self) -> String {
        format!("{} / {}", self.format.label(), self.value_type.label())
    }
}

impl TryFrom<Barcode> for DetectedCode {
    type Error = Barcode;

    fn try_from(barcode: Barcode) -> Result<Self, Self::Error> {
        match barcode.raw_value {
            Some(raw) if !raw.is_empty() => {
                Ok(Self { format: barcode.format, value_type: barcode.value_type, raw_value: raw })
            },
            raw_value => Err(Barcode { raw_value, ..barcode }),
        }
    }
}
