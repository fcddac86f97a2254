//! Error types for report translation, sink delivery and device identity.

use thiserror::Error;

/// Failure to translate a single report.
///
/// Scoped to the report that produced it; the next report is translated
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The report is too short to carry a scancode.
    #[error("malformed report: {len} byte(s), scancode expected at offset {offset}")]
    MalformedReport { len: usize, offset: usize },

    /// The input sink refused the events.
    #[error("input sink delivery failed: {0}")]
    Sink(#[from] SinkError),
}

/// Failure reported by an [`InputSink`](crate::sink::InputSink).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The sink is gone, e.g. the device is being torn down.
    #[error("input sink unavailable")]
    Unavailable,

    /// The host accepted fewer events than were submitted.
    #[error("host inserted {inserted} of {expected} input event(s)")]
    Rejected { inserted: u32, expected: u32 },
}

/// Invalid scancode table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("scancode 0x{0:02X} is mapped more than once")]
    DuplicateScancode(u8),
}

/// Text that names no special key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyNameError {
    #[error("unknown special key {0:?}")]
    Unknown(String),
}

/// Invalid `VVVV:PPPP` device identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceIdError {
    #[error("device id {0:?} is missing the ':' separator")]
    MissingSeparator(String),

    #[error("device id {0:?} is not a pair of 16-bit hex values")]
    InvalidHex(String),
}
