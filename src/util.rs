//! Common utility functions.
//!
//! Provides branch prediction hints and hex parsing used across modules.

/// Marker function for cold code paths.
#[inline(always)]
#[cold]
pub fn cold() {}

/// Branch prediction hint for conditions expected to be false.
///
/// # Example
/// ```ignore
/// if unlikely(result.is_err()) {
///     tracing::trace!("sink rejected tap");
/// }
/// ```
#[inline(always)]
pub fn unlikely(b: bool) -> bool {
    if b {
        cold()
    }
    b
}

/// Parses a 16-bit hex value, with or without a `0x` prefix.
pub fn parse_hex_u16(s: &str) -> Option<u16> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}
