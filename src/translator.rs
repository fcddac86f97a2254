//! Raw report to key event translation.
//!
//! Every report from the special keys interface represents a complete tap:
//! the pad never sends a separate release report. A mapped scancode therefore
//! becomes a press immediately followed by a release, and repeated reports
//! become repeated taps. The translator keeps no state between reports.

use smallvec::SmallVec;

use crate::error::TranslateError;
use crate::keymap::{ScancodeMap, SpecialKey};
use crate::sink::{InputSink, KeyEvent};
use crate::util::unlikely;

/// Size of an interrupt-transfer report from the special keys interface.
pub const REPORT_LEN: usize = 8;

/// Offset of the scancode byte (first key slot of the boot keyboard layout).
pub const SCANCODE_OFFSET: usize = 2;

/// Event sequence produced by one report.
pub type KeyEvents = SmallVec<[KeyEvent; 2]>;

/// Splits a host buffer holding `report_count` reports of `report_size` bytes.
///
/// Never reads past `data`: a short buffer ends with a truncated report, and
/// at least one (possibly empty) report is yielded whenever `report_count` is
/// non-zero so that a bogus size reaches the translator as a malformed report.
/// A zero `report_size` yields exactly one empty report.
pub fn split_reports(
    data: &[u8],
    report_size: usize,
    report_count: usize,
) -> impl Iterator<Item = &[u8]> {
    let count = if report_size == 0 {
        report_count.min(1)
    } else {
        report_count
    };
    (0..count).map_while(move |i| {
        let start = i.checked_mul(report_size)?;
        if i > 0 && start >= data.len() {
            return None;
        }
        let start = start.min(data.len());
        let end = start.saturating_add(report_size).min(data.len());
        Some(&data[start..end])
    })
}

/// Outcome of a dispatched report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    /// A press and release for this key reached the sink.
    Tapped(SpecialKey),
    /// The scancode is not mapped; nothing was emitted.
    Ignored(u8),
}

/// Stateless translator over a borrowed scancode map.
#[derive(Debug, Clone, Copy)]
pub struct ReportTranslator<'m> {
    map: &'m ScancodeMap,
}

impl<'m> ReportTranslator<'m> {
    pub fn new(map: &'m ScancodeMap) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &'m ScancodeMap {
        self.map
    }

    /// Extracts the scancode byte without reading past `report`.
    #[inline(always)]
    pub fn scancode(report: &[u8]) -> Result<u8, TranslateError> {
        match report.get(SCANCODE_OFFSET) {
            Some(&code) => Ok(code),
            None => Err(TranslateError::MalformedReport {
                len: report.len(),
                offset: SCANCODE_OFFSET,
            }),
        }
    }

    /// Resolves the key carried by `report`, if any.
    #[inline]
    pub fn decode(&self, report: &[u8]) -> Result<Option<SpecialKey>, TranslateError> {
        Self::scancode(report).map(|code| self.map.lookup(code))
    }

    /// Returns the events `report` produces: empty, or a press then a release.
    pub fn translate(&self, report: &[u8]) -> Result<KeyEvents, TranslateError> {
        let mut events = KeyEvents::new();
        if let Some(key) = self.decode(report)? {
            events.push(KeyEvent::press(key));
            events.push(KeyEvent::release(key));
        }
        Ok(events)
    }

    /// Translates `report` and delivers the result to `sink`.
    ///
    /// A malformed report emits nothing. Sink failures are returned as-is and
    /// never retried, since a retry could duplicate the tap.
    pub fn dispatch<S: InputSink>(
        &self,
        report: &[u8],
        mut sink: S,
    ) -> Result<Translation, TranslateError> {
        let code = Self::scancode(report)?;
        let Some(key) = self.map.lookup(code) else {
            tracing::trace!(scancode = format_args!("0x{code:02X}"), "unmapped scancode");
            return Ok(Translation::Ignored(code));
        };

        let result = sink.report_tap(key);
        if unlikely(result.is_err()) {
            tracing::trace!(key = %key, "sink rejected tap");
        } else {
            tracing::trace!(
                scancode = format_args!("0x{code:02X}"),
                key = %key,
                legend = key.legend(),
                target = %key.function_key(),
                "tap"
            );
        }
        result?;
        Ok(Translation::Tapped(key))
    }
}

impl Default for ReportTranslator<'static> {
    fn default() -> Self {
        Self::new(ScancodeMap::builtin())
    }
}
