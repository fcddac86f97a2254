//! Input sink capability the translator emits into.

use crate::error::SinkError;
use crate::keymap::SpecialKey;

/// A momentary key state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: SpecialKey,
    pub pressed: bool,
}

impl KeyEvent {
    #[inline(always)]
    pub const fn press(key: SpecialKey) -> Self {
        Self { key, pressed: true }
    }

    #[inline(always)]
    pub const fn release(key: SpecialKey) -> Self {
        Self {
            key,
            pressed: false,
        }
    }
}

/// Host-provided destination for key events.
///
/// A tap is delivered as one all-or-nothing submission: either both the press
/// and the release reach the host, or neither does. Building a tap out of two
/// separate [`report_key`](InputSink::report_key) calls could leave the host
/// with a press and no release.
pub trait InputSink {
    /// Reports a single key state change.
    fn report_key(&mut self, key: SpecialKey, pressed: bool) -> Result<(), SinkError>;

    /// Reports a press immediately followed by a release, as one batch.
    fn report_tap(&mut self, key: SpecialKey) -> Result<(), SinkError>;
}

impl<S: InputSink + ?Sized> InputSink for &mut S {
    fn report_key(&mut self, key: SpecialKey, pressed: bool) -> Result<(), SinkError> {
        (**self).report_key(key, pressed)
    }

    fn report_tap(&mut self, key: SpecialKey) -> Result<(), SinkError> {
        (**self).report_tap(key)
    }
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<KeyEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[KeyEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<KeyEvent> {
        std::mem::take(&mut self.events)
    }
}

impl InputSink for RecordingSink {
    fn report_key(&mut self, key: SpecialKey, pressed: bool) -> Result<(), SinkError> {
        self.events.push(KeyEvent { key, pressed });
        Ok(())
    }

    fn report_tap(&mut self, key: SpecialKey) -> Result<(), SinkError> {
        self.events.extend([KeyEvent::press(key), KeyEvent::release(key)]);
        Ok(())
    }
}
