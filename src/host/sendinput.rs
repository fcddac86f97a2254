//! Input sink that injects function keys with `SendInput`.

use windows::Win32::UI::Input::KeyboardAndMouse::*;

use crate::error::SinkError;
use crate::keymap::SpecialKey;
use crate::sink::InputSink;

/// Tag placed in `dwExtraInfo` of every injected event.
pub const INJECTED_EVENT_MARKER: usize = 0x4D41_4A31;

/// Stateless sink; each call submits directly to the system input queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct SendInputSink;

impl SendInputSink {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn keyboard_input(key: SpecialKey, pressed: bool) -> INPUT {
        let flags = if pressed {
            KEYBD_EVENT_FLAGS(0)
        } else {
            KEYEVENTF_KEYUP
        };
        INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: VIRTUAL_KEY(key.function_key().virtual_key()),
                    wScan: 0,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: INJECTED_EVENT_MARKER,
                },
            },
        }
    }

    fn send(inputs: &[INPUT]) -> Result<(), SinkError> {
        let inserted = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
        let expected = inputs.len() as u32;
        // Zero means another desktop or a higher-integrity window blocked us
        if inserted != expected {
            return Err(SinkError::Rejected { inserted, expected });
        }
        Ok(())
    }
}

impl InputSink for SendInputSink {
    fn report_key(&mut self, key: SpecialKey, pressed: bool) -> Result<(), SinkError> {
        Self::send(&[Self::keyboard_input(key, pressed)])
    }

    fn report_tap(&mut self, key: SpecialKey) -> Result<(), SinkError> {
        Self::send(&[
            Self::keyboard_input(key, true),
            Self::keyboard_input(key, false),
        ])
    }
}
