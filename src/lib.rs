//! Translator for the special keys pad of the Olympus MAJ-1428 keyboard.
//!
//! Raw HID reports from the pad carry vendor scancodes; this crate maps them
//! to spare function keys and delivers a press/release pair per report to an
//! injected input sink. On Windows the `host` module binds it to Raw Input and `SendInput`.

pub mod config;
pub mod device;
pub mod error;
pub mod keymap;
pub mod logging;
pub mod sink;
pub mod translator;
pub mod util;

#[cfg(windows)]
pub mod host;

pub use config::AppConfig;
pub use device::{DeviceBinding, DeviceId, DeviceRegistry};
pub use error::{KeyNameError, MapError, SinkError, TranslateError};
pub use keymap::{FunctionKey, ScancodeEntry, ScancodeMap, SpecialKey};
pub use sink::{InputSink, KeyEvent, RecordingSink};
pub use translator::{ReportTranslator, Translation};
