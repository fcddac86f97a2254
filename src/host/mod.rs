//! Windows host binding: Raw Input delivery, `SendInput` injection and
//! console control handling.

pub mod rawinput;
pub mod sendinput;
pub mod signal;

pub use rawinput::RawInputHost;
pub use sendinput::SendInputSink;
