//! Scancode map for the MAJ-1428 special keys interface.
//!
//! The keypad sends vendor scancodes that do not correspond to any standard
//! keyboard usage. Each one is resolved to a [`SpecialKey`], which in turn is
//! emitted as a spare function key (F13 through F21).
//!
//! The map is a 256-slot table indexed directly by scancode, so a lookup is a
//! single bounds-free array access and needs no terminator entry.

use std::fmt;
use std::str::FromStr;

use crate::error::{KeyNameError, MapError};

/// The nine keys printed on the special keys pad, in legend order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecialKey {
    PerPage,
    Capture,
    DelImage,
    Print,
    PrintQty,
    Color,
    Freeze,
    Release,
    ExamEnd,
}

impl SpecialKey {
    pub const ALL: [SpecialKey; 9] = [
        SpecialKey::PerPage,
        SpecialKey::Capture,
        SpecialKey::DelImage,
        SpecialKey::Print,
        SpecialKey::PrintQty,
        SpecialKey::Color,
        SpecialKey::Freeze,
        SpecialKey::Release,
        SpecialKey::ExamEnd,
    ];

    /// Stable identifier, e.g. `PER_PAGE`.
    pub const fn name(self) -> &'static str {
        match self {
            SpecialKey::PerPage => "PER_PAGE",
            SpecialKey::Capture => "CAPTURE",
            SpecialKey::DelImage => "DEL_IMAGE",
            SpecialKey::Print => "PRINT",
            SpecialKey::PrintQty => "PRINT_QTY",
            SpecialKey::Color => "COLOR",
            SpecialKey::Freeze => "FREEZE",
            SpecialKey::Release => "RELEASE",
            SpecialKey::ExamEnd => "EXAM_END",
        }
    }

    /// Text printed on the keycap.
    pub const fn legend(self) -> &'static str {
        match self {
            SpecialKey::PerPage => "#PER PAGE",
            SpecialKey::Capture => "CAPTURE",
            SpecialKey::DelImage => "DEL IMAGE",
            SpecialKey::Print => "PRINT",
            SpecialKey::PrintQty => "PRINT QTY.",
            SpecialKey::Color => "COLOR",
            SpecialKey::Freeze => "FREEZE",
            SpecialKey::Release => "RELEASE",
            SpecialKey::ExamEnd => "EXAM END",
        }
    }

    /// Standard key emitted for this special key.
    pub const fn function_key(self) -> FunctionKey {
        match self {
            SpecialKey::PerPage => FunctionKey::F13,
            SpecialKey::Capture => FunctionKey::F14,
            SpecialKey::DelImage => FunctionKey::F15,
            SpecialKey::Print => FunctionKey::F16,
            SpecialKey::PrintQty => FunctionKey::F17,
            SpecialKey::Color => FunctionKey::F18,
            SpecialKey::Freeze => FunctionKey::F19,
            SpecialKey::Release => FunctionKey::F20,
            SpecialKey::ExamEnd => FunctionKey::F21,
        }
    }
}

impl fmt::Display for SpecialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpecialKey {
    type Err = KeyNameError;

    /// Accepts [`SpecialKey::name`] or [`SpecialKey::legend`], case-insensitive.

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace([' ', '-', '.'], "_").to_ascii_uppercase();
        let normalized = normalized.trim_start_matches('#').trim_end_matches('_');
        SpecialKey::ALL
            .into_iter()
            .find(|key| key.name() == normalized)
            .ok_or_else(|| KeyNameError::Unknown(s.to_string()))
    }
}

/// Spare function keys used as targets for the special keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FunctionKey {
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
}

impl FunctionKey {
    const fn ordinal(self) -> u16 {
        self as u16
    }

    /// Linux input event code (`KEY_F13` = 183).
    pub const fn evdev_code(self) -> u16 {
        183 + self.ordinal()
    }

    /// Windows virtual-key code (`VK_F13` = 0x7C).
    pub const fn virtual_key(self) -> u16 {
        0x7C + self.ordinal()
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", 13 + self.ordinal())
    }
}

/// One row of a scancode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScancodeEntry {
    pub scancode: u8,
    pub key: SpecialKey,
}

impl ScancodeEntry {
    pub const fn new(scancode: u8, key: SpecialKey) -> Self {
        Self { scancode, key }
    }
}

/// Scancodes observed on the MAJ-1428 special keys interface.
pub const MAJ1428_SCANCODES: [ScancodeEntry; 9] = [
    ScancodeEntry::new(0xA6, SpecialKey::PerPage),
    ScancodeEntry::new(0xA4, SpecialKey::Capture),
    ScancodeEntry::new(0xA7, SpecialKey::DelImage),
    ScancodeEntry::new(0xA8, SpecialKey::Print),
    ScancodeEntry::new(0xA9, SpecialKey::PrintQty),
    ScancodeEntry::new(0xAD, SpecialKey::Color),
    ScancodeEntry::new(0xAA, SpecialKey::Freeze),
    ScancodeEntry::new(0xAB, SpecialKey::Release),
    ScancodeEntry::new(0xAC, SpecialKey::ExamEnd),
];

static BUILTIN: ScancodeMap = ScancodeMap::from_table(&MAJ1428_SCANCODES);

/// Immutable scancode to key lookup table.
#[derive(Clone, PartialEq, Eq)]
pub struct ScancodeMap {
    slots: [Option<SpecialKey>; 256],
    len: usize,
}

impl ScancodeMap {
    /// Builds a map at compile time.
    ///
    /// # Panics
    /// Panics if a scancode appears twice. In a `const`/`static` initializer
    /// this is a build error.
    pub const fn from_table(table: &[ScancodeEntry]) -> Self {
        let mut slots = [None; 256];
        let mut i = 0;
        while i < table.len() {
            let entry = table[i];
            if slots[entry.scancode as usize].is_some() {
                panic!("duplicate scancode in table");
            }
            slots[entry.scancode as usize] = Some(entry.key);
            i += 1;
        }
        Self {
            slots,
            len: table.len(),
        }
    }

    /// Builds a map from runtime data, rejecting duplicate scancodes.
    pub fn try_from_entries(entries: &[ScancodeEntry]) -> Result<Self, MapError> {
        let mut slots = [None; 256];
        for entry in entries {
            let slot = &mut slots[entry.scancode as usize];
            if slot.is_some() {
                return Err(MapError::DuplicateScancode(entry.scancode));
            }
            *slot = Some(entry.key);
        }
        Ok(Self {
            slots,
            len: entries.len(),
        })
    }

    /// The process-wide MAJ-1428 map.
    pub fn builtin() -> &'static ScancodeMap {
        &BUILTIN
    }

    #[inline(always)]
    pub fn lookup(&self, scancode: u8) -> Option<SpecialKey> {
        self.slots[scancode as usize]
    }

    /// Mapped entries in ascending scancode order.
    pub fn entries(&self) -> impl Iterator<Item = ScancodeEntry> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(code, key)| key.map(|key| ScancodeEntry::new(code as u8, key)))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for ScancodeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries()
                    .map(|e| (format!("0x{:02X}", e.scancode), e.key)),
            )
            .finish()
    }
}
