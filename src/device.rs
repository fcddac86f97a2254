//! Device identity and per-instance bookkeeping.
//!
//! The MAJ-1428 enumerates as three USB devices sharing a vendor id. Only the
//! special keys interface is translated; every device instance the host
//! reports is classified once and remembered until it is removed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DeviceIdError;
use crate::util::parse_hex_u16;

/// Name used in log output for attached instances.
pub const DEVICE_NAME: &str = "Olympus MAJ-1428";

/// USB vendor and product identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceId {
    /// Vendor id registered to Sun Microsystems, used by this keyboard.
    pub const VENDOR_SUN: u16 = 0x0430;

    /// The special keys interface of the MAJ-1428.
    pub const MAJ1428_SPECIAL_KEYS: DeviceId = DeviceId::new(Self::VENDOR_SUN, 0x009B);

    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::MAJ1428_SPECIAL_KEYS
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}:{:04X}", self.vendor_id, self.product_id)
    }
}

impl FromStr for DeviceId {
    type Err = DeviceIdError;

    /// Parses `VVVV:PPPP`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (vid, pid) = s
            .split_once(':')
            .ok_or_else(|| DeviceIdError::MissingSeparator(s.to_string()))?;
        match (parse_hex_u16(vid), parse_hex_u16(pid)) {
            (Some(vendor_id), Some(product_id)) => Ok(Self::new(vendor_id, product_id)),
            _ => Err(DeviceIdError::InvalidHex(s.to_string())),
        }
    }
}

impl TryFrom<String> for DeviceId {
    type Error = DeviceIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.to_string()
    }
}

/// How a device instance is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceBinding {
    /// Reports from this instance are translated.
    Bound(DeviceId),
    /// Some other device; its reports are dropped.
    Foreign(DeviceId),
}

impl DeviceBinding {
    #[inline(always)]
    pub fn is_bound(&self) -> bool {
        matches!(self, DeviceBinding::Bound(_))
    }

    pub fn id(&self) -> DeviceId {
        match *self {
            DeviceBinding::Bound(id) | DeviceBinding::Foreign(id) => id,
        }
    }
}

/// Lock-free registry of device instances keyed by host handle.
pub struct DeviceRegistry {
    target: DeviceId,
    instances: scc::HashMap<isize, DeviceBinding>,
}

impl DeviceRegistry {
    pub fn new(target: DeviceId) -> Self {
        Self {
            target,
            instances: scc::HashMap::new(),
        }
    }

    pub fn target(&self) -> DeviceId {
        self.target
    }

    /// Records a device instance, classifying it against the target id.
    ///
    /// Attaching a known handle again returns the existing binding.
    pub fn attach(&self, handle: isize, id: DeviceId) -> DeviceBinding {
        let vacant = match self.instances.entry_sync(handle) {
            scc::hash_map::Entry::Occupied(existing) => return *existing.get(),
            scc::hash_map::Entry::Vacant(vacant) => vacant,
        };

        let binding = if id == self.target {
            DeviceBinding::Bound(id)
        } else {
            DeviceBinding::Foreign(id)
        };
        vacant.insert_entry(binding);

        if binding.is_bound() {
            tracing::info!(handle, device = %id, "{DEVICE_NAME} attached");
        } else {
            tracing::debug!(handle, device = %id, "ignoring foreign device");
        }
        binding
    }

    /// Forgets a device instance. Returns its binding if it was known.
    pub fn detach(&self, handle: isize) -> Option<DeviceBinding> {
        let (_, binding) = self.instances.remove_sync(&handle)?;
        if binding.is_bound() {
            tracing::info!(handle, device = %binding.id(), "{DEVICE_NAME} removed");
        }
        Some(binding)
    }

    #[inline]
    pub fn binding(&self, handle: isize) -> Option<DeviceBinding> {
        self.instances.read_sync(&handle, |_, v| *v)
    }

    /// Number of attached instances of the target device.
    pub fn bound_count(&self) -> usize {
        let mut count = 0;
        self.instances.iter_sync(|_, binding| {
            if binding.is_bound() {
                count += 1;
            }
            true
        });
        count
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Drops every instance, e.g. after the host reports an unknown removal.
    pub fn clear(&self) {
        self.instances.clear_sync();
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new(DeviceId::MAJ1428_SPECIAL_KEYS)
    }
}
