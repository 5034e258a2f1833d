//! Device metadata snapshot.
//!
//! [`DeviceMeta`] is a lightweight, cloneable description of a device suitable for UI
//! display, logging, and diagnostics. Backends populate what they know; unknown fields
//! remain `None`.
//!
//! # Conventions
//! - `vid`/`pid` are decoded from the product GUID when it carries the `PIDVID`
//!   signature (see [`DeviceMeta::from_product_guid`]).
//! - `serial_number`, `path` and `interface_number` come from the HID layer on
//!   platforms that expose it. They are diagnostic first, identity second.

use serde::{Deserialize, Serialize};

/// Bytes 8..16 of a HID product GUID spell `"\0\0PIDVID"`.
const PIDVID_SIGNATURE: u64 = 0x0000_5049_4456_4944;

/// Snapshot of metadata describing a single device.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMeta {
    /// USB Vendor ID (VID), if known.
    pub vid: Option<u16>,

    /// USB Product ID (PID), if known.
    pub pid: Option<u16>,

    /// Human-readable product name from the driver/firmware.
    pub product_string: Option<String>,

    /// Device serial number supplied by firmware/OS, if present.
    pub serial_number: Option<String>,

    /// HID interface index (platform-reported).
    pub interface_number: Option<i32>,

    /// OS/topological path to the device. Treat as opaque.
    pub path: Option<String>,
}

impl DeviceMeta {
    /// Decode VID/PID from a product GUID.
    ///
    /// HID devices get a product GUID whose first field is `PID << 16 | VID` and whose
    /// last eight bytes read `PIDVID`. Anything else yields empty metadata.
    pub fn from_product_guid(product: u128) -> Self {
        if product as u64 != PIDVID_SIGNATURE {
            return Self::default();
        }
        let data1 = (product >> 96) as u32;
        Self {
            vid: Some(data1 as u16),
            pid: Some((data1 >> 16) as u16),
            ..Self::default()
        }
    }

    /// `vid:pid` in lowercase hex when both are known.
    pub fn vid_pid(&self) -> Option<String> {
        Some(format!("{:04x}:{:04x}", self.vid?, self.pid?))
    }
}
