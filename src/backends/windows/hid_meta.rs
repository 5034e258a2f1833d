#![cfg(target_os = "windows")]

//! HID-side metadata lookup.
//!
//! DirectInput only gives us names and GUIDs. `hidapi` knows serial numbers, interface
//! numbers and device paths, so enumerated instances are matched against the HID list
//! by VID/PID and the missing fields filled in.
//!
//! Matching is best-effort: two identical devices share a VID/PID, in which case both
//! get the first game-controller collection's metadata.

use crate::metadata::DeviceMeta;
use hidapi::{DeviceInfo, HidApi};
use tracing::debug;

const USAGE_PAGE_GENERIC_DESKTOP: u16 = 0x01;
const USAGE_JOYSTICK: u16 = 0x04;
const USAGE_GAMEPAD: u16 = 0x05;
const USAGE_MULTI_AXIS: u16 = 0x08;

fn is_game_controller(info: &DeviceInfo) -> bool {
    info.usage_page() == USAGE_PAGE_GENERIC_DESKTOP
        && matches!(info.usage(), USAGE_JOYSTICK | USAGE_GAMEPAD | USAGE_MULTI_AXIS)
}

/// Snapshot of the HID device list taken once per scan.
pub struct HidCatalog {
    entries: Vec<DeviceMeta>,
}

impl HidCatalog {
    /// `None` when hidapi cannot be initialized; metadata then stays GUID-derived.
    pub fn load() -> Option<Self> {
        let api = match HidApi::new() {
            Ok(api) => api,
            Err(e) => {
                debug!("hidapi unavailable: {e}");
                return None;
            }
        };

        let entries = api
            .device_list()
            .filter(|info| is_game_controller(info))
            .map(|info| DeviceMeta {
                vid: Some(info.vendor_id()),
                pid: Some(info.product_id()),
                product_string: info.product_string().map(str::to_owned),
                serial_number: info
                    .serial_number()
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned),
                interface_number: Some(info.interface_number()),
                path: Some(info.path().to_string_lossy().into_owned()),
            })
            .collect();
        Some(Self { entries })
    }

    /// Fill the HID-only fields of `meta` from the first entry with the same VID/PID.
    pub fn enrich(&self, meta: &mut DeviceMeta) {
        let (Some(vid), Some(pid)) = (meta.vid, meta.pid) else {
            return;
        };
        let Some(hid) = self
            .entries
            .iter()
            .find(|e| e.vid == Some(vid) && e.pid == Some(pid))
        else {
            return;
        };
        meta.product_string = meta.product_string.take().or_else(|| hid.product_string.clone());
        meta.serial_number = meta.serial_number.take().or_else(|| hid.serial_number.clone());
        meta.interface_number = meta.interface_number.or(hid.interface_number);
        meta.path = meta.path.take().or_else(|| hid.path.clone());
    }
}
