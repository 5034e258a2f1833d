#![cfg(target_os = "windows")]

//! Windows DirectInput 8 backend.
//!
//! - **`dinput`**: device enumeration and the `IDirectInput8W` object
//! - **`dinput_device`**: acquisition, polling and constant-force effects per device
//! - **`data_format`**: the 176-byte joystick layout plus GUIDs and flag constants
//! - **`hresult`**: `HRESULT` to [`NativeError`](crate::error::NativeError) mapping
//! - **`hid_meta`**: serial/path enrichment through `hidapi`
//!
//! Most users should not touch these directly. Prefer
//! [`Manager::discover`](crate::manager::Manager::discover).

pub mod data_format;
pub mod dinput;
pub mod dinput_device;
pub mod hid_meta;
pub mod hresult;

pub use dinput::DirectInputBackend;
