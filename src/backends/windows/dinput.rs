#![cfg(target_os = "windows")]

//! DirectInput 8 enumerator.
//!
//! Owns the `IDirectInput8W` object. Enumeration goes through the native callback API;
//! the callback only copies each `DIDEVICEINSTANCEW` into a `Vec` so callers get a
//! plain list back.

use super::data_format::{
    DI8DEVTYPE_DRIVING, DI8DEVTYPE_FLIGHT, DI8DEVTYPE_GAMEPAD, DI8DEVTYPE_JOYSTICK,
    DIEDFL_ALLDEVICES, DIEDFL_ATTACHEDONLY, DIENUM_CONTINUE, DIRECTINPUT_VERSION,
};
use super::dinput_device::DirectInputDevice;
use super::hid_meta::HidCatalog;
use super::hresult::{check, native_error};
use crate::device::{
    DeviceClass, DeviceClassFilter, DeviceIdentity, DeviceInstance, InputBackend, NativeDevice,
};
use crate::error::{BackendError, NativeError};
use crate::metadata::DeviceMeta;
use std::ffi::c_void;
use tracing::{debug, info};
use windows::core::{Interface, BOOL, GUID};
use windows::Win32::Devices::HumanInterfaceDevice::{
    DirectInput8Create, IDirectInput8W, IDirectInputDevice8W, DIDEVICEINSTANCEW,
};
use windows::Win32::Foundation::{HINSTANCE, HWND};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;

/// Decode a NUL-terminated UTF-16 buffer.
pub(crate) fn wide_to_string(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

fn device_class(dev_type: u32) -> Option<DeviceClass> {
    match dev_type & 0xFF {
        DI8DEVTYPE_JOYSTICK => Some(DeviceClass::Joystick),
        DI8DEVTYPE_GAMEPAD => Some(DeviceClass::Gamepad),
        DI8DEVTYPE_DRIVING => Some(DeviceClass::Driving),
        DI8DEVTYPE_FLIGHT => Some(DeviceClass::Flight),
        _ => None,
    }
}

fn device_type(class: DeviceClass) -> u32 {
    match class {
        DeviceClass::Joystick => DI8DEVTYPE_JOYSTICK,
        DeviceClass::Gamepad => DI8DEVTYPE_GAMEPAD,
        DeviceClass::Driving => DI8DEVTYPE_DRIVING,
        DeviceClass::Flight => DI8DEVTYPE_FLIGHT,
    }
}

pub(crate) fn instance_from_raw(raw: &DIDEVICEINSTANCEW) -> DeviceInstance {
    let product = raw.guidProduct.to_u128();
    DeviceInstance {
        identity: DeviceIdentity::from_u128(raw.guidInstance.to_u128()),
        product,
        instance_name: wide_to_string(&raw.tszInstanceName),
        product_name: wide_to_string(&raw.tszProductName),
        ff_driver: raw.guidFFDriver.to_u128(),
        class: device_class(raw.dwDevType),
        usage_page: raw.wUsagePage,
        usage: raw.wUsage,
        meta: DeviceMeta {
            product_string: Some(wide_to_string(&raw.tszProductName)),
            ..DeviceMeta::from_product_guid(product)
        },
    }
}

unsafe extern "system" fn collect_device(
    instance: *mut DIDEVICEINSTANCEW,
    context: *mut c_void,
) -> BOOL {
    // SAFETY: `context` is the `Vec` passed to `EnumDevices` below and outlives the call;
    // `instance` is valid for the duration of the callback.
    let found = unsafe { &mut *(context as *mut Vec<DIDEVICEINSTANCEW>) };
    if let Some(instance) = unsafe { instance.as_ref() } {
        found.push(*instance);
    }
    BOOL(DIENUM_CONTINUE)
}

/// DirectInput 8 backend.
pub struct DirectInputBackend {
    input: IDirectInput8W,
    window: Option<HWND>,
}

impl DirectInputBackend {
    /// Create the DirectInput object. Devices use the foreground window at acquisition.
    pub fn new() -> Result<Self, BackendError> {
        // SAFETY: plain COM factory call; the out pointer is checked before use.
        let input = unsafe {
            let module = GetModuleHandleW(None).map_err(|e| BackendError::Init(native_error(e.code())))?;
            let mut raw: *mut c_void = std::ptr::null_mut();
            DirectInput8Create(
                HINSTANCE(module.0),
                DIRECTINPUT_VERSION,
                &IDirectInput8W::IID,
                &mut raw,
                None,
            )
            .map_err(|e| BackendError::Init(native_error(e.code())))?;
            if raw.is_null() {
                return Err(BackendError::Init(NativeError::InvalidPointer));
            }
            IDirectInput8W::from_raw(raw)
        };
        info!("DirectInput 8 initialized");
        Ok(Self {
            input,
            window: None,
        })
    }

    /// Bind devices to the host's window instead of whatever is in the foreground.
    pub fn with_window(mut self, window: HWND) -> Self {
        self.window = Some(window);
        self
    }
}

impl InputBackend for DirectInputBackend {
    fn name(&self) -> &str {
        "directinput8"
    }

    fn enumerate(
        &mut self,
        filter: DeviceClassFilter,
        attached_only: bool,
    ) -> Result<Vec<DeviceInstance>, NativeError> {
        let flags = if attached_only {
            DIEDFL_ATTACHEDONLY
        } else {
            DIEDFL_ALLDEVICES
        };

        let mut found: Vec<DIDEVICEINSTANCEW> = Vec::new();
        for class in filter.classes() {
            // SAFETY: `found` outlives the synchronous enumeration.
            check(unsafe {
                self.input.EnumDevices(
                    device_type(class),
                    Some(collect_device),
                    &mut found as *mut Vec<DIDEVICEINSTANCEW> as *mut c_void,
                    flags,
                )
            })?;
        }

        let catalog = HidCatalog::load();
        let instances = found
            .iter()
            .map(|raw| {
                let mut instance = instance_from_raw(raw);
                if let Some(catalog) = &catalog {
                    catalog.enrich(&mut instance.meta);
                }
                debug!(
                    device = %instance.identity,
                    class = ?instance.class,
                    vid_pid = instance.meta.vid_pid().as_deref().unwrap_or("-"),
                    "enumerated '{}'",
                    instance.instance_name
                );
                instance
            })
            .collect();
        Ok(instances)
    }

    fn create_device(
        &mut self,
        identity: DeviceIdentity,
    ) -> Result<Box<dyn NativeDevice>, NativeError> {
        let guid = GUID::from_u128(identity.as_u128());
        let mut device: Option<IDirectInputDevice8W> = None;
        // SAFETY: `guid` and `device` are live locals.
        check(unsafe { self.input.CreateDevice(&guid, &mut device, None) })?;
        let device = device.ok_or(NativeError::InvalidPointer)?;
        Ok(Box::new(DirectInputDevice::new(device, self.window)))
    }
}
