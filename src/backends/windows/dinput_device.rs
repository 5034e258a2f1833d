#![cfg(target_os = "windows")]

//! `IDirectInputDevice8W` and `IDirectInputEffect` behind the native seam.

use super::data_format::{
    JoystickFormat, DIDC_FORCEFEEDBACK, DIDFT_AXIS, DIDOI_FFACTUATOR, DIEB_NOTRIGGER,
    DIEFF_CARTESIAN, DIEFF_OBJECTOFFSETS, DIENUM_CONTINUE, DIEP_START, DIEP_TYPESPECIFICPARAMS,
    DISCL_BACKGROUND, DISCL_EXCLUSIVE, DISCL_FOREGROUND, DISCL_NONEXCLUSIVE, DI_FFNOMINALMAX,
    GUID_CONSTANT_FORCE, INFINITE,
};
use super::dinput::{instance_from_raw, wide_to_string};
use super::hresult::check;
use crate::device::{
    CooperativeLevel, DeviceCapabilities, DeviceInstance, NativeDevice, NativeEffect,
    ObjectInstance,
};
use crate::error::NativeError;
use crate::state::JoyState;
use std::ffi::c_void;
use std::mem::size_of;
use windows::core::BOOL;
use windows::Win32::Devices::HumanInterfaceDevice::{
    IDirectInputDevice8W, IDirectInputEffect, DICONSTANTFORCE, DIDEVCAPS,
    DIDEVICEINSTANCEW, DIDEVICEOBJECTINSTANCEW, DIEFFECT,
};
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::GetForegroundWindow;

fn cooperative_flags(level: CooperativeLevel) -> u32 {
    let access = if level.exclusive {
        DISCL_EXCLUSIVE
    } else {
        DISCL_NONEXCLUSIVE
    };
    let focus = if level.background {
        DISCL_BACKGROUND
    } else {
        DISCL_FOREGROUND
    };
    access | focus
}

unsafe extern "system" fn collect_object(
    object: *mut DIDEVICEOBJECTINSTANCEW,
    context: *mut c_void,
) -> BOOL {
    // SAFETY: `context` is the `Vec` passed to `EnumObjects` and outlives the call.
    let found = unsafe { &mut *(context as *mut Vec<ObjectInstance>) };
    if let Some(object) = unsafe { object.as_ref() } {
        found.push(ObjectInstance {
            name: wide_to_string(&object.tszName),
            usage_page: object.wUsagePage,
            usage: object.wUsage,
            offset: object.dwOfs,
            ff_max_force: object.dwFFMaxForce,
            ff_force_resolution: object.dwFFForceResolution,
            ff_actuator: object.dwFlags & DIDOI_FFACTUATOR != 0,
        });
    }
    BOOL(DIENUM_CONTINUE)
}

pub struct DirectInputDevice {
    device: IDirectInputDevice8W,
    window: Option<HWND>,
}

impl DirectInputDevice {
    pub fn new(device: IDirectInputDevice8W, window: Option<HWND>) -> Self {
        Self { device, window }
    }
}

impl NativeDevice for DirectInputDevice {
    fn set_cooperative_level(&mut self, level: CooperativeLevel) -> Result<(), NativeError> {
        // SAFETY: the window handle is only passed through to DirectInput.
        let window = self
            .window
            .unwrap_or_else(|| unsafe { GetForegroundWindow() });
        check(unsafe {
            self.device
                .SetCooperativeLevel(window, cooperative_flags(level))
        })
    }

    fn set_data_format(&mut self) -> Result<(), NativeError> {
        let mut format = JoystickFormat::new();
        let mut raw = format.as_raw();
        // SAFETY: DirectInput copies the format; `format` outlives the call.
        check(unsafe { self.device.SetDataFormat(&mut raw) })
    }

    fn acquire(&mut self) -> Result<(), NativeError> {
        check(unsafe { self.device.Acquire() })
    }

    fn unacquire(&mut self) {
        // Unacquiring a device that is not acquired only reports DI_NOEFFECT.
        let _ = unsafe { self.device.Unacquire() };
    }

    fn device_info(&self) -> Result<DeviceInstance, NativeError> {
        // SAFETY: zeroed POD with the size field set, as DirectInput requires.
        let mut raw: DIDEVICEINSTANCEW = unsafe { std::mem::zeroed() };
        raw.dwSize = size_of::<DIDEVICEINSTANCEW>() as u32;
        check(unsafe { self.device.GetDeviceInfo(&mut raw) })?;
        Ok(instance_from_raw(&raw))
    }

    fn capabilities(&self) -> Result<DeviceCapabilities, NativeError> {
        // SAFETY: as above.
        let mut caps: DIDEVCAPS = unsafe { std::mem::zeroed() };
        caps.dwSize = size_of::<DIDEVCAPS>() as u32;
        check(unsafe { self.device.GetCapabilities(&mut caps) })?;
        Ok(DeviceCapabilities {
            axes: caps.dwAxes as usize,
            buttons: caps.dwButtons as usize,
            povs: caps.dwPOVs as usize,
            force_feedback: caps.dwFlags & DIDC_FORCEFEEDBACK != 0,
        }
        .clamped())
    }

    fn axis_objects(&self) -> Result<Vec<ObjectInstance>, NativeError> {
        let mut found: Vec<ObjectInstance> = Vec::new();
        // SAFETY: `found` outlives the synchronous enumeration.
        check(unsafe {
            self.device.EnumObjects(
                Some(collect_object),
                &mut found as *mut Vec<ObjectInstance> as *mut c_void,
                DIDFT_AXIS,
            )
        })?;
        Ok(found)
    }

    fn poll(&mut self) -> Result<(), NativeError> {
        check(unsafe { self.device.Poll() })
    }

    fn read_state(&mut self, state: &mut JoyState) -> Result<(), NativeError> {
        // SAFETY: `JoyState` is `repr(C)` and matches the registered data format size.
        check(unsafe {
            self.device.GetDeviceState(
                size_of::<JoyState>() as u32,
                state as *mut JoyState as *mut c_void,
            )
        })
    }

    fn create_constant_force(
        &mut self,
        axis_offset: u32,
    ) -> Result<Box<dyn NativeEffect>, NativeError> {
        let mut axes = [axis_offset];
        let mut directions = [0i32];
        let mut force = DICONSTANTFORCE { lMagnitude: 0 };
        // SAFETY: every pointer below refers to a local that outlives `CreateEffect`,
        // which copies the parameters.
        let mut params: DIEFFECT = unsafe { std::mem::zeroed() };
        params.dwSize = size_of::<DIEFFECT>() as u32;
        params.dwFlags = DIEFF_CARTESIAN | DIEFF_OBJECTOFFSETS;
        params.dwDuration = INFINITE;
        params.dwGain = DI_FFNOMINALMAX;
        params.dwTriggerButton = DIEB_NOTRIGGER;
        params.cAxes = 1;
        params.rgdwAxes = axes.as_mut_ptr();
        params.rglDirection = directions.as_mut_ptr();
        params.cbTypeSpecificParams = size_of::<DICONSTANTFORCE>() as u32;
        params.lpvTypeSpecificParams = &mut force as *mut DICONSTANTFORCE as *mut c_void;

        let mut effect: Option<IDirectInputEffect> = None;
        check(unsafe {
            self.device
                .CreateEffect(&GUID_CONSTANT_FORCE, &mut params, &mut effect, None)
        })?;
        let effect = effect.ok_or(NativeError::InvalidPointer)?;
        Ok(Box::new(DirectInputEffect { effect }))
    }
}

impl Drop for DirectInputDevice {
    fn drop(&mut self) {
        self.unacquire();
    }
}

pub struct DirectInputEffect {
    effect: IDirectInputEffect,
}

impl NativeEffect for DirectInputEffect {
    fn start(&mut self) -> Result<(), NativeError> {
        check(unsafe { self.effect.Start(INFINITE, 0) })
    }

    fn set_magnitude(&mut self, magnitude: i32) -> Result<(), NativeError> {
        let mut force = DICONSTANTFORCE {
            lMagnitude: magnitude,
        };
        // SAFETY: `force` outlives the call.
        let mut params: DIEFFECT = unsafe { std::mem::zeroed() };
        params.dwSize = size_of::<DIEFFECT>() as u32;
        params.cbTypeSpecificParams = size_of::<DICONSTANTFORCE>() as u32;
        params.lpvTypeSpecificParams = &mut force as *mut DICONSTANTFORCE as *mut c_void;
        check(unsafe {
            self.effect
                .SetParameters(&mut params, DIEP_TYPESPECIFICPARAMS | DIEP_START)
        })
    }

    fn stop(&mut self) -> Result<(), NativeError> {
        check(unsafe { self.effect.Stop() })
    }
}
