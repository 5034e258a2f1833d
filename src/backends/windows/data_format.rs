#![cfg(target_os = "windows")]

//! The joystick data format and the DirectInput GUIDs/flags it needs.
//!
//! `c_dfDIJoystick2` lives in a static import library the `windows` crate does not
//! link, so the layout is rebuilt here to match [`JoyState`] byte for byte:
//!
//! | offset  | objects                         |
//! |---------|---------------------------------|
//! | 0..32   | X, Y, Z, Rx, Ry, Rz, 2× slider  |
//! | 32..48  | 4 POV hats                      |
//! | 48..176 | 128 buttons                     |

use crate::state::JoyState;
use std::ptr;
use windows::core::GUID;
use windows::Win32::Devices::HumanInterfaceDevice::{DIDATAFORMAT, DIOBJECTDATAFORMAT};

pub static GUID_X_AXIS: GUID = GUID::from_u128(0xA36D02E0_C9F3_11CF_BFC7_444553540000);
pub static GUID_Y_AXIS: GUID = GUID::from_u128(0xA36D02E1_C9F3_11CF_BFC7_444553540000);
pub static GUID_Z_AXIS: GUID = GUID::from_u128(0xA36D02E2_C9F3_11CF_BFC7_444553540000);
pub static GUID_RX_AXIS: GUID = GUID::from_u128(0xA36D02F4_C9F3_11CF_BFC7_444553540000);
pub static GUID_RY_AXIS: GUID = GUID::from_u128(0xA36D02F5_C9F3_11CF_BFC7_444553540000);
pub static GUID_RZ_AXIS: GUID = GUID::from_u128(0xA36D02E3_C9F3_11CF_BFC7_444553540000);
pub static GUID_SLIDER: GUID = GUID::from_u128(0xA36D02E4_C9F3_11CF_BFC7_444553540000);
pub static GUID_POV: GUID = GUID::from_u128(0xA36D02F2_C9F3_11CF_BFC7_444553540000);
pub static GUID_CONSTANT_FORCE: GUID = GUID::from_u128(0x13541C20_8E33_11D0_9AD0_00A0C9A06E35);

pub const DIRECTINPUT_VERSION: u32 = 0x0800;

pub const DI8DEVTYPE_JOYSTICK: u32 = 0x14;
pub const DI8DEVTYPE_GAMEPAD: u32 = 0x15;
pub const DI8DEVTYPE_DRIVING: u32 = 0x16;
pub const DI8DEVTYPE_FLIGHT: u32 = 0x17;

pub const DIEDFL_ALLDEVICES: u32 = 0x0000_0000;
pub const DIEDFL_ATTACHEDONLY: u32 = 0x0000_0001;
pub const DIENUM_CONTINUE: i32 = 1;

pub const DISCL_EXCLUSIVE: u32 = 0x0000_0001;
pub const DISCL_NONEXCLUSIVE: u32 = 0x0000_0002;
pub const DISCL_FOREGROUND: u32 = 0x0000_0004;
pub const DISCL_BACKGROUND: u32 = 0x0000_0008;

pub const DIDC_FORCEFEEDBACK: u32 = 0x0000_0100;

pub const DIDFT_AXIS: u32 = 0x0000_0003;
pub const DIDFT_BUTTON: u32 = 0x0000_000C;
pub const DIDFT_POV: u32 = 0x0000_0010;
pub const DIDFT_ANYINSTANCE: u32 = 0x00FF_FF00;
pub const DIDFT_OPTIONAL: u32 = 0x8000_0000;
pub const DIDOI_FFACTUATOR: u32 = 0x0000_0001;
pub const DIDOI_ASPECTPOSITION: u32 = 0x0000_0100;
pub const DIDF_ABSAXIS: u32 = 0x0000_0001;

pub const DIEFF_OBJECTOFFSETS: u32 = 0x0000_0002;
pub const DIEFF_CARTESIAN: u32 = 0x0000_0010;
pub const DIEP_TYPESPECIFICPARAMS: u32 = 0x0000_0100;
pub const DIEP_START: u32 = 0x2000_0000;
pub const DIEB_NOTRIGGER: u32 = 0xFFFF_FFFF;
pub const DI_FFNOMINALMAX: u32 = 10_000;
pub const INFINITE: u32 = 0xFFFF_FFFF;

const OBJECT_COUNT: usize = JoyState::AXES + JoyState::POVS + JoyState::BUTTONS;

/// Object list for [`JoyState`]. Must outlive the `SetDataFormat` call it is used in.
pub struct JoystickFormat {
    objects: Vec<DIOBJECTDATAFORMAT>,
}

impl JoystickFormat {
    pub fn new() -> Self {
        let axis_guids: [&'static GUID; JoyState::AXES] = [
            &GUID_X_AXIS,
            &GUID_Y_AXIS,
            &GUID_Z_AXIS,
            &GUID_RX_AXIS,
            &GUID_RY_AXIS,
            &GUID_RZ_AXIS,
            &GUID_SLIDER,
            &GUID_SLIDER,
        ];

        let mut objects = Vec::with_capacity(OBJECT_COUNT);
        for (slot, guid) in axis_guids.into_iter().enumerate() {
            objects.push(DIOBJECTDATAFORMAT {
                pguid: guid,
                dwOfs: JoyState::axis_offset(slot),
                dwType: DIDFT_AXIS | DIDFT_ANYINSTANCE | DIDFT_OPTIONAL,
                dwFlags: DIDOI_ASPECTPOSITION,
            });
        }
        for pov in 0..JoyState::POVS {
            objects.push(DIOBJECTDATAFORMAT {
                pguid: &GUID_POV,
                dwOfs: JoyState::pov_offset(pov),
                dwType: DIDFT_POV | DIDFT_ANYINSTANCE | DIDFT_OPTIONAL,
                dwFlags: 0,
            });
        }
        for button in 0..JoyState::BUTTONS {
            objects.push(DIOBJECTDATAFORMAT {
                pguid: ptr::null(),
                dwOfs: JoyState::button_offset(button),
                dwType: DIDFT_BUTTON | DIDFT_ANYINSTANCE | DIDFT_OPTIONAL,
                dwFlags: 0,
            });
        }
        Self { objects }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Borrow as a `DIDATAFORMAT` pointing into `self`.
    pub fn as_raw(&mut self) -> DIDATAFORMAT {
        DIDATAFORMAT {
            dwSize: std::mem::size_of::<DIDATAFORMAT>() as u32,
            dwObjSize: std::mem::size_of::<DIOBJECTDATAFORMAT>() as u32,
            dwFlags: DIDF_ABSAXIS,
            dwDataSize: std::mem::size_of::<JoyState>() as u32,
            dwNumObjs: self.objects.len() as u32,
            rgodf: self.objects.as_mut_ptr(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_covers_every_state_field() {
        let mut format = JoystickFormat::new();
        assert_eq!(format.len(), OBJECT_COUNT);
        let raw = format.as_raw();
        assert_eq!(raw.dwDataSize, 176);
        assert_eq!(raw.dwDataSize % 4, 0);
    }
}
