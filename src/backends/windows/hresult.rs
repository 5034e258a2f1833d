#![cfg(target_os = "windows")]

//! DirectInput result codes.
//!
//! The only place raw `HRESULT`s are looked at. Constants are defined locally to avoid
//! relying on module exports that vary by `windows` crate version.

use crate::error::NativeError;
use windows::core::HRESULT;

const DIERR_INVALIDPARAM: u32 = 0x8007_0057;
const DIERR_NOTINITIALIZED: u32 = 0x8007_0015;
const E_HANDLE: u32 = 0x8007_0006;
const DIERR_ACQUIRED: u32 = 0x8007_00AA;
const DIERR_OTHERAPPHASPRIO: u32 = 0x8007_0005;
const DIERR_INPUTLOST: u32 = 0x8007_001E;
const DIERR_NOTACQUIRED: u32 = 0x8007_000C;
const DIERR_UNPLUGGED: u32 = 0x8004_0209;
const E_PENDING: u32 = 0x8000_000A;
const DIERR_DEVICEFULL: u32 = 0x8004_0201;
const DIERR_DEVICENOTREG: u32 = 0x8004_0154;
const DIERR_INCOMPLETEEFFECT: u32 = 0x8004_0206;
const DIERR_NOTEXCLUSIVEACQUIRED: u32 = 0x8004_0205;
const DIERR_EFFECTPLAYING: u32 = 0x8004_0208;
const DIERR_UNSUPPORTED: u32 = 0x8000_4001;
const E_POINTER: u32 = 0x8000_4003;

pub fn native_error(code: HRESULT) -> NativeError {
    match code.0 as u32 {
        DIERR_INVALIDPARAM => NativeError::InvalidParam,
        DIERR_NOTINITIALIZED => NativeError::NotInitialized,
        E_HANDLE => NativeError::InvalidHandle,
        DIERR_ACQUIRED => NativeError::Acquired,
        DIERR_OTHERAPPHASPRIO => NativeError::OtherAppHasPriority,
        DIERR_INPUTLOST => NativeError::InputLost,
        DIERR_NOTACQUIRED => NativeError::NotAcquired,
        DIERR_UNPLUGGED => NativeError::Unplugged,
        E_PENDING => NativeError::Pending,
        DIERR_DEVICEFULL => NativeError::DeviceFull,
        DIERR_DEVICENOTREG => NativeError::DeviceNotRegistered,
        DIERR_INCOMPLETEEFFECT => NativeError::IncompleteEffect,
        DIERR_NOTEXCLUSIVEACQUIRED => NativeError::NotExclusiveAcquired,
        DIERR_EFFECTPLAYING => NativeError::EffectPlaying,
        DIERR_UNSUPPORTED => NativeError::Unsupported,
        E_POINTER => NativeError::InvalidPointer,
        other => NativeError::Other(other),
    }
}

/// Map a `windows` call result. Success codes (`DI_NOEFFECT` etc.) are `Ok`.
pub fn check(result: windows::core::Result<()>) -> Result<(), NativeError> {
    result.map_err(|e| native_error(e.code()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_codes() {
        assert_eq!(native_error(HRESULT(0x8007_001E_u32 as i32)), NativeError::InputLost);
        assert_eq!(native_error(HRESULT(0x8000_000A_u32 as i32)), NativeError::Pending);
        assert_eq!(native_error(HRESULT(0x8004_0209_u32 as i32)), NativeError::Unplugged);
        assert_eq!(
            native_error(HRESULT(0x8004_0201_u32 as i32)),
            NativeError::DeviceFull
        );
        assert_eq!(
            native_error(HRESULT(0x8000_4005_u32 as i32)),
            NativeError::Other(0x8000_4005)
        );
    }
}
