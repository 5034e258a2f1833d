//! Native device seam.
//!
//! A backend exposes three things:
//! - [`InputBackend`]: enumerate attached devices and open one by identity
//! - [`NativeDevice`]: the per-device enumerate/acquire/poll protocol
//! - [`NativeEffect`]: one constant-force effect created on a device
//!
//! Everything above this module ([`DeviceSession`](crate::session::DeviceSession),
//! [`DeviceRegistry`](crate::registry::DeviceRegistry), the event pump) is written
//! against these traits only. Backends translate their raw status codes into
//! [`NativeError`] before returning.
//!
//! Enumeration is a plain synchronous call that returns a finite list. The registry
//! walks it once per scan.

use crate::error::NativeError;
use crate::metadata::DeviceMeta;
use crate::state::JoyState;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Globally unique instance identifier of one physical device.
///
/// Stable across scans while the device stays plugged into the same port. Used as the
/// registry's de-duplication key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceIdentity(Uuid);

impl DeviceIdentity {
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub const fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for DeviceIdentity {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Registry format: `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}`.
impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0.braced())
    }
}

/// Device category as reported by the native enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Driving,
    Flight,
    Gamepad,
    Joystick,
}

impl DeviceClass {
    const fn bit(self) -> u8 {
        match self {
            DeviceClass::Driving => 1 << 0,
            DeviceClass::Flight => 1 << 1,
            DeviceClass::Gamepad => 1 << 2,
            DeviceClass::Joystick => 1 << 3,
        }
    }

    const ALL: [DeviceClass; 4] = [
        DeviceClass::Driving,
        DeviceClass::Flight,
        DeviceClass::Gamepad,
        DeviceClass::Joystick,
    ];
}

/// Set of [`DeviceClass`]es a scan is restricted to.
///
/// Serialized as a list, e.g. `["driving", "flight"]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<DeviceClass>", into = "Vec<DeviceClass>")]
pub struct DeviceClassFilter(u8);

impl DeviceClassFilter {
    pub const NONE: Self = Self(0);
    pub const DRIVING: Self = Self(DeviceClass::Driving.bit());
    pub const FLIGHT: Self = Self(DeviceClass::Flight.bit());

    pub const fn with(self, class: DeviceClass) -> Self {
        Self(self.0 | class.bit())
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(&self, class: DeviceClass) -> bool {
        self.0 & class.bit() != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn classes(&self) -> impl Iterator<Item = DeviceClass> + '_ {
        DeviceClass::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl From<Vec<DeviceClass>> for DeviceClassFilter {
    fn from(classes: Vec<DeviceClass>) -> Self {
        classes
            .into_iter()
            .fold(DeviceClassFilter::NONE, DeviceClassFilter::with)
    }
}

impl From<DeviceClassFilter> for Vec<DeviceClass> {
    fn from(filter: DeviceClassFilter) -> Self {
        filter.classes().collect()
    }
}

impl fmt::Debug for DeviceClassFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.classes()).finish()
    }
}

/// Exclusivity/focus policy requested when acquiring a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooperativeLevel {
    /// Exclusive access is required for force feedback.
    pub exclusive: bool,
    /// Keep receiving input while the host window is not focused.
    pub background: bool,
}

impl CooperativeLevel {
    pub const EXCLUSIVE_BACKGROUND: Self = Self {
        exclusive: true,
        background: true,
    };
}

impl Default for CooperativeLevel {
    fn default() -> Self {
        Self::EXCLUSIVE_BACKGROUND
    }
}

/// One entry from device enumeration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceInstance {
    pub identity: DeviceIdentity,
    /// Product GUID; for HID devices the low 32 bits of the first field carry VID/PID.
    pub product: u128,
    pub instance_name: String,
    pub product_name: String,
    /// Force-feedback driver GUID, zero when the device has none.
    pub ff_driver: u128,
    pub class: Option<DeviceClass>,
    pub usage_page: u16,
    pub usage: u16,
    pub meta: DeviceMeta,
}

impl DeviceInstance {
    /// Minimal instance with only an identity and names.
    pub fn new(identity: DeviceIdentity, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            identity,
            product: 0,
            instance_name: name.clone(),
            product_name: name,
            ff_driver: 0,
            class: None,
            usage_page: 0,
            usage: 0,
            meta: DeviceMeta::default(),
        }
    }
}

/// Counts reported by the device at acquisition. Clamped to the fixed state layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub axes: usize,
    pub buttons: usize,
    pub povs: usize,
    pub force_feedback: bool,
}

impl DeviceCapabilities {
    pub fn new(axes: usize, buttons: usize, povs: usize) -> Self {
        Self {
            axes,
            buttons,
            povs,
            force_feedback: false,
        }
        .clamped()
    }

    /// Cap the counts at what [`JoyState`] can hold.
    pub fn clamped(self) -> Self {
        Self {
            axes: self.axes.min(JoyState::AXES),
            buttons: self.buttons.min(JoyState::BUTTONS),
            povs: self.povs.min(JoyState::POVS),
            force_feedback: self.force_feedback,
        }
    }
}

/// One axis object reported by object enumeration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInstance {
    pub name: String,
    pub usage_page: u16,
    pub usage: u16,
    /// Byte offset of the object inside the native state record.
    pub offset: u32,
    pub ff_max_force: u32,
    pub ff_force_resolution: u32,
    pub ff_actuator: bool,
}

/// Enumerates devices and opens them.
pub trait InputBackend {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// List devices in the given classes. The list is consumed once by the caller.
    fn enumerate(
        &mut self,
        filter: DeviceClassFilter,
        attached_only: bool,
    ) -> Result<Vec<DeviceInstance>, NativeError>;

    /// Open a device handle for a previously enumerated identity.
    fn create_device(
        &mut self,
        identity: DeviceIdentity,
    ) -> Result<Box<dyn NativeDevice>, NativeError>;
}

/// The per-device native protocol.
///
/// Implementations release their native resources on drop.
pub trait NativeDevice {
    fn set_cooperative_level(&mut self, level: CooperativeLevel) -> Result<(), NativeError>;

    /// Select the fixed joystick layout that [`JoyState`] mirrors.
    fn set_data_format(&mut self) -> Result<(), NativeError>;

    fn acquire(&mut self) -> Result<(), NativeError>;

    fn unacquire(&mut self);

    fn device_info(&self) -> Result<DeviceInstance, NativeError>;

    fn capabilities(&self) -> Result<DeviceCapabilities, NativeError>;

    /// Axis objects in native enumeration order.
    fn axis_objects(&self) -> Result<Vec<ObjectInstance>, NativeError>;

    /// Ask the device to refresh its internal buffer.
    fn poll(&mut self) -> Result<(), NativeError>;

    /// Read the full device state. `state` arrives zeroed.
    fn read_state(&mut self, state: &mut JoyState) -> Result<(), NativeError>;

    /// Create (but do not start) an infinite constant-force effect on the axis at
    /// `axis_offset`, with zero magnitude and no trigger button.
    fn create_constant_force(
        &mut self,
        axis_offset: u32,
    ) -> Result<Box<dyn NativeEffect>, NativeError>;
}

/// A constant-force effect living on a device.
pub trait NativeEffect {
    fn start(&mut self) -> Result<(), NativeError>;

    /// Replace the magnitude and restart the effect.
    fn set_magnitude(&mut self, magnitude: i32) -> Result<(), NativeError>;

    fn stop(&mut self) -> Result<(), NativeError>;
}
