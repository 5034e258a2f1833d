//! One acquired device.
//!
//! [`DeviceSession`] owns a native device handle and everything tied to it:
//! - the acquisition state (cooperative level, data format, acquire)
//! - capability counts and the eight canonical axis descriptors
//! - the double-buffered [`StateBuffers`]
//! - at most one constant-force effect
//!
//! A session that fails to acquire stays alive as *unavailable*. Retryable failures are
//! retried through [`DeviceSession::poll`]'s recovery path; setup faults are not.
//!
//! Accessors are bounds-checked against the capability counts and return `0`/`false`
//! for anything out of range.

use crate::device::{
    CooperativeLevel, DeviceCapabilities, DeviceIdentity, DeviceInstance, NativeDevice,
    NativeEffect, ObjectInstance,
};
use crate::error::{
    AcquireError, EffectError, EffectStep, FaultKind, PollError, PollStep, QueryError, SetupStep,
};
use crate::ffb::{magnitude_from_normalized, EffectState};
use crate::metadata::DeviceMeta;
use crate::state::{JoyState, StateBuffers};
use serde::Serialize;
use tracing::{debug, info, warn};

/// HID Generic Desktop usage page.
const USAGE_PAGE_GENERIC_DESKTOP: u16 = 0x01;

/// Semantic names of the axis slots, in slot order.
pub const AXIS_SLOT_NAMES: [&str; JoyState::AXES] =
    ["X", "Y", "Z", "Rx", "Ry", "Rz", "Slider", "Dial"];

/// Map a Generic Desktop usage (0x30..=0x37) to its axis slot.
pub fn axis_slot_for_usage(usage: u16) -> Option<usize> {
    match usage {
        0x30..=0x37 => Some(usize::from(usage - 0x30)),
        _ => None,
    }
}

/// Per-axis metadata gathered during object enumeration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AxisDescriptor {
    pub name: String,
    pub usage: u16,
    pub max_force: u32,
    pub force_resolution: u32,
    pub force_actuator: bool,
}

impl From<&ObjectInstance> for AxisDescriptor {
    fn from(object: &ObjectInstance) -> Self {
        Self {
            name: object.name.clone(),
            usage: object.usage,
            max_force: object.ff_max_force,
            force_resolution: object.ff_force_resolution,
            force_actuator: object.ff_actuator,
        }
    }
}

/// Whether the session currently holds the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Available,
    Unavailable(AcquireError),
}

/// Settings applied when a session opens its device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    pub cooperative_level: CooperativeLevel,
    /// Axis slot for the constant-force effect.
    pub effect_axis: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            cooperative_level: CooperativeLevel::EXCLUSIVE_BACKGROUND,
            effect_axis: 0,
        }
    }
}

pub struct DeviceSession {
    // Declared before `device` so the effect is released first.
    effect: Option<Box<dyn NativeEffect>>,
    device: Box<dyn NativeDevice>,
    instance: DeviceInstance,
    options: SessionOptions,
    status: SessionStatus,
    caps: DeviceCapabilities,
    axes: [Option<AxisDescriptor>; JoyState::AXES],
    buffers: StateBuffers,
    effect_state: Option<EffectState>,
    effect_attempted: bool,
    last_poll_ok: bool,
}

impl DeviceSession {
    /// Take ownership of `device` and bring it up.
    ///
    /// Acquisition is attempted once; device info, capabilities and axis objects are
    /// read regardless of the outcome. The constant-force effect is created only after
    /// a successful acquisition.
    pub fn open(
        instance: DeviceInstance,
        device: Box<dyn NativeDevice>,
        options: SessionOptions,
    ) -> Self {
        let mut session = Self {
            effect: None,
            device,
            instance,
            options,
            status: SessionStatus::Available,
            caps: DeviceCapabilities::default(),
            axes: Default::default(),
            buffers: StateBuffers::new(),
            effect_state: None,
            effect_attempted: false,
            last_poll_ok: true,
        };

        // Failures are logged and recorded in `status`.
        let acquired = session.acquire().is_ok();
        session.refresh_device_info();
        if let Err(e) = session.read_capabilities_and_axes() {
            warn!(device = %session.identity(), kind = ?e.kind(), "{e}");
        }
        if acquired {
            session.ensure_effect();
        }

        info!(
            device = %session.identity(),
            available = session.is_available(),
            "{} has {} axes, {} buttons and {} POVs",
            session.instance_name(),
            session.caps.axes,
            session.caps.buttons,
            session.caps.povs,
        );
        session
    }

    /// Set cooperative level and data format, then acquire.
    ///
    /// Updates [`SessionStatus`] either way.
    pub fn acquire(&mut self) -> Result<(), AcquireError> {
        let result = self.try_acquire();
        match result {
            Ok(()) => self.status = SessionStatus::Available,
            Err(e) => {
                if self.status == SessionStatus::Unavailable(e) {
                    debug!(device = %self.identity(), kind = ?e.kind(), "{e}");
                } else {
                    warn!(device = %self.identity(), kind = ?e.kind(), "{e}");
                }
                self.status = SessionStatus::Unavailable(e);
            }
        }
        result
    }

    fn try_acquire(&mut self) -> Result<(), AcquireError> {
        self.device.unacquire();
        self.device
            .set_cooperative_level(self.options.cooperative_level)
            .map_err(|e| AcquireError::from_native(SetupStep::CooperativeLevel, e))?;
        self.device
            .set_data_format()
            .map_err(|e| AcquireError::from_native(SetupStep::DataFormat, e))?;
        self.device
            .acquire()
            .map_err(|e| AcquireError::from_native(SetupStep::Acquire, e))
    }

    fn refresh_device_info(&mut self) {
        match self.device.device_info() {
            Ok(info) => {
                // Enumeration already knows identity, class and the HID-side metadata.
                let previous = std::mem::replace(&mut self.instance, info);
                let decoded = DeviceMeta::from_product_guid(self.instance.product);
                self.instance.identity = previous.identity;
                self.instance.class = self.instance.class.or(previous.class);

                let meta = &mut self.instance.meta;
                let known = previous.meta;
                meta.vid = meta.vid.or(decoded.vid).or(known.vid);
                meta.pid = meta.pid.or(decoded.pid).or(known.pid);
                meta.product_string = meta.product_string.take().or(known.product_string);
                meta.serial_number = meta.serial_number.take().or(known.serial_number);
                meta.interface_number = meta.interface_number.or(known.interface_number);
                meta.path = meta.path.take().or(known.path);
            }
            Err(e) => {
                let e = QueryError::DeviceInfo(e);
                warn!(device = %self.identity(), kind = ?e.kind(), "{e}");
            }
        }
    }

    /// Read capability counts and map axis objects onto the canonical slots.
    ///
    /// Objects outside Generic Desktop usages 0x30..=0x37 are logged and skipped.
    pub fn read_capabilities_and_axes(&mut self) -> Result<(), QueryError> {
        let caps = self
            .device
            .capabilities()
            .map_err(QueryError::Capabilities)?;
        self.caps = caps.clamped();

        let objects = self.device.axis_objects().map_err(QueryError::Objects)?;
        self.axes = Default::default();
        for object in &objects {
            debug!(
                device = %self.identity(),
                usage_page = object.usage_page,
                usage = object.usage,
                max_force = object.ff_max_force,
                resolution = object.ff_force_resolution,
                actuator = object.ff_actuator,
                "axis object '{}'",
                object.name
            );

            if object.usage_page != USAGE_PAGE_GENERIC_DESKTOP {
                warn!(
                    device = %self.identity(),
                    "unsupported HID page {:#04x}, usage {:#04x}",
                    object.usage_page,
                    object.usage
                );
                continue;
            }
            match axis_slot_for_usage(object.usage) {
                Some(slot) => self.axes[slot] = Some(AxisDescriptor::from(object)),
                None => warn!(device = %self.identity(), "unknown axis {:#04x}", object.usage),
            }
        }
        Ok(())
    }

    fn ensure_effect(&mut self) {
        if self.effect_attempted {
            return;
        }
        self.effect_attempted = true;
        // Logged inside.
        let _ = self.create_effect(self.options.effect_axis);
    }

    /// Create and start an infinite constant-force effect on `axis_slot`.
    ///
    /// Replaces any existing effect. On failure the session is left without one.
    pub fn create_effect(&mut self, axis_slot: usize) -> Result<(), EffectError> {
        self.release_effect();

        if axis_slot >= JoyState::AXES {
            let e = EffectError::AxisOutOfRange(axis_slot);
            warn!(device = %self.identity(), "{e}");
            return Err(e);
        }

        let result = self
            .device
            .create_constant_force(JoyState::axis_offset(axis_slot))
            .map_err(|e| EffectError::from_native(EffectStep::Create, e))
            .and_then(|mut effect| {
                effect
                    .start()
                    .map_err(|e| EffectError::from_native(EffectStep::Start, e))?;
                Ok(effect)
            });

        match result {
            Ok(effect) => {
                self.effect = Some(effect);
                self.effect_state = Some(EffectState {
                    axis_slot,
                    magnitude: 0,
                    running: true,
                });
                Ok(())
            }
            Err(e) => {
                warn!(device = %self.identity(), kind = ?e.kind(), "{e}");
                Err(e)
            }
        }
    }

    /// Set the effect magnitude from a normalized value in `[-1, 1]` and restart it.
    ///
    /// Returns [`EffectError::NoEffect`] when the session has no usable effect.
    pub fn update_effect(&mut self, value: f32) -> Result<(), EffectError> {
        let (Some(effect), Some(state)) = (self.effect.as_mut(), self.effect_state.as_mut())
        else {
            return Err(EffectError::NoEffect);
        };

        let magnitude = magnitude_from_normalized(value);
        match effect.set_magnitude(magnitude) {
            Ok(()) => {
                state.magnitude = magnitude;
                state.running = true;
                Ok(())
            }
            Err(e) => {
                let e = EffectError::from_native(EffectStep::Update, e);
                debug!(device = %self.instance.identity, kind = ?e.kind(), "{e}");
                Err(e)
            }
        }
    }

    fn release_effect(&mut self) {
        if let Some(mut effect) = self.effect.take() {
            if let Err(e) = effect.stop() {
                let e = EffectError::from_native(EffectStep::Stop, e);
                debug!(device = %self.instance.identity, "{e}");
            }
        }
        self.effect_state = None;
    }

    /// Refresh the device and rotate the state buffers.
    ///
    /// On failure neither buffer is touched. Lost/unacquired devices are re-acquired
    /// immediately; priority conflicts and pending data are left for a later tick.
    pub fn poll(&mut self) -> Result<(), PollError> {
        if let SessionStatus::Unavailable(reason) = self.status {
            if !reason.is_retryable() {
                return Err(PollError::Unavailable(reason));
            }
        }

        if let Err(e) = self.device.poll() {
            return Err(self.poll_failed(PollError::from_native(PollStep::Poll, e)));
        }

        let mut next = JoyState::ZERO;
        if let Err(e) = self.device.read_state(&mut next) {
            return Err(self.poll_failed(PollError::from_native(PollStep::ReadState, e)));
        }

        if !self.last_poll_ok {
            info!(device = %self.identity(), "{} recovered", self.instance_name());
        }
        self.last_poll_ok = true;
        self.buffers.advance(next);
        Ok(())
    }

    fn poll_failed(&mut self, error: PollError) -> PollError {
        // Only the first failure of a streak is worth a warning.
        if self.last_poll_ok && error.kind() != FaultKind::Pending {
            warn!(device = %self.identity(), kind = ?error.kind(), "{error}");
        } else {
            debug!(device = %self.identity(), kind = ?error.kind(), "{error}");
        }
        self.last_poll_ok = false;

        if error.needs_reacquire() && self.acquire().is_ok() {
            self.ensure_effect();
        }
        error
    }

    pub fn identity(&self) -> DeviceIdentity {
        self.instance.identity
    }

    pub fn instance(&self) -> &DeviceInstance {
        &self.instance
    }

    pub fn instance_name(&self) -> &str {
        &self.instance.instance_name
    }

    pub fn product_name(&self) -> &str {
        &self.instance.product_name
    }

    pub fn product_guid(&self) -> u128 {
        self.instance.product
    }

    pub fn force_driver_guid(&self) -> u128 {
        self.instance.ff_driver
    }

    pub fn meta(&self) -> &DeviceMeta {
        &self.instance.meta
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_available(&self) -> bool {
        self.status == SessionStatus::Available
    }

    pub fn capabilities(&self) -> DeviceCapabilities {
        self.caps
    }

    pub fn num_axes(&self) -> usize {
        self.caps.axes
    }

    pub fn num_buttons(&self) -> usize {
        self.caps.buttons
    }

    pub fn num_povs(&self) -> usize {
        self.caps.povs
    }

    pub fn buffers(&self) -> &StateBuffers {
        &self.buffers
    }

    pub fn effect(&self) -> Option<EffectState> {
        self.effect_state
    }

    pub fn axis_value(&self, axis: usize) -> i32 {
        if axis < self.caps.axes {
            self.buffers.current().axis(axis)
        } else {
            0
        }
    }

    pub fn button_value(&self, button: usize) -> bool {
        button < self.caps.buttons && self.buffers.current().button(button)
    }

    pub fn pov_value(&self, pov: usize) -> u32 {
        if pov < self.caps.povs {
            self.buffers.current().pov(pov)
        } else {
            0
        }
    }

    pub fn axis_changed(&self, axis: usize) -> bool {
        axis < self.caps.axes && self.buffers.axis_changed(axis)
    }

    pub fn button_changed(&self, button: usize) -> bool {
        button < self.caps.buttons && self.buffers.button_changed(button)
    }

    pub fn pov_changed(&self, pov: usize) -> bool {
        pov < self.caps.povs && self.buffers.pov_changed(pov)
    }

    pub fn axis(&self, slot: usize) -> Option<&AxisDescriptor> {
        self.axes.get(slot).and_then(Option::as_ref)
    }

    /// Axis descriptors by slot, `None` where the device reported nothing.
    pub fn axes(&self) -> &[Option<AxisDescriptor>; JoyState::AXES] {
        &self.axes
    }

    pub fn axis_name(&self, slot: usize) -> &str {
        self.axis(slot).map_or("", |a| a.name.as_str())
    }

    pub fn axis_max_force(&self, slot: usize) -> u32 {
        self.axis(slot).map_or(0, |a| a.max_force)
    }

    pub fn axis_force_resolution(&self, slot: usize) -> u32 {
        self.axis(slot).map_or(0, |a| a.force_resolution)
    }

    pub fn is_force_actuator(&self, slot: usize) -> bool {
        self.axis(slot).is_some_and(|a| a.force_actuator)
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.release_effect();
        self.device.unacquire();
        debug!(device = %self.identity(), "released {}", self.instance_name());
    }
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("identity", &self.instance.identity)
            .field("name", &self.instance.instance_name)
            .field("status", &self.status)
            .field("caps", &self.caps)
            .field("effect", &self.effect_state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::VirtualJoystick;
    use crate::error::NativeError;
    use crate::ffb::NOMINAL_MAX;
    use crate::state::POV_CENTERED;

    fn open(joy: &VirtualJoystick) -> DeviceSession {
        DeviceSession::open(joy.instance(), joy.device(), SessionOptions::default())
    }

    #[test]
    fn opens_and_reads_capabilities() {
        let joy = VirtualJoystick::new("Wheel").with_capabilities(3, 12, 1);
        let session = open(&joy);

        assert!(session.is_available());
        assert_eq!((session.num_axes(), session.num_buttons(), session.num_povs()), (3, 12, 1));
        assert_eq!(session.axis_name(0), "X Axis");
        assert_eq!(session.axis_name(7), "Dial");
        assert!(session.is_force_actuator(0));
        assert_eq!(session.axis_max_force(0), 10_000);
        assert_eq!(session.instance_name(), "Wheel");
        assert!(joy.is_acquired());
    }

    #[test]
    fn unknown_usages_leave_slot_empty() {
        let joy = VirtualJoystick::new("Odd").with_objects(vec![
            ObjectInstance {
                name: "Wheel".into(),
                usage_page: 0x02,
                usage: 0xC8,
                ..Default::default()
            },
            ObjectInstance {
                name: "Vx".into(),
                usage_page: 0x01,
                usage: 0x40,
                ..Default::default()
            },
            ObjectInstance {
                name: "Y".into(),
                usage_page: 0x01,
                usage: 0x31,
                ..Default::default()
            },
        ]);
        let session = open(&joy);
        let populated: Vec<usize> = (0..8).filter(|i| session.axis(*i).is_some()).collect();
        assert_eq!(populated, vec![1]);
        assert_eq!(session.axis_name(0), "");
        assert_eq!(session.axis_max_force(0), 0);
    }

    #[test]
    fn successful_poll_rotates_buffers() {
        let joy = VirtualJoystick::new("Stick");
        let mut session = open(&joy);

        joy.set_axis(0, 100);
        session.poll().unwrap();
        let first = *session.buffers().current();

        joy.set_axis(0, 250);
        joy.press_button(3);
        session.poll().unwrap();

        assert_eq!(session.buffers().previous(), &first);
        assert_eq!(session.axis_value(0), 250);
        assert!(session.axis_changed(0));
        assert!(session.button_value(3));
        assert!(session.button_changed(3));
        assert!(!session.button_changed(2));
    }

    #[test]
    fn failed_poll_leaves_buffers_untouched() {
        let joy = VirtualJoystick::new("Stick");
        let mut session = open(&joy);
        joy.set_axis(1, -40);
        session.poll().unwrap();
        joy.set_axis(1, 90);
        session.poll().unwrap();
        let before = *session.buffers();

        for fault in [
            NativeError::InputLost,
            NativeError::NotAcquired,
            NativeError::OtherAppHasPriority,
            NativeError::Pending,
        ] {
            joy.set_axis(1, 1234);
            joy.fail_next_read(fault);
            assert!(session.poll().is_err());
            assert_eq!(session.buffers(), &before);

            joy.fail_next_poll(fault);
            assert!(session.poll().is_err());
            assert_eq!(session.buffers(), &before);
        }
    }

    #[test]
    fn input_lost_triggers_reacquire() {
        let joy = VirtualJoystick::new("Stick");
        let mut session = open(&joy);
        let acquired = joy.acquire_count();

        joy.fail_next_poll(NativeError::InputLost);
        assert_eq!(session.poll(), Err(PollError::InputLost(PollStep::Poll)));
        assert_eq!(joy.acquire_count(), acquired + 1);

        joy.fail_next_read(NativeError::OtherAppHasPriority);
        assert_eq!(
            session.poll(),
            Err(PollError::OtherAppHasPriority(PollStep::ReadState))
        );
        assert_eq!(joy.acquire_count(), acquired + 1);

        joy.fail_next_read(NativeError::Pending);
        assert_eq!(session.poll(), Err(PollError::Pending(PollStep::ReadState)));
        assert_eq!(joy.acquire_count(), acquired + 1);

        assert!(session.poll().is_ok());
    }

    #[test]
    fn priority_conflict_recovers_on_later_poll() {
        let joy = VirtualJoystick::new("Wheel");
        joy.fail_acquire(Some(NativeError::OtherAppHasPriority));
        let mut session = open(&joy);

        assert_eq!(
            session.status(),
            SessionStatus::Unavailable(AcquireError::OtherAppHasPriority(SetupStep::Acquire))
        );
        // Capabilities are known even without acquisition.
        assert_eq!(session.num_axes(), 8);
        assert!(session.effect().is_none());

        // Still held elsewhere: poll fails with not-acquired and retries.
        assert_eq!(session.poll(), Err(PollError::NotAcquired(PollStep::Poll)));

        joy.fail_acquire(None);
        assert!(session.poll().is_err());
        assert!(session.is_available());
        assert!(session.effect().is_some(), "effect created after late acquisition");
        assert!(session.poll().is_ok());
    }

    #[test]
    fn setup_fault_is_not_retried() {
        let joy = VirtualJoystick::new("Wheel");
        joy.fail_cooperative_level(Some(NativeError::InvalidHandle));
        let mut session = open(&joy);
        let attempts = joy.acquire_count();

        let err = session.poll().unwrap_err();
        assert_eq!(
            err,
            PollError::Unavailable(AcquireError::InvalidHandle(SetupStep::CooperativeLevel))
        );
        assert_eq!(err.kind(), FaultKind::Setup);
        assert_eq!(joy.acquire_count(), attempts);
        assert_eq!(joy.poll_count(), 0);
    }

    #[test]
    fn accessors_are_neutral_out_of_range() {
        let joy = VirtualJoystick::new("Full").with_capabilities(8, 128, 4);
        joy.set_state({
            let mut s = JoyState::ZERO;
            s.axes = [7; 8];
            s.buttons = [0x80; 128];
            s.povs = [9000; 4];
            s
        });
        let mut session = open(&joy);
        session.poll().unwrap();

        assert_eq!(session.axis_value(7), 7);
        assert_eq!(session.axis_value(8), 0);
        assert!(!session.axis_changed(8));
        assert!(session.button_value(127));
        assert!(!session.button_value(128));
        assert!(!session.button_changed(128));
        assert_eq!(session.pov_value(3), 9000);
        assert_eq!(session.pov_value(4), 0);
        assert!(!session.pov_changed(4));

        let small = VirtualJoystick::new("Small").with_capabilities(2, 4, 0);
        small.set_state({
            let mut s = JoyState::ZERO;
            s.axes = [7; 8];
            s.buttons = [0x80; 128];
            s
        });
        let mut session = open(&small);
        session.poll().unwrap();
        assert_eq!(session.axis_value(1), 7);
        assert_eq!(session.axis_value(2), 0);
        assert!(!session.axis_changed(2));
        assert!(session.button_value(3));
        assert!(!session.button_value(4));
        assert_eq!(session.pov_value(0), 0);
    }

    #[test]
    fn pov_changes_by_raw_equality() {
        let joy = VirtualJoystick::new("Hat").with_capabilities(2, 4, 1);
        let mut session = open(&joy);
        joy.set_pov(0, POV_CENTERED);
        session.poll().unwrap();
        joy.set_pov(0, 0);
        session.poll().unwrap();
        assert!(session.pov_changed(0));
        assert_eq!(session.pov_value(0), 0);
    }

    #[test]
    fn effect_lifecycle() {
        let joy = VirtualJoystick::new("Wheel");
        let mut session = open(&joy);

        let state = session.effect().expect("effect created on open");
        assert_eq!(state.axis_slot, 0);
        assert_eq!(state.magnitude, 0);
        let native = joy.effect().expect("native effect");
        assert_eq!(native.axis_offset, 0);
        assert!(native.running);

        session.update_effect(0.25).unwrap();
        assert_eq!(joy.effect().unwrap().magnitude, NOMINAL_MAX / 4);
        assert_eq!(session.effect().unwrap().magnitude, 2_500);

        drop(session);
        let native = joy.effect().unwrap();
        assert!(!native.running);
        assert!(native.released);
        assert!(!joy.is_acquired());
    }

    #[test]
    fn update_without_effect_fails_gracefully() {
        let joy = VirtualJoystick::new("Stick").with_force_feedback(false);
        let mut session = open(&joy);
        assert!(session.effect().is_none());
        assert_eq!(session.update_effect(1.0), Err(EffectError::NoEffect));
        assert_eq!(session.update_effect(f32::NAN), Err(EffectError::NoEffect));
    }

    #[test]
    fn effect_start_failure_discards_effect() {
        let joy = VirtualJoystick::new("Wheel");
        joy.fail_effect_start(Some(NativeError::NotExclusiveAcquired));
        let mut session = open(&joy);
        assert!(session.effect().is_none());
        assert_eq!(session.update_effect(0.5), Err(EffectError::NoEffect));

        joy.fail_effect_start(None);
        assert_eq!(session.create_effect(9), Err(EffectError::AxisOutOfRange(9)));
        session.create_effect(1).unwrap();
        assert_eq!(joy.effect().unwrap().axis_offset, JoyState::axis_offset(1));
    }

    #[test]
    fn acquires_exclusive_background() {
        let joy = VirtualJoystick::new("Wheel");
        assert_eq!(joy.cooperative_level(), None);
        let session = open(&joy);

        let level = joy.cooperative_level().expect("cooperative level set");
        assert!(level.exclusive);
        assert!(level.background);
        assert_eq!(level, CooperativeLevel::EXCLUSIVE_BACKGROUND);
        assert!(session.is_available());
    }

    #[test]
    fn unplugged_device_recovers_after_replug() {
        const DIERR_UNPLUGGED: u32 = 0x8004_0209;
        for cause in [NativeError::Other(DIERR_UNPLUGGED), NativeError::Unplugged] {
            let joy = VirtualJoystick::new("Wheel");
            let mut session = open(&joy);
            session.poll().unwrap();

            joy.fail_next_poll(NativeError::InputLost);
            joy.fail_acquire(Some(cause));
            assert_eq!(session.poll(), Err(PollError::InputLost(PollStep::Poll)));
            let reason = AcquireError::Native { step: SetupStep::Acquire, cause };
            assert_eq!(session.status(), SessionStatus::Unavailable(reason));
            assert_eq!(reason.kind(), FaultKind::Transient);

            // Still gone: every poll keeps trying to re-acquire.
            let attempts = joy.acquire_count();
            assert!(session.poll().is_err());
            assert_eq!(joy.acquire_count(), attempts + 1);

            joy.fail_acquire(None);
            joy.set_axis(0, 500);
            assert_eq!(session.poll(), Err(PollError::NotAcquired(PollStep::Poll)));
            assert!(session.is_available());

            session.poll().unwrap();
            assert_eq!(session.axis_value(0), 500);
            assert!(session.axis_changed(0));
        }
    }

    #[test]
    fn effect_create_failure_leaves_no_effect() {
        let cases = [
            (NativeError::DeviceFull, EffectError::DeviceFull(EffectStep::Create)),
            (
                NativeError::DeviceNotRegistered,
                EffectError::DeviceNotRegistered(EffectStep::Create),
            ),
            (NativeError::InvalidParam, EffectError::InvalidParameter(EffectStep::Create)),
            (NativeError::NotInitialized, EffectError::NotInitialized(EffectStep::Create)),
        ];
        for (fault, expected) in cases {
            let joy = VirtualJoystick::new("Wheel");
            joy.fail_effect_create(Some(fault));
            let mut session = open(&joy);

            assert!(session.is_available());
            assert!(session.effect().is_none());
            assert!(joy.effect().is_none());
            assert_eq!(session.update_effect(0.5), Err(EffectError::NoEffect));
            assert_eq!(session.create_effect(0), Err(expected));
            assert_eq!(expected.kind(), FaultKind::Effect);
            assert_eq!(session.update_effect(-0.5), Err(EffectError::NoEffect));

            // Input keeps flowing without force feedback.
            joy.press_button(1);
            session.poll().unwrap();
            assert!(session.button_value(1));
        }
    }

    #[test]
    fn rereading_axes_drops_vanished_slots() {
        let joy = VirtualJoystick::new("Wheel");
        let mut session = open(&joy);
        assert!(session.axis(5).is_some());

        let _ = joy.clone().with_objects(vec![ObjectInstance {
            name: "Steering".into(),
            usage_page: 0x01,
            usage: 0x30,
            ..Default::default()
        }]);
        session.read_capabilities_and_axes().unwrap();

        let populated: Vec<usize> = (0..8).filter(|i| session.axis(*i).is_some()).collect();
        assert_eq!(populated, vec![0]);
        assert_eq!(session.axis_name(0), "Steering");
        assert_eq!(session.axis_name(5), "");
    }

    #[test]
    fn identity_displays_as_registry_guid() {
        let joy = VirtualJoystick::new("Wheel")
            .with_identity(0x6F1D_2B61_D5A0_11CF_BFC7_4445_5354_0000);
        let session = open(&joy);
        assert_eq!(session.identity(), joy.identity());
        assert_eq!(
            session.identity().to_string(),
            "{6F1D2B61-D5A0-11CF-BFC7-444553540000}"
        );
    }
}
