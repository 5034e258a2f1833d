//! In-memory backend for tests and demos.
//!
//! [`VirtualJoystick`] is a cloneable handle onto a fake device: the test side pushes
//! state and scripts faults through it, while the [`NativeDevice`] handed to a session
//! reads the same shared record. [`VirtualBackend`] plays the enumerator.
//!
//! Faults come in two flavours:
//! - one-shot (`fail_next_poll`, `fail_next_read`), consumed in order
//! - sticky (`fail_acquire`, `fail_cooperative_level`, `fail_effect_*`), active until
//!   cleared with `None`
//!
//! Everything is single-threaded (`Rc<RefCell<_>>`), like the pump that drives it.

use crate::device::{
    CooperativeLevel, DeviceCapabilities, DeviceClass, DeviceClassFilter, DeviceIdentity,
    DeviceInstance, InputBackend, NativeDevice, NativeEffect, ObjectInstance,
};
use crate::error::NativeError;
use crate::session::AXIS_SLOT_NAMES;
use crate::state::{JoyState, POV_CENTERED};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// High bits of generated identities (`"VIRT"`).
const VIRTUAL_IDENTITY_BASE: u128 = 0x5649_5254 << 96;

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// What a virtual device's constant-force effect looks like from the outside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VirtualEffect {
    pub axis_offset: u32,
    pub magnitude: i32,
    pub running: bool,
    /// The session dropped its handle.
    pub released: bool,
}

struct VirtualState {
    instance: DeviceInstance,
    caps: DeviceCapabilities,
    objects: Vec<ObjectInstance>,
    state: JoyState,
    attached: bool,
    acquired: bool,
    level: Option<CooperativeLevel>,
    acquire_count: usize,
    poll_count: usize,
    acquire_fault: Option<NativeError>,
    cooperative_fault: Option<NativeError>,
    poll_faults: VecDeque<NativeError>,
    read_faults: VecDeque<NativeError>,
    effect_create_fault: Option<NativeError>,
    effect_start_fault: Option<NativeError>,
    effect: Option<VirtualEffect>,
    open_handles: usize,
}

fn default_axis_objects() -> Vec<ObjectInstance> {
    AXIS_SLOT_NAMES
        .iter()
        .enumerate()
        .map(|(slot, name)| {
            let name = if slot < 6 {
                format!("{name} Axis")
            } else {
                (*name).to_string()
            };
            ObjectInstance {
                name,
                usage_page: 0x01,
                usage: 0x30 + slot as u16,
                offset: JoyState::axis_offset(slot),
                ff_max_force: if slot == 0 { 10_000 } else { 0 },
                ff_force_resolution: if slot == 0 { 1 } else { 0 },
                ff_actuator: slot == 0,
            }
        })
        .collect()
}

/// Handle onto one fake device.
#[derive(Clone)]
pub struct VirtualJoystick {
    inner: Rc<RefCell<VirtualState>>,
}

impl VirtualJoystick {
    /// A driving-class device with 8 axes, 32 buttons, 1 POV and force feedback.
    pub fn new(name: &str) -> Self {
        let n = NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed);
        let mut instance =
            DeviceInstance::new(DeviceIdentity::from_u128(VIRTUAL_IDENTITY_BASE | u128::from(n)), name);
        instance.class = Some(DeviceClass::Driving);
        instance.usage_page = 0x01;
        instance.usage = 0x04;

        let mut state = JoyState::ZERO;
        state.povs = [POV_CENTERED; JoyState::POVS];

        Self {
            inner: Rc::new(RefCell::new(VirtualState {
                instance,
                caps: DeviceCapabilities {
                    force_feedback: true,
                    ..DeviceCapabilities::new(8, 32, 1)
                },
                objects: default_axis_objects(),
                state,
                attached: true,
                acquired: false,
                level: None,
                acquire_count: 0,
                poll_count: 0,
                acquire_fault: None,
                cooperative_fault: None,
                poll_faults: VecDeque::new(),
                read_faults: VecDeque::new(),
                effect_create_fault: None,
                effect_start_fault: None,
                effect: None,
                open_handles: 0,
            })),
        }
    }

    pub fn with_identity(self, identity: u128) -> Self {
        self.inner.borrow_mut().instance.identity = DeviceIdentity::from_u128(identity);
        self
    }

    pub fn with_class(self, class: DeviceClass) -> Self {
        self.inner.borrow_mut().instance.class = Some(class);
        self
    }

    pub fn with_product(self, product: u128) -> Self {
        self.inner.borrow_mut().instance.product = product;
        self
    }

    pub fn with_capabilities(self, axes: usize, buttons: usize, povs: usize) -> Self {
        {
            let mut inner = self.inner.borrow_mut();
            let force_feedback = inner.caps.force_feedback;
            inner.caps = DeviceCapabilities {
                force_feedback,
                ..DeviceCapabilities::new(axes, buttons, povs)
            };
        }
        self
    }

    pub fn with_force_feedback(self, enabled: bool) -> Self {
        {
            let mut inner = self.inner.borrow_mut();
            inner.caps.force_feedback = enabled;
            for object in &mut inner.objects {
                if !enabled {
                    object.ff_actuator = false;
                    object.ff_max_force = 0;
                    object.ff_force_resolution = 0;
                }
            }
        }
        self
    }

    pub fn with_objects(self, objects: Vec<ObjectInstance>) -> Self {
        self.inner.borrow_mut().objects = objects;
        self
    }

    pub fn identity(&self) -> DeviceIdentity {
        self.inner.borrow().instance.identity
    }

    /// Enumeration entry for this device.
    pub fn instance(&self) -> DeviceInstance {
        self.inner.borrow().instance.clone()
    }

    /// Open a native handle, as the backend would.
    pub fn device(&self) -> Box<dyn NativeDevice> {
        self.inner.borrow_mut().open_handles += 1;
        Box::new(VirtualDevice {
            inner: Rc::clone(&self.inner),
        })
    }

    pub fn set_axis(&self, slot: usize, value: i32) {
        if let Some(axis) = self.inner.borrow_mut().state.axes.get_mut(slot) {
            *axis = value;
        }
    }

    pub fn press_button(&self, button: usize) {
        self.inner.borrow_mut().state.set_button(button, true);
    }

    pub fn release_button(&self, button: usize) {
        self.inner.borrow_mut().state.set_button(button, false);
    }

    pub fn set_pov(&self, pov: usize, value: u32) {
        if let Some(p) = self.inner.borrow_mut().state.povs.get_mut(pov) {
            *p = value;
        }
    }

    /// Replace the whole state record.
    pub fn set_state(&self, state: JoyState) {
        self.inner.borrow_mut().state = state;
    }

    /// Simulate a cable pull: the device drops out of attached-only enumeration and
    /// every poll reports lost input until [`replug`](Self::replug).
    pub fn unplug(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.attached = false;
        inner.acquired = false;
    }

    pub fn replug(&self) {
        self.inner.borrow_mut().attached = true;
    }

    pub fn is_attached(&self) -> bool {
        self.inner.borrow().attached
    }

    pub fn fail_acquire(&self, fault: Option<NativeError>) {
        self.inner.borrow_mut().acquire_fault = fault;
    }

    pub fn fail_cooperative_level(&self, fault: Option<NativeError>) {
        self.inner.borrow_mut().cooperative_fault = fault;
    }

    pub fn fail_next_poll(&self, fault: NativeError) {
        self.inner.borrow_mut().poll_faults.push_back(fault);
    }

    pub fn fail_next_read(&self, fault: NativeError) {
        self.inner.borrow_mut().read_faults.push_back(fault);
    }

    pub fn fail_effect_create(&self, fault: Option<NativeError>) {
        self.inner.borrow_mut().effect_create_fault = fault;
    }

    pub fn fail_effect_start(&self, fault: Option<NativeError>) {
        self.inner.borrow_mut().effect_start_fault = fault;
    }

    pub fn is_acquired(&self) -> bool {
        self.inner.borrow().acquired
    }

    pub fn cooperative_level(&self) -> Option<CooperativeLevel> {
        self.inner.borrow().level
    }

    /// Number of calls that reached the native acquire step.
    pub fn acquire_count(&self) -> usize {
        self.inner.borrow().acquire_count
    }

    pub fn poll_count(&self) -> usize {
        self.inner.borrow().poll_count
    }

    /// Native handles currently alive.
    pub fn open_handles(&self) -> usize {
        self.inner.borrow().open_handles
    }

    pub fn effect(&self) -> Option<VirtualEffect> {
        self.inner.borrow().effect
    }
}

impl std::fmt::Debug for VirtualJoystick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("VirtualJoystick")
            .field("identity", &inner.instance.identity)
            .field("name", &inner.instance.instance_name)
            .field("attached", &inner.attached)
            .field("acquired", &inner.acquired)
            .finish()
    }
}

struct VirtualDevice {
    inner: Rc<RefCell<VirtualState>>,
}

impl NativeDevice for VirtualDevice {
    fn set_cooperative_level(&mut self, level: CooperativeLevel) -> Result<(), NativeError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(fault) = inner.cooperative_fault {
            return Err(fault);
        }
        inner.level = Some(level);
        Ok(())
    }

    fn set_data_format(&mut self) -> Result<(), NativeError> {
        Ok(())
    }

    fn acquire(&mut self) -> Result<(), NativeError> {
        let mut inner = self.inner.borrow_mut();
        inner.acquire_count += 1;
        if let Some(fault) = inner.acquire_fault {
            return Err(fault);
        }
        if !inner.attached {
            return Err(NativeError::InputLost);
        }
        inner.acquired = true;
        Ok(())
    }

    fn unacquire(&mut self) {
        self.inner.borrow_mut().acquired = false;
    }

    fn device_info(&self) -> Result<DeviceInstance, NativeError> {
        Ok(self.inner.borrow().instance.clone())
    }

    fn capabilities(&self) -> Result<DeviceCapabilities, NativeError> {
        Ok(self.inner.borrow().caps)
    }

    fn axis_objects(&self) -> Result<Vec<ObjectInstance>, NativeError> {
        Ok(self.inner.borrow().objects.clone())
    }

    fn poll(&mut self) -> Result<(), NativeError> {
        let mut inner = self.inner.borrow_mut();
        inner.poll_count += 1;
        if let Some(fault) = inner.poll_faults.pop_front() {
            return Err(fault);
        }
        if !inner.attached {
            return Err(NativeError::InputLost);
        }
        if !inner.acquired {
            return Err(NativeError::NotAcquired);
        }
        Ok(())
    }

    fn read_state(&mut self, state: &mut JoyState) -> Result<(), NativeError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(fault) = inner.read_faults.pop_front() {
            return Err(fault);
        }
        if !inner.acquired {
            return Err(NativeError::NotAcquired);
        }
        *state = inner.state;
        Ok(())
    }

    fn create_constant_force(
        &mut self,
        axis_offset: u32,
    ) -> Result<Box<dyn NativeEffect>, NativeError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(fault) = inner.effect_create_fault {
            return Err(fault);
        }
        if !inner.caps.force_feedback {
            return Err(NativeError::DeviceNotRegistered);
        }
        inner.effect = Some(VirtualEffect {
            axis_offset,
            ..VirtualEffect::default()
        });
        Ok(Box::new(VirtualEffectHandle {
            inner: Rc::clone(&self.inner),
        }))
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.acquired = false;
        inner.open_handles = inner.open_handles.saturating_sub(1);
    }
}

struct VirtualEffectHandle {
    inner: Rc<RefCell<VirtualState>>,
}

impl VirtualEffectHandle {
    fn with_effect(&self, f: impl FnOnce(&mut VirtualEffect)) {
        if let Some(effect) = self.inner.borrow_mut().effect.as_mut() {
            f(effect);
        }
    }
}

impl NativeEffect for VirtualEffectHandle {
    fn start(&mut self) -> Result<(), NativeError> {
        if let Some(fault) = self.inner.borrow().effect_start_fault {
            return Err(fault);
        }
        self.with_effect(|e| e.running = true);
        Ok(())
    }

    fn set_magnitude(&mut self, magnitude: i32) -> Result<(), NativeError> {
        if !self.inner.borrow().acquired {
            return Err(NativeError::NotExclusiveAcquired);
        }
        self.with_effect(|e| {
            e.magnitude = magnitude;
            e.running = true;
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), NativeError> {
        self.with_effect(|e| e.running = false);
        Ok(())
    }
}

impl Drop for VirtualEffectHandle {
    fn drop(&mut self) {
        self.with_effect(|e| {
            e.running = false;
            e.released = true;
        });
    }
}

/// Enumerator over a shared list of [`VirtualJoystick`]s.
///
/// Clones share the list, so a test can keep one handle and give the other to the
/// registry.
#[derive(Clone, Default)]
pub struct VirtualBackend {
    devices: Rc<RefCell<Vec<VirtualJoystick>>>,
    enumerate_fault: Rc<RefCell<Option<NativeError>>>,
    enumerations: Rc<RefCell<Vec<DeviceClassFilter>>>,
}

impl VirtualBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device. Plugging the same identity twice is a no-op.
    pub fn plug(&self, joystick: &VirtualJoystick) {
        let mut devices = self.devices.borrow_mut();
        if devices.iter().all(|d| d.identity() != joystick.identity()) {
            joystick.replug();
            devices.push(joystick.clone());
        }
    }

    /// Forget a device entirely; existing sessions keep their handle.
    pub fn remove(&self, identity: DeviceIdentity) {
        self.devices.borrow_mut().retain(|d| d.identity() != identity);
    }

    pub fn fail_enumerate(&self, fault: Option<NativeError>) {
        *self.enumerate_fault.borrow_mut() = fault;
    }

    /// Class filters of every enumeration so far, oldest first.
    pub fn enumerations(&self) -> Vec<DeviceClassFilter> {
        self.enumerations.borrow().clone()
    }
}

impl InputBackend for VirtualBackend {
    fn name(&self) -> &str {
        "virtual"
    }

    fn enumerate(
        &mut self,
        filter: DeviceClassFilter,
        attached_only: bool,
    ) -> Result<Vec<DeviceInstance>, NativeError> {
        self.enumerations.borrow_mut().push(filter);
        if let Some(fault) = *self.enumerate_fault.borrow() {
            return Err(fault);
        }
        Ok(self
            .devices
            .borrow()
            .iter()
            .filter(|d| !attached_only || d.is_attached())
            .map(VirtualJoystick::instance)
            .filter(|i| i.class.is_some_and(|c| filter.contains(c)))
            .collect())
    }

    fn create_device(
        &mut self,
        identity: DeviceIdentity,
    ) -> Result<Box<dyn NativeDevice>, NativeError> {
        self.devices
            .borrow()
            .iter()
            .find(|d| d.identity() == identity)
            .map(VirtualJoystick::device)
            .ok_or(NativeError::DeviceNotRegistered)
    }
}
