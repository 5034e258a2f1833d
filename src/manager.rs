//! Host-facing glue.
//!
//! [`Manager`] owns the registry and its configuration and exposes the three things a
//! host does every frame: advance time (which may trigger a rescan), pump events, and
//! push force-feedback values.

use crate::backends::default_backend;
use crate::config::BackendConfig;
use crate::device::{DeviceIdentity, InputBackend};
use crate::error::EffectError;
use crate::event::InputSink;
use crate::ffb::{ForceFeedbackChannel, ForceFeedbackValues};
use crate::pump::{pump, PumpStats};
use crate::registry::DeviceRegistry;
use tracing::{debug, info};

pub struct Manager {
    registry: DeviceRegistry,
    since_rescan: f32,
}

impl Manager {
    /// Build a registry over `backend` and run the initial scan.
    pub fn new(backend: Option<Box<dyn InputBackend>>, config: BackendConfig) -> Self {
        let initial = config.initial_classes;
        let mut registry = DeviceRegistry::new(backend, config);
        registry.scan(initial);
        Self {
            registry,
            since_rescan: 0.0,
        }
    }

    /// Platform backend with default configuration.
    pub fn discover() -> Self {
        Self::new(default_backend(), BackendConfig::default())
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DeviceRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &BackendConfig {
        self.registry.config()
    }

    /// Accumulate `delta_secs` and rescan once the interval is exceeded.
    ///
    /// Returns the number of sessions the rescan added, if a rescan ran.
    pub fn tick(&mut self, delta_secs: f32) -> Option<usize> {
        if delta_secs.is_finite() && delta_secs > 0.0 {
            self.since_rescan += delta_secs;
        }
        if self.since_rescan <= self.config().rescan_interval_secs {
            return None;
        }
        self.since_rescan = 0.0;

        let classes = self.config().rescan_classes;
        debug!(?classes, "periodic rescan");
        let added = self.registry.scan(classes);
        if added > 0 {
            info!(added, "hot-plugged devices picked up");
        }
        Some(added)
    }

    /// Seconds accumulated toward the next rescan.
    pub fn since_rescan(&self) -> f32 {
        self.since_rescan
    }

    /// Poll every device and forward changes to `sink`.
    pub fn send_controller_events(&mut self, sink: &mut dyn InputSink) -> PumpStats {
        pump(&mut self.registry, sink)
    }

    /// Route one force-feedback value. Only [`ForceFeedbackChannel::LeftLarge`] reaches
    /// the device; the rest are accepted and ignored.
    pub fn set_channel_value(
        &mut self,
        controller: usize,
        channel: ForceFeedbackChannel,
        value: f32,
    ) -> Result<(), EffectError> {
        let session = self
            .registry
            .get_mut(controller)
            .ok_or(EffectError::UnknownController(controller))?;
        if !channel.drives_effect() {
            return Ok(());
        }
        session.update_effect(value)
    }

    pub fn set_channel_values(
        &mut self,
        controller: usize,
        values: &ForceFeedbackValues,
    ) -> Result<(), EffectError> {
        self.set_channel_value(controller, ForceFeedbackChannel::LeftLarge, values.left_large)
    }

    /// Drop the session for `identity`; controller indices after it shift down.
    pub fn remove_device(&mut self, identity: DeviceIdentity) -> bool {
        self.registry.remove(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::{VirtualBackend, VirtualJoystick};
    use crate::device::DeviceClass;
    use crate::ffb::NOMINAL_MAX;

    #[test]
    fn rescan_needs_interval_strictly_exceeded() {
        let backend = VirtualBackend::new();
        let mut manager = Manager::new(Some(Box::new(backend.clone())), BackendConfig::default());
        assert_eq!(backend.enumerations().len(), 1);

        assert_eq!(manager.tick(30.0), None);
        assert_eq!(manager.tick(30.0), None, "exactly 60s does not rescan");
        assert_eq!(manager.tick(0.5), Some(0));
        assert_eq!(manager.since_rescan(), 0.0);
        assert_eq!(backend.enumerations().len(), 2);
    }

    #[test]
    fn rescan_only_looks_for_driving_devices() {
        let backend = VirtualBackend::new();
        let mut manager = Manager::new(Some(Box::new(backend.clone())), BackendConfig::default());

        let stick = VirtualJoystick::new("Stick").with_class(DeviceClass::Flight);
        let wheel = VirtualJoystick::new("Wheel");
        backend.plug(&stick);
        backend.plug(&wheel);

        assert_eq!(manager.tick(61.0), Some(1));
        assert!(manager.registry().contains(wheel.identity()));
        assert!(!manager.registry().contains(stick.identity()));

        let enumerations = backend.enumerations();
        assert!(enumerations[0].contains(DeviceClass::Flight));
        assert!(!enumerations[1].contains(DeviceClass::Flight));
    }

    #[test]
    fn force_feedback_routing() {
        let backend = VirtualBackend::new();
        let wheel = VirtualJoystick::new("Wheel");
        backend.plug(&wheel);
        let mut manager = Manager::new(Some(Box::new(backend)), BackendConfig::default());

        manager
            .set_channel_value(0, ForceFeedbackChannel::LeftSmall, 1.0)
            .unwrap();
        assert_eq!(wheel.effect().unwrap().magnitude, 0);

        manager
            .set_channel_value(0, ForceFeedbackChannel::LeftLarge, -1.0)
            .unwrap();
        assert_eq!(wheel.effect().unwrap().magnitude, -NOMINAL_MAX);

        let values = ForceFeedbackValues {
            left_large: 0.5,
            right_large: 1.0,
            ..Default::default()
        };
        manager.set_channel_values(0, &values).unwrap();
        assert_eq!(wheel.effect().unwrap().magnitude, 5_000);

        assert_eq!(
            manager.set_channel_value(3, ForceFeedbackChannel::LeftLarge, 1.0),
            Err(EffectError::UnknownController(3))
        );
    }
}
