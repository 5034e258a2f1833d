//! Event pump.
//!
//! Once per tick every session is polled in registry order. For each successful poll
//! the changed channels are reported in a fixed order: axes, then buttons, then POVs,
//! each by ascending index. A failed poll reports nothing for that device.
//!
//! Controller indices are the session's position in the registry on this tick. They
//! are not stored anywhere, so removing a session renumbers the ones after it.

use crate::event::{ChannelId, InputSink};
use crate::registry::DeviceRegistry;
use crate::session::DeviceSession;
use tracing::trace;

/// What one pump pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Sessions whose poll succeeded.
    pub polled: usize,
    /// Sessions whose poll failed.
    pub failed: usize,
    /// Events delivered to the sink.
    pub events: usize,
}

/// Poll every session and forward changed channels to `sink`.
pub fn pump(registry: &mut DeviceRegistry, sink: &mut dyn InputSink) -> PumpStats {
    let mut stats = PumpStats::default();
    for (controller, session) in registry.iter_mut().enumerate() {
        // Failures are logged by the session.
        if session.poll().is_err() {
            stats.failed += 1;
            continue;
        }
        stats.polled += 1;
        stats.events += emit_changes(session, controller, sink);
    }
    trace!(
        polled = stats.polled,
        failed = stats.failed,
        events = stats.events,
        "pump"
    );
    stats
}

/// Report every changed channel of an already-polled session. Returns the event count.
pub fn emit_changes(session: &DeviceSession, controller: usize, sink: &mut dyn InputSink) -> usize {
    let mut events = 0;

    for axis in 0..session.num_axes() {
        if session.axis_changed(axis) {
            sink.on_analog(ChannelId::axis(axis), controller, session.axis_value(axis));
            events += 1;
        }
    }

    for button in 0..session.num_buttons() {
        if session.button_changed(button) {
            let channel = ChannelId::button(button);
            if session.button_value(button) {
                sink.on_button_pressed(channel, controller);
            } else {
                sink.on_button_released(channel, controller);
            }
            events += 1;
        }
    }

    for pov in 0..session.num_povs() {
        if session.pov_changed(pov) {
            // Centered (0xFFFFFFFF) arrives as -1.
            sink.on_analog(ChannelId::pov(pov), controller, session.pov_value(pov) as i32);
            events += 1;
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::{VirtualBackend, VirtualJoystick};
    use crate::config::BackendConfig;
    use crate::device::DeviceClassFilter;
    use crate::event::{ControllerEvent, InputKind};
    use crate::state::{JoyState, POV_CENTERED};

    fn setup(devices: &[&VirtualJoystick]) -> DeviceRegistry {
        let backend = VirtualBackend::new();
        for d in devices {
            backend.plug(d);
        }
        let mut registry =
            DeviceRegistry::new(Some(Box::new(backend)), BackendConfig::default());
        registry.scan(DeviceClassFilter::DRIVING);
        registry
    }

    #[test]
    fn emits_in_axis_button_pov_order() {
        let joy = VirtualJoystick::new("Wheel").with_capabilities(2, 4, 1);
        let mut registry = setup(&[&joy]);
        let mut events: Vec<ControllerEvent> = Vec::new();
        pump(&mut registry, &mut events);
        events.clear();

        joy.set_pov(0, 9000);
        joy.press_button(2);
        joy.set_axis(1, -300);
        let stats = pump(&mut registry, &mut events);

        assert_eq!(stats, PumpStats { polled: 1, failed: 0, events: 3 });
        let channels: Vec<String> = events.iter().map(|e| e.kind.channel().to_string()).collect();
        assert_eq!(channels, ["Axis 2", "Button 3", "POV 1"]);
        assert_eq!(
            events[0].kind,
            InputKind::Analog { channel: ChannelId::axis(1), value: -300 }
        );
    }

    #[test]
    fn centered_pov_is_reported_as_minus_one() {
        let joy = VirtualJoystick::new("Hat").with_capabilities(0, 0, 1);
        joy.set_pov(0, 4500);
        let mut registry = setup(&[&joy]);
        let mut events: Vec<ControllerEvent> = Vec::new();
        pump(&mut registry, &mut events);

        joy.set_pov(0, POV_CENTERED);
        events.clear();
        pump(&mut registry, &mut events);
        assert_eq!(
            events,
            [ControllerEvent {
                controller: 0,
                kind: InputKind::Analog { channel: ChannelId::pov(0), value: -1 },
            }]
        );
    }

    #[test]
    fn channels_beyond_capabilities_are_silent() {
        let joy = VirtualJoystick::new("Small").with_capabilities(1, 2, 0);
        let mut registry = setup(&[&joy]);
        let mut events: Vec<ControllerEvent> = Vec::new();
        pump(&mut registry, &mut events);
        events.clear();

        joy.set_axis(5, 10);
        joy.press_button(9);
        joy.set_pov(0, 0);
        pump(&mut registry, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn button_press_is_reported_once() {
        let joy = VirtualJoystick::new("Wheel").with_capabilities(0, 4, 0);
        let mut registry = setup(&[&joy]);
        let mut events: Vec<ControllerEvent> = Vec::new();
        pump(&mut registry, &mut events);

        joy.press_button(0);
        events.clear();
        pump(&mut registry, &mut events);
        assert_eq!(events.len(), 1);

        // Same pressed bit, different low bits.
        let mut state = JoyState::ZERO;
        state.povs = [POV_CENTERED; JoyState::POVS];
        state.buttons[0] = 0x81;
        joy.set_state(state);
        events.clear();
        pump(&mut registry, &mut events);
        assert!(events.is_empty());
    }
}
