//! Drives the event pump over two scripted devices and prints what a host would see.
//!
//! `cargo run --example pump --features virtual`

use dinput_joystick::backends::virtual_input::{VirtualBackend, VirtualJoystick};
use dinput_joystick::{
    BackendConfig, DeviceClass, EventFilter, ForceFeedbackChannel, InputEventBus, Logger,
    Manager, NativeError,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let backend = VirtualBackend::new();
    let wheel = VirtualJoystick::new("Virtual Wheel").with_capabilities(3, 24, 1);
    let stick = VirtualJoystick::new("Virtual Stick")
        .with_class(DeviceClass::Flight)
        .with_force_feedback(false);
    backend.plug(&wheel);
    backend.plug(&stick);

    let mut manager = Manager::new(Some(Box::new(backend.clone())), BackendConfig::default());
    let mut bus = InputEventBus::new();
    bus.add_listener(Logger::new(), EventFilter::All, None);

    let dt = 1.0 / 60.0;
    for frame in 0..240u32 {
        match frame {
            10 => wheel.set_axis(0, 32_767),
            20 => wheel.press_button(4),
            30 => wheel.release_button(4),
            40 => stick.set_pov(0, 9_000),
            50 => wheel.fail_next_poll(NativeError::InputLost),
            60 => stick.set_pov(0, u32::MAX),
            _ => {}
        }
        if frame % 20 == 0 {
            let force = (frame as f32 / 240.0) * 2.0 - 1.0;
            if let Err(e) = manager.set_channel_value(0, ForceFeedbackChannel::LeftLarge, force) {
                tracing::warn!("force feedback: {e}");
            }
        }

        manager.tick(dt);
        let stats = manager.send_controller_events(&mut bus);
        if stats.events > 0 || stats.failed > 0 {
            tracing::info!(frame, ?stats, "tick");
        }
    }

    match manager.registry().report_json() {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("report: {e}"),
    }
}
