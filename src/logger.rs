use crate::event::{ControllerEvent, InputKind};
use crate::eventbus::InputListener;
use tracing::debug;

/// A simple listener that logs every controller event at debug level.
#[derive(Debug, Default)]
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Logger
    }
}

impl InputListener for Logger {
    fn on_input(&mut self, event: &ControllerEvent) {
        let controller = event.controller;
        match event.kind {
            InputKind::Analog { channel, value } => {
                debug!(controller, %channel, value, "analog")
            }
            InputKind::ButtonPressed { channel } => debug!(controller, %channel, "pressed"),
            InputKind::ButtonReleased { channel } => debug!(controller, %channel, "released"),
        }
    }
}
