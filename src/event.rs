//! Events and channel names.
//!
//! The event pump reports only channels whose value changed since the previous
//! successful poll, through the host-facing [`InputSink`] trait.
//!
//! ## Value conventions
//! - **Axes:** raw native range, no normalization (the host owns calibration and
//!   deadzones).
//! - **Buttons:** press/release edges.
//! - **POVs:** raw hundredths of a degree reported as analog values; the centered
//!   sentinel `0xFFFFFFFF` arrives as `-1`.

use crate::state::ChannelKind;
use serde::Serialize;
use std::fmt;

/// A named control on a controller: `"Axis 1"`, `"Button 12"`, `"POV 2"`.
///
/// `index` is zero-based; the display name is one-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ChannelId {
    pub kind: ChannelKind,
    pub index: usize,
}

impl ChannelId {
    pub const fn axis(index: usize) -> Self {
        Self {
            kind: ChannelKind::Axis,
            index,
        }
    }

    pub const fn button(index: usize) -> Self {
        Self {
            kind: ChannelKind::Button,
            index,
        }
    }

    pub const fn pov(index: usize) -> Self {
        Self {
            kind: ChannelKind::Pov,
            index,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            ChannelKind::Axis => "Axis",
            ChannelKind::Button => "Button",
            ChannelKind::Pov => "POV",
        };
        write!(f, "{} {}", prefix, self.index + 1)
    }
}

/// Per-controller input change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum InputKind {
    /// An axis or POV changed.
    Analog { channel: ChannelId, value: i32 },
    /// A button transitioned to pressed.
    ButtonPressed { channel: ChannelId },
    /// A button transitioned to released.
    ButtonReleased { channel: ChannelId },
}

impl InputKind {
    pub fn channel(&self) -> ChannelId {
        match *self {
            InputKind::Analog { channel, .. }
            | InputKind::ButtonPressed { channel }
            | InputKind::ButtonReleased { channel } => channel,
        }
    }
}

/// An input change tagged with the controller index it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ControllerEvent {
    /// Zero-based position of the device in the registry on this tick.
    pub controller: usize,
    pub kind: InputKind,
}

/// Host-side receiver of controller events.
pub trait InputSink {
    fn on_analog(&mut self, channel: ChannelId, controller: usize, value: i32);
    fn on_button_pressed(&mut self, channel: ChannelId, controller: usize);
    fn on_button_released(&mut self, channel: ChannelId, controller: usize);
}

/// Records events in emission order.
impl InputSink for Vec<ControllerEvent> {
    fn on_analog(&mut self, channel: ChannelId, controller: usize, value: i32) {
        self.push(ControllerEvent {
            controller,
            kind: InputKind::Analog { channel, value },
        });
    }

    fn on_button_pressed(&mut self, channel: ChannelId, controller: usize) {
        self.push(ControllerEvent {
            controller,
            kind: InputKind::ButtonPressed { channel },
        });
    }

    fn on_button_released(&mut self, channel: ChannelId, controller: usize) {
        self.push(ControllerEvent {
            controller,
            kind: InputKind::ButtonReleased { channel },
        });
    }
}
