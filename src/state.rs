//! Double-buffered device state.
//!
//! [`JoyState`] is the fixed-layout record the native layer fills on every poll.
//! [`StateBuffers`] keeps the current and previous records and answers "did this
//! channel change" by plain field inequality. There is no deadzone or hysteresis here;
//! any wobble counts as a change.
//!
//! # Layout
//! `JoyState` is `#[repr(C)]` and 176 bytes: 8 axes (`i32`), 4 POVs (`u32`), 128 button
//! bytes. The Windows backend registers a data format with exactly these offsets so the
//! device can write straight into it.

use serde::Serialize;

/// POV value reported when the hat is centered (low word `0xFFFF`).
pub const POV_CENTERED: u32 = 0xFFFF_FFFF;

/// Returns `true` when `value` is a centered POV reading.
#[inline]
pub fn pov_is_centered(value: u32) -> bool {
    value & 0xFFFF == 0xFFFF
}

/// Channel category of a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ChannelKind {
    Axis,
    Button,
    Pov,
}

/// One native state snapshot.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JoyState {
    /// X, Y, Z, Rx, Ry, Rz, Slider 0, Slider 1 (raw native range).
    pub axes: [i32; JoyState::AXES],
    /// Hundredths of a degree clockwise from north, or [`POV_CENTERED`].
    pub povs: [u32; JoyState::POVS],
    /// High bit set = pressed.
    pub buttons: [u8; JoyState::BUTTONS],
}

impl JoyState {
    pub const AXES: usize = 8;
    pub const BUTTONS: usize = 128;
    pub const POVS: usize = 4;

    pub const ZERO: JoyState = JoyState {
        axes: [0; Self::AXES],
        povs: [0; Self::POVS],
        buttons: [0; Self::BUTTONS],
    };

    /// Byte offset of axis slot `slot` in the native layout.
    pub const fn axis_offset(slot: usize) -> u32 {
        (slot * 4) as u32
    }

    pub const fn pov_offset(pov: usize) -> u32 {
        (Self::AXES * 4 + pov * 4) as u32
    }

    pub const fn button_offset(button: usize) -> u32 {
        (Self::AXES * 4 + Self::POVS * 4 + button) as u32
    }

    pub fn axis(&self, slot: usize) -> i32 {
        self.axes.get(slot).copied().unwrap_or(0)
    }

    /// `true` when the button byte has its high bit set.
    pub fn button(&self, button: usize) -> bool {
        self.buttons.get(button).is_some_and(|b| b & 0x80 != 0)
    }

    pub fn pov(&self, pov: usize) -> u32 {
        self.povs.get(pov).copied().unwrap_or(0)
    }

    pub fn set_button(&mut self, button: usize, pressed: bool) {
        if let Some(b) = self.buttons.get_mut(button) {
            *b = if pressed { 0x80 } else { 0 };
        }
    }
}

impl Default for JoyState {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Current and previous snapshot of one device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateBuffers {
    current: JoyState,
    previous: JoyState,
}

impl StateBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit snapshots. Mostly useful for tests and replay.
    pub fn from_parts(previous: JoyState, current: JoyState) -> Self {
        Self { current, previous }
    }

    pub fn current(&self) -> &JoyState {
        &self.current
    }

    pub fn previous(&self) -> &JoyState {
        &self.previous
    }

    /// Rotate: the old current becomes previous, `next` becomes current.
    ///
    /// Callers only invoke this once a read has fully succeeded.
    pub fn advance(&mut self, next: JoyState) {
        self.previous = self.current;
        self.current = next;
    }

    /// Field inequality between current and previous. Out-of-range indices are unchanged.
    pub fn changed(&self, kind: ChannelKind, index: usize) -> bool {
        match kind {
            ChannelKind::Axis => self.axis_changed(index),
            ChannelKind::Button => self.button_changed(index),
            ChannelKind::Pov => self.pov_changed(index),
        }
    }

    pub fn axis_changed(&self, slot: usize) -> bool {
        match (self.current.axes.get(slot), self.previous.axes.get(slot)) {
            (Some(c), Some(p)) => c != p,
            _ => false,
        }
    }

    /// Compares the pressed bit only; low bits of the button byte are ignored.
    pub fn button_changed(&self, button: usize) -> bool {
        button < JoyState::BUTTONS && self.current.button(button) != self.previous.button(button)
    }

    /// Raw equality; a move from [`POV_CENTERED`] to 0 is a change.
    pub fn pov_changed(&self, pov: usize) -> bool {
        match (self.current.povs.get(pov), self.previous.povs.get(pov)) {
            (Some(c), Some(p)) => c != p,
            _ => false,
        }
    }
}
