//! Fan-out of controller events to many listeners.
//!
//! [`InputEventBus`] is itself an [`InputSink`], so it can be handed straight to
//! [`Manager::send_controller_events`](crate::manager::Manager::send_controller_events).
//! Listeners are called in registration order.

use crate::event::{ChannelId, ControllerEvent, InputKind, InputSink};
use std::collections::BTreeMap;

/// Trait for reacting to controller events from any device.
pub trait InputListener: Send {
    fn on_input(&mut self, event: &ControllerEvent);
}

/// Determines which kinds of events a listener wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFilter {
    All,
    /// Axes and POVs.
    AnalogOnly,
    ButtonsOnly,
    Custom(fn(&ControllerEvent) -> bool),
}

impl EventFilter {
    pub fn matches(&self, event: &ControllerEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::AnalogOnly => matches!(event.kind, InputKind::Analog { .. }),
            EventFilter::ButtonsOnly => matches!(
                event.kind,
                InputKind::ButtonPressed { .. } | InputKind::ButtonReleased { .. }
            ),
            EventFilter::Custom(f) => f(event),
        }
    }
}

/// Metadata-wrapped listener with filters and control flags.
struct ListenerEntry {
    listener: Box<dyn InputListener>,
    enabled: bool,
    filter: EventFilter,
    /// Only events from this controller index.
    controller: Option<usize>,
}

#[derive(Default)]
pub struct InputEventBus {
    next_id: u64,
    listeners: BTreeMap<u64, ListenerEntry>,
}

impl InputEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener with optional filtering and controller tag.
    pub fn add_listener(
        &mut self,
        listener: impl InputListener + 'static,
        filter: EventFilter,
        controller: Option<usize>,
    ) -> u64 {
        let id = self.next_id;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
                controller,
            },
        );
        self.next_id += 1;
        id
    }

    /// Enables a previously registered listener.
    pub fn enable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = true;
        }
    }

    /// Disables (mutes) a listener without removing it.
    pub fn disable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = false;
        }
    }

    /// Unregisters a listener entirely.
    pub fn remove_listener(&mut self, id: u64) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Emits one event to all active and matching listeners.
    pub fn emit(&mut self, event: &ControllerEvent) {
        for entry in self.listeners.values_mut() {
            if !entry.enabled {
                continue;
            }
            if entry.controller.is_some_and(|c| c != event.controller) {
                continue;
            }
            if entry.filter.matches(event) {
                entry.listener.on_input(event);
            }
        }
    }

    /// Emits a batch of events to matching listeners.
    pub fn emit_all(&mut self, events: &[ControllerEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}

impl InputSink for InputEventBus {
    fn on_analog(&mut self, channel: ChannelId, controller: usize, value: i32) {
        self.emit(&ControllerEvent {
            controller,
            kind: InputKind::Analog { channel, value },
        });
    }

    fn on_button_pressed(&mut self, channel: ChannelId, controller: usize) {
        self.emit(&ControllerEvent {
            controller,
            kind: InputKind::ButtonPressed { channel },
        });
    }

    fn on_button_released(&mut self, channel: ChannelId, controller: usize) {
        self.emit(&ControllerEvent {
            controller,
            kind: InputKind::ButtonReleased { channel },
        });
    }
}
