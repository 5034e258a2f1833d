//! dinput-joystick: wheels, flight sticks and other game controllers over DirectInput 8.
//!
//! Discovers attached controllers, reports only the channels that changed since the
//! last tick, and drives one constant-force effect per device.
//!
//! ```no_run
//! use dinput_joystick::{ControllerEvent, ForceFeedbackChannel, Manager};
//!
//! let mut manager = Manager::discover();
//! let mut events: Vec<ControllerEvent> = Vec::new();
//! loop {
//!     manager.tick(1.0 / 60.0);
//!     manager.send_controller_events(&mut events);
//!     for event in events.drain(..) {
//!         println!("{event:?}");
//!     }
//!     let _ = manager.set_channel_value(0, ForceFeedbackChannel::LeftLarge, 0.2);
//! #   break;
//! }
//! ```
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod backends;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod ffb;
pub mod filtered_listener;
pub mod logger;
pub mod manager;
pub mod metadata;
pub mod pump;
pub mod registry;
pub mod session;
pub mod state;

pub use config::BackendConfig;
pub use device::*;
pub use error::*;
pub use event::*;
pub use eventbus::{EventFilter, InputEventBus, InputListener};
pub use ffb::{ForceFeedbackChannel, ForceFeedbackValues};
pub use filtered_listener::FilteredListener;
pub use logger::Logger;
pub use manager::*;
pub use metadata::DeviceMeta;
pub use pump::PumpStats;
pub use registry::{DeviceRegistry, DeviceReport};
pub use session::{AxisDescriptor, DeviceSession, SessionOptions, SessionStatus};
pub use state::{ChannelKind, JoyState, StateBuffers};
