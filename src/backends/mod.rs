//! Input backends.
//!
//! Implementations of [`InputBackend`](crate::device::InputBackend).
//!
//! # Feature flags
//! - **`dinput`**: the Windows DirectInput 8 backend (default).
//! - **`virtual`**: scripted in-memory devices for tests and demos. Always compiled
//!   for this crate's own unit tests.

use crate::device::InputBackend;

#[cfg(all(feature = "dinput", target_os = "windows"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "dinput", target_os = "windows"))))]
pub mod windows;

#[cfg(any(test, feature = "virtual"))]
#[cfg_attr(docsrs, doc(cfg(feature = "virtual")))]
pub mod virtual_input;

/// The platform backend, or `None` when the native input subsystem is unavailable.
///
/// A `None` here yields a registry that never discovers anything.
pub fn default_backend() -> Option<Box<dyn InputBackend>> {
    #[cfg(all(feature = "dinput", target_os = "windows"))]
    {
        match crate::backends::windows::DirectInputBackend::new() {
            Ok(backend) => return Some(Box::new(backend)),
            Err(e) => tracing::error!("{e}"),
        }
    }

    #[cfg(not(all(feature = "dinput", target_os = "windows")))]
    tracing::warn!("{}", crate::error::BackendError::Unsupported);

    None
}
