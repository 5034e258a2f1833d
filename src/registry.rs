//! Device registry.
//!
//! Owns every [`DeviceSession`] in discovery order. A scan enumerates the backend,
//! skips identities that already have a session and opens a session for each new one.
//! Existing sessions are never touched by a scan: no re-acquisition, no capability
//! refresh.
//!
//! A registry built without a backend (the native subsystem failed to come up) stays
//! empty forever; every scan is a logged no-op.
//!
//! The position of a session in the registry is its controller index. Indices are
//! dense and shift down when a session is removed.

use crate::config::BackendConfig;
use crate::device::{DeviceCapabilities, DeviceClass, DeviceClassFilter, DeviceIdentity, InputBackend};
use crate::ffb::EffectState;
use crate::metadata::DeviceMeta;
use crate::session::{AxisDescriptor, DeviceSession, SessionStatus};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct DeviceRegistry {
    // Sessions go before the backend so device handles are released first.
    sessions: Vec<DeviceSession>,
    config: BackendConfig,
    backend: Option<Box<dyn InputBackend>>,
}

impl DeviceRegistry {
    /// Empty registry. No scan is performed.
    pub fn new(backend: Option<Box<dyn InputBackend>>, config: BackendConfig) -> Self {
        if backend.is_none() {
            warn!("no input backend; devices will not be discovered");
        }
        Self {
            sessions: Vec::new(),
            config,
            backend,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|b| b.name())
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Enumerate `classes` and open a session for every unseen identity.
    ///
    /// Returns the number of sessions added.
    pub fn scan(&mut self, classes: DeviceClassFilter) -> usize {
        let Some(backend) = self.backend.as_mut() else {
            debug!(?classes, "scan skipped, no input backend");
            return 0;
        };

        let instances = match backend.enumerate(classes, self.config.attached_only) {
            Ok(instances) => instances,
            Err(e) => {
                warn!(backend = backend.name(), ?classes, "enumerate devices: {e}");
                return 0;
            }
        };

        let discovered = instances.len();
        let mut added = 0;
        for instance in instances {
            let identity = instance.identity;
            if self.sessions.iter().any(|s| s.identity() == identity) {
                continue;
            }
            match backend.create_device(identity) {
                Ok(device) => {
                    let options = self.config.session_options();
                    self.sessions
                        .push(DeviceSession::open(instance, device, options));
                    added += 1;
                }
                Err(e) => {
                    warn!(device = %identity, "create device '{}': {e}", instance.instance_name)
                }
            }
        }

        info!(
            backend = backend.name(),
            ?classes,
            discovered,
            added,
            total = self.sessions.len(),
            "device scan"
        );
        added
    }

    /// Drop the session for `identity`. Later sessions shift down one controller index.
    pub fn remove(&mut self, identity: DeviceIdentity) -> bool {
        match self.position(identity) {
            Some(index) => {
                let session = self.sessions.remove(index);
                info!(device = %identity, controller = index, "removing {}", session.instance_name());
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, identity: DeviceIdentity) -> bool {
        self.position(identity).is_some()
    }

    /// Controller index of `identity`.
    pub fn position(&self, identity: DeviceIdentity) -> Option<usize> {
        self.sessions.iter().position(|s| s.identity() == identity)
    }

    pub fn get(&self, controller: usize) -> Option<&DeviceSession> {
        self.sessions.get(controller)
    }

    pub fn get_mut(&mut self, controller: usize) -> Option<&mut DeviceSession> {
        self.sessions.get_mut(controller)
    }

    /// Sessions in controller order.
    pub fn iter(&self) -> std::slice::Iter<'_, DeviceSession> {
        self.sessions.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, DeviceSession> {
        self.sessions.iter_mut()
    }

    /// Snapshot of every session for diagnostics.
    pub fn report(&self) -> Vec<DeviceReport> {
        self.sessions
            .iter()
            .enumerate()
            .map(|(controller, session)| DeviceReport::new(controller, session))
            .collect()
    }

    pub fn report_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.report())
    }
}

impl<'a> IntoIterator for &'a DeviceRegistry {
    type Item = &'a DeviceSession;
    type IntoIter = std::slice::Iter<'a, DeviceSession>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Serializable description of one session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceReport {
    pub controller: usize,
    pub identity: String,
    pub instance_name: String,
    pub product_name: String,
    pub product_guid: String,
    pub force_driver_guid: String,
    pub class: Option<DeviceClass>,
    pub available: bool,
    /// Why acquisition failed, when it did.
    pub unavailable_reason: Option<String>,
    pub capabilities: DeviceCapabilities,
    pub axes: Vec<AxisReport>,
    pub effect: Option<EffectState>,
    pub meta: DeviceMeta,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AxisReport {
    pub slot: usize,
    #[serde(flatten)]
    pub axis: AxisDescriptor,
}

impl DeviceReport {
    fn new(controller: usize, session: &DeviceSession) -> Self {
        let unavailable_reason = match session.status() {
            SessionStatus::Available => None,
            SessionStatus::Unavailable(e) => Some(e.to_string()),
        };
        let axes = session
            .axes()
            .iter()
            .enumerate()
            .filter_map(|(slot, axis)| {
                axis.as_ref().map(|axis| AxisReport {
                    slot,
                    axis: axis.clone(),
                })
            })
            .collect();

        Self {
            controller,
            identity: session.identity().to_string(),
            instance_name: session.instance_name().to_string(),
            product_name: session.product_name().to_string(),
            product_guid: format!("{:X}", Uuid::from_u128(session.product_guid()).braced()),
            force_driver_guid: format!("{:X}", Uuid::from_u128(session.force_driver_guid()).braced()),
            class: session.instance().class,
            available: session.is_available(),
            unavailable_reason,
            capabilities: session.capabilities(),
            axes,
            effect: session.effect(),
            meta: session.meta().clone(),
        }
    }
}
