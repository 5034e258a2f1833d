//! Backend configuration.
//!
//! Every field has a build-time default, so an empty file (or no file at all) gives the
//! stock behaviour: scan driving and flight devices at startup, rescan driving devices
//! once a minute, exclusive background access, force feedback on the first axis.
//!
//! ```toml
//! initial_classes = ["driving", "flight"]
//! rescan_classes = ["driving"]
//! rescan_interval_secs = 60.0
//! attached_only = true
//! effect_axis = 0
//!
//! [cooperative_level]
//! exclusive = true
//! background = true
//! ```

use crate::device::{CooperativeLevel, DeviceClassFilter};
use crate::error::ConfigError;
use crate::session::SessionOptions;
use crate::state::JoyState;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Classes enumerated when the registry starts.
    pub initial_classes: DeviceClassFilter,
    /// Classes enumerated on each periodic rescan.
    pub rescan_classes: DeviceClassFilter,
    /// Rescan once accumulated tick time exceeds this many seconds.
    pub rescan_interval_secs: f32,
    /// Skip devices that are installed but not plugged in.
    pub attached_only: bool,
    /// Axis slot the constant-force effect is bound to.
    pub effect_axis: usize,
    pub cooperative_level: CooperativeLevel,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            initial_classes: DeviceClassFilter::DRIVING.union(DeviceClassFilter::FLIGHT),
            rescan_classes: DeviceClassFilter::DRIVING,
            rescan_interval_secs: 60.0,
            attached_only: true,
            effect_axis: 0,
            cooperative_level: CooperativeLevel::EXCLUSIVE_BACKGROUND,
        }
    }
}

impl BackendConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rescan_interval_secs.is_finite() || self.rescan_interval_secs < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "rescan_interval_secs must be a non-negative number, got {}",
                self.rescan_interval_secs
            )));
        }
        if self.effect_axis >= JoyState::AXES {
            return Err(ConfigError::Invalid(format!(
                "effect_axis must be below {}, got {}",
                JoyState::AXES,
                self.effect_axis
            )));
        }
        if self.initial_classes.is_empty() {
            return Err(ConfigError::Invalid(
                "initial_classes must name at least one device class".into(),
            ));
        }
        Ok(())
    }

    /// Per-session settings derived from this config.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            cooperative_level: self.cooperative_level,
            effect_axis: self.effect_axis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceClass;

    #[test]
    fn empty_document_gives_defaults() {
        let config = BackendConfig::from_toml_str("").unwrap();
        assert_eq!(config, BackendConfig::default());
        assert!(config.initial_classes.contains(DeviceClass::Flight));
        assert!(!config.rescan_classes.contains(DeviceClass::Flight));
        assert_eq!(config.rescan_interval_secs, 60.0);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = BackendConfig::from_toml_str(
            r#"
            rescan_classes = ["driving", "flight"]
            rescan_interval_secs = 5.0
            effect_axis = 1

            [cooperative_level]
            exclusive = true
            background = false
            "#,
        )
        .unwrap();
        assert!(config.rescan_classes.contains(DeviceClass::Flight));
        assert_eq!(config.rescan_interval_secs, 5.0);
        assert_eq!(config.session_options().effect_axis, 1);
        assert!(!config.cooperative_level.background);
        assert!(config.attached_only);
    }

    #[test]
    fn rejects_invalid_values() {
        for text in [
            "effect_axis = 8",
            "rescan_interval_secs = -1.0",
            "rescan_interval_secs = nan",
            "initial_classes = []",
        ] {
            let err = BackendConfig::from_toml_str(text).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{text}: {err}");
        }
        assert!(matches!(
            BackendConfig::from_toml_str("initial_classes = [\"tank\"]"),
            Err(ConfigError::Parse(_))
        ));
    }
}
