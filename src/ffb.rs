//! Force-feedback command surface.
//!
//! Hosts address rumble-style channels; only [`ForceFeedbackChannel::LeftLarge`] drives
//! the single constant-force effect a session owns. The other channels are accepted and
//! ignored.

use serde::{Deserialize, Serialize};

/// Nominal maximum magnitude of a native effect.
pub const NOMINAL_MAX: i32 = 10_000;

/// Rumble channel addressed by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForceFeedbackChannel {
    LeftLarge,
    LeftSmall,
    RightLarge,
    RightSmall,
}

impl ForceFeedbackChannel {
    /// Whether this channel is wired to the constant-force effect.
    pub fn drives_effect(self) -> bool {
        self == ForceFeedbackChannel::LeftLarge
    }
}

/// Values for all channels at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceFeedbackValues {
    pub left_large: f32,
    pub left_small: f32,
    pub right_large: f32,
    pub right_small: f32,
}

/// Convert a normalized value to a native magnitude.
///
/// Clamped to `[-1, 1]`, scaled to [`NOMINAL_MAX`] and rounded. NaN maps to 0.
pub fn magnitude_from_normalized(value: f32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(-1.0, 1.0) * NOMINAL_MAX as f32).round() as i32
}

/// State of the constant-force effect a session owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EffectState {
    /// Axis slot the effect pushes on.
    pub axis_slot: usize,
    /// Last magnitude applied, in `-NOMINAL_MAX..=NOMINAL_MAX`.
    pub magnitude: i32,
    pub running: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scales_to_nominal_max() {
        assert_eq!(magnitude_from_normalized(0.0), 0);
        assert_eq!(magnitude_from_normalized(1.0), NOMINAL_MAX);
        assert_eq!(magnitude_from_normalized(-0.5), -5_000);
        assert_eq!(magnitude_from_normalized(3.0), NOMINAL_MAX);
        assert_eq!(magnitude_from_normalized(f32::NEG_INFINITY), -NOMINAL_MAX);
        assert_eq!(magnitude_from_normalized(f32::NAN), 0);
    }

    #[test]
    fn only_left_large_drives_the_effect() {
        assert!(ForceFeedbackChannel::LeftLarge.drives_effect());
        assert!(!ForceFeedbackChannel::LeftSmall.drives_effect());
        assert!(!ForceFeedbackChannel::RightLarge.drives_effect());
        assert!(!ForceFeedbackChannel::RightSmall.drives_effect());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn magnitude_always_bounded(value in proptest::num::f32::ANY) {
            let m = magnitude_from_normalized(value);
            prop_assert!((-NOMINAL_MAX..=NOMINAL_MAX).contains(&m), "magnitude {} out of range", m);
        }

        #[test]
        fn magnitude_keeps_sign(value in -1.0f32..1.0f32) {
            let m = magnitude_from_normalized(value);
            prop_assert!(m == 0 || (m > 0) == (value > 0.0));
        }
    }
}
