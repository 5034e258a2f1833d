//! Error types.
//!
//! Native results are translated exactly once, at the backend boundary, into
//! [`NativeError`]. Everything above that boundary works with one error type per
//! operation ([`AcquireError`], [`PollError`], [`EffectError`], [`QueryError`]), each of
//! which can be classified with `kind()` into a [`FaultKind`].
//!
//! Nothing in this crate treats an error as fatal. A failed operation is logged by the
//! caller and the affected device simply stops producing events until it recovers.

use std::fmt;
use std::path::PathBuf;

/// Symbolic native result code.
///
/// Backends map their raw status codes into this enum; no other module ever sees a
/// raw code except through [`NativeError::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum NativeError {
    #[error("invalid parameter")]
    InvalidParam,
    #[error("not initialized")]
    NotInitialized,
    #[error("invalid window handle")]
    InvalidHandle,
    #[error("device is acquired")]
    Acquired,
    #[error("another application has priority")]
    OtherAppHasPriority,
    #[error("input lost")]
    InputLost,
    #[error("device not acquired")]
    NotAcquired,
    #[error("device unplugged")]
    Unplugged,
    #[error("data pending")]
    Pending,
    #[error("device full")]
    DeviceFull,
    #[error("device not registered")]
    DeviceNotRegistered,
    #[error("incomplete effect")]
    IncompleteEffect,
    #[error("effect playing")]
    EffectPlaying,
    #[error("not acquired in exclusive mode")]
    NotExclusiveAcquired,
    #[error("unsupported")]
    Unsupported,
    #[error("invalid pointer")]
    InvalidPointer,
    #[error("native error {0:#010x}")]
    Other(u32),
}

/// Coarse classification shared by every device operation.
///
/// This is what callers branch on (and what gets logged); the per-operation enums
/// carry the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Bad parameters or an uninitialized subsystem. Not retried.
    Setup,
    /// Another process holds exclusive access. Retried on a later poll.
    PriorityConflict,
    /// Device lost, unplugged or not acquired. Re-acquired on every poll until it comes back.
    Transient,
    /// Data not ready yet. Soft failure, nothing to recover.
    Pending,
    /// The force-feedback effect is unusable.
    Effect,
}

/// Step of the acquisition sequence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetupStep {
    CooperativeLevel,
    DataFormat,
    Acquire,
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SetupStep::CooperativeLevel => "set cooperative level",
            SetupStep::DataFormat => "set data format",
            SetupStep::Acquire => "acquire",
        })
    }
}

/// Why a session could not be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AcquireError {
    #[error("{0}: invalid parameter")]
    InvalidParameter(SetupStep),
    #[error("{0}: not initialized")]
    NotInitialized(SetupStep),
    #[error("{0}: invalid window handle")]
    InvalidHandle(SetupStep),
    #[error("{0}: another application has priority")]
    OtherAppHasPriority(SetupStep),
    #[error("{step}: {cause}")]
    Native { step: SetupStep, cause: NativeError },
}

impl AcquireError {
    pub fn from_native(step: SetupStep, cause: NativeError) -> Self {
        match cause {
            NativeError::InvalidParam => AcquireError::InvalidParameter(step),
            NativeError::NotInitialized => AcquireError::NotInitialized(step),
            NativeError::InvalidHandle => AcquireError::InvalidHandle(step),
            NativeError::OtherAppHasPriority => AcquireError::OtherAppHasPriority(step),
            cause => AcquireError::Native { step, cause },
        }
    }

    pub fn kind(&self) -> FaultKind {
        match self {
            AcquireError::InvalidParameter(_)
            | AcquireError::NotInitialized(_)
            | AcquireError::InvalidHandle(_) => FaultKind::Setup,
            AcquireError::OtherAppHasPriority(_) => FaultKind::PriorityConflict,
            // Unplugged devices and unmapped codes may clear once the device is back.
            AcquireError::Native { .. } => FaultKind::Transient,
        }
    }

    /// Setup faults stay put until the caller fixes its state; everything else may
    /// clear up on a later poll.
    pub fn is_retryable(&self) -> bool {
        self.kind() != FaultKind::Setup
    }
}

/// Step of a poll cycle that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollStep {
    Poll,
    ReadState,
}

impl fmt::Display for PollStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PollStep::Poll => "poll",
            PollStep::ReadState => "read device state",
        })
    }
}

/// Why a poll cycle produced no new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    #[error("{0}: input lost")]
    InputLost(PollStep),
    #[error("{0}: device not acquired")]
    NotAcquired(PollStep),
    #[error("{0}: not initialized")]
    NotInitialized(PollStep),
    #[error("{0}: invalid parameter")]
    InvalidParameter(PollStep),
    #[error("{0}: another application has priority")]
    OtherAppHasPriority(PollStep),
    #[error("{0}: data pending")]
    Pending(PollStep),
    #[error("session unavailable: {0}")]
    Unavailable(AcquireError),
    #[error("{step}: {cause}")]
    Native { step: PollStep, cause: NativeError },
}

impl PollError {
    pub fn from_native(step: PollStep, cause: NativeError) -> Self {
        match cause {
            NativeError::InputLost => PollError::InputLost(step),
            NativeError::NotAcquired => PollError::NotAcquired(step),
            NativeError::NotInitialized => PollError::NotInitialized(step),
            NativeError::InvalidParam => PollError::InvalidParameter(step),
            NativeError::OtherAppHasPriority => PollError::OtherAppHasPriority(step),
            NativeError::Pending => PollError::Pending(step),
            cause => PollError::Native { step, cause },
        }
    }

    pub fn kind(&self) -> FaultKind {
        match self {
            PollError::OtherAppHasPriority(_) => FaultKind::PriorityConflict,
            PollError::Pending(_) => FaultKind::Pending,
            PollError::Unavailable(e) => e.kind(),
            _ => FaultKind::Transient,
        }
    }

    /// Whether the session should try to acquire the device again right away.
    pub fn needs_reacquire(&self) -> bool {
        matches!(
            self,
            PollError::InputLost(_)
                | PollError::NotAcquired(_)
                | PollError::NotInitialized(_)
                | PollError::InvalidParameter(_)
                | PollError::Native { .. }
        )
    }
}

/// Step of the effect lifecycle that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectStep {
    Create,
    Start,
    Update,
    Stop,
}

impl fmt::Display for EffectStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EffectStep::Create => "create effect",
            EffectStep::Start => "start effect",
            EffectStep::Update => "update effect",
            EffectStep::Stop => "stop effect",
        })
    }
}

/// Force-feedback failures. All of them leave the caller's loop running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    #[error("no force-feedback effect on this device")]
    NoEffect,
    #[error("no controller with index {0}")]
    UnknownController(usize),
    #[error("axis slot {0} does not exist")]
    AxisOutOfRange(usize),
    #[error("{0}: device full")]
    DeviceFull(EffectStep),
    #[error("{0}: device not registered")]
    DeviceNotRegistered(EffectStep),
    #[error("{0}: invalid parameter")]
    InvalidParameter(EffectStep),
    #[error("{0}: not initialized")]
    NotInitialized(EffectStep),
    #[error("{0}: incomplete effect")]
    IncompleteEffect(EffectStep),
    #[error("{0}: not acquired in exclusive mode")]
    NotExclusiveAcquired(EffectStep),
    #[error("{0}: effect playing")]
    EffectPlaying(EffectStep),
    #[error("{0}: input lost")]
    InputLost(EffectStep),
    #[error("{0}: unsupported")]
    Unsupported(EffectStep),
    #[error("{step}: {cause}")]
    Native { step: EffectStep, cause: NativeError },
}

impl EffectError {
    pub fn from_native(step: EffectStep, cause: NativeError) -> Self {
        match cause {
            NativeError::DeviceFull => EffectError::DeviceFull(step),
            NativeError::DeviceNotRegistered => EffectError::DeviceNotRegistered(step),
            NativeError::InvalidParam => EffectError::InvalidParameter(step),
            NativeError::NotInitialized => EffectError::NotInitialized(step),
            NativeError::IncompleteEffect => EffectError::IncompleteEffect(step),
            NativeError::NotExclusiveAcquired => EffectError::NotExclusiveAcquired(step),
            NativeError::EffectPlaying => EffectError::EffectPlaying(step),
            NativeError::InputLost => EffectError::InputLost(step),
            NativeError::Unsupported => EffectError::Unsupported(step),
            cause => EffectError::Native { step, cause },
        }
    }

    pub fn kind(&self) -> FaultKind {
        match self {
            EffectError::UnknownController(_) | EffectError::AxisOutOfRange(_) => FaultKind::Setup,
            _ => FaultKind::Effect,
        }
    }
}

/// Device information or capability query that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("get device info: {0}")]
    DeviceInfo(NativeError),
    #[error("get capabilities: {0}")]
    Capabilities(NativeError),
    #[error("enumerate objects: {0}")]
    Objects(NativeError),
}

impl QueryError {
    pub fn kind(&self) -> FaultKind {
        FaultKind::Setup
    }
}

/// The native input subsystem could not be brought up.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("input subsystem initialization failed: {0}")]
    Init(NativeError),
    #[error("input subsystem unavailable on this platform")]
    Unsupported,
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_classification() {
        let e = AcquireError::from_native(SetupStep::Acquire, NativeError::OtherAppHasPriority);
        assert_eq!(e, AcquireError::OtherAppHasPriority(SetupStep::Acquire));
        assert_eq!(e.kind(), FaultKind::PriorityConflict);
        assert!(e.is_retryable());

        let e = AcquireError::from_native(SetupStep::CooperativeLevel, NativeError::InvalidHandle);
        assert_eq!(e.kind(), FaultKind::Setup);
        assert!(!e.is_retryable());

        for cause in [NativeError::Unplugged, NativeError::Other(0x8004_0209)] {
            let e = AcquireError::from_native(SetupStep::Acquire, cause);
            assert_eq!(e, AcquireError::Native { step: SetupStep::Acquire, cause });
            assert_eq!(e.kind(), FaultKind::Transient);
            assert!(e.is_retryable());
        }
    }

    #[test]
    fn poll_recovery_policy() {
        assert!(PollError::from_native(PollStep::Poll, NativeError::InputLost).needs_reacquire());
        assert!(PollError::from_native(PollStep::ReadState, NativeError::NotAcquired).needs_reacquire());
        assert!(!PollError::from_native(PollStep::Poll, NativeError::OtherAppHasPriority).needs_reacquire());
        assert!(!PollError::from_native(PollStep::ReadState, NativeError::Pending).needs_reacquire());

        assert_eq!(
            PollError::from_native(PollStep::ReadState, NativeError::Pending).kind(),
            FaultKind::Pending
        );
        assert_eq!(
            PollError::from_native(PollStep::Poll, NativeError::InputLost).kind(),
            FaultKind::Transient
        );
    }

    #[test]
    fn effect_messages_name_the_step() {
        let e = EffectError::from_native(EffectStep::Create, NativeError::DeviceFull);
        assert_eq!(e.to_string(), "create effect: device full");
        assert_eq!(e.kind(), FaultKind::Effect);
        assert_eq!(EffectError::NoEffect.kind(), FaultKind::Effect);
    }
}
