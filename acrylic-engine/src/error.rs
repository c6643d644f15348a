//! Error taxonomy for the effect pipeline

use thiserror::Error;

use crate::backend::NativeStatus;
use crate::config::EffectType;

/// Malformed caller input. Never reaches the native layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid `{field}`: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// The host cannot render the requested effect at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{requested} effect is not supported on this system (build {build})")]
pub struct UnsupportedError {
    pub build: u32,
    pub requested: EffectType,
}

/// Native step that an [`ApplyError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepName {
    AccentPolicy,
    CornerPreference,
    BorderColor,
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccentPolicy => write!(f, "accent policy"),
            Self::CornerPreference => write!(f, "corner preference"),
            Self::BorderColor => write!(f, "border color"),
        }
    }
}

/// The primary (critical) native step failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("window handle {0:#x} does not refer to a live window")]
    InvalidHandle(u64),
    #[error("failed to set {step}: native status {status}")]
    Native { step: StepName, status: NativeStatus },
}

impl ApplyError {
    /// Stable numeric code for diagnostics.
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidHandle(_) => 1,
            Self::Native { .. } => 2,
        }
    }

    /// Status reported by the platform, if the failure came from a native call.
    pub fn native_status(&self) -> Option<NativeStatus> {
        match self {
            Self::InvalidHandle(_) => None,
            Self::Native { status, .. } => Some(*status),
        }
    }
}

/// Coarse classification, so callers can choose between retrying with other
/// parameters, falling back to no effect, or reporting a platform fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unsupported,
    Apply,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
}

impl EffectError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Apply(_) => ErrorKind::Apply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinguishable() {
        let validation: EffectError = ValidationError::new("hwnd", "missing").into();
        let unsupported: EffectError = UnsupportedError {
            build: 0,
            requested: EffectType::Acrylic,
        }
        .into();
        let apply: EffectError = ApplyError::InvalidHandle(42).into();

        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert_eq!(unsupported.kind(), ErrorKind::Unsupported);
        assert_eq!(apply.kind(), ErrorKind::Apply);
    }

    #[test]
    fn test_apply_error_status() {
        let err = ApplyError::Native {
            step: StepName::AccentPolicy,
            status: NativeStatus(5),
        };
        assert_eq!(err.code(), 2);
        assert_eq!(err.native_status(), Some(NativeStatus(5)));
        assert_eq!(ApplyError::InvalidHandle(1).native_status(), None);
        assert_eq!(err.to_string(), "failed to set accent policy: native status 0x00000005");
    }

    #[test]
    fn test_validation_message() {
        let err = ValidationError::new("corner", "unknown value 'square'");
        assert_eq!(err.to_string(), "invalid `corner`: unknown value 'square'");
    }
}
