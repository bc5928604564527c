//! Timeline error types

use thiserror::Error;

/// Invalid or conflicting clip configuration
///
/// Raised at registration time only. A clip that registered successfully
/// never produces one of these later.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("clip id must not be empty")]
    EmptyId,

    #[error("clip `{0}` has an empty target selector")]
    EmptyTarget(String),

    #[error("clip `{0}` is already registered")]
    DuplicateId(String),

    #[error("invalid trigger line `{line}`: {reason}")]
    InvalidTrigger { line: String, reason: &'static str },

    #[error("unknown easing `{0}`")]
    UnknownEasing(String),

    #[error("unknown animated property `{0}`")]
    UnknownProperty(String),

    #[error("clip `{clip}`: `{name}` must be finite and >= 0, got {value}")]
    InvalidDuration {
        clip: String,
        name: &'static str,
        value: f32,
    },

    #[error("clip `{clip}`: property `{property}` is animated in `{present}` but missing from `{missing}`")]
    KeyframeMismatch {
        clip: String,
        property: String,
        present: &'static str,
        missing: &'static str,
    },

    #[error("clip `{clip}`: {option} cannot be used in {mode} mode")]
    ConflictingOption {
        clip: String,
        option: &'static str,
        mode: &'static str,
    },
}

/// Faults raised while evaluating a registered clip
///
/// These are isolated to the clip that raised them: the scheduler logs the
/// fault, skips that clip for the current tick and carries on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The trigger element is not mounted yet. Retried on the next refresh.
    #[error("target `{0}` is not mounted")]
    MissingTarget(String),

    /// The resolved trigger window is empty or inverted
    #[error("clip `{clip}`: trigger window [{start}, {end}] has no extent")]
    DegenerateWindow { clip: String, start: f32, end: f32 },

    /// Geometry from the layout host was NaN or infinite
    #[error("clip `{0}`: layout geometry is not finite")]
    NonFiniteGeometry(String),

    #[error("animation context has been disposed")]
    Disposed,
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;
