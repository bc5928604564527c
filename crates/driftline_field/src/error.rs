//! Particle field error types

use thiserror::Error;

/// Particle field configuration errors
///
/// Zero particle counts and zero-extent boxes are valid (they produce an
/// empty or frozen field); only values that cannot describe a field at all
/// are rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// A scalar setting was negative, NaN or infinite
    #[error("Invalid field setting `{name}`: {value} (must be finite and >= 0)")]
    InvalidSetting { name: &'static str, value: f32 },

    /// Particles would spawn outside the reflecting boundary
    #[error("Spawn extent {spawn} exceeds boundary {boundary} on the {axis} axis")]
    SpawnOutsideBoundary {
        axis: &'static str,
        spawn: f32,
        boundary: f32,
    },
}

/// Result type for particle field operations
pub type Result<T> = std::result::Result<T, FieldError>;
