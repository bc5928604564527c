//! Keyframe property sets
//!
//! A clip animates between two keyframes. Each keyframe maps a set of
//! animated properties to target values, written in config as a plain table:
//!
//! ```toml
//! from = { opacity = 0.0, y = 50.0 }
//! to = { opacity = 1.0, y = 0.0 }
//! ```

use crate::easing::Easing;
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A visual property a clip can drive
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AnimatedProperty {
    /// Opacity (0.0 to 1.0)
    Opacity,
    /// Translation X in pixels
    X,
    /// Translation Y in pixels
    Y,
    /// Translation Z in pixels
    Z,
    /// Uniform scale factor
    Scale,
    ScaleX,
    ScaleY,
    /// Rotation in degrees (Z-axis)
    Rotate,
    /// Rotation X in degrees (3D tilt)
    RotateX,
    /// Rotation Y in degrees (3D turn)
    RotateY,
    /// SVG stroke dash offset, used for line-drawing reveals
    StrokeDashoffset,
}

impl AnimatedProperty {
    pub const ALL: [AnimatedProperty; 11] = [
        AnimatedProperty::Opacity,
        AnimatedProperty::X,
        AnimatedProperty::Y,
        AnimatedProperty::Z,
        AnimatedProperty::Scale,
        AnimatedProperty::ScaleX,
        AnimatedProperty::ScaleY,
        AnimatedProperty::Rotate,
        AnimatedProperty::RotateX,
        AnimatedProperty::RotateY,
        AnimatedProperty::StrokeDashoffset,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnimatedProperty::Opacity => "opacity",
            AnimatedProperty::X => "x",
            AnimatedProperty::Y => "y",
            AnimatedProperty::Z => "z",
            AnimatedProperty::Scale => "scale",
            AnimatedProperty::ScaleX => "scaleX",
            AnimatedProperty::ScaleY => "scaleY",
            AnimatedProperty::Rotate => "rotate",
            AnimatedProperty::RotateX => "rotateX",
            AnimatedProperty::RotateY => "rotateY",
            AnimatedProperty::StrokeDashoffset => "strokeDashoffset",
        }
    }
}

impl fmt::Display for AnimatedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnimatedProperty {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimatedProperty::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ConfigurationError::UnknownProperty(s.to_string()))
    }
}

impl TryFrom<String> for AnimatedProperty {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AnimatedProperty> for String {
    fn from(property: AnimatedProperty) -> Self {
        property.name().to_string()
    }
}

/// Interpolated values ready to hand to a property sink
pub type PropertyValues = SmallVec<[(AnimatedProperty, f32); 4]>;

/// Property values at one end of a clip
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyframeProperties {
    values: BTreeMap<AnimatedProperty, f32>,
}

impl KeyframeProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create properties with only opacity set
    pub fn opacity(value: f32) -> Self {
        Self::new().with(AnimatedProperty::Opacity, value)
    }

    /// Create properties with translation
    pub fn translate(x: f32, y: f32) -> Self {
        Self::new()
            .with(AnimatedProperty::X, x)
            .with(AnimatedProperty::Y, y)
    }

    /// Builder: set a property
    pub fn with(mut self, property: AnimatedProperty, value: f32) -> Self {
        self.values.insert(property, value);
        self
    }

    pub fn set(&mut self, property: AnimatedProperty, value: f32) {
        self.values.insert(property, value);
    }

    pub fn get(&self, property: AnimatedProperty) -> Option<f32> {
        self.values.get(&property).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Properties in a stable order
    pub fn properties(&self) -> impl Iterator<Item = AnimatedProperty> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnimatedProperty, f32)> + '_ {
        self.values.iter().map(|(p, v)| (*p, *v))
    }

    /// First property present here but missing from `other`
    pub fn first_missing_from(&self, other: &Self) -> Option<AnimatedProperty> {
        self.properties().find(|p| !other.values.contains_key(p))
    }

    /// Interpolate towards `other` at eased progress `t`
    ///
    /// Only properties present on both sides are produced.
    pub fn lerp(&self, other: &Self, t: f32) -> PropertyValues {
        self.values
            .iter()
            .filter_map(|(property, a)| {
                let b = other.values.get(property)?;
                Some((*property, a + (b - a) * t))
            })
            .collect()
    }

    /// Interpolate with `easing` applied to linear progress `progress`
    pub fn sample(&self, other: &Self, easing: Easing, progress: f32) -> PropertyValues {
        let progress = progress.clamp(0.0, 1.0);
        // Endpoints are exact regardless of easing precision
        let t = if progress <= 0.0 {
            0.0
        } else if progress >= 1.0 {
            1.0
        } else {
            easing.apply(progress)
        };
        self.lerp(other, t)
    }
}

impl FromIterator<(AnimatedProperty, f32)> for KeyframeProperties {
    fn from_iter<I: IntoIterator<Item = (AnimatedProperty, f32)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
