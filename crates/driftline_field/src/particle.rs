//! Individual particle data and the box that contains it

use driftline_core::{Axis, Vec3};
use serde::{Deserialize, Serialize};

/// A single particle instance
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    /// Current position
    pub position: Vec3,
    /// Displacement per reference frame
    pub velocity: Vec3,
}

impl Particle {
    pub const fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }
}

/// Axis-aligned box centred on the origin, described by its half-extents
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryBox {
    pub extent: Vec3,
}

impl BoundaryBox {
    pub const fn new(extent: Vec3) -> Self {
        Self { extent }
    }

    /// A box with zero extent on some axis. Still valid: particles simply
    /// bounce in place on that axis.
    pub fn is_degenerate(&self) -> bool {
        self.extent.x == 0.0 || self.extent.y == 0.0 || self.extent.z == 0.0
    }

    /// Whether `value` lies beyond the box on `axis`
    #[inline]
    pub fn exceeds(&self, axis: Axis, value: f32) -> bool {
        value.abs() > self.extent.axis(axis)
    }

    /// Whether `point` lies within the box grown by `slack` per axis
    pub fn contains_with_slack(&self, point: Vec3, slack: Vec3) -> bool {
        Axis::ALL
            .iter()
            .all(|&axis| point.axis(axis).abs() <= self.extent.axis(axis) + slack.axis(axis))
    }
}
