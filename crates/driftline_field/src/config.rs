//! Particle field configuration

use crate::error::{FieldError, Result};
use crate::proximity::ProximityStrategy;
use driftline_core::Vec3;
use serde::{Deserialize, Serialize};

/// Configuration for a particle field and its proximity graph
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of particles, fixed for the lifetime of the field
    pub particle_count: usize,
    /// Half-extents of the box initial positions are drawn from
    pub spawn_extent: Vec3,
    /// Half-extents of the reflecting boundary
    pub boundary: Vec3,
    /// Per-axis cap on initial speed (per reference frame)
    pub velocity_cap: Vec3,
    /// Particles closer than this are connected
    pub connection_threshold: f32,
    /// Seed for reproducible fields; entropy when absent
    pub seed: Option<u64>,
    /// How the proximity graph is computed
    pub strategy: ProximityStrategy,
}

impl FieldConfig {
    /// Drifting network of connected points (80 particles, links under 2.5)
    pub fn network() -> Self {
        Self {
            particle_count: 80,
            spawn_extent: Vec3::new(10.0, 10.0, 5.0),
            boundary: Vec3::new(10.0, 10.0, 5.0),
            velocity_cap: Vec3::new(0.005, 0.005, 0.0),
            connection_threshold: 2.5,
            seed: None,
            strategy: ProximityStrategy::BruteForce,
        }
    }

    /// Sparse, motionless point cloud with no links (50 particles)
    pub fn ambient() -> Self {
        Self {
            particle_count: 50,
            velocity_cap: Vec3::ZERO,
            connection_threshold: 0.0,
            ..Self::network()
        }
    }

    /// Builder: set a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder: set the particle count
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Check every scalar setting is finite and non-negative, and that the
    /// spawn box fits inside the boundary
    pub fn validate(&self) -> Result<()> {
        let vectors = [
            ("spawn_extent", self.spawn_extent),
            ("boundary", self.boundary),
            ("velocity_cap", self.velocity_cap),
        ];
        for (name, v) in vectors {
            for value in [v.x, v.y, v.z] {
                check_setting(name, value)?;
            }
        }
        check_setting("connection_threshold", self.connection_threshold)?;

        let axes = [
            ("x", self.spawn_extent.x, self.boundary.x),
            ("y", self.spawn_extent.y, self.boundary.y),
            ("z", self.spawn_extent.z, self.boundary.z),
        ];
        for (axis, spawn, boundary) in axes {
            if spawn > boundary {
                return Err(FieldError::SpawnOutsideBoundary {
                    axis,
                    spawn,
                    boundary,
                });
            }
        }
        Ok(())
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::network()
    }
}

fn check_setting(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FieldError::InvalidSetting { name, value })
    }
}
