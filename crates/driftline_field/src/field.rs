//! Bounded particle drift
//!
//! Positions and velocities are stored as parallel buffers so the renderer
//! and the proximity graph can borrow the positions as one contiguous slice.
//!
//! Boundary policy: move first, then test. A particle that ends a step beyond
//! the box on some axis has that velocity component negated, but its position
//! is left where it is. It may therefore sit outside the box by up to one
//! step's displacement for a frame before the reflected velocity brings it
//! back. The flip only happens while the particle is still heading outward,
//! so a particle that is already returning is never turned around again.

use crate::config::FieldConfig;
use crate::error::Result;
use crate::particle::{BoundaryBox, Particle};
use driftline_core::{Axis, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Owns every particle of one backdrop
#[derive(Clone, Debug)]
pub struct VectorField {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    bounds: BoundaryBox,
    steps: u64,
}

impl VectorField {
    /// Create a field from explicit particles
    pub fn new(particles: impl IntoIterator<Item = Particle>, bounds: BoundaryBox) -> Self {
        let (positions, velocities) = particles
            .into_iter()
            .map(|p| (p.position, p.velocity))
            .unzip();
        Self {
            positions,
            velocities,
            bounds,
            steps: 0,
        }
    }

    /// Create a randomly initialised field, seeded from the config when set
    pub fn from_config(config: &FieldConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::random(config, &mut rng)
    }

    /// Create a randomly initialised field from any RNG
    ///
    /// Positions are uniform within `spawn_extent`, velocities uniform within
    /// `velocity_cap` on each axis.
    pub fn random<R: Rng + ?Sized>(config: &FieldConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let particles: Vec<Particle> = (0..config.particle_count)
            .map(|_| {
                Particle::new(
                    sample_box(rng, config.spawn_extent),
                    sample_box(rng, config.velocity_cap),
                )
            })
            .collect();

        tracing::debug!(
            count = particles.len(),
            degenerate = BoundaryBox::new(config.boundary).is_degenerate(),
            "initialised particle field"
        );

        Ok(Self::new(particles, BoundaryBox::new(config.boundary)))
    }

    /// Advance every particle by `velocity * dt` and reflect at the boundary
    ///
    /// `dt` is measured in reference frames. Returns the number of velocity
    /// components flipped. Non-finite or non-positive `dt` leaves the field
    /// untouched.
    pub fn step(&mut self, dt: f32) -> usize {
        if !dt.is_finite() || dt <= 0.0 {
            tracing::trace!(dt, "skipping field step");
            return 0;
        }

        let mut reflections = 0;
        for (position, velocity) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *position += *velocity * dt;

            for axis in Axis::ALL {
                let p = position.axis(axis);
                let v = velocity.axis_mut(axis);
                if self.bounds.exceeds(axis, p) && p * *v > 0.0 {
                    *v = -*v;
                    reflections += 1;
                }
            }
        }

        self.steps += 1;
        reflections
    }

    /// Current positions, index-aligned with particle ids
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Current velocities, index-aligned with particle ids
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Copy of one particle's state
    pub fn particle(&self, index: usize) -> Option<Particle> {
        Some(Particle::new(
            *self.positions.get(index)?,
            *self.velocities.get(index)?,
        ))
    }

    pub fn bounds(&self) -> BoundaryBox {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of steps taken since creation
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Largest per-axis displacement any particle makes in a step of `dt`
    ///
    /// Speeds never change in magnitude, so this bounds how far outside the
    /// box a particle can ever be found.
    pub fn max_step_displacement(&self, dt: f32) -> Vec3 {
        self.velocities.iter().fold(Vec3::ZERO, |acc, v| {
            let d = v.abs() * dt.abs();
            Vec3::new(acc.x.max(d.x), acc.y.max(d.y), acc.z.max(d.z))
        })
    }
}

fn sample_box<R: Rng + ?Sized>(rng: &mut R, half_extent: Vec3) -> Vec3 {
    Vec3::new(
        rng.gen_range(-half_extent.x..=half_extent.x),
        rng.gen_range(-half_extent.y..=half_extent.y),
        rng.gen_range(-half_extent.z..=half_extent.z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(position: Vec3, velocity: Vec3, extent: Vec3) -> VectorField {
        VectorField::new(
            [Particle::new(position, velocity)],
            BoundaryBox::new(extent),
        )
    }

    #[test]
    fn test_reflect_after_move() {
        let mut field = single(
            Vec3::new(9.999, 0.0, 0.0),
            Vec3::new(0.01, 0.0, 0.0),
            Vec3::new(10.0, 10.0, 5.0),
        );

        assert_eq!(field.step(1.0), 1);
        let p = field.particle(0).unwrap();
        assert!((p.position.x - 10.009).abs() < 1e-4);
        assert_eq!(p.velocity.x, -0.01);

        // The reflected velocity brings it back inside on the next step
        assert_eq!(field.step(1.0), 0);
        let p = field.particle(0).unwrap();
        assert!((p.position.x - 9.999).abs() < 1e-4);
        assert_eq!(p.velocity.x, -0.01);
    }

    #[test]
    fn test_empty_field_is_valid() {
        let config = FieldConfig::network().with_particle_count(0).with_seed(1);
        let mut field = VectorField::from_config(&config).unwrap();
        assert!(field.is_empty());
        assert_eq!(field.step(1.0), 0);
        assert_eq!(field.step_count(), 1);
    }

    #[test]
    fn test_seeded_fields_match() {
        let config = FieldConfig::network().with_seed(42);
        let a = VectorField::from_config(&config).unwrap();
        let b = VectorField::from_config(&config).unwrap();
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.velocities(), b.velocities());
    }

    #[test]
    fn test_initial_state_within_caps() {
        let config = FieldConfig::network().with_seed(7);
        let field = VectorField::from_config(&config).unwrap();
        assert_eq!(field.len(), 80);

        for (p, v) in field.positions().iter().zip(field.velocities()) {
            assert!(p.x.abs() <= 10.0 && p.y.abs() <= 10.0 && p.z.abs() <= 5.0);
            assert!(v.x.abs() <= 0.005 && v.y.abs() <= 0.005);
            assert_eq!(v.z, 0.0);
        }
    }

    #[test]
    fn test_containment_over_many_steps() {
        let config = FieldConfig {
            velocity_cap: Vec3::new(0.4, 0.4, 0.2),
            ..FieldConfig::network().with_seed(3)
        };
        let mut field = VectorField::from_config(&config).unwrap();
        let dt = 1.0;
        let slack = field.max_step_displacement(dt);

        for _ in 0..2_000 {
            field.step(dt);
            for p in field.positions() {
                assert!(field.bounds().contains_with_slack(*p, slack));
            }
        }
    }

    #[test]
    fn test_variable_dt_does_not_trap_particle_outside() {
        let mut field = single(
            Vec3::new(9.999, 0.0, 0.0),
            Vec3::new(0.01, 0.0, 0.0),
            Vec3::new(10.0, 10.0, 5.0),
        );
        field.step(1.0);
        // A shorter step leaves it outside but already heading back
        field.step(0.5);
        let p = field.particle(0).unwrap();
        assert_eq!(p.velocity.x, -0.01);
        field.step(1.0);
        assert!(field.particle(0).unwrap().position.x < 10.0);
    }

    #[test]
    fn test_zero_extent_box() {
        let mut field = single(Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0), Vec3::ZERO);
        for _ in 0..10 {
            field.step(1.0);
            assert!(field.particle(0).unwrap().position.x.abs() <= 0.1 + 1e-6);
        }
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut field = single(Vec3::ZERO, Vec3::ONE, Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(field.step(f32::NAN), 0);
        assert_eq!(field.step(-1.0), 0);
        assert_eq!(field.step_count(), 0);
        assert_eq!(field.positions()[0], Vec3::ZERO);
    }
}
