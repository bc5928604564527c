//! Per-frame pipeline
//!
//! A [`FrameLoop`] runs one frame of the backdrop in strict order: step the
//! field, rebuild the proximity graph, hand both buffers to the renderer.
//! The loop is owned by its caller and stops for good once cancelled.

use crate::config::FieldConfig;
use crate::error::Result;
use crate::field::VectorField;
use crate::proximity::{Edge, ProximityGraphBuilder};
use driftline_core::Vec3;

/// Simulation frames per second of wall time. `VectorField::step` takes
/// `dt` in these frames.
pub const REFERENCE_FPS: f32 = 60.0;

/// Buffers produced by one frame, borrowed from the loop
#[derive(Clone, Copy, Debug)]
pub struct FieldFrame<'a> {
    pub positions: &'a [Vec3],
    pub edges: &'a [Edge],
    /// Frames completed so far, including this one
    pub frame: u64,
}

impl FieldFrame<'_> {
    /// Flat `xyz` buffer of every particle position
    pub fn point_buffer(&self) -> Vec<f32> {
        self.positions
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect()
    }

    /// Flat `xyz xyz` buffer of both endpoints of every edge
    pub fn line_segments(&self) -> Vec<f32> {
        let mut buffer = Vec::with_capacity(self.edges.len() * 6);
        for edge in self.edges {
            let a = self.positions[edge.i as usize];
            let b = self.positions[edge.j as usize];
            buffer.extend_from_slice(&[a.x, a.y, a.z, b.x, b.y, b.z]);
        }
        buffer
    }
}

/// Scene renderer collaborator
pub trait FrameSink {
    fn present(&mut self, frame: &FieldFrame<'_>);
}

/// Cancellable step → rebuild pipeline for one field
#[derive(Debug)]
pub struct FrameLoop {
    field: VectorField,
    builder: ProximityGraphBuilder,
    threshold: f32,
    frames: u64,
    cancelled: bool,
}

impl FrameLoop {
    pub fn new(field: VectorField, builder: ProximityGraphBuilder, threshold: f32) -> Self {
        Self {
            field,
            builder,
            threshold,
            frames: 0,
            cancelled: false,
        }
    }

    /// Build the field and graph builder described by `config`
    pub fn from_config(config: &FieldConfig) -> Result<Self> {
        Ok(Self::new(
            VectorField::from_config(config)?,
            ProximityGraphBuilder::new(config.strategy),
            config.connection_threshold,
        ))
    }

    /// Run one frame for `dt` seconds of wall time
    ///
    /// Returns `None` once the loop has been cancelled.
    pub fn tick(&mut self, dt: f32) -> Option<FieldFrame<'_>> {
        self.step_frames(dt * REFERENCE_FPS)
    }

    /// Run one frame for `dt` reference frames
    pub fn step_frames(&mut self, dt: f32) -> Option<FieldFrame<'_>> {
        if self.cancelled {
            tracing::trace!("frame loop cancelled; ignoring tick");
            return None;
        }

        self.field.step(dt);
        self.builder.rebuild(self.field.positions(), self.threshold);
        self.frames += 1;

        Some(self.frame())
    }

    /// Buffers from the last completed frame, without stepping
    pub fn frame(&self) -> FieldFrame<'_> {
        FieldFrame {
            positions: self.field.positions(),
            edges: self.builder.edges(),
            frame: self.frames,
        }
    }

    /// Stop the loop permanently
    pub fn cancel(&mut self) {
        if !self.cancelled {
            tracing::debug!(frames = self.frames, "frame loop cancelled");
        }
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn field(&self) -> &VectorField {
        &self.field
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::{BoundaryBox, Particle};
    use crate::proximity::ProximityStrategy;

    fn two_particles() -> FrameLoop {
        let field = VectorField::new(
            [
                Particle::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0)),
                Particle::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(-0.5, 0.0, 0.0)),
            ],
            BoundaryBox::new(Vec3::new(10.0, 10.0, 5.0)),
        );
        FrameLoop::new(
            field,
            ProximityGraphBuilder::new(ProximityStrategy::BruteForce),
            1.5,
        )
    }

    #[test]
    fn test_edges_follow_the_step() {
        let mut frame_loop = two_particles();
        assert!(frame_loop.frame().edges.is_empty());

        // After one reference frame the pair is 1.0 apart, under the threshold
        let frame = frame_loop.step_frames(1.0).unwrap();
        assert_eq!(frame.frame, 1);
        assert_eq!(frame.edges.len(), 1);
        assert_eq!(frame.edges[0].distance, 1.0);
    }

    #[test]
    fn test_tick_converts_seconds() {
        let mut frame_loop = two_particles();
        frame_loop.tick(1.0 / REFERENCE_FPS);
        let x = frame_loop.field().positions()[0].x;
        assert!((x + 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_cancelled_loop_does_not_step() {
        let mut frame_loop = two_particles();
        frame_loop.cancel();
        assert!(frame_loop.is_cancelled());
        assert!(frame_loop.step_frames(1.0).is_none());
        assert_eq!(frame_loop.field().step_count(), 0);
        assert_eq!(frame_loop.frame_count(), 0);
    }

    #[test]
    fn test_buffers() {
        let mut frame_loop = two_particles();
        let frame = frame_loop.step_frames(1.0).unwrap();
        assert_eq!(frame.point_buffer(), vec![-0.5, 0.0, 0.0, 0.5, 0.0, 0.0]);
        assert_eq!(frame.line_segments(), vec![-0.5, 0.0, 0.0, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_from_config_empty() {
        let config = FieldConfig::network().with_particle_count(0).with_seed(1);
        let mut frame_loop = FrameLoop::from_config(&config).unwrap();
        let frame = frame_loop.tick(0.016).unwrap();
        assert!(frame.positions.is_empty());
        assert!(frame.edges.is_empty());
    }
}
