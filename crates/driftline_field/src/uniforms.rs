//! Shader inputs for the backdrop
//!
//! The renderer feeds the background shader an elapsed time and a cursor in
//! normalized `[0,1] x [0,1]` coordinates with the origin at the bottom left.
//! The cursor eases towards the last pointer position rather than jumping.

use crate::frame::REFERENCE_FPS;
use driftline_core::{Size, Vec2};

/// Fraction of the remaining distance the cursor covers per reference frame
pub const POINTER_FOLLOW: f32 = 0.05;

/// Uniform values for the shader-driven background
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackdropUniforms {
    time: f32,
    mouse: Vec2,
    target: Vec2,
    resolution: Size,
}

impl BackdropUniforms {
    pub fn new(resolution: Size) -> Self {
        Self {
            time: 0.0,
            mouse: Vec2::new(0.5, 0.5),
            target: Vec2::new(0.5, 0.5),
            resolution,
        }
    }

    /// Record a pointer position in window pixels
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let Size { width, height } = self.resolution;
        if width <= 0.0 || height <= 0.0 || !x.is_finite() || !y.is_finite() {
            return;
        }
        self.target = Vec2::new(
            (x / width).clamp(0.0, 1.0),
            (1.0 - y / height).clamp(0.0, 1.0),
        );
    }

    pub fn resize(&mut self, resolution: Size) {
        self.resolution = resolution;
    }

    /// Advance elapsed time and ease the cursor towards its target
    ///
    /// Non-positive or non-finite `dt` is ignored so time never runs
    /// backwards.
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.time += dt;
        let t = 1.0 - (1.0 - POINTER_FOLLOW).powf(dt * REFERENCE_FPS);
        self.mouse = self.mouse.lerp(self.target, t);
    }

    /// Elapsed seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Smoothed cursor
    pub fn mouse(&self) -> Vec2 {
        self.mouse
    }

    /// Cursor the smoothing is heading towards
    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn resolution(&self) -> Size {
        self.resolution
    }
}

/// Slow rotation of the ambient point cloud at `elapsed` seconds
///
/// Returns Euler angles in radians: `x` wobbles, `y` turns steadily.
pub fn field_rotation(elapsed: f32) -> Vec2 {
    Vec2::new((elapsed * 0.05).sin() * 0.1, elapsed * 0.02)
}
