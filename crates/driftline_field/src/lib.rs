//! Driftline Particle Field
//!
//! A bounded cloud of drifting particles and the proximity graph drawn
//! between them, recomputed every frame.
//!
//! # Features
//!
//! - **VectorField**: move-then-reflect integration inside a box
//! - **Proximity Graph**: brute-force or grid-bucketed edge rebuilds with
//!   identical output
//! - **Frame Loop**: caller-owned, cancellable step → rebuild pipeline
//! - **Backdrop Uniforms**: elapsed time and a smoothed, normalized cursor
//!
//! # Example
//!
//! ```ignore
//! use driftline_field::{FieldConfig, FrameLoop};
//!
//! let mut frame_loop = FrameLoop::from_config(&FieldConfig::network())?;
//! if let Some(frame) = frame_loop.tick(1.0 / 60.0) {
//!     renderer.draw_lines(&frame.line_segments());
//! }
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod frame;
pub mod particle;
pub mod proximity;
pub mod uniforms;

pub use config::FieldConfig;
pub use error::{FieldError, Result};
pub use field::VectorField;
pub use frame::{FieldFrame, FrameLoop, FrameSink, REFERENCE_FPS};
pub use particle::{BoundaryBox, Particle};
pub use proximity::{proximity_edges, Edge, ProximityGraphBuilder, ProximityStrategy};
pub use uniforms::{field_rotation, BackdropUniforms, POINTER_FOLLOW};
