//! Driftline Animation System
//!
//! Scroll-driven timelines: declarative clips whose play state follows the
//! viewport as it crosses trigger lines.
//!
//! # Features
//!
//! - **Discrete Clips**: play forward once a trigger line is crossed, and
//!   optionally back again when scrolling up past it
//! - **Scrub Clips**: progress tracks scroll position between two lines,
//!   with optional smoothing
//! - **Stagger**: one clip drives a group of elements in a cascade
//! - **Animation Context**: scoped ownership of clips and particle fields
//!   with idempotent disposal
//!
//! # Example
//!
//! ```ignore
//! use driftline_animation::{AnimationContext, ClipConfig, KeyframeProperties, ToggleActions};
//!
//! let mut context = AnimationContext::mount(&bus, host, sink);
//! context.register(
//!     &ClipConfig::discrete("services", ".service-card")
//!         .keyframes(KeyframeProperties::opacity(0.0), KeyframeProperties::opacity(1.0))
//!         .trigger("top 80%", "bottom 20%")
//!         .toggle_actions(ToggleActions::PlayReverse)
//!         .stagger(0.1),
//! )?;
//! ```

pub mod clip;
pub mod context;
pub mod easing;
pub mod error;
pub mod keyframe;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod threshold;
pub mod trigger;

pub use clip::{
    ClipConfig, ClipMode, Direction, TimelineClip, ToggleActions, TriggerConfig, TriggerMode,
};
pub use context::{AnimationContext, FieldId};
pub use easing::Easing;
pub use error::{ConfigurationError, Result, TimelineError};
pub use keyframe::{AnimatedProperty, KeyframeProperties, PropertyValues};
pub use scheduler::{
    ClipId, ClipTarget, MemberStatus, NullSink, PropertySink, ScrollTimelineScheduler,
};
pub use snapshot::ScrollSnapshot;
pub use state::{play_events, PlayState};
pub use threshold::ScrollThreshold;
pub use trigger::{Anchor, TriggerLine};
