//! Driftline Core
//!
//! Foundational pieces shared by the particle backdrop and the scroll
//! timeline:
//!
//! - **Geometry**: `Vec3`, `Vec2`, `Rect` and friends
//! - **Host Events**: a single-threaded event bus with scroll coalescing
//! - **Layout Host**: the read-only contract for document geometry
//! - **State Machines**: enum states with transition tables

pub mod events;
pub mod fsm;
pub mod geometry;
pub mod host;

pub use events::{event_types, EventType, HostEvent, HostEventBus, SubscriptionId};
pub use fsm::{EventId, StateMachine, StateTransitions};
pub use geometry::{Axis, Point, Rect, Size, Vec2, Vec3};
pub use host::{LayoutHost, StaticLayout};
