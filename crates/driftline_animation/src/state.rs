//! Clip play states
//!
//! Discrete members cycle `Idle → Entering → Active → Exiting → Idle`. A
//! reverse that arrives before the forward playback finished goes to
//! `Reversed` instead of `Exiting`; both finish back in `Idle`. Scrub members
//! only move between `Idle` and `Active`.

use driftline_core::{EventId, StateTransitions};
use serde::Serialize;

/// Play state event identifiers
pub mod play_events {
    use driftline_core::EventId;

    /// The trigger window was entered going down
    pub const PLAY_FORWARD: EventId = 1;
    /// The start line was crossed going back up on a reversible clip
    pub const PLAY_BACKWARD: EventId = 2;
    /// Time-based playback reached its end
    pub const PLAYBACK_COMPLETE: EventId = 3;
    /// Scrub progress left zero, or the scroll moved past the start line
    pub const SCRUB_ENTER: EventId = 4;
    /// Scrub progress returned to zero above the start line
    pub const SCRUB_LEAVE: EventId = 5;
    /// The owning context was disposed
    pub const HALT: EventId = 6;
}

/// Phase of one clip member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PlayState {
    #[default]
    Idle,
    /// Playing forward towards `Active`
    Entering,
    /// Fully applied, or tracking scroll in scrub mode
    Active,
    /// Playing backward from `Active`
    Exiting,
    /// Playing backward from an unfinished `Entering`
    Reversed,
}

impl PlayState {
    /// Whether time-based playback is in progress
    pub fn is_playing(&self) -> bool {
        matches!(
            self,
            PlayState::Entering | PlayState::Exiting | PlayState::Reversed
        )
    }

    /// Whether playback runs towards progress 0
    pub fn is_backward(&self) -> bool {
        matches!(self, PlayState::Exiting | PlayState::Reversed)
    }
}

impl StateTransitions for PlayState {
    fn on_event(&self, event: EventId) -> Option<Self> {
        use play_events::*;
        match (self, event) {
            (PlayState::Idle, HALT) => None,
            (_, HALT) => Some(PlayState::Idle),
            // Discrete
            (PlayState::Idle, PLAY_FORWARD) => Some(PlayState::Entering),
            (PlayState::Entering, PLAYBACK_COMPLETE) => Some(PlayState::Active),
            (PlayState::Entering, PLAY_BACKWARD) => Some(PlayState::Reversed),
            (PlayState::Active, PLAY_BACKWARD) => Some(PlayState::Exiting),
            (PlayState::Exiting | PlayState::Reversed, PLAYBACK_COMPLETE) => Some(PlayState::Idle),
            (PlayState::Exiting | PlayState::Reversed, PLAY_FORWARD) => Some(PlayState::Entering),
            // Scrub
            (PlayState::Idle, SCRUB_ENTER) => Some(PlayState::Active),
            (PlayState::Active, SCRUB_LEAVE) => Some(PlayState::Idle),
            _ => None,
        }
    }
}
