//! Enum state machines
//!
//! States are plain `Copy` enums that know their own transition table. A
//! machine wraps the current state and records every transition it takes,
//! which makes "exactly once" style assertions cheap in tests.

use smallvec::SmallVec;
use std::fmt::Debug;
use std::hash::Hash;

/// Identifier for an event fed to a state machine
pub type EventId = u32;

/// Trait for enum states with a transition table
pub trait StateTransitions: Clone + Copy + PartialEq + Eq + Hash + Debug + 'static {
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: EventId) -> Option<Self>;
}

/// A state machine instance over an enum state type
#[derive(Clone, Debug)]
pub struct StateMachine<S: StateTransitions> {
    current: S,
    /// History of state transitions (for debugging)
    history: SmallVec<[(S, EventId, S); 4]>,
}

impl<S: StateTransitions> StateMachine<S> {
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            history: SmallVec::new(),
        }
    }

    /// Get the current state
    pub fn current(&self) -> S {
        self.current
    }

    /// Check if we're in a specific state
    pub fn is_in(&self, state: S) -> bool {
        self.current == state
    }

    /// Check if an event would trigger a transition from the current state
    pub fn can_send(&self, event: EventId) -> bool {
        self.current.on_event(event).is_some()
    }

    /// Send an event, returning the new state if a transition happened
    pub fn send(&mut self, event: EventId) -> Option<S> {
        let from = self.current;
        let to = from.on_event(event)?;
        self.current = to;
        self.history.push((from, event, to));
        Some(to)
    }

    /// Get transition history
    pub fn history(&self) -> &[(S, EventId, S)] {
        &self.history
    }

    /// Clear transition history
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl<S: StateTransitions + Default> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESS: EventId = 1;
    const RELEASE: EventId = 2;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    enum Switch {
        #[default]
        Up,
        Down,
    }

    impl StateTransitions for Switch {
        fn on_event(&self, event: EventId) -> Option<Self> {
            match (self, event) {
                (Switch::Up, PRESS) => Some(Switch::Down),
                (Switch::Down, RELEASE) => Some(Switch::Up),
                _ => None,
            }
        }
    }

    #[test]
    fn test_simple_transitions() {
        let mut fsm = StateMachine::<Switch>::default();
        assert_eq!(fsm.current(), Switch::Up);

        assert_eq!(fsm.send(PRESS), Some(Switch::Down));
        assert!(fsm.is_in(Switch::Down));
        assert_eq!(fsm.send(RELEASE), Some(Switch::Up));
    }

    #[test]
    fn test_invalid_event_no_transition() {
        let mut fsm = StateMachine::new(Switch::Up);
        assert!(!fsm.can_send(RELEASE));
        assert_eq!(fsm.send(RELEASE), None);
        assert_eq!(fsm.current(), Switch::Up);
        assert!(fsm.history().is_empty());
    }

    #[test]
    fn test_history() {
        let mut fsm = StateMachine::new(Switch::Up);
        fsm.send(PRESS);
        fsm.send(RELEASE);

        let history = fsm.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], (Switch::Up, PRESS, Switch::Down));
        assert_eq!(history[1], (Switch::Down, RELEASE, Switch::Up));

        fsm.clear_history();
        assert!(fsm.history().is_empty());
    }
}
