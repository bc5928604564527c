//! Host event bus
//!
//! The layout host and the frame clock push [`HostEvent`]s into a
//! [`HostEventBus`]; subscribers (animation contexts, simulators) receive them
//! through registered handlers. Everything runs on the host's thread.
//!
//! Events can be dispatched immediately with [`HostEventBus::emit`] or queued
//! with [`HostEventBus::post`] and delivered later by [`HostEventBus::flush`].
//! Queued scroll and resize events coalesce: only the most recent one of a
//! consecutive run is kept, since consumers derive their state from the
//! latest geometry alone.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Event type identifier
pub type EventType = u32;

/// Host event types
pub mod event_types {
    use super::EventType;

    pub const POINTER_MOVE: EventType = 3;
    pub const SCROLL: EventType = 30;
    pub const RESIZE: EventType = 40;
    /// Periodic frame clock tick
    pub const FRAME: EventType = 90;
}

/// An event produced by the layout host or the frame clock
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    /// Vertical scroll offset changed (document pixels)
    Scroll { offset: f32 },
    /// Viewport size changed
    Resize { width: f32, height: f32 },
    /// Frame clock tick; `dt` and `elapsed` are in seconds
    Frame { dt: f32, elapsed: f32 },
    /// Pointer moved (viewport pixels)
    PointerMove { x: f32, y: f32 },
}

impl HostEvent {
    pub fn event_type(&self) -> EventType {
        use event_types::*;
        match self {
            HostEvent::Scroll { .. } => SCROLL,
            HostEvent::Resize { .. } => RESIZE,
            HostEvent::Frame { .. } => FRAME,
            HostEvent::PointerMove { .. } => POINTER_MOVE,
        }
    }

    /// Whether a newer event of the same type makes this one redundant
    fn coalesces(&self) -> bool {
        matches!(self, HostEvent::Scroll { .. } | HostEvent::Resize { .. })
    }
}

new_key_type! {
    /// Handle to a registered event handler
    pub struct SubscriptionId;
}

/// Event handler function type
pub type EventHandler = Rc<dyn Fn(&HostEvent)>;

struct Subscription {
    event_type: EventType,
    handler: EventHandler,
}

#[derive(Default)]
struct BusInner {
    subscriptions: SlotMap<SubscriptionId, Subscription>,
    queue: VecDeque<HostEvent>,
    coalesced: u64,
}

/// Single-threaded event bus shared between the host and its subscribers
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct HostEventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl HostEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event type
    pub fn subscribe<F>(&self, event_type: EventType, handler: F) -> SubscriptionId
    where
        F: Fn(&HostEvent) + 'static,
    {
        self.inner.borrow_mut().subscriptions.insert(Subscription {
            event_type,
            handler: Rc::new(handler),
        })
    }

    /// Remove a handler. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().subscriptions.remove(id).is_some()
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.inner.borrow().subscriptions.contains_key(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscriptions.len()
    }

    /// Dispatch an event to every matching handler right away
    ///
    /// Handlers may subscribe, unsubscribe or post while being called. A
    /// handler removed mid-dispatch is not called afterwards. Returns the
    /// number of handlers that ran.
    pub fn emit(&self, event: HostEvent) -> usize {
        let event_type = event.event_type();
        let targets: SmallVec<[(SubscriptionId, EventHandler); 4]> = self
            .inner
            .borrow()
            .subscriptions
            .iter()
            .filter(|(_, sub)| sub.event_type == event_type)
            .map(|(id, sub)| (id, Rc::clone(&sub.handler)))
            .collect();

        let mut delivered = 0;
        for (id, handler) in targets {
            if !self.is_subscribed(id) {
                continue;
            }
            handler(&event);
            delivered += 1;
        }
        delivered
    }

    /// Queue an event for the next [`flush`](Self::flush)
    pub fn post(&self, event: HostEvent) {
        let mut inner = self.inner.borrow_mut();
        if let Some(last) = inner.queue.back_mut() {
            if event.coalesces() && last.event_type() == event.event_type() {
                *last = event;
                inner.coalesced += 1;
                tracing::trace!("coalesced queued {:?}", event);
                return;
            }
        }
        inner.queue.push_back(event);
    }

    /// Deliver all queued events in order. Returns the number delivered.
    pub fn flush(&self) -> usize {
        let mut flushed = 0;
        loop {
            // Borrow only long enough to pop, so handlers can post again
            let next = self.inner.borrow_mut().queue.pop_front();
            let Some(event) = next else {
                break;
            };
            self.emit(event);
            flushed += 1;
        }
        flushed
    }

    /// Number of queued, undelivered events
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Total number of queued events dropped by coalescing
    pub fn coalesced_count(&self) -> u64 {
        self.inner.borrow().coalesced
    }
}
