//! Animation context
//!
//! A context is the scoped owner of everything one mounted view animates:
//! its clips (looked up by id through a registry local to the context), its
//! particle fields and the backdrop uniforms. Mounting subscribes it to the
//! host event bus; [`dispose`](AnimationContext::dispose) unsubscribes,
//! halts every clip and cancels every frame loop. Dropping a context disposes
//! it.
//!
//! Bus handlers only hold a weak reference to the context state, so an event
//! that races disposal finds nothing to upgrade and is ignored.

use crate::clip::ClipConfig;
use crate::error::{ConfigurationError, Result, TimelineError};
use crate::scheduler::{ClipId, MemberStatus, PropertySink, ScrollTimelineScheduler};
use crate::snapshot::ScrollSnapshot;
use crate::state::PlayState;
use driftline_core::events::event_types;
use driftline_core::{HostEvent, HostEventBus, LayoutHost, Size, SubscriptionId};
use driftline_field::{BackdropUniforms, FrameLoop, FrameSink};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::{RefCell, RefMut};
use std::rc::{Rc, Weak};

new_key_type! {
    pub struct FieldId;
}

struct AttachedField {
    frame_loop: FrameLoop,
    sink: Box<dyn FrameSink>,
}

struct ContextState {
    scheduler: ScrollTimelineScheduler,
    registry: FxHashMap<String, ClipId>,
    fields: SlotMap<FieldId, AttachedField>,
    uniforms: BackdropUniforms,
    host: Rc<dyn LayoutHost>,
    sink: Box<dyn PropertySink>,
    disposed: bool,
}

impl ContextState {
    fn handle(&mut self, event: &HostEvent) {
        match *event {
            HostEvent::Scroll { .. } => self.refresh(),
            HostEvent::Resize { width, height } => {
                self.uniforms.resize(Size::new(width, height));
                self.refresh();
            }
            HostEvent::Frame { dt, .. } => self.frame(dt),
            HostEvent::PointerMove { x, y } => self.uniforms.pointer_moved(x, y),
        }
    }

    /// Rebuild the snapshot from the host and re-evaluate every clip
    fn refresh(&mut self) {
        let snapshot = ScrollSnapshot::capture(&*self.host, self.scheduler.selectors());
        self.scheduler.on_scroll(&snapshot, &mut *self.sink);
    }

    fn frame(&mut self, dt: f32) {
        self.uniforms.advance(dt);
        self.scheduler.advance(dt, &mut *self.sink);
        for field in self.fields.values_mut() {
            if let Some(frame) = field.frame_loop.tick(dt) {
                field.sink.present(&frame);
            }
        }
    }
}

fn dispatch(state: &Weak<RefCell<ContextState>>, event: &HostEvent) {
    let Some(cell) = state.upgrade() else {
        tracing::debug!(?event, "context dropped; ignoring event");
        return;
    };
    // A handler that fires while the context is mid-update is re-entrant
    let Ok(mut state) = cell.try_borrow_mut() else {
        tracing::warn!(?event, "context busy; dropping re-entrant event");
        return;
    };
    if state.disposed {
        tracing::debug!(?event, "context disposed; ignoring event");
        return;
    }
    state.handle(event);
}

/// Scoped owner of clips, fields and their event subscriptions
pub struct AnimationContext {
    state: Rc<RefCell<ContextState>>,
    bus: HostEventBus,
    subscriptions: SmallVec<[SubscriptionId; 4]>,
    disposed: bool,
}

impl AnimationContext {
    /// Create a context and subscribe it to `bus`
    ///
    /// Property values computed for clips are written to `sink`; geometry is
    /// read from `host`.
    pub fn mount(
        bus: &HostEventBus,
        host: Rc<dyn LayoutHost>,
        sink: impl PropertySink + 'static,
    ) -> Self {
        let state = Rc::new(RefCell::new(ContextState {
            scheduler: ScrollTimelineScheduler::new(),
            registry: FxHashMap::default(),
            fields: SlotMap::with_key(),
            uniforms: BackdropUniforms::new(host.viewport_size()),
            host,
            sink: Box::new(sink),
            disposed: false,
        }));

        let subscriptions = [
            event_types::SCROLL,
            event_types::RESIZE,
            event_types::FRAME,
            event_types::POINTER_MOVE,
        ]
        .into_iter()
        .map(|event_type| {
            let weak = Rc::downgrade(&state);
            bus.subscribe(event_type, move |event| dispatch(&weak, event))
        })
        .collect();

        tracing::debug!("animation context mounted");
        Self {
            state,
            bus: bus.clone(),
            subscriptions,
            disposed: false,
        }
    }

    fn live_state(&self) -> Result<RefMut<'_, ContextState>> {
        if self.disposed {
            return Err(TimelineError::Disposed);
        }
        Ok(self.state.borrow_mut())
    }

    /// Validate and register a clip
    ///
    /// The clip resolves against the layout on the next scroll, resize or
    /// [`refresh`](Self::refresh).
    pub fn register(&mut self, config: &ClipConfig) -> Result<ClipId> {
        let mut state = self.live_state()?;
        let clip = config.validate()?;
        if state.registry.contains_key(&clip.id) {
            return Err(ConfigurationError::DuplicateId(clip.id).into());
        }
        let name = clip.id.clone();
        let id = state.scheduler.register(clip);
        state.registry.insert(name, id);
        Ok(id)
    }

    /// Remove a clip. Returns false if it was not registered here.
    pub fn unregister(&mut self, id: ClipId) -> bool {
        let Ok(mut state) = self.live_state() else {
            return false;
        };
        let Some(clip) = state.scheduler.unregister(id) else {
            return false;
        };
        state.registry.remove(&clip.id);
        true
    }

    /// Look up a clip by its configured id
    pub fn clip_id(&self, name: &str) -> Option<ClipId> {
        self.state.borrow().registry.get(name).copied()
    }

    /// Hand a frame loop to the context; it ticks on every frame event
    pub fn attach_field(
        &mut self,
        frame_loop: FrameLoop,
        sink: impl FrameSink + 'static,
    ) -> Result<FieldId> {
        let mut state = self.live_state()?;
        let id = state.fields.insert(AttachedField {
            frame_loop,
            sink: Box::new(sink),
        });
        tracing::debug!(particles = state.fields[id].frame_loop.field().len(), "field attached");
        Ok(id)
    }

    /// Take a frame loop back out of the context
    pub fn detach_field(&mut self, id: FieldId) -> Option<FrameLoop> {
        let mut state = self.live_state().ok()?;
        state.fields.remove(id).map(|field| field.frame_loop)
    }

    /// Re-evaluate every clip against the host's current layout
    pub fn refresh(&mut self) -> Result<()> {
        self.live_state()?.refresh();
        Ok(())
    }

    /// Tear everything down. Safe to call more than once.
    ///
    /// After this returns no handler of this context runs again, every clip
    /// member is `Idle`, and no property or frame is written.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        for id in self.subscriptions.drain(..) {
            self.bus.unsubscribe(id);
        }

        let mut state = self.state.borrow_mut();
        state.disposed = true;
        state.scheduler.halt();
        for field in state.fields.values_mut() {
            field.frame_loop.cancel();
        }
        state.fields.clear();
        state.registry.clear();

        tracing::debug!(clips = state.scheduler.len(), "animation context disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn play_state(&self, id: ClipId) -> Option<PlayState> {
        self.state.borrow().scheduler.play_state(id)
    }

    pub fn progress(&self, id: ClipId) -> Option<f32> {
        self.state.borrow().scheduler.progress(id)
    }

    pub fn member_states(&self, id: ClipId) -> Option<Vec<MemberStatus>> {
        self.state.borrow().scheduler.member_states(id)
    }

    /// Registered clip ids, keyed by configured name
    pub fn clips(&self) -> Vec<(String, ClipId)> {
        let state = self.state.borrow();
        let mut clips: Vec<_> = state
            .registry
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect();
        clips.sort();
        clips
    }

    /// Whether any clip is mid-playback or still smoothing
    pub fn is_animating(&self) -> bool {
        self.state.borrow().scheduler.is_animating()
    }

    /// Frames completed by an attached field
    pub fn field_frames(&self, id: FieldId) -> Option<u64> {
        self.state
            .borrow()
            .fields
            .get(id)
            .map(|field| field.frame_loop.frame_count())
    }

    /// Edge count of an attached field's last frame
    pub fn field_edges(&self, id: FieldId) -> Option<usize> {
        self.state
            .borrow()
            .fields
            .get(id)
            .map(|field| field.frame_loop.frame().edges.len())
    }

    pub fn uniforms(&self) -> BackdropUniforms {
        self.state.borrow().uniforms
    }
}

impl Drop for AnimationContext {
    fn drop(&mut self) {
        self.dispose();
    }
}
