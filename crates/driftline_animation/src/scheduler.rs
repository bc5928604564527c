//! Scroll timeline scheduler
//!
//! Owns every registered clip and its per-member play state. Two inputs drive
//! it:
//!
//! - [`on_scroll`](ScrollTimelineScheduler::on_scroll) with a fresh
//!   [`ScrollSnapshot`]: resolves trigger windows, turns line crossings into
//!   play/reverse transitions and recomputes scrub progress
//! - [`advance`](ScrollTimelineScheduler::advance) with elapsed seconds: moves
//!   time-based playback and scrub smoothing forward
//!
//! Each call is one tick. Within a tick a member takes at most one state
//! transition: several crossings collapse into the one net crossing between
//! the previous and the current scroll region.

use crate::clip::{Direction, TimelineClip, TriggerMode};
use crate::error::{Result, TimelineError};
use crate::keyframe::AnimatedProperty;
use crate::snapshot::ScrollSnapshot;
use crate::state::{play_events::*, PlayState};
use driftline_core::{EventId, StateMachine};
use serde::Serialize;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct ClipId;
}

/// Smoothed scrub progress snaps to its target once this close
const SCRUB_SNAP: f32 = 1e-4;

/// One member of a clip, as seen by a property sink
#[derive(Clone, Copy, Debug)]
pub struct ClipTarget<'a> {
    pub clip: ClipId,
    /// The clip's configured id
    pub name: &'a str,
    pub selector: &'a str,
    /// Index among the elements matching `selector`, in document order
    pub member: usize,
}

/// Receives interpolated property values (the evaluator's output)
pub trait PropertySink {
    fn write(&mut self, target: &ClipTarget<'_>, values: &[(AnimatedProperty, f32)]);
}

/// Sink that discards every write
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl PropertySink for NullSink {
    fn write(&mut self, _target: &ClipTarget<'_>, _values: &[(AnimatedProperty, f32)]) {}
}

/// Public view of one member
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MemberStatus {
    pub state: PlayState,
    pub progress: f32,
}

/// Where the scroll offset sits relative to a trigger window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Region {
    Before,
    Inside,
    After,
}

impl Region {
    fn of(offset: f32, start: f32, end: f32) -> Self {
        if offset < start {
            Region::Before
        } else if offset > end {
            Region::After
        } else {
            Region::Inside
        }
    }
}

#[derive(Debug)]
struct Member {
    machine: StateMachine<PlayState>,
    /// Applied progress in `[0, 1]`
    progress: f32,
    /// Scrub progress the applied progress is heading for
    target: f32,
    /// Seconds left before time-based playback moves
    wait: f32,
    region: Region,
    /// Progress last handed to the sink
    written: Option<f32>,
    /// Whether a transition already happened this tick
    moved: bool,
}

impl Member {
    fn new() -> Self {
        Self {
            machine: StateMachine::new(PlayState::Idle),
            progress: 0.0,
            target: 0.0,
            wait: 0.0,
            // First geometry counts as arriving from above the window
            region: Region::Before,
            written: None,
            moved: false,
        }
    }

    fn state(&self) -> PlayState {
        self.machine.current()
    }

    /// Send `event` unless this member already moved during the tick
    fn transition(&mut self, event: EventId) -> Option<(PlayState, PlayState)> {
        if self.moved {
            return None;
        }
        let from = self.machine.current();
        let to = self.machine.send(event)?;
        self.moved = true;
        Some((from, to))
    }

    fn halt(&mut self) {
        self.machine.send(HALT);
        self.progress = 0.0;
        self.target = 0.0;
        self.wait = 0.0;
        self.region = Region::Before;
        self.written = None;
    }
}

#[derive(Debug)]
struct ClipSlot {
    clip: TimelineClip,
    members: Vec<Member>,
}

impl ClipSlot {
    fn on_scroll(&mut self, snapshot: &ScrollSnapshot) -> Result<()> {
        let count = snapshot.bounds(&self.clip.target).len();
        if count == 0 {
            self.release();
            return Err(TimelineError::MissingTarget(self.clip.target.clone()));
        }
        let Some(&trigger) = snapshot.bounds(self.clip.trigger_selector()).first() else {
            self.release();
            return Err(TimelineError::MissingTarget(
                self.clip.trigger_selector().to_string(),
            ));
        };

        let viewport = snapshot.viewport_height;
        let offset = snapshot.scroll_offset;
        let start = self.clip.start.scroll_offset(trigger.top(), trigger.height(), viewport);
        let end = self.clip.end.scroll_offset(trigger.top(), trigger.height(), viewport);

        if !(start.is_finite() && end.is_finite() && offset.is_finite() && viewport.is_finite()) {
            return Err(TimelineError::NonFiniteGeometry(self.clip.id.clone()));
        }
        let degenerate = match self.clip.mode {
            TriggerMode::Discrete { .. } => end < start,
            TriggerMode::Scrub { .. } => end <= start,
        };
        if degenerate {
            return Err(TimelineError::DegenerateWindow {
                clip: self.clip.id.clone(),
                start,
                end,
            });
        }

        if self.members.len() != count {
            tracing::debug!(clip = %self.clip.id, members = count, "clip group resolved");
            self.members.resize_with(count, Member::new);
        }
        for member in &mut self.members {
            member.moved = false;
        }

        match self.clip.mode {
            TriggerMode::Discrete { direction, delay } => {
                self.discrete_crossings(offset, start, end, direction, delay)
            }
            TriggerMode::Scrub { lag } => self.scrub_progress(offset, start, end, viewport, lag),
        }
        Ok(())
    }

    /// Drop resolved members; the clip reads as `Idle` until its geometry
    /// comes back
    fn release(&mut self) {
        if !self.members.is_empty() {
            tracing::debug!(clip = %self.clip.id, "clip target unmounted");
            self.members.clear();
        }
    }

    fn discrete_crossings(
        &mut self,
        offset: f32,
        start: f32,
        end: f32,
        direction: Direction,
        delay: f32,
    ) {
        let region = Region::of(offset, start, end);
        let last = self.members.len().saturating_sub(1);

        for (index, member) in self.members.iter_mut().enumerate() {
            let previous = std::mem::replace(&mut member.region, region);

            // Net crossing: only passing the start line matters. Leaving past
            // the end and coming back into the window are no-ops.
            let (event, wait) = match (previous, region) {
                (Region::Before, Region::Inside | Region::After) => {
                    (PLAY_FORWARD, delay + index as f32 * self.clip.stagger_delta)
                }
                (Region::Inside | Region::After, Region::Before)
                    if direction == Direction::Reversible =>
                {
                    (PLAY_BACKWARD, (last - index) as f32 * self.clip.stagger_delta)
                }
                _ => continue,
            };

            if let Some((from, to)) = member.transition(event) {
                member.wait = wait;
                tracing::debug!(
                    clip = %self.clip.id,
                    member = index,
                    ?from,
                    ?to,
                    "clip transition"
                );
            }
        }
    }

    fn scrub_progress(&mut self, offset: f32, start: f32, end: f32, viewport: f32, lag: f32) {
        for (index, member) in self.members.iter_mut().enumerate() {
            let shift = index as f32 * self.clip.stagger_delta * viewport;
            let (start, end) = (start + shift, end + shift);

            member.target = ((offset - start) / (end - start)).clamp(0.0, 1.0);
            member.region = Region::of(offset, start, end);
            if lag <= 0.0 {
                member.progress = member.target;
            }
            sync_scrub_state(&self.clip.id, index, member);
        }
    }

    fn advance(&mut self, dt: f32) {
        for member in &mut self.members {
            member.moved = false;
        }

        match self.clip.mode {
            TriggerMode::Discrete { .. } => {
                for (index, member) in self.members.iter_mut().enumerate() {
                    let state = member.state();
                    if !state.is_playing() {
                        continue;
                    }

                    let mut remaining = dt;
                    if member.wait > 0.0 {
                        let used = member.wait.min(remaining);
                        member.wait -= used;
                        remaining -= used;
                        if remaining <= 0.0 {
                            continue;
                        }
                    }

                    let step = if self.clip.duration > 0.0 {
                        remaining / self.clip.duration
                    } else {
                        1.0
                    };
                    let finished = if state.is_backward() {
                        member.progress = (member.progress - step).max(0.0);
                        member.progress <= 0.0
                    } else {
                        member.progress = (member.progress + step).min(1.0);
                        member.progress >= 1.0
                    };

                    if finished {
                        if let Some((from, to)) = member.transition(PLAYBACK_COMPLETE) {
                            tracing::debug!(
                                clip = %self.clip.id,
                                member = index,
                                ?from,
                                ?to,
                                "clip transition"
                            );
                        }
                    }
                }
            }
            TriggerMode::Scrub { lag } if lag > 0.0 => {
                let follow = 1.0 - (-dt / lag).exp();
                for (index, member) in self.members.iter_mut().enumerate() {
                    if member.progress == member.target {
                        continue;
                    }
                    let next = member.progress + (member.target - member.progress) * follow;
                    member.progress = if (member.target - next).abs() < SCRUB_SNAP {
                        member.target
                    } else {
                        next
                    };
                    sync_scrub_state(&self.clip.id, index, member);
                }
            }
            TriggerMode::Scrub { .. } => {}
        }
    }

    /// Evaluate and write every member whose progress changed
    fn write_changed(&mut self, id: ClipId, sink: &mut dyn PropertySink) {
        for (index, member) in self.members.iter_mut().enumerate() {
            if member.written == Some(member.progress) {
                continue;
            }
            let values = self
                .clip
                .from
                .sample(&self.clip.to, self.clip.easing, member.progress);
            sink.write(
                &ClipTarget {
                    clip: id,
                    name: &self.clip.id,
                    selector: &self.clip.target,
                    member: index,
                },
                &values,
            );
            member.written = Some(member.progress);
        }
    }
}

/// Scrub members are `Active` once progress leaves zero or the scroll passes
/// the start line, and `Idle` otherwise
fn sync_scrub_state(clip: &str, index: usize, member: &mut Member) {
    let active = member.progress > 0.0 || member.region != Region::Before;
    let event = match (member.state(), active) {
        (PlayState::Idle, true) => SCRUB_ENTER,
        (PlayState::Active, false) => SCRUB_LEAVE,
        _ => return,
    };
    if let Some((from, to)) = member.transition(event) {
        tracing::debug!(clip, member = index, ?from, ?to, "clip transition");
    }
}

/// Maps scroll snapshots and elapsed time onto clip state
#[derive(Debug, Default)]
pub struct ScrollTimelineScheduler {
    clips: SlotMap<ClipId, ClipSlot>,
    halted: bool,
}

impl ScrollTimelineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validated clip. Its members resolve on the next scroll tick.
    pub fn register(&mut self, clip: TimelineClip) -> ClipId {
        tracing::debug!(clip = %clip.id, target = %clip.target, "registered clip");
        self.clips.insert(ClipSlot {
            clip,
            members: Vec::new(),
        })
    }

    /// Remove a clip without writing anything further for it
    pub fn unregister(&mut self, id: ClipId) -> Option<TimelineClip> {
        self.clips.remove(id).map(|slot| slot.clip)
    }

    /// Recompute triggers and scrub progress from `snapshot`
    pub fn on_scroll(&mut self, snapshot: &ScrollSnapshot, sink: &mut dyn PropertySink) {
        if self.halted {
            tracing::trace!("scheduler halted; ignoring scroll");
            return;
        }
        for (id, slot) in self.clips.iter_mut() {
            match slot.on_scroll(snapshot) {
                Ok(()) => slot.write_changed(id, sink),
                Err(TimelineError::MissingTarget(selector)) => {
                    tracing::trace!(clip = %slot.clip.id, %selector, "target not mounted");
                }
                Err(err) => {
                    tracing::warn!(clip = %slot.clip.id, "skipping clip this tick: {err}");
                }
            }
        }
    }

    /// Move time-based playback forward by `dt` seconds
    pub fn advance(&mut self, dt: f32, sink: &mut dyn PropertySink) {
        if self.halted || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        for (id, slot) in self.clips.iter_mut() {
            slot.advance(dt);
            slot.write_changed(id, sink);
        }
    }

    /// Stop for good: every member returns to `Idle` and nothing is written
    /// again
    pub fn halt(&mut self) {
        if self.halted {
            return;
        }
        self.halted = true;
        for slot in self.clips.values_mut() {
            slot.members.iter_mut().for_each(Member::halt);
        }
        tracing::debug!(clips = self.clips.len(), "scheduler halted");
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Whether any member is mid-playback
    pub fn is_animating(&self) -> bool {
        self.clips.values().any(|slot| {
            slot.members.iter().any(|m| {
                m.state().is_playing() || (slot.clip.is_scrub() && m.progress != m.target)
            })
        })
    }

    pub fn clip(&self, id: ClipId) -> Option<&TimelineClip> {
        self.clips.get(id).map(|slot| &slot.clip)
    }

    pub fn ids(&self) -> impl Iterator<Item = ClipId> + '_ {
        self.clips.keys()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Every selector a snapshot needs to cover
    pub fn selectors(&self) -> impl Iterator<Item = &str> + '_ {
        self.clips.values().flat_map(|slot| {
            std::iter::once(slot.clip.target.as_str()).chain(slot.clip.trigger_element.as_deref())
        })
    }

    /// State of the clip's first member; `Idle` until the target resolves
    pub fn play_state(&self, id: ClipId) -> Option<PlayState> {
        let slot = self.clips.get(id)?;
        Some(slot.members.first().map_or(PlayState::Idle, Member::state))
    }

    /// Applied progress of the clip's first member
    pub fn progress(&self, id: ClipId) -> Option<f32> {
        let slot = self.clips.get(id)?;
        Some(slot.members.first().map_or(0.0, |m| m.progress))
    }

    pub fn member_states(&self, id: ClipId) -> Option<Vec<MemberStatus>> {
        let slot = self.clips.get(id)?;
        Some(
            slot.members
                .iter()
                .map(|m| MemberStatus {
                    state: m.state(),
                    progress: m.progress,
                })
                .collect(),
        )
    }

    /// Every transition one member has taken, oldest first
    pub fn transitions(
        &self,
        id: ClipId,
        member: usize,
    ) -> Option<&[(PlayState, EventId, PlayState)]> {
        Some(self.clips.get(id)?.members.get(member)?.machine.history())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{ClipConfig, ToggleActions};
    use crate::keyframe::KeyframeProperties;
    use driftline_core::Rect;

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<(String, usize, Vec<(AnimatedProperty, f32)>)>,
    }

    impl PropertySink for RecordingSink {
        fn write(&mut self, target: &ClipTarget<'_>, values: &[(AnimatedProperty, f32)]) {
            self.writes
                .push((target.name.to_string(), target.member, values.to_vec()));
        }
    }

    const VIEWPORT: f32 = 1000.0;

    /// `.card` at 2000..2400; "top 80%" starts at 1200, "bottom 20%" ends at 2200
    fn layout() -> ScrollSnapshot {
        ScrollSnapshot::new(0.0, VIEWPORT)
            .with_element(".card", Rect::new(0.0, 2000.0, 300.0, 400.0))
    }

    fn group(count: usize) -> ScrollSnapshot {
        (0..count).fold(ScrollSnapshot::new(0.0, VIEWPORT), |s, i| {
            s.with_element(".item", Rect::new(i as f32 * 320.0, 2000.0, 300.0, 400.0))
        })
    }

    fn fade(config: ClipConfig) -> TimelineClip {
        config
            .keyframes(KeyframeProperties::opacity(0.0), KeyframeProperties::opacity(1.0))
            .trigger("top 80%", "bottom 20%")
            .validate()
            .unwrap()
    }

    fn run(scheduler: &mut ScrollTimelineScheduler, seconds: f32, sink: &mut dyn PropertySink) {
        let frames = (seconds * 60.0).ceil() as usize;
        for _ in 0..frames {
            scheduler.advance(1.0 / 60.0, sink);
        }
    }

    #[test]
    fn test_discrete_forward_then_reverse() {
        let mut scheduler = ScrollTimelineScheduler::new();
        let mut sink = RecordingSink::default();
        let id = scheduler.register(fade(
            ClipConfig::discrete("fade", ".card").toggle_actions(ToggleActions::PlayReverse),
        ));
        let snapshot = layout();

        scheduler.on_scroll(&snapshot, &mut sink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Idle));
        // First resolve writes the `from` values
        assert_eq!(sink.writes.len(), 1);
        assert_eq!(sink.writes[0].2, vec![(AnimatedProperty::Opacity, 0.0)]);

        scheduler.on_scroll(&snapshot.scrolled_to(1300.0), &mut sink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Entering));
        run(&mut scheduler, 0.6, &mut sink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Active));
        assert_eq!(scheduler.progress(id), Some(1.0));
        assert_eq!(sink.writes.last().unwrap().2, vec![(AnimatedProperty::Opacity, 1.0)]);

        scheduler.on_scroll(&snapshot.scrolled_to(3000.0), &mut sink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Active));

        scheduler.on_scroll(&snapshot.scrolled_to(100.0), &mut sink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Exiting));
        run(&mut scheduler, 0.6, &mut sink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Idle));
        assert_eq!(scheduler.progress(id), Some(0.0));
    }

    #[test]
    fn test_one_shot_never_reverses() {
        let mut scheduler = ScrollTimelineScheduler::new();
        let id = scheduler.register(fade(ClipConfig::discrete("once", ".card")));
        let snapshot = layout();

        scheduler.on_scroll(&snapshot.scrolled_to(1500.0), &mut NullSink);
        run(&mut scheduler, 1.0, &mut NullSink);
        scheduler.on_scroll(&snapshot.scrolled_to(0.0), &mut NullSink);
        run(&mut scheduler, 1.0, &mut NullSink);
        scheduler.on_scroll(&snapshot.scrolled_to(1500.0), &mut NullSink);

        assert_eq!(scheduler.play_state(id), Some(PlayState::Active));
        assert_eq!(scheduler.transitions(id, 0).unwrap().len(), 2);
    }

    #[test]
    fn test_jump_over_window_is_one_transition() {
        let mut scheduler = ScrollTimelineScheduler::new();
        let id = scheduler.register(fade(
            ClipConfig::discrete("jump", ".card").toggle_actions(ToggleActions::PlayReverse),
        ));
        let snapshot = layout();

        scheduler.on_scroll(&snapshot.scrolled_to(9000.0), &mut NullSink);
        assert_eq!(scheduler.transitions(id, 0).unwrap().len(), 1);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Entering));

        // Straight back above the start before playback finished
        scheduler.on_scroll(&snapshot.scrolled_to(0.0), &mut NullSink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Reversed));
        run(&mut scheduler, 0.1, &mut NullSink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Idle));
    }

    #[test]
    fn test_playback_respects_delay() {
        let mut scheduler = ScrollTimelineScheduler::new();
        let id = scheduler.register(fade(ClipConfig::discrete("late", ".card").delay(0.5)));

        scheduler.on_scroll(&layout().scrolled_to(1500.0), &mut NullSink);
        run(&mut scheduler, 0.4, &mut NullSink);
        assert_eq!(scheduler.progress(id), Some(0.0));
        run(&mut scheduler, 0.3, &mut NullSink);
        assert!(scheduler.progress(id).unwrap() > 0.0);
    }

    #[test]
    fn test_discrete_stagger_cascades() {
        let mut scheduler = ScrollTimelineScheduler::new();
        let id = scheduler.register(fade(
            ClipConfig::discrete("cards", ".item")
                .toggle_actions(ToggleActions::PlayReverse)
                .stagger(0.2)
                .duration(0.4),
        ));

        scheduler.on_scroll(&group(3).scrolled_to(1500.0), &mut NullSink);
        run(&mut scheduler, 0.3, &mut NullSink);

        let members = scheduler.member_states(id).unwrap();
        assert_eq!(members.len(), 3);
        assert!(members[0].progress > members[1].progress);
        assert!(members[1].progress > 0.0);
        assert_eq!(members[2].progress, 0.0);

        run(&mut scheduler, 1.0, &mut NullSink);
        let members = scheduler.member_states(id).unwrap();
        assert!(members.iter().all(|m| m.state == PlayState::Active));

        // Reversing runs the cascade from the last member
        scheduler.on_scroll(&group(3).scrolled_to(0.0), &mut NullSink);
        run(&mut scheduler, 0.3, &mut NullSink);
        let members = scheduler.member_states(id).unwrap();
        assert!(members[2].progress < members[1].progress);
        assert_eq!(members[0].progress, 1.0);
    }

    #[test]
    fn test_scrub_progress_bounds() {
        let mut scheduler = ScrollTimelineScheduler::new();
        let id = scheduler.register(fade(ClipConfig::scrub("scrub", ".card")));
        let snapshot = layout();

        let mut previous = 0.0;
        for offset in (0..=3400).step_by(25) {
            scheduler.on_scroll(&snapshot.scrolled_to(offset as f32), &mut NullSink);
            let progress = scheduler.progress(id).unwrap();
            assert!(progress >= previous);
            previous = progress;

            if offset <= 1200 {
                assert_eq!(progress, 0.0);
            }
            if offset >= 2200 {
                assert_eq!(progress, 1.0);
            }
        }
        assert_eq!(scheduler.play_state(id), Some(PlayState::Active));

        scheduler.on_scroll(&snapshot.scrolled_to(1700.0), &mut NullSink);
        assert_eq!(scheduler.progress(id), Some(0.5));
        scheduler.on_scroll(&snapshot.scrolled_to(0.0), &mut NullSink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Idle));
    }

    #[test]
    fn test_scrub_lag_smooths() {
        let mut scheduler = ScrollTimelineScheduler::new();
        let id = scheduler.register(fade(ClipConfig::scrub("lagged", ".card").scrub_lag(1.0)));

        scheduler.on_scroll(&layout().scrolled_to(2200.0), &mut NullSink);
        assert_eq!(scheduler.progress(id), Some(0.0));
        assert_eq!(scheduler.play_state(id), Some(PlayState::Active));

        run(&mut scheduler, 0.5, &mut NullSink);
        let halfway = scheduler.progress(id).unwrap();
        assert!(halfway > 0.3 && halfway < 0.5);

        run(&mut scheduler, 20.0, &mut NullSink);
        assert_eq!(scheduler.progress(id), Some(1.0));
    }

    #[test]
    fn test_scrub_stagger_shifts_windows() {
        let mut scheduler = ScrollTimelineScheduler::new();
        let id = scheduler.register(fade(ClipConfig::scrub("wave", ".item").stagger(0.1)));

        scheduler.on_scroll(&group(3).scrolled_to(1300.0), &mut NullSink);
        let members = scheduler.member_states(id).unwrap();
        assert_eq!(members[0].progress, 0.1);
        assert_eq!(members[1].progress, 0.0);
        assert_eq!(members[2].progress, 0.0);
    }

    #[test]
    fn test_missing_target_stays_idle() {
        let mut scheduler = ScrollTimelineScheduler::new();
        let mut sink = RecordingSink::default();
        let id = scheduler.register(fade(ClipConfig::discrete("ghost", ".nowhere")));

        scheduler.on_scroll(&layout().scrolled_to(5000.0), &mut sink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Idle));
        assert!(scheduler.member_states(id).unwrap().is_empty());
        assert!(sink.writes.is_empty());

        // Mounting later resolves the clip on the next tick
        let mounted = layout()
            .with_element(".nowhere", Rect::new(0.0, 600.0, 100.0, 100.0))
            .scrolled_to(5000.0);
        scheduler.on_scroll(&mounted, &mut sink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Entering));
    }

    #[test]
    fn test_unmounted_target_returns_to_idle() {
        let mut scheduler = ScrollTimelineScheduler::new();
        let mut sink = RecordingSink::default();
        let id = scheduler.register(fade(ClipConfig::discrete("fade", ".card")));

        scheduler.on_scroll(&layout(), &mut sink);
        scheduler.on_scroll(&layout().scrolled_to(1300.0), &mut sink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Entering));

        scheduler.on_scroll(&ScrollSnapshot::new(1300.0, VIEWPORT), &mut sink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Idle));
        assert_eq!(scheduler.progress(id), Some(0.0));
        assert!(scheduler.member_states(id).unwrap().is_empty());
        assert!(!scheduler.is_animating());

        let writes = sink.writes.len();
        run(&mut scheduler, 0.6, &mut sink);
        assert_eq!(sink.writes.len(), writes);

        // Remounting resolves fresh members from above the window
        scheduler.on_scroll(&layout().scrolled_to(1300.0), &mut sink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Entering));
        assert_eq!(scheduler.member_states(id).unwrap().len(), 1);
    }

    #[test]
    fn test_degenerate_window_is_isolated() {
        let mut scheduler = ScrollTimelineScheduler::new();
        let broken = scheduler.register(
            ClipConfig::scrub("flat", ".card")
                .trigger("top top", "top top")
                .validate()
                .unwrap(),
        );
        let healthy = scheduler.register(fade(ClipConfig::scrub("ok", ".card")));

        scheduler.on_scroll(&layout().scrolled_to(1700.0), &mut NullSink);
        assert_eq!(scheduler.play_state(broken), Some(PlayState::Idle));
        assert_eq!(scheduler.progress(healthy), Some(0.5));
    }

    #[test]
    fn test_halt_resets_and_stops() {
        let mut scheduler = ScrollTimelineScheduler::new();
        let mut sink = RecordingSink::default();
        let id = scheduler.register(fade(ClipConfig::discrete("fade", ".card")));

        scheduler.on_scroll(&layout().scrolled_to(1500.0), &mut sink);
        run(&mut scheduler, 0.2, &mut sink);
        assert_eq!(scheduler.play_state(id), Some(PlayState::Entering));

        scheduler.halt();
        let writes = sink.writes.len();
        assert_eq!(scheduler.play_state(id), Some(PlayState::Idle));

        scheduler.on_scroll(&layout().scrolled_to(0.0), &mut sink);
        run(&mut scheduler, 1.0, &mut sink);
        assert_eq!(sink.writes.len(), writes);
        assert_eq!(scheduler.progress(id), Some(0.0));
    }

    #[test]
    fn test_selectors_cover_trigger_elements() {
        let mut scheduler = ScrollTimelineScheduler::new();
        scheduler.register(fade(ClipConfig::discrete("a", ".item").trigger_element("#grid")));
        let selectors: Vec<_> = scheduler.selectors().collect();
        assert_eq!(selectors, vec![".item", "#grid"]);
    }
}
