//! Headless scene simulation
//!
//! Drives a scene the way a browser would: the page scrolls linearly from the
//! top to a target offset while the frame clock ticks at the reference rate.
//! Every scroll and frame goes through the host event bus.

use crate::config::DriftlineConfig;
use anyhow::{Context, Result};
use driftline_animation::{
    AnimatedProperty, AnimationContext, ClipTarget, MemberStatus, NullSink, PlayState,
    PropertySink, ScrollThreshold,
};
use driftline_core::{HostEvent, HostEventBus, LayoutHost};
use driftline_field::{FieldFrame, FrameLoop, FrameSink, REFERENCE_FPS};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, trace};

/// Upper bound on extra frames spent waiting for playback to finish
const MAX_SETTLE_FRAMES: u32 = 600;

/// Property sink that logs every write
struct LoggingSink {
    writes: Rc<Cell<usize>>,
}

impl PropertySink for LoggingSink {
    fn write(&mut self, target: &ClipTarget<'_>, values: &[(AnimatedProperty, f32)]) {
        self.writes.set(self.writes.get() + 1);
        trace!(
            clip = target.name,
            selector = target.selector,
            member = target.member,
            ?values,
            "write"
        );
    }
}

#[derive(Debug, Default)]
struct EdgeStats {
    min: Option<usize>,
    max: usize,
    last: usize,
}

/// Frame sink that records edge counts instead of drawing
struct StatsSink {
    stats: Rc<RefCell<EdgeStats>>,
}

impl FrameSink for StatsSink {
    fn present(&mut self, frame: &FieldFrame<'_>) {
        let edges = frame.edges.len();
        let mut stats = self.stats.borrow_mut();
        stats.min = Some(stats.min.map_or(edges, |min| min.min(edges)));
        stats.max = stats.max.max(edges);
        stats.last = edges;
        trace!(frame = frame.frame, edges, "present");
    }
}

#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub particles: usize,
    pub frames: u64,
    pub min_edges: usize,
    pub max_edges: usize,
    pub last_edges: usize,
}

#[derive(Debug, Serialize)]
pub struct ClipReport {
    pub id: String,
    pub state: PlayState,
    pub progress: f32,
    pub members: Vec<MemberStatus>,
}

/// Outcome of one simulated run
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub scene: String,
    pub scroll_frames: u32,
    /// Frames run after scrolling stopped, until playback settled
    pub settle_frames: u32,
    pub final_offset: f32,
    pub property_writes: usize,
    pub nav_compact: bool,
    pub field: Option<FieldReport>,
    pub clips: Vec<ClipReport>,
}

impl SimulationReport {
    pub fn print_text(&self) {
        println!("Scene: {}", self.scene);
        println!(
            "Scrolled to {} over {} frames (+{} to settle)",
            self.final_offset, self.scroll_frames, self.settle_frames
        );
        println!("Property writes: {}", self.property_writes);
        println!(
            "Navigation: {}",
            if self.nav_compact { "compact" } else { "full" }
        );

        if let Some(field) = &self.field {
            println!();
            println!(
                "Field: {} particles, {} frames, edges {}..{} (last {})",
                field.particles, field.frames, field.min_edges, field.max_edges, field.last_edges
            );
        }

        if !self.clips.is_empty() {
            println!();
            println!("Clips:");
            for clip in &self.clips {
                println!(
                    "  {:<24} {:<10} {:>5.1}%  ({} members)",
                    clip.id,
                    format!("{:?}", clip.state),
                    clip.progress * 100.0,
                    clip.members.len()
                );
            }
        }
    }
}

/// Run `config` headlessly, scrolling to `scroll_to` over `frames` frames
pub fn run(config: &DriftlineConfig, frames: u32, scroll_to: f32) -> Result<SimulationReport> {
    if !scroll_to.is_finite() {
        anyhow::bail!("Scroll target must be finite, got {}", scroll_to);
    }

    let bus = HostEventBus::new();
    let host = Rc::new(config.build_layout());
    let writes = Rc::new(Cell::new(0));
    let mut context = AnimationContext::mount(
        &bus,
        host.clone(),
        LoggingSink {
            writes: writes.clone(),
        },
    );

    for clip in &config.clips {
        context
            .register(clip)
            .with_context(|| format!("Invalid clip '{}'", clip.id))?;
    }

    let stats = Rc::new(RefCell::new(EdgeStats::default()));
    let field = match &config.field {
        Some(field_config) => {
            let frame_loop = FrameLoop::from_config(field_config).context("Invalid field")?;
            let id = context.attach_field(
                frame_loop,
                StatsSink {
                    stats: stats.clone(),
                },
            )?;
            Some((id, field_config.particle_count))
        }
        None => None,
    };

    context.refresh()?;
    info!(
        "Simulating {} ({} clips, {} frames)",
        config.scene.name,
        config.clips.len(),
        frames
    );

    let mut nav = ScrollThreshold::new(config.scene.nav_threshold);
    let dt = 1.0 / REFERENCE_FPS;
    let mut elapsed = 0.0;

    for frame in 0..frames {
        let offset = scroll_to * (frame + 1) as f32 / frames as f32;
        host.set_scroll_offset(offset);
        bus.post(HostEvent::Scroll { offset });
        bus.post(HostEvent::Frame { dt, elapsed });
        bus.flush();
        elapsed += dt;

        if let Some(compact) = nav.update(host.scroll_offset()) {
            debug!(offset, compact, "navigation style changed");
        }
    }

    let mut settle_frames = 0;
    while context.is_animating() && settle_frames < MAX_SETTLE_FRAMES {
        bus.emit(HostEvent::Frame { dt, elapsed });
        elapsed += dt;
        settle_frames += 1;
    }
    if context.is_animating() {
        tracing::warn!("Playback still running after {} frames", MAX_SETTLE_FRAMES);
    }

    let clips = context
        .clips()
        .into_iter()
        .map(|(id, clip)| ClipReport {
            id,
            state: context.play_state(clip).unwrap_or_default(),
            progress: context.progress(clip).unwrap_or_default(),
            members: context.member_states(clip).unwrap_or_default(),
        })
        .collect();

    let field = field.map(|(id, particles)| {
        let stats = stats.borrow();
        FieldReport {
            particles,
            frames: context.field_frames(id).unwrap_or_default(),
            min_edges: stats.min.unwrap_or_default(),
            max_edges: stats.max,
            last_edges: stats.last,
        }
    });

    let report = SimulationReport {
        scene: config.scene.name.clone(),
        scroll_frames: frames,
        settle_frames,
        final_offset: host.scroll_offset(),
        property_writes: writes.get(),
        nav_compact: nav.is_past(),
        field,
        clips,
    };

    context.dispose();
    Ok(report)
}

/// Register every clip in a throwaway context and collect the failures
pub fn check(config: &DriftlineConfig) -> Vec<String> {
    let mut problems = Vec::new();

    if let Some(field) = &config.field {
        if let Err(err) = field.validate() {
            problems.push(format!("field: {err}"));
        }
    }

    let bus = HostEventBus::new();
    let mut context = AnimationContext::mount(&bus, Rc::new(config.build_layout()), NullSink);
    for clip in &config.clips {
        if let Err(err) = context.register(clip) {
            problems.push(format!("clip '{}': {err}", clip.id));
        }
    }

    for entry in &config.layout {
        if !(entry.width >= 0.0 && entry.height >= 0.0) {
            problems.push(format!("layout '{}': negative size", entry.selector));
        }
    }

    problems
}
