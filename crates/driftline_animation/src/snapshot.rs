//! Scroll snapshots
//!
//! A snapshot is everything the scheduler needs from the layout host for one
//! tick, captured in one go. Bounds are stored in document coordinates so
//! trigger offsets do not move as the page scrolls.

use driftline_core::{LayoutHost, Rect};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Bounds of every element matching one selector
pub type ElementBounds = SmallVec<[Rect; 4]>;

/// Layout state at one instant
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrollSnapshot {
    pub scroll_offset: f32,
    pub viewport_height: f32,
    element_bounds: FxHashMap<String, ElementBounds>,
}

impl ScrollSnapshot {
    pub fn new(scroll_offset: f32, viewport_height: f32) -> Self {
        Self {
            scroll_offset,
            viewport_height,
            element_bounds: FxHashMap::default(),
        }
    }

    /// Query `host` for each selector
    ///
    /// Selectors that match nothing are simply absent from the snapshot.
    pub fn capture<'a>(
        host: &dyn LayoutHost,
        selectors: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let scroll_offset = host.scroll_offset();
        let mut snapshot = Self::new(scroll_offset, host.viewport_size().height);

        for selector in selectors {
            if snapshot.element_bounds.contains_key(selector) {
                continue;
            }
            let bounds: ElementBounds = host
                .query(selector)
                .into_iter()
                .map(|rect| rect.offset(0.0, scroll_offset))
                .collect();
            if !bounds.is_empty() {
                snapshot.element_bounds.insert(selector.to_string(), bounds);
            }
        }

        snapshot
    }

    /// Builder: add an element box in document coordinates
    pub fn with_element(mut self, selector: impl Into<String>, rect: Rect) -> Self {
        self.element_bounds
            .entry(selector.into())
            .or_default()
            .push(rect);
        self
    }

    /// Document-space bounds of `selector`, empty when not mounted
    pub fn bounds(&self, selector: &str) -> &[Rect] {
        self.element_bounds
            .get(selector)
            .map(|b| b.as_slice())
            .unwrap_or(&[])
    }

    /// Same layout at another scroll offset
    pub fn scrolled_to(&self, scroll_offset: f32) -> Self {
        Self {
            scroll_offset,
            ..self.clone()
        }
    }
}
