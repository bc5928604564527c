//! Layout host contract
//!
//! The layout host owns the document: it knows the scroll offset, the
//! viewport size and where every element sits. Animation code only reads
//! from it.

use crate::geometry::{Rect, Size};
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};

/// Read-only view of document geometry
pub trait LayoutHost {
    /// Current vertical scroll offset in document pixels
    fn scroll_offset(&self) -> f32;

    /// Current viewport size
    fn viewport_size(&self) -> Size;

    /// Bounding boxes of all elements matching `selector`, in document order
    ///
    /// Boxes are viewport-relative (bounding-client-rect semantics). An empty
    /// result means nothing matching is mounted yet.
    fn query(&self, selector: &str) -> Vec<Rect>;
}

/// In-memory layout host with fixed element positions
///
/// Elements are stored in document coordinates; `query` converts them to
/// viewport-relative boxes using the current scroll offset. Used for headless
/// runs and tests.
#[derive(Debug, Default)]
pub struct StaticLayout {
    scroll_offset: Cell<f32>,
    viewport: Cell<Size>,
    elements: RefCell<FxHashMap<String, Vec<Rect>>>,
}

impl StaticLayout {
    pub fn new(viewport: Size) -> Self {
        Self {
            scroll_offset: Cell::new(0.0),
            viewport: Cell::new(viewport),
            elements: RefCell::new(FxHashMap::default()),
        }
    }

    /// Builder: add an element box (document coordinates)
    pub fn with_element(self, selector: impl Into<String>, rect: Rect) -> Self {
        self.insert(selector, rect);
        self
    }

    /// Append an element box under `selector` (document coordinates)
    pub fn insert(&self, selector: impl Into<String>, rect: Rect) {
        self.elements
            .borrow_mut()
            .entry(selector.into())
            .or_default()
            .push(rect);
    }

    /// Unmount every element under `selector`
    pub fn remove(&self, selector: &str) {
        self.elements.borrow_mut().remove(selector);
    }

    pub fn set_scroll_offset(&self, offset: f32) {
        self.scroll_offset.set(offset);
    }

    pub fn set_viewport(&self, viewport: Size) {
        self.viewport.set(viewport);
    }
}

impl LayoutHost for StaticLayout {
    fn scroll_offset(&self) -> f32 {
        self.scroll_offset.get()
    }

    fn viewport_size(&self) -> Size {
        self.viewport.get()
    }

    fn query(&self, selector: &str) -> Vec<Rect> {
        let scroll = self.scroll_offset.get();
        self.elements
            .borrow()
            .get(selector)
            .map(|rects| rects.iter().map(|r| r.offset(0.0, -scroll)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_viewport_relative() {
        let layout = StaticLayout::new(Size::new(1280.0, 800.0))
            .with_element("#about", Rect::new(0.0, 1000.0, 1280.0, 600.0));

        assert_eq!(layout.query("#about")[0].top(), 1000.0);

        layout.set_scroll_offset(250.0);
        assert_eq!(layout.query("#about")[0].top(), 750.0);
    }

    #[test]
    fn test_missing_selector_is_empty() {
        let layout = StaticLayout::new(Size::new(100.0, 100.0));
        assert!(layout.query(".nope").is_empty());
    }

    #[test]
    fn test_group_keeps_document_order() {
        let layout = StaticLayout::new(Size::new(100.0, 100.0));
        layout.insert(".card", Rect::new(0.0, 10.0, 10.0, 10.0));
        layout.insert(".card", Rect::new(0.0, 30.0, 10.0, 10.0));

        let cards = layout.query(".card");
        assert_eq!(cards.len(), 2);
        assert!(cards[0].top() < cards[1].top());

        layout.remove(".card");
        assert!(layout.query(".card").is_empty());
    }
}
