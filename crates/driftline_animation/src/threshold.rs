//! Edge-triggered scroll threshold
//!
//! Tracks whether the page has scrolled past a fixed offset, reporting only
//! the moments that flips. A sticky navigation bar switching to its compact
//! style is the typical consumer.

/// Watches `offset > threshold`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollThreshold {
    threshold: f32,
    past: bool,
}

impl ScrollThreshold {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            past: false,
        }
    }

    /// Feed a new scroll offset. Returns the new flag when it changed.
    pub fn update(&mut self, offset: f32) -> Option<bool> {
        if !offset.is_finite() {
            return None;
        }
        let past = offset > self.threshold;
        if past == self.past {
            return None;
        }
        self.past = past;
        Some(past)
    }

    pub fn is_past(&self) -> bool {
        self.past
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_edges_only() {
        let mut watch = ScrollThreshold::new(100.0);
        assert_eq!(watch.update(50.0), None);
        assert_eq!(watch.update(100.0), None);
        assert_eq!(watch.update(100.5), Some(true));
        assert_eq!(watch.update(400.0), None);
        assert_eq!(watch.update(20.0), Some(false));
        assert!(!watch.is_past());
    }

    #[test]
    fn test_ignores_non_finite() {
        let mut watch = ScrollThreshold::new(100.0);
        watch.update(200.0);
        assert_eq!(watch.update(f32::NAN), None);
        assert!(watch.is_past());
    }
}
