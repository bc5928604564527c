//! Trigger lines
//!
//! A trigger line pairs a point on the trigger element with a point on the
//! viewport, written `"<element> <viewport>"`: `"top 80%"` is crossed when
//! the element's top edge reaches 80% of the viewport height. Each anchor is
//! `top`, `center`, `bottom`, a percentage, or a pixel offset (`"120px"` or a
//! bare number).

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A position along an element or the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// Fraction of the height, measured from the top
    Fraction(f32),
    /// Pixels from the top
    Pixels(f32),
}

impl Anchor {
    pub const TOP: Anchor = Anchor::Fraction(0.0);
    pub const CENTER: Anchor = Anchor::Fraction(0.5);
    pub const BOTTOM: Anchor = Anchor::Fraction(1.0);

    /// Offset from the top of something `height` tall
    pub fn resolve(&self, height: f32) -> f32 {
        match self {
            Anchor::Fraction(f) => height * f,
            Anchor::Pixels(px) => *px,
        }
    }
}

impl FromStr for Anchor {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let anchor = match s {
            "top" => Anchor::TOP,
            "center" => Anchor::CENTER,
            "bottom" => Anchor::BOTTOM,
            _ => {
                let (number, percent) = match s.strip_suffix('%') {
                    Some(n) => (n, true),
                    None => (s.strip_suffix("px").unwrap_or(s), false),
                };
                let value: f32 = number.parse().map_err(|_| "unrecognised anchor")?;
                if !value.is_finite() {
                    return Err("anchor must be finite");
                }
                if percent {
                    Anchor::Fraction(value / 100.0)
                } else {
                    Anchor::Pixels(value)
                }
            }
        };
        Ok(anchor)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Anchor::TOP {
            f.write_str("top")
        } else if *self == Anchor::CENTER {
            f.write_str("center")
        } else if *self == Anchor::BOTTOM {
            f.write_str("bottom")
        } else {
            match self {
                Anchor::Fraction(v) => write!(f, "{}%", v * 100.0),
                Anchor::Pixels(px) => write!(f, "{px}px"),
            }
        }
    }
}

/// The point where an element anchor meets a viewport anchor
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TriggerLine {
    pub element: Anchor,
    pub viewport: Anchor,
}

impl TriggerLine {
    /// Default start: element top meets viewport bottom
    pub const START: TriggerLine = TriggerLine::new(Anchor::TOP, Anchor::BOTTOM);
    /// Default end: element bottom meets viewport top
    pub const END: TriggerLine = TriggerLine::new(Anchor::BOTTOM, Anchor::TOP);

    pub const fn new(element: Anchor, viewport: Anchor) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which this line is crossed
    ///
    /// `element_top` is the element's top edge in document coordinates.
    pub fn scroll_offset(
        &self,
        element_top: f32,
        element_height: f32,
        viewport_height: f32,
    ) -> f32 {
        element_top + self.element.resolve(element_height) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for TriggerLine {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ConfigurationError::InvalidTrigger {
            line: s.to_string(),
            reason,
        };

        let mut parts = s.split_whitespace();
        let (Some(element), Some(viewport), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected `<element-anchor> <viewport-anchor>`"));
        };

        Ok(TriggerLine {
            element: element.parse().map_err(invalid)?,
            viewport: viewport.parse().map_err(invalid)?,
        })
    }
}

impl TryFrom<String> for TriggerLine {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TriggerLine> for String {
    fn from(line: TriggerLine) -> Self {
        line.to_string()
    }
}

impl fmt::Display for TriggerLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}
