//! Easing functions for animations
//!
//! Easings can be written by name in clip configuration. Both the CSS names
//! (`ease-in-out`, `cubic-bezier(..)`) and the `family.variant` names
//! (`power3.out`, `back.out(1.2)`, `expo.inOut`) are understood; a bare
//! family name means its `out` variant.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Overshoot used by `back` easings when none is given
pub const DEFAULT_OVERSHOOT: f32 = 1.70158;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
    /// Pulls back before moving; the value is the overshoot
    EaseInBack(f32),
    /// Overshoots the end before settling
    EaseOutBack(f32),
    EaseInOutBack(f32),
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::EaseInQuint => t.powi(5),
            Easing::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
            Easing::EaseInOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
            Easing::EaseInSine => 1.0 - (t * std::f32::consts::FRAC_PI_2).cos(),
            Easing::EaseOutSine => (t * std::f32::consts::FRAC_PI_2).sin(),
            Easing::EaseInOutSine => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
            Easing::EaseInExpo => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * t - 10.0)
                }
            }
            Easing::EaseOutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Easing::EaseInOutExpo => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    2f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Easing::EaseInBack(s) => (s + 1.0) * t * t * t - s * t * t,
            Easing::EaseOutBack(s) => {
                let u = t - 1.0;
                1.0 + (s + 1.0) * u * u * u + s * u * u
            }
            Easing::EaseInOutBack(s) => {
                let c = s * 1.525;
                if t < 0.5 {
                    (2.0 * t).powi(2) * ((c + 1.0) * 2.0 * t - c) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((c + 1.0) * (2.0 * t - 2.0) + c) + 2.0) / 2.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
        }
    }
}

impl FromStr for Easing {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ConfigurationError::UnknownEasing(s.to_string());
        let name = s.trim();

        // Optional argument list: `back.out(1.2)`, `cubic-bezier(a, b, c, d)`
        let (head, args) = match name.split_once('(') {
            Some((head, rest)) => {
                let inner = rest.strip_suffix(')').ok_or_else(unknown)?;
                let args = inner
                    .split(',')
                    .map(|a| a.trim().parse::<f32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| unknown())?;
                if args.iter().any(|a| !a.is_finite()) {
                    return Err(unknown());
                }
                (head.trim(), args)
            }
            None => (name, Vec::new()),
        };

        if head == "cubic-bezier" {
            return match args.as_slice() {
                [x1, y1, x2, y2] => Ok(Easing::CubicBezier(*x1, *y1, *x2, *y2)),
                _ => Err(unknown()),
            };
        }

        let (family, variant) = head.split_once('.').unwrap_or((head, "out"));

        if family == "back" {
            let overshoot = match args.as_slice() {
                [] => DEFAULT_OVERSHOOT,
                [s] => *s,
                _ => return Err(unknown()),
            };
            return match variant {
                "in" => Ok(Easing::EaseInBack(overshoot)),
                "out" => Ok(Easing::EaseOutBack(overshoot)),
                "inOut" => Ok(Easing::EaseInOutBack(overshoot)),
                _ => Err(unknown()),
            };
        }

        if !args.is_empty() {
            return Err(unknown());
        }

        let easing = match (family, variant) {
            ("linear" | "none" | "power0", _) => Easing::Linear,
            ("ease", "out") if !head.contains('.') => Easing::CubicBezier(0.25, 0.1, 0.25, 1.0),
            ("ease-in", "out") => Easing::EaseIn,
            ("ease-out", "out") => Easing::EaseOut,
            ("ease-in-out", "out") => Easing::EaseInOut,
            ("power1" | "quad", "in") => Easing::EaseInQuad,
            ("power1" | "quad", "out") => Easing::EaseOutQuad,
            ("power1" | "quad", "inOut") => Easing::EaseInOutQuad,
            ("power2" | "cubic", "in") => Easing::EaseInCubic,
            ("power2" | "cubic", "out") => Easing::EaseOutCubic,
            ("power2" | "cubic", "inOut") => Easing::EaseInOutCubic,
            ("power3" | "quart", "in") => Easing::EaseInQuart,
            ("power3" | "quart", "out") => Easing::EaseOutQuart,
            ("power3" | "quart", "inOut") => Easing::EaseInOutQuart,
            ("power4" | "quint", "in") => Easing::EaseInQuint,
            ("power4" | "quint", "out") => Easing::EaseOutQuint,
            ("power4" | "quint", "inOut") => Easing::EaseInOutQuint,
            ("sine", "in") => Easing::EaseInSine,
            ("sine", "out") => Easing::EaseOutSine,
            ("sine", "inOut") => Easing::EaseInOutSine,
            ("expo", "in") => Easing::EaseInExpo,
            ("expo", "out") => Easing::EaseOutExpo,
            ("expo", "inOut") => Easing::EaseInOutExpo,
            _ => return Err(unknown()),
        };
        Ok(easing)
    }
}

impl TryFrom<String> for Easing {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
            Easing::EaseInQuad => "quad.in",
            Easing::EaseOutQuad => "quad.out",
            Easing::EaseInOutQuad => "quad.inOut",
            Easing::EaseInCubic => "cubic.in",
            Easing::EaseOutCubic => "cubic.out",
            Easing::EaseInOutCubic => "cubic.inOut",
            Easing::EaseInQuart => "quart.in",
            Easing::EaseOutQuart => "quart.out",
            Easing::EaseInOutQuart => "quart.inOut",
            Easing::EaseInQuint => "quint.in",
            Easing::EaseOutQuint => "quint.out",
            Easing::EaseInOutQuint => "quint.inOut",
            Easing::EaseInSine => "sine.in",
            Easing::EaseOutSine => "sine.out",
            Easing::EaseInOutSine => "sine.inOut",
            Easing::EaseInExpo => "expo.in",
            Easing::EaseOutExpo => "expo.out",
            Easing::EaseInOutExpo => "expo.inOut",
            Easing::EaseInBack(s) => return write!(f, "back.in({s})"),
            Easing::EaseOutBack(s) => return write!(f, "back.out({s})"),
            Easing::EaseInOutBack(s) => return write!(f, "back.inOut({s})"),
            Easing::CubicBezier(x1, y1, x2, y2) => {
                return write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        };
        f.write_str(name)
    }
}

/// Cubic bezier easing calculation (matches CSS `cubic-bezier()` in browsers).
///
/// Uses Newton-Raphson with binary-search fallback for robustness.
/// Computes in f64 internally to avoid f32 precision jitter.
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    // Endpoints are always exact
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let x = t as f64;
    let x1 = x1 as f64;
    let y1 = y1 as f64;
    let x2 = x2 as f64;
    let y2 = y2 as f64;

    let mut p = x;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2) as f32;
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    // Binary search fallback (always converges)
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = x;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - x).abs() < 1e-7 {
            break;
        }
        if val < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2) as f32
}

/// B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
