//! Clip configuration and validation
//!
//! [`ClipConfig`] is the declarative form, as written in config files or
//! built in code. Registration turns it into an immutable [`TimelineClip`];
//! every invalid or conflicting combination is rejected at that point so the
//! scheduler never sees one.

use crate::easing::Easing;
use crate::error::ConfigurationError;
use crate::keyframe::KeyframeProperties;
use crate::trigger::TriggerLine;
use serde::{Deserialize, Serialize};

/// Playback length used when a discrete clip gives none (seconds)
pub const DEFAULT_DURATION: f32 = 0.5;

/// Easing used when a clip gives none
pub const DEFAULT_EASING: Easing = Easing::EaseOutQuad;

/// How scroll drives a clip
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipMode {
    /// Plays forward or backward in time once a trigger line is crossed
    #[default]
    Discrete,
    /// Progress follows the scroll position between the trigger lines
    Scrub,
}

/// What a discrete clip does when its trigger lines are crossed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleActions {
    /// Play forward on enter and nothing else unless the clip is reversible
    PlayOnce,
    /// Play forward on enter, reverse when scrolling back above the start
    PlayReverse,
    /// No time-based playback (scrub clips)
    None,
}

/// Whether a discrete clip plays backwards on leaving upward
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Reversible,
    OneShot,
}

/// Trigger lines and the element they are measured against
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriggerConfig {
    /// Start line, `"top bottom"` when absent
    pub start: Option<String>,
    /// End line, `"bottom top"` when absent
    pub end: Option<String>,
    /// Trigger element selector; the first target member when absent
    pub element: Option<String>,
}

/// Declarative description of a scroll-linked clip
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClipConfig {
    /// Stable identifier, unique within a context
    pub id: String,
    /// Selector of the element(s) to animate. Every match is a group member.
    pub target: String,
    pub from: KeyframeProperties,
    pub to: KeyframeProperties,
    pub trigger: TriggerConfig,
    pub mode: ClipMode,
    pub toggle_actions: Option<ToggleActions>,
    pub direction: Option<Direction>,
    /// Per-member offset: seconds in discrete mode, viewport heights in scrub
    pub stagger_delta: f32,
    /// Playback length in seconds (discrete)
    pub duration: Option<f32>,
    /// Wait before playback starts, in seconds (discrete)
    pub delay: Option<f32>,
    /// Seconds the applied progress lags behind the scroll (scrub)
    pub scrub_lag: Option<f32>,
    pub easing: Option<String>,
}

impl ClipConfig {
    /// Discrete clip for `target`
    pub fn discrete(id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
            ..Default::default()
        }
    }

    /// Scrub clip for `target`
    pub fn scrub(id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            mode: ClipMode::Scrub,
            ..Self::discrete(id, target)
        }
    }

    /// Builder: set both keyframes
    pub fn keyframes(mut self, from: KeyframeProperties, to: KeyframeProperties) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Builder: set the start and end lines
    pub fn trigger(mut self, start: &str, end: &str) -> Self {
        self.trigger.start = Some(start.to_string());
        self.trigger.end = Some(end.to_string());
        self
    }

    /// Builder: measure trigger lines against another element
    pub fn trigger_element(mut self, selector: impl Into<String>) -> Self {
        self.trigger.element = Some(selector.into());
        self
    }

    pub fn toggle_actions(mut self, actions: ToggleActions) -> Self {
        self.toggle_actions = Some(actions);
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn stagger(mut self, delta: f32) -> Self {
        self.stagger_delta = delta;
        self
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = Some(seconds);
        self
    }

    pub fn scrub_lag(mut self, seconds: f32) -> Self {
        self.scrub_lag = Some(seconds);
        self
    }

    pub fn easing(mut self, name: &str) -> Self {
        self.easing = Some(name.to_string());
        self
    }

    /// Check the configuration and build the clip it describes
    pub fn validate(&self) -> Result<TimelineClip, ConfigurationError> {
        if self.id.trim().is_empty() {
            return Err(ConfigurationError::EmptyId);
        }
        if self.target.trim().is_empty() {
            return Err(ConfigurationError::EmptyTarget(self.id.clone()));
        }
        if matches!(&self.trigger.element, Some(e) if e.trim().is_empty()) {
            return Err(ConfigurationError::EmptyTarget(self.id.clone()));
        }

        let start = parse_line(self.trigger.start.as_deref(), TriggerLine::START)?;
        let end = parse_line(self.trigger.end.as_deref(), TriggerLine::END)?;
        let easing = match &self.easing {
            Some(name) => name.parse()?,
            None => DEFAULT_EASING,
        };

        let duration = self.duration.unwrap_or(DEFAULT_DURATION);
        self.check_seconds("duration", duration)?;
        self.check_seconds("stagger_delta", self.stagger_delta)?;
        if let Some(delay) = self.delay {
            self.check_seconds("delay", delay)?;
        }
        if let Some(lag) = self.scrub_lag {
            self.check_seconds("scrub_lag", lag)?;
        }

        if let Some(property) = self.from.first_missing_from(&self.to) {
            return Err(self.mismatch(property.name(), "from", "to"));
        }
        if let Some(property) = self.to.first_missing_from(&self.from) {
            return Err(self.mismatch(property.name(), "to", "from"));
        }

        let mode = match self.mode {
            ClipMode::Scrub => {
                if !matches!(self.toggle_actions, None | Some(ToggleActions::None)) {
                    return Err(self.conflict("toggle_actions", "scrub"));
                }
                if self.direction.is_some() {
                    return Err(self.conflict("direction", "scrub"));
                }
                if self.delay.is_some() {
                    return Err(self.conflict("delay", "scrub"));
                }
                TriggerMode::Scrub {
                    lag: self.scrub_lag.unwrap_or(0.0),
                }
            }
            ClipMode::Discrete => {
                if self.scrub_lag.is_some() {
                    return Err(self.conflict("scrub_lag", "discrete"));
                }
                let actions = self.toggle_actions.unwrap_or(ToggleActions::PlayOnce);
                let direction = match (actions, self.direction) {
                    (ToggleActions::None, _) => {
                        return Err(self.conflict("toggle_actions `none`", "discrete"))
                    }
                    (ToggleActions::PlayReverse, Some(Direction::OneShot)) => {
                        return Err(self.conflict(
                            "direction `oneShot` with `playReverse`",
                            "discrete",
                        ))
                    }
                    (_, Some(direction)) => direction,
                    (ToggleActions::PlayReverse, None) => Direction::Reversible,
                    (ToggleActions::PlayOnce, None) => Direction::OneShot,
                };
                TriggerMode::Discrete {
                    direction,
                    delay: self.delay.unwrap_or(0.0),
                }
            }
        };

        Ok(TimelineClip {
            id: self.id.clone(),
            target: self.target.clone(),
            trigger_element: self.trigger.element.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            start,
            end,
            mode,
            stagger_delta: self.stagger_delta,
            duration,
            easing,
        })
    }

    fn check_seconds(&self, name: &'static str, value: f32) -> Result<(), ConfigurationError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidDuration {
                clip: self.id.clone(),
                name,
                value,
            })
        }
    }

    fn mismatch(
        &self,
        property: &str,
        present: &'static str,
        missing: &'static str,
    ) -> ConfigurationError {
        ConfigurationError::KeyframeMismatch {
            clip: self.id.clone(),
            property: property.to_string(),
            present,
            missing,
        }
    }

    fn conflict(&self, option: &'static str, mode: &'static str) -> ConfigurationError {
        ConfigurationError::ConflictingOption {
            clip: self.id.clone(),
            option,
            mode,
        }
    }
}

fn parse_line(line: Option<&str>, default: TriggerLine) -> Result<TriggerLine, ConfigurationError> {
    line.map_or(Ok(default), str::parse)
}

/// Validated trigger behaviour
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerMode {
    Discrete { direction: Direction, delay: f32 },
    Scrub { lag: f32 },
}

/// An immutable, validated clip
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineClip {
    pub id: String,
    pub target: String,
    pub trigger_element: Option<String>,
    pub from: KeyframeProperties,
    pub to: KeyframeProperties,
    pub start: TriggerLine,
    pub end: TriggerLine,
    pub mode: TriggerMode,
    pub stagger_delta: f32,
    pub duration: f32,
    pub easing: Easing,
}

impl TimelineClip {
    /// Selector the trigger lines are measured against
    pub fn trigger_selector(&self) -> &str {
        self.trigger_element.as_deref().unwrap_or(&self.target)
    }

    pub fn is_scrub(&self) -> bool {
        matches!(self.mode, TriggerMode::Scrub { .. })
    }

    /// Direction of a discrete clip, `None` for scrub clips
    pub fn direction(&self) -> Option<Direction> {
        match self.mode {
            TriggerMode::Discrete { direction, .. } => Some(direction),
            TriggerMode::Scrub { .. } => None,
        }
    }
}

impl TryFrom<&ClipConfig> for TimelineClip {
    type Error = ConfigurationError;

    fn try_from(config: &ClipConfig) -> Result<Self, Self::Error> {
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::AnimatedProperty;

    fn fade() -> ClipConfig {
        ClipConfig::discrete("fade", ".card").keyframes(
            KeyframeProperties::opacity(0.0),
            KeyframeProperties::opacity(1.0),
        )
    }

    #[test]
    fn test_defaults() {
        let clip = fade().validate().unwrap();
        assert_eq!(clip.start, TriggerLine::START);
        assert_eq!(clip.end, TriggerLine::END);
        assert_eq!(clip.duration, DEFAULT_DURATION);
        assert_eq!(clip.easing, DEFAULT_EASING);
        assert_eq!(
            clip.mode,
            TriggerMode::Discrete {
                direction: Direction::OneShot,
                delay: 0.0
            }
        );
        assert_eq!(clip.trigger_selector(), ".card");
    }

    #[test]
    fn test_direction_follows_toggle_actions() {
        let clip = fade()
            .toggle_actions(ToggleActions::PlayReverse)
            .validate()
            .unwrap();
        assert_eq!(clip.direction(), Some(Direction::Reversible));

        let clip = fade()
            .toggle_actions(ToggleActions::PlayOnce)
            .direction(Direction::Reversible)
            .validate()
            .unwrap();
        assert_eq!(clip.direction(), Some(Direction::Reversible));
    }

    #[test]
    fn test_rejects_conflicting_options() {
        let cases = [
            ClipConfig::scrub("a", ".x").toggle_actions(ToggleActions::PlayReverse),
            ClipConfig::scrub("b", ".x").direction(Direction::Reversible),
            ClipConfig::scrub("c", ".x").delay(0.2),
            ClipConfig::discrete("d", ".x").scrub_lag(1.0),
            ClipConfig::discrete("e", ".x").toggle_actions(ToggleActions::None),
            ClipConfig::discrete("f", ".x")
                .toggle_actions(ToggleActions::PlayReverse)
                .direction(Direction::OneShot),
        ];
        for config in cases {
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigurationError::ConflictingOption { .. })
                ),
                "{} should be rejected",
                config.id
            );
        }

        // `none` is the only toggle setting a scrub clip accepts
        assert!(ClipConfig::scrub("g", ".x")
            .toggle_actions(ToggleActions::None)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            ClipConfig::discrete("", ".x").validate(),
            Err(ConfigurationError::EmptyId)
        );
        assert_eq!(
            ClipConfig::discrete("a", " ").validate(),
            Err(ConfigurationError::EmptyTarget("a".into()))
        );
        assert!(matches!(
            fade().duration(-1.0).validate(),
            Err(ConfigurationError::InvalidDuration {
                name: "duration",
                ..
            })
        ));
        assert!(matches!(
            fade().stagger(f32::INFINITY).validate(),
            Err(ConfigurationError::InvalidDuration { .. })
        ));
        assert!(matches!(
            fade().trigger("top", "bottom top").validate(),
            Err(ConfigurationError::InvalidTrigger { .. })
        ));
        assert_eq!(
            fade().easing("elastic.out").validate(),
            Err(ConfigurationError::UnknownEasing("elastic.out".into()))
        );
    }

    #[test]
    fn test_rejects_keyframe_mismatch() {
        let config = ClipConfig::discrete("rise", ".x").keyframes(
            KeyframeProperties::opacity(0.0).with(AnimatedProperty::Y, 50.0),
            KeyframeProperties::opacity(1.0),
        );
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::KeyframeMismatch {
                clip: "rise".into(),
                property: "y".into(),
                present: "from",
                missing: "to",
            })
        );
    }

    #[test]
    fn test_deserialize_toml() {
        let config: ClipConfig = toml::from_str(
            r##"
            id = "services"
            target = ".service-card"
            mode = "discrete"
            toggle_actions = "playReverse"
            stagger_delta = 0.1
            duration = 0.8
            easing = "back.out(1.2)"
            from = { opacity = 0.0, y = 50.0 }
            to = { opacity = 1.0, y = 0.0 }

            [trigger]
            start = "top 80%"
            element = "#services"
            "##,
        )
        .unwrap();

        let clip = config.validate().unwrap();
        assert_eq!(clip.trigger_selector(), "#services");
        assert_eq!(clip.easing, Easing::EaseOutBack(1.2));
        assert_eq!(clip.direction(), Some(Direction::Reversible));
        assert_eq!(clip.from.get(AnimatedProperty::Y), Some(50.0));

        assert!(toml::from_str::<ClipConfig>("id = \"x\"\nscrub = 1").is_err());
    }
}
