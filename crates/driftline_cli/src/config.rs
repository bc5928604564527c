//! Scene configuration file handling

use anyhow::{Context, Result};
use driftline_animation::ClipConfig;
use driftline_core::{Rect, Size, StaticLayout};
use driftline_field::FieldConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level scene configuration (driftline.toml)
#[derive(Debug, Deserialize, Serialize)]
pub struct DriftlineConfig {
    #[serde(default)]
    pub scene: SceneConfig,
    /// Backdrop particle field; no field is simulated when absent
    #[serde(default)]
    pub field: Option<FieldConfig>,
    /// Element boxes served by the headless layout host
    #[serde(default)]
    pub layout: Vec<LayoutEntry>,
    #[serde(default)]
    pub clips: Vec<ClipConfig>,
}

/// Scene metadata and viewport
#[derive(Debug, Deserialize, Serialize)]
pub struct SceneConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_width")]
    pub viewport_width: f32,
    #[serde(default = "default_height")]
    pub viewport_height: f32,
    /// Scroll offset past which the navigation bar turns compact
    #[serde(default = "default_nav_threshold")]
    pub nav_threshold: f32,
}

fn default_name() -> String {
    "untitled".to_string()
}

fn default_width() -> f32 {
    1280.0
}

fn default_height() -> f32 {
    800.0
}

fn default_nav_threshold() -> f32 {
    100.0
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            viewport_width: default_width(),
            viewport_height: default_height(),
            nav_threshold: default_nav_threshold(),
        }
    }
}

impl SceneConfig {
    pub fn viewport(&self) -> Size {
        Size::new(self.viewport_width, self.viewport_height)
    }
}

/// One element box, in document coordinates
#[derive(Debug, Deserialize, Serialize)]
pub struct LayoutEntry {
    pub selector: String,
    #[serde(default)]
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_width")]
    pub width: f32,
    pub height: f32,
}

impl LayoutEntry {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

impl DriftlineConfig {
    /// Load configuration from a directory (looks for driftline.toml) or a file
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = if path.is_file() {
            path.to_path_buf()
        } else {
            path.join("driftline.toml")
        };

        if !config_path.exists() {
            anyhow::bail!("No driftline.toml found in {}", path.display());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Headless layout host holding every `[[layout]]` entry
    pub fn build_layout(&self) -> StaticLayout {
        let layout = StaticLayout::new(self.scene.viewport());
        for entry in &self.layout {
            layout.insert(entry.selector.clone(), entry.rect());
        }
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftline_core::LayoutHost;

    const SCENE: &str = r##"
        [scene]
        name = "landing"
        viewport_height = 1000

        [field]
        particle_count = 12
        seed = 3

        [[layout]]
        selector = ".service-card"
        y = 2000
        width = 400
        height = 400

        [[layout]]
        selector = ".service-card"
        x = 420
        y = 2000
        width = 400
        height = 400

        [[clips]]
        id = "services"
        target = ".service-card"
        from = { opacity = 0.0 }
        to = { opacity = 1.0 }
        trigger = { start = "top 80%" }
    "##;

    #[test]
    fn test_parse_scene() {
        let config = DriftlineConfig::parse(SCENE).unwrap();
        assert_eq!(config.scene.name, "landing");
        assert_eq!(config.scene.viewport(), Size::new(1280.0, 1000.0));
        assert_eq!(config.scene.nav_threshold, 100.0);

        let field = config.field.as_ref().unwrap();
        assert_eq!(field.particle_count, 12);
        assert_eq!(field.connection_threshold, FieldConfig::network().connection_threshold);

        assert_eq!(config.clips.len(), 1);
        assert_eq!(config.build_layout().query(".service-card").len(), 2);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = DriftlineConfig::parse("").unwrap();
        assert_eq!(config.scene.name, "untitled");
        assert!(config.field.is_none());
        assert!(config.clips.is_empty());
    }

    #[test]
    fn test_unknown_clip_option_is_an_error() {
        let result = DriftlineConfig::parse(
            r##"
            [[clips]]
            id = "x"
            target = "#x"
            toggle = "playReverse"
            "##,
        );
        assert!(result.is_err());
    }
}
