use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::color::{BlendMode, Color};
use crate::error::RenderError;
use crate::geometry::Rect;

/// Renderer state that can be saved and restored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub draw_color: Color,
    pub blend_mode: BlendMode,
    pub clip_rect: Option<Rect>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            draw_color: Color::WHITE,
            blend_mode: BlendMode::None,
            clip_rect: None,
        }
    }
}

impl RenderSettings {
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        serde_json::from_str(json).map_err(|e| RenderError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, RenderError> {
        serde_json::to_string_pretty(self).map_err(|e| RenderError::Config(e.to_string()))
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .map_err(|e| RenderError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| RenderError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}
