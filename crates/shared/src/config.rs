use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Layout and interaction constants for the viewer.
///
/// Every field has a default so a partial `viewer.json` (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Smallest cell edge in pixels (viewport too small to fit more).
    pub min_cell: f64,
    /// Largest cell edge in pixels.
    pub max_cell: f64,
    /// Width of the side panel at full scale.
    pub panel_width: f64,
    /// Manhattan distance in pixels before a press becomes a box drag.
    pub drag_threshold: f64,
    /// Opacity of remembered terrain and remembered units.
    pub remembered_alpha: f64,
    /// Ticks each animation frame stays on screen.
    pub ticks_per_frame: u64,
    /// Unit sprite edge and HP bar width at full scale.
    pub unit_size: f64,
    pub hp_bar_height: f64,
    pub min_speed: i32,
    pub max_speed: i32,
    /// Unit type names indexed by `unit_type`; keys into the atlas.
    pub unit_names: Vec<String>,
    /// CSS colors indexed by player id.
    pub player_colors: Vec<String>,
}

pub const MINIRTS_UNIT_NAMES: [&str; 6] = [
    "RESOURCE",
    "WORKER",
    "MELEE_ATTACKER",
    "RANGE_ATTACKER",
    "BARRACKS",
    "BASE",
];

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            min_cell: 24.0,
            max_cell: 50.0,
            panel_width: 400.0,
            drag_threshold: 10.0,
            remembered_alpha: 0.3,
            ticks_per_frame: 3,
            unit_size: 32.0,
            hp_bar_height: 5.0,
            min_speed: -10,
            max_speed: 5,
            unit_names: MINIRTS_UNIT_NAMES.iter().map(|s| s.to_string()).collect(),
            player_colors: vec!["blue".into(), "red".into(), "yellow".into()],
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: ViewerConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_cell <= 0.0 || self.max_cell < self.min_cell {
            return Err(ConfigError::Invalid(format!(
                "cell sizes must satisfy 0 < min_cell <= max_cell (got {} / {})",
                self.min_cell, self.max_cell
            )));
        }
        if self.ticks_per_frame == 0 {
            return Err(ConfigError::Invalid("ticks_per_frame must be positive".into()));
        }
        if self.min_speed > 0 || self.max_speed < 0 {
            return Err(ConfigError::Invalid("speed range must contain 0".into()));
        }
        Ok(())
    }

    pub fn unit_name(&self, unit_type: usize) -> Option<&str> {
        self.unit_names.get(unit_type).map(String::as_str)
    }

    pub fn player_color(&self, player_id: i32) -> &str {
        usize::try_from(player_id)
            .ok()
            .and_then(|i| self.player_colors.get(i))
            .map(String::as_str)
            .unwrap_or("white")
    }
}
