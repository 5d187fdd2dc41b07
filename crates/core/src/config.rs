//! Generation parameters, loadable from TOML with every field defaulted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DungeonError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub width: usize,
    pub height: usize,
    pub min_room_size: usize,
    pub max_room_size: usize,
    pub max_rooms: usize,
    pub base_room_attempts: usize,
    pub room_attempts_per_depth: usize,
    pub max_room_attempts: usize,
    pub extra_connections: usize,
    pub zigzag_chance: f64,
    pub cave_room_chance: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 50,
            min_room_size: 4,
            max_room_size: 12,
            max_rooms: 15,
            base_room_attempts: 30,
            room_attempts_per_depth: 5,
            max_room_attempts: 200,
            extra_connections: 2,
            zigzag_chance: 0.3,
            cave_room_chance: 0.1,
        }
    }
}

impl GenerationConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < 8 || self.height < 8 {
            return Err(DungeonError::InvalidConfig(format!(
                "grid must be at least 8x8, got {}x{}",
                self.width, self.height
            )));
        }
        if self.min_room_size < 2 || self.min_room_size > self.max_room_size {
            return Err(DungeonError::InvalidConfig(format!(
                "room size bounds {}..={} are not usable",
                self.min_room_size, self.max_room_size
            )));
        }
        if self.max_room_size + 4 > self.width.min(self.height) {
            return Err(DungeonError::InvalidConfig(format!(
                "max_room_size {} does not fit a {}x{} grid with margins",
                self.max_room_size, self.width, self.height
            )));
        }
        for (name, value) in
            [("zigzag_chance", self.zigzag_chance), ("cave_room_chance", self.cave_room_chance)]
        {
            if !(0.0..=1.0).contains(&value) {
                return Err(DungeonError::InvalidConfig(format!(
                    "{name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Number of placement tries for a floor, growing with depth up to the cap.
    pub fn room_attempts(&self, depth: u32) -> usize {
        let scaled = self
            .base_room_attempts
            .saturating_add(self.room_attempts_per_depth.saturating_mul(depth as usize));
        scaled.min(self.max_room_attempts)
    }
}
