pub mod config;
pub mod content;
pub mod error;
pub mod grid;
pub mod mapgen;
pub mod pathfinding;
pub mod types;
pub mod visibility;

#[cfg(test)]
mod test_support;

pub use config::GenerationConfig;
pub use content::starter_loot_table;
pub use error::{DungeonError, Result};
pub use grid::{Grid, Tile};
pub use mapgen::{Level, LevelGenerator, LootTable, generate_level};
pub use pathfinding::{Path, PathOptions, Pathfinder};
pub use types::*;
pub use visibility::FieldOfView;
