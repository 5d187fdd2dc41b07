//! Procedural level generation split into coherent submodules.

pub mod corridors;
pub mod features;
pub mod graph;
pub mod layout;
pub mod loot;
pub mod model;
pub mod progression;
pub mod seed;

mod generator;
mod spatial;

pub use generator::LevelGenerator;
pub use loot::{
    Bonus, BonusAttribute, ItemCategory, LootTable, LootTemplate, PlacedItem, Rarity, ScaledLoot,
};
pub use model::{Corridor, DoorRecord, Level, Room, RoomConnection, RoomRect, TrapRecord};
pub use progression::MAX_DIFFICULTY;
pub use seed::{DungeonRng, derive_floor_seed};

use crate::config::GenerationConfig;
use crate::error::Result;

pub fn generate_level(
    config: &GenerationConfig,
    run_seed: u64,
    depth: u32,
    difficulty: u8,
    table: &LootTable,
) -> Result<Level> {
    LevelGenerator::new(config.clone(), run_seed).generate(depth, difficulty, table)
}
