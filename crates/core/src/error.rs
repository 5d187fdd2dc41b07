//! Error type shared by generation, visibility, and pathfinding entry points.

use std::{io, result};

use thiserror::Error;

use crate::types::Pos;

#[derive(Debug, Error)]
pub enum DungeonError {
    #[error("position ({}, {}) is outside the {width}x{height} grid", pos.x, pos.y)]
    OutOfBounds { pos: Pos, width: usize, height: usize },

    #[error("loot pool is empty; no items can be placed")]
    EmptyLootPool,

    #[error("invalid generation config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse generation config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to parse loot table: {0}")]
    LootTable(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = DungeonError> = result::Result<T, E>;
