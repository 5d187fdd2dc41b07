//! Shared fixtures for the unit test suites.

use crate::grid::Grid;
use crate::mapgen::loot::{ItemCategory, LootTable, LootTemplate};
use crate::types::{Pos, TileKind};

pub(crate) fn sample_loot_table() -> LootTable {
    let entry = |name: &str, category, base_stat| LootTemplate {
        name: name.to_string(),
        category,
        base_stat,
    };
    LootTable::new(vec![
        entry("Short Sword", ItemCategory::Weapon, 6),
        entry("War Axe", ItemCategory::Weapon, 9),
        entry("Leather Jerkin", ItemCategory::BodyArmor, 3),
        entry("Iron Helm", ItemCategory::Helmet, 2),
        entry("Healing Draught", ItemCategory::Potion, 10),
    ])
}

/// Wall-bordered open floor with the observer in the middle.
pub(crate) fn open_room_fixture() -> (Grid, Pos) {
    (Grid::open(25, 25), Pos::new(12, 12))
}

/// A one-wide corridor along y = 5 with a wall plug at x = 6.
pub(crate) fn wall_occlusion_fixture() -> (Grid, Pos) {
    let mut grid = Grid::new(11, 11);
    for x in 1..10 {
        grid.set_kind(Pos::new(x, 5), TileKind::Floor);
    }
    grid.set_kind(Pos::new(6, 5), TileKind::Wall);
    (grid, Pos::new(3, 5))
}

/// Two open halves split by a solid wall column at x = 10.
pub(crate) fn split_fixture() -> Grid {
    let mut grid = Grid::open(21, 12);
    for y in 0..12 {
        grid.set_kind(Pos::new(10, y), TileKind::Wall);
    }
    grid
}
