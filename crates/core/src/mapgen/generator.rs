//! High-level level generation that sequences layout, corridors, features, and loot.

use std::cmp::Reverse;

use slotmap::SlotMap;

use crate::config::GenerationConfig;
use crate::error::{DungeonError, Result};
use crate::grid::Grid;
use crate::types::{Pos, RoomId, RoomKind};

use super::corridors::connect_rooms;
use super::features::{attach_doors_to_connections, place_doors, place_stairs, place_traps};
use super::graph::dead_end_rooms;
use super::layout::{fallback_room, place_rooms};
use super::loot::{LootTable, distribute_items};
use super::model::{Level, Room};
use super::progression::{self, MAX_DIFFICULTY};
use super::seed::{DungeonRng, derive_floor_seed};
use super::spatial::{manhattan, nearest_floor_tile};

pub struct LevelGenerator {
    config: GenerationConfig,
    run_seed: u64,
}

impl LevelGenerator {
    pub fn new(config: GenerationConfig, run_seed: u64) -> Self {
        Self { config, run_seed }
    }

    pub fn generate(&self, depth: u32, difficulty: u8, table: &LootTable) -> Result<Level> {
        self.config.validate()?;
        let depth = if depth == 0 {
            log::warn!("depth 0 requested, generating depth 1 instead");
            1
        } else {
            depth
        };
        let difficulty = if difficulty > MAX_DIFFICULTY {
            log::warn!("difficulty {difficulty} clamped to {MAX_DIFFICULTY}");
            MAX_DIFFICULTY
        } else {
            difficulty
        };

        let seed = derive_floor_seed(self.run_seed, depth);
        let mut rng = DungeonRng::new(seed);
        let mut grid = Grid::new(self.config.width, self.config.height);

        let mut rooms = place_rooms(&mut grid, &self.config, depth, &mut rng);
        if rooms.is_empty() {
            log::warn!("no room fit on depth {depth}; carving a fallback room");
            rooms.push(fallback_room(&mut grid, &self.config, &mut rng));
        }
        log::debug!("placed {} rooms on depth {depth}", rooms.len());

        let corridors = connect_rooms(&mut grid, &mut rooms, &self.config, &mut rng);

        let Some(stairs) = place_stairs(&mut grid, &rooms, &mut rng) else {
            return Err(DungeonError::InvalidConfig(format!(
                "depth {depth} carved no floor for the stairs"
            )));
        };
        let start_room = assign_room_kinds(&mut rooms, stairs, depth, &mut rng);

        let doors = place_doors(&mut grid, depth, &mut rng);
        attach_doors_to_connections(&mut rooms, &corridors, &doors);
        let traps = place_traps(&mut grid, depth, difficulty, &mut rng);

        let mut items = SlotMap::with_key();
        distribute_items(&mut grid, &mut items, depth, difficulty, table, &mut rng)?;

        let start_target = rooms[start_room.index()].center();
        let item_tiles: Vec<Pos> = items.values().map(|item| item.pos).collect();
        let start = nearest_floor_tile(&grid, start_target, &item_tiles)
            .or_else(|| nearest_floor_tile(&grid, start_target, &[]))
            .unwrap_or(start_target);

        log::info!(
            "depth {depth} (difficulty {difficulty}): {} rooms, {} corridors, {} doors, \
             {} traps, {} items",
            rooms.len(),
            corridors.len(),
            doors.len(),
            traps.len(),
            items.len()
        );

        Ok(Level {
            depth,
            difficulty,
            seed,
            grid,
            rooms,
            corridors,
            stairs,
            start,
            doors,
            traps,
            items,
        })
    }
}

/// Tags start, stairs, boss, shop, and secret rooms; returns the start room.
fn assign_room_kinds(
    rooms: &mut [Room],
    stairs: Pos,
    depth: u32,
    rng: &mut DungeonRng,
) -> RoomId {
    let stairs_room =
        rooms.iter().find(|room| room.contains(stairs)).map_or(RoomId(0), |room| room.id);
    let stairs_center = rooms[stairs_room.index()].center();

    let mut start_room = stairs_room;
    let mut best_distance = 0;
    for room in rooms.iter() {
        let distance = manhattan(room.center(), stairs_center);
        if room.id != stairs_room && (start_room == stairs_room || distance > best_distance) {
            start_room = room.id;
            best_distance = distance;
        }
    }

    rooms[stairs_room.index()].kind = RoomKind::Stairs;
    rooms[start_room.index()].kind = RoomKind::Start;

    if progression::has_boss_room(depth)
        && let Some(boss) = rooms
            .iter()
            .filter(|room| is_unassigned(room))
            .max_by_key(|room| (room.rect.area(), Reverse(room.id)))
            .map(|room| room.id)
    {
        rooms[boss.index()].kind = RoomKind::Boss;
    }

    if rng.chance(progression::shop_room_chance(rooms.len())) {
        let open: Vec<RoomId> =
            rooms.iter().filter(|room| is_unassigned(room)).map(|room| room.id).collect();
        if let Some(&shop) = rng.pick(&open) {
            rooms[shop.index()].kind = RoomKind::Shop;
        }
    }

    if rng.chance(progression::secret_room_chance(depth)) {
        let dead_ends: Vec<RoomId> = dead_end_rooms(rooms)
            .into_iter()
            .filter(|id| is_unassigned(&rooms[id.index()]))
            .collect();
        if let Some(&secret) = rng.pick(&dead_ends) {
            rooms[secret.index()].kind = RoomKind::Secret;
        }
    }

    start_room
}

/// Normal and cosmetic special rooms can still take a gameplay role.
fn is_unassigned(room: &Room) -> bool {
    matches!(room.kind, RoomKind::Normal | RoomKind::Special)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::mapgen::spatial::{flood_fill, is_open_ground};
    use crate::test_support::sample_loot_table;
    use crate::types::TileKind;

    fn generate(seed: u64, depth: u32) -> Level {
        LevelGenerator::new(GenerationConfig::default(), seed)
            .generate(depth, 30, &sample_loot_table())
            .expect("sample pool is non-empty")
    }

    #[test]
    fn same_inputs_produce_byte_identical_levels() {
        let a = generate(123_456, 2);
        let b = generate(123_456, 2);
        assert_eq!(a.canonical_bytes(), b.canonical_bytes());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn changing_depth_changes_level_for_same_seed() {
        let depth_1 = generate(123_456, 1);
        let depth_2 = generate(123_456, 2);
        assert_ne!(depth_1.canonical_bytes(), depth_2.canonical_bytes());
    }

    #[test]
    fn stairs_and_start_are_distinct_and_typed() {
        for seed in [1_u64, 2, 3, 40, 99] {
            let level = generate(seed, 3);
            assert_eq!(level.grid.kind_at(level.stairs), TileKind::Stairs);
            assert_eq!(level.grid.kind_at(level.start), TileKind::Floor);
            assert_ne!(level.start, level.stairs);
            let kinds: Vec<RoomKind> = level.rooms.iter().map(|room| room.kind).collect();
            assert_eq!(kinds.iter().filter(|&&kind| kind == RoomKind::Start).count(), 1);
            if level.rooms.len() > 1 {
                assert_eq!(kinds.iter().filter(|&&kind| kind == RoomKind::Stairs).count(), 1);
            }
        }
    }

    #[test]
    fn boss_room_only_on_every_fifth_depth() {
        let boss_level = generate(1_234, 5);
        let early_level = generate(1_234, 4);
        let boss_rooms = |level: &Level| {
            level.rooms.iter().filter(|room| room.kind == RoomKind::Boss).count()
        };
        if boss_level.rooms.len() > 2 {
            assert_eq!(boss_rooms(&boss_level), 1);
        }
        assert_eq!(boss_rooms(&early_level), 0);
    }

    #[test]
    fn out_of_range_difficulty_is_clamped() {
        let level = LevelGenerator::new(GenerationConfig::default(), 5)
            .generate(2, 250, &sample_loot_table())
            .expect("sample pool is non-empty");
        assert_eq!(level.difficulty, MAX_DIFFICULTY);
    }

    #[test]
    fn no_room_attempts_still_yields_a_playable_level() {
        let config = GenerationConfig { max_room_attempts: 0, ..GenerationConfig::default() };
        let level = LevelGenerator::new(config, 8)
            .generate(1, 0, &sample_loot_table())
            .expect("sample pool is non-empty");
        assert_eq!(level.rooms.len(), 1);
        assert!(level.rooms[0].contains(level.stairs));
        assert!(level.rooms[0].contains(level.start));
    }

    #[test]
    fn inverted_room_size_bounds_are_rejected_before_generation() {
        let config =
            GenerationConfig { min_room_size: 10, max_room_size: 4, ..GenerationConfig::default() };
        let result = LevelGenerator::new(config, 8).generate(1, 0, &sample_loot_table());
        assert!(matches!(result, Err(DungeonError::InvalidConfig(_))));
    }

    #[test]
    fn grid_smaller_than_the_minimum_is_rejected() {
        let config = GenerationConfig { width: 4, height: 4, ..GenerationConfig::default() };
        let result = LevelGenerator::new(config, 8).generate(1, 0, &sample_loot_table());
        assert!(matches!(result, Err(DungeonError::InvalidConfig(_))));
    }

    #[test]
    fn empty_loot_pool_fails_generation() {
        let generator = LevelGenerator::new(GenerationConfig::default(), 8);
        let result = generator.generate(1, 0, &LootTable::default());
        assert!(matches!(result, Err(DungeonError::EmptyLootPool)));
    }

    #[test]
    fn doors_on_corridors_show_up_in_connection_metadata() {
        let level = generate(2_024, 9);
        for room in &level.rooms {
            for connection in &room.connections {
                for door in &connection.doors {
                    assert!(level.doors.iter().any(|record| record.pos == *door));
                }
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]
        #[test]
        fn generated_levels_keep_open_ground_connected(seed in any::<u64>(), depth in 1_u32..=12) {
            let level = generate(seed, depth);
            let open_tiles: Vec<Pos> = level
                .grid
                .positions()
                .filter(|&pos| is_open_ground(level.grid.kind_at(pos)))
                .collect();
            let reached = flood_fill(&level.grid, level.start, is_open_ground);
            prop_assert_eq!(reached.len(), open_tiles.len(), "seed={} depth={}", seed, depth);
        }
    }
}
