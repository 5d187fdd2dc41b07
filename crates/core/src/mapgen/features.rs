//! Stairs, door, and trap stamping over an already-routed grid.

use crate::grid::Grid;
use crate::types::{DoorKind, Pos, TileKind, Trap, TrapKind};

use super::layout::room_floor_tiles;
use super::model::{Corridor, DoorRecord, Room, TrapRecord};
use super::progression;
use super::seed::DungeonRng;
use super::spatial::{manhattan, map_center};

/// Stamps stairs in the room farthest from the map center.
pub fn place_stairs(grid: &mut Grid, rooms: &[Room], rng: &mut DungeonRng) -> Option<Pos> {
    let center = map_center(grid);
    let mut farthest: Option<(u32, &Room)> = None;
    for room in rooms {
        let distance = manhattan(room.center(), center);
        if farthest.is_none_or(|(best, _)| distance > best) {
            farthest = Some((distance, room));
        }
    }

    let mut candidates = farthest.map(|(_, room)| room_floor_tiles(grid, room)).unwrap_or_default();
    if candidates.is_empty() {
        candidates = grid.floor_positions();
    }
    let stairs = *rng.pick(&candidates)?;
    grid.set_kind(stairs, TileKind::Stairs);
    Some(stairs)
}

/// A floor tile in a one-wide passage: walls on one axis, open ground on the other.
pub fn is_pinch_point(grid: &Grid, pos: Pos) -> bool {
    if !grid.is_floor(pos) {
        return false;
    }
    let [north, east, south, west] = pos.orthogonal_neighbors();
    let walled = |a: Pos, b: Pos| grid.is_wall(a) && grid.is_wall(b);
    let open = |a: Pos, b: Pos| grid.is_walkable(a) && grid.is_walkable(b);
    (walled(north, south) && open(east, west)) || (walled(east, west) && open(north, south))
}

pub fn door_candidates(grid: &Grid) -> Vec<Pos> {
    grid.positions().filter(|&pos| is_pinch_point(grid, pos)).collect()
}

pub fn place_doors(grid: &mut Grid, depth: u32, rng: &mut DungeonRng) -> Vec<DoorRecord> {
    let mut candidates = door_candidates(grid);
    rng.shuffle(&mut candidates);
    let budget = progression::door_budget(depth);
    let secret_chance = progression::secret_door_chance(depth);
    let locked_chance = progression::locked_door_chance(depth);

    let mut doors = Vec::new();
    for pos in candidates {
        if doors.len() >= budget {
            break;
        }
        if !grid.is_floor(pos) || touches(grid, pos, |kind| matches!(kind, TileKind::Door(_))) {
            continue;
        }
        let roll = rng.unit();
        let kind = if roll < secret_chance {
            DoorKind::Secret
        } else if roll < secret_chance + locked_chance {
            DoorKind::Locked
        } else {
            DoorKind::Regular
        };
        grid.set_kind(pos, TileKind::Door(kind.state()));
        doors.push(DoorRecord { pos, kind });
    }
    log::debug!("stamped {} doors from a budget of {budget}", doors.len());
    doors
}

/// Copies each door lying on a corridor onto both endpoint rooms' connection records.
pub fn attach_doors_to_connections(
    rooms: &mut [Room],
    corridors: &[Corridor],
    doors: &[DoorRecord],
) {
    for corridor in corridors {
        let on_corridor: Vec<Pos> =
            doors.iter().map(|door| door.pos).filter(|pos| corridor.cells.contains(pos)).collect();
        if on_corridor.is_empty() {
            continue;
        }
        for (owner, partner) in [(corridor.from, corridor.to), (corridor.to, corridor.from)] {
            let Some(room) = rooms.get_mut(owner.index()) else {
                continue;
            };
            if let Some(connection) =
                room.connections.iter_mut().find(|connection| connection.partner == partner)
            {
                for &pos in &on_corridor {
                    if !connection.doors.contains(&pos) {
                        connection.doors.push(pos);
                    }
                }
            }
        }
    }
}

pub fn place_traps(
    grid: &mut Grid,
    depth: u32,
    difficulty: u8,
    rng: &mut DungeonRng,
) -> Vec<TrapRecord> {
    let count = progression::trap_count(depth, difficulty);
    place_trap_count(grid, depth, count, rng)
}

pub fn place_trap_count(
    grid: &mut Grid,
    depth: u32,
    count: usize,
    rng: &mut DungeonRng,
) -> Vec<TrapRecord> {
    let mut candidates = trap_candidates(grid);
    rng.shuffle(&mut candidates);

    let pool = progression::trap_pool(depth);
    let (min_damage, max_damage) = progression::trap_damage_range(depth);
    let hidden_chance = progression::trap_hidden_chance(depth);

    let mut traps = Vec::new();
    for pos in candidates {
        if traps.len() >= count {
            break;
        }
        if !is_trap_candidate(grid, pos) {
            continue;
        }
        let kind = *rng.pick(&pool).unwrap_or(&TrapKind::Spike);
        let damage = rng.range_usize(min_damage as usize, max_damage as usize) as u32;
        let hidden = rng.chance(hidden_chance);
        grid.set_kind(pos, TileKind::Trap(Trap { kind, damage, hidden, triggered: false }));
        traps.push(TrapRecord { pos, kind, damage });
    }
    log::debug!("stamped {} of {count} requested traps", traps.len());
    traps
}

fn trap_candidates(grid: &Grid) -> Vec<Pos> {
    grid.positions().filter(|&pos| is_trap_candidate(grid, pos)).collect()
}

fn is_trap_candidate(grid: &Grid, pos: Pos) -> bool {
    grid.get(pos).is_some_and(|tile| tile.kind == TileKind::Floor && !tile.has_item)
        && !touches(grid, pos, |kind| matches!(kind, TileKind::Door(_) | TileKind::Stairs))
}

fn touches(grid: &Grid, pos: Pos, predicate: impl Fn(TileKind) -> bool) -> bool {
    pos.orthogonal_neighbors().into_iter().any(|next| predicate(grid.kind_at(next)))
}
