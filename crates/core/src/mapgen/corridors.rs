//! Corridor routing: joins every committed room into one walkable component.

use crate::config::GenerationConfig;
use crate::grid::Grid;
use crate::types::{CorridorStyle, Pos, TileKind};

use super::model::{Corridor, Room, RoomConnection};
use super::seed::DungeonRng;
use super::spatial::manhattan;

const EXTRA_PAIR_TRIES: usize = 10;

/// Nearest-pending-room growth from room 0, then a few extra pairs for loops.
pub fn connect_rooms(
    grid: &mut Grid,
    rooms: &mut [Room],
    config: &GenerationConfig,
    rng: &mut DungeonRng,
) -> Vec<Corridor> {
    let mut corridors = Vec::new();
    if rooms.len() < 2 {
        return corridors;
    }

    let mut connected_room_indices = vec![0_usize];
    let mut pending_room_indices: Vec<usize> = (1..rooms.len()).collect();

    while !pending_room_indices.is_empty() {
        let mut best_choice: Option<(u32, usize, usize)> = None;
        for &connected_index in &connected_room_indices {
            let connected_center = rooms[connected_index].center();
            for &pending_index in &pending_room_indices {
                let pending_center = rooms[pending_index].center();
                let distance = manhattan(connected_center, pending_center);
                let should_replace = match best_choice {
                    None => true,
                    Some(best) => (distance, connected_index, pending_index) < best,
                };
                if should_replace {
                    best_choice = Some((distance, connected_index, pending_index));
                }
            }
        }

        let Some((_, connected_index, pending_index)) = best_choice else {
            break;
        };
        corridors.push(link_rooms(grid, rooms, connected_index, pending_index, config, rng));

        connected_room_indices.push(pending_index);
        pending_room_indices.retain(|&index| index != pending_index);
    }

    let extra_count = config.extra_connections.min(rooms.len() / 3);
    for _ in 0..extra_count {
        for _ in 0..EXTRA_PAIR_TRIES {
            let left = rng.range_usize(0, rooms.len() - 1);
            let right = rng.range_usize(0, rooms.len() - 1);
            if left == right || rooms[left].is_connected_to(rooms[right].id) {
                continue;
            }
            corridors.push(link_rooms(grid, rooms, left, right, config, rng));
            break;
        }
    }

    log::debug!("routed {} corridors between {} rooms", corridors.len(), rooms.len());
    corridors
}

fn link_rooms(
    grid: &mut Grid,
    rooms: &mut [Room],
    left: usize,
    right: usize,
    config: &GenerationConfig,
    rng: &mut DungeonRng,
) -> Corridor {
    let style = if rng.chance(config.zigzag_chance) {
        CorridorStyle::Zigzag
    } else {
        CorridorStyle::Elbow
    };
    let from = rooms[left].center();
    let to = rooms[right].center();
    let cells = match style {
        CorridorStyle::Elbow => {
            let horizontal_first = rng.chance(0.5);
            carve_elbow(grid, from, to, horizontal_first)
        }
        CorridorStyle::Zigzag => carve_zigzag(grid, from, to, rng),
    };

    let (left_id, right_id) = (rooms[left].id, rooms[right].id);
    rooms[left].connections.push(RoomConnection { partner: right_id, style, doors: Vec::new() });
    rooms[right].connections.push(RoomConnection { partner: left_id, style, doors: Vec::new() });
    Corridor { from: left_id, to: right_id, style, cells }
}

/// One horizontal run and one vertical run; returns every routed cell in order.
pub fn carve_elbow(grid: &mut Grid, start: Pos, end: Pos, horizontal_first: bool) -> Vec<Pos> {
    let mut cells = Vec::new();
    if horizontal_first {
        push_horizontal_run(&mut cells, start.y, start.x, end.x);
        push_vertical_run(&mut cells, end.x, start.y, end.y);
    } else {
        push_vertical_run(&mut cells, start.x, start.y, end.y);
        push_horizontal_run(&mut cells, end.y, start.x, end.x);
    }
    cells.dedup();
    carve_cells(grid, &cells);
    cells
}

/// Elbow legs through one or two waypoints inside the bounding box of the endpoints.
pub fn carve_zigzag(grid: &mut Grid, start: Pos, end: Pos, rng: &mut DungeonRng) -> Vec<Pos> {
    let waypoint_count = rng.range_usize(1, 2);
    let mut waypoints = vec![start];
    for _ in 0..waypoint_count {
        waypoints.push(Pos {
            y: rng.range_i32(start.y.min(end.y), start.y.max(end.y)),
            x: rng.range_i32(start.x.min(end.x), start.x.max(end.x)),
        });
    }
    waypoints.push(end);

    let mut cells = Vec::new();
    for leg in waypoints.windows(2) {
        let horizontal_first = rng.chance(0.5);
        for cell in carve_elbow(grid, leg[0], leg[1], horizontal_first) {
            if cells.last() != Some(&cell) {
                cells.push(cell);
            }
        }
    }
    cells
}

/// Converts wall to floor, leaves everything else (and the outer border) alone.
pub fn carve_cells(grid: &mut Grid, cells: &[Pos]) {
    for &pos in cells {
        if grid.in_interior(pos) && grid.is_wall(pos) {
            grid.set_kind(pos, TileKind::Floor);
        }
    }
}

fn push_horizontal_run(cells: &mut Vec<Pos>, y: i32, from_x: i32, to_x: i32) {
    let step = if to_x >= from_x { 1 } else { -1 };
    let mut x = from_x;
    loop {
        cells.push(Pos { y, x });
        if x == to_x {
            break;
        }
        x += step;
    }
}

fn push_vertical_run(cells: &mut Vec<Pos>, x: i32, from_y: i32, to_y: i32) {
    let step = if to_y >= from_y { 1 } else { -1 };
    let mut y = from_y;
    loop {
        cells.push(Pos { y, x });
        if y == to_y {
            break;
        }
        y += step;
    }
}
