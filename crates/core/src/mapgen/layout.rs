//! Room placement: speculative rectangles validated against untouched rock.

use crate::config::GenerationConfig;
use crate::grid::Grid;
use crate::types::{FloorStyle, Pos, RoomId, RoomKind, RoomShape, TileKind};

use super::model::{Room, RoomRect};
use super::progression;
use super::seed::DungeonRng;

const CAVE_MIN_SIDE: usize = 5;
const CAVE_FILL_RATIO: f64 = 0.55;

/// Best-effort placement; running out of attempts just yields fewer rooms.
pub fn place_rooms(
    grid: &mut Grid,
    config: &GenerationConfig,
    depth: u32,
    rng: &mut DungeonRng,
) -> Vec<Room> {
    let mut rooms: Vec<Room> = Vec::new();
    for _ in 0..config.room_attempts(depth) {
        if rooms.len() >= config.max_rooms {
            break;
        }
        let room_width = rng.range_usize(config.min_room_size, config.max_room_size);
        let room_height = rng.range_usize(config.min_room_size, config.max_room_size);
        if room_width + 2 >= grid.width() || room_height + 2 >= grid.height() {
            continue;
        }

        let max_x = grid.width() - room_width - 1;
        let max_y = grid.height() - room_height - 1;
        if max_x <= 1 || max_y <= 1 {
            continue;
        }

        let x = rng.range_usize(1, max_x);
        let y = rng.range_usize(1, max_y);
        let candidate = RoomRect { x, y, width: room_width, height: room_height };
        if !is_placeable(grid, &rooms, candidate) {
            continue;
        }

        let shape = if room_width >= CAVE_MIN_SIDE
            && room_height >= CAVE_MIN_SIDE
            && rng.chance(config.cave_room_chance)
        {
            RoomShape::Cave
        } else {
            RoomShape::Rect
        };
        let mut room = Room::new(RoomId(rooms.len() as u32), candidate, shape);
        carve_room(grid, &room, rng);

        if rng.chance(progression::special_room_chance(depth)) {
            let style = *rng.pick(&FloorStyle::SPECIAL).unwrap_or(&FloorStyle::Moss);
            room.kind = RoomKind::Special;
            room.style = style;
            apply_floor_style(grid, &room);
        }
        rooms.push(room);
    }
    rooms
}

/// The candidate plus a one-tile margin must be in bounds, untouched rock, and clear of
/// every committed room's footprint.
pub fn is_placeable(grid: &Grid, rooms: &[Room], candidate: RoomRect) -> bool {
    if candidate.x == 0 || candidate.y == 0 {
        return false;
    }
    let with_margin = candidate.expanded(1);
    if with_margin.right() >= grid.width() || with_margin.bottom() >= grid.height() {
        return false;
    }
    if rooms.iter().any(|room| with_margin.intersects(&room.rect)) {
        return false;
    }
    with_margin.cells().all(|pos| grid.is_wall(pos))
}

/// Centered room used when no proposal fit; carved unconditionally.
pub fn fallback_room(grid: &mut Grid, config: &GenerationConfig, rng: &mut DungeonRng) -> Room {
    let width = config.min_room_size.min(grid.width().saturating_sub(2)).max(1);
    let height = config.min_room_size.min(grid.height().saturating_sub(2)).max(1);
    let rect = RoomRect {
        x: ((grid.width() - width) / 2).max(1),
        y: ((grid.height() - height) / 2).max(1),
        width,
        height,
    };
    let room = Room::new(RoomId(0), rect, RoomShape::Rect);
    carve_room(grid, &room, rng);
    room
}

pub fn carve_room(grid: &mut Grid, room: &Room, rng: &mut DungeonRng) {
    match room.shape {
        RoomShape::Rect => {
            for pos in room.rect.cells() {
                grid.set_kind(pos, TileKind::Floor);
            }
        }
        RoomShape::Cave => carve_cave(grid, room.rect, rng),
    }
}

/// Random walk from the center, confined to the rectangle, so the blob stays connected.
fn carve_cave(grid: &mut Grid, rect: RoomRect, rng: &mut DungeonRng) {
    let target = ((rect.area() as f64) * CAVE_FILL_RATIO).ceil() as usize;
    let step_budget = rect.area() * 8;
    let mut cursor = rect.center();
    grid.set_kind(cursor, TileKind::Floor);
    let mut carved = 1;

    for _ in 0..step_budget {
        if carved >= target {
            break;
        }
        let next = match rng.range_usize(0, 3) {
            0 => cursor.offset(0, -1),
            1 => cursor.offset(1, 0),
            2 => cursor.offset(0, 1),
            _ => cursor.offset(-1, 0),
        };
        if !rect.contains(next) {
            continue;
        }
        cursor = next;
        if grid.is_wall(cursor) {
            grid.set_kind(cursor, TileKind::Floor);
            carved += 1;
        }
    }
}

pub fn apply_floor_style(grid: &mut Grid, room: &Room) {
    for pos in room.rect.cells() {
        if let Some(tile) = grid.get_mut(pos)
            && tile.kind == TileKind::Floor
        {
            tile.style = room.style;
        }
    }
}

/// Floor tiles inside the room's footprint.
pub fn room_floor_tiles(grid: &Grid, room: &Room) -> Vec<Pos> {
    room.rect.cells().filter(|&pos| grid.is_floor(pos)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placed_rooms_never_overlap_including_margin() {
        let config = GenerationConfig::default();
        for seed in 0..20 {
            let mut grid = Grid::new(config.width, config.height);
            let mut rng = DungeonRng::new(seed);
            let rooms = place_rooms(&mut grid, &config, 3, &mut rng);
            assert!(rooms.len() >= 2, "seed {seed} placed only {} rooms", rooms.len());

            for (left_index, left) in rooms.iter().enumerate() {
                for right in &rooms[left_index + 1..] {
                    assert!(
                        !left.rect.expanded(1).intersects(&right.rect),
                        "rooms must not overlap or touch: {:?} vs {:?}",
                        left.rect,
                        right.rect
                    );
                }
            }
        }
    }

    #[test]
    fn special_rooms_stamp_their_style_on_every_floor_tile() {
        let config = GenerationConfig::default();
        let mut special_rooms = 0;
        for seed in 0..30 {
            let mut grid = Grid::new(config.width, config.height);
            let rooms = place_rooms(&mut grid, &config, 25, &mut DungeonRng::new(seed));
            for room in &rooms {
                let styles: Vec<FloorStyle> = room_floor_tiles(&grid, room)
                    .into_iter()
                    .filter_map(|pos| grid.get(pos).map(|tile| tile.style))
                    .collect();
                if room.kind == RoomKind::Special {
                    special_rooms += 1;
                    assert!(
                        FloorStyle::SPECIAL.contains(&room.style),
                        "seed {seed}: {:?}",
                        room.style
                    );
                    assert!(styles.iter().all(|&style| style == room.style));
                } else {
                    assert!(styles.iter().all(|&style| style == FloorStyle::Stone));
                }
            }
        }
        assert!(special_rooms > 0, "deep floors should roll some special rooms");
    }

    #[test]
    fn room_count_respects_cap() {
        let config = GenerationConfig { max_rooms: 3, ..GenerationConfig::default() };
        let mut grid = Grid::new(config.width, config.height);
        let rooms = place_rooms(&mut grid, &config, 10, &mut DungeonRng::new(1));
        assert!(rooms.len() <= 3);
    }

    #[test]
    fn room_ids_match_list_positions() {
        let config = GenerationConfig::default();
        let mut grid = Grid::new(config.width, config.height);
        let rooms = place_rooms(&mut grid, &config, 1, &mut DungeonRng::new(8));
        for (index, room) in rooms.iter().enumerate() {
            assert_eq!(room.id.index(), index);
        }
    }

    #[test]
    fn rect_rooms_are_fully_carved_and_caves_keep_their_center() {
        let config = GenerationConfig { cave_room_chance: 0.5, ..GenerationConfig::default() };
        let mut grid = Grid::new(config.width, config.height);
        let rooms = place_rooms(&mut grid, &config, 2, &mut DungeonRng::new(31));
        for room in &rooms {
            assert!(grid.is_floor(room.center()), "center of {:?} must be floor", room.rect);
            if room.shape == RoomShape::Rect {
                assert_eq!(room_floor_tiles(&grid, room).len(), room.rect.area());
            }
        }
    }

    #[test]
    fn rejects_candidate_touching_carved_floor() {
        let mut grid = Grid::new(30, 20);
        grid.set_kind(Pos::new(10, 5), TileKind::Floor);
        let touching = RoomRect { x: 11, y: 3, width: 4, height: 4 };
        let clear = RoomRect { x: 14, y: 3, width: 4, height: 4 };
        assert!(!is_placeable(&grid, &[], touching));
        assert!(is_placeable(&grid, &[], clear));
    }

    #[test]
    fn rejects_candidate_on_border() {
        let grid = Grid::new(20, 20);
        assert!(!is_placeable(&grid, &[], RoomRect { x: 0, y: 4, width: 4, height: 4 }));
        assert!(!is_placeable(&grid, &[], RoomRect { x: 16, y: 4, width: 4, height: 4 }));
    }

    #[test]
    fn fallback_room_is_carved_in_the_middle() {
        let config = GenerationConfig::default();
        let mut grid = Grid::new(20, 20);
        let room = fallback_room(&mut grid, &config, &mut DungeonRng::new(0));
        assert!(grid.is_floor(room.center()));
        assert_eq!(room.rect.x, 8);
    }
}
