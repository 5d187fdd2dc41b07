//! Public data models for generated levels: rooms, corridors, feature records, and the level.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::Result;
use crate::grid::Grid;
use crate::types::{
    CorridorStyle, DoorKind, FloorStyle, ItemId, Pos, RoomId, RoomKind, RoomShape, TileKind,
    TrapEffect, TrapKind,
};

use super::loot::PlacedItem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl RoomRect {
    pub fn right(self) -> usize {
        self.x + self.width - 1
    }

    pub fn bottom(self) -> usize {
        self.y + self.height - 1
    }

    pub fn center(self) -> Pos {
        Pos { y: (self.y + (self.height / 2)) as i32, x: (self.x + (self.width / 2)) as i32 }
    }

    pub fn expanded(self, margin: usize) -> Self {
        let expanded_x = self.x.saturating_sub(margin);
        let expanded_y = self.y.saturating_sub(margin);
        let expanded_right = self.right().saturating_add(margin);
        let expanded_bottom = self.bottom().saturating_add(margin);
        Self {
            x: expanded_x,
            y: expanded_y,
            width: expanded_right - expanded_x + 1,
            height: expanded_bottom - expanded_y + 1,
        }
    }

    pub fn intersects(self, other: &Self) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    pub fn contains(self, pos: Pos) -> bool {
        if pos.x < 0 || pos.y < 0 {
            return false;
        }
        let px = pos.x as usize;
        let py = pos.y as usize;
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    pub fn cells(self) -> impl Iterator<Item = Pos> {
        (self.y..=self.bottom()).flat_map(move |y| {
            (self.x..=self.right()).map(move |x| Pos { y: y as i32, x: x as i32 })
        })
    }

    pub fn area(self) -> usize {
        self.width * self.height
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomConnection {
    pub partner: RoomId,
    pub style: CorridorStyle,
    /// Doors stamped on the corridor joining the two rooms.
    pub doors: Vec<Pos>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub rect: RoomRect,
    pub kind: RoomKind,
    pub shape: RoomShape,
    pub style: FloorStyle,
    pub connections: Vec<RoomConnection>,
}

impl Room {
    pub fn new(id: RoomId, rect: RoomRect, shape: RoomShape) -> Self {
        Self {
            id,
            rect,
            kind: RoomKind::Normal,
            shape,
            style: FloorStyle::Stone,
            connections: Vec::new(),
        }
    }

    pub fn center(&self) -> Pos {
        self.rect.center()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.rect.contains(pos)
    }

    pub fn is_connected_to(&self, other: RoomId) -> bool {
        self.connections.iter().any(|connection| connection.partner == other)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corridor {
    pub from: RoomId,
    pub to: RoomId,
    pub style: CorridorStyle,
    pub cells: Vec<Pos>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorRecord {
    pub pos: Pos,
    pub kind: DoorKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapRecord {
    pub pos: Pos,
    pub kind: TrapKind,
    pub damage: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Level {
    pub depth: u32,
    pub difficulty: u8,
    pub seed: u64,
    pub grid: Grid,
    pub rooms: Vec<Room>,
    pub corridors: Vec<Corridor>,
    pub stairs: Pos,
    pub start: Pos,
    pub doors: Vec<DoorRecord>,
    pub traps: Vec<TrapRecord>,
    pub items: SlotMap<ItemId, PlacedItem>,
}

impl Level {
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    pub fn room_at(&self, pos: Pos) -> Option<&Room> {
        self.rooms.iter().find(|room| room.contains(pos))
    }

    pub fn item_at(&self, pos: Pos) -> Option<(ItemId, &PlacedItem)> {
        self.items.iter().find(|(_, item)| item.pos == pos)
    }

    /// Removes the item lying on `pos`, clearing the tile's item marker.
    pub fn take_item(&mut self, pos: Pos) -> Option<PlacedItem> {
        let id = self.item_at(pos).map(|(id, _)| id)?;
        let item = self.items.remove(id)?;
        if self.item_at(pos).is_none()
            && let Some(tile) = self.grid.get_mut(pos)
        {
            tile.has_item = false;
        }
        Some(item)
    }

    /// Replaces the entity occupancy markers with `positions`.
    pub fn set_entity_positions(&mut self, positions: &[Pos]) {
        for tile in self.grid.tiles_mut() {
            tile.has_entity = false;
        }
        for &pos in positions {
            if let Some(tile) = self.grid.get_mut(pos) {
                tile.has_entity = true;
            }
        }
    }

    /// Unlocks a locked door; returns whether anything changed.
    pub fn unlock_door(&mut self, pos: Pos) -> Result<bool> {
        self.grid.check_bounds(pos)?;
        match self.grid.kind_at(pos) {
            TileKind::Door(mut door) if door.locked => {
                door.locked = false;
                self.grid.set_kind(pos, TileKind::Door(door));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Reveals secret doors and hidden traps within `radius` of `center`.
    pub fn reveal_secrets(&mut self, center: Pos, radius: i32) -> Result<usize> {
        self.grid.check_bounds(center)?;
        let radius = radius.max(0);
        let radius_squared = i64::from(radius) * i64::from(radius);
        let mut revealed = 0;
        for y in (center.y - radius)..=(center.y + radius) {
            for x in (center.x - radius)..=(center.x + radius) {
                let pos = Pos { y, x };
                if pos.distance_squared(center) > radius_squared {
                    continue;
                }
                let revealed_kind = match self.grid.kind_at(pos) {
                    TileKind::Door(mut door) if door.hidden => {
                        door.hidden = false;
                        Some(TileKind::Door(door))
                    }
                    TileKind::Trap(mut trap) if trap.hidden => {
                        trap.hidden = false;
                        Some(TileKind::Trap(trap))
                    }
                    _ => None,
                };
                if let Some(kind) = revealed_kind {
                    self.grid.set_kind(pos, kind);
                    revealed += 1;
                }
            }
        }
        Ok(revealed)
    }

    /// Fires the trap on `pos` once; later calls return `None`.
    pub fn trigger_trap(&mut self, pos: Pos) -> Result<Option<TrapEffect>> {
        self.grid.check_bounds(pos)?;
        match self.grid.kind_at(pos) {
            TileKind::Trap(mut trap) if !trap.triggered => {
                trap.triggered = true;
                trap.hidden = false;
                self.grid.set_kind(pos, TileKind::Trap(trap));
                Ok(Some(trap.effect()))
            }
            _ => Ok(None),
        }
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.width() as u32).to_le_bytes());
        bytes.extend((self.height() as u32).to_le_bytes());
        bytes.extend(self.depth.to_le_bytes());
        for tile in self.grid.tiles() {
            bytes.push(match tile.kind {
                TileKind::Wall => 0,
                TileKind::Floor => 1,
                TileKind::Door(door) => 2 + u8::from(door.locked) + 2 * u8::from(door.hidden),
                TileKind::Stairs => 6,
                TileKind::Trap(trap) => 7 + trap.kind as u8,
            });
            bytes.push(tile.style as u8);
        }
        bytes.extend(self.stairs.y.to_le_bytes());
        bytes.extend(self.stairs.x.to_le_bytes());
        bytes.extend(self.start.y.to_le_bytes());
        bytes.extend(self.start.x.to_le_bytes());

        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.extend((room.rect.x as u32).to_le_bytes());
            bytes.extend((room.rect.y as u32).to_le_bytes());
            bytes.extend((room.rect.width as u32).to_le_bytes());
            bytes.extend((room.rect.height as u32).to_le_bytes());
            bytes.push(room.kind as u8);
        }

        bytes.extend((self.items.len() as u32).to_le_bytes());
        for (_, item) in &self.items {
            bytes.extend(item.pos.y.to_le_bytes());
            bytes.extend(item.pos.x.to_le_bytes());
            bytes.extend(item.stat.to_le_bytes());
            bytes.extend(item.name.as_bytes());
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    /// One character per tile; `@` marks `marker` when given.
    pub fn render_ascii(&self, marker: Option<Pos>) -> String {
        let mut text = String::with_capacity((self.width() + 1) * self.height());
        for y in 0..self.height() {
            for x in 0..self.width() {
                let pos = Pos { y: y as i32, x: x as i32 };
                let glyph = if Some(pos) == marker {
                    '@'
                } else if self.grid.get(pos).is_some_and(|tile| tile.has_item) {
                    '*'
                } else if pos == self.start {
                    '<'
                } else {
                    self.grid.kind_at(pos).glyph()
                };
                text.push(glyph);
            }
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DoorState, Trap};

    fn bare_level(grid: Grid) -> Level {
        Level {
            depth: 1,
            difficulty: 0,
            seed: 0,
            grid,
            rooms: Vec::new(),
            corridors: Vec::new(),
            stairs: Pos::new(1, 1),
            start: Pos::new(2, 2),
            doors: Vec::new(),
            traps: Vec::new(),
            items: SlotMap::with_key(),
        }
    }

    #[test]
    fn expanded_rect_detects_touching_rooms() {
        let left = RoomRect { x: 2, y: 2, width: 4, height: 4 };
        let touching = RoomRect { x: 6, y: 2, width: 3, height: 3 };
        let spaced = RoomRect { x: 8, y: 2, width: 3, height: 3 };
        assert!(!left.intersects(&touching));
        assert!(left.expanded(1).intersects(&touching.expanded(1)));
        assert!(!left.expanded(1).intersects(&spaced));
    }

    #[test]
    fn rect_cells_cover_area() {
        let rect = RoomRect { x: 3, y: 4, width: 5, height: 2 };
        let cells: Vec<Pos> = rect.cells().collect();
        assert_eq!(cells.len(), rect.area());
        assert!(cells.iter().all(|&pos| rect.contains(pos)));
        assert_eq!(rect.center(), Pos::new(5, 5));
    }

    #[test]
    fn unlocking_opens_path_and_sight() {
        let mut grid = Grid::open(6, 6);
        let door = Pos::new(3, 3);
        grid.set_kind(door, TileKind::Door(DoorState { locked: true, hidden: false }));
        let mut level = bare_level(grid);

        assert!(!level.grid.is_walkable(door));
        assert!(level.unlock_door(door).expect("in bounds"));
        assert!(level.grid.is_walkable(door));
        assert!(!level.grid.blocks_sight(door));
        assert!(!level.unlock_door(door).expect("in bounds"), "second unlock is a no-op");
    }

    #[test]
    fn trap_fires_once_and_becomes_visible() {
        let mut grid = Grid::open(6, 6);
        let pos = Pos::new(2, 3);
        let trap = Trap { kind: TrapKind::Spike, damage: 4, hidden: true, triggered: false };
        grid.set_kind(pos, TileKind::Trap(trap));
        let mut level = bare_level(grid);

        let effect = level.trigger_trap(pos).expect("in bounds");
        assert_eq!(effect, Some(TrapEffect::Damage(4)));
        assert_eq!(level.trigger_trap(pos).expect("in bounds"), None);
        match level.grid.kind_at(pos) {
            TileKind::Trap(trap) => assert!(trap.triggered && !trap.hidden),
            other => panic!("expected trap, got {other:?}"),
        }
    }

    #[test]
    fn reveal_secrets_only_inside_radius() {
        let mut grid = Grid::open(12, 12);
        let near = Pos::new(4, 5);
        let far = Pos::new(10, 10);
        grid.set_kind(near, TileKind::Door(DoorState { locked: false, hidden: true }));
        grid.set_kind(far, TileKind::Door(DoorState { locked: false, hidden: true }));
        let mut level = bare_level(grid);

        let revealed = level.reveal_secrets(Pos::new(5, 5), 2).expect("in bounds");
        assert_eq!(revealed, 1);
        assert!(level.grid.is_walkable(near));
        assert!(!level.grid.is_walkable(far));
    }

    #[test]
    fn runtime_events_reject_out_of_bounds() {
        let mut level = bare_level(Grid::open(5, 5));
        assert!(level.unlock_door(Pos::new(9, 9)).is_err());
        assert!(level.trigger_trap(Pos::new(-1, 0)).is_err());
    }

    #[test]
    fn entity_markers_are_replaced() {
        let mut level = bare_level(Grid::open(5, 5));
        level.set_entity_positions(&[Pos::new(1, 1), Pos::new(2, 2)]);
        level.set_entity_positions(&[Pos::new(3, 3)]);
        assert!(!level.grid.get(Pos::new(1, 1)).expect("tile").has_entity);
        assert!(level.grid.get(Pos::new(3, 3)).expect("tile").has_entity);
    }
}
