//! Tile storage shared by generation and both query services.

use serde::{Deserialize, Serialize};

use crate::error::{DungeonError, Result};
use crate::types::{FloorStyle, Pos, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub discovered: bool,
    pub visible: bool,
    pub style: FloorStyle,
    pub has_item: bool,
    pub has_entity: bool,
}

impl Tile {
    pub const WALL: Tile = Tile {
        kind: TileKind::Wall,
        discovered: false,
        visible: false,
        style: FloorStyle::Stone,
        has_item: false,
        has_entity: false,
    };

    pub fn is_walkable(&self) -> bool {
        self.kind.is_walkable()
    }

    pub fn blocks_sight(&self) -> bool {
        self.kind.blocks_sight()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// A grid filled entirely with wall.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, tiles: vec![Tile::WALL; width * height] }
    }

    /// A grid with a wall border and floor everywhere else.
    pub fn open(width: usize, height: usize) -> Self {
        let mut grid = Self::new(width, height);
        for y in 1..height.saturating_sub(1) {
            for x in 1..width.saturating_sub(1) {
                grid.tiles[y * width + x].kind = TileKind::Floor;
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Whether `pos` lies strictly inside the outer wall ring.
    pub fn in_interior(&self, pos: Pos) -> bool {
        pos.x >= 1
            && pos.y >= 1
            && (pos.x as usize) < self.width.saturating_sub(1)
            && (pos.y as usize) < self.height.saturating_sub(1)
    }

    pub fn check_bounds(&self, pos: Pos) -> Result<()> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(DungeonError::OutOfBounds { pos, width: self.width, height: self.height })
        }
    }

    pub fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }

    pub fn pos_of(&self, index: usize) -> Pos {
        Pos { y: (index / self.width) as i32, x: (index % self.width) as i32 }
    }

    pub fn get(&self, pos: Pos) -> Option<&Tile> {
        self.index(pos).map(|idx| &self.tiles[idx])
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut Tile> {
        self.index(pos).map(move |idx| &mut self.tiles[idx])
    }

    /// Out-of-bounds reads as wall.
    pub fn kind_at(&self, pos: Pos) -> TileKind {
        self.get(pos).map_or(TileKind::Wall, |tile| tile.kind)
    }

    pub fn set_kind(&mut self, pos: Pos, kind: TileKind) {
        if let Some(tile) = self.get_mut(pos) {
            tile.kind = kind;
        }
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.get(pos).is_some_and(Tile::is_walkable)
    }

    pub fn blocks_sight(&self, pos: Pos) -> bool {
        self.get(pos).is_none_or(Tile::blocks_sight)
    }

    pub fn is_floor(&self, pos: Pos) -> bool {
        self.kind_at(pos) == TileKind::Floor
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.kind_at(pos) == TileKind::Wall
    }

    pub fn is_visible(&self, pos: Pos) -> bool {
        self.get(pos).is_some_and(|tile| tile.visible)
    }

    pub fn is_discovered(&self, pos: Pos) -> bool {
        self.get(pos).is_some_and(|tile| tile.discovered)
    }

    pub fn mark_seen(&mut self, pos: Pos) {
        if let Some(tile) = self.get_mut(pos) {
            tile.visible = true;
            tile.discovered = true;
        }
    }

    pub fn clear_visible(&mut self) {
        for tile in &mut self.tiles {
            tile.visible = false;
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Every in-bounds position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.tiles.len()).map(|idx| self.pos_of(idx))
    }

    pub fn floor_positions(&self) -> Vec<Pos> {
        self.positions().filter(|&pos| self.is_floor(pos)).collect()
    }
}
