//! Grid search helpers used by layout, feature placement, and the orchestrator.

use std::collections::{BTreeSet, VecDeque};

use crate::grid::Grid;
use crate::types::{Pos, TileKind};

pub(crate) fn manhattan(a: Pos, b: Pos) -> u32 {
    a.manhattan(b)
}

pub(crate) fn map_center(grid: &Grid) -> Pos {
    Pos { y: (grid.height() / 2) as i32, x: (grid.width() / 2) as i32 }
}

/// Closest plain floor tile to `desired`, ties broken by lowest `(y, x)`.
pub(crate) fn nearest_floor_tile(grid: &Grid, desired: Pos, exclude: &[Pos]) -> Option<Pos> {
    if grid.is_floor(desired) && !exclude.contains(&desired) {
        return Some(desired);
    }

    let mut best: Option<(u32, Pos)> = None;
    for pos in grid.positions() {
        if !grid.is_floor(pos) || exclude.contains(&pos) {
            continue;
        }
        let distance = manhattan(pos, desired);
        let should_replace = match best {
            None => true,
            Some((best_distance, best_pos)) => {
                distance < best_distance
                    || (distance == best_distance && (pos.y, pos.x) < (best_pos.y, best_pos.x))
            }
        };
        if should_replace {
            best = Some((distance, pos));
        }
    }
    best.map(|(_, pos)| pos)
}

/// Tiles reachable from `start` through 4-connected tiles accepted by `passable`.
pub(crate) fn flood_fill(
    grid: &Grid,
    start: Pos,
    passable: impl Fn(TileKind) -> bool,
) -> BTreeSet<Pos> {
    let mut seen = BTreeSet::new();
    if !passable(grid.kind_at(start)) {
        return seen;
    }
    let mut open = VecDeque::from([start]);
    seen.insert(start);
    while let Some(pos) = open.pop_front() {
        for next in pos.orthogonal_neighbors() {
            if grid.in_bounds(next) && passable(grid.kind_at(next)) && seen.insert(next) {
                open.push_back(next);
            }
        }
    }
    seen
}

/// Anything carved out of the rock counts, regardless of lock state.
pub(crate) fn is_open_ground(kind: TileKind) -> bool {
    kind != TileKind::Wall
}
