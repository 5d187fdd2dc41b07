//! Deterministic movement queries: A* search, line of sight, path smoothing, and flee targets.
//! Consumed by enemy movement and by reachability checks against a finished level.

pub mod queue;

use std::collections::BTreeSet;
use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::Grid;
use crate::types::Pos;

use self::queue::IndexedHeap;

pub const MAX_FLEE_DISTANCE: i32 = 10;

const ORTHOGONAL_STEPS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const DIAGONAL_STEPS: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOptions {
    pub allow_diagonal: bool,
    pub allow_corner_cutting: bool,
    /// Values above 1.0 trade optimality for fewer expansions.
    pub heuristic_weight: f64,
    pub max_iterations: usize,
    pub avoid_occupied: bool,
    pub allow_occupied_goal: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            allow_diagonal: true,
            allow_corner_cutting: false,
            heuristic_weight: 1.0,
            max_iterations: 10_000,
            avoid_occupied: true,
            allow_occupied_goal: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Start and goal inclusive.
    pub steps: Vec<Pos>,
    pub cost: f64,
}

impl Path {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn goal(&self) -> Option<Pos> {
        self.steps.last().copied()
    }
}

/// A* pathfinder carrying the caller-refreshed set of occupied tiles.
#[derive(Clone, Debug, Default)]
pub struct Pathfinder {
    occupied: BTreeSet<Pos>,
}

impl Pathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the occupancy cache; call before any query whose entities moved.
    pub fn refresh_occupancy(&mut self, positions: impl IntoIterator<Item = Pos>) {
        self.occupied = positions.into_iter().collect();
    }

    pub fn is_occupied(&self, pos: Pos) -> bool {
        self.occupied.contains(&pos)
    }

    pub fn find_path(
        &self,
        grid: &Grid,
        start: Pos,
        goal: Pos,
        options: &PathOptions,
    ) -> Result<Option<Path>> {
        grid.check_bounds(start)?;
        grid.check_bounds(goal)?;
        if start == goal {
            return Ok(Some(Path { steps: vec![start], cost: 0.0 }));
        }
        if !grid.is_walkable(goal) || !self.can_enter(grid, goal, goal, options) {
            return Ok(None);
        }

        let (Some(start_index), Some(goal_index)) = (grid.index(start), grid.index(goal)) else {
            return Ok(None);
        };
        let tile_count = grid.tiles().len();
        let mut g_score = vec![f64::INFINITY; tile_count];
        let mut came_from: Vec<Option<usize>> = vec![None; tile_count];
        let mut closed = vec![false; tile_count];
        let mut open = IndexedHeap::new();

        g_score[start_index] = 0.0;
        let start_h = heuristic(start, goal, options);
        open.push_or_decrease(start_index, start_h, start_h);

        let mut iterations = 0;
        while let Some((current_index, _)) = open.pop() {
            if current_index == goal_index {
                let steps = reconstruct_path(grid, &came_from, start_index, goal_index);
                return Ok(Some(Path { steps, cost: g_score[goal_index] }));
            }
            iterations += 1;
            if iterations > options.max_iterations {
                log::trace!(
                    "A* from {start:?} to {goal:?} gave up after {} expansions",
                    options.max_iterations
                );
                return Ok(None);
            }
            closed[current_index] = true;

            let current = grid.pos_of(current_index);
            for (next, base_cost) in self.successors(grid, current, goal, options) {
                let Some(next_index) = grid.index(next) else {
                    continue;
                };
                if closed[next_index] {
                    continue;
                }
                let tentative = g_score[current_index] + base_cost * grid.kind_at(next).move_cost();
                if tentative < g_score[next_index] {
                    g_score[next_index] = tentative;
                    came_from[next_index] = Some(current_index);
                    let h = heuristic(next, goal, options);
                    open.push_or_decrease(next_index, tentative + h, h);
                }
            }
        }
        Ok(None)
    }

    /// Paths toward a point up to `distance` tiles directly away from `threat`.
    pub fn flee_path(
        &self,
        grid: &Grid,
        from: Pos,
        threat: Pos,
        distance: i32,
        options: &PathOptions,
    ) -> Result<Option<Path>> {
        grid.check_bounds(from)?;
        grid.check_bounds(threat)?;
        if from == threat {
            return Ok(None);
        }

        let away_x = f64::from(from.x - threat.x);
        let away_y = f64::from(from.y - threat.y);
        let length = away_x.hypot(away_y);
        let reach = f64::from(distance.clamp(0, MAX_FLEE_DISTANCE));
        let max_x = grid.width().saturating_sub(1) as i32;
        let max_y = grid.height().saturating_sub(1) as i32;
        let target = Pos {
            y: (from.y + (away_y / length * reach).round() as i32).clamp(0, max_y),
            x: (from.x + (away_x / length * reach).round() as i32).clamp(0, max_x),
        };

        let Some(refuge) = nearest_walkable(grid, target, MAX_FLEE_DISTANCE)? else {
            return Ok(None);
        };
        self.find_path(grid, from, refuge, options)
    }

    fn can_enter(&self, grid: &Grid, pos: Pos, goal: Pos, options: &PathOptions) -> bool {
        if !grid.is_walkable(pos) {
            return false;
        }
        if options.avoid_occupied && self.is_occupied(pos) {
            return pos == goal && options.allow_occupied_goal;
        }
        true
    }

    fn successors(
        &self,
        grid: &Grid,
        current: Pos,
        goal: Pos,
        options: &PathOptions,
    ) -> Vec<(Pos, f64)> {
        let mut next_steps = Vec::with_capacity(8);
        for (dx, dy) in ORTHOGONAL_STEPS {
            let next = current.offset(dx, dy);
            if self.can_enter(grid, next, goal, options) {
                next_steps.push((next, 1.0));
            }
        }
        if options.allow_diagonal {
            for (dx, dy) in DIAGONAL_STEPS {
                let next = current.offset(dx, dy);
                if !self.can_enter(grid, next, goal, options) {
                    continue;
                }
                let corner_clear = grid.is_walkable(current.offset(dx, 0))
                    && grid.is_walkable(current.offset(0, dy));
                if options.allow_corner_cutting || corner_clear {
                    next_steps.push((next, SQRT_2));
                }
            }
        }
        next_steps
    }
}

/// Octile distance with diagonals, Manhattan without, scaled by the heuristic weight.
pub fn heuristic(from: Pos, to: Pos, options: &PathOptions) -> f64 {
    let dx = f64::from(from.x.abs_diff(to.x));
    let dy = f64::from(from.y.abs_diff(to.y));
    let distance = if options.allow_diagonal {
        dx + dy + (SQRT_2 - 2.0) * dx.min(dy)
    } else {
        dx + dy
    };
    distance * options.heuristic_weight
}

fn reconstruct_path(
    grid: &Grid,
    came_from: &[Option<usize>],
    start_index: usize,
    goal_index: usize,
) -> Vec<Pos> {
    let mut steps = vec![grid.pos_of(goal_index)];
    let mut cursor = goal_index;
    while cursor != start_index {
        let Some(previous) = came_from[cursor] else {
            break;
        };
        steps.push(grid.pos_of(previous));
        cursor = previous;
    }
    steps.reverse();
    steps
}

/// Bresenham line from `from` to `to`, endpoints excluded from the sight check.
pub fn line_of_sight(grid: &Grid, from: Pos, to: Pos) -> Result<bool> {
    grid.check_bounds(from)?;
    grid.check_bounds(to)?;
    Ok(clear_line(grid, from, to))
}

fn clear_line(grid: &Grid, from: Pos, to: Pos) -> bool {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let step_x = (to.x - from.x).signum();
    let step_y = (to.y - from.y).signum();
    let mut error = dx + dy;
    let mut cursor = from;

    loop {
        if cursor == to {
            return true;
        }
        if cursor != from && grid.blocks_sight(cursor) {
            return false;
        }
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            cursor.x += step_x;
        }
        if doubled <= dx {
            error += dx;
            cursor.y += step_y;
        }
    }
}

/// Drops waypoints that the farthest visible later waypoint makes redundant.
pub fn smooth_path(grid: &Grid, path: &Path) -> Path {
    if path.steps.len() <= 2 {
        return path.clone();
    }

    let last = path.steps.len() - 1;
    let mut steps = vec![path.steps[0]];
    let mut anchor = 0;
    while anchor < last {
        let mut reach = anchor + 1;
        for candidate in (anchor + 2..=last).rev() {
            if clear_line(grid, path.steps[anchor], path.steps[candidate]) {
                reach = candidate;
                break;
            }
        }
        steps.push(path.steps[reach]);
        anchor = reach;
    }

    let cost = steps
        .windows(2)
        .map(|segment| (segment[0].distance_squared(segment[1]) as f64).sqrt())
        .sum();
    Path { steps, cost }
}

/// Closest walkable tile within `max_radius` rings of `pos`, ties by `(y, x)`.
pub fn nearest_walkable(grid: &Grid, pos: Pos, max_radius: i32) -> Result<Option<Pos>> {
    grid.check_bounds(pos)?;
    if grid.is_walkable(pos) {
        return Ok(Some(pos));
    }

    for ring in 1..=max_radius {
        let mut best: Option<(i64, Pos)> = None;
        for dy in -ring..=ring {
            for dx in -ring..=ring {
                if dx.abs() != ring && dy.abs() != ring {
                    continue;
                }
                let candidate = pos.offset(dx, dy);
                if !grid.is_walkable(candidate) {
                    continue;
                }
                let key = (candidate.distance_squared(pos), candidate);
                if best.is_none_or(|current| key < current) {
                    best = Some(key);
                }
            }
        }
        if let Some((_, found)) = best {
            return Ok(Some(found));
        }
    }
    Ok(None)
}
