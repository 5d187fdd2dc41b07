//! Field-of-view calculation by recursive shadow-casting.
//! Walls and closed doors stop light; discovery flags are permanent, visibility is per query.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::grid::Grid;
use crate::types::Pos;

/// Octant transforms as `[xx, xy, yx, yy]`.
const OCTANTS: [[i32; 4]; 8] = [
    [1, 0, 0, 1],
    [0, 1, 1, 0],
    [0, -1, 1, 0],
    [-1, 0, 0, 1],
    [-1, 0, 0, -1],
    [0, -1, -1, 0],
    [0, 1, -1, 0],
    [1, 0, 0, -1],
];

struct CachedView {
    origin: Pos,
    radius: i32,
    visible: BTreeSet<Pos>,
}

/// Visibility engine holding the last `(origin, radius)` result.
#[derive(Default)]
pub struct FieldOfView {
    cache: Option<CachedView>,
}

impl FieldOfView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every tile visible from `origin` as visible and discovered.
    ///
    /// Repeating the previous `(origin, radius)` returns the cached set untouched;
    /// call [`FieldOfView::invalidate`] after editing the grid.
    pub fn compute_visible(
        &mut self,
        grid: &mut Grid,
        origin: Pos,
        radius: i32,
    ) -> Result<&BTreeSet<Pos>> {
        grid.check_bounds(origin)?;
        let view = match self.cache.take() {
            Some(cached) if cached.origin == origin && cached.radius == radius => cached,
            _ => CachedView { origin, radius, visible: cast_light(grid, origin, radius) },
        };
        Ok(&self.cache.insert(view).visible)
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }
}

fn cast_light(grid: &mut Grid, origin: Pos, radius: i32) -> BTreeSet<Pos> {
    let mut visible = BTreeSet::from([origin]);
    if radius > 0 {
        // Nothing lies farther than the grid's width plus height.
        let reach = (grid.width() + grid.height()).min(i32::MAX as usize) as i32;
        for transform in OCTANTS {
            let octant = Octant { grid, origin, radius: radius.min(reach), transform };
            octant.scan(1, 1.0, 0.0, &mut visible);
        }
    }

    grid.clear_visible();
    for &pos in &visible {
        grid.mark_seen(pos);
    }
    log::trace!("{} tiles visible from {origin:?} at radius {radius}", visible.len());
    visible
}

/// One eighth of the view around `origin`, mapped onto the grid by `[xx, xy, yx, yy]`.
struct Octant<'a> {
    grid: &'a Grid,
    origin: Pos,
    radius: i32,
    transform: [i32; 4],
}

impl Octant<'_> {
    fn to_grid(&self, dx: i32, dy: i32) -> Pos {
        let [xx, xy, yx, yy] = self.transform;
        Pos { y: self.origin.y + dx * yx + dy * yy, x: self.origin.x + dx * xx + dy * xy }
    }

    /// Sweeps rows `row..=radius` between `start_slope` and `end_slope`.
    fn scan(&self, row: i32, mut start_slope: f64, end_slope: f64, visible: &mut BTreeSet<Pos>) {
        if start_slope < end_slope {
            return;
        }
        let radius_squared = i64::from(self.radius) * i64::from(self.radius);
        let mut next_start_slope = start_slope;

        for distance in row..=self.radius {
            let dy = -distance;
            let mut blocked = false;
            for dx in -distance..=0 {
                let left_slope = (f64::from(dx) - 0.5) / (f64::from(dy) + 0.5);
                let right_slope = (f64::from(dx) + 0.5) / (f64::from(dy) - 0.5);
                if start_slope < right_slope {
                    continue;
                }
                if end_slope > left_slope {
                    break;
                }

                let pos = self.to_grid(dx, dy);
                let (wide_dx, wide_dy) = (i64::from(dx), i64::from(dy));
                if wide_dx * wide_dx + wide_dy * wide_dy <= radius_squared
                    && self.grid.in_bounds(pos)
                {
                    visible.insert(pos);
                }

                let opaque = self.grid.blocks_sight(pos);
                if blocked {
                    if opaque {
                        next_start_slope = right_slope;
                    } else {
                        blocked = false;
                        start_slope = next_start_slope;
                    }
                } else if opaque && distance < self.radius {
                    blocked = true;
                    self.scan(distance + 1, start_slope, left_slope, visible);
                    next_start_slope = right_slope;
                }
            }
            if blocked {
                break;
            }
        }
    }
}
