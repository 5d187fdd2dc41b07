//! Depth and difficulty scaling rules used by map generation.

use crate::types::TrapKind;

pub const MAX_DIFFICULTY: u8 = 100;

const MAX_DOORS: usize = 12;
const MAX_TRAPS: usize = 15;
const MAX_ITEMS: usize = 20;

pub(super) fn special_room_chance(depth: u32) -> f64 {
    (0.05 + 0.01 * f64::from(depth)).min(0.3)
}

pub(super) fn door_budget(depth: u32) -> usize {
    (3 + depth as usize).min(MAX_DOORS)
}

pub(super) fn secret_door_chance(depth: u32) -> f64 {
    0.10 + (0.01 * f64::from(depth)).min(0.10)
}

pub(super) fn locked_door_chance(depth: u32) -> f64 {
    0.20 + (0.02 * f64::from(depth)).min(0.15)
}

pub(super) fn trap_count(depth: u32, difficulty: u8) -> usize {
    (1 + depth as usize / 2 + usize::from(difficulty) / 25).min(MAX_TRAPS)
}

pub(super) fn trap_damage_range(depth: u32) -> (u32, u32) {
    (2 + depth, 5 + 2 * depth)
}

pub(super) fn trap_hidden_chance(depth: u32) -> f64 {
    (0.3 + 0.05 * f64::from(depth)).min(0.8)
}

/// Trap kinds unlocked at `depth`; only spikes on the shallowest floors.
pub(super) fn trap_pool(depth: u32) -> Vec<TrapKind> {
    let mut pool = vec![TrapKind::Spike];
    if depth >= 3 {
        pool.push(TrapKind::Poison);
    }
    if depth >= 5 {
        pool.push(TrapKind::Alarm);
    }
    if depth >= 7 {
        pool.push(TrapKind::Teleport);
    }
    if depth >= 9 {
        pool.push(TrapKind::Confusion);
    }
    pool
}

pub(super) fn item_count(depth: u32, difficulty: u8) -> usize {
    (3 + depth as usize / 2 + usize::from(difficulty) / 20).min(MAX_ITEMS)
}

pub(super) fn item_stat_multiplier(depth: u32, jitter: f64) -> f64 {
    1.0 + 0.1 * f64::from(depth) + jitter
}

pub(super) fn item_bonus_chance(depth: u32) -> f64 {
    (0.1 + 0.03 * f64::from(depth)).min(0.9)
}

/// Stretches the rarity roll so deeper floors reach the upper tiers more often.
pub(super) fn rarity_score_scale(depth: u32) -> f64 {
    1.0 + 0.04 * f64::from(depth.min(25))
}

pub(super) fn shop_room_chance(room_count: usize) -> f64 {
    if room_count >= 4 { 0.15 } else { 0.0 }
}

pub(super) fn secret_room_chance(depth: u32) -> f64 {
    (0.1 + 0.01 * f64::from(depth)).min(0.5)
}

pub(super) fn has_boss_room(depth: u32) -> bool {
    depth > 0 && depth % 5 == 0
}
