//! Item distribution: clones templates out of an immutable loot table and rescales them per depth.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::error::{DungeonError, Result};
use crate::grid::Grid;
use crate::types::{ItemId, Pos, TileKind};

use super::progression;
use super::seed::DungeonRng;

const STAT_JITTER: f64 = 0.2;
const GUARANTEED_ROLLS: [(ItemCategory, f64); 3] =
    [(ItemCategory::Weapon, 0.7), (ItemCategory::BodyArmor, 0.6), (ItemCategory::Helmet, 0.5)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Weapon,
    BodyArmor,
    Helmet,
    Shield,
    Ring,
    Potion,
    Scroll,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootTemplate {
    pub name: String,
    pub category: ItemCategory,
    pub base_stat: i32,
}

/// Ordered template pool; JSON form is a plain array of templates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LootTable {
    templates: Vec<LootTemplate>,
}

impl LootTable {
    pub fn new(templates: Vec<LootTemplate>) -> Self {
        Self { templates }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn templates(&self) -> &[LootTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn by_category(&self, category: ItemCategory) -> Vec<&LootTemplate> {
        self.templates.iter().filter(|template| template.category == category).collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            Rarity::Common => None,
            Rarity::Uncommon => Some("Fine"),
            Rarity::Rare => Some("Superior"),
            Rarity::Epic => Some("Exquisite"),
            Rarity::Legendary => Some("Mythic"),
        }
    }

    fn roll(depth: u32, rng: &mut DungeonRng) -> Self {
        let score = rng.unit() * progression::rarity_score_scale(depth);
        match score {
            s if s < 0.5 => Rarity::Uncommon,
            s if s < 0.8 => Rarity::Rare,
            s if s < 0.95 => Rarity::Epic,
            _ => Rarity::Legendary,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusAttribute {
    Strength,
    Dexterity,
    Vitality,
    Insight,
    Luck,
}

impl BonusAttribute {
    pub const ALL: [BonusAttribute; 5] = [
        BonusAttribute::Strength,
        BonusAttribute::Dexterity,
        BonusAttribute::Vitality,
        BonusAttribute::Insight,
        BonusAttribute::Luck,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonus {
    pub attribute: BonusAttribute,
    pub value: i32,
}

/// A template after depth scaling, before it is given a tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScaledLoot {
    pub name: String,
    pub category: ItemCategory,
    pub stat: i32,
    pub rarity: Rarity,
    pub bonus: Option<Bonus>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub id: ItemId,
    /// Name of the template this item was cloned from.
    pub template: String,
    pub name: String,
    pub category: ItemCategory,
    pub stat: i32,
    pub rarity: Rarity,
    pub bonus: Option<Bonus>,
    pub pos: Pos,
}

pub fn scale_template(template: &LootTemplate, depth: u32, rng: &mut DungeonRng) -> ScaledLoot {
    let jitter = rng.range_f64(-STAT_JITTER, STAT_JITTER);
    let multiplier = progression::item_stat_multiplier(depth, jitter);
    let stat = ((f64::from(template.base_stat) * multiplier).floor() as i32).max(1);

    let mut name = template.name.clone();
    let mut rarity = Rarity::Common;
    let mut bonus = None;
    if rng.chance(progression::item_bonus_chance(depth)) {
        let attribute = *rng.pick(&BonusAttribute::ALL).unwrap_or(&BonusAttribute::Luck);
        let value = rng.range_i32(1, 1 + (depth / 3) as i32);
        bonus = Some(Bonus { attribute, value });
        rarity = Rarity::roll(depth, rng);
        if let Some(prefix) = rarity.prefix() {
            name = format!("{prefix} {name}");
        }
    }

    ScaledLoot { name, category: template.category, stat, rarity, bonus }
}

/// Places `min(3 + depth/2 + difficulty/20, 20)` items; a full grid just places fewer.
pub fn distribute_items(
    grid: &mut Grid,
    items: &mut SlotMap<ItemId, PlacedItem>,
    depth: u32,
    difficulty: u8,
    table: &LootTable,
    rng: &mut DungeonRng,
) -> Result<usize> {
    if table.is_empty() {
        log::warn!("item distribution skipped on depth {depth}: loot pool is empty");
        return Err(DungeonError::EmptyLootPool);
    }

    let target = progression::item_count(depth, difficulty);
    let mut picks: Vec<&LootTemplate> = Vec::with_capacity(target);
    for (category, probability) in GUARANTEED_ROLLS {
        if picks.len() >= target {
            break;
        }
        let matching = table.by_category(category);
        if !matching.is_empty()
            && rng.chance(probability)
            && let Some(template) = rng.pick(&matching)
        {
            picks.push(*template);
        }
    }
    while picks.len() < target {
        let Some(template) = rng.pick(table.templates()) else {
            break;
        };
        picks.push(template);
    }

    let mut free_tiles = free_floor_tiles(grid);
    rng.shuffle(&mut free_tiles);

    let mut placed = 0;
    for template in picks {
        let Some(pos) = free_tiles.pop() else {
            break;
        };
        let scaled = scale_template(template, depth, rng);
        items.insert_with_key(|id| PlacedItem {
            id,
            template: template.name.clone(),
            name: scaled.name,
            category: scaled.category,
            stat: scaled.stat,
            rarity: scaled.rarity,
            bonus: scaled.bonus,
            pos,
        });
        if let Some(tile) = grid.get_mut(pos) {
            tile.has_item = true;
        }
        placed += 1;
    }
    log::debug!("placed {placed} of {target} items on depth {depth}");
    Ok(placed)
}

/// Plain floor with neither an item nor an entity on it.
fn free_floor_tiles(grid: &Grid) -> Vec<Pos> {
    grid.positions()
        .filter(|&pos| {
            grid.get(pos).is_some_and(|tile| {
                tile.kind == TileKind::Floor && !tile.has_item && !tile.has_entity
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::test_support::sample_loot_table;

    fn sword() -> LootTemplate {
        LootTemplate { name: "Sword".to_string(), category: ItemCategory::Weapon, base_stat: 10 }
    }

    #[test]
    fn scaling_with_a_fixed_seed_is_deterministic() {
        let template = sword();
        let first = scale_template(&template, 6, &mut DungeonRng::new(42));
        let second = scale_template(&template, 6, &mut DungeonRng::new(42));
        assert_eq!(first, second);
        assert_eq!(template, sword(), "the template itself is never mutated");
    }

    #[test]
    fn scaled_stat_stays_inside_jitter_band() {
        let template = sword();
        let mut rng = DungeonRng::new(9);
        for _ in 0..200 {
            let scaled = scale_template(&template, 5, &mut rng);
            assert!(
                (13..=17).contains(&scaled.stat),
                "stat {} outside 10 * (1.5 +- 0.2)",
                scaled.stat
            );
        }
    }

    #[test]
    fn stat_never_drops_below_one() {
        let weak =
            LootTemplate { name: "Twig".to_string(), category: ItemCategory::Weapon, base_stat: 0 };
        let scaled = scale_template(&weak, 0, &mut DungeonRng::new(1));
        assert_eq!(scaled.stat, 1);
    }

    #[test]
    fn bonus_items_carry_a_rarity_prefix() {
        let template = sword();
        let mut rng = DungeonRng::new(77);
        let mut saw_bonus = false;
        for _ in 0..100 {
            let scaled = scale_template(&template, 30, &mut rng);
            match scaled.bonus {
                Some(bonus) => {
                    saw_bonus = true;
                    assert_ne!(scaled.rarity, Rarity::Common);
                    assert!((1..=11).contains(&bonus.value));
                    let prefix = scaled.rarity.prefix().expect("non-common rarity has a prefix");
                    assert_eq!(scaled.name, format!("{prefix} Sword"));
                }
                None => {
                    assert_eq!(scaled.rarity, Rarity::Common);
                    assert_eq!(scaled.name, "Sword");
                }
            }
        }
        assert!(saw_bonus, "depth 30 bonus chance is 0.9");
    }

    #[test]
    fn items_get_unique_ids_and_distinct_floor_tiles() {
        let mut grid = Grid::open(30, 20);
        let mut items = SlotMap::with_key();
        let table = sample_loot_table();
        let placed = distribute_items(&mut grid, &mut items, 8, 60, &table, &mut DungeonRng::new(3))
            .expect("pool is non-empty");

        assert_eq!(placed, progression::item_count(8, 60));
        let ids: BTreeSet<_> = items.iter().map(|(id, item)| (id, item.id)).collect();
        assert!(ids.iter().all(|(key, stored)| key == stored));
        let tiles: BTreeSet<Pos> = items.values().map(|item| item.pos).collect();
        assert_eq!(tiles.len(), placed);
        assert!(tiles.iter().all(|&pos| grid.get(pos).is_some_and(|tile| tile.has_item)));
    }

    #[test]
    fn occupied_tiles_are_skipped() {
        let mut grid = Grid::new(5, 5);
        grid.set_kind(Pos::new(1, 1), TileKind::Floor);
        grid.set_kind(Pos::new(2, 1), TileKind::Floor);
        if let Some(tile) = grid.get_mut(Pos::new(1, 1)) {
            tile.has_entity = true;
        }
        let mut items = SlotMap::with_key();
        let table = sample_loot_table();
        let placed = distribute_items(&mut grid, &mut items, 1, 0, &table, &mut DungeonRng::new(0))
            .expect("pool is non-empty");
        assert_eq!(placed, 1);
        assert_eq!(items.values().next().map(|item| item.pos), Some(Pos::new(2, 1)));
    }

    #[test]
    fn empty_pool_is_an_error() {
        let mut grid = Grid::open(10, 10);
        let mut items = SlotMap::with_key();
        let table = LootTable::default();
        let result = distribute_items(&mut grid, &mut items, 1, 0, &table, &mut DungeonRng::new(0));
        assert!(matches!(result, Err(DungeonError::EmptyLootPool)));
        assert!(items.is_empty());
    }

    #[test]
    fn loot_table_parses_json_array() {
        let table = LootTable::from_json(
            r#"[
                {"name": "Cap", "category": "helmet", "base_stat": 2},
                {"name": "Club", "category": "weapon", "base_stat": 4}
            ]"#,
        )
        .expect("valid json");
        assert_eq!(table.len(), 2);
        assert_eq!(table.by_category(ItemCategory::Helmet)[0].name, "Cap");
        assert!(matches!(LootTable::from_json("{"), Err(DungeonError::LootTable(_))));
    }

    #[test]
    fn loot_table_loads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("loot.json");
        let json = serde_json::to_string(&sample_loot_table()).expect("serialize");
        fs::write(&path, json).expect("write");
        assert_eq!(LootTable::load(&path).expect("load"), sample_loot_table());
    }
}
