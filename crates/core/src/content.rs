use crate::mapgen::loot::{ItemCategory, LootTable, LootTemplate};

pub mod keys {
    pub const WEAPON_RUSTY_SWORD: &str = "Rusty Sword";
    pub const WEAPON_IRON_MACE: &str = "Iron Mace";
    pub const WEAPON_STEEL_LONGSWORD: &str = "Steel Longsword";
    pub const WEAPON_BONE_DAGGER: &str = "Bone Dagger";

    pub const ARMOR_PADDED_VEST: &str = "Padded Vest";
    pub const ARMOR_CHAIN_SHIRT: &str = "Chain Shirt";
    pub const HELMET_LEATHER_CAP: &str = "Leather Cap";
    pub const HELMET_IRON_HELM: &str = "Iron Helm";
    pub const SHIELD_BUCKLER: &str = "Buckler";
    pub const SHIELD_TOWER: &str = "Tower Shield";

    pub const RING_COPPER_BAND: &str = "Copper Band";
    pub const RING_SIGNET: &str = "Signet Ring";

    pub const POTION_MINOR_HEALING: &str = "Minor Healing Potion";
    pub const POTION_MAJOR_HEALING: &str = "Major Healing Potion";
    pub const SCROLL_MAPPING: &str = "Scroll of Mapping";
    pub const SCROLL_TELEPORT: &str = "Scroll of Teleport";
}

/// Loot pool used when no table file is supplied.
pub fn starter_loot_table() -> LootTable {
    let entry = |name: &str, category, base_stat| LootTemplate {
        name: name.to_string(),
        category,
        base_stat,
    };
    LootTable::new(vec![
        entry(keys::WEAPON_RUSTY_SWORD, ItemCategory::Weapon, 3),
        entry(keys::WEAPON_IRON_MACE, ItemCategory::Weapon, 5),
        entry(keys::WEAPON_STEEL_LONGSWORD, ItemCategory::Weapon, 7),
        entry(keys::WEAPON_BONE_DAGGER, ItemCategory::Weapon, 2),
        entry(keys::ARMOR_PADDED_VEST, ItemCategory::BodyArmor, 2),
        entry(keys::ARMOR_CHAIN_SHIRT, ItemCategory::BodyArmor, 4),
        entry(keys::HELMET_LEATHER_CAP, ItemCategory::Helmet, 1),
        entry(keys::HELMET_IRON_HELM, ItemCategory::Helmet, 2),
        entry(keys::SHIELD_BUCKLER, ItemCategory::Shield, 1),
        entry(keys::SHIELD_TOWER, ItemCategory::Shield, 3),
        entry(keys::RING_COPPER_BAND, ItemCategory::Ring, 1),
        entry(keys::RING_SIGNET, ItemCategory::Ring, 2),
        entry(keys::POTION_MINOR_HEALING, ItemCategory::Potion, 10),
        entry(keys::POTION_MAJOR_HEALING, ItemCategory::Potion, 25),
        entry(keys::SCROLL_MAPPING, ItemCategory::Scroll, 0),
        entry(keys::SCROLL_TELEPORT, ItemCategory::Scroll, 0),
    ])
}
