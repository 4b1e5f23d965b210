//! Static game data: item, enemy, spell, effect, recipe and quest templates.
//!
//! The catalog is read-only at runtime. `Catalog::builtin()` carries the stock
//! content; `seed_loader` can replace individual tables from JSON files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rpg::errors::GameError;
use crate::rpg::quest::{ObjectiveKind, QuestDef, QuestObjective, QuestReward};
use crate::rpg::types::{EquipSlot, ItemKind, Stat, StatBonuses};

/// What a consumable does when used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum UseEffect {
    Heal(i32),
    RestoreMana(i32),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemTemplate {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub price: i32,
    #[serde(default)]
    pub equip_slot: Option<EquipSlot>,
    #[serde(default)]
    pub max_durability: Option<u32>,
    #[serde(default)]
    pub stats: StatBonuses,
    #[serde(default)]
    pub mining_bonus: i32,
    #[serde(default)]
    pub use_effect: Option<UseEffect>,
}

impl ItemTemplate {
    fn new(id: &str, name: &str, kind: ItemKind, price: i32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            price,
            equip_slot: None,
            max_durability: None,
            stats: StatBonuses::new(),
            mining_bonus: 0,
            use_effect: None,
        }
    }

    fn with_slot(mut self, slot: EquipSlot) -> Self {
        self.equip_slot = Some(slot);
        self
    }

    fn with_durability(mut self, max: u32) -> Self {
        self.max_durability = Some(max);
        self
    }

    fn with_stat(mut self, stat: Stat, value: i32) -> Self {
        self.stats.insert(stat, value);
        self
    }

    fn with_mining_bonus(mut self, bonus: i32) -> Self {
        self.mining_bonus = bonus;
        self
    }

    fn with_use_effect(mut self, effect: UseEffect) -> Self {
        self.use_effect = Some(effect);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RarityTier {
    pub name: String,
    pub chance: f64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DropEntry {
    pub item_id: String,
    pub chance: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DamageKind {
    #[default]
    Physical,
    Fire,
    Frost,
    Lightning,
    Holy,
    Necrotic,
    Poison,
}

/// An effect a hit may inflict, rolled independently per hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectApplication {
    pub effect_id: String,
    pub turns: u32,
    pub chance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnemyStats {
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub gold: i32,
    pub xp: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub stats: EnemyStats,
    #[serde(default)]
    pub drops: Vec<DropEntry>,
    #[serde(default)]
    pub damage_type: DamageKind,
    #[serde(default)]
    pub inflicts: Option<EffectApplication>,
}

impl EnemyTemplate {
    /// Stat overlay used when a shapeshifter takes this creature's form.
    /// Rewards (gold, xp) are not stats and current health is never merged.
    pub fn form_bonuses(&self) -> StatBonuses {
        let mut bonuses = StatBonuses::new();
        bonuses.insert(Stat::MaxHealth, self.stats.max_health);
        bonuses.insert(Stat::Attack, self.stats.attack);
        bonuses.insert(Stat::Defense, self.stats.defense);
        bonuses
    }
}

/// Damage profile shared by every spell in a destruction category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DamageType {
    pub name: String,
    pub kind: DamageKind,
    pub mana_cost: i32,
    pub base_damage: i32,
    #[serde(default)]
    pub inflicts: Option<EffectApplication>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EffectDef {
    pub name: String,
    #[serde(default)]
    pub damage_per_turn: i32,
    #[serde(default)]
    pub prevents_action: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipe {
    pub output: String,
    pub station: String,
    pub materials: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub items: BTreeMap<String, ItemTemplate>,
    pub enemies: BTreeMap<String, EnemyTemplate>,
    /// Destruction category -> spells in that category.
    pub spell_categories: BTreeMap<String, Vec<String>>,
    /// Destruction category -> damage profile.
    pub damage_types: BTreeMap<String, DamageType>,
    pub effects: BTreeMap<String, EffectDef>,
    /// Output item id -> recipe.
    pub recipes: BTreeMap<String, Recipe>,
    pub quests: BTreeMap<String, QuestDef>,
    pub rarities: Vec<RarityTier>,
    pub fallback_rarity: String,
    pub metals: Vec<String>,
    pub bladed_types: Vec<String>,
    pub prospecting: Vec<DropEntry>,
}

impl Catalog {
    pub fn item(&self, id: &str) -> Result<&ItemTemplate, GameError> {
        self.items
            .get(id)
            .ok_or_else(|| GameError::UnknownTemplate(id.to_string()))
    }

    pub fn item_by_name(&self, name: &str) -> Option<&ItemTemplate> {
        let name = name.trim();
        self.items.values().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn enemy(&self, id: &str) -> Result<&EnemyTemplate, GameError> {
        self.enemies
            .get(id)
            .ok_or_else(|| GameError::UnknownEnemy(id.to_string()))
    }

    pub fn effect(&self, id: &str) -> Result<&EffectDef, GameError> {
        self.effects
            .get(id)
            .ok_or_else(|| GameError::UnknownEffect(id.to_string()))
    }

    /// Damage profile for a spell, found through its destruction category.
    pub fn spell_damage(&self, spell: &str) -> Result<&DamageType, GameError> {
        self.spell_categories
            .iter()
            .find(|(_, spells)| spells.iter().any(|s| s == spell))
            .and_then(|(category, _)| self.damage_types.get(category))
            .ok_or_else(|| GameError::UnknownSpell(spell.to_string()))
    }

    pub fn quest_by_name(&self, name: &str) -> Result<&QuestDef, GameError> {
        let name = name.trim();
        self.quests
            .values()
            .find(|q| q.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| GameError::UnknownQuest(name.to_string()))
    }

    pub fn recipes_for_station<'a>(&'a self, station: &'a str) -> impl Iterator<Item = &'a Recipe> {
        self.recipes.values().filter(move |r| r.station == station)
    }

    pub fn is_bladed(&self, template: &ItemTemplate) -> bool {
        let name = template.name.to_lowercase();
        template.kind == ItemKind::Weapon && self.bladed_types.iter().any(|t| name.contains(t.as_str()))
    }

    /// Ore found on a mine floor, or `None` below the deepest metal band.
    pub fn ore_for_floor(&self, floor: u32) -> Option<String> {
        if floor == 0 {
            return None;
        }
        let metal = self.metals.get(((floor - 1) / 10) as usize)?;
        if metal == "adamant" {
            return Some("adamantite_ore".to_string());
        }
        Some(format!("{}_ore", metal.replace(' ', "_")))
    }

    pub fn builtin() -> Self {
        let mut items = BTreeMap::new();
        let mut add = |t: ItemTemplate| {
            items.insert(t.id.clone(), t);
        };
        add(ItemTemplate::new("torch", "Torch", ItemKind::Misc, 10));
        add(ItemTemplate::new("health_potion", "Health Potion", ItemKind::Consumable, 25)
            .with_use_effect(UseEffect::Heal(25)));
        add(ItemTemplate::new("mana_potion", "Mana Potion", ItemKind::Consumable, 30)
            .with_use_effect(UseEffect::RestoreMana(30)));
        add(ItemTemplate::new("rusty_sword", "Rusty Sword", ItemKind::Weapon, 20)
            .with_slot(EquipSlot::Weapon)
            .with_durability(30)
            .with_stat(Stat::Attack, 2));
        add(ItemTemplate::new("leather_armor", "Leather Armor", ItemKind::Armor, 35)
            .with_slot(EquipSlot::Chest)
            .with_durability(40)
            .with_stat(Stat::Defense, 3));
        add(ItemTemplate::new("leather_cap", "Leather Cap", ItemKind::Armor, 15)
            .with_slot(EquipSlot::Head)
            .with_durability(25)
            .with_stat(Stat::Defense, 1));
        add(ItemTemplate::new("rusty_pickaxe", "Rusty Pickaxe", ItemKind::Tool, 30)
            .with_slot(EquipSlot::Weapon)
            .with_durability(25)
            .with_stat(Stat::Attack, 1)
            .with_mining_bonus(5));
        add(ItemTemplate::new("iron_pickaxe", "Iron Pickaxe", ItemKind::Tool, 60)
            .with_slot(EquipSlot::Weapon)
            .with_durability(60)
            .with_stat(Stat::Attack, 2)
            .with_mining_bonus(15));
        add(ItemTemplate::new("lockpick", "Lockpick", ItemKind::Misc, 5));
        add(ItemTemplate::new("stick", "Stick", ItemKind::Material, 1));
        add(ItemTemplate::new("wooden_club", "Wooden Club", ItemKind::Weapon, 8)
            .with_slot(EquipSlot::Weapon)
            .with_durability(20)
            .with_stat(Stat::Attack, 3));
        add(ItemTemplate::new("iron_bar", "Iron Bar", ItemKind::Material, 12));
        add(ItemTemplate::new("iron_dagger", "Iron Dagger", ItemKind::Weapon, 40)
            .with_slot(EquipSlot::Weapon)
            .with_durability(45)
            .with_stat(Stat::Attack, 4));

        let metals: Vec<String> = [
            "iron",
            "steel",
            "mithril",
            "adamant",
            "titanium",
            "copper",
            "brass",
            "bronze",
            "pig iron",
            "dragonite",
            "celestial steel",
        ]
        .iter()
        .map(|m| m.to_string())
        .collect();
        for metal in &metals {
            let (id, name) = if metal == "adamant" {
                ("adamantite_ore".to_string(), "Adamantite Ore".to_string())
            } else {
                (
                    format!("{}_ore", metal.replace(' ', "_")),
                    format!("{} Ore", title_case(metal)),
                )
            };
            add(ItemTemplate::new(&id, &name, ItemKind::Material, 5));
        }

        let mut enemies = BTreeMap::new();
        enemies.insert(
            "goblin".to_string(),
            EnemyTemplate {
                id: "goblin".into(),
                name: "Goblin".into(),
                description: "A small, green-skinned creature with sharp teeth and a rusty dagger."
                    .into(),
                stats: EnemyStats {
                    health: 30,
                    max_health: 30,
                    attack: 8,
                    defense: 4,
                    gold: 15,
                    xp: 10,
                },
                drops: vec![
                    DropEntry { item_id: "health_potion".into(), chance: 0.25 },
                    DropEntry { item_id: "rusty_sword".into(), chance: 0.05 },
                ],
                damage_type: DamageKind::Physical,
                inflicts: None,
            },
        );
        enemies.insert(
            "skeleton".to_string(),
            EnemyTemplate {
                id: "skeleton".into(),
                name: "Skeleton".into(),
                description: "A rattling heap of yellowed bones, wreathed in a faint necrotic glow."
                    .into(),
                stats: EnemyStats {
                    health: 40,
                    max_health: 40,
                    attack: 11,
                    defense: 5,
                    gold: 20,
                    xp: 18,
                },
                drops: vec![DropEntry { item_id: "iron_dagger".into(), chance: 0.10 }],
                damage_type: DamageKind::Necrotic,
                inflicts: None,
            },
        );
        enemies.insert(
            "cave_spider".to_string(),
            EnemyTemplate {
                id: "cave_spider".into(),
                name: "Cave Spider".into(),
                description: "A pale spider the size of a dog, fangs glistening with venom.".into(),
                stats: EnemyStats {
                    health: 20,
                    max_health: 20,
                    attack: 7,
                    defense: 2,
                    gold: 5,
                    xp: 8,
                },
                drops: Vec::new(),
                damage_type: DamageKind::Poison,
                inflicts: Some(EffectApplication {
                    effect_id: "poison".into(),
                    turns: 3,
                    chance: 0.3,
                }),
            },
        );

        let mut spell_categories = BTreeMap::new();
        spell_categories.insert("fire".to_string(), vec!["fireball".to_string(), "flame lance".to_string()]);
        spell_categories.insert("frost".to_string(), vec!["ice shard".to_string()]);
        spell_categories.insert("lightning".to_string(), vec!["lightning bolt".to_string()]);
        spell_categories.insert("holy".to_string(), vec!["smite".to_string()]);
        spell_categories.insert("necrotic".to_string(), vec!["drain life".to_string()]);

        let mut damage_types = BTreeMap::new();
        let mut damage = |category: &str, kind: DamageKind, mana_cost: i32, base_damage: i32, inflicts: Option<(&str, u32, f64)>| {
            damage_types.insert(
                category.to_string(),
                DamageType {
                    name: category.to_string(),
                    kind,
                    mana_cost,
                    base_damage,
                    inflicts: inflicts.map(|(effect_id, turns, chance)| EffectApplication {
                        effect_id: effect_id.to_string(),
                        turns,
                        chance,
                    }),
                },
            );
        };
        damage("fire", DamageKind::Fire, 10, 15, Some(("burning", 2, 0.3)));
        damage("frost", DamageKind::Frost, 12, 12, Some(("frozen", 1, 0.25)));
        damage("lightning", DamageKind::Lightning, 15, 18, Some(("shocked", 1, 0.2)));
        damage("holy", DamageKind::Holy, 10, 14, None);
        damage("necrotic", DamageKind::Necrotic, 12, 13, Some(("poison", 3, 0.3)));

        let mut effects = BTreeMap::new();
        let mut effect = |id: &str, name: &str, damage_per_turn: i32, prevents_action: bool| {
            effects.insert(
                id.to_string(),
                EffectDef { name: name.to_string(), damage_per_turn, prevents_action },
            );
        };
        effect("burning", "burning", 3, false);
        effect("freezing", "freezing", 1, false);
        effect("frozen", "frozen", 0, true);
        effect("shocked", "shocked", 1, true);
        effect("poison", "poisoned", 2, false);

        let mut recipes = BTreeMap::new();
        let mut recipe = |output: &str, station: &str, materials: &[(&str, u32)]| {
            recipes.insert(
                output.to_string(),
                Recipe {
                    output: output.to_string(),
                    station: station.to_string(),
                    materials: materials.iter().map(|(id, n)| (id.to_string(), *n)).collect(),
                },
            );
        };
        recipe("wooden_club", "workbench", &[("stick", 3)]);
        recipe("leather_cap", "workbench", &[("stick", 1), ("lockpick", 1)]);
        recipe("iron_bar", "forge", &[("iron_ore", 2)]);
        recipe("iron_dagger", "forge", &[("iron_bar", 2), ("stick", 1)]);
        recipe("iron_pickaxe", "forge", &[("iron_bar", 3), ("stick", 2)]);

        let mut quests = BTreeMap::new();
        quests.insert(
            "goblin_slayer".to_string(),
            QuestDef {
                id: "goblin_slayer".into(),
                name: "Goblin Slayer".into(),
                description:
                    "Goblins have been spotted in a nearby dungeon. Clear them out to make the area safe."
                        .into(),
                objective: QuestObjective {
                    kind: ObjectiveKind::Kill,
                    target: "goblin".into(),
                    count: 1,
                },
                reward: QuestReward { gold: 50, xp: 25 },
            },
        );
        quests.insert(
            "bone_collector".to_string(),
            QuestDef {
                id: "bone_collector".into(),
                name: "Bone Collector".into(),
                description: "Something restless stirs in the lower dungeon. Put two skeletons back in the ground."
                    .into(),
                objective: QuestObjective {
                    kind: ObjectiveKind::Kill,
                    target: "skeleton".into(),
                    count: 2,
                },
                reward: QuestReward { gold: 120, xp: 60 },
            },
        );

        let rarities = [
            ("Very Common", 0.25, 0.8),
            ("Common", 0.4, 1.0),
            ("Uncommon", 0.2, 1.2),
            ("Rare", 0.1, 1.5),
            ("Very Rare", 0.03, 1.8),
            ("Mythical", 0.01, 2.2),
            ("Very Mythical", 0.005, 2.6),
            ("Legendary", 0.002, 3.0),
            ("Very Legendary", 0.001, 3.5),
            ("Divine", 0.0005, 4.0),
            ("Very Divine", 0.0002, 4.5),
            ("Celestial", 0.0001, 5.0),
            ("Very Celestial", 0.00005, 5.5),
            ("Primordial", 0.00002, 6.0),
            ("Very Primordial", 0.00001, 7.0),
        ]
        .iter()
        .map(|(name, chance, multiplier)| RarityTier {
            name: name.to_string(),
            chance: *chance,
            multiplier: *multiplier,
        })
        .collect();

        let bladed_types = ["sword", "dagger", "spiked mace", "axe", "spear", "claw"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let prospecting = vec![
            DropEntry { item_id: "mithril_ore".into(), chance: 0.05 },
            DropEntry { item_id: "titanium_ore".into(), chance: 0.10 },
            DropEntry { item_id: "steel_ore".into(), chance: 0.20 },
            DropEntry { item_id: "copper_ore".into(), chance: 0.35 },
        ];

        Self {
            items,
            enemies,
            spell_categories,
            damage_types,
            effects,
            recipes,
            quests,
            rarities,
            fallback_rarity: "Common".to_string(),
            metals,
            bladed_types,
            prospecting,
        }
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_references_resolve() {
        let catalog = Catalog::builtin();
        for enemy in catalog.enemies.values() {
            for drop in &enemy.drops {
                assert!(catalog.item(&drop.item_id).is_ok(), "missing drop {}", drop.item_id);
            }
        }
        for recipe in catalog.recipes.values() {
            assert!(catalog.item(&recipe.output).is_ok());
            for id in recipe.materials.keys() {
                assert!(catalog.item(id).is_ok(), "missing material {}", id);
            }
        }
        for drop in &catalog.prospecting {
            assert!(catalog.item(&drop.item_id).is_ok());
        }
        for floor in 1..=110 {
            let ore = catalog.ore_for_floor(floor).expect("ore in band");
            assert!(catalog.item(&ore).is_ok(), "missing ore {}", ore);
        }
    }

    #[test]
    fn ore_bands_follow_metal_order() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.ore_for_floor(1).as_deref(), Some("iron_ore"));
        assert_eq!(catalog.ore_for_floor(10).as_deref(), Some("iron_ore"));
        assert_eq!(catalog.ore_for_floor(11).as_deref(), Some("steel_ore"));
        assert_eq!(catalog.ore_for_floor(31).as_deref(), Some("adamantite_ore"));
        assert_eq!(catalog.ore_for_floor(81).as_deref(), Some("pig_iron_ore"));
        assert_eq!(catalog.ore_for_floor(120), None);
    }

    #[test]
    fn spell_lookup_goes_through_category() {
        let catalog = Catalog::builtin();
        let fire = catalog.spell_damage("fireball").unwrap();
        assert_eq!(fire.kind, DamageKind::Fire);
        assert!(matches!(
            catalog.spell_damage("wish"),
            Err(GameError::UnknownSpell(_))
        ));
    }

    #[test]
    fn bladed_detection_uses_template_name() {
        let catalog = Catalog::builtin();
        assert!(catalog.is_bladed(catalog.item("rusty_sword").unwrap()));
        assert!(catalog.is_bladed(catalog.item("iron_dagger").unwrap()));
        assert!(!catalog.is_bladed(catalog.item("wooden_club").unwrap()));
        assert!(!catalog.is_bladed(catalog.item("rusty_pickaxe").unwrap()));
    }

    #[test]
    fn rarity_table_leaves_a_small_fallback_band() {
        let catalog = Catalog::builtin();
        let total: f64 = catalog.rarities.iter().map(|r| r.chance).sum();
        assert!(total <= 1.0, "total {}", total);
        assert!((total - 0.99888).abs() < 1e-9, "total {}", total);
        assert!(catalog.rarities.iter().any(|r| r.name == catalog.fallback_rarity));
    }
}
