use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const SAVE_SCHEMA_VERSION: u32 = 1;

/// Named numeric stat. Used as the key for item bonuses, racial/class deltas and
/// transformation overlays.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Health,
    MaxHealth,
    Mana,
    Attack,
    Defense,
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
    Luck,
    Energy,
}

impl Stat {
    pub const ABILITIES: [Stat; 6] = [
        Stat::Strength,
        Stat::Dexterity,
        Stat::Constitution,
        Stat::Intelligence,
        Stat::Wisdom,
        Stat::Charisma,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stat::Health => "Health",
            Stat::MaxHealth => "Max Health",
            Stat::Mana => "Mana",
            Stat::Attack => "Attack",
            Stat::Defense => "Defense",
            Stat::Strength => "Strength",
            Stat::Dexterity => "Dexterity",
            Stat::Constitution => "Constitution",
            Stat::Intelligence => "Intelligence",
            Stat::Wisdom => "Wisdom",
            Stat::Charisma => "Charisma",
            Stat::Luck => "Luck",
            Stat::Energy => "Energy",
        }
    }
}

pub type StatBonuses = BTreeMap<Stat, i32>;

/// A character's stat sheet. `Player::stats` holds the base values; the
/// effective values are derived on demand by `stats::effective_stats`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatBlock {
    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub level: u32,
    pub experience: u32,
    pub xp_to_next_level: u32,
    pub attack: i32,
    pub defense: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
    pub luck: i32,
    pub energy: i32,
    pub gold: i32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            health: 100,
            max_health: 100,
            mana: 100,
            level: 1,
            experience: 0,
            xp_to_next_level: 100,
            attack: 10,
            defense: 10,
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
            luck: 10,
            energy: 100,
            gold: 50,
        }
    }
}

impl StatBlock {
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Health => self.health,
            Stat::MaxHealth => self.max_health,
            Stat::Mana => self.mana,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::Strength => self.strength,
            Stat::Dexterity => self.dexterity,
            Stat::Constitution => self.constitution,
            Stat::Intelligence => self.intelligence,
            Stat::Wisdom => self.wisdom,
            Stat::Charisma => self.charisma,
            Stat::Luck => self.luck,
            Stat::Energy => self.energy,
        }
    }

    fn slot_mut(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Health => &mut self.health,
            Stat::MaxHealth => &mut self.max_health,
            Stat::Mana => &mut self.mana,
            Stat::Attack => &mut self.attack,
            Stat::Defense => &mut self.defense,
            Stat::Strength => &mut self.strength,
            Stat::Dexterity => &mut self.dexterity,
            Stat::Constitution => &mut self.constitution,
            Stat::Intelligence => &mut self.intelligence,
            Stat::Wisdom => &mut self.wisdom,
            Stat::Charisma => &mut self.charisma,
            Stat::Luck => &mut self.luck,
            Stat::Energy => &mut self.energy,
        }
    }

    pub fn add(&mut self, stat: Stat, delta: i32) {
        *self.slot_mut(stat) += delta;
    }

    pub fn add_all(&mut self, bonuses: &StatBonuses) {
        for (stat, delta) in bonuses {
            self.add(*stat, *delta);
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Human,
    Elf,
    Dwarf,
    Orc,
    Demon,
    Angel,
    Beastkin,
    Gnome,
    Lizardman,
    Halfling,
    Tiefling,
    Shapeshifter,
    Undead,
    Aasimar,
}

impl Race {
    pub const ALL: [Race; 14] = [
        Race::Human,
        Race::Elf,
        Race::Dwarf,
        Race::Orc,
        Race::Demon,
        Race::Angel,
        Race::Beastkin,
        Race::Gnome,
        Race::Lizardman,
        Race::Halfling,
        Race::Tiefling,
        Race::Shapeshifter,
        Race::Undead,
        Race::Aasimar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Race::Human => "human",
            Race::Elf => "elf",
            Race::Dwarf => "dwarf",
            Race::Orc => "orc",
            Race::Demon => "demon",
            Race::Angel => "angel",
            Race::Beastkin => "beastkin",
            Race::Gnome => "gnome",
            Race::Lizardman => "lizardman",
            Race::Halfling => "halfling",
            Race::Tiefling => "tiefling",
            Race::Shapeshifter => "shapeshifter",
            Race::Undead => "undead",
            Race::Aasimar => "aasimar",
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Race {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Race::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| format!("unknown race '{}'", s.trim()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Class {
    Warrior,
    Mage,
    Rogue,
    Paladin,
    Ranger,
    Barbarian,
    Cleric,
    Monk,
    Bard,
    Sorcerer,
    Druid,
}

impl Class {
    pub const ALL: [Class; 11] = [
        Class::Warrior,
        Class::Mage,
        Class::Rogue,
        Class::Paladin,
        Class::Ranger,
        Class::Barbarian,
        Class::Cleric,
        Class::Monk,
        Class::Bard,
        Class::Sorcerer,
        Class::Druid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Class::Warrior => "warrior",
            Class::Mage => "mage",
            Class::Rogue => "rogue",
            Class::Paladin => "paladin",
            Class::Ranger => "ranger",
            Class::Barbarian => "barbarian",
            Class::Cleric => "cleric",
            Class::Monk => "monk",
            Class::Bard => "bard",
            Class::Sorcerer => "sorcerer",
            Class::Druid => "druid",
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Class {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Class::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown class '{}'", s.trim()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Consumable,
    Weapon,
    Armor,
    Tool,
    Material,
    Misc,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    Weapon,
    Chest,
    Head,
    Legs,
    Feet,
}

impl EquipSlot {
    pub const ALL: [EquipSlot; 5] = [
        EquipSlot::Weapon,
        EquipSlot::Chest,
        EquipSlot::Head,
        EquipSlot::Legs,
        EquipSlot::Feet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EquipSlot::Weapon => "weapon",
            EquipSlot::Chest => "chest",
            EquipSlot::Head => "head",
            EquipSlot::Legs => "legs",
            EquipSlot::Feet => "feet",
        }
    }
}

impl FromStr for EquipSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weapon" => Ok(EquipSlot::Weapon),
            "chest" => Ok(EquipSlot::Chest),
            "head" => Ok(EquipSlot::Head),
            "legs" => Ok(EquipSlot::Legs),
            "feet" => Ok(EquipSlot::Feet),
            other => Err(other.to_string()),
        }
    }
}

/// A concrete item owned by exactly one container. Template fields are copied
/// by value when the instance is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemInstance {
    pub template_id: String,
    pub unique_id: u64,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub equip_slot: Option<EquipSlot>,
    #[serde(default)]
    pub durability: Option<u32>,
    #[serde(default)]
    pub max_durability: Option<u32>,
    #[serde(default)]
    pub stats: StatBonuses,
    #[serde(default)]
    pub mining_bonus: i32,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
}

impl ItemInstance {
    pub fn is_broken(&self) -> bool {
        matches!(self.durability, Some(0))
    }

    pub fn is_pickaxe(&self) -> bool {
        self.name.to_lowercase().contains("pickaxe")
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Equipment {
    pub weapon: Option<ItemInstance>,
    pub chest: Option<ItemInstance>,
    pub head: Option<ItemInstance>,
    pub legs: Option<ItemInstance>,
    pub feet: Option<ItemInstance>,
}

impl Equipment {
    pub fn slot(&self, slot: EquipSlot) -> Option<&ItemInstance> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_ref(),
            EquipSlot::Chest => self.chest.as_ref(),
            EquipSlot::Head => self.head.as_ref(),
            EquipSlot::Legs => self.legs.as_ref(),
            EquipSlot::Feet => self.feet.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: EquipSlot) -> &mut Option<ItemInstance> {
        match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Chest => &mut self.chest,
            EquipSlot::Head => &mut self.head,
            EquipSlot::Legs => &mut self.legs,
            EquipSlot::Feet => &mut self.feet,
        }
    }

    /// Equipped items in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EquipSlot, &ItemInstance)> {
        EquipSlot::ALL
            .into_iter()
            .filter_map(move |slot| self.slot(slot).map(|item| (slot, item)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// A status effect currently applied to a combatant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveEffect {
    pub effect_id: String,
    pub turns_remaining: u32,
}

/// Shapeshifter overlay. The saved snapshot only exists while transformed, so
/// reverting always has something to restore.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Transform {
    #[default]
    Natural,
    Transformed {
        form_id: String,
        form_name: String,
        form_stats: StatBonuses,
        saved_base_stats: StatBlock,
    },
}

impl Transform {
    pub fn is_transformed(&self) -> bool {
        matches!(self, Transform::Transformed { .. })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Accepted,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestLogEntry {
    pub status: QuestStatus,
    pub progress: u32,
}

/// The command to re-run when a failed check is rerolled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryCommand {
    pub verb: String,
    #[serde(default)]
    pub args: String,
}

impl RetryCommand {
    pub fn new(verb: &str, args: &str) -> Self {
        Self {
            verb: verb.to_string(),
            args: args.to_string(),
        }
    }

    /// The input line that reproduces this command.
    pub fn as_input(&self) -> String {
        if self.args.is_empty() {
            self.verb.clone()
        } else {
            format!("{} {}", self.verb, self.args)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LastCheck {
    pub kind: String,
    pub success: bool,
    #[serde(default)]
    pub retry: Option<RetryCommand>,
}

impl LastCheck {
    pub fn failed(&self) -> bool {
        !self.success
    }
}

pub const COOLDOWN_BATTLE_RAGE: &str = "battleRage";
pub const COOLDOWN_HELLISH_REBUKE: &str = "hellishRebuke";
pub const COOLDOWN_LAY_ON_HANDS: &str = "layOnHands";
pub const FLAG_BATTLE_RAGE: &str = "battleRage";
pub const FLAG_HALFLING_LUCK: &str = "usedHalflingLuckToday";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: String,
    pub race: Race,
    pub class: Class,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub weight: String,
    pub location: String,
    #[serde(default)]
    pub mine_floor: u32,
    pub stats: StatBlock,
    #[serde(default)]
    pub equipment: Equipment,
    #[serde(default)]
    pub inventory: Vec<ItemInstance>,
    #[serde(default)]
    pub spells: Vec<String>,
    #[serde(default)]
    pub known_forms: Vec<String>,
    #[serde(default)]
    pub active_effects: Vec<ActiveEffect>,
    #[serde(default)]
    pub cooldowns: BTreeMap<String, u32>,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub quest_log: BTreeMap<String, QuestLogEntry>,
    #[serde(default)]
    pub last_check: Option<LastCheck>,
}

impl Player {
    pub fn new(name: &str, race: Race, class: Class, location: &str) -> Self {
        Self {
            name: name.to_string(),
            race,
            class,
            gender: String::new(),
            age: String::new(),
            height: String::new(),
            weight: String::new(),
            location: location.to_string(),
            mine_floor: 0,
            stats: StatBlock::default(),
            equipment: Equipment::default(),
            inventory: Vec::new(),
            spells: vec!["fireball".to_string()],
            known_forms: Vec::new(),
            active_effects: Vec::new(),
            cooldowns: BTreeMap::new(),
            flags: BTreeMap::new(),
            transform: Transform::Natural,
            quest_log: BTreeMap::new(),
            last_check: None,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.flags.insert(name.to_string(), value);
    }

    pub fn has_item(&self, template_id: &str) -> bool {
        self.inventory.iter().any(|i| i.template_id == template_id)
    }

    pub fn count_item(&self, template_id: &str) -> usize {
        self.inventory
            .iter()
            .filter(|i| i.template_id == template_id)
            .count()
    }

    pub fn find_inventory(&self, name: &str) -> Option<usize> {
        self.inventory.iter().position(|i| i.matches_name(name))
    }

    pub fn remove_by_unique_id(&mut self, unique_id: u64) -> Option<ItemInstance> {
        let idx = self.inventory.iter().position(|i| i.unique_id == unique_id)?;
        Some(self.inventory.remove(idx))
    }

    /// Remove up to `count` instances of a template, oldest first.
    pub fn take_items(&mut self, template_id: &str, count: usize) -> Vec<ItemInstance> {
        let mut taken = Vec::new();
        while taken.len() < count {
            match self.inventory.iter().position(|i| i.template_id == template_id) {
                Some(idx) => taken.push(self.inventory.remove(idx)),
                None => break,
            }
        }
        taken
    }
}
