//! World graph: locations, their action descriptors, shops, interactables and NPCs.
//!
//! Location data holds no behaviour. Actions are tagged descriptors that the
//! session interprets, and state-dependent descriptions name a rule instead of
//! embedding code, so everything here can be serialized and diffed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rpg::catalog::Catalog;
use crate::rpg::errors::GameError;
use crate::rpg::types::Player;

/// How a location describes itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Description {
    Static(String),
    Computed(DescriptionRule),
}

/// Descriptions evaluated against live state on every display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionRule {
    /// Dark until the player carries a torch.
    CaveLight,
    /// Mentions the chest once it has been found.
    MineEntrance,
    /// Names the current floor and its ore band.
    MineFloor,
}

impl Description {
    pub fn evaluate(&self, location: &Location, player: &Player, catalog: &Catalog) -> String {
        match self {
            Description::Static(text) => text.clone(),
            Description::Computed(rule) => rule.evaluate(location, player, catalog),
        }
    }
}

impl DescriptionRule {
    fn evaluate(&self, location: &Location, player: &Player, catalog: &Catalog) -> String {
        match self {
            DescriptionRule::CaveLight => {
                if player.has_item("torch") {
                    "You are in a dark cave. You have a torch so you can 'proceed', or go 'back' to the forest."
                        .to_string()
                } else {
                    "You are at the entrance of a dark cave. It's too dark to see inside. You can go 'back' to the forest."
                        .to_string()
                }
            }
            DescriptionRule::MineEntrance => {
                let mut text = "You are in an old abandoned mine. You can 'mine', 'prospect', 'descend' the lift, or go 'back' to the cave."
                    .to_string();
                if location
                    .interactables
                    .get("chest")
                    .map(|c| !c.hidden)
                    .unwrap_or(false)
                {
                    text.push_str(" In the corner, you spot a dusty old chest.");
                }
                text
            }
            DescriptionRule::MineFloor => {
                let ore = catalog
                    .ore_for_floor(player.mine_floor)
                    .and_then(|id| catalog.item(&id).ok().map(|t| t.name.clone()))
                    .unwrap_or_else(|| "nothing of value".to_string());
                format!(
                    "--- Mine Floor {} ---\nThe rock walls on this level look like they might contain {}.\nThe rickety lift is here. You can go 'up' or 'down'. You can also 'mine' or 'prospect' the walls.",
                    player.mine_floor, ore
                )
            }
        }
    }
}

/// What a location verb does when it fires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ActionEffect {
    /// Move with a clock cost, on-enter hook and autosave.
    Travel { to: String, hours: u32 },
    /// Short walk: location changes, nothing else happens.
    Move { to: String },
    /// Travel that needs an item in the inventory.
    TravelIf {
        to: String,
        hours: u32,
        requires_item: String,
        denied: String,
    },
    Sleep { hours: u32 },
    StartCombat { enemy: String },
    Mine,
    Prospect,
    /// Take the lift from the mine entrance to floor 1.
    Descend,
    MineUp,
    MineDown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationAction {
    #[serde(default)]
    pub narration: Option<String>,
    #[serde(flatten)]
    pub effect: ActionEffect,
}

impl LocationAction {
    pub fn new(effect: ActionEffect) -> Self {
        Self {
            narration: None,
            effect,
        }
    }

    pub fn narrated(text: &str, effect: ActionEffect) -> Self {
        Self {
            narration: Some(text.to_string()),
            effect,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "hook", rename_all = "snake_case")]
pub enum OnEnter {
    /// Printed the first time the player arrives; sets `visited`.
    FirstVisitMessage { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShopStock {
    pub current: u32,
    pub max: u32,
    #[serde(default = "default_restock_day")]
    pub last_restock_day: u32,
}

fn default_restock_day() -> u32 {
    1
}

impl ShopStock {
    pub fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            last_restock_day: 1,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.current > 0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChestContents {
    pub gold: i32,
    pub item_ids: Vec<String>,
}

/// A named feature of a location that can be looked at and sometimes opened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interactable {
    pub description: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub trapped: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub opened: bool,
    #[serde(default)]
    pub contents: Option<ChestContents>,
    /// Verbs this feature supports, e.g. "chop" for trees.
    #[serde(default)]
    pub verbs: Vec<String>,
}

impl Interactable {
    pub fn plain(description: &str) -> Self {
        Self {
            description: description.to_string(),
            hidden: false,
            trapped: false,
            locked: false,
            opened: false,
            contents: None,
            verbs: Vec::new(),
        }
    }

    pub fn with_verb(mut self, verb: &str) -> Self {
        self.verbs.push(verb.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub id: String,
    pub description: Description,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub npcs: Vec<String>,
    /// Item id -> stock. Empty means the location is not a shop.
    #[serde(default)]
    pub shop: BTreeMap<String, ShopStock>,
    #[serde(default)]
    pub actions: BTreeMap<String, LocationAction>,
    #[serde(default)]
    pub interactables: BTreeMap<String, Interactable>,
    #[serde(default)]
    pub crafting_stations: Vec<String>,
    #[serde(default)]
    pub on_enter: Option<OnEnter>,
    #[serde(default)]
    pub visited: bool,
}

impl Location {
    pub fn new(id: &str, description: Description) -> Self {
        Self {
            id: id.to_string(),
            description,
            long_description: None,
            npcs: Vec::new(),
            shop: BTreeMap::new(),
            actions: BTreeMap::new(),
            interactables: BTreeMap::new(),
            crafting_stations: Vec::new(),
            on_enter: None,
            visited: false,
        }
    }

    pub fn with_long_description(mut self, text: &str) -> Self {
        self.long_description = Some(text.to_string());
        self
    }

    pub fn with_npc(mut self, npc_id: &str) -> Self {
        self.npcs.push(npc_id.to_string());
        self
    }

    pub fn with_stock(mut self, item_id: &str, max: u32) -> Self {
        self.shop.insert(item_id.to_string(), ShopStock::new(max));
        self
    }

    pub fn with_action(mut self, verb: &str, action: LocationAction) -> Self {
        self.actions.insert(verb.to_string(), action);
        self
    }

    pub fn with_interactable(mut self, name: &str, interactable: Interactable) -> Self {
        self.interactables.insert(name.to_string(), interactable);
        self
    }

    pub fn with_station(mut self, station: &str) -> Self {
        self.crafting_stations.push(station.to_string());
        self
    }

    pub fn with_on_enter(mut self, hook: OnEnter) -> Self {
        self.on_enter = Some(hook);
        self
    }

    pub fn is_shop(&self) -> bool {
        !self.shop.is_empty()
    }

    pub fn has_station(&self, station: &str) -> bool {
        self.crafting_stations.iter().any(|s| s == station)
    }

    pub fn supports_verb(&self, verb: &str) -> bool {
        self.interactables
            .values()
            .any(|i| i.verbs.iter().any(|v| v == verb))
    }

    /// Refill every stock line not yet restocked on `day`. Returns true if
    /// anything was touched.
    pub fn restock(&mut self, day: u32) -> bool {
        let mut touched = false;
        for stock in self.shop.values_mut() {
            if stock.last_restock_day < day {
                stock.current = stock.max;
                stock.last_restock_day = day;
                touched = true;
            }
        }
        touched
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Lines may contain `{name}`, `{race}` and `{class}` placeholders.
    pub dialogue: Vec<String>,
    #[serde(default)]
    pub dialogue_index: usize,
}

impl Npc {
    pub fn new(id: &str, name: &str, description: &str, lines: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            dialogue: lines.iter().map(|l| l.to_string()).collect(),
            dialogue_index: 0,
        }
    }

    /// Current line, filled in for `player`, then advance the cursor.
    pub fn next_line(&mut self, player: &Player) -> Option<String> {
        if self.dialogue.is_empty() {
            return None;
        }
        let idx = self.dialogue_index % self.dialogue.len();
        let line = self.dialogue[idx]
            .replace("{name}", &player.name)
            .replace("{race}", player.race.as_str())
            .replace("{class}", player.class.as_str());
        self.dialogue_index = (idx + 1) % self.dialogue.len();
        Some(line)
    }
}

/// Saved mutable part of a location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationState {
    #[serde(default)]
    pub shop: BTreeMap<String, ShopStock>,
    #[serde(default)]
    pub visited: bool,
    #[serde(default)]
    pub interactables: BTreeMap<String, Interactable>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NpcState {
    pub dialogue_index: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct World {
    pub locations: BTreeMap<String, Location>,
    pub npcs: BTreeMap<String, Npc>,
}

impl World {
    pub fn add_location(&mut self, location: Location) {
        self.locations.insert(location.id.clone(), location);
    }

    pub fn add_npc(&mut self, npc: Npc) {
        self.npcs.insert(npc.id.clone(), npc);
    }

    pub fn location(&self, id: &str) -> Result<&Location, GameError> {
        self.locations
            .get(id)
            .ok_or_else(|| GameError::UnknownLocation(id.to_string()))
    }

    pub fn location_mut(&mut self, id: &str) -> Result<&mut Location, GameError> {
        self.locations
            .get_mut(id)
            .ok_or_else(|| GameError::UnknownLocation(id.to_string()))
    }

    /// Restock every shop for `day`. Returns the ids of locations that restocked.
    pub fn restock_all(&mut self, day: u32) -> Vec<String> {
        self.locations
            .values_mut()
            .filter_map(|loc| loc.restock(day).then(|| loc.id.clone()))
            .collect()
    }

    pub fn location_states(&self) -> BTreeMap<String, LocationState> {
        self.locations
            .iter()
            .map(|(id, loc)| {
                (
                    id.clone(),
                    LocationState {
                        shop: loc.shop.clone(),
                        visited: loc.visited,
                        interactables: loc.interactables.clone(),
                    },
                )
            })
            .collect()
    }

    pub fn npc_states(&self) -> BTreeMap<String, NpcState> {
        self.npcs
            .iter()
            .map(|(id, npc)| {
                (
                    id.clone(),
                    NpcState {
                        dialogue_index: npc.dialogue_index,
                    },
                )
            })
            .collect()
    }

    /// Overlay saved state. Every id is checked before anything changes, so a
    /// save that names an unknown location or NPC leaves the world untouched.
    pub fn apply_states(
        &mut self,
        locations: &BTreeMap<String, LocationState>,
        npcs: &BTreeMap<String, NpcState>,
    ) -> Result<(), GameError> {
        if let Some(id) = locations.keys().find(|id| !self.locations.contains_key(*id)) {
            return Err(GameError::UnknownLocation(id.clone()));
        }
        if let Some(id) = npcs.keys().find(|id| !self.npcs.contains_key(*id)) {
            return Err(GameError::MalformedSaveFile {
                path: String::new(),
                reason: format!("unknown npc '{}'", id),
            });
        }
        for (id, state) in locations {
            if let Some(loc) = self.locations.get_mut(id) {
                // Stock lines the save lacks keep their seeded values.
                for (item, stock) in &state.shop {
                    loc.shop.insert(item.clone(), stock.clone());
                }
                loc.visited = state.visited;
                for (name, inter) in &state.interactables {
                    loc.interactables.insert(name.clone(), inter.clone());
                }
            }
        }
        for (id, state) in npcs {
            if let Some(npc) = self.npcs.get_mut(id) {
                npc.dialogue_index = state.dialogue_index;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpg::types::{Class, Race};

    #[test]
    fn restock_only_refills_stale_lines() {
        let mut loc = Location::new("shop", Description::Static("A shop.".into())).with_stock("torch", 5);
        loc.shop.get_mut("torch").unwrap().current = 0;
        assert!(!loc.restock(1));
        assert_eq!(loc.shop["torch"].current, 0);
        assert!(loc.restock(2));
        assert_eq!(loc.shop["torch"].current, 5);
        assert_eq!(loc.shop["torch"].last_restock_day, 2);
    }

    #[test]
    fn npc_dialogue_cycles_and_fills_placeholders() {
        let player = Player::new("Ash Vale", Race::Gnome, Class::Bard, "forest");
        let mut npc = Npc::new("n", "N", "d", &["Hi {name}.", "A {race} {class}!"]);
        assert_eq!(npc.next_line(&player).unwrap(), "Hi Ash Vale.");
        assert_eq!(npc.next_line(&player).unwrap(), "A gnome bard!");
        assert_eq!(npc.next_line(&player).unwrap(), "Hi Ash Vale.");
        assert_eq!(npc.dialogue_index, 1);
    }

    #[test]
    fn action_descriptors_serialize_as_tagged_data() {
        let action = LocationAction::narrated(
            "You wander south.",
            ActionEffect::Travel { to: "dungeon".into(), hours: 1 },
        );
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"effect\":\"travel\""), "{}", json);
        let back: LocationAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn apply_states_rejects_unknown_locations_without_changes() {
        let mut world = World::default();
        world.add_location(Location::new("shop", Description::Static("s".into())).with_stock("torch", 5));
        let mut states = world.location_states();
        states.get_mut("shop").unwrap().shop.get_mut("torch").unwrap().current = 1;
        states.insert("atlantis".into(), LocationState::default());
        let err = world.apply_states(&states, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, GameError::UnknownLocation(ref id) if id == "atlantis"));
        assert_eq!(world.locations["shop"].shop["torch"].current, 5);
    }
}
