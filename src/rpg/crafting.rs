//! Gathering, the mine, the chest, crafting and repairs.

use rand::Rng;

use crate::rpg::errors::GameError;
use crate::rpg::items::{wear_equipped, wear_inventory};
use crate::rpg::world::Interactable;
use crate::rpg::session::GameSession;
use crate::rpg::skill::Skill;
use crate::rpg::types::{EquipSlot, Race, RetryCommand};
use crate::rpg::world_seed::{BLACKSMITH, MINE_ENTRANCE, MINE_FLOOR};

pub const MAX_MINE_FLOOR: u32 = 120;
const CHEST: &str = "chest";

/// Where the pickaxe in use lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickaxeRef {
    Equipped,
    Carried(u64),
}

impl GameSession {
    /// Best pickaxe on hand by mining bonus, equipped weapon first on ties.
    fn best_pickaxe(&self) -> Option<(PickaxeRef, String, i32)> {
        let mut best = self
            .player
            .equipment
            .weapon
            .as_ref()
            .filter(|w| w.is_pickaxe())
            .map(|w| (PickaxeRef::Equipped, w.name.clone(), w.mining_bonus));
        for item in self.player.inventory.iter().filter(|i| i.is_pickaxe()) {
            if best.as_ref().map(|(_, _, bonus)| item.mining_bonus > *bonus).unwrap_or(true) {
                best = Some((PickaxeRef::Carried(item.unique_id), item.name.clone(), item.mining_bonus));
            }
        }
        best
    }

    fn wear_pickaxe(&mut self, pick: PickaxeRef) {
        let broken = match pick {
            PickaxeRef::Equipped => wear_equipped(&mut self.player, EquipSlot::Weapon, 1),
            PickaxeRef::Carried(id) => wear_inventory(&mut self.player, id, 1),
        };
        if let Some(item) = broken {
            self.say(format!("Your {} has broken!", item.name));
        }
    }

    fn give_item(&mut self, template_id: &str) -> Result<String, GameError> {
        let item = self.items.create(&self.catalog, &mut self.rng, template_id, false)?;
        let name = item.name.clone();
        self.player.inventory.push(item);
        Ok(name)
    }

    pub(crate) fn handle_chop(&mut self) -> Result<(), GameError> {
        let location = self.world.location(&self.player.location)?;
        if !location.supports_verb("chop") {
            self.say("There are no trees to chop here.");
            return Ok(());
        }
        self.advance_time(1);
        if self.skill_check(Skill::Chopping, 60, Some(RetryCommand::new("chop", ""))) {
            self.say("You spend some time chopping at the trees and find a good piece of wood.");
            let name = self.give_item("stick")?;
            self.say(format!("You managed to get a sturdy {}.", name));
        } else {
            self.say("You swing your axe, but the wood is rotten and crumbles to dust.");
        }
        Ok(())
    }

    pub(crate) fn handle_mine(&mut self) -> Result<(), GameError> {
        let Some((pick, pick_name, bonus)) = self.best_pickaxe() else {
            self.say("You need a pickaxe to mine here.");
            return Ok(());
        };
        self.say(format!("(You use your {}.)", pick_name));
        let floor = self.player.mine_floor.max(1);
        let Some(ore_id) = self.catalog.ore_for_floor(floor) else {
            self.say(format!("You swing your {}, but the rock is barren here.", pick_name));
            return Ok(());
        };
        let ore_name = self.catalog.item(&ore_id)?.name.clone();

        self.advance_time(1);
        if self.skill_check(Skill::Mining, 50 + bonus, Some(RetryCommand::new("mine", ""))) {
            self.say("Your skilled swing strikes the perfect spot!");
            let amount = if self.player.race == Race::Dwarf { 2 } else { 1 };
            for _ in 0..amount {
                self.give_item(&ore_id)?;
            }
            self.wear_pickaxe(pick);
            self.say(format!("You managed to get {} chunk(s) of {}!", amount, ore_name));
        } else {
            self.say(format!(
                "You swing your pickaxe, but only dust and pebbles break away. You find no {}.",
                ore_name
            ));
        }
        Ok(())
    }

    pub(crate) fn handle_prospect(&mut self) -> Result<(), GameError> {
        if self.best_pickaxe().is_none() {
            self.say("You need a pickaxe to prospect for rare ore.");
            return Ok(());
        }
        self.advance_time(1);
        self.say("You carefully chip away at the rock, searching for valuable veins...");
        if !self.skill_check(Skill::Perception, 30, Some(RetryCommand::new("prospect", ""))) {
            self.say("You spend some time prospecting, but find nothing of value.");
            return Ok(());
        }
        let table = self.catalog.prospecting.clone();
        for entry in table {
            if self.rng().gen::<f64>() < entry.chance {
                let name = self.give_item(&entry.item_id)?;
                self.say(format!("Success! Your careful work has revealed a chunk of {}!", name));
                return Ok(());
            }
        }
        self.say("You find some interesting geological formations, but no valuable ore.");
        Ok(())
    }

    pub(crate) fn handle_descend(&mut self) -> Result<(), GameError> {
        self.world.location(MINE_FLOOR)?;
        self.player.mine_floor = 1;
        self.player.location = MINE_FLOOR.to_string();
        self.say("You step onto the rickety lift and ride it down to floor 1.");
        Ok(())
    }

    pub(crate) fn handle_lift_up(&mut self) -> Result<(), GameError> {
        if self.player.mine_floor <= 1 {
            self.say("You ascend the lift and return to the mine entrance.");
            self.player.mine_floor = 0;
            return self.travel(MINE_ENTRANCE, 1);
        }
        self.player.mine_floor -= 1;
        self.say(format!("You take the lift up to floor {}.", self.player.mine_floor));
        Ok(())
    }

    pub(crate) fn handle_lift_down(&mut self) {
        if self.player.mine_floor >= MAX_MINE_FLOOR {
            self.say("You've reached the bottom of the mine. You can't go any deeper.");
            return;
        }
        self.player.mine_floor += 1;
        self.say(format!("You take the lift down to floor {}.", self.player.mine_floor));
    }

    pub(crate) fn handle_open(&mut self, target: &str) -> Result<(), GameError> {
        let location_id = self.player.location.clone();
        let chest = self
            .world
            .location(&location_id)?
            .interactables
            .get(target)
            .filter(|i| !i.hidden && target == CHEST)
            .cloned();
        let Some(mut chest) = chest else {
            self.say(format!("There is no {} here to open.", target));
            return Ok(());
        };
        if chest.opened {
            self.say("The chest is empty.");
            return Ok(());
        }
        let retry = RetryCommand::new("open", target);

        if chest.trapped {
            if self.skill_check(Skill::Dexterity, 50, Some(retry.clone())) {
                self.say("You carefully disarm a needle trap hidden in the lock.");
            } else {
                self.say("A hidden needle springs from the lock! You take 10 damage.");
                self.player.stats.health -= 10;
            }
            chest.trapped = false;
            self.store_feature(&location_id, target, &chest)?;
            if self.player.stats.health <= 0 {
                self.defeat();
                return Ok(());
            }
        }

        if chest.locked {
            let Some(pick_idx) = self.player.inventory.iter().position(|i| i.template_id == "lockpick") else {
                self.say("The chest is locked. You'll need a lockpick.");
                return Ok(());
            };
            if self.skill_check(Skill::Dexterity, 50, Some(retry)) {
                self.say("With a satisfying click, the lock springs open.");
                chest.locked = false;
            } else {
                self.player.inventory.remove(pick_idx);
                self.say("Your lockpick snaps in the lock.");
                self.store_feature(&location_id, target, &chest)?;
                return Ok(());
            }
        }

        chest.opened = true;
        let contents = chest.contents.take().unwrap_or_default();
        self.store_feature(&location_id, target, &chest)?;
        self.say("You open the chest.");
        if contents.gold > 0 {
            self.player.stats.gold += contents.gold;
            self.say(format!("You find {} gold.", contents.gold));
        }
        for item_id in &contents.item_ids {
            let name = self.give_item(item_id)?;
            self.say(format!("You find a {}.", name));
        }
        Ok(())
    }

    fn store_feature(
        &mut self,
        location_id: &str,
        name: &str,
        feature: &Interactable,
    ) -> Result<(), GameError> {
        self.world
            .location_mut(location_id)?
            .interactables
            .insert(name.to_string(), feature.clone());
        Ok(())
    }

    pub(crate) fn handle_smelt(&mut self, name: &str) -> Result<(), GameError> {
        let has_forge = self.world.location(&self.player.location)?.has_station("forge");
        if !has_forge {
            self.say("You need a forge to smelt anything.");
            return Ok(());
        }
        self.handle_craft(name, "smelt")
    }

    /// Craft an item at one of the stations here. Materials are spent whether
    /// or not the check succeeds.
    pub(crate) fn handle_craft(&mut self, name: &str, verb: &str) -> Result<(), GameError> {
        let location = self.world.location(&self.player.location)?;
        if location.crafting_stations.is_empty() {
            self.say("There is nowhere to craft here.");
            return Ok(());
        }
        if name.is_empty() {
            self.say(format!("What would you like to {}? Use '{} <item name>'.", verb, verb));
            return Ok(());
        }
        let Some(template) = self.catalog.item_by_name(name) else {
            self.say(format!("You don't know how to make '{}'.", name));
            return Ok(());
        };
        let Some(recipe) = self
            .catalog
            .recipes
            .get(&template.id)
            .filter(|r| location.has_station(&r.station))
            .cloned()
        else {
            let line = format!("You can't make a {} here.", template.name);
            self.say(line);
            return Ok(());
        };
        let output_name = template.name.clone();

        let missing: Vec<String> = recipe
            .materials
            .iter()
            .filter(|(id, count)| self.player.count_item(id) < **count as usize)
            .map(|(id, count)| {
                let label = self.catalog.item(id).map(|t| t.name.clone()).unwrap_or_else(|_| id.clone());
                format!("{} (x{})", label, count)
            })
            .collect();
        if !missing.is_empty() {
            self.say(format!("You don't have the materials. You still need: {}.", missing.join(", ")));
            return Ok(());
        }

        for (id, count) in &recipe.materials {
            self.player.take_items(id, *count as usize);
        }
        let retry = RetryCommand::new(verb, name);
        if self.skill_check(Skill::Crafting, 70, Some(retry)) {
            let made = self.give_item(&recipe.output)?;
            log::debug!("{} crafted {}", self.player.name, recipe.output);
            self.say(format!("You successfully craft a {}!", made));
        } else {
            self.say(format!("Your attempt to make a {} fails and the materials are ruined.", output_name));
        }
        Ok(())
    }

    pub(crate) fn handle_repair(&mut self, name: &str) -> Result<(), GameError> {
        if self.player.location != BLACKSMITH {
            self.say("You must be at a blacksmith to repair items.");
            return Ok(());
        }
        if name.is_empty() {
            self.say("What would you like to repair? Use 'repair <item name>'.");
            return Ok(());
        }
        let gold = self.player.stats.gold;
        let worn_slot = EquipSlot::ALL.into_iter().find(|slot| {
            self.player
                .equipment
                .slot(*slot)
                .map(|i| i.matches_name(name))
                .unwrap_or(false)
        });
        let item = match self.player.inventory.iter_mut().find(|i| i.matches_name(name)) {
            Some(item) => item,
            None => worn_slot
                .and_then(|slot| self.player.equipment.slot_mut(slot).as_mut())
                .ok_or_else(|| GameError::ItemNotFound(name.to_string()))?,
        };
        let (Some(current), Some(max)) = (item.durability, item.max_durability) else {
            let line = format!("The {} cannot be repaired.", item.name);
            self.say(line);
            return Ok(());
        };
        if current >= max {
            let line = format!("The {} is already in perfect condition.", item.name);
            self.say(line);
            return Ok(());
        }
        let cost = ((max - current) as i32 + 1) / 2;
        let cost = cost.max(1);
        if gold < cost {
            return Err(GameError::InsufficientGold {
                needed: cost,
                available: gold,
            });
        }
        item.durability = Some(max);
        let item_name = item.name.clone();
        self.player.stats.gold -= cost;
        self.say(format!(
            "You pay James {} gold to repair your {}. It is now fully repaired.",
            cost, item_name
        ));
        Ok(())
    }
}
