//! World command handlers: looking, talking, trading, items and the guild.

use crate::rpg::catalog::UseEffect;
use crate::rpg::errors::GameError;
use crate::rpg::quest::{accept_quest, turn_in, AcceptOutcome, TurnInOutcome};
use crate::rpg::render;
use crate::rpg::session::{GameSession, PendingPrompt};
use crate::rpg::skill::Skill;
use crate::rpg::stats::{apply_stat_bonuses, effective_stats, mana_capacity};
use crate::rpg::types::{Class, EquipSlot, RetryCommand};
use crate::rpg::world_seed::{GUILD, MINE_ENTRANCE};

pub const CHANGE_CLASS_COST: i32 = 100;

impl GameSession {
    pub(crate) fn handle_look(&mut self, target: Option<&str>) -> Result<(), GameError> {
        let location = self.world.location(&self.player.location)?;
        let target = target.filter(|t| *t != "around");
        let Some(target) = target else {
            let text = location.long_description.clone().unwrap_or_else(|| {
                location.description.evaluate(location, &self.player, &self.catalog)
            });
            let chest_hidden = location.id == MINE_ENTRANCE
                && location.interactables.get("chest").map(|c| c.hidden).unwrap_or(false);
            self.say(text);
            if chest_hidden {
                self.search_for_chest()?;
            }
            return Ok(());
        };

        let Some(feature) = location.interactables.get(target).filter(|i| !i.hidden) else {
            self.say(format!("You see nothing special about the {}.", target));
            return Ok(());
        };
        let mut lines = vec![feature.description.clone()];
        if location.has_station(target) {
            lines.extend(render::station_recipes(&self.catalog, target));
        }
        self.say_all(lines);
        Ok(())
    }

    fn search_for_chest(&mut self) -> Result<(), GameError> {
        if self.skill_check(Skill::Perception, 40, Some(RetryCommand::new("look", ""))) {
            let location = self.world.location_mut(MINE_ENTRANCE)?;
            if let Some(chest) = location.interactables.get_mut("chest") {
                chest.hidden = false;
            }
            self.say("Your keen eyes spot something unusual... Tucked away in a dark corner, you find a dusty old chest!");
        } else {
            self.say("You scan the area, but see nothing out of the ordinary.");
        }
        Ok(())
    }

    pub(crate) fn handle_talk(&mut self, name: &str) -> Result<(), GameError> {
        let location = self.world.location(&self.player.location)?;
        let npc_id = location
            .npcs
            .iter()
            .find(|id| {
                self.world
                    .npcs
                    .get(*id)
                    .map(|npc| npc.name.eq_ignore_ascii_case(name))
                    .unwrap_or(false)
            })
            .cloned();
        let Some(npc) = npc_id.and_then(|id| self.world.npcs.get_mut(&id)) else {
            self.say(format!("There is no one here by the name of '{}'.", name));
            return Ok(());
        };
        if let Some(line) = npc.next_line(&self.player) {
            let text = format!("[{}]: \"{}\"", npc.name, line);
            self.say(text);
        }
        Ok(())
    }

    pub(crate) fn handle_buy(&mut self, name: &str) -> Result<(), GameError> {
        let location = self.world.location(&self.player.location)?;
        if !location.is_shop() {
            self.say("There is nothing to buy here.");
            return Ok(());
        }
        let Some(template) = self
            .catalog
            .item_by_name(name)
            .filter(|t| location.shop.contains_key(&t.id))
        else {
            self.say(format!("This shop doesn't sell '{}'.", name));
            return Ok(());
        };
        let (item_id, item_name, price) = (template.id.clone(), template.name.clone(), template.price);
        if !location.shop[&item_id].in_stock() {
            return Err(GameError::InsufficientStock(item_name));
        }
        if self.player.stats.gold < price {
            return Err(GameError::InsufficientGold {
                needed: price,
                available: self.player.stats.gold,
            });
        }

        let instance = self.items.create(&self.catalog, &mut self.rng, &item_id, false)?;
        let location_id = self.player.location.clone();
        if let Some(stock) = self.world.location_mut(&location_id)?.shop.get_mut(&item_id) {
            stock.current -= 1;
        }
        self.player.stats.gold -= price;
        self.player.inventory.push(instance);
        log::debug!("{} bought {} for {}", self.player.name, item_id, price);
        self.say(format!(
            "You bought a {} for {} gold. You have {} gold remaining.",
            item_name, price, self.player.stats.gold
        ));
        Ok(())
    }

    /// Consume an inventory item. Shared by the world and combat `use`.
    pub(crate) fn handle_use(&mut self, name: &str) -> Result<(), GameError> {
        if name.is_empty() {
            self.say("Use what? (e.g., use health potion)");
            return Ok(());
        }
        let idx = self
            .player
            .find_inventory(name)
            .ok_or_else(|| GameError::ItemNotFound(name.to_string()))?;
        let template_id = self.player.inventory[idx].template_id.clone();
        let item_name = self.player.inventory[idx].name.clone();
        let effect = self
            .catalog
            .item(&template_id)?
            .use_effect
            .clone()
            .ok_or(GameError::NotUsable(item_name.clone()))?;

        self.player.inventory.remove(idx);
        match effect {
            UseEffect::Heal(amount) => {
                let max = effective_stats(&self.player).max_health;
                self.player.stats.health = (self.player.stats.health + amount).min(max);
                self.say(format!(
                    "You used the {}. Your health is now {}.",
                    item_name, self.player.stats.health
                ));
            }
            UseEffect::RestoreMana(amount) => {
                let cap = mana_capacity(&self.player).max(self.player.stats.mana);
                self.player.stats.mana = (self.player.stats.mana + amount).min(cap);
                self.say(format!(
                    "You used the {}. Your mana is now {}.",
                    item_name, self.player.stats.mana
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn handle_equip(&mut self, name: &str) -> Result<(), GameError> {
        let idx = self
            .player
            .find_inventory(name)
            .ok_or_else(|| GameError::ItemNotFound(name.to_string()))?;
        let item = &self.player.inventory[idx];
        let slot = item.equip_slot.ok_or_else(|| GameError::NotEquippable(item.name.clone()))?;
        if item.is_broken() {
            return Err(GameError::ItemBroken(item.name.clone()));
        }

        let item = self.player.inventory.remove(idx);
        let equipped_name = item.name.clone();
        if let Some(previous) = self.player.equipment.slot_mut(slot).replace(item) {
            self.say(format!(
                "You unequip the {} and put it in your inventory.",
                previous.name
            ));
            self.player.inventory.push(previous);
        }
        self.say(format!("You equip the {}.", equipped_name));
        Ok(())
    }

    pub(crate) fn handle_unequip(&mut self, slot_name: &str) -> Result<(), GameError> {
        let slot: EquipSlot = slot_name.parse().map_err(GameError::InvalidSlot)?;
        match self.player.equipment.slot_mut(slot).take() {
            Some(item) => {
                self.say(format!(
                    "You unequip the {} and place it in your inventory.",
                    item.name
                ));
                self.player.inventory.push(item);
            }
            None => self.say(format!("You have nothing equipped in the {} slot.", slot.as_str())),
        }
        Ok(())
    }

    fn at_guild(&mut self, action: &str) -> bool {
        if self.player.location == GUILD {
            return true;
        }
        self.say(format!("You must be at the Adventurer's Guild to {}.", action));
        false
    }

    pub(crate) fn handle_view_quests(&mut self) -> Result<(), GameError> {
        if self.at_guild("view quests") {
            let lines = render::quest_board(&self.catalog, &self.player);
            self.say_all(lines);
        }
        Ok(())
    }

    pub(crate) fn handle_accept_quest(&mut self, name: &str) -> Result<(), GameError> {
        if !self.at_guild("accept quests") {
            return Ok(());
        }
        let quest = self.catalog.quest_by_name(name)?.clone();
        match accept_quest(&mut self.player, &quest) {
            AcceptOutcome::Accepted => self.say(format!(
                "You have accepted the quest: \"{}\". Check your stats to see your quest log.",
                quest.name
            )),
            AcceptOutcome::AlreadyTaken => self.say(format!(
                "You have already accepted or completed the '{}' quest.",
                quest.name
            )),
        }
        Ok(())
    }

    pub(crate) fn handle_turn_in(&mut self, name: &str) -> Result<(), GameError> {
        if !self.at_guild("turn in quests") {
            return Ok(());
        }
        let quest = self.catalog.quest_by_name(name)?.clone();
        match turn_in(&mut self.player, &quest) {
            TurnInOutcome::NotActive => {
                self.say(format!("You don't have an active quest named '{}'.", name));
            }
            TurnInOutcome::Incomplete { progress, count } => {
                self.say(format!("You have not completed the objective for '{}' yet.", quest.name));
                self.say(format!("Progress: {}/{}", progress, count));
            }
            TurnInOutcome::Completed { gold, xp } => {
                log::info!("{} completed quest {}", self.player.name, quest.id);
                self.say(format!("Quest Complete: {}!", quest.name));
                self.say(format!("You receive {} gold and {} XP.", gold, xp));
                self.settle_experience();
            }
        }
        Ok(())
    }

    pub(crate) fn handle_change_class(&mut self) -> Result<(), GameError> {
        if self.player.location != GUILD {
            self.say("You can only change your class at the Adventurer's Guild.");
            return Ok(());
        }
        if self.player.stats.gold < CHANGE_CLASS_COST {
            return Err(GameError::InsufficientGold {
                needed: CHANGE_CLASS_COST,
                available: self.player.stats.gold,
            });
        }
        self.prompt = Some(PendingPrompt::ChangeClass {
            cost: CHANGE_CLASS_COST,
        });
        Ok(())
    }

    pub(crate) fn answer_prompt(&mut self, prompt: PendingPrompt, input: &str) {
        match prompt {
            PendingPrompt::ChangeClass { cost } => {
                let choice = input.parse::<Class>().ok().filter(|c| *c != self.player.class);
                let Some(class) = choice else {
                    self.say("Invalid choice or you chose your current class. No changes were made.");
                    return;
                };
                self.player.stats.gold -= cost;
                self.player.class = class;
                apply_stat_bonuses(&mut self.player);
                let max = effective_stats(&self.player).max_health;
                self.player.stats.health = self.player.stats.health.min(max);
                log::info!("{} retrained as {}", self.player.name, class);
                self.say(format!("You have paid {} gold and are now a {}!", cost, class));
                self.say("Your base stats have been updated to reflect your new class.");
            }
        }
    }
}
