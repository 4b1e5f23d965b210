//! The game session aggregate and the top-level command dispatcher.
//!
//! `GameSession` owns everything mutable in a running game: the player, the
//! world, the clock, the item id counter, the active encounter and the RNG.
//! Each call to [`GameSession::handle_input`] resolves exactly one input line
//! and returns the transcript it produced.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use crate::rpg::catalog::Catalog;
use crate::rpg::clock::Clock;
use crate::rpg::combat::Encounter;
use crate::rpg::commands::{parse_command, CombatCommand, GameCommand};
use crate::rpg::errors::GameError;
use crate::rpg::items::ItemFactory;
use crate::rpg::progression::{check_for_level_up, level_up_banner};
use crate::rpg::racial::regenerate;
use crate::rpg::render;
use crate::rpg::world::{ActionEffect, LocationAction, OnEnter, World};
use crate::rpg::types::{Class, Player, FLAG_HALFLING_LUCK};

pub const DEFAULT_SAVEGAME: &str = "savegame.json";
pub const DEFAULT_AUTOSAVE: &str = "autosave.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Playing,
    /// Lost a fight. Terminal.
    Defeated,
    Quit,
}

/// A question waiting for the next input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingPrompt {
    ChangeClass { cost: i32 },
}

/// Where saves go. With no directory, saving is disabled and autosave is a
/// no-op.
#[derive(Debug, Clone)]
pub struct SaveSettings {
    pub dir: Option<PathBuf>,
    pub savegame_file: String,
    pub autosave_file: String,
    pub autosave: bool,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            dir: None,
            savegame_file: DEFAULT_SAVEGAME.to_string(),
            autosave_file: DEFAULT_AUTOSAVE.to_string(),
            autosave: true,
        }
    }
}

/// Trim and lowercase a line of input. Save slot names are file names, so the
/// argument to `save`/`load` keeps its case.
fn normalize_input(raw: &str) -> String {
    let trimmed = raw.trim();
    let (word, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    let verb = word.to_lowercase();
    match verb.as_str() {
        "save" | "load" if !rest.trim().is_empty() => format!("{} {}", verb, rest.trim()),
        _ => trimmed.to_lowercase(),
    }
}

pub struct GameSession {
    pub catalog: Catalog,
    pub world: World,
    pub player: Player,
    pub clock: Clock,
    pub items: ItemFactory,
    pub encounter: Option<Encounter>,
    pub prompt: Option<PendingPrompt>,
    pub status: RunStatus,
    pub save: SaveSettings,
    pub(crate) rng: StdRng,
    out: Vec<String>,
}

impl GameSession {
    pub fn new(catalog: Catalog, world: World, player: Player, rng: StdRng) -> Self {
        Self {
            catalog,
            world,
            player,
            clock: Clock::default(),
            items: ItemFactory::default(),
            encounter: None,
            prompt: None,
            status: RunStatus::Playing,
            save: SaveSettings::default(),
            rng,
            out: Vec::new(),
        }
    }

    pub fn with_seed(catalog: Catalog, world: World, player: Player, seed: u64) -> Self {
        Self::new(catalog, world, player, StdRng::seed_from_u64(seed))
    }

    pub fn with_save_settings(mut self, save: SaveSettings) -> Self {
        self.save = save;
        self
    }

    /// Replace the RNG. Tests use this to pin the outcome of the next roll.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub(crate) fn say(&mut self, line: impl Into<String>) {
        self.out.push(line.into());
    }

    pub(crate) fn say_all(&mut self, lines: Vec<String>) {
        self.out.extend(lines);
    }

    pub(crate) fn take_output(&mut self) -> String {
        std::mem::take(&mut self.out).join("\n")
    }

    pub fn is_over(&self) -> bool {
        self.status != RunStatus::Playing
    }

    pub fn in_combat(&self) -> bool {
        self.encounter.is_some()
    }

    /// The view shown before the first command.
    pub fn opening(&mut self) -> String {
        self.show_followup();
        self.take_output()
    }

    /// Resolve one line of player input and return everything it printed,
    /// followed by whatever the player should see next.
    pub fn handle_input(&mut self, raw: &str) -> String {
        if self.is_over() {
            return String::new();
        }
        let input = normalize_input(raw);
        self.dispatch_input(&input);
        self.show_followup();
        self.take_output()
    }

    /// Load `slot` as typed, outside the command parser. Used for `--load`.
    pub fn load_slot(&mut self, slot: &str) -> String {
        if let Err(err) = self.handle_load(Some(slot)) {
            self.report(err);
        }
        self.show_followup();
        self.take_output()
    }

    /// Route input to the pending prompt, the encounter or the world.
    pub(crate) fn dispatch_input(&mut self, input: &str) {
        if let Some(prompt) = self.prompt.take() {
            self.answer_prompt(prompt, input);
        } else if self.encounter.is_some() {
            self.combat_round(CombatCommand::parse(input));
        } else {
            let command = parse_command(input);
            if let Err(err) = self.run_command(command) {
                self.report(err);
            }
        }
    }

    /// Print a recoverable error. Player mistakes log at debug, data and IO
    /// problems at warn.
    pub(crate) fn report(&mut self, err: GameError) {
        if err.is_player_mistake() {
            log::debug!("command rejected: {}", err);
        } else {
            log::warn!("command failed: {}", err);
        }
        self.say(err.to_string());
    }

    fn show_followup(&mut self) {
        match self.status {
            RunStatus::Playing => {}
            RunStatus::Defeated | RunStatus::Quit => return,
        }
        if let Some(prompt) = self.prompt.clone() {
            let question = self.prompt_question(&prompt);
            self.say(question);
        } else if let Some(encounter) = self.encounter.as_ref() {
            let lines = render::combat_status(&self.player, &encounter.enemy);
            self.say_all(lines);
        } else {
            let lines = render::location_view(&self.world, &self.catalog, &self.player, &self.clock);
            self.say_all(lines);
        }
    }

    fn run_command(&mut self, command: GameCommand) -> Result<(), GameError> {
        if command != GameCommand::Reroll {
            self.player.last_check = None;
        }
        match command {
            GameCommand::Empty => Ok(()),
            GameCommand::TalkTo(name) => self.handle_talk(&name),
            GameCommand::ViewQuests => self.handle_view_quests(),
            GameCommand::AcceptQuest(name) => self.handle_accept_quest(&name),
            GameCommand::TurnIn(name) => self.handle_turn_in(&name),
            GameCommand::ChangeClass => self.handle_change_class(),
            GameCommand::Save(slot) => self.handle_save(slot.as_deref()),
            GameCommand::Load(slot) => self.handle_load(slot.as_deref()),
            GameCommand::Transform(form) => self.handle_transform(&form),
            GameCommand::Revert => {
                self.handle_revert();
                Ok(())
            }
            GameCommand::Buy(name) => self.handle_buy(&name),
            GameCommand::Cast(_) => {
                self.say("You can only cast spells in combat.");
                Ok(())
            }
            GameCommand::Repair(name) => self.handle_repair(&name),
            GameCommand::Chop => self.handle_chop(),
            GameCommand::Craft(name) => self.handle_craft(&name, "craft"),
            GameCommand::Smelt(name) => self.handle_smelt(&name),
            GameCommand::Use(name) => self.handle_use(&name),
            GameCommand::Inventory => {
                let lines = render::inventory_view(&self.player);
                self.say_all(lines);
                Ok(())
            }
            GameCommand::Equip(name) => self.handle_equip(&name),
            GameCommand::Unequip(slot) => self.handle_unequip(&slot),
            GameCommand::Stats => {
                let lines = render::character_sheet(&self.player, &self.catalog);
                self.say_all(lines);
                Ok(())
            }
            GameCommand::Equipment => {
                let lines = render::equipment_view(&self.player);
                self.say_all(lines);
                Ok(())
            }
            GameCommand::Look(target) => self.handle_look(target.as_deref()),
            GameCommand::Open(target) => self.handle_open(&target),
            GameCommand::Reroll => {
                self.halfling_reroll();
                Ok(())
            }
            GameCommand::Quit => {
                self.say("Thanks for playing!");
                self.status = RunStatus::Quit;
                Ok(())
            }
            GameCommand::Other { verb, args } => self.run_location_verb(&verb, &args),
        }
    }

    /// Look the input up in the current location's action table. The whole
    /// input is tried first so that multi-word places like "adventurers guild"
    /// resolve; a bare verb is only matched when it has no arguments.
    fn run_location_verb(&mut self, verb: &str, args: &str) -> Result<(), GameError> {
        let location = self.world.location(&self.player.location)?;
        let full = if args.is_empty() {
            verb.to_string()
        } else {
            format!("{} {}", verb, args)
        };
        let action = location
            .actions
            .get(&full)
            .or_else(|| if args.is_empty() { location.actions.get(verb) } else { None })
            .cloned();
        match action {
            Some(action) => self.run_location_action(action),
            None => Err(GameError::InvalidAction(full)),
        }
    }

    pub(crate) fn run_location_action(&mut self, action: LocationAction) -> Result<(), GameError> {
        if let ActionEffect::TravelIf { to, hours, requires_item, denied } = &action.effect {
            if !self.player.has_item(requires_item) {
                self.say(denied.clone());
                return Ok(());
            }
            if let Some(text) = &action.narration {
                self.say(text.clone());
            }
            return self.travel(to, *hours);
        }
        if let Some(text) = &action.narration {
            self.say(text.clone());
        }
        match action.effect {
            ActionEffect::Travel { to, hours } => self.travel(&to, hours),
            ActionEffect::Move { to } => {
                self.world.location(&to)?;
                self.player.location = to;
                Ok(())
            }
            ActionEffect::Sleep { hours } => {
                self.advance_time(hours);
                Ok(())
            }
            ActionEffect::StartCombat { enemy } => self.start_combat(&enemy),
            ActionEffect::Mine => self.handle_mine(),
            ActionEffect::Prospect => self.handle_prospect(),
            ActionEffect::Descend => self.handle_descend(),
            ActionEffect::MineUp => self.handle_lift_up(),
            ActionEffect::MineDown => {
                self.handle_lift_down();
                Ok(())
            }
            ActionEffect::TravelIf { .. } => Ok(()),
        }
    }

    /// Move to `to`, spend `hours`, fire the arrival hook and autosave.
    pub fn travel(&mut self, to: &str, hours: u32) -> Result<(), GameError> {
        self.world.location(to)?;
        self.player.location = to.to_string();
        if hours > 0 {
            self.advance_time(hours);
        }
        self.run_on_enter(to)?;
        log::debug!("{} travelled to {}", self.player.name, to);
        self.autosave();
        Ok(())
    }

    fn run_on_enter(&mut self, location_id: &str) -> Result<(), GameError> {
        let location = self.world.location_mut(location_id)?;
        match location.on_enter.clone() {
            Some(OnEnter::FirstVisitMessage { message }) if !location.visited => {
                location.visited = true;
                self.say(message);
            }
            _ => {}
        }
        Ok(())
    }

    /// Move the clock forward, regenerating hourly and restocking shops when a
    /// new day starts.
    pub fn advance_time(&mut self, hours: u32) {
        self.say(format!("({} hour(s) pass.)", hours));
        let days = self.clock.advance(hours);
        for _ in 0..hours {
            regenerate(&mut self.player);
        }
        if days > 0 {
            self.say("A new day has dawned!");
            for id in self.world.restock_all(self.clock.day) {
                self.say(format!("The {} has restocked its items.", id));
            }
            self.player.set_flag(FLAG_HALFLING_LUCK, false);
            log::debug!("day {} begins", self.clock.day);
        }
    }

    /// Run the level-up loop and print a banner per level gained.
    pub(crate) fn settle_experience(&mut self) {
        for up in check_for_level_up(&mut self.player) {
            log::info!("{} reached level {}", self.player.name, up.level);
            self.say_all(level_up_banner(&up));
        }
    }

    fn prompt_question(&self, prompt: &PendingPrompt) -> String {
        match prompt {
            PendingPrompt::ChangeClass { cost } => {
                let options: Vec<&str> = Class::ALL
                    .iter()
                    .filter(|c| **c != self.player.class)
                    .map(|c| c.as_str())
                    .collect();
                format!(
                    "It will cost {} gold to retrain. Choose a new class ({}):",
                    cost,
                    options.join(", ")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_lowercased_except_slot_names() {
        assert_eq!(normalize_input("  Talk To Elara "), "talk to elara");
        assert_eq!(normalize_input("LOAD MySave.json"), "load MySave.json");
        assert_eq!(normalize_input("Save  Hero_1"), "save Hero_1");
        assert_eq!(normalize_input("SAVE"), "save");
    }
}
