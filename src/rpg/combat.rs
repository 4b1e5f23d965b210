//! Turn-based combat against a single enemy.
//!
//! An encounter lives in `GameSession::encounter` from `start_combat` until a
//! win, a flee or a defeat. Every input line while it is active is one call to
//! [`GameSession::combat_round`]. Actions that are rejected before anything
//! happens (an unknown spell, an ability on cooldown) re-prompt without giving
//! the enemy a turn.

use rand::Rng;

use crate::rpg::catalog::{DamageKind, DropEntry, EffectApplication, EnemyStats, EnemyTemplate};
use crate::rpg::commands::CombatCommand;
use crate::rpg::effects::{tick_effects, TickOutcome};
use crate::rpg::errors::GameError;
use crate::rpg::items::wear_equipped;
use crate::rpg::quest::record_kill;
use crate::rpg::racial::apply_resistance;
use crate::rpg::session::{GameSession, RunStatus};
use crate::rpg::stats::effective_stats;
use crate::rpg::types::{
    ActiveEffect, EquipSlot, ItemKind, Race, COOLDOWN_BATTLE_RAGE, COOLDOWN_HELLISH_REBUKE,
    COOLDOWN_LAY_ON_HANDS, FLAG_BATTLE_RAGE,
};

/// Multiplier on attack for the one swing after a battle rage.
const RAGE_ATTACK_FACTOR: f64 = 1.5;
/// Fraction of effective max health restored by lay on hands.
const LAY_ON_HANDS_FRACTION: f64 = 0.3;

/// The enemy in an encounter. Built field by field from its template so the
/// template is never touched by combat.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyInstance {
    pub id: String,
    pub name: String,
    pub description: String,
    pub stats: EnemyStats,
    pub drops: Vec<DropEntry>,
    pub damage_type: DamageKind,
    pub inflicts: Option<EffectApplication>,
    pub active_effects: Vec<ActiveEffect>,
}

impl EnemyInstance {
    pub fn from_template(template: &EnemyTemplate) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            stats: EnemyStats {
                health: template.stats.health,
                max_health: template.stats.max_health,
                attack: template.stats.attack,
                defense: template.stats.defense,
                gold: template.stats.gold,
                xp: template.stats.xp,
            },
            drops: template.drops.to_vec(),
            damage_type: template.damage_type,
            inflicts: template.inflicts.clone(),
            active_effects: Vec::new(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.stats.health <= 0
    }
}

/// One active fight. `enemy_id` is the template id the fight started from and
/// is what kill quests match against.
#[derive(Debug, Clone, PartialEq)]
pub struct Encounter {
    pub enemy_id: String,
    pub enemy: EnemyInstance,
}

/// What happens after the player's action resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundFlow {
    /// Action rejected; no time passes.
    Reprompt,
    EnemyTurn,
    /// The encounter already ended.
    Over,
}

impl GameSession {
    pub(crate) fn start_combat(&mut self, enemy_id: &str) -> Result<(), GameError> {
        let template = self.catalog.enemy(enemy_id)?;
        let enemy = EnemyInstance::from_template(template);
        log::info!("{} engages {}", self.player.name, enemy_id);
        self.say(format!("A wild {} appears!", enemy.name));
        self.say(enemy.description.clone());
        self.player.last_check = None;
        self.encounter = Some(Encounter {
            enemy_id: enemy_id.to_string(),
            enemy,
        });
        Ok(())
    }

    fn enemy_mut(&mut self) -> Option<&mut EnemyInstance> {
        self.encounter.as_mut().map(|e| &mut e.enemy)
    }

    fn enemy_dead(&self) -> bool {
        self.encounter.as_ref().map(|e| e.enemy.is_dead()).unwrap_or(false)
    }

    fn cooldown_active(&self, ability: &str) -> bool {
        self.player.cooldowns.get(ability).copied().unwrap_or(0) > 0
    }

    /// Resolve one combat input.
    pub(crate) fn combat_round(&mut self, command: CombatCommand) {
        if self.encounter.is_none() {
            return;
        }
        let command = self.gate_racial(command);
        if self.precheck(&command) == RoundFlow::Reprompt {
            return;
        }

        let mut lines = Vec::new();
        match tick_effects(&self.catalog, &mut self.player, &mut lines) {
            TickOutcome::Died => {
                self.say_all(lines);
                self.defeat();
                return;
            }
            TickOutcome::Prevented => {
                self.say_all(lines);
                self.enemy_turn();
                return;
            }
            TickOutcome::Ready => self.say_all(lines),
        }

        match self.player_action(command) {
            RoundFlow::Over | RoundFlow::Reprompt => return,
            RoundFlow::EnemyTurn => {}
        }
        if self.enemy_dead() {
            self.win_combat();
            return;
        }
        self.enemy_turn();
    }

    /// Racial abilities used by the wrong race are just wasted actions.
    fn gate_racial(&self, command: CombatCommand) -> CombatCommand {
        let allowed = match &command {
            CombatCommand::Rage => self.player.race == Race::Orc,
            CombatCommand::Heal => self.player.race == Race::Angel,
            CombatCommand::Reroll => self.player.race == Race::Halfling,
            _ => true,
        };
        if allowed {
            command
        } else {
            CombatCommand::Unknown(String::new())
        }
    }

    /// Reject actions that cannot happen. A rejected action prints why and
    /// leaves the round unspent.
    fn precheck(&mut self, command: &CombatCommand) -> RoundFlow {
        let refusal = match command {
            CombatCommand::Cast(spell) if spell.is_empty() => Some("Cast what? (e.g., cast fireball)".to_string()),
            CombatCommand::Cast(spell) => self.cast_refusal(spell),
            CombatCommand::Use(item) if item.is_empty() => Some("Use what? (e.g., use health potion)".to_string()),
            CombatCommand::Rage if self.cooldown_active(COOLDOWN_BATTLE_RAGE) => {
                Some("You can only use Battle Rage once per combat.".to_string())
            }
            CombatCommand::Heal if self.player.cooldowns.get(COOLDOWN_LAY_ON_HANDS) == Some(&self.clock.day) => {
                Some("You have already used Healing Hands today.".to_string())
            }
            CombatCommand::Reroll => {
                // Combat checks never record a retry, so this only reports.
                self.halfling_reroll();
                return RoundFlow::Reprompt;
            }
            _ => None,
        };
        match refusal {
            Some(line) => {
                log::debug!("combat action refused: {}", line);
                self.say(line);
                RoundFlow::Reprompt
            }
            None => RoundFlow::EnemyTurn,
        }
    }

    fn cast_refusal(&self, spell: &str) -> Option<String> {
        if !self.player.spells.iter().any(|s| s == spell) {
            return Some(GameError::UnknownSpell(spell.to_string()).to_string());
        }
        let Ok(damage) = self.catalog.spell_damage(spell) else {
            return Some(format!("The spell '{}' has no defined effect.", spell));
        };
        if self.player.stats.mana < damage.mana_cost {
            return Some(
                GameError::InsufficientMana {
                    needed: damage.mana_cost,
                    available: self.player.stats.mana,
                }
                .to_string(),
            );
        }
        None
    }

    fn player_action(&mut self, command: CombatCommand) -> RoundFlow {
        match command {
            CombatCommand::Attack => self.attack(),
            CombatCommand::Cast(spell) => {
                if let Err(err) = self.cast(&spell) {
                    self.report(err);
                }
            }
            CombatCommand::Use(item) => {
                if let Err(err) = self.handle_use(&item) {
                    self.report(err);
                }
            }
            CombatCommand::Flee => {
                self.say("You manage to escape from the battle!");
                self.end_combat(true);
                return RoundFlow::Over;
            }
            CombatCommand::Rage => {
                self.say("You fly into a battle rage, your next attack will be devastating but you'll be left open!");
                self.player.set_flag(FLAG_BATTLE_RAGE, true);
                self.player.cooldowns.insert(COOLDOWN_BATTLE_RAGE.to_string(), 1);
            }
            CombatCommand::Heal => self.lay_on_hands(),
            CombatCommand::Reroll => return RoundFlow::Reprompt,
            CombatCommand::Unknown(_) => {
                self.say("Invalid combat action. The enemy takes the opportunity to strike!");
            }
        }
        if self.is_over() || self.encounter.is_none() {
            RoundFlow::Over
        } else {
            RoundFlow::EnemyTurn
        }
    }

    fn attack(&mut self) {
        let stats = effective_stats(&self.player);
        let raging = self.player.flag(FLAG_BATTLE_RAGE);
        let mut attack = stats.attack;
        if raging {
            attack = (f64::from(attack) * RAGE_ATTACK_FACTOR).floor() as i32;
            self.say("You attack with furious rage!");
        }
        let Some(enemy) = self.enemy_mut() else {
            return;
        };
        let damage = (attack - enemy.stats.defense).max(1);
        enemy.stats.health -= damage;
        let line = format!("You attack the {} for {} damage.", enemy.name, damage);

        if let Some(broken) = wear_equipped(&mut self.player, EquipSlot::Weapon, 1) {
            self.say(format!("Your {} has broken!", broken.name));
        }
        self.say(line);
        if raging {
            self.player.set_flag(FLAG_BATTLE_RAGE, false);
        }
    }

    fn cast(&mut self, spell: &str) -> Result<(), GameError> {
        let damage_type = self.catalog.spell_damage(spell)?.clone();
        let intelligence = effective_stats(&self.player).intelligence;
        self.player.stats.mana -= damage_type.mana_cost;
        let damage = damage_type.base_damage + intelligence.div_euclid(5);
        let Some(enemy) = self.enemy_mut() else {
            return Ok(());
        };
        enemy.stats.health -= damage;
        let line = format!(
            "You cast {}, dealing {} {} damage to the {}.",
            spell, damage, damage_type.name, enemy.name
        );
        let alive = !enemy.is_dead();
        self.say(line);

        if let Some(inflict) = damage_type.inflicts.filter(|_| alive) {
            if self.rng().gen::<f64>() < inflict.chance {
                self.apply_effect_to_enemy(&inflict.effect_id, inflict.turns)?;
            }
        }
        Ok(())
    }

    fn lay_on_hands(&mut self) {
        let max = effective_stats(&self.player).max_health;
        let amount = (f64::from(max) * LAY_ON_HANDS_FRACTION).floor() as i32;
        self.player.stats.health = (self.player.stats.health + amount).min(max);
        self.player
            .cooldowns
            .insert(COOLDOWN_LAY_ON_HANDS.to_string(), self.clock.day);
        self.say(format!("A divine light surrounds you, healing you for {} HP.", amount));
        self.say(format!("Your health is now {}/{}.", self.player.stats.health, max));
    }

    fn enemy_turn(&mut self) {
        let mut lines = Vec::new();
        let Some(encounter) = self.encounter.as_mut() else {
            return;
        };
        let outcome = tick_effects(&self.catalog, &mut encounter.enemy, &mut lines);
        self.say_all(lines);
        match outcome {
            TickOutcome::Died => {
                self.win_combat();
                return;
            }
            TickOutcome::Prevented => return,
            TickOutcome::Ready => {}
        }

        let stats = effective_stats(&self.player);
        let mut defense = stats.defense;
        if self.player.flag(FLAG_BATTLE_RAGE) {
            defense /= 2;
            self.say("Your rage leaves you open to attack!");
        }
        let Some(enemy) = self.encounter.as_ref().map(|e| e.enemy.clone()) else {
            return;
        };
        let raw = (enemy.stats.attack - defense).max(1);
        let (damage, note) = apply_resistance(self.player.race, enemy.damage_type, raw);
        if let Some(note) = note {
            self.say(note);
        }

        for slot in EquipSlot::ALL {
            let is_armor = self
                .player
                .equipment
                .slot(slot)
                .map(|i| i.kind == ItemKind::Armor)
                .unwrap_or(false);
            if is_armor {
                if let Some(broken) = wear_equipped(&mut self.player, slot, 1) {
                    self.say(format!("Your {} has broken!", broken.name));
                }
            }
        }

        self.player.stats.health -= damage;
        self.say(format!("The {} attacks you for {} damage.", enemy.name, damage));

        if let Some(inflict) = &enemy.inflicts {
            if self.player.stats.health > 0 && self.rng().gen::<f64>() < inflict.chance {
                if let Err(err) = self.apply_effect_to_player(&inflict.effect_id, inflict.turns) {
                    self.report(err);
                }
            }
        }

        if self.player.race == Race::Tiefling && !self.cooldown_active(COOLDOWN_HELLISH_REBUKE) {
            let rebuke = stats.intelligence / 2;
            if rebuke > 0 {
                self.say(format!(
                    "As you are hit, you lash out with infernal fire, dealing {} damage back!",
                    rebuke
                ));
                if let Some(enemy) = self.enemy_mut() {
                    enemy.stats.health -= rebuke;
                }
                self.player
                    .cooldowns
                    .insert(COOLDOWN_HELLISH_REBUKE.to_string(), 1);
            }
        }

        if self.player.stats.health <= 0 {
            self.defeat();
        } else if self.enemy_dead() {
            self.win_combat();
        }
    }

    fn win_combat(&mut self) {
        let Some(encounter) = self.encounter.take() else {
            return;
        };
        let enemy = encounter.enemy;
        self.say(format!("You have defeated the {}!", enemy.name));
        self.player.stats.gold += enemy.stats.gold;
        self.player.stats.experience += enemy.stats.xp;
        self.say(format!(
            "You gain {} gold and {} experience points.",
            enemy.stats.gold, enemy.stats.xp
        ));
        self.settle_experience();

        for drop in &enemy.drops {
            if self.rng.gen::<f64>() >= drop.chance {
                continue;
            }
            match self.items.create(&self.catalog, &mut self.rng, &drop.item_id, true) {
                Ok(item) => {
                    self.say(format!("The {} dropped: {}!", enemy.name, item.name));
                    self.player.inventory.push(item);
                }
                Err(err) => self.report(err),
            }
        }

        for update in record_kill(&mut self.player, &self.catalog, &encounter.enemy_id) {
            self.say(format!(
                "Quest progress: {} ({}/{})",
                update.quest_name, update.progress, update.count
            ));
        }
        self.learn_form(&encounter.enemy_id);
        log::info!("{} defeated {}", self.player.name, encounter.enemy_id);
        self.end_combat(false);
    }

    /// Player death. Terminal for the session.
    pub(crate) fn defeat(&mut self) {
        self.encounter = None;
        self.say("You have been defeated. Your vision fades to black...");
        self.say("--- GAME OVER ---");
        self.status = RunStatus::Defeated;
        log::info!("{} was defeated", self.player.name);
    }

    /// Clear the encounter and per-combat state. Daily cooldowns and status
    /// effects stay.
    fn end_combat(&mut self, fled: bool) {
        self.encounter = None;
        self.player.last_check = None;
        self.player.set_flag(FLAG_BATTLE_RAGE, false);
        self.player.cooldowns.remove(COOLDOWN_BATTLE_RAGE);
        self.player.cooldowns.remove(COOLDOWN_HELLISH_REBUKE);
        if fled {
            log::info!("{} fled", self.player.name);
        } else {
            self.say("You catch your breath and look around.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpg::catalog::Catalog;
    use crate::rpg::stats::apply_stat_bonuses;
    use crate::rpg::types::{Class, Player};
    use crate::rpg::world_seed::canonical_world;

    fn session(race: Race, class: Class) -> GameSession {
        let mut player = Player::new("Tess", race, class, "dungeon");
        apply_stat_bonuses(&mut player);
        player.stats.health = player.stats.max_health;
        GameSession::with_seed(Catalog::builtin(), canonical_world(), player, 7)
    }

    fn fight(s: &mut GameSession, enemy: &str) {
        s.start_combat(enemy).unwrap();
        s.take_output();
    }

    #[test]
    fn enemy_instance_is_independent_of_template() {
        let catalog = Catalog::builtin();
        let template = catalog.enemy("goblin").unwrap();
        let mut enemy = EnemyInstance::from_template(template);
        enemy.stats.health = 1;
        assert_eq!(catalog.enemy("goblin").unwrap().stats.health, template.stats.health);
        assert_ne!(enemy.stats.health, template.stats.health);
    }

    #[test]
    fn unknown_spell_does_not_spend_the_round() {
        let mut s = session(Race::Human, Class::Mage);
        fight(&mut s, "goblin");
        let health = s.player.stats.health;
        s.combat_round(CombatCommand::Cast("meteor".into()));
        assert_eq!(s.player.stats.health, health);
        assert!(s.in_combat());
    }

    #[test]
    fn insufficient_mana_leaves_everything_untouched() {
        let mut s = session(Race::Human, Class::Mage);
        fight(&mut s, "goblin");
        s.player.stats.mana = 0;
        let health = s.player.stats.health;
        let enemy_health = s.encounter.as_ref().unwrap().enemy.stats.health;
        s.combat_round(CombatCommand::Cast("fireball".into()));
        assert_eq!(s.player.stats.mana, 0);
        assert_eq!(s.player.stats.health, health);
        assert_eq!(s.encounter.as_ref().unwrap().enemy.stats.health, enemy_health);
    }

    #[test]
    fn fleeing_ends_without_an_enemy_turn() {
        let mut s = session(Race::Human, Class::Warrior);
        fight(&mut s, "goblin");
        let health = s.player.stats.health;
        s.combat_round(CombatCommand::Flee);
        assert!(!s.in_combat());
        assert_eq!(s.player.stats.health, health);
        assert_eq!(s.player.stats.gold, 50);
    }

    #[test]
    fn killing_blow_skips_the_enemy_turn() {
        let mut s = session(Race::Human, Class::Warrior);
        fight(&mut s, "goblin");
        s.enemy_mut().unwrap().stats.health = 1;
        let health = s.player.stats.health;
        s.combat_round(CombatCommand::Attack);
        assert!(!s.in_combat());
        assert_eq!(s.player.stats.health, health);
        assert!(s.player.stats.gold > 50);
    }

    #[test]
    fn rage_is_once_per_combat_and_resets_after() {
        let mut s = session(Race::Orc, Class::Warrior);
        fight(&mut s, "goblin");
        s.combat_round(CombatCommand::Rage);
        assert!(s.player.flag(FLAG_BATTLE_RAGE));
        let health = s.player.stats.health;
        s.combat_round(CombatCommand::Rage);
        assert_eq!(s.player.stats.health, health);
        s.combat_round(CombatCommand::Flee);
        assert!(!s.player.flag(FLAG_BATTLE_RAGE));
        assert!(!s.player.cooldowns.contains_key(COOLDOWN_BATTLE_RAGE));
    }

    #[test]
    fn lay_on_hands_is_once_per_day() {
        let mut s = session(Race::Angel, Class::Cleric);
        fight(&mut s, "goblin");
        s.player.stats.health = 40;
        s.combat_round(CombatCommand::Heal);
        assert_eq!(s.player.cooldowns.get(COOLDOWN_LAY_ON_HANDS), Some(&s.clock.day));
        let after_first = s.player.stats.health;
        s.combat_round(CombatCommand::Heal);
        assert_eq!(s.player.stats.health, after_first);
    }

    #[test]
    fn lethal_hit_ends_the_game() {
        let mut s = session(Race::Human, Class::Mage);
        fight(&mut s, "goblin");
        s.player.stats.health = 1;
        s.combat_round(CombatCommand::Unknown("dance".into()));
        assert_eq!(s.status, RunStatus::Defeated);
        assert!(!s.in_combat());
    }
}
