//! Status effects: application, refresh and per-round ticking.

use crate::rpg::catalog::Catalog;
use crate::rpg::combat::EnemyInstance;
use crate::rpg::errors::GameError;
use crate::rpg::session::GameSession;
use crate::rpg::types::{ActiveEffect, Player, Race};

/// Anything that can carry status effects in combat.
pub trait Afflicted {
    fn display_name(&self) -> &str;
    /// Current health and active effects, borrowed together.
    fn vitals_mut(&mut self) -> (&mut i32, &mut Vec<ActiveEffect>);
}

impl Afflicted for Player {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn vitals_mut(&mut self) -> (&mut i32, &mut Vec<ActiveEffect>) {
        (&mut self.stats.health, &mut self.active_effects)
    }
}

impl Afflicted for EnemyInstance {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn vitals_mut(&mut self) -> (&mut i32, &mut Vec<ActiveEffect>) {
        (&mut self.stats.health, &mut self.active_effects)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The target may act this round.
    Ready,
    /// An effect such as frozen or shocked stops the target acting.
    Prevented,
    /// Damage over time brought health to zero.
    Died,
}

/// Add an effect, or extend an existing one to the longer duration. Effects
/// never stack.
pub fn add_or_refresh(effects: &mut Vec<ActiveEffect>, effect_id: &str, turns: u32) {
    match effects.iter_mut().find(|e| e.effect_id == effect_id) {
        Some(existing) => existing.turns_remaining = existing.turns_remaining.max(turns),
        None => effects.push(ActiveEffect {
            effect_id: effect_id.to_string(),
            turns_remaining: turns,
        }),
    }
}

/// Run one round of effects on `target`: damage over time, action prevention,
/// then duration countdown. Unknown effect ids are dropped. Processing stops at
/// the first lethal tick.
pub fn tick_effects<T: Afflicted + ?Sized>(
    catalog: &Catalog,
    target: &mut T,
    messages: &mut Vec<String>,
) -> TickOutcome {
    let name = target.display_name().to_string();
    let (health, effects) = target.vitals_mut();
    let mut prevented = false;
    let mut idx = effects.len();
    while idx > 0 {
        idx -= 1;
        let Some(def) = catalog.effects.get(&effects[idx].effect_id) else {
            log::debug!("dropping unknown effect '{}' from {}", effects[idx].effect_id, name);
            effects.remove(idx);
            continue;
        };
        if def.damage_per_turn > 0 {
            *health -= def.damage_per_turn;
            messages.push(format!(
                "{} takes {} damage from being {}.",
                name, def.damage_per_turn, def.name
            ));
            if *health <= 0 {
                return TickOutcome::Died;
            }
        }
        if def.prevents_action {
            prevented = true;
            messages.push(format!("{} is {} and cannot act!", name, def.name));
        }
        let effect = &mut effects[idx];
        effect.turns_remaining = effect.turns_remaining.saturating_sub(1);
        if effect.turns_remaining == 0 {
            messages.push(format!("{} is no longer {}.", name, def.name));
            effects.remove(idx);
        }
    }
    if prevented {
        TickOutcome::Prevented
    } else {
        TickOutcome::Ready
    }
}

fn dwarf_can_resist(effect_id: &str) -> bool {
    matches!(effect_id, "burning" | "freezing" | "shocked" | "poison")
}

impl GameSession {
    /// Apply an effect to the player. Dwarves get a saving throw against
    /// elemental and poison effects. Returns true if the effect landed.
    pub(crate) fn apply_effect_to_player(&mut self, effect_id: &str, turns: u32) -> Result<bool, GameError> {
        let name = self.catalog.effect(effect_id)?.name.clone();
        if self.player.race == Race::Dwarf && dwarf_can_resist(effect_id) {
            if self.make_check("savingThrow", 60.0, None) {
                self.say("Your hardy nature helps you shrug off the effect!");
                return Ok(false);
            }
            self.say("You fail to resist the effect.");
        }
        add_or_refresh(&mut self.player.active_effects, effect_id, turns);
        self.say(format!("You are {}!", name));
        Ok(true)
    }

    pub(crate) fn apply_effect_to_enemy(&mut self, effect_id: &str, turns: u32) -> Result<bool, GameError> {
        let name = self.catalog.effect(effect_id)?.name.clone();
        let Some(encounter) = self.encounter.as_mut() else {
            return Ok(false);
        };
        add_or_refresh(&mut encounter.enemy.active_effects, effect_id, turns);
        let line = format!("The {} is {}!", encounter.enemy.name, name);
        self.say(line);
        Ok(true)
    }
}
