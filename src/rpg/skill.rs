//! Probabilistic skill checks and the halfling reroll.

use rand::Rng;

use crate::rpg::session::GameSession;
use crate::rpg::stats::effective_stats;
use crate::rpg::types::{LastCheck, Race, RetryCommand, StatBlock, FLAG_HALFLING_LUCK};

pub const MIN_CHANCE: i32 = 5;
pub const MAX_CHANCE: i32 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skill {
    Dexterity,
    Stealth,
    Intelligence,
    Wisdom,
    Perception,
    Strength,
    Mining,
    Chopping,
    Crafting,
}

impl Skill {
    pub fn as_str(self) -> &'static str {
        match self {
            Skill::Dexterity => "dexterity",
            Skill::Stealth => "stealth",
            Skill::Intelligence => "intelligence",
            Skill::Wisdom => "wisdom",
            Skill::Perception => "perception",
            Skill::Strength => "strength",
            Skill::Mining => "mining",
            Skill::Chopping => "chopping",
            Skill::Crafting => "crafting",
        }
    }

    /// Ability score that drives this skill, if any.
    fn governing_score(self, stats: &StatBlock) -> Option<i32> {
        match self {
            Skill::Dexterity | Skill::Stealth => Some(stats.dexterity),
            Skill::Intelligence => Some(stats.intelligence),
            Skill::Wisdom | Skill::Perception => Some(stats.wisdom),
            Skill::Strength | Skill::Mining | Skill::Chopping => Some(stats.strength),
            Skill::Crafting => None,
        }
    }
}

/// Flat racial bonus to a skill, in percentage points.
pub fn racial_skill_bonus(race: Race, skill: Skill) -> i32 {
    match (race, skill) {
        (Race::Dwarf, Skill::Mining) | (Race::Dwarf, Skill::Crafting) => 10,
        _ => 0,
    }
}

/// Final success chance: `base + (score - 10) * 2 + racial`, clamped to [5, 95].
pub fn resolved_chance(skill: Skill, base: i32, stats: &StatBlock, race: Race) -> i32 {
    let modifier = skill
        .governing_score(stats)
        .map(|score| (score - 10) * 2)
        .unwrap_or(0);
    (base + modifier + racial_skill_bonus(race, skill)).clamp(MIN_CHANCE, MAX_CHANCE)
}

/// Uniform draw in [0, 100); succeeds when the draw is below `chance`.
pub fn roll_against<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    rng.gen::<f64>() * 100.0 < chance
}

impl GameSession {
    /// Roll a raw check with no modifiers and remember it as the last check.
    pub(crate) fn make_check(&mut self, kind: &str, chance: f64, retry: Option<RetryCommand>) -> bool {
        let success = roll_against(self.rng(), chance);
        log::trace!("check {} at {:.0}% -> {}", kind, chance, success);
        self.player.last_check = Some(LastCheck {
            kind: kind.to_string(),
            success,
            retry,
        });
        success
    }

    /// Skill check against the player's effective stats. `retry` is the command
    /// a reroll re-dispatches if this check fails.
    pub(crate) fn skill_check(&mut self, skill: Skill, base: i32, retry: Option<RetryCommand>) -> bool {
        let stats = effective_stats(&self.player);
        if racial_skill_bonus(self.player.race, skill) > 0 {
            self.say("(Your dwarven stonecunning aids you.)");
        }
        let chance = resolved_chance(skill, base, &stats, self.player.race);
        self.say(format!(
            "(You attempt a {} check... Success chance: {}%)",
            skill.as_str(),
            chance
        ));
        self.make_check(skill.as_str(), f64::from(chance), retry)
    }

    /// Halfling luck: re-run the command behind a failed check, once per day.
    /// Returns true when a retry actually ran.
    pub(crate) fn halfling_reroll(&mut self) -> bool {
        if self.player.race != Race::Halfling {
            self.say("Only halflings can call on that kind of luck.");
            return false;
        }
        if self.player.flag(FLAG_HALFLING_LUCK) {
            self.say("You've already used your Halfling Luck today.");
            return false;
        }
        let retry = match self.player.last_check.as_ref() {
            Some(check) if check.failed() => check.retry.clone(),
            _ => None,
        };
        let Some(retry) = retry else {
            self.say("There's nothing to re-roll right now.");
            return false;
        };
        self.say("With a bit of uncanny luck, you try again!");
        self.player.set_flag(FLAG_HALFLING_LUCK, true);
        self.player.last_check = None;
        log::debug!("halfling reroll of '{}'", retry.as_input());
        self.dispatch_input(&retry.as_input());
        true
    }
}
