//! Racial traits: damage resistances, regeneration and shapeshifting.

use crate::rpg::catalog::DamageKind;
use crate::rpg::errors::GameError;
use crate::rpg::session::GameSession;
use crate::rpg::stats::effective_stats;
use crate::rpg::types::{Player, Race, Transform};

/// Scale incoming damage for the defender's race. Returns the new damage and
/// the line to print when a modifier applied.
pub fn apply_resistance(race: Race, kind: DamageKind, damage: i32) -> (i32, Option<&'static str>) {
    let (factor, line) = match (race, kind) {
        (Race::Undead, DamageKind::Holy) | (Race::Undead, DamageKind::Fire) => {
            (1.5, "The attack is super effective against your undead form!")
        }
        (Race::Demon, DamageKind::Holy) => (1.5, "The holy attack sears your demonic flesh!"),
        (Race::Aasimar, DamageKind::Holy) | (Race::Aasimar, DamageKind::Necrotic) => {
            (0.5, "Your celestial blood resists the damage!")
        }
        _ => return (damage, None),
    };
    ((f64::from(damage) * factor).floor() as i32, Some(line))
}

/// One hour of lizardman regeneration: +1 health up to the effective maximum.
pub fn regenerate(player: &mut Player) {
    if player.race != Race::Lizardman {
        return;
    }
    let max = effective_stats(player).max_health;
    if player.stats.health < max {
        player.stats.health = (player.stats.health + 1).min(max);
    }
}

impl GameSession {
    pub(crate) fn handle_transform(&mut self, form: &str) -> Result<(), GameError> {
        if self.player.race != Race::Shapeshifter {
            self.say("Only shapeshifters can transform.");
            return Ok(());
        }
        if form.is_empty() {
            self.say("Transform into what? Use 'transform <creature>'.");
            return Ok(());
        }
        if !self.player.known_forms.iter().any(|f| f == form) {
            self.say(format!("You don't know how to transform into a {}.", form));
            return Ok(());
        }
        if self.player.transform.is_transformed() {
            self.say("You must revert to your original form first.");
            return Ok(());
        }
        let template = self.catalog.enemy(form)?;
        let form_name = template.name.clone();
        self.player.transform = Transform::Transformed {
            form_id: template.id.clone(),
            form_name: form_name.clone(),
            form_stats: template.form_bonuses(),
            saved_base_stats: self.player.stats.clone(),
        };
        let max = effective_stats(&self.player).max_health;
        self.player.stats.health = self.player.stats.health.min(max);
        log::debug!("{} transformed into {}", self.player.name, form);
        self.say(format!("You transform into a {}!", form_name));
        Ok(())
    }

    pub(crate) fn handle_revert(&mut self) {
        if self.player.race != Race::Shapeshifter {
            self.say("Only shapeshifters can revert their form.");
            return;
        }
        match std::mem::take(&mut self.player.transform) {
            Transform::Natural => self.say("You are already in your original form."),
            Transform::Transformed { saved_base_stats, .. } => {
                self.player.stats = saved_base_stats;
                self.say("You revert back to your original form.");
            }
        }
    }

    /// A shapeshifter who defeats a creature learns its form.
    pub(crate) fn learn_form(&mut self, enemy_id: &str) {
        if self.player.race != Race::Shapeshifter || self.player.known_forms.iter().any(|f| f == enemy_id) {
            return;
        }
        self.player.known_forms.push(enemy_id.to_string());
        self.say(format!(
            "You study the fallen creature. You can now 'transform {}'.",
            enemy_id
        ));
    }
}
