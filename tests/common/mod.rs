//! Shared fixtures for the integration tests.

use aethel::rpg::{
    apply_stat_bonuses, canonical_world, effective_stats, Catalog, Class, GameSession, Player, Race, SaveSettings,
};
use std::path::Path;

/// A fresh character at `location` with racial and class bonuses applied and
/// full health. The RNG is seeded so runs are repeatable.
pub fn player_at(race: Race, class: Class, location: &str) -> Player {
    let mut player = Player::new("Tess", race, class, location);
    apply_stat_bonuses(&mut player);
    player.stats.health = effective_stats(&player).max_health;
    player
}

pub fn session_at(race: Race, class: Class, location: &str) -> GameSession {
    GameSession::with_seed(Catalog::builtin(), canonical_world(), player_at(race, class, location), 7)
}

/// A session that saves into `dir` with autosave switched off.
#[allow(dead_code)]
pub fn session_saving_to(dir: &Path, location: &str) -> GameSession {
    session_at(Race::Human, Class::Warrior, location).with_save_settings(SaveSettings {
        dir: Some(dir.to_path_buf()),
        autosave: false,
        ..SaveSettings::default()
    })
}

/// Send each line in order and return the transcript of the last one.
#[allow(dead_code)]
pub fn send_all(game: &mut GameSession, lines: &[&str]) -> String {
    let mut last = String::new();
    for line in lines {
        last = game.handle_input(line);
    }
    last
}
