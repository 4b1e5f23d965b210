//! Experience and levelling.

use crate::rpg::stats::effective_stats;
use crate::rpg::types::Player;

pub const HEALTH_PER_LEVEL: i32 = 10;
pub const ATTACK_PER_LEVEL: i32 = 2;
pub const DEFENSE_PER_LEVEL: i32 = 1;

/// Experience needed to leave `level`: floor(100 * level^1.5).
pub fn xp_threshold(level: u32) -> u32 {
    (100.0 * f64::from(level).powf(1.5)).floor() as u32
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUp {
    pub level: u32,
    pub next_threshold: u32,
}

/// Apply every level the player has enough experience for. Leftover
/// experience carries over and health is restored to the effective maximum
/// after each level.
pub fn check_for_level_up(player: &mut Player) -> Vec<LevelUp> {
    let mut gained = Vec::new();
    while player.stats.xp_to_next_level > 0 && player.stats.experience >= player.stats.xp_to_next_level {
        player.stats.experience -= player.stats.xp_to_next_level;
        player.stats.level += 1;
        player.stats.max_health += HEALTH_PER_LEVEL;
        player.stats.attack += ATTACK_PER_LEVEL;
        player.stats.defense += DEFENSE_PER_LEVEL;
        player.stats.health = effective_stats(player).max_health;
        player.stats.xp_to_next_level = xp_threshold(player.stats.level);
        gained.push(LevelUp {
            level: player.stats.level,
            next_threshold: player.stats.xp_to_next_level,
        });
    }
    gained
}

pub fn level_up_banner(up: &LevelUp) -> Vec<String> {
    vec![
        String::new(),
        "*******************************************".to_string(),
        format!("** LEVEL UP! You are now level {}! **", up.level),
        format!(
            "** Max Health +{}, Attack +{}, Defense +{} **",
            HEALTH_PER_LEVEL, ATTACK_PER_LEVEL, DEFENSE_PER_LEVEL
        ),
        format!("** Next level at {} XP. **", up.next_threshold),
        "*******************************************".to_string(),
    ]
}
