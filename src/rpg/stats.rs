//! Stat resolution: racial and class deltas, transformation overlays and
//! equipment bonuses.

use crate::rpg::types::{Class, Player, Race, Stat, StatBlock, StatBonuses, Transform};

pub fn race_bonuses(race: Race) -> &'static [(Stat, i32)] {
    use Stat::*;
    match race {
        Race::Human => &[
            (Strength, 1),
            (Dexterity, 1),
            (Constitution, 1),
            (Intelligence, 1),
            (Wisdom, 1),
            (Charisma, 1),
        ],
        Race::Elf => &[(Dexterity, 2), (Intelligence, 1), (Constitution, -1)],
        Race::Dwarf => &[(Constitution, 2), (Strength, 1), (Charisma, -1)],
        Race::Orc => &[(Strength, 2), (Constitution, 1), (Intelligence, -2)],
        Race::Demon => &[(Strength, 1), (Intelligence, 2), (Charisma, -1)],
        Race::Angel => &[(Wisdom, 2), (Charisma, 2), (Strength, -1)],
        Race::Beastkin => &[(Dexterity, 2), (Strength, 1), (Intelligence, -1)],
        Race::Gnome => &[(Intelligence, 2), (Dexterity, 1), (Strength, -1)],
        Race::Lizardman => &[(Constitution, 2), (Strength, 1), (Charisma, -1)],
        Race::Halfling => &[(Dexterity, 2), (Luck, 2), (Strength, -2)],
        Race::Tiefling => &[(Intelligence, 1), (Charisma, 2), (Constitution, -1)],
        Race::Shapeshifter | Race::Undead | Race::Aasimar => &[],
    }
}

pub fn class_bonuses(class: Class) -> &'static [(Stat, i32)] {
    use Stat::*;
    match class {
        Class::Warrior => &[(Strength, 2), (Constitution, 1), (MaxHealth, 20), (Attack, 2)],
        Class::Mage => &[(Intelligence, 3), (Wisdom, 1), (MaxHealth, -10), (Mana, 30)],
        Class::Rogue => &[(Dexterity, 3), (Luck, 1), (Attack, 1)],
        Class::Paladin => &[(Strength, 1), (Wisdom, 1), (Charisma, 2), (Defense, 1)],
        Class::Ranger => &[(Dexterity, 2), (Wisdom, 1), (Attack, 1)],
        Class::Barbarian => &[(Strength, 3), (Constitution, 2), (Intelligence, -2)],
        Class::Cleric => &[(Wisdom, 3), (Constitution, 1), (Mana, 15)],
        Class::Monk => &[(Dexterity, 2), (Wisdom, 2), (Defense, 1)],
        Class::Bard => &[(Charisma, 3), (Dexterity, 1), (Luck, 1)],
        Class::Sorcerer => &[(Intelligence, 2), (Charisma, 2), (Mana, 20)],
        Class::Druid => &[(Wisdom, 2), (Constitution, 1), (Mana, 10)],
    }
}

/// Reset the character baseline and add race then class deltas. Level,
/// experience, the next-level threshold and gold carry over.
pub fn apply_stat_bonuses(player: &mut Player) {
    let previous = &player.stats;
    let mut fresh = StatBlock {
        level: previous.level,
        experience: previous.experience,
        xp_to_next_level: previous.xp_to_next_level,
        gold: previous.gold,
        ..StatBlock::default()
    };
    for (stat, delta) in race_bonuses(player.race)
        .iter()
        .chain(class_bonuses(player.class).iter())
    {
        fresh.add(*stat, *delta);
    }
    player.stats = fresh;
}

/// Merge a form's stat block into `base`: every stat is added except current
/// health, which is then capped at the merged maximum.
pub fn merge_form_stats(base: &StatBlock, form: &StatBonuses) -> StatBlock {
    let mut merged = base.clone();
    for (stat, delta) in form {
        if *stat != Stat::Health {
            merged.add(*stat, *delta);
        }
    }
    merged.health = merged.health.min(merged.max_health);
    merged
}

/// Upper bound for mana restoration: the baseline plus race and class mana deltas.
pub fn mana_capacity(player: &Player) -> i32 {
    let bonus: i32 = race_bonuses(player.race)
        .iter()
        .chain(class_bonuses(player.class).iter())
        .filter(|(stat, _)| *stat == Stat::Mana)
        .map(|(_, delta)| *delta)
        .sum();
    StatBlock::default().mana + bonus
}

/// Effective stats for the player's current state. Pure: nothing is cached
/// and the player is not modified.
pub fn effective_stats(player: &Player) -> StatBlock {
    let mut effective = match &player.transform {
        Transform::Natural => player.stats.clone(),
        Transform::Transformed { form_stats, .. } => merge_form_stats(&player.stats, form_stats),
    };
    for (_, item) in player.equipment.iter() {
        effective.add_all(&item.stats);
    }
    effective
}
