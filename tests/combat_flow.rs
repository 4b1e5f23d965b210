mod common;

use aethel::rpg::{ActiveEffect, Class, Race, RunStatus};
use common::session_at;

#[test]
fn five_attacks_of_six_damage_win_the_fight() {
    let mut game = session_at(Race::Human, Class::Mage, "dungeon");
    game.player.stats.attack = 10;
    game.player.stats.defense = 100;
    let opening = game.handle_input("enter");
    assert!(opening.contains("A wild Goblin appears!"), "{}", opening);

    for round in 1..=4 {
        let out = game.handle_input("attack");
        assert!(out.contains("You attack the Goblin for 6 damage."), "{}", out);
        let enemy = &game.encounter.as_ref().expect("still fighting").enemy;
        assert_eq!(enemy.stats.health, 30 - 6 * round);
    }
    let gold = game.player.stats.gold;
    let out = game.handle_input("attack");
    assert!(out.contains("You have defeated the Goblin!"), "{}", out);
    assert!(!out.contains("The Goblin attacks you"), "{}", out);
    assert!(!game.in_combat());
    assert_eq!(game.player.stats.gold, gold + 15);
    assert_eq!(game.player.stats.experience, 10);
}

#[test]
fn fleeing_leaves_health_gold_and_experience_alone() {
    let mut game = session_at(Race::Human, Class::Warrior, "dungeon");
    game.handle_input("enter");
    let before = game.player.stats.clone();
    let items = game.player.inventory.len();
    let out = game.handle_input("flee");
    assert!(out.contains("You manage to escape from the battle!"), "{}", out);
    assert!(!game.in_combat());
    assert_eq!(game.player.stats, before);
    assert_eq!(game.player.inventory.len(), items);
}

#[test]
fn cast_without_enough_mana_is_refused_without_an_enemy_turn() {
    let mut game = session_at(Race::Human, Class::Mage, "dungeon");
    game.handle_input("enter");
    game.player.stats.mana = 3;
    let health = game.player.stats.health;
    let out = game.handle_input("cast fireball");
    assert!(out.contains("You don't have enough mana"), "{}", out);
    assert!(!out.contains("attacks you"), "{}", out);
    assert_eq!(game.player.stats.mana, 3);
    assert_eq!(game.player.stats.health, health);
    assert_eq!(game.encounter.as_ref().unwrap().enemy.stats.health, 30);
}

#[test]
fn cast_spends_mana_and_scales_with_intelligence() {
    let mut game = session_at(Race::Human, Class::Mage, "dungeon");
    game.handle_input("enter");
    let mana = game.player.stats.mana;
    let out = game.handle_input("cast fireball");
    assert!(out.contains("You cast fireball"), "{}", out);
    assert!(game.player.stats.mana < mana);
}

#[test]
fn wasted_action_gives_the_enemy_a_free_hit() {
    let mut game = session_at(Race::Human, Class::Warrior, "dungeon");
    game.handle_input("enter");
    let out = game.handle_input("dance");
    assert!(out.contains("Invalid combat action."), "{}", out);
    assert!(out.contains("The Goblin attacks you"), "{}", out);
}

#[test]
fn defeat_ends_the_session() {
    let mut game = session_at(Race::Human, Class::Warrior, "dungeon");
    game.handle_input("enter");
    game.player.stats.health = 1;
    game.player.stats.defense = 0;
    let out = game.handle_input("wait");
    assert!(out.contains("--- GAME OVER ---"), "{}", out);
    assert_eq!(game.status, RunStatus::Defeated);
    assert!(game.is_over());
    assert_eq!(game.handle_input("look"), "");
}

#[test]
fn killing_the_quest_target_advances_the_quest() {
    let mut game = session_at(Race::Human, Class::Warrior, "adventurers guild");
    let out = game.handle_input("accept quest goblin slayer");
    assert!(out.contains("You have accepted the quest: \"Goblin Slayer\""), "{}", out);
    let out = game.handle_input("turn in goblin slayer");
    assert!(out.contains("Progress: 0/1"), "{}", out);

    game.player.location = "dungeon".to_string();
    game.handle_input("enter");
    game.encounter.as_mut().unwrap().enemy.stats.health = 1;
    let out = game.handle_input("attack");
    assert!(out.contains("Quest progress: Goblin Slayer (1/1)"), "{}", out);

    game.player.location = "adventurers guild".to_string();
    let gold = game.player.stats.gold;
    let out = game.handle_input("turn in Goblin Slayer");
    assert!(out.contains("Quest Complete: Goblin Slayer!"), "{}", out);
    assert_eq!(game.player.stats.gold, gold + 50);
    let out = game.handle_input("turn in goblin slayer");
    assert!(out.contains("You don't have an active quest"), "{}", out);
}

#[test]
fn shapeshifter_learns_a_form_and_reverts_exactly() {
    let mut game = session_at(Race::Shapeshifter, Class::Warrior, "dungeon");
    game.handle_input("enter");
    game.encounter.as_mut().unwrap().enemy.stats.health = 1;
    let out = game.handle_input("attack");
    assert!(out.contains("transform goblin"), "{}", out);

    let before = game.player.stats.clone();
    let out = game.handle_input("transform goblin");
    assert!(out.contains("You transform into a Goblin!"), "{}", out);
    assert!(game.player.transform.is_transformed());
    let out = game.handle_input("revert");
    assert!(out.contains("You revert back to your original form."), "{}", out);
    assert_eq!(game.player.stats, before);
}

fn afflict(effects: &mut Vec<ActiveEffect>, effect_id: &str, turns: u32) {
    effects.push(ActiveEffect {
        effect_id: effect_id.to_string(),
        turns_remaining: turns,
    });
}

#[test]
fn frozen_player_loses_the_turn_to_the_enemy() {
    let mut game = session_at(Race::Human, Class::Warrior, "dungeon");
    game.handle_input("enter");
    afflict(&mut game.player.active_effects, "frozen", 1);
    let out = game.handle_input("attack");
    assert!(out.contains("cannot act!"), "{}", out);
    assert!(!out.contains("You attack the"), "{}", out);
    assert!(out.contains("The Goblin attacks you"), "{}", out);
    assert_eq!(game.encounter.as_ref().unwrap().enemy.stats.health, 30);
    assert!(game.player.active_effects.is_empty());
}

#[test]
fn burning_enemy_dies_on_its_own_tick() {
    let mut game = session_at(Race::Human, Class::Warrior, "dungeon");
    game.handle_input("enter");
    {
        let enemy = &mut game.encounter.as_mut().unwrap().enemy;
        enemy.stats.health = 2;
        afflict(&mut enemy.active_effects, "burning", 2);
    }
    let health = game.player.stats.health;
    let out = game.handle_input("dance");
    assert!(out.contains("Goblin takes 3 damage from being burning."), "{}", out);
    assert!(out.contains("You have defeated the Goblin!"), "{}", out);
    assert!(!out.contains("The Goblin attacks you"), "{}", out);
    assert!(!game.in_combat());
    assert_eq!(game.player.stats.health, health);
    assert_eq!(game.player.stats.experience, 10);
}

#[test]
fn burning_can_kill_the_player_before_they_act() {
    let mut game = session_at(Race::Human, Class::Warrior, "dungeon");
    game.handle_input("enter");
    game.player.stats.health = 2;
    afflict(&mut game.player.active_effects, "burning", 2);
    let out = game.handle_input("attack");
    assert!(!out.contains("You attack the"), "{}", out);
    assert!(out.contains("--- GAME OVER ---"), "{}", out);
    assert_eq!(game.status, RunStatus::Defeated);
    assert_eq!(game.encounter, None);
}
