mod common;

use aethel::rpg::{Class, Race};
use common::{send_all, session_at};

#[test]
fn torch_stock_runs_out_and_restocks_next_day() {
    let mut game = session_at(Race::Human, Class::Warrior, "shop");
    game.player.stats.gold = 500;
    for _ in 0..5 {
        let out = game.handle_input("buy torch");
        assert!(out.contains("You bought a Torch for 10 gold."), "{}", out);
    }
    assert_eq!(game.world.locations["shop"].shop["torch"].current, 0);
    assert_eq!(game.player.count_item("torch"), 5);

    let out = game.handle_input("buy torch");
    assert!(out.contains("The shop is sold out of Torch."), "{}", out);
    assert!(!out.contains("- Torch"), "sold-out line should be hidden: {}", out);
    assert_eq!(game.player.stats.gold, 450);

    let out = send_all(&mut game, &["back", "inn", "sleep", "sleep"]);
    assert!(out.contains("A new day has dawned!"), "{}", out);
    assert!(out.contains("The shop has restocked its items."), "{}", out);
    assert_eq!(game.clock.day, 2);
    assert_eq!(game.world.locations["shop"].shop["torch"].current, 5);
}

#[test]
fn buying_without_gold_changes_nothing() {
    let mut game = session_at(Race::Human, Class::Warrior, "shop");
    game.player.stats.gold = 5;
    let out = game.handle_input("buy torch");
    assert!(out.contains("You need 10 gold for that, but you only have 5."), "{}", out);
    assert_eq!(game.world.locations["shop"].shop["torch"].current, 5);
    assert!(game.player.inventory.is_empty());
}

#[test]
fn unknown_input_is_an_invalid_action_and_empty_input_is_ignored() {
    let mut game = session_at(Race::Human, Class::Warrior, "forest");
    let out = game.handle_input("fly to the moon");
    assert!(out.starts_with("Invalid action."), "{}", out);
    let out = game.handle_input("   ");
    assert!(!out.contains("Invalid action."), "{}", out);
    assert_eq!(game.player.location, "forest");
}

#[test]
fn multi_word_places_resolve_from_the_whole_input() {
    let mut game = session_at(Race::Human, Class::Warrior, "inside village");
    let out = game.handle_input("Adventurers Guild");
    assert_eq!(game.player.location, "adventurers guild", "{}", out);
    assert!(out.contains("view quests"), "{}", out);
}

#[test]
fn village_walks_take_no_time_but_the_forest_does() {
    let mut game = session_at(Race::Human, Class::Warrior, "forest");
    let out = game.handle_input("east");
    assert!(out.contains("You have discovered a village."), "{}", out);
    assert_eq!(game.clock.hour, 8);
    send_all(&mut game, &["back"]);
    assert_eq!(game.player.location, "forest");
    assert_eq!(game.clock.hour, 9);
}

#[test]
fn the_cave_needs_a_torch() {
    let mut game = session_at(Race::Human, Class::Warrior, "cave");
    let out = game.handle_input("proceed");
    assert!(out.contains("It's too dark to proceed without a light source."), "{}", out);
    assert_eq!(game.player.location, "cave");

    game.player.stats.gold = 100;
    game.player.location = "shop".to_string();
    game.handle_input("buy torch");
    game.player.location = "cave".to_string();
    let out = game.handle_input("proceed");
    assert!(out.contains("old abandoned mine"), "{}", out);
    assert_eq!(game.player.location, "old abandoned mine");
}

#[test]
fn npc_dialogue_cycles() {
    let mut game = session_at(Race::Human, Class::Warrior, "forest");
    let first = game.handle_input("talk to gideon");
    assert!(first.contains("[Gideon]:"), "{}", first);
    let lines = game.world.npcs["old_man_gideon"].dialogue.len();
    for _ in 1..lines {
        game.handle_input("talk to gideon");
    }
    let again = game.handle_input("talk to gideon");
    assert_eq!(again.lines().next(), first.lines().next());

    let out = game.handle_input("talk to nobody");
    assert!(out.contains("There is no one here by the name of 'nobody'."), "{}", out);
}

#[test]
fn the_palace_guard_speaks_only_on_the_first_visit() {
    let mut game = session_at(Race::Human, Class::Warrior, "inner city");
    let first = game.handle_input("palace");
    let guard_line = first
        .lines()
        .find(|l| l.contains("guard"))
        .map(str::to_string)
        .expect("first visit greets the player");
    game.handle_input("back");
    let second = game.handle_input("palace");
    assert!(!second.contains(&guard_line), "{}", second);
}

#[test]
fn the_mine_chest_gives_its_contents_once() {
    let mut game = session_at(Race::Human, Class::Warrior, "old abandoned mine");
    let out = game.handle_input("open chest");
    assert!(out.contains("There is no chest here to open."), "{}", out);

    {
        let chest = game
            .world
            .locations
            .get_mut("old abandoned mine")
            .unwrap()
            .interactables
            .get_mut("chest")
            .unwrap();
        chest.hidden = false;
        chest.trapped = false;
    }
    let out = game.handle_input("open chest");
    assert!(out.contains("The chest is locked. You'll need a lockpick."), "{}", out);

    game.world
        .locations
        .get_mut("old abandoned mine")
        .unwrap()
        .interactables
        .get_mut("chest")
        .unwrap()
        .locked = false;
    let gold = game.player.stats.gold;
    let out = game.handle_input("open chest");
    assert!(out.contains("You find 50 gold."), "{}", out);
    assert_eq!(game.player.stats.gold, gold + 50);
    assert!(game.player.has_item("health_potion"));

    let out = game.handle_input("open chest");
    assert!(out.contains("The chest is empty."), "{}", out);
    assert_eq!(game.player.stats.gold, gold + 50);
}

#[test]
fn halfling_luck_retries_a_failed_chop_once_per_day() {
    let mut game = session_at(Race::Halfling, Class::Rogue, "forest");
    let mut failed = false;
    for seed in 0..500 {
        game.reseed(seed);
        game.clock.hour = 8;
        game.handle_input("chop");
        if game.player.last_check.as_ref().map(|c| c.failed()).unwrap_or(false) {
            failed = true;
            break;
        }
    }
    assert!(failed, "no seed produced a failed chop");

    let out = game.handle_input("reroll");
    assert!(out.contains("With a bit of uncanny luck, you try again!"), "{}", out);
    assert!(out.contains("chopping check"), "{}", out);
    let out = game.handle_input("reroll");
    assert!(
        out.contains("You've already used your Halfling Luck today."),
        "{}",
        out
    );
}

#[test]
fn an_unrelated_action_clears_the_reroll() {
    let mut game = session_at(Race::Halfling, Class::Rogue, "forest");
    for seed in 0..500 {
        game.reseed(seed);
        game.handle_input("chop");
        if game.player.last_check.as_ref().map(|c| c.failed()).unwrap_or(false) {
            break;
        }
    }
    game.handle_input("inventory");
    let out = game.handle_input("reroll");
    assert!(out.contains("There's nothing to re-roll right now."), "{}", out);
}

#[test]
fn changing_class_costs_gold_and_asks_for_the_class() {
    let mut game = session_at(Race::Human, Class::Warrior, "adventurers guild");
    game.player.stats.gold = 150;
    let out = game.handle_input("change class");
    assert!(out.contains("It will cost 100 gold to retrain."), "{}", out);
    let out = game.handle_input("mage");
    assert!(out.contains("You have paid 100 gold and are now a mage!"), "{}", out);
    assert_eq!(game.player.class, Class::Mage);
    assert_eq!(game.player.stats.gold, 50);

    let out = game.handle_input("change class");
    assert!(out.contains("You need 100 gold"), "{}", out);
}
