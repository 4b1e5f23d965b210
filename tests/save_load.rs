mod common;

use aethel::rpg::{read_save, Class, Race, SAVE_SCHEMA_VERSION};
use common::{send_all, session_at, session_saving_to};
use std::fs;

#[test]
fn save_then_load_restores_the_whole_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = session_saving_to(dir.path(), "shop");
    game.player.stats.gold = 200;
    send_all(&mut game, &["buy torch", "buy health potion", "talk to elara"]);
    let out = game.handle_input("save");
    assert!(out.contains("Game saved to"), "{}", out);

    let path = dir.path().join("savegame.json");
    let data = read_save(&path).unwrap();
    assert_eq!(data.version, SAVE_SCHEMA_VERSION);
    assert!(data.saved_at.is_some());
    assert_eq!(data.locations["shop"].shop["torch"].current, 4);

    let saved_player = game.player.clone();
    let saved_clock = game.clock;
    let cursor = game.world.npcs["elara_the_shopkeeper"].dialogue_index;

    send_all(&mut game, &["talk to elara", "buy torch", "back", "inn", "sleep", "sleep"]);
    game.player.stats.gold = 1;
    assert_ne!(game.player, saved_player);

    let out = game.handle_input("load");
    assert!(out.contains("Game loaded successfully!"), "{}", out);
    assert_eq!(game.player, saved_player);
    assert_eq!(game.clock, saved_clock);
    assert_eq!(game.world.locations["shop"].shop["torch"].current, 4);
    assert_eq!(game.world.npcs["elara_the_shopkeeper"].dialogue_index, cursor);
}

#[test]
fn named_slots_are_separate_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = session_saving_to(dir.path(), "forest");
    game.handle_input("save slot2.json");
    assert!(dir.path().join("slot2.json").exists());
    assert!(!dir.path().join("savegame.json").exists());

    game.player.stats.gold = 999;
    let out = game.handle_input("load slot2.json");
    assert!(out.contains("Game loaded successfully!"), "{}", out);
    assert_eq!(game.player.stats.gold, 50);
}

#[test]
fn missing_or_broken_saves_leave_the_game_running() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = session_saving_to(dir.path(), "forest");
    game.player.stats.gold = 77;

    let out = game.handle_input("load nothing-here.json");
    assert!(out.contains("No save file found at"), "{}", out);
    assert_eq!(game.player.stats.gold, 77);

    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    let out = game.handle_input("load broken.json");
    assert!(out.contains("Error loading game:"), "{}", out);
    assert_eq!(game.player.stats.gold, 77);
    assert!(!game.is_over());
    assert_eq!(game.player.location, "forest");
}

#[test]
fn travel_autosaves_silently() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = session_saving_to(dir.path(), "forest");
    game.save.autosave = true;
    let out = game.handle_input("north");
    assert!(!out.contains("Game saved"), "{}", out);
    let data = read_save(&dir.path().join("autosave.json")).unwrap();
    assert_eq!(data.player.location, "cave");
    assert_eq!(data.clock.hour, 9);
}

#[test]
fn item_ids_stay_unique_after_a_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = session_saving_to(dir.path(), "shop");
    game.player.stats.gold = 200;
    send_all(&mut game, &["buy torch", "buy torch", "save"]);

    let mut fresh = session_at(Race::Human, Class::Warrior, "forest").with_save_settings(game.save.clone());
    fresh.handle_input("load");
    fresh.player.location = "shop".to_string();
    fresh.handle_input("buy torch");
    let mut ids: Vec<u64> = fresh.player.inventory.iter().map(|i| i.unique_id).collect();
    let count = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), count);
    assert_eq!(count, 3);
}

#[test]
fn saving_without_a_directory_is_refused() {
    let mut game = session_at(Race::Human, Class::Warrior, "forest");
    let out = game.handle_input("save");
    assert!(out.contains("Saving is disabled"), "{}", out);
}

#[test]
fn revealed_chest_and_palace_visit_survive_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = session_saving_to(dir.path(), "inner city");
    game.handle_input("palace");
    assert!(game.world.locations["sunspire palace"].visited);
    game.world
        .location_mut("old abandoned mine")
        .unwrap()
        .interactables
        .get_mut("chest")
        .unwrap()
        .hidden = false;
    let out = game.handle_input("save");
    assert!(out.contains("Game saved to"), "{}", out);

    game.world.location_mut("sunspire palace").unwrap().visited = false;
    game.world
        .location_mut("old abandoned mine")
        .unwrap()
        .interactables
        .get_mut("chest")
        .unwrap()
        .hidden = true;

    let out = game.handle_input("load");
    assert!(out.contains("Game loaded successfully!"), "{}", out);
    assert!(game.world.locations["sunspire palace"].visited);
    assert!(!game.world.locations["old abandoned mine"].interactables["chest"].hidden);
}

#[test]
fn slot_names_keep_their_case() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = session_saving_to(dir.path(), "forest");
    let out = game.handle_input("save MySave.json");
    assert!(out.contains("Game saved to"), "{}", out);
    assert!(dir.path().join("MySave.json").exists());

    game.player.stats.gold = 999;
    let out = game.handle_input("LOAD MySave.json");
    assert!(out.contains("Game loaded successfully!"), "{}", out);
    assert_eq!(game.player.stats.gold, 50);

    game.player.stats.gold = 999;
    let out = game.load_slot("MySave.json");
    assert!(out.contains("Game loaded successfully!"), "{}", out);
    assert_eq!(game.player.stats.gold, 50);
}
