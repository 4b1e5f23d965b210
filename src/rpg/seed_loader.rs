//! Catalog and world overrides loaded from JSON files.
//!
//! A content directory may hold any of `items.json`, `enemies.json`,
//! `quests.json`, `recipes.json`, `locations.json` and `npcs.json`. Each is a
//! JSON array; entries replace the builtin entry with the same id or add a new
//! one. Missing files are skipped.
//!
//! Overrides are merged into a copy and cross-checked before they replace
//! anything, so a bad file leaves the builtin content as it was.

use std::fs;
use std::path::Path;

use crate::rpg::catalog::{Catalog, EnemyTemplate, ItemTemplate, Recipe};
use crate::rpg::errors::GameError;
use crate::rpg::quest::QuestDef;
use crate::rpg::world::{ActionEffect, Location, Npc, World};

fn parse_json_array<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, GameError> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| {
        GameError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Failed to parse {}: {}", path.display(), e),
        ))
    })
}

/// Load item templates from items.json
pub fn load_items_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<ItemTemplate>, GameError> {
    parse_json_array(path.as_ref())
}

/// Load enemy templates from enemies.json
pub fn load_enemies_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<EnemyTemplate>, GameError> {
    parse_json_array(path.as_ref())
}

/// Load quest definitions from quests.json
pub fn load_quests_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<QuestDef>, GameError> {
    parse_json_array(path.as_ref())
}

/// Load crafting recipes from recipes.json
pub fn load_recipes_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Recipe>, GameError> {
    parse_json_array(path.as_ref())
}

/// Load locations (with their actions and features) from locations.json
pub fn load_locations_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Location>, GameError> {
    parse_json_array(path.as_ref())
}

/// Load NPCs from npcs.json
pub fn load_npcs_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Npc>, GameError> {
    parse_json_array(path.as_ref())
}

/// Merge every catalog override file found in `dir` into `catalog`. Returns how
/// many entries were applied. On error `catalog` is unchanged.
pub fn apply_catalog_overrides<P: AsRef<Path>>(catalog: &mut Catalog, dir: P) -> Result<usize, GameError> {
    let dir = dir.as_ref();
    let mut merged = catalog.clone();
    let mut applied = 0;

    let items = dir.join("items.json");
    if items.exists() {
        for item in load_items_from_json(&items)? {
            merged.items.insert(item.id.clone(), item);
            applied += 1;
        }
    }
    let enemies = dir.join("enemies.json");
    if enemies.exists() {
        for enemy in load_enemies_from_json(&enemies)? {
            merged.enemies.insert(enemy.id.clone(), enemy);
            applied += 1;
        }
    }
    let quests = dir.join("quests.json");
    if quests.exists() {
        for quest in load_quests_from_json(&quests)? {
            merged.quests.insert(quest.id.clone(), quest);
            applied += 1;
        }
    }
    let recipes = dir.join("recipes.json");
    if recipes.exists() {
        for recipe in load_recipes_from_json(&recipes)? {
            merged.recipes.insert(recipe.output.clone(), recipe);
            applied += 1;
        }
    }

    validate_catalog(&merged)?;
    *catalog = merged;
    log::info!("applied {} catalog overrides from {}", applied, dir.display());
    Ok(applied)
}

/// Everything a recipe, drop or quest names has to exist.
fn validate_catalog(catalog: &Catalog) -> Result<(), GameError> {
    for recipe in catalog.recipes.values() {
        catalog.item(&recipe.output)?;
        for material in recipe.materials.keys() {
            catalog.item(material)?;
        }
    }
    for enemy in catalog.enemies.values() {
        for drop in &enemy.drops {
            catalog.item(&drop.item_id)?;
        }
    }
    for quest in catalog.quests.values() {
        catalog.enemy(&quest.objective.target)?;
    }
    Ok(())
}

/// Merge `locations.json` and `npcs.json` from `dir` into `world`, checked
/// against `catalog`. Returns how many entries were applied. On error `world`
/// is unchanged.
pub fn apply_world_overrides<P: AsRef<Path>>(world: &mut World, catalog: &Catalog, dir: P) -> Result<usize, GameError> {
    let dir = dir.as_ref();
    let mut merged = world.clone();
    let mut applied = 0;

    let npcs = dir.join("npcs.json");
    if npcs.exists() {
        for npc in load_npcs_from_json(&npcs)? {
            merged.add_npc(npc);
            applied += 1;
        }
    }
    let locations = dir.join("locations.json");
    if locations.exists() {
        for location in load_locations_from_json(&locations)? {
            merged.add_location(location);
            applied += 1;
        }
    }

    validate_world(&merged, catalog)?;
    *world = merged;
    log::info!("applied {} world overrides from {}", applied, dir.display());
    Ok(applied)
}

/// Every exit, enemy, stock line, chest item and NPC a location names has to
/// exist.
fn validate_world(world: &World, catalog: &Catalog) -> Result<(), GameError> {
    for location in world.locations.values() {
        for npc in &location.npcs {
            if !world.npcs.contains_key(npc) {
                return Err(GameError::UnknownNpc(npc.clone()));
            }
        }
        for item_id in location.shop.keys() {
            catalog.item(item_id)?;
        }
        for action in location.actions.values() {
            match &action.effect {
                ActionEffect::Travel { to, .. } | ActionEffect::Move { to } => {
                    world.location(to)?;
                }
                ActionEffect::TravelIf { to, requires_item, .. } => {
                    world.location(to)?;
                    catalog.item(requires_item)?;
                }
                ActionEffect::StartCombat { enemy } => {
                    catalog.enemy(enemy)?;
                }
                _ => {}
            }
        }
        for feature in location.interactables.values() {
            if let Some(contents) = &feature.contents {
                for item_id in &contents.item_ids {
                    catalog.item(item_id)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpg::world_seed::canonical_world;
    use tempfile::tempdir;

    #[test]
    fn overrides_replace_and_extend_builtin_entries() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("items.json"),
            r#"[
                {"id": "torch", "name": "Torch", "kind": "misc", "price": 3},
                {"id": "rope", "name": "Rope", "kind": "misc", "price": 4}
            ]"#,
        )
        .unwrap();
        let mut catalog = Catalog::builtin();
        let applied = apply_catalog_overrides(&mut catalog, dir.path()).unwrap();
        assert_eq!(applied, 2);
        assert_eq!(catalog.item("torch").unwrap().price, 3);
        assert_eq!(catalog.item("rope").unwrap().name, "Rope");
    }

    #[test]
    fn recipe_with_unknown_material_is_rejected() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("recipes.json"),
            r#"[{"output": "wooden_club", "station": "workbench", "materials": {"unobtainium": 1}}]"#,
        )
        .unwrap();
        let mut catalog = Catalog::builtin();
        assert!(matches!(
            apply_catalog_overrides(&mut catalog, dir.path()),
            Err(GameError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn rejected_catalog_overrides_leave_nothing_behind() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("items.json"),
            r#"[{"id": "torch", "name": "Torch", "kind": "misc", "price": 999}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("recipes.json"),
            r#"[{"output": "wooden_club", "station": "workbench", "materials": {"unobtainium": 1}}]"#,
        )
        .unwrap();
        let mut catalog = Catalog::builtin();
        assert!(apply_catalog_overrides(&mut catalog, dir.path()).is_err());
        assert_eq!(catalog, Catalog::builtin());
    }

    #[test]
    fn malformed_file_is_invalid_data() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("enemies.json"), "{").unwrap();
        let mut catalog = Catalog::builtin();
        match apply_catalog_overrides(&mut catalog, dir.path()) {
            Err(GameError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::InvalidData),
            other => panic!("expected invalid data, got {:?}", other),
        }
    }

    #[test]
    fn world_overrides_add_locations_and_npcs() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("npcs.json"),
            r#"[{"id": "old_hermit", "name": "Old Hermit", "description": "A hunched figure.",
                 "dialogue": ["Mind the wolves, {name}."]}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("locations.json"),
            r#"[{
                "id": "watchtower",
                "description": {"kind": "static", "value": "A crumbling watchtower."},
                "npcs": ["old_hermit"],
                "shop": {"torch": {"current": 2, "max": 2}},
                "actions": {
                    "back": {"effect": "travel", "to": "forest", "hours": 1},
                    "climb": {"narration": "You climb.", "effect": "start_combat", "enemy": "goblin"}
                }
            }]"#,
        )
        .unwrap();
        let catalog = Catalog::builtin();
        let mut world = canonical_world();
        let applied = apply_world_overrides(&mut world, &catalog, dir.path()).unwrap();
        assert_eq!(applied, 2);
        let tower = world.location("watchtower").unwrap();
        assert_eq!(tower.npcs, vec!["old_hermit".to_string()]);
        assert_eq!(tower.shop["torch"].last_restock_day, 1);
        assert_eq!(
            tower.actions["back"].effect,
            ActionEffect::Travel { to: "forest".into(), hours: 1 }
        );
        assert_eq!(world.npcs["old_hermit"].dialogue_index, 0);
        assert!(world.location("forest").is_ok());
    }

    #[test]
    fn world_override_with_dangling_exit_is_rejected_whole() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("locations.json"),
            r#"[
                {"id": "forest", "description": {"kind": "static", "value": "Replaced."}},
                {"id": "bridge", "description": {"kind": "static", "value": "A bridge."},
                 "actions": {"cross": {"effect": "move", "to": "nowhere"}}}
            ]"#,
        )
        .unwrap();
        let catalog = Catalog::builtin();
        let mut world = canonical_world();
        assert!(matches!(
            apply_world_overrides(&mut world, &catalog, dir.path()),
            Err(GameError::UnknownLocation(id)) if id == "nowhere"
        ));
        assert_eq!(world, canonical_world());
    }

    #[test]
    fn world_override_checks_npcs_enemies_and_items() {
        let catalog = Catalog::builtin();
        let cases = [
            (
                r#"[{"id": "hut", "description": {"kind": "static", "value": "."}, "npcs": ["ghost"]}]"#,
                "npc",
            ),
            (
                r#"[{"id": "hut", "description": {"kind": "static", "value": "."},
                     "actions": {"fight": {"effect": "start_combat", "enemy": "dragon_king"}}}]"#,
                "enemy",
            ),
            (
                r#"[{"id": "hut", "description": {"kind": "static", "value": "."},
                     "shop": {"moonstone": {"current": 1, "max": 1}}}]"#,
                "item",
            ),
        ];
        for (json, kind) in cases {
            let dir = tempdir().unwrap();
            std::fs::write(dir.path().join("locations.json"), json).unwrap();
            let mut world = canonical_world();
            let err = apply_world_overrides(&mut world, &catalog, dir.path()).unwrap_err();
            let ok = match kind {
                "npc" => matches!(err, GameError::UnknownNpc(_)),
                "enemy" => matches!(err, GameError::UnknownEnemy(_)),
                _ => matches!(err, GameError::UnknownTemplate(_)),
            };
            assert!(ok, "{}: {:?}", kind, err);
        }
    }
}
