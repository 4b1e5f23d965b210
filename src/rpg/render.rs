//! Text views. Every function here is read-only and returns the lines to print.

use crate::rpg::catalog::Catalog;
use crate::rpg::clock::Clock;
use crate::rpg::combat::EnemyInstance;
use crate::rpg::quest::available_quests;
use crate::rpg::stats::{effective_stats, mana_capacity};
use crate::rpg::types::{Player, QuestStatus, Stat, StatBlock, Transform};
use crate::rpg::world::World;

pub fn location_view(world: &World, catalog: &Catalog, player: &Player, clock: &Clock) -> Vec<String> {
    let mut lines = vec![String::new(), format!("--- {} ---", clock.label())];
    let Ok(location) = world.location(&player.location) else {
        lines.push(format!("You are lost somewhere called '{}'.", player.location));
        return lines;
    };
    lines.push(location.description.evaluate(location, player, catalog));

    let npcs: Vec<_> = location.npcs.iter().filter_map(|id| world.npcs.get(id)).collect();
    if !npcs.is_empty() {
        for npc in &npcs {
            lines.push(npc.description.clone());
        }
        let names: Vec<&str> = npcs.iter().map(|n| n.name.as_str()).collect();
        lines.push(format!("(You can 'talk to {}'.)", names.join("' or 'talk to ")));
    }

    if location.is_shop() {
        lines.push("Items for sale:".to_string());
        for (item_id, stock) in location.shop.iter().filter(|(_, s)| s.in_stock()) {
            if let Ok(template) = catalog.item(item_id) {
                lines.push(format!(
                    "- {} ({} gold) [{} in stock]",
                    template.name, template.price, stock.current
                ));
            }
        }
        lines.push("(Use 'buy <item name>' to purchase.)".to_string());
    }
    if location.actions.contains_key("sleep") {
        lines.push("(You can 'sleep' here to pass the night.)".to_string());
    }

    let mut verbs: Vec<&str> = location.actions.keys().map(String::as_str).collect();
    verbs.sort_unstable();
    if !verbs.is_empty() {
        lines.push(format!("What will you do? ({})", verbs.join(", ")));
    }
    lines.push("(Type 'i' for inventory or 'e' for equipment.)".to_string());
    lines
}

pub fn combat_status(player: &Player, enemy: &EnemyInstance) -> Vec<String> {
    let stats = effective_stats(player);
    vec![
        String::new(),
        format!(
            "Your HP: {}/{} | Mana: {}/{} | {} HP: {}/{}",
            player.stats.health,
            stats.max_health,
            player.stats.mana,
            mana_capacity(player),
            enemy.name,
            enemy.stats.health.max(0),
            enemy.stats.max_health
        ),
        "Combat: [a]ttack, [c]ast <spell>, [u]se <item>, [f]lee?".to_string(),
    ]
}

fn durability_suffix(current: Option<u32>, max: Option<u32>) -> String {
    match (current, max) {
        (Some(c), Some(m)) => format!(" ({}/{})", c, m),
        _ => String::new(),
    }
}

pub fn inventory_view(player: &Player) -> Vec<String> {
    let mut lines = vec!["--- Inventory ---".to_string()];
    if player.inventory.is_empty() {
        lines.push("Your inventory is empty.".to_string());
    }
    // Stackable items with no durability are grouped by name.
    let mut seen: Vec<&str> = Vec::new();
    for item in &player.inventory {
        if item.durability.is_some() {
            lines.push(format!("- {}{}", item.name, durability_suffix(item.durability, item.max_durability)));
            continue;
        }
        if seen.contains(&item.name.as_str()) {
            continue;
        }
        seen.push(&item.name);
        let count = player
            .inventory
            .iter()
            .filter(|i| i.durability.is_none() && i.name == item.name)
            .count();
        if count > 1 {
            lines.push(format!("- {} (x{})", item.name, count));
        } else {
            lines.push(format!("- {}", item.name));
        }
    }
    lines.push(format!("Gold: {}", player.stats.gold));
    lines
}

pub fn equipment_view(player: &Player) -> Vec<String> {
    let mut lines = vec!["--- Equipment ---".to_string()];
    for slot in crate::rpg::types::EquipSlot::ALL {
        let text = match player.equipment.slot(slot) {
            Some(item) => format!("{}{}", item.name, durability_suffix(item.durability, item.max_durability)),
            None => "(empty)".to_string(),
        };
        lines.push(format!("{:<7} {}", format!("{}:", slot.as_str()), text));
    }
    lines.push("(Use 'equip <item>' or 'unequip <slot>'.)".to_string());
    lines
}

fn stat_line(stat: Stat, base: &StatBlock, effective: &StatBlock) -> String {
    let b = base.get(stat);
    let e = effective.get(stat);
    if b == e {
        format!("{}: {}", stat.label(), e)
    } else {
        format!("{}: {} ({:+})", stat.label(), e, e - b)
    }
}

pub fn character_sheet(player: &Player, catalog: &Catalog) -> Vec<String> {
    let base = &player.stats;
    let eff = effective_stats(player);
    let mut lines = vec![
        format!("--- {} ---", player.name),
        format!(
            "Level {} {} {} | XP: {}/{}",
            base.level, player.race, player.class, base.experience, base.xp_to_next_level
        ),
    ];
    if !player.gender.is_empty() {
        lines.push(format!(
            "Gender: {} | Age: {} | Height: {} | Weight: {}",
            player.gender, player.age, player.height, player.weight
        ));
    }
    lines.push(format!("Health: {}/{}", base.health, eff.max_health));
    lines.push(format!("Mana: {}/{}", base.mana, mana_capacity(player)));
    lines.push(stat_line(Stat::Attack, base, &eff));
    lines.push(stat_line(Stat::Defense, base, &eff));
    for stat in Stat::ABILITIES {
        lines.push(stat_line(stat, base, &eff));
    }
    lines.push(stat_line(Stat::Luck, base, &eff));
    lines.push(format!("Gold: {}", base.gold));

    if let Transform::Transformed { form_name, .. } = &player.transform {
        lines.push(format!("Current form: {}", form_name));
    }
    if !player.known_forms.is_empty() {
        lines.push(format!("Known forms: {}", player.known_forms.join(", ")));
    }
    if !player.spells.is_empty() {
        lines.push(format!("Spells: {}", player.spells.join(", ")));
    }
    if !player.active_effects.is_empty() {
        let names: Vec<String> = player
            .active_effects
            .iter()
            .map(|e| {
                let name = catalog.effect(&e.effect_id).map(|d| d.name.as_str()).unwrap_or(&e.effect_id);
                format!("{} ({} turns)", name, e.turns_remaining)
            })
            .collect();
        lines.push(format!("Effects: {}", names.join(", ")));
    }

    if !player.quest_log.is_empty() {
        lines.push("--- Quest Log ---".to_string());
        for (quest_id, entry) in &player.quest_log {
            let Some(quest) = catalog.quests.get(quest_id) else {
                continue;
            };
            let status = match entry.status {
                QuestStatus::Accepted => format!("{}/{}", entry.progress, quest.objective.count),
                QuestStatus::Completed => "Completed".to_string(),
            };
            lines.push(format!("- {} [{}]", quest.name, status));
        }
    }
    lines
}

pub fn quest_board(catalog: &Catalog, player: &Player) -> Vec<String> {
    let quests = available_quests(catalog, player);
    if quests.is_empty() {
        return vec!["There are no new quests available right now.".to_string()];
    }
    let mut lines = vec!["--- Quest Board ---".to_string()];
    for quest in quests {
        lines.push(format!("[{}] {}", quest.name, quest.description));
        lines.push(format!(
            "  Reward: {} gold, {} XP",
            quest.reward.gold, quest.reward.xp
        ));
    }
    lines.push("(Use 'accept quest <quest name>'.)".to_string());
    lines
}

/// Recipes craftable at `station`, with their materials.
pub fn station_recipes(catalog: &Catalog, station: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for recipe in catalog.recipes_for_station(station) {
        let output = catalog
            .item(&recipe.output)
            .map(|t| t.name.clone())
            .unwrap_or_else(|_| recipe.output.clone());
        let materials: Vec<String> = recipe
            .materials
            .iter()
            .map(|(id, count)| {
                let name = catalog.item(id).map(|t| t.name.as_str()).unwrap_or(id);
                format!("{} x{}", name, count)
            })
            .collect();
        lines.push(format!("- {}: {}", output, materials.join(", ")));
    }
    if lines.is_empty() {
        lines.push("Nothing can be made here.".to_string());
    } else {
        lines.insert(0, format!("You can make the following at the {}:", station));
    }
    lines
}
