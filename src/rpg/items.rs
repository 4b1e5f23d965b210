//! Item instance factory, rarity rolls and durability bookkeeping.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rpg::catalog::{Catalog, RarityTier};
use crate::rpg::errors::GameError;
use crate::rpg::types::{EquipSlot, ItemInstance, Player};

/// Hands out item ids. The counter only moves forward and is saved with the
/// game, so an id is never reused within a save lineage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemFactory {
    next_id: u64,
}

impl ItemFactory {
    pub fn starting_at(next_id: u64) -> Self {
        Self { next_id }
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Build a new instance of `template_id`. With `roll_rarity` the name gains a
    /// rarity prefix (and a metal for bladed weapons) and every stat bonus is
    /// scaled by the tier multiplier.
    pub fn create<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        rng: &mut R,
        template_id: &str,
        roll_rarity: bool,
    ) -> Result<ItemInstance, GameError> {
        let template = catalog.item(template_id)?;
        let mut instance = ItemInstance {
            template_id: template.id.clone(),
            unique_id: self.next_id,
            name: template.name.clone(),
            kind: template.kind,
            equip_slot: template.equip_slot,
            durability: template.max_durability,
            max_durability: template.max_durability,
            stats: template.stats.clone(),
            mining_bonus: template.mining_bonus,
            rarity: None,
            material: None,
        };
        self.next_id += 1;

        if roll_rarity {
            let rank = roll_rarity_rank(catalog, rng);
            let tier = tier_at(catalog, rank);
            for value in instance.stats.values_mut() {
                *value = (f64::from(*value) * tier.multiplier).round() as i32;
            }
            instance.name = format!("{} {}", tier.name, template.name);
            if catalog.is_bladed(template) && !catalog.metals.is_empty() {
                let metal_idx = rank.min(catalog.metals.len() - 1);
                let material = catalog.metals[metal_idx].clone();
                instance.name = format!("{} {} {}", tier.name, material, template.name);
                instance.material = Some(material);
            }
            instance.rarity = Some(tier.name.clone());
        }

        log::trace!(
            "created item #{} '{}' from {}",
            instance.unique_id,
            instance.name,
            template_id
        );
        Ok(instance)
    }
}

/// Index of the tier a draw in `[0, 1)` lands in, walking the table and
/// accumulating chance. Draws past the table's total map to the fallback tier.
pub fn rarity_rank_for_draw(tiers: &[RarityTier], fallback: &str, draw: f64) -> usize {
    let mut cumulative = 0.0;
    for (idx, tier) in tiers.iter().enumerate() {
        cumulative += tier.chance;
        if draw < cumulative {
            return idx;
        }
    }
    tiers.iter().position(|t| t.name == fallback).unwrap_or(0)
}

pub fn roll_rarity_rank<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> usize {
    let draw: f64 = rng.gen();
    rarity_rank_for_draw(&catalog.rarities, &catalog.fallback_rarity, draw)
}

fn tier_at(catalog: &Catalog, rank: usize) -> RarityTier {
    catalog.rarities.get(rank).cloned().unwrap_or_else(|| RarityTier {
        name: catalog.fallback_rarity.clone(),
        chance: 0.0,
        multiplier: 1.0,
    })
}

/// Lower durability by `amount`, never below zero. Returns true when this call
/// broke the item. Items without durability are untouched.
pub fn decrease_durability(item: &mut ItemInstance, amount: u32) -> bool {
    match item.durability {
        Some(current) if current > 0 => {
            let next = current.saturating_sub(amount);
            item.durability = Some(next);
            next == 0
        }
        _ => false,
    }
}

/// Wear an equipped item. A piece that breaks leaves its slot and is returned.
pub fn wear_equipped(player: &mut Player, slot: EquipSlot, amount: u32) -> Option<ItemInstance> {
    let holder = player.equipment.slot_mut(slot);
    let broke = holder.as_mut().map(|item| decrease_durability(item, amount))?;
    if broke {
        holder.take()
    } else {
        None
    }
}

/// Wear an inventory item by id. A piece that breaks leaves the inventory and is returned.
pub fn wear_inventory(player: &mut Player, unique_id: u64, amount: u32) -> Option<ItemInstance> {
    let item = player.inventory.iter_mut().find(|i| i.unique_id == unique_id)?;
    if decrease_durability(item, amount) {
        player.remove_by_unique_id(unique_id)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpg::types::{Class, Race, Stat};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn shop_instances_keep_template_name_and_full_durability() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(1);
        let mut factory = ItemFactory::default();
        let sword = factory.create(&catalog, &mut rng, "rusty_sword", false).unwrap();
        assert_eq!(sword.name, "Rusty Sword");
        assert_eq!(sword.durability, Some(30));
        assert_eq!(sword.rarity, None);
        let torch = factory.create(&catalog, &mut rng, "torch", false).unwrap();
        assert_eq!(torch.durability, None);
        assert_ne!(sword.unique_id, torch.unique_id);
    }

    #[test]
    fn unknown_template_is_an_error_and_burns_no_id() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(1);
        let mut factory = ItemFactory::default();
        let err = factory.create(&catalog, &mut rng, "excalibur", false).unwrap_err();
        assert!(matches!(err, GameError::UnknownTemplate(ref id) if id == "excalibur"));
        assert_eq!(factory.next_id(), 0);
    }

    #[test]
    fn ids_are_unique_across_many_creations() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(7);
        let mut factory = ItemFactory::default();
        let mut seen = HashSet::new();
        for i in 0..500 {
            let id = if i % 2 == 0 { "rusty_sword" } else { "health_potion" };
            let item = factory.create(&catalog, &mut rng, id, i % 3 == 0).unwrap();
            assert!(seen.insert(item.unique_id), "duplicate id {}", item.unique_id);
        }
    }

    #[test]
    fn rarity_scales_stats_and_names_bladed_material() {
        let catalog = Catalog::builtin();
        let mut factory = ItemFactory::default();
        // A draw in [0.85, 0.95) is Rare, rank 3.
        let seed = (0u64..10_000)
            .find(|s| {
                let mut rng = StdRng::seed_from_u64(*s);
                let draw: f64 = rng.gen();
                (0.85..0.95).contains(&draw)
            })
            .expect("seed");
        let mut rng = StdRng::seed_from_u64(seed);
        let sword = factory.create(&catalog, &mut rng, "rusty_sword", true).unwrap();
        assert_eq!(sword.rarity.as_deref(), Some("Rare"));
        assert_eq!(sword.material.as_deref(), Some("adamant"));
        assert_eq!(sword.name, "Rare adamant Rusty Sword");
        // 2 * 1.5 = 3
        assert_eq!(sword.stats.get(&Stat::Attack), Some(&3));
    }

    #[test]
    fn rarity_draw_walks_cumulative_table() {
        let catalog = Catalog::builtin();
        let rank = |d| rarity_rank_for_draw(&catalog.rarities, "Common", d);
        assert_eq!(rank(0.0), 0);
        assert_eq!(rank(0.2499), 0);
        assert_eq!(rank(0.25), 1);
        assert_eq!(rank(0.8499), 2);
        assert_eq!(rank(0.96), 4);
        // Past the table total falls back to Common.
        assert_eq!(rank(0.9995), 1);
    }

    #[test]
    fn rarity_distribution_converges_to_table() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(42);
        let n = 200_000;
        let mut counts = vec![0usize; catalog.rarities.len()];
        for _ in 0..n {
            counts[roll_rarity_rank(&catalog, &mut rng)] += 1;
        }
        let total_chance: f64 = catalog.rarities.iter().map(|r| r.chance).sum();
        for (idx, tier) in catalog.rarities.iter().enumerate().take(5) {
            let mut expected = tier.chance;
            if tier.name == "Common" {
                expected += 1.0 - total_chance;
            }
            let observed = counts[idx] as f64 / n as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "{}: observed {} expected {}",
                tier.name,
                observed,
                expected
            );
        }
    }

    #[test]
    fn durability_never_goes_negative_and_breaks_once() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(3);
        let mut factory = ItemFactory::default();
        let mut player = Player::new("T", Race::Human, Class::Warrior, "forest");
        let mut sword = factory.create(&catalog, &mut rng, "rusty_sword", false).unwrap();
        sword.durability = Some(2);
        player.equipment.weapon = Some(sword);

        assert!(wear_equipped(&mut player, EquipSlot::Weapon, 1).is_none());
        let broken = wear_equipped(&mut player, EquipSlot::Weapon, 5).expect("breaks");
        assert_eq!(broken.durability, Some(0));
        assert!(player.equipment.weapon.is_none());
        assert!(wear_equipped(&mut player, EquipSlot::Weapon, 1).is_none());
    }

    #[test]
    fn broken_inventory_item_is_removed() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(3);
        let mut factory = ItemFactory::default();
        let mut player = Player::new("T", Race::Dwarf, Class::Warrior, "forest");
        let mut pick = factory.create(&catalog, &mut rng, "rusty_pickaxe", false).unwrap();
        pick.durability = Some(1);
        let id = pick.unique_id;
        player.inventory.push(pick);
        assert!(wear_inventory(&mut player, id, 1).is_some());
        assert!(player.inventory.is_empty());
        assert!(wear_inventory(&mut player, id, 1).is_none());
    }
}
