//! The game core: world graph, command dispatch, combat, items, stats and
//! progression. A [`GameSession`] owns all of it; callers feed it one input
//! line at a time.

pub mod actions;
pub mod catalog;
pub mod clock;
pub mod combat;
pub mod commands;
pub mod crafting;
pub mod effects;
pub mod errors;
pub mod items;
pub mod persistence;
pub mod progression;
pub mod quest;
pub mod racial;
pub mod render;
pub mod seed_loader;
pub mod session;
pub mod skill;
pub mod stats;
pub mod types;
pub mod world;
pub mod world_seed;

pub use catalog::Catalog;
pub use clock::Clock;
pub use combat::{Encounter, EnemyInstance};
pub use commands::{parse_command, CombatCommand, GameCommand};
pub use errors::GameError;
pub use items::ItemFactory;
pub use persistence::{read_save, write_save, SaveData};
pub use progression::{check_for_level_up, xp_threshold};
pub use seed_loader::{apply_catalog_overrides, apply_world_overrides};
pub use session::{GameSession, PendingPrompt, RunStatus, SaveSettings};
pub use skill::Skill;
pub use stats::{apply_stat_bonuses, effective_stats};
pub use world::World;
pub use world_seed::{canonical_world, START_LOCATION};
pub use types::*;
