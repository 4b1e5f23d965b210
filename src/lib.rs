//! # Aethel - a single-player text role-playing game
//!
//! The player explores named locations, talks to NPCs, buys, uses and equips
//! items, gathers and crafts, and fights turn-based battles. Progress is saved
//! to JSON files and can be reloaded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aethel::rpg::{apply_stat_bonuses, canonical_world, Catalog, Class, GameSession, Player, Race};
//!
//! let mut player = Player::new("Tess", Race::Dwarf, Class::Warrior, "forest");
//! apply_stat_bonuses(&mut player);
//! let mut game = GameSession::with_seed(Catalog::builtin(), canonical_world(), player, 42);
//! println!("{}", game.opening());
//! println!("{}", game.handle_input("look"));
//! ```
//!
//! ## Module Organization
//!
//! - [`rpg`] - Game core: world, dispatcher, combat, items, stats, progression and saves
//! - [`config`] - Configuration loading
//! - [`logutil`] - Log formatting helpers
//! - [`validation`] - Filename sanitising for save slots

pub mod config;
pub mod logutil;
pub mod rpg;
pub mod validation;
