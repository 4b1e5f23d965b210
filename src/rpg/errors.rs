use thiserror::Error;

/// Errors raised while resolving a single player command.
///
/// The display strings are written for the player; the session prints them
/// and keeps running. None of these end a session.
#[derive(Debug, Error)]
pub enum GameError {
    /// An item template id that the catalog does not contain.
    #[error("Error: tried to create an unknown item with id '{0}'.")]
    UnknownTemplate(String),

    /// A location id that the world graph does not contain.
    #[error("Error: location '{0}' not found.")]
    UnknownLocation(String),

    /// A spell the player does not know, or one with no damage type.
    #[error("You don't know the spell '{0}'.")]
    UnknownSpell(String),

    /// An NPC id that the world does not contain.
    #[error("Error: npc '{0}' not found.")]
    UnknownNpc(String),

    /// A status effect id missing from the catalog.
    #[error("Error: unknown effect '{0}'.")]
    UnknownEffect(String),

    /// An enemy template id missing from the catalog.
    #[error("Error: enemy '{0}' not found.")]
    UnknownEnemy(String),

    /// No quest with this display name exists.
    #[error("There is no quest called '{0}'.")]
    UnknownQuest(String),

    /// Spell cost exceeds current mana.
    #[error("You don't have enough mana to cast that spell ({needed} needed, {available} available).")]
    InsufficientMana { needed: i32, available: i32 },

    /// Price exceeds current gold.
    #[error("You need {needed} gold for that, but you only have {available}.")]
    InsufficientGold { needed: i32, available: i32 },

    /// The shop has none of this item left.
    #[error("The shop is sold out of {0}.")]
    InsufficientStock(String),

    /// Not one of weapon, chest, head, legs, feet.
    #[error("'{0}' is not a valid equipment slot.")]
    InvalidSlot(String),

    /// The player carries nothing by that name.
    #[error("You don't have a '{0}'.")]
    ItemNotFound(String),

    /// Durability is zero.
    #[error("You cannot equip the {0}, it is broken.")]
    ItemBroken(String),

    /// Item exists but is not a consumable.
    #[error("You can't use the {0} like that.")]
    NotUsable(String),

    /// Item exists but has no equipment slot.
    #[error("You cannot equip the {0}.")]
    NotEquippable(String),

    /// Save file exists but could not be parsed or applied.
    #[error("Error loading game: {path} is malformed ({reason}).")]
    MalformedSaveFile { path: String, reason: String },

    /// No save file at the requested slot.
    #[error("No save file found at {0}.")]
    SaveFileMissing(String),

    /// Input that matches no command.
    #[error("Invalid action.")]
    InvalidAction(String),

    /// Wrapper around IO errors (save directory, catalog files).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around serde_json errors.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GameError {
    /// True for errors caused by what the player typed, as opposed to data or IO
    /// problems. Used to pick the log level.
    pub fn is_player_mistake(&self) -> bool {
        !matches!(
            self,
            GameError::UnknownTemplate(_)
                | GameError::UnknownLocation(_)
                | GameError::UnknownNpc(_)
                | GameError::UnknownEffect(_)
                | GameError::UnknownEnemy(_)
                | GameError::MalformedSaveFile { .. }
                | GameError::SaveFileMissing(_)
                | GameError::Io(_)
                | GameError::Json(_)
        )
    }
}
