//! Save files: snapshot shape, atomic writes and validated loads.

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::rpg::clock::Clock;
use crate::rpg::errors::GameError;
use crate::rpg::items::ItemFactory;
use crate::rpg::session::GameSession;
use crate::rpg::types::{Player, SAVE_SCHEMA_VERSION};
use crate::rpg::world::{LocationState, NpcState};

/// Everything mutable about a game outside an encounter. Static location data
/// is rebuilt from the catalog and only the mutable parts are stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveData {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    pub player: Player,
    #[serde(default)]
    pub clock: Clock,
    #[serde(default)]
    pub next_item_id: u64,
    #[serde(default)]
    pub locations: BTreeMap<String, LocationState>,
    #[serde(default)]
    pub npcs: BTreeMap<String, NpcState>,
}

impl SaveData {
    pub fn capture(session: &GameSession) -> Self {
        Self {
            version: SAVE_SCHEMA_VERSION,
            saved_at: Some(Utc::now()),
            player: session.player.clone(),
            clock: session.clock,
            next_item_id: session.items.next_id(),
            locations: session.world.location_states(),
            npcs: session.world.npc_states(),
        }
    }
}

/// Write `content` to `path` via a temp file and rename, holding an exclusive
/// lock on `<path>.lock` for the duration.
pub fn write_json_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;
    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("savegame.json");
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(dir.join(format!("{}.lock", base)))?;
    lock_file.lock_exclusive()?;

    let mut counter = 0u32;
    let tmp_path = loop {
        let cand = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&cand) {
            Ok(mut tmp) => {
                tmp.write_all(content.as_bytes())?;
                tmp.flush()?;
                tmp.sync_all()?;
                break cand;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
            }
            Err(e) => return Err(e),
        }
    };
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    if let Ok(dirf) = File::open(dir) {
        let _ = dirf.sync_all();
    }
    fs2::FileExt::unlock(&lock_file)?;
    Ok(())
}

pub fn write_save(path: &Path, data: &SaveData) -> Result<(), GameError> {
    let content = serde_json::to_string_pretty(data)?;
    write_json_atomic(path, &content)?;
    Ok(())
}

/// Read and parse a save. A missing file and a file that does not parse are
/// reported separately; neither touches any game state.
pub fn read_save(path: &Path) -> Result<SaveData, GameError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(GameError::SaveFileMissing(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    let data: SaveData = serde_json::from_str(&content).map_err(|e| GameError::MalformedSaveFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    if data.version > SAVE_SCHEMA_VERSION {
        return Err(GameError::MalformedSaveFile {
            path: path.display().to_string(),
            reason: format!("unsupported save version {}", data.version),
        });
    }
    Ok(data)
}

impl GameSession {
    fn save_path(&self, slot: Option<&str>, default: &str) -> Option<PathBuf> {
        let dir = self.save.dir.as_ref()?;
        let file = match slot.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => crate::validation::safe_filename(name),
            None => default.to_string(),
        };
        Some(dir.join(file))
    }

    pub(crate) fn handle_save(&mut self, slot: Option<&str>) -> Result<(), GameError> {
        let default = self.save.savegame_file.clone();
        let Some(path) = self.save_path(slot, &default) else {
            self.say("Saving is disabled for this game.");
            return Ok(());
        };
        write_save(&path, &SaveData::capture(self))?;
        log::info!("game saved to {}", path.display());
        self.say(format!("Game saved to {}.", path.display()));
        Ok(())
    }

    /// Replace the whole session state from a save. The snapshot is checked
    /// against the current world before anything is replaced.
    pub(crate) fn handle_load(&mut self, slot: Option<&str>) -> Result<(), GameError> {
        let default = self.save.savegame_file.clone();
        let Some(path) = self.save_path(slot, &default) else {
            self.say("Loading is disabled for this game.");
            return Ok(());
        };
        let data = read_save(&path)?;
        self.restore(data).map_err(|e| match e {
            GameError::MalformedSaveFile { reason, .. } => GameError::MalformedSaveFile {
                path: path.display().to_string(),
                reason,
            },
            GameError::UnknownLocation(id) => GameError::MalformedSaveFile {
                path: path.display().to_string(),
                reason: format!("unknown location '{}'", id),
            },
            other => other,
        })?;
        log::info!("game loaded from {}", path.display());
        self.say("Game loaded successfully!");
        Ok(())
    }

    /// Apply a snapshot. On error nothing has changed.
    pub fn restore(&mut self, data: SaveData) -> Result<(), GameError> {
        self.world.location(&data.player.location)?;
        let highest = data
            .player
            .inventory
            .iter()
            .chain(data.player.equipment.iter().map(|(_, item)| item))
            .map(|item| item.unique_id + 1)
            .max()
            .unwrap_or(0);
        let mut world = self.world.clone();
        world.apply_states(&data.locations, &data.npcs)?;

        self.world = world;
        self.player = data.player;
        self.clock = data.clock;
        self.items = ItemFactory::starting_at(data.next_item_id.max(highest));
        self.encounter = None;
        self.prompt = None;
        Ok(())
    }

    /// Quiet save after travel. Failures are logged, never shown.
    pub(crate) fn autosave(&mut self) {
        if !self.save.autosave {
            return;
        }
        let default = self.save.autosave_file.clone();
        let Some(path) = self.save_path(None, &default) else {
            return;
        };
        match write_save(&path, &SaveData::capture(self)) {
            Ok(()) => log::debug!("autosaved to {}", path.display()),
            Err(e) => log::warn!("autosave to {} failed: {}", path.display(), e),
        }
    }
}
