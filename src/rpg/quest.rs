//! Quest definitions and the player's quest log.

use serde::{Deserialize, Serialize};

use crate::rpg::catalog::Catalog;
use crate::rpg::types::{Player, QuestLogEntry, QuestStatus};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    Kill,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestObjective {
    pub kind: ObjectiveKind,
    /// Enemy template id.
    pub target: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestReward {
    pub gold: i32,
    pub xp: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub objective: QuestObjective,
    pub reward: QuestReward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    Accepted,
    AlreadyTaken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnInOutcome {
    NotActive,
    Incomplete { progress: u32, count: u32 },
    Completed { gold: i32, xp: u32 },
}

/// A kill counted toward an accepted quest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestProgress {
    pub quest_name: String,
    pub progress: u32,
    pub count: u32,
}

/// Quests the player has never accepted.
pub fn available_quests<'a>(catalog: &'a Catalog, player: &Player) -> Vec<&'a QuestDef> {
    catalog
        .quests
        .values()
        .filter(|q| !player.quest_log.contains_key(&q.id))
        .collect()
}

pub fn accept_quest(player: &mut Player, quest: &QuestDef) -> AcceptOutcome {
    if player.quest_log.contains_key(&quest.id) {
        return AcceptOutcome::AlreadyTaken;
    }
    player.quest_log.insert(
        quest.id.clone(),
        QuestLogEntry {
            status: QuestStatus::Accepted,
            progress: 0,
        },
    );
    AcceptOutcome::Accepted
}

/// Count a defeated enemy against every accepted quest that targets its template id.
pub fn record_kill(player: &mut Player, catalog: &Catalog, enemy_id: &str) -> Vec<QuestProgress> {
    let mut updates = Vec::new();
    for (quest_id, entry) in player.quest_log.iter_mut() {
        if entry.status != QuestStatus::Accepted {
            continue;
        }
        let Some(def) = catalog.quests.get(quest_id) else {
            continue;
        };
        if def.objective.kind == ObjectiveKind::Kill && def.objective.target == enemy_id {
            entry.progress += 1;
            updates.push(QuestProgress {
                quest_name: def.name.clone(),
                progress: entry.progress,
                count: def.objective.count,
            });
        }
    }
    updates
}

/// Complete a quest whose objective is met and pay out the reward. The caller
/// runs the level-up check afterwards.
pub fn turn_in(player: &mut Player, quest: &QuestDef) -> TurnInOutcome {
    let Some(entry) = player.quest_log.get_mut(&quest.id) else {
        return TurnInOutcome::NotActive;
    };
    if entry.status != QuestStatus::Accepted {
        return TurnInOutcome::NotActive;
    }
    if entry.progress < quest.objective.count {
        return TurnInOutcome::Incomplete {
            progress: entry.progress,
            count: quest.objective.count,
        };
    }
    entry.status = QuestStatus::Completed;
    player.stats.gold += quest.reward.gold;
    player.stats.experience += quest.reward.xp;
    TurnInOutcome::Completed {
        gold: quest.reward.gold,
        xp: quest.reward.xp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpg::types::{Class, Race};

    fn setup() -> (Catalog, Player) {
        (
            Catalog::builtin(),
            Player::new("Q", Race::Human, Class::Warrior, "adventurers guild"),
        )
    }

    #[test]
    fn kills_only_count_for_accepted_matching_quests() {
        let (catalog, mut player) = setup();
        assert!(record_kill(&mut player, &catalog, "goblin").is_empty());

        let quest = catalog.quests["goblin_slayer"].clone();
        assert_eq!(accept_quest(&mut player, &quest), AcceptOutcome::Accepted);
        assert!(record_kill(&mut player, &catalog, "skeleton").is_empty());
        let updates = record_kill(&mut player, &catalog, "goblin");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].progress, 1);
        assert_eq!(player.quest_log["goblin_slayer"].progress, 1);
    }

    #[test]
    fn turn_in_requires_full_progress_and_pays_once() {
        let (catalog, mut player) = setup();
        let quest = catalog.quests["bone_collector"].clone();
        assert_eq!(turn_in(&mut player, &quest), TurnInOutcome::NotActive);
        accept_quest(&mut player, &quest);
        record_kill(&mut player, &catalog, "skeleton");
        assert_eq!(
            turn_in(&mut player, &quest),
            TurnInOutcome::Incomplete { progress: 1, count: 2 }
        );
        record_kill(&mut player, &catalog, "skeleton");
        let gold_before = player.stats.gold;
        assert_eq!(
            turn_in(&mut player, &quest),
            TurnInOutcome::Completed { gold: 120, xp: 60 }
        );
        assert_eq!(player.stats.gold, gold_before + 120);
        assert_eq!(turn_in(&mut player, &quest), TurnInOutcome::NotActive);
        // Completed quests no longer advance.
        assert!(record_kill(&mut player, &catalog, "skeleton").is_empty());
    }

    #[test]
    fn accepted_quests_leave_the_available_list() {
        let (catalog, mut player) = setup();
        assert_eq!(available_quests(&catalog, &player).len(), 2);
        let quest = catalog.quests["goblin_slayer"].clone();
        accept_quest(&mut player, &quest);
        assert_eq!(accept_quest(&mut player, &quest), AcceptOutcome::AlreadyTaken);
        assert_eq!(available_quests(&catalog, &player).len(), 1);
    }
}
