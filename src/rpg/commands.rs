//! Input parsing for world and combat commands.
//!
//! Input is trimmed and lowercased before it gets here. Multi-word commands
//! are matched as prefixes first because their arguments may contain spaces,
//! then single-word globals after alias resolution. Anything else is handed to
//! the current location's action table.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    Empty,
    // Multi-word
    TalkTo(String),
    ViewQuests,
    AcceptQuest(String),
    TurnIn(String),
    ChangeClass,
    // Globals
    Save(Option<String>),
    Load(Option<String>),
    Transform(String),
    Revert,
    Buy(String),
    Cast(String),
    Repair(String),
    Chop,
    Craft(String),
    Smelt(String),
    Use(String),
    Inventory,
    Equip(String),
    Unequip(String),
    Stats,
    Equipment,
    Look(Option<String>),
    Open(String),
    Reroll,
    Quit,
    /// Not a global; resolved against the location's actions.
    Other { verb: String, args: String },
}

const MULTI_WORD: [&str; 5] = ["talk to", "view quests", "accept quest", "turn in", "change class"];

pub fn resolve_alias(word: &str) -> &str {
    match word {
        "i" | "inv" => "inventory",
        "c" | "char" | "character" => "stats",
        "e" | "gear" => "equipment",
        "l" => "look",
        "exit" => "quit",
        other => other,
    }
}

fn optional(arg: &str) -> Option<String> {
    if arg.is_empty() {
        None
    } else {
        Some(arg.to_string())
    }
}

pub fn parse_command(input: &str) -> GameCommand {
    let input = input.trim();
    if input.is_empty() {
        return GameCommand::Empty;
    }

    for prefix in MULTI_WORD {
        if let Some(rest) = input.strip_prefix(prefix) {
            // "turn inward" is not "turn in".
            if !rest.is_empty() && !rest.starts_with(' ') {
                continue;
            }
            let arg = rest.trim().to_string();
            return match prefix {
                "talk to" => GameCommand::TalkTo(arg),
                "view quests" => GameCommand::ViewQuests,
                "accept quest" => GameCommand::AcceptQuest(arg),
                "turn in" => GameCommand::TurnIn(arg),
                _ => GameCommand::ChangeClass,
            };
        }
    }

    let (word, args) = match input.split_once(' ') {
        Some((w, rest)) => (w, rest.trim()),
        None => (input, ""),
    };
    let arg = args.to_string();
    match resolve_alias(word) {
        "save" => GameCommand::Save(optional(args)),
        "load" => GameCommand::Load(optional(args)),
        "transform" => GameCommand::Transform(arg),
        "revert" => GameCommand::Revert,
        "buy" => GameCommand::Buy(arg),
        "cast" => GameCommand::Cast(arg),
        "repair" => GameCommand::Repair(arg),
        "chop" => GameCommand::Chop,
        "craft" => GameCommand::Craft(arg),
        "smelt" => GameCommand::Smelt(arg),
        "use" => GameCommand::Use(arg),
        "inventory" => GameCommand::Inventory,
        "equip" => GameCommand::Equip(arg),
        "unequip" => GameCommand::Unequip(arg),
        "stats" => GameCommand::Stats,
        "equipment" => GameCommand::Equipment,
        "look" => GameCommand::Look(optional(args.strip_prefix("at ").unwrap_or(args).trim())),
        "open" => GameCommand::Open(arg),
        "reroll" => GameCommand::Reroll,
        "quit" => GameCommand::Quit,
        verb => GameCommand::Other {
            verb: verb.to_string(),
            args: arg,
        },
    }
}

/// Actions available while an encounter is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatCommand {
    Attack,
    Cast(String),
    Use(String),
    Flee,
    Rage,
    Heal,
    Reroll,
    Unknown(String),
}

impl CombatCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let (word, args) = match input.split_once(' ') {
            Some((w, rest)) => (w, rest.trim()),
            None => (input, ""),
        };
        match word {
            "a" | "attack" => CombatCommand::Attack,
            "c" | "cast" => CombatCommand::Cast(args.to_string()),
            "u" | "use" => CombatCommand::Use(args.to_string()),
            "f" | "flee" => CombatCommand::Flee,
            "rage" => CombatCommand::Rage,
            "heal" => CombatCommand::Heal,
            "reroll" => CombatCommand::Reroll,
            _ => CombatCommand::Unknown(input.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_word_commands_take_priority() {
        assert_eq!(parse_command("talk to father andrew"), GameCommand::TalkTo("father andrew".into()));
        assert_eq!(parse_command("accept quest goblin slayer"), GameCommand::AcceptQuest("goblin slayer".into()));
        assert_eq!(parse_command("turn in bone collector"), GameCommand::TurnIn("bone collector".into()));
        assert_eq!(parse_command("view quests"), GameCommand::ViewQuests);
        assert_eq!(parse_command("change class"), GameCommand::ChangeClass);
    }

    #[test]
    fn aliases_resolve_before_matching() {
        assert_eq!(parse_command("i"), GameCommand::Inventory);
        assert_eq!(parse_command("c"), GameCommand::Stats);
        assert_eq!(parse_command("character"), GameCommand::Stats);
        assert_eq!(parse_command("gear"), GameCommand::Equipment);
        assert_eq!(parse_command("e"), GameCommand::Equipment);
    }

    #[test]
    fn arguments_keep_their_spaces() {
        assert_eq!(parse_command("buy health potion"), GameCommand::Buy("health potion".into()));
        assert_eq!(parse_command("look at workbench"), GameCommand::Look(Some("workbench".into())));
        assert_eq!(parse_command("look"), GameCommand::Look(None));
        assert_eq!(parse_command("save"), GameCommand::Save(None));
        assert_eq!(parse_command("load slot2.json"), GameCommand::Load(Some("slot2.json".into())));
    }

    #[test]
    fn unknown_words_fall_through_to_location() {
        assert_eq!(parse_command(""), GameCommand::Empty);
        assert_eq!(
            parse_command("adventurers guild"),
            GameCommand::Other { verb: "adventurers".into(), args: "guild".into() }
        );
        assert_eq!(
            parse_command("north"),
            GameCommand::Other { verb: "north".into(), args: String::new() }
        );
        assert!(matches!(parse_command("turnip"), GameCommand::Other { .. }));
    }

    #[test]
    fn combat_shortcuts() {
        assert_eq!(CombatCommand::parse("a"), CombatCommand::Attack);
        assert_eq!(CombatCommand::parse("c ice shard"), CombatCommand::Cast("ice shard".into()));
        assert_eq!(CombatCommand::parse("cast"), CombatCommand::Cast(String::new()));
        assert_eq!(CombatCommand::parse("u health potion"), CombatCommand::Use("health potion".into()));
        assert_eq!(CombatCommand::parse("dance"), CombatCommand::Unknown("dance".into()));
    }
}
