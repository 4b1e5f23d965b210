//! Canonical world content: the starting map, its NPCs, shops and features.

use crate::rpg::world::{
    ActionEffect, ChestContents, Description, DescriptionRule, Interactable, Location,
    LocationAction, Npc, OnEnter, World,
};

pub const START_LOCATION: &str = "forest";
pub const MINE_ENTRANCE: &str = "old abandoned mine";
pub const MINE_FLOOR: &str = "mine floor";
pub const BLACKSMITH: &str = "blacksmith";
pub const GUILD: &str = "adventurers guild";

fn travel(to: &str, hours: u32) -> LocationAction {
    LocationAction::new(ActionEffect::Travel {
        to: to.to_string(),
        hours,
    })
}

fn travel_narrated(text: &str, to: &str, hours: u32) -> LocationAction {
    LocationAction::narrated(
        text,
        ActionEffect::Travel {
            to: to.to_string(),
            hours,
        },
    )
}

fn walk(to: &str) -> LocationAction {
    LocationAction::new(ActionEffect::Move { to: to.to_string() })
}

fn fight(text: &str, enemy: &str) -> LocationAction {
    LocationAction::narrated(
        text,
        ActionEffect::StartCombat {
            enemy: enemy.to_string(),
        },
    )
}

fn text(s: &str) -> Description {
    Description::Static(s.to_string())
}

pub fn canonical_world() -> World {
    let mut world = World::default();

    world.add_npc(Npc::new(
        "old_man_gideon",
        "Gideon",
        "A weathered old man with a long white beard sits on a tree stump, whittling a piece of wood.",
        &[
            "Well, hello there, traveler. It's not often I see a new face in these woods...",
            "Be careful if you're heading north. There's a dark cave up that way. I'd recommend getting a torch if you plan to explore it...",
            "The village to the east is usually welcoming, but they've been on edge lately...",
            "The priest, Father Andrew, keeps talking about someone arriving in this world from another. What was that name he kept saying...",
            "OH RIGHT!!!",
            "It was {name}!",
        ],
    ));
    world.add_npc(Npc::new(
        "elara_the_shopkeeper",
        "Elara",
        "A cheerful woman with a bright smile stands behind the counter.",
        &[
            "Welcome to my shop! What can I get for you today?",
            "I've got a fresh stock of torches, perfect for exploring dark places. Just say 'buy torch'.",
        ],
    ));
    world.add_npc(Npc::new(
        "james_the_blacksmith",
        "James",
        "A gruff and burly man with massive arms who is very passionate about blacksmithing.",
        &[
            "Great, another {race}, and a {class} at that. Are you here to buy something or just to waste my time?",
            "Make it quick. Time is money and I don't have much of either to spare.",
        ],
    ));
    world.add_npc(Npc::new(
        "father_andrew",
        "Father Andrew",
        "A refined man of the cloth whose calm presence puts everyone around him at peace.",
        &["Welcome {name}, I have been told of your arrival in this world."],
    ));

    world.add_location(
        Location::new(
            START_LOCATION,
            text("You are in a dense forest. You can go 'north', 'east', 'west', or 'south'."),
        )
        .with_long_description(
            "Ancient trees form a canopy so thick it blots out most of the sun. The air is damp and smells of earth and moss. A faint path winds through the undergrowth.",
        )
        .with_npc("old_man_gideon")
        .with_action("north", travel("cave", 1))
        .with_action(
            "south",
            travel_narrated(
                "You wander deeper into the forest and find a dungeon, its entrance half buried in tree roots.",
                "dungeon",
                1,
            ),
        )
        .with_action(
            "east",
            LocationAction::narrated(
                "You have discovered a village.",
                ActionEffect::Move {
                    to: "village entrance".to_string(),
                },
            ),
        )
        .with_action("west", travel_narrated("You go west, and find a road.", "roads", 1))
        .with_interactable(
            "trees",
            Interactable::plain(
                "The ancient trees of the forest stand tall and proud. They look like a good source of wood.",
            )
            .with_verb("chop"),
        ),
    );

    world.add_location(
        Location::new("cave", Description::Computed(DescriptionRule::CaveLight))
            .with_long_description(
                "The cave mouth is a dark gap in the side of a rocky hill. A chill wind blows out from within, carrying the smell of damp stone.",
            )
            .with_action("back", travel(START_LOCATION, 1))
            .with_action(
                "proceed",
                LocationAction::narrated(
                    "You explore further into the cave and find an old abandoned mine.",
                    ActionEffect::TravelIf {
                        to: MINE_ENTRANCE.to_string(),
                        hours: 1,
                        requires_item: "torch".to_string(),
                        denied: "It's too dark to proceed without a light source.".to_string(),
                    },
                ),
            ),
    );

    world.add_location(
        Location::new(
            "village entrance",
            text("You have discovered a village. You can 'explore' or go 'back' to the forest."),
        )
        .with_long_description(
            "A simple wooden palisade marks the entrance to a small village. Thatched roofs rise beyond the gate.",
        )
        .with_action(
            "explore",
            travel_narrated("You decide to explore the village.", "inside village", 0),
        )
        .with_action("back", travel(START_LOCATION, 1)),
    );

    let mut village = Location::new(
        "inside village",
        text("You are inside the village. Where do you go? There's the 'market', 'shop', 'inn', 'temple', 'stables', 'bar', 'adventurers guild', or the 'blacksmith'. You can also go 'back' to the village entrance."),
    )
    .with_long_description(
        "Dirt paths connect a handful of rustic buildings. Villagers go about their day, glancing your way now and then.",
    )
    .with_action("back", travel("village entrance", 0));
    for place in ["market", "shop", "inn", "temple", "stables", "bar", GUILD, BLACKSMITH] {
        village = village.with_action(place, walk(place));
    }
    world.add_location(village);

    world.add_location(
        Location::new("market", text("You are at the bustling market. You can go 'back' to the village."))
            .with_long_description(
                "Stalls sell everything from fresh produce to handmade crafts. The square is loud and smells of bread and smoke.",
            )
            .with_action("back", walk("inside village")),
    );

    world.add_location(
        Location::new("shop", text("You are at the general shop. You can go 'back' to the village."))
            .with_long_description(
                "A cozy general store. Shelves hold coils of rope, bags of grain and lamp oil. A small counter sits near the back.",
            )
            .with_npc("elara_the_shopkeeper")
            .with_stock("torch", 5)
            .with_stock("health_potion", 10)
            .with_stock("mana_potion", 5)
            .with_action("back", travel("inside village", 0)),
    );

    world.add_location(
        Location::new(
            BLACKSMITH,
            text("You are at James' blacksmith shop. You can go 'back' to the village."),
        )
        .with_long_description(
            "The air is hot and thick with the smell of coal and metal. A forge glows in the corner and an anvil sits in the center of the room. A sturdy workbench stands against one wall.",
        )
        .with_npc("james_the_blacksmith")
        .with_station("workbench")
        .with_station("forge")
        .with_interactable(
            "workbench",
            Interactable::plain(
                "A large, sturdy workbench covered in tools, metal shavings and leather scraps.",
            ),
        )
        .with_interactable(
            "forge",
            Interactable::plain(
                "A massive stone forge radiating intense heat. The coals glow red, ready to smelt the toughest ores.",
            ),
        )
        .with_stock("rusty_sword", 1)
        .with_stock("leather_armor", 1)
        .with_stock("rusty_pickaxe", 1)
        .with_stock("lockpick", 3)
        .with_action("back", travel("inside village", 0)),
    );

    world.add_location(
        Location::new("inn", text("You are at the cozy inn. You can go 'back' to the village."))
            .with_long_description(
                "A large fireplace crackles in the corner and a few patrons nurse their drinks. The smell of stew hangs in the air.",
            )
            .with_action("back", travel("inside village", 0))
            .with_action(
                "sleep",
                LocationAction::narrated(
                    "You sleep soundly until morning.",
                    ActionEffect::Sleep { hours: 8 },
                ),
            ),
    );

    world.add_location(
        Location::new("temple", text("You are at the serene temple. You can go 'back' to the village."))
            .with_long_description(
                "A quiet building of white stone. Incense hangs in the air and soft light filters through stained glass.",
            )
            .with_npc("father_andrew")
            .with_action("back", walk("inside village")),
    );

    world.add_location(
        Location::new("stables", text("You are at the stables. You can go 'back' to the village."))
            .with_long_description("The stables smell of hay. A few horses watch you from their stalls.")
            .with_action("back", walk("inside village")),
    );

    world.add_location(
        Location::new("bar", text("You are at the noisy bar. You can go 'back' to the village."))
            .with_long_description("Loud chatter, clinking mugs and a floor sticky with spilled ale.")
            .with_action("back", walk("inside village")),
    );

    world.add_location(
        Location::new(
            GUILD,
            text("You are at the adventurers guild. You can 'view quests', 'accept quest <quest name>', 'turn in <quest name>', or 'change class'. You can also go 'back' to the village."),
        )
        .with_long_description(
            "A large, functional hall. A board covered in notices and requests for aid dominates one wall.",
        )
        .with_action("back", travel("inside village", 0)),
    );

    let mut chest = Interactable::plain("It's a sturdy, iron-banded chest. It looks very old.");
    chest.hidden = true;
    chest.trapped = true;
    chest.locked = true;
    chest.contents = Some(ChestContents {
        gold: 50,
        item_ids: vec!["health_potion".to_string()],
    });
    world.add_location(
        Location::new(MINE_ENTRANCE, Description::Computed(DescriptionRule::MineEntrance))
            .with_long_description(
                "The mine shaft is dark and held up by rotting wooden beams. Discarded tools and broken carts litter the ground.",
            )
            .with_interactable("chest", chest)
            .with_action("back", travel("cave", 1))
            .with_action("mine", LocationAction::new(ActionEffect::Mine))
            .with_action("prospect", LocationAction::new(ActionEffect::Prospect))
            .with_action("descend", LocationAction::new(ActionEffect::Descend))
            .with_action(
                "tunnel",
                fight("You squeeze into a side tunnel. Something skitters toward you...", "cave_spider"),
            ),
    );

    world.add_location(
        Location::new(MINE_FLOOR, Description::Computed(DescriptionRule::MineFloor))
            .with_action("up", LocationAction::new(ActionEffect::MineUp))
            .with_action("down", LocationAction::new(ActionEffect::MineDown))
            .with_action("mine", LocationAction::new(ActionEffect::Mine))
            .with_action("prospect", LocationAction::new(ActionEffect::Prospect)),
    );

    world.add_location(
        Location::new(
            "dungeon",
            text("You are at the entrance of a dark dungeon. You can 'enter', go 'deeper', or go 'back' to the forest."),
        )
        .with_long_description(
            "A foreboding stone archway covered in moss and ancient carvings. A sense of dread seeps out of the darkness.",
        )
        .with_action("enter", fight("You step into the damp, dark dungeon...", "goblin"))
        .with_action(
            "deeper",
            fight("You take a crumbling stair down into the lower dungeon...", "skeleton"),
        )
        .with_action("back", travel(START_LOCATION, 1)),
    );

    world.add_location(
        Location::new(
            "roads",
            text("You are on a dusty road. You can go 'north' to the mountains, 'south' to the city, or 'back' to the forest."),
        )
        .with_long_description(
            "A well-trodden dirt road stretches out in both directions toward more civilized lands.",
        )
        .with_action("north", travel("mountains", 1))
        .with_action("south", travel("city", 1))
        .with_action("back", travel(START_LOCATION, 1)),
    );

    world.add_location(
        Location::new(
            "mountains",
            text("Mount Celestus rises before you, its base lost in cloud forest and its summit somewhere beyond the sky. You can 'climb' or go 'back' to the road."),
        )
        .with_long_description(
            "Waterfalls spill down colossal cliffs on the lower slopes. Above the tree line the air thins, glaciers cling to the rock and the wind howls through jagged canyons.",
        )
        .with_action(
            "climb",
            travel_narrated("You climb for hours, but the summit seems no closer.", "mountains", 1),
        )
        .with_action("back", travel("roads", 1)),
    );

    world.add_location(
        Location::new(
            "city",
            text("Aethelgard, a city of white marble spires and bridges of living vine. You can 'explore' the inner city or go 'back' to the road."),
        )
        .with_long_description(
            "Islands drift above a crystalline lake, joined by bridges of moonlight and petrified wood. At the heart of it all, the Sunspire Palace casts a golden glow over the city.",
        )
        .with_action("explore", travel("inner city", 1))
        .with_action("back", travel("roads", 1)),
    );

    world.add_location(
        Location::new(
            "inner city",
            text("The inner city of Aethelgard. You can visit the 'palace', the 'library' or the 'academy', or go 'back'."),
        )
        .with_long_description(
            "Crystalline thoroughfares hum with latent power. Waterfalls flow upward and fall again as prismatic mist.",
        )
        .with_action("palace", travel("sunspire palace", 1))
        .with_action("library", travel("grand library", 1))
        .with_action("academy", travel("magic academy", 1))
        .with_action("back", travel("city", 1)),
    );

    world.add_location(
        Location::new(
            "sunspire palace",
            text("The Sunspire Palace, a colossal spire of alabaster and crystal veined with light. You can go 'back' to the inner city."),
        )
        .with_long_description(
            "Crystal staircases spiral up from a rotunda walled in condensed starlight. Far above, the throne room sits beneath a dome of star-sapphire.",
        )
        .with_on_enter(OnEnter::FirstVisitMessage {
            message: "A Sunspire Palace guard stops you and demands that you meet with the King of Aethelgard before you may explore the palace freely.".to_string(),
        })
        .with_action("back", travel("inner city", 1)),
    );

    world.add_location(
        Location::new(
            "grand library",
            text("The Grand Library, housed in a colossal hollowed-out geode. You can go 'back' to the inner city."),
        )
        .with_long_description("Shelves climb the shimmering crystal walls further than the eye can follow.")
        .with_action("back", travel("inner city", 1)),
    );

    world.add_location(
        Location::new(
            "magic academy",
            text("The Magic Academy. Students hurry between towers trailing sparks. You can go 'back' to the inner city."),
        )
        .with_long_description("Every courtyard hums with half-finished spells.")
        .with_action("back", travel("inner city", 1)),
    );

    world
}
