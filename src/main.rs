//! Binary entrypoint for the Aethel CLI.
//!
//! Commands:
//! - `play [--load <slot>] [--seed <n>]` - start or resume a game on stdin/stdout (default)
//! - `init` - write a starter `config.toml`
//!
//! See the library crate docs for module-level details: `aethel::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use aethel::config::Config;
use aethel::logutil::escape_log;
use aethel::rpg::{
    apply_catalog_overrides, apply_stat_bonuses, apply_world_overrides, canonical_world, effective_stats, Catalog,
    Class, GameSession, Player, Race,
};

#[derive(Parser)]
#[command(name = "aethel")]
#[command(about = "A single-player text role-playing game")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new game, or resume one with --load
    Play {
        /// Save slot to load instead of creating a character
        #[arg(short, long)]
        load: Option<String>,

        /// RNG seed, overriding the config file
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Write a default configuration file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Play { load: None, seed: None }) {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            println!("Wrote default configuration to {}", cli.config);
            Ok(())
        }
        Commands::Play { load, seed } => {
            let config = Config::load_or_default(&cli.config).await?;
            init_logging(&config, cli.verbose);
            info!("Starting Aethel v{}", env!("CARGO_PKG_VERSION"));
            play(config, load, seed).await
        }
    }
}

type InputLines = Lines<BufReader<Stdin>>;

async fn play(config: Config, load: Option<String>, seed: Option<u64>) -> Result<()> {
    let mut catalog = Catalog::builtin();
    let mut world = canonical_world();
    if let Some(dir) = &config.game.catalog_dir {
        apply_catalog_overrides(&mut catalog, dir)
            .map_err(|e| anyhow!("Failed to load catalog overrides from {}: {}", dir, e))?;
        apply_world_overrides(&mut world, &catalog, dir)
            .map_err(|e| anyhow!("Failed to load world overrides from {}: {}", dir, e))?;
    }
    world
        .location(&config.game.start_location)
        .map_err(|e| anyhow!("Invalid start location: {}", e))?;

    let rng = match seed.or(config.game.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    let player = match &load {
        // Placeholder; replaced wholesale by the load below.
        Some(_) => Player::new("", Race::Human, Class::Warrior, &config.game.start_location),
        None => match create_character(&mut input, &config.game.start_location).await? {
            Some(player) => player,
            None => return Ok(()),
        },
    };

    let mut game = GameSession::new(catalog, world, player, rng).with_save_settings(config.game.save_settings());
    let mut opening = String::new();
    if let Some(slot) = &load {
        let reply = game.load_slot(slot);
        if !reply.contains("Game loaded successfully!") {
            return Err(anyhow!("Could not load save '{}':\n{}", slot, reply));
        }
        opening = reply;
    } else {
        opening.push_str(&format!("\nWelcome, {}! Your adventure begins.", game.player.name));
        opening.push('\n');
        opening.push_str(&game.opening());
    }
    write_out(&mut stdout, &opening).await?;

    while !game.is_over() {
        prompt(&mut stdout, "> ").await?;
        let Some(line) = input.next_line().await? else {
            info!("input closed");
            break;
        };
        log::debug!("input: {}", escape_log(&line));
        let reply = game.handle_input(&line);
        write_out(&mut stdout, &reply).await?;
    }
    info!("session ended: {:?}", game.status);
    Ok(())
}

async fn write_out(stdout: &mut tokio::io::Stdout, text: &str) -> Result<()> {
    if !text.is_empty() {
        stdout.write_all(text.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;
    Ok(())
}

async fn prompt(stdout: &mut tokio::io::Stdout, text: &str) -> Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

/// Ask a question; an empty answer takes `default`. `None` on end of input.
async fn ask(input: &mut InputLines, question: &str, default: &str) -> Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    if default.is_empty() {
        prompt(&mut stdout, &format!("{} ", question)).await?;
    } else {
        prompt(&mut stdout, &format!("{} [{}] ", question, default)).await?;
    }
    Ok(input.next_line().await?.map(|line| {
        let line = line.trim().to_string();
        if line.is_empty() {
            default.to_string()
        } else {
            line
        }
    }))
}

/// Minimal character creation: name, race, class and a few descriptive fields.
async fn create_character(input: &mut InputLines, start: &str) -> Result<Option<Player>> {
    let mut stdout = tokio::io::stdout();
    write_out(&mut stdout, "--- Create your character ---").await?;

    let name = loop {
        let Some(name) = ask(input, "What is your name?", "").await? else {
            return Ok(None);
        };
        if !name.is_empty() {
            break name;
        }
    };
    let races: Vec<&str> = Race::ALL.iter().map(|r| r.as_str()).collect();
    let race: Race = loop {
        let Some(answer) = ask(input, &format!("Choose a race ({}):", races.join(", ")), "human").await? else {
            return Ok(None);
        };
        match answer.to_lowercase().parse() {
            Ok(race) => break race,
            Err(e) => write_out(&mut stdout, &format!("{}", e)).await?,
        }
    };
    let classes: Vec<&str> = Class::ALL.iter().map(|c| c.as_str()).collect();
    let class: Class = loop {
        let Some(answer) = ask(input, &format!("Choose a class ({}):", classes.join(", ")), "warrior").await? else {
            return Ok(None);
        };
        match answer.to_lowercase().parse() {
            Ok(class) => break class,
            Err(e) => write_out(&mut stdout, &format!("{}", e)).await?,
        }
    };

    let mut player = Player::new(&name, race, class, start);
    for (field, question, default) in [
        (0, "Gender?", "unspecified"),
        (1, "Age?", "25"),
        (2, "Height?", "average"),
        (3, "Weight?", "average"),
    ] {
        let Some(answer) = ask(input, question, default).await? else {
            return Ok(None);
        };
        match field {
            0 => player.gender = answer,
            1 => player.age = answer,
            2 => player.height = answer,
            _ => player.weight = answer,
        }
    }
    apply_stat_bonuses(&mut player);
    player.stats.health = effective_stats(&player).max_health;
    info!("created {} the {} {}", player.name, race, class);
    Ok(Some(player))
}

fn init_logging(config: &Config, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .logging
            .level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.logging.file.as_ref().and_then(|file| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .map_err(|e| eprintln!("Could not open log file {}: {}", file, e))
            .ok()
    });
    match log_file {
        Some(f) => {
            let file = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Mirror to the console only for interactive runs
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = file.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    if builder.try_init().is_err() {
        warn!("logger already initialised");
    }
}
