//! # FRONTIER CLI
//!
//! Generates frontier content from a seed and prints it as JSON.
//!
//! ```bash
//! frontier world --seed 12345
//! frontier location --seed 12345 --id dry-gulch --name "Dry Gulch" --type frontier_town --tag bustling
//! frontier name --seed 7 --origin frontier_irish --count 5
//! frontier roll 2d6+1
//! frontier encounter --seed 3 --biome desert --hour 22 --level 4
//! frontier quest --seed 9 --level 5 --template bounty_basic
//! RUST_LOG=debug frontier world --seed 1 --config frontier.toml --content my_pack.toml
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use frontier_core::{fold_seed, seed_from_str, SeededRandom};
use frontier_procedural::generators::{EncounterFilter, NameOptions, UsedNames};
use frontier_procedural::templates::{Difficulty, Gender};
use frontier_procedural::{
    EncounterGenerator, GenerationContext, GeneratorConfig, LocationRef, NameGenerator, ProceduralLocationManager,
    QuestGenerator, TemplateRegistry, WorldGenerator,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "frontier")]
#[command(version, about = "Deterministic procedural content for a frontier world")]
struct Cli {
    /// Generator configuration (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Content pack (TOML). The embedded frontier pack is used when omitted.
    #[arg(long, global = true)]
    content: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a whole world
    World {
        /// World seed: an integer or any text
        #[arg(short, long, default_value = "12345")]
        seed: String,
    },
    /// Generate the content of one location
    Location {
        #[arg(short, long, default_value = "12345")]
        seed: String,
        /// Location id; the location seed is derived from it
        #[arg(long)]
        id: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Location type, e.g. frontier_town
        #[arg(long = "type", default_value = "frontier_town")]
        location_type: String,
        /// Owning region id
        #[arg(long)]
        region: Option<String>,
        /// Location tags (repeatable), e.g. bustling, abandoned, size:large
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Generate unique names
    Name {
        #[arg(short, long, default_value = "12345")]
        seed: String,
        #[arg(short, long, default_value = "frontier_anglo")]
        origin: String,
        #[arg(short, long, default_value = "1")]
        count: u32,
        #[arg(short, long, value_enum)]
        gender: Option<GenderArg>,
        /// No nicknames or titles
        #[arg(long)]
        plain: bool,
    },
    /// Roll dice notation such as 2d6+1
    Roll {
        notation: String,
        #[arg(short, long, default_value = "12345")]
        seed: String,
    },
    /// Generate an encounter
    Encounter {
        #[arg(short, long, default_value = "12345")]
        seed: String,
        /// Template id; a filtered random pick when omitted
        #[arg(short, long)]
        template: Option<String>,
        #[arg(short, long, default_value = "plains")]
        biome: String,
        #[arg(long, default_value = "12")]
        hour: u8,
        #[arg(short, long, default_value = "1")]
        level: u32,
        #[arg(short, long, value_enum)]
        difficulty: Option<DifficultyArg>,
    },
    /// Generate a quest
    Quest {
        #[arg(short, long, default_value = "12345")]
        seed: String,
        /// Template id; a level-appropriate pick when omitted
        #[arg(short, long)]
        template: Option<String>,
        /// Only templates this role offers
        #[arg(long)]
        giver: Option<String>,
        #[arg(short, long, default_value = "1")]
        level: u32,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GenderArg {
    Male,
    Female,
    Neutral,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Self::Male,
            GenderArg::Female => Self::Female,
            GenderArg::Neutral => Self::Neutral,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
    Deadly,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Medium => Self::Medium,
            DifficultyArg::Hard => Self::Hard,
            DifficultyArg::Deadly => Self::Deadly,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let registry = Arc::new(load_registry(cli.content.as_deref())?);

    let output = match cli.command {
        Command::World { seed } => {
            let mut generator = WorldGenerator::new(config);
            generator.initialize(registry);
            let world = generator.generate_world(parse_seed(&seed))?;
            tracing::info!(stats = ?generator.stats(), "done");
            serde_json::to_value(world)?
        }
        Command::Location {
            seed,
            id,
            name,
            location_type,
            region,
            tags,
        } => {
            let mut location = LocationRef::new(id.clone(), name.unwrap_or(id), location_type);
            location.region_id = region;
            location.tags = tags;
            let mut manager = ProceduralLocationManager::new(registry, parse_seed(&seed)).with_config(config);
            let content = manager.generate_location_content(&location)?;
            serde_json::to_value(content.as_ref())?
        }
        Command::Name {
            seed,
            origin,
            count,
            gender,
            plain,
        } => {
            let mut options = if plain { NameOptions::plain() } else { NameOptions::default() };
            options.gender = gender.map(Gender::from);
            let names = NameGenerator::new(&registry.names);
            let mut rng = SeededRandom::new(parse_seed(&seed));
            let mut used = UsedNames::new();
            let mut generated = Vec::new();
            for _ in 0..count {
                match names.generate_unique(&mut rng, &origin, options, &mut used, config.names.unique_attempts)? {
                    Some(name) => generated.push(name),
                    None => break,
                }
            }
            serde_json::to_value(generated)?
        }
        Command::Roll { notation, seed } => {
            let total = SeededRandom::new(parse_seed(&seed)).roll(&notation)?;
            json!({ "notation": notation, "total": total })
        }
        Command::Encounter {
            seed,
            template,
            biome,
            hour,
            level,
            difficulty,
        } => {
            let ctx = GenerationContext::new(parse_seed(&seed))
                .with_game_hour(hour)
                .with_player_level(level);
            let encounters = EncounterGenerator::new(&registry.encounters);
            let mut rng = SeededRandom::new(ctx.world_seed);
            let encounter = match template {
                Some(id) => Some(encounters.generate(&mut rng, &id, &ctx)?),
                None => {
                    let mut filter = EncounterFilter::for_context(&ctx, biome);
                    filter.difficulty = difficulty.map(Difficulty::from);
                    encounters.select(&mut rng, &ctx, &filter)?
                }
            };
            serde_json::to_value(encounter)?
        }
        Command::Quest {
            seed,
            template,
            giver,
            level,
        } => {
            let ctx = GenerationContext::new(parse_seed(&seed)).with_player_level(level);
            let quests = QuestGenerator::new(&registry.quests);
            let mut rng = SeededRandom::new(ctx.world_seed);
            let quest = match (template, giver) {
                (Some(id), _) => Some(quests.generate(&mut rng, &id, &ctx)?),
                (None, Some(role)) => quests.generate_for_giver(&mut rng, &role, &ctx)?,
                (None, None) => quests.generate_for_level(&mut rng, &ctx)?,
            };
            serde_json::to_value(quest)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Integer seeds fold to 32 bits; anything else is hashed.
fn parse_seed(seed: &str) -> u32 {
    seed.trim()
        .parse::<i64>()
        .map_or_else(|_| seed_from_str(seed), fold_seed)
}

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    let Some(path) = path else {
        return Ok(GeneratorConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read config: {}", path.display()))?;
    GeneratorConfig::from_toml_str(&text).with_context(|| format!("Invalid config: {}", path.display()))
}

fn load_registry(path: Option<&Path>) -> Result<TemplateRegistry> {
    let Some(path) = path else {
        return TemplateRegistry::frontier().context("Embedded content pack failed to load");
    };
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read content: {}", path.display()))?;
    TemplateRegistry::from_toml_str(&text).with_context(|| format!("Invalid content pack: {}", path.display()))
}
