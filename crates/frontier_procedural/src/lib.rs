//! # FRONTIER Procedural Generation
//!
//! Seed-driven content for a frontier world: names, NPCs, quests,
//! encounters, dialogue trees, items and whole worlds.
//!
//! ## Design Principles
//!
//! 1. **Reproducible**: Same seed + templates + context = same content
//! 2. **Explicit registries**: Templates are values passed in, not globals
//! 3. **Stable sub-seeds**: Every entity stream is derived from an id
//! 4. **No silent gaps**: Unknown keys are errors; empty searches are `Ok(None)`
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐
//! │ TemplateRegistry │   │ GeneratorConfig  │
//! └────────┬─────────┘   └────────┬─────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌──────────────────────────────────────────┐
//! │ Generators: name, npc, quest, encounter, │
//! │             dialogue, items              │
//! └────────┬─────────────────────────┬───────┘
//!          ▼                         ▼
//! ┌──────────────────┐   ┌───────────────────────────┐
//! │  WorldGenerator  │   │ ProceduralLocationManager │
//! └──────────────────┘   └───────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use frontier_procedural::{LocationRef, ProceduralLocationManager, TemplateRegistry};
//!
//! let registry = Arc::new(TemplateRegistry::frontier().unwrap());
//! let mut manager = ProceduralLocationManager::new(registry, 12345);
//!
//! let town = LocationRef::new("dry-gulch", "Dry Gulch", "frontier_town");
//! let content = manager.generate_location_content(&town).unwrap();
//! assert!(!content.npcs.is_empty());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod error;
pub mod generators;
pub mod location;
pub mod substitution;
pub mod templates;
pub mod world;

pub use config::GeneratorConfig;
pub use context::{EntityKind, EntityRef, GenerationContext};
pub use error::{GenerationError, GenerationResult};
pub use generators::{
    DialogueGenerator, DialogueTree, EncounterGenerator, GeneratedEncounter, GeneratedName, GeneratedNpc,
    GeneratedQuest, ItemGenerator, NameGenerator, NpcGenerator, QuestGenerator, WorldItem,
};
pub use location::{
    merge_authored, ContentEntity, LocationRef, ProceduralLocationContent, ProceduralLocationManager,
    SharedLocationManager,
};
pub use substitution::{Substitutions, TemplateText};
pub use templates::TemplateRegistry;
pub use world::{GenerationStats, Location, Region, SizeBucket, World, WorldGenerator, WorldManifest};
