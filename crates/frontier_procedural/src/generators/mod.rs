//! # Entity Generators
//!
//! Each generator borrows the registry it reads and turns
//! `(&mut SeededRandom, template, &GenerationContext)` into an entity.
//! Generators hold no state of their own: the random instance passed in
//! is the only thing a call mutates.
//!
//! ## Draw Order
//!
//! Within one random instance every draw advances the single state word,
//! so the sequence of draws a generator makes is part of its output
//! contract. Each `generate*` function documents its order. Changing it
//! changes every world ever generated from a given seed.

pub mod dialogue;
pub mod encounter;
pub mod items;
pub mod name;
pub mod npc;
pub mod quest;

pub use dialogue::{DialogueAction, DialogueChoice, DialogueGenerator, DialogueNode, DialogueOptions, DialogueTree};
pub use encounter::{EncounterFilter, EncounterGenerator, GeneratedEncounter, GeneratedEnemy};
pub use items::{ItemGenerator, WorldItem};
pub use name::{GeneratedName, NameGenerator, NameOptions, UsedNames};
pub use npc::{GeneratedNpc, NpcCounts, NpcGenerator, NpcOptions};
pub use quest::{
    reward_multiplier, scale_rewards, BoundEntity, GeneratedQuest, QuestGenerator, QuestObjective,
    QuestRewards, QuestStage,
};
