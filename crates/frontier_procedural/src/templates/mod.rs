//! # Template Registries
//!
//! Static, author-provided content consumed by the generators: name
//! pools, NPC templates, quest templates, encounter templates, dialogue
//! snippets, item templates and place names.
//!
//! ## Lifecycle
//!
//! Each registry is built once through its `init` constructor, which
//! validates the data and resolves every lookup key into a sorted map.
//! Nothing mutates a registry after that. Lookups of unknown keys are
//! explicit errors; lookups against an empty registry report
//! `NotInitialized`.
//!
//! The whole set is usually loaded from one TOML document:
//!
//! ```toml
//! [[name_pools]]
//! origin = "frontier_anglo"
//! last_names = ["Carter", "Holloway"]
//! first_names.male = ["Wyatt", { value = "Jesse", weight = 2.0 }]
//! first_names.female = ["Clementine"]
//! ```

pub mod dialogue;
pub mod encounter;
pub mod items;
pub mod names;
pub mod npc;
pub mod places;
pub mod quest;

use frontier_core::SeededRandom;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};

pub use dialogue::{DialogueSnippet, DialogueTemplates, PromptLabels, SnippetCategory, TraitCondition};
pub use encounter::{Difficulty, EncounterTemplate, EncounterTemplates, EnemyEntry, TimeOfDay, MAX_ENEMY_STAT};
pub use items::{ItemCategory, ItemTemplate, ItemTemplates};
pub use names::{FirstNames, Gender, GenderWeights, NamePool, NamePools, OriginWeight, WeightedName};
pub use npc::{NpcTemplate, NpcTemplates, NpcTier, TextSnippet, TraitRange};
pub use places::PlaceNames;
pub use quest::{
    BaseRewards, BindingSpec, LevelRange, ObjectiveKind, ObjectiveTemplate, QuestTemplate,
    QuestTemplates, QuestType, StageTemplate,
};

/// The default frontier content pack.
pub const FRONTIER_CONTENT: &str = include_str!("../../data/frontier.toml");

/// Inclusive `[min, max]` count range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    /// Smallest count.
    pub min: u32,
    /// Largest count.
    pub max: u32,
}

impl CountRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// A range that always yields exactly `n`.
    #[must_use]
    pub const fn exactly(n: u32) -> Self {
        Self { min: n, max: n }
    }

    /// Draws a count inside the range (one draw).
    pub fn draw(&self, rng: &mut SeededRandom) -> u32 {
        rng.int(i64::from(self.min), i64::from(self.max)) as u32
    }

    /// Returns true if `value` lies inside the range.
    #[must_use]
    pub const fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    pub(crate) fn validate(&self, what: &str) -> GenerationResult<()> {
        ensure(
            self.min <= self.max,
            || format!("{what}: range min {} exceeds max {}", self.min, self.max),
        )
    }
}

impl Default for CountRange {
    fn default() -> Self {
        Self::exactly(1)
    }
}

/// Serde default for weights.
pub(crate) const fn default_weight() -> f64 {
    1.0
}

/// Fails with `InvalidTemplate` unless `condition` holds.
pub(crate) fn ensure(condition: bool, message: impl FnOnce() -> String) -> GenerationResult<()> {
    if condition {
        Ok(())
    } else {
        Err(GenerationError::InvalidTemplate(message()))
    }
}

/// Validates a probability field.
pub(crate) fn ensure_probability(value: f64, what: &str) -> GenerationResult<()> {
    ensure((0.0..=1.0).contains(&value), || {
        format!("{what} must be within [0, 1], got {value}")
    })
}

/// Validates a weight field.
pub(crate) fn ensure_weight(value: f64, what: &str) -> GenerationResult<()> {
    ensure(value.is_finite() && value > 0.0, || {
        format!("{what} must be a positive weight, got {value}")
    })
}

/// Raw document layout of a content TOML file.
#[derive(Debug, Default, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    name_pools: Vec<NamePool>,
    #[serde(default)]
    npc_templates: Vec<NpcTemplate>,
    #[serde(default)]
    npc_backstories: Vec<TextSnippet>,
    #[serde(default)]
    npc_descriptions: Vec<TextSnippet>,
    #[serde(default)]
    quest_templates: Vec<QuestTemplate>,
    #[serde(default)]
    encounter_templates: Vec<EncounterTemplate>,
    #[serde(default)]
    dialogue_snippets: Vec<DialogueSnippet>,
    #[serde(default)]
    dialogue_prompts: PromptLabels,
    #[serde(default)]
    item_templates: Vec<ItemTemplate>,
    #[serde(default)]
    places: PlaceNames,
}

/// Every registry the generators read, validated together.
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    /// Name pools by origin.
    pub names: NamePools,
    /// NPC templates by role, plus backstory/description snippets.
    pub npcs: NpcTemplates,
    /// Quest templates by id.
    pub quests: QuestTemplates,
    /// Encounter templates by id.
    pub encounters: EncounterTemplates,
    /// Dialogue snippets and choice prompts.
    pub dialogue: DialogueTemplates,
    /// World item templates by id.
    pub items: ItemTemplates,
    /// Place, region and world naming pools.
    pub places: PlaceNames,
}

impl TemplateRegistry {
    /// Parses and validates a content document.
    ///
    /// # Errors
    ///
    /// [`GenerationError::Config`] for TOML syntax/shape errors,
    /// [`GenerationError::InvalidTemplate`] for content that fails validation.
    pub fn from_toml_str(content: &str) -> GenerationResult<Self> {
        let document: RegistryDocument = toml::from_str(content)?;

        let registry = Self {
            names: NamePools::init(document.name_pools)?,
            npcs: NpcTemplates::init(
                document.npc_templates,
                document.npc_backstories,
                document.npc_descriptions,
            )?,
            quests: QuestTemplates::init(document.quest_templates)?,
            encounters: EncounterTemplates::init(document.encounter_templates)?,
            dialogue: DialogueTemplates::init(document.dialogue_snippets, document.dialogue_prompts)?,
            items: ItemTemplates::init(document.item_templates)?,
            places: document.places,
        };
        registry.validate_references()?;

        tracing::info!(
            origins = registry.names.len(),
            roles = registry.npcs.len(),
            quests = registry.quests.len(),
            encounters = registry.encounters.len(),
            snippets = registry.dialogue.len(),
            items = registry.items.len(),
            "template registry loaded"
        );
        Ok(registry)
    }

    /// Loads the embedded frontier content pack.
    ///
    /// # Errors
    ///
    /// Only if the embedded pack itself is invalid.
    pub fn frontier() -> GenerationResult<Self> {
        Self::from_toml_str(FRONTIER_CONTENT)
    }

    /// Checks references that cross registries.
    fn validate_references(&self) -> GenerationResult<()> {
        for template in self.npcs.iter() {
            for origin in &template.origins {
                ensure(self.names.contains(&origin.origin), || {
                    format!(
                        "npc template {:?} references unknown name origin {:?}",
                        template.role, origin.origin
                    )
                })?;
                let pool = self.names.get(&origin.origin)?;
                for gender in template.gender_weights.drawable() {
                    ensure(!pool.first_names.for_gender(gender).is_empty(), || {
                        format!(
                            "npc template {:?} draws {} names from origin {:?}, which has none",
                            template.role,
                            gender.as_str(),
                            origin.origin
                        )
                    })?;
                }
            }
        }
        for template in self.quests.iter() {
            for role in &template.giver_roles {
                ensure(self.npcs.contains(role), || {
                    format!("quest template {:?} references unknown giver role {role:?}", template.id)
                })?;
            }
            for item in &template.base_rewards.items {
                ensure(self.items.get(item).is_ok(), || {
                    format!("quest template {:?} rewards unknown item {item:?}", template.id)
                })?;
            }
        }
        self.places.validate()
    }
}
