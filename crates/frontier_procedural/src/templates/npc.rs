//! NPC templates keyed by role, plus backstory and description snippets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::names::{GenderWeights, OriginWeight};
use super::{default_weight, ensure, ensure_probability, ensure_weight};
use crate::error::{GenerationError, GenerationResult};
use crate::substitution::TemplateText;

/// Population tier of a role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcTier {
    /// Townsfolk filling out a location.
    Background,
    /// Named figures players seek out.
    Notable,
}

/// Inclusive range for one personality trait.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitRange {
    /// Lowest value.
    pub min: i32,
    /// Highest value.
    pub max: i32,
}

impl TraitRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// Template for one NPC role.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NpcTemplate {
    /// Role key, e.g. `sheriff`.
    pub role: String,
    /// Human-readable role name.
    pub display_name: String,
    /// Population tier.
    pub tier: NpcTier,
    /// Relative weight when picking roles for a location.
    #[serde(default = "default_weight")]
    pub spawn_weight: f64,
    /// Location types this role can appear in.
    pub valid_location_types: Vec<String>,
    /// Trait name -> inclusive value range. Drawn in key order.
    #[serde(default)]
    pub personality: BTreeMap<String, TraitRange>,
    /// Gender distribution.
    #[serde(default)]
    pub gender_weights: GenderWeights,
    /// Name origins, weighted.
    pub origins: Vec<OriginWeight>,
    /// Chance the NPC offers quests.
    #[serde(default)]
    pub quest_giver_chance: f64,
    /// Chance the NPC runs a shop.
    #[serde(default)]
    pub shop_chance: f64,
    /// Kind of shop, when the NPC has one.
    #[serde(default)]
    pub shop_type: Option<String>,
    /// Tags copied onto generated NPCs.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NpcTemplate {
    /// Returns true if this role can appear in `location_type`.
    #[must_use]
    pub fn valid_for(&self, location_type: &str) -> bool {
        self.valid_location_types.iter().any(|t| t == location_type)
    }

    fn validate(&self) -> GenerationResult<()> {
        let role = &self.role;
        ensure(!role.is_empty(), || "npc template with empty role".to_string())?;
        ensure(!self.valid_location_types.is_empty(), || {
            format!("npc template {role:?} has no valid location types")
        })?;
        ensure(!self.origins.is_empty(), || format!("npc template {role:?} has no name origins"))?;
        ensure_weight(self.spawn_weight, &format!("npc template {role:?}: spawn_weight"))?;
        for origin in &self.origins {
            ensure_weight(origin.weight, &format!("npc template {role:?}: origin weight"))?;
        }
        for (name, range) in &self.personality {
            ensure(range.min <= range.max, || {
                format!("npc template {role:?}: trait {name:?} min {} exceeds max {}", range.min, range.max)
            })?;
        }
        ensure_probability(self.quest_giver_chance, &format!("npc template {role:?}: quest_giver_chance"))?;
        ensure_probability(self.shop_chance, &format!("npc template {role:?}: shop_chance"))
    }
}

/// A text fragment for backstories or descriptions.
///
/// Text may use `{{name}}`, `{{first_name}}`, `{{role}}` and `{{location}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSnippet {
    /// Fragment text.
    pub text: String,
    /// Roles this fragment suits. Empty means every role.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl TextSnippet {
    /// Tokens a snippet may reference.
    pub const TOKENS: [&'static str; 4] = ["name", "first_name", "role", "location"];

    /// Returns true if the snippet suits `role`.
    #[must_use]
    pub fn applies_to(&self, role: &str) -> bool {
        self.roles.is_empty() || self.roles.iter().any(|r| r == role)
    }

    fn validate(&self) -> GenerationResult<()> {
        let parsed = TemplateText::parse(&self.text)?;
        for token in parsed.tokens() {
            ensure(Self::TOKENS.contains(&token), || {
                format!("snippet {:?} uses unknown token {token:?}", self.text)
            })?;
        }
        Ok(())
    }
}

/// Registry of NPC templates and text snippets.
#[derive(Clone, Debug, Default)]
pub struct NpcTemplates {
    templates: BTreeMap<String, NpcTemplate>,
    backstories: Vec<TextSnippet>,
    descriptions: Vec<TextSnippet>,
}

impl NpcTemplates {
    /// Validates and indexes templates by role.
    ///
    /// # Errors
    ///
    /// [`GenerationError::InvalidTemplate`] on invalid data or duplicate roles,
    /// [`GenerationError::MalformedTemplate`] on broken snippet text.
    pub fn init(
        templates: Vec<NpcTemplate>,
        backstories: Vec<TextSnippet>,
        descriptions: Vec<TextSnippet>,
    ) -> GenerationResult<Self> {
        let mut indexed = BTreeMap::new();
        for template in templates {
            template.validate()?;
            let role = template.role.clone();
            ensure(indexed.insert(role.clone(), template).is_none(), || {
                format!("duplicate npc role {role:?}")
            })?;
        }
        for snippet in backstories.iter().chain(&descriptions) {
            snippet.validate()?;
        }
        Ok(Self {
            templates: indexed,
            backstories,
            descriptions,
        })
    }

    /// Looks up the template for `role`.
    ///
    /// # Errors
    ///
    /// [`GenerationError::NotInitialized`] if no templates are loaded,
    /// [`GenerationError::UnknownTemplate`] for an unknown role.
    pub fn get(&self, role: &str) -> GenerationResult<&NpcTemplate> {
        if self.templates.is_empty() {
            return Err(GenerationError::NotInitialized("npc templates"));
        }
        self.templates.get(role).ok_or_else(|| GenerationError::UnknownTemplate {
            kind: "npc",
            id: role.to_string(),
        })
    }

    /// Returns true if `role` is registered.
    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.templates.contains_key(role)
    }

    /// Templates of `tier` valid for `location_type`, in role order.
    #[must_use]
    pub fn for_location(&self, location_type: &str, tier: NpcTier) -> Vec<&NpcTemplate> {
        self.templates
            .values()
            .filter(|t| t.tier == tier && t.valid_for(location_type))
            .collect()
    }

    /// Returns true if any template lists `location_type`.
    #[must_use]
    pub fn recognizes_location_type(&self, location_type: &str) -> bool {
        self.templates.values().any(|t| t.valid_for(location_type))
    }

    /// Backstory fragments suitable for `role`.
    #[must_use]
    pub fn backstories_for(&self, role: &str) -> Vec<&TextSnippet> {
        self.backstories.iter().filter(|s| s.applies_to(role)).collect()
    }

    /// Description fragments suitable for `role`.
    #[must_use]
    pub fn descriptions_for(&self, role: &str) -> Vec<&TextSnippet> {
        self.descriptions.iter().filter(|s| s.applies_to(role)).collect()
    }

    /// All templates, in role order.
    pub fn iter(&self) -> impl Iterator<Item = &NpcTemplate> {
        self.templates.values()
    }

    /// Number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no templates are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
