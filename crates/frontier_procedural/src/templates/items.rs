//! World item templates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{default_weight, ensure, ensure_weight, CountRange};
use crate::error::{GenerationError, GenerationResult};

/// Item category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Guns and blades.
    Weapon,
    /// Cartridges, shot, powder.
    Ammunition,
    /// Picks, rope, lanterns.
    Tool,
    /// Food and drink.
    Provision,
    /// Tonics and bandages.
    Medicine,
    /// Gold, gems, watches.
    Valuable,
    /// Letters, deeds, maps.
    Document,
    /// Oddities.
    Curio,
}

/// Template for a world item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    /// Template id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category.
    pub category: ItemCategory,
    /// Value in gold per unit.
    pub value: CountRange,
    /// Stack size.
    #[serde(default)]
    pub quantity: CountRange,
    /// Relative weight when picking items for a location.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Location types the item turns up in. Empty means anywhere.
    #[serde(default)]
    pub valid_location_types: Vec<String>,
}

impl ItemTemplate {
    /// Returns true if the item can appear in `location_type`.
    #[must_use]
    pub fn valid_for(&self, location_type: &str) -> bool {
        self.valid_location_types.is_empty() || self.valid_location_types.iter().any(|t| t == location_type)
    }
}

/// Registry of item templates.
#[derive(Clone, Debug, Default)]
pub struct ItemTemplates {
    templates: BTreeMap<String, ItemTemplate>,
}

impl ItemTemplates {
    /// Validates and indexes templates by id.
    ///
    /// # Errors
    ///
    /// [`GenerationError::InvalidTemplate`] on invalid data or duplicate ids.
    pub fn init(templates: Vec<ItemTemplate>) -> GenerationResult<Self> {
        let mut indexed = BTreeMap::new();
        for template in templates {
            let id = template.id.clone();
            ensure(!id.is_empty(), || "item template with empty id".to_string())?;
            template.value.validate(&format!("item {id:?}: value"))?;
            template.quantity.validate(&format!("item {id:?}: quantity"))?;
            ensure(template.quantity.min >= 1, || format!("item {id:?}: quantity must be at least 1"))?;
            ensure_weight(template.weight, &format!("item {id:?}: weight"))?;
            ensure(indexed.insert(id.clone(), template).is_none(), || {
                format!("duplicate item template {id:?}")
            })?;
        }
        Ok(Self { templates: indexed })
    }

    /// Looks up a template.
    ///
    /// # Errors
    ///
    /// [`GenerationError::NotInitialized`] if empty,
    /// [`GenerationError::UnknownTemplate`] for an unknown id.
    pub fn get(&self, id: &str) -> GenerationResult<&ItemTemplate> {
        if self.templates.is_empty() {
            return Err(GenerationError::NotInitialized("item templates"));
        }
        self.templates.get(id).ok_or_else(|| GenerationError::UnknownTemplate {
            kind: "item",
            id: id.to_string(),
        })
    }

    /// Templates valid for `location_type`, in id order.
    #[must_use]
    pub fn for_location(&self, location_type: &str) -> Vec<&ItemTemplate> {
        self.templates.values().filter(|t| t.valid_for(location_type)).collect()
    }

    /// Number of templates.
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
