//! World item generation.

use frontier_core::SeededRandom;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};
use crate::templates::{ItemCategory, ItemTemplate, ItemTemplates};

/// An item placed in the world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldItem {
    /// Unique id.
    pub id: String,
    /// Template id.
    pub template_id: String,
    /// Display name.
    pub name: String,
    /// Category.
    pub category: ItemCategory,
    /// Value in gold per unit.
    pub value: u32,
    /// Stack size, at least 1.
    pub quantity: u32,
    /// Location the item was placed in.
    pub location_id: Option<String>,
}

/// Places items from templates.
#[derive(Clone, Copy, Debug)]
pub struct ItemGenerator<'a> {
    templates: &'a ItemTemplates,
}

impl<'a> ItemGenerator<'a> {
    /// Creates a generator over `templates`.
    #[must_use]
    pub const fn new(templates: &'a ItemTemplates) -> Self {
        Self { templates }
    }

    /// Generates one item from `template_id`.
    ///
    /// # Errors
    ///
    /// Unknown template.
    pub fn generate(&self, rng: &mut SeededRandom, template_id: &str) -> GenerationResult<WorldItem> {
        let template = self.templates.get(template_id)?;
        Ok(Self::from_template(rng, template))
    }

    /// Generates `count` items suited to `location_type`.
    ///
    /// Per item: weighted template pick, uuid, value draw, quantity draw.
    /// Returns an empty list when no template fits the location type.
    ///
    /// # Errors
    ///
    /// [`GenerationError::NotInitialized`] if no templates are loaded.
    pub fn generate_for_location(
        &self,
        rng: &mut SeededRandom,
        location_type: &str,
        count: u32,
    ) -> GenerationResult<Vec<WorldItem>> {
        if self.templates.is_empty() {
            return Err(GenerationError::NotInitialized("item templates"));
        }
        let candidates = self.templates.for_location(location_type);
        if candidates.is_empty() || count == 0 {
            tracing::debug!(location_type, count, "no items to place");
            return Ok(Vec::new());
        }

        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let template = *rng.weighted_pick_by(&candidates, |t| t.weight)?;
            items.push(Self::from_template(rng, template));
        }
        Ok(items)
    }

    fn from_template(rng: &mut SeededRandom, template: &ItemTemplate) -> WorldItem {
        let id = format!("item-{}", rng.uuid());
        let value = template.value.draw(rng);
        let quantity = template.quantity.draw(rng).max(1);
        WorldItem {
            id,
            template_id: template.id.clone(),
            name: template.name.clone(),
            category: template.category,
            value,
            quantity,
            location_id: None,
        }
    }
}
