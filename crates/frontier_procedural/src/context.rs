//! # Generation Context
//!
//! The dynamic, caller-supplied inputs that generation depends on beyond
//! the seed and the templates: player level, time of day, faction
//! tension, active events, tags, and reference lists of entities that
//! quests can bind their objectives to.
//!
//! Generators never read ambient game state. Everything they know about
//! the running game arrives through this value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of entity a quest binding can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A non-player character.
    Npc,
    /// An item.
    Item,
    /// A location.
    Location,
    /// A hostile creature or outlaw.
    Enemy,
}

impl EntityKind {
    /// Lowercase name, as used in templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Npc => "npc",
            Self::Item => "item",
            Self::Location => "location",
            Self::Enemy => "enemy",
        }
    }
}

/// A lightweight reference to an entity that exists in the host game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Stable id in the host game.
    pub id: String,
    /// Display name substituted into text.
    pub name: String,
    /// Free-form tags used for template matching.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl EntityRef {
    /// Creates a reference with no tags.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tags: Vec::new(),
        }
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Returns true if the entity carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Immutable inputs for one generation call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationContext {
    /// Root seed of the session.
    pub world_seed: u32,
    /// Current player level (1-based).
    pub player_level: u32,
    /// In-game hour, 0-23.
    pub game_hour: u8,
    /// Faction id -> tension in `[0, 1]`.
    #[serde(default)]
    pub faction_tension: BTreeMap<String, f64>,
    /// Active world events.
    #[serde(default)]
    pub active_events: Vec<String>,
    /// Free-form context tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Location the content is generated for, if any.
    #[serde(default)]
    pub location_id: Option<String>,
    /// Region the content is generated for, if any.
    #[serde(default)]
    pub region_id: Option<String>,
    /// NPCs quests may target.
    #[serde(default)]
    pub available_npcs: Vec<EntityRef>,
    /// Items quests may target.
    #[serde(default)]
    pub available_items: Vec<EntityRef>,
    /// Locations quests may target.
    #[serde(default)]
    pub available_locations: Vec<EntityRef>,
    /// Enemies quests may target.
    #[serde(default)]
    pub available_enemies: Vec<EntityRef>,
}

impl GenerationContext {
    /// Creates a context at level 1, noon, with empty reference lists.
    #[must_use]
    pub fn new(world_seed: u32) -> Self {
        Self {
            world_seed,
            player_level: 1,
            game_hour: 12,
            faction_tension: BTreeMap::new(),
            active_events: Vec::new(),
            tags: Vec::new(),
            location_id: None,
            region_id: None,
            available_npcs: Vec::new(),
            available_items: Vec::new(),
            available_locations: Vec::new(),
            available_enemies: Vec::new(),
        }
    }

    /// Sets the player level (minimum 1).
    #[must_use]
    pub fn with_player_level(mut self, level: u32) -> Self {
        self.player_level = level.max(1);
        self
    }

    /// Sets the in-game hour (wrapped into 0-23).
    #[must_use]
    pub fn with_game_hour(mut self, hour: u8) -> Self {
        self.game_hour = hour % 24;
        self
    }

    /// Sets the location and region the content belongs to.
    #[must_use]
    pub fn at_location(mut self, location_id: impl Into<String>, region_id: Option<String>) -> Self {
        self.location_id = Some(location_id.into());
        self.region_id = region_id;
        self
    }

    /// Adds a context tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds an active world event.
    #[must_use]
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.active_events.push(event.into());
        self
    }

    /// Sets a faction's tension.
    #[must_use]
    pub fn with_faction_tension(mut self, faction: impl Into<String>, tension: f64) -> Self {
        self.faction_tension.insert(faction.into(), tension.clamp(0.0, 1.0));
        self
    }

    /// Adds a referenced entity of the given kind.
    #[must_use]
    pub fn with_entity(mut self, kind: EntityKind, entity: EntityRef) -> Self {
        self.entities_mut(kind).push(entity);
        self
    }

    /// Reference list for one entity kind.
    #[must_use]
    pub fn entities(&self, kind: EntityKind) -> &[EntityRef] {
        match kind {
            EntityKind::Npc => &self.available_npcs,
            EntityKind::Item => &self.available_items,
            EntityKind::Location => &self.available_locations,
            EntityKind::Enemy => &self.available_enemies,
        }
    }

    fn entities_mut(&mut self, kind: EntityKind) -> &mut Vec<EntityRef> {
        match kind {
            EntityKind::Npc => &mut self.available_npcs,
            EntityKind::Item => &mut self.available_items,
            EntityKind::Location => &mut self.available_locations,
            EntityKind::Enemy => &mut self.available_enemies,
        }
    }

    /// Returns true if the context carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self::new(0)
    }
}
