//! # Generator Configuration
//!
//! Tunables for world layout, name uniqueness, encounter triggering and
//! location population. Every field has a default, so an empty TOML
//! document is a valid configuration:
//!
//! ```toml
//! [world]
//! region_count = 4
//! locations_per_region = { min = 3, max = 6 }
//!
//! [names]
//! unique_attempts = 30
//!
//! [encounters]
//! base_chance = 0.2
//! night_multiplier = 1.5
//! night_start_hour = 20
//! night_end_hour = 5
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};
use crate::templates::CountRange;
use crate::world::SizeBucket;

/// Default attempt budget for unique-name searches.
pub const DEFAULT_UNIQUE_ATTEMPTS: u32 = 20;

/// Largest accepted `locations.bustling_bonus`.
pub const MAX_BUSTLING_BONUS: u32 = 64;

/// Top-level generator configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// World layout.
    pub world: WorldConfig,
    /// Name generation.
    pub names: NameConfig,
    /// Encounter triggering.
    pub encounters: EncounterConfig,
    /// Location population.
    pub locations: LocationConfig,
}

impl GeneratorConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// [`GenerationError::Config`] on parse failure,
    /// [`GenerationError::InvalidConfig`] on out-of-range values.
    pub fn from_toml_str(content: &str) -> GenerationResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// [`GenerationError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> GenerationResult<()> {
        self.world.validate()?;
        check(self.names.unique_attempts > 0, "names.unique_attempts must be at least 1")?;
        self.encounters.validate()?;
        self.locations.validate()
    }
}

fn check(condition: bool, message: &str) -> GenerationResult<()> {
    if condition {
        Ok(())
    } else {
        Err(GenerationError::InvalidConfig(message.to_string()))
    }
}

// ============================================================================
// WORLD
// ============================================================================

/// A location type and its relative frequency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationTypeWeight {
    /// Location type key, e.g. `mining_town`.
    pub location_type: String,
    /// Relative frequency.
    pub weight: f64,
}

impl LocationTypeWeight {
    /// Creates an entry.
    #[must_use]
    pub fn new(location_type: impl Into<String>, weight: f64) -> Self {
        Self {
            location_type: location_type.into(),
            weight,
        }
    }
}

/// World layout settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Regions per world.
    pub region_count: u32,
    /// Locations per region.
    pub locations_per_region: CountRange,
    /// Location types, weighted.
    pub location_types: Vec<LocationTypeWeight>,
    /// Biomes a region may have.
    pub biomes: Vec<String>,
}

impl WorldConfig {
    fn validate(&self) -> GenerationResult<()> {
        check(self.region_count > 0, "world.region_count must be at least 1")?;
        check(
            self.locations_per_region.min <= self.locations_per_region.max,
            "world.locations_per_region min exceeds max",
        )?;
        check(!self.location_types.is_empty(), "world.location_types is empty")?;
        check(
            self.location_types.iter().all(|t| t.weight.is_finite() && t.weight > 0.0),
            "world.location_types weights must be positive",
        )?;
        check(!self.biomes.is_empty(), "world.biomes is empty")
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        let location_types = [
            ("frontier_town", 2.0),
            ("mining_town", 2.0),
            ("fort", 1.0),
            ("outpost", 1.5),
            ("ranch", 2.0),
            ("trading_post", 1.5),
            ("mission", 1.0),
            ("homestead", 2.0),
            ("camp", 1.5),
            ("ghost_town", 0.5),
        ]
        .into_iter()
        .map(|(location_type, weight)| LocationTypeWeight::new(location_type, weight))
        .collect();

        Self {
            region_count: 3,
            locations_per_region: CountRange::new(3, 6),
            location_types,
            biomes: ["desert", "plains", "badlands", "mountains", "forest"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

// ============================================================================
// NAMES
// ============================================================================

/// Name generation settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameConfig {
    /// Attempts a unique-name search makes before giving up.
    pub unique_attempts: u32,
}

impl Default for NameConfig {
    fn default() -> Self {
        Self {
            unique_attempts: DEFAULT_UNIQUE_ATTEMPTS,
        }
    }
}

// ============================================================================
// ENCOUNTERS
// ============================================================================

/// Random encounter trigger settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Chance an encounter triggers during the day.
    pub base_chance: f64,
    /// Multiplier applied inside the night window.
    pub night_multiplier: f64,
    /// First night hour (inclusive).
    pub night_start_hour: u8,
    /// First hour after the night window (exclusive).
    pub night_end_hour: u8,
}

impl EncounterConfig {
    /// Returns true if `hour` falls in the night window.
    ///
    /// The window wraps midnight when `night_start_hour > night_end_hour`.
    #[must_use]
    pub fn is_night(&self, hour: u8) -> bool {
        let hour = hour % 24;
        if self.night_start_hour <= self.night_end_hour {
            hour >= self.night_start_hour && hour < self.night_end_hour
        } else {
            hour >= self.night_start_hour || hour < self.night_end_hour
        }
    }

    /// Trigger chance at `hour`, clamped to `[0, 1]`.
    #[must_use]
    pub fn chance_at(&self, hour: u8) -> f64 {
        let chance = if self.is_night(hour) {
            self.base_chance * self.night_multiplier
        } else {
            self.base_chance
        };
        chance.clamp(0.0, 1.0)
    }

    fn validate(&self) -> GenerationResult<()> {
        check(
            (0.0..=1.0).contains(&self.base_chance),
            "encounters.base_chance must be within [0, 1]",
        )?;
        check(
            self.night_multiplier.is_finite() && self.night_multiplier >= 0.0,
            "encounters.night_multiplier must be non-negative",
        )?;
        check(
            self.night_start_hour < 24 && self.night_end_hour < 24,
            "encounters night hours must be within 0-23",
        )
    }
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            base_chance: 0.15,
            night_multiplier: 1.5,
            night_start_hour: 20,
            night_end_hour: 5,
        }
    }
}

// ============================================================================
// LOCATIONS
// ============================================================================

/// Location population settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// World items in a tiny location.
    pub tiny_items: CountRange,
    /// World items in a small location.
    pub small_items: CountRange,
    /// World items in a medium location.
    pub medium_items: CountRange,
    /// World items in a large location.
    pub large_items: CountRange,
    /// Extra background NPCs for `bustling` locations.
    pub bustling_bonus: u32,
}

impl LocationConfig {
    /// Item count range for a size bucket.
    #[must_use]
    pub const fn items_for(&self, size: SizeBucket) -> CountRange {
        match size {
            SizeBucket::Tiny => self.tiny_items,
            SizeBucket::Small => self.small_items,
            SizeBucket::Medium => self.medium_items,
            SizeBucket::Large => self.large_items,
        }
    }

    fn validate(&self) -> GenerationResult<()> {
        for range in [self.tiny_items, self.small_items, self.medium_items, self.large_items] {
            check(range.min <= range.max, "locations item range min exceeds max")?;
        }
        check(
            self.bustling_bonus <= MAX_BUSTLING_BONUS,
            "locations.bustling_bonus exceeds the maximum of 64",
        )
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            tiny_items: CountRange::new(0, 2),
            small_items: CountRange::new(1, 3),
            medium_items: CountRange::new(2, 5),
            large_items: CountRange::new(3, 7),
            bustling_bonus: 2,
        }
    }
}
