//! # World Generator
//!
//! Turns one world seed into named regions of typed, populated locations.
//!
//! ## Seed layout
//!
//! ```text
//! world seed
//! ├── "world:name"            -> world name
//! ├── "region:<i>"            -> region name, biome, location count, types
//! └── "<region id>-loc-<j>"   -> location seed (shared with the location manager)
//!     ├── child "name"
//!     ├── child "npcs"
//!     └── child "items"
//! ```
//!
//! Every seed comes from a stable identifier, so generating region 2 on its
//! own yields the same region as generating the whole world.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use frontier_core::{derive_seed, SeededRandom};
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::generators::{GeneratedNpc, NpcCounts};
use crate::location::{self, LocationRef};
use crate::templates::TemplateRegistry;

/// Crate version recorded in manifests.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// SIZE BUCKETS
// ============================================================================

/// Coarse location size, which drives NPC and item counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeBucket {
    /// One resident.
    Tiny,
    /// A handful of people.
    Small,
    /// A working settlement.
    Medium,
    /// A town.
    Large,
}

impl SizeBucket {
    /// All buckets, smallest first.
    pub const ALL: [Self; 4] = [Self::Tiny, Self::Small, Self::Medium, Self::Large];

    /// Size for a location type. Unknown types are small.
    #[must_use]
    pub fn for_location_type(location_type: &str) -> Self {
        match location_type {
            "frontier_town" => Self::Large,
            "mining_town" | "fort" => Self::Medium,
            "homestead" | "camp" | "ghost_town" => Self::Tiny,
            _ => Self::Small,
        }
    }

    /// Target background/notable NPC counts.
    #[must_use]
    pub const fn npc_counts(self) -> NpcCounts {
        match self {
            Self::Tiny => NpcCounts::new(1, 0),
            Self::Small => NpcCounts::new(2, 1),
            Self::Medium => NpcCounts::new(4, 2),
            Self::Large => NpcCounts::new(6, 3),
        }
    }

    /// Lowercase key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeBucket {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GenerationError::InvalidTemplate(format!("unknown size bucket {s:?}")))
    }
}

// ============================================================================
// WORLD STRUCTURE
// ============================================================================

/// A generated location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// `<region id>-loc-<j>`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Location type key.
    pub location_type: String,
    /// Owning region.
    pub region_id: String,
    /// Location seed.
    pub seed: u32,
    /// Size bucket.
    pub size: SizeBucket,
    /// Tags.
    pub tags: Vec<String>,
    /// Residents.
    pub npcs: Vec<GeneratedNpc>,
}

impl Location {
    /// Reference for the location manager.
    #[must_use]
    pub fn to_ref(&self) -> LocationRef {
        LocationRef {
            id: self.id.clone(),
            name: self.name.clone(),
            location_type: self.location_type.clone(),
            region_id: Some(self.region_id.clone()),
            tags: self.tags.clone(),
        }
    }
}

/// A generated region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// `region-<i>`.
    pub id: String,
    /// Position in the world.
    pub index: u32,
    /// Display name.
    pub name: String,
    /// Region seed.
    pub seed: u32,
    /// Seed of the owning world.
    pub world_seed: u32,
    /// Biome key.
    pub biome: String,
    /// Locations, in index order.
    pub locations: Vec<Location>,
}

/// Summary of a generated world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldManifest {
    /// Root seed.
    pub world_seed: u32,
    /// World name.
    pub world_name: String,
    /// Wall-clock generation time. Metadata only.
    pub generated_at: DateTime<Utc>,
    /// Region count.
    pub regions: usize,
    /// Location count.
    pub locations: usize,
    /// NPC count.
    pub npcs: usize,
    /// Crate version that generated the world.
    pub generator_version: String,
}

/// A generated world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    /// Root seed.
    pub seed: u32,
    /// Display name.
    pub name: String,
    /// Regions, in index order.
    pub regions: Vec<Region>,
    /// Summary.
    pub manifest: WorldManifest,
}

impl World {
    /// All locations across regions.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.regions.iter().flat_map(|r| r.locations.iter())
    }

    /// Looks up a location by id.
    #[must_use]
    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations().find(|l| l.id == id)
    }
}

/// Running generation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Regions generated.
    pub regions_generated: u64,
    /// Locations generated.
    pub locations_generated: u64,
    /// NPCs generated.
    pub npcs_generated: u64,
}

impl GenerationStats {
    fn record_location(&mut self, location: &Location) {
        self.locations_generated += 1;
        self.npcs_generated += location.npcs.len() as u64;
    }

    fn record_region(&mut self, region: &Region) {
        self.regions_generated += 1;
        for location in &region.locations {
            self.record_location(location);
        }
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

/// Builds worlds, regions and locations.
#[derive(Debug)]
pub struct WorldGenerator {
    config: GeneratorConfig,
    registry: Option<Arc<TemplateRegistry>>,
    stats: GenerationStats,
}

impl WorldGenerator {
    /// Creates an uninitialized generator.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            registry: None,
            stats: GenerationStats::default(),
        }
    }

    /// Installs the template registries. Generation fails until this runs.
    pub fn initialize(&mut self, registry: Arc<TemplateRegistry>) {
        tracing::info!(
            origins = registry.names.len(),
            roles = registry.npcs.len(),
            "world generator initialized"
        );
        self.registry = Some(registry);
    }

    /// Returns true once [`Self::initialize`] has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.registry.is_some()
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Counters since creation or the last reset.
    #[must_use]
    pub fn stats(&self) -> GenerationStats {
        self.stats
    }

    /// Zeroes the counters.
    pub fn reset_stats(&mut self) {
        self.stats = GenerationStats::default();
    }

    /// Generates a whole world.
    ///
    /// # Errors
    ///
    /// [`GenerationError::NotInitialized`] before [`Self::initialize`];
    /// otherwise any template or random failure.
    pub fn generate_world(&mut self, seed: u32) -> GenerationResult<World> {
        let registry = self.registry()?;
        let name = registry
            .places
            .world_name(&mut SeededRandom::new(derive_seed(seed, "world:name")))?;

        let regions = (0..self.config.world.region_count)
            .map(|index| self.build_region(&registry, seed, index))
            .collect::<GenerationResult<Vec<_>>>()?;
        for region in &regions {
            self.stats.record_region(region);
        }

        let locations = regions.iter().map(|r| r.locations.len()).sum();
        let npcs = regions
            .iter()
            .flat_map(|r| r.locations.iter())
            .map(|l| l.npcs.len())
            .sum();
        let manifest = WorldManifest {
            world_seed: seed,
            world_name: name.clone(),
            generated_at: Utc::now(),
            regions: regions.len(),
            locations,
            npcs,
            generator_version: GENERATOR_VERSION.to_string(),
        };
        tracing::info!(seed, world = %name, regions = manifest.regions, locations, npcs, "generated world");

        Ok(World {
            seed,
            name,
            regions,
            manifest,
        })
    }

    /// Generates region `index` of the world rooted at `world_seed`.
    ///
    /// Region stream draws: name, biome, location count, then one weighted
    /// location type per location.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate_world`].
    pub fn generate_region(&mut self, world_seed: u32, index: u32) -> GenerationResult<Region> {
        let registry = self.registry()?;
        let region = self.build_region(&registry, world_seed, index)?;
        self.stats.record_region(&region);
        Ok(region)
    }

    /// Generates location `index` of `region` with the given type.
    ///
    /// NPCs are drawn from the location seed exactly as
    /// [`crate::ProceduralLocationManager`] draws them, so both agree.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate_world`].
    pub fn generate_location(
        &mut self,
        region: &Region,
        index: u32,
        location_type: &str,
    ) -> GenerationResult<Location> {
        let registry = self.registry()?;
        let location = self.build_location(&registry, region, index, location_type)?;
        self.stats.record_location(&location);
        Ok(location)
    }

    // Builders leave the counters alone; callers record only finished output.

    fn build_region(&self, registry: &TemplateRegistry, world_seed: u32, index: u32) -> GenerationResult<Region> {
        let seed = derive_seed(world_seed, &format!("region:{index}"));
        let mut rng = SeededRandom::new(seed);

        let name = registry.places.region_name(&mut rng)?;
        let biome = rng.pick(&self.config.world.biomes)?.clone();
        let count = self.config.world.locations_per_region.draw(&mut rng);
        let location_types = (0..count)
            .map(|_| {
                rng.weighted_pick_by(&self.config.world.location_types, |t| t.weight)
                    .map(|t| t.location_type.clone())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut region = Region {
            id: format!("region-{index}"),
            index,
            name,
            seed,
            world_seed,
            biome,
            locations: Vec::with_capacity(location_types.len()),
        };
        let mut locations = Vec::with_capacity(location_types.len());
        for (j, location_type) in location_types.iter().enumerate() {
            locations.push(self.build_location(registry, &region, j as u32, location_type)?);
        }
        region.locations = locations;

        tracing::debug!(region = %region.id, biome = %region.biome, locations = region.locations.len(), "generated region");
        Ok(region)
    }

    fn build_location(
        &self,
        registry: &TemplateRegistry,
        region: &Region,
        index: u32,
        location_type: &str,
    ) -> GenerationResult<Location> {
        let id = format!("{}-loc-{index}", region.id);
        let seed = derive_seed(region.world_seed, &id);
        let name = registry
            .places
            .location_name(&mut SeededRandom::new(seed).child(location::NAME_STREAM))?;

        let reference = LocationRef::new(id, name, location_type).in_region(region.id.clone());
        let (size, _) = location::npc_plan(&reference, &self.config.locations);
        let npcs = location::generate_npcs(registry, &self.config, region.world_seed, seed, &reference)?;

        Ok(Location {
            id: reference.id,
            name: reference.name,
            location_type: reference.location_type,
            region_id: region.id.clone(),
            seed,
            size,
            tags: reference.tags,
            npcs,
        })
    }

    fn registry(&self) -> GenerationResult<Arc<TemplateRegistry>> {
        self.registry
            .clone()
            .ok_or(GenerationError::NotInitialized("world generator"))
    }
}
