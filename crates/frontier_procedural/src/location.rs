//! # Procedural Location Manager
//!
//! Generates the residents, loose items and dialogue of a location the first
//! time it is visited and hands back the same [`Arc`] on every later visit.
//!
//! ## Lifecycle
//!
//! ```text
//! new(registry, seed) ──► generate_location_content(loc) ──► cached Arc
//!        │                          ▲                            │
//!        │                          └──── same Arc ◄─────────────┘
//!        └── initialize(other seed) ──► cache cleared
//! ```
//!
//! The manager holds no globals. Hosts with more than one caller wrap it in
//! a [`SharedLocationManager`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use frontier_core::{derive_seed, SeededRandom};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::{GeneratorConfig, LocationConfig};
use crate::context::GenerationContext;
use crate::error::GenerationResult;
use crate::generators::{
    DialogueGenerator, DialogueOptions, DialogueTree, GeneratedNpc, ItemGenerator, NpcCounts, NpcGenerator,
    NpcOptions, UsedNames, WorldItem,
};
use crate::templates::TemplateRegistry;
use crate::world::SizeBucket;

/// Child stream for the location name.
pub const NAME_STREAM: &str = "name";
/// Child stream for residents.
pub const NPC_STREAM: &str = "npcs";
/// Child stream for items.
pub const ITEM_STREAM: &str = "items";

/// Tag prefix that overrides the size lookup, e.g. `size:large`.
pub const SIZE_TAG_PREFIX: &str = "size:";
/// Tag that removes background residents.
pub const ABANDONED_TAG: &str = "abandoned";
/// Tag that adds background residents.
pub const BUSTLING_TAG: &str = "bustling";

/// A location as the host knows it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    /// Stable id; the location seed is derived from it.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Location type key.
    pub location_type: String,
    /// Owning region, if any.
    pub region_id: Option<String>,
    /// Declared tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl LocationRef {
    /// Creates a reference with no region or tags.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, location_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location_type: location_type.into(),
            region_id: None,
            tags: Vec::new(),
        }
    }

    /// Sets the region.
    #[must_use]
    pub fn in_region(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = Some(region_id.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Returns true if the location carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Size from a valid `size:` tag, else from the location type.
    #[must_use]
    pub fn size(&self) -> SizeBucket {
        self.tags
            .iter()
            .filter_map(|t| t.strip_prefix(SIZE_TAG_PREFIX))
            .find_map(|s| s.parse().ok())
            .unwrap_or_else(|| SizeBucket::for_location_type(&self.location_type))
    }
}

/// Size and resident counts for a location after tag rules.
pub(crate) fn npc_plan(location: &LocationRef, config: &LocationConfig) -> (SizeBucket, NpcCounts) {
    let size = location.size();
    let mut counts = size.npc_counts();
    if location.has_tag(BUSTLING_TAG) {
        counts.background = counts.background.saturating_add(config.bustling_bonus);
    }
    if location.has_tag(ABANDONED_TAG) {
        counts.background = 0;
    }
    (size, counts)
}

/// Residents of a location, drawn from the location seed's npc stream.
pub(crate) fn generate_npcs(
    registry: &TemplateRegistry,
    config: &GeneratorConfig,
    world_seed: u32,
    location_seed: u32,
    location: &LocationRef,
) -> GenerationResult<Vec<GeneratedNpc>> {
    let (_, counts) = npc_plan(location, &config.locations);
    let ctx = location_context(world_seed, location);
    let options = NpcOptions {
        location_name: Some(location.name.clone()),
        ..NpcOptions::default()
    };
    let mut rng = SeededRandom::new(location_seed).child(NPC_STREAM);
    let mut used = UsedNames::new();
    NpcGenerator::new(registry)
        .with_unique_attempts(config.names.unique_attempts)
        .generate_for_location_with(&mut rng, &location.location_type, &ctx, counts, &mut used, &options)
}

fn location_context(world_seed: u32, location: &LocationRef) -> GenerationContext {
    location
        .tags
        .iter()
        .fold(
            GenerationContext::new(world_seed).at_location(location.id.clone(), location.region_id.clone()),
            |ctx, tag| ctx.with_tag(tag.clone()),
        )
}

/// Everything generated for one location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProceduralLocationContent {
    /// Location id.
    pub location_id: String,
    /// World seed it was generated under.
    pub world_seed: u32,
    /// `derive_seed(world_seed, location_id)`.
    pub location_seed: u32,
    /// Size after tag rules.
    pub size: SizeBucket,
    /// Residents.
    pub npcs: Vec<GeneratedNpc>,
    /// Loose items.
    pub items: Vec<WorldItem>,
    /// Dialogue tree per NPC id.
    pub dialogue: BTreeMap<String, DialogueTree>,
    /// Wall-clock generation time. Metadata only.
    pub generated_at: DateTime<Utc>,
}

/// Location manager behind a lock, for hosts with several callers.
pub type SharedLocationManager = Arc<Mutex<ProceduralLocationManager>>;

/// Lazily generates and caches location content for one world seed.
#[derive(Debug)]
pub struct ProceduralLocationManager {
    registry: Arc<TemplateRegistry>,
    config: GeneratorConfig,
    world_seed: u32,
    cache: BTreeMap<String, Arc<ProceduralLocationContent>>,
}

impl ProceduralLocationManager {
    /// Creates a manager for `world_seed` with default configuration.
    #[must_use]
    pub fn new(registry: Arc<TemplateRegistry>, world_seed: u32) -> Self {
        Self {
            registry,
            config: GeneratorConfig::default(),
            world_seed,
            cache: BTreeMap::new(),
        }
    }

    /// Replaces the configuration and drops cached content.
    #[must_use]
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self.cache.clear();
        self
    }

    /// Wraps the manager for shared use.
    #[must_use]
    pub fn into_shared(self) -> SharedLocationManager {
        Arc::new(Mutex::new(self))
    }

    /// Switches to `world_seed`. A different seed clears the cache; the
    /// same seed is a no-op.
    pub fn initialize(&mut self, world_seed: u32) {
        if world_seed == self.world_seed {
            return;
        }
        tracing::info!(
            old_seed = self.world_seed,
            new_seed = world_seed,
            dropped = self.cache.len(),
            "location manager reseeded"
        );
        self.world_seed = world_seed;
        self.cache.clear();
    }

    /// Active world seed.
    #[must_use]
    pub const fn world_seed(&self) -> u32 {
        self.world_seed
    }

    /// Returns cached content for `location`, generating it on first use.
    ///
    /// Streams off the location seed: `npcs`, `items` (count then items),
    /// and `dialogue:<npc id>` per resident. The entry is cached only once
    /// it is complete.
    ///
    /// # Errors
    ///
    /// Template, substitution or random failures. Nothing is cached then.
    pub fn generate_location_content(
        &mut self,
        location: &LocationRef,
    ) -> GenerationResult<Arc<ProceduralLocationContent>> {
        if let Some(content) = self.cache.get(&location.id) {
            return Ok(Arc::clone(content));
        }

        let location_seed = derive_seed(self.world_seed, &location.id);
        let (size, _) = npc_plan(location, &self.config.locations);
        let npcs = generate_npcs(&self.registry, &self.config, self.world_seed, location_seed, location)?;

        let mut item_rng = SeededRandom::new(location_seed).child(ITEM_STREAM);
        let item_count = self.config.locations.items_for(size).draw(&mut item_rng);
        let mut items =
            ItemGenerator::new(&self.registry.items).generate_for_location(&mut item_rng, &location.location_type, item_count)?;
        for item in &mut items {
            item.location_id = Some(location.id.clone());
        }

        let ctx = location_context(self.world_seed, location);
        let options = DialogueOptions {
            location_name: Some(location.name.clone()),
            ..DialogueOptions::default()
        };
        let dialogue_generator = DialogueGenerator::new(&self.registry.dialogue);
        let mut dialogue = BTreeMap::new();
        for npc in &npcs {
            let mut rng = SeededRandom::new(location_seed).child(&format!("dialogue:{}", npc.id));
            dialogue.insert(npc.id.clone(), dialogue_generator.generate(&mut rng, npc, &ctx, &options)?);
        }

        let content = Arc::new(ProceduralLocationContent {
            location_id: location.id.clone(),
            world_seed: self.world_seed,
            location_seed,
            size,
            npcs,
            items,
            dialogue,
            generated_at: Utc::now(),
        });
        tracing::debug!(
            location = %location.id,
            npcs = content.npcs.len(),
            items = content.items.len(),
            "generated location content"
        );
        self.cache.insert(location.id.clone(), Arc::clone(&content));
        Ok(content)
    }

    /// Returns true if content for `location_id` is cached.
    #[must_use]
    pub fn has_generated_content(&self, location_id: &str) -> bool {
        self.cache.contains_key(location_id)
    }

    /// Cached content, without generating.
    #[must_use]
    pub fn content(&self, location_id: &str) -> Option<&Arc<ProceduralLocationContent>> {
        self.cache.get(location_id)
    }

    /// Cached residents, or empty. Never generates.
    #[must_use]
    pub fn npcs_for(&self, location_id: &str) -> &[GeneratedNpc] {
        self.cache.get(location_id).map(|c| c.npcs.as_slice()).unwrap_or_default()
    }

    /// Cached items, or empty. Never generates.
    #[must_use]
    pub fn items_for(&self, location_id: &str) -> &[WorldItem] {
        self.cache.get(location_id).map(|c| c.items.as_slice()).unwrap_or_default()
    }

    /// Cached dialogue for an NPC, if both the location and the NPC exist.
    #[must_use]
    pub fn dialogue_for(&self, npc_id: &str, location_id: &str) -> Option<&DialogueTree> {
        self.cache.get(location_id)?.dialogue.get(npc_id)
    }

    /// Ids of cached locations, sorted.
    #[must_use]
    pub fn cached_locations(&self) -> Vec<&str> {
        self.cache.keys().map(String::as_str).collect()
    }

    /// Drops all cached content.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

// ============================================================================
// AUTHORED CONTENT
// ============================================================================

/// Content with an id that authored and procedural lists share.
pub trait ContentEntity {
    /// Current id.
    fn id(&self) -> &str;
    /// Replaces the id.
    fn set_id(&mut self, id: String);
}

impl ContentEntity for GeneratedNpc {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl ContentEntity for WorldItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Authored entries first and untouched, then procedural entries.
///
/// A procedural id that is already taken becomes `<id>-proc`, then
/// `<id>-proc2`, `<id>-proc3` and so on until free.
pub fn merge_authored<T: ContentEntity>(authored: Vec<T>, procedural: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut taken: BTreeSet<String> = authored.iter().map(|e| e.id().to_string()).collect();
    let mut merged = authored;
    for mut entity in procedural {
        if taken.contains(entity.id()) {
            let base = entity.id().to_string();
            let mut candidate = format!("{base}-proc");
            let mut n = 2;
            while taken.contains(&candidate) {
                candidate = format!("{base}-proc{n}");
                n += 1;
            }
            tracing::debug!(from = %base, to = %candidate, "re-keyed procedural entity");
            entity.set_id(candidate);
        }
        taken.insert(entity.id().to_string());
        merged.push(entity);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::ItemCategory;

    fn manager(seed: u32) -> ProceduralLocationManager {
        ProceduralLocationManager::new(Arc::new(TemplateRegistry::frontier().unwrap()), seed)
    }

    fn town() -> LocationRef {
        LocationRef::new("dry-gulch", "Dry Gulch", "frontier_town").in_region("region-0")
    }

    fn item(id: &str) -> WorldItem {
        WorldItem {
            id: id.to_string(),
            template_id: "canteen".into(),
            name: "Canteen".into(),
            category: ItemCategory::Provision,
            value: 1,
            quantity: 1,
            location_id: None,
        }
    }

    #[test]
    fn test_second_call_returns_same_arc() {
        let mut manager = manager(42);
        let first = manager.generate_location_content(&town()).unwrap();
        let second = manager.generate_location_content(&town()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.generated_at, second.generated_at);
        assert_eq!(first.location_seed, derive_seed(42, "dry-gulch"));
    }

    #[test]
    fn test_reseed_clears_cache() {
        let mut manager = manager(42);
        let first = manager.generate_location_content(&town()).unwrap();

        manager.initialize(42);
        assert!(manager.has_generated_content("dry-gulch"));

        manager.initialize(43);
        assert!(!manager.has_generated_content("dry-gulch"));
        assert!(manager.cached_locations().is_empty());
        let regenerated = manager.generate_location_content(&town()).unwrap();
        assert!(!Arc::ptr_eq(&first, &regenerated));
        assert_eq!(regenerated.world_seed, 43);
    }

    #[test]
    fn test_lookups_never_generate() {
        let manager = manager(1);
        assert!(manager.npcs_for("dry-gulch").is_empty());
        assert!(manager.items_for("dry-gulch").is_empty());
        assert!(manager.dialogue_for("npc-1", "dry-gulch").is_none());
        assert!(!manager.has_generated_content("dry-gulch"));
    }

    #[test]
    fn test_every_npc_has_dialogue() {
        let mut manager = manager(7);
        let content = manager.generate_location_content(&town()).unwrap();
        assert_eq!(content.npcs.len(), 9);
        for npc in manager.npcs_for("dry-gulch") {
            let tree = manager.dialogue_for(&npc.id, "dry-gulch").unwrap();
            assert_eq!(tree.npc_id, npc.id);
            tree.validate().unwrap();
        }
        assert!(manager.dialogue_for("npc-unknown", "dry-gulch").is_none());
        assert!(manager.items_for("dry-gulch").iter().all(|i| i.location_id.as_deref() == Some("dry-gulch")));
    }

    #[test]
    fn test_tag_rules() {
        let config = LocationConfig::default();
        let camp = LocationRef::new("c", "Camp", "camp");
        assert_eq!(npc_plan(&camp, &config), (SizeBucket::Tiny, NpcCounts::new(1, 0)));

        let big_camp = camp.clone().with_tag("size:large");
        assert_eq!(npc_plan(&big_camp, &config), (SizeBucket::Large, NpcCounts::new(6, 3)));

        let bad_size = camp.clone().with_tag("size:gigantic");
        assert_eq!(npc_plan(&bad_size, &config).0, SizeBucket::Tiny);

        let bustling = town().with_tag(BUSTLING_TAG);
        assert_eq!(npc_plan(&bustling, &config).1, NpcCounts::new(8, 3));

        let abandoned = town().with_tag(ABANDONED_TAG).with_tag(BUSTLING_TAG);
        assert_eq!(npc_plan(&abandoned, &config).1, NpcCounts::new(0, 3));
    }

    #[test]
    fn test_bustling_bonus_saturates() {
        let config = LocationConfig {
            bustling_bonus: u32::MAX,
            ..LocationConfig::default()
        };
        let bustling = town().with_tag(BUSTLING_TAG);
        assert_eq!(npc_plan(&bustling, &config).1, NpcCounts::new(u32::MAX, 3));
    }

    #[test]
    fn test_merge_keeps_authored_and_rekeys() {
        let authored = vec![item("lantern"), item("lantern-proc")];
        let procedural = vec![item("lantern"), item("rope"), item("lantern")];
        let merged = merge_authored(authored, procedural);
        let ids: Vec<&str> = merged.iter().map(ContentEntity::id).collect();
        assert_eq!(ids, vec!["lantern", "lantern-proc", "lantern-proc2", "rope", "lantern-proc3"]);
    }

    #[test]
    fn test_shared_manager() {
        let shared = manager(3).into_shared();
        let content = shared.lock().generate_location_content(&town()).unwrap();
        assert!(shared.lock().has_generated_content(&content.location_id));
    }
}
