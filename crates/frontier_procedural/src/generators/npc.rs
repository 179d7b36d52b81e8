//! NPC generation from role templates.

use std::collections::BTreeMap;

use frontier_core::SeededRandom;
use serde::{Deserialize, Serialize};

use super::name::{GeneratedName, NameGenerator, NameOptions, UsedNames};
use crate::config::DEFAULT_UNIQUE_ATTEMPTS;
use crate::context::GenerationContext;
use crate::error::GenerationResult;
use crate::substitution::{Substitutions, TemplateText};
use crate::templates::{Gender, NpcTemplate, NpcTemplates, NpcTier, TemplateRegistry, TextSnippet};

/// Trait value assumed for traits a template does not declare.
pub const NEUTRAL_TRAIT: i32 = 50;

/// A generated non-player character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedNpc {
    /// Unique id.
    pub id: String,
    /// Random state on entry.
    ///
    /// Passing `SeededRandom::new(seed)` to [`NpcGenerator::generate`]
    /// replays a singly generated NPC. Location batches retry names until
    /// they are unique, so a replay there only guarantees the id and gender;
    /// the name matches only if the first attempt was already unique.
    pub seed: u32,
    /// Template role.
    pub role: String,
    /// Human-readable role.
    pub display_role: String,
    /// Population tier.
    pub tier: NpcTier,
    /// Name.
    pub name: GeneratedName,
    /// Gender.
    pub gender: Gender,
    /// Trait name -> value.
    pub personality: BTreeMap<String, i32>,
    /// Offers quests.
    pub is_quest_giver: bool,
    /// Runs a shop.
    pub has_shop: bool,
    /// Shop kind, when `has_shop`.
    pub shop_type: Option<String>,
    /// Backstory text.
    pub backstory: String,
    /// Short description.
    pub description: String,
    /// Location the NPC was generated for.
    pub location_id: Option<String>,
    /// Tags from the template.
    pub tags: Vec<String>,
}

impl GeneratedNpc {
    /// Trait value, or [`NEUTRAL_TRAIT`] when absent.
    #[must_use]
    pub fn trait_value(&self, name: &str) -> i32 {
        self.personality.get(name).copied().unwrap_or(NEUTRAL_TRAIT)
    }
}

/// Per-call NPC options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NpcOptions {
    /// Pins the gender instead of drawing it.
    pub gender: Option<Gender>,
    /// Location display name for `{{location}}`.
    pub location_name: Option<String>,
    /// Name options (gender is overridden by the NPC's gender).
    pub name: NameOptions,
}

/// How many NPCs of each tier to place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcCounts {
    /// Background NPCs.
    pub background: u32,
    /// Notable NPCs.
    pub notable: u32,
}

impl NpcCounts {
    /// Creates counts.
    #[must_use]
    pub const fn new(background: u32, notable: u32) -> Self {
        Self { background, notable }
    }

    /// Total NPCs.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.background + self.notable
    }
}

/// Draws that precede the name: entry state, id, gender.
struct Identity {
    seed: u32,
    id: String,
    gender: Gender,
}

impl Identity {
    fn draw(rng: &mut SeededRandom, template: &NpcTemplate, options: &NpcOptions) -> GenerationResult<Self> {
        let seed = rng.state();
        let id = format!("npc-{}", rng.uuid());
        let gender = match options.gender {
            Some(gender) => gender,
            None => template.gender_weights.draw(rng)?,
        };
        Ok(Self { seed, id, gender })
    }
}

/// Generates NPCs from role templates.
#[derive(Clone, Copy, Debug)]
pub struct NpcGenerator<'a> {
    templates: &'a NpcTemplates,
    names: NameGenerator<'a>,
    unique_attempts: u32,
}

impl<'a> NpcGenerator<'a> {
    /// Creates a generator over a registry.
    #[must_use]
    pub const fn new(registry: &'a TemplateRegistry) -> Self {
        Self {
            templates: &registry.npcs,
            names: NameGenerator::new(&registry.names),
            unique_attempts: DEFAULT_UNIQUE_ATTEMPTS,
        }
    }

    /// Sets the unique-name attempt budget for batch generation.
    #[must_use]
    pub const fn with_unique_attempts(mut self, attempts: u32) -> Self {
        self.unique_attempts = attempts;
        self
    }

    /// Generates one NPC for `role`.
    ///
    /// Draw order: id (uuid), gender (skipped when pinned), name origin +
    /// name, one value per trait in name order, quest-giver flag, shop
    /// flag, backstory, description.
    ///
    /// # Errors
    ///
    /// Unknown role or origin, or broken snippet text.
    pub fn generate(
        &self,
        rng: &mut SeededRandom,
        role: &str,
        ctx: &GenerationContext,
        options: &NpcOptions,
    ) -> GenerationResult<GeneratedNpc> {
        let template = self.templates.get(role)?;
        let identity = Identity::draw(rng, template, options)?;
        let name = self
            .names
            .generate_weighted(rng, &template.origins, options.name.with_gender(identity.gender))?;
        self.finish(rng, template, ctx, options, identity, name)
    }

    /// Generates a batch of notable then background NPCs for a location,
    /// with no duplicate names within the batch or `used`.
    ///
    /// Each slot picks a role (one draw, weighted by spawn weight), then
    /// builds the NPC from a child stream named after the slot. Slots whose
    /// unique-name search comes up empty are skipped. A location type no
    /// template recognizes yields no NPCs.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate`].
    pub fn generate_for_location(
        &self,
        rng: &mut SeededRandom,
        location_type: &str,
        ctx: &GenerationContext,
        counts: NpcCounts,
        used: &mut UsedNames,
    ) -> GenerationResult<Vec<GeneratedNpc>> {
        self.generate_for_location_with(rng, location_type, ctx, counts, used, &NpcOptions::default())
    }

    /// [`Self::generate_for_location`] with explicit options.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate`].
    pub fn generate_for_location_with(
        &self,
        rng: &mut SeededRandom,
        location_type: &str,
        ctx: &GenerationContext,
        counts: NpcCounts,
        used: &mut UsedNames,
        options: &NpcOptions,
    ) -> GenerationResult<Vec<GeneratedNpc>> {
        if !self.templates.recognizes_location_type(location_type) {
            tracing::warn!(location_type, "no npc template for location type");
            return Ok(Vec::new());
        }

        let mut npcs = Vec::with_capacity(counts.total() as usize);
        for (tier, count) in [(NpcTier::Notable, counts.notable), (NpcTier::Background, counts.background)] {
            let candidates = self.templates.for_location(location_type, tier);
            if candidates.is_empty() {
                if count > 0 {
                    tracing::debug!(location_type, ?tier, "no roles for tier");
                }
                continue;
            }

            for slot in 0..count {
                let template = *rng.weighted_pick_by(&candidates, |t| t.spawn_weight)?;
                let mut npc_rng = rng.child(&format!("{tier:?}:{slot}"));
                let identity = Identity::draw(&mut npc_rng, template, options)?;
                let name = self.names.generate_unique_weighted(
                    &mut npc_rng,
                    &template.origins,
                    options.name.with_gender(identity.gender),
                    used,
                    self.unique_attempts,
                )?;
                match name {
                    Some(name) => npcs.push(self.finish(&mut npc_rng, template, ctx, options, identity, name)?),
                    None => tracing::warn!(location_type, role = %template.role, "skipped npc slot: no unique name"),
                }
            }
        }

        tracing::debug!(location_type, count = npcs.len(), "generated location npcs");
        Ok(npcs)
    }

    /// Everything after the name: traits, flags, text.
    fn finish(
        &self,
        rng: &mut SeededRandom,
        template: &NpcTemplate,
        ctx: &GenerationContext,
        options: &NpcOptions,
        identity: Identity,
        name: GeneratedName,
    ) -> GenerationResult<GeneratedNpc> {
        let Identity { seed, id, gender } = identity;

        let personality: BTreeMap<String, i32> = template
            .personality
            .iter()
            .map(|(trait_name, range)| {
                let value = rng.int(i64::from(range.min), i64::from(range.max)) as i32;
                (trait_name.clone(), value)
            })
            .collect();

        let is_quest_giver = rng.bool(template.quest_giver_chance);
        let has_shop = rng.bool(template.shop_chance);

        let location = options
            .location_name
            .clone()
            .or_else(|| ctx.location_id.clone())
            .unwrap_or_else(|| "these parts".to_string());
        let values = Substitutions::new()
            .with("name", name.full_name.as_str())
            .with("first_name", name.first_name.as_str())
            .with("role", template.display_name.to_lowercase())
            .with("location", location);
        let backstory = Self::render_snippet(rng, &self.templates.backstories_for(&template.role), &values)?;
        let description = Self::render_snippet(rng, &self.templates.descriptions_for(&template.role), &values)?;

        tracing::debug!(id = %id, role = %template.role, name = %name.full_name, "generated npc");

        Ok(GeneratedNpc {
            id,
            seed,
            role: template.role.clone(),
            display_role: template.display_name.clone(),
            tier: template.tier,
            name,
            gender,
            personality,
            is_quest_giver,
            has_shop,
            shop_type: if has_shop { template.shop_type.clone() } else { None },
            backstory,
            description,
            location_id: ctx.location_id.clone(),
            tags: template.tags.clone(),
        })
    }

    /// Picks and renders one snippet; empty pools draw nothing.
    fn render_snippet(
        rng: &mut SeededRandom,
        pool: &[&TextSnippet],
        values: &Substitutions,
    ) -> GenerationResult<String> {
        if pool.is_empty() {
            return Ok(String::new());
        }
        let snippet = rng.pick(pool)?;
        TemplateText::parse(&snippet.text)?.render(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;

    fn registry() -> TemplateRegistry {
        TemplateRegistry::frontier().unwrap()
    }

    #[test]
    fn test_same_seed_same_npc() {
        let registry = registry();
        let npcs = NpcGenerator::new(&registry);
        let ctx = GenerationContext::new(1);
        let a = npcs.generate(&mut SeededRandom::new(77), "sheriff", &ctx, &NpcOptions::default()).unwrap();
        let b = npcs.generate(&mut SeededRandom::new(77), "sheriff", &ctx, &NpcOptions::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seed, 77);

        let replay = npcs
            .generate(&mut SeededRandom::new(a.seed), "sheriff", &ctx, &NpcOptions::default())
            .unwrap();
        assert_eq!(replay, a);
    }

    #[test]
    fn test_traits_within_template_ranges() {
        let registry = registry();
        let npcs = NpcGenerator::new(&registry);
        let template = registry.npcs.get("sheriff").unwrap();
        let ctx = GenerationContext::new(1);
        let mut rng = SeededRandom::new(5);
        for _ in 0..100 {
            let npc = npcs.generate(&mut rng, "sheriff", &ctx, &NpcOptions::default()).unwrap();
            for (name, range) in &template.personality {
                let value = npc.personality[name];
                assert!(value >= range.min && value <= range.max, "{name}={value}");
            }
            assert!(!npc.backstory.contains("{{"));
            assert!(!npc.description.is_empty());
        }
    }

    #[test]
    fn test_shop_flag_follows_chance() {
        let registry = registry();
        let npcs = NpcGenerator::new(&registry);
        let ctx = GenerationContext::new(1);
        let mut rng = SeededRandom::new(8);
        for _ in 0..20 {
            let npc = npcs.generate(&mut rng, "shopkeeper", &ctx, &NpcOptions::default()).unwrap();
            assert!(npc.has_shop);
            assert_eq!(npc.shop_type.as_deref(), Some("general store"));
            let captain = npcs.generate(&mut rng, "captain", &ctx, &NpcOptions::default()).unwrap();
            assert!(!captain.has_shop);
            assert!(captain.shop_type.is_none());
        }
    }

    #[test]
    fn test_unknown_role() {
        let registry = registry();
        let result = NpcGenerator::new(&registry).generate(
            &mut SeededRandom::new(1),
            "astronaut",
            &GenerationContext::new(1),
            &NpcOptions::default(),
        );
        assert!(matches!(result, Err(GenerationError::UnknownTemplate { kind: "npc", .. })));
    }

    #[test]
    fn test_batch_names_are_unique() {
        let registry = registry();
        let npcs = NpcGenerator::new(&registry);
        let ctx = GenerationContext::new(3).at_location("town-1", None);
        let mut used = UsedNames::new();
        let batch = npcs
            .generate_for_location(&mut SeededRandom::new(3), "frontier_town", &ctx, NpcCounts::new(6, 3), &mut used)
            .unwrap();

        assert_eq!(batch.len(), 9);
        let mut seen = UsedNames::new();
        for npc in &batch {
            assert!(seen.insert(&npc.name.full_name), "duplicate {}", npc.name.full_name);
            assert_eq!(npc.location_id.as_deref(), Some("town-1"));
        }
        assert_eq!(batch.iter().filter(|n| n.tier == NpcTier::Notable).count(), 3);
    }

    #[test]
    fn test_batch_seed_replays_identity() {
        let registry = registry();
        let npcs = NpcGenerator::new(&registry);
        let ctx = GenerationContext::new(4);
        let mut used = UsedNames::new();
        let batch = npcs
            .generate_for_location(&mut SeededRandom::new(4), "mining_town", &ctx, NpcCounts::new(4, 2), &mut used)
            .unwrap();

        for npc in &batch {
            let replay = npcs
                .generate(&mut SeededRandom::new(npc.seed), &npc.role, &ctx, &NpcOptions::default())
                .unwrap();
            assert_eq!(replay.id, npc.id);
            assert_eq!(replay.gender, npc.gender);
        }

        // Nothing was taken yet, so the first name attempt always stands.
        let first = &batch[0];
        let replay = npcs
            .generate(&mut SeededRandom::new(first.seed), &first.role, &ctx, &NpcOptions::default())
            .unwrap();
        assert_eq!(&replay, first);
    }

    #[test]
    fn test_unrecognized_location_type_is_empty() {
        let registry = registry();
        let batch = NpcGenerator::new(&registry)
            .generate_for_location(
                &mut SeededRandom::new(1),
                "space_station",
                &GenerationContext::new(1),
                NpcCounts::new(4, 2),
                &mut UsedNames::new(),
            )
            .unwrap();
        assert!(batch.is_empty());
    }
}
