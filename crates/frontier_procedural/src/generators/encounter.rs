//! Encounter generation, filtering and trigger checks.

use frontier_core::SeededRandom;
use serde::{Deserialize, Serialize};

use super::quest::reward_multiplier;
use crate::config::EncounterConfig;
use crate::context::GenerationContext;
use crate::error::{GenerationError, GenerationResult};
use crate::templates::{Difficulty, EncounterTemplate, EncounterTemplates, TimeOfDay};

/// Health growth per level above 1.
pub const HEALTH_STEP_PER_LEVEL: f64 = 0.1;

/// Health multiplier for `level`: `1 + (level - 1) * 0.1`.
#[inline]
#[must_use]
pub fn health_multiplier(level: u32) -> f64 {
    1.0 + f64::from(level.max(1) - 1) * HEALTH_STEP_PER_LEVEL
}

/// One enemy in a generated encounter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedEnemy {
    /// Id, unique within the encounter.
    pub id: String,
    /// Enemy type key.
    pub enemy_type: String,
    /// Display name.
    pub name: String,
    /// Level-scaled max health, at least 1.
    pub max_health: i64,
    /// Level-scaled experience.
    pub xp: i64,
    /// Level-scaled gold.
    pub gold: i64,
}

/// A generated encounter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedEncounter {
    /// Unique id.
    pub id: String,
    /// Random state on entry.
    pub seed: u32,
    /// Template id.
    pub template_id: String,
    /// Display name.
    pub name: String,
    /// Flavor text.
    pub description: String,
    /// Danger rating.
    pub difficulty: Difficulty,
    /// Player level the encounter was scaled for.
    pub level: u32,
    /// Time of day it was generated at.
    pub time_of_day: TimeOfDay,
    /// Enemies, grouped by template entry order.
    pub enemies: Vec<GeneratedEnemy>,
    /// Sum of enemy experience.
    pub total_xp: i64,
    /// Sum of enemy gold.
    pub total_gold: i64,
}

/// Filters applied before a randomized selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncounterFilter {
    /// Required biome.
    pub biome: Option<String>,
    /// Required time of day.
    pub time_of_day: Option<TimeOfDay>,
    /// Required difficulty.
    pub difficulty: Option<Difficulty>,
}

impl EncounterFilter {
    /// Filter on `biome` at the context's current hour.
    #[must_use]
    pub fn for_context(ctx: &GenerationContext, biome: impl Into<String>) -> Self {
        Self {
            biome: Some(biome.into()),
            time_of_day: Some(TimeOfDay::from_hour(ctx.game_hour)),
            difficulty: None,
        }
    }

    /// Sets the difficulty.
    #[must_use]
    pub const fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Returns true if `template` passes every set filter.
    #[must_use]
    pub fn matches(&self, template: &EncounterTemplate) -> bool {
        self.biome.as_deref().map_or(true, |b| template.valid_for_biome(b))
            && self.time_of_day.map_or(true, |t| template.valid_for_time(t))
            && self.difficulty.map_or(true, |d| template.difficulty == d)
    }
}

/// Generates encounters from templates.
#[derive(Clone, Copy, Debug)]
pub struct EncounterGenerator<'a> {
    templates: &'a EncounterTemplates,
}

impl<'a> EncounterGenerator<'a> {
    /// Creates a generator over `templates`.
    #[must_use]
    pub const fn new(templates: &'a EncounterTemplates) -> Self {
        Self { templates }
    }

    /// Templates that can occur in `biome`, in id order.
    #[must_use]
    pub fn valid_for_biome(&self, biome: &str) -> Vec<&'a EncounterTemplate> {
        self.templates.iter().filter(|t| t.valid_for_biome(biome)).collect()
    }

    /// Templates that can occur at `time`, in id order.
    #[must_use]
    pub fn valid_for_time(&self, time: TimeOfDay) -> Vec<&'a EncounterTemplate> {
        self.templates.iter().filter(|t| t.valid_for_time(time)).collect()
    }

    /// Generates an encounter from `template_id`, scaled to the player level.
    ///
    /// Draw order: id (uuid), then per enemy entry a count draw followed by
    /// one health-variance draw per enemy.
    ///
    /// # Errors
    ///
    /// Unknown template.
    pub fn generate(
        &self,
        rng: &mut SeededRandom,
        template_id: &str,
        ctx: &GenerationContext,
    ) -> GenerationResult<GeneratedEncounter> {
        let template = self.templates.get(template_id)?;
        Ok(Self::from_template(rng, template, ctx))
    }

    /// Applies `filter`, then picks a template by weight (one draw) and
    /// generates it. `Ok(None)` when nothing passes the filter.
    ///
    /// # Errors
    ///
    /// [`GenerationError::NotInitialized`] if no templates are loaded.
    pub fn select(
        &self,
        rng: &mut SeededRandom,
        ctx: &GenerationContext,
        filter: &EncounterFilter,
    ) -> GenerationResult<Option<GeneratedEncounter>> {
        if self.templates.is_empty() {
            return Err(GenerationError::NotInitialized("encounter templates"));
        }
        let candidates: Vec<&EncounterTemplate> = self.templates.iter().filter(|t| filter.matches(t)).collect();
        if candidates.is_empty() {
            tracing::debug!(?filter, "no encounter matches filter");
            return Ok(None);
        }
        let template = *rng.weighted_pick_by(&candidates, |t| t.weight)?;
        Ok(Some(Self::from_template(rng, template, ctx)))
    }

    /// Rolls whether an encounter happens now (one draw).
    ///
    /// The base chance is multiplied inside the configured night window.
    pub fn should_trigger(rng: &mut SeededRandom, ctx: &GenerationContext, config: &EncounterConfig) -> bool {
        rng.bool(config.chance_at(ctx.game_hour))
    }

    fn from_template(rng: &mut SeededRandom, template: &EncounterTemplate, ctx: &GenerationContext) -> GeneratedEncounter {
        let seed = rng.state();
        let id = format!("encounter-{}", rng.uuid());
        let level = ctx.player_level.max(1);
        let health_scale = health_multiplier(level);
        let reward_scale = reward_multiplier(level);

        let mut enemies = Vec::new();
        for entry in &template.enemies {
            let count = entry.count.draw(rng);
            let base_health = ((entry.base_health as f64) * health_scale).round() as i64;
            let xp = ((entry.xp as f64) * reward_scale).round().max(0.0) as i64;
            let gold = ((entry.gold as f64) * reward_scale).round().max(0.0) as i64;
            for n in 0..count {
                let variance = rng.int(-entry.health_variance, entry.health_variance);
                enemies.push(GeneratedEnemy {
                    id: format!("{id}-{}-{n}", entry.enemy_type),
                    enemy_type: entry.enemy_type.clone(),
                    name: entry.name.clone(),
                    max_health: base_health.saturating_add(variance).max(1),
                    xp,
                    gold,
                });
            }
        }

        let total_xp = enemies.iter().fold(0i64, |sum, e| sum.saturating_add(e.xp));
        let total_gold = enemies.iter().fold(0i64, |sum, e| sum.saturating_add(e.gold));
        tracing::debug!(id = %id, template = %template.id, enemies = enemies.len(), "generated encounter");

        GeneratedEncounter {
            id,
            seed,
            template_id: template.id.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            difficulty: template.difficulty,
            level,
            time_of_day: TimeOfDay::from_hour(ctx.game_hour),
            enemies,
            total_xp,
            total_gold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateRegistry;

    #[test]
    fn test_counts_within_ranges() {
        let registry = TemplateRegistry::frontier().unwrap();
        let encounters = EncounterGenerator::new(&registry.encounters);
        let template = registry.encounters.get("wolf_pack").unwrap();
        let ctx = GenerationContext::new(1);
        for seed in 0..50 {
            let encounter = encounters.generate(&mut SeededRandom::new(seed), "wolf_pack", &ctx).unwrap();
            for entry in &template.enemies {
                let count = encounter.enemies.iter().filter(|e| e.enemy_type == entry.enemy_type).count() as u32;
                assert!(entry.count.contains(count));
            }
            assert!(encounter.total_xp >= 0 && encounter.total_gold >= 0);
        }
    }

    #[test]
    fn test_health_monotonic_in_level() {
        let registry = TemplateRegistry::frontier().unwrap();
        let encounters = EncounterGenerator::new(&registry.encounters);
        for seed in 0..20 {
            let mut previous: Option<GeneratedEncounter> = None;
            for level in 1..=20 {
                let ctx = GenerationContext::new(1).with_player_level(level);
                let encounter = encounters.generate(&mut SeededRandom::new(seed), "claim_jumpers", &ctx).unwrap();
                if let Some(previous) = &previous {
                    assert_eq!(previous.enemies.len(), encounter.enemies.len());
                    for (before, after) in previous.enemies.iter().zip(&encounter.enemies) {
                        assert!(after.max_health >= before.max_health);
                    }
                    assert!(encounter.total_xp >= previous.total_xp);
                }
                previous = Some(encounter);
            }
        }
    }

    #[test]
    fn test_extreme_stats_at_max_level() {
        use crate::templates::{CountRange, EnemyEntry, MAX_ENEMY_STAT};

        let templates = EncounterTemplates::init(vec![EncounterTemplate {
            id: "titans".into(),
            name: "Titans".into(),
            description: String::new(),
            difficulty: Difficulty::Deadly,
            weight: 1.0,
            valid_biomes: Vec::new(),
            valid_time_of_day: Vec::new(),
            enemies: vec![EnemyEntry {
                enemy_type: "titan".into(),
                name: "Titan".into(),
                count: CountRange::new(3, 3),
                base_health: MAX_ENEMY_STAT,
                health_variance: MAX_ENEMY_STAT,
                xp: MAX_ENEMY_STAT,
                gold: MAX_ENEMY_STAT,
            }],
        }])
        .unwrap();
        let encounters = EncounterGenerator::new(&templates);
        let ctx = GenerationContext::new(1).with_player_level(u32::MAX);
        for seed in 0..20 {
            let encounter = encounters.generate(&mut SeededRandom::new(seed), "titans", &ctx).unwrap();
            assert_eq!(encounter.enemies.len(), 3);
            assert!(encounter.enemies.iter().all(|e| e.max_health >= MAX_ENEMY_STAT));
            assert!(encounter.total_xp > 0 && encounter.total_gold > 0);
        }
    }

    #[test]
    fn test_empty_filter_lists_mean_everywhere() {
        let registry = TemplateRegistry::frontier().unwrap();
        let encounters = EncounterGenerator::new(&registry.encounters);
        let swamp: Vec<_> = encounters.valid_for_biome("swamp").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(swamp, vec!["night_raiders", "road_agents"]);
        assert!(encounters.valid_for_time(TimeOfDay::Night).iter().all(|t| t.id != "rattlesnake"));
    }

    #[test]
    fn test_select_returns_none_when_filtered_out() {
        let registry = TemplateRegistry::frontier().unwrap();
        let encounters = EncounterGenerator::new(&registry.encounters);
        let ctx = GenerationContext::new(1).with_game_hour(12);
        let filter = EncounterFilter::for_context(&ctx, "plains").with_difficulty(Difficulty::Deadly);
        assert!(encounters.select(&mut SeededRandom::new(1), &ctx, &filter).unwrap().is_none());

        let filter = EncounterFilter::for_context(&ctx, "desert");
        let encounter = encounters.select(&mut SeededRandom::new(1), &ctx, &filter).unwrap().unwrap();
        let template = registry.encounters.get(&encounter.template_id).unwrap();
        assert!(template.valid_for_biome("desert") && template.valid_for_time(TimeOfDay::Day));
    }

    #[test]
    fn test_trigger_extremes() {
        let ctx = GenerationContext::new(1).with_game_hour(23);
        let never = EncounterConfig {
            base_chance: 0.0,
            ..EncounterConfig::default()
        };
        let always = EncounterConfig {
            base_chance: 1.0,
            ..EncounterConfig::default()
        };
        let mut rng = SeededRandom::new(2);
        for _ in 0..100 {
            assert!(!EncounterGenerator::should_trigger(&mut rng, &ctx, &never));
            assert!(EncounterGenerator::should_trigger(&mut rng, &ctx, &always));
        }
    }
}
