//! Quest generation: binding resolution, level assignment, reward scaling.

use std::collections::BTreeMap;

use frontier_core::SeededRandom;
use serde::{Deserialize, Serialize};

use crate::context::{EntityKind, EntityRef, GenerationContext};
use crate::error::{GenerationError, GenerationResult};
use crate::substitution::{Substitutions, TemplateText};
use crate::templates::{BaseRewards, BindingSpec, ObjectiveKind, QuestTemplate, QuestTemplates, QuestType};

/// Reward growth per level above 1.
pub const REWARD_STEP_PER_LEVEL: f64 = 0.2;

/// Reward multiplier for `level`: `1 + (level - 1) * 0.2`.
///
/// Levels below 1 are treated as 1.
#[inline]
#[must_use]
pub fn reward_multiplier(level: u32) -> f64 {
    1.0 + f64::from(level.max(1) - 1) * REWARD_STEP_PER_LEVEL
}

/// Scales base rewards to `level`, rounding and clamping at zero.
#[must_use]
pub fn scale_rewards(base: &BaseRewards, level: u32) -> QuestRewards {
    let multiplier = reward_multiplier(level);
    let scale = |value: i64| ((value as f64) * multiplier).round().max(0.0) as i64;
    QuestRewards {
        gold: scale(base.gold),
        xp: scale(base.xp),
        items: base.items.clone(),
    }
}

/// Final rewards of a generated quest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRewards {
    /// Gold, never negative.
    pub gold: i64,
    /// Experience, never negative.
    pub xp: i64,
    /// Item template ids.
    pub items: Vec<String>,
}

/// The entity a binding resolved to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundEntity {
    /// Entity kind.
    pub kind: EntityKind,
    /// Entity id. Fallbacks use `<quest id>:<binding>`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// True if the template fallback was used.
    pub fallback: bool,
}

/// A concrete objective.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestObjective {
    /// What to do.
    pub kind: ObjectiveKind,
    /// Rendered text.
    pub description: String,
    /// Binding the objective targets.
    pub binding: String,
    /// Id of the target entity.
    pub target_id: String,
    /// Required count.
    pub count: u32,
}

/// A concrete stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestStage {
    /// Stage id from the template.
    pub id: String,
    /// Rendered title.
    pub title: String,
    /// Rendered description.
    pub description: String,
    /// Objectives, in order.
    pub objectives: Vec<QuestObjective>,
}

/// A generated quest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuest {
    /// Unique id.
    pub id: String,
    /// Random state on entry.
    pub seed: u32,
    /// Template id.
    pub template_id: String,
    /// Category.
    pub quest_type: QuestType,
    /// Rendered title.
    pub title: String,
    /// Rendered description.
    pub description: String,
    /// Level, inside the template's range.
    pub level: u32,
    /// Scaled rewards.
    pub rewards: QuestRewards,
    /// Binding name -> resolved entity.
    pub bindings: BTreeMap<String, BoundEntity>,
    /// Included stages, in template order.
    pub stages: Vec<QuestStage>,
}

/// Generates quests from templates and context entities.
#[derive(Clone, Copy, Debug)]
pub struct QuestGenerator<'a> {
    templates: &'a QuestTemplates,
}

impl<'a> QuestGenerator<'a> {
    /// Creates a generator over `templates`.
    #[must_use]
    pub const fn new(templates: &'a QuestTemplates) -> Self {
        Self { templates }
    }

    /// Generates a quest from `template_id`.
    ///
    /// Draw order: id (uuid), level, one pick per binding in name order
    /// (no draw for fallbacks), then per stage an inclusion roll (not for
    /// the first stage) and one count draw per objective.
    ///
    /// # Errors
    ///
    /// Unknown template, or a binding with no candidate and no fallback.
    pub fn generate(
        &self,
        rng: &mut SeededRandom,
        template_id: &str,
        ctx: &GenerationContext,
    ) -> GenerationResult<GeneratedQuest> {
        let template = self.templates.get(template_id)?;
        Self::from_template(rng, template, ctx)
    }

    /// Picks a template whose level range contains the player level (one
    /// draw) and generates it. `Ok(None)` when no template fits.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate`].
    pub fn generate_for_level(
        &self,
        rng: &mut SeededRandom,
        ctx: &GenerationContext,
    ) -> GenerationResult<Option<GeneratedQuest>> {
        let candidates = self.templates.for_level(ctx.player_level)?;
        self.generate_from(rng, &candidates, ctx)
    }

    /// Like [`Self::generate_for_level`], restricted to templates `role`
    /// may offer.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate`].
    pub fn generate_for_giver(
        &self,
        rng: &mut SeededRandom,
        role: &str,
        ctx: &GenerationContext,
    ) -> GenerationResult<Option<GeneratedQuest>> {
        let candidates: Vec<_> = self
            .templates
            .for_level(ctx.player_level)?
            .into_iter()
            .filter(|t| t.offered_by(role))
            .collect();
        self.generate_from(rng, &candidates, ctx)
    }

    fn generate_from(
        &self,
        rng: &mut SeededRandom,
        candidates: &[&QuestTemplate],
        ctx: &GenerationContext,
    ) -> GenerationResult<Option<GeneratedQuest>> {
        if candidates.is_empty() {
            tracing::debug!(level = ctx.player_level, "no quest template for level");
            return Ok(None);
        }
        let template = *rng.pick(candidates)?;
        Self::from_template(rng, template, ctx).map(Some)
    }

    fn from_template(
        rng: &mut SeededRandom,
        template: &QuestTemplate,
        ctx: &GenerationContext,
    ) -> GenerationResult<GeneratedQuest> {
        let seed = rng.state();
        let id = format!("quest-{}", rng.uuid());
        let level = rng.int(i64::from(template.level_range.min), i64::from(template.level_range.max)) as u32;
        let rewards = scale_rewards(&template.base_rewards, level);

        let mut bindings = BTreeMap::new();
        for (binding, spec) in &template.bindings {
            let entity = resolve_binding(rng, &template.id, &id, binding, spec, ctx)?;
            bindings.insert(binding.clone(), entity);
        }

        let mut values = Substitutions::new()
            .with("level", level.to_string())
            .with("gold", rewards.gold.to_string())
            .with("xp", rewards.xp.to_string());
        for (binding, entity) in &bindings {
            values.insert(binding.as_str(), entity.name.as_str());
            values.insert(format!("{binding}_id"), entity.id.as_str());
        }
        let render = |text: &str| TemplateText::parse(text)?.render(&values);

        let mut stages = Vec::with_capacity(template.stages.len());
        for (index, stage) in template.stages.iter().enumerate() {
            if index > 0 && !rng.bool(stage.chance) {
                continue;
            }
            let mut objectives = Vec::with_capacity(stage.objectives.len());
            for objective in &stage.objectives {
                let target = bindings.get(&objective.target).ok_or_else(|| GenerationError::UnresolvableBinding {
                    template: template.id.clone(),
                    binding: objective.target.clone(),
                })?;
                objectives.push(QuestObjective {
                    kind: objective.kind,
                    description: render(&objective.description)?,
                    binding: objective.target.clone(),
                    target_id: target.id.clone(),
                    count: objective.count.draw(rng),
                });
            }
            stages.push(QuestStage {
                id: stage.id.clone(),
                title: render(&stage.title)?,
                description: render(&stage.description)?,
                objectives,
            });
        }

        let quest = GeneratedQuest {
            title: render(&template.title)?,
            description: render(&template.description)?,
            id,
            seed,
            template_id: template.id.clone(),
            quest_type: template.quest_type,
            level,
            rewards,
            bindings,
            stages,
        };
        tracing::debug!(id = %quest.id, template = %quest.template_id, level, "generated quest");
        Ok(quest)
    }
}

/// Tagged candidates, then any candidate of the kind, then the fallback.
fn resolve_binding(
    rng: &mut SeededRandom,
    template_id: &str,
    quest_id: &str,
    binding: &str,
    spec: &BindingSpec,
    ctx: &GenerationContext,
) -> GenerationResult<BoundEntity> {
    let candidates = ctx.entities(spec.kind);
    let tagged: Vec<&EntityRef> = match &spec.tag {
        Some(tag) => candidates.iter().filter(|e| e.has_tag(tag)).collect(),
        None => Vec::new(),
    };

    let chosen = if tagged.is_empty() {
        if candidates.is_empty() {
            None
        } else {
            Some(rng.pick(candidates)?)
        }
    } else {
        Some(*rng.pick(&tagged)?)
    };

    match (chosen, &spec.fallback) {
        (Some(entity), _) => Ok(BoundEntity {
            kind: spec.kind,
            id: entity.id.clone(),
            name: entity.name.clone(),
            fallback: false,
        }),
        (None, Some(fallback)) => Ok(BoundEntity {
            kind: spec.kind,
            id: format!("{quest_id}:{binding}"),
            name: fallback.clone(),
            fallback: true,
        }),
        (None, None) => Err(GenerationError::UnresolvableBinding {
            template: template_id.to_string(),
            binding: binding.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateRegistry;

    #[test]
    fn test_reward_multiplier() {
        assert!((reward_multiplier(1) - 1.0).abs() < 1e-12);
        assert!((reward_multiplier(5) - 1.8).abs() < 1e-12);
        assert!((reward_multiplier(0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale_rewards_rounds_and_clamps() {
        let base = BaseRewards {
            gold: 33,
            xp: -10,
            items: vec!["canteen".into()],
        };
        let scaled = scale_rewards(&base, 2);
        assert_eq!(scaled.gold, 40); // 39.6
        assert_eq!(scaled.xp, 0);
        assert_eq!(scaled.items, vec!["canteen".to_string()]);
    }

    #[test]
    fn test_bindings_prefer_tagged_entities() {
        let registry = TemplateRegistry::frontier().unwrap();
        let quests = QuestGenerator::new(&registry.quests);
        let ctx = GenerationContext::new(1)
            .with_entity(EntityKind::Enemy, EntityRef::new("e-coyote", "A Coyote"))
            .with_entity(EntityKind::Enemy, EntityRef::new("e-bart", "Black Bart").with_tag("outlaw"))
            .with_entity(EntityKind::Location, EntityRef::new("l-gulch", "Dead Man's Gulch"));

        for seed in 0..25 {
            let quest = quests.generate(&mut SeededRandom::new(seed), "bounty_basic", &ctx).unwrap();
            assert_eq!(quest.bindings["target"].id, "e-bart");
            // No hideout-tagged location, so any location is used
            assert_eq!(quest.bindings["hideout"].id, "l-gulch");
            assert!(quest.title.contains("Black Bart"));
        }
    }

    #[test]
    fn test_fallback_uses_synthetic_id() {
        let registry = TemplateRegistry::frontier().unwrap();
        let quest = QuestGenerator::new(&registry.quests)
            .generate(&mut SeededRandom::new(4), "bounty_basic", &GenerationContext::new(1))
            .unwrap();
        let target = &quest.bindings["target"];
        assert!(target.fallback);
        assert_eq!(target.id, format!("{}:target", quest.id));
        assert_eq!(target.name, "Black Jack Ketchum");
        let last = quest.stages.last().unwrap();
        assert_eq!(last.objectives[0].target_id, target.id);
    }

    #[test]
    fn test_unresolvable_binding() {
        let template: QuestTemplate = toml::from_str(
            r#"
            id = "fetch_nothing"
            quest_type = "fetch"
            title = "Fetch {{thing}}"
            description = "Go get {{thing}}."
            level_range = { min = 1, max = 1 }

            [bindings.thing]
            kind = "item"

            [[stages]]
            id = "only"
            title = "Fetch"
            description = "Fetch it."
            objectives = [{ kind = "collect", description = "Find {{thing}}", target = "thing" }]
            "#,
        )
        .unwrap();
        let templates = QuestTemplates::init(vec![template]).unwrap();
        let result = QuestGenerator::new(&templates).generate(
            &mut SeededRandom::new(1),
            "fetch_nothing",
            &GenerationContext::new(1),
        );
        assert!(matches!(result, Err(GenerationError::UnresolvableBinding { .. })));
    }

    #[test]
    fn test_no_template_for_level_is_none() {
        let registry = TemplateRegistry::frontier().unwrap();
        let quests = QuestGenerator::new(&registry.quests);
        let ctx = GenerationContext::new(1).with_player_level(99);
        assert!(quests.generate_for_level(&mut SeededRandom::new(1), &ctx).unwrap().is_none());
        assert!(quests
            .generate_for_giver(&mut SeededRandom::new(1), "sheriff", &GenerationContext::new(1))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_first_stage_always_included() {
        let registry = TemplateRegistry::frontier().unwrap();
        let quests = QuestGenerator::new(&registry.quests);
        let template = registry.quests.get("gang_cleanup").unwrap();
        for seed in 0..50 {
            let quest = quests.generate(&mut SeededRandom::new(seed), "gang_cleanup", &GenerationContext::new(1)).unwrap();
            assert_eq!(quest.stages[0].id, template.stages[0].id);
            assert!(quest.stages.iter().any(|s| s.id == "assault"));
        }
    }
}
