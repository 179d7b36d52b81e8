//! Quest templates: text skeletons, level ranges, rewards and bindings.
//!
//! A binding names a slot (`target`, `destination`, ...) that generation
//! fills with a concrete entity from the context. Quest and stage text may
//! reference a binding by name (`{{target}}`, the entity's display name)
//! or by `{{<binding>_id}}`, plus the built-ins `{{level}}`, `{{gold}}`
//! and `{{xp}}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{default_weight, ensure, ensure_probability, CountRange};
use crate::context::EntityKind;
use crate::error::{GenerationError, GenerationResult};
use crate::substitution::TemplateText;

/// Tokens every quest text may use without a binding.
pub const BUILTIN_TOKENS: [&str; 3] = ["level", "gold", "xp"];

/// Broad quest category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    /// Hunt down a wanted outlaw.
    Bounty,
    /// Carry goods somewhere.
    Delivery,
    /// Recover an item.
    Fetch,
    /// Protect someone on the road.
    Escort,
    /// Ask questions, follow leads.
    Investigate,
    /// Bring someone home.
    Rescue,
}

/// What an objective asks the player to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// Defeat the target.
    Kill,
    /// Obtain the target.
    Collect,
    /// Bring something to the target.
    Deliver,
    /// Speak with the target.
    TalkTo,
    /// Reach the target.
    Visit,
    /// Accompany the target.
    Escort,
}

/// Inclusive level range, 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRange {
    /// Lowest level.
    pub min: u32,
    /// Highest level.
    pub max: u32,
}

impl LevelRange {
    /// Returns true if `level` is inside the range.
    #[must_use]
    pub const fn contains(&self, level: u32) -> bool {
        level >= self.min && level <= self.max
    }
}

/// Rewards at level 1, before scaling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRewards {
    /// Gold.
    #[serde(default)]
    pub gold: i64,
    /// Experience.
    #[serde(default)]
    pub xp: i64,
    /// Item template ids granted on completion.
    #[serde(default)]
    pub items: Vec<String>,
}

/// How to fill one named slot of a quest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSpec {
    /// Entity kind the slot takes.
    pub kind: EntityKind,
    /// Preferred tag among candidates.
    #[serde(default)]
    pub tag: Option<String>,
    /// Display name used when the context offers no candidate.
    #[serde(default)]
    pub fallback: Option<String>,
}

/// Skeleton of one objective.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveTemplate {
    /// What to do.
    pub kind: ObjectiveKind,
    /// Objective text, with tokens.
    pub description: String,
    /// Name of the binding this objective targets.
    pub target: String,
    /// Required count.
    #[serde(default)]
    pub count: CountRange,
}

/// Skeleton of one stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageTemplate {
    /// Stage id, unique within its quest.
    pub id: String,
    /// Stage title, with tokens.
    pub title: String,
    /// Stage text, with tokens.
    pub description: String,
    /// Chance the stage is included. The first stage is always included.
    #[serde(default = "default_weight")]
    pub chance: f64,
    /// Objectives, in order.
    pub objectives: Vec<ObjectiveTemplate>,
}

/// A complete quest template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestTemplate {
    /// Template id, e.g. `bounty_basic`.
    pub id: String,
    /// Category.
    pub quest_type: QuestType,
    /// Title, with tokens.
    pub title: String,
    /// Description, with tokens.
    pub description: String,
    /// Levels this quest is offered at.
    pub level_range: LevelRange,
    /// Rewards before level scaling.
    #[serde(default)]
    pub base_rewards: BaseRewards,
    /// Binding name -> how to fill it. Resolved in name order.
    #[serde(default)]
    pub bindings: BTreeMap<String, BindingSpec>,
    /// Roles that may hand out this quest. Empty means any.
    #[serde(default)]
    pub giver_roles: Vec<String>,
    /// Stage skeletons, in order.
    pub stages: Vec<StageTemplate>,
}

impl QuestTemplate {
    /// Returns true if `role` may offer this quest.
    #[must_use]
    pub fn offered_by(&self, role: &str) -> bool {
        self.giver_roles.is_empty() || self.giver_roles.iter().any(|r| r == role)
    }

    /// Returns true if `token` can be resolved for this template.
    #[must_use]
    pub fn knows_token(&self, token: &str) -> bool {
        BUILTIN_TOKENS.contains(&token)
            || self.bindings.contains_key(token)
            || token
                .strip_suffix("_id")
                .is_some_and(|binding| self.bindings.contains_key(binding))
    }

    fn check_text(&self, text: &str) -> GenerationResult<()> {
        for token in TemplateText::parse(text)?.tokens() {
            ensure(self.knows_token(token), || {
                format!("quest template {:?}: token {{{{{token}}}}} has no binding", self.id)
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> GenerationResult<()> {
        let id = &self.id;
        ensure(!id.is_empty(), || "quest template with empty id".to_string())?;
        ensure(self.level_range.min >= 1 && self.level_range.min <= self.level_range.max, || {
            format!("quest template {id:?}: invalid level range")
        })?;
        ensure(self.base_rewards.gold >= 0 && self.base_rewards.xp >= 0, || {
            format!("quest template {id:?}: negative base rewards")
        })?;
        ensure(!self.stages.is_empty(), || format!("quest template {id:?} has no stages"))?;

        self.check_text(&self.title)?;
        self.check_text(&self.description)?;

        let mut stage_ids = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            ensure(!stage_ids.contains(&&stage.id), || {
                format!("quest template {id:?}: duplicate stage {:?}", stage.id)
            })?;
            stage_ids.push(&stage.id);
            ensure_probability(stage.chance, &format!("quest template {id:?}: stage chance"))?;
            self.check_text(&stage.title)?;
            self.check_text(&stage.description)?;
            for objective in &stage.objectives {
                ensure(self.bindings.contains_key(&objective.target), || {
                    format!(
                        "quest template {id:?}: objective targets unknown binding {:?}",
                        objective.target
                    )
                })?;
                objective.count.validate(&format!("quest template {id:?}: objective count"))?;
                self.check_text(&objective.description)?;
            }
        }
        Ok(())
    }
}

/// Registry of quest templates.
#[derive(Clone, Debug, Default)]
pub struct QuestTemplates {
    templates: BTreeMap<String, QuestTemplate>,
}

impl QuestTemplates {
    /// Validates and indexes templates by id.
    ///
    /// # Errors
    ///
    /// [`GenerationError::InvalidTemplate`] or
    /// [`GenerationError::MalformedTemplate`] on invalid templates.
    pub fn init(templates: Vec<QuestTemplate>) -> GenerationResult<Self> {
        let mut indexed = BTreeMap::new();
        for template in templates {
            template.validate()?;
            let id = template.id.clone();
            ensure(indexed.insert(id.clone(), template).is_none(), || {
                format!("duplicate quest template {id:?}")
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
    pub fn get(&self, id: &str) -> GenerationResult<&QuestTemplate> {
        if self.templates.is_empty() {
            return Err(GenerationError::NotInitialized("quest templates"));
        }
        self.templates.get(id).ok_or_else(|| GenerationError::UnknownTemplate {
            kind: "quest",
            id: id.to_string(),
        })
    }

    /// Templates whose level range contains `level`, in id order.
    ///
    /// # Errors
    ///
    /// [`GenerationError::NotInitialized`] if empty.
    pub fn for_level(&self, level: u32) -> GenerationResult<Vec<&QuestTemplate>> {
        if self.templates.is_empty() {
            return Err(GenerationError::NotInitialized("quest templates"));
        }
        Ok(self
            .templates
            .values()
            .filter(|t| t.level_range.contains(level))
            .collect())
    }

    /// All templates, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &QuestTemplate> {
        self.templates.values()
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

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNTY: &str = r#"
        id = "bounty"
        quest_type = "bounty"
        title = "Wanted: {{target}}"
        description = "{{target}} was last seen near {{hideout}}. Pays {{gold}} gold."
        level_range = { min = 1, max = 10 }
        base_rewards = { gold = 100, xp = 50 }

        [bindings.target]
        kind = "enemy"
        tag = "outlaw"
        fallback = "a nameless outlaw"

        [bindings.hideout]
        kind = "location"
        fallback = "the badlands"

        [[stages]]
        id = "track"
        title = "Track {{target}}"
        description = "Ride out to {{hideout}}."
        objectives = [{ kind = "visit", description = "Reach {{hideout}}", target = "hideout" }]
    "#;

    fn bounty() -> QuestTemplate {
        toml::from_str(BOUNTY).unwrap()
    }

    #[test]
    fn test_parses_and_validates() {
        let template = bounty();
        assert_eq!(template.stages[0].objectives[0].count, CountRange::exactly(1));
        assert!((template.stages[0].chance - 1.0).abs() < f64::EPSILON);
        let quests = QuestTemplates::init(vec![template]).unwrap();
        assert_eq!(quests.for_level(5).unwrap().len(), 1);
        assert!(quests.for_level(11).unwrap().is_empty());
    }

    #[test]
    fn test_token_knowledge() {
        let template = bounty();
        assert!(template.knows_token("target"));
        assert!(template.knows_token("target_id"));
        assert!(template.knows_token("gold"));
        assert!(!template.knows_token("reward"));
    }

    #[test]
    fn test_unbound_token_is_rejected() {
        let mut template = bounty();
        template.title = "Find {{treasure}}".to_string();
        assert!(matches!(
            QuestTemplates::init(vec![template]),
            Err(GenerationError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_objective_must_target_binding() {
        let mut template = bounty();
        template.stages[0].objectives[0].target = "nowhere".to_string();
        assert!(QuestTemplates::init(vec![template]).is_err());
    }

    #[test]
    fn test_bad_level_range_is_rejected() {
        let mut template = bounty();
        template.level_range = LevelRange { min: 0, max: 3 };
        assert!(QuestTemplates::init(vec![template]).is_err());
    }
}
