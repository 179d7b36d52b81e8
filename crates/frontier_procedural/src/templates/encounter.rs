//! Encounter templates: enemy groups, difficulty and where/when they apply.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{default_weight, ensure, ensure_weight, CountRange};
use crate::error::{GenerationError, GenerationResult};

/// Ceiling for an enemy's base health, health variance, xp and gold.
pub const MAX_ENEMY_STAT: i64 = 1_000_000;

/// Rough danger rating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// A nuisance.
    Easy,
    /// A real fight.
    Medium,
    /// Likely to hurt.
    Hard,
    /// Run.
    Deadly,
}

/// Coarse time of day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// 05:00-07:59.
    Dawn,
    /// 08:00-16:59.
    Day,
    /// 17:00-19:59.
    Dusk,
    /// 20:00-04:59.
    Night,
}

impl TimeOfDay {
    /// Maps an hour (wrapped into 0-23) to a time of day.
    #[must_use]
    pub const fn from_hour(hour: u8) -> Self {
        match hour % 24 {
            5..=7 => Self::Dawn,
            8..=16 => Self::Day,
            17..=19 => Self::Dusk,
            _ => Self::Night,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dawn => "dawn",
            Self::Day => "day",
            Self::Dusk => "dusk",
            Self::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One enemy type in an encounter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyEntry {
    /// Enemy type key, e.g. `outlaw`.
    pub enemy_type: String,
    /// Display name.
    pub name: String,
    /// How many appear.
    pub count: CountRange,
    /// Max health at level 1.
    pub base_health: i64,
    /// Per-enemy health jitter, `+/-` this much.
    #[serde(default)]
    pub health_variance: i64,
    /// Experience per enemy at level 1.
    #[serde(default)]
    pub xp: i64,
    /// Gold per enemy at level 1.
    #[serde(default)]
    pub gold: i64,
}

/// Template for one encounter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncounterTemplate {
    /// Template id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Flavor text.
    pub description: String,
    /// Danger rating.
    pub difficulty: Difficulty,
    /// Relative selection weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Biomes this encounter can occur in. Empty means everywhere.
    #[serde(default)]
    pub valid_biomes: Vec<String>,
    /// Times of day this encounter can occur at. Empty means any time.
    #[serde(default)]
    pub valid_time_of_day: Vec<TimeOfDay>,
    /// Enemy groups, in order.
    pub enemies: Vec<EnemyEntry>,
}

impl EncounterTemplate {
    /// Returns true if the encounter can occur in `biome`.
    #[must_use]
    pub fn valid_for_biome(&self, biome: &str) -> bool {
        self.valid_biomes.is_empty() || self.valid_biomes.iter().any(|b| b == biome)
    }

    /// Returns true if the encounter can occur at `time`.
    #[must_use]
    pub fn valid_for_time(&self, time: TimeOfDay) -> bool {
        self.valid_time_of_day.is_empty() || self.valid_time_of_day.contains(&time)
    }

    fn validate(&self) -> GenerationResult<()> {
        let id = &self.id;
        ensure(!id.is_empty(), || "encounter template with empty id".to_string())?;
        ensure(!self.enemies.is_empty(), || format!("encounter {id:?} has no enemies"))?;
        ensure_weight(self.weight, &format!("encounter {id:?}: weight"))?;
        for enemy in &self.enemies {
            enemy.count.validate(&format!("encounter {id:?}: {} count", enemy.enemy_type))?;
            ensure(enemy.base_health > 0, || {
                format!("encounter {id:?}: {} needs positive base health", enemy.enemy_type)
            })?;
            ensure(
                enemy.health_variance >= 0 && enemy.xp >= 0 && enemy.gold >= 0,
                || format!("encounter {id:?}: {} has negative values", enemy.enemy_type),
            )?;
            ensure(
                [enemy.base_health, enemy.health_variance, enemy.xp, enemy.gold]
                    .iter()
                    .all(|v| *v <= MAX_ENEMY_STAT),
                || format!("encounter {id:?}: {} exceeds {MAX_ENEMY_STAT}", enemy.enemy_type),
            )?;
        }
        Ok(())
    }
}

/// Registry of encounter templates.
#[derive(Clone, Debug, Default)]
pub struct EncounterTemplates {
    templates: BTreeMap<String, EncounterTemplate>,
}

impl EncounterTemplates {
    /// Validates and indexes templates by id.
    ///
    /// # Errors
    ///
    /// [`GenerationError::InvalidTemplate`] on invalid data or duplicate ids.
    pub fn init(templates: Vec<EncounterTemplate>) -> GenerationResult<Self> {
        let mut indexed = BTreeMap::new();
        for template in templates {
            template.validate()?;
            let id = template.id.clone();
            ensure(indexed.insert(id.clone(), template).is_none(), || {
                format!("duplicate encounter template {id:?}")
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
    pub fn get(&self, id: &str) -> GenerationResult<&EncounterTemplate> {
        if self.templates.is_empty() {
            return Err(GenerationError::NotInitialized("encounter templates"));
        }
        self.templates.get(id).ok_or_else(|| GenerationError::UnknownTemplate {
            kind: "encounter",
            id: id.to_string(),
        })
    }

    /// All templates, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &EncounterTemplate> {
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

    #[test]
    fn test_time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::from_hour(7), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::from_hour(8), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Dusk);
        assert_eq!(TimeOfDay::from_hour(19), TimeOfDay::Dusk);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(29), TimeOfDay::Dawn);
    }

    #[test]
    fn test_empty_filters_mean_everywhere() {
        let template: EncounterTemplate = toml::from_str(
            r#"
            id = "coyotes"
            name = "Coyote Pack"
            description = "Yipping in the brush."
            difficulty = "easy"
            enemies = [{ enemy_type = "coyote", name = "Coyote", count = { min = 2, max = 4 }, base_health = 12 }]
            "#,
        )
        .unwrap();
        assert!(template.valid_for_biome("desert"));
        assert!(template.valid_for_biome("anything"));
        assert!(template.valid_for_time(TimeOfDay::Night));
    }

    #[test]
    fn test_init_rejects_invalid_enemies() {
        let template = EncounterTemplate {
            id: "ghosts".into(),
            name: "Ghosts".into(),
            description: String::new(),
            difficulty: Difficulty::Hard,
            weight: 1.0,
            valid_biomes: Vec::new(),
            valid_time_of_day: vec![TimeOfDay::Night],
            enemies: vec![EnemyEntry {
                enemy_type: "ghost".into(),
                name: "Ghost".into(),
                count: CountRange::new(3, 1),
                base_health: 10,
                health_variance: 0,
                xp: 5,
                gold: 0,
            }],
        };
        assert!(EncounterTemplates::init(vec![template]).is_err());
    }

    #[test]
    fn test_init_rejects_oversized_stats() {
        let entry = |base_health, health_variance| EnemyEntry {
            enemy_type: "giant".into(),
            name: "Giant".into(),
            count: CountRange::new(1, 1),
            base_health,
            health_variance,
            xp: 0,
            gold: 0,
        };
        let template = |enemy| EncounterTemplate {
            id: "giants".into(),
            name: "Giants".into(),
            description: String::new(),
            difficulty: Difficulty::Deadly,
            weight: 1.0,
            valid_biomes: Vec::new(),
            valid_time_of_day: Vec::new(),
            enemies: vec![enemy],
        };
        assert!(EncounterTemplates::init(vec![template(entry(MAX_ENEMY_STAT, MAX_ENEMY_STAT))]).is_ok());
        assert!(matches!(
            EncounterTemplates::init(vec![template(entry(i64::MAX, 0))]),
            Err(GenerationError::InvalidTemplate(_))
        ));
        assert!(matches!(
            EncounterTemplates::init(vec![template(entry(10, i64::MAX))]),
            Err(GenerationError::InvalidTemplate(_))
        ));
    }
}
