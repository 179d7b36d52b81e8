//! Name pools, keyed by cultural origin.

use std::collections::BTreeMap;

use frontier_core::SeededRandom;
use serde::{Deserialize, Serialize};

use super::{default_weight, ensure, ensure_probability, ensure_weight};
use crate::error::{GenerationError, GenerationResult};

/// Gender of a generated person.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Neutral / unspecified.
    Neutral,
}

impl Gender {
    /// All genders, in draw order.
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::Neutral];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Neutral => "neutral",
        }
    }
}

/// Relative weights for drawing a gender.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenderWeights {
    /// Weight of [`Gender::Male`].
    pub male: f64,
    /// Weight of [`Gender::Female`].
    pub female: f64,
    /// Weight of [`Gender::Neutral`].
    pub neutral: f64,
}

impl GenderWeights {
    /// Weight of `gender`.
    #[must_use]
    pub const fn weight(&self, gender: Gender) -> f64 {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
            Gender::Neutral => self.neutral,
        }
    }

    /// Genders with a non-zero weight, in draw order.
    pub fn drawable(&self) -> impl Iterator<Item = Gender> + '_ {
        Gender::ALL.into_iter().filter(|g| self.weight(*g) > 0.0)
    }

    /// Draws a gender (one draw).
    ///
    /// # Errors
    ///
    /// Fails if every weight is zero.
    pub fn draw(&self, rng: &mut SeededRandom) -> GenerationResult<Gender> {
        let gender = rng.weighted_pick(&Gender::ALL, &[self.male, self.female, self.neutral])?;
        Ok(*gender)
    }

    fn validate(&self, what: &str) -> GenerationResult<()> {
        let weights = [self.male, self.female, self.neutral];
        ensure(
            weights.iter().all(|w| w.is_finite() && *w >= 0.0) && weights.iter().sum::<f64>() > 0.0,
            || format!("{what}: gender weights must be non-negative with a positive total"),
        )
    }
}

impl Default for GenderWeights {
    fn default() -> Self {
        Self {
            male: 0.49,
            female: 0.49,
            neutral: 0.02,
        }
    }
}

/// A name component with a selection weight.
///
/// Deserializes from either a bare string (weight 1) or
/// `{ value = "...", weight = 2.0 }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "WeightedNameRepr")]
pub struct WeightedName {
    /// The name text.
    pub value: String,
    /// Selection weight.
    pub weight: f64,
}

impl WeightedName {
    /// Creates a weighted name.
    #[must_use]
    pub fn new(value: impl Into<String>, weight: f64) -> Self {
        Self {
            value: value.into(),
            weight,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WeightedNameRepr {
    Plain(String),
    Weighted {
        value: String,
        #[serde(default = "default_weight")]
        weight: f64,
    },
}

impl From<WeightedNameRepr> for WeightedName {
    fn from(repr: WeightedNameRepr) -> Self {
        match repr {
            WeightedNameRepr::Plain(value) => Self { value, weight: 1.0 },
            WeightedNameRepr::Weighted { value, weight } => Self { value, weight },
        }
    }
}

/// First names split by gender.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirstNames {
    /// Male first names.
    pub male: Vec<WeightedName>,
    /// Female first names.
    pub female: Vec<WeightedName>,
    /// Neutral first names. When empty, neutral draws use male and female.
    pub neutral: Vec<WeightedName>,
}

impl FirstNames {
    /// Candidate first names for `gender`.
    #[must_use]
    pub fn for_gender(&self, gender: Gender) -> Vec<&WeightedName> {
        match gender {
            Gender::Male => self.male.iter().collect(),
            Gender::Female => self.female.iter().collect(),
            Gender::Neutral if self.neutral.is_empty() => {
                self.male.iter().chain(self.female.iter()).collect()
            }
            Gender::Neutral => self.neutral.iter().collect(),
        }
    }
}

/// Origin + weight pair used by weighted-origin name generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OriginWeight {
    /// Origin key.
    pub origin: String,
    /// Selection weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl OriginWeight {
    /// Creates an origin weight.
    #[must_use]
    pub fn new(origin: impl Into<String>, weight: f64) -> Self {
        Self {
            origin: origin.into(),
            weight,
        }
    }
}

/// All name components for one origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamePool {
    /// Origin key, e.g. `frontier_anglo`.
    pub origin: String,
    /// Gender distribution for this origin.
    #[serde(default)]
    pub gender_weights: GenderWeights,
    /// First names by gender.
    #[serde(default)]
    pub first_names: FirstNames,
    /// Family names.
    pub last_names: Vec<WeightedName>,
    /// Nicknames, rendered in quotes between first and last name.
    #[serde(default)]
    pub nicknames: Vec<WeightedName>,
    /// Titles prefixed to the full name.
    #[serde(default)]
    pub titles: Vec<WeightedName>,
    /// Chance of a nickname when the caller allows one.
    #[serde(default)]
    pub nickname_chance: f64,
    /// Chance of a title when the caller allows one.
    #[serde(default)]
    pub title_chance: f64,
}

impl NamePool {
    fn validate(&self) -> GenerationResult<()> {
        let origin = &self.origin;
        ensure(!origin.is_empty(), || "name pool with empty origin".to_string())?;
        self.gender_weights.validate(origin)?;
        ensure(!self.last_names.is_empty(), || format!("{origin}: no last names"))?;
        for gender in self.gender_weights.drawable() {
            ensure(!self.first_names.for_gender(gender).is_empty(), || {
                format!("{origin}: gender {} is drawable but has no first names", gender.as_str())
            })?;
        }
        let components = self
            .first_names
            .male
            .iter()
            .chain(&self.first_names.female)
            .chain(&self.first_names.neutral)
            .chain(&self.last_names)
            .chain(&self.nicknames)
            .chain(&self.titles);
        for name in components {
            ensure(!name.value.trim().is_empty(), || format!("{origin}: empty name component"))?;
            ensure_weight(name.weight, &format!("{origin}: weight of {:?}", name.value))?;
        }
        ensure_probability(self.nickname_chance, &format!("{origin}: nickname_chance"))?;
        ensure_probability(self.title_chance, &format!("{origin}: title_chance"))
    }
}

/// Registry of name pools.
#[derive(Clone, Debug, Default)]
pub struct NamePools {
    pools: BTreeMap<String, NamePool>,
}

impl NamePools {
    /// Validates and indexes pools by origin.
    ///
    /// # Errors
    ///
    /// [`GenerationError::InvalidTemplate`] on invalid pools or duplicate origins.
    pub fn init(pools: Vec<NamePool>) -> GenerationResult<Self> {
        let mut indexed = BTreeMap::new();
        for pool in pools {
            pool.validate()?;
            let origin = pool.origin.clone();
            ensure(indexed.insert(origin.clone(), pool).is_none(), || {
                format!("duplicate name pool origin {origin:?}")
            })?;
        }
        Ok(Self { pools: indexed })
    }

    /// Looks up the pool for `origin`.
    ///
    /// # Errors
    ///
    /// [`GenerationError::NotInitialized`] if no pools are loaded,
    /// [`GenerationError::UnknownOrigin`] if this origin has none.
    pub fn get(&self, origin: &str) -> GenerationResult<&NamePool> {
        if self.pools.is_empty() {
            return Err(GenerationError::NotInitialized("name pools"));
        }
        self.pools
            .get(origin)
            .ok_or_else(|| GenerationError::UnknownOrigin(origin.to_string()))
    }

    /// Returns true if a pool exists for `origin`.
    #[must_use]
    pub fn contains(&self, origin: &str) -> bool {
        self.pools.contains_key(origin)
    }

    /// Registered origins, sorted.
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }

    /// Number of pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Returns true if no pools are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(origin: &str) -> NamePool {
        NamePool {
            origin: origin.to_string(),
            gender_weights: GenderWeights::default(),
            first_names: FirstNames {
                male: vec![WeightedName::new("Wyatt", 1.0)],
                female: vec![WeightedName::new("Clara", 1.0)],
                neutral: Vec::new(),
            },
            last_names: vec![WeightedName::new("Carter", 1.0)],
            nicknames: Vec::new(),
            titles: Vec::new(),
            nickname_chance: 0.0,
            title_chance: 0.0,
        }
    }

    #[test]
    fn test_weighted_name_accepts_both_forms() {
        let parsed: FirstNames =
            toml::from_str(r#"male = ["Wyatt", { value = "Jesse", weight = 2.5 }]"#).unwrap();
        assert_eq!(parsed.male[0], WeightedName::new("Wyatt", 1.0));
        assert_eq!(parsed.male[1], WeightedName::new("Jesse", 2.5));
    }

    #[test]
    fn test_neutral_falls_back_to_gendered_names() {
        let names = pool("a").first_names;
        let neutral: Vec<_> = names.for_gender(Gender::Neutral).iter().map(|n| n.value.as_str()).collect();
        assert_eq!(neutral, vec!["Wyatt", "Clara"]);
    }

    #[test]
    fn test_lookup_errors() {
        assert!(matches!(NamePools::default().get("a"), Err(GenerationError::NotInitialized(_))));

        let pools = NamePools::init(vec![pool("a")]).unwrap();
        assert!(pools.get("a").is_ok());
        assert!(matches!(pools.get("b"), Err(GenerationError::UnknownOrigin(o)) if o == "b"));
    }

    #[test]
    fn test_init_rejects_bad_pools() {
        assert!(NamePools::init(vec![pool("a"), pool("a")]).is_err());

        let mut no_last = pool("a");
        no_last.last_names.clear();
        assert!(NamePools::init(vec![no_last]).is_err());

        let mut bad_chance = pool("a");
        bad_chance.title_chance = 1.5;
        assert!(NamePools::init(vec![bad_chance]).is_err());

        let mut no_women = pool("a");
        no_women.first_names.female.clear();
        assert!(NamePools::init(vec![no_women]).is_err());
    }

    #[test]
    fn test_gender_draw_respects_zero_weights() {
        let weights = GenderWeights {
            male: 0.0,
            female: 1.0,
            neutral: 0.0,
        };
        let mut rng = SeededRandom::new(3);
        for _ in 0..50 {
            assert_eq!(weights.draw(&mut rng).unwrap(), Gender::Female);
        }
    }
}
