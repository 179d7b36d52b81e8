//! Place naming pools for worlds, regions and locations.

use frontier_core::SeededRandom;
use serde::{Deserialize, Serialize};

use super::ensure;
use crate::error::GenerationResult;
use crate::substitution::{Substitutions, TemplateText};

/// Naming pools. Region and world patterns take a `{{root}}` token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceNames {
    /// First half of a location name, e.g. `Copper`.
    pub location_prefixes: Vec<String>,
    /// Second half of a location name, e.g. `Creek`.
    pub location_suffixes: Vec<String>,
    /// Region name roots.
    pub region_roots: Vec<String>,
    /// Region name patterns, e.g. `{{root}} Territory`.
    pub region_patterns: Vec<String>,
    /// World name roots.
    pub world_roots: Vec<String>,
    /// World name patterns, e.g. `The {{root}} Frontier`.
    pub world_patterns: Vec<String>,
}

impl PlaceNames {
    /// Builds a location name (two draws).
    ///
    /// # Errors
    ///
    /// Fails if the prefix or suffix pool is empty.
    pub fn location_name(&self, rng: &mut SeededRandom) -> GenerationResult<String> {
        let prefix = rng.pick(&self.location_prefixes)?;
        let suffix = rng.pick(&self.location_suffixes)?;
        Ok(format!("{prefix} {suffix}"))
    }

    /// Builds a region name (two draws).
    ///
    /// # Errors
    ///
    /// Fails if a pool is empty.
    pub fn region_name(&self, rng: &mut SeededRandom) -> GenerationResult<String> {
        Self::patterned(rng, &self.region_roots, &self.region_patterns)
    }

    /// Builds a world name (two draws).
    ///
    /// # Errors
    ///
    /// Fails if a pool is empty.
    pub fn world_name(&self, rng: &mut SeededRandom) -> GenerationResult<String> {
        Self::patterned(rng, &self.world_roots, &self.world_patterns)
    }

    fn patterned(rng: &mut SeededRandom, roots: &[String], patterns: &[String]) -> GenerationResult<String> {
        let root = rng.pick(roots)?;
        let pattern = rng.pick(patterns)?;
        TemplateText::parse(pattern)?.render(&Substitutions::new().with("root", root.as_str()))
    }

    pub(crate) fn validate(&self) -> GenerationResult<()> {
        for pattern in self.region_patterns.iter().chain(&self.world_patterns) {
            for token in TemplateText::parse(pattern)?.tokens() {
                ensure(token == "root", || {
                    format!("place pattern {pattern:?} uses unknown token {token:?}")
                })?;
            }
        }
        Ok(())
    }
}

impl Default for PlaceNames {
    fn default() -> Self {
        fn strings(values: &[&str]) -> Vec<String> {
            values.iter().map(|s| (*s).to_string()).collect()
        }

        Self {
            location_prefixes: strings(&["Dry", "Copper", "Red", "Dusty"]),
            location_suffixes: strings(&["Gulch", "Creek", "Mesa", "Springs"]),
            region_roots: strings(&["Sagebrush", "Ironwood", "Coyote"]),
            region_patterns: strings(&["{{root}} Territory", "{{root}} Basin"]),
            world_roots: strings(&["Western", "Untamed"]),
            world_patterns: strings(&["The {{root}} Frontier"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_fully_rendered() {
        let places = PlaceNames::default();
        let mut rng = SeededRandom::new(11);
        for _ in 0..20 {
            let region = places.region_name(&mut rng).unwrap();
            let world = places.world_name(&mut rng).unwrap();
            assert!(!region.contains("{{") && !world.contains("{{"));
            assert!(places.location_name(&mut rng).unwrap().contains(' '));
        }
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        let places = PlaceNames {
            location_prefixes: Vec::new(),
            ..PlaceNames::default()
        };
        assert!(places.location_name(&mut SeededRandom::new(1)).is_err());
    }

    #[test]
    fn test_validate_rejects_foreign_tokens() {
        let places = PlaceNames {
            world_patterns: vec!["{{name}} Land".to_string()],
            ..PlaceNames::default()
        };
        assert!(places.validate().is_err());
    }
}
