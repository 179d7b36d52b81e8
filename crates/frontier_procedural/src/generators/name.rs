//! Name generation from origin pools.

use std::collections::BTreeSet;

use frontier_core::SeededRandom;
use serde::{Deserialize, Serialize};

use crate::error::GenerationResult;
use crate::templates::{Gender, NamePool, NamePools, OriginWeight};

/// A generated personal name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneratedName {
    /// Assembled display name.
    pub full_name: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Origin the pool was drawn from.
    pub origin: String,
    /// Gender the first name was drawn for.
    pub gender: Gender,
    /// Nickname, if one was drawn.
    pub nickname: Option<String>,
    /// Title, if one was drawn.
    pub title: Option<String>,
}

/// Per-call name options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NameOptions {
    /// Pins the gender instead of drawing it.
    pub gender: Option<Gender>,
    /// Allows a nickname when the pool has any.
    pub allow_nickname: bool,
    /// Allows a title when the pool has any.
    pub allow_title: bool,
}

impl NameOptions {
    /// Pins the gender.
    #[must_use]
    pub const fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Plain first + last names only.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            gender: None,
            allow_nickname: false,
            allow_title: false,
        }
    }
}

impl Default for NameOptions {
    fn default() -> Self {
        Self {
            gender: None,
            allow_nickname: true,
            allow_title: true,
        }
    }
}

/// Case-insensitive set of names already handed out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedNames {
    names: BTreeSet<String>,
}

impl UsedNames {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `name` (any case) is taken.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    /// Records `name`. Returns false if it was already taken.
    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(name.to_lowercase())
    }

    /// Number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no names are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for UsedNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut used = Self::new();
        for name in iter {
            used.insert(name.as_ref());
        }
        used
    }
}

/// Draws names from registered pools.
#[derive(Clone, Copy, Debug)]
pub struct NameGenerator<'a> {
    pools: &'a NamePools,
}

impl<'a> NameGenerator<'a> {
    /// Creates a generator over `pools`.
    #[must_use]
    pub const fn new(pools: &'a NamePools) -> Self {
        Self { pools }
    }

    /// Generates a name for `origin`.
    ///
    /// Draw order: gender (skipped when pinned), first name, last name,
    /// nickname chance + nickname, title chance + title. The nickname and
    /// title steps draw nothing when disallowed or when the pool has none.
    ///
    /// # Errors
    ///
    /// [`crate::GenerationError::UnknownOrigin`] for an unregistered origin.
    pub fn generate(
        &self,
        rng: &mut SeededRandom,
        origin: &str,
        options: NameOptions,
    ) -> GenerationResult<GeneratedName> {
        let pool = self.pools.get(origin)?;
        Self::from_pool(rng, pool, options)
    }

    /// Picks the origin from `origins` (one draw), then generates.
    ///
    /// # Errors
    ///
    /// Fails on an empty or zero-weight origin list, or an unknown origin.
    pub fn generate_weighted(
        &self,
        rng: &mut SeededRandom,
        origins: &[OriginWeight],
        options: NameOptions,
    ) -> GenerationResult<GeneratedName> {
        let origin = rng.weighted_pick_by(origins, |o| o.weight)?;
        self.generate(rng, &origin.origin, options)
    }

    /// Generates a name not already in `used`, recording it on success.
    ///
    /// Returns `Ok(None)` after `max_attempts` collisions.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate`].
    pub fn generate_unique(
        &self,
        rng: &mut SeededRandom,
        origin: &str,
        options: NameOptions,
        used: &mut UsedNames,
        max_attempts: u32,
    ) -> GenerationResult<Option<GeneratedName>> {
        let pool = self.pools.get(origin)?;
        Self::unique_by(used, max_attempts, || Self::from_pool(rng, pool, options))
    }

    /// [`Self::generate_unique`] with the origin drawn on every attempt.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate_weighted`].
    pub fn generate_unique_weighted(
        &self,
        rng: &mut SeededRandom,
        origins: &[OriginWeight],
        options: NameOptions,
        used: &mut UsedNames,
        max_attempts: u32,
    ) -> GenerationResult<Option<GeneratedName>> {
        Self::unique_by(used, max_attempts, || self.generate_weighted(rng, origins, options))
    }

    fn unique_by<F>(used: &mut UsedNames, max_attempts: u32, mut attempt: F) -> GenerationResult<Option<GeneratedName>>
    where
        F: FnMut() -> GenerationResult<GeneratedName>,
    {
        for _ in 0..max_attempts {
            let name = attempt()?;
            if used.insert(&name.full_name) {
                return Ok(Some(name));
            }
        }
        tracing::warn!(max_attempts, taken = used.len(), "unique name search exhausted");
        Ok(None)
    }

    fn from_pool(rng: &mut SeededRandom, pool: &NamePool, options: NameOptions) -> GenerationResult<GeneratedName> {
        let gender = match options.gender {
            Some(gender) => gender,
            None => pool.gender_weights.draw(rng)?,
        };

        let first_candidates = pool.first_names.for_gender(gender);
        let first_name = rng.weighted_pick_by(&first_candidates, |n| n.weight)?.value.clone();
        let last_name = rng.weighted_pick_by(&pool.last_names, |n| n.weight)?.value.clone();

        let nickname = if options.allow_nickname && !pool.nicknames.is_empty() && rng.bool(pool.nickname_chance) {
            Some(rng.weighted_pick_by(&pool.nicknames, |n| n.weight)?.value.clone())
        } else {
            None
        };
        let title = if options.allow_title && !pool.titles.is_empty() && rng.bool(pool.title_chance) {
            Some(rng.weighted_pick_by(&pool.titles, |n| n.weight)?.value.clone())
        } else {
            None
        };

        let mut full_name = String::new();
        if let Some(title) = &title {
            full_name.push_str(title);
            full_name.push(' ');
        }
        full_name.push_str(&first_name);
        if let Some(nickname) = &nickname {
            full_name.push_str(" \"");
            full_name.push_str(nickname);
            full_name.push('"');
        }
        full_name.push(' ');
        full_name.push_str(&last_name);

        Ok(GeneratedName {
            full_name,
            first_name,
            last_name,
            origin: pool.origin.clone(),
            gender,
            nickname,
            title,
        })
    }
}
