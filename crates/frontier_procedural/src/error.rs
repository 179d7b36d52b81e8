//! # Generation Error Types
//!
//! All errors that can occur while loading templates or generating content.
//!
//! Searches that legitimately find nothing (no quest for this level, no
//! encounter for these filters, unique-name budget exhausted) are NOT
//! errors: they return `Ok(None)`.

use frontier_core::RandomError;
use thiserror::Error;

/// Errors that can occur in the generation system.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The random core rejected a draw (empty pool, bad weights, bad dice).
    #[error(transparent)]
    Random(#[from] RandomError),

    /// A generator was used before its registries were loaded.
    #[error("{0} is not initialized: load the template registry first")]
    NotInitialized(&'static str),

    /// Template id not present in its registry.
    #[error("unknown {kind} template: {id}")]
    UnknownTemplate {
        /// Registry the lookup ran against.
        kind: &'static str,
        /// The id that was requested.
        id: String,
    },

    /// No name pool registered for this origin.
    #[error("no name pool registered for origin: {0}")]
    UnknownOrigin(String),

    /// A `{{token}}` had no value to substitute.
    #[error("unresolved template token: {{{{{token}}}}}")]
    UnresolvedToken {
        /// The token name, without delimiters.
        token: String,
    },

    /// Template text with an unterminated or empty `{{` placeholder.
    #[error("malformed template text: {0:?}")]
    MalformedTemplate(String),

    /// A quest binding had no candidate entity and no fallback.
    #[error("quest template {template}: nothing can fill binding {binding:?}")]
    UnresolvableBinding {
        /// Quest template id.
        template: String,
        /// Binding name.
        binding: String,
    },

    /// A dialogue choice points at a node the tree does not contain.
    #[error("dialogue tree {tree}: node {node:?} links to missing node {target:?}")]
    DanglingChoice {
        /// Tree id.
        tree: String,
        /// Node holding the choice.
        node: String,
        /// The missing target id.
        target: String,
    },

    /// Template data failed load-time validation.
    #[error("invalid template data: {0}")]
    InvalidTemplate(String),

    /// Generator configuration failed validation.
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),

    /// Template or config TOML could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;
