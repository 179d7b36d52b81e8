//! # Template Substitution
//!
//! Explicit `{{token}}` -> value substitution.
//!
//! Text is first parsed into literal and token segments, then rendered
//! against a [`Substitutions`] table. Rendering fails on any token the
//! table cannot resolve, and the output is checked once more for residual
//! `{{` sequences, so a successful render never leaks a placeholder.

use std::collections::BTreeMap;

use crate::error::{GenerationError, GenerationResult};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// One piece of parsed template text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Token(&'a str),
}

/// Template text split into literal and token segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateText<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> TemplateText<'a> {
    /// Parses `text`, trimming whitespace inside each `{{ token }}`.
    ///
    /// # Errors
    ///
    /// [`GenerationError::MalformedTemplate`] for an unterminated `{{`,
    /// an empty token, or a token containing `{{`.
    pub fn parse(text: &'a str) -> GenerationResult<Self> {
        let mut segments = Vec::new();
        let mut rest = text;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(&rest[..start]));
            }
            let after_open = &rest[start + OPEN.len()..];
            let end = after_open
                .find(CLOSE)
                .ok_or_else(|| GenerationError::MalformedTemplate(text.to_string()))?;
            let token = after_open[..end].trim();
            if token.is_empty() || token.contains(OPEN) {
                return Err(GenerationError::MalformedTemplate(text.to_string()));
            }
            segments.push(Segment::Token(token));
            rest = &after_open[end + CLOSE.len()..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }

        Ok(Self { segments })
    }

    /// Token names in order of appearance (duplicates included).
    pub fn tokens(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Token(token) => Some(*token),
            Segment::Literal(_) => None,
        })
    }

    /// Returns true if the text contains no tokens.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.tokens().next().is_none()
    }

    /// Renders the text, resolving every token.
    ///
    /// # Errors
    ///
    /// [`GenerationError::UnresolvedToken`] for the first token with no value;
    /// [`GenerationError::MalformedTemplate`] if a substituted value
    /// reintroduced a `{{` sequence.
    pub fn render(&self, values: &Substitutions) -> GenerationResult<String> {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Token(token) => {
                    let value = values.get(token).ok_or_else(|| GenerationError::UnresolvedToken {
                        token: (*token).to_string(),
                    })?;
                    output.push_str(value);
                }
            }
        }

        if output.contains(OPEN) {
            return Err(GenerationError::MalformedTemplate(output));
        }
        Ok(output)
    }
}

/// Token -> value table used for rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitutions {
    values: BTreeMap<String, String>,
}

impl Substitutions {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, replacing any previous one.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.values.insert(token.into(), value.into());
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(token, value);
        self
    }

    /// Looks up a token.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    /// Returns true if `token` has a value.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.values.contains_key(token)
    }
}

/// Parses and renders `text` in one step.
///
/// # Errors
///
/// See [`TemplateText::parse`] and [`TemplateText::render`].
pub fn substitute(text: &str, values: &Substitutions) -> GenerationResult<String> {
    TemplateText::parse(text)?.render(values)
}

/// Returns true if `text` still contains an opening placeholder delimiter.
#[must_use]
pub fn has_placeholder(text: &str) -> bool {
    text.contains(OPEN)
}
