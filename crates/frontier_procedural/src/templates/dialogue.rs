//! Dialogue snippets and choice prompts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ensure;
use crate::error::GenerationResult;
use crate::substitution::TemplateText;

/// Which part of a conversation a snippet fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnippetCategory {
    /// Opening line.
    Greeting,
    /// Local gossip.
    Rumor,
    /// Shopkeeper pitch.
    Shop,
    /// Lead-in to a quest offer.
    QuestHook,
    /// Idle chatter.
    SmallTalk,
    /// Closing line.
    Farewell,
}

/// A bound on one personality trait.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitCondition {
    /// Trait name.
    #[serde(rename = "trait")]
    pub trait_name: String,
    /// Minimum value, inclusive.
    #[serde(default)]
    pub min: Option<i32>,
    /// Maximum value, inclusive.
    #[serde(default)]
    pub max: Option<i32>,
}

impl TraitCondition {
    /// Checks the condition. A missing trait counts as 50.
    #[must_use]
    pub fn matches(&self, traits: &BTreeMap<String, i32>) -> bool {
        let value = traits.get(&self.trait_name).copied().unwrap_or(50);
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// One line of dialogue.
///
/// Text may use `{{name}}`, `{{role}}`, `{{location}}` and `{{shop_type}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueSnippet {
    /// Snippet id.
    pub id: String,
    /// Conversation slot.
    pub category: SnippetCategory,
    /// Line text.
    pub text: String,
    /// Roles that may say this. Empty means every role.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Tone tags, e.g. `hostile` or `warm`.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Personality conditions, all of which must hold.
    #[serde(default)]
    pub conditions: Vec<TraitCondition>,
}

impl DialogueSnippet {
    /// Tokens a snippet may reference.
    pub const TOKENS: [&'static str; 4] = ["name", "role", "location", "shop_type"];

    /// Returns true if `role` may say this line.
    #[must_use]
    pub fn applies_to(&self, role: &str) -> bool {
        self.roles.is_empty() || self.roles.iter().any(|r| r == role)
    }

    /// Returns true if the snippet carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    fn validate(&self) -> GenerationResult<()> {
        ensure(!self.id.is_empty(), || "dialogue snippet with empty id".to_string())?;
        ensure(!self.text.trim().is_empty(), || format!("dialogue snippet {:?} has no text", self.id))?;
        for token in TemplateText::parse(&self.text)?.tokens() {
            ensure(Self::TOKENS.contains(&token), || {
                format!("dialogue snippet {:?} uses unknown token {token:?}", self.id)
            })?;
        }
        Ok(())
    }
}

/// Player-facing labels for generated choices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptLabels {
    /// Asks for rumors.
    pub rumors: String,
    /// Opens the shop.
    pub shop: String,
    /// Asks about work.
    pub quest: String,
    /// Starts idle chatter.
    pub small_talk: String,
    /// Accepts a quest.
    pub accept: String,
    /// Returns to the opening node.
    pub back: String,
    /// Ends the conversation.
    pub goodbye: String,
}

impl Default for PromptLabels {
    fn default() -> Self {
        Self {
            rumors: "Heard any news?".to_string(),
            shop: "Let's see what you're selling.".to_string(),
            quest: "Got any work?".to_string(),
            small_talk: "How are things?".to_string(),
            accept: "I'll do it.".to_string(),
            back: "Something else.".to_string(),
            goodbye: "Goodbye.".to_string(),
        }
    }
}

/// Registry of dialogue snippets, grouped by category.
#[derive(Clone, Debug, Default)]
pub struct DialogueTemplates {
    snippets: BTreeMap<SnippetCategory, Vec<DialogueSnippet>>,
    prompts: PromptLabels,
}

impl DialogueTemplates {
    /// Validates and groups snippets.
    ///
    /// # Errors
    ///
    /// [`crate::GenerationError::InvalidTemplate`] on invalid or duplicate snippets.
    pub fn init(snippets: Vec<DialogueSnippet>, prompts: PromptLabels) -> GenerationResult<Self> {
        let mut grouped: BTreeMap<SnippetCategory, Vec<DialogueSnippet>> = BTreeMap::new();
        let mut seen = Vec::with_capacity(snippets.len());
        for snippet in snippets {
            snippet.validate()?;
            ensure(!seen.contains(&snippet.id), || {
                format!("duplicate dialogue snippet {:?}", snippet.id)
            })?;
            seen.push(snippet.id.clone());
            grouped.entry(snippet.category).or_default().push(snippet);
        }
        Ok(Self {
            snippets: grouped,
            prompts,
        })
    }

    /// Snippets of one category, in load order.
    #[must_use]
    pub fn category(&self, category: SnippetCategory) -> &[DialogueSnippet] {
        self.snippets.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Choice labels.
    #[must_use]
    pub fn prompts(&self) -> &PromptLabels {
        &self.prompts
    }

    /// Total number of snippets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snippets.values().map(Vec::len).sum()
    }

    /// Returns true if no snippets are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(id: &str, category: SnippetCategory, text: &str) -> DialogueSnippet {
        DialogueSnippet {
            id: id.to_string(),
            category,
            text: text.to_string(),
            roles: Vec::new(),
            tags: Vec::new(),
            conditions: Vec::new(),
        }
    }

    #[test]
    fn test_trait_condition() {
        let condition = TraitCondition {
            trait_name: "friendliness".into(),
            min: Some(60),
            max: None,
        };
        let friendly = BTreeMap::from([("friendliness".to_string(), 75)]);
        let surly = BTreeMap::from([("friendliness".to_string(), 20)]);
        assert!(condition.matches(&friendly));
        assert!(!condition.matches(&surly));
        assert!(!condition.matches(&BTreeMap::new()));
    }

    #[test]
    fn test_grouping_by_category() {
        let templates = DialogueTemplates::init(
            vec![
                snippet("g1", SnippetCategory::Greeting, "Howdy."),
                snippet("r1", SnippetCategory::Rumor, "Trouble at {{location}}."),
                snippet("g2", SnippetCategory::Greeting, "Evening, stranger."),
            ],
            PromptLabels::default(),
        )
        .unwrap();
        assert_eq!(templates.category(SnippetCategory::Greeting).len(), 2);
        assert!(templates.category(SnippetCategory::Shop).is_empty());
        assert_eq!(templates.len(), 3);
    }

    #[test]
    fn test_rejects_unknown_tokens_and_duplicates() {
        let bad = snippet("x", SnippetCategory::Greeting, "Hi {{stranger}}");
        assert!(DialogueTemplates::init(vec![bad], PromptLabels::default()).is_err());

        let dupes = vec![
            snippet("x", SnippetCategory::Greeting, "Hi."),
            snippet("x", SnippetCategory::Farewell, "Bye."),
        ];
        assert!(DialogueTemplates::init(dupes, PromptLabels::default()).is_err());
    }
}
