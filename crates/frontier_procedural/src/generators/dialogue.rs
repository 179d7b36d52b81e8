//! Dialogue tree generation.
//!
//! Trees are small graphs rooted at [`ROOT_NODE`]. The greeting opens the
//! root; optional branches (rumors, shop, quest, small talk) hang off it
//! and lead back to the root or end the conversation. Shop and quest
//! branches exist only when the NPC can actually trade or offer work.

use std::collections::BTreeMap;

use frontier_core::SeededRandom;
use serde::{Deserialize, Serialize};

use super::npc::GeneratedNpc;
use crate::context::GenerationContext;
use crate::error::{GenerationError, GenerationResult};
use crate::substitution::{Substitutions, TemplateText};
use crate::templates::{DialogueSnippet, DialogueTemplates, PromptLabels, SnippetCategory};

/// Id of the opening node.
pub const ROOT_NODE: &str = "root";
/// Id of the rumor branch.
pub const RUMORS_NODE: &str = "rumors";
/// Id of the shop branch.
pub const SHOP_NODE: &str = "shop";
/// Id of the quest branch.
pub const QUEST_NODE: &str = "quest";
/// Id of the small-talk branch.
pub const SMALL_TALK_NODE: &str = "small_talk";

/// Friendliness at or above which hostile lines are dropped.
pub const FRIENDLY_THRESHOLD: i32 = 70;
/// Friendliness at or below which warm lines are dropped.
pub const UNFRIENDLY_THRESHOLD: i32 = 30;

/// Side effect a host applies when a choice is taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueAction {
    /// Open the NPC's shop.
    OpenShop,
    /// Offer one of the NPC's quests.
    OfferQuest,
}

/// A player choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueChoice {
    /// Label shown to the player.
    pub text: String,
    /// Next node, or `None` to end the conversation.
    pub next_node_id: Option<String>,
    /// Effect to apply.
    pub action: Option<DialogueAction>,
}

impl DialogueChoice {
    fn to(text: &str, next: &str) -> Self {
        Self {
            text: text.to_string(),
            next_node_id: Some(next.to_string()),
            action: None,
        }
    }

    fn end(text: &str) -> Self {
        Self {
            text: text.to_string(),
            next_node_id: None,
            action: None,
        }
    }

    fn with_action(mut self, action: DialogueAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// One node of a tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueNode {
    /// Node id.
    pub id: String,
    /// Speaker's display name.
    pub speaker: String,
    /// Rendered line.
    pub text: String,
    /// Choices, in display order.
    pub choices: Vec<DialogueChoice>,
}

/// A generated conversation graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueTree {
    /// Tree id.
    pub id: String,
    /// NPC the tree belongs to.
    pub npc_id: String,
    /// Entry node id.
    pub root: String,
    /// Nodes by id.
    pub nodes: BTreeMap<String, DialogueNode>,
    /// Parting line for when the conversation ends.
    pub farewell: String,
}

impl DialogueTree {
    /// Looks up a node.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.nodes.get(id)
    }

    /// Checks that the root exists and every choice leads to a node of
    /// this tree or ends the conversation.
    ///
    /// # Errors
    ///
    /// [`GenerationError::DanglingChoice`] for the first bad link.
    pub fn validate(&self) -> GenerationResult<()> {
        if !self.nodes.contains_key(&self.root) {
            return Err(GenerationError::DanglingChoice {
                tree: self.id.clone(),
                node: String::new(),
                target: self.root.clone(),
            });
        }
        for node in self.nodes.values() {
            for choice in &node.choices {
                if let Some(target) = &choice.next_node_id {
                    if !self.nodes.contains_key(target) {
                        return Err(GenerationError::DanglingChoice {
                            tree: self.id.clone(),
                            node: node.id.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Which optional branches to include.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogueOptions {
    /// Include a rumor branch.
    pub include_rumors: bool,
    /// Include a shop branch (needs a shop).
    pub include_shop: bool,
    /// Include a quest branch (needs a quest giver).
    pub include_quest: bool,
    /// Include a small-talk branch.
    pub include_small_talk: bool,
    /// Location display name for `{{location}}`.
    pub location_name: Option<String>,
}

impl Default for DialogueOptions {
    fn default() -> Self {
        Self {
            include_rumors: true,
            include_shop: true,
            include_quest: true,
            include_small_talk: true,
            location_name: None,
        }
    }
}

/// Builds dialogue trees from snippets.
#[derive(Clone, Copy, Debug)]
pub struct DialogueGenerator<'a> {
    templates: &'a DialogueTemplates,
}

impl<'a> DialogueGenerator<'a> {
    /// Creates a generator over `templates`.
    #[must_use]
    pub const fn new(templates: &'a DialogueTemplates) -> Self {
        Self { templates }
    }

    /// Snippets of `category` that `npc` may say.
    ///
    /// Filters by role, trait conditions and tone: friendly NPCs drop
    /// `hostile` lines, unfriendly ones drop `warm` lines.
    #[must_use]
    pub fn candidates(&self, npc: &GeneratedNpc, category: SnippetCategory) -> Vec<&'a DialogueSnippet> {
        let friendliness = npc.trait_value("friendliness");
        self.templates
            .category(category)
            .iter()
            .filter(|s| s.applies_to(&npc.role))
            .filter(|s| s.conditions.iter().all(|c| c.matches(&npc.personality)))
            .filter(|s| !(friendliness >= FRIENDLY_THRESHOLD && s.has_tag("hostile")))
            .filter(|s| !(friendliness <= UNFRIENDLY_THRESHOLD && s.has_tag("warm")))
            .collect()
    }

    /// Generates a validated tree for `npc`.
    ///
    /// Draw order: greeting, then one pick each for rumors, shop, quest and
    /// small talk when that branch is included, then the farewell. Branches
    /// with no candidate lines are left out without drawing.
    ///
    /// # Errors
    ///
    /// [`GenerationError::NotInitialized`] with no snippets loaded,
    /// [`GenerationError::UnknownTemplate`] if no greeting suits the NPC.
    pub fn generate(
        &self,
        rng: &mut SeededRandom,
        npc: &GeneratedNpc,
        ctx: &GenerationContext,
        options: &DialogueOptions,
    ) -> GenerationResult<DialogueTree> {
        if self.templates.is_empty() {
            return Err(GenerationError::NotInitialized("dialogue snippets"));
        }
        let prompts = self.templates.prompts();
        let location = options
            .location_name
            .clone()
            .or_else(|| npc.location_id.clone())
            .or_else(|| ctx.location_id.clone())
            .unwrap_or_else(|| "these parts".to_string());
        let values = Substitutions::new()
            .with("name", npc.name.full_name.as_str())
            .with("role", npc.display_role.to_lowercase())
            .with("location", location)
            .with("shop_type", npc.shop_type.as_deref().unwrap_or("goods"));

        let greetings = self.candidates(npc, SnippetCategory::Greeting);
        if greetings.is_empty() {
            return Err(GenerationError::UnknownTemplate {
                kind: "dialogue greeting",
                id: npc.role.clone(),
            });
        }
        let greeting = Self::render(rng.pick(&greetings)?, &values)?;

        let branches = [
            (RUMORS_NODE, SnippetCategory::Rumor, options.include_rumors),
            (SHOP_NODE, SnippetCategory::Shop, options.include_shop && npc.has_shop),
            (QUEST_NODE, SnippetCategory::QuestHook, options.include_quest && npc.is_quest_giver),
            (SMALL_TALK_NODE, SnippetCategory::SmallTalk, options.include_small_talk),
        ];

        let mut nodes = BTreeMap::new();
        let mut root_choices = Vec::new();
        for (node_id, category, enabled) in branches {
            if !enabled {
                continue;
            }
            let lines = self.candidates(npc, category);
            if lines.is_empty() {
                continue;
            }
            let text = Self::render(rng.pick(&lines)?, &values)?;
            let (entry, choices) = Self::branch(node_id, prompts);
            root_choices.push(entry);
            nodes.insert(
                node_id.to_string(),
                DialogueNode {
                    id: node_id.to_string(),
                    speaker: npc.name.full_name.clone(),
                    text,
                    choices,
                },
            );
        }
        root_choices.push(DialogueChoice::end(&prompts.goodbye));
        nodes.insert(
            ROOT_NODE.to_string(),
            DialogueNode {
                id: ROOT_NODE.to_string(),
                speaker: npc.name.full_name.clone(),
                text: greeting,
                choices: root_choices,
            },
        );

        let farewells = self.candidates(npc, SnippetCategory::Farewell);
        let farewell = if farewells.is_empty() {
            String::new()
        } else {
            Self::render(rng.pick(&farewells)?, &values)?
        };

        let tree = DialogueTree {
            id: format!("dialogue-{}", npc.id),
            npc_id: npc.id.clone(),
            root: ROOT_NODE.to_string(),
            nodes,
            farewell,
        };
        tree.validate()?;
        tracing::debug!(tree = %tree.id, nodes = tree.nodes.len(), "generated dialogue tree");
        Ok(tree)
    }

    /// Root choice leading into a branch, and the branch's own choices.
    fn branch(node_id: &str, prompts: &PromptLabels) -> (DialogueChoice, Vec<DialogueChoice>) {
        let back = DialogueChoice::to(&prompts.back, ROOT_NODE);
        let goodbye = DialogueChoice::end(&prompts.goodbye);
        match node_id {
            SHOP_NODE => (
                DialogueChoice::to(&prompts.shop, SHOP_NODE).with_action(DialogueAction::OpenShop),
                vec![back, goodbye],
            ),
            QUEST_NODE => (
                DialogueChoice::to(&prompts.quest, QUEST_NODE),
                vec![
                    DialogueChoice::end(&prompts.accept).with_action(DialogueAction::OfferQuest),
                    back,
                    goodbye,
                ],
            ),
            RUMORS_NODE => (DialogueChoice::to(&prompts.rumors, RUMORS_NODE), vec![back, goodbye]),
            _ => (DialogueChoice::to(&prompts.small_talk, node_id), vec![back, goodbye]),
        }
    }

    fn render(snippet: &DialogueSnippet, values: &Substitutions) -> GenerationResult<String> {
        TemplateText::parse(&snippet.text)?.render(values)
    }
}
