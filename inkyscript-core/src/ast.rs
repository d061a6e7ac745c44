//! Abstract syntax tree for the story-script language.
//!
//! The tree is built once per load and never mutated afterwards, so it can be
//! shared behind an `Arc` by any number of independent playthroughs. Every node
//! carries the 1-based source line it was parsed from.

use std::collections::BTreeMap;
use std::sync::Arc;
use rustc_hash::FxHashMap;

/// The root of every parsed script.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScriptAst {
    /// Keyed by label name. A later definition replaces an earlier one.
    pub labels: FxHashMap<String, Label>,
    /// Keyed by character name. A later definition replaces an earlier one.
    pub characters: FxHashMap<String, CharacterDef>,
}

impl ScriptAst {
    pub fn label(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }
}

/// A named, ordered block of nodes; the target of jumps and choices.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Label {
    pub name: String,
    pub nodes: Vec<Node>,
}

/// One instruction inside a label.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A line spoken by a character.
    Dialogue {
        character: String,
        text: String,
        line: usize,
    },
    /// A `~` assignment, kept as raw text and evaluated at run time.
    Variable {
        expression: String,
        line: usize,
    },
    /// A presentation command. The verb and its argument string are opaque here.
    Command {
        command: String,
        args: String,
        line: usize,
    },
    /// A menu built from consecutive choice lines.
    Choice {
        choices: Vec<ChoiceOption>,
        line: usize,
    },
    /// A `{ }` guard whose body only runs when the condition holds. The body
    /// is shared so an interpreter can walk it without copying.
    Condition {
        condition: String,
        then_nodes: Arc<[Node]>,
        line: usize,
    },
    /// Unconditional transfer to another label. Resolved lazily at run time.
    Jump {
        target: String,
        line: usize,
    },
    CharacterDef(CharacterDef),
}

impl Node {
    pub fn line(&self) -> usize {
        match self {
            Node::Dialogue { line, .. }
            | Node::Variable { line, .. }
            | Node::Command { line, .. }
            | Node::Choice { line, .. }
            | Node::Condition { line, .. }
            | Node::Jump { line, .. } => *line,
            Node::CharacterDef(def) => def.line,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Dialogue { .. } => "Dialogue",
            Node::Variable { .. } => "Variable",
            Node::Command { .. } => "Command",
            Node::Choice { .. } => "Choice",
            Node::Condition { .. } => "Condition",
            Node::Jump { .. } => "Jump",
            Node::CharacterDef(_) => "CharacterDef",
        }
    }

    /// Jump and Choice hand control elsewhere, so nothing after them in the
    /// same conditional body can run.
    pub fn is_control_transfer(&self) -> bool {
        matches!(self, Node::Jump { .. } | Node::Choice { .. })
    }

    /// Dialogue, Command and Choice are handed to the caller; everything else
    /// is resolved silently.
    pub fn is_observable(&self) -> bool {
        matches!(self, Node::Dialogue { .. } | Node::Command { .. } | Node::Choice { .. })
    }
}

/// A single selectable entry of a [`Node::Choice`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOption {
    pub text: String,
    pub target: String,
    /// Informational only; the interpreter never enforces it.
    pub condition: Option<String>,
}

/// An `@char` block: a name plus a flat string attribute map.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CharacterDef {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub line: usize,
}
