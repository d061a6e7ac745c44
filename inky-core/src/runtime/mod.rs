pub mod value;
mod eval;

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use inkyscript_core::ast::ChoiceOption;
use inkyscript_core::diagnostic::Diagnostics;

pub use value::Value;

pub const DEFAULT_START_LABEL: &str = "Start";

/// Attribute map of a registered character.
pub type Attributes = BTreeMap<String, String>;

/// The `(label, node index)` cursor of the label-level scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub label: String,
    pub node_index: usize,
}

/// Debug snapshot of the mutable story state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeState {
    pub label: String,
    pub node_index: usize,
    pub variables: BTreeMap<String, Value>,
}

/// Mutable story state: variables, registered characters and the cursor.
///
/// One runtime belongs to one playthrough and is driven by a single caller at
/// a time. Nothing in here fails on bad script content; unknown expressions and
/// conditions are recorded in [`Runtime::diagnostics`] and treated as no-ops.
#[derive(Debug, Clone)]
pub struct Runtime {
    start_label: String,
    position: Position,
    variables: FxHashMap<String, Value>,
    characters: FxHashMap<String, Attributes>,
    diagnostics: RefCell<Diagnostics>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_start_label(DEFAULT_START_LABEL)
    }

    pub fn with_start_label(label: impl Into<String>) -> Self {
        let start_label = label.into();
        Runtime {
            position: Position { label: start_label.clone(), node_index: 0 },
            start_label,
            variables: FxHashMap::default(),
            characters: FxHashMap::default(),
            diagnostics: RefCell::new(Diagnostics::new()),
        }
    }

    pub fn start_label(&self) -> &str {
        &self.start_label
    }

    // variables

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        log::debug!("Set variable: {} = {}", name, value);
        self.variables.insert(name, value);
    }

    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.variables.iter()
    }

    // characters

    /// Replaces any previous registration of `name`.
    pub fn register_character(&mut self, name: impl Into<String>, attributes: Attributes) {
        let name = name.into();
        log::debug!("Registered character: {} {:?}", name, attributes);
        self.characters.insert(name, attributes);
    }

    pub fn get_character(&self, name: &str) -> Option<&Attributes> {
        self.characters.get(name)
    }

    pub fn get_character_attribute(&self, character: &str, attribute: &str) -> Option<&str> {
        self.characters.get(character)?.get(attribute).map(String::as_str)
    }

    pub fn characters(&self) -> impl Iterator<Item = (&String, &Attributes)> {
        self.characters.iter()
    }

    // navigation

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Moves the cursor to the first node of `label`. Existence is checked by
    /// whoever reads the cursor next.
    pub fn jump(&mut self, label: impl Into<String>) {
        self.position = Position { label: label.into(), node_index: 0 };
        log::debug!("Jumped to label: {}", self.position.label);
    }

    pub fn advance(&mut self) {
        self.position.node_index += 1;
        log::trace!("Next node: {}", self.position.node_index);
    }

    /// Clears variables and rewinds the cursor. Characters stay registered.
    pub fn reset(&mut self) {
        self.position = Position { label: self.start_label.clone(), node_index: 0 };
        self.variables.clear();
        log::info!("Runtime reset");
    }

    pub fn snapshot(&self) -> RuntimeState {
        RuntimeState {
            label: self.position.label.clone(),
            node_index: self.position.node_index,
            variables: self.variables.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }
    }

    /// Pretty JSON rendering of [`Runtime::snapshot`], for debugging.
    pub fn get_state(&self) -> String {
        serde_json::to_string_pretty(&self.snapshot()).unwrap_or_else(|e| {
            log::error!("Failed to render runtime state: {}", e);
            String::new()
        })
    }

    // presentation helpers

    /// Substitutes `{name}` and `{Char.attr}` placeholders. Unknown
    /// placeholders are left as written.
    pub fn interpolate(&self, text: &str) -> String {
        static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([\w.]+)\}").unwrap());

        PLACEHOLDER
            .replace_all(text, |caps: &Captures| {
                let name = &caps[1];
                let found = match name.split_once('.') {
                    Some((character, rest)) => {
                        let attribute = rest.split('.').next().unwrap_or(rest);
                        self.get_character_attribute(character, attribute).map(str::to_string)
                    }
                    None => self.get_variable(name).map(Value::to_string),
                };
                found.unwrap_or_else(|| {
                    log::debug!("Placeholder not resolved: {}", name);
                    caps[0].to_string()
                })
            })
            .into_owned()
    }

    /// Whether a choice option should be offered as enabled. Display logic
    /// only; selecting a disabled option still works.
    pub fn is_choice_enabled(&self, option: &ChoiceOption) -> bool {
        match &option.condition {
            Some(condition) => self.evaluate_condition(condition),
            None => true,
        }
    }

    pub fn diagnostics(&self) -> Ref<'_, Diagnostics> {
        self.diagnostics.borrow()
    }

    pub fn take_diagnostics(&self) -> Diagnostics {
        self.diagnostics.take()
    }
}
