mod frame;
mod exec_stack;

use std::sync::Arc;

use inkyscript_core::ast::{ChoiceOption, Node, ScriptAst};
use inkyscript_core::diagnostic::{DiagnosticKind, Diagnostics};

use crate::config::CoreConfig;
use crate::runtime::Runtime;
use exec_stack::ExecStack;
use frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryState {
    NotStarted,
    Running,
    Finished,
}

/// Which cursor a node was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Label,
    Nested,
}

enum Flow {
    Yield(Node),
    Continue,
}

/// Pull-based story cursor.
///
/// Each [`step`](StepInterpreter::step) returns the next Dialogue, Command or
/// Choice, resolving variables, conditions and jumps silently in between. A
/// true condition pushes its body onto an execution stack so nested bodies
/// resume where they left off without being flattened into the label.
///
/// The AST is shared; the runtime is owned by this playthrough.
#[derive(Debug, Clone)]
pub struct StepInterpreter {
    ast: Arc<ScriptAst>,
    runtime: Runtime,
    stack: ExecStack,
    state: StoryState,
    pending_choice: Option<Vec<ChoiceOption>>,
    max_silent_steps: usize,
    diagnostics: Diagnostics,
}

impl StepInterpreter {
    pub fn new(ast: Arc<ScriptAst>, runtime: Runtime) -> Self {
        Self::with_config(ast, runtime, &CoreConfig::default())
    }

    pub fn with_config(ast: Arc<ScriptAst>, runtime: Runtime, config: &CoreConfig) -> Self {
        StepInterpreter {
            ast,
            runtime,
            stack: ExecStack::default(),
            state: StoryState::NotStarted,
            pending_choice: None,
            max_silent_steps: config.max_silent_steps.max(1),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Begins at the start label, re-registering every defined character.
    pub fn start(&mut self) {
        self.state = StoryState::Running;
        self.stack.clear();
        self.pending_choice = None;

        let start = self.runtime.start_label().to_string();
        self.runtime.jump(start.clone());
        for (name, def) in &self.ast.characters {
            self.runtime.register_character(name.clone(), def.attributes.clone());
        }
        log::info!("Story started at label: {}", start);
    }

    /// Returns the next observable node, or `None` once the story has run out
    /// of nodes, hit a missing label, or is not running.
    ///
    /// A Choice is returned again by every call until a choice is selected.
    pub fn step(&mut self) -> Option<Node> {
        match self.state {
            StoryState::Running => {}
            StoryState::NotStarted => {
                self.diagnostics.push(DiagnosticKind::NotRunning, None, "step() called before start()");
                return None;
            }
            StoryState::Finished => return None,
        }

        let ast = Arc::clone(&self.ast);
        for _ in 0..self.max_silent_steps {
            let nested = self.stack.top().map(Frame::pending);
            let flow = match nested {
                Some(Some((body, index))) => self.execute(&body[index], Scope::Nested),
                Some(None) => {
                    if let Some(done) = self.stack.pop() {
                        log::trace!("Leaving body opened at line {}", done.opened_at());
                    }
                    Flow::Continue
                }
                None => {
                    let position = self.runtime.position();
                    let Some(label) = ast.label(&position.label) else {
                        let missing = position.label.clone();
                        self.diagnostics.push(
                            DiagnosticKind::MissingLabel,
                            None,
                            format!("label not found: {}", missing),
                        );
                        self.finish();
                        return None;
                    };
                    match label.nodes.get(position.node_index) {
                        Some(node) => self.execute(node, Scope::Label),
                        None => {
                            log::info!("End of label: {}", label.name);
                            self.finish();
                            return None;
                        }
                    }
                }
            };

            if let Flow::Yield(node) = flow {
                return Some(node);
            }
        }

        self.diagnostics.push(
            DiagnosticKind::StepLimit,
            None,
            format!(
                "no observable node within {} silent nodes (label {})",
                self.max_silent_steps,
                self.runtime.position().label
            ),
        );
        self.finish();
        None
    }

    fn execute(&mut self, node: &Node, scope: Scope) -> Flow {
        log::trace!("Executing {} (line {}) in {:?} scope", node.kind_name(), node.line(), scope);
        match node {
            Node::Dialogue { .. } | Node::Command { .. } => {
                self.advance(scope);
                Flow::Yield(node.clone())
            }
            Node::Choice { choices, .. } => {
                // the cursor stays put until a choice is selected
                self.pending_choice = Some(choices.clone());
                Flow::Yield(node.clone())
            }
            Node::Variable { expression, .. } => {
                self.runtime.evaluate_expression(expression);
                self.advance(scope);
                Flow::Continue
            }
            Node::CharacterDef(def) => {
                self.runtime.register_character(def.name.clone(), def.attributes.clone());
                self.advance(scope);
                Flow::Continue
            }
            Node::Condition { condition, then_nodes, line } => {
                let holds = self.runtime.evaluate_condition(condition);
                log::debug!("Condition: {} = {}", condition, holds);
                if holds && !then_nodes.is_empty() {
                    if advances_past_condition(then_nodes) {
                        self.advance(scope);
                    }
                    self.stack.push(Frame::enter(then_nodes, *line));
                } else {
                    self.advance(scope);
                }
                Flow::Continue
            }
            Node::Jump { target, .. } => {
                // a jump leaves every open body
                self.stack.clear();
                self.runtime.jump(target.clone());
                Flow::Continue
            }
        }
    }

    fn advance(&mut self, scope: Scope) {
        match scope {
            Scope::Label => self.runtime.advance(),
            Scope::Nested => {
                if let Some(frame) = self.stack.top_mut() {
                    frame.advance();
                }
            }
        }
    }

    fn finish(&mut self) {
        self.state = StoryState::Finished;
        self.stack.clear();
        self.pending_choice = None;
    }

    /// Leaves the pending choice and continues at `target`. The option's
    /// condition is not checked.
    pub fn select_choice(&mut self, target: &str) {
        log::info!("Choice selected: {}", target);
        self.stack.clear();
        self.runtime.jump(target);
        self.pending_choice = None;
    }

    /// Selects by position in the pending choice. Returns `false` when there
    /// is no pending choice or the index is out of range.
    pub fn select_choice_index(&mut self, index: usize) -> bool {
        let target = self
            .pending_choice
            .as_ref()
            .and_then(|choices| choices.get(index))
            .map(|option| option.target.clone());
        match target {
            Some(target) => {
                self.select_choice(&target);
                true
            }
            None => {
                log::warn!("No pending choice option at index {}", index);
                false
            }
        }
    }

    pub fn pending_choice(&self) -> Option<&[ChoiceOption]> {
        self.pending_choice.as_deref()
    }

    pub fn is_story_running(&self) -> bool {
        self.state == StoryState::Running
    }

    pub fn state(&self) -> StoryState {
        self.state
    }

    pub fn stop(&mut self) {
        if self.state == StoryState::Running {
            self.finish();
        }
        log::info!("Story stopped");
    }

    /// Back to the not-started state with variables cleared.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.pending_choice = None;
        self.state = StoryState::NotStarted;
        self.runtime.reset();
    }

    /// Number of conditional bodies currently open.
    pub fn nested_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn ast(&self) -> &Arc<ScriptAst> {
        &self.ast
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtime
    }

    pub fn into_runtime(self) -> Runtime {
        self.runtime
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Whether entering a true condition moves the enclosing cursor past it.
///
/// A body ending in a Jump or Choice leaves the cursor on the condition: the
/// jump, or the later choice selection, performs that step itself.
fn advances_past_condition(then_nodes: &[Node]) -> bool {
    !then_nodes.last().is_some_and(Node::is_control_transfer)
}
