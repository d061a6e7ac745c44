use std::sync::Arc;

use inkyscript_core::ast::{Node, ScriptAst};

use crate::config::CoreConfig;
use crate::executor::StepInterpreter;
use crate::runtime::Runtime;

/// Runs a story to the end without an external reader, always taking the
/// first option of every choice. Used for traces and debugging.
pub struct Interpreter {
    session: StepInterpreter,
    max_trace_nodes: usize,
}

impl Interpreter {
    pub fn new(ast: Arc<ScriptAst>, runtime: Runtime) -> Self {
        Self::with_config(ast, runtime, &CoreConfig::default())
    }

    pub fn with_config(ast: Arc<ScriptAst>, runtime: Runtime, config: &CoreConfig) -> Self {
        Self {
            session: StepInterpreter::with_config(ast, runtime, config),
            max_trace_nodes: config.max_trace_nodes,
        }
    }

    /// Returns every observable node in playback order. Stops early once
    /// `max_trace_nodes` have been collected, which also ends cyclic stories.
    pub fn run(&mut self) -> Vec<Node> {
        log::info!("=== INTERPRETER START ===");
        self.session.start();

        let mut transcript = Vec::new();
        while let Some(node) = self.session.step() {
            log_node(&node);

            let first_target = match &node {
                Node::Choice { choices, .. } => Some(choices.first().map(|c| c.target.clone())),
                _ => None,
            };
            transcript.push(node);

            if transcript.len() >= self.max_trace_nodes {
                log::warn!("Trace stopped after {} nodes", transcript.len());
                self.session.stop();
                break;
            }

            match first_target {
                Some(Some(target)) => self.session.select_choice(&target),
                Some(None) => {
                    self.session.stop();
                    break;
                }
                None => {}
            }
        }

        log::info!("=== INTERPRETER END ({} nodes) ===", transcript.len());
        transcript
    }

    pub fn runtime(&self) -> &Runtime {
        self.session.runtime()
    }

    pub fn session(&self) -> &StepInterpreter {
        &self.session
    }

    pub fn into_runtime(self) -> Runtime {
        self.session.into_runtime()
    }
}

fn log_node(node: &Node) {
    match node {
        Node::Dialogue { character, text, .. } => log::info!("[{}] \"{}\"", character, text),
        Node::Command { command, args, .. } => log::info!("[CMD] {} {}", command, args),
        Node::Choice { choices, .. } => {
            log::info!("[CHOICE]");
            for (i, option) in choices.iter().enumerate() {
                log::info!("  {}. {} -> {}", i + 1, option.text, option.target);
            }
        }
        other => log::debug!("{}", other.kind_name()),
    }
}
