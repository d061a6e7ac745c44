use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use walkdir::WalkDir;

use inkyscript_core::ast::{Node, ScriptAst};
use inkyscript_core::diagnostic::Diagnostics;
use inkyscript_core::{Lexer, Parser};

use crate::config::CoreConfig;
use crate::executor::StepInterpreter;
use crate::interpreter::Interpreter;
use crate::runtime::Runtime;

pub const SCRIPT_EXTENSION: &str = "inky";

/// Loads story text into a shared AST and hands out playthroughs over it.
pub struct InkyEngine {
    config: CoreConfig,
    ast: Option<Arc<ScriptAst>>,
    runtime: Runtime,
    diagnostics: Diagnostics,
}

impl Default for InkyEngine {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

impl InkyEngine {
    pub fn new(config: CoreConfig) -> Self {
        let runtime = Runtime::with_start_label(config.start_label.clone());
        Self { config, ast: None, runtime, diagnostics: Diagnostics::new() }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Replaces the loaded story with `source` and resets the runtime.
    pub fn load_script(&mut self, source: &str) {
        let (ast, diagnostics) = self.compile(source);
        self.diagnostics = diagnostics;
        self.install(ast);
    }

    pub fn load_script_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {:?}", path))?;
        info!("Loaded script file: {:?}", path);
        self.load_script(&source);
        Ok(())
    }

    /// Loads every `.inky` file under `root_dir` as one story. A label defined
    /// in two different files is an error and leaves the engine unchanged.
    pub fn load_project(&mut self, root_dir: impl AsRef<Path>) -> Result<()> {
        let root = root_dir.as_ref();
        info!("Scanning script project at: {:?}", root);

        let mut merged = ScriptAst::default();
        let mut diagnostics = Diagnostics::new();
        let mut label_sources: HashMap<String, PathBuf> = HashMap::new();
        let mut loaded_count = 0;

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to scan {:?}", root))?;
            let path = entry.path();
            if !path.is_file() || path.extension().is_none_or(|e| e != SCRIPT_EXTENSION) {
                continue;
            }

            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read script: {:?}", path))?;
            let (ast, file_diagnostics) = self.compile(&source);
            diagnostics.extend(file_diagnostics);

            for (name, label) in ast.labels {
                if let Some(existing) = label_sources.get(&name) {
                    anyhow::bail!(
                        "Label collision detected!\n  Label '{}' is defined in:\n    1. {:?}\n    2. {:?}",
                        name, existing, path
                    );
                }
                label_sources.insert(name.clone(), path.to_path_buf());
                merged.labels.insert(name, label);
            }
            merged.characters.extend(ast.characters);
            loaded_count += 1;
        }

        if loaded_count == 0 {
            anyhow::bail!("No .{} scripts found under {:?}", SCRIPT_EXTENSION, root);
        }

        info!("Project loaded. Files: {}, Labels: {}", loaded_count, merged.labels.len());
        self.diagnostics = diagnostics;
        self.install(merged);
        Ok(())
    }

    /// Loads `script_path` from the config, as a file or a project directory.
    pub fn load_configured(&mut self) -> Result<()> {
        let path = PathBuf::from(&self.config.script_path);
        if path.is_dir() {
            self.load_project(&path)
        } else {
            self.load_script_from_file(&path)
        }
    }

    fn compile(&self, source: &str) -> (ScriptAst, Diagnostics) {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.run();
        if self.config.debug.show_tokens {
            for tok in &tokens {
                log::debug!("{:?}", tok);
            }
        }

        let (ast, parse_diagnostics) = Parser::new(&tokens).parse_with_diagnostics();
        if self.config.debug.show_ast {
            log::debug!("{:#?}", ast);
        }

        let mut diagnostics = lexer.take_diagnostics();
        diagnostics.extend(parse_diagnostics);
        (ast, diagnostics)
    }

    fn install(&mut self, ast: ScriptAst) {
        info!("Story ready: {} labels, {} characters", ast.labels.len(), ast.characters.len());
        self.ast = Some(Arc::new(ast));
        self.runtime.reset();
    }

    /// Plays the loaded story eagerly against the engine's runtime. Returns an
    /// empty transcript when nothing is loaded.
    pub fn run(&mut self) -> Vec<Node> {
        let Some(ast) = self.ast.clone() else {
            log::warn!("run() called with no script loaded");
            return Vec::new();
        };

        let runtime = std::mem::take(&mut self.runtime);
        let mut interpreter = Interpreter::with_config(ast, runtime, &self.config);
        let transcript = interpreter.run();
        self.runtime = interpreter.into_runtime();
        transcript
    }

    /// A fresh interactive playthrough sharing the loaded AST.
    pub fn step_interpreter(&self) -> Option<StepInterpreter> {
        let ast = self.ast.clone()?;
        let runtime = Runtime::with_start_label(self.config.start_label.clone());
        Some(StepInterpreter::with_config(ast, runtime, &self.config))
    }

    pub fn get_ast(&self) -> Option<&ScriptAst> {
        self.ast.as_deref()
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn get_state(&self) -> String {
        self.runtime.get_state()
    }

    pub fn reset(&mut self) {
        self.runtime.reset();
    }

    /// Lexer and parser diagnostics of the last load.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}
