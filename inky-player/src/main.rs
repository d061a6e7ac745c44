mod setup;
mod config_gen;
mod terminal;

use std::env;
use std::process::ExitCode;
use inky_core::config::CoreConfig;
use inky_core::renderer::driver::Driver;
use inky_core::InkyEngine;
use inkyscript_core::ast::Node;

use terminal::TerminalRenderer;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let trace = args.iter().any(|a| a == "--trace");
    let script_arg = args.iter().find(|a| !a.starts_with("--"));

    setup::init();
    log::info!(">>> Inky Player Started (trace: {}) <<<", trace);

    let mut core_cfg: CoreConfig = inky_shared::config::get("core");
    if let Some(path) = script_arg {
        core_cfg.script_path = path.clone();
    }
    log::info!("Loading script from: {}", core_cfg.script_path);

    let mut engine = InkyEngine::new(core_cfg);
    if let Err(e) = engine.load_configured() {
        log::error!("{:#}", e);
        eprintln!("Failed to load story: {:#}", e);
        return ExitCode::FAILURE;
    }
    if !engine.diagnostics().is_empty() {
        log::warn!("Story loaded with {} diagnostics", engine.diagnostics().len());
    }

    if trace {
        for node in engine.run() {
            match node {
                Node::Dialogue { character, text, .. } => println!("{}: {}", character, text),
                Node::Command { command, args, .. } => println!("[{}] {}", command, args),
                Node::Choice { choices, .. } => {
                    for option in &choices {
                        println!("  * {} -> {}", option.text, option.target);
                    }
                }
                _ => {}
            }
        }
        log::debug!("Final state: {}", engine.get_state());
        return ExitCode::SUCCESS;
    }

    let Some(interpreter) = engine.step_interpreter() else {
        return ExitCode::FAILURE;
    };
    let mut driver = Driver::new(interpreter, TerminalRenderer);
    driver.run();

    let (interpreter, _) = driver.into_parts();
    for diag in interpreter.diagnostics() {
        eprintln!("warning: {}", diag);
    }
    log::info!("Final state: {}", interpreter.runtime().get_state());
    ExitCode::SUCCESS
}
