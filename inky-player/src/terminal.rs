use std::io::{stdin, stdout, BufRead, Write};

use inky_core::event::InputEvent;
use inky_core::renderer::Renderer;
use inky_core::runtime::Runtime;
use inkyscript_core::ast::Node;

/// Plain stdin/stdout front end. Empty input continues, `exit` quits.
pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render(&mut self, node: &Node, runtime: &Runtime) -> Option<InputEvent> {
        match node {
            Node::Dialogue { character, text, .. } => {
                let name = runtime
                    .get_character_attribute(character, "name")
                    .unwrap_or(character);
                println!("{}: {}", name, runtime.interpolate(text));
                self.wait_continue()
            }
            Node::Command { command, args, .. } => {
                println!("[{}] {}", command, args);
                None
            }
            Node::Choice { choices, .. } => {
                for (i, option) in choices.iter().enumerate() {
                    let marker = if runtime.is_choice_enabled(option) { "" } else { " (locked)" };
                    println!("  [{}] {}{}", i + 1, runtime.interpolate(&option.text), marker);
                }
                self.wait_choice(choices.len())
            }
            _ => None,
        }
    }
}

impl TerminalRenderer {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        if let Err(e) = stdout().flush() {
            log::warn!("stdout flush failed: {}", e);
        }
        let mut buf = String::new();
        match stdin().lock().read_line(&mut buf) {
            Ok(0) => None,
            Ok(_) => Some(buf.trim().to_string()),
            Err(e) => {
                log::error!("stdin read failed: {}", e);
                None
            }
        }
    }

    fn wait_continue(&mut self) -> Option<InputEvent> {
        let Some(input) = self.read_line("> ") else {
            return Some(InputEvent::Exit);
        };
        if input.eq_ignore_ascii_case("exit") {
            return Some(InputEvent::Exit);
        }
        Some(InputEvent::Continue)
    }

    fn wait_choice(&mut self, len: usize) -> Option<InputEvent> {
        loop {
            let input = self.read_line("Select> ")?;
            if input.eq_ignore_ascii_case("exit") {
                return Some(InputEvent::Exit);
            }
            if let Ok(n) = input.parse::<usize>() {
                if n >= 1 && n <= len {
                    return Some(InputEvent::ChoiceMade { index: n - 1 });
                }
            }
            println!("invalid");
        }
    }
}
