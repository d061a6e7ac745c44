use inkyscript_core::ast::Node;

use crate::event::InputEvent;
use crate::executor::StepInterpreter;
use crate::renderer::Renderer;

/// Pumps a [`StepInterpreter`] through a [`Renderer`] until the story ends
/// or the reader exits.
pub struct Driver<R: Renderer> {
    interpreter: StepInterpreter,
    renderer: R,
}

impl<R: Renderer> Driver<R> {
    pub fn new(interpreter: StepInterpreter, renderer: R) -> Self {
        Self { interpreter, renderer }
    }

    pub fn run(&mut self) {
        if !self.interpreter.is_story_running() {
            self.interpreter.start();
        }

        while let Some(node) = self.interpreter.step() {
            let input = self.renderer.render(&node, self.interpreter.runtime());
            match (input, &node) {
                (Some(InputEvent::Exit), _) => {
                    self.interpreter.stop();
                    break;
                }
                (Some(InputEvent::ChoiceMade { index }), Node::Choice { .. }) => {
                    if !self.interpreter.select_choice_index(index) {
                        log::warn!("Choice index {} out of range, asking again", index);
                    }
                }
                (_, Node::Choice { .. }) => {
                    log::warn!("Choice presented without a selection, stopping");
                    self.interpreter.stop();
                    break;
                }
                _ => {}
            }
        }
        log::info!("Driver finished");
    }

    pub fn interpreter(&self) -> &StepInterpreter {
        &self.interpreter
    }

    pub fn into_parts(self) -> (StepInterpreter, R) {
        (self.interpreter, self.renderer)
    }
}
