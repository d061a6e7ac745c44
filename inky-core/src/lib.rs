pub mod config;
pub mod runtime;
pub mod executor;
pub mod interpreter;
pub mod engine;
pub mod event;
pub mod renderer;

pub use config::{CoreConfig, DebugConfig, SystemConfig};
pub use runtime::{Runtime, RuntimeState, Value};
pub use executor::{StepInterpreter, StoryState};
pub use interpreter::Interpreter;
pub use engine::InkyEngine;
pub use event::InputEvent;
pub use renderer::{driver::Driver, Renderer};
