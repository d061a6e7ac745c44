pub mod driver;

use inkyscript_core::ast::Node;

use crate::event::InputEvent;
use crate::runtime::Runtime;

/// Presents one observable node. The runtime is available for placeholder
/// interpolation and for greying out choice options.
pub trait Renderer {
    fn render(&mut self, node: &Node, runtime: &Runtime) -> Option<InputEvent>;
}
