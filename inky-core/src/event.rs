/// Reader input fed back after a node is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Continue,
    ChoiceMade { index: usize },
    Exit,
}
