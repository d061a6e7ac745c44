use crate::executor::frame::Frame;

/// Open conditional bodies, innermost last.
#[derive(Debug, Default, Clone)]
pub struct ExecStack {
    stack: Vec<Frame>
}

impl ExecStack {
    pub fn push(&mut self, frame: Frame) {
        self.stack.push(frame);
    }
    pub fn pop(&mut self) -> Option<Frame> {
        self.stack.pop()
    }
    pub fn top(&self) -> Option<&Frame> {
        self.stack.last()
    }
    pub fn top_mut(&mut self) -> Option<&mut Frame> {
        self.stack.last_mut()
    }
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
    pub fn clear(&mut self) {
        self.stack.clear();
    }
}
