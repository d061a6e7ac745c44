use std::sync::Arc;

use inkyscript_core::ast::Node;

/// Cursor into the body of a condition that held.
///
/// The body is the AST's own allocation, so entering a condition only bumps
/// its reference count.
#[derive(Debug, Clone)]
pub struct Frame {
    body: Arc<[Node]>,
    next: usize,
    opened_at: usize,
}

impl Frame {
    pub fn enter(body: &Arc<[Node]>, opened_at: usize) -> Self {
        Self { body: Arc::clone(body), next: 0, opened_at }
    }

    /// The body and the index of its next node, or `None` once exhausted.
    pub fn pending(&self) -> Option<(Arc<[Node]>, usize)> {
        (self.next < self.body.len()).then(|| (Arc::clone(&self.body), self.next))
    }

    pub fn advance(&mut self) {
        self.next += 1;
    }

    /// Source line of the condition that opened this body.
    pub fn opened_at(&self) -> usize {
        self.opened_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_body_then_runs_out() {
        let body: Arc<[Node]> = vec![
            Node::Variable { expression: "a = 1".into(), line: 2 },
            Node::Variable { expression: "b = 1".into(), line: 3 },
        ]
        .into();
        let mut frame = Frame::enter(&body, 1);
        assert_eq!(frame.pending().map(|(_, i)| i), Some(0));
        frame.advance();
        let (shared, index) = frame.pending().unwrap();
        assert_eq!(index, 1);
        assert!(Arc::ptr_eq(&shared, &body));
        frame.advance();
        assert!(frame.pending().is_none());
        assert_eq!(frame.opened_at(), 1);
    }
}
