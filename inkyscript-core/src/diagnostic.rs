//! Structured record of recovered anomalies.
//!
//! Malformed story content never aborts lexing, parsing or playback. Each
//! component keeps a [`Diagnostics`] buffer instead, mirrored to the `log`
//! facade, so front ends can surface problems and tests can assert on them.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A non-blank line matched no known pattern and was dropped.
    UnmatchedLine,
    /// A multi-line dialogue never saw its closing quote.
    UnterminatedDialogue,
    /// A token reached the parser without the payload its kind needs.
    MalformedToken,
    /// A `~` body that is not an assignment form.
    UnknownExpression,
    /// A `{ }` body that is not a comparison.
    UnknownCondition,
    /// A jump or choice target, or the start label, does not exist.
    MissingLabel,
    /// `step()` was called outside of a running story.
    NotRunning,
    /// Silent node resolution exceeded the configured bound.
    StepLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: Option<usize>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Entries kept per buffer. Anything past this is still logged, only counted.
pub const MAX_RECORDED: usize = 1024;

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    dropped: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, line: Option<usize>, message: impl Into<String>) {
        let diag = Diagnostic { kind, line, message: message.into() };
        match kind {
            DiagnosticKind::MissingLabel | DiagnosticKind::StepLimit => log::error!("{}", diag),
            _ => log::warn!("{}", diag),
        }
        self.record(diag);
    }

    fn record(&mut self, diag: Diagnostic) {
        if self.items.len() < MAX_RECORDED {
            self.items.push(diag);
        } else {
            self.dropped += 1;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries logged but not kept because the buffer was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    /// Drains everything recorded so far.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.dropped = 0;
        std::mem::take(&mut self.items)
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        for diag in other {
            self.record(diag);
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
