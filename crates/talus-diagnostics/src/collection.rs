//! Collects the non-fatal observations a lowering pass produces
//! (discarded expression-statement results, implicit zero-returns). This
//! is the ambient "logging" surface for the crate — facts get pushed into
//! a `Diagnostics` collection rather than written to stderr directly.

use crate::message::DiagnosticMessage;
use crate::position::Position;

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, pos: Position, message: impl Into<String>) {
        self.messages.push(DiagnosticMessage::warning(pos, message));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }
}
