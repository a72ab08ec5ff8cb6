//! Builder-pattern printer for rendering diagnostics against source text,
//! built on an `annotate_snippets`-based renderer but working in row/col
//! terms since that is all `ParseNode::source_position` promises upstream.

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

use crate::collection::Diagnostics;
use crate::error::LowerError;
use crate::message::Severity;

pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    errors: &'d [LowerError],
    source: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    #[must_use]
    pub fn new(diagnostics: &'d Diagnostics, errors: &'d [LowerError]) -> Self {
        Self { diagnostics, errors, source: None, colored: false }
    }

    #[must_use]
    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    #[must_use]
    pub fn render(&self) -> String {
        let Some(source) = self.source else {
            return self.render_plain();
        };
        let renderer = if self.colored { Renderer::styled() } else { Renderer::plain() };
        let mut out = String::new();
        for err in self.errors {
            let offset = err.pos().byte_offset(source);
            let end = (offset + 1).min(source.len().max(offset));
            let message = err.to_string();
            let snippet = Snippet::source(source)
                .line_start(1)
                .annotation(AnnotationKind::Primary.span(offset..end).label(&message));
            let report = [Level::ERROR.primary_title(&message).element(snippet)];
            out.push_str(&renderer.render(&report));
            out.push('\n');
        }
        for diag in self.diagnostics.iter() {
            let offset = diag.pos.byte_offset(source);
            let end = (offset + 1).min(source.len().max(offset));
            let snippet = Snippet::source(source)
                .line_start(1)
                .annotation(AnnotationKind::Primary.span(offset..end).label(&diag.message));
            let report = [Level::WARNING.primary_title(&diag.message).element(snippet)];
            out.push_str(&renderer.render(&report));
            out.push('\n');
        }
        out
    }

    fn render_plain(&self) -> String {
        let mut out = String::new();
        for err in self.errors {
            out.push_str(&format!("error: {err}\n"));
        }
        for diag in self.diagnostics.iter() {
            out.push_str(&format!("{}: {} at {}\n", Severity::Warning, diag.message, diag.pos));
        }
        out
    }
}
