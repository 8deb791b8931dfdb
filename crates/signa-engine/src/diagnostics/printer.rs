//! Renders collected signature errors as plain lines or annotated source excerpts.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};
use text_size::TextRange;

use super::Diagnostics;
use crate::source::SourceMap;

/// Renders diagnostics either as plain `path:line:column: message` lines
/// or as annotated source snippets.
pub struct DiagnosticsPrinter<'a> {
    diagnostics: &'a Diagnostics,
    sources: &'a SourceMap,
    snippets: bool,
}

impl<'a> DiagnosticsPrinter<'a> {
    pub fn new(diagnostics: &'a Diagnostics, sources: &'a SourceMap) -> Self {
        Self {
            diagnostics,
            sources,
            snippets: false,
        }
    }

    pub fn snippets(mut self, value: bool) -> Self {
        self.snippets = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        if !self.snippets {
            return self.format_plain(w);
        }

        let renderer = Renderer::plain();

        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }

            let message = diag.to_string();
            let span = diag.span();
            let Some(source) = self.sources.get(span.source) else {
                writeln!(w, "error: {message}")?;
                continue;
            };

            let range = adjust_range(span.range, source.content.len());
            let snippet = Snippet::source(source.content)
                .line_start(1)
                .path(source.path)
                .annotation(
                    AnnotationKind::Primary
                        .span(range)
                        .label(diag.kind().name()),
                );

            let report = vec![Level::ERROR.primary_title(&message).element(snippet)];
            write!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }

    fn format_plain(&self, w: &mut impl Write) -> std::fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            match self.sources.location(diag.span()) {
                Some(location) => write!(w, "{location}: {diag}")?,
                None => write!(w, "{diag}")?,
            }
        }
        Ok(())
    }
}

fn adjust_range(range: TextRange, limit: usize) -> std::ops::Range<usize> {
    let start: usize = range.start().into();
    let end: usize = range.end().into();

    if start == end {
        return start..(start + 1).min(limit);
    }

    start..end
}
