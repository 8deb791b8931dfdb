//! Aggregated diagnostics.
//!
//! Parsing and validation never stop at the first problem. Every pass pushes
//! structured [`SignatureError`]s into a [`Diagnostics`] collection, and the
//! caller decides what to do with the whole batch.

mod message;
mod printer;


pub use message::{DiagnosticKind, SignatureError};
pub use printer::DiagnosticsPrinter;

use crate::source::SourceMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: Vec<SignatureError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn push(&mut self, error: SignatureError) {
        self.messages.push(error);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Every diagnostic is an error; kept for parity with callers that
    /// branch on it.
    pub fn has_errors(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignatureError> {
        self.messages.iter()
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.messages.iter().map(SignatureError::kind).collect()
    }

    /// Stable sort by source path, then offset.
    pub fn sort(&mut self, sources: &SourceMap) {
        self.messages.sort_by(|a, b| {
            let (a, b) = (a.span(), b.span());
            sources
                .path(a.source)
                .cmp(&sources.path(b.source))
                .then(a.start().cmp(&b.start()))
        });
    }

    pub fn printer<'a>(&'a self, sources: &'a SourceMap) -> DiagnosticsPrinter<'a> {
        DiagnosticsPrinter::new(self, sources)
    }

    /// One `path:line:column: message` line per error.
    pub fn render(&self, sources: &SourceMap) -> String {
        self.printer(sources).render()
    }
}

impl IntoIterator for Diagnostics {
    type Item = SignatureError;
    type IntoIter = std::vec::IntoIter<SignatureError>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a SignatureError;
    type IntoIter = std::slice::Iter<'a, SignatureError>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl FromIterator<SignatureError> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = SignatureError>>(iter: T) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}
