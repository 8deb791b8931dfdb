//! Token cursor, fuel accounting and error recording shared by the grammar rules.

use std::cell::Cell;

use text_size::{TextRange, TextSize};

use super::lexer::{Token, token_text};
use super::syntax_kind::SyntaxKind;
use crate::Error;
use crate::ast::Declaration;
use crate::diagnostics::{Diagnostics, SignatureError};
use crate::source::{SourceId, Span};

/// Lookahead calls allowed between two consumed tokens.
const LOOKAHEAD_BUDGET: u32 = 256;

/// Marker returned once a syntax error has been recorded (or fuel ran out).
///
/// A file stops parsing at its first syntax error; the marker unwinds the
/// grammar productions through `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Abort;

pub(super) type Parsed<T> = Result<T, Abort>;

pub struct Parser<'src> {
    pub(super) source: &'src str,
    pub(super) source_id: SourceId,
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    pub(super) diagnostics: Diagnostics,
    pub(super) depth: u32,
    pub(super) lookahead_budget: Cell<u32>,
    /// Type parameters in scope, innermost scope last.
    pub(super) type_vars: Vec<Vec<String>>,
    last_end: TextSize,
    exec_fuel_remaining: Option<u32>,
    recursion_fuel_limit: Option<u32>,
    fatal_error: Option<Error>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, source_id: SourceId, tokens: Vec<Token>) -> Self {
        Self {
            source,
            source_id,
            tokens,
            pos: 0,
            diagnostics: Diagnostics::new(),
            depth: 0,
            lookahead_budget: Cell::new(LOOKAHEAD_BUDGET),
            type_vars: Vec::new(),
            last_end: TextSize::from(0),
            exec_fuel_remaining: None,
            recursion_fuel_limit: None,
            fatal_error: None,
        }
    }

    pub fn with_exec_fuel(mut self, limit: Option<u32>) -> Self {
        self.exec_fuel_remaining = limit;
        self
    }

    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.recursion_fuel_limit = limit;
        self
    }

    /// Parses the whole file. A syntax error discards the file's declarations.
    pub fn parse(mut self) -> crate::PassResult<Vec<Declaration>> {
        let declarations = self.parse_file();
        self.finish(declarations)
    }

    fn finish(self, declarations: Parsed<Vec<Declaration>>) -> crate::PassResult<Vec<Declaration>> {
        if let Some(err) = self.fatal_error {
            return Err(err);
        }
        match declarations {
            Ok(declarations) => Ok((declarations, self.diagnostics)),
            Err(Abort) => Ok((Vec::new(), self.diagnostics)),
        }
    }

    pub(super) fn has_fatal_error(&self) -> bool {
        self.fatal_error.is_some()
    }

    fn refill_lookahead(&self) {
        self.lookahead_budget.set(LOOKAHEAD_BUDGET);
    }

    fn skip_trivia(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.pos += 1;
        }
    }

    /// Current non-trivia token kind. Reads as `Error` at EOF or after a fatal error.
    pub(super) fn current(&mut self) -> SyntaxKind {
        self.skip_trivia();
        self.ensure_progress();
        if self.has_fatal_error() {
            return SyntaxKind::Error;
        }
        self.tokens
            .get(self.pos)
            .map_or(SyntaxKind::Error, |t| t.kind)
    }

    pub(super) fn currently_is(&mut self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// LL(k) lookahead past trivia.
    pub(super) fn peek_nth(&mut self, n: usize) -> SyntaxKind {
        self.skip_trivia();
        self.ensure_progress();
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
            .map_or(SyntaxKind::Error, |t| t.kind)
    }

    pub(super) fn next_is(&mut self, kind: SyntaxKind) -> bool {
        self.peek_nth(1) == kind
    }

    pub(super) fn current_span(&mut self) -> TextRange {
        self.skip_trivia();
        self.tokens
            .get(self.pos)
            .map_or_else(|| TextRange::empty(self.eof_offset()), |t| t.span)
    }

    pub(super) fn current_text(&mut self) -> &'src str {
        self.skip_trivia();
        match self.tokens.get(self.pos) {
            Some(token) => token_text(self.source, token),
            None => "",
        }
    }

    pub(super) fn eof_offset(&self) -> TextSize {
        TextSize::from(self.source.len() as u32)
    }

    pub(super) fn eof(&mut self) -> bool {
        self.skip_trivia();
        self.pos >= self.tokens.len()
    }

    pub(super) fn should_stop(&mut self) -> bool {
        self.eof() || self.has_fatal_error()
    }

    fn consume_exec_fuel(&mut self) {
        if let Some(ref mut remaining) = self.exec_fuel_remaining {
            if *remaining == 0 {
                if self.fatal_error.is_none() {
                    self.fatal_error = Some(Error::ExecFuelExhausted);
                }
                return;
            }
            *remaining -= 1;
        }
    }

    /// Consumes the current non-trivia token and returns its text.
    pub(super) fn bump(&mut self) -> &'src str {
        assert!(!self.eof(), "bump called at EOF");
        self.refill_lookahead();
        self.consume_exec_fuel();

        let token = self.tokens[self.pos];
        self.pos += 1;
        self.last_end = token.span.end();
        token_text(self.source, &token)
    }

    pub(super) fn eat_token(&mut self, kind: SyntaxKind) -> bool {
        if self.currently_is(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// On mismatch: record a syntax error and abort the file.
    pub(super) fn expect(&mut self, kind: SyntaxKind, what: &str) -> Parsed<TextRange> {
        if self.currently_is(kind) {
            let span = self.current_span();
            self.bump();
            return Ok(span);
        }
        Err(self.error_expected(what))
    }

    /// Whether the current token directly follows the previous one, with no trivia between.
    pub(super) fn is_adjacent(&self) -> bool {
        self.pos > 0
            && self
                .tokens
                .get(self.pos)
                .is_some_and(|t| !t.kind.is_trivia() && t.span.start() == self.last_end)
    }

    /// Whether the next non-trivia token after the current one is on the same line.
    pub(super) fn next_on_same_line(&mut self) -> bool {
        self.skip_trivia();
        for token in self.tokens.iter().skip(self.pos + 1) {
            match token.kind {
                SyntaxKind::Newline => return false,
                kind if kind.is_trivia() => continue,
                _ => return true,
            }
        }
        false
    }

    pub(super) fn span(&self, range: TextRange) -> Span {
        Span::new(self.source_id, range)
    }

    /// Span from `start` to the end of the last consumed token.
    pub(super) fn span_from(&self, start: TextSize) -> Span {
        Span::new(self.source_id, TextRange::new(start, self.last_end.max(start)))
    }

    pub(super) fn start(&mut self) -> TextSize {
        self.current_span().start()
    }

    /// Records "unexpected X, expected `what`" at the current token.
    pub(super) fn error_expected(&mut self, what: &str) -> Abort {
        if self.has_fatal_error() {
            return Abort;
        }
        let found = if self.eof() {
            "end of input".to_owned()
        } else if self.current() == SyntaxKind::Garbage {
            format!("character `{}`", self.current_text())
        } else {
            format!("`{}`", self.current_text())
        };
        let range = self.current_span();
        self.error_at(range, format!("unexpected {found}, expected {what}"))
    }

    pub(super) fn error_at(&mut self, range: TextRange, message: impl Into<String>) -> Abort {
        if self.has_fatal_error() {
            return Abort;
        }
        self.diagnostics.push(SignatureError::Syntax {
            message: message.into(),
            span: Span::new(self.source_id, range),
        });
        Abort
    }

    pub(super) fn enter_recursion(&mut self) -> Parsed<()> {
        if let Some(limit) = self.recursion_fuel_limit
            && self.depth >= limit
        {
            if self.fatal_error.is_none() {
                self.fatal_error = Some(Error::RecursionLimitExceeded);
            }
            return Err(Abort);
        }
        self.depth += 1;
        self.refill_lookahead();
        Ok(())
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.refill_lookahead();
    }

    pub(super) fn is_type_var(&self, name: &str) -> bool {
        self.type_vars
            .iter()
            .rev()
            .any(|scope| scope.iter().any(|v| v == name))
    }
}
