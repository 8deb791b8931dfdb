//! Tokenizer for signature files.
//!
//! Tokens carry a kind and a byte range; their text stays in the source and is
//! sliced out on demand with [`token_text`]. Characters logos cannot match are
//! merged into one `Garbage` token per run, so a stray `%%%` is a single error.

use logos::Logos;
use text_size::{TextRange, TextSize};

use super::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self { kind, span }
    }

    fn at(kind: SyntaxKind, start: usize, end: usize) -> Self {
        Self::new(kind, TextRange::new(offset(start), offset(end)))
    }
}

fn offset(at: usize) -> TextSize {
    TextSize::new(at as u32)
}

/// Splits `source` into tokens, trivia included, in source order.
pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = SyntaxKind::lexer(source);
    let mut tokens = Vec::with_capacity(source.len() / 4);
    let mut garbage: Option<usize> = None;

    while let Some(next) = lexer.next() {
        let range = lexer.span();
        let Ok(kind) = next else {
            garbage.get_or_insert(range.start);
            continue;
        };
        if let Some(start) = garbage.take() {
            tokens.push(Token::at(SyntaxKind::Garbage, start, range.start));
        }
        tokens.push(Token::at(kind, range.start, range.end));
    }

    if let Some(start) = garbage {
        tokens.push(Token::at(SyntaxKind::Garbage, start, source.len()));
    }
    tokens
}

#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[token.span]
}
