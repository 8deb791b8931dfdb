//! Token kinds for the signature language.

use logos::Logos;

/// `#[repr(u8)]` keeps discriminants usable as [`TokenSet`] bit positions.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    /// Defined before `Colon` for correct precedence.
    #[token("::")]
    DoubleColon,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("->")]
    Arrow,

    #[token("=>")]
    FatArrow,

    #[token("^")]
    Caret,

    #[token("|")]
    Pipe,

    #[token("&")]
    Amp,

    #[token("?")]
    Question,

    #[token("!")]
    Bang,

    #[token("*")]
    Star,

    #[token("**")]
    StarStar,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("=")]
    Equals,

    #[token("`")]
    Backtick,

    /// Operator method names: `def ==: ...`, `def <=>: ...`.
    #[regex(r"==|===|!=|=~|!~|<=|>=|<=>|<<|>>|\+|-|/|%|~|\+@|-@")]
    Operator,

    #[token("class")]
    KwClass,
    #[token("module")]
    KwModule,
    #[token("interface")]
    KwInterface,
    #[token("type")]
    KwType,
    #[token("def")]
    KwDef,
    #[token("self")]
    KwSelf,
    #[token("alias")]
    KwAlias,
    #[token("include")]
    KwInclude,
    #[token("extend")]
    KwExtend,
    #[token("prepend")]
    KwPrepend,
    #[token("attr_reader")]
    KwAttrReader,
    #[token("attr_writer")]
    KwAttrWriter,
    #[token("attr_accessor")]
    KwAttrAccessor,
    #[token("end")]
    KwEnd,
    #[token("private")]
    KwPrivate,
    #[token("public")]
    KwPublic,
    #[token("singleton")]
    KwSingleton,
    #[token("untyped")]
    KwUntyped,
    #[token("void")]
    KwVoid,
    #[token("instance")]
    KwInstance,
    #[token("bot")]
    KwBot,
    #[token("top")]
    KwTop,
    #[token("nil")]
    KwNil,
    #[token("bool")]
    KwBool,
    #[token("true")]
    KwTrue,
    #[token("false")]
    KwFalse,
    #[token("in")]
    KwIn,
    #[token("out")]
    KwOut,
    #[token("unchecked")]
    KwUnchecked,

    /// Class, module and constant names. Defined after keywords so they take precedence.
    #[regex(r"[A-Z][A-Za-z0-9_]*")]
    UIdent,

    /// Method names, parameter names and type alias names.
    #[regex(r"[a-z][A-Za-z0-9_]*")]
    #[regex(r"_([a-z0-9_][A-Za-z0-9_]*)?")]
    LIdent,

    #[regex(r"_[A-Z][A-Za-z0-9_]*")]
    InterfaceIdent,

    #[regex(r"@[A-Za-z_][A-Za-z0-9_]*")]
    IVar,

    #[regex(r"@@[A-Za-z_][A-Za-z0-9_]*")]
    CVar,

    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*")]
    GVar,

    #[regex(r":[A-Za-z_][A-Za-z0-9_]*[?!=]?")]
    SymbolLit,

    #[regex(r"-?[0-9]+")]
    IntegerLit,

    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    #[regex(r"'(?:[^'\\]|\\.)*'")]
    StringLit,

    #[regex(r"[ \t]+")]
    Whitespace,

    #[token("\n")]
    #[token("\r\n")]
    Newline,

    #[regex(r"#[^\n]*", allow_greedy = true)]
    Comment,

    /// Coalesced unrecognized characters
    Garbage,
    Error,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | Comment)
    }

    #[inline]
    pub fn is_keyword(self) -> bool {
        (self as u8) >= (KwClass as u8) && (self as u8) <= (KwUnchecked as u8)
    }

    /// Tokens that can spell a method or parameter name.
    #[inline]
    pub fn is_word(self) -> bool {
        self.is_keyword() || matches!(self, UIdent | LIdent | InterfaceIdent)
    }
}

/// 64-bit bitset of `SyntaxKind`s for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    /// Panics at compile time if any kind's discriminant >= 64.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u8;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u8;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }
}

/// Keywords that name special types when they appear in type position.
pub const SPECIAL_TYPES: TokenSet = TokenSet::new(&[
    KwUntyped, KwVoid, KwSelf, KwInstance, KwClass, KwBot, KwTop, KwNil, KwBool,
]);
