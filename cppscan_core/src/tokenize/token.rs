//! Token and group definitions shared by the lexer, grouper and extractors.

use serde::Serialize;
use std::fmt;

/// Kinds of tokens produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Identifier,
    Integer,
    FloatingPoint,
    Character,
    String,
    RawString,
    Comment,
    PreprocessorDirective,

    // Three character symbols
    ShiftRightAssign,
    ShiftLeftAssign,
    PointerToMember,
    Ellipsis,

    // Two character symbols
    ScopeResolution,
    Equal,
    NotEqual,
    GreaterEqual,
    LessEqual,
    ShiftRight,
    ShiftLeft,
    PlusAssign,
    MinusAssign,
    DivideAssign,
    TimesAssign,
    ModuloAssign,
    BitOrAssign,
    BitAndAssign,
    BitXorAssign,
    Increment,
    Decrement,
    And,
    Or,
    Arrow,
    DotStar,

    // Single character symbols
    Plus,
    Minus,
    Divide,
    Times,
    Modulo,
    BitOr,
    BitAnd,
    BitNot,
    BitXor,
    Not,
    Greater,
    Less,
    Assign,
    Period,
    Comma,
    Question,
    Colon,
    Semicolon,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
}

/// Operators and punctuation, longest symbols first so that the first
/// prefix match is the longest one.
pub(crate) const SYMBOLS: &[(&str, TokenKind)] = &[
    (">>=", TokenKind::ShiftRightAssign),
    ("<<=", TokenKind::ShiftLeftAssign),
    ("->*", TokenKind::PointerToMember),
    ("...", TokenKind::Ellipsis),
    ("::", TokenKind::ScopeResolution),
    ("==", TokenKind::Equal),
    ("!=", TokenKind::NotEqual),
    (">=", TokenKind::GreaterEqual),
    ("<=", TokenKind::LessEqual),
    (">>", TokenKind::ShiftRight),
    ("<<", TokenKind::ShiftLeft),
    ("+=", TokenKind::PlusAssign),
    ("-=", TokenKind::MinusAssign),
    ("/=", TokenKind::DivideAssign),
    ("*=", TokenKind::TimesAssign),
    ("%=", TokenKind::ModuloAssign),
    ("|=", TokenKind::BitOrAssign),
    ("&=", TokenKind::BitAndAssign),
    ("^=", TokenKind::BitXorAssign),
    ("++", TokenKind::Increment),
    ("--", TokenKind::Decrement),
    ("&&", TokenKind::And),
    ("||", TokenKind::Or),
    ("->", TokenKind::Arrow),
    (".*", TokenKind::DotStar),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("/", TokenKind::Divide),
    ("*", TokenKind::Times),
    ("%", TokenKind::Modulo),
    ("|", TokenKind::BitOr),
    ("&", TokenKind::BitAnd),
    ("~", TokenKind::BitNot),
    ("^", TokenKind::BitXor),
    ("!", TokenKind::Not),
    (">", TokenKind::Greater),
    ("<", TokenKind::Less),
    ("=", TokenKind::Assign),
    (".", TokenKind::Period),
    (",", TokenKind::Comma),
    ("?", TokenKind::Question),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
    ("[", TokenKind::LeftBracket),
    ("]", TokenKind::RightBracket),
    ("(", TokenKind::LeftParen),
    (")", TokenKind::RightParen),
    ("{", TokenKind::LeftBrace),
    ("}", TokenKind::RightBrace),
];

impl TokenKind {
    /// False for comments and preprocessor directives.
    pub fn is_language(self) -> bool {
        !matches!(self, TokenKind::Comment | TokenKind::PreprocessorDirective)
    }

    pub fn is_string_literal(self) -> bool {
        matches!(self, TokenKind::String | TokenKind::RawString)
    }

    /// The closer matching this opener, if this is `{`, `[` or `(`.
    pub fn closer(self) -> Option<TokenKind> {
        match self {
            TokenKind::LeftBrace => Some(TokenKind::RightBrace),
            TokenKind::LeftBracket => Some(TokenKind::RightBracket),
            TokenKind::LeftParen => Some(TokenKind::RightParen),
            _ => None,
        }
    }

    /// The source text of a punctuation or operator kind.
    pub fn symbol(self) -> Option<&'static str> {
        SYMBOLS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(symbol, _)| *symbol)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(symbol) => write!(f, "'{}'", symbol),
            None => write!(f, "{:?}", self),
        }
    }
}

/// One token of a C++ source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Text of the token after line splices were removed.
    pub text: String,
    /// Text of the token in the raw source. Differs from `text` only when the
    /// token spans a line splice, and never for raw string literals.
    pub raw_text: String,
    /// Byte offset of the first character in the raw source.
    pub raw_start: usize,
    /// Byte offset just beyond the token in the raw source.
    pub raw_end: usize,
}

impl Token {
    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == name
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} {:?} [{}, {})",
            self.kind, self.text, self.raw_start, self.raw_end
        )
    }
}

/// A balanced-bracket region: an opener, the elements between, the closer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub start: Token,
    pub nested: Vec<Element>,
    pub end: Token,
}

impl Group {
    pub fn opener(&self) -> TokenKind {
        self.start.kind
    }

    pub fn raw_start(&self) -> usize {
        self.start.raw_start
    }

    pub fn raw_end(&self) -> usize {
        self.end.raw_end
    }
}

/// Either a token or a group of tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Token(Token),
    Group(Group),
}

impl Element {
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Element::Token(token) => Some(token),
            Element::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Element::Token(_) => None,
            Element::Group(group) => Some(group),
        }
    }

    pub fn is_token_kind(&self, kind: TokenKind) -> bool {
        self.as_token().is_some_and(|t| t.kind == kind)
    }

    pub fn is_any_identifier(&self) -> bool {
        self.is_token_kind(TokenKind::Identifier)
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        self.as_token().is_some_and(|t| t.is_identifier(name))
    }

    pub fn is_group_kind(&self, opener: TokenKind) -> bool {
        self.as_group().is_some_and(|g| g.opener() == opener)
    }

    pub fn raw_start(&self) -> usize {
        match self {
            Element::Token(token) => token.raw_start,
            Element::Group(group) => group.raw_start(),
        }
    }

    pub fn raw_end(&self) -> usize {
        match self {
            Element::Token(token) => token.raw_end,
            Element::Group(group) => group.raw_end(),
        }
    }
}

/// Walks a grouped tree back into its token sequence, in source order.
pub fn flatten(elements: &[Element]) -> Vec<&Token> {
    let mut tokens = Vec::new();
    let mut stack = vec![elements.iter()];
    let mut closers: Vec<&Token> = Vec::new();

    loop {
        let Some(iter) = stack.last_mut() else { break };
        match iter.next() {
            Some(Element::Token(token)) => tokens.push(token),
            Some(Element::Group(group)) => {
                tokens.push(&group.start);
                closers.push(&group.end);
                stack.push(group.nested.iter());
            }
            None => {
                stack.pop();
                if let Some(closer) = closers.pop() {
                    tokens.push(closer);
                }
            }
        }
    }
    tokens
}

/// Renders tokens by their raw text, with a single space wherever the raw
/// source had anything (whitespace, comments, directives) between two tokens.
pub fn stringify_tokens<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    let mut out = String::new();
    let mut prior_end: Option<usize> = None;
    for token in tokens {
        if prior_end.is_some_and(|end| end < token.raw_start) {
            out.push(' ');
        }
        out.push_str(&token.raw_text);
        prior_end = Some(token.raw_end);
    }
    out
}

/// Renders a grouped tree like [`stringify_tokens`].
pub fn stringify_elements(elements: &[Element]) -> String {
    stringify_tokens(flatten(elements))
}
