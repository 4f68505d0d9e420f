//! Tokenizer for Go source files
//!
//! Only as much of Go as the declaration parser needs: identifiers,
//! keywords, brackets, literals and comments. Operators are lumped together
//! since they only show up inside skipped function bodies and initializers.
//! Newlines are kept as tokens because they terminate struct fields.

use logos::Logos;
use std::ops::Range;

/// The kind of token produced by the lexer
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenKind {
    // ========== Keywords ==========
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("type")]
    Type,
    #[token("struct")]
    Struct,
    #[token("interface")]
    Interface,
    #[token("map")]
    Map,
    #[token("chan")]
    Chan,
    #[token("func")]
    Func,
    #[token("var")]
    Var,
    #[token("const")]
    Const,

    // ========== Literals ==========
    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*")]
    Ident,

    #[regex(r"[0-9][0-9a-zA-Z_.]*")]
    Number,

    /// Interpreted string literal
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    /// Raw string literal (may span lines)
    #[regex(r"`[^`]*`")]
    RawString,

    #[regex(r"'([^'\\\n]|\\.)*'")]
    Char,

    // ========== Comments ==========
    #[regex(r"//[^\n]*")]
    LineComment,

    /// Block comment, scanned up to the first `*/`
    #[token("/*", block_comment)]
    BlockComment,

    // ========== Punctuation ==========
    #[token("\n")]
    Newline,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("*")]
    Star,
    #[token("=")]
    Assign,
    #[token("/")]
    Slash,

    /// Any other operator run (`+`, `<-`, `:=`, `&&`, ...)
    #[regex(r"[+\-%&|\^<>!:~]+")]
    Operator,
}

/// Consume the rest of a block comment; an unterminated one is an error
fn block_comment(lex: &mut logos::Lexer<TokenKind>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

impl TokenKind {
    /// Whether the token is a comment
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

/// A token with its kind, source range and line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Byte range in the source
    pub span: Range<usize>,
    /// Line of the first byte (1-indexed)
    pub line: usize,
    /// Line of the last byte (differs for raw strings and block comments)
    pub end_line: usize,
}

/// A character the lexer could not classify
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Offending text
    pub text: String,
    /// Line (1-indexed)
    pub line: usize,
}

/// Byte offset to line number lookup
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    /// Build the index for a source text
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// Line (1-indexed) containing a byte offset
    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }
}

/// Tokenize a whole file
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let lines = LineIndex::new(source);
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let line = lines.line_of(span.start);
        match result {
            Ok(kind) => {
                let end_line = lines.line_of(span.end.saturating_sub(1).max(span.start));
                tokens.push(Token {
                    kind,
                    span,
                    line,
                    end_line,
                });
            }
            Err(()) => {
                return Err(LexError {
                    text: lexer.slice().to_string(),
                    line,
                })
            }
        }
    }

    Ok(tokens)
}
