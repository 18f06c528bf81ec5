//! Parse errors and the diagnostic format.
//!
//! Every error carries the category it belongs to, a rendered message, and
//! the `file:line` it points at. The parser constructs errors eagerly (the
//! interner is in reach there, so the file name can be resolved on the spot)
//! and propagates them with `?`; there is no mid-declaration resynchronization,
//! and the top-level driver stops at the first error.

use std::fmt;

/// The category of a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Surfaced from the token source: unexpected end of input, lexer failure.
    Lexical,
    /// Unexpected token, unmatched parenthesis, missing `;` or identifier.
    Syntactic,
    /// Undeclared identifier or duplicate declaration in the same scope.
    Symbolic,
    /// Incompatible operand types, wrong argument count, return-type
    /// mismatch, call target not a function.
    Type,
    /// Invariant violation inside the parser. Should be unreachable; a
    /// compile that hits one must be aborted, not trusted.
    Internal,
}

/// A parse error with its diagnostic position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub file: String,
    pub line: u32,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        ParseError {
            kind,
            message: message.into(),
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Result alias used throughout the parser.
pub type ParseResult<T> = Result<T, ParseError>;
