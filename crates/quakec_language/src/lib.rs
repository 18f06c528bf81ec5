//! # quakec-language
//!
//! The front-end core of a QuakeC compiler: it consumes a stream of
//! classified tokens and produces a typed, semantically validated AST ready
//! for code generation against the Quake register VM.
//!
//! ## Pipeline
//!
//! | Stage | Module | Role |
//! |-------|--------|------|
//! | Token cursor | [`cursor`] | wraps the lexer, steers its `no_ops` flag |
//! | Constant pool | [`consts`] | pools float/string/vector literals |
//! | Symbol table | [`symtab`] | globals, parameters, watermarked locals |
//! | Expression parser | [`parser`] | shunting yard with typed reductions |
//! | Statement/declaration parser | [`parser`] | blocks, `return`, declarators |
//! | Program AST | [`program`] | constants, globals, functions, in emission order |
//!
//! The lexer itself is an external collaborator behind
//! [`cursor::TokenSource`]; code generation consumes the finished
//! [`program::Program`]. Neither lives in this crate.
//!
//! ## Example
//!
//! ```
//! use quakec_base::{Arena, Interner, SourcePos};
//! use quakec_language::{parse_tokens, AstContext, Token, TokenKind, TypeKind};
//!
//! let mut interner = Interner::new();
//! let file = interner.intern("defs.qc");
//! let name = interner.intern("health");
//! let pos = SourcePos::new(file, 1);
//! let tokens = vec![
//!     Token::new(TokenKind::Typename(TypeKind::Float), pos),
//!     Token::new(TokenKind::Ident(name), pos),
//!     Token::new(TokenKind::Punct(';'), pos),
//! ];
//!
//! let values = Arena::new();
//! let exprs = Arena::new();
//! let blocks = Arena::new();
//! let value_refs = Arena::new();
//! let expr_refs = Arena::new();
//! let ctx = AstContext::new(&values, &exprs, &blocks, &value_refs, &expr_refs);
//!
//! let program = parse_tokens(tokens, &mut interner, ctx).unwrap();
//! assert_eq!(program.globals.len(), 1);
//! assert_eq!(program.globals[0].name, name);
//! ```

pub mod arena_ctx;
pub mod ast;
pub mod consts;
pub mod cursor;
pub mod error;
pub mod parser;
pub mod program;
pub mod symtab;
pub mod token;
pub mod types;

pub use arena_ctx::AstContext;
pub use cursor::{TokenBuffer, TokenSource};
pub use error::{ErrorKind, ParseError, ParseResult};
pub use parser::{DeclarationParsing, ExpressionParsing, Parser, StatementParsing};
pub use program::{GlobalEntry, Program};
pub use token::{Token, TokenKind};
pub use types::{BinaryOp, StoreOp, TypeKind, Vec3};

// The structural atoms are part of this crate's public vocabulary.
pub use quakec_base::{Arena, Interner, SourcePos, Symbol, SymbolEq};

/// Parses a pre-classified token stream into a program AST.
///
/// Convenience wrapper over [`Parser`] for callers that lex up front; the
/// tokens must have been classified with the `no_ops` contract in mind (see
/// [`cursor::TokenSource::set_no_ops`]).
pub fn parse_tokens<'a>(
    tokens: Vec<Token>,
    interner: &mut Interner,
    ctx: AstContext<'a>,
) -> Result<Program<'a>, ParseError> {
    Parser::new(TokenBuffer::new(tokens), interner, ctx).parse()
}
