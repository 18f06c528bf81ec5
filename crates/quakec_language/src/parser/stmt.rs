//! Statement and block parsing.
//!
//! A statement is one of: a local declaration (only inside a block), a
//! `return`, a nested block, or an expression statement. Blocks own the
//! locals declared directly in them; the symbol-table watermark is saved on
//! entry and restored on every exit path, so locals die exactly at their
//! closing brace.

use quakec_base::{SourcePos, SymbolEq};

use super::{DeclarationParsing, ExpressionParsing, Parser};
use crate::ast::{Block, BlockBuilder, Expr};
use crate::cursor::TokenSource;
use crate::error::{ErrorKind, ParseResult};
use crate::token::TokenKind;
use crate::types::TypeKind;

/// Statement and block parsing, as an extension of [`Parser`].
pub trait StatementParsing<'a> {
    /// Parses one statement. Returns `None` for statements that only declare
    /// (a local declaration adds no expression to the block).
    fn parse_statement(
        &mut self,
        block: Option<&mut BlockBuilder<'a>>,
    ) -> ParseResult<Option<&'a Expr<'a>>>;

    /// Parses a `{ ... }` block, the current token being the `{`.
    fn parse_block(&mut self) -> ParseResult<&'a Block<'a>>;
}

impl<'a, 'i, S: TokenSource> StatementParsing<'a> for Parser<'a, 'i, S> {
    fn parse_statement(
        &mut self,
        block: Option<&mut BlockBuilder<'a>>,
    ) -> ParseResult<Option<&'a Expr<'a>>> {
        match self.tok().kind {
            TokenKind::Typename(_) => {
                let Some(block) = block else {
                    return Err(self.error(ErrorKind::Syntactic, "cannot declare a variable here"));
                };
                self.parse_declaration(Some(block))?;
                Ok(None)
            }
            TokenKind::Keyword(kw) if kw.is(self.interner, "return") => {
                let pos = self.pos();
                let expected = self.return_type()?;
                if !self.next() {
                    return Err(self.error(ErrorKind::Lexical, "expected return expression"));
                }
                if self.tok().is_punct(';') {
                    if expected != TypeKind::Void {
                        let msg = format!("return without value in a function returning {expected}");
                        return Err(self.error(ErrorKind::Type, msg));
                    }
                    if !self.next() {
                        return Err(self.error(ErrorKind::Lexical, "unexpected end of file after return"));
                    }
                    return Ok(Some(self.ctx.alloc_expr(Expr::Return { pos, value: None })));
                }
                let value = self.parse_expression()?;
                if value.ty() != expected {
                    let msg = format!("return value has type {}, expected {}", value.ty(), expected);
                    return Err(self.error_at(pos, ErrorKind::Type, msg));
                }
                Ok(Some(self.ctx.alloc_expr(Expr::Return {
                    pos,
                    value: Some(value),
                })))
            }
            TokenKind::Keyword(kw) => {
                let msg = format!("unexpected keyword '{}'", self.interner.resolve(kw));
                Err(self.error(ErrorKind::Syntactic, msg))
            }
            TokenKind::Punct('{') => {
                let inner = self.parse_block()?;
                Ok(Some(self.ctx.alloc_expr(Expr::Block(inner))))
            }
            _ => Ok(Some(self.parse_expression()?)),
        }
    }

    fn parse_block(&mut self) -> ParseResult<&'a Block<'a>> {
        let pos = self.pos();
        let saved = self.symtab.enter_block();
        let result = self.parse_block_body(pos);
        // Locals die here whether the block parsed or not.
        self.symtab.leave_block(saved);
        result
    }
}

impl<'a, 'i, S: TokenSource> Parser<'a, 'i, S> {
    fn parse_block_body(&mut self, pos: SourcePos) -> ParseResult<&'a Block<'a>> {
        if !self.next() {
            return Err(self.error(ErrorKind::Lexical, "unexpected end of file at start of block"));
        }
        let mut builder = BlockBuilder::new(pos);
        loop {
            match self.tok().kind {
                TokenKind::Eof => {
                    return Err(self.error(ErrorKind::Lexical, "unexpected end of file in block"))
                }
                TokenKind::Punct('}') => break,
                _ => {
                    if let Some(stmt) = self.parse_statement(Some(&mut builder))? {
                        builder.push_expr(stmt);
                    }
                }
            }
        }
        // Step past the `}`; end of input right after it is fine.
        let _ = self.next();
        Ok(builder.freeze(&self.ctx))
    }
}
