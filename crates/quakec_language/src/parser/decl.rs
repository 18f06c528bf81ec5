//! Type and declaration parsing.
//!
//! A declaration is one base type followed by a comma-separated declarator
//! list. Two declarator shapes are accepted for functions, matching what
//! QuakeC compilers have historically taken: the classic form with the
//! parameter list on the type (`void(float damage) hurt;`) and the C-like
//! form with the parameter list after the name (`void hurt(float damage)`).
//! Either way the declarator's value is wrapped into a function-typed value
//! whose `return_type` links to the base value and which carries the
//! parameters.
//!
//! A `vector` declarator registers four names: the vector itself and the
//! `_x`/`_y`/`_z` component aliases, each a member view over the same base
//! node. Only the base owns storage.
//!
//! Initializers: `= #N` binds a builtin, `= { ... }` (or a bare `{ ... }`)
//! parses a function body with that function active, and anything else is a
//! constant initializer, which the front end does not implement.

use log::debug;
use quakec_base::{SourcePos, Symbol};

use super::{ActiveFunction, Parser, StatementParsing};
use crate::ast::{BlockBuilder, Expr, Function, FunctionBody, Value};
use crate::cursor::TokenSource;
use crate::error::{ErrorKind, ParseResult};
use crate::token::TokenKind;
use crate::types::TypeKind;

/// Declaration parsing, as an extension of [`Parser`].
pub trait DeclarationParsing<'a> {
    /// Parses one declaration statement, the current token being the base
    /// type name. `block` is the enclosing block for local declarations,
    /// `None` at top level.
    fn parse_declaration(&mut self, block: Option<&mut BlockBuilder<'a>>) -> ParseResult<()>;
}

impl<'a, 'i, S: TokenSource> DeclarationParsing<'a> for Parser<'a, 'i, S> {
    fn parse_declaration(&mut self, mut block: Option<&mut BlockBuilder<'a>>) -> ParseResult<()> {
        let base = match self.tok().kind {
            TokenKind::Typename(ty) => ty,
            _ => return Err(self.error(ErrorKind::Internal, "declaration without a type name")),
        };
        loop {
            // Step past the base type, or the ',' separating declarators.
            if !self.next() {
                return Err(self.error(ErrorKind::Lexical, "expected variable declaration"));
            }
            let pos = self.pos();
            let (mut var, mut is_func) = self.parse_type(base)?;

            let name = match self.tok().kind {
                TokenKind::Ident(name) => name,
                _ => {
                    let msg = format!("expected variable name, found {}", self.describe_current());
                    return Err(self.error(ErrorKind::Syntactic, msg));
                }
            };
            if block.is_some() {
                if self.symtab.find_local_in_block(name).is_some() {
                    let msg = format!(
                        "local '{}' already declared in this block",
                        self.interner.resolve(name)
                    );
                    return Err(self.error(ErrorKind::Symbolic, msg));
                }
            } else if self.symtab.find_global(name).is_some() {
                let msg = format!("global '{}' already declared", self.interner.resolve(name));
                return Err(self.error(ErrorKind::Symbolic, msg));
            }
            var.name = name;

            if !self.next() {
                return Err(self.error(ErrorKind::Lexical, "unexpected end of file in declaration"));
            }
            if self.tok().is_punct('(') && !is_func {
                // C-like declarator: the parameter list follows the name.
                var.params = self.parse_params()?;
                is_func = true;
            }

            let mut fn_index = None;
            let vref = if is_func {
                // The declared value becomes the return type; a fresh
                // function-typed value takes over the name and parameters.
                let params = var.params;
                var.params = &[];
                let ret = self.ctx.alloc_value(var);
                let fval = self.ctx.alloc_value(Value {
                    params,
                    return_type: Some(ret),
                    ..Value::new(pos, name, TypeKind::Function)
                });
                fn_index = Some(self.functions.len());
                self.functions.push(Function {
                    pos,
                    name,
                    value: fval,
                    body: FunctionBody::Blocks(Vec::new()),
                });
                fval
            } else {
                self.ctx.alloc_value(var)
            };
            let node = self.ctx.alloc_expr(Expr::Value(vref));
            self.register(name, vref, node, pos, block.as_deref_mut());
            debug!(
                "declared {} '{}'",
                vref.ty,
                self.interner.resolve(name)
            );

            match self.tok().kind {
                TokenKind::Punct(';') => {
                    let _ = self.next();
                    return Ok(());
                }
                TokenKind::Punct(',') => continue,
                TokenKind::Punct('=') => {
                    if !self.next() {
                        return Err(self.error(ErrorKind::Lexical, "expected initializer"));
                    }
                }
                TokenKind::Punct('{') => {
                    // Function body without '='.
                    return self.parse_function_body(fn_index, name, block.is_some());
                }
                _ => {
                    let msg = format!("expected '=' or ';', found {}", self.describe_current());
                    return Err(self.error(ErrorKind::Syntactic, msg));
                }
            }

            match self.tok().kind {
                TokenKind::Punct('#') => {
                    self.parse_builtin_binding(fn_index, name, block.is_some())?;
                }
                TokenKind::Punct('{') => {
                    return self.parse_function_body(fn_index, name, block.is_some());
                }
                _ => {
                    return Err(self.error(
                        ErrorKind::Syntactic,
                        "constant initializers are not implemented",
                    ));
                }
            }

            // After a builtin binding: ',' continues the list, ';' ends it.
            if !self.next() {
                return Err(self.error(ErrorKind::Lexical, "expected ';' after declaration"));
            }
            match self.tok().kind {
                TokenKind::Punct(',') => continue,
                TokenKind::Punct(';') => {
                    let _ = self.next();
                    return Ok(());
                }
                _ => {
                    let msg = format!(
                        "expected ';' after declaration, found {}",
                        self.describe_current()
                    );
                    return Err(self.error(ErrorKind::Syntactic, msg));
                }
            }
        }
    }
}

impl<'a, 'i, S: TokenSource> Parser<'a, 'i, S> {
    /// Parses a type descriptor whose base type has been consumed.
    ///
    /// If the current token opens a parameter list the result is flagged as
    /// a function type; the declaration parser does the wrapping, because the
    /// declarator's name goes on the wrapper, not on the return value.
    fn parse_type(&mut self, base: TypeKind) -> ParseResult<(Value<'a>, bool)> {
        let pos = self.pos();
        let mut value = Value::new(pos, self.unnamed, base);
        let mut is_func = false;
        if self.tok().is_punct('(') {
            is_func = true;
            value.params = self.parse_params()?;
        }
        Ok((value, is_func))
    }

    /// Parses `( type [name], ... )`, the current token being the `(`.
    /// Leaves the cursor on the token after the closing `)`.
    fn parse_params(&mut self) -> ParseResult<&'a [&'a Value<'a>]> {
        let mut params = Vec::new();
        loop {
            if !self.next() {
                return Err(self.error(ErrorKind::Lexical, "unexpected end of file in parameter list"));
            }
            if self.tok().is_punct(')') {
                break;
            }
            let base = match self.tok().kind {
                TokenKind::Typename(ty) => ty,
                _ => {
                    let msg = format!("expected parameter type, found {}", self.describe_current());
                    return Err(self.error(ErrorKind::Syntactic, msg));
                }
            };
            if !self.next() {
                return Err(self.error(ErrorKind::Lexical, "unexpected end of file in parameter list"));
            }
            // Parameters may themselves be function-typed.
            let (mut param, _) = self.parse_type(base)?;
            if let TokenKind::Ident(name) = self.tok().kind {
                param.name = name;
                if !self.next() {
                    return Err(self.error(ErrorKind::Lexical, "unexpected end of file in parameter list"));
                }
            }
            params.push(self.ctx.alloc_value(param));
            match self.tok().kind {
                TokenKind::Punct(',') => continue,
                TokenKind::Punct(')') => break,
                _ => {
                    let msg = format!(
                        "expected ',' or ')' in parameter list, found {}",
                        self.describe_current()
                    );
                    return Err(self.error(ErrorKind::Syntactic, msg));
                }
            }
        }
        if !self.next() {
            return Err(self.error(ErrorKind::Lexical, "unexpected end of file after parameter list"));
        }
        Ok(self.ctx.alloc_value_slice(params))
    }

    /// Registers a declared value in the current scope, along with the
    /// `_x`/`_y`/`_z` member aliases when it is a vector.
    fn register(
        &mut self,
        name: Symbol,
        vref: &'a Value<'a>,
        node: &'a Expr<'a>,
        pos: SourcePos,
        block: Option<&mut BlockBuilder<'a>>,
    ) {
        let mut aliases = Vec::new();
        if vref.ty == TypeKind::Vector {
            let base_name = self.interner.resolve(name).to_string();
            for (field, suffix) in ["_x", "_y", "_z"].iter().enumerate() {
                let alias = self.interner.intern(&format!("{base_name}{suffix}"));
                let member = self.ctx.alloc_expr(Expr::Member {
                    pos,
                    base: node,
                    field: field as u8,
                });
                aliases.push((alias, member));
            }
        }
        match block {
            Some(builder) => {
                self.symtab.push_local(name, node);
                for (alias, member) in aliases {
                    self.symtab.push_local(alias, member);
                }
                // Only the base value owns storage in the block.
                builder.push_local(vref);
            }
            None => {
                self.symtab.insert_global(name, node);
                for (alias, member) in aliases {
                    self.symtab.insert_global(alias, member);
                }
            }
        }
    }

    /// Parses `#N` after `=`, leaving the cursor on the number.
    fn parse_builtin_binding(
        &mut self,
        fn_index: Option<usize>,
        name: Symbol,
        is_local: bool,
    ) -> ParseResult<()> {
        if is_local {
            return Err(self.error(ErrorKind::Syntactic, "cannot declare builtins inside functions"));
        }
        let Some(index) = fn_index else {
            let msg = format!(
                "unexpected builtin number, '{}' is not a function",
                self.interner.resolve(name)
            );
            return Err(self.error(ErrorKind::Type, msg));
        };
        if !self.next() {
            return Err(self.error(ErrorKind::Lexical, "expected builtin number"));
        }
        let number = match self.tok().kind {
            TokenKind::IntConst(n) => n,
            _ => {
                return Err(self.error(
                    ErrorKind::Syntactic,
                    "builtin number must be an integer constant",
                ));
            }
        };
        if number <= 0 || number > i32::MAX as i64 {
            return Err(self.error(
                ErrorKind::Syntactic,
                "builtin number must be a positive integer",
            ));
        }
        self.functions[index].body = FunctionBody::Builtin(-(number as i32));
        debug!("bound builtin #{number} to '{}'", self.interner.resolve(name));
        Ok(())
    }

    /// Parses a `{ ... }` function body with the function made active, so
    /// `return` checks its return type and its parameters are in scope.
    fn parse_function_body(
        &mut self,
        fn_index: Option<usize>,
        name: Symbol,
        is_local: bool,
    ) -> ParseResult<()> {
        if is_local {
            return Err(self.error(ErrorKind::Syntactic, "cannot declare functions inside functions"));
        }
        let Some(index) = fn_index else {
            let msg = format!("'{}' is not a function", self.interner.resolve(name));
            return Err(self.error(ErrorKind::Type, msg));
        };

        let bindings: Vec<(Symbol, &'a Expr<'a>)> = self.functions[index]
            .value
            .params
            .iter()
            .map(|&param| (param.name, self.ctx.alloc_expr(Expr::Value(param))))
            .collect();
        let previous = self.active.replace(ActiveFunction {
            index,
            params: bindings,
        });
        let body = self.parse_block();
        self.active = previous;
        let body = body?;

        match &mut self.functions[index].body {
            FunctionBody::Blocks(blocks) => blocks.push(body),
            FunctionBody::Builtin(_) => {
                return Err(self.error(ErrorKind::Internal, "function body after builtin binding"));
            }
        }
        debug!("parsed function '{}'", self.interner.resolve(name));
        Ok(())
    }
}
