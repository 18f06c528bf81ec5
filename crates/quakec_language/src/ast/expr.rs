//! Expression and block nodes.

use quakec_base::SourcePos;

use crate::arena_ctx::AstContext;
use crate::ast::Value;
use crate::types::{BinaryOp, StoreOp, TypeKind};

/// A typed expression node.
#[derive(Debug, PartialEq)]
pub enum Expr<'a> {
    /// A reference to a declared value or pooled constant.
    Value(&'a Value<'a>),
    /// Typed arithmetic.
    Binary {
        pos: SourcePos,
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    /// Assignment. The opcode is already selected from the destination type.
    Store {
        pos: SourcePos,
        op: StoreOp,
        dest: &'a Expr<'a>,
        source: &'a Expr<'a>,
    },
    /// A call with positional arguments; `ty` is the callee's return type.
    Call {
        pos: SourcePos,
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
        ty: TypeKind,
    },
    /// A vector component: `field` is 0, 1, or 2 for `_x`, `_y`, `_z`.
    Member {
        pos: SourcePos,
        base: &'a Expr<'a>,
        field: u8,
    },
    /// A statement block or comma expression.
    Block(&'a Block<'a>),
    /// Return from the enclosing function.
    Return {
        pos: SourcePos,
        value: Option<&'a Expr<'a>>,
    },
}

impl<'a> Expr<'a> {
    /// The type of the value this expression produces.
    pub fn ty(&self) -> TypeKind {
        match self {
            Expr::Value(v) => v.ty,
            Expr::Binary { op, .. } => op.result_type(),
            Expr::Store { dest, .. } => dest.ty(),
            Expr::Call { ty, .. } => *ty,
            Expr::Member { .. } => TypeKind::Float,
            Expr::Block(b) => b.ty,
            Expr::Return { .. } => TypeKind::Void,
        }
    }

    /// The source position of this expression.
    pub fn pos(&self) -> SourcePos {
        match self {
            Expr::Value(v) => v.pos,
            Expr::Block(b) => b.pos,
            Expr::Binary { pos, .. }
            | Expr::Store { pos, .. }
            | Expr::Call { pos, .. }
            | Expr::Member { pos, .. }
            | Expr::Return { pos, .. } => *pos,
        }
    }
}

/// A frozen block: declared locals plus ordered statements.
///
/// `ty` is the type of the last expression, `void` when empty; comma
/// expressions rely on it, statement blocks just carry it along.
#[derive(Debug, PartialEq)]
pub struct Block<'a> {
    pub pos: SourcePos,
    pub locals: &'a [&'a Value<'a>],
    pub exprs: &'a [&'a Expr<'a>],
    pub ty: TypeKind,
}

/// A block under construction.
///
/// Statement parsing and the comma operator both accumulate into a builder;
/// [`BlockBuilder::freeze`] moves the finished lists into the arena.
#[derive(Debug)]
pub struct BlockBuilder<'a> {
    pub pos: SourcePos,
    locals: Vec<&'a Value<'a>>,
    exprs: Vec<&'a Expr<'a>>,
    ty: TypeKind,
}

impl<'a> BlockBuilder<'a> {
    pub fn new(pos: SourcePos) -> Self {
        BlockBuilder {
            pos,
            locals: Vec::new(),
            exprs: Vec::new(),
            ty: TypeKind::Void,
        }
    }

    /// Appends a statement and takes over its type.
    pub fn push_expr(&mut self, expr: &'a Expr<'a>) {
        self.ty = expr.ty();
        self.exprs.push(expr);
    }

    /// Records a local declared directly in this block.
    pub fn push_local(&mut self, value: &'a Value<'a>) {
        self.locals.push(value);
    }

    /// Returns `true` if no statements have been appended yet.
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// Moves the accumulated lists into the arena and returns the frozen block.
    pub fn freeze(self, ctx: &AstContext<'a>) -> &'a Block<'a> {
        ctx.alloc_block(Block {
            pos: self.pos,
            locals: ctx.alloc_value_slice(self.locals),
            exprs: ctx.alloc_expr_slice(self.exprs),
            ty: self.ty,
        })
    }

    /// Consumes the builder, yielding the accumulated statements.
    ///
    /// Used when a comma block is expanded into a call's argument list.
    pub fn into_exprs(self) -> Vec<&'a Expr<'a>> {
        self.exprs
    }
}
