//! Arena context for AST allocation.
//!
//! [`AstContext`] bundles the typed arenas every AST node is allocated into.
//! The `'a` lifetime is the lifetime of one compile: the caller creates the
//! arenas, builds a context of references to them, and everything the parser
//! produces borrows from there. The context itself is `Copy`, so it can be
//! passed around freely.

use quakec_base::Arena;

use crate::ast::{Block, Expr, Value};

/// The typed arenas backing one compile.
#[derive(Clone, Copy)]
pub struct AstContext<'a> {
    /// Arena for named value slots and pooled constants.
    pub values: &'a Arena<Value<'a>>,
    /// Arena for expression nodes.
    pub exprs: &'a Arena<Expr<'a>>,
    /// Arena for frozen blocks.
    pub blocks: &'a Arena<Block<'a>>,
    /// Arena for slices of value references (parameter and local lists).
    pub value_refs: &'a Arena<&'a Value<'a>>,
    /// Arena for slices of expression references (statement and argument lists).
    pub expr_refs: &'a Arena<&'a Expr<'a>>,
}

impl<'a> AstContext<'a> {
    pub fn new(
        values: &'a Arena<Value<'a>>,
        exprs: &'a Arena<Expr<'a>>,
        blocks: &'a Arena<Block<'a>>,
        value_refs: &'a Arena<&'a Value<'a>>,
        expr_refs: &'a Arena<&'a Expr<'a>>,
    ) -> Self {
        AstContext {
            values,
            exprs,
            blocks,
            value_refs,
            expr_refs,
        }
    }

    /// Allocates a value slot.
    pub fn alloc_value(&self, value: Value<'a>) -> &'a Value<'a> {
        self.values.alloc(value)
    }

    /// Allocates an expression node.
    pub fn alloc_expr(&self, expr: Expr<'a>) -> &'a Expr<'a> {
        self.exprs.alloc(expr)
    }

    /// Allocates a frozen block.
    pub fn alloc_block(&self, block: Block<'a>) -> &'a Block<'a> {
        self.blocks.alloc(block)
    }

    /// Allocates a slice of value references.
    pub fn alloc_value_slice<I>(&self, values: I) -> &'a [&'a Value<'a>]
    where
        I: IntoIterator<Item = &'a Value<'a>>,
        I::IntoIter: ExactSizeIterator,
    {
        self.value_refs.alloc_slice(values)
    }

    /// Allocates a slice of expression references.
    pub fn alloc_expr_slice<I>(&self, exprs: I) -> &'a [&'a Expr<'a>]
    where
        I: IntoIterator<Item = &'a Expr<'a>>,
        I::IntoIter: ExactSizeIterator,
    {
        self.expr_refs.alloc_slice(exprs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeKind;
    use quakec_base::{Interner, SourcePos};

    #[test]
    fn allocated_nodes_reference_each_other() {
        let values = Arena::new();
        let exprs = Arena::new();
        let blocks = Arena::new();
        let value_refs = Arena::new();
        let expr_refs = Arena::new();
        let ctx = AstContext::new(&values, &exprs, &blocks, &value_refs, &expr_refs);

        let mut interner = Interner::new();
        let name = interner.intern("health");
        let v = ctx.alloc_value(Value::new(SourcePos::default(), name, TypeKind::Float));
        let e = ctx.alloc_expr(Expr::Value(v));

        assert_eq!(e.ty(), TypeKind::Float);
        assert!(matches!(e, Expr::Value(inner) if inner.name == name));
    }

    #[test]
    fn slices_preserve_order() {
        let values = Arena::new();
        let exprs = Arena::new();
        let blocks = Arena::new();
        let value_refs = Arena::new();
        let expr_refs = Arena::new();
        let ctx = AstContext::new(&values, &exprs, &blocks, &value_refs, &expr_refs);

        let mut interner = Interner::new();
        let a = ctx.alloc_value(Value::new(SourcePos::default(), interner.intern("a"), TypeKind::Float));
        let b = ctx.alloc_value(Value::new(SourcePos::default(), interner.intern("b"), TypeKind::Vector));
        let slice = ctx.alloc_value_slice(vec![a, b]);

        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0].ty, TypeKind::Float);
        assert_eq!(slice[1].ty, TypeKind::Vector);
    }
}
