//! The layered symbol table.
//!
//! Three scopes, searched locals first, then the active function's
//! parameters (the parser owns those bindings), then globals:
//!
//! - **Globals** are a flat ordered list; duplicates are rejected outright.
//! - **Locals** are one append-only stack shared by all nested blocks, with
//!   a *block watermark* marking where the current block's entries begin.
//!   Opening a block saves the watermark and raises it to the stack top;
//!   closing pops entries back down to it and restores the saved value.
//!
//! The watermark is what makes the redeclaration rule cheap: a name may
//! shadow an outer binding, but declaring it twice in the same block is an
//! error, detected by searching only from the watermark up.

use std::collections::HashMap;

use quakec_base::Symbol;

use crate::ast::Expr;
use crate::program::GlobalEntry;

/// Globals plus the watermarked locals stack.
pub struct SymbolTable<'a> {
    globals: Vec<GlobalEntry<'a>>,
    global_index: HashMap<Symbol, usize>,
    locals: Vec<(Symbol, &'a Expr<'a>)>,
    block_start: usize,
}

impl<'a> SymbolTable<'a> {
    pub fn new() -> Self {
        SymbolTable {
            globals: Vec::new(),
            global_index: HashMap::new(),
            locals: Vec::new(),
            block_start: 0,
        }
    }

    /// Registers a global.
    ///
    /// Duplicate rejection is the declaration parser's job (it checks with
    /// [`find_global`](Self::find_global) first); vector component aliases
    /// are registered here unchecked, in the shadow of their base
    /// declaration.
    pub fn insert_global(&mut self, name: Symbol, node: &'a Expr<'a>) {
        self.global_index.entry(name).or_insert(self.globals.len());
        self.globals.push(GlobalEntry { name, node });
    }

    /// Resolves a global by name.
    pub fn find_global(&self, name: Symbol) -> Option<&'a Expr<'a>> {
        self.global_index.get(&name).map(|&i| self.globals[i].node)
    }

    /// Pushes a local binding for the current block.
    pub fn push_local(&mut self, name: Symbol, node: &'a Expr<'a>) {
        self.locals.push((name, node));
    }

    /// Searches the locals stack from the top down to index `upto`.
    ///
    /// `upto == 0` searches every live local; `upto == ` the current
    /// watermark restricts the search to the current block, which is the
    /// same-block redeclaration check.
    pub fn find_local(&self, name: Symbol, upto: usize) -> Option<&'a Expr<'a>> {
        self.locals[upto..]
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, node)| *node)
    }

    /// Searches only the current block's locals.
    pub fn find_local_in_block(&self, name: Symbol) -> Option<&'a Expr<'a>> {
        self.find_local(name, self.block_start)
    }

    /// Opens a block: raises the watermark to the stack top and returns the
    /// previous watermark for [`leave_block`](Self::leave_block).
    pub fn enter_block(&mut self) -> usize {
        let saved = self.block_start;
        self.block_start = self.locals.len();
        saved
    }

    /// Closes a block: pops this block's locals and restores the watermark.
    pub fn leave_block(&mut self, saved: usize) {
        self.locals.truncate(self.block_start);
        self.block_start = saved;
    }

    /// Number of live locals, all blocks included.
    pub fn locals_len(&self) -> usize {
        self.locals.len()
    }

    /// Number of registered globals, vector aliases included.
    pub fn globals_len(&self) -> usize {
        self.globals.len()
    }

    /// Surrenders the ordered global list for program assembly.
    pub fn into_globals(self) -> Vec<GlobalEntry<'a>> {
        self.globals
    }
}

impl<'a> Default for SymbolTable<'a> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Value;
    use crate::types::TypeKind;
    use quakec_base::{Arena, Interner, SourcePos};

    fn value_node<'a>(
        values: &'a Arena<Value<'a>>,
        exprs: &'a Arena<Expr<'a>>,
        name: Symbol,
        ty: TypeKind,
    ) -> &'a Expr<'a> {
        let v = values.alloc(Value::new(SourcePos::default(), name, ty));
        exprs.alloc(Expr::Value(v))
    }

    #[test]
    fn registered_globals_are_found_by_name() {
        let values = Arena::new();
        let exprs = Arena::new();
        let mut interner = Interner::new();
        let mut table = SymbolTable::new();
        let name = interner.intern("frags");
        let node = value_node(&values, &exprs, name, TypeKind::Float);
        assert!(table.find_global(name).is_none());
        table.insert_global(name, node);
        assert!(std::ptr::eq(table.find_global(name).unwrap(), node));
        assert_eq!(table.globals_len(), 1);
    }

    #[test]
    fn globals_resolve_to_first_registration() {
        let values = Arena::new();
        let exprs = Arena::new();
        let mut interner = Interner::new();
        let mut table = SymbolTable::new();
        let name = interner.intern("v_x");
        let first = value_node(&values, &exprs, name, TypeKind::Float);
        let second = value_node(&values, &exprs, name, TypeKind::Vector);
        table.insert_global(name, first);
        table.insert_global(name, second);
        assert!(std::ptr::eq(table.find_global(name).unwrap(), first));
    }

    #[test]
    fn inner_block_shadows_and_pops() {
        let values = Arena::new();
        let exprs = Arena::new();
        let mut interner = Interner::new();
        let mut table = SymbolTable::new();
        let name = interner.intern("x");
        let outer = value_node(&values, &exprs, name, TypeKind::Float);
        let inner = value_node(&values, &exprs, name, TypeKind::Vector);

        let top = table.enter_block();
        table.push_local(name, outer);

        let saved = table.enter_block();
        table.push_local(name, inner);
        assert!(std::ptr::eq(table.find_local(name, 0).unwrap(), inner));
        table.leave_block(saved);

        assert!(std::ptr::eq(table.find_local(name, 0).unwrap(), outer));
        table.leave_block(top);
        assert_eq!(table.locals_len(), 0);
    }

    #[test]
    fn block_watermark_bounds_the_redeclaration_check() {
        let values = Arena::new();
        let exprs = Arena::new();
        let mut interner = Interner::new();
        let mut table = SymbolTable::new();
        let name = interner.intern("x");
        let node = value_node(&values, &exprs, name, TypeKind::Float);

        let top = table.enter_block();
        table.push_local(name, node);

        let saved = table.enter_block();
        // Shadowing is legal: the outer binding is below the watermark.
        assert!(table.find_local_in_block(name).is_none());
        table.push_local(name, node);
        // A second declaration in the same block is not.
        assert!(table.find_local_in_block(name).is_some());
        table.leave_block(saved);

        // Back in the outer block, the original binding is in scope again.
        assert!(table.find_local_in_block(name).is_some());
        table.leave_block(top);
    }

    #[test]
    fn locals_length_is_restored_after_nested_blocks() {
        let values = Arena::new();
        let exprs = Arena::new();
        let mut interner = Interner::new();
        let mut table = SymbolTable::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let node = value_node(&values, &exprs, a, TypeKind::Float);

        let top = table.enter_block();
        table.push_local(a, node);
        let before = table.locals_len();

        let saved = table.enter_block();
        table.push_local(b, node);
        table.push_local(b, node);
        table.leave_block(saved);

        assert_eq!(table.locals_len(), before);
        table.leave_block(top);
    }
}
