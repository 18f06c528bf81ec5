//! The constant pool.
//!
//! Literals are pooled: every occurrence of the same float, string, or
//! vector constant in a compile resolves to one shared `#IMMEDIATE` value
//! node. Pool order is first-seen order, which is the order the constants
//! are later emitted as globals, ahead of any user global.
//!
//! Equality follows the VM's constant tables: floats bit-for-bit, strings
//! byte-for-byte (symbol equality, since strings are interned), vectors
//! componentwise bit-for-bit.

use std::collections::HashMap;

use quakec_base::{SourcePos, Symbol};

use crate::arena_ctx::AstContext;
use crate::ast::{ConstVal, Expr, Value};
use crate::types::{TypeKind, Vec3};

struct PoolEntry<'a> {
    value: &'a Value<'a>,
    node: &'a Expr<'a>,
}

/// Pools float, string, and vector literals into shared value nodes.
pub struct ConstPool<'a> {
    ctx: AstContext<'a>,
    /// The synthetic name every pooled constant carries.
    immediate: Symbol,
    floats: Vec<PoolEntry<'a>>,
    float_index: HashMap<u64, usize>,
    strings: Vec<PoolEntry<'a>>,
    string_index: HashMap<Symbol, usize>,
    vectors: Vec<PoolEntry<'a>>,
    vector_index: HashMap<[u32; 3], usize>,
}

impl<'a> ConstPool<'a> {
    pub fn new(ctx: AstContext<'a>, immediate: Symbol) -> Self {
        ConstPool {
            ctx,
            immediate,
            floats: Vec::new(),
            float_index: HashMap::new(),
            strings: Vec::new(),
            string_index: HashMap::new(),
            vectors: Vec::new(),
            vector_index: HashMap::new(),
        }
    }

    fn entry(&self, ty: TypeKind, payload: ConstVal, pos: SourcePos) -> PoolEntry<'a> {
        let value = self.ctx.alloc_value(Value {
            is_const: true,
            payload: Some(payload),
            ..Value::new(pos, self.immediate, ty)
        });
        PoolEntry {
            value,
            node: self.ctx.alloc_expr(Expr::Value(value)),
        }
    }

    /// Returns the shared node for a float literal, pooling it on first use.
    pub fn intern_float(&mut self, pos: SourcePos, d: f64) -> &'a Expr<'a> {
        if let Some(&i) = self.float_index.get(&d.to_bits()) {
            return self.floats[i].node;
        }
        let entry = self.entry(TypeKind::Float, ConstVal::Float(d), pos);
        let node = entry.node;
        self.float_index.insert(d.to_bits(), self.floats.len());
        self.floats.push(entry);
        node
    }

    /// Returns the shared node for a string literal.
    pub fn intern_string(&mut self, pos: SourcePos, s: Symbol) -> &'a Expr<'a> {
        if let Some(&i) = self.string_index.get(&s) {
            return self.strings[i].node;
        }
        let entry = self.entry(TypeKind::String, ConstVal::Str(s), pos);
        let node = entry.node;
        self.string_index.insert(s, self.strings.len());
        self.strings.push(entry);
        node
    }

    /// Returns the shared node for a vector literal.
    pub fn intern_vector(&mut self, pos: SourcePos, v: Vec3) -> &'a Expr<'a> {
        if let Some(&i) = self.vector_index.get(&v.bits()) {
            return self.vectors[i].node;
        }
        let entry = self.entry(TypeKind::Vector, ConstVal::Vector(v), pos);
        let node = entry.node;
        self.vector_index.insert(v.bits(), self.vectors.len());
        self.vectors.push(entry);
        node
    }

    /// The pooled constants in first-seen order, ready for emission.
    pub fn into_values(self) -> (Vec<&'a Value<'a>>, Vec<&'a Value<'a>>, Vec<&'a Value<'a>>) {
        (
            self.floats.into_iter().map(|e| e.value).collect(),
            self.strings.into_iter().map(|e| e.value).collect(),
            self.vectors.into_iter().map(|e| e.value).collect(),
        )
    }
}
