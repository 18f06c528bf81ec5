//! The operator table.
//!
//! One row per operator spelling the expression parser understands. Lookup
//! is a linear scan; the table is a handful of rows and the scan cost is
//! invisible next to everything else a reduction does.

use bitflags::bitflags;

bitflags! {
    /// Positional classes an operator can occupy.
    ///
    /// Only infix operators exist today; the prefix and suffix classes are
    /// carried so the table shape does not change when they arrive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpFlags: u8 {
        const PREFIX = 1 << 0;
        const INFIX = 1 << 1;
        const SUFFIX = 1 << 2;
    }
}

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// Unique identity of an operator, independent of spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperId {
    Comma,
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

/// One operator-table row.
#[derive(Debug)]
pub struct OperInfo {
    pub op: &'static str,
    pub operands: u8,
    pub id: OperId,
    pub assoc: Assoc,
    pub prec: u8,
    pub flags: OpFlags,
}

impl OperInfo {
    /// Returns `true` when `self`, arriving at the operator stack, must let
    /// `top` reduce first: `top` binds strictly tighter, or equally tight
    /// with `self` left-associative.
    pub fn yields_to(&self, top: &OperInfo) -> bool {
        self.prec < top.prec || (self.assoc == Assoc::Left && self.prec <= top.prec)
    }
}

/// The operator table. Comma binds loosest; assignment is the only
/// right-associative entry.
pub const OPERATORS: &[OperInfo] = &[
    OperInfo { op: ",", operands: 2, id: OperId::Comma, assoc: Assoc::Left, prec: 1, flags: OpFlags::INFIX },
    OperInfo { op: "=", operands: 2, id: OperId::Assign, assoc: Assoc::Right, prec: 2, flags: OpFlags::INFIX },
    OperInfo { op: "+", operands: 2, id: OperId::Add, assoc: Assoc::Left, prec: 3, flags: OpFlags::INFIX },
    OperInfo { op: "-", operands: 2, id: OperId::Sub, assoc: Assoc::Left, prec: 3, flags: OpFlags::INFIX },
    OperInfo { op: "*", operands: 2, id: OperId::Mul, assoc: Assoc::Left, prec: 4, flags: OpFlags::INFIX },
    OperInfo { op: "/", operands: 2, id: OperId::Div, assoc: Assoc::Left, prec: 4, flags: OpFlags::INFIX },
];

/// Finds the infix table row for a spelling.
pub fn find_infix(spelling: &str) -> Option<&'static OperInfo> {
    OPERATORS.iter().find(|o| {
        o.flags.contains(OpFlags::INFIX)
            && !o.flags.intersects(OpFlags::PREFIX.union(OpFlags::SUFFIX))
            && o.op == spelling
    })
}
