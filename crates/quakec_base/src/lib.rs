//! # quakec-base
//!
//! Pure structural atoms for the quakec compiler front end.
//!
//! This crate provides the foundational types the rest of the compiler builds
//! upon:
//!
//! - [`Arena`]: bump allocation for stable AST references
//! - [`Interner`]/[`Symbol`]: string interning for O(1) name equality
//! - [`SourcePos`]: file/line positions for tokens, AST nodes, and diagnostics
//!
//! It has no knowledge of QuakeC syntax or the Quake VM. Higher-level crates
//! layer tokens, the AST, and the parser on top of these atoms.
//!
//! # Example
//!
//! ```
//! use quakec_base::{Arena, Interner, SourcePos};
//!
//! let mut interner = Interner::new();
//! let file = interner.intern("defs.qc");
//! let pos = SourcePos::new(file, 12);
//! assert_eq!(pos.render(&interner), "defs.qc:12");
//!
//! let arena: Arena<f32> = Arena::new();
//! let half = arena.alloc(0.5);
//! assert_eq!(*half, 0.5);
//! ```

pub mod arena;
pub mod intern;
pub mod pos;

pub use arena::Arena;
pub use intern::{Interner, Symbol, SymbolEq};
pub use pos::SourcePos;
