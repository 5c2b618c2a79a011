//! Machine-dependent back end for the ND-100, a 16-bit minicomputer
//! with one-word instructions and octal-first notation. The generic
//! driver owns files, directives, and symbols' lifecycle; this crate
//! owns everything that knows the target: the instruction table, the
//! operand grammar, the two-pass encode/resolve split, and the
//! relocation word format.
//!
//! Pass 1 ([`pass1::Pass1`]) parses operands and queues one
//! [`buffer::PartialInstruction`] per source instruction; pass 2
//! ([`pass2::Pass2`]) drains the queue strictly in order, resolves the
//! deferred displacement expressions against the completed symbol
//! table, and emits finished words plus [`reloc::RelocRecord`]s.

#[macro_use]
mod macros;

pub mod buffer;
pub mod config;
pub mod error;
pub mod expr;
pub mod instructions;
pub mod lexer;
pub mod mach;
pub mod pass1;
pub mod pass2;
pub mod reloc;
pub mod symbols;

pub use error::{Diagnostics, Error, ErrorKind};
