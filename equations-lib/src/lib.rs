//! A small text format for equation systems, mostly useful to experiment
//! with the solver and to write tests:
//!
//! ```txt
//! # Comments run until the end of the line.
//! callee = NotNull;
//! caller = callee | Null & other;
//! wrapper = !overridable?;
//! ```
//!
//! A key can be prefixed with `!` to refer to its negated polarity and
//! suffixed with `?` to mark it unstable.

pub mod lexer;
pub mod parser;
pub mod system;

#[cfg(test)]
mod lexer_tests;
