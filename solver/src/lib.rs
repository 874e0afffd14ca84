//! This crate solves systems of monotone equations over finite lattices. It is
//! the last step of an interprocedural analysis that summarizes every method
//! (or any other unit of code) separately: the summary of a unit is either
//! already known, or it is a symbolic expression that refers to the summaries
//! of other units. Solving the system computes the least fixed point, the
//! final lattice value of every unit whose value can be determined.
//!
//! The symbolic expressions are kept in sum-of-products form. A [`equations::Product`]
//! is the meet of a known value with the (not yet known) values of a set of
//! identifiers, and a pending [`equations::Rhs`] is the join of its products.
//! The [`solvers::Solver`] propagates resolved values along the reverse
//! dependency edges using a worklist, so it only revisits equations that
//! mention an identifier that was just resolved.
//!
//! Identifiers carry a polarity (see [`keys::Key`]). A fact about a unit that
//! can be overridden cannot be trusted as an exact fact, so the solver
//! propagates the conservative top value to the positive polarity of such
//! identifiers and the real value only to the negated one.
//!
//! Some resources on the technique:
//! * [Data-flow analysis](https://en.wikipedia.org/wiki/Data-flow_analysis)
//! * [Static Program Analysis, Anders Møller and Michael I. Schwartzbach](https://cs.au.dk/~amoeller/spa/)
//! * [Introduction to Static Analysis, Xavier Rival and Kwangkeun Yi](https://mitpress.mit.edu/9780262043410/introduction-to-static-analysis/)

/// A curated collection of lattices the solver can work with.
pub mod domains;

/// Symbolic right-hand sides: products, sums of products and their join.
pub mod equations;

/// Identifiers with a stability flag and a negated counterpart.
pub mod keys;

/// The worklist based equation solver.
pub mod solvers;

pub use equations::{Equation, Product, Rhs, SolverError};
pub use keys::{Key, Polarized};
pub use solvers::{DEFAULT_EQUATION_SIZE_LIMIT, Solver, SolverConfig};


#[cfg(test)]
mod solvers_tests;
