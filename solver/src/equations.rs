use core::hash::Hash;
use std::collections::BTreeSet;

use indexmap::IndexSet;
use thiserror::Error;

use crate::domains::Lattice;

/// The ways registering or building an equation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError<K> {
    /// The products of a sum refer to more identifiers than permitted.
    /// Analyzing the unit should be abandoned rather than risking a blowup.
    #[error("equation size {size} exceeds the limit of {limit}")]
    EquationTooLarge { size: usize, limit: usize },

    /// The same identifier was defined twice. The first definition is kept.
    #[error("duplicate equation for {0:?}")]
    DuplicateEquation(K),
}

/// The meet of `value` and the final values of all the identifiers in `ids`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Product<K, D> {
    pub value: D,
    pub ids: BTreeSet<K>,
}

impl<K: Ord, D> Product<K, D> {
    pub fn new(value: D, ids: impl IntoIterator<Item = K>) -> Self {
        Self {
            value,
            ids: ids.into_iter().collect(),
        }
    }

    /// A product without dependencies, it always evaluates to `value`.
    pub fn constant(value: D) -> Self {
        Self {
            value,
            ids: BTreeSet::new(),
        }
    }
}

/// The right hand side of an equation. Either the value is already known, or
/// it is the join of a set of products. An empty sum stands for bottom.
#[derive(Clone, Debug)]
pub enum Rhs<K, D> {
    Final(D),
    Pending(IndexSet<Product<K, D>>),
}

impl<K: Hash + Eq, D: Hash + Eq> PartialEq for Rhs<K, D> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Rhs::Final(lhs), Rhs::Final(rhs)) => lhs == rhs,
            (Rhs::Pending(lhs), Rhs::Pending(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl<K: Hash + Eq, D: Hash + Eq> Eq for Rhs<K, D> {}

impl<K, D> Rhs<K, D>
where
    K: Ord + Hash,
    D: Lattice + Hash,
{
    pub fn pending(products: impl IntoIterator<Item = Product<K, D>>) -> Self {
        Rhs::Pending(products.into_iter().collect())
    }

    /// The number of identifier occurrences over all the products.
    pub fn size(&self) -> usize {
        match self {
            Rhs::Final(_) => 0,
            Rhs::Pending(sum) => sum_size(sum),
        }
    }

    /// Over-approximates the two right hand sides, keeping the result
    /// symbolic when either side is pending. Top absorbs everything. Joining
    /// two pending sums fails when the result would refer to more than
    /// `limit` identifiers.
    pub fn join(
        self,
        other: Self,
        ctx: &D::LatticeContext,
        limit: usize,
    ) -> Result<Self, SolverError<K>> {
        let top = D::top(ctx);
        if matches!(&self, Rhs::Final(value) if *value == top) {
            return Ok(self);
        }
        if matches!(&other, Rhs::Final(value) if *value == top) {
            return Ok(other);
        }

        match (self, other) {
            (Rhs::Final(lhs), Rhs::Final(rhs)) => Ok(Rhs::Final(lhs.join(&rhs, ctx))),
            (Rhs::Final(value), Rhs::Pending(mut sum))
            | (Rhs::Pending(mut sum), Rhs::Final(value)) => {
                sum.insert(Product::constant(value));
                Ok(Rhs::Pending(sum))
            }
            (Rhs::Pending(mut lhs), Rhs::Pending(rhs)) => {
                lhs.extend(rhs);
                let size = sum_size(&lhs);
                if size > limit {
                    return Err(SolverError::EquationTooLarge { size, limit });
                }
                Ok(Rhs::Pending(lhs))
            }
        }
    }
}

fn sum_size<K, D>(sum: &IndexSet<Product<K, D>>) -> usize {
    sum.iter().map(|product| product.ids.len()).sum()
}

/// Binds an identifier to its right hand side. This is the unit of input
/// for the [`crate::solvers::Solver`].
#[derive(Clone, Debug)]
pub struct Equation<K, D> {
    pub id: K,
    pub rhs: Rhs<K, D>,
}

impl<K, D> Equation<K, D> {
    pub fn new(id: K, rhs: Rhs<K, D>) -> Self {
        Self { id, rhs }
    }
}
