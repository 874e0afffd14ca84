use core::cmp::Ordering;
use core::fmt::{Debug, Display};
use core::hash::Hash;
use core::str::FromStr;

use thiserror::Error;

/////////////////////////
// Traits for domains. //
/////////////////////////

/// A join semi-lattice is a partially ordered set where the least upper
/// bound exists for every subset. Usually, the ordering relation can be viewed
/// as "safe approximation". In this library, Top represents the biggest
/// element (largest approximation), Bottom represents the smallest one.
pub trait JoinSemiLattice: Eq + PartialOrd + Clone + Debug {
    /// A type to hold some information about the lattice on the side.
    ///
    /// For some lattices we need to store somewhere the top or the bottom
    /// value. When we need no such values, set this to unit.
    type LatticeContext;

    /// The unit element of the join operation.
    ///
    /// Required to be the smallest element according to the ordering.
    fn bottom(ctx: &Self::LatticeContext) -> Self;

    /// Computes the least upper bound of the arguments. The solver uses it to
    /// combine the alternatives (products) of a pending equation.
    ///
    /// Requirements:
    /// * Reflexive: a.join(a, ctx) == a
    /// * Commutative: a.join(b, ctx) == b.join(a, ctx)
    /// * Bottom is unit: bottom.join(b, ctx) == b
    /// * Upper bound: a.join(b, ctx) >= a and a.join(b, ctx) >= b
    /// * Top is the largest: top.join(b, ctx) == top
    /// * Ordering is respected: a <= b => a.join(b, ctx) == b
    fn join(&self, other: &Self, ctx: &Self::LatticeContext) -> Self;
}

pub trait JoinSemiLatticeNoContext: JoinSemiLattice {
    /// See [JoinSemiLattice::bottom] for details. This version does not
    /// require a context.
    fn bottom_() -> Self;

    /// See [JoinSemiLattice::join] for details. This version does not
    /// require a context.
    fn join_(&self, other: &Self) -> Self;
}

impl<L: JoinSemiLattice<LatticeContext = ()>> JoinSemiLatticeNoContext for L {
    fn bottom_() -> Self {
        <L as JoinSemiLattice>::bottom(&())
    }

    fn join_(&self, other: &Self) -> Self {
        self.join(other, &())
    }
}

/// A lattice is a join semi-lattice that is also a meet semi-lattice, i.e.,
/// the greatest lower bound (meet) also exists for all subsets.
pub trait Lattice: JoinSemiLattice {
    /// The unit element of the meet operation, the largest element of the
    /// lattice.
    fn top(ctx: &Self::LatticeContext) -> Self;

    /// Computes the greatest lower bound. The solver uses it to tighten the
    /// value of a product when one of its dependencies gets resolved.
    ///
    /// * Reflexive: a.meet(a, ctx) == a
    /// * Commutative: a.meet(b, ctx) == b.meet(a, ctx)
    /// * Top is unit: top.meet(b, ctx) == b
    /// * Lower bound: a.meet(b, ctx) <= a and a.meet(b, ctx) <= b
    /// * Bottom is the smallest: bottom.meet(b, ctx) == bottom
    /// * Ordering is respected: a <= b => a.meet(b, ctx) == a
    ///
    /// The solver relies on the bottom requirement when it drops products
    /// whose value is already bottom, regardless of their dependencies.
    fn meet(&self, other: &Self, ctx: &Self::LatticeContext) -> Self;
}

pub trait LatticeNoContext: Lattice {
    /// See [Lattice::top] for details. This version does not
    /// require a context.
    fn top_() -> Self;

    /// See [Lattice::meet] for details. This version does not
    /// require a context.
    fn meet_(&self, other: &Self) -> Self;
}

impl<L: Lattice<LatticeContext = ()>> LatticeNoContext for L {
    fn top_() -> Self {
        <L as Lattice>::top(&())
    }

    fn meet_(&self, other: &Self) -> Self {
        self.meet(other, &())
    }
}

/// Returned when a textual lattice value cannot be recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown lattice value '{0}'")]
pub struct UnknownValue(pub String);

/////////////////////////////////////
// Concrete domain implementations //
/////////////////////////////////////

/// Bool is a lattice, where false is bottom and true is top,
/// join is or, meet is and.
impl JoinSemiLattice for bool {
    type LatticeContext = ();

    fn bottom(_ctx: &Self::LatticeContext) -> Self {
        false
    }

    fn join(&self, other: &Self, _ctx: &Self::LatticeContext) -> Self {
        *self || *other
    }
}

impl Lattice for bool {
    fn top(_ctx: &Self::LatticeContext) -> Self {
        true
    }

    fn meet(&self, other: &Self, _ctx: &Self::LatticeContext) -> Self {
        *self && *other
    }
}

/// A three element chain, useful for properties that can be ruled out,
/// established, or neither.
///
/// ```txt
///    Yes
///     |
///   Maybe
///     |
///    No
/// ```
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash)]
pub enum Ternary {
    No,
    Maybe,
    Yes,
}

impl Display for Ternary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl FromStr for Ternary {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "No" => Ok(Ternary::No),
            "Maybe" => Ok(Ternary::Maybe),
            "Yes" => Ok(Ternary::Yes),
            _ => Err(UnknownValue(s.to_owned())),
        }
    }
}

impl JoinSemiLattice for Ternary {
    type LatticeContext = ();

    fn bottom(_: &Self::LatticeContext) -> Self {
        Ternary::No
    }

    fn join(&self, other: &Self, _: &Self::LatticeContext) -> Self {
        *self.max(other)
    }
}

impl Lattice for Ternary {
    fn top(_: &Self::LatticeContext) -> Self {
        Ternary::Yes
    }

    fn meet(&self, other: &Self, _: &Self::LatticeContext) -> Self {
        *self.min(other)
    }
}

/// Adds a new bottom and top to a set of incomparable elements.
///
/// ```txt
///          Top
///       /   |   \
///   Elem(a) ... Elem(z)
///       \   |   /
///         Bottom
/// ```
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Flat<T> {
    Bottom,
    Elem(T),
    Top,
}

impl<T: Eq> PartialOrd for Flat<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        match (self, other) {
            (Flat::Bottom, _) | (_, Flat::Top) => Some(Ordering::Less),
            (Flat::Top, _) | (_, Flat::Bottom) => Some(Ordering::Greater),
            _ => None,
        }
    }
}

impl<T: Display> Display for Flat<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Flat::Bottom => write!(f, "Bot"),
            Flat::Elem(elem) => write!(f, "{elem}"),
            Flat::Top => write!(f, "Top"),
        }
    }
}

impl<T: FromStr> FromStr for Flat<T> {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bot" => Ok(Flat::Bottom),
            "Top" => Ok(Flat::Top),
            _ => T::from_str(s)
                .map(Flat::Elem)
                .map_err(|_| UnknownValue(s.to_owned())),
        }
    }
}

impl<T: Eq + Clone + Debug> JoinSemiLattice for Flat<T> {
    type LatticeContext = ();

    fn bottom(_: &Self::LatticeContext) -> Self {
        Flat::Bottom
    }

    fn join(&self, other: &Self, _: &Self::LatticeContext) -> Self {
        match (self, other) {
            (Flat::Bottom, x) | (x, Flat::Bottom) => x.clone(),
            (x, y) if x == y => x.clone(),
            _ => Flat::Top,
        }
    }
}

impl<T: Eq + Clone + Debug> Lattice for Flat<T> {
    fn top(_: &Self::LatticeContext) -> Self {
        Flat::Top
    }

    fn meet(&self, other: &Self, _: &Self::LatticeContext) -> Self {
        match (self, other) {
            (Flat::Top, x) | (x, Flat::Top) => x.clone(),
            (x, y) if x == y => x.clone(),
            _ => Flat::Bottom,
        }
    }
}

/// The facts inferred about a method by a bytecode level contract inference:
/// what it returns, and whether it is free of side effects.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash)]
pub enum Contract {
    NotNull,
    Null,
    True,
    False,
    Pure,
}

impl Display for Contract {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl FromStr for Contract {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NotNull" => Ok(Contract::NotNull),
            "Null" => Ok(Contract::Null),
            "True" => Ok(Contract::True),
            "False" => Ok(Contract::False),
            "Pure" => Ok(Contract::Pure),
            _ => Err(UnknownValue(s.to_owned())),
        }
    }
}

/// Contracts form a flat lattice: two different contracts can not hold at
/// the same time, so their join is Top (nothing is known) and their meet is
/// Bottom (unreachable).
pub type ContractValue = Flat<Contract>;
