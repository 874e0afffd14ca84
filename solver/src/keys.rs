use core::fmt::{Debug, Display};
use core::hash::Hash;

/// Identifiers the solver can propagate values through. Every identifier has
/// a negated counterpart, and negating twice gives back the original.
///
/// A stable identifier names an exact fact, e.g., the result of a method that
/// cannot be overridden. An unstable one names a fact that might not hold for
/// an overriding implementation: the solver only trusts the resolved value for
/// the negated polarity and uses top for the positive one.
///
/// Equation producers define one polarity per identifier, the other one is
/// only ever referenced.
pub trait Polarized: Clone + Eq + Hash + Debug {
    fn is_stable(&self) -> bool;

    fn negate(&self) -> Self;
}

/// An identifier built from an arbitrary base key. Both the stability and the
/// polarity are part of the identity, `Key::stable(k)` and `Key::unstable(k)`
/// name different equations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key<K> {
    pub base: K,
    pub stable: bool,
    pub negated: bool,
}

impl<K> Key<K> {
    pub fn stable(base: K) -> Self {
        Self {
            base,
            stable: true,
            negated: false,
        }
    }

    pub fn unstable(base: K) -> Self {
        Self {
            base,
            stable: false,
            negated: false,
        }
    }

    pub fn mk_stable(self) -> Self {
        Self {
            stable: true,
            ..self
        }
    }

    pub fn mk_unstable(self) -> Self {
        Self {
            stable: false,
            ..self
        }
    }
}

impl<K: Clone + Eq + Hash + Debug> Polarized for Key<K> {
    fn is_stable(&self) -> bool {
        self.stable
    }

    fn negate(&self) -> Self {
        Self {
            base: self.base.clone(),
            stable: self.stable,
            negated: !self.negated,
        }
    }
}

/// Negated keys are prefixed with `!`, unstable ones are suffixed with `?`.
impl<K: Display> Display for Key<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.negated {
            write!(f, "!")?;
        }
        write!(f, "{}", self.base)?;
        if !self.stable {
            write!(f, "?")?;
        }
        Ok(())
    }
}
