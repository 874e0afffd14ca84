use std::collections::HashMap;

use fixedbitset::FixedBitSet;
use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::domains::Lattice;
use crate::equations::{Equation, Rhs, SolverError};
use crate::keys::Polarized;

/// Default for [`SolverConfig::equation_size_limit`].
pub const DEFAULT_EQUATION_SIZE_LIMIT: usize = 30;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SolverConfig {
    /// The maximum number of identifier occurrences over all the products of
    /// a single equation. Larger equations are rejected.
    pub equation_size_limit: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            equation_size_limit: DEFAULT_EQUATION_SIZE_LIMIT,
        }
    }
}

/// A product whose dependencies are interned handles, kept sorted.
#[derive(Clone, Debug)]
struct Component<D> {
    value: D,
    ids: Vec<usize>,
}

enum Term<D> {
    Final(D),
    Pending(Vec<Component<D>>),
}

/// Computes the least solution of a system of monotone equations using a
/// worklist. Identifiers are interned, the solver state is indexed by the
/// resulting dense handles.
///
/// Usage: register every equation with [`Solver::add_equation`], then call
/// [`Solver::solve`]. Identifiers that are part of a cycle nothing breaks
/// never get a value, they are missing from the solution.
///
/// Define at most one polarity of every identifier. When both `x` and its
/// negation have an equation, both values are propagated to the references
/// of either polarity, and the one resolved last in worklist order wins, so
/// the solution depends on the registration order.
pub struct Solver<K, D: Lattice> {
    ctx: D::LatticeContext,
    config: SolverConfig,
    keys: IndexSet<K>,
    /// Handles that have an equation.
    defined: FixedBitSet,
    solved: Vec<Option<D>>,
    pending: Vec<Option<Vec<Component<D>>>>,
    /// Reverse edges, the equations mentioning a handle.
    dependencies: Vec<Vec<usize>>,
    /// Resolved handles whose dependents were not yet notified.
    moving: Vec<usize>,
    size: usize,
}

impl<K, D> Solver<K, D>
where
    K: Polarized,
    D: Lattice,
{
    pub fn new(ctx: D::LatticeContext, config: SolverConfig) -> Self {
        Self {
            ctx,
            config,
            keys: IndexSet::new(),
            defined: FixedBitSet::new(),
            solved: Vec::new(),
            pending: Vec::new(),
            dependencies: Vec::new(),
            moving: Vec::new(),
            size: 0,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The number of equations registered so far.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The number of equations that are still symbolic.
    pub fn pending_len(&self) -> usize {
        self.pending.iter().filter(|sum| sum.is_some()).count()
    }

    /// Registers an equation. Fails when the identifier already has an
    /// equation (the first one is kept) or when the right hand side refers
    /// to more identifiers than the configured limit. The solver stays usable
    /// after an error.
    pub fn add_equation(&mut self, equation: Equation<K, D>) -> Result<(), SolverError<K>> {
        let Equation { id, rhs } = equation;
        let handle = self.intern(id);
        if self.defined.contains(handle) {
            return Err(SolverError::DuplicateEquation(self.keys[handle].clone()));
        }

        let sum = match rhs {
            Rhs::Final(value) => {
                self.register(handle);
                self.resolve(handle, value);
                return Ok(());
            }
            Rhs::Pending(sum) => sum,
        };

        let size: usize = sum.iter().map(|product| product.ids.len()).sum();
        let limit = self.config.equation_size_limit;
        if size > limit {
            return Err(SolverError::EquationTooLarge { size, limit });
        }
        self.register(handle);

        let mut components = Vec::with_capacity(sum.len());
        for product in sum {
            let mut ids: Vec<usize> = product.ids.into_iter().map(|k| self.intern(k)).collect();
            ids.sort_unstable();
            components.push(Component {
                value: product.value,
                ids,
            });
        }

        match normalize(components, &self.ctx) {
            Term::Final(value) => self.resolve(handle, value),
            Term::Pending(components) => {
                let mut triggers: Vec<usize> = components
                    .iter()
                    .flat_map(|component| component.ids.iter().copied())
                    .collect();
                triggers.sort_unstable();
                triggers.dedup();
                for trigger in triggers {
                    self.dependencies[trigger].push(handle);
                }
                debug!(key = ?self.keys[handle], products = components.len(), "pending");
                self.pending[handle] = Some(components);
            }
        }
        Ok(())
    }

    /// Runs the propagation until no new identifier gets resolved. Returns
    /// the values of the resolved identifiers, unresolved ones are absent.
    pub fn solve(mut self) -> HashMap<K, D> {
        let top = D::top(&self.ctx);
        while let Some(handle) = self.moving.pop() {
            let Some(value) = self.solved[handle].clone() else {
                continue;
            };
            let key = &self.keys[handle];
            let negated = self.keys.get_index_of(&key.negate());
            let propagations = if key.is_stable() {
                [(Some(handle), value.clone()), (negated, value)]
            } else {
                [(negated, value), (Some(handle), top.clone())]
            };

            for (trigger, trigger_value) in propagations {
                if let Some(trigger) = trigger {
                    self.propagate(trigger, &trigger_value);
                }
            }
        }

        debug!(
            solved = self.solved.iter().filter(|value| value.is_some()).count(),
            unresolved = self.pending_len(),
            "solver finished"
        );

        self.keys
            .into_iter()
            .zip(self.solved)
            .filter_map(|(key, value)| Some((key, value?)))
            .collect()
    }

    fn intern(&mut self, key: K) -> usize {
        let (handle, inserted) = self.keys.insert_full(key);
        if inserted {
            self.solved.push(None);
            self.pending.push(None);
            self.dependencies.push(Vec::new());
            self.defined.grow(handle + 1);
        }
        handle
    }

    fn register(&mut self, handle: usize) {
        self.defined.insert(handle);
        self.size += 1;
    }

    fn resolve(&mut self, handle: usize, value: D) {
        debug!(key = ?self.keys[handle], ?value, "resolved");
        self.solved[handle] = Some(value);
        self.moving.push(handle);
    }

    /// Substitutes the value of `trigger` into every equation mentioning it.
    fn propagate(&mut self, trigger: usize, value: &D) {
        let dependents = core::mem::take(&mut self.dependencies[trigger]);
        for &dependent in &dependents {
            let Some(sum) = self.pending[dependent].take() else {
                continue;
            };
            trace!(
                from = ?self.keys[trigger],
                to = ?self.keys[dependent],
                ?value,
                "substitute"
            );
            match substitute(sum, trigger, value, &self.ctx) {
                Term::Final(result) => self.resolve(dependent, result),
                Term::Pending(sum) => self.pending[dependent] = Some(sum),
            }
        }
        self.dependencies[trigger] = dependents;
    }
}

fn substitute<D: Lattice>(
    mut sum: Vec<Component<D>>,
    id: usize,
    value: &D,
    ctx: &D::LatticeContext,
) -> Term<D> {
    for component in &mut sum {
        if let Ok(pos) = component.ids.binary_search(&id) {
            component.ids.remove(pos);
            component.value = component.value.meet(value, ctx);
        }
    }
    normalize(sum, ctx)
}

/// Folds the products that are already known into a single value. Products
/// without dependencies are known, and so are products with a bottom value,
/// since meet with bottom is bottom. The folded constants are kept as one
/// product without dependencies, so they still contribute after later
/// substitutions.
fn normalize<D: Lattice>(sum: Vec<Component<D>>, ctx: &D::LatticeContext) -> Term<D> {
    let bottom = D::bottom(ctx);
    let mut acc = bottom.clone();
    let mut symbolic = Vec::with_capacity(sum.len());
    for component in sum {
        if component.ids.is_empty() || component.value == bottom {
            acc = acc.join(&component.value, ctx);
        } else {
            symbolic.push(component);
        }
    }

    if symbolic.is_empty() || acc == D::top(ctx) {
        return Term::Final(acc);
    }
    if acc != bottom {
        symbolic.push(Component {
            value: acc,
            ids: Vec::new(),
        });
    }
    Term::Pending(symbolic)
}
