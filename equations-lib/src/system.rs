use core::fmt::Display;
use std::collections::HashMap;

use itertools::Itertools;
use solver::domains::Lattice;
use solver::{Equation, Key, Product, Rhs};

use crate::lexer::Location;

pub type EquationKey = Key<String>;

/// An equation together with the line it was defined on.
#[derive(Clone, Debug)]
pub struct Definition<D> {
    pub line: Location,
    pub equation: Equation<EquationKey, D>,
}

/// Pretty prints the equations in the same syntax the parser accepts.
pub fn print_equations<D>(definitions: &[Definition<D>], ctx: &D::LatticeContext) -> String
where
    D: Lattice + Display,
{
    definitions
        .iter()
        .map(|Definition { equation, .. }| {
            format!("{} = {};\n", equation.id, print_rhs(&equation.rhs, ctx))
        })
        .collect()
}

fn print_rhs<D>(rhs: &Rhs<EquationKey, D>, ctx: &D::LatticeContext) -> String
where
    D: Lattice + Display,
{
    match rhs {
        Rhs::Final(value) => value.to_string(),
        Rhs::Pending(sum) => sum.iter().map(|product| print_product(product, ctx)).join(" | "),
    }
}

/// Top is the unit of meet, it is omitted unless the product has no keys.
fn print_product<D>(product: &Product<EquationKey, D>, ctx: &D::LatticeContext) -> String
where
    D: Lattice + Display,
{
    let value = (product.value != D::top(ctx) || product.ids.is_empty())
        .then(|| product.value.to_string());
    value
        .into_iter()
        .chain(product.ids.iter().map(ToString::to_string))
        .join(" & ")
}

/// Prints one `key = value` line per defined key, sorted by key. Keys that
/// did not get a value are printed as `key = ?` when `show_unresolved` is set.
pub fn print_solution<D>(
    definitions: &[Definition<D>],
    solution: &HashMap<EquationKey, D>,
    show_unresolved: bool,
) -> String
where
    D: Display,
{
    definitions
        .iter()
        .map(|definition| &definition.equation.id)
        .sorted()
        .dedup()
        .filter_map(|key| match solution.get(key) {
            Some(value) => Some(format!("{key} = {value}\n")),
            None if show_unresolved => Some(format!("{key} = ?\n")),
            None => None,
        })
        .collect()
}
