use std::collections::HashMap;

use itertools::Itertools;
use proptest::prelude::*;

use crate::domains::{Contract, ContractValue, Flat, Ternary, Ternary::*};
use crate::equations::{Equation, Product, Rhs, SolverError};
use crate::keys::{Key, Polarized};
use crate::solvers::{Solver, SolverConfig};

type TestKey = Key<&'static str>;
type TestEquation = Equation<TestKey, Ternary>;

fn key(name: &'static str) -> TestKey {
    Key::stable(name)
}

fn fin(id: TestKey, value: Ternary) -> TestEquation {
    Equation::new(id, Rhs::Final(value))
}

fn sum(id: TestKey, products: &[(Ternary, &[TestKey])]) -> TestEquation {
    Equation::new(
        id,
        Rhs::pending(
            products
                .iter()
                .map(|(value, ids)| Product::new(*value, ids.iter().copied())),
        ),
    )
}

fn solve(equations: impl IntoIterator<Item = TestEquation>) -> HashMap<TestKey, Ternary> {
    let mut solver = Solver::new((), SolverConfig::default());
    for equation in equations {
        solver.add_equation(equation).expect("valid equation");
    }
    solver.solve()
}

#[test]
fn final_equation() {
    let x = key("x");
    let solution = solve([fin(x, Yes)]);
    assert_eq!(solution, HashMap::from([(x, Yes)]));
}

#[test]
fn bottom_product_is_folded() {
    let (x, y) = (key("x"), key("y"));
    let mut solver = Solver::new((), SolverConfig::default());
    solver.add_equation(sum(x, &[(No, &[y])])).unwrap();
    // Resolved at registration time, without waiting for y.
    assert_eq!(solver.pending_len(), 0);
    solver.add_equation(fin(y, Maybe)).unwrap();
    let solution = solver.solve();
    assert_eq!(solution.get(&x), Some(&No));
    assert_eq!(solution.get(&y), Some(&Maybe));
}

#[test]
fn unstable_self_reference_stays_unresolved() {
    let x = Key::unstable("x");
    let mut solver = Solver::new((), SolverConfig::default());
    solver.add_equation(sum(x, &[(Maybe, &[x.negate()])])).unwrap();
    assert_eq!(solver.pending_len(), 1);
    let solution = solver.solve();
    assert!(solution.is_empty());
    assert_eq!(solution.get(&x), None);
}

#[test]
fn constant_products_normalize_at_registration() {
    let x = key("x");
    let mut solver = Solver::new((), SolverConfig::default());
    solver.add_equation(sum(x, &[(No, &[]), (Maybe, &[])])).unwrap();
    assert_eq!(solver.pending_len(), 0);
    assert_eq!(solver.solve(), HashMap::from([(x, Maybe)]));
}

#[test]
fn empty_sum_is_bottom() {
    let x = key("x");
    assert_eq!(solve([sum(x, &[])]), HashMap::from([(x, No)]));
}

#[test]
fn substitution_tightens_products() {
    let (x, y, z) = (key("x"), key("y"), key("z"));
    let solution = solve([
        sum(x, &[(Yes, &[y, z])]),
        fin(y, Maybe),
        fin(z, Yes),
    ]);
    assert_eq!(solution.get(&x), Some(&Maybe));
}

#[test]
fn folded_constants_still_contribute() {
    let (x, y) = (key("x"), key("y"));
    // x = Maybe | (Yes & y), y = No
    let solution = solve([sum(x, &[(Maybe, &[]), (Yes, &[y])]), fin(y, No)]);
    assert_eq!(solution.get(&x), Some(&Maybe));
}

#[test]
fn top_short_circuits_remaining_products() {
    let (x, y, z) = (key("x"), key("y"), key("z"));
    // z never gets a value, but y alone already makes x Top.
    let solution = solve([sum(x, &[(Yes, &[y]), (Maybe, &[z])]), fin(y, Yes)]);
    assert_eq!(solution.get(&x), Some(&Yes));
    assert_eq!(solution.get(&z), None);
}

#[test]
fn chain_of_dependencies() {
    let keys = ["a", "b", "c", "d", "e"].map(key);
    let mut equations: Vec<_> = keys
        .iter()
        .tuple_windows()
        .map(|(&from, &to)| sum(from, &[(Yes, &[to])]))
        .collect();
    equations.push(fin(keys[4], Maybe));
    let solution = solve(equations);
    for k in keys {
        assert_eq!(solution.get(&k), Some(&Maybe));
    }
}

#[test]
fn cycle_without_base_stays_unresolved() {
    let (x, y) = (key("x"), key("y"));
    let solution = solve([sum(x, &[(Yes, &[y])]), sum(y, &[(Yes, &[x])])]);
    assert!(solution.is_empty());
}

#[test]
fn cycle_with_constant_alternative() {
    let (x, y, z) = (key("x"), key("y"), key("z"));
    // x = y & Yes, y = (x & Yes) | z, z = Yes: z breaks the cycle.
    let solution = solve([
        sum(x, &[(Yes, &[y])]),
        sum(y, &[(Yes, &[x]), (Yes, &[z])]),
        fin(z, Yes),
    ]);
    assert_eq!(solution.get(&x), Some(&Yes));
    assert_eq!(solution.get(&y), Some(&Yes));
}

#[test]
fn stable_key_propagates_to_both_polarities() {
    let x = key("x");
    let (pos, neg) = (key("pos"), key("neg"));
    let solution = solve([
        fin(x, Maybe),
        sum(pos, &[(Yes, &[x])]),
        sum(neg, &[(Yes, &[x.negate()])]),
    ]);
    assert_eq!(solution.get(&pos), Some(&Maybe));
    assert_eq!(solution.get(&neg), Some(&Maybe));
}

#[test]
fn unstable_key_propagates_top_to_positive_polarity() {
    let x = Key::unstable("x");
    let (pos, neg) = (key("pos"), key("neg"));
    let solution = solve([
        fin(x, Maybe),
        sum(pos, &[(Maybe, &[x])]),
        sum(neg, &[(Yes, &[x.negate()])]),
    ]);
    assert_eq!(solution.get(&x), Some(&Maybe));
    // meet(Maybe, Top) for the positive reference.
    assert_eq!(solution.get(&pos), Some(&Maybe));
    assert_eq!(solution.get(&neg), Some(&Maybe));

    let solution = solve([fin(x, No), sum(pos, &[(Yes, &[x])])]);
    assert_eq!(solution.get(&pos), Some(&Yes));
}

#[test]
fn stability_is_part_of_the_identity() {
    let stable = key("m");
    let unstable = Key::unstable("m");
    let dependent = key("d");
    let solution = solve([fin(stable, Maybe), sum(dependent, &[(Yes, &[unstable])])]);
    assert_eq!(solution.get(&dependent), None);
}

#[test]
fn duplicate_equation_keeps_first() {
    let x = key("x");
    let mut solver = Solver::new((), SolverConfig::default());
    solver.add_equation(fin(x, Maybe)).unwrap();
    assert_eq!(
        solver.add_equation(fin(x, Yes)).unwrap_err(),
        SolverError::DuplicateEquation(x)
    );
    assert_eq!(solver.len(), 1);
    assert_eq!(solver.solve(), HashMap::from([(x, Maybe)]));
}

#[test]
fn referenced_key_can_be_defined_later() {
    let (x, y) = (key("x"), key("y"));
    let mut solver = Solver::new((), SolverConfig::default());
    solver.add_equation(sum(x, &[(Yes, &[y])])).unwrap();
    assert!(solver.add_equation(fin(y, Maybe)).is_ok());
    assert_eq!(solver.len(), 2);
    assert_eq!(solver.solve().get(&x), Some(&Maybe));
}

#[test]
fn equation_size_limit() {
    let x = key("x");
    let ids = ["a", "b", "c", "d"].map(key);
    let mut solver = Solver::new(
        (),
        SolverConfig {
            equation_size_limit: 3,
        },
    );
    assert_eq!(
        solver.add_equation(sum(x, &[(Yes, &ids[..2]), (Maybe, &ids[2..])])),
        Err(SolverError::EquationTooLarge { size: 4, limit: 3 })
    );
    assert!(solver.is_empty());
    // A rejected equation does not count as a definition.
    assert!(solver.add_equation(sum(x, &[(Yes, &ids[..3])])).is_ok());
    assert_eq!(solver.len(), 1);
}

#[test]
fn size_counts_equations() {
    let mut solver = Solver::new((), SolverConfig::default());
    assert!(solver.is_empty());
    for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
        solver.add_equation(fin(key(name), Yes)).unwrap();
        assert_eq!(solver.len(), i + 1);
    }
    assert_eq!(solver.config(), &SolverConfig::default());
}

#[test]
fn contract_inference() {
    use Contract::*;
    let (callee, caller, wrapper) = (key("callee"), key("caller"), key("wrapper"));
    let overridable = Key::unstable("overridable");
    let mut solver = Solver::<_, ContractValue>::new((), SolverConfig::default());
    solver
        .add_equation(Equation::new(callee, Rhs::Final(Flat::Elem(NotNull))))
        .unwrap();
    // caller returns either the callee's result or a fresh object.
    solver
        .add_equation(Equation::new(
            caller,
            Rhs::pending([
                Product::new(Flat::Top, [callee]),
                Product::constant(Flat::Elem(NotNull)),
            ]),
        ))
        .unwrap();
    solver
        .add_equation(Equation::new(overridable, Rhs::Final(Flat::Elem(NotNull))))
        .unwrap();
    // Calls through a virtual method cannot rely on its exact contract.
    solver
        .add_equation(Equation::new(
            wrapper,
            Rhs::pending([Product::new(Flat::Top, [overridable])]),
        ))
        .unwrap();
    let solution = solver.solve();
    assert_eq!(solution.get(&caller), Some(&Flat::Elem(NotNull)));
    assert_eq!(solution.get(&wrapper), Some(&Flat::Top));
}

fn ternary() -> impl Strategy<Value = Ternary> {
    prop_oneof![Just(No), Just(Maybe), Just(Yes)]
}

/// Equation systems used for the order independence checks. Every equation
/// only refers to keys with a higher index, so the systems are acyclic. Each
/// name is defined once, either stable or unstable, and references pick
/// either polarity of the defined key.
fn acyclic_system() -> impl Strategy<Value = Vec<TestEquation>> {
    const NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];
    let products = prop::collection::vec(
        (
            ternary(),
            prop::collection::vec((any::<prop::sample::Index>(), any::<bool>()), 0..3),
        ),
        0..3,
    );
    let stability = prop::collection::vec(any::<bool>(), NAMES.len());
    let defs = prop::collection::vec((any::<bool>(), ternary(), products), NAMES.len());
    (stability, defs).prop_map(|(stability, defs)| {
        let keys: Vec<TestKey> = NAMES
            .iter()
            .zip(&stability)
            .map(|(&name, &stable)| Key {
                base: name,
                stable,
                negated: false,
            })
            .collect();
        defs.into_iter()
            .enumerate()
            .map(|(i, (is_final, value, products))| {
                let later = &keys[i + 1..];
                if is_final || later.is_empty() {
                    return fin(keys[i], value);
                }
                let products = products.into_iter().map(|(value, refs)| {
                    let ids = refs.iter().map(|(idx, negated)| {
                        let id = *idx.get(later);
                        if *negated { id.negate() } else { id }
                    });
                    Product::new(value, ids)
                });
                Equation::new(keys[i], Rhs::pending(products))
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn solving_is_idempotent(system in acyclic_system()) {
        prop_assert_eq!(solve(system.clone()), solve(system));
    }

    #[test]
    fn registration_order_does_not_matter(
        system in acyclic_system(),
        seed in any::<prop::sample::Index>(),
    ) {
        let expected = solve(system.clone());
        let orders: Vec<Vec<usize>> = (0..system.len()).permutations(system.len()).collect();
        let order = seed.get(&orders);
        let shuffled = order.iter().map(|&i| system[i].clone());
        prop_assert_eq!(solve(shuffled), expected.clone());
        prop_assert_eq!(solve(system.into_iter().rev()), expected);
    }

    #[test]
    fn acyclic_systems_are_fully_resolved(system in acyclic_system()) {
        let solution = solve(system.clone());
        prop_assert_eq!(solution.len(), system.len());
    }
}

#[test]
fn key_polarity_and_stability() {
    let x = Key::unstable("x");
    assert!(!x.is_stable());
    assert_eq!(x.negate().negate(), x);
    assert!(!x.negate().is_stable());
    assert_eq!(x.mk_stable(), key("x"));
    assert_eq!(key("x").mk_unstable(), x);
    assert_eq!(x.negate().mk_stable().to_string(), "!x");
    assert_eq!(x.negate().to_string(), "!x?");
}

#[test]
fn single_polarity_is_order_independent() {
    let (x, y, z) = (key("x"), key("y"), Key::unstable("z"));
    let system = [
        fin(x, Maybe),
        sum(y, &[(Yes, &[x.negate(), z.negate()]), (No, &[z])]),
        fin(z, Maybe),
    ];
    let expected = HashMap::from([(x, Maybe), (y, Maybe), (z, Maybe)]);
    assert_eq!(solve(system.clone()), expected);
    assert_eq!(solve(system.into_iter().rev()), expected);
}
