use core::fmt::Display;
use core::hash::Hash;
use core::str::FromStr;

use clap::{Parser as CommandLineParser, ValueEnum};
use equations_lib::{
    lexer::Lexer,
    parser::Parser,
    system::{print_equations, print_solution},
};
use solver::domains::{ContractValue, Lattice, Ternary};
use solver::{DEFAULT_EQUATION_SIZE_LIMIT, Solver, SolverConfig, SolverError};
use tracing::info;
use utils::DiagnosticEmitter;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum CLIDomain {
    /// No, Maybe, Yes.
    Ternary,
    /// Bot, NotNull, Null, True, False, Pure, Top.
    Contract,
}

#[derive(Debug, CommandLineParser)]
#[command(
    name = "equations",
    version,
    about = "Solve systems of monotone equations over finite lattices."
)]
pub struct Opt {
    /// The lattice the values of the equations belong to.
    #[arg(long, value_enum, default_value_t = CLIDomain::Ternary)]
    pub domain: CLIDomain,

    /// Maximum number of key occurrences in the right hand side of an equation.
    #[arg(long, default_value_t = DEFAULT_EQUATION_SIZE_LIMIT)]
    pub limit: usize,

    /// Also list the keys that did not get a value.
    #[arg(long)]
    pub show_unresolved: bool,

    /// Print the equations after parsing, before solving them.
    #[arg(long)]
    pub dump_equations: bool,

    /// Log the progress of the solver to stderr. The filter can be refined
    /// with the RUST_LOG environment variable.
    #[arg(long, short)]
    pub verbose: bool,

    /// File containing the equations.
    pub filename: String,
}

impl Default for Opt {
    fn default() -> Self {
        Self {
            domain: CLIDomain::Ternary,
            limit: DEFAULT_EQUATION_SIZE_LIMIT,
            show_unresolved: false,
            dump_equations: false,
            verbose: false,
            filename: String::new(),
        }
    }
}

pub fn process_source(src: &str, diag: &mut DiagnosticEmitter, opts: &Opt) -> Option<()> {
    match opts.domain {
        CLIDomain::Ternary => solve_source::<Ternary>(src, diag, opts),
        CLIDomain::Contract => solve_source::<ContractValue>(src, diag, opts),
    }
}

fn solve_source<D>(src: &str, diag: &mut DiagnosticEmitter, opts: &Opt) -> Option<()>
where
    D: Lattice<LatticeContext = ()> + Hash + FromStr + Display,
{
    let lexer = Lexer::new(src, diag);
    let tokens = lexer.lex_all();
    if tokens.tokens.is_empty() {
        return None;
    }
    let parser = Parser::<D>::new(tokens, &(), opts.limit, diag);
    let definitions = parser.parse()?;

    if opts.dump_equations {
        diag.out_ln(&print_equations(&definitions, &()));
    }

    let mut solver = Solver::new(
        (),
        SolverConfig {
            equation_size_limit: opts.limit,
        },
    );
    for definition in &definitions {
        let line = definition.line.0;
        match solver.add_equation(definition.equation.clone()) {
            Ok(()) => {}
            Err(SolverError::DuplicateEquation(key)) => {
                diag.warn(
                    line,
                    &format!("at '{key}'"),
                    "Duplicate equation, keeping the first one.",
                );
            }
            Err(err @ SolverError::EquationTooLarge { .. }) => {
                let key = &definition.equation.id;
                diag.report(
                    line,
                    &format!("at '{key}'"),
                    &format!("Equation dropped, {err}."),
                );
            }
        }
    }
    info!(
        equations = solver.len(),
        pending = solver.pending_len(),
        "equations registered"
    );

    let solution = solver.solve();
    diag.out(&print_solution(&definitions, &solution, opts.show_unresolved));

    if diag.error_count() > 0 {
        return None;
    }
    Some(())
}
