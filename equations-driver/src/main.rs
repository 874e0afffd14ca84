use std::process::ExitCode;

use clap::Parser;
use equations_driver::Opt;
use tracing_subscriber::EnvFilter;
use utils::DiagnosticEmitter;

fn main() -> ExitCode {
    let opts = Opt::parse();

    if opts.verbose {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }

    let mut diag = DiagnosticEmitter::new(Box::new(std::io::stdout()), Box::new(std::io::stderr()));
    let contents = match std::fs::read_to_string(&opts.filename) {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("Failed to read '{}': {err}", opts.filename);
            return ExitCode::from(2);
        }
    };

    if equations_driver::process_source(&contents, &mut diag, &opts).is_none() {
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}
