//! xquad-sweep CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, run the sweep,
//! and exit with the status of the first failing evaluation (or 0).
//! For programmatic use, prefer the library API (`xquad_sweep::api`).

use std::process::ExitCode;

use clap::Parser;

mod cli;

fn main() -> ExitCode {
    let args = cli::CliArgs::parse();
    match cli::run(args) {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(e.exit_code())
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
