//! Command Line Interface (CLI) layer for xquad-sweep.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) that merges flags over a config
//! file and hands the result to `xquad_sweep::api`.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
