//! High-level, ergonomic library API: run a sweep from a config value or a
//! config file with the real process evaluator. Prefer these entrypoints
//! over the `core` modules unless you need a custom `Evaluator`.
use std::path::{Path, PathBuf};

use crate::core::config::{SweepConfig, config_base_dir, load_config};
use crate::core::evaluator::ProcessEvaluator;
use crate::core::invocation::Invocation;
use crate::core::sweep::{SweepReport, plan_sweep, run_sweep};
use crate::error::Result;

fn current_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir()?)
}

/// Run `config` with relative paths resolved against the current directory
pub fn sweep(config: &SweepConfig) -> Result<SweepReport> {
    sweep_in(config, &current_dir()?)
}

/// Run `config` with relative paths resolved against `base`
pub fn sweep_in(config: &SweepConfig, base: &Path) -> Result<SweepReport> {
    run_sweep(config, base, &mut ProcessEvaluator::new())
}

/// Load a config file and run it; relative paths resolve against the file's directory
pub fn sweep_from_file(path: &Path) -> Result<SweepReport> {
    let config = load_config(path)?;
    sweep_in(&config, &config_base_dir(path))
}

/// The commands a sweep would run, without running them
pub fn dry_run(config: &SweepConfig, base: &Path) -> Result<Vec<Invocation>> {
    plan_sweep(config, base)
}
