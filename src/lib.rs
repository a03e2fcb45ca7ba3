#![doc = r#"
xquad-sweep — run a CANINE XQuAD evaluator once per language.

This crate drives an external evaluation program (by default
`python source/qa/canine_evaluate_xquad.py`) over an ordered list of XQuAD
language configurations with one shared set of parameters. Runs are strictly
sequential and, by default, fail-fast: the first failing language ends the
sweep and its exit status becomes the sweep's exit status. It powers the
`xquad-sweep` CLI and can be embedded in your own Rust tooling.

Quick start: the reference sweep
--------------------------------
```rust,no_run
use xquad_sweep::SweepConfig;

fn main() -> xquad_sweep::Result<()> {
    // 12 XQuAD languages, model at /mnt/hdd/canine/models/canine_model.pt,
    // max_answer_length 256, max_length 2048, doc_stride 512,
    // n_best_size 20, batch_size 8, device cuda, venv `venv`, cwd `../..`
    let report = xquad_sweep::sweep(&SweepConfig::default())?;
    println!("succeeded={}", report.succeeded);
    Ok(())
}
```

Custom languages and parameters
-------------------------------
```rust,no_run
use std::path::{Path, PathBuf};
use xquad_sweep::{FailurePolicy, LanguageCode, RunParameters, SweepConfig};

fn main() -> xquad_sweep::Result<()> {
    let config = SweepConfig {
        languages: vec![LanguageCode::new("xquad.de"), LanguageCode::new("xquad.ru")],
        params: RunParameters {
            device: "cpu".to_string(),
            batch_size: 2,
            ..RunParameters::default()
        },
        working_dir: PathBuf::from("."),
        venv: None,
        // Keep going after a failed language and collect every outcome
        on_error: FailurePolicy::Continue,
        ..SweepConfig::default()
    };

    let report = xquad_sweep::sweep_in(&config, Path::new("/srv/canine"))?;
    std::process::exit(report.exit_code());
}
```

Plugging in your own evaluator
------------------------------
```rust
use std::path::Path;
use std::time::Duration;
use xquad_sweep::{
    EvaluationOutcome, Evaluator, ExitState, Invocation, SweepConfig, run_sweep,
};

struct Echo;

impl Evaluator for Echo {
    fn evaluate(&mut self, invocation: &Invocation) -> xquad_sweep::Result<EvaluationOutcome> {
        println!("would run: {invocation}");
        Ok(EvaluationOutcome { exit: ExitState::Success, metrics: None, duration: Duration::ZERO })
    }
}

fn main() -> xquad_sweep::Result<()> {
    let config = SweepConfig { working_dir: ".".into(), venv: None, ..SweepConfig::default() };
    let report = run_sweep(&config, Path::new("."), &mut Echo)?;
    assert_eq!(report.succeeded, 12);
    Ok(())
}
```

Error handling
--------------
All public functions return `xquad_sweep::Result<T>`. `Error::exit_code`
maps each error to the status a shell would report: the child's own code
for a failed evaluation, `128 + signal` for a killed one, 127/126 when the
evaluator cannot be started, 1 for setup and config errors.

Useful modules
--------------
- [`api`] — high-level entry points.
- [`core`] — config, environment, invocation, evaluator and sweep building blocks.
- [`types`] — `LanguageCode`, `FailurePolicy`, `ExitState`.
- [`error`] — crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod types;

// Curated public API surface
pub use core::config::{EvaluatorCommand, SweepConfig, config_base_dir, load_config, save_config};
pub use core::environment::{EnvChange, SweepEnvironment};
pub use core::evaluator::{EvaluationMetrics, EvaluationOutcome, Evaluator, ProcessEvaluator};
pub use core::invocation::Invocation;
pub use core::params::RunParameters;
pub use core::sweep::{
    LanguageOutcome, LanguageStatus, SweepReport, plan_sweep, run_sweep, write_report,
};
pub use error::{Error, Result};
pub use types::{ExitState, FailurePolicy, LanguageCode, XQUAD_LANGUAGES};

pub use api::{dry_run, sweep, sweep_from_file, sweep_in};
