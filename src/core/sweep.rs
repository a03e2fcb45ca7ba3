//! The sweep loop: one evaluator run per language, strictly in order, one at
//! a time. Under `FailurePolicy::FailFast` the first failure ends the sweep;
//! under `FailurePolicy::Continue` failures are recorded and the loop goes on.
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::core::config::SweepConfig;
use crate::core::environment::SweepEnvironment;
use crate::core::evaluator::{EvaluationMetrics, Evaluator};
use crate::core::invocation::Invocation;
use crate::error::{Error, Result};
use crate::types::{ExitState, FailurePolicy, LanguageCode};

/// Per-language result recorded in a `SweepReport`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageOutcome {
    pub language: LanguageCode,
    #[serde(flatten)]
    pub status: LanguageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<EvaluationMetrics>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LanguageStatus {
    Succeeded,
    Failed { exit: ExitState },
    /// The evaluator could not be started at all
    NotStarted { reason: String, exit_code: i32 },
}

impl LanguageStatus {
    fn failure_code(&self) -> Option<i32> {
        match self {
            LanguageStatus::Succeeded => None,
            LanguageStatus::Failed { exit } => Some(exit.shell_code()),
            LanguageStatus::NotStarted { exit_code, .. } => Some(*exit_code),
        }
    }
}

/// Sweep summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub policy: FailurePolicy,
    pub outcomes: Vec<LanguageOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

impl SweepReport {
    fn new(policy: FailurePolicy) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            policy,
            outcomes: Vec::new(),
            succeeded: 0,
            failed: 0,
        }
    }

    fn record(&mut self, outcome: LanguageOutcome) {
        match outcome.status {
            LanguageStatus::Succeeded => self.succeeded += 1,
            _ => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// 0 when everything ran cleanly, otherwise the first failure's shell code
    pub fn exit_code(&self) -> i32 {
        self.outcomes
            .iter()
            .find_map(|o| o.status.failure_code())
            .unwrap_or(0)
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Build every invocation of the sweep without running anything
pub fn plan_sweep(config: &SweepConfig, base: &Path) -> Result<Vec<Invocation>> {
    config.validate()?;
    let env = SweepEnvironment::acquire(config, base)?;
    Ok(config
        .languages
        .iter()
        .enumerate()
        .map(|(index, language)| Invocation::build(&env, config, index, language))
        .collect())
}

/// Run the evaluator once per configured language.
///
/// Setup happens once before the first run. With `FailFast`, the first
/// failure is returned as an error and no later language is attempted;
/// with `Continue`, the report always comes back and carries the failures.
pub fn run_sweep<E: Evaluator>(
    config: &SweepConfig,
    base: &Path,
    evaluator: &mut E,
) -> Result<SweepReport> {
    config.validate()?;
    let env = SweepEnvironment::acquire(config, base)?;

    let total = config.languages.len();
    let mut report = SweepReport::new(config.on_error);
    info!(
        "Starting sweep over {} language(s), on error: {}",
        total, config.on_error
    );

    for (index, language) in config.languages.iter().enumerate() {
        let invocation = Invocation::build(&env, config, index, language);
        info!("[{}/{}] Evaluating {}", index + 1, total, language);

        let outcome = match evaluator.evaluate(&invocation) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("[{}/{}] {}", index + 1, total, e);
                if config.on_error == FailurePolicy::FailFast {
                    return Err(e);
                }
                report.record(LanguageOutcome {
                    language: language.clone(),
                    status: LanguageStatus::NotStarted {
                        reason: e.to_string(),
                        exit_code: e.exit_code(),
                    },
                    metrics: None,
                    duration_ms: 0,
                });
                continue;
            }
        };

        let duration_ms = u64::try_from(outcome.duration.as_millis()).unwrap_or(u64::MAX);
        if outcome.exit.success() {
            match &outcome.metrics {
                Some(m) => info!(
                    "[{}/{}] {} done in {} ms: F1 {:.2}, EM {:.2}",
                    index + 1,
                    total,
                    language,
                    duration_ms,
                    m.f1,
                    m.exact_match
                ),
                None => info!(
                    "[{}/{}] {} done in {} ms",
                    index + 1,
                    total,
                    language,
                    duration_ms
                ),
            }
            report.record(LanguageOutcome {
                language: language.clone(),
                status: LanguageStatus::Succeeded,
                metrics: outcome.metrics,
                duration_ms,
            });
            continue;
        }

        match config.on_error {
            FailurePolicy::FailFast => {
                error!(
                    "[{}/{}] {} failed ({}), aborting {} remaining language(s)",
                    index + 1,
                    total,
                    language,
                    outcome.exit,
                    total - index - 1
                );
                return Err(Error::EvaluatorFailed {
                    language: language.clone(),
                    exit: outcome.exit,
                });
            }
            FailurePolicy::Continue => {
                warn!("[{}/{}] {} failed ({})", index + 1, total, language, outcome.exit);
                report.record(LanguageOutcome {
                    language: language.clone(),
                    status: LanguageStatus::Failed { exit: outcome.exit },
                    metrics: outcome.metrics,
                    duration_ms,
                });
            }
        }
    }

    report.finished_at = Utc::now();
    info!("Sweep complete!");
    info!("Succeeded: {}", report.succeeded);
    info!("Failed: {}", report.failed);
    Ok(report)
}

/// Write a report as pretty JSON
pub fn write_report(report: &SweepReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    info!("Report written to: {:?}", path);
    Ok(())
}
