//! The evaluator seam. `ProcessEvaluator` runs the real external program;
//! tests swap in recording stubs.
use std::io::{self, BufRead, BufReader, Write};
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::invocation::Invocation;
use crate::error::{Error, Result};
use crate::types::ExitState;

/// Scores printed by the evaluator at the end of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub loss: f64,
    pub f1: f64,
    pub exact_match: f64,
}

impl EvaluationMetrics {
    /// Parse the summary line, e.g.
    /// `Validation accuracy: 0.71 Validation loss: 1.2 Validation F1-score: 68.3 Validation Exact Match: 55.0`
    pub fn parse_line(line: &str) -> Option<Self> {
        const ACC: &str = "Validation accuracy:";
        const LOSS: &str = "Validation loss:";
        const F1: &str = "Validation F1-score:";
        const EM: &str = "Validation Exact Match:";

        let acc_at = line.find(ACC)?;
        let loss_at = line.find(LOSS)?;
        let f1_at = line.find(F1)?;
        let em_at = line.find(EM)?;
        if !(acc_at < loss_at && loss_at < f1_at && f1_at < em_at) {
            return None;
        }

        Some(Self {
            accuracy: parse_number(&line[acc_at + ACC.len()..loss_at])?,
            loss: parse_number(&line[loss_at + LOSS.len()..f1_at])?,
            f1: parse_number(&line[f1_at + F1.len()..em_at])?,
            exact_match: parse_number(&line[em_at + EM.len()..])?,
        })
    }
}

// Accepts plain floats and torch-style `tensor(0.5, device='cuda:0')`
fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix("tensor(")
        .map(|inner| inner.split([',', ')']).next().unwrap_or(inner))
        .unwrap_or(raw);
    raw.trim().parse().ok()
}

/// Copy evaluator output to `out` line by line, flushing each line, and
/// return the last metrics line seen. The pipe is always read to EOF so the
/// child never dies of SIGPIPE because the driver stopped listening.
fn relay_output<R: BufRead, W: Write>(
    reader: &mut R,
    out: &mut W,
    invocation: &Invocation,
) -> Option<EvaluationMetrics> {
    let mut metrics = None;
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Lost evaluator output for {}: {}", invocation.language, e);
                // Keep the pipe empty until the child closes it
                let _ = io::copy(reader, &mut io::sink());
                break;
            }
        }

        // A closed driver stdout must not abort the child
        let _ = out.write_all(&line);
        if !line.ends_with(b"\n") {
            let _ = out.write_all(b"\n");
        }
        let _ = out.flush();

        let text = String::from_utf8_lossy(&line);
        if let Some(parsed) = EvaluationMetrics::parse_line(text.trim_end()) {
            metrics = Some(parsed);
        }
    }
    metrics
}

/// What one evaluator run produced
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOutcome {
    pub exit: ExitState,
    pub metrics: Option<EvaluationMetrics>,
    pub duration: Duration,
}

pub trait Evaluator {
    /// Run one invocation to completion. `Err` only when it could not be started.
    fn evaluate(&mut self, invocation: &Invocation) -> Result<EvaluationOutcome>;
}

/// Runs the evaluator as a blocking child process, relaying its stdout.
#[derive(Debug, Default)]
pub struct ProcessEvaluator;

impl ProcessEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for ProcessEvaluator {
    fn evaluate(&mut self, invocation: &Invocation) -> Result<EvaluationOutcome> {
        let started = Instant::now();
        debug!("Spawning: {}", invocation);

        let mut child = invocation
            .to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: invocation.program.to_string_lossy().into_owned(),
                source,
            })?;

        let metrics = match child.stdout.take() {
            Some(stdout) => relay_output(
                &mut BufReader::new(stdout),
                &mut io::stdout(),
                invocation,
            ),
            None => None,
        };

        let status = child.wait()?;
        Ok(EvaluationOutcome {
            exit: ExitState::from_status(status),
            metrics,
            duration: started.elapsed(),
        })
    }
}
