//! Sweep configuration: which evaluator to run, over which languages, with
//! which shared parameters, from which directory and runtime environment.
//!
//! Config files are JSON, optionally preceded by a `//` comment header.
//! `save_config` writes such a header so saved files document where they
//! came from.
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::params::RunParameters;
use crate::error::{Error, Result};
use crate::types::{FailurePolicy, LanguageCode};

/// Program plus script that make up the evaluator entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorCommand {
    /// Interpreter or executable; bare names are looked up in the venv first
    pub program: String,
    /// Script passed as the first argument; `None` runs `program` directly
    pub script: Option<PathBuf>,
}

impl Default for EvaluatorCommand {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            script: Some(PathBuf::from("source/qa/canine_evaluate_xquad.py")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub evaluator: EvaluatorCommand,
    pub languages: Vec<LanguageCode>,
    pub params: RunParameters,
    /// Directory every evaluator run starts in; relative paths are resolved
    /// against the config file's directory
    pub working_dir: PathBuf,
    /// Isolated Python environment, relative to `working_dir`
    pub venv: Option<PathBuf>,
    pub on_error: FailurePolicy,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            evaluator: EvaluatorCommand::default(),
            languages: LanguageCode::xquad_defaults(),
            params: RunParameters::default(),
            working_dir: PathBuf::from("../.."),
            venv: Some(PathBuf::from("venv")),
            on_error: FailurePolicy::FailFast,
        }
    }
}

impl SweepConfig {
    /// Structural checks only. Parameter values belong to the evaluator.
    pub fn validate(&self) -> Result<()> {
        if self.languages.is_empty() {
            return Err(Error::EmptyLanguages);
        }
        if let Some(blank) = self.languages.iter().find(|l| l.as_str().trim().is_empty()) {
            return Err(Error::InvalidArgument {
                arg: "language",
                value: blank.to_string(),
            });
        }
        if self.evaluator.program.trim().is_empty() {
            return Err(Error::InvalidArgument {
                arg: "evaluator.program",
                value: self.evaluator.program.clone(),
            });
        }
        Ok(())
    }
}

/// Directory relative config paths are resolved against
pub fn config_base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Load a sweep config from a JSON file, tolerating a leading comment header
pub fn load_config(path: &Path) -> Result<SweepConfig> {
    let content = fs::read_to_string(path)?;

    // Skip whole header lines; comments may contain braces
    let mut json_start = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with("//") {
            break;
        }
        json_start += line.len();
    }

    let body = &content[json_start..];
    if body.trim().is_empty() {
        return Err(Error::InvalidConfig {
            path: path.to_path_buf(),
            reason: "no JSON object found".to_string(),
        });
    }
    if !body.trim_start().starts_with('{') {
        return Err(Error::InvalidConfig {
            path: path.to_path_buf(),
            reason: "only `//` comment lines may precede the JSON object".to_string(),
        });
    }

    let config: SweepConfig = serde_json::from_str(body)?;
    debug!(
        "Loaded config from {:?}: {} language(s)",
        path,
        config.languages.len()
    );
    Ok(config)
}

/// Write a sweep config with a descriptive comment header
pub fn save_config(config: &SweepConfig, path: &Path) -> Result<()> {
    let mut content = String::new();
    content.push_str("// ==========================================\n");
    content.push_str("// XQuAD sweep configuration\n");
    content.push_str("// ==========================================\n");
    content.push_str(&format!("// Version: {}\n", env!("CARGO_PKG_VERSION")));
    content.push_str(&format!("// Generated: {}\n", chrono::Utc::now().to_rfc3339()));
    content.push_str("// Relative working_dir is resolved against this file's directory\n");
    content.push_str("// ==========================================\n\n");
    content.push_str(&serde_json::to_string_pretty(config)?);
    content.push('\n');

    fs::write(path, content)?;
    info!("Config saved to: {:?}", path);
    Ok(())
}
