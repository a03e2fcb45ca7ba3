use std::ffi::OsString;
use std::path::PathBuf;

use crate::core::config::SweepConfig;
use crate::core::environment::{EnvChange, SweepEnvironment};
use crate::types::LanguageCode;

/// One evaluator run: program, arguments, directory and environment.
/// Built fresh for every language and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Zero-based position in the sweep
    pub index: usize,
    pub language: LanguageCode,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub working_dir: PathBuf,
    pub env: Vec<EnvChange>,
}

impl Invocation {
    pub fn build(
        env: &SweepEnvironment,
        config: &SweepConfig,
        index: usize,
        language: &LanguageCode,
    ) -> Self {
        let mut args = Vec::new();
        if let Some(script) = &config.evaluator.script {
            args.push(script.clone().into_os_string());
        }
        args.extend(config.params.to_args(language));

        Self {
            index,
            language: language.clone(),
            program: env.resolve_program(&config.evaluator.program),
            args,
            working_dir: env.working_dir().to_path_buf(),
            env: env.changes().to_vec(),
        }
    }

    /// Value following `flag` in the argument list, if present
    pub fn arg_value(&self, flag: &str) -> Option<String> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(|v| v.to_string_lossy().into_owned())
    }

    pub fn to_command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.working_dir);
        for change in &self.env {
            match change {
                EnvChange::Set(key, value) => {
                    cmd.env(key, value);
                }
                EnvChange::Remove(key) => {
                    cmd.env_remove(key);
                }
            }
        }
        cmd
    }
}

fn quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@".contains(c))
    {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}
