//! Scoped setup shared by every evaluator run: the working directory and the
//! activated Python virtual environment.
//!
//! Nothing here mutates the driver's own process state. The resolved
//! directory and environment variables are applied to each child command,
//! and the guard releases them (and says so in the log) when it is dropped.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::config::SweepConfig;
use crate::error::{Error, Result};

#[cfg(windows)]
const VENV_BIN: &str = "Scripts";
#[cfg(not(windows))]
const VENV_BIN: &str = "bin";

/// A change to apply to a child's environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvChange {
    Set(OsString, OsString),
    Remove(OsString),
}

#[derive(Debug)]
pub struct SweepEnvironment {
    working_dir: PathBuf,
    venv: Option<PathBuf>,
    changes: Vec<EnvChange>,
}

impl SweepEnvironment {
    /// Resolve the working directory against `base` and activate the venv.
    pub fn acquire(config: &SweepConfig, base: &Path) -> Result<Self> {
        let requested = base.join(&config.working_dir);
        let working_dir = requested
            .canonicalize()
            .map_err(|source| Error::WorkingDirectory {
                path: requested.clone(),
                source,
            })?;
        if !working_dir.is_dir() {
            return Err(Error::WorkingDirectory {
                path: requested,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotADirectory,
                    "not a directory",
                ),
            });
        }
        info!("Working directory: {:?}", working_dir);

        let (venv, changes) = match &config.venv {
            Some(venv) => {
                let (root, changes) = activate_venv(&working_dir.join(venv))?;
                info!("Activated environment: {:?}", root);
                (Some(root), changes)
            }
            None => {
                debug!("No runtime environment configured, using inherited one");
                (None, vec![EnvChange::Set("PYTHONUNBUFFERED".into(), "1".into())])
            }
        };

        Ok(Self {
            working_dir,
            venv,
            changes,
        })
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn venv(&self) -> Option<&Path> {
        self.venv.as_deref()
    }

    pub fn changes(&self) -> &[EnvChange] {
        &self.changes
    }

    /// Prefer the venv's copy of a bare program name, as activation would.
    pub fn resolve_program(&self, program: &str) -> PathBuf {
        let bare = !program.contains('/') && !program.contains(std::path::MAIN_SEPARATOR);
        if let (true, Some(venv)) = (bare, &self.venv) {
            let bin = venv.join(VENV_BIN);
            for candidate in [bin.join(program), bin.join(format!("{}.exe", program))] {
                if candidate.is_file() {
                    return candidate;
                }
            }
        }
        PathBuf::from(program)
    }
}

impl Drop for SweepEnvironment {
    fn drop(&mut self) {
        match &self.venv {
            Some(venv) => info!("Released environment: {:?}", venv),
            None => debug!("Released sweep environment"),
        }
    }
}

fn activate_venv(path: &Path) -> Result<(PathBuf, Vec<EnvChange>)> {
    let root = path
        .canonicalize()
        .map_err(|e| Error::EnvironmentActivation {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let bin = root.join(VENV_BIN);
    if !bin.is_dir() {
        return Err(Error::EnvironmentActivation {
            path: root,
            reason: format!("missing `{}` directory", VENV_BIN),
        });
    }

    let mut paths = vec![bin];
    if let Some(existing) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&existing));
    }
    let path_var = std::env::join_paths(paths).map_err(|e| Error::EnvironmentActivation {
        path: root.clone(),
        reason: e.to_string(),
    })?;

    let changes = vec![
        EnvChange::Set("VIRTUAL_ENV".into(), root.clone().into_os_string()),
        EnvChange::Set("PATH".into(), path_var),
        EnvChange::Remove("PYTHONHOME".into()),
        EnvChange::Set("PYTHONUNBUFFERED".into(), "1".into()),
    ];
    Ok((root, changes))
}
