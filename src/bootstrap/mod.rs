//! Dependency bootstrap: post-scaffold package-manager invocations.
//!
//! Steps run strictly sequentially with the new project directory as their
//! working directory. stdin/stdout/stderr are inherited: package-manager
//! progress output goes straight to the operator's terminal and is never
//! captured. A required step's failure aborts the run; an optional step's
//! failure prints its remediation hint and the run still succeeds.

use std::path::Path;
use std::process::{Command, Stdio};

use console::style;
use serde::Deserialize;

use crate::errors::BootstrapError;

/// One bootstrap command from the template configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapStep {
    /// Shell command line, run via `sh -c`.
    pub command: String,

    /// Whether a non-zero exit aborts the whole scaffold.
    #[serde(default)]
    pub required: bool,

    /// Printed when an optional step fails, telling the operator what to
    /// run manually.
    #[serde(default)]
    pub hint: Option<String>,
}

/// Run all bootstrap steps in order inside `project_dir`.
///
/// Returns the first required failure; optional failures are reported and
/// swallowed.
pub fn run_steps(project_dir: &Path, steps: &[BootstrapStep]) -> Result<(), BootstrapError> {
    for step in steps {
        match run_step(project_dir, step) {
            Ok(()) => {}
            Err(err) if step.required => return Err(err),
            Err(err) => {
                eprintln!("{} {}", style("Warning:").yellow().bold(), err);
                if let Some(hint) = &step.hint {
                    eprintln!("  {}", style(hint).dim());
                }
            }
        }
    }
    Ok(())
}

fn run_step(project_dir: &Path, step: &BootstrapStep) -> Result<(), BootstrapError> {
    let status = Command::new("sh")
        .arg("-c")
        .arg(&step.command)
        .current_dir(project_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| BootstrapError::Spawn {
            command: step.command.clone(),
            source,
        })?;

    if !status.success() {
        return Err(BootstrapError::Failed {
            command: step.command.clone(),
            code: status.code().unwrap_or(-1),
        });
    }
    Ok(())
}
