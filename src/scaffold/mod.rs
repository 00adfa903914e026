//! The scaffolding pipeline.
//!
//! A run is a linear sequence of side-effecting steps:
//!
//! ```text
//! guard check → create dir → copy tree → render manifest (concurrent
//! fan-out) → renames → bootstrap
//! ```
//!
//! The fan-out is the only concurrent stage: every manifest entry is
//! rendered and written independently, and the join waits for all of them,
//! tolerating individual failures. A file that fails to render keeps its
//! verbatim-copied template text and is reported in the
//! [`ScaffoldReport`]; it never aborts the run. Fatal errors are the
//! pre-existing target (before any mutation) and structural I/O failures
//! (directory creation, copy, rename, required bootstrap). Those leave a
//! partial directory the operator removes manually; no rollback is
//! attempted.

use std::path::{Path, PathBuf};

use futures::future::join_all;

use crate::bootstrap;
use crate::errors::{FileRenderError, IncludeError, ScaffoldError};
use crate::project::{ProjectRequest, RenderContext};
use crate::template::{CONFIG_FILE, TemplateConfig, TemplateSource, renderer};
use crate::ui::ScaffoldUI;

/// Orchestrates one scaffold run against a template source.
pub struct Scaffolder<'a> {
    source: &'a dyn TemplateSource,
    config: &'a TemplateConfig,
    ui: Option<&'a ScaffoldUI>,
}

/// What a finished run produced.
#[derive(Debug)]
pub struct ScaffoldReport {
    /// Absolute path of the new project directory.
    pub project_path: PathBuf,
    /// Number of files copied from the template.
    pub copied: usize,
    /// Manifest entries whose render failed; the run completed anyway.
    pub render_failures: Vec<RenderFailure>,
}

/// Per-file outcome of the render fan-out.
///
/// `Ok` carries the include errors of a degraded-but-written render;
/// `Err` means the file was left with its verbatim template text.
#[derive(Debug)]
pub struct RenderOutcome {
    pub path: PathBuf,
    pub result: Result<Vec<IncludeError>, FileRenderError>,
}

/// A captured per-file render failure.
#[derive(Debug)]
pub struct RenderFailure {
    pub path: PathBuf,
    pub error: FileRenderError,
}

impl<'a> Scaffolder<'a> {
    pub fn new(source: &'a dyn TemplateSource, config: &'a TemplateConfig) -> Self {
        Self {
            source,
            config,
            ui: None,
        }
    }

    pub fn with_ui(mut self, ui: &'a ScaffoldUI) -> Self {
        self.ui = Some(ui);
        self
    }

    /// Run the whole pipeline, creating `parent_dir/<request.name>`.
    ///
    /// `run_bootstrap` disables the dependency bootstrap stage when false
    /// (the `--skip-install` flag).
    pub async fn scaffold(
        &self,
        request: &ProjectRequest,
        parent_dir: &Path,
        run_bootstrap: bool,
    ) -> Result<ScaffoldReport, ScaffoldError> {
        let project_path = parent_dir.join(&request.name);

        // Guard: re-checked here regardless of what the CLI already
        // validated; this is the authoritative pre-mutation check.
        if project_path.exists() {
            return Err(ScaffoldError::TargetExists {
                name: request.name.clone(),
            });
        }

        // Single mkdir; never merges into a pre-existing directory.
        tokio::fs::create_dir(&project_path)
            .await
            .map_err(|source| ScaffoldError::CreateDir {
                path: project_path.clone(),
                source,
            })?;

        let copied = self.copy_tree(&project_path).await?;

        let ctx = RenderContext::new(request.clone());
        let render_failures = self.render_manifest(&ctx, &project_path).await;

        if let Some(ui) = self.ui {
            ui.finish();
        }

        // Renames operate on the rendered filesystem state, strictly after
        // all fan-out branches have settled.
        self.apply_renames(request, &project_path).await?;

        if run_bootstrap {
            bootstrap::run_steps(&project_path, &self.config.bootstrap)?;
        }

        Ok(ScaffoldReport {
            project_path,
            copied,
            render_failures,
        })
    }

    /// Copy every template file byte-for-byte into the project directory.
    ///
    /// The template's own configuration file is the one exclusion.
    async fn copy_tree(&self, project_path: &Path) -> Result<usize, ScaffoldError> {
        let entries: Vec<PathBuf> = self
            .source
            .entries()?
            .into_iter()
            .filter(|rel| rel != Path::new(CONFIG_FILE))
            .collect();

        if let Some(ui) = self.ui {
            ui.start_copy(entries.len() as u64);
        }

        for rel in &entries {
            let bytes = self.source.read_bytes(rel).await?;
            let target = project_path.join(rel);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| ScaffoldError::CreateDir {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
            tokio::fs::write(&target, &bytes)
                .await
                .map_err(|source| ScaffoldError::WriteFile {
                    path: target.clone(),
                    source,
                })?;
            if let Some(ui) = self.ui {
                ui.tick();
            }
        }

        Ok(entries.len())
    }

    /// Render every manifest entry concurrently and write the results.
    ///
    /// Wait-for-all join: a failing entry is captured, not propagated, so
    /// the remaining entries always settle.
    async fn render_manifest(
        &self,
        ctx: &RenderContext,
        project_path: &Path,
    ) -> Vec<RenderFailure> {
        if let Some(ui) = self.ui {
            ui.start_render(self.config.placeholders.len() as u64);
        }

        let tasks = self
            .config
            .placeholders
            .iter()
            .map(|rel| self.render_one(rel, ctx, project_path));
        let outcomes: Vec<RenderOutcome> = join_all(tasks).await;

        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(include_errors) => {
                    for err in include_errors {
                        self.warn(&format!("{}: {}", outcome.path.display(), err));
                    }
                }
                Err(error) => {
                    self.warn(&format!("Failed to render {}: {}", outcome.path.display(), error));
                    failures.push(RenderFailure {
                        path: outcome.path,
                        error,
                    });
                }
            }
            if let Some(ui) = self.ui {
                ui.tick();
            }
        }
        failures
    }

    async fn render_one(
        &self,
        rel: &Path,
        ctx: &RenderContext,
        project_path: &Path,
    ) -> RenderOutcome {
        RenderOutcome {
            path: rel.to_path_buf(),
            result: self.render_and_write(rel, ctx, project_path).await,
        }
    }

    async fn render_and_write(
        &self,
        rel: &Path,
        ctx: &RenderContext,
        project_path: &Path,
    ) -> Result<Vec<IncludeError>, FileRenderError> {
        let target = project_path.join(rel);

        // Manifest entries must exist under the copied tree before their
        // render is attempted.
        if !target.exists() {
            return Err(FileRenderError::Missing);
        }

        // Render from the template source, not the copy: concurrent sibling
        // renders must never observe each other's output.
        let text = self.source.read(rel).await?;
        let file_dir = rel.parent().unwrap_or_else(|| Path::new(""));
        let rendered = renderer::render(&text, file_dir, ctx, self.source).await?;

        tokio::fs::write(&target, rendered.text)
            .await
            .map_err(FileRenderError::Write)?;

        Ok(rendered.include_errors)
    }

    /// Rename each configured generic file to `<project.name>.<extension>`,
    /// in place (same directory), preserving its rendered content.
    async fn apply_renames(
        &self,
        request: &ProjectRequest,
        project_path: &Path,
    ) -> Result<(), ScaffoldError> {
        for rule in &self.config.renames {
            let file_name = format!("{}.{}", request.name, rule.extension);
            let to_rel = match rule.from.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.join(&file_name),
                _ => PathBuf::from(&file_name),
            };

            let from = project_path.join(&rule.from);
            let to = project_path.join(&to_rel);
            tokio::fs::rename(&from, &to)
                .await
                .map_err(|source| ScaffoldError::Rename {
                    from: rule.from.clone(),
                    to: to_rel.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    fn warn(&self, message: &str) {
        match self.ui {
            Some(ui) => ui.warn(message),
            None => eprintln!("Warning: {message}"),
        }
    }
}
