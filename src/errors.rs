//! Typed error hierarchy for the scaffolding pipeline.
//!
//! One type per subsystem:
//! - `ScaffoldError` - fatal pipeline failures (precondition and structural I/O)
//! - `FileRenderError` / `RenderError` / `IncludeError` - template failures,
//!   recoverable at file granularity
//! - `BootstrapError` - dependency bootstrap command failures
//! - `SourceError` - template source reads

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the whole scaffold run.
///
/// `TargetExists` is raised before any mutation; everything else leaves a
/// partial project directory behind for the operator to remove manually.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("project folder \"{name}\" already exists")]
    TargetExists { name: String },

    #[error("failed to create project directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}

/// Failure of a single manifest entry during the render fan-out.
///
/// These are captured per file and never abort the run; the verbatim-copied
/// template text stays in place for the affected file.
#[derive(Debug, Error)]
pub enum FileRenderError {
    #[error("manifest entry is missing from the copied tree")]
    Missing,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to write rendered output: {0}")]
    Write(#[source] std::io::Error),
}

/// Errors from compiling or evaluating one template file.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unterminated placeholder starting at byte {offset}")]
    Unterminated { offset: usize },

    #[error("invalid placeholder expression `{expr}`: {message}")]
    InvalidExpression { expr: String, message: String },

    #[error("unknown identifier `{name}` in placeholder expression")]
    UnknownIdentifier { name: String },

    #[error("unknown function `{name}` in placeholder expression")]
    UnknownFunction { name: String },
}

/// A failed `include` directive.
///
/// Include failures degrade the render (empty content at the include
/// position) instead of failing the file; they are surfaced as warnings.
#[derive(Debug, Error)]
#[error("failed to include {path}: {source}")]
pub struct IncludeError {
    pub path: PathBuf,
    #[source]
    pub source: SourceError,
}

/// Errors from running dependency bootstrap commands.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with status {code}")]
    Failed { command: String, code: i32 },
}

/// Errors reading from a template source (directory tree or embedded).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("template file {path} not found")]
    NotFound { path: PathBuf },

    #[error("template path {path} escapes the template root")]
    OutsideRoot { path: PathBuf },

    #[error("template file {path} is not valid UTF-8")]
    NotUtf8 { path: PathBuf },

    #[error("failed to read template file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk template directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}
