//! Template configuration and access.
//!
//! A template root is a directory tree (or the embedded default) with a
//! `stencil.toml` at its top describing everything the scaffold pipeline
//! needs to know about it:
//!
//! ```toml
//! # Files rewritten through the placeholder pass after the raw copy.
//! placeholders = [
//!   "package.json",
//!   "plugin.php",
//! ]
//!
//! # Shown after a successful run: `cd <project>` followed by this command.
//! done = "npm run dev"
//!
//! # Files renamed to <project-name>.<extension> after rendering.
//! [[rename]]
//! from = "plugin.php"
//! extension = "php"
//!
//! # Commands run inside the new project, in order.
//! [[bootstrap]]
//! command = "npm install"
//! required = true
//! ```
//!
//! The manifest (`placeholders`) is static configuration, never derived
//! from directory contents. Any file not listed is copied byte-for-byte.
//! The config file itself is never copied into the scaffolded project.

pub mod renderer;
pub mod source;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::bootstrap::BootstrapStep;

pub use renderer::{Rendered, render};
pub use source::{DirTemplates, EmbeddedTemplates, TemplateSource};

/// Name of the per-template configuration file at the template root.
pub const CONFIG_FILE: &str = "stencil.toml";

/// Per-template configuration, parsed from [`CONFIG_FILE`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// The manifest: template-root-relative paths subject to substitution.
    #[serde(default)]
    pub placeholders: Vec<PathBuf>,

    /// Files renamed to `<project.name>.<extension>` after rendering.
    #[serde(default, rename = "rename")]
    pub renames: Vec<RenameRule>,

    /// Dependency bootstrap commands, run in order inside the new project.
    #[serde(default, rename = "bootstrap")]
    pub bootstrap: Vec<BootstrapStep>,

    /// Next-step command shown in the completion message.
    #[serde(default)]
    pub done: Option<String>,
}

/// One post-render rename, keyed by the final project name.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameRule {
    /// Generic file name inside the template, e.g. `plugin.php`.
    pub from: PathBuf,
    /// Extension of the renamed file, e.g. `php` → `<name>.php`.
    pub extension: String,
}

impl TemplateConfig {
    /// Load and parse the configuration from a template source.
    pub async fn load(source: &dyn TemplateSource) -> Result<Self> {
        let text = source
            .read(Path::new(CONFIG_FILE))
            .await
            .with_context(|| format!("template is missing its {CONFIG_FILE}"))?;
        Self::parse(&text)
    }

    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).with_context(|| format!("Failed to parse {CONFIG_FILE}"))
    }
}
