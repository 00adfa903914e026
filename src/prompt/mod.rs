//! Interactive collection of project metadata.
//!
//! Three questions, asked only for fields the CLI did not already supply:
//! name (kebab-filtered, live-validated against sibling directories), title
//! (defaults to the title-cased name), and description (may be empty).

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, theme::ColorfulTheme};

use crate::casing;
use crate::project::ProjectRequest;

/// Validate a candidate project name against its would-be parent directory.
///
/// The check runs live at prompt time: time may have passed since the CLI
/// argument was checked, so the slug is re-validated as typed.
pub fn validate_name(parent_dir: &Path, value: &str) -> Result<(), String> {
    let slug = casing::kebab(value);
    if slug.is_empty() {
        return Err("Project name must not be empty".to_string());
    }
    if parent_dir.join(&slug).exists() {
        return Err(format!("Project folder \"{slug}\" already exists"));
    }
    Ok(())
}

/// Collect a [`ProjectRequest`], prompting for any field not supplied.
pub fn collect_project(
    parent_dir: &Path,
    name: Option<String>,
    title: Option<String>,
    description: Option<String>,
) -> Result<ProjectRequest> {
    let theme = ColorfulTheme::default();

    let name = match name {
        Some(value) => casing::kebab(&value),
        None => {
            let input: String = Input::with_theme(&theme)
                .with_prompt(format!(
                    "Project name {}",
                    style("- lowercase alphanumeric with optional dash \"-\"").dim()
                ))
                .validate_with(|input: &String| validate_name(parent_dir, input))
                .interact_text()
                .context("Failed to read project name")?;
            casing::kebab(&input)
        }
    };

    let title = match title {
        Some(value) => value,
        None => Input::with_theme(&theme)
            .with_prompt(format!(
                "Project title {}",
                style("- press enter for default").dim()
            ))
            .default(casing::title(&name))
            .interact_text()
            .context("Failed to read project title")?,
    };

    let description = match description {
        Some(value) => value,
        None => Input::with_theme(&theme)
            .with_prompt("Project description")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read project description")?,
    };

    Ok(ProjectRequest::new(&name, &title, &description))
}
