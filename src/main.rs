use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use stencil::casing;
use stencil::prompt;
use stencil::scaffold::Scaffolder;
use stencil::template::{DirTemplates, EmbeddedTemplates, TemplateConfig, TemplateSource};
use stencil::ui::{ScaffoldUI, icons};

#[derive(Parser)]
#[command(name = "stencil")]
#[command(version, about = "Create a new plugin project from a template")]
struct Cli {
    /// Project name - lowercase alphanumeric with optional dash "-"
    name: Option<String>,

    /// Scaffold from a template directory instead of the built-in template
    #[arg(long)]
    template: Option<PathBuf>,

    /// Project title (skips the interactive prompt)
    #[arg(long)]
    title: Option<String>,

    /// Project description (skips the interactive prompt)
    #[arg(long)]
    description: Option<String>,

    /// Skip dependency installation after scaffolding
    #[arg(long)]
    skip_install: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    // Ensure the project folder doesn't exist yet, before any prompt is
    // shown. The prompt re-validates live; the scaffolder checks once more
    // right before creating the directory.
    if let Some(name) = &cli.name {
        let slug = casing::kebab(name);
        if cwd.join(&slug).exists() {
            println!("Project folder \"{slug}\" already exists");
            return Ok(());
        }
    }

    let request = prompt::collect_project(&cwd, cli.name, cli.title, cli.description)?;

    let source: Box<dyn TemplateSource> = match cli.template {
        Some(dir) => Box::new(DirTemplates::new(dir)),
        None => Box::new(EmbeddedTemplates),
    };
    let config = TemplateConfig::load(source.as_ref()).await?;

    println!(
        "{}Creating project \"{}\" {}",
        icons::FOLDER,
        request.name,
        style("- Press CTRL + C to quit at any time").dim()
    );

    let ui = ScaffoldUI::new();
    let report = Scaffolder::new(source.as_ref(), &config)
        .with_ui(&ui)
        .scaffold(&request, &cwd, !cli.skip_install)
        .await?;

    if !report.render_failures.is_empty() {
        eprintln!(
            "{}{} template file(s) could not be rendered and keep their raw placeholders",
            icons::CROSS,
            report.render_failures.len()
        );
    }

    println!();
    println!("{}Done.", icons::CHECK);
    println!();
    println!("Start by running:");
    println!();
    println!("  cd {}", request.name);
    if let Some(done) = &config.done {
        println!("  {done}");
    }
    println!();

    Ok(())
}
