//! Progress display for the copy and render stages, rendered via `indicatif`.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// One progress bar restyled per pipeline stage.
///
/// Warnings are routed through the bar so they print above it instead of
/// tearing it. Bootstrap output is not drawn here at all; those commands
/// inherit the terminal directly.
pub struct ScaffoldUI {
    bar: ProgressBar,
}

impl ScaffoldUI {
    pub fn new() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len}")
                .expect("progress bar template is a valid static string")
                .progress_chars("█▓▒░"),
        );
        Self { bar }
    }

    /// Begin the tree-copy stage with `total` files to copy.
    pub fn start_copy(&self, total: u64) {
        self.start_stage("  Copy", total);
    }

    /// Begin the render fan-out stage with `total` manifest entries.
    pub fn start_render(&self, total: u64) {
        self.start_stage("Render", total);
    }

    fn start_stage(&self, prefix: &'static str, total: u64) {
        self.bar.set_prefix(prefix);
        self.bar.set_length(total);
        self.bar.set_position(0);
        if self.bar.is_hidden() {
            self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        }
    }

    /// Advance the current stage by one file.
    pub fn tick(&self) {
        self.bar.inc(1);
    }

    /// Print a warning line above the bar.
    pub fn warn(&self, message: &str) {
        self.bar
            .println(format!("{} {}", style("Warning:").yellow().bold(), message));
    }

    /// Clear the bar once the pipeline is done with its file stages.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ScaffoldUI {
    fn default() -> Self {
        Self::new()
    }
}
