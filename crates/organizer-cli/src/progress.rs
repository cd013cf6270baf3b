use indicatif::{ProgressBar, ProgressStyle};
use organizer_core::linker::CleanReport;
use organizer_core::{PassReport, PassReporter};
use std::sync::Mutex;
use std::time::Duration;

/// Spinner for interactive single passes.
///
/// - List/classify phases: spinner with a status message
/// - Apply phase: progress bar over all targets
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl PassReporter for CliReporter {
    fn on_pass_start(&self) {
        self.set_bar(Self::spinner("Listing source entries..."));
    }

    fn on_list_complete(&self, listed: usize, unprocessed: usize) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Listed {} entries, {} new",
            listed, unprocessed
        );
    }

    fn on_classify_start(&self, items: usize) {
        self.set_bar(Self::spinner(&format!("Categorizing {} items...", items)));
    }

    fn on_classify_complete(&self, categorizations: usize) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Classifier returned {} categorizations",
            categorizations
        );
    }

    fn on_clean_complete(&self, report: &CleanReport) {
        eprintln!(
            "  \x1b[32m✓\x1b[0m Cleanup: {} symlinks, {} directories",
            report.links_removed, report.dirs_removed
        );
    }

    fn on_apply_progress(&self, targets_done: usize, targets_total: usize) {
        if let Ok(mut guard) = self.bar.lock() {
            let pb = guard.get_or_insert_with(|| {
                let pb = ProgressBar::new(targets_total as u64);
                if let Ok(style) = ProgressStyle::with_template(
                    "  {spinner:.cyan} Linking [{bar:30.cyan/dim}] {pos}/{len} targets",
                ) {
                    pb.set_style(style.progress_chars("━╸─"));
                }
                pb
            });
            pb.set_position(targets_done as u64);
        }
    }

    fn on_pass_complete(&self, _report: &PassReport) {
        self.finish_bar();
    }
}
