use indicatif::{ProgressBar, ProgressStyle};
use inventory_audit_core::{CrawlStats, ProgressReporter};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Spinner on stderr while the crawl runs. The total file count is unknown up
/// front, so there is no bar.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
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

impl ProgressReporter for CliReporter {
    fn on_crawl_start(&self, root: &Path) {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(TICK_CHARS);
        pb.set_style(style);
        pb.set_message(format!("Auditing {}...", root.display()));
        pb.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.replace(pb) {
                old.finish_and_clear();
            }
        }
    }

    fn on_crawl_progress(&self, files_processed: usize, current_path: &Path) {
        let dir = current_path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.with_bar(|pb| pb.set_message(format!("{} files inventoried ({})", files_processed, dir)));
    }

    fn on_directory_abandoned(&self, dir: &Path, reason: &str) {
        self.with_bar(|pb| pb.println(format!("  ! skipped {}: {}", dir.display(), reason)));
    }

    fn on_crawl_complete(&self, stats: &CrawlStats, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Crawl complete: {} files stored, {} skipped in {:.2}s",
            stats.stored,
            stats.skipped(),
            duration_secs
        );
    }
}
