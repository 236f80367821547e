use crate::scanner::CrawlStats;
use std::path::Path;

/// Trait for reporting crawl progress.
///
/// The CLI implements it with indicatif; library callers and tests use
/// [`SilentReporter`]. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_crawl_start(&self, _root: &Path) {}
    /// Called every `progress_interval` stored files.
    fn on_crawl_progress(&self, _files_processed: usize, _current_path: &Path) {}
    fn on_directory_abandoned(&self, _dir: &Path, _reason: &str) {}
    fn on_crawl_complete(&self, _stats: &CrawlStats, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
