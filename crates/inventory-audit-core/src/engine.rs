use crate::config::AppConfig;
use crate::error::Error;
use crate::progress::ProgressReporter;
use crate::report::AuditSummary;
use crate::scanner::{CrawlStats, Crawler};
use crate::storage::Database;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct AuditEngine {
    config: AppConfig,
    db_path: String,
}

#[derive(Debug)]
pub struct ScanResult {
    pub root: PathBuf,
    pub crawl_duration: Duration,
    pub stats: CrawlStats,
    pub summary: AuditSummary,
}

impl AuditEngine {
    pub fn new(config: AppConfig) -> Self {
        let db_path = config.database_path.clone();
        Self { config, db_path }
    }

    pub fn with_db_path(mut self, path: &str) -> Self {
        self.db_path = path.to_string();
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn open_store(&self) -> Result<Database, Error> {
        Ok(Database::open(&self.db_path)?)
    }

    /// Crawl `root` into the configured store, then summarize the store.
    ///
    /// Fails before touching the store when the root does not exist.
    pub fn scan(&self, root: &Path, reporter: &dyn ProgressReporter) -> Result<ScanResult, Error> {
        if !root.is_dir() {
            return Err(Error::RootNotFound(root.to_path_buf()));
        }
        let db = self.open_store()?;
        let result = self.scan_into(&db, root, reporter)?;
        db.close()?;
        Ok(result)
    }

    /// Same as [`AuditEngine::scan`] against an already open store.
    pub fn scan_into(
        &self,
        db: &Database,
        root: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<ScanResult, Error> {
        let root = root
            .canonicalize()
            .map_err(|_| Error::RootNotFound(root.to_path_buf()))?;
        info!("Auditing {}", root.display());
        reporter.on_crawl_start(&root);

        let start = Instant::now();
        let stats = Crawler::new(&self.config, db).crawl(&root, reporter)?;
        let crawl_duration = start.elapsed();
        reporter.on_crawl_complete(&stats, crawl_duration.as_secs_f64());
        debug!(
            "Crawl completed in {:.2}s: {} seen, {} stored, {} skipped, {} directories abandoned",
            crawl_duration.as_secs_f64(),
            stats.files_seen,
            stats.stored,
            stats.skipped(),
            stats.directories_abandoned,
        );

        let summary = AuditSummary::collect(db)?;
        info!(
            "Store holds {} entries, {} duplicate groups",
            summary.total_entries, summary.duplicate_groups
        );

        Ok(ScanResult {
            root,
            crawl_duration,
            stats,
            summary,
        })
    }
}
