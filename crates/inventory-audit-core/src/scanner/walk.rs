use super::outcome::{CrawlStats, FileOutcome, SkipReason};
use crate::classifier::{classify, Category};
use crate::config::{normalize_extension, AppConfig};
use crate::error::Error;
use crate::extract;
use crate::hasher::{content_fingerprint, path_fingerprint, ContentId};
use crate::progress::ProgressReporter;
use crate::storage::models::{InventoryEntry, ProcessingStatus};
use crate::storage::Database;
use chrono::{DateTime, SecondsFormat, Utc};
use glob::Pattern;
use std::collections::HashSet;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, warn};

/// Depth-first crawler over an explicit work-list of directories.
///
/// Every regular file below the root becomes one [`FileOutcome`]. Symlinks are
/// not followed. A directory that cannot be listed is abandoned with a warning
/// and the crawl continues with its siblings.
pub struct Crawler<'a> {
    store: &'a Database,
    chunk_size: usize,
    allow_list: Option<HashSet<String>>,
    ignore_patterns: Vec<Pattern>,
    progress_interval: usize,
}

impl<'a> Crawler<'a> {
    pub fn new(config: &AppConfig, store: &'a Database) -> Self {
        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();

        Crawler {
            store,
            chunk_size: config.effective_chunk_size(),
            allow_list: config.target_extension_set(),
            ignore_patterns,
            progress_interval: config.effective_progress_interval(),
        }
    }

    /// Walk `root` and store one record per regular file.
    ///
    /// Only a missing root is an error; everything below it degrades to
    /// counters in the returned [`CrawlStats`].
    pub fn crawl(&self, root: &Path, reporter: &dyn ProgressReporter) -> Result<CrawlStats, Error> {
        if !root.is_dir() {
            return Err(Error::RootNotFound(root.to_path_buf()));
        }
        let root = fs::canonicalize(root)?;

        let mut stats = CrawlStats::default();
        let mut pending: Vec<PathBuf> = vec![root];

        while let Some(dir) = pending.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    self.abandon(&dir, &err, &mut stats, reporter);
                    continue;
                }
            };

            for entry_result in entries {
                let entry = match entry_result {
                    Ok(entry) => entry,
                    Err(err) => {
                        self.abandon(&dir, &err, &mut stats, reporter);
                        break;
                    }
                };

                let path = entry.path();
                let file_type = match entry.file_type() {
                    Ok(ft) => ft,
                    Err(err) => {
                        stats.record(&FileOutcome::Skipped(SkipReason::Stat(err.to_string())));
                        continue;
                    }
                };

                if file_type.is_dir() {
                    if self.is_ignored(&path) {
                        debug!("Ignoring directory {}", path.display());
                    } else {
                        pending.push(path);
                    }
                } else if file_type.is_file() {
                    let outcome = if self.is_ignored(&path) {
                        FileOutcome::Skipped(SkipReason::Ignored)
                    } else {
                        self.process_file(&path)
                    };
                    stats.record(&outcome);

                    if matches!(outcome, FileOutcome::Stored { .. })
                        && stats.stored % self.progress_interval == 0
                    {
                        reporter.on_crawl_progress(stats.stored, &path);
                    }
                }
            }
        }

        Ok(stats)
    }

    /// Classify, fingerprint, extract and store a single file.
    ///
    /// `path` should be absolute; it becomes the record's natural key.
    pub fn process_file(&self, path: &Path) -> FileOutcome {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|ext| normalize_extension(&ext.to_string_lossy()))
            .unwrap_or_default();

        if let Some(allow) = &self.allow_list {
            if !allow.contains(&extension) {
                return FileOutcome::Skipped(SkipReason::ExtensionFiltered);
            }
        }

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => {
                debug!("Cannot stat {}: {}", path.display(), err);
                return FileOutcome::Skipped(SkipReason::Stat(err.to_string()));
            }
        };

        let verdict = classify(&file_name, &extension);
        let content = if verdict.category == Category::TrashSys {
            ContentId::Skipped
        } else {
            content_fingerprint(path, self.chunk_size)
        };

        let category = match verdict.category {
            Category::Pending if content.is_digest() => Category::WorkFile,
            other => other,
        };
        let status = match content {
            ContentId::Digest(_) => ProcessingStatus::Hashed,
            ContentId::Skipped => ProcessingStatus::SkippedTrash,
            ContentId::AccessDenied => ProcessingStatus::AccessDenied,
        };

        let satellite = extract::dispatch(path, &extension);

        let entry = InventoryEntry {
            id: 0,
            path_hash: path_fingerprint(path),
            content_hash: content.as_str().to_string(),
            file_path: path.to_string_lossy().into_owned(),
            file_name: file_name.clone(),
            true_extension: extension.clone(),
            extension,
            size_bytes: metadata.len() as i64,
            created_at: created_timestamp(&metadata),
            modified_at: timestamp(metadata.modified()),
            category: category.as_str().to_string(),
            risk_score: i64::from(verdict.risk_score),
            processing_status: status.as_str().to_string(),
        };

        match self.store.upsert_entry(&entry, satellite.as_ref()) {
            Ok(file_id) => FileOutcome::Stored { file_id, status },
            Err(e) => {
                error!("Failed to store {}: {}", file_name, e);
                FileOutcome::Skipped(SkipReason::Store(e.to_string()))
            }
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }

    fn abandon(
        &self,
        dir: &Path,
        err: &io::Error,
        stats: &mut CrawlStats,
        reporter: &dyn ProgressReporter,
    ) {
        if err.kind() == io::ErrorKind::PermissionDenied {
            warn!("Access denied reading directory {}: {}", dir.display(), err);
        } else {
            warn!("Error reading directory {}: {}", dir.display(), err);
        }
        stats.directories_abandoned += 1;
        reporter.on_directory_abandoned(dir, &err.to_string());
    }
}

/// Creation time where the platform records one, otherwise modification time.
fn created_timestamp(metadata: &Metadata) -> String {
    timestamp(metadata.created().or_else(|_| metadata.modified()))
}

fn timestamp(time: io::Result<SystemTime>) -> String {
    time.map(|t| DateTime::<Utc>::from(t).to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentReporter;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content).unwrap();
        path
    }

    #[test]
    fn test_allow_list_filters_before_storing() {
        let dir = tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        let config = AppConfig {
            target_extensions: Some(vec![".PDF".to_string()]),
            ..AppConfig::default()
        };
        let crawler = Crawler::new(&config, &db);

        let txt = write_file(dir.path(), "notes.txt", b"hello");
        assert_eq!(
            crawler.process_file(&txt),
            FileOutcome::Skipped(SkipReason::ExtensionFiltered)
        );
        assert_eq!(db.entry_count().unwrap(), 0);
    }

    #[test]
    fn test_missing_file_reports_stat_failure() {
        let dir = tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        let crawler = Crawler::new(&AppConfig::default(), &db);

        let outcome = crawler.process_file(&dir.path().join("gone.txt"));
        assert!(matches!(
            outcome,
            FileOutcome::Skipped(SkipReason::Stat(_))
        ));
    }

    #[test]
    fn test_ignore_patterns_skip_directories() {
        let dir = tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        let cache = dir.path().join("node_modules");
        fs::create_dir(&cache).unwrap();
        write_file(&cache, "dep.js", b"module.exports = 1;");
        write_file(dir.path(), "main.js", b"require('dep');");

        let config = AppConfig {
            ignore_patterns: vec!["*/node_modules".to_string()],
            ..AppConfig::default()
        };
        let stats = Crawler::new(&config, &db)
            .crawl(dir.path(), &SilentReporter)
            .unwrap();

        assert_eq!(stats.stored, 1);
        assert_eq!(db.entry_count().unwrap(), 1);
    }

    #[test]
    fn test_crawl_rejects_missing_root() {
        let dir = tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        let result = Crawler::new(&AppConfig::default(), &db)
            .crawl(&dir.path().join("absent"), &SilentReporter);
        assert!(matches!(result, Err(Error::RootNotFound(_))));
    }

    #[derive(Default)]
    struct ProgressCounter {
        calls: std::sync::Mutex<Vec<usize>>,
    }

    impl ProgressReporter for ProgressCounter {
        fn on_crawl_progress(&self, files_processed: usize, _current_path: &Path) {
            self.calls.lock().unwrap().push(files_processed);
        }
    }

    #[test]
    fn test_progress_reported_every_interval() {
        let dir = tempdir().unwrap();
        for i in 0..5 {
            write_file(dir.path(), &format!("file{}.txt", i), format!("body {}", i).as_bytes());
        }
        let db = Database::open_in_memory().unwrap();
        let config = AppConfig {
            progress_interval: 2,
            ..AppConfig::default()
        };
        let reporter = ProgressCounter::default();

        let stats = Crawler::new(&config, &db).crawl(dir.path(), &reporter).unwrap();

        assert_eq!(stats.stored, 5);
        assert_eq!(*reporter.calls.lock().unwrap(), vec![2, 4]);
    }

    #[test]
    fn test_timestamp_is_utc_rfc3339() {
        let ts = timestamp(Ok(SystemTime::UNIX_EPOCH));
        assert_eq!(ts, "1970-01-01T00:00:00Z");
    }
}
