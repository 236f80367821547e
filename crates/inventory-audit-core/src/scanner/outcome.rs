use crate::storage::models::ProcessingStatus;
use std::fmt;

/// Why a single file produced no inventory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Extension not on the configured allow-list.
    ExtensionFiltered,
    /// Matched an ignore pattern.
    Ignored,
    /// Metadata could not be read.
    Stat(String),
    /// The store transaction failed and was rolled back.
    Store(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ExtensionFiltered => write!(f, "extension not in allow-list"),
            SkipReason::Ignored => write!(f, "matched ignore pattern"),
            SkipReason::Stat(e) => write!(f, "stat failed: {}", e),
            SkipReason::Store(e) => write!(f, "store failed: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Stored {
        file_id: i64,
        status: ProcessingStatus,
    },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub files_seen: usize,
    pub stored: usize,
    /// Stored with the `ACCESS_DENIED` content sentinel.
    pub unreadable: usize,
    /// Stored without reading content (known system junk).
    pub hash_skipped: usize,
    pub extension_filtered: usize,
    pub ignored: usize,
    pub stat_failures: usize,
    pub store_failures: usize,
    pub directories_abandoned: usize,
}

impl CrawlStats {
    pub fn record(&mut self, outcome: &FileOutcome) {
        self.files_seen += 1;
        match outcome {
            FileOutcome::Stored { status, .. } => {
                self.stored += 1;
                match status {
                    ProcessingStatus::AccessDenied => self.unreadable += 1,
                    ProcessingStatus::SkippedTrash => self.hash_skipped += 1,
                    ProcessingStatus::Hashed => {}
                }
            }
            FileOutcome::Skipped(reason) => match reason {
                SkipReason::ExtensionFiltered => self.extension_filtered += 1,
                SkipReason::Ignored => self.ignored += 1,
                SkipReason::Stat(_) => self.stat_failures += 1,
                SkipReason::Store(_) => self.store_failures += 1,
            },
        }
    }

    pub fn skipped(&self) -> usize {
        self.extension_filtered + self.ignored + self.stat_failures + self.store_failures
    }
}
