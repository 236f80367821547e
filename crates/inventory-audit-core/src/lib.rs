pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod hasher;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod storage;

pub use config::AppConfig;
pub use engine::{AuditEngine, ScanResult};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use report::AuditSummary;
pub use scanner::{CrawlStats, Crawler, FileOutcome, SkipReason};
pub use storage::Database;
