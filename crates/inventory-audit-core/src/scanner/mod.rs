mod outcome;
mod walk;

pub use outcome::{CrawlStats, FileOutcome, SkipReason};
pub use walk::Crawler;
