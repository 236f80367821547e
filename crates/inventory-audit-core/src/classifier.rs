//! Debris classification from filename and extension alone.
//!
//! Rules are evaluated in order and the first match wins: extension denylist,
//! then exact system filenames, then sync-conflict copies. Nothing here touches
//! the filesystem.

use std::fmt;

/// Backup, swap, temp, log, crash-dump and old-version suffixes.
const TRASH_EXTENSIONS: &[&str] = &[
    "bak", "sv$", "tmp", "log", "err", "dmp", "old", "swp", "dwl", "dwl2", "ac$",
];

/// OS and tool cache files, compared against the lower-cased filename.
const TRASH_FILENAMES: &[&str] = &[
    "thumbs.db",
    "ehthumbs.db",
    "desktop.ini",
    ".ds_store",
    ".bridgecache",
    ".bridgecachet",
];

const CONFLICT_TOKENS: &[&str] = &["conflict", "conflit"];
const COPY_TOKENS: &[&str] = &["copy", "copie"];

pub const CERTAIN_TRASH_SCORE: u8 = 100;
pub const CONFLICT_COPY_SCORE: u8 = 90;
/// Rows at or above this score count as reclaimable debris.
pub const TRASH_THRESHOLD: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    TrashExt,
    TrashSys,
    ConflictCopy,
    Pending,
    WorkFile,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TrashExt => "TRASH_EXT",
            Category::TrashSys => "TRASH_SYS",
            Category::ConflictCopy => "CONFLICT_COPY",
            Category::Pending => "PENDING",
            Category::WorkFile => "WORK_FILE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TRASH_EXT" => Some(Category::TrashExt),
            "TRASH_SYS" => Some(Category::TrashSys),
            "CONFLICT_COPY" => Some(Category::ConflictCopy),
            "PENDING" => Some(Category::Pending),
            "WORK_FILE" => Some(Category::WorkFile),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub risk_score: u8,
    pub category: Category,
}

/// Classify a file. `extension` is expected normalized (lower-case, no dot).
pub fn classify(filename: &str, extension: &str) -> Verdict {
    if TRASH_EXTENSIONS.contains(&extension) {
        return Verdict {
            risk_score: CERTAIN_TRASH_SCORE,
            category: Category::TrashExt,
        };
    }

    let lower = filename.to_lowercase();

    if TRASH_FILENAMES.contains(&lower.as_str()) {
        return Verdict {
            risk_score: CERTAIN_TRASH_SCORE,
            category: Category::TrashSys,
        };
    }

    let has_conflict = CONFLICT_TOKENS.iter().any(|t| lower.contains(t));
    let has_copy = COPY_TOKENS.iter().any(|t| lower.contains(t));
    if has_conflict && has_copy {
        return Verdict {
            risk_score: CONFLICT_COPY_SCORE,
            category: Category::ConflictCopy,
        };
    }

    Verdict {
        risk_score: 0,
        category: Category::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trash_extension() {
        let v = classify("plan_v2.bak", "bak");
        assert_eq!(v.category, Category::TrashExt);
        assert_eq!(v.risk_score, 100);

        assert_eq!(classify("drawing.sv$", "sv$").category, Category::TrashExt);
        assert_eq!(classify("crash.dmp", "dmp").category, Category::TrashExt);
    }

    #[test]
    fn test_system_filenames_case_insensitive() {
        let v = classify("Thumbs.db", "db");
        assert_eq!(v.category, Category::TrashSys);
        assert_eq!(v.risk_score, 100);
        assert_eq!(classify(".DS_Store", "").category, Category::TrashSys);
        assert_eq!(classify("desktop.INI", "ini").category, Category::TrashSys);
    }

    #[test]
    fn test_conflict_copy_needs_both_tokens() {
        let v = classify("Plan (conflicted copy 2021-03-04).dwg", "dwg");
        assert_eq!(v.category, Category::ConflictCopy);
        assert_eq!(v.risk_score, 90);

        assert_eq!(
            classify("Note - Copie en conflit.docx", "docx").category,
            Category::ConflictCopy
        );
        assert_eq!(classify("copy of plan.dwg", "dwg").category, Category::Pending);
        assert_eq!(classify("conflict matrix.xlsx", "xlsx").category, Category::Pending);
    }

    #[test]
    fn test_extension_outranks_filename_patterns() {
        // Both a junk extension and a conflict-copy name: extension wins.
        let v = classify("conflict copy.tmp", "tmp");
        assert_eq!(v.category, Category::TrashExt);
        assert_eq!(v.risk_score, 100);
    }

    #[test]
    fn test_work_product_is_pending() {
        let v = classify("Facade_Nord.dwg", "dwg");
        assert_eq!(v.category, Category::Pending);
        assert_eq!(v.risk_score, 0);
    }

    #[test]
    fn test_category_round_trip_labels() {
        for c in [
            Category::TrashExt,
            Category::TrashSys,
            Category::ConflictCopy,
            Category::Pending,
            Category::WorkFile,
        ] {
            assert_eq!(Category::parse(c.as_str()), Some(c));
        }
        assert_eq!(Category::parse("UNKNOWN"), None);
    }
}
