use crate::config::normalize_extension;
use crate::storage::models::{SatelliteRecord, SpreadsheetMeta};
use std::path::Path;

const MACRO_EXTENSIONS: &[&str] = &["xlsm", "xltm", "xlam"];

/// Extension-only placeholder: workbooks are not opened.
pub fn extract(path: &Path) -> Option<SatelliteRecord> {
    Some(SatelliteRecord::Spreadsheet(extract_spreadsheet(path)))
}

pub fn extract_spreadsheet(path: &Path) -> SpreadsheetMeta {
    let ext = path
        .extension()
        .map(|e| normalize_extension(&e.to_string_lossy()))
        .unwrap_or_default();

    SpreadsheetMeta {
        sheet_count: 1,
        has_macros: MACRO_EXTENSIONS.contains(&ext.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_flag_from_extension() {
        assert!(extract_spreadsheet(Path::new("/a/Budget.XLSM")).has_macros);
        assert!(!extract_spreadsheet(Path::new("/a/budget.xlsx")).has_macros);
        assert_eq!(extract_spreadsheet(Path::new("/a/budget.csv")).sheet_count, 1);
    }
}
