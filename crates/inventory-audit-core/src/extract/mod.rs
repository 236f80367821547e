//! Format-family dispatch.
//!
//! Every recognized extension maps to exactly one [`FormatFamily`], which in
//! turn names one satellite table and one extractor. Extractors are total:
//! corrupt input degrades to a default record instead of an error.

pub mod archive;
pub mod cad;
pub mod document;
pub mod spreadsheet;
pub mod visual;

use crate::config::normalize_extension;
use crate::storage::models::SatelliteRecord;
use std::path::Path;

/// Reads one file and returns the attributes for its satellite row, or `None`
/// when there is nothing to store.
pub type Extractor = fn(&Path) -> Option<SatelliteRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatFamily {
    Cad,
    Document,
    Image,
    Spreadsheet,
    Archive,
}

impl FormatFamily {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match normalize_extension(extension).as_str() {
            "dwg" | "dxf" | "rvt" | "rfa" | "rte" | "ifc" => Some(FormatFamily::Cad),
            "pdf" => Some(FormatFamily::Document),
            "jpg" | "jpeg" | "png" | "tif" | "tiff" | "webp" | "bmp" => Some(FormatFamily::Image),
            "xlsx" | "xlsm" | "xls" | "csv" => Some(FormatFamily::Spreadsheet),
            "zip" => Some(FormatFamily::Archive),
            _ => None,
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            FormatFamily::Cad => "meta_cad",
            FormatFamily::Document => "meta_document",
            FormatFamily::Image => "meta_visual",
            FormatFamily::Spreadsheet => "meta_spreadsheet",
            FormatFamily::Archive => "meta_archive",
        }
    }

    pub fn extractor(self) -> Extractor {
        match self {
            FormatFamily::Cad => cad::extract,
            FormatFamily::Document => document::extract,
            FormatFamily::Image => visual::extract,
            FormatFamily::Spreadsheet => spreadsheet::extract,
            FormatFamily::Archive => archive::extract,
        }
    }
}

/// Route a file to its extractor. Unrecognized extensions yield `None` and the
/// parent entry is stored without a satellite row.
pub fn dispatch(path: &Path, extension: &str) -> Option<SatelliteRecord> {
    let family = FormatFamily::from_extension(extension)?;
    (family.extractor())(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_families() {
        assert_eq!(FormatFamily::from_extension("dwg"), Some(FormatFamily::Cad));
        assert_eq!(FormatFamily::from_extension(".IFC"), Some(FormatFamily::Cad));
        assert_eq!(FormatFamily::from_extension("PDF"), Some(FormatFamily::Document));
        assert_eq!(FormatFamily::from_extension("jpeg"), Some(FormatFamily::Image));
        assert_eq!(FormatFamily::from_extension("xlsm"), Some(FormatFamily::Spreadsheet));
        assert_eq!(FormatFamily::from_extension("zip"), Some(FormatFamily::Archive));
        assert_eq!(FormatFamily::from_extension("txt"), None);
        assert_eq!(FormatFamily::from_extension(""), None);
    }

    #[test]
    fn test_table_names_match_records() {
        assert_eq!(FormatFamily::Cad.table_name(), "meta_cad");
        assert_eq!(FormatFamily::Image.table_name(), "meta_visual");
        assert_eq!(FormatFamily::Archive.table_name(), "meta_archive");
    }

    #[test]
    fn test_unrecognized_extension_dispatches_nothing() {
        assert!(dispatch(Path::new("/nonexistent/notes.txt"), "txt").is_none());
    }

    #[test]
    fn test_missing_file_still_dispatches_default() {
        let record = dispatch(Path::new("/nonexistent/plan.dwg"), "dwg");
        match record {
            Some(SatelliteRecord::Cad(meta)) => assert_eq!(meta.software_version, "Unknown"),
            other => panic!("unexpected record: {:?}", other),
        }
    }
}
