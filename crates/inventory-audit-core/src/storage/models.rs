use serde::Serialize;
use std::fmt;

/// Outcome of reading a file's content for fingerprinting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    Hashed,
    SkippedTrash,
    AccessDenied,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Hashed => "HASHED",
            ProcessingStatus::SkippedTrash => "SKIPPED_TRASH",
            ProcessingStatus::AccessDenied => "ACCESS_DENIED",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the parent `files` table, keyed by absolute path.
#[derive(Debug, Clone)]
pub struct InventoryEntry {
    pub id: i64,
    pub path_hash: String,
    pub content_hash: String,
    pub file_path: String,
    pub file_name: String,
    pub extension: String,
    /// Reserved for signature-based type detection; mirrors `extension` for now.
    pub true_extension: String,
    pub size_bytes: i64,
    pub created_at: String,
    pub modified_at: String,
    pub category: String,
    pub risk_score: i64,
    pub processing_status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CadMeta {
    pub software_version: String,
    pub has_xrefs: bool,
    /// Unit, scale or georeference hint, when the format exposes one.
    pub scale: Option<String>,
    pub is_workshared: bool,
}

impl Default for CadMeta {
    fn default() -> Self {
        Self {
            software_version: "Unknown".to_string(),
            has_xrefs: false,
            scale: None,
            is_workshared: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMeta {
    pub page_count: i64,
    pub author: Option<String>,
    pub is_encrypted: bool,
    pub producer_tool: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualMeta {
    pub width: i64,
    pub height: i64,
    pub color_space: String,
    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
}

impl Default for VisualMeta {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            color_space: "UNKNOWN".to_string(),
            gps_latitude: None,
            gps_longitude: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpreadsheetMeta {
    pub sheet_count: i64,
    pub has_macros: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveMeta {
    pub entry_count: i64,
    /// Compressed bytes over uncompressed bytes; 0.0 for an empty archive.
    pub compression_ratio: f64,
    pub is_encrypted: bool,
}

/// Format-family attributes owned 1:1 by a parent entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SatelliteRecord {
    Cad(CadMeta),
    Document(DocumentMeta),
    Visual(VisualMeta),
    Spreadsheet(SpreadsheetMeta),
    Archive(ArchiveMeta),
}

impl SatelliteRecord {
    pub fn table_name(&self) -> &'static str {
        match self {
            SatelliteRecord::Cad(_) => "meta_cad",
            SatelliteRecord::Document(_) => "meta_document",
            SatelliteRecord::Visual(_) => "meta_visual",
            SatelliteRecord::Spreadsheet(_) => "meta_spreadsheet",
            SatelliteRecord::Archive(_) => "meta_archive",
        }
    }
}

/// Files sharing one content fingerprint. Derived, never stored.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub content_hash: String,
    pub file_count: i64,
    pub paths: Vec<String>,
    pub total_bytes: i64,
    /// Total minus the one copy that has to stay.
    pub wasted_bytes: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrashStats {
    pub count: i64,
    pub total_bytes: i64,
}

/// Reclaimable space with trash and duplicates kept disjoint: duplicate waste is
/// computed only over rows below the trash threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reclaimable {
    pub trash_bytes: i64,
    pub duplicate_bytes: i64,
}

impl Reclaimable {
    pub fn total(&self) -> i64 {
        self.trash_bytes + self.duplicate_bytes
    }
}

/// Flat join of a parent row and whichever satellite it owns, for export.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryRow {
    pub id: i64,
    pub file_path: String,
    pub file_name: String,
    pub extension: String,
    pub true_extension: String,
    pub size_bytes: i64,
    pub created_at: String,
    pub modified_at: String,
    pub category: String,
    pub risk_score: i64,
    pub processing_status: String,
    pub content_hash: String,
    pub path_hash: String,
    pub cad_software_version: Option<String>,
    pub cad_has_xrefs: Option<bool>,
    pub cad_scale: Option<String>,
    pub cad_is_workshared: Option<bool>,
    pub doc_page_count: Option<i64>,
    pub doc_author: Option<String>,
    pub doc_is_encrypted: Option<bool>,
    pub doc_producer_tool: Option<String>,
    pub img_width: Option<i64>,
    pub img_height: Option<i64>,
    pub img_color_space: Option<String>,
    pub img_gps_latitude: Option<f64>,
    pub img_gps_longitude: Option<f64>,
    pub sheet_count: Option<i64>,
    pub sheet_has_macros: Option<bool>,
    pub archive_entry_count: Option<i64>,
    pub archive_compression_ratio: Option<f64>,
    pub archive_is_encrypted: Option<bool>,
}
