use crate::error::Error;
use crate::storage::models::{DuplicateGroup, Reclaimable, TrashStats};
use crate::storage::Database;
use chrono::Local;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const TOP_DUPLICATE_GROUPS: usize = 10;

/// Aggregate view of the store, computed on demand.
#[derive(Debug, Clone)]
pub struct AuditSummary {
    pub total_entries: i64,
    pub trash: TrashStats,
    pub duplicate_groups: usize,
    pub duplicate_wasted_bytes: i64,
    pub reclaimable: Reclaimable,
    /// Largest groups by total size.
    pub top_duplicates: Vec<DuplicateGroup>,
}

impl AuditSummary {
    pub fn collect(db: &Database) -> Result<Self, Error> {
        let groups = db.duplicates()?;
        let duplicate_wasted_bytes = groups.iter().map(|g| g.wasted_bytes).sum();
        Ok(AuditSummary {
            total_entries: db.entry_count()?,
            trash: db.trash_stats()?,
            duplicate_groups: groups.len(),
            duplicate_wasted_bytes,
            reclaimable: db.reclaimable()?,
            top_duplicates: groups.into_iter().take(TOP_DUPLICATE_GROUPS).collect(),
        })
    }
}

/// Write the joined inventory to `dir/inventory_audit_<timestamp>.csv`.
///
/// Returns `None` without creating a file when the store is empty.
pub fn export_inventory_csv(db: &Database, dir: &Path) -> Result<Option<PathBuf>, Error> {
    if db.entry_count()? == 0 {
        return Ok(None);
    }

    fs::create_dir_all(dir)?;
    let file_name = format!(
        "inventory_audit_{}.csv",
        Local::now().format("%Y%m%d_%H%M%S")
    );
    let path = dir.join(file_name);

    let rows = write_inventory_csv(db, BufWriter::new(File::create(&path)?))?;
    info!("Exported {} rows to {}", rows, path.display());
    Ok(Some(path))
}

/// Semicolon-delimited CSV with a UTF-8 byte-order mark, so spreadsheet
/// tools pick the right encoding. Returns the number of data rows.
pub fn write_inventory_csv<W: Write>(db: &Database, mut writer: W) -> Result<usize, Error> {
    writer.write_all(UTF8_BOM)?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(writer);

    let rows = db.full_inventory()?;
    for row in &rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{InventoryEntry, SatelliteRecord, SpreadsheetMeta};
    use tempfile::tempdir;

    fn entry(path: &str, content_hash: &str, size: i64) -> InventoryEntry {
        InventoryEntry {
            id: 0,
            path_hash: format!("{:016x}", size),
            content_hash: content_hash.to_string(),
            file_path: path.to_string(),
            file_name: path.rsplit('/').next().unwrap_or(path).to_string(),
            extension: "xlsx".to_string(),
            true_extension: "xlsx".to_string(),
            size_bytes: size,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            category: "WORK_FILE".to_string(),
            risk_score: 0,
            processing_status: "HASHED".to_string(),
        }
    }

    #[test]
    fn test_csv_has_bom_header_and_satellite_columns() {
        let db = Database::open_in_memory().unwrap();
        let sheet = SatelliteRecord::Spreadsheet(SpreadsheetMeta {
            sheet_count: 1,
            has_macros: true,
        });
        db.upsert_entry(&entry("/data/budget.xlsx", "aa", 10), Some(&sheet))
            .unwrap();

        let mut buf = Vec::new();
        let rows = write_inventory_csv(&db, &mut buf).unwrap();
        assert_eq!(rows, 1);
        assert!(buf.starts_with(UTF8_BOM));

        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("id;file_path;"));
        assert!(header.contains("sheet_has_macros"));
        let row = lines.next().unwrap();
        assert!(row.contains("/data/budget.xlsx"));
        assert!(row.contains(";true;"));
    }

    #[test]
    fn test_export_skips_empty_store() {
        let db = Database::open_in_memory().unwrap();
        let dir = tempdir().unwrap();
        assert!(export_inventory_csv(&db, dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_export_names_file_by_timestamp() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_entry(&entry("/data/a.xlsx", "aa", 10), None).unwrap();
        let dir = tempdir().unwrap();

        let path = export_inventory_csv(&db, &dir.path().join("reports"))
            .unwrap()
            .unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("inventory_audit_"));
        assert!(name.ends_with(".csv"));
        assert!(path.exists());
    }

    #[test]
    fn test_summary_counts_groups_and_waste() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_entry(&entry("/data/a.xlsx", "same", 100), None).unwrap();
        db.upsert_entry(&entry("/data/b.xlsx", "same", 100), None).unwrap();
        db.upsert_entry(&entry("/data/c.xlsx", "other", 50), None).unwrap();

        let summary = AuditSummary::collect(&db).unwrap();
        assert_eq!(summary.total_entries, 3);
        assert_eq!(summary.duplicate_groups, 1);
        assert_eq!(summary.duplicate_wasted_bytes, 100);
        assert_eq!(summary.trash, TrashStats::default());
        assert_eq!(summary.top_duplicates[0].paths.len(), 2);
    }
}
