use super::models::*;
use super::sqlite::Database;
use crate::classifier::{Category, TRASH_THRESHOLD};
use crate::hasher::content::{ACCESS_DENIED_SENTINEL, SKIPPED_SENTINEL};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use tracing::debug;

impl Database {
    // ── Inventory writes ─────────────────────────────────────────

    /// Insert or update the parent row by path, then attach the satellite
    /// record to the resolved id, all in one transaction.
    ///
    /// Returns the parent id. On error nothing from this call is kept.
    pub fn upsert_entry(
        &self,
        entry: &InventoryEntry,
        satellite: Option<&SatelliteRecord>,
    ) -> Result<i64> {
        let tx = self.connection().unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO files \
                 (path_hash, content_hash, file_path, filename, extension, true_extension, \
                  size_bytes, creation_date, modification_date, category, risk_score, \
                  processing_status) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12) \
                 ON CONFLICT(file_path) DO UPDATE SET \
                     path_hash = excluded.path_hash, \
                     content_hash = excluded.content_hash, \
                     creation_date = excluded.creation_date, \
                     modification_date = excluded.modification_date, \
                     size_bytes = excluded.size_bytes, \
                     category = excluded.category, \
                     risk_score = excluded.risk_score, \
                     processing_status = excluded.processing_status",
            )?;
            stmt.execute(params![
                entry.path_hash,
                entry.content_hash,
                entry.file_path,
                entry.file_name,
                entry.extension,
                entry.true_extension,
                entry.size_bytes,
                entry.created_at,
                entry.modified_at,
                entry.category,
                entry.risk_score,
                entry.processing_status,
            ])?;
        }

        let file_id: i64 = tx.query_row(
            "SELECT id FROM files WHERE file_path = ?1",
            params![entry.file_path],
            |row| row.get(0),
        )?;

        if let Some(record) = satellite {
            write_satellite(&tx, file_id, record)?;
        }

        tx.commit()?;
        debug!("Upserted {} (id {})", entry.file_path, file_id);
        Ok(file_id)
    }

    // ── Inventory reads ──────────────────────────────────────────

    pub fn entry_count(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
    }

    pub fn find_entry(&self, file_path: &str) -> Result<Option<InventoryEntry>> {
        match self.connection().query_row(
            "SELECT id, path_hash, content_hash, file_path, filename, extension, \
                    true_extension, size_bytes, creation_date, modification_date, \
                    category, risk_score, processing_status \
             FROM files WHERE file_path = ?1",
            params![file_path],
            entry_from_row,
        ) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The satellite owned by `file_id`, whichever table it lives in.
    pub fn find_satellite(&self, file_id: i64) -> Result<Option<SatelliteRecord>> {
        let conn = self.connection();

        let cad = conn
            .query_row(
                "SELECT software_version, has_xrefs, scale, is_workshared \
                 FROM meta_cad WHERE file_id = ?1",
                params![file_id],
                |row| {
                    Ok(SatelliteRecord::Cad(CadMeta {
                        software_version: row.get(0)?,
                        has_xrefs: row.get(1)?,
                        scale: row.get(2)?,
                        is_workshared: row.get(3)?,
                    }))
                },
            )
            .optional()?;
        if cad.is_some() {
            return Ok(cad);
        }

        let document = conn
            .query_row(
                "SELECT page_count, author, is_encrypted, producer_tool \
                 FROM meta_document WHERE file_id = ?1",
                params![file_id],
                |row| {
                    Ok(SatelliteRecord::Document(DocumentMeta {
                        page_count: row.get(0)?,
                        author: row.get(1)?,
                        is_encrypted: row.get(2)?,
                        producer_tool: row.get(3)?,
                    }))
                },
            )
            .optional()?;
        if document.is_some() {
            return Ok(document);
        }

        let visual = conn
            .query_row(
                "SELECT width, height, color_space, gps_latitude, gps_longitude \
                 FROM meta_visual WHERE file_id = ?1",
                params![file_id],
                |row| {
                    Ok(SatelliteRecord::Visual(VisualMeta {
                        width: row.get(0)?,
                        height: row.get(1)?,
                        color_space: row.get(2)?,
                        gps_latitude: row.get(3)?,
                        gps_longitude: row.get(4)?,
                    }))
                },
            )
            .optional()?;
        if visual.is_some() {
            return Ok(visual);
        }

        let spreadsheet = conn
            .query_row(
                "SELECT sheet_count, has_macros FROM meta_spreadsheet WHERE file_id = ?1",
                params![file_id],
                |row| {
                    Ok(SatelliteRecord::Spreadsheet(SpreadsheetMeta {
                        sheet_count: row.get(0)?,
                        has_macros: row.get(1)?,
                    }))
                },
            )
            .optional()?;
        if spreadsheet.is_some() {
            return Ok(spreadsheet);
        }

        conn.query_row(
            "SELECT entry_count, compression_ratio, is_encrypted \
             FROM meta_archive WHERE file_id = ?1",
            params![file_id],
            |row| {
                Ok(SatelliteRecord::Archive(ArchiveMeta {
                    entry_count: row.get(0)?,
                    compression_ratio: row.get(1)?,
                    is_encrypted: row.get(2)?,
                }))
            },
        )
        .optional()
    }

    // ── Aggregates ───────────────────────────────────────────────

    /// Groups of two or more rows sharing a content fingerprint, largest total
    /// first. Extension-based trash and sentinel fingerprints never group.
    pub fn duplicates(&self) -> Result<Vec<DuplicateGroup>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT content_hash, COUNT(*), SUM(size_bytes), SUM(size_bytes) - MIN(size_bytes) \
             FROM files \
             WHERE category != ?1 AND content_hash NOT IN (?2, ?3) \
             GROUP BY content_hash \
             HAVING COUNT(*) > 1 \
             ORDER BY SUM(size_bytes) DESC, content_hash",
        )?;

        let mut groups = stmt
            .query_map(
                params![
                    Category::TrashExt.as_str(),
                    SKIPPED_SENTINEL,
                    ACCESS_DENIED_SENTINEL
                ],
                |row| {
                    Ok(DuplicateGroup {
                        content_hash: row.get(0)?,
                        file_count: row.get(1)?,
                        paths: Vec::new(),
                        total_bytes: row.get(2)?,
                        wasted_bytes: row.get(3)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>>>()?;

        let mut members = conn.prepare_cached(
            "SELECT file_path FROM files \
             WHERE content_hash = ?1 AND category != ?2 \
             ORDER BY file_path",
        )?;
        for group in &mut groups {
            group.paths = members
                .query_map(
                    params![group.content_hash, Category::TrashExt.as_str()],
                    |row| row.get(0),
                )?
                .collect::<Result<Vec<String>>>()?;
        }
        Ok(groups)
    }

    /// Every row at or above the trash threshold, whatever its category.
    pub fn trash_stats(&self) -> Result<TrashStats> {
        self.connection().query_row(
            "SELECT COUNT(*), COALESCE(SUM(size_bytes), 0) FROM files WHERE risk_score >= ?1",
            params![TRASH_THRESHOLD],
            |row| {
                Ok(TrashStats {
                    count: row.get(0)?,
                    total_bytes: row.get(1)?,
                })
            },
        )
    }

    pub fn reclaimable(&self) -> Result<Reclaimable> {
        let trash = self.trash_stats()?;
        let duplicate_bytes: i64 = self.connection().query_row(
            "SELECT COALESCE(SUM(wasted), 0) FROM ( \
                 SELECT SUM(size_bytes) - MIN(size_bytes) AS wasted \
                 FROM files \
                 WHERE risk_score < ?1 AND content_hash NOT IN (?2, ?3) \
                 GROUP BY content_hash \
                 HAVING COUNT(*) > 1)",
            params![TRASH_THRESHOLD, SKIPPED_SENTINEL, ACCESS_DENIED_SENTINEL],
            |row| row.get(0),
        )?;
        Ok(Reclaimable {
            trash_bytes: trash.total_bytes,
            duplicate_bytes,
        })
    }

    /// Every parent row joined with its satellite columns, ordered by path.
    pub fn full_inventory(&self) -> Result<Vec<InventoryRow>> {
        let mut stmt = self.connection().prepare(
            "SELECT f.id, f.file_path, f.filename, f.extension, f.true_extension, \
                    f.size_bytes, f.creation_date, f.modification_date, f.category, \
                    f.risk_score, f.processing_status, f.content_hash, f.path_hash, \
                    c.software_version, c.has_xrefs, c.scale, c.is_workshared, \
                    d.page_count, d.author, d.is_encrypted, d.producer_tool, \
                    v.width, v.height, v.color_space, v.gps_latitude, v.gps_longitude, \
                    s.sheet_count, s.has_macros, \
                    a.entry_count, a.compression_ratio, a.is_encrypted \
             FROM files f \
             LEFT JOIN meta_cad c ON c.file_id = f.id \
             LEFT JOIN meta_document d ON d.file_id = f.id \
             LEFT JOIN meta_visual v ON v.file_id = f.id \
             LEFT JOIN meta_spreadsheet s ON s.file_id = f.id \
             LEFT JOIN meta_archive a ON a.file_id = f.id \
             ORDER BY f.file_path",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(InventoryRow {
                    id: row.get(0)?,
                    file_path: row.get(1)?,
                    file_name: row.get(2)?,
                    extension: row.get(3)?,
                    true_extension: row.get(4)?,
                    size_bytes: row.get(5)?,
                    created_at: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                    modified_at: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                    category: row.get(8)?,
                    risk_score: row.get(9)?,
                    processing_status: row.get(10)?,
                    content_hash: row.get(11)?,
                    path_hash: row.get(12)?,
                    cad_software_version: row.get(13)?,
                    cad_has_xrefs: row.get(14)?,
                    cad_scale: row.get(15)?,
                    cad_is_workshared: row.get(16)?,
                    doc_page_count: row.get(17)?,
                    doc_author: row.get(18)?,
                    doc_is_encrypted: row.get(19)?,
                    doc_producer_tool: row.get(20)?,
                    img_width: row.get(21)?,
                    img_height: row.get(22)?,
                    img_color_space: row.get(23)?,
                    img_gps_latitude: row.get(24)?,
                    img_gps_longitude: row.get(25)?,
                    sheet_count: row.get(26)?,
                    sheet_has_macros: row.get(27)?,
                    archive_entry_count: row.get(28)?,
                    archive_compression_ratio: row.get(29)?,
                    archive_is_encrypted: row.get(30)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn entry_from_row(row: &Row<'_>) -> Result<InventoryEntry> {
    Ok(InventoryEntry {
        id: row.get(0)?,
        path_hash: row.get(1)?,
        content_hash: row.get(2)?,
        file_path: row.get(3)?,
        file_name: row.get(4)?,
        extension: row.get(5)?,
        true_extension: row.get(6)?,
        size_bytes: row.get(7)?,
        created_at: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        modified_at: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
        category: row.get(10)?,
        risk_score: row.get(11)?,
        processing_status: row.get(12)?,
    })
}

/// Insert-or-replace keyed by parent id, so a rescan never leaves a stale row.
fn write_satellite(conn: &Connection, file_id: i64, record: &SatelliteRecord) -> Result<usize> {
    match record {
        SatelliteRecord::Cad(m) => conn.execute(
            "INSERT OR REPLACE INTO meta_cad \
             (file_id, software_version, has_xrefs, scale, is_workshared) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![file_id, m.software_version, m.has_xrefs, m.scale, m.is_workshared],
        ),
        SatelliteRecord::Document(m) => conn.execute(
            "INSERT OR REPLACE INTO meta_document \
             (file_id, page_count, author, is_encrypted, producer_tool) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![file_id, m.page_count, m.author, m.is_encrypted, m.producer_tool],
        ),
        SatelliteRecord::Visual(m) => conn.execute(
            "INSERT OR REPLACE INTO meta_visual \
             (file_id, width, height, color_space, gps_latitude, gps_longitude) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                file_id,
                m.width,
                m.height,
                m.color_space,
                m.gps_latitude,
                m.gps_longitude
            ],
        ),
        SatelliteRecord::Spreadsheet(m) => conn.execute(
            "INSERT OR REPLACE INTO meta_spreadsheet (file_id, sheet_count, has_macros) \
             VALUES (?1, ?2, ?3)",
            params![file_id, m.sheet_count, m.has_macros],
        ),
        SatelliteRecord::Archive(m) => conn.execute(
            "INSERT OR REPLACE INTO meta_archive \
             (file_id, entry_count, compression_ratio, is_encrypted) \
             VALUES (?1, ?2, ?3, ?4)",
            params![file_id, m.entry_count, m.compression_ratio, m.is_encrypted],
        ),
    }
}
