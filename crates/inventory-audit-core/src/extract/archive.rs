use crate::storage::models::{ArchiveMeta, SatelliteRecord};
use std::path::Path;

pub fn extract(path: &Path) -> Option<SatelliteRecord> {
    Some(SatelliteRecord::Archive(extract_archive(path)))
}

#[cfg(not(feature = "archives"))]
pub fn extract_archive(_path: &Path) -> ArchiveMeta {
    ArchiveMeta::default()
}

/// Reads the central directory only; entries are never inflated. A damaged
/// entry stops the walk and keeps what was gathered so far.
#[cfg(feature = "archives")]
pub fn extract_archive(path: &Path) -> ArchiveMeta {
    use std::fs::File;
    use tracing::trace;

    let mut archive = match File::open(path)
        .map_err(zip::result::ZipError::from)
        .and_then(zip::ZipArchive::new)
    {
        Ok(archive) => archive,
        Err(e) => {
            trace!("Archive open failed for {}: {}", path.display(), e);
            return ArchiveMeta::default();
        }
    };

    let mut meta = ArchiveMeta {
        entry_count: archive.len() as i64,
        ..ArchiveMeta::default()
    };

    let mut compressed: u64 = 0;
    let mut uncompressed: u64 = 0;
    for index in 0..archive.len() {
        let entry = match archive.by_index_raw(index) {
            Ok(entry) => entry,
            Err(e) => {
                trace!("Archive entry {} unreadable in {}: {}", index, path.display(), e);
                break;
            }
        };
        compressed += entry.compressed_size();
        uncompressed += entry.size();
        meta.is_encrypted |= entry.encrypted();
    }

    if uncompressed > 0 {
        meta.compression_ratio = compressed as f64 / uncompressed as f64;
    }
    meta
}
