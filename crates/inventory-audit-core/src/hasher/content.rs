use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::trace;

pub const SKIPPED_SENTINEL: &str = "SKIPPED_TRASH";
pub const ACCESS_DENIED_SENTINEL: &str = "ACCESS_DENIED";

/// Content identity of a file as stored in the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentId {
    /// Lower-case hex BLAKE3 digest of the full content.
    Digest(String),
    /// Never read because the file is known system junk.
    Skipped,
    /// The file exists but could not be read.
    AccessDenied,
}

impl ContentId {
    pub fn as_str(&self) -> &str {
        match self {
            ContentId::Digest(hex) => hex,
            ContentId::Skipped => SKIPPED_SENTINEL,
            ContentId::AccessDenied => ACCESS_DENIED_SENTINEL,
        }
    }

    pub fn is_digest(&self) -> bool {
        matches!(self, ContentId::Digest(_))
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Digest the file in `chunk_size` blocks. Read failures never propagate:
/// they collapse to [`ContentId::AccessDenied`] so the crawl can move on.
pub fn content_fingerprint(path: &Path, chunk_size: usize) -> ContentId {
    match hash_file(path, chunk_size) {
        Ok(hex) => ContentId::Digest(hex),
        Err(e) => {
            trace!("Cannot read {} for hashing: {}", path.display(), e);
            ContentId::AccessDenied
        }
    }
}

fn hash_file(path: &Path, chunk_size: usize) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, b"").unwrap();

        assert_eq!(
            content_fingerprint(&path, 65536),
            ContentId::Digest(
                "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262".to_string()
            )
        );
    }

    #[test]
    fn test_digest_independent_of_chunk_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        let small = content_fingerprint(&path, 7);
        let large = content_fingerprint(&path, 65536);
        assert!(small.is_digest());
        assert_eq!(small, large);
        assert_eq!(small.as_str().len(), 64);
    }

    #[test]
    fn test_identical_content_same_digest() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "same bytes").unwrap();
        fs::write(&b, "same bytes").unwrap();
        assert_eq!(content_fingerprint(&a, 4), content_fingerprint(&b, 4));
    }

    #[test]
    fn test_unreadable_file_yields_sentinel() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does_not_exist.dwg");
        let id = content_fingerprint(&missing, 65536);
        assert_eq!(id, ContentId::AccessDenied);
        assert_eq!(id.as_str(), "ACCESS_DENIED");
    }

    #[test]
    fn test_sentinel_strings() {
        assert_eq!(ContentId::Skipped.to_string(), "SKIPPED_TRASH");
        assert!(!ContentId::Skipped.is_digest());
    }
}
