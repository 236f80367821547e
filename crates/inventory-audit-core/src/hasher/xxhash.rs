use std::hash::Hasher as _;
use std::path::Path;
use twox_hash::XxHash64;

/// Fast, non-cryptographic fingerprint of an absolute path string.
///
/// Only used as an index aid; the same path string always yields the same
/// 16-character hex value, across runs and platforms.
pub fn path_fingerprint(path: &Path) -> String {
    let path_str = path.to_string_lossy();
    format!("{:016x}", hash_data(path_str.as_bytes()))
}

pub fn hash_data(data: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(data);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_path_fingerprint_is_deterministic() {
        let a = path_fingerprint(Path::new("/archive/project/plan.dwg"));
        let b = path_fingerprint(&PathBuf::from("/archive/project/plan.dwg"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_path_fingerprint_differs_per_path() {
        let a = path_fingerprint(Path::new("/archive/a.pdf"));
        let b = path_fingerprint(Path::new("/archive/b.pdf"));
        assert_ne!(a, b);
    }
}
