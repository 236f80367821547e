use crate::storage::models::SatelliteRecord;
#[cfg(feature = "pdf")]
use crate::storage::models::DocumentMeta;
use std::path::Path;

/// Without the `pdf` feature there is no decoder and no satellite row.
#[cfg(not(feature = "pdf"))]
pub fn extract(_path: &Path) -> Option<SatelliteRecord> {
    None
}

#[cfg(feature = "pdf")]
pub fn extract(path: &Path) -> Option<SatelliteRecord> {
    Some(SatelliteRecord::Document(extract_document(path)))
}

/// Page count, encryption flag and producer/author from the Info dictionary.
///
/// Encrypted documents get one blank-password attempt; if that fails only the
/// encryption flag is reported.
#[cfg(feature = "pdf")]
pub fn extract_document(path: &Path) -> DocumentMeta {
    let mut meta = DocumentMeta::default();

    let mut doc = match lopdf::Document::load(path) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::trace!("PDF load failed for {}: {}", path.display(), e);
            return meta;
        }
    };

    meta.is_encrypted = doc.is_encrypted();
    if meta.is_encrypted && doc.decrypt("").is_err() {
        return meta;
    }

    meta.page_count = doc.get_pages().len() as i64;

    if let Some(info) = info_dictionary(&doc) {
        meta.producer_tool = text_entry(info, b"Producer").or_else(|| text_entry(info, b"Creator"));
        meta.author = text_entry(info, b"Author");
    }

    meta
}

#[cfg(feature = "pdf")]
fn info_dictionary(doc: &lopdf::Document) -> Option<&lopdf::Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        lopdf::Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        lopdf::Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

#[cfg(feature = "pdf")]
fn text_entry(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        lopdf::Object::String(bytes, _) => {
            let text = decode_text_string(bytes);
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        _ => None,
    }
}

/// PDF text strings are UTF-16BE with a byte-order mark, or a single-byte
/// encoding that is close enough to Latin-1 for metadata fields.
pub fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_latin1_string() {
        assert_eq!(decode_text_string(b"Acrobat Distiller"), "Acrobat Distiller");
        assert_eq!(decode_text_string(&[0x52, 0xE9, 0x6D, 0x69]), "Rémi");
    }

    #[test]
    fn test_decode_utf16_string() {
        let bytes = [0xFE, 0xFF, 0x00, 0x42, 0x00, 0xE9];
        assert_eq!(decode_text_string(&bytes), "Bé");
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_corrupt_pdf_degrades_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4\nthis is not a real document").unwrap();

        let meta = extract_document(&path);
        assert_eq!(meta, DocumentMeta::default());
    }
}
