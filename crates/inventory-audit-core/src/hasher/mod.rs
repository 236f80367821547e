pub mod content;
pub mod xxhash;

pub use content::{content_fingerprint, ContentId};
pub use xxhash::path_fingerprint;
