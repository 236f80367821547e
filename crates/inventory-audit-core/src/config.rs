use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::collections::HashSet;

pub const DEFAULT_DATABASE_PATH: &str = "inventory.sqlite";
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
pub const DEFAULT_PROGRESS_INTERVAL: usize = 500;
pub const DEFAULT_REPORT_DIR: &str = "reports";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_path: String,
    /// Block size used when streaming file content into the digest.
    pub chunk_size: usize,
    /// Optional allow-list. `None` scans every extension.
    #[serde(default)]
    pub target_extensions: Option<Vec<String>>,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    pub report_dir: String,
    pub progress_interval: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            target_extensions: None,
            ignore_patterns: Vec::new(),
            report_dir: DEFAULT_REPORT_DIR.to_string(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl AppConfig {
    /// Normalized allow-list (lower-case, no leading dot), or `None` when every
    /// extension is accepted.
    pub fn target_extension_set(&self) -> Option<HashSet<String>> {
        self.target_extensions.as_ref().map(|exts| {
            exts.iter()
                .map(|ext| normalize_extension(ext))
                .filter(|ext| !ext.is_empty())
                .collect()
        })
    }

    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    pub fn effective_progress_interval(&self) -> usize {
        self.progress_interval.max(1)
    }
}

/// Lower-case an extension and strip any leading dots, so `.PDF`, `pdf` and
/// `Pdf` all compare equal.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// `AUDIT_*` variables. List fields take comma-separated values, e.g.
/// `AUDIT_TARGET_EXTENSIONS=dwg,pdf`.
fn environment() -> Environment {
    Environment::with_prefix("AUDIT")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("target_extensions")
        .with_list_parse_key("ignore_patterns")
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    load_with_environment(environment())
}

fn load_with_environment(env: Environment) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .set_default("database_path", DEFAULT_DATABASE_PATH)?
        .set_default("chunk_size", DEFAULT_CHUNK_SIZE as i64)?
        .set_default("report_dir", DEFAULT_REPORT_DIR)?
        .set_default("progress_interval", DEFAULT_PROGRESS_INTERVAL as i64)?
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(env)
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".PDF"), "pdf");
        assert_eq!(normalize_extension("dwg"), "dwg");
        assert_eq!(normalize_extension(" .Sv$ "), "sv$");
        assert_eq!(normalize_extension(""), "");
    }

    #[test]
    fn test_target_extension_set_normalizes_entries() {
        let config = AppConfig {
            target_extensions: Some(vec![".PDF".to_string(), "dwg".to_string(), ".".to_string()]),
            ..AppConfig::default()
        };
        let set = config.target_extension_set().unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("pdf"));
        assert!(set.contains("dwg"));
    }

    #[test]
    fn test_no_allow_list_by_default() {
        let config = AppConfig::default();
        assert!(config.target_extension_set().is_none());
        assert_eq!(config.chunk_size, 65536);
        assert_eq!(config.progress_interval, 500);
    }

    fn env_source(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_env_fills_list_fields() {
        let config = load_with_environment(env_source(&[
            ("AUDIT_TARGET_EXTENSIONS", "pdf,.DWG"),
            ("AUDIT_IGNORE_PATTERNS", "*/node_modules,*/.git"),
            ("AUDIT_CHUNK_SIZE", "4096"),
        ]))
        .unwrap();

        let set = config.target_extension_set().unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("pdf"));
        assert!(set.contains("dwg"));
        assert_eq!(config.ignore_patterns, vec!["*/node_modules", "*/.git"]);
        assert_eq!(config.chunk_size, 4096);
    }

    #[test]
    fn test_defaults_without_env() {
        let config = load_with_environment(env_source(&[])).unwrap();
        assert!(config.target_extensions.is_none());
        assert_eq!(config.database_path, DEFAULT_DATABASE_PATH);
        assert_eq!(config.progress_interval, DEFAULT_PROGRESS_INTERVAL);
    }

    #[test]
    fn test_effective_values_never_zero() {
        let config = AppConfig {
            chunk_size: 0,
            progress_interval: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.effective_chunk_size(), 1);
        assert_eq!(config.effective_progress_interval(), 1);
    }
}
