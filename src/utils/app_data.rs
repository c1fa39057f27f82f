use crate::index::codec::CodecKind;
use crate::index::types::IndexConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "bsbi";
const CONFIG_FILE: &str = "config.json";

/// User configuration stored in the platform config directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Read and tokenize the documents of a block in parallel
    #[serde(default = "default_parallel_tokenize")]
    pub parallel_tokenize: bool,

    /// Worker threads for parallel tokenization.
    /// If 0, uses the number of CPU cores
    #[serde(default)]
    pub parallel_thread_count: usize,

    /// Sort directory listings by name so ids are reproducible across machines
    #[serde(default = "default_true")]
    pub sort_entries: bool,

    /// Draw progress bars while building
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

fn default_parallel_tokenize() -> bool {
    false
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            parallel_tokenize: default_parallel_tokenize(),
            parallel_thread_count: 0,
            sort_entries: true,
            show_progress: true,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from the default location when `path` is None.
    /// A missing default config file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match get_config_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        Ok(config)
    }

    /// Resolve 0 to the CPU count
    pub fn effective_thread_count(&self) -> usize {
        if self.parallel_thread_count == 0 {
            num_cpus()
        } else {
            self.parallel_thread_count
        }
    }

    /// Per-build settings for the given codec
    pub fn index_config(&self, codec: CodecKind) -> IndexConfig {
        IndexConfig {
            codec,
            parallel_tokenize: self.parallel_tokenize,
            thread_count: if self.parallel_tokenize {
                self.effective_thread_count()
            } else {
                0
            },
            sort_entries: self.sort_entries,
            show_progress: self.show_progress,
        }
    }
}

/// Get the number of CPUs available
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Default config location: `<config dir>/bsbi/config.json`
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(APP_NAME).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert!(!config.parallel_tokenize);
        assert_eq!(config.parallel_thread_count, 0);
        assert!(config.sort_entries);
    }

    #[test]
    fn test_effective_thread_count() {
        let mut config = AppConfig::default();
        assert!(config.effective_thread_count() >= 1);

        config.parallel_thread_count = 4;
        assert_eq!(config.effective_thread_count(), 4);
    }

    #[test]
    fn test_index_config() {
        let mut config = AppConfig::default();
        let index = config.index_config(CodecKind::Gamma);
        assert_eq!(index.codec, CodecKind::Gamma);
        assert_eq!(index.thread_count, 0);

        config.parallel_tokenize = true;
        config.parallel_thread_count = 3;
        let index = config.index_config(CodecKind::Basic);
        assert!(index.parallel_tokenize);
        assert_eq!(index.thread_count, 3);
    }

    #[test]
    fn test_partial_json() {
        // Should use defaults for missing fields
        let json = r#"{"parallel_tokenize": true}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert!(config.parallel_tokenize);
        assert_eq!(config.parallel_thread_count, 0);
        assert!(config.sort_entries);
        assert!(config.show_progress);
    }

    #[test]
    fn test_empty_json() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.parallel_tokenize);
        assert!(config.sort_entries);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"sort_entries": false, "show_progress": false}"#).unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert!(!config.sort_entries);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_load_bad_json() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }
}
