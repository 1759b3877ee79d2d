use crate::config::document::Config;
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default configuration file name inside the config directory
pub const DEFAULT_CONFIG_NAME: &str = "config.json";

/// File-backed configuration document.
///
/// Every disk operation is best-effort: a failed load falls back to the
/// built-in defaults and a failed save is reported as `false`, both with a
/// logged warning. There is no locking; two stores pointed at the same file
/// race and the last `save()` wins.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
}

impl ConfigStore {
    /// Open `file_name` inside `config_dir`, creating the directory if
    /// needed, and load it
    pub fn open(config_dir: impl AsRef<Path>, file_name: &str) -> Self {
        let config_dir = config_dir.as_ref();
        if let Err(e) = fs::create_dir_all(config_dir) {
            log::warn!(
                "Failed to create config directory {}: {}",
                config_dir.display(),
                e
            );
        }
        Self::at_path(config_dir.join(file_name))
    }

    /// Open a store at an explicit file path and load it
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        let mut store = ConfigStore {
            path: path.into(),
            config: Config::default(),
        };
        store.load();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// In-memory document
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read the backing file.
    ///
    /// A missing file is created with the defaults. An unreadable or
    /// malformed file is left on disk as-is and the defaults are used.
    pub fn load(&mut self) -> &Config {
        match fs::read_to_string(&self.path) {
            Ok(text) => match Config::from_json(&text) {
                Ok(config) => self.config = config,
                Err(e) => {
                    log::warn!(
                        "Failed to parse config {}: {} (using defaults)",
                        self.path.display(),
                        e
                    );
                    self.config = Config::default();
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Config {} not found, writing defaults", self.path.display());
                self.config = Config::default();
                self.save();
            }
            Err(e) => {
                log::warn!(
                    "Failed to read config {}: {} (using defaults)",
                    self.path.display(),
                    e
                );
                self.config = Config::default();
            }
        }
        &self.config
    }

    /// Write the in-memory document to disk. Returns whether the write succeeded.
    ///
    /// The document goes to a temp file in the same directory which is then
    /// renamed over the target, so a failed or interrupted write leaves the
    /// previous file intact.
    pub fn save(&self) -> bool {
        let bytes = match self.config.to_json_pretty() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Failed to serialize config: {}", e);
                return false;
            }
        };
        match write_replace(&self.path, &bytes) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to save config {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Set a top-level key and persist the whole document immediately
    pub fn update_param(&mut self, key: &str, value: impl Into<Value>) -> bool {
        self.config.set(key, value.into());
        self.save()
    }

    /// Read a key from memory, never from disk
    pub fn get(&self, key: &str, default: Value) -> Value {
        self.config.get(key).cloned().unwrap_or(default)
    }

    /// Replace the document with the defaults and persist it
    pub fn reset(&mut self) -> &Config {
        self.config = Config::default();
        self.save();
        log::info!("Configuration {} reset to defaults", self.path.display());
        &self.config
    }
}

/// Replace `path` with `bytes` via a synced temp file and a rename
fn write_replace(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
