// Configuration document, its file-backed store, and directory resolution

pub mod document;
pub mod store;

pub use document::*;
pub use store::*;

use std::path::PathBuf;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "GROWSTAGE_CONFIG_DIR";

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        return dir.join("growstage");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".growstage");
    }
    PathBuf::from("configs")
}

/// Resolve the configuration directory: explicit flag, then environment, then default
pub fn resolve_config_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => default_config_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_wins() {
        let dir = resolve_config_dir(Some(PathBuf::from("/tmp/custom")));
        assert_eq!(dir, PathBuf::from("/tmp/custom"));
    }

    #[test]
    fn test_default_dir_is_named() {
        let dir = default_config_dir();
        let name = dir.to_string_lossy();
        assert!(name.ends_with("growstage") || name.ends_with(".growstage") || name == "configs");
    }
}
