use std::fs;
use std::path::{Path, PathBuf};

use xliffsync::Settings;

/// Configuration file looked up in the workspace root.
pub const CONFIG_FILE: &str = "xliffsync.toml";

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Loads `xliffsync.toml` from `root`, falling back to defaults when absent.
///
/// Relative folders in the file are resolved against `root`.
pub fn load_settings(root: &Path) -> Result<Settings, String> {
    let path = root.join(CONFIG_FILE);
    let mut settings = if path.is_file() {
        let text = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
        toml::from_str::<Settings>(&text)
            .map_err(|e| format!("Invalid configuration in '{}': {}", path.display(), e))?
    } else {
        Settings::default()
    };

    settings.translation_folder = resolve(root, &settings.translation_folder);
    settings.translation_suggestion_paths = settings
        .translation_suggestion_paths
        .iter()
        .map(|p| resolve(root, p))
        .collect();
    settings.base_app_translation_folder = settings
        .base_app_translation_folder
        .as_deref()
        .map(|p| resolve(root, p));
    Ok(settings)
}
