use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, warn};
use xliffsync::{AlObject, Settings};

/// The part of `app.json` we need.
#[derive(Debug, Deserialize)]
struct AppManifest {
    name: String,
}

/// An AL project folder: `app.json`, sources and the translation folder.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub app_name: String,
    pub translation_folder: PathBuf,
}

/// Drops characters that are not allowed in file names.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ':' | '/' | '\\' | '?' | '<' | '>' | '*' | '|' | '"') && !c.is_control())
        .collect()
}

impl Workspace {
    pub fn open(root: &Path, settings: &Settings) -> Result<Self, String> {
        let manifest_path = root.join("app.json");
        let text = fs::read_to_string(&manifest_path)
            .map_err(|e| format!("Failed to read '{}': {}", manifest_path.display(), e))?;
        let manifest: AppManifest = serde_json::from_str(text.trim_start_matches('\u{feff}'))
            .map_err(|e| format!("Invalid '{}': {}", manifest_path.display(), e))?;
        Ok(Self {
            root: root.to_path_buf(),
            app_name: manifest.name,
            translation_folder: settings.translation_folder.clone(),
        })
    }

    /// `<translation folder>/<app name>.g.xlf`
    pub fn master_path(&self) -> PathBuf {
        self.translation_folder
            .join(format!("{}.g.xlf", sanitize_file_name(&self.app_name)))
    }

    /// Every `.xlf` in the translation folder except the master, sorted by name.
    pub fn language_paths(&self) -> Result<Vec<PathBuf>, String> {
        let master = self.master_path();
        let entries = fs::read_dir(&self.translation_folder).map_err(|e| {
            format!(
                "Failed to read translation folder '{}': {}",
                self.translation_folder.display(),
                e
            )
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlf"))
                    && path.file_name() != master.file_name()
            })
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// `.al` files under the root, honoring `.gitignore`.
    pub fn source_files(&self) -> Result<Vec<PathBuf>, String> {
        let glob = GlobBuilder::new("**/*.al")
            .case_insensitive(true)
            .build()
            .map_err(|e| format!("Invalid glob pattern: {}", e))?;
        let mut builder = GlobSetBuilder::new();
        builder.add(glob);
        let set = builder
            .build()
            .map_err(|e| format!("Failed to build glob set: {}", e))?;

        let mut files: Vec<PathBuf> = WalkBuilder::new(&self.root)
            .git_ignore(true)
            .hidden(true)
            .build()
            .filter_map(Result::ok)
            .filter(|dent| dent.file_type().is_some_and(|t| t.is_file()))
            .map(|dent| dent.into_path())
            .filter(|path| set.is_match(path))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Parses every source file in parallel.
    ///
    /// Files without a supported object are skipped; objects that fail to
    /// parse are reported and left out.
    pub fn parse_objects(&self) -> Result<Vec<AlObject>, String> {
        let files = self.source_files()?;
        debug!(count = files.len(), "parsing source files");
        let objects = files
            .par_iter()
            .filter_map(|path| match AlObject::parse_file(path) {
                Ok(object) => object,
                Err(e) => {
                    warn!(path = %path.display(), "{}", e);
                    None
                }
            })
            .collect();
        Ok(objects)
    }
}
