use std::path::PathBuf;

use tracing::debug;
use xliffsync::traits::Parser;
use xliffsync::{
    RefreshResult, Settings, SuggestionMaps, Xliff, refresh_files, sort_files, update_master,
};

use crate::workspace::Workspace;

#[derive(Debug, Clone, Default)]
pub struct RefreshOptions {
    pub sort_only: bool,
    /// Peer file used as the highest-priority suggestion source.
    pub match_file: Option<PathBuf>,
    /// Folder with `<lang>.json` reference translations.
    pub base_app: Option<PathBuf>,
    pub json: bool,
}

fn print_result(result: &RefreshResult, json: bool) -> Result<(), String> {
    if json {
        let text = serde_json::to_string_pretty(result)
            .map_err(|e| format!("Failed to serialize result: {}", e))?;
        println!("{}", text);
    } else {
        println!("{}", result);
    }
    Ok(())
}

pub fn run_update_master_command(ws: &Workspace, settings: &Settings, json: bool) -> Result<(), String> {
    let objects = ws.parse_objects()?;
    let master_path = ws.master_path();
    let mut master = if master_path.is_file() {
        Xliff::read_from(&master_path).map_err(|e| e.to_string())?
    } else {
        debug!(path = %master_path.display(), "creating master document");
        Xliff::new("en-US", "en-US", ws.app_name.clone())
    };
    let result = update_master(&mut master, &objects);
    if let Some(parent) = master_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }
    master
        .save(&master_path, settings)
        .map_err(|e| e.to_string())?;
    print_result(&result, json)
}

pub fn run_refresh_command(
    ws: &Workspace,
    settings: &Settings,
    opts: &RefreshOptions,
) -> Result<(), String> {
    let master_path = ws.master_path();
    let language_paths = ws.language_paths()?;
    if language_paths.is_empty() {
        println!("No language files found in {}", ws.translation_folder.display());
        return Ok(());
    }

    let result = if opts.sort_only {
        sort_files(&master_path, &language_paths, settings).map_err(|e| e.to_string())?
    } else {
        let mut settings = settings.clone();
        if opts.base_app.is_some() {
            settings = settings.with_base_app_translation(opts.base_app.clone());
        }
        let languages = language_paths
            .iter()
            .map(|path| Xliff::read_from(path).map(|doc| doc.target_language))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        let maps = SuggestionMaps::build(&languages, &settings, opts.match_file.as_deref())
            .map_err(|e| e.to_string())?;
        refresh_files(&master_path, &language_paths, &settings, &maps)
            .map_err(|e| e.to_string())?
    };
    print_result(&result, opts.json)
}
