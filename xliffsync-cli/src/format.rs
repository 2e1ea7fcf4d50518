use std::path::Path;

use tracing::info;
use xliffsync::traits::Parser;
use xliffsync::{
    Settings, TargetState, TranslationMode, Xliff, format_for_mode, import_translated_file,
    remove_all_hint_notes, sync::same_language,
};

use crate::workspace::Workspace;

/// Rewrites every language file in the representation of `mode`.
pub fn run_format_command(
    ws: &Workspace,
    settings: &Settings,
    mode: TranslationMode,
) -> Result<(), String> {
    let paths = ws.language_paths()?;
    for path in &paths {
        let mut doc = Xliff::read_from(path).map_err(|e| e.to_string())?;
        format_for_mode(&mut doc, mode);
        doc.save(path, settings).map_err(|e| e.to_string())?;
    }
    println!("Formatted {} file(s) for {} mode", paths.len(), mode);
    Ok(())
}

/// Removes hint notes from every language file without translation tokens.
pub fn run_clear_notes_command(ws: &Workspace, settings: &Settings) -> Result<(), String> {
    let mut cleared = 0;
    for path in ws.language_paths()? {
        let mut doc = Xliff::read_from(&path).map_err(|e| e.to_string())?;
        if doc.has_translation_tokens() {
            println!(
                "Skipped {}: translation tokens are still present",
                path.display()
            );
            continue;
        }
        if remove_all_hint_notes(&mut doc) {
            doc.save(&path, settings).map_err(|e| e.to_string())?;
            cleared += 1;
        }
    }
    println!("Removed hint notes from {} file(s)", cleared);
    Ok(())
}

/// Imports a translated file into the language file with the same target language.
pub fn run_import_command(
    ws: &Workspace,
    settings: &Settings,
    file: &Path,
    exact_match_state: Option<&str>,
) -> Result<(), String> {
    let exact_match_state = exact_match_state
        .map(str::parse::<TargetState>)
        .transpose()
        .map_err(|e| e.to_string())?;
    let imported_doc = Xliff::read_from(file).map_err(|e| e.to_string())?;

    let mut target_path = None;
    for path in ws.language_paths()? {
        if path.as_path() == file {
            continue;
        }
        let doc = Xliff::read_from(&path).map_err(|e| e.to_string())?;
        if same_language(&doc.target_language, &imported_doc.target_language) {
            target_path = Some(path);
            break;
        }
    }
    let target_path = target_path.ok_or_else(|| {
        format!(
            "No language file for '{}' in {}",
            imported_doc.target_language,
            ws.translation_folder.display()
        )
    })?;

    let imported = import_translated_file(file, &target_path, settings, exact_match_state)
        .map_err(|e| e.to_string())?;
    info!(file = %file.display(), "imported");
    println!("Imported {} unit(s) into {}", imported, target_path.display());
    Ok(())
}
