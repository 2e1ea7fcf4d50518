use serde::Serialize;
use serde_json::json;
use xliffsync::traits::Parser;
use xliffsync::{Xliff, locate};

use crate::workspace::Workspace;

#[derive(Debug, Serialize)]
struct FileStatus {
    file: String,
    language: String,
    units: usize,
    needs_attention: usize,
    hints: usize,
    /// Ids of units a translator still has to look at.
    pending: Vec<String>,
}

fn file_status(doc: &Xliff) -> FileStatus {
    let pending: Vec<String> = doc
        .units_needing_attention()
        .map(|u| u.id.clone())
        .collect();
    FileStatus {
        file: doc.file_name().unwrap_or_default(),
        language: doc.target_language.clone(),
        units: doc.trans_units.len(),
        needs_attention: pending.len(),
        hints: doc.trans_units.iter().filter(|u| u.has_hint()).count(),
        pending,
    }
}

pub fn run_status_command(ws: &Workspace, json_output: bool) -> Result<(), String> {
    let mut files = Vec::new();
    for path in ws.language_paths()? {
        let doc = Xliff::read_from(&path).map_err(|e| e.to_string())?;
        files.push(file_status(&doc));
    }

    if json_output {
        let body = json!({
            "app": ws.app_name,
            "files": files,
        });
        let text = serde_json::to_string_pretty(&body)
            .map_err(|e| format!("Failed to serialize status: {}", e))?;
        println!("{}", text);
        return Ok(());
    }

    println!("=== {} ===", ws.app_name);
    if files.is_empty() {
        println!("No language files found.");
    }
    for status in &files {
        println!(
            "{} ({}): {} of {} unit(s) need attention, {} hint note(s)",
            status.file, status.language, status.needs_attention, status.units, status.hints
        );
    }
    Ok(())
}

pub fn run_locate_command(ws: &Workspace, id: &str, json_output: bool) -> Result<(), String> {
    let objects = ws.parse_objects()?;
    let location =
        locate(&objects, id).ok_or_else(|| format!("No source entry produces id '{}'", id))?;

    if json_output {
        let text = serde_json::to_string_pretty(&location)
            .map_err(|e| format!("Failed to serialize location: {}", e))?;
        println!("{}", text);
    } else {
        let path = location
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        println!("{}:{}: {}", path, location.line_no + 1, location.names);
    }
    Ok(())
}
