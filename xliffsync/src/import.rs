//! Import of translated files returned by the managed translation service.

use std::path::Path;

use tracing::{debug, info};

use crate::{
    error::Error,
    settings::{Settings, TranslationMode},
    sync::same_language,
    traits::Parser,
    validation::detect_invalid_values,
    xliff::{StateQualifier, TargetState, Xliff},
};

/// Merges the translations of `source` into `target`.
///
/// Units missing from `target` are copied over. Units whose first target is
/// already translated, signed off or final are kept. When `exact_match_state`
/// is given, exact-match targets are promoted to it. Returns the number of
/// units taken from `source`.
pub fn import_translated(
    source: &Xliff,
    target: &mut Xliff,
    settings: &Settings,
    exact_match_state: Option<TargetState>,
) -> Result<usize, Error> {
    let mode = settings.translation_mode;
    if mode != TranslationMode::Managed {
        return Err(Error::ModeMismatch {
            required: TranslationMode::Managed.to_string(),
            active: mode.to_string(),
        });
    }

    let mut imported = 0;
    for source_unit in &source.trans_units {
        let Some(unit) = target.get_unit_mut(&source_unit.id) else {
            debug!(id = %source_unit.id, "unit added from import");
            target.trans_units.push(source_unit.clone());
            imported += 1;
            continue;
        };

        let done = unit
            .target()
            .and_then(|t| t.state.as_ref())
            .is_some_and(TargetState::is_translated);
        if !done && let Some(imported_target) = source_unit.target() {
            if unit.targets.is_empty() {
                unit.targets.push(imported_target.clone());
            } else if let Some(existing) = unit.target_mut() {
                if imported_target.state_qualifier == Some(StateQualifier::IdMatch) {
                    existing.state_qualifier = None;
                } else {
                    existing.state = imported_target.state.clone();
                    existing.state_qualifier = imported_target.state_qualifier.clone();
                    existing.text = imported_target.text.clone();
                }
            }
            imported += 1;
        }

        if let Some(state) = &exact_match_state
            && let Some(existing) = unit.target_mut()
            && existing
                .state_qualifier
                .as_ref()
                .is_some_and(StateQualifier::is_exact_match)
        {
            existing.state = Some(state.clone());
            existing.state_qualifier = None;
        }
        if settings.detect_invalid_targets {
            detect_invalid_values(unit, mode);
        }
    }
    Ok(imported)
}

/// Imports `source_path` into the language file at `target_path` and saves it.
pub fn import_translated_file(
    source_path: &Path,
    target_path: &Path,
    settings: &Settings,
    exact_match_state: Option<TargetState>,
) -> Result<usize, Error> {
    let source = Xliff::read_from(source_path)?;
    let mut target = Xliff::read_from(target_path)?;
    if !same_language(&source.target_language, &target.target_language) {
        return Err(Error::InvalidDocument(format!(
            "cannot import {} translations into a {} file",
            source.target_language, target.target_language
        )));
    }
    let imported = import_translated(&source, &mut target, settings, exact_match_state)?;
    target.save(target_path, settings)?;
    info!(imported, path = %target_path.display(), "import finished");
    Ok(imported)
}
