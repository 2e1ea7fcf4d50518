//! The synchronization engine.
//!
//! The master document is authoritative: every language document is rebuilt in
//! master order, seeded with new units, updated where the master changed and
//! stripped of units the master no longer carries.

use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
    path::Path,
};

use serde::Serialize;
use tracing::{debug, info};
use unic_langid::LanguageIdentifier;

use crate::{
    al::AlObject,
    error::Error,
    settings::{Settings, TranslationMode},
    suggestions::{self, MatchMap, SuggestionMaps},
    traits::Parser,
    validation::detect_invalid_values,
    xliff::{RefreshHint, StateQualifier, Target, TargetState, TransUnit, TranslationToken, Xliff},
};

/// Counters reported by a refresh or master update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshResult {
    pub added: usize,
    pub updated_notes: usize,
    pub updated_max_widths: usize,
    pub updated_sources: usize,
    pub removed_units: usize,
    pub removed_notes: usize,
    pub checked_files: usize,
    pub suggestions_added: usize,
}

impl RefreshResult {
    pub fn merge(&mut self, other: &RefreshResult) {
        self.added += other.added;
        self.updated_notes += other.updated_notes;
        self.updated_max_widths += other.updated_max_widths;
        self.updated_sources += other.updated_sources;
        self.removed_units += other.removed_units;
        self.removed_notes += other.removed_notes;
        self.checked_files += other.checked_files;
        self.suggestions_added += other.suggestions_added;
    }

    pub fn total_changes(&self) -> usize {
        self.added
            + self.updated_notes
            + self.updated_max_widths
            + self.updated_sources
            + self.removed_units
            + self.removed_notes
            + self.suggestions_added
    }
}

impl Display for RefreshResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.total_changes() == 0 {
            return write!(f, "Checked {} file(s), nothing changed.", self.checked_files);
        }
        let parts: Vec<String> = [
            (self.added, "translation(s) added"),
            (self.updated_sources, "source(s) updated"),
            (self.updated_max_widths, "max width(s) updated"),
            (self.updated_notes, "developer note(s) updated"),
            (self.removed_units, "translation(s) removed"),
            (self.removed_notes, "hint note(s) removed"),
            (self.suggestions_added, "suggestion(s) added"),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}"))
        .collect();
        write!(
            f,
            "Checked {} file(s): {}.",
            self.checked_files,
            parts.join(", ")
        )
    }
}

/// Whether two language codes name the same language.
pub fn same_language(a: &str, b: &str) -> bool {
    match (
        a.parse::<LanguageIdentifier>(),
        b.parse::<LanguageIdentifier>(),
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.eq_ignore_ascii_case(b),
    }
}

/// The target a freshly seeded unit gets.
fn new_target(source: &str, same_language: bool, mode: TranslationMode) -> Target {
    if source.is_empty() {
        return Target::new("");
    }
    let text = if same_language { source } else { "" };
    match mode {
        TranslationMode::External => Target::with_state(
            text,
            if same_language {
                TargetState::NeedsAdaptation
            } else {
                TargetState::NeedsTranslation
            },
        ),
        TranslationMode::Managed => {
            if same_language {
                let mut target = Target::with_state(text, TargetState::NeedsReviewTranslation);
                target.state_qualifier = Some(StateQualifier::ExactMatch);
                target
            } else {
                Target::with_state(text, TargetState::NeedsTranslation)
            }
        }
        TranslationMode::Tokens => Target::with_token(
            if same_language {
                TranslationToken::Review
            } else {
                TranslationToken::NotTranslated
            },
            text,
        ),
    }
}

fn new_hint(same_language: bool) -> RefreshHint {
    if same_language {
        RefreshHint::NewCopiedSource
    } else {
        RefreshHint::New
    }
}

/// Seeds `unit` with its first target and the matching hint.
fn seed(unit: &mut TransUnit, same_language: bool, mode: TranslationMode) {
    unit.targets = vec![new_target(&unit.source, same_language, mode)];
    if !unit.source.is_empty() {
        unit.insert_hint(new_hint(same_language).to_string());
    }
}

/// Flags the first target for review after a source change.
fn flag_modified(unit: &mut TransUnit, mode: TranslationMode) {
    if let Some(target) = unit.target_mut() {
        target.state_qualifier = None;
        match mode {
            TranslationMode::External => target.state = Some(TargetState::NeedsAdaptation),
            TranslationMode::Managed => target.state = Some(TargetState::NeedsReviewTranslation),
            TranslationMode::Tokens => {
                target.state = None;
                target.token = Some(TranslationToken::Review);
            }
        }
    }
    unit.insert_hint(RefreshHint::ModifiedSource.to_string());
}

/// Turns a token into the equivalent state when no state is set yet.
fn set_state_from_token(target: &mut Target) {
    if target.state.is_none() {
        let (state, qualifier) = match target.token {
            Some(TranslationToken::NotTranslated) => (TargetState::NeedsTranslation, None),
            Some(TranslationToken::Review) => (TargetState::NeedsReviewTranslation, None),
            Some(TranslationToken::Suggestion) => {
                (TargetState::Translated, Some(StateQualifier::ExactMatch))
            }
            None => (TargetState::Translated, None),
        };
        target.state = Some(state);
        target.state_qualifier = qualifier;
    }
    target.token = None;
}

/// Converts a state into the equivalent token and drops the state attributes.
fn set_token_from_state(target: &mut Target) {
    if target.token.is_none() {
        target.token = match target.state {
            Some(TargetState::New | TargetState::NeedsTranslation) => {
                Some(TranslationToken::NotTranslated)
            }
            Some(
                TargetState::NeedsAdaptation
                | TargetState::NeedsL10n
                | TargetState::NeedsReviewAdaptation
                | TargetState::NeedsReviewL10n
                | TargetState::NeedsReviewTranslation,
            ) => Some(TranslationToken::Review),
            _ => None,
        };
    }
    target.state = None;
    target.state_qualifier = None;
}

/// Normalizes one unit to the representation of `mode`.
pub fn format_unit_for_mode(unit: &mut TransUnit, mode: TranslationMode) {
    match mode {
        TranslationMode::External => unit.targets.iter_mut().for_each(set_state_from_token),
        TranslationMode::Managed => {
            unit.targets.iter_mut().for_each(set_state_from_token);
            unit.remove_developer_note_if_empty();
            unit.size_unit = None;
            unit.max_width = None;
            unit.al_object_target = None;
        }
        TranslationMode::Tokens => unit.targets.iter_mut().for_each(set_token_from_state),
    }
}

/// Normalizes every unit of `doc` to the representation of `mode`.
pub fn format_for_mode(doc: &mut Xliff, mode: TranslationMode) {
    for unit in &mut doc.trans_units {
        format_unit_for_mode(unit, mode);
    }
}

/// Marks the unit done: state modes get `state`, tokens are dropped, and the
/// hint note is removed.
pub fn mark_translated(unit: &mut TransUnit, mode: TranslationMode, state: TargetState) {
    if let Some(target) = unit.target_mut() {
        if mode != TranslationMode::Tokens {
            target.state = Some(state);
            target.state_qualifier = None;
        }
        target.token = None;
    }
    unit.remove_hint();
}

/// Removes every hint note. Returns whether the document changed.
pub fn remove_all_hint_notes(doc: &mut Xliff) -> bool {
    doc.remove_all_hints()
}

/// A hint is obsolete once the unit carries no marker or a terminal state.
fn hint_is_obsolete(unit: &TransUnit) -> bool {
    unit.target().is_some_and(|target| {
        (target.token.is_none() && target.state.is_none())
            || target.state.as_ref().is_some_and(TargetState::is_translated)
    })
}

/// Units of a language document not yet claimed by a master unit.
struct Leftovers<'a> {
    slots: Vec<Option<&'a TransUnit>>,
    by_id: HashMap<&'a str, usize>,
}

impl<'a> Leftovers<'a> {
    fn new(units: &'a [TransUnit]) -> Self {
        let mut by_id = HashMap::with_capacity(units.len());
        for (index, unit) in units.iter().enumerate() {
            by_id.entry(unit.id.as_str()).or_insert(index);
        }
        Self {
            slots: units.iter().map(Some).collect(),
            by_id,
        }
    }

    /// Claims the first unit with `id`.
    fn take(&mut self, id: &str) -> Option<&'a TransUnit> {
        let index = *self.by_id.get(id)?;
        self.slots[index].take()
    }

    fn into_remaining(self) -> impl Iterator<Item = &'a TransUnit> {
        self.slots.into_iter().flatten()
    }
}

/// Rebuilds `lang` from `master` and returns the new document.
///
/// Counters are added to `result`. The own map of `lang` is only used when
/// `Settings::match_translation` is on and never leaks into `maps`.
pub fn refresh_language_document(
    lang: &Xliff,
    master: &Xliff,
    settings: &Settings,
    maps: &SuggestionMaps,
    result: &mut RefreshResult,
) -> Xliff {
    let mode = settings.translation_mode;
    let same = same_language(&lang.target_language, &master.target_language);
    let mut doc = lang.clone_without_units();
    doc.source_language = master.source_language.clone();
    doc.original = master.original.clone();

    let mut leftovers = Leftovers::new(&lang.trans_units);

    for master_unit in master.trans_units.iter().filter(|u| u.translate) {
        let mut unit = match leftovers.take(&master_unit.id) {
            Some(existing) => {
                let mut unit = existing.clone();
                let source_changed = unit.source != master_unit.source;
                if !unit.has_targets() {
                    unit.source = master_unit.source.clone();
                    seed(&mut unit, same, mode);
                    result.added += 1;
                } else if source_changed {
                    let exact_copy = !unit.source.is_empty()
                        && unit.targets.len() == 1
                        && unit.targets[0].text == unit.source;
                    if exact_copy {
                        unit.targets[0].text = master_unit.source.clone();
                    } else if !master_unit.source.is_empty() {
                        flag_modified(&mut unit, mode);
                    }
                }
                if source_changed {
                    debug!(id = %unit.id, "source changed");
                    unit.source = master_unit.source.clone();
                    result.updated_sources += 1;
                }
                if settings.max_width_enabled() && unit.max_width != master_unit.max_width {
                    unit.max_width = master_unit.max_width;
                    result.updated_max_widths += 1;
                }
                let master_note = master_unit.developer_note_content();
                if unit.developer_note_content() != master_note {
                    unit.set_developer_note(master_note);
                    result.updated_notes += 1;
                }
                unit
            }
            None => {
                debug!(id = %master_unit.id, "new unit");
                let mut unit = master_unit.clone();
                seed(&mut unit, same, mode);
                result.added += 1;
                unit
            }
        };

        format_unit_for_mode(&mut unit, mode);
        doc.trans_units.push(unit);
    }

    let removed = leftovers.into_remaining().count();
    if removed > 0 {
        debug!(removed, "units no longer in master");
    }
    result.removed_units += removed;

    let own_map = settings.match_translation.then(|| MatchMap::from_xliff(lang));
    result.suggestions_added += suggestions::apply(&mut doc, maps, own_map.as_ref(), mode);

    for unit in doc.trans_units.iter_mut() {
        if settings.detect_invalid_targets {
            detect_invalid_values(unit, mode);
        }
        if unit.has_hint() && hint_is_obsolete(unit) {
            unit.remove_hint();
            if mode == TranslationMode::Managed
                && let Some(target) = unit.target_mut()
            {
                target.state = Some(TargetState::Translated);
                target.state_qualifier = None;
            }
            result.removed_notes += 1;
        }
    }

    result.checked_files += 1;
    doc
}

/// Reorders the units of `lang` into master order without editing them.
/// Units the master does not know keep their relative order at the end.
pub fn sort_language_document(lang: &Xliff, master: &Xliff, result: &mut RefreshResult) -> Xliff {
    let mut doc = lang.clone_without_units();
    let mut leftovers = Leftovers::new(&lang.trans_units);
    for master_unit in &master.trans_units {
        if let Some(unit) = leftovers.take(&master_unit.id) {
            doc.trans_units.push(unit.clone());
        }
    }
    doc.trans_units.extend(leftovers.into_remaining().cloned());
    result.checked_files += 1;
    doc
}

fn ensure_files_exist(master_path: &Path, language_paths: &[impl AsRef<Path>]) -> Result<(), Error> {
    std::iter::once(master_path)
        .chain(language_paths.iter().map(AsRef::as_ref))
        .find(|path| !path.is_file())
        .map_or(Ok(()), |missing| Err(Error::MissingFile(missing.to_path_buf())))
}

/// Refreshes every language file against the master file and writes them back.
///
/// All files are checked and parsed before the first write, so a missing or
/// malformed file aborts the run without touching anything.
pub fn refresh_files(
    master_path: &Path,
    language_paths: &[impl AsRef<Path>],
    settings: &Settings,
    maps: &SuggestionMaps,
) -> Result<RefreshResult, Error> {
    ensure_files_exist(master_path, language_paths)?;
    let master = Xliff::read_from(master_path)?;
    let languages = language_paths
        .iter()
        .map(|path| Xliff::read_from(path.as_ref()).map(|doc| (path.as_ref(), doc)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut result = RefreshResult::default();
    for (path, lang) in languages {
        let mut file_result = RefreshResult::default();
        let doc = refresh_language_document(&lang, &master, settings, maps, &mut file_result);
        doc.save(path, settings)?;
        debug!(path = %path.display(), result = ?file_result, "refreshed");
        result.merge(&file_result);
    }
    info!(%result, "refresh finished");
    Ok(result)
}

/// Sort-only variant of [`refresh_files`].
pub fn sort_files(
    master_path: &Path,
    language_paths: &[impl AsRef<Path>],
    settings: &Settings,
) -> Result<RefreshResult, Error> {
    ensure_files_exist(master_path, language_paths)?;
    let master = Xliff::read_from(master_path)?;
    let languages = language_paths
        .iter()
        .map(|path| Xliff::read_from(path.as_ref()).map(|doc| (path.as_ref(), doc)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut result = RefreshResult::default();
    for (path, lang) in languages {
        sort_language_document(&lang, &master, &mut result).save(path, settings)?;
    }
    Ok(result)
}

/// Regenerates the units of `master` from parsed objects.
///
/// Objects are ordered by type and name, entries by line. Locked entries are
/// left out and the first unit wins when two entries produce the same id.
pub fn update_master(master: &mut Xliff, objects: &[AlObject]) -> RefreshResult {
    let mut result = RefreshResult {
        checked_files: objects.len(),
        ..RefreshResult::default()
    };

    let mut ordered: Vec<&AlObject> = objects.iter().collect();
    ordered.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let mut seen = HashSet::new();
    let mut units = Vec::new();
    for object in ordered {
        for unit in object.trans_units() {
            if !unit.translate || !seen.insert(unit.id.clone()) {
                continue;
            }
            match master.get_unit(&unit.id) {
                Some(old) => {
                    if old.source != unit.source {
                        result.updated_sources += 1;
                    }
                    if old.max_width != unit.max_width {
                        result.updated_max_widths += 1;
                    }
                    if old.developer_note_content() != unit.developer_note_content() {
                        result.updated_notes += 1;
                    }
                }
                None => result.added += 1,
            }
            units.push(unit);
        }
    }
    result.removed_units = master
        .trans_units
        .iter()
        .filter(|u| !seen.contains(&u.id))
        .count();
    master.trans_units = units;
    info!(%result, "master updated");
    result
}
