//! Translation suggestions from earlier or peer translations.
//!
//! A [`MatchMap`] maps a source text to every distinct target seen for it.
//! [`SuggestionMaps`] keeps, per target language, a list of maps ordered from
//! lowest to highest priority. It is built once per run and only read after that.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::Error,
    settings::{Settings, TranslationMode},
    traits::Parser,
    xliff::{RefreshHint, StateQualifier, Target, TargetState, TransUnit, TranslationToken, Xliff},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MatchMap {
    entries: HashMap<String, Vec<String>>,
}

impl MatchMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `target` for `source` unless it is already known.
    pub fn insert(&mut self, source: &str, target: &str) {
        let targets = self.entries.entry(source.to_string()).or_default();
        if !targets.iter().any(|t| t == target) {
            targets.push(target.to_string());
        }
    }

    pub fn get(&self, source: &str) -> Option<&[String]> {
        self.entries
            .get(source)
            .map(Vec::as_slice)
            .filter(|targets| !targets.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a map from every finished target of a document.
    ///
    /// Empty sources, empty targets and targets still carrying a workflow
    /// token are skipped.
    pub fn from_xliff(doc: &Xliff) -> Self {
        let mut map = MatchMap::new();
        for unit in &doc.trans_units {
            if unit.source.is_empty() {
                continue;
            }
            for target in &unit.targets {
                if target.has_content() && target.token.is_none() {
                    map.insert(&unit.source, &target.text);
                }
            }
        }
        map
    }

    /// Loads a reference corpus stored as `{"source": ["target", ...]}`.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        let map: MatchMap = serde_json::from_str(&content)?;
        Ok(map)
    }
}

/// Suggestion maps per lower-cased target language, lowest priority first.
#[derive(Debug, Clone, Default)]
pub struct SuggestionMaps {
    by_language: HashMap<String, Vec<MatchMap>>,
}

impl SuggestionMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `map` with a higher priority than every map added before for `language`.
    pub fn add(&mut self, language: &str, map: MatchMap) {
        self.by_language
            .entry(language.to_lowercase())
            .or_default()
            .push(map);
    }

    /// Maps for `language`, lowest priority first.
    pub fn maps_for(&self, language: &str) -> &[MatchMap] {
        self.by_language
            .get(&language.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_language.values().all(Vec::is_empty)
    }

    /// Builds the maps for `languages` from, in increasing priority, the
    /// reference corpus, the configured suggestion folders and `match_file`.
    ///
    /// Missing corpus files and folders are skipped with a warning.
    pub fn build(
        languages: &[String],
        settings: &Settings,
        match_file: Option<&Path>,
    ) -> Result<Self, Error> {
        let languages: Vec<String> = languages.iter().map(|l| l.to_lowercase()).collect();
        let mut maps = SuggestionMaps::new();

        if settings.match_base_app_translation
            && let Some(folder) = &settings.base_app_translation_folder
        {
            for language in &languages {
                let path = folder.join(format!("{language}.json"));
                if !path.is_file() {
                    debug!(path = %path.display(), "no reference corpus for language");
                    continue;
                }
                maps.add(language, MatchMap::from_json_file(&path)?);
            }
        }

        for folder in &settings.translation_suggestion_paths {
            for path in suggestion_files(folder) {
                maps.add_xliff_file(&languages, &path)?;
            }
        }

        if let Some(path) = match_file {
            maps.add_xliff_file(&languages, path)?;
        }
        Ok(maps)
    }

    /// Adds the map of one `.xlf` file if its target language is wanted.
    pub fn add_xliff_file(&mut self, languages: &[String], path: &Path) -> Result<(), Error> {
        let doc = Xliff::read_from(path)?;
        self.add_xliff(languages, &doc);
        Ok(())
    }

    /// Adds the map of an already loaded document if its target language is wanted.
    pub fn add_xliff(&mut self, languages: &[String], doc: &Xliff) {
        let language = doc.target_language.to_lowercase();
        if languages.iter().any(|l| l.to_lowercase() == language) {
            let map = MatchMap::from_xliff(doc);
            debug!(language, sources = map.len(), "added suggestion map");
            self.add(&language, map);
        }
    }
}

/// `.xlf` files in `folder` except master documents, sorted by name.
pub fn suggestion_files(folder: &Path) -> Vec<PathBuf> {
    let Ok(read_dir) = fs::read_dir(folder) else {
        warn!(folder = %folder.display(), "suggestion folder not found");
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            name.ends_with(".xlf") && !name.ends_with("g.xlf")
        })
        .collect();
    files.sort();
    files
}

/// A unit lacks a usable target when it has none, all are empty, or the
/// first is marked not translated.
fn lacks_usable_target(unit: &TransUnit) -> bool {
    unit.targets.iter().all(|t| !t.has_content())
        || unit
            .target()
            .is_some_and(|t| t.token == Some(TranslationToken::NotTranslated))
}

/// Applies one map to every unit lacking a usable target. Returns the number
/// of suggestions added.
pub fn apply_map(doc: &mut Xliff, map: &MatchMap, mode: TranslationMode) -> usize {
    let mut added = 0;
    for unit in doc.trans_units.iter_mut().filter(|u| u.translate) {
        if !lacks_usable_target(unit) {
            continue;
        }
        let Some(candidates) = map.get(&unit.source) else {
            continue;
        };
        unit.targets
            .retain(|t| t.has_content() && t.token != Some(TranslationToken::NotTranslated));
        match mode {
            TranslationMode::Tokens => {
                for candidate in candidates {
                    unit.add_target(Target::with_token(
                        TranslationToken::Suggestion,
                        candidate.as_str(),
                    ));
                    added += 1;
                }
                unit.insert_hint(RefreshHint::Suggestion.to_string());
            }
            TranslationMode::External | TranslationMode::Managed => {
                let mut target =
                    Target::with_state(candidates[0].as_str(), TargetState::NeedsReviewTranslation);
                target.state_qualifier = Some(StateQualifier::ExactMatch);
                unit.remove_hint();
                unit.add_target(target);
                added += 1;
            }
        }
    }
    added
}

/// Applies `own_map` first, then the language's maps from highest to lowest
/// priority. The first map with a hit wins for each unit.
pub fn apply(
    doc: &mut Xliff,
    maps: &SuggestionMaps,
    own_map: Option<&MatchMap>,
    mode: TranslationMode,
) -> usize {
    let language = doc.target_language.clone();
    let mut added = 0;
    if let Some(own) = own_map {
        added += apply_map(doc, own, mode);
    }
    for map in maps.maps_for(&language).iter().rev() {
        added += apply_map(doc, map, mode);
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> MatchMap {
        let mut map = MatchMap::new();
        for (source, target) in pairs {
            map.insert(source, target);
        }
        map
    }

    fn doc_with(source: &str, target: Option<Target>) -> Xliff {
        let mut doc = Xliff::new("en-US", "da-DK", "App.g.xlf");
        let mut unit = TransUnit::new("Table 1 - Property 2", source);
        if let Some(target) = target {
            unit.targets.push(target);
        }
        doc.trans_units.push(unit);
        doc
    }

    #[test]
    fn test_match_map_from_xliff() {
        let mut doc = doc_with("Customer", Some(Target::new("Kunde")));
        let mut second = TransUnit::new("b", "Customer");
        second.targets.push(Target::new("Kunde"));
        second.targets.push(Target::new("Debitor"));
        doc.trans_units.push(second);
        let mut third = TransUnit::new("c", "Vendor");
        third
            .targets
            .push(Target::with_token(TranslationToken::Review, "Kreditor"));
        doc.trans_units.push(third);
        doc.trans_units.push(TransUnit::new("d", ""));

        let map = MatchMap::from_xliff(&doc);
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get("Customer").unwrap(),
            &["Kunde".to_string(), "Debitor".to_string()]
        );
        assert!(map.get("Vendor").is_none());
    }

    #[test]
    fn test_json_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("da-dk.json");
        fs::write(&path, r#"{"Customer": ["Kunde"], "Vendor": ["Kreditor", "Leverandør"]}"#)
            .unwrap();
        let map = MatchMap::from_json_file(&path).unwrap();
        assert_eq!(map.get("Vendor").unwrap().len(), 2);
    }

    #[test]
    fn test_priority_highest_wins() {
        let mut maps = SuggestionMaps::new();
        maps.add("da-DK", map(&[("Customer", "Low")]));
        maps.add("da-dk", map(&[("Other", "Medium")]));
        maps.add("DA-DK", map(&[("Customer", "High")]));

        let mut doc = doc_with(
            "Customer",
            Some(Target::with_state("", TargetState::NeedsTranslation)),
        );
        let added = apply(&mut doc, &maps, None, TranslationMode::External);
        assert_eq!(added, 1);
        let unit = &doc.trans_units[0];
        assert_eq!(unit.targets.len(), 1);
        assert_eq!(unit.targets[0].text, "High");
        assert_eq!(
            unit.targets[0].state,
            Some(TargetState::NeedsReviewTranslation)
        );
        assert_eq!(
            unit.targets[0].state_qualifier,
            Some(StateQualifier::ExactMatch)
        );
    }

    #[test]
    fn test_tokens_mode_adds_all_candidates() {
        let mut maps = SuggestionMaps::new();
        let mut m = MatchMap::new();
        m.insert("Customer", "Kunde");
        m.insert("Customer", "Debitor");
        maps.add("da-DK", m);

        let mut doc = doc_with(
            "Customer",
            Some(Target::with_token(TranslationToken::NotTranslated, "")),
        );
        let added = apply(&mut doc, &maps, None, TranslationMode::Tokens);
        assert_eq!(added, 2);
        let unit = &doc.trans_units[0];
        assert_eq!(unit.targets.len(), 2);
        assert!(unit
            .targets
            .iter()
            .all(|t| t.token == Some(TranslationToken::Suggestion)));
        assert_eq!(unit.hint_text(), Some("Suggested translation inserted."));
    }

    #[test]
    fn test_existing_translation_not_overwritten() {
        let mut maps = SuggestionMaps::new();
        maps.add("da-DK", map(&[("Customer", "Debitor")]));
        let mut doc = doc_with("Customer", Some(Target::new("Kunde")));
        assert_eq!(apply(&mut doc, &maps, None, TranslationMode::Tokens), 0);
        assert_eq!(doc.trans_units[0].targets, vec![Target::new("Kunde")]);
    }

    #[test]
    fn test_own_map_goes_first() {
        let mut maps = SuggestionMaps::new();
        maps.add("da-DK", map(&[("Customer", "Peer")]));
        let own = map(&[("Customer", "Own")]);
        let mut doc = doc_with("Customer", None);
        apply(&mut doc, &maps, Some(&own), TranslationMode::Managed);
        assert_eq!(doc.trans_units[0].targets[0].text, "Own");
    }

    #[test]
    fn test_build_from_folders() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("suggestions");
        fs::create_dir(&folder).unwrap();
        let mut peer = doc_with("Customer", Some(Target::new("Kunde")));
        peer.target_language = "da-DK".to_string();
        peer.save(&folder.join("Peer.da-DK.xlf"), &Settings::default())
            .unwrap();
        let mut master = doc_with("Customer", Some(Target::new("Customer")));
        master.target_language = "da-DK".to_string();
        master
            .save(&folder.join("Peer.g.xlf"), &Settings::default())
            .unwrap();

        let settings = Settings::default().with_suggestion_paths(vec![folder, dir.path().join("missing")]);
        let maps = SuggestionMaps::build(&["da-DK".to_string()], &settings, None).unwrap();
        assert_eq!(maps.maps_for("da-dk").len(), 1);
        assert_eq!(maps.maps_for("da-DK")[0].get("Customer").unwrap(), &["Kunde".to_string()]);
        assert!(maps.maps_for("de-DE").is_empty());
    }
}
