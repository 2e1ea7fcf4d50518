//! In-memory model of an XLIFF 1.2 translation document.

use std::{
    fmt::{Display, Formatter},
    path::PathBuf,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    xliff_id::{XliffIdToken, is_property_id},
};

pub const DEVELOPER_NOTE_FROM: &str = "Developer";
pub const GENERATOR_NOTE_FROM: &str = "Xliff Generator";
pub const HINT_NOTE_FROM: &str = "XLIFF Sync";

/// `state` attribute values of a `<target>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetState {
    New,
    NeedsTranslation,
    NeedsAdaptation,
    NeedsL10n,
    NeedsReviewAdaptation,
    NeedsReviewL10n,
    NeedsReviewTranslation,
    Translated,
    SignedOff,
    Final,
    /// Any `x-` extension value, kept verbatim.
    Other(String),
}

impl TargetState {
    pub fn as_str(&self) -> &str {
        match self {
            TargetState::New => "new",
            TargetState::NeedsTranslation => "needs-translation",
            TargetState::NeedsAdaptation => "needs-adaptation",
            TargetState::NeedsL10n => "needs-l10n",
            TargetState::NeedsReviewAdaptation => "needs-review-adaptation",
            TargetState::NeedsReviewL10n => "needs-review-l10n",
            TargetState::NeedsReviewTranslation => "needs-review-translation",
            TargetState::Translated => "translated",
            TargetState::SignedOff => "signed-off",
            TargetState::Final => "final",
            TargetState::Other(value) => value,
        }
    }

    /// Translated, signed off or final.
    pub fn is_translated(&self) -> bool {
        matches!(
            self,
            TargetState::Translated | TargetState::SignedOff | TargetState::Final
        )
    }

    /// States a translator still has to act on.
    pub fn needs_action(&self) -> bool {
        matches!(
            self,
            TargetState::New
                | TargetState::NeedsTranslation
                | TargetState::NeedsAdaptation
                | TargetState::NeedsL10n
                | TargetState::NeedsReviewAdaptation
                | TargetState::NeedsReviewL10n
                | TargetState::NeedsReviewTranslation
        )
    }
}

impl Display for TargetState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "new" => TargetState::New,
            "needs-translation" => TargetState::NeedsTranslation,
            "needs-adaptation" => TargetState::NeedsAdaptation,
            "needs-l10n" => TargetState::NeedsL10n,
            "needs-review-adaptation" => TargetState::NeedsReviewAdaptation,
            "needs-review-l10n" => TargetState::NeedsReviewL10n,
            "needs-review-translation" => TargetState::NeedsReviewTranslation,
            "translated" => TargetState::Translated,
            "signed-off" => TargetState::SignedOff,
            "final" => TargetState::Final,
            other if other.starts_with("x-") => TargetState::Other(other.to_string()),
            other => {
                return Err(Error::InvalidDocument(format!(
                    "unknown target state `{other}`"
                )));
            }
        })
    }
}

/// `state-qualifier` attribute values of a `<target>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateQualifier {
    ExactMatch,
    FuzzyMatch,
    IdMatch,
    LeveragedGlossary,
    LeveragedInherited,
    LeveragedMt,
    LeveragedRepository,
    LeveragedTm,
    MtSuggestion,
    RejectedGrammar,
    RejectedInaccurate,
    RejectedLength,
    RejectedSpelling,
    TmSuggestion,
    /// Exact match reported by the managed translation service.
    MsExactMatch,
    Other(String),
}

impl StateQualifier {
    pub fn as_str(&self) -> &str {
        match self {
            StateQualifier::ExactMatch => "exact-match",
            StateQualifier::FuzzyMatch => "fuzzy-match",
            StateQualifier::IdMatch => "id-match",
            StateQualifier::LeveragedGlossary => "leveraged-glossary",
            StateQualifier::LeveragedInherited => "leveraged-inherited",
            StateQualifier::LeveragedMt => "leveraged-mt",
            StateQualifier::LeveragedRepository => "leveraged-repository",
            StateQualifier::LeveragedTm => "leveraged-tm",
            StateQualifier::MtSuggestion => "mt-suggestion",
            StateQualifier::RejectedGrammar => "rejected-grammar",
            StateQualifier::RejectedInaccurate => "rejected-inaccurate",
            StateQualifier::RejectedLength => "rejected-length",
            StateQualifier::RejectedSpelling => "rejected-spelling",
            StateQualifier::TmSuggestion => "tm-suggestion",
            StateQualifier::MsExactMatch => "x-microsoft-exact-match",
            StateQualifier::Other(value) => value,
        }
    }

    pub fn is_exact_match(&self) -> bool {
        matches!(self, StateQualifier::ExactMatch | StateQualifier::MsExactMatch)
    }
}

impl Display for StateQualifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for StateQualifier {
    fn from(s: &str) -> Self {
        match s {
            "exact-match" => StateQualifier::ExactMatch,
            "fuzzy-match" => StateQualifier::FuzzyMatch,
            "id-match" => StateQualifier::IdMatch,
            "leveraged-glossary" => StateQualifier::LeveragedGlossary,
            "leveraged-inherited" => StateQualifier::LeveragedInherited,
            "leveraged-mt" => StateQualifier::LeveragedMt,
            "leveraged-repository" => StateQualifier::LeveragedRepository,
            "leveraged-tm" => StateQualifier::LeveragedTm,
            "mt-suggestion" => StateQualifier::MtSuggestion,
            "rejected-grammar" => StateQualifier::RejectedGrammar,
            "rejected-inaccurate" => StateQualifier::RejectedInaccurate,
            "rejected-length" => StateQualifier::RejectedLength,
            "rejected-spelling" => StateQualifier::RejectedSpelling,
            "tm-suggestion" => StateQualifier::TmSuggestion,
            "x-microsoft-exact-match" => StateQualifier::MsExactMatch,
            other => StateQualifier::Other(other.to_string()),
        }
    }
}

/// Workflow token written in front of the target text when no state model is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum TranslationToken {
    NotTranslated,
    Review,
    Suggestion,
}

impl TranslationToken {
    pub const ALL: [TranslationToken; 3] = [
        TranslationToken::NotTranslated,
        TranslationToken::Review,
        TranslationToken::Suggestion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationToken::NotTranslated => "[xliffsync: not translated]",
            TranslationToken::Review => "[xliffsync: review]",
            TranslationToken::Suggestion => "[xliffsync: suggestion]",
        }
    }

    /// Splits a leading token off `text`.
    pub fn split(text: &str) -> (Option<TranslationToken>, &str) {
        for token in Self::ALL {
            if let Some(rest) = text.strip_prefix(token.as_str()) {
                return (Some(token), rest);
            }
        }
        (None, text)
    }
}

impl Display for TranslationToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One translation candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Target {
    pub text: String,
    pub state: Option<TargetState>,
    pub state_qualifier: Option<StateQualifier>,
    pub token: Option<TranslationToken>,
}

impl Target {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_state(text: impl Into<String>, state: TargetState) -> Self {
        Self {
            text: text.into(),
            state: Some(state),
            ..Self::default()
        }
    }

    pub fn with_token(token: TranslationToken, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            token: Some(token),
            ..Self::default()
        }
    }

    /// Builds a target from serialized text, lifting a leading token out of it.
    pub fn from_serialized(text: &str) -> Self {
        let (token, rest) = TranslationToken::split(text);
        Self {
            text: rest.to_string(),
            token,
            ..Self::default()
        }
    }

    /// Text as written to the file, token included.
    pub fn serialized_text(&self) -> String {
        match self.token {
            Some(token) => format!("{}{}", token.as_str(), self.text),
            None => self.text.clone(),
        }
    }

    pub fn has_content(&self) -> bool {
        !self.text.is_empty()
    }

    /// Empty or explicitly marked as not translated.
    pub fn is_untranslated(&self) -> bool {
        !self.has_content() || self.token == Some(TranslationToken::NotTranslated)
    }
}

/// Who wrote a `<note>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NoteFrom {
    Developer,
    Generator,
    /// Diagnostic hint written by a refresh run.
    Hint,
    Other(String),
}

impl NoteFrom {
    pub fn as_str(&self) -> &str {
        match self {
            NoteFrom::Developer => DEVELOPER_NOTE_FROM,
            NoteFrom::Generator => GENERATOR_NOTE_FROM,
            NoteFrom::Hint => HINT_NOTE_FROM,
            NoteFrom::Other(from) => from,
        }
    }
}

impl From<&str> for NoteFrom {
    fn from(s: &str) -> Self {
        match s {
            DEVELOPER_NOTE_FROM => NoteFrom::Developer,
            GENERATOR_NOTE_FROM => NoteFrom::Generator,
            HINT_NOTE_FROM => NoteFrom::Hint,
            other => NoteFrom::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub from: NoteFrom,
    pub annotates: String,
    pub priority: u8,
    pub text: String,
}

impl Note {
    pub fn developer(text: impl Into<String>) -> Self {
        Self::with_from(NoteFrom::Developer, 2, text)
    }

    pub fn generator(text: impl Into<String>) -> Self {
        Self::with_from(NoteFrom::Generator, 3, text)
    }

    pub fn hint(text: impl Into<String>) -> Self {
        Self::with_from(NoteFrom::Hint, 3, text)
    }

    fn with_from(from: NoteFrom, priority: u8, text: impl Into<String>) -> Self {
        Self {
            from,
            annotates: "general".to_string(),
            priority,
            text: text.into(),
        }
    }
}

/// Reasons a refresh run leaves a hint note on a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshHint {
    NewCopiedSource,
    New,
    ModifiedSource,
    Suggestion,
}

impl Display for RefreshHint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RefreshHint::NewCopiedSource => "New translation. Target copied from source.",
            RefreshHint::New => "New translation.",
            RefreshHint::ModifiedSource => "Source has been modified.",
            RefreshHint::Suggestion => "Suggested translation inserted.",
        })
    }
}

/// One `<trans-unit>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransUnit {
    pub id: String,
    pub translate: bool,
    pub size_unit: Option<String>,
    pub max_width: Option<u32>,
    pub xml_space: Option<String>,
    pub al_object_target: Option<String>,
    pub source: String,
    pub targets: Vec<Target>,
    pub notes: Vec<Note>,
}

impl TransUnit {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            translate: true,
            size_unit: Some("char".to_string()),
            max_width: None,
            xml_space: Some("preserve".to_string()),
            al_object_target: None,
            source: source.into(),
            targets: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn has_targets(&self) -> bool {
        !self.targets.is_empty()
    }

    /// The first target, which carries the unit's state.
    pub fn target(&self) -> Option<&Target> {
        self.targets.first()
    }

    pub fn target_mut(&mut self) -> Option<&mut Target> {
        self.targets.first_mut()
    }

    pub fn target_text(&self) -> &str {
        self.target().map(|t| t.text.as_str()).unwrap_or_default()
    }

    pub fn add_target(&mut self, target: Target) {
        self.targets.push(target);
    }

    fn note(&self, from: &NoteFrom) -> Option<&Note> {
        self.notes.iter().find(|n| &n.from == from)
    }

    pub fn developer_note(&self) -> Option<&Note> {
        self.note(&NoteFrom::Developer)
    }

    pub fn developer_note_content(&self) -> &str {
        self.developer_note()
            .map(|n| n.text.as_str())
            .unwrap_or_default()
    }

    pub fn generator_note(&self) -> Option<&Note> {
        self.note(&NoteFrom::Generator)
    }

    /// Sets the developer note text, adding the note when missing.
    pub fn set_developer_note(&mut self, text: &str) {
        match self.notes.iter_mut().find(|n| n.from == NoteFrom::Developer) {
            Some(note) => note.text = text.to_string(),
            None => self.notes.push(Note::developer(text)),
        }
    }

    pub fn remove_developer_note_if_empty(&mut self) {
        self.notes
            .retain(|n| !(n.from == NoteFrom::Developer && n.text.is_empty()));
    }

    pub fn has_hint(&self) -> bool {
        self.note(&NoteFrom::Hint).is_some()
    }

    pub fn hint_text(&self) -> Option<&str> {
        self.note(&NoteFrom::Hint).map(|n| n.text.as_str())
    }

    /// Replaces any hint note with `text`, placed first among the notes.
    pub fn insert_hint(&mut self, text: impl Into<String>) {
        self.remove_hint();
        self.notes.insert(0, Note::hint(text));
    }

    pub fn remove_hint(&mut self) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.from != NoteFrom::Hint);
        before != self.notes.len()
    }

    /// Readable id tokens from the generator note.
    pub fn id_tokens(&self) -> Vec<XliffIdToken> {
        self.generator_note()
            .map(|n| XliffIdToken::parse_names(&n.text))
            .unwrap_or_default()
    }

    /// Whether the unit translates the property `name`.
    ///
    /// The generator note names the property; units without one fall back to
    /// the hash in the id.
    pub fn is_property(&self, name: &str) -> bool {
        match self.id_tokens().last() {
            Some(token) => token.kind == "Property" && token.name.eq_ignore_ascii_case(name),
            None => is_property_id(&self.id, name),
        }
    }

    /// Whether a translator still has to look at this unit.
    pub fn needs_attention(&self) -> bool {
        if !self.translate {
            return false;
        }
        match self.targets.as_slice() {
            [] => true,
            [target] => {
                target.token.is_some()
                    || target.state.as_ref().is_some_and(TargetState::needs_action)
                    || (!target.has_content() && !self.source.is_empty())
            }
            _ => true,
        }
    }
}

/// Line ending style detected on read and reproduced on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn detect(content: &str) -> Self {
        if content.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A complete XLIFF document with a single `<file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xliff {
    pub source_language: String,
    pub target_language: String,
    pub original: String,
    pub datatype: String,
    pub trans_units: Vec<TransUnit>,
    pub line_ending: LineEnding,
    pub bom: bool,
    pub path: Option<PathBuf>,
}

impl Default for Xliff {
    fn default() -> Self {
        Self {
            source_language: "en-US".to_string(),
            target_language: "en-US".to_string(),
            original: String::new(),
            datatype: "xml".to_string(),
            trans_units: Vec::new(),
            line_ending: LineEnding::CrLf,
            bom: true,
            path: None,
        }
    }
}

impl Xliff {
    pub fn new(
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        original: impl Into<String>,
    ) -> Self {
        Self {
            source_language: source_language.into(),
            target_language: target_language.into(),
            original: original.into(),
            ..Self::default()
        }
    }

    /// Same header, no units.
    pub fn clone_without_units(&self) -> Self {
        Self {
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone(),
            original: self.original.clone(),
            datatype: self.datatype.clone(),
            trans_units: Vec::new(),
            line_ending: self.line_ending,
            bom: self.bom,
            path: self.path.clone(),
        }
    }

    pub fn get_unit(&self, id: &str) -> Option<&TransUnit> {
        self.trans_units.iter().find(|u| u.id == id)
    }

    pub fn get_unit_mut(&mut self, id: &str) -> Option<&mut TransUnit> {
        self.trans_units.iter_mut().find(|u| u.id == id)
    }

    pub fn has_translation_tokens(&self) -> bool {
        self.trans_units
            .iter()
            .flat_map(|u| u.targets.iter())
            .any(|t| t.token.is_some())
    }

    pub fn has_hints(&self) -> bool {
        self.trans_units.iter().any(TransUnit::has_hint)
    }

    /// Drops every hint note. Returns whether anything was removed.
    pub fn remove_all_hints(&mut self) -> bool {
        let mut removed = false;
        for unit in &mut self.trans_units {
            removed |= unit.remove_hint();
        }
        removed
    }

    pub fn units_needing_attention(&self) -> impl Iterator<Item = &TransUnit> {
        self.trans_units.iter().filter(|u| u.needs_attention())
    }

    /// File name of `path`, used as the `original` of derived documents.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }
}
