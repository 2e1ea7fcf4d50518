//! Run configuration passed explicitly into every entry point.

use std::{
    fmt::{Display, Formatter},
    path::PathBuf,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The workflow model used to represent "needs translation/review/done".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// Inline tokens embedded in the target text.
    #[default]
    Tokens,
    /// `state` attributes for an external translation tool.
    External,
    /// `state` and `state-qualifier` attributes for a managed translation service.
    Managed,
}

impl Display for TranslationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationMode::Tokens => write!(f, "tokens"),
            TranslationMode::External => write!(f, "external"),
            TranslationMode::Managed => write!(f, "managed"),
        }
    }
}

impl FromStr for TranslationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tokens" | "inline" => Ok(TranslationMode::Tokens),
            "external" => Ok(TranslationMode::External),
            "managed" | "dts" => Ok(TranslationMode::Managed),
            other => Err(Error::InvalidDocument(format!(
                "unknown translation mode `{other}`"
            ))),
        }
    }
}

/// Settings for a synchronization run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    pub translation_mode: TranslationMode,
    /// Copy `maxwidth` from the master into language files.
    pub enforce_max_width: bool,
    /// Folders with `.xlf` files used as suggestion sources, lowest priority first.
    pub translation_suggestion_paths: Vec<PathBuf>,
    /// Use a language file's own translations as suggestions for itself.
    pub match_translation: bool,
    /// Use the reference corpus in `base_app_translation_folder`.
    pub match_base_app_translation: bool,
    pub base_app_translation_folder: Option<PathBuf>,
    /// Run the option-caption and placeholder checks after a refresh.
    pub detect_invalid_targets: bool,
    /// Write `<target></target>` instead of `<target/>`.
    pub replace_self_closing_tags: bool,
    pub log_level: String,
    pub translation_folder: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            translation_mode: TranslationMode::Tokens,
            enforce_max_width: true,
            translation_suggestion_paths: Vec::new(),
            match_translation: true,
            match_base_app_translation: false,
            base_app_translation_folder: None,
            detect_invalid_targets: true,
            replace_self_closing_tags: true,
            log_level: "info".to_string(),
            translation_folder: PathBuf::from("Translations"),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: TranslationMode) -> Self {
        self.translation_mode = mode;
        self
    }

    pub fn with_match_translation(mut self, enabled: bool) -> Self {
        self.match_translation = enabled;
        self
    }

    pub fn with_detect_invalid_targets(mut self, enabled: bool) -> Self {
        self.detect_invalid_targets = enabled;
        self
    }

    pub fn with_enforce_max_width(mut self, enabled: bool) -> Self {
        self.enforce_max_width = enabled;
        self
    }

    pub fn with_replace_self_closing_tags(mut self, enabled: bool) -> Self {
        self.replace_self_closing_tags = enabled;
        self
    }

    pub fn with_suggestion_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.translation_suggestion_paths = paths;
        self
    }

    pub fn with_base_app_translation(mut self, folder: Option<PathBuf>) -> Self {
        self.match_base_app_translation = folder.is_some();
        self.base_app_translation_folder = folder;
        self
    }

    /// Whether `maxwidth` is carried over to language files in this configuration.
    pub fn max_width_enabled(&self) -> bool {
        self.enforce_max_width && self.translation_mode != TranslationMode::Managed
    }
}
