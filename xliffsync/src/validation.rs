//! Post-refresh checks on single translation units.

use tracing::debug;

use crate::{
    placeholder,
    settings::TranslationMode,
    xliff::{StateQualifier, TargetState, TransUnit, TranslationToken},
};

/// Problems the validator can find in a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidValue {
    OptionCount,
    OptionBlankMismatch {
        index: usize,
        source: String,
        target: String,
    },
    MissingPlaceholder(String),
}

impl std::fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidValue::OptionCount => {
                write!(f, "source and target has different number of option captions.")
            }
            InvalidValue::OptionBlankMismatch {
                index,
                source,
                target,
            } => write!(
                f,
                "Option no. {index} of source is \"{source}\", but the same option in target is \"{target}\"."
            ),
            InvalidValue::MissingPlaceholder(token) => write!(
                f,
                "The placeholder \"{token}\" was found in source, but not in target."
            ),
        }
    }
}

/// Runs the option caption and placeholder checks against the unit's first target.
///
/// Units without a translation yet are left alone. On failure the target is
/// downgraded for `mode` and a hint note describing the last problem found is
/// inserted. Returns the problems found.
pub fn detect_invalid_values(unit: &mut TransUnit, mode: TranslationMode) -> Vec<InvalidValue> {
    let Some(target) = unit.target() else {
        return Vec::new();
    };
    if target.is_untranslated() {
        return Vec::new();
    }
    let target_text = target.text.clone();

    let mut problems = Vec::new();
    if unit.is_property("OptionCaption") {
        let source_options: Vec<&str> = unit.source.split(',').collect();
        let target_options: Vec<&str> = target_text.split(',').collect();
        if source_options.len() != target_options.len() {
            problems.push(InvalidValue::OptionCount);
        } else if let Some((index, (source, target))) = source_options
            .iter()
            .zip(target_options.iter())
            .enumerate()
            .find(|(_, (s, t))| s.is_empty() != t.is_empty())
        {
            problems.push(InvalidValue::OptionBlankMismatch {
                index,
                source: source.to_string(),
                target: target.to_string(),
            });
        }
    }

    if let Some(token) = placeholder::first_missing(&unit.source, &target_text) {
        problems.push(InvalidValue::MissingPlaceholder(token.to_string()));
    }

    for problem in &problems {
        debug!(id = %unit.id, %problem, "invalid target");
        downgrade(unit, mode, &problem.to_string());
    }
    problems
}

/// Marks the unit for review in the representation of `mode` and explains why.
pub fn downgrade(unit: &mut TransUnit, mode: TranslationMode, message: &str) {
    if let Some(target) = unit.target_mut() {
        match mode {
            TranslationMode::External => {
                target.state = Some(TargetState::NeedsReviewTranslation);
            }
            TranslationMode::Managed => {
                target.state = Some(TargetState::NeedsReviewL10n);
                target.state_qualifier = Some(StateQualifier::RejectedInaccurate);
            }
            TranslationMode::Tokens => {
                target.token = Some(TranslationToken::Review);
            }
        }
    }
    unit.insert_hint(message);
}
