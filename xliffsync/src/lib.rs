#![forbid(unsafe_code)]
//! Keeps XLIFF translation files in sync with AL object sources.
//!
//! Source objects are parsed into a control tree whose multi-language entries
//! become the translation units of the master (`.g.xlf`) document. Every
//! language document is then rebuilt against the master, filled with
//! suggestions from earlier translations, and checked for broken option
//! captions and placeholders.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xliffsync::{AlObject, Settings, SuggestionMaps, Xliff, refresh_files, traits::Parser, update_master};
//!
//! let source = std::fs::read_to_string("src/Customer.TableExt.al")?;
//! let objects: Vec<AlObject> = AlObject::parse(&source)?.into_iter().collect();
//!
//! let settings = Settings::default();
//! let mut master = Xliff::read_from("Translations/MyApp.g.xlf")?;
//! update_master(&mut master, &objects);
//! master.save("Translations/MyApp.g.xlf".as_ref(), &settings)?;
//!
//! let maps = SuggestionMaps::build(&["da-DK".to_string()], &settings, None)?;
//! let result = refresh_files(
//!     "Translations/MyApp.g.xlf".as_ref(),
//!     &["Translations/MyApp.da-DK.xlf"],
//!     &settings,
//!     &maps,
//! )?;
//! println!("{result}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Translation modes
//!
//! - **Tokens**: inline `[xliffsync: …]` markers in front of the target text
//! - **External**: XLIFF `state` attributes for an external translation tool
//! - **Managed**: `state` and `state-qualifier` for a managed translation service

pub mod al;
pub mod error;
pub mod import;
pub mod placeholder;
pub mod settings;
pub mod suggestions;
pub mod sync;
pub mod traits;
pub mod validation;
pub mod xliff;
pub mod xliff_id;

pub use crate::{
    al::{AlObject, ObjectType, SourceLocation, locate},
    error::Error,
    import::{import_translated, import_translated_file},
    settings::{Settings, TranslationMode},
    suggestions::{MatchMap, SuggestionMaps},
    sync::{
        RefreshResult, format_for_mode, mark_translated, refresh_files,
        refresh_language_document, remove_all_hint_notes, sort_files, update_master,
    },
    validation::{InvalidValue, detect_invalid_values},
    xliff::{Target, TargetState, TransUnit, TranslationToken, Xliff},
    xliff_id::XliffIdToken,
};
