use indoc::indoc;
use std::fs;
use std::path::Path;
use xliffsync::traits::Parser;
use xliffsync::xliff::{RefreshHint, StateQualifier, Target, TargetState, TransUnit, TranslationToken};
use xliffsync::{
    AlObject, Error, MatchMap, RefreshResult, Settings, SuggestionMaps, TranslationMode, Xliff,
    refresh_files, refresh_language_document, update_master,
};

const CUSTOMER_TABLE: &str = indoc! {r#"
    table 50100 "Customer Ext"
    {
        Caption = 'Customer Extension';

        fields
        {
            field(1; "No."; Code[20])
            {
                Caption = 'No.';
                ToolTip = 'Specifies the number.';
            }
        }
    }
"#};

fn master_from(source: &str) -> Xliff {
    let object = AlObject::parse(source).unwrap().unwrap();
    let mut master = Xliff::new("en-US", "en-US", "MyApp");
    update_master(&mut master, &[object]);
    master
}

fn empty_language(master: &Xliff, language: &str) -> Xliff {
    let mut doc = master.clone_without_units();
    doc.target_language = language.to_string();
    doc
}

fn refresh(lang: &Xliff, master: &Xliff, settings: &Settings) -> (Xliff, RefreshResult) {
    let mut result = RefreshResult::default();
    let doc = refresh_language_document(lang, master, settings, &SuggestionMaps::new(), &mut result);
    (doc, result)
}

fn single_unit_master(source: &str) -> Xliff {
    let mut master = Xliff::new("en-US", "en-US", "MyApp");
    master
        .trans_units
        .push(TransUnit::new("Table 1 - Property 2", source));
    master
}

fn single_unit_language(source: &str, target: Target) -> Xliff {
    let mut lang = Xliff::new("en-US", "da-DK", "MyApp");
    let mut unit = TransUnit::new("Table 1 - Property 2", source);
    unit.targets.push(target);
    lang.trans_units.push(unit);
    lang
}

#[test]
fn test_new_units_are_added_with_hint() {
    let master = master_from(CUSTOMER_TABLE);
    assert_eq!(master.trans_units.len(), 3);

    let (doc, result) = refresh(&empty_language(&master, "da-DK"), &master, &Settings::default());
    assert_eq!(result.added, 3);
    assert_eq!(result.removed_units, 0);
    assert_eq!(doc.trans_units.len(), 3);
    for (unit, master_unit) in doc.trans_units.iter().zip(&master.trans_units) {
        assert_eq!(unit.id, master_unit.id);
        assert_eq!(unit.hint_text(), Some("New translation."));
        assert_eq!(
            unit.targets,
            vec![Target::with_token(TranslationToken::NotTranslated, "")]
        );
    }
}

#[test]
fn test_new_units_same_language_copy_source() {
    let master = master_from(CUSTOMER_TABLE);
    let settings = Settings::default().with_mode(TranslationMode::External);
    let (doc, result) = refresh(&empty_language(&master, "en-us"), &master, &settings);
    assert_eq!(result.added, 3);
    let unit = &doc.trans_units[0];
    assert_eq!(unit.targets[0].text, "Customer Extension");
    assert_eq!(unit.targets[0].state, Some(TargetState::NeedsAdaptation));
    assert_eq!(
        unit.hint_text(),
        Some(RefreshHint::NewCopiedSource.to_string().as_str())
    );
}

#[test]
fn test_source_change_with_exact_copy() {
    let master = single_unit_master("Client");
    let lang = single_unit_language("Customer", Target::new("Customer"));
    let (doc, result) = refresh(&lang, &master, &Settings::default());

    let unit = &doc.trans_units[0];
    assert_eq!(result.updated_sources, 1);
    assert_eq!(unit.source, "Client");
    assert_eq!(unit.targets, vec![Target::new("Client")]);
    assert!(!unit.has_hint());
}

#[test]
fn test_source_change_flags_review() {
    let master = single_unit_master("Client");
    let lang = single_unit_language("Customer", Target::new("Kunde"));

    let (doc, result) = refresh(&lang, &master, &Settings::default());
    let unit = &doc.trans_units[0];
    assert_eq!(result.updated_sources, 1);
    assert_eq!(unit.source, "Client");
    assert_eq!(
        unit.targets,
        vec![Target::with_token(TranslationToken::Review, "Kunde")]
    );
    assert_eq!(unit.hint_text(), Some("Source has been modified."));

    let settings = Settings::default().with_mode(TranslationMode::Managed);
    let lang = single_unit_language(
        "Customer",
        Target::with_state("Kunde", TargetState::Translated),
    );
    let (doc, _) = refresh(&lang, &master, &settings);
    let target = &doc.trans_units[0].targets[0];
    assert_eq!(target.state, Some(TargetState::NeedsReviewTranslation));
    assert_eq!(target.state_qualifier, None);
}

#[test]
fn test_option_caption_count_mismatch_is_downgraded() {
    let object = AlObject::parse(indoc! {r#"
        table 50100 "Sales Ext"
        {
            fields
            {
                field(1; Status; Option)
                {
                    OptionCaption = ',Yes,No';
                }
            }
        }
    "#})
    .unwrap()
    .unwrap();
    let mut master = Xliff::new("en-US", "en-US", "MyApp");
    update_master(&mut master, &[object]);
    let id = master.trans_units[0].id.clone();

    let mut lang = empty_language(&master, "da-DK");
    let mut unit = master.trans_units[0].clone();
    unit.targets.push(Target::with_state("Yes,No", TargetState::Translated));
    lang.trans_units.push(unit);

    let settings = Settings::default().with_mode(TranslationMode::External);
    let (doc, _) = refresh(&lang, &master, &settings);
    let unit = doc.get_unit(&id).unwrap();
    assert_eq!(
        unit.targets[0].state,
        Some(TargetState::NeedsReviewTranslation)
    );
    assert!(unit.hint_text().unwrap().contains("number of option captions"));
}

#[test]
fn test_missing_placeholder_is_downgraded() {
    let master = single_unit_master("Page @1@@@@@@@@");
    let lang = single_unit_language(
        "Page @1@@@@@@@@",
        Target::with_state("Side", TargetState::Translated),
    );
    let settings = Settings::default().with_mode(TranslationMode::Managed);
    let (doc, _) = refresh(&lang, &master, &settings);
    let unit = &doc.trans_units[0];
    assert_eq!(unit.targets[0].state, Some(TargetState::NeedsReviewL10n));
    assert_eq!(
        unit.targets[0].state_qualifier,
        Some(StateQualifier::RejectedInaccurate)
    );
    assert!(unit.hint_text().unwrap().contains("@1@@@@@@@@"));
}

#[test]
fn test_validation_can_be_switched_off() {
    let master = single_unit_master("Page @1@@@@@@@@");
    let lang = single_unit_language("Page @1@@@@@@@@", Target::new("Side"));
    let settings = Settings::default().with_detect_invalid_targets(false);
    let (doc, _) = refresh(&lang, &master, &settings);
    assert_eq!(doc.trans_units[0].targets, vec![Target::new("Side")]);
}

#[test]
fn test_removed_and_locked_units_are_dropped() {
    let mut master = single_unit_master("Customer");
    let mut locked = TransUnit::new("Table 1 - Property 3", "Locked");
    locked.translate = false;
    master.trans_units.push(locked.clone());

    let mut lang = single_unit_language("Customer", Target::new("Kunde"));
    lang.trans_units.push(TransUnit::new("Table 9 - Property 9", "Gone"));
    lang.trans_units.push(locked);

    let (doc, result) = refresh(&lang, &master, &Settings::default());
    assert_eq!(doc.trans_units.len(), 1);
    assert_eq!(result.removed_units, 2);
}

#[test]
fn test_output_follows_master_order() {
    let mut master = Xliff::new("en-US", "en-US", "MyApp");
    let mut lang = Xliff::new("en-US", "da-DK", "MyApp");
    for id in ["a", "b", "c"] {
        master.trans_units.push(TransUnit::new(id, id.to_uppercase()));
    }
    for id in ["c", "a", "b"] {
        let mut unit = TransUnit::new(id, id.to_uppercase());
        unit.targets.push(Target::new(format!("{id}-da")));
        lang.trans_units.push(unit);
    }
    let (doc, result) = refresh(&lang, &master, &Settings::default());
    let ids: Vec<&str> = doc.trans_units.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(result.total_changes(), 0);
}

#[test]
fn test_max_width_and_notes_follow_master() {
    let mut master = single_unit_master("Customer");
    master.trans_units[0].max_width = Some(30);
    master.trans_units[0].set_developer_note("Shown in the header");
    let lang = single_unit_language("Customer", Target::new("Kunde"));

    let (doc, result) = refresh(&lang, &master, &Settings::default());
    assert_eq!(result.updated_max_widths, 1);
    assert_eq!(result.updated_notes, 1);
    assert_eq!(doc.trans_units[0].max_width, Some(30));
    assert_eq!(
        doc.trans_units[0].developer_note_content(),
        "Shown in the header"
    );

    let settings = Settings::default().with_enforce_max_width(false);
    let (doc, result) = refresh(&lang, &master, &settings);
    assert_eq!(result.updated_max_widths, 0);
    assert_eq!(doc.trans_units[0].max_width, None);
}

#[test]
fn test_hint_removed_once_translated() {
    let master = single_unit_master("Customer");
    let mut lang = single_unit_language("Customer", Target::new("Kunde"));
    lang.trans_units[0].insert_hint("New translation.");
    let (doc, result) = refresh(&lang, &master, &Settings::default());
    assert!(!doc.trans_units[0].has_hint());
    assert_eq!(result.removed_notes, 1);
}

#[test]
fn test_own_translations_are_suggested() {
    let mut master = single_unit_master("Customer");
    master
        .trans_units
        .push(TransUnit::new("Table 1 - Property 3", "Customer"));
    let lang = single_unit_language("Customer", Target::new("Kunde"));

    let (doc, result) = refresh(&lang, &master, &Settings::default());
    assert_eq!(result.added, 1);
    assert_eq!(result.suggestions_added, 1);
    let unit = &doc.trans_units[1];
    assert_eq!(
        unit.targets,
        vec![Target::with_token(TranslationToken::Suggestion, "Kunde")]
    );
    assert_eq!(unit.hint_text(), Some("Suggested translation inserted."));

    let settings = Settings::default().with_match_translation(false);
    let (doc, result) = refresh(&lang, &master, &settings);
    assert_eq!(result.suggestions_added, 0);
    assert_eq!(
        doc.trans_units[1].targets,
        vec![Target::with_token(TranslationToken::NotTranslated, "")]
    );
}

#[test]
fn test_inserted_suggestions_are_validated() {
    let master = single_unit_master("Page @1@@@@@@@@");
    let lang = empty_language(&master, "da-DK");
    let mut map = MatchMap::new();
    map.insert("Page @1@@@@@@@@", "Side");
    let mut maps = SuggestionMaps::new();
    maps.add("da-DK", map);

    for mode in [
        TranslationMode::Tokens,
        TranslationMode::External,
        TranslationMode::Managed,
    ] {
        let settings = Settings::default().with_mode(mode);
        let mut first_result = RefreshResult::default();
        let first = refresh_language_document(&lang, &master, &settings, &maps, &mut first_result);
        assert_eq!(first_result.suggestions_added, 1, "mode {mode}");
        let unit = &first.trans_units[0];
        assert_eq!(unit.targets[0].text, "Side", "mode {mode}");
        assert!(
            unit.hint_text().unwrap().contains("@1@@@@@@@@"),
            "mode {mode}"
        );

        let mut second_result = RefreshResult::default();
        let second = refresh_language_document(&first, &master, &settings, &maps, &mut second_result);
        assert_eq!(second_result.total_changes(), 0, "mode {mode}");
        assert_eq!(first.trans_units, second.trans_units, "mode {mode}");
    }
}

fn write_workspace(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let settings = Settings::default();
    let master = master_from(CUSTOMER_TABLE);
    let master_path = dir.join("MyApp.g.xlf");
    master.save(&master_path, &settings).unwrap();
    let lang_path = dir.join("MyApp.da-DK.xlf");
    empty_language(&master, "da-DK")
        .save(&lang_path, &settings)
        .unwrap();
    (master_path, lang_path)
}

#[test]
fn test_refresh_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let (master_path, lang_path) = write_workspace(dir.path());
    let settings = Settings::default();
    let maps = SuggestionMaps::new();

    let first = refresh_files(&master_path, &[&lang_path], &settings, &maps).unwrap();
    assert_eq!(first.added, 3);
    let after_first = fs::read(&lang_path).unwrap();

    let second = refresh_files(&master_path, &[&lang_path], &settings, &maps).unwrap();
    assert_eq!(second.total_changes(), 0);
    assert_eq!(second.checked_files, 1);
    assert_eq!(fs::read(&lang_path).unwrap(), after_first);
}

#[test]
fn test_refresh_idempotent_in_every_mode() {
    for mode in [
        TranslationMode::Tokens,
        TranslationMode::External,
        TranslationMode::Managed,
    ] {
        let dir = tempfile::tempdir().unwrap();
        let (master_path, lang_path) = write_workspace(dir.path());
        let settings = Settings::default().with_mode(mode);
        let maps = SuggestionMaps::new();
        refresh_files(&master_path, &[&lang_path], &settings, &maps).unwrap();
        let after_first = fs::read(&lang_path).unwrap();
        let second = refresh_files(&master_path, &[&lang_path], &settings, &maps).unwrap();
        assert_eq!(second.total_changes(), 0, "mode {mode}");
        assert_eq!(fs::read(&lang_path).unwrap(), after_first, "mode {mode}");
    }
}

#[test]
fn test_missing_file_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let (master_path, lang_path) = write_workspace(dir.path());
    let before = fs::read(&lang_path).unwrap();
    let missing = dir.path().join("MyApp.de-DE.xlf");

    let err = refresh_files(
        &master_path,
        &[lang_path.as_path(), missing.as_path()],
        &Settings::default(),
        &SuggestionMaps::new(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::MissingFile(path) if path == missing));
    assert_eq!(fs::read(&lang_path).unwrap(), before);
}

#[test]
fn test_malformed_language_file_reports_offset() {
    let dir = tempfile::tempdir().unwrap();
    let (master_path, lang_path) = write_workspace(dir.path());
    let content = fs::read_to_string(&lang_path).unwrap();
    fs::write(&lang_path, content.replacen("</body>", "</bdy>", 1)).unwrap();

    let err = refresh_files(
        &master_path,
        &[&lang_path],
        &Settings::default(),
        &SuggestionMaps::new(),
    )
    .unwrap_err();
    match err {
        Error::MalformedDocument { path, offset, .. } => {
            assert_eq!(path, lang_path);
            assert!(offset > 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_master_update_counts() {
    let mut master = master_from(CUSTOMER_TABLE);
    let changed = CUSTOMER_TABLE
        .replace("'No.';", "'Number';")
        .replace("ToolTip = 'Specifies the number.';", "");
    let object = AlObject::parse(&changed).unwrap().unwrap();
    let result = update_master(&mut master, &[object]);
    assert_eq!(result.updated_sources, 1);
    assert_eq!(result.removed_units, 1);
    assert_eq!(result.added, 0);
    assert_eq!(master.trans_units.len(), 2);
    assert_eq!(master.trans_units[1].source, "Number");
}

#[test]
fn test_master_orders_objects_by_type_and_name() {
    let page = indoc! {r#"
        page 50101 "A Card"
        {
            Caption = 'A Card';
        }
    "#};
    let table_b = CUSTOMER_TABLE;
    let table_a = indoc! {r#"
        table 50102 "Address Ext"
        {
            Caption = 'Address';
        }
    "#};
    let objects: Vec<AlObject> = [page, table_b, table_a]
        .into_iter()
        .map(|source| AlObject::parse(source).unwrap().unwrap())
        .collect();
    let mut master = Xliff::new("en-US", "en-US", "MyApp");
    update_master(&mut master, &objects);
    let sources: Vec<&str> = master
        .trans_units
        .iter()
        .map(|u| u.source.as_str())
        .collect();
    assert_eq!(
        sources,
        vec![
            "A Card",
            "Address",
            "Customer Extension",
            "No.",
            "Specifies the number."
        ]
    );
}
