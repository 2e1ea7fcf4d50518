use proptest::prelude::*;
use xliffsync::traits::Parser;
use xliffsync::xliff::{LineEnding, Note, Target, TargetState, TransUnit, TranslationToken};
use xliffsync::{AlObject, Xliff, update_master};

fn text_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 _<>&\"'\\-\\.,!\\?%@#]{0,30}").expect("valid text regex")
}

// No vowels after the first letter, so a caption never spells a block keyword.
fn caption_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Z][B-DF-HJ-NP-TV-Z0-9 '\\.,!\\?]{0,20}").expect("valid caption regex")
}

fn target_strategy() -> impl Strategy<Value = Target> {
    (
        text_strategy(),
        prop_oneof![
            Just(None),
            Just(Some(TargetState::Translated)),
            Just(Some(TargetState::NeedsReviewTranslation)),
        ],
        prop_oneof![
            Just(None),
            Just(Some(TranslationToken::Review)),
            Just(Some(TranslationToken::Suggestion)),
        ],
    )
        .prop_map(|(text, state, token)| Target {
            text,
            state,
            state_qualifier: None,
            token,
        })
}

fn unit_strategy() -> impl Strategy<Value = TransUnit> {
    (
        text_strategy(),
        prop::collection::vec(target_strategy(), 0..3),
        text_strategy(),
        prop::option::of(1u32..200),
    )
        .prop_map(|(source, targets, comment, max_width)| {
            let mut unit = TransUnit::new("Table 1 - Property 2", source);
            unit.targets = targets;
            unit.max_width = max_width;
            unit.notes.push(Note::developer(comment));
            unit
        })
}

fn doc_strategy() -> impl Strategy<Value = Xliff> {
    (
        prop::collection::vec(unit_strategy(), 0..8),
        prop::bool::ANY,
        prop::bool::ANY,
    )
        .prop_map(|(units, crlf, bom)| {
            let mut doc = Xliff::new("en-US", "da-DK", "MyApp");
            doc.trans_units = units
                .into_iter()
                .enumerate()
                .map(|(i, mut unit)| {
                    unit.id = format!("Table {i} - Property 2879900210");
                    unit
                })
                .collect();
            doc.line_ending = if crlf { LineEnding::CrLf } else { LineEnding::Lf };
            doc.bom = bom;
            doc
        })
}

fn table_with_captions(captions: &[String]) -> String {
    let mut source = String::from("table 50100 \"Caption Test\"\n{\n    fields\n    {\n");
    for (i, caption) in captions.iter().enumerate() {
        source.push_str(&format!(
            "        field({n}; \"Field {n}\"; Text[50])\n        {{\n            Caption = '{caption}';\n        }}\n",
            n = i + 1,
            caption = caption.replace('\'', "''"),
        ));
    }
    source.push_str("    }\n}\n");
    source
}

proptest! {
    #[test]
    fn prop_write_then_read_keeps_document(doc in doc_strategy()) {
        let mut bytes = Vec::new();
        doc.to_writer(&mut bytes).expect("write");
        let reread = Xliff::from_bytes(&bytes).expect("read back");
        prop_assert_eq!(&reread.trans_units, &doc.trans_units);
        prop_assert_eq!(reread.line_ending, doc.line_ending);
        prop_assert_eq!(reread.bom, doc.bom);
        prop_assert_eq!(&reread.target_language, &doc.target_language);
    }

    #[test]
    fn prop_second_write_is_byte_identical(doc in doc_strategy()) {
        let mut first = Vec::new();
        doc.to_writer(&mut first).expect("write");
        let reread = Xliff::from_bytes(&first).expect("read back");
        let mut second = Vec::new();
        reread.to_writer(&mut second).expect("write again");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_captions_survive_parse_and_write(captions in prop::collection::vec(caption_strategy(), 1..6)) {
        let source = table_with_captions(&captions);
        let object = AlObject::parse(&source).expect("parse").expect("object");
        let mut master = Xliff::new("en-US", "en-US", "MyApp");
        update_master(&mut master, &[object]);

        let sources: Vec<&str> = master.trans_units.iter().map(|u| u.source.as_str()).collect();
        let expected: Vec<&str> = captions.iter().map(String::as_str).collect();
        prop_assert_eq!(&sources, &expected);

        let mut bytes = Vec::new();
        master.to_writer(&mut bytes).expect("write");
        let reread = Xliff::from_bytes(&bytes).expect("read back");
        prop_assert_eq!(reread.trans_units, master.trans_units);
    }

    #[test]
    fn prop_ids_stable_across_parses(captions in prop::collection::vec(caption_strategy(), 1..6)) {
        let source = table_with_captions(&captions);
        let ids = |text: &str| -> Vec<String> {
            let object = AlObject::parse(text).expect("parse").expect("object");
            object.trans_units().into_iter().map(|u| u.id).collect()
        };
        let first = ids(&source);
        prop_assert_eq!(first.len(), captions.len());
        prop_assert_eq!(first, ids(&source));
    }
}

#[test]
fn test_doubled_quote_unescapes_once() {
    let source = table_with_captions(&["it's".to_string()]);
    assert!(source.contains("'it''s'"));
    let object = AlObject::parse(&source).unwrap().unwrap();
    let units = object.trans_units();
    assert_eq!(units[0].source, "it's");

    let mut master = Xliff::new("en-US", "en-US", "MyApp");
    master.trans_units = units;
    let xml = master.to_xml_string().unwrap();
    assert!(xml.contains("<source>it's</source>"));
    let reread = Xliff::from_str(&xml).unwrap();
    assert_eq!(reread.trans_units[0].source, "it's");
}
