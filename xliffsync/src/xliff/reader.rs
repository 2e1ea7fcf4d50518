//! XLIFF 1.2 reader built on `quick-xml` events.

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use super::types::{LineEnding, Note, NoteFrom, Target, TargetState, TransUnit, Xliff};
use crate::error::Error;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decodes raw file bytes and parses them into a document.
///
/// UTF-16 files are recognized by their BOM; everything else is read as UTF-8.
/// `path` is only used for error reporting; offsets in errors count from the
/// start of the file, BOM included.
pub fn parse_bytes(bytes: &[u8], path: Option<&Path>) -> Result<Xliff, Error> {
    let bom = bytes.starts_with(UTF8_BOM);
    let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding_rs::UTF_8))
        .bom_override(true)
        .build(bytes);
    let mut text = String::new();
    decoder.read_to_string(&mut text).map_err(Error::Io)?;
    let bom_len = if bom { UTF8_BOM.len() as u64 } else { 0 };
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let mut doc = parse_text(text, path, bom_len)?;
    doc.bom = bom;
    Ok(doc)
}

struct DocumentReader<'a> {
    reader: Reader<&'a [u8]>,
    path: PathBuf,
    base_offset: u64,
}

impl<'a> DocumentReader<'a> {
    fn malformed(&self, message: impl Into<String>) -> Error {
        Error::malformed(
            self.path.clone(),
            self.base_offset + self.reader.error_position() as u64,
            message,
        )
    }

    fn at_cursor(&self, message: impl Into<String>) -> Error {
        Error::malformed(
            self.path.clone(),
            self.base_offset + self.reader.buffer_position() as u64,
            message,
        )
    }

    fn next(&mut self) -> Result<Event<'a>, Error> {
        self.reader
            .read_event()
            .map_err(|e| self.malformed(e.to_string()))
    }

    fn attr(&self, e: &BytesStart, name: &[u8]) -> Result<Option<String>, Error> {
        for attr in e.attributes().with_checks(false) {
            let attr = attr.map_err(|err| self.at_cursor(err.to_string()))?;
            if attr.key.as_ref() == name {
                let value = attr
                    .unescape_value()
                    .map_err(|err| self.at_cursor(err.to_string()))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    /// Collects the character content of the element just opened, up to its end tag.
    fn read_text(&mut self) -> Result<String, Error> {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            match self.next()? {
                Event::Text(t) => {
                    let value = t.unescape().map_err(|e| self.at_cursor(e.to_string()))?;
                    text.push_str(&value);
                }
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
                Event::Start(_) => depth += 1,
                Event::End(_) if depth == 0 => break,
                Event::End(_) => depth -= 1,
                Event::Eof => return Err(self.at_cursor("unexpected end of document")),
                _ => {}
            }
        }
        Ok(normalize_newlines(text))
    }
}

fn normalize_newlines(text: String) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n")
    } else {
        text
    }
}

/// Parses decoded document text.
pub fn parse_text(text: &str, path: Option<&Path>, base_offset: u64) -> Result<Xliff, Error> {
    let mut doc_reader = DocumentReader {
        reader: Reader::from_str(text),
        path: path.map(Path::to_path_buf).unwrap_or_default(),
        base_offset,
    };

    let mut doc = Xliff {
        line_ending: LineEnding::detect(text),
        bom: false,
        path: path.map(Path::to_path_buf),
        ..Xliff::default()
    };
    let mut seen_file = false;
    let mut current: Option<TransUnit> = None;
    let mut depth = 0usize;

    loop {
        let event = doc_reader.next()?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                if !is_empty {
                    depth += 1;
                }
                match e.local_name().as_ref() {
                    b"file" => {
                        seen_file = true;
                        if let Some(v) = doc_reader.attr(e, b"source-language")? {
                            doc.source_language = v;
                        }
                        if let Some(v) = doc_reader.attr(e, b"target-language")? {
                            doc.target_language = v;
                        }
                        doc.original = doc_reader.attr(e, b"original")?.unwrap_or_default();
                        if let Some(v) = doc_reader.attr(e, b"datatype")? {
                            doc.datatype = v;
                        }
                    }
                    b"trans-unit" => {
                        let unit = read_unit_attributes(&doc_reader, e)?;
                        if is_empty {
                            doc.trans_units.push(unit);
                        } else {
                            current = Some(unit);
                        }
                    }
                    b"source" | b"target" | b"note" if current.is_some() => {
                        let content = if is_empty {
                            String::new()
                        } else {
                            depth -= 1;
                            doc_reader.read_text()?
                        };
                        let Some(unit) = current.as_mut() else {
                            continue;
                        };
                        match e.local_name().as_ref() {
                            b"source" => unit.source = content,
                            b"target" => unit.targets.push(read_target(&doc_reader, e, &content)?),
                            _ => unit.notes.push(read_note(&doc_reader, e, content)?),
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| doc_reader.at_cursor("unexpected closing tag"))?;
                if e.local_name().as_ref() == b"trans-unit"
                    && let Some(unit) = current.take()
                {
                    doc.trans_units.push(unit);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth > 0 {
        return Err(Error::malformed(
            doc_reader.path.clone(),
            base_offset + text.len() as u64,
            "unclosed element at end of document",
        ));
    }
    if !seen_file {
        return Err(Error::InvalidDocument(
            "no <file> element found".to_string(),
        ));
    }
    Ok(doc)
}

fn read_unit_attributes(r: &DocumentReader, e: &BytesStart) -> Result<TransUnit, Error> {
    let id = r
        .attr(e, b"id")?
        .ok_or_else(|| r.at_cursor("trans-unit without id"))?;
    let max_width = match r.attr(e, b"maxwidth")? {
        Some(v) => Some(
            v.trim()
                .parse::<u32>()
                .map_err(|_| r.at_cursor(format!("invalid maxwidth `{v}`")))?,
        ),
        None => None,
    };
    Ok(TransUnit {
        id,
        translate: r.attr(e, b"translate")?.as_deref() != Some("no"),
        size_unit: r.attr(e, b"size-unit")?,
        max_width,
        xml_space: r.attr(e, b"xml:space")?,
        al_object_target: r.attr(e, b"al-object-target")?,
        source: String::new(),
        targets: Vec::new(),
        notes: Vec::new(),
    })
}

fn read_target(r: &DocumentReader, e: &BytesStart, content: &str) -> Result<Target, Error> {
    let mut target = Target::from_serialized(content);
    target.state = match r.attr(e, b"state")? {
        Some(v) => Some(v.parse::<TargetState>()?),
        None => None,
    };
    target.state_qualifier = r.attr(e, b"state-qualifier")?.map(|v| v.as_str().into());
    Ok(target)
}

fn read_note(r: &DocumentReader, e: &BytesStart, text: String) -> Result<Note, Error> {
    let from = r.attr(e, b"from")?.unwrap_or_default();
    Ok(Note {
        from: NoteFrom::from(from.as_str()),
        annotates: r.attr(e, b"annotates")?.unwrap_or_default(),
        priority: r
            .attr(e, b"priority")?
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xliff::types::{StateQualifier, TranslationToken};
    use indoc::indoc;

    const SAMPLE: &str = indoc! {r#"
        <?xml version="1.0" encoding="utf-8"?>
        <xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
          <file datatype="xml" source-language="en-US" target-language="da-DK" original="MyApp">
            <body>
              <group id="body">
                <trans-unit id="Table 1 - Property 2" maxwidth="30" size-unit="char" translate="yes" xml:space="preserve">
                  <source>Customer &amp; Vendor</source>
                  <target state="needs-review-translation" state-qualifier="exact-match">Kunde &amp; Leverandør</target>
                  <note from="Developer" annotates="general" priority="2"/>
                  <note from="Xliff Generator" annotates="general" priority="3">Table Customer - Property Caption</note>
                </trans-unit>
                <trans-unit id="Table 1 - NamedType 3" translate="no">
                  <source>it's</source>
                  <target>[xliffsync: review]det er</target>
                </trans-unit>
              </group>
            </body>
          </file>
        </xliff>
    "#};

    #[test]
    fn test_parse_sample() {
        let doc = parse_text(SAMPLE, None, 0).unwrap();
        assert_eq!(doc.source_language, "en-US");
        assert_eq!(doc.target_language, "da-DK");
        assert_eq!(doc.original, "MyApp");
        assert_eq!(doc.line_ending, LineEnding::Lf);
        assert_eq!(doc.trans_units.len(), 2);

        let first = &doc.trans_units[0];
        assert_eq!(first.source, "Customer & Vendor");
        assert_eq!(first.max_width, Some(30));
        assert_eq!(first.targets[0].text, "Kunde & Leverandør");
        assert_eq!(
            first.targets[0].state,
            Some(TargetState::NeedsReviewTranslation)
        );
        assert_eq!(
            first.targets[0].state_qualifier,
            Some(StateQualifier::ExactMatch)
        );
        assert_eq!(first.notes.len(), 2);
        assert_eq!(first.developer_note_content(), "");
        assert_eq!(first.id_tokens().len(), 2);

        let second = &doc.trans_units[1];
        assert!(!second.translate);
        assert_eq!(second.targets[0].token, Some(TranslationToken::Review));
        assert_eq!(second.targets[0].text, "det er");
    }

    #[test]
    fn test_bom_and_crlf_detected() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(SAMPLE.replace('\n', "\r\n").as_bytes());
        let doc = parse_bytes(&bytes, None).unwrap();
        assert!(doc.bom);
        assert_eq!(doc.line_ending, LineEnding::CrLf);
        assert_eq!(doc.trans_units.len(), 2);
    }

    #[test]
    fn test_mismatched_tag_reports_offset() {
        let broken = SAMPLE.replacen("</source>", "</sourc>", 1);
        let err = parse_text(&broken, Some(Path::new("App.da-DK.xlf")), 0).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
        assert!(err.offset().unwrap() > 0);
    }

    #[test]
    fn test_unclosed_document() {
        let truncated = &SAMPLE[..SAMPLE.find("</group>").unwrap()];
        let err = parse_text(truncated, Some(Path::new("App.da-DK.xlf")), 0).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }
}
