//! XLIFF 1.2 writer.
//!
//! Output is two-space indented with one element per line. Line endings and
//! the BOM follow what was detected when the document was read.

use std::{fs, io::Write, path::Path};

use quick_xml::{
    Writer,
    escape::partial_escape,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use tracing::debug;

use super::types::{Note, Target, TransUnit, Xliff};
use crate::error::Error;

const XLIFF_NS: &str = "urn:oasis:names:tc:xliff:document:1.2";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "urn:oasis:names:tc:xliff:document:1.2 xliff-core-1.2-transitional.xsd";

/// Serialization switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Write `<target></target>` instead of `<target/>`.
    pub expand_empty_elements: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            expand_empty_elements: true,
        }
    }
}

struct XliffWriter<'a> {
    xml: Writer<&'a mut Vec<u8>>,
    options: WriteOptions,
}

impl XliffWriter<'_> {
    fn indent(&mut self, level: usize) -> Result<(), Error> {
        let mut ws = String::with_capacity(1 + level * 2);
        ws.push('\n');
        ws.push_str(&"  ".repeat(level));
        self.xml.write_event(Event::Text(BytesText::from_escaped(ws)))?;
        Ok(())
    }

    fn start(&mut self, level: usize, elem: BytesStart<'_>) -> Result<(), Error> {
        self.indent(level)?;
        self.xml.write_event(Event::Start(elem))?;
        Ok(())
    }

    fn end(&mut self, level: usize, name: &str) -> Result<(), Error> {
        self.indent(level)?;
        self.xml.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Writes `<name attrs>text</name>` on one line.
    fn text_element(&mut self, level: usize, elem: BytesStart<'_>, text: &str) -> Result<(), Error> {
        self.indent(level)?;
        if text.is_empty() && !self.options.expand_empty_elements {
            self.xml.write_event(Event::Empty(elem))?;
            return Ok(());
        }
        let end = elem.to_end().into_owned();
        self.xml.write_event(Event::Start(elem))?;
        if !text.is_empty() {
            self.xml
                .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
        }
        self.xml.write_event(Event::End(end))?;
        Ok(())
    }

    fn unit(&mut self, unit: &TransUnit) -> Result<(), Error> {
        let mut elem = BytesStart::new("trans-unit");
        elem.push_attribute(("id", unit.id.as_str()));
        let max_width = unit.max_width.map(|w| w.to_string());
        if let Some(width) = &max_width {
            elem.push_attribute(("maxwidth", width.as_str()));
        }
        if let Some(size_unit) = &unit.size_unit {
            elem.push_attribute(("size-unit", size_unit.as_str()));
        }
        elem.push_attribute(("translate", if unit.translate { "yes" } else { "no" }));
        if let Some(space) = &unit.xml_space {
            elem.push_attribute(("xml:space", space.as_str()));
        }
        if let Some(target) = &unit.al_object_target {
            elem.push_attribute(("al-object-target", target.as_str()));
        }
        self.start(4, elem)?;

        self.text_element(5, BytesStart::new("source"), &unit.source)?;
        for target in &unit.targets {
            self.target(target)?;
        }
        for note in &unit.notes {
            self.note(note)?;
        }
        self.end(4, "trans-unit")
    }

    fn target(&mut self, target: &Target) -> Result<(), Error> {
        let mut elem = BytesStart::new("target");
        if let Some(state) = &target.state {
            elem.push_attribute(("state", state.as_str()));
        }
        if let Some(qualifier) = &target.state_qualifier {
            elem.push_attribute(("state-qualifier", qualifier.as_str()));
        }
        self.text_element(5, elem, &target.serialized_text())
    }

    fn note(&mut self, note: &Note) -> Result<(), Error> {
        let mut elem = BytesStart::new("note");
        elem.push_attribute(("from", note.from.as_str()));
        elem.push_attribute(("annotates", note.annotates.as_str()));
        elem.push_attribute(("priority", note.priority.to_string().as_str()));
        self.text_element(5, elem, &note.text)
    }
}

/// Serializes `doc` into bytes, BOM and line endings included.
pub fn to_bytes(doc: &Xliff, options: WriteOptions) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    {
        let mut w = XliffWriter {
            xml: Writer::new(&mut buf),
            options,
        };
        w.xml
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut xliff = BytesStart::new("xliff");
        xliff.push_attribute(("version", "1.2"));
        xliff.push_attribute(("xmlns", XLIFF_NS));
        xliff.push_attribute(("xmlns:xsi", XSI_NS));
        xliff.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
        w.start(0, xliff)?;

        let mut file = BytesStart::new("file");
        file.push_attribute(("datatype", doc.datatype.as_str()));
        file.push_attribute(("source-language", doc.source_language.as_str()));
        file.push_attribute(("target-language", doc.target_language.as_str()));
        file.push_attribute(("original", doc.original.as_str()));
        w.start(1, file)?;
        w.start(2, BytesStart::new("body"))?;

        let mut group = BytesStart::new("group");
        group.push_attribute(("id", "body"));
        if doc.trans_units.is_empty() {
            w.indent(3)?;
            w.xml.write_event(Event::Start(group))?;
            w.xml.write_event(Event::End(BytesEnd::new("group")))?;
        } else {
            w.start(3, group)?;
            for unit in &doc.trans_units {
                w.unit(unit)?;
            }
            w.end(3, "group")?;
        }

        w.end(2, "body")?;
        w.end(1, "file")?;
        w.end(0, "xliff")?;
        w.indent(0)?;
    }

    let text = String::from_utf8_lossy(&buf);
    let text = text.replace("\r\n", "\n");
    let text = text.replace('\n', doc.line_ending.as_str());

    let mut out = Vec::with_capacity(text.len() + 3);
    if doc.bom {
        out.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
    }
    out.extend_from_slice(text.as_bytes());
    Ok(out)
}

/// Writes `doc` to any writer.
pub fn write_document<W: Write>(
    doc: &Xliff,
    mut writer: W,
    options: WriteOptions,
) -> Result<(), Error> {
    writer.write_all(&to_bytes(doc, options)?)?;
    Ok(())
}

/// Writes `doc` to `path` through a temporary sibling file and a rename.
pub fn save(doc: &Xliff, path: &Path, options: WriteOptions) -> Result<(), Error> {
    let bytes = to_bytes(doc, options)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), units = doc.trans_units.len(), "wrote xliff document");
    Ok(())
}
