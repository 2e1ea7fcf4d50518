//! A parsed AL object and the translation units it produces.

use std::{
    fs,
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::{
    MultiLanguageKind, ObjectType,
    control::{Control, ControlId, ControlKind, MultiLanguageEntry, XliffTokenKind},
    line::{CodeLine, unquote},
    parser::parse_code,
};
use crate::{
    error::Error,
    xliff::{Note, TransUnit},
    xliff_id::XliffIdToken,
};

lazy_static! {
    static ref OBJECT_HEADER: Regex = Regex::new(
        r#"(?i)^\s*(?P<type>tableextension|table|pageextension|page|reportextension|report|codeunit|query|xmlport|enumextension|enum)\s+(?P<id>\d+)\s+(?P<name>"[^"]*"|\w+)(?:\s+extends\s+(?P<extends>"[^"]*"|\w+))?"#
    )
    .unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlObject {
    pub object_type: ObjectType,
    pub object_id: u32,
    pub name: String,
    pub extends: Option<String>,
    pub path: Option<PathBuf>,
    pub lines: Vec<CodeLine>,
    /// Arena of controls; index 0 is the object itself.
    pub controls: Vec<Control>,
}

impl AlObject {
    /// Parses one object from source text.
    ///
    /// Returns `Ok(None)` when the text holds no supported object header
    /// (interfaces, permission sets, profiles and similar).
    pub fn parse(text: &str) -> Result<Option<AlObject>, Error> {
        let text = text.trim_start_matches('\u{feff}');
        let lines = CodeLine::split(text);

        let Some((header_index, caps)) = lines
            .iter()
            .enumerate()
            .find_map(|(i, line)| OBJECT_HEADER.captures(&line.code).map(|c| (i, c)))
        else {
            return Ok(None);
        };

        let object_type: ObjectType = caps["type"].parse()?;
        let object_id = caps["id"]
            .parse()
            .map_err(|_| Error::InvalidDocument(format!("invalid object id `{}`", &caps["id"])))?;
        let name = unquote(&caps["name"]);
        let extends = caps.name("extends").map(|m| unquote(m.as_str()));
        let opens_on_header = lines[header_index].code.contains('{');

        let mut root = Control::new(ControlKind::Object, XliffTokenKind::Object, header_index);
        root.name = Some(name.clone());

        let mut object = AlObject {
            object_type,
            object_id,
            name,
            extends,
            path: None,
            lines,
            controls: vec![root],
        };

        let initial_level = if opens_on_header { 1 } else { 0 };
        let end = parse_code(&mut object, 0, header_index + 1, 0, initial_level)?;
        object.controls[0].end_line_index = end.min(object.lines.len().saturating_sub(1));
        debug!(
            object = %object.object_type,
            name = %object.name,
            controls = object.controls.len(),
            "parsed object"
        );
        Ok(Some(object))
    }

    /// Reads and parses one source file.
    pub fn parse_file(path: &Path) -> Result<Option<AlObject>, Error> {
        if !path.is_file() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let object = Self::parse(&text)?.map(|mut object| {
            object.path = Some(path.to_path_buf());
            object
        });
        Ok(object)
    }

    pub fn root(&self) -> &Control {
        &self.controls[0]
    }

    pub fn control(&self, id: ControlId) -> &Control {
        &self.controls[id]
    }

    /// True when `id` or one of its ancestors is an `actions` section.
    pub fn is_below_actions(&self, id: ControlId) -> bool {
        let mut current = Some(id);
        while let Some(cid) = current {
            match self.controls[cid].kind {
                ControlKind::Actions => return true,
                ControlKind::Layout => return false,
                _ => current = self.controls[cid].parent,
            }
        }
        false
    }

    /// Every translatable entry, in source line order.
    pub fn entries(&self) -> Vec<&MultiLanguageEntry> {
        let mut entries: Vec<&MultiLanguageEntry> =
            self.controls.iter().flat_map(|c| c.entries.iter()).collect();
        entries.sort_by_key(|e| e.start_line_index);
        entries
    }

    /// Id tokens from the object down to `entry`.
    pub fn id_tokens(&self, entry: &MultiLanguageEntry) -> Vec<XliffIdToken> {
        let mut tokens = Vec::new();
        let mut current = Some(entry.owner);
        while let Some(cid) = current {
            let control = &self.controls[cid];
            match control.token {
                XliffTokenKind::Skip => {}
                XliffTokenKind::Object => {
                    tokens.push(XliffIdToken::new(self.object_type.as_str(), self.name.as_str()))
                }
                kind => tokens.push(XliffIdToken::new(
                    kind.as_str(),
                    control.name.clone().unwrap_or_default(),
                )),
            }
            current = control.parent;
        }
        tokens.reverse();
        tokens.push(match entry.kind {
            MultiLanguageKind::Label => XliffIdToken::new("NamedType", entry.name.as_str()),
            _ => XliffIdToken::new("Property", entry.name.as_str()),
        });
        tokens
    }

    pub fn xliff_id(&self, entry: &MultiLanguageEntry) -> String {
        XliffIdToken::id_for(&self.id_tokens(entry))
    }

    /// Translation units for the master document, locked entries included
    /// with `translate="no"`.
    pub fn trans_units(&self) -> Vec<TransUnit> {
        self.entries()
            .into_iter()
            .map(|entry| {
                let tokens = self.id_tokens(entry);
                let mut unit = TransUnit::new(XliffIdToken::id_for(&tokens), entry.text.as_str());
                unit.translate = !entry.locked;
                unit.max_width = entry.max_length;
                unit.notes.push(Note::developer(entry.comment.as_str()));
                unit.notes.push(Note::generator(XliffIdToken::names_for(&tokens)));
                unit
            })
            .collect()
    }

    /// Sort key used to order objects in the master document.
    pub fn sort_key(&self) -> (&'static str, &str) {
        (self.object_type.as_str(), self.name.as_str())
    }
}

/// Where a translation unit comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub path: Option<PathBuf>,
    pub object_type: ObjectType,
    pub object_name: String,
    /// Zero-based line index in the source file.
    pub line_no: usize,
    pub names: String,
}

/// Finds the source entry that produces the trans-unit `id`.
pub fn locate(objects: &[AlObject], id: &str) -> Option<SourceLocation> {
    objects.iter().find_map(|object| {
        object.entries().into_iter().find_map(|entry| {
            let tokens = object.id_tokens(entry);
            (XliffIdToken::id_for(&tokens) == id).then(|| SourceLocation {
                path: object.path.clone(),
                object_type: object.object_type,
                object_name: object.name.clone(),
                line_no: object.lines[entry.start_line_index].line_no,
                names: XliffIdToken::names_for(&tokens),
            })
        })
    })
}
