//! XLIFF 1.2 documents: model, reader and writer.

pub mod reader;
pub mod types;
pub mod writer;

use std::{
    fs,
    io::{BufRead, Write},
    path::Path,
};

pub use types::{
    LineEnding, Note, NoteFrom, RefreshHint, StateQualifier, Target, TargetState,
    TranslationToken, TransUnit, Xliff,
};
pub use writer::WriteOptions;

use crate::{error::Error, settings::Settings, traits::Parser};

impl Parser for Xliff {
    fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        reader::parse_bytes(&bytes, None)
    }

    /// Reads the file, keeping its path, BOM and line ending on the document.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        reader::parse_bytes(&bytes, Some(path))
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        writer::write_document(self, writer, WriteOptions::default())
    }
}

impl Xliff {
    /// Writes the document back to `path` with the serialization switches from `settings`.
    pub fn save(&self, path: &Path, settings: &Settings) -> Result<(), Error> {
        writer::save(
            self,
            path,
            WriteOptions {
                expand_empty_elements: settings.replace_self_closing_tags,
            },
        )
    }

    /// Serializes with default options.
    pub fn to_xml_string(&self) -> Result<String, Error> {
        let bytes = writer::to_bytes(self, WriteOptions::default())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
