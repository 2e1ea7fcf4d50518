//! AL object sources: line recognizers, the object parser and the control tree.

pub mod attributes;
pub mod control;
pub mod line;
pub mod object;
pub mod parser;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use control::{Control, ControlId, ControlKind, MultiLanguageEntry, Property, XliffTokenKind};
pub use line::{CodeLine, LineClass, classify};
pub use object::{AlObject, SourceLocation, locate};

/// Top-level object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum ObjectType {
    Table,
    TableExtension,
    Page,
    PageExtension,
    Report,
    ReportExtension,
    Codeunit,
    Query,
    XmlPort,
    Enum,
    EnumExtension,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Table => "Table",
            ObjectType::TableExtension => "TableExtension",
            ObjectType::Page => "Page",
            ObjectType::PageExtension => "PageExtension",
            ObjectType::Report => "Report",
            ObjectType::ReportExtension => "ReportExtension",
            ObjectType::Codeunit => "Codeunit",
            ObjectType::Query => "Query",
            ObjectType::XmlPort => "XmlPort",
            ObjectType::Enum => "Enum",
            ObjectType::EnumExtension => "EnumExtension",
        }
    }

    pub fn is_page_like(&self) -> bool {
        matches!(
            self,
            ObjectType::Page
                | ObjectType::PageExtension
                | ObjectType::Report
                | ObjectType::ReportExtension
        )
    }

    pub fn is_table_like(&self) -> bool {
        matches!(self, ObjectType::Table | ObjectType::TableExtension)
    }

    pub fn is_report_like(&self) -> bool {
        matches!(self, ObjectType::Report | ObjectType::ReportExtension)
    }
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "table" => ObjectType::Table,
            "tableextension" => ObjectType::TableExtension,
            "page" => ObjectType::Page,
            "pageextension" => ObjectType::PageExtension,
            "report" => ObjectType::Report,
            "reportextension" => ObjectType::ReportExtension,
            "codeunit" => ObjectType::Codeunit,
            "query" => ObjectType::Query,
            "xmlport" => ObjectType::XmlPort,
            "enum" => ObjectType::Enum,
            "enumextension" => ObjectType::EnumExtension,
            other => {
                return Err(Error::InvalidDocument(format!(
                    "unknown object type `{other}`"
                )));
            }
        })
    }
}

/// Which translatable construct an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum MultiLanguageKind {
    Caption,
    OptionCaption,
    ToolTip,
    InstructionalText,
    PromotedActionCategories,
    RequestFilterHeading,
    Label,
}

impl MultiLanguageKind {
    pub fn from_property_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "caption" => MultiLanguageKind::Caption,
            "optioncaption" => MultiLanguageKind::OptionCaption,
            "tooltip" => MultiLanguageKind::ToolTip,
            "instructionaltext" => MultiLanguageKind::InstructionalText,
            "promotedactioncategories" => MultiLanguageKind::PromotedActionCategories,
            "requestfilterheading" => MultiLanguageKind::RequestFilterHeading,
            _ => return None,
        })
    }

    /// Property name as used in ids; labels use their own name instead.
    pub fn property_name(&self) -> &'static str {
        match self {
            MultiLanguageKind::Caption => "Caption",
            MultiLanguageKind::OptionCaption => "OptionCaption",
            MultiLanguageKind::ToolTip => "ToolTip",
            MultiLanguageKind::InstructionalText => "InstructionalText",
            MultiLanguageKind::PromotedActionCategories => "PromotedActionCategories",
            MultiLanguageKind::RequestFilterHeading => "RequestFilterHeading",
            MultiLanguageKind::Label => "Label",
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, MultiLanguageKind::Label)
    }
}
