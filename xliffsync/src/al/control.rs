//! Nodes of the control tree and the keyword table that creates them.

use serde::Serialize;

use super::{MultiLanguageKind, ObjectType, attributes::MlAttributes};
use crate::error::Error;

/// Index of a control in [`AlObject::controls`](super::AlObject).
pub type ControlId = usize;

/// Structural node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ControlKind {
    Object,
    DataItem,
    Column,
    Value,
    Group,
    PageField,
    TableField,
    Part,
    Action,
    Area,
    Trigger,
    Procedure,
    Layout,
    RequestPage,
    Actions,
    CueGroup,
    Repeater,
    Separator,
    TextAttribute,
    FieldAttribute,
    Modify,
}

/// Segment type a control contributes to an XLIFF id. `Skip` contributes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum XliffTokenKind {
    Object,
    Field,
    Control,
    Action,
    Method,
    ReportDataItem,
    ReportColumn,
    QueryDataItem,
    QueryColumn,
    EnumValue,
    XmlPortNode,
    RequestPage,
    Skip,
}

impl XliffTokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            XliffTokenKind::Object => "Object",
            XliffTokenKind::Field => "Field",
            XliffTokenKind::Control => "Control",
            XliffTokenKind::Action => "Action",
            XliffTokenKind::Method => "Method",
            XliffTokenKind::ReportDataItem => "ReportDataItem",
            XliffTokenKind::ReportColumn => "ReportColumn",
            XliffTokenKind::QueryDataItem => "QueryDataItem",
            XliffTokenKind::QueryColumn => "QueryColumn",
            XliffTokenKind::EnumValue => "EnumValue",
            XliffTokenKind::XmlPortNode => "XmlPortNode",
            XliffTokenKind::RequestPage => "RequestPage",
            XliffTokenKind::Skip => "Skip",
        }
    }
}

/// A plain property such as `SourceTable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub name: String,
    pub value: String,
    pub line_index: usize,
}

/// One translatable string occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiLanguageEntry {
    pub kind: MultiLanguageKind,
    pub name: String,
    pub text: String,
    pub max_length: Option<u32>,
    pub locked: bool,
    pub comment: String,
    pub start_line_index: usize,
    pub owner: ControlId,
}

impl MultiLanguageEntry {
    pub fn new(
        kind: MultiLanguageKind,
        name: impl Into<String>,
        attributes: MlAttributes,
        line_index: usize,
        owner: ControlId,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            text: attributes.text,
            max_length: attributes.max_length,
            locked: attributes.locked,
            comment: attributes.comment,
            start_line_index: line_index,
            owner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    pub kind: ControlKind,
    pub token: XliffTokenKind,
    pub name: Option<String>,
    /// Data type of a table field, or the source expression/target of a page control.
    pub secondary: Option<String>,
    pub start_line_index: usize,
    pub end_line_index: usize,
    pub parent: Option<ControlId>,
    pub children: Vec<ControlId>,
    pub properties: Vec<Property>,
    pub entries: Vec<MultiLanguageEntry>,
    /// Trigger and procedure bodies; only labels are read inside them.
    pub is_code: bool,
}

impl Control {
    pub fn new(kind: ControlKind, token: XliffTokenKind, line_index: usize) -> Self {
        Self {
            kind,
            token,
            name: None,
            secondary: None,
            start_line_index: line_index,
            end_line_index: line_index,
            parent: None,
            children: Vec::new(),
            properties: Vec::new(),
            entries: Vec::new(),
            is_code: false,
        }
    }
}

/// What the keyword table resolves an opener to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSpec {
    pub kind: ControlKind,
    pub token: XliffTokenKind,
    pub name: Option<String>,
    pub secondary: Option<String>,
    pub is_code: bool,
}

impl ControlSpec {
    fn new(kind: ControlKind, token: XliffTokenKind) -> Self {
        Self {
            kind,
            token,
            name: None,
            secondary: None,
            is_code: false,
        }
    }

    fn named(mut self, args: &[String], index: usize) -> Self {
        self.name = args.get(index).cloned();
        self
    }

    fn secondary(mut self, args: &[String], index: usize) -> Self {
        self.secondary = args.get(index).cloned();
        self
    }

    fn code(mut self) -> Self {
        self.is_code = true;
        self
    }
}

/// Maps `(object type, keyword)` to a control.
///
/// `in_actions` tells whether the opener sits below an `actions` section,
/// which turns groups into action groups.
pub fn resolve_control(
    object_type: ObjectType,
    keyword: &str,
    args: &[String],
    in_actions: bool,
) -> Result<ControlSpec, Error> {
    use ControlKind as K;
    use ObjectType as O;
    use XliffTokenKind as T;

    let page_like = object_type.is_page_like() || object_type == O::XmlPort;
    let spec = match (object_type, keyword) {
        (_, "field") if page_like => ControlSpec::new(K::PageField, T::Control)
            .named(args, 0)
            .secondary(args, 1),
        (o, "field") if o.is_table_like() => ControlSpec::new(K::TableField, T::Field)
            .named(args, 1)
            .secondary(args, 2),
        (o, "dataitem") if o.is_report_like() => {
            ControlSpec::new(K::DataItem, T::ReportDataItem).named(args, 0)
        }
        (O::Query, "dataitem") => ControlSpec::new(K::DataItem, T::QueryDataItem).named(args, 0),
        (o, "column") if o.is_report_like() => ControlSpec::new(K::Column, T::ReportColumn)
            .named(args, 0)
            .secondary(args, 1),
        (O::Query, "column") => ControlSpec::new(K::Column, T::QueryColumn)
            .named(args, 0)
            .secondary(args, 1),
        (O::Enum | O::EnumExtension, "value") => {
            ControlSpec::new(K::Value, T::EnumValue).named(args, 1)
        }
        (_, "group") if page_like && in_actions => {
            ControlSpec::new(K::Group, T::Action).named(args, 0)
        }
        (_, "group") if page_like => ControlSpec::new(K::Group, T::Control).named(args, 0),
        (_, "area") if page_like => ControlSpec::new(K::Area, T::Skip).named(args, 0),
        (_, "part") if page_like => ControlSpec::new(K::Part, T::Control)
            .named(args, 0)
            .secondary(args, 1),
        (_, "cuegroup") if page_like => ControlSpec::new(K::CueGroup, T::Control).named(args, 0),
        (_, "repeater") if page_like => ControlSpec::new(K::Repeater, T::Control).named(args, 0),
        (_, "action") if page_like => ControlSpec::new(K::Action, T::Action).named(args, 0),
        (_, "separator") if page_like => ControlSpec::new(K::Separator, T::Action).named(args, 0),
        (_, "layout") if page_like => ControlSpec::new(K::Layout, T::Skip),
        (_, "actions") if page_like => ControlSpec::new(K::Actions, T::Skip),
        (O::Report | O::ReportExtension | O::XmlPort, "requestpage") => {
            let mut spec = ControlSpec::new(K::RequestPage, T::RequestPage);
            spec.name = Some("RequestOptionsPage".to_string());
            spec
        }
        (O::XmlPort, "textattribute") => {
            ControlSpec::new(K::TextAttribute, T::XmlPortNode).named(args, 0)
        }
        (O::XmlPort, "fieldattribute") => {
            ControlSpec::new(K::FieldAttribute, T::XmlPortNode).named(args, 0)
        }
        (O::PageExtension | O::ReportExtension, "modify") => {
            let token = if in_actions { T::Action } else { T::Control };
            ControlSpec::new(K::Modify, token).named(args, 0)
        }
        (O::TableExtension, "modify") => ControlSpec::new(K::Modify, T::Field).named(args, 0),
        (_, "trigger") => ControlSpec::new(K::Trigger, T::Method).named(args, 0).code(),
        (_, "procedure") => ControlSpec::new(K::Procedure, T::Method).named(args, 0).code(),
        _ => return Err(Error::unsupported_control(keyword, object_type)),
    };
    Ok(spec)
}
