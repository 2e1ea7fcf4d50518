//! Single-line recognizers for AL source text.
//!
//! Everything here looks at one line in isolation; nesting is tracked by the
//! object parser.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::attributes::{MlAttributes, parse_ml_value};
use super::MultiLanguageKind;

lazy_static! {
    static ref INDENT_DECREASE: Regex =
        Regex::new(r"(?i)(^\s*\}|\}\s*//(.*)$|^\s*\bend\b)").unwrap();
    static ref INDENT_INCREASE: Regex = Regex::new(
        r"(?i)^\s*\{|\{\s*//(.*)$|\bbegin\b\s*$|\bbegin\b\s*//(.*)$|\bcase\b\s.*\s\bof\b"
    )
    .unwrap();
    static ref PROPERTY: Regex = Regex::new(
        r#"(?i)^\s*(?P<name>ObsoleteState|SourceTable|PageType)\s*=\s*(?P<value>"[^"]*"|\w*);"#
    )
    .unwrap();
    static ref ML_PROPERTY: Regex = Regex::new(
        r"(?i)^\s*(?P<name>OptionCaption|Caption|ToolTip|InstructionalText|PromotedActionCategories|RequestFilterHeading)\s*=\s*(?P<rest>'.*)$"
    )
    .unwrap();
    static ref LABEL: Regex =
        Regex::new(r"(?i)^\s*(?P<name>\w*)\s*:\s*Label\s+(?P<rest>'.*)$").unwrap();
    static ref CONTROL: Regex = Regex::new(
        r"(?i)^\s*(?P<keyword>dataitem|column|value|group|field|part|action|area|cuegroup|repeater|separator|textattribute|fieldattribute|modify)\s*\((?P<args>.*)\)"
    )
    .unwrap();
    static ref TRIGGER: Regex = Regex::new(r"(?i)^\s*trigger\s+(?P<name>[^(]*)\(").unwrap();
    static ref PROCEDURE: Regex = Regex::new(
        r"(?i)^\s*(?:(?:local|internal|protected)\s+)?procedure\s+(?P<name>[^()]*)\("
    )
    .unwrap();
    static ref BARE_SECTION: Regex =
        Regex::new(r"(?i)^\s*(?P<keyword>layout|requestpage|actions)\s*$").unwrap();
}

/// One line of AL source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeLine {
    pub line_no: usize,
    pub code: String,
    /// Nesting depth, written once by the parser.
    pub indentation: usize,
}

impl CodeLine {
    pub fn new(line_no: usize, code: impl Into<String>) -> Self {
        Self {
            line_no,
            code: code.into(),
            indentation: 0,
        }
    }

    /// Splits source text into lines, accepting both line ending styles.
    pub fn split(text: &str) -> Vec<CodeLine> {
        text.lines()
            .enumerate()
            .map(|(i, line)| CodeLine::new(i, line))
            .collect()
    }
}

/// How a line changes the nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineClass {
    pub decrease: bool,
    pub increase: bool,
}

impl LineClass {
    pub fn is_neutral(&self) -> bool {
        !self.decrease && !self.increase
    }
}

pub fn classify(line: &str) -> LineClass {
    LineClass {
        decrease: INDENT_DECREASE.is_match(line),
        increase: INDENT_INCREASE.is_match(line),
    }
}

/// A plain property assignment that affects structure or identification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMatch {
    pub name: String,
    pub value: String,
}

pub fn match_property(line: &str) -> Option<PropertyMatch> {
    let caps = PROPERTY.captures(line)?;
    Some(PropertyMatch {
        name: caps["name"].to_string(),
        value: caps["value"].trim_matches('"').to_string(),
    })
}

/// A translatable assignment or label declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MlMatch {
    pub kind: MultiLanguageKind,
    pub name: String,
    pub attributes: MlAttributes,
}

pub fn match_ml_property(line: &str) -> Option<MlMatch> {
    let caps = ML_PROPERTY.captures(line)?;
    let kind = MultiLanguageKind::from_property_name(&caps["name"])?;
    let attributes = parse_ml_value(&caps["rest"])?;
    Some(MlMatch {
        kind,
        name: kind.property_name().to_string(),
        attributes,
    })
}

pub fn match_label(line: &str) -> Option<MlMatch> {
    let caps = LABEL.captures(line)?;
    let attributes = parse_ml_value(&caps["rest"])?;
    Some(MlMatch {
        kind: MultiLanguageKind::Label,
        name: caps["name"].to_string(),
        attributes,
    })
}

/// A structural control opener: keyword plus its raw arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMatch {
    pub keyword: String,
    pub args: Vec<String>,
}

pub fn match_control(line: &str) -> Option<ControlMatch> {
    if let Some(caps) = CONTROL.captures(line) {
        return Some(ControlMatch {
            keyword: caps["keyword"].to_ascii_lowercase(),
            args: split_args(&caps["args"]),
        });
    }
    if let Some(caps) = TRIGGER.captures(line) {
        return Some(ControlMatch {
            keyword: "trigger".to_string(),
            args: vec![unquote(&caps["name"])],
        });
    }
    if let Some(caps) = PROCEDURE.captures(line) {
        return Some(ControlMatch {
            keyword: "procedure".to_string(),
            args: vec![unquote(&caps["name"])],
        });
    }
    BARE_SECTION.captures(line).map(|caps| ControlMatch {
        keyword: caps["keyword"].to_ascii_lowercase(),
        args: Vec::new(),
    })
}

/// Splits `a; "b;c"; Code[20]` on semicolons that are not inside quotes,
/// brackets or parentheses.
fn split_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_double = false;
    let mut in_single = false;
    let mut depth = 0i32;
    for ch in args.chars() {
        match ch {
            '"' if !in_single => in_double = !in_double,
            '\'' if !in_double => in_single = !in_single,
            '[' | '(' if !in_double && !in_single => depth += 1,
            ']' | ')' if !in_double && !in_single => depth -= 1,
            ';' if !in_double && !in_single && depth == 0 => {
                out.push(unquote(&current));
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    out.push(unquote(&current));
    out
}

/// Trims and removes one pair of surrounding double quotes.
pub fn unquote(s: &str) -> String {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
        .to_string()
}
