//! Stable XLIFF identifiers.
//!
//! A trans-unit id is the chain of `Type <hash>` tokens from the object down to
//! the translatable entry, e.g. `Table 2328808854 - Field 1296262074 - Property 2879900210`.
//! The generator note carries the same chain with readable names:
//! `Table Customer - Field No. - Property Caption`.

use std::fmt::{Display, Formatter};

const SEPARATOR: &str = " - ";

/// Token types that may start a segment of an id or generator note.
const KNOWN_TYPES: &[&str] = &[
    "Table",
    "TableExtension",
    "Page",
    "PageExtension",
    "Report",
    "ReportExtension",
    "Codeunit",
    "Query",
    "XmlPort",
    "Enum",
    "EnumExtension",
    "Field",
    "Control",
    "Action",
    "Method",
    "ReportDataItem",
    "ReportColumn",
    "QueryDataItem",
    "QueryColumn",
    "EnumValue",
    "XmlPortNode",
    "RequestPage",
    "Property",
    "NamedType",
];

/// One `Type Name` segment of an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XliffIdToken {
    pub kind: String,
    pub name: String,
}

impl XliffIdToken {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn hash(&self) -> u32 {
        name_hash(&self.name)
    }

    /// Builds the hashed id for a token chain.
    pub fn id_for(tokens: &[XliffIdToken]) -> String {
        tokens
            .iter()
            .map(|t| format!("{} {}", t.kind, t.hash()))
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    /// Builds the readable generator note for a token chain.
    pub fn names_for(tokens: &[XliffIdToken]) -> String {
        tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    /// Splits a generator note back into tokens.
    ///
    /// Names may themselves contain ` - `; a segment that does not start with
    /// a known type is glued back onto the previous token.
    pub fn parse_names(note: &str) -> Vec<XliffIdToken> {
        let mut tokens: Vec<XliffIdToken> = Vec::new();
        for segment in note.split(SEPARATOR) {
            let (head, rest) = segment.split_once(' ').unwrap_or((segment, ""));
            if KNOWN_TYPES.contains(&head) {
                tokens.push(XliffIdToken::new(head, rest));
            } else if let Some(last) = tokens.last_mut() {
                last.name.push_str(SEPARATOR);
                last.name.push_str(segment);
            }
        }
        tokens
    }
}

impl Display for XliffIdToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// Splits a hashed id into `(type, hash)` pairs. Segments that do not parse are skipped.
pub fn parse_id(id: &str) -> Vec<(String, u32)> {
    id.split(SEPARATOR)
        .filter_map(|segment| {
            let (kind, hash) = segment.trim().split_once(' ')?;
            Some((kind.to_string(), hash.trim().parse().ok()?))
        })
        .collect()
}

/// True when the last segment of `id` is `Property <hash(property)>`.
pub fn is_property_id(id: &str, property: &str) -> bool {
    parse_id(id)
        .last()
        .is_some_and(|(kind, hash)| kind == "Property" && *hash == name_hash(property))
}

/// 32-bit string hash over UTF-16 code units, two interleaved DJB lanes.
pub fn name_hash(name: &str) -> u32 {
    let units: Vec<u16> = name.encode_utf16().collect();
    let mut hash1: i32 = 5381;
    let mut hash2: i32 = 5381;
    for pair in units.chunks(2) {
        hash1 = hash1.wrapping_shl(5).wrapping_add(hash1) ^ i32::from(pair[0]);
        if let Some(&second) = pair.get(1) {
            hash2 = hash2.wrapping_shl(5).wrapping_add(hash2) ^ i32::from(second);
        }
    }
    hash1.wrapping_add(hash2.wrapping_mul(1_566_083_941)) as u32
}
