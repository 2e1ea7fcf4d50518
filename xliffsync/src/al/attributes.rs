//! Value grammar of translatable assignments:
//! `'text' [, MaxLength = n] [, Locked = bool] [, Comment = 'text']`.
//!
//! The named attributes may appear in any order. When an attribute category
//! occurs more than once only the first occurrence is used.

use std::{iter::Peekable, str::Chars};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MlAttributes {
    pub text: String,
    pub max_length: Option<u32>,
    pub locked: bool,
    pub comment: String,
}

/// Parses the value part of an assignment, starting at the opening quote.
///
/// Returns `None` when the text literal is not terminated.
pub fn parse_ml_value(input: &str) -> Option<MlAttributes> {
    let mut chars = input.chars().peekable();
    let text = read_quoted(&mut chars)?;
    let mut attributes = MlAttributes {
        text,
        ..MlAttributes::default()
    };

    let mut seen_max_length = false;
    let mut seen_locked = false;
    let mut seen_comment = false;

    loop {
        skip_whitespace(&mut chars);
        if chars.next_if_eq(&',').is_none() {
            break;
        }
        skip_whitespace(&mut chars);
        let key = read_word(&mut chars);
        skip_whitespace(&mut chars);
        if chars.next_if_eq(&'=').is_none() {
            break;
        }
        skip_whitespace(&mut chars);
        let value = if chars.peek() == Some(&'\'') {
            match read_quoted(&mut chars) {
                Some(v) => Value::Quoted(v),
                None => break,
            }
        } else {
            Value::Bare(read_bare(&mut chars))
        };

        match (key.to_ascii_lowercase().as_str(), value) {
            ("maxlength", Value::Bare(v)) if !seen_max_length => {
                seen_max_length = true;
                attributes.max_length = v.parse().ok();
            }
            ("locked", Value::Bare(v)) if !seen_locked => {
                seen_locked = true;
                attributes.locked = v.eq_ignore_ascii_case("true");
            }
            ("comment", Value::Quoted(v)) if !seen_comment => {
                seen_comment = true;
                attributes.comment = v;
            }
            _ => {}
        }
    }
    Some(attributes)
}

enum Value {
    Quoted(String),
    Bare(String),
}

/// Reads `'...'` with `''` standing for one quote.
fn read_quoted(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    chars.next_if_eq(&'\'')?;
    let mut out = String::new();
    while let Some(ch) = chars.next() {
        if ch == '\'' {
            if chars.next_if_eq(&'\'').is_some() {
                out.push('\'');
            } else {
                return Some(out);
            }
        } else {
            out.push(ch);
        }
    }
    None
}

fn read_word(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(ch) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
        out.push(ch);
    }
    out
}

fn read_bare(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(ch) = chars.next_if(|c| *c != ',' && *c != ';') {
        out.push(ch);
    }
    out.trim().to_string()
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}
