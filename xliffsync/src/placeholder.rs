//! Positional placeholder scanning.
//!
//! Report layouts and legacy captions use fixed-width placeholders such as
//! `@1@@@@@@@@` and `#1###########`: a marker, a position number, the marker
//! again and at least one more marker for padding. Translations have to keep
//! them verbatim.

/// Extracts placeholder tokens from a string in occurrence order.
pub fn extract_placeholders(input: &str) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut i = 0;
    let mut out = Vec::new();

    while i < bytes.len() {
        let marker = bytes[i];
        if marker != b'@' && marker != b'#' {
            i += 1;
            continue;
        }

        // Position number
        let mut j = i + 1;
        let start_digits = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j == start_digits || j >= bytes.len() || bytes[j] != marker {
            i += 1;
            continue;
        }
        j += 1;

        // Padding, at least one marker
        let start_padding = j;
        while j < bytes.len() && bytes[j] == marker {
            j += 1;
        }
        if j == start_padding {
            i += 1;
            continue;
        }

        out.push(&input[i..j]);
        i = j;
    }

    out
}

/// First placeholder of `source` that does not occur verbatim in `target`.
pub fn first_missing<'a>(source: &'a str, target: &str) -> Option<&'a str> {
    extract_placeholders(source)
        .into_iter()
        .find(|token| !target.contains(token))
}
