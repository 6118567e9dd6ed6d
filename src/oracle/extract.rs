//! Extraction of the first JSON object embedded in free text.
//!
//! Providers wrap their answer in prose or code fences. The scanner walks the
//! text for balanced `{...}` spans, honouring string literals and escapes, and
//! returns the first span that decodes as a JSON object. A span that fails to
//! decode is skipped as a whole.

use serde::de::DeserializeOwned;

/// Result of looking for a JSON object in free text.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<T> {
    /// A well-formed object decoded into `T`
    Parsed(T),
    /// No brace-delimited span was found
    NoJson,
    /// Spans were found but none decoded; carries the last decode error
    Malformed(String),
}

impl<T> Extracted<T> {
    /// The decoded value, if any.
    pub fn ok(self) -> Option<T> {
        match self {
            Extracted::Parsed(value) => Some(value),
            _ => None,
        }
    }
}

/// Decode the first balanced JSON object found in `text` into `T`.
pub fn extract_first_object<T: DeserializeOwned>(text: &str) -> Extracted<T> {
    let mut last_error: Option<String> = None;
    let mut from = 0;

    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        match balanced_span(&text[start..]) {
            Some(len) => {
                let candidate = &text[start..start + len];
                match serde_json::from_str::<serde_json::Value>(candidate) {
                    Ok(value) if value.is_object() => {
                        return match serde_json::from_value::<T>(value) {
                            Ok(parsed) => Extracted::Parsed(parsed),
                            Err(err) => Extracted::Malformed(err.to_string()),
                        };
                    }
                    Ok(_) => {}
                    Err(err) => last_error = Some(err.to_string()),
                }
                // Objects nested in a rejected span are never answers.
                from = start + len;
            }
            None => {
                last_error.get_or_insert_with(|| "unbalanced braces".to_string());
                from = start + 1;
            }
        }
    }

    match last_error {
        Some(err) => Extracted::Malformed(err),
        None => Extracted::NoJson,
    }
}

/// Byte length of the balanced brace span starting at `text[0] == '{'`.
fn balanced_span(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}
