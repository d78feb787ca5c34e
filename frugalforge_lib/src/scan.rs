//! Delimiter matching and embedded listview extraction for rendered pages.
//!
//! Rendered pages embed their tabular sections as JavaScript object literals
//! (`new Listview({ id: 'sold-by', ..., data: [...] })`). The `data` array is
//! valid JSON, so it is sliced out with a string-aware bracket scan and handed
//! to `serde_json` instead of parsing the surrounding script.

use serde_json::{Map, Value};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ScanError {
    #[error("expected '{expected}' at index {index}")]
    Precondition { expected: char, index: usize },
    #[error("no matching '{close}' for '{open}' at index {index}")]
    Unbalanced { open: char, close: char, index: usize },
}

/// Returns the byte index of the delimiter that closes the one at `start`.
///
/// Delimiters inside double-quoted strings are ignored, and a backslash
/// inside a string escapes the following character.
pub fn find_matching_bracket(
    text: &str,
    start: usize,
    open: char,
    close: char,
) -> Result<usize, ScanError> {
    let tail = match text.get(start..) {
        Some(tail) if tail.starts_with(open) => tail,
        _ => {
            return Err(ScanError::Precondition {
                expected: open,
                index: start,
            })
        }
    };

    let mut depth = 0usize;
    let mut in_str = false;
    let mut escape = false;
    for (offset, ch) in tail.char_indices() {
        if in_str {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_str = false;
            }
            continue;
        }
        if ch == '"' {
            in_str = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                return Ok(start + offset);
            }
        }
    }

    Err(ScanError::Unbalanced {
        open,
        close,
        index: start,
    })
}

/// Extracts the `data` array of the listview whose id is `listview_id`.
///
/// Returns `None` when the page has no such listview or its array cannot be
/// isolated or decoded. Array elements that are not JSON objects are dropped.
pub fn extract_listview_data(html: &str, listview_id: &str) -> Option<Vec<Map<String, Value>>> {
    let anchor = html
        .find(&format!("id: '{}'", listview_id))
        .or_else(|| html.find(&format!("id: \"{}\"", listview_id)))?;

    let data_idx = anchor + html[anchor..].find("data:")?;
    let array_start = data_idx + html[data_idx..].find('[')?;
    let array_end = find_matching_bracket(html, array_start, '[', ']').ok()?;

    match serde_json::from_str::<Value>(&html[array_start..=array_end]) {
        Ok(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(obj) => Some(obj),
                    _ => None,
                })
                .collect(),
        ),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("listview '{}' is not valid JSON: {}", listview_id, e);
            None
        }
    }
}
