use crate::utils::error::{AppError, AppResult};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn entry_header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"@\w+\s*\{").expect("valid entry header regex"))
}

/// Split a bibtex document into raw entries. Nested braces inside field
/// values are balanced; `@comment`, `@preamble` and `@string` blocks are
/// skipped.
pub fn entries_from_str(input: &str) -> AppResult<Vec<String>> {
    let mut entries = Vec::new();
    let mut cursor = 0;

    while let Some(header) = entry_header_regex().find_at(input, cursor) {
        let kind = header
            .as_str()
            .trim_start_matches('@')
            .trim_end_matches('{')
            .trim()
            .to_ascii_lowercase();

        let body_end = matching_brace(input, header.end()).ok_or_else(|| {
            AppError::Bibtex(format!(
                "Unbalanced braces in entry starting at byte {}",
                header.start()
            ))
        })?;

        if !matches!(kind.as_str(), "comment" | "preamble" | "string") {
            entries.push(input[header.start()..=body_end].trim().to_string());
        }

        cursor = body_end + 1;
    }

    Ok(entries)
}

pub fn entries_from_file(path: &Path) -> AppResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::Io(format!("Failed to read bib file {}: {e}", path.display()))
    })?;
    entries_from_str(&content)
}

/// Index of the `}` closing the brace that precedes `after`, if any.
fn matching_brace(input: &str, after: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (offset, ch) in input[after..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(after + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Citekey of a raw entry: the text between the opening brace and the
/// first comma.
pub fn entry_key(entry: &str) -> AppResult<String> {
    let open = entry
        .find('{')
        .ok_or_else(|| AppError::Bibtex(format!("Entry has no opening brace: {entry}")))?;
    let rest = &entry[open + 1..];
    let end = rest
        .find(',')
        .ok_or_else(|| AppError::Bibtex(format!("Entry has no citekey: {entry}")))?;
    let key = rest[..end].trim();
    if key.is_empty() {
        return Err(AppError::Bibtex(format!("Entry has an empty citekey: {entry}")));
    }
    Ok(key.to_string())
}
