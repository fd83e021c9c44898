use crate::bibtex;
use crate::utils::error::AppResult;
use regex::Regex;
use std::sync::OnceLock;

/// One bibliography entry, with the fields mirrored in the Notion database
/// plus the verbatim bibtex text.
#[derive(Debug, Clone, PartialEq)]
pub struct Publication {
    pub key: String,
    pub title: String,
    pub authors: String,
    pub year: Option<i64>,
    pub journal: String,
    pub url: String,
    pub abstract_text: String,
    pub bibtex: String,
}

fn field_start_regex() -> &'static Regex {
    static FIELD: OnceLock<Regex> = OnceLock::new();
    FIELD.get_or_init(|| {
        Regex::new(r#"(?m)^\s*([A-Za-z]+)\s*=\s*"#).expect("valid field start regex")
    })
}

impl Publication {
    pub fn from_entry(entry: &str) -> AppResult<Self> {
        let key = bibtex::entry_key(entry)?;

        let title = field_value(entry, "title").unwrap_or_default();
        let authors = field_value(entry, "author").unwrap_or_default();
        let journal = field_value(entry, "journal")
            .or_else(|| field_value(entry, "booktitle"))
            .unwrap_or_default();
        let url = field_value(entry, "url").unwrap_or_default();
        let abstract_text = field_value(entry, "abstract").unwrap_or_default();
        let year = field_value(entry, "year").and_then(|y| y.trim().parse::<i64>().ok());

        Ok(Self {
            key,
            title,
            authors,
            year,
            journal,
            url,
            abstract_text,
            bibtex: entry.to_string(),
        })
    }
}

/// Parse every entry of a bibtex document into publications.
pub fn publications_from_str(input: &str) -> AppResult<Vec<Publication>> {
    bibtex::entries_from_str(input)?
        .iter()
        .map(|entry| Publication::from_entry(entry))
        .collect()
}

/// Value of a named field, with the surrounding braces or quotes removed.
fn field_value(entry: &str, name: &str) -> Option<String> {
    for caps in field_start_regex().captures_iter(entry) {
        let field = caps.get(1)?;
        if !field.as_str().eq_ignore_ascii_case(name) {
            continue;
        }
        let rest = &entry[caps.get(0)?.end()..];
        return scan_value(rest);
    }
    None
}

/// Read a field value starting at its first character: `{...}` with nested
/// braces, `"..."`, or a bare token up to the next comma or closing brace.
fn scan_value(rest: &str) -> Option<String> {
    let mut chars = rest.char_indices();
    let (_, first) = chars.next()?;

    match first {
        '{' => {
            let mut depth = 1usize;
            for (offset, ch) in chars {
                match ch {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(unbrace(&rest[1..offset]));
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        '"' => rest[1..].find('"').map(|end| unbrace(&rest[1..=end])),
        _ => {
            let end = rest.find([',', '}', '\n']).unwrap_or(rest.len());
            let value = rest[..end].trim();
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        }
    }
}

/// Strip inner protection braces and collapse whitespace.
fn unbrace(value: &str) -> String {
    let stripped: String = value
        .chars()
        .filter(|c| *c != '{' && *c != '}' && *c != '"')
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = r#"@article{smith2020,
    title = {A {Nested} Title},
    author = {Smith, Jane and Doe, John},
    journal = {Journal of Examples},
    year = {2020},
    url = {https://example.org/smith2020},
    abstract = {Short abstract.},
}"#;

    #[test]
    fn test_field_extraction() {
        let publication = Publication::from_entry(ENTRY).unwrap();
        assert_eq!(publication.key, "smith2020");
        assert_eq!(publication.title, "A Nested Title");
        assert_eq!(publication.authors, "Smith, Jane and Doe, John");
        assert_eq!(publication.journal, "Journal of Examples");
        assert_eq!(publication.year, Some(2020));
        assert_eq!(publication.url, "https://example.org/smith2020");
        assert_eq!(publication.abstract_text, "Short abstract.");
        assert_eq!(publication.bibtex, ENTRY);
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let publication =
            Publication::from_entry("@misc{key1,\n    title = {Only a Title},\n}").unwrap();
        assert_eq!(publication.title, "Only a Title");
        assert_eq!(publication.authors, "");
        assert_eq!(publication.year, None);
        assert_eq!(publication.journal, "");
    }

    #[test]
    fn test_quoted_and_bare_values() {
        let entry = "@article{key1,\n    title = \"Quoted Title\",\n    year = 1999,\n}";
        let publication = Publication::from_entry(entry).unwrap();
        assert_eq!(publication.title, "Quoted Title");
        assert_eq!(publication.year, Some(1999));
    }

    #[test]
    fn test_booktitle_fallback_for_journal() {
        let entry = "@inproceedings{key1,\n    booktitle = {Proc. of Examples},\n}";
        let publication = Publication::from_entry(entry).unwrap();
        assert_eq!(publication.journal, "Proc. of Examples");
    }

    #[test]
    fn test_publications_from_str() {
        let input = format!("{ENTRY}\n\n@misc{{other2021,\n    title = {{Other}},\n}}\n");
        let publications = publications_from_str(&input).unwrap();
        assert_eq!(publications.len(), 2);
        assert_eq!(publications[1].key, "other2021");
    }
}
