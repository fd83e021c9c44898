use crate::notion::NotionClient;
use crate::utils::error::{AppError, AppResult};
use crate::utils::output::{print_success, print_warning};
use chrono::Utc;
use std::path::Path;

/// Fetch every bibtex entry of the Notion database and write them to the
/// bib file, or print them when no file path is resolved.
pub async fn download_sync(
    file_path: Option<&Path>,
    token: &str,
    database_id: &str,
) -> AppResult<i32> {
    let client = NotionClient::new(token, database_id)?;
    let entries = client.bibtex_entries().await?;

    if entries.is_empty() {
        print_warning("The Notion database contains no bibtex entries.");
        return Ok(0);
    }

    match file_path {
        Some(path) => {
            let document = render_document(&entries, Some(&Utc::now().to_rfc3339()));
            std::fs::write(path, document).map_err(|e| {
                AppError::Io(format!("Failed to write bib file {}: {e}", path.display()))
            })?;
            print_success(&format!(
                "Saved {} bibtex entries to {}",
                entries.len(),
                path.display()
            ));
        }
        None => print!("{}", render_document(&entries, None)),
    }

    Ok(0)
}

fn render_document(entries: &[String], downloaded_at: Option<&str>) -> String {
    let mut document = String::new();
    if let Some(timestamp) = downloaded_at {
        document.push_str(&format!("% Downloaded from Notion on {timestamp}\n\n"));
    }
    document.push_str(&entries.join("\n\n"));
    document.push('\n');
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_document_joins_entries() {
        let entries = vec![
            "@article{a,}".to_string(),
            "@article{b,}".to_string(),
        ];
        assert_eq!(
            render_document(&entries, None),
            "@article{a,}\n\n@article{b,}\n"
        );
    }

    #[test]
    fn test_render_document_header() {
        let entries = vec!["@article{a,}".to_string()];
        let document = render_document(&entries, Some("2024-01-01T00:00:00Z"));
        assert!(document.starts_with("% Downloaded from Notion on 2024-01-01T00:00:00Z\n\n"));
        assert!(document.ends_with("@article{a,}\n"));
    }
}
