use crate::bibtex;
use crate::notion::NotionClient;
use crate::publication::Publication;
use crate::utils::error::{AppError, AppResult};
use crate::utils::output::{print_success, print_warning};
use std::io::Write;
use std::path::Path;

/// Add the publications of a bib file or an inline bibtex string to the
/// Notion database, skipping the citekeys already present.
pub async fn run_sync(
    token: &str,
    database_id: &str,
    file_path: Option<&Path>,
    bibtex_string: Option<&str>,
    pdf_path: Option<&Path>,
) -> AppResult<i32> {
    let entries = match (bibtex_string, file_path) {
        (Some(string), _) => bibtex::entries_from_str(string)?,
        (None, Some(path)) => bibtex::entries_from_file(path)?,
        (None, None) => {
            return Err(AppError::Bibtex(
                "Must provide a \"string\" or a \"file_path\"".to_string(),
            ));
        }
    };

    let publications = entries
        .iter()
        .map(|entry| Publication::from_entry(entry))
        .collect::<AppResult<Vec<_>>>()?;

    let client = NotionClient::new(token, database_id)?;
    let existing_keys = client.publication_keys().await?;

    let new_publications: Vec<&Publication> = publications
        .iter()
        .filter(|publication| !existing_keys.contains(&publication.key))
        .collect();

    if new_publications.is_empty() && !publications.is_empty() {
        println!("\nAll the publications are already present in the database.");
        return Ok(0);
    }

    if publications.is_empty() {
        print_warning("No bibtex entries found in the input.");
        return Ok(0);
    }

    println!(
        "📚 Adding {} publication(s) to the database...",
        new_publications.len()
    );
    for publication in &new_publications {
        client.add_publication(publication, pdf_path).await?;
        println!("  ✅ {}", publication.key);
    }

    // An inline string is appended to the bib file so the file stays the
    // source of truth.
    if let (Some(path), Some(string)) = (file_path, bibtex_string) {
        append_to_bib_file(path, string)?;
    }

    print_success(&format!(
        "Added {} publication(s) to the database.",
        new_publications.len()
    ));
    Ok(0)
}

fn append_to_bib_file(path: &Path, string: &str) -> AppResult<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| AppError::Io(format!("Failed to open bib file {}: {e}", path.display())))?;
    write!(file, "\n\n{string}")
        .map_err(|e| AppError::Io(format!("Failed to append to bib file: {e}")))?;
    Ok(())
}
