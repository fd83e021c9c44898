use crate::publication::Publication;
use crate::utils::error::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::Path;

const NOTION_API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// Notion caps rich_text values at 2000 characters.
const RICH_TEXT_LIMIT: usize = 2000;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<&'a str>,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Page>,
    has_more: bool,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Page {
    properties: serde_json::Map<String, Value>,
}

impl Page {
    /// Concatenated plain text of a title or rich_text property.
    fn text_property(&self, name: &str) -> Option<String> {
        let property = self.properties.get(name)?;
        let fragments = property
            .get("rich_text")
            .or_else(|| property.get("title"))?
            .as_array()?;

        let text: String = fragments
            .iter()
            .filter_map(|fragment| fragment.get("plain_text").and_then(Value::as_str))
            .collect();

        if text.is_empty() { None } else { Some(text) }
    }
}

pub struct NotionClient {
    client: Client,
    token: String,
    database_id: String,
}

impl NotionClient {
    pub fn new(token: &str, database_id: &str) -> AppResult<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(concat!("notion-scholar/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {e}")))?,
            token: token.to_string(),
            database_id: database_id.to_string(),
        })
    }

    /// Citekeys of the publications already present in the database.
    pub async fn publication_keys(&self) -> AppResult<Vec<String>> {
        Ok(self
            .query_pages()
            .await?
            .iter()
            .filter_map(|page| page.text_property("Citekey"))
            .collect())
    }

    /// Bibtex text of every publication page, for download.
    pub async fn bibtex_entries(&self) -> AppResult<Vec<String>> {
        Ok(self
            .query_pages()
            .await?
            .iter()
            .filter_map(|page| page.text_property("Bibtex"))
            .collect())
    }

    /// Create a page for the publication. An optional PDF is attached as an
    /// external file block, since the API does not take direct uploads.
    pub async fn add_publication(
        &self,
        publication: &Publication,
        pdf_path: Option<&Path>,
    ) -> AppResult<()> {
        let url = format!("{NOTION_API_BASE}/pages");
        let mut body = json!({
            "parent": { "database_id": self.database_id },
            "properties": publication_properties(publication),
        });

        if let Some(pdf) = pdf_path {
            body["children"] = json!([{
                "object": "block",
                "type": "file",
                "file": {
                    "type": "external",
                    "external": { "url": format!("file://{}", pdf.display()) },
                },
            }]);
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to add publication: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!(
                "Failed to add publication '{}': {status} - {error_text}",
                publication.key
            )));
        }

        Ok(())
    }

    async fn query_pages(&self) -> AppResult<Vec<Page>> {
        let url = format!("{NOTION_API_BASE}/databases/{}/query", self.database_id);
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let request = QueryRequest {
                start_cursor: cursor.as_deref(),
                page_size: 100,
            };

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.token)
                .header("Notion-Version", NOTION_VERSION)
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    AppError::Network(format!("Failed to query the Notion database: {e}"))
                })?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                return Err(AppError::Network(format!(
                    "Failed to query the Notion database: {status} - {error_text}"
                )));
            }

            let body: QueryResponse = response
                .json()
                .await
                .map_err(|e| AppError::Network(format!("Failed to parse query response: {e}")))?;

            pages.extend(body.results);

            match (body.has_more, body.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(pages)
    }
}

fn publication_properties(publication: &Publication) -> Value {
    let mut properties = json!({
        "Title": { "title": [text_fragment(&publication.title)] },
        "Citekey": { "rich_text": [text_fragment(&publication.key)] },
        "Authors": { "rich_text": [text_fragment(&publication.authors)] },
        "Journal": { "rich_text": [text_fragment(&publication.journal)] },
        "Abstract": { "rich_text": [text_fragment(&publication.abstract_text)] },
        "Bibtex": { "rich_text": [text_fragment(&publication.bibtex)] },
    });

    if let Some(year) = publication.year {
        properties["Year"] = json!({ "number": year });
    }
    if !publication.url.is_empty() {
        properties["URL"] = json!({ "url": publication.url });
    }

    properties
}

fn text_fragment(text: &str) -> Value {
    json!({ "text": { "content": truncate_rich_text(text) } })
}

fn truncate_rich_text(text: &str) -> String {
    text.chars().take(RICH_TEXT_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"{
        "results": [
            {
                "properties": {
                    "Citekey": { "rich_text": [{ "plain_text": "smith2020" }] },
                    "Bibtex": { "rich_text": [
                        { "plain_text": "@article{smith2020," },
                        { "plain_text": " title = {T}}" }
                    ] },
                    "Title": { "title": [{ "plain_text": "A Title" }] }
                }
            },
            {
                "properties": {
                    "Citekey": { "rich_text": [] }
                }
            }
        ],
        "has_more": false,
        "next_cursor": null
    }"#;

    #[test]
    fn test_query_response_deserializes() {
        let response: QueryResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        assert_eq!(response.results.len(), 2);
        assert!(!response.has_more);
        assert_eq!(response.next_cursor, None);
    }

    #[test]
    fn test_text_property_concatenates_fragments() {
        let response: QueryResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        let page = &response.results[0];

        assert_eq!(page.text_property("Citekey"), Some("smith2020".to_string()));
        assert_eq!(
            page.text_property("Bibtex"),
            Some("@article{smith2020, title = {T}}".to_string())
        );
        assert_eq!(page.text_property("Title"), Some("A Title".to_string()));
    }

    #[test]
    fn test_empty_property_is_none() {
        let response: QueryResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        let page = &response.results[1];

        assert_eq!(page.text_property("Citekey"), None);
        assert_eq!(page.text_property("Missing"), None);
    }

    #[test]
    fn test_rich_text_truncation() {
        let long = "x".repeat(RICH_TEXT_LIMIT + 50);
        assert_eq!(truncate_rich_text(&long).chars().count(), RICH_TEXT_LIMIT);
        assert_eq!(truncate_rich_text("short"), "short");
    }

    #[test]
    fn test_publication_properties_shape() {
        let publication = Publication {
            key: "smith2020".to_string(),
            title: "A Title".to_string(),
            authors: "Smith, Jane".to_string(),
            year: Some(2020),
            journal: String::new(),
            url: "https://example.org".to_string(),
            abstract_text: String::new(),
            bibtex: "@article{smith2020,}".to_string(),
        };

        let properties = publication_properties(&publication);
        assert_eq!(
            properties["Citekey"]["rich_text"][0]["text"]["content"],
            "smith2020"
        );
        assert_eq!(properties["Year"]["number"], 2020);
        assert_eq!(properties["URL"]["url"], "https://example.org");
    }
}
