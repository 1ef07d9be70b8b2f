pub mod summarize;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::ClientError;

pub use summarize::SummaryClient;

/// A research publication record as served by the backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Publication {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub authors: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    pub year: i32,
    #[serde(default)]
    pub doi: Option<String>,
}

impl Publication {
    /// Case-insensitive substring match over title, abstract, authors and
    /// keywords. `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.abstract_text.to_lowercase().contains(needle)
            || self.authors.iter().any(|a| a.to_lowercase().contains(needle))
            || self.keywords.iter().any(|k| k.to_lowercase().contains(needle))
    }
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

/// Read access to the publications backend
#[async_trait]
pub trait PublicationSource: Send + Sync {
    /// Fetch up to `limit` publications starting at offset `skip`
    async fn list(&self, skip: usize, limit: usize) -> Result<Vec<Publication>, ClientError>;

    async fn get_by_id(&self, id: &str) -> Result<Publication, ClientError>;

    async fn count(&self) -> Result<u64, ClientError>;

    /// Server-side search across the whole collection
    async fn search(&self, query: &str) -> Result<Vec<Publication>, ClientError>;

    /// Total publication count for display. The count is a non-critical
    /// metric, so any failure degrades to zero.
    async fn count_or_zero(&self) -> u64 {
        match self.count().await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, "publication count unavailable, showing 0");
                0
            }
        }
    }
}

/// HTTP client for the publications REST API
pub struct PublicationClient {
    client: Client,
    base_url: Url,
}

impl PublicationClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::fetch("http client", e))?;

        Ok(Self {
            client,
            base_url: parse_base_url(&config.base_url)?,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn fetch_json<T: for<'de> Deserialize<'de>>(
        &self,
        what: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::fetch(what, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::fetch(what, format!("{status}: {body}")));
        }

        response.json().await.map_err(|e| ClientError::Decode {
            what: what.to_string(),
            source: e,
        })
    }
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ClientError::fetch("base url", e))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::fetch("base url", format!("'{raw}' is not a base URL")));
    }
    Ok(url)
}

#[async_trait]
impl PublicationSource for PublicationClient {
    async fn list(&self, skip: usize, limit: usize) -> Result<Vec<Publication>, ClientError> {
        tracing::debug!(skip, limit, "listing publications");
        let request = self
            .client
            .get(self.endpoint(&["publications"]))
            .query(&[("skip", skip), ("limit", limit)]);
        self.fetch_json("publications", request).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Publication, ClientError> {
        let response = self
            .client
            .get(self.endpoint(&["publications", id]))
            .send()
            .await
            .map_err(|e| ClientError::fetch("publication", e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(id.to_string())),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(ClientError::fetch("publication", format!("{status}: {body}")))
            }
            _ => response.json().await.map_err(|e| ClientError::Decode {
                what: "publication".to_string(),
                source: e,
            }),
        }
    }

    async fn count(&self) -> Result<u64, ClientError> {
        let request = self.client.get(self.endpoint(&["publications", "count"]));
        let body: CountResponse = self.fetch_json("publication count", request).await?;
        Ok(body.count)
    }

    async fn search(&self, query: &str) -> Result<Vec<Publication>, ClientError> {
        tracing::debug!(query, "searching publications");
        let request = self
            .client
            .get(self.endpoint(&["search"]))
            .query(&[("query", query)]);
        self.fetch_json("search results", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(url: String) -> PublicationClient {
        PublicationClient::new(&ApiConfig {
            base_url: url,
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn publication_json(id: &str, title: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "abstract": "Effects of spaceflight on mice.",
            "authors": ["A. Author", "B. Author"],
            "keywords": ["microgravity"],
            "year": 2021
        })
    }

    #[test]
    fn test_publication_optional_fields_default() {
        let publication: Publication = serde_json::from_value(json!({
            "id": "p1",
            "title": "Plants in orbit",
            "abstract": "Growth of Arabidopsis.",
            "authors": ["C. Botanist"],
            "year": 2019
        }))
        .unwrap();
        assert!(publication.keywords.is_empty());
        assert!(publication.urls.is_empty());
        assert!(publication.doi.is_none());
    }

    #[test]
    fn test_matches_is_case_insensitive_across_fields() {
        let publication: Publication =
            serde_json::from_value(publication_json("p1", "Bone loss in Microgravity")).unwrap();
        assert!(publication.matches("microgravity"));
        assert!(publication.matches("b. author"));
        assert!(publication.matches("mice"));
        assert!(!publication.matches("radiation"));
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(parse_base_url("mailto:someone@example.com").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[tokio::test]
    async fn test_list_sends_skip_and_limit() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/publications")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("skip".into(), "20".into()),
                Matcher::UrlEncoded("limit".into(), "11".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([publication_json("p21", "Twenty-one")]).to_string())
            .expect(1)
            .create_async()
            .await;

        let client = client_for(server.url());
        let items = client.list(20, 11).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "p21");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_non_success_is_fetch_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/publications")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.list(0, 11).await.unwrap_err();
        assert!(matches!(err, ClientError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/publications/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.get_by_id("missing").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_get_by_id_ok() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/publications/p7")
            .with_status(200)
            .with_body(publication_json("p7", "Seven").to_string())
            .create_async()
            .await;

        let client = client_for(format!("{}/", server.url()));
        let publication = client.get_by_id("p7").await.unwrap();
        assert_eq!(publication.title, "Seven");
    }

    #[tokio::test]
    async fn test_count_and_degraded_count() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/publications/count")
            .with_status(200)
            .with_body(r#"{"count": 608}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        assert_eq!(client.count().await.unwrap(), 608);
        assert_eq!(client.count_or_zero().await, 608);
    }

    #[tokio::test]
    async fn test_count_failure_degrades_to_zero() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/publications/count")
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(server.url());
        assert!(client.count().await.is_err());
        assert_eq!(client.count_or_zero().await, 0);
    }

    #[tokio::test]
    async fn test_count_malformed_body_degrades_to_zero() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/publications/count")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = client_for(server.url());
        assert_eq!(client.count_or_zero().await, 0);
    }

    #[tokio::test]
    async fn test_search_encodes_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("query".into(), "bone density & mice".into()))
            .with_status(200)
            .with_body(json!([publication_json("p3", "Bone density")]).to_string())
            .expect(1)
            .create_async()
            .await;

        let client = client_for(server.url());
        let results = client.search("bone density & mice").await.unwrap();
        assert_eq!(results.len(), 1);
        mock.assert_async().await;
    }
}
