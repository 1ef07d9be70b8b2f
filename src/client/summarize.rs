use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

use super::parse_base_url;
use crate::config::SummarizerConfig;
use crate::error::ClientError;

/// Produces a short AI-written summary of a publication
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, title: &str, abstract_text: &str) -> Result<String, ClientError>;
}

/// Client for the local summarization service
pub struct SummaryClient {
    client: Client,
    base_url: Url,
}

impl SummaryClient {
    pub fn new(config: &SummarizerConfig) -> Result<Self, ClientError> {
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
}

#[async_trait]
impl Summarizer for SummaryClient {
    async fn summarize(&self, title: &str, abstract_text: &str) -> Result<String, ClientError> {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("summarize");
        }

        // The service reads both fields from the query string, not the body
        let response = self
            .client
            .post(url)
            .query(&[("title", title), ("abstract", abstract_text)])
            .send()
            .await
            .map_err(|e| ClientError::Summarize(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Summarize(format!("{status}: {body}")));
        }

        response
            .text()
            .await
            .map_err(|e| ClientError::Summarize(e.to_string()))
    }
}
