pub mod markdown;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::client::summarize::Summarizer;
use crate::client::{Publication, PublicationSource};
use crate::error::ClientError;

pub use markdown::summary_to_text;

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    NotFound,
    Loaded(Publication),
}

/// A single publication plus its optional AI summary
pub struct DetailView {
    id: String,
    state: DetailState,
    summarizer: Arc<dyn Summarizer>,
    summary: Mutex<Option<String>>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a summary request finishes or is dropped
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DetailView {
    /// Fetch the publication. Any failure, including a missing record,
    /// yields the not-found state.
    pub async fn load(
        source: &dyn PublicationSource,
        summarizer: Arc<dyn Summarizer>,
        id: &str,
    ) -> Self {
        let state = match source.get_by_id(id).await {
            Ok(publication) => DetailState::Loaded(publication),
            Err(ClientError::NotFound(_)) => DetailState::NotFound,
            Err(e) => {
                tracing::warn!(id, error = %e, "failed to load publication");
                DetailState::NotFound
            }
        };

        Self {
            id: id.to_string(),
            state,
            summarizer,
            summary: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn publication(&self) -> Option<&Publication> {
        match &self.state {
            DetailState::Loaded(p) => Some(p),
            DetailState::NotFound => None,
        }
    }

    pub fn summary(&self) -> Option<String> {
        self.summary.lock().ok().and_then(|s| s.clone())
    }

    pub fn is_summarizing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Request a summary of the loaded publication.
    ///
    /// Only one request may be outstanding; a second call while one is in
    /// flight fails with [`ClientError::SummaryBusy`]. On failure the
    /// previous summary, if any, is kept.
    pub async fn summarize(&self) -> Result<String, ClientError> {
        let publication = match &self.state {
            DetailState::Loaded(p) => p,
            DetailState::NotFound => return Err(ClientError::NotFound(self.id.clone())),
        };

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::SummaryBusy);
        }
        let _guard = InFlight(&self.in_flight);

        let summary = self
            .summarizer
            .summarize(&publication.title, &publication.abstract_text)
            .await?;

        if let Ok(mut slot) = self.summary.lock() {
            *slot = Some(summary.clone());
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct OneRecord(Publication);

    #[async_trait]
    impl PublicationSource for OneRecord {
        async fn list(&self, _skip: usize, _limit: usize) -> Result<Vec<Publication>, ClientError> {
            Ok(vec![self.0.clone()])
        }

        async fn get_by_id(&self, id: &str) -> Result<Publication, ClientError> {
            if id == self.0.id {
                Ok(self.0.clone())
            } else if id == "broken" {
                Err(ClientError::fetch("publication", "connection reset"))
            } else {
                Err(ClientError::NotFound(id.to_string()))
            }
        }

        async fn count(&self) -> Result<u64, ClientError> {
            Ok(1)
        }

        async fn search(&self, _query: &str) -> Result<Vec<Publication>, ClientError> {
            Ok(Vec::new())
        }
    }

    /// Summarizer that sleeps before answering and can be told to fail
    struct SlowSummarizer {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl SlowSummarizer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Summarizer for SlowSummarizer {
        async fn summarize(&self, title: &str, _abstract_text: &str) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Summarize("service unavailable".into()));
            }
            Ok(format!("Summary of {title}"))
        }
    }

    fn record() -> Publication {
        Publication {
            id: "p1".into(),
            title: "Bone loss in mice".into(),
            abstract_text: "Mice flown for 30 days lost bone.".into(),
            authors: vec!["R. Globus".into()],
            keywords: vec!["bone-density".into()],
            urls: vec!["https://example.org/p1".into()],
            year: 2016,
            doi: Some("10.1000/p1".into()),
        }
    }

    #[tokio::test]
    async fn test_load_found_and_missing() {
        let source = OneRecord(record());
        let summarizer = Arc::new(SlowSummarizer::new());

        let found = DetailView::load(&source, summarizer.clone(), "p1").await;
        assert_eq!(found.publication().map(|p| p.year), Some(2016));

        let missing = DetailView::load(&source, summarizer.clone(), "nope").await;
        assert_eq!(missing.state(), &DetailState::NotFound);

        let broken = DetailView::load(&source, summarizer, "broken").await;
        assert_eq!(broken.state(), &DetailState::NotFound);
    }

    #[tokio::test]
    async fn test_summarize_stores_summary() {
        let source = OneRecord(record());
        let view = DetailView::load(&source, Arc::new(SlowSummarizer::new()), "p1").await;

        let summary = view.summarize().await.unwrap();
        assert_eq!(summary, "Summary of Bone loss in mice");
        assert_eq!(view.summary().as_deref(), Some("Summary of Bone loss in mice"));
        assert!(!view.is_summarizing());
    }

    #[tokio::test]
    async fn test_concurrent_summarize_is_rejected() {
        let source = OneRecord(record());
        let summarizer = Arc::new(SlowSummarizer::new());
        let view = DetailView::load(&source, summarizer.clone(), "p1").await;

        let (first, second) = tokio::join!(view.summarize(), view.summarize());
        assert!(first.is_ok());
        assert!(matches!(second, Err(ClientError::SummaryBusy)));
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);

        // The flag is released once the first request settles
        assert!(view.summarize().await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_summarize_keeps_previous_summary() {
        let source = OneRecord(record());
        let summarizer = Arc::new(SlowSummarizer::new());
        let view = DetailView::load(&source, summarizer.clone(), "p1").await;

        view.summarize().await.unwrap();
        summarizer.fail.store(true, Ordering::SeqCst);

        assert!(matches!(view.summarize().await, Err(ClientError::Summarize(_))));
        assert_eq!(view.summary().as_deref(), Some("Summary of Bone loss in mice"));
        assert!(!view.is_summarizing());
    }

    #[tokio::test]
    async fn test_summarize_without_publication() {
        let source = OneRecord(record());
        let view = DetailView::load(&source, Arc::new(SlowSummarizer::new()), "nope").await;
        assert!(matches!(view.summarize().await, Err(ClientError::NotFound(_))));
    }
}
