//! Paged browsing of the publication list with a page-local text filter.
//!
//! The controller owns a single immutable [`PageState`] that is replaced
//! wholesale on every transition. Views hold `Arc<PageState>` snapshots and
//! never mutate them.
//!
//! Page loads are tagged with a monotonically increasing sequence number so
//! that a slow response for an older page can never overwrite the state of a
//! newer request.

pub mod filter;

use std::sync::Arc;

use crate::client::{Publication, PublicationSource};
use crate::error::ClientError;

pub use filter::filter_page;

/// Snapshot of the currently loaded page
#[derive(Debug, Clone)]
pub struct PageState {
    pub page_number: usize,
    pub page_size: usize,
    pub items: Vec<Publication>,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl PageState {
    fn initial(page_size: usize) -> Self {
        Self {
            page_number: 1,
            page_size,
            items: Vec::new(),
            has_more: false,
            loading: false,
            error: None,
        }
    }

    /// Offset of this page's first record in the whole collection
    pub fn offset(&self) -> usize {
        self.page_number.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// A page fetch that has been issued but not yet applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub seq: u64,
    pub page: usize,
    pub skip: usize,
    pub limit: usize,
}

/// What the list view should show for the current state and query
#[derive(Debug)]
pub enum Listing<'a> {
    /// The last load failed
    Failed(&'a str),
    /// The page holds no publications at all
    Empty,
    /// The page has data but nothing on it matches the active query
    NoMatchesOnPage,
    /// Matching publications with their index on the page
    Items(Vec<(usize, &'a Publication)>),
}

pub struct PageController {
    source: Arc<dyn PublicationSource>,
    page_size: usize,
    state: Arc<PageState>,
    query: String,
    latest_seq: u64,
}

impl PageController {
    pub fn new(source: Arc<dyn PublicationSource>, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            source,
            page_size,
            state: Arc::new(PageState::initial(page_size)),
            query: String::new(),
            latest_seq: 0,
        }
    }

    pub fn state(&self) -> Arc<PageState> {
        Arc::clone(&self.state)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Start loading page `page` (clamped to 1). Returns the request to pass
    /// back to [`complete_load`](Self::complete_load) once the fetch settles.
    pub fn begin_load(&mut self, page: usize) -> PageRequest {
        let page = page.max(1);
        self.latest_seq += 1;

        let request = PageRequest {
            seq: self.latest_seq,
            page,
            skip: (page - 1).saturating_mul(self.page_size),
            // One extra record tells us whether a next page exists
            limit: self.page_size.saturating_add(1),
        };

        self.state = Arc::new(PageState {
            page_number: page,
            loading: true,
            ..(*self.state).clone()
        });

        request
    }

    /// Apply the outcome of a fetch. Returns false when the request has been
    /// superseded by a newer one and its result was discarded.
    pub fn complete_load(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Publication>, ClientError>,
    ) -> bool {
        if request.seq != self.latest_seq {
            tracing::debug!(
                stale = request.seq,
                latest = self.latest_seq,
                page = request.page,
                "discarding superseded page load"
            );
            return false;
        }

        let next = match result {
            Ok(mut items) => {
                let has_more = items.len() > self.page_size;
                items.truncate(self.page_size);
                PageState {
                    page_number: request.page,
                    page_size: self.page_size,
                    items,
                    has_more,
                    loading: false,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(page = request.page, error = %e, "failed to load publications page");
                PageState {
                    page_number: request.page,
                    page_size: self.page_size,
                    items: Vec::new(),
                    has_more: false,
                    loading: false,
                    error: Some(e.to_string()),
                }
            }
        };

        self.state = Arc::new(next);
        true
    }

    pub async fn load_page(&mut self, page: usize) -> Arc<PageState> {
        let request = self.begin_load(page);
        let result = self.source.list(request.skip, request.limit).await;
        self.complete_load(request, result);
        self.state()
    }

    /// Advance one page. Does nothing (and issues no fetch) when there is no
    /// next page.
    pub async fn next_page(&mut self) -> bool {
        if !self.state.has_more {
            return false;
        }
        let page = self.state.page_number.saturating_add(1);
        self.load_page(page).await;
        true
    }

    /// Go back one page. Does nothing on the first page.
    pub async fn prev_page(&mut self) -> bool {
        if self.state.page_number <= 1 {
            return false;
        }
        let page = self.state.page_number - 1;
        self.load_page(page).await;
        true
    }

    /// Store the filter text. Never triggers a fetch.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn visible(&self) -> Vec<(usize, &Publication)> {
        filter_page(&self.state.items, &self.query)
    }

    pub fn listing(&self) -> Listing<'_> {
        if let Some(error) = self.state.error.as_deref() {
            return Listing::Failed(error);
        }
        if self.state.items.is_empty() {
            return Listing::Empty;
        }
        let visible = self.visible();
        if visible.is_empty() {
            Listing::NoMatchesOnPage
        } else {
            Listing::Items(visible)
        }
    }

    /// Filtering only ever narrows the current page, so paging controls are
    /// hidden while a query is active.
    pub fn pagination_visible(&self) -> bool {
        self.query.is_empty()
    }
}
