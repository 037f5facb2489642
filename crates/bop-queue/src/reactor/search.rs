//! Search results view state.

use bop_proto::gateway::GatewayError;
use bop_proto::protocol::QueueItem;
use bop_proto::query::QueryFilter;
use tracing::debug;

use crate::message::Effect;
use crate::widgets::paged_list::PagedList;

/// How a `SearchLoaded` message changed the results.
#[derive(Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Superseded by a newer request.
    Stale,
    Loaded(usize),
    /// Paging past the last result page; previous results kept.
    Exhausted,
    Failed(String),
}

pub struct SearchState {
    filter: Option<QueryFilter>,
    /// Zero-based; the wire carries `page + 1`.
    page: u32,
    pending_page: u32,
    request: u64,
    in_flight: bool,
    pub results: PagedList<QueueItem>,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            filter: None,
            page: 0,
            pending_page: 0,
            request: 0,
            in_flight: false,
            results: PagedList::new(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start a fresh search at the first page.
    pub fn begin(&mut self, filter: QueryFilter) -> Effect {
        self.filter = Some(filter);
        self.request_page(0)
    }

    /// Drop the active search and its results. Bumps the request counter so
    /// a response still in flight is treated as stale.
    pub fn clear(&mut self) {
        self.request += 1;
        self.filter = None;
        self.page = 0;
        self.pending_page = 0;
        self.in_flight = false;
        self.results.set_items(Vec::new());
    }

    /// Request the page `delta` away from the current one. `None` when there
    /// is no active search or the page would go below the first.
    pub fn turn_page(&mut self, delta: i64) -> Option<Effect> {
        self.filter.as_ref()?;
        let target = self.page as i64 + delta;
        if target < 0 {
            return None;
        }
        Some(self.request_page(target as u32))
    }

    fn request_page(&mut self, page: u32) -> Effect {
        self.request += 1;
        self.pending_page = page;
        self.in_flight = true;
        let filter = self
            .filter
            .as_ref()
            .map(|f| f.with_page(page + 1))
            .unwrap_or_default();
        debug!("search #{} page {}: {:?}", self.request, page + 1, filter);
        Effect::Search {
            request: self.request,
            filter,
        }
    }

    pub fn accept(
        &mut self,
        request: u64,
        result: Result<Vec<QueueItem>, GatewayError>,
    ) -> SearchOutcome {
        if request != self.request {
            debug!("dropping stale search result #{}", request);
            return SearchOutcome::Stale;
        }
        self.in_flight = false;
        match result {
            Ok(items) if items.is_empty() && self.pending_page > 0 => SearchOutcome::Exhausted,
            Ok(items) => {
                let count = items.len();
                self.page = self.pending_page;
                self.results.set_items(items);
                self.results.select(0);
                SearchOutcome::Loaded(count)
            }
            Err(e) => SearchOutcome::Failed(e.to_string()),
        }
    }

    /// Ids on the visible results page.
    pub fn page_ids(&self) -> Vec<String> {
        self.results
            .page_items()
            .into_iter()
            .map(|(_, item)| item.id.clone())
            .collect()
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}
