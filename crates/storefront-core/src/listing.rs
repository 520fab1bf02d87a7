//! Paginated listings (category products, search results).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use storefront_data::{FetchClient, FetchError};

use crate::pagination::PaginationState;
use crate::routing::keys;
use crate::ticket::{Ticket, Tickets};

/// One page of results as returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub page_size: i64,
    pub results: Vec<T>,
}

/// The current page of a listing plus its pagination window.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    state: PaginationState,
    results: Vec<T>,
    window: Vec<i64>,
    tickets: Tickets,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            state: PaginationState::default(),
            results: Vec::new(),
            window: Vec::new(),
            tickets: Tickets::new(),
        }
    }
}

impl<T: DeserializeOwned> Listing<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn page_number(&self) -> i64 {
        self.state.page_number
    }

    pub fn results(&self) -> &[T] {
        &self.results
    }

    /// Page links around the current page.
    pub fn window(&self) -> &[i64] {
        &self.window
    }

    pub fn pages_count(&self) -> i64 {
        self.state.pages_count()
    }

    pub fn is_loading(&self) -> bool {
        self.tickets.is_loading()
    }

    pub fn begin(&mut self) -> Ticket {
        self.tickets.begin()
    }

    /// Apply a fetched page. Failure goes back to page 1 with no results.
    pub fn apply(&mut self, ticket: Ticket, result: Result<Page<T>, FetchError>) -> bool {
        if !self.tickets.finish(ticket) {
            return false;
        }
        match result {
            Ok(page) => {
                self.state =
                    PaginationState::new(self.state.page_number, page.page_size, page.count);
                self.results = page.results;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load listing");
                self.state.page_number = 1;
                self.results.clear();
            }
        }
        self.window = self.state.window();
        true
    }

    /// Fetch the listing at `endpoint` (which may already carry a query).
    pub async fn get_data_result(&mut self, client: &FetchClient, endpoint: &str) -> bool {
        let ticket = self.begin();
        let result = client.get(endpoint).fetch_json().await;
        self.apply(ticket, result)
    }

    /// Go to `page` and fetch it.
    pub async fn change_page(&mut self, client: &FetchClient, endpoint: &str, page: i64) -> bool {
        self.state.page_number = page.max(1);
        let ticket = self.begin();
        let result = client
            .get(endpoint)
            .query(keys::PAGE, self.state.page_number.to_string())
            .fetch_json()
            .await;
        self.apply(ticket, result)
    }
}
