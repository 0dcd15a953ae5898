//! Live product search driver.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::debug;
use url::Url;

use super::debounce::{Debounce, DebounceEdges, SEARCH_DEBOUNCE, sleep_until};
use super::location::search_location;
use crate::medusa::{MedusaClient, MedusaError, ProductListParams, ProductPage};

/// Product lookup by free-text term.
pub trait ProductSearch: Send + Sync + 'static {
    /// Fetch the first page of products matching `term`. An empty term lists
    /// every product.
    fn search(&self, term: &str)
    -> impl Future<Output = Result<ProductPage, MedusaError>> + Send;
}

impl ProductSearch for MedusaClient {
    async fn search(&self, term: &str) -> Result<ProductPage, MedusaError> {
        self.list_products(&ProductListParams::search(term)).await
    }
}

/// Where a live search currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    /// Nothing pending or in flight.
    #[default]
    Idle,
    /// A term is waiting for the debounce window to close.
    PendingDebounce,
    /// At least one request is in flight.
    Fetching,
}

/// Debounce settings for a [`LiveSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSyncConfig {
    pub delay: Duration,
    pub edges: DebounceEdges,
}

impl Default for SearchSyncConfig {
    fn default() -> Self {
        Self {
            delay: SEARCH_DEBOUNCE,
            edges: DebounceEdges::BOTH,
        }
    }
}

/// A response that was applied.
#[derive(Debug)]
pub struct SearchResults {
    /// Dispatch order; strictly increasing across applied results.
    pub sequence: u64,
    pub term: String,
    pub page: Result<ProductPage, MedusaError>,
}

/// The search driver has shut down.
#[derive(Debug, thiserror::Error)]
#[error("live search is closed")]
pub struct LiveSearchClosed;

/// Search-as-you-type session.
///
/// Terms typed via [`type_term`](Self::type_term) are debounced; each
/// dispatched term rewrites the [`location`](Self::location) and starts a
/// fetch without waiting for earlier ones. Responses arriving after a newer
/// one has been applied are discarded.
#[derive(Debug)]
pub struct LiveSearch {
    input: Option<mpsc::Sender<String>>,
    phase: watch::Receiver<SearchPhase>,
    location: watch::Receiver<Url>,
    results: mpsc::Receiver<SearchResults>,
}

impl LiveSearch {
    /// Start a session whose location starts at `location`.
    #[must_use]
    pub fn spawn<S: ProductSearch>(
        search: Arc<S>,
        location: Url,
        config: SearchSyncConfig,
    ) -> Self {
        let (input_tx, input_rx) = mpsc::channel(64);
        let (phase_tx, phase_rx) = watch::channel(SearchPhase::Idle);
        let (location_tx, location_rx) = watch::channel(location);
        let (results_tx, results_rx) = mpsc::channel(16);

        let driver = Driver {
            search,
            debounce: Debounce::new(config.delay, config.edges),
            phase: phase_tx,
            location: location_tx,
            results: results_tx,
        };
        tokio::spawn(driver.run(input_rx));

        Self {
            input: Some(input_tx),
            phase: phase_rx,
            location: location_rx,
            results: results_rx,
        }
    }

    /// Record the search input's current value.
    ///
    /// # Errors
    ///
    /// Returns [`LiveSearchClosed`] after [`end_input`](Self::end_input).
    pub async fn type_term(&self, term: impl Into<String>) -> Result<(), LiveSearchClosed> {
        let input = self.input.as_ref().ok_or(LiveSearchClosed)?;
        input.send(term.into()).await.map_err(|_| LiveSearchClosed)
    }

    /// Stop accepting input. A pending term is dispatched immediately and
    /// [`next_results`](Self::next_results) returns `None` once every
    /// in-flight request has settled.
    pub fn end_input(&mut self) {
        self.input = None;
    }

    #[must_use]
    pub fn phase(&self) -> SearchPhase {
        *self.phase.borrow()
    }

    /// Watch phase transitions.
    #[must_use]
    pub fn phases(&self) -> watch::Receiver<SearchPhase> {
        self.phase.clone()
    }

    /// Location reflecting the most recently dispatched term.
    #[must_use]
    pub fn location(&self) -> Url {
        self.location.borrow().clone()
    }

    /// Wait for the next applied response.
    pub async fn next_results(&mut self) -> Option<SearchResults> {
        self.results.recv().await
    }
}

type Completion = (u64, String, Result<ProductPage, MedusaError>);

struct Driver<S> {
    search: Arc<S>,
    debounce: Debounce<String>,
    phase: watch::Sender<SearchPhase>,
    location: watch::Sender<Url>,
    results: mpsc::Sender<SearchResults>,
}

impl<S: ProductSearch> Driver<S> {
    async fn run(mut self, mut input: mpsc::Receiver<String>) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
        let mut input_open = true;
        let mut dispatched = 0u64;
        let mut applied = 0u64;
        let mut in_flight = 0usize;

        loop {
            self.publish_phase(in_flight);
            if !input_open && in_flight == 0 && !self.debounce.has_pending() {
                break;
            }

            let fire = tokio::select! {
                received = input.recv(), if input_open => match received {
                    Some(term) => self.debounce.push(term, Instant::now()),
                    None => {
                        input_open = false;
                        self.debounce.flush()
                    }
                },
                () = sleep_until(self.debounce.deadline()) => {
                    self.debounce.expire(Instant::now())
                }
                Some((sequence, term, page)) = done_rx.recv(), if in_flight > 0 => {
                    in_flight -= 1;
                    if sequence > applied {
                        applied = sequence;
                        let _ = self.results.send(SearchResults { sequence, term, page }).await;
                    } else {
                        debug!(sequence, applied, term = %term, "Discarding stale search response");
                    }
                    None
                }
            };

            if let Some(term) = fire {
                dispatched += 1;
                in_flight += 1;
                self.dispatch(dispatched, term, done_tx.clone());
            }
        }

        debug!(dispatched, applied, "Live search finished");
    }

    fn dispatch(&self, sequence: u64, term: String, done: mpsc::UnboundedSender<Completion>) {
        self.location.send_modify(|location| {
            *location = search_location(location, &term);
        });
        debug!(sequence, term = %term, "Dispatching search");

        let search = Arc::clone(&self.search);
        tokio::spawn(async move {
            let page = search.search(&term).await;
            let _ = done.send((sequence, term, page));
        });
    }

    fn publish_phase(&self, in_flight: usize) {
        let next = if self.debounce.has_pending() {
            SearchPhase::PendingDebounce
        } else if in_flight > 0 {
            SearchPhase::Fetching
        } else {
            SearchPhase::Idle
        };
        self.phase.send_if_modified(|phase| {
            let changed = *phase != next;
            *phase = next;
            changed
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Records every term and answers after a per-term latency.
    #[derive(Default)]
    struct FakeSearch {
        calls: Mutex<Vec<String>>,
        latency: HashMap<&'static str, Duration>,
    }

    impl FakeSearch {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProductSearch for FakeSearch {
        async fn search(&self, term: &str) -> Result<ProductPage, MedusaError> {
            self.calls.lock().unwrap().push(term.to_string());
            if let Some(latency) = self.latency.get(term) {
                tokio::time::sleep(*latency).await;
            }
            Ok(ProductPage {
                count: term.len() as u64,
                ..ProductPage::default()
            })
        }
    }

    fn base() -> Url {
        Url::parse("http://shop.test/").unwrap()
    }

    fn config(edges: DebounceEdges) -> SearchSyncConfig {
        SearchSyncConfig {
            delay: Duration::from_millis(200),
            edges,
        }
    }

    async fn drain(search: &mut LiveSearch) -> Vec<SearchResults> {
        search.end_input();
        let mut applied = Vec::new();
        while let Some(results) = search.next_results().await {
            applied.push(results);
        }
        applied
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_dispatches_leading_and_trailing_terms() {
        let backend = Arc::new(FakeSearch::default());
        let mut search = LiveSearch::spawn(
            Arc::clone(&backend),
            base(),
            config(DebounceEdges::BOTH),
        );

        for term in ["s", "sh", "shi"] {
            search.type_term(term).await.unwrap();
        }

        let first = search.next_results().await.unwrap();
        assert_eq!((first.sequence, first.term.as_str()), (1, "s"));
        let second = search.next_results().await.unwrap();
        assert_eq!((second.sequence, second.term.as_str()), (2, "shi"));
        assert_eq!(second.page.unwrap().count, 3);

        assert!(drain(&mut search).await.is_empty());
        assert_eq!(backend.calls(), ["s", "shi"]);
        assert_eq!(search.location().as_str(), "http://shop.test/?term=shi");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let backend = Arc::new(FakeSearch {
            latency: HashMap::from([
                ("s", Duration::from_millis(1000)),
                ("shirt", Duration::from_millis(10)),
            ]),
            ..FakeSearch::default()
        });
        let mut search = LiveSearch::spawn(
            Arc::clone(&backend),
            base(),
            config(DebounceEdges::TRAILING),
        );

        search.type_term("s").await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        search.type_term("shirt").await.unwrap();

        let applied = drain(&mut search).await;

        assert_eq!(backend.calls(), ["s", "shirt"]);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].sequence, 2);
        assert_eq!(applied[0].term, "shirt");
    }

    #[tokio::test(start_paused = true)]
    async fn test_leading_only_dispatches_once_per_burst() {
        let backend = Arc::new(FakeSearch::default());
        let mut search = LiveSearch::spawn(
            Arc::clone(&backend),
            base(),
            config(DebounceEdges::LEADING),
        );

        for term in ["s", "sh", "shi"] {
            search.type_term(term).await.unwrap();
        }
        let applied = drain(&mut search).await;

        assert_eq!(backend.calls(), ["s"]);
        assert_eq!(applied.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trailing_only_dispatches_once_per_burst() {
        let backend = Arc::new(FakeSearch::default());
        let mut search = LiveSearch::spawn(
            Arc::clone(&backend),
            base(),
            config(DebounceEdges::TRAILING),
        );

        for term in ["s", "sh", "shi"] {
            search.type_term(term).await.unwrap();
        }
        let results = search.next_results().await.unwrap();
        assert_eq!(results.term, "shi");

        assert!(drain(&mut search).await.is_empty());
        assert_eq!(backend.calls(), ["shi"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_transitions() {
        let backend = Arc::new(FakeSearch {
            latency: HashMap::from([("shirt", Duration::from_millis(100))]),
            ..FakeSearch::default()
        });
        let mut search = LiveSearch::spawn(
            Arc::clone(&backend),
            base(),
            config(DebounceEdges::TRAILING),
        );
        let mut phases = search.phases();
        assert_eq!(search.phase(), SearchPhase::Idle);

        search.type_term("shirt").await.unwrap();
        phases
            .wait_for(|phase| *phase == SearchPhase::PendingDebounce)
            .await
            .unwrap();
        phases
            .wait_for(|phase| *phase == SearchPhase::Fetching)
            .await
            .unwrap();

        search.next_results().await.unwrap();
        phases
            .wait_for(|phase| *phase == SearchPhase::Idle)
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_term_clears_location() {
        let backend = Arc::new(FakeSearch::default());
        let start = Url::parse("http://shop.test/?view=grid").unwrap();
        let mut search = LiveSearch::spawn(
            Arc::clone(&backend),
            start,
            config(DebounceEdges::TRAILING),
        );

        search.type_term("shirt").await.unwrap();
        search.next_results().await.unwrap();
        assert_eq!(
            search.location().as_str(),
            "http://shop.test/?view=grid&term=shirt"
        );

        search.type_term("").await.unwrap();
        search.next_results().await.unwrap();
        assert_eq!(search.location().as_str(), "http://shop.test/?view=grid");

        let applied = drain(&mut search).await;
        assert!(applied.is_empty());
        assert_eq!(backend.calls(), ["shirt", ""]);
    }

    #[tokio::test]
    async fn test_type_after_end_input_fails() {
        let mut search = LiveSearch::spawn(
            Arc::new(FakeSearch::default()),
            base(),
            SearchSyncConfig::default(),
        );
        search.end_input();
        assert!(matches!(search.type_term("s").await, Err(LiveSearchClosed)));
    }
}
