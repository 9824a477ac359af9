//! Search controller.
//!
//! Owns the filter state and turns user input into search requests:
//!
//! ```text
//! Idle ──change──▶ Debouncing ──delay──▶ Loading ──▶ Success | Error
//!                      ▲                                 │
//!                      └────────────change───────────────┘
//! ```
//!
//! Criteria changes wait for the debounce delay, page changes fire at once.
//! Every request carries a sequence number and only the most recently
//! started request may commit its response.

pub mod sequence;
pub mod state;

pub use sequence::RequestSequence;
pub use state::{SearchResults, SearchState, SearchStatus};

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use menfess_oauth::{ClientCredentialsFlow, TokenCache, TokenSource};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::enrich::MetadataEnricher;
use crate::error::Result;
use crate::filter::{FilterChange, FilterState, FilterUpdate, QueryBuilder, RequestDescriptor};
use crate::message::Page;
use crate::service::{HttpSearchService, HttpTrackService, SearchError, SearchService, TrackService};

/// Rejected page navigation. No request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// Page 0 was requested.
    #[error("Pages start at 1")]
    Zero,

    /// Page lies past the last known page.
    #[error("Page {requested} is past the last page ({total_pages})")]
    OutOfRange {
        /// Requested page.
        requested: u32,
        /// Last page reported by the service.
        total_pages: u32,
    },
}

/// Controller wired to the HTTP services.
pub type HttpSearchController =
    SearchController<HttpSearchService, HttpTrackService, ClientCredentialsFlow>;

#[derive(Debug)]
struct DebounceTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Whether a request identical to the one in flight is sent again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reissue {
    /// Skip it; the pending response will answer the same question.
    IfChanged,
    /// Send it anyway with a new sequence number.
    Always,
}

#[derive(Debug)]
struct InFlight {
    seq: u64,
    descriptor: RequestDescriptor,
}

#[derive(Debug, Default)]
struct Core {
    filter: FilterState,
    debounce: Option<DebounceTimer>,
    debounce_generation: u64,
    /// The latest started request, until it settles.
    in_flight: Option<InFlight>,
}

impl Core {
    fn cancel_debounce(&mut self) -> bool {
        self.debounce.take().is_some_and(|timer| {
            timer.handle.abort();
            true
        })
    }
}

struct Inner<B, T, S> {
    search: B,
    enricher: MetadataEnricher<T, S>,
    debounce: Duration,
    sequence: RequestSequence,
    core: Mutex<Core>,
    state: watch::Sender<SearchState>,
}

impl<B, T, S> Inner<B, T, S> {
    fn core(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes a state change, always syncing the current filter.
    fn publish(&self, core: &Core, change: impl FnOnce(&mut SearchState)) {
        self.state.send_modify(|state| {
            state.filter.clone_from(&core.filter);
            change(state);
        });
    }

    fn known_total_pages(&self, filter: &FilterState) -> Option<u32> {
        self.state
            .borrow()
            .results
            .as_ref()
            .filter(|results| results.filter.same_criteria(filter))
            .map(|results| results.page.total_pages)
    }
}

impl<B, T, S> Inner<B, T, S>
where
    B: SearchService,
    T: TrackService,
    S: TokenSource + 'static,
{
    fn schedule_debounce(self: &Arc<Self>, core: &mut Core) {
        core.cancel_debounce();
        core.debounce_generation += 1;
        let generation = core.debounce_generation;

        // Deadline is fixed here, not when the task is first polled.
        let timer = tokio::time::sleep(self.debounce);
        let inner = Arc::clone(self);
        let handle = tokio::spawn(async move {
            timer.await;
            inner.debounce_elapsed(generation);
        });

        core.debounce = Some(DebounceTimer { generation, handle });
        self.publish(core, |state| state.status = SearchStatus::Debouncing);
    }

    fn debounce_elapsed(self: &Arc<Self>, generation: u64) {
        let mut core = self.core();
        if core
            .debounce
            .as_ref()
            .is_none_or(|timer| timer.generation != generation)
        {
            return;
        }
        core.debounce = None;
        self.dispatch(&mut core, Reissue::IfChanged);
    }

    fn dispatch(self: &Arc<Self>, core: &mut Core, reissue: Reissue) {
        let descriptor = QueryBuilder::build(&core.filter);

        if reissue == Reissue::IfChanged
            && core
                .in_flight
                .as_ref()
                .is_some_and(|in_flight| in_flight.descriptor == descriptor)
        {
            debug!(query = %descriptor, "identical request already in flight");
            self.publish(core, |state| state.status = SearchStatus::Loading);
            return;
        }

        let seq = self.sequence.next();
        debug!(seq, query = %descriptor, "search started");
        core.in_flight = Some(InFlight {
            seq,
            descriptor: descriptor.clone(),
        });
        self.publish(core, |state| state.status = SearchStatus::Loading);

        let filter = core.filter.clone();
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            inner.run(seq, filter, descriptor).await;
        });
    }

    async fn run(self: Arc<Self>, seq: u64, filter: FilterState, descriptor: RequestDescriptor) {
        let outcome = match self.search.search(&descriptor).await {
            Ok(response) if self.sequence.is_latest(seq) => {
                let items = self.enricher.enrich_page(response.data).await;
                Ok(Page {
                    items,
                    current_page: filter.page.get(),
                    total_pages: response.total_pages,
                    total_items: response.total_items,
                })
            }
            Ok(_) => {
                debug!(seq, "response superseded before enrichment, dropping");
                return;
            }
            Err(e) => Err(e),
        };
        self.commit(seq, filter, outcome);
    }

    fn commit(&self, seq: u64, filter: FilterState, outcome: std::result::Result<Page, SearchError>) {
        let mut core = self.core();
        if !self.sequence.is_latest(seq) {
            debug!(seq, latest = self.sequence.current(), "dropping superseded response");
            return;
        }
        if core.in_flight.as_ref().is_some_and(|in_flight| in_flight.seq == seq) {
            core.in_flight = None;
        }

        // A newer change is already waiting; show the data but stay Debouncing.
        let debouncing = core.debounce.is_some();

        match outcome {
            Ok(page) => {
                info!(
                    seq,
                    page = page.current_page,
                    total_pages = page.total_pages,
                    items = page.items.len(),
                    "search committed"
                );
                self.publish(&core, |state| {
                    state.status = if debouncing {
                        SearchStatus::Debouncing
                    } else {
                        SearchStatus::Success
                    };
                    state.error = None;
                    state.results = Some(SearchResults { page, filter });
                });
            }
            Err(e) => {
                warn!(seq, "search failed: {e}");
                let message = e.to_string();
                self.publish(&core, |state| {
                    state.status = if debouncing {
                        SearchStatus::Debouncing
                    } else {
                        SearchStatus::Error
                    };
                    state.error = Some(message);
                });
            }
        }
    }
}

/// Debounced, paginated search over a [`SearchService`], enriching results
/// through a [`MetadataEnricher`].
///
/// Must be created and used inside a Tokio runtime. Dropping the controller
/// cancels a pending debounce timer; requests already in flight run to
/// completion but their results go nowhere.
pub struct SearchController<B, T, S> {
    inner: Arc<Inner<B, T, S>>,
}

impl<B, T, S> SearchController<B, T, S>
where
    B: SearchService,
    T: TrackService,
    S: TokenSource + 'static,
{
    /// Creates an idle controller starting from `filter`.
    #[must_use]
    pub fn new(
        search: B,
        enricher: MetadataEnricher<T, S>,
        filter: FilterState,
        debounce: Duration,
    ) -> Self {
        let (state, _) = watch::channel(SearchState {
            filter: filter.clone(),
            ..SearchState::default()
        });
        Self {
            inner: Arc::new(Inner {
                search,
                enricher,
                debounce,
                sequence: RequestSequence::new(),
                core: Mutex::new(Core {
                    filter,
                    ..Core::default()
                }),
                state,
            }),
        }
    }

    /// Receiver that sees every published state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    /// Current filter.
    #[must_use]
    pub fn filter(&self) -> FilterState {
        self.inner.core().filter.clone()
    }

    /// The enricher used for result pages.
    #[must_use]
    pub fn enricher(&self) -> &MetadataEnricher<T, S> {
        &self.inner.enricher
    }

    /// Applies a change from the search controls.
    ///
    /// Criteria changes reset the page to 1 and (re)start the debounce
    /// timer. An update that only moves the page is handled like
    /// [`go_to_page`](Self::go_to_page).
    ///
    /// # Errors
    ///
    /// Returns `PageError` if a page-only update is out of range.
    pub fn on_filter_change(&self, update: FilterUpdate) -> std::result::Result<(), PageError> {
        let mut core = self.inner.core();
        let mut next = core.filter.clone();
        match next.apply(update) {
            FilterChange::Unchanged => Ok(()),
            FilterChange::Page => {
                drop(core);
                self.go_to_page(next.page.get())
            }
            FilterChange::Criteria => {
                debug!(term = %next.term, field = %next.search_field, "filter changed");
                core.filter = next;
                self.inner.schedule_debounce(&mut core);
                Ok(())
            }
        }
    }

    /// Jumps to `page` immediately, bypassing the debounce delay.
    ///
    /// # Errors
    ///
    /// Returns `PageError` without sending anything if `page` is 0 or past
    /// the last page of the displayed results.
    pub fn go_to_page(&self, page: u32) -> std::result::Result<(), PageError> {
        let page = NonZeroU32::new(page).ok_or(PageError::Zero)?;
        let mut core = self.inner.core();

        if let Some(total_pages) = self.inner.known_total_pages(&core.filter) {
            if page.get() > total_pages.max(1) {
                debug!(requested = page.get(), total_pages, "page out of range");
                return Err(PageError::OutOfRange {
                    requested: page.get(),
                    total_pages,
                });
            }
        }

        core.filter.page = page;
        core.cancel_debounce();
        self.inner.dispatch(&mut core, Reissue::IfChanged);
        Ok(())
    }

    /// Moves one page forward.
    ///
    /// # Errors
    ///
    /// Returns `PageError` if already on the last page.
    pub fn next_page(&self) -> std::result::Result<(), PageError> {
        let current = self.inner.core().filter.page.get();
        self.go_to_page(current.saturating_add(1))
    }

    /// Moves one page back.
    ///
    /// # Errors
    ///
    /// Returns `PageError::Zero` if already on the first page.
    pub fn previous_page(&self) -> std::result::Result<(), PageError> {
        let current = self.inner.core().filter.page.get();
        self.go_to_page(current - 1)
    }

    /// Sends the current filter now, skipping any pending debounce.
    ///
    /// Used for the initial load and to retry after an error or a request
    /// that never answers: it is always sent, even if an identical request
    /// is still pending. Displayed results stay until the response commits.
    pub fn refresh(&self) {
        let mut core = self.inner.core();
        core.cancel_debounce();
        self.inner.dispatch(&mut core, Reissue::Always);
    }

    /// Clears displayed results and errors, then sends the current filter.
    pub fn fresh_search(&self) {
        let mut core = self.inner.core();
        core.cancel_debounce();
        self.inner.publish(&core, |state| {
            state.results = None;
            state.error = None;
        });
        self.inner.dispatch(&mut core, Reissue::Always);
    }

    /// Cancels a pending debounce timer.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }
}

impl<B, T, S> Inner<B, T, S> {
    fn shutdown(&self) {
        let mut core = self.core();
        if core.cancel_debounce() {
            debug!("debounce timer cancelled");
            let status = if core.in_flight.is_some() {
                SearchStatus::Loading
            } else {
                SearchStatus::Idle
            };
            self.publish(&core, |state| state.status = status);
        }
    }
}

impl<B, T, S> Drop for SearchController<B, T, S> {
    fn drop(&mut self) {
        self.inner.shutdown();
    }
}

impl HttpSearchController {
    /// Builds a controller talking to the configured HTTP services.
    ///
    /// Missing provider credentials are not an error here: enrichment is
    /// then skipped for every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("menfess/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let search = HttpSearchService::new(config.search_url()?, http_client.clone());
        let tracks = HttpTrackService::new(config.provider()?, http_client.clone());
        let tokens = Arc::new(TokenCache::new(ClientCredentialsFlow::new(
            config.oauth_client(http_client)?,
        )));

        Ok(Self::new(
            search,
            MetadataEnricher::new(tracks, tokens),
            FilterState::new(config.page_size()),
            config.debounce(),
        ))
    }
}
