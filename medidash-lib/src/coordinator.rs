//! Reconciles search, filter and page input into one ordered stream of
//! fetches.
//!
//! The [`QueryCoordinator`] owns the current query intent and the state that
//! is shown to the user. Every fetch it issues is tagged with a sequence
//! number, and a response is only applied if it belongs to the most recently
//! issued fetch. Whatever order the network delivers responses in, the
//! visible page always reflects the latest intent.
//!
//! Rate limiter callbacks and fetch tasks never touch the coordinator. They
//! post events into its channel and the owner processes them one at a time
//! in [`QueryCoordinator::next_event`].
use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    ErrorKind, Gender, Patient, PatientPage, QueryDescriptor, Result, Stats,
    collection::RemoteCollection,
    ratelimit::{Debounce, RateLimitConfig, Throttle},
};

/// The snapshot of the patient list the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleState {
    /// Patients on the current page
    pub results: Vec<Patient>,
    /// One-based page, always within `1..=max(total_pages, 1)`
    pub page: u32,
    /// Number of pages reported by the last applied response
    pub total_pages: u32,
    /// Number of matching records reported by the last applied response
    pub total_count: u64,
}

impl Default for VisibleState {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            page: 1,
            total_pages: 1,
            total_count: 0,
        }
    }
}

impl VisibleState {
    fn apply(&mut self, requested_page: u32, response: PatientPage) {
        self.results = response.patients;
        self.total_pages = response.total_pages;
        self.total_count = response.total;
        self.page = requested_page.clamp(1, response.total_pages.max(1));
    }
}

/// What the coordinator did while processing its events.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// A fetch was sent to the remote collection
    Issued {
        /// Sequence number of the fetch
        seq: u64,
        /// What was asked for
        query: QueryDescriptor,
    },
    /// The response of the latest fetch replaced the visible state
    Applied {
        /// Sequence number of the fetch
        seq: u64,
        /// What was asked for
        query: QueryDescriptor,
    },
    /// A superseded response arrived and was discarded
    Stale {
        /// Sequence number of the discarded fetch
        seq: u64,
        /// What was asked for
        query: QueryDescriptor,
    },
    /// The latest fetch failed; the visible state was left untouched
    Failed {
        /// Sequence number of the fetch
        seq: u64,
        /// What was asked for
        query: QueryDescriptor,
        /// Why it failed
        error: ErrorKind,
    },
    /// New dashboard counters arrived
    StatsUpdated(Stats),
}

#[derive(Debug)]
enum Event {
    SearchSettled(String),
    FetchSettled {
        seq: u64,
        query: QueryDescriptor,
        result: Result<PatientPage>,
    },
    StatsSettled(Result<Stats>),
}

/// Search text, filter and page as the user last asked for them.
///
/// Kept as one record so every transition that must reset the page does so
/// in a single place.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QueryIntent {
    search_term: String,
    gender: Option<Gender>,
    page: u32,
}

impl Default for QueryIntent {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            gender: None,
            page: 1,
        }
    }
}

impl QueryIntent {
    fn search(&mut self, term: String) {
        self.search_term = term;
        self.page = 1;
    }

    /// Selecting the active filter again switches it off.
    fn toggle_gender(&mut self, gender: Option<Gender>) {
        self.gender = if gender.is_some() && gender == self.gender {
            None
        } else {
            gender
        };
        self.page = 1;
    }

    fn descriptor(&self) -> QueryDescriptor {
        QueryDescriptor {
            page: self.page,
            search_term: self.search_term.clone(),
            gender: self.gender,
        }
    }
}

/// Coordinates all queries against a [`RemoteCollection`].
///
/// All methods spawn tokio tasks and must be called from within a tokio
/// runtime.
pub struct QueryCoordinator<C> {
    collection: Arc<C>,
    intent: QueryIntent,
    search_input: String,
    sequence: u64,
    visible: VisibleState,
    stats: Stats,
    last_failure: Option<String>,
    in_flight: usize,
    stats_in_flight: usize,
    search: Debounce<String>,
    pages: Throttle<u32>,
    sender: UnboundedSender<Event>,
    events: UnboundedReceiver<Event>,
    outcomes: VecDeque<Outcome>,
}

impl<C: RemoteCollection> QueryCoordinator<C> {
    /// Create a coordinator on top of `collection`.
    ///
    /// Nothing is fetched until [`start`](Self::start) is called.
    pub fn new(collection: C, config: RateLimitConfig) -> Self {
        let (sender, events) = mpsc::unbounded_channel();

        let search_events = sender.clone();
        let search = Debounce::new(config.search_debounce, move |term| {
            let _ = search_events.send(Event::SearchSettled(term));
        });
        // The page change itself is applied by `set_page` once the throttle
        // lets it through.
        let pages = Throttle::new(config.page_throttle, |page| {
            log::trace!("Page {page} passed the throttle");
        });

        Self {
            collection: Arc::new(collection),
            intent: QueryIntent::default(),
            search_input: String::new(),
            sequence: 0,
            visible: VisibleState::default(),
            stats: Stats::default(),
            last_failure: None,
            in_flight: 0,
            stats_in_flight: 0,
            search,
            pages,
            sender,
            events,
            outcomes: VecDeque::new(),
        }
    }

    /// Issue the initial query and stats fetch.
    pub fn start(&mut self) -> u64 {
        self.refresh_stats();
        self.issue_query()
    }

    /// Update the search text.
    ///
    /// The text is visible through [`search_input`](Self::search_input)
    /// right away. The query follows once the input has been quiet for the
    /// configured debounce period, starting again from page 1.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        self.search_input.clone_from(&term);
        self.search.call(term);
    }

    /// Toggle the gender filter and query page 1 immediately.
    ///
    /// Passing the filter that is already active clears it. `None` always
    /// clears the filter and still issues a query.
    pub fn set_gender_filter(&mut self, gender: Option<Gender>) -> u64 {
        self.intent.toggle_gender(gender);
        self.issue_query()
    }

    /// Request another page.
    ///
    /// Returns `false` if `page` is outside `1..=total_pages` or if a page
    /// change was accepted less than the throttle period ago. An accepted
    /// change is queried right away, so a later filter or search change
    /// always starts again from page 1.
    pub fn set_page(&mut self, page: u32) -> bool {
        if page < 1 || page > self.visible.total_pages {
            log::debug!(
                "Ignoring page {page}, outside 1..={}",
                self.visible.total_pages
            );
            return false;
        }
        if !self.pages.call(page) {
            return false;
        }
        self.intent.page = page;
        self.issue_query();
        true
    }

    /// Re-issue the current query and reload the stats, bypassing the rate
    /// limiters.
    pub fn refresh(&mut self) -> u64 {
        self.refresh_stats();
        self.issue_query()
    }

    /// Reload the dashboard counters.
    pub fn refresh_stats(&mut self) {
        self.stats_in_flight += 1;
        let collection = Arc::clone(&self.collection);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = collection.fetch_stats().await;
            let _ = sender.send(Event::StatsSettled(result));
        });
    }

    /// Cancel pending search and page input. Both limiters refuse further
    /// calls; fetches already in flight still settle.
    pub fn dispose(&mut self) {
        self.search.dispose();
        self.pages.dispose();
    }

    /// Wait for the next thing to happen and apply it.
    ///
    /// This is cancel-safe: an event is either fully processed and its
    /// outcome returned, or left in the channel.
    pub async fn next_event(&mut self) -> Outcome {
        loop {
            if let Some(outcome) = self.outcomes.pop_front() {
                return outcome;
            }
            match self.events.recv().await {
                Some(event) => self.handle(event),
                // The coordinator holds a sender, so the channel stays open
                None => return std::future::pending().await,
            }
        }
    }

    /// Process events until no search is pending and every fetch has
    /// settled, returning everything that happened.
    pub async fn settle(&mut self) -> Vec<Outcome> {
        let mut outcomes: Vec<_> = self.outcomes.drain(..).collect();
        while !self.is_idle() {
            if let Some(event) = self.events.recv().await {
                self.handle(event);
            }
            outcomes.extend(self.outcomes.drain(..));
        }
        outcomes
    }

    /// `true` if no input is pending and no fetch is outstanding
    #[must_use]
    pub fn is_idle(&self) -> bool {
        // Check the debouncer before the channel: a timer that fires in
        // between has already posted its event.
        !self.search.is_pending()
            && self.in_flight == 0
            && self.stats_in_flight == 0
            && self.events.is_empty()
            && self.outcomes.is_empty()
    }

    /// The currently displayed page
    #[must_use]
    pub const fn visible(&self) -> &VisibleState {
        &self.visible
    }

    /// The query the coordinator currently wants to display
    #[must_use]
    pub fn query(&self) -> QueryDescriptor {
        self.intent.descriptor()
    }

    /// The search text as typed, before debouncing
    #[must_use]
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// The last dashboard counters received
    #[must_use]
    pub const fn stats(&self) -> Stats {
        self.stats
    }

    /// Why the latest fetch failed, until a later one succeeds
    #[must_use]
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Number of list fetches that have not settled yet
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Sequence number of the most recently issued fetch
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    fn issue_query(&mut self) -> u64 {
        self.sequence += 1;
        let seq = self.sequence;
        let query = self.intent.descriptor();
        log::debug!("Issuing query #{seq}: {query}");

        self.in_flight += 1;
        let collection = Arc::clone(&self.collection);
        let sender = self.sender.clone();
        let request = query.clone();
        tokio::spawn(async move {
            let result = collection.fetch(&request).await;
            let _ = sender.send(Event::FetchSettled {
                seq,
                query: request,
                result,
            });
        });

        self.outcomes.push_back(Outcome::Issued { seq, query });
        seq
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::SearchSettled(term) => {
                self.intent.search(term);
                self.issue_query();
            }
            Event::FetchSettled { seq, query, result } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.reconcile(seq, query, result);
            }
            Event::StatsSettled(result) => {
                self.stats_in_flight = self.stats_in_flight.saturating_sub(1);
                match result {
                    Ok(stats) => {
                        self.stats = stats;
                        self.outcomes.push_back(Outcome::StatsUpdated(stats));
                    }
                    Err(e) => log::warn!("Fetching stats failed: {e}"),
                }
            }
        }
    }

    fn reconcile(&mut self, seq: u64, query: QueryDescriptor, result: Result<PatientPage>) {
        if seq != self.sequence {
            log::debug!(
                "Discarding response #{seq} ({query}), superseded by #{}",
                self.sequence
            );
            self.outcomes.push_back(Outcome::Stale { seq, query });
            return;
        }

        match result {
            Ok(page) => {
                if query.is_unfiltered() {
                    self.stats.total = page.total;
                }
                self.visible.apply(query.page, page);
                self.last_failure = None;
                self.outcomes.push_back(Outcome::Applied { seq, query });
            }
            Err(error) => {
                log::warn!("Fetching {query} failed: {error}");
                self.last_failure = Some(error.to_string());
                self.outcomes
                    .push_back(Outcome::Failed { seq, query, error });
            }
        }
    }
}

impl<C> std::fmt::Debug for QueryCoordinator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCoordinator")
            .field("intent", &self.intent)
            .field("sequence", &self.sequence)
            .field("visible", &self.visible)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}
