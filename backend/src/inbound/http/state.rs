//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ReviewCommand, ReviewQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub commands: Arc<dyn ReviewCommand>,
    pub queries: Arc<dyn ReviewQuery>,
}

impl HttpState {
    /// Construct state from the driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use pr_reviewer::domain::ports::FixtureRandomSource;
    /// use pr_reviewer::domain::{DEFAULT_MAX_REVIEWERS, ReviewService, ReviewerSelector};
    /// use pr_reviewer::inbound::http::state::HttpState;
    /// use pr_reviewer::outbound::memory::InMemoryReviewStore;
    ///
    /// let selector = ReviewerSelector::new(Arc::new(FixtureRandomSource), DEFAULT_MAX_REVIEWERS);
    /// let service = Arc::new(ReviewService::new(
    ///     Arc::new(InMemoryReviewStore::new()),
    ///     selector,
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(service.clone(), service);
    /// let _queries = state.queries.clone();
    /// ```
    pub fn new(commands: Arc<dyn ReviewCommand>, queries: Arc<dyn ReviewQuery>) -> Self {
        Self { commands, queries }
    }
}
