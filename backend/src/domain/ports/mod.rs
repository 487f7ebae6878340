//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod random_source;
mod review_command;
mod review_query;
mod review_store;

#[cfg(test)]
pub use random_source::MockRandomSource;
pub use random_source::{FixtureRandomSource, RandomSource};
#[cfg(test)]
pub use review_command::MockReviewCommand;
pub use review_command::{
    CreatePullRequestRequest, CreateTeamRequest, Reassignment, ReassignmentAttempt,
    ReviewCommand, SafeReassignReport, TeamDeactivation,
};
#[cfg(test)]
pub use review_query::MockReviewQuery;
pub use review_query::ReviewQuery;
#[cfg(test)]
pub use review_store::MockReviewStore;
pub use review_store::{ReviewStore, ReviewStoreError, ReviewTransaction};
