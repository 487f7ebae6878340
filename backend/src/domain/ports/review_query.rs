//! Driving port for read-only review queries.

use async_trait::async_trait;

use crate::domain::{Error, PullRequest, PullRequestId, PullRequestSummary, Statistics, Team, TeamName, UserId};

/// Domain use-case port for read-only lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewQuery: Send + Sync {
    /// Team with members ordered by user id.
    async fn get_team(&self, name: &TeamName) -> Result<Team, Error>;

    async fn get_pull_request(&self, id: &PullRequestId) -> Result<PullRequest, Error>;

    /// Pull requests of any status currently assigned to `user_id`, newest
    /// first.
    async fn user_review_queue(&self, user_id: &UserId)
    -> Result<Vec<PullRequestSummary>, Error>;

    async fn statistics(&self) -> Result<Statistics, Error>;
}
