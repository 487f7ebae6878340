//! Driven port for team, user and pull request storage.
//!
//! All reads and writes of one logical operation go through a single
//! [`ReviewTransaction`]. Changes become visible only after
//! [`ReviewTransaction::commit`]. [`ReviewTransaction::rollback`] discards
//! them and releases the underlying connection cleanly; a transaction dropped
//! without either is also discarded, at the cost of the connection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    PullRequestId, PullRequestRecord, PullRequestSummary, ReviewAssignment, Statistics, TeamName,
    User, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by review store adapters.
    pub enum ReviewStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "review store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "review store query failed: {message}",
        /// A uniqueness constraint rejected the write.
        Conflict { message: String } =>
            "review store conflict: {message}",
    }
}

/// Factory for atomic units of work.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Open a new transaction.
    async fn begin(&self) -> Result<Box<dyn ReviewTransaction>, ReviewStoreError>;

    /// Cheap reachability probe used by readiness checks.
    async fn ping(&self) -> Result<(), ReviewStoreError>;
}

/// One atomic unit of work against the store.
///
/// List-returning methods yield users and reviewers in ascending id order.
#[async_trait]
pub trait ReviewTransaction: Send {
    async fn team_exists(&mut self, team: &TeamName) -> Result<bool, ReviewStoreError>;

    async fn insert_team(&mut self, team: &TeamName) -> Result<(), ReviewStoreError>;

    /// Insert the user or overwrite name, team and active flag.
    async fn upsert_user(&mut self, user: &User) -> Result<(), ReviewStoreError>;

    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, ReviewStoreError>;

    async fn list_team_members(&mut self, team: &TeamName) -> Result<Vec<User>, ReviewStoreError>;

    /// Update the active flag, returning the updated user when it exists.
    async fn set_user_active(
        &mut self,
        id: &UserId,
        is_active: bool,
    ) -> Result<Option<User>, ReviewStoreError>;

    async fn pull_request_exists(&mut self, id: &PullRequestId) -> Result<bool, ReviewStoreError>;

    async fn insert_pull_request(
        &mut self,
        record: &PullRequestRecord,
    ) -> Result<(), ReviewStoreError>;

    async fn find_pull_request(
        &mut self,
        id: &PullRequestId,
    ) -> Result<Option<PullRequestRecord>, ReviewStoreError>;

    /// Fetch a pull request and hold it against concurrent mutation until
    /// the transaction ends.
    async fn lock_pull_request(
        &mut self,
        id: &PullRequestId,
    ) -> Result<Option<PullRequestRecord>, ReviewStoreError>;

    async fn mark_merged(
        &mut self,
        id: &PullRequestId,
        merged_at: DateTime<Utc>,
    ) -> Result<(), ReviewStoreError>;

    async fn list_reviewers(&mut self, id: &PullRequestId)
    -> Result<Vec<UserId>, ReviewStoreError>;

    async fn is_reviewer(
        &mut self,
        id: &PullRequestId,
        reviewer: &UserId,
    ) -> Result<bool, ReviewStoreError>;

    async fn insert_reviewer(
        &mut self,
        id: &PullRequestId,
        reviewer: &UserId,
    ) -> Result<(), ReviewStoreError>;

    /// Rewrite the `(id, old)` assignment to `(id, new)` in place.
    ///
    /// Returns `false` when no `(id, old)` assignment exists.
    async fn replace_reviewer(
        &mut self,
        id: &PullRequestId,
        old: &UserId,
        new: &UserId,
    ) -> Result<bool, ReviewStoreError>;

    /// Active members of `team` not listed in `exclude`.
    async fn active_team_members_excluding(
        &mut self,
        team: &TeamName,
        exclude: &[UserId],
    ) -> Result<Vec<UserId>, ReviewStoreError>;

    /// Distinct open-PR assignments held by inactive users from `users`,
    /// ordered by pull request id then reviewer id.
    async fn open_assignments_of_inactive(
        &mut self,
        users: &[UserId],
    ) -> Result<Vec<ReviewAssignment>, ReviewStoreError>;

    /// Pull requests reviewed by `reviewer`, newest first.
    async fn pull_requests_reviewed_by(
        &mut self,
        reviewer: &UserId,
    ) -> Result<Vec<PullRequestSummary>, ReviewStoreError>;

    async fn statistics(&mut self) -> Result<Statistics, ReviewStoreError>;

    /// Make every change of this transaction visible.
    async fn commit(self: Box<Self>) -> Result<(), ReviewStoreError>;

    /// Discard every change of this transaction.
    async fn rollback(self: Box<Self>) -> Result<(), ReviewStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ReviewStoreError::connection("refused"), "review store connection failed: refused")]
    #[case(ReviewStoreError::query("syntax"), "review store query failed: syntax")]
    #[case(ReviewStoreError::conflict("pr_reviewers_pkey"), "review store conflict: pr_reviewers_pkey")]
    fn errors_render_context(#[case] error: ReviewStoreError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }
}
