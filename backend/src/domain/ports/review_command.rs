//! Driving port for review lifecycle mutations.
//!
//! Inbound adapters call [`ReviewCommand`] to register teams, toggle users and
//! move pull requests through their lifecycle. Every method is one atomic
//! operation except [`ReviewCommand::safe_reassign_open_prs`], which commits
//! each reassignment on its own.

use async_trait::async_trait;

use crate::domain::{
    Error, PullRequest, PullRequestId, PullRequestName, ReviewAssignment, Team, TeamMember,
    TeamName, User, UserId,
};

/// Request to register a team and upsert its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTeamRequest {
    pub name: TeamName,
    pub members: Vec<TeamMember>,
}

/// Request to open a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePullRequestRequest {
    pub id: PullRequestId,
    pub name: PullRequestName,
    pub author_id: UserId,
}

/// Successful reassignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub pull_request: PullRequest,
    pub replaced_by: UserId,
}

/// Outcome of one attempted reassignment inside a best-effort pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ReassignmentAttempt {
    pub assignment: ReviewAssignment,
    /// The replacement reviewer, or the failure that kept the old one.
    pub result: Result<UserId, Error>,
}

/// Report produced by [`ReviewCommand::safe_reassign_open_prs`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SafeReassignReport {
    pub attempts: Vec<ReassignmentAttempt>,
}

impl SafeReassignReport {
    /// Number of assignments successfully replaced.
    pub fn reassigned(&self) -> usize {
        self.attempts.iter().filter(|a| a.result.is_ok()).count()
    }

    /// Attempts that left the inactive reviewer in place.
    pub fn failures(&self) -> impl Iterator<Item = &ReassignmentAttempt> {
        self.attempts.iter().filter(|a| a.result.is_err())
    }
}

/// Result of deactivating team members and repairing their assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamDeactivation {
    /// Users that existed in the team and were marked inactive.
    pub deactivated: Vec<UserId>,
    pub report: SafeReassignReport,
}

/// Domain use-case port for review lifecycle mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewCommand: Send + Sync {
    /// Register a team. Members already stored elsewhere move to this team.
    async fn create_team(&self, request: CreateTeamRequest) -> Result<Team, Error>;

    async fn set_user_active(&self, user_id: &UserId, is_active: bool) -> Result<User, Error>;

    /// Mark listed members of `team` inactive, skipping ids that do not exist
    /// or belong to another team. Returns the ids actually deactivated.
    async fn bulk_deactivate_users(
        &self,
        team: &TeamName,
        user_ids: &[UserId],
    ) -> Result<Vec<UserId>, Error>;

    /// Replace inactive reviewers from `user_ids` on every open pull request,
    /// tolerating individual failures.
    async fn safe_reassign_open_prs(&self, user_ids: &[UserId])
    -> Result<SafeReassignReport, Error>;

    /// Deactivate members then repair their open assignments.
    async fn deactivate_team_members(
        &self,
        team: &TeamName,
        user_ids: &[UserId],
    ) -> Result<TeamDeactivation, Error>;

    async fn create_pull_request(
        &self,
        request: CreatePullRequestRequest,
    ) -> Result<PullRequest, Error>;

    /// Merge a pull request. Merging a merged pull request is a no-op.
    async fn merge_pull_request(&self, id: &PullRequestId) -> Result<PullRequest, Error>;

    async fn reassign_reviewer(
        &self,
        id: &PullRequestId,
        old_reviewer: &UserId,
    ) -> Result<Reassignment, Error>;
}
