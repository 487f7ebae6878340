//! Read-only aggregation over assignments and pull requests.

use super::{UserId, Username};

/// Assignment counts for a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAssignmentStats {
    pub user_id: UserId,
    pub username: Username,
    pub total_assignments: u64,
    pub open_prs: u64,
    pub merged_prs: u64,
}

/// Totals across all pull requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullRequestTotals {
    pub total_prs: u64,
    pub open_prs: u64,
    pub merged_prs: u64,
    pub prs_with_reviewers: u64,
    pub prs_without_reviewers: u64,
}

/// Service-wide statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    pub user_assignments: Vec<UserAssignmentStats>,
    pub pull_requests: PullRequestTotals,
}

impl Statistics {
    /// Build statistics, ordering users by total assignments descending and
    /// then by username.
    pub fn new(mut user_assignments: Vec<UserAssignmentStats>, pull_requests: PullRequestTotals) -> Self {
        user_assignments.sort_by(|a, b| {
            b.total_assignments
                .cmp(&a.total_assignments)
                .then_with(|| a.username.cmp(&b.username))
        });
        Self {
            user_assignments,
            pull_requests,
        }
    }
}
