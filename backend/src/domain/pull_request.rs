//! Pull requests and their lifecycle state.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{PullRequestId, PullRequestName, UserId};

/// Lifecycle status. `Open -> Merged` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PullRequestStatus {
    Open,
    Merged,
}

impl PullRequestStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }

    pub fn is_merged(self) -> bool {
        matches!(self, Self::Merged)
    }
}

impl fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pull request status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for PullRequestStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            other => Err(ParseStatusError(other.to_owned())),
        }
    }
}

/// Stored pull request row, without its reviewers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    pub id: PullRequestId,
    pub name: PullRequestName,
    pub author_id: UserId,
    pub status: PullRequestStatus,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequestRecord {
    /// A fresh open pull request created at `now`.
    pub fn open(
        id: PullRequestId,
        name: PullRequestName,
        author_id: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            author_id,
            status: PullRequestStatus::Open,
            created_at: now,
            merged_at: None,
        }
    }
}

/// Pull request together with its assigned reviewers.
///
/// Reviewers are kept in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub id: PullRequestId,
    pub name: PullRequestName,
    pub author_id: UserId,
    pub status: PullRequestStatus,
    pub assigned_reviewers: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Combine a stored row with its reviewer set.
    pub fn hydrate(record: PullRequestRecord, mut reviewers: Vec<UserId>) -> Self {
        reviewers.sort();
        reviewers.dedup();
        Self {
            id: record.id,
            name: record.name,
            author_id: record.author_id,
            status: record.status,
            assigned_reviewers: reviewers,
            created_at: record.created_at,
            merged_at: record.merged_at,
        }
    }
}

/// Short listing entry used by reviewer queues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSummary {
    pub id: PullRequestId,
    pub name: PullRequestName,
    pub author_id: UserId,
    pub status: PullRequestStatus,
}

impl From<PullRequestRecord> for PullRequestSummary {
    fn from(value: PullRequestRecord) -> Self {
        Self {
            id: value.id,
            name: value.name,
            author_id: value.author_id,
            status: value.status,
        }
    }
}

/// One (pull request, reviewer) assignment pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReviewAssignment {
    pub pull_request_id: PullRequestId,
    pub reviewer_id: UserId,
}
