//! JSON payloads shared by the HTTP handlers.
//!
//! Field names follow the public wire format: snake_case except for the
//! `createdAt`/`mergedAt` timestamps.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{
    Error, ErrorCode, PullRequest, PullRequestSummary, PullRequestTotals, Statistics, Team,
    TeamMember, User, UserAssignmentStats,
};

/// Error body nested under `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    #[schema(value_type = String, example = "NOT_FOUND")]
    pub code: ErrorCode,
    #[schema(example = "PR not found")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Error envelope returned for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    #[serde(rename = "traceId", default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl From<&Error> for ErrorResponse {
    fn from(value: &Error) -> Self {
        Self {
            error: ErrorDetail {
                code: value.code(),
                message: value.message().to_owned(),
                details: value.details().cloned(),
            },
            trace_id: value.trace_id().map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TeamMemberDto {
    #[schema(example = "u1")]
    pub user_id: String,
    #[schema(example = "Alice")]
    pub username: String,
    pub is_active: bool,
}

impl From<TeamMember> for TeamMemberDto {
    fn from(value: TeamMember) -> Self {
        Self {
            user_id: value.user_id.into_inner(),
            username: value.username.into_inner(),
            is_active: value.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TeamDto {
    #[schema(example = "backend")]
    pub team_name: String,
    pub members: Vec<TeamMemberDto>,
}

impl From<Team> for TeamDto {
    fn from(value: Team) -> Self {
        Self {
            team_name: value.name.into_inner(),
            members: value.members.into_iter().map(TeamMemberDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        Self {
            user_id: value.id.into_inner(),
            username: value.username.into_inner(),
            team_name: value.team_name.into_inner(),
            is_active: value.is_active,
        }
    }
}

/// Fully hydrated pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PullRequestDto {
    #[schema(example = "pr-1001")]
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    #[schema(example = "OPEN")]
    pub status: String,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "mergedAt", default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<String>,
}

impl From<PullRequest> for PullRequestDto {
    fn from(value: PullRequest) -> Self {
        Self {
            pull_request_id: value.id.into_inner(),
            pull_request_name: value.name.into_inner(),
            author_id: value.author_id.into_inner(),
            status: value.status.as_str().to_owned(),
            assigned_reviewers: value
                .assigned_reviewers
                .into_iter()
                .map(|id| id.into_inner())
                .collect(),
            created_at: Some(value.created_at.to_rfc3339()),
            merged_at: value.merged_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Short pull request listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PullRequestShortDto {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
}

impl From<PullRequestSummary> for PullRequestShortDto {
    fn from(value: PullRequestSummary) -> Self {
        Self {
            pull_request_id: value.id.into_inner(),
            pull_request_name: value.name.into_inner(),
            author_id: value.author_id.into_inner(),
            status: value.status.as_str().to_owned(),
        }
    }
}

/// `{"pr": ...}` wrapper used by pull request endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PullRequestEnvelope {
    pub pr: PullRequestDto,
}

impl From<PullRequest> for PullRequestEnvelope {
    fn from(value: PullRequest) -> Self {
        Self { pr: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserAssignmentStatsDto {
    pub user_id: String,
    pub username: String,
    pub total_assignments: u64,
    pub open_prs: u64,
    pub merged_prs: u64,
}

impl From<UserAssignmentStats> for UserAssignmentStatsDto {
    fn from(value: UserAssignmentStats) -> Self {
        Self {
            user_id: value.user_id.into_inner(),
            username: value.username.into_inner(),
            total_assignments: value.total_assignments,
            open_prs: value.open_prs,
            merged_prs: value.merged_prs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PullRequestTotalsDto {
    pub total_prs: u64,
    pub open_prs: u64,
    pub merged_prs: u64,
    pub prs_with_reviewers: u64,
    pub prs_without_reviewers: u64,
}

impl From<PullRequestTotals> for PullRequestTotalsDto {
    fn from(value: PullRequestTotals) -> Self {
        Self {
            total_prs: value.total_prs,
            open_prs: value.open_prs,
            merged_prs: value.merged_prs,
            prs_with_reviewers: value.prs_with_reviewers,
            prs_without_reviewers: value.prs_without_reviewers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatisticsDto {
    pub user_assignments: Vec<UserAssignmentStatsDto>,
    pub pr_statistics: PullRequestTotalsDto,
}

impl From<Statistics> for StatisticsDto {
    fn from(value: Statistics) -> Self {
        Self {
            user_assignments: value
                .user_assignments
                .into_iter()
                .map(UserAssignmentStatsDto::from)
                .collect(),
            pr_statistics: value.pull_requests.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PullRequestId, PullRequestName, PullRequestRecord, UserId};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn open_pull_request_omits_merged_at() {
        let created = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).single().expect("time");
        let record = PullRequestRecord::open(
            PullRequestId::new("pr-1").expect("id"),
            PullRequestName::new("Test").expect("name"),
            UserId::new("u1").expect("author"),
            created,
        );
        let dto = PullRequestDto::from(PullRequest::hydrate(
            record,
            vec![UserId::new("u2").expect("id")],
        ));
        let value = serde_json::to_value(dto).expect("serialise");
        assert_eq!(
            value,
            json!({
                "pull_request_id": "pr-1",
                "pull_request_name": "Test",
                "author_id": "u1",
                "status": "OPEN",
                "assigned_reviewers": ["u2"],
                "createdAt": "2025-01-02T03:04:05+00:00",
            })
        );
    }
}
