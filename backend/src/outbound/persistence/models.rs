//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; conversions into domain types
//! re-validate identifiers so corrupted rows surface as query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::ports::ReviewStoreError;
use crate::domain::{
    PullRequestId, PullRequestName, PullRequestRecord, PullRequestSummary, PullRequestTotals,
    TeamName, User, UserAssignmentStats, UserId, Username,
};

use super::schema::{pr_reviewers, pull_requests, teams, users};

fn corrupt(err: impl std::fmt::Display) -> ReviewStoreError {
    ReviewStoreError::query(format!("stored row failed validation: {err}"))
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = teams)]
pub(crate) struct NewTeamRow<'a> {
    pub team_name: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl TryFrom<UserRow> for User {
    type Error = ReviewStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(row.user_id).map_err(corrupt)?,
            username: Username::new(row.username).map_err(corrupt)?,
            team_name: TeamName::new(row.team_name).map_err(corrupt)?,
            is_active: row.is_active,
        })
    }
}

/// Insert-or-update payload for users.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpsertRow<'a> {
    pub user_id: &'a str,
    pub username: &'a str,
    pub team_name: &'a str,
    pub is_active: bool,
}

impl<'a> From<&'a User> for UserUpsertRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            user_id: user.id.as_str(),
            username: user.username.as_str(),
            team_name: user.team_name.as_str(),
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pull_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PullRequestRow {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl TryFrom<PullRequestRow> for PullRequestRecord {
    type Error = ReviewStoreError;

    fn try_from(row: PullRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PullRequestId::new(row.pull_request_id).map_err(corrupt)?,
            name: PullRequestName::new(row.pull_request_name).map_err(corrupt)?,
            author_id: UserId::new(row.author_id).map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            created_at: row.created_at,
            merged_at: row.merged_at,
        })
    }
}

impl TryFrom<PullRequestRow> for PullRequestSummary {
    type Error = ReviewStoreError;

    fn try_from(row: PullRequestRow) -> Result<Self, Self::Error> {
        PullRequestRecord::try_from(row).map(Self::from)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pull_requests)]
pub(crate) struct NewPullRequestRow<'a> {
    pub pull_request_id: &'a str,
    pub pull_request_name: &'a str,
    pub author_id: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a PullRequestRecord> for NewPullRequestRow<'a> {
    fn from(record: &'a PullRequestRecord) -> Self {
        Self {
            pull_request_id: record.id.as_str(),
            pull_request_name: record.name.as_str(),
            author_id: record.author_id.as_str(),
            status: record.status.as_str(),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pr_reviewers)]
pub(crate) struct NewReviewerRow<'a> {
    pub pull_request_id: &'a str,
    pub reviewer_id: &'a str,
}

/// Per-user assignment counts from the statistics query.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct UserStatsRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub user_id: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub username: String,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub total_assignments: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub open_prs: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub merged_prs: i64,
}

impl TryFrom<UserStatsRow> for UserAssignmentStats {
    type Error = ReviewStoreError;

    fn try_from(row: UserStatsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(row.user_id).map_err(corrupt)?,
            username: Username::new(row.username).map_err(corrupt)?,
            total_assignments: count(row.total_assignments)?,
            open_prs: count(row.open_prs)?,
            merged_prs: count(row.merged_prs)?,
        })
    }
}

/// Pull request totals from the statistics query.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct PullRequestTotalsRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub total_prs: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub open_prs: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub merged_prs: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub prs_with_reviewers: i64,
}

impl TryFrom<PullRequestTotalsRow> for PullRequestTotals {
    type Error = ReviewStoreError;

    fn try_from(row: PullRequestTotalsRow) -> Result<Self, Self::Error> {
        let total_prs = count(row.total_prs)?;
        let prs_with_reviewers = count(row.prs_with_reviewers)?;
        Ok(Self {
            total_prs,
            open_prs: count(row.open_prs)?,
            merged_prs: count(row.merged_prs)?,
            prs_with_reviewers,
            prs_without_reviewers: total_prs.saturating_sub(prs_with_reviewers),
        })
    }
}

fn count(raw: i64) -> Result<u64, ReviewStoreError> {
    u64::try_from(raw).map_err(corrupt)
}

pub(crate) fn user_id_from_row(raw: String) -> Result<UserId, ReviewStoreError> {
    UserId::new(raw).map_err(corrupt)
}

pub(crate) fn pull_request_id_from_row(raw: String) -> Result<PullRequestId, ReviewStoreError> {
    PullRequestId::new(raw).map_err(corrupt)
}
