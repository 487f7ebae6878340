//! PostgreSQL-backed review store.
//!
//! Each [`ReviewTransaction`] owns a pooled connection with an open database
//! transaction. Commit or rollback finishes it and hands the connection back
//! to the pool in a reusable state. A transaction dropped without either
//! leaves the connection mid-transaction, which the pool treats as broken and
//! discards; the server then rolls the work back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{exists, now};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use tracing::debug;

use crate::domain::ports::{ReviewStore, ReviewStoreError, ReviewTransaction};
use crate::domain::{
    PullRequestId, PullRequestRecord, PullRequestStatus, PullRequestSummary, PullRequestTotals,
    ReviewAssignment, Statistics, TeamName, User, UserAssignmentStats, UserId,
};

use super::models::{
    NewPullRequestRow, NewReviewerRow, NewTeamRow, PullRequestRow, PullRequestTotalsRow,
    UserRow, UserStatsRow, UserUpsertRow, pull_request_id_from_row, user_id_from_row,
};
use super::pool::{DbPool, OwnedConnection, PoolError};
use super::schema::{pr_reviewers, pull_requests, teams, users};

const USER_STATS_SQL: &str = "\
    SELECT u.user_id, u.username, \
           COUNT(prr.reviewer_id) AS total_assignments, \
           COUNT(*) FILTER (WHERE pr.status = 'OPEN') AS open_prs, \
           COUNT(*) FILTER (WHERE pr.status = 'MERGED') AS merged_prs \
    FROM users u \
    LEFT JOIN pr_reviewers prr ON u.user_id = prr.reviewer_id \
    LEFT JOIN pull_requests pr ON prr.pull_request_id = pr.pull_request_id \
    GROUP BY u.user_id, u.username \
    ORDER BY total_assignments DESC, u.username";

const PULL_REQUEST_TOTALS_SQL: &str = "\
    SELECT COUNT(*) AS total_prs, \
           COUNT(*) FILTER (WHERE p.status = 'OPEN') AS open_prs, \
           COUNT(*) FILTER (WHERE p.status = 'MERGED') AS merged_prs, \
           COUNT(*) FILTER (WHERE EXISTS ( \
               SELECT 1 FROM pr_reviewers r WHERE r.pull_request_id = p.pull_request_id \
           )) AS prs_with_reviewers \
    FROM pull_requests p";

/// Diesel-backed implementation of [`ReviewStore`].
#[derive(Clone)]
pub struct DieselReviewStore {
    pool: DbPool,
}

impl DieselReviewStore {
    /// Create a store over the given pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use pr_reviewer::outbound::persistence::{DbPool, DieselReviewStore, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/reviews")).await?;
    /// let store = DieselReviewStore::new(pool);
    /// # let _ = store;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ReviewStoreError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    let error_message = error.to_string();
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error_message, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            ReviewStoreError::conflict(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            ReviewStoreError::connection(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => ReviewStoreError::query(info.message().to_owned()),
        _ => ReviewStoreError::query(error_message),
    }
}

#[async_trait]
impl ReviewStore for DieselReviewStore {
    async fn begin(&self) -> Result<Box<dyn ReviewTransaction>, ReviewStoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Box::new(DieselReviewTransaction { conn }))
    }

    async fn ping(&self) -> Result<(), ReviewStoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        diesel::sql_query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

struct DieselReviewTransaction {
    conn: OwnedConnection,
}

impl DieselReviewTransaction {
    fn conn(&mut self) -> &mut AsyncPgConnection {
        &mut self.conn
    }
}

#[async_trait]
impl ReviewTransaction for DieselReviewTransaction {
    async fn team_exists(&mut self, team: &TeamName) -> Result<bool, ReviewStoreError> {
        diesel::select(exists(teams::table.find(team.as_str())))
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn insert_team(&mut self, team: &TeamName) -> Result<(), ReviewStoreError> {
        diesel::insert_into(teams::table)
            .values(&NewTeamRow {
                team_name: team.as_str(),
            })
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn upsert_user(&mut self, user: &User) -> Result<(), ReviewStoreError> {
        diesel::insert_into(users::table)
            .values(&UserUpsertRow::from(user))
            .on_conflict(users::user_id)
            .do_update()
            .set((
                users::username.eq(excluded(users::username)),
                users::team_name.eq(excluded(users::team_name)),
                users::is_active.eq(excluded(users::is_active)),
                users::updated_at.eq(now),
            ))
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, ReviewStoreError> {
        users::table
            .find(id.as_str())
            .select(UserRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn list_team_members(&mut self, team: &TeamName) -> Result<Vec<User>, ReviewStoreError> {
        users::table
            .filter(users::team_name.eq(team.as_str()))
            .order(users::user_id.asc())
            .select(UserRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn set_user_active(
        &mut self,
        id: &UserId,
        is_active: bool,
    ) -> Result<Option<User>, ReviewStoreError> {
        diesel::update(users::table.find(id.as_str()))
            .set((users::is_active.eq(is_active), users::updated_at.eq(now)))
            .returning(UserRow::as_returning())
            .get_result(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn pull_request_exists(&mut self, id: &PullRequestId) -> Result<bool, ReviewStoreError> {
        diesel::select(exists(pull_requests::table.find(id.as_str())))
            .get_result(self.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn insert_pull_request(
        &mut self,
        record: &PullRequestRecord,
    ) -> Result<(), ReviewStoreError> {
        diesel::insert_into(pull_requests::table)
            .values(&NewPullRequestRow::from(record))
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_pull_request(
        &mut self,
        id: &PullRequestId,
    ) -> Result<Option<PullRequestRecord>, ReviewStoreError> {
        pull_requests::table
            .find(id.as_str())
            .select(PullRequestRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(PullRequestRecord::try_from)
            .transpose()
    }

    async fn lock_pull_request(
        &mut self,
        id: &PullRequestId,
    ) -> Result<Option<PullRequestRecord>, ReviewStoreError> {
        pull_requests::table
            .find(id.as_str())
            .select(PullRequestRow::as_select())
            .for_update()
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(PullRequestRecord::try_from)
            .transpose()
    }

    async fn mark_merged(
        &mut self,
        id: &PullRequestId,
        merged_at: DateTime<Utc>,
    ) -> Result<(), ReviewStoreError> {
        let updated = diesel::update(pull_requests::table.find(id.as_str()))
            .set((
                pull_requests::status.eq(PullRequestStatus::Merged.as_str()),
                pull_requests::merged_at.eq(Some(merged_at)),
            ))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(ReviewStoreError::query(format!(
                "pull request {id} does not exist"
            )));
        }
        Ok(())
    }

    async fn list_reviewers(
        &mut self,
        id: &PullRequestId,
    ) -> Result<Vec<UserId>, ReviewStoreError> {
        pr_reviewers::table
            .filter(pr_reviewers::pull_request_id.eq(id.as_str()))
            .order(pr_reviewers::reviewer_id.asc())
            .select(pr_reviewers::reviewer_id)
            .load::<String>(self.conn())
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(user_id_from_row)
            .collect()
    }

    async fn is_reviewer(
        &mut self,
        id: &PullRequestId,
        reviewer: &UserId,
    ) -> Result<bool, ReviewStoreError> {
        diesel::select(exists(
            pr_reviewers::table.find((id.as_str(), reviewer.as_str())),
        ))
        .get_result(self.conn())
        .await
        .map_err(map_diesel_error)
    }

    async fn insert_reviewer(
        &mut self,
        id: &PullRequestId,
        reviewer: &UserId,
    ) -> Result<(), ReviewStoreError> {
        diesel::insert_into(pr_reviewers::table)
            .values(&NewReviewerRow {
                pull_request_id: id.as_str(),
                reviewer_id: reviewer.as_str(),
            })
            .execute(self.conn())
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn replace_reviewer(
        &mut self,
        id: &PullRequestId,
        old: &UserId,
        new: &UserId,
    ) -> Result<bool, ReviewStoreError> {
        let updated = diesel::update(pr_reviewers::table.find((id.as_str(), old.as_str())))
            .set((
                pr_reviewers::reviewer_id.eq(new.as_str()),
                pr_reviewers::assigned_at.eq(now),
            ))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }

    async fn active_team_members_excluding(
        &mut self,
        team: &TeamName,
        exclude: &[UserId],
    ) -> Result<Vec<UserId>, ReviewStoreError> {
        let excluded_ids: Vec<&str> = exclude.iter().map(UserId::as_str).collect();
        users::table
            .filter(users::team_name.eq(team.as_str()))
            .filter(users::is_active.eq(true))
            .filter(users::user_id.ne_all(excluded_ids))
            .order(users::user_id.asc())
            .select(users::user_id)
            .load::<String>(self.conn())
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(user_id_from_row)
            .collect()
    }

    async fn open_assignments_of_inactive(
        &mut self,
        user_ids: &[UserId],
    ) -> Result<Vec<ReviewAssignment>, ReviewStoreError> {
        let ids: Vec<&str> = user_ids.iter().map(UserId::as_str).collect();
        pr_reviewers::table
            .inner_join(pull_requests::table)
            .inner_join(users::table)
            .filter(pr_reviewers::reviewer_id.eq_any(ids))
            .filter(pull_requests::status.eq(PullRequestStatus::Open.as_str()))
            .filter(users::is_active.eq(false))
            .select((pr_reviewers::pull_request_id, pr_reviewers::reviewer_id))
            .distinct()
            .order((
                pr_reviewers::pull_request_id.asc(),
                pr_reviewers::reviewer_id.asc(),
            ))
            .load::<(String, String)>(self.conn())
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|(pr, reviewer)| {
                Ok(ReviewAssignment {
                    pull_request_id: pull_request_id_from_row(pr)?,
                    reviewer_id: user_id_from_row(reviewer)?,
                })
            })
            .collect()
    }

    async fn pull_requests_reviewed_by(
        &mut self,
        reviewer: &UserId,
    ) -> Result<Vec<PullRequestSummary>, ReviewStoreError> {
        pull_requests::table
            .inner_join(pr_reviewers::table)
            .filter(pr_reviewers::reviewer_id.eq(reviewer.as_str()))
            .order((
                pull_requests::created_at.desc(),
                pull_requests::pull_request_id.asc(),
            ))
            .select(PullRequestRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(PullRequestSummary::try_from)
            .collect()
    }

    async fn statistics(&mut self) -> Result<Statistics, ReviewStoreError> {
        let users = diesel::sql_query(USER_STATS_SQL)
            .load::<UserStatsRow>(self.conn())
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(UserAssignmentStats::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let totals = diesel::sql_query(PULL_REQUEST_TOTALS_SQL)
            .get_result::<PullRequestTotalsRow>(self.conn())
            .await
            .map_err(map_diesel_error)
            .and_then(PullRequestTotals::try_from)?;
        Ok(Statistics::new(users, totals))
    }

    async fn commit(self: Box<Self>) -> Result<(), ReviewStoreError> {
        let mut this = self;
        AnsiTransactionManager::commit_transaction(this.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(self: Box<Self>) -> Result<(), ReviewStoreError> {
        let mut this = self;
        AnsiTransactionManager::rollback_transaction(this.conn())
            .await
            .map_err(map_diesel_error)
    }
}
