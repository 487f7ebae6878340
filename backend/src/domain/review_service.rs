//! Review lifecycle service.
//!
//! Implements the [`ReviewCommand`] and [`ReviewQuery`] driving ports on top of
//! a [`ReviewStore`]. Each operation runs inside one store transaction that is
//! committed on success and rolled back on failure, so a failed step leaves
//! the store untouched and the connection reusable.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CreatePullRequestRequest, CreateTeamRequest, Reassignment, ReassignmentAttempt,
    ReviewCommand, ReviewQuery, ReviewStore, ReviewStoreError, ReviewTransaction,
    SafeReassignReport, TeamDeactivation,
};
use crate::domain::{
    Error, PullRequest, PullRequestId, PullRequestRecord, PullRequestStatus, PullRequestSummary,
    ReviewerSelector, Statistics, Team, TeamMember, TeamName, User, UserId,
};

/// Translate a store failure into a domain error.
///
/// Connection failures surface as `SERVICE_UNAVAILABLE`; everything else is an
/// internal error.
pub(crate) fn map_store_error(error: ReviewStoreError) -> Error {
    debug!(error = %error, "review store failure");
    match error {
        ReviewStoreError::Connection { message } => {
            Error::service_unavailable(format!("review store unavailable: {message}"))
        }
        ReviewStoreError::Query { message } => {
            Error::internal(format!("review store error: {message}"))
        }
        ReviewStoreError::Conflict { message } => {
            Error::internal(format!("unexpected review store conflict: {message}"))
        }
    }
}

/// Lifecycle controller for teams, users and pull requests.
#[derive(Clone)]
pub struct ReviewService<S> {
    store: Arc<S>,
    selector: ReviewerSelector,
    clock: Arc<dyn Clock>,
}

impl<S> ReviewService<S> {
    pub fn new(store: Arc<S>, selector: ReviewerSelector, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            selector,
            clock,
        }
    }

    /// Current time at the precision the stores persist.
    fn now(&self) -> DateTime<Utc> {
        self.clock.utc().trunc_subsecs(6)
    }
}

impl<S> ReviewService<S>
where
    S: ReviewStore,
{
    async fn begin(&self) -> Result<Box<dyn ReviewTransaction>, Error> {
        self.store.begin().await.map_err(map_store_error)
    }

    /// Commit on success, roll back on failure.
    ///
    /// A rollback failure is logged and the original error is returned.
    async fn finish<T>(
        tx: Box<dyn ReviewTransaction>,
        outcome: Result<T, Error>,
    ) -> Result<T, Error> {
        match outcome {
            Ok(value) => {
                tx.commit().await.map_err(map_store_error)?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(
                        error = %rollback_error,
                        code = %error.code(),
                        "transaction rollback failed"
                    );
                }
                Err(error)
            }
        }
    }

    async fn require_pull_request(
        tx: &mut dyn ReviewTransaction,
        id: &PullRequestId,
    ) -> Result<PullRequestRecord, Error> {
        tx.lock_pull_request(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("PR not found"))
    }

    async fn hydrate(
        tx: &mut dyn ReviewTransaction,
        record: PullRequestRecord,
    ) -> Result<PullRequest, Error> {
        let reviewers = tx.list_reviewers(&record.id).await.map_err(map_store_error)?;
        Ok(PullRequest::hydrate(record, reviewers))
    }

    async fn create_team_in(
        tx: &mut dyn ReviewTransaction,
        name: TeamName,
        members: Vec<TeamMember>,
    ) -> Result<Team, Error> {
        if tx.team_exists(&name).await.map_err(map_store_error)? {
            return Err(Error::team_exists("team_name already exists"));
        }
        tx.insert_team(&name).await.map_err(|err| {
            if err.is_conflict() {
                Error::team_exists("team_name already exists")
            } else {
                map_store_error(err)
            }
        })?;
        for member in members {
            let user = member.into_user(&name);
            tx.upsert_user(&user).await.map_err(map_store_error)?;
        }
        let stored = tx.list_team_members(&name).await.map_err(map_store_error)?;
        Ok(Team::from_users(name, stored))
    }

    async fn bulk_deactivate_in(
        tx: &mut dyn ReviewTransaction,
        team: &TeamName,
        user_ids: &[UserId],
    ) -> Result<Vec<UserId>, Error> {
        if !tx.team_exists(team).await.map_err(map_store_error)? {
            return Err(Error::not_found("team not found"));
        }
        let mut deactivated = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            if deactivated.contains(user_id) {
                continue;
            }
            let Some(user) = tx.find_user(user_id).await.map_err(map_store_error)? else {
                debug!(user_id = %user_id, "skipping unknown user");
                continue;
            };
            if &user.team_name != team {
                debug!(user_id = %user_id, team = %team, "skipping user from another team");
                continue;
            }
            tx.set_user_active(user_id, false)
                .await
                .map_err(map_store_error)?;
            deactivated.push(user_id.clone());
        }
        Ok(deactivated)
    }

    async fn create_pull_request_in(
        &self,
        tx: &mut dyn ReviewTransaction,
        request: CreatePullRequestRequest,
    ) -> Result<PullRequest, Error> {
        let CreatePullRequestRequest {
            id,
            name,
            author_id,
        } = request;
        if tx.pull_request_exists(&id).await.map_err(map_store_error)? {
            return Err(Error::pr_exists("PR id already exists"));
        }
        let author = tx
            .find_user(&author_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("author not found"))?;

        let record = PullRequestRecord::open(id, name, author.id.clone(), self.now());
        tx.insert_pull_request(&record).await.map_err(|err| {
            if err.is_conflict() {
                Error::pr_exists("PR id already exists")
            } else {
                map_store_error(err)
            }
        })?;

        let reviewers = self
            .selector
            .select_initial_reviewers(tx, &author.team_name, &author.id)
            .await?;
        for reviewer in &reviewers {
            tx.insert_reviewer(&record.id, reviewer)
                .await
                .map_err(map_store_error)?;
        }
        Ok(PullRequest::hydrate(record, reviewers))
    }

    /// Returns the hydrated pull request and whether this call merged it.
    async fn merge_in(
        &self,
        tx: &mut dyn ReviewTransaction,
        id: &PullRequestId,
    ) -> Result<(PullRequest, bool), Error> {
        let mut record = Self::require_pull_request(tx, id).await?;
        if record.status.is_merged() {
            return Ok((Self::hydrate(tx, record).await?, false));
        }
        let merged_at = self.now();
        tx.mark_merged(id, merged_at).await.map_err(map_store_error)?;
        record.status = PullRequestStatus::Merged;
        record.merged_at = Some(merged_at);
        Ok((Self::hydrate(tx, record).await?, true))
    }

    async fn reassign_in(
        &self,
        tx: &mut dyn ReviewTransaction,
        id: &PullRequestId,
        old_reviewer: &UserId,
    ) -> Result<Reassignment, Error> {
        let record = Self::require_pull_request(tx, id).await?;
        if record.status.is_merged() {
            return Err(Error::pr_merged("cannot reassign on merged PR"));
        }
        if !tx.is_reviewer(id, old_reviewer).await.map_err(map_store_error)? {
            return Err(Error::not_assigned("reviewer is not assigned to this PR"));
        }
        let old_user = tx
            .find_user(old_reviewer)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("old reviewer not found"))?;

        let mut exclude = tx.list_reviewers(id).await.map_err(map_store_error)?;
        for extra in [old_reviewer, &record.author_id] {
            if !exclude.contains(extra) {
                exclude.push(extra.clone());
            }
        }
        let replacement = self
            .selector
            .select_replacement(tx, &old_user.team_name, &exclude)
            .await?;

        if !tx
            .replace_reviewer(id, old_reviewer, &replacement)
            .await
            .map_err(map_store_error)?
        {
            return Err(Error::not_assigned("reviewer is not assigned to this PR"));
        }
        Ok(Reassignment {
            pull_request: Self::hydrate(tx, record).await?,
            replaced_by: replacement,
        })
    }

    async fn get_team_in(tx: &mut dyn ReviewTransaction, name: &TeamName) -> Result<Team, Error> {
        if !tx.team_exists(name).await.map_err(map_store_error)? {
            return Err(Error::not_found("team not found"));
        }
        let members = tx.list_team_members(name).await.map_err(map_store_error)?;
        Ok(Team::from_users(name.clone(), members))
    }

    async fn get_pull_request_in(
        tx: &mut dyn ReviewTransaction,
        id: &PullRequestId,
    ) -> Result<PullRequest, Error> {
        let record = tx
            .find_pull_request(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("PR not found"))?;
        Self::hydrate(tx, record).await
    }

    async fn review_queue_in(
        tx: &mut dyn ReviewTransaction,
        user_id: &UserId,
    ) -> Result<Vec<PullRequestSummary>, Error> {
        if tx.find_user(user_id).await.map_err(map_store_error)?.is_none() {
            return Err(Error::not_found("user not found"));
        }
        tx.pull_requests_reviewed_by(user_id)
            .await
            .map_err(map_store_error)
    }
}

#[async_trait]
impl<S> ReviewCommand for ReviewService<S>
where
    S: ReviewStore,
{
    async fn create_team(&self, request: CreateTeamRequest) -> Result<Team, Error> {
        let CreateTeamRequest { name, members } = request;
        let member_count = members.len();
        let mut tx = self.begin().await?;
        let outcome = Self::create_team_in(tx.as_mut(), name, members).await;
        let team = Self::finish(tx, outcome).await?;

        info!(team = %team.name, members = member_count, "team created");
        Ok(team)
    }

    async fn set_user_active(&self, user_id: &UserId, is_active: bool) -> Result<User, Error> {
        let mut tx = self.begin().await?;
        let outcome = tx
            .set_user_active(user_id, is_active)
            .await
            .map_err(map_store_error)
            .and_then(|user| user.ok_or_else(|| Error::not_found("user not found")));
        let user = Self::finish(tx, outcome).await?;

        info!(user_id = %user_id, is_active, "user activity updated");
        Ok(user)
    }

    async fn bulk_deactivate_users(
        &self,
        team: &TeamName,
        user_ids: &[UserId],
    ) -> Result<Vec<UserId>, Error> {
        let mut tx = self.begin().await?;
        let outcome = Self::bulk_deactivate_in(tx.as_mut(), team, user_ids).await;
        let deactivated = Self::finish(tx, outcome).await?;

        info!(team = %team, deactivated = deactivated.len(), "team members deactivated");
        Ok(deactivated)
    }

    async fn safe_reassign_open_prs(
        &self,
        user_ids: &[UserId],
    ) -> Result<SafeReassignReport, Error> {
        if user_ids.is_empty() {
            return Ok(SafeReassignReport::default());
        }
        let mut tx = self.begin().await?;
        let outcome = tx
            .open_assignments_of_inactive(user_ids)
            .await
            .map_err(map_store_error);
        let pending = Self::finish(tx, outcome).await?;

        let mut attempts = Vec::with_capacity(pending.len());
        for assignment in pending {
            let result = self
                .reassign_reviewer(&assignment.pull_request_id, &assignment.reviewer_id)
                .await
                .map(|done| done.replaced_by);
            if let Err(error) = &result {
                warn!(
                    pr_id = %assignment.pull_request_id,
                    reviewer_id = %assignment.reviewer_id,
                    code = %error.code(),
                    "reassignment skipped; inactive reviewer kept"
                );
            }
            attempts.push(ReassignmentAttempt { assignment, result });
        }

        let report = SafeReassignReport { attempts };
        info!(
            attempted = report.attempts.len(),
            reassigned = report.reassigned(),
            "open pull requests reassigned"
        );
        Ok(report)
    }

    async fn deactivate_team_members(
        &self,
        team: &TeamName,
        user_ids: &[UserId],
    ) -> Result<TeamDeactivation, Error> {
        let deactivated = self.bulk_deactivate_users(team, user_ids).await?;
        let report = match self.safe_reassign_open_prs(&deactivated).await {
            Ok(report) => report,
            Err(error) => {
                warn!(team = %team, code = %error.code(), "reassignment pass failed");
                SafeReassignReport::default()
            }
        };
        Ok(TeamDeactivation {
            deactivated,
            report,
        })
    }

    async fn create_pull_request(
        &self,
        request: CreatePullRequestRequest,
    ) -> Result<PullRequest, Error> {
        let mut tx = self.begin().await?;
        let outcome = self.create_pull_request_in(tx.as_mut(), request).await;
        let pull_request = Self::finish(tx, outcome).await?;

        info!(
            pr_id = %pull_request.id,
            author_id = %pull_request.author_id,
            reviewers = pull_request.assigned_reviewers.len(),
            "pull request created"
        );
        Ok(pull_request)
    }

    async fn merge_pull_request(&self, id: &PullRequestId) -> Result<PullRequest, Error> {
        let mut tx = self.begin().await?;
        let outcome = self.merge_in(tx.as_mut(), id).await;
        let (pull_request, merged_now) = Self::finish(tx, outcome).await?;

        if merged_now {
            info!(pr_id = %id, "pull request merged");
        } else {
            debug!(pr_id = %id, "pull request already merged");
        }
        Ok(pull_request)
    }

    async fn reassign_reviewer(
        &self,
        id: &PullRequestId,
        old_reviewer: &UserId,
    ) -> Result<Reassignment, Error> {
        let mut tx = self.begin().await?;
        let outcome = self.reassign_in(tx.as_mut(), id, old_reviewer).await;
        let reassignment = Self::finish(tx, outcome).await?;

        info!(
            pr_id = %id,
            old_reviewer_id = %old_reviewer,
            reviewer_id = %reassignment.replaced_by,
            "reviewer reassigned"
        );
        Ok(reassignment)
    }
}

#[async_trait]
impl<S> ReviewQuery for ReviewService<S>
where
    S: ReviewStore,
{
    async fn get_team(&self, name: &TeamName) -> Result<Team, Error> {
        let mut tx = self.begin().await?;
        let outcome = Self::get_team_in(tx.as_mut(), name).await;
        Self::finish(tx, outcome).await
    }

    async fn get_pull_request(&self, id: &PullRequestId) -> Result<PullRequest, Error> {
        let mut tx = self.begin().await?;
        let outcome = Self::get_pull_request_in(tx.as_mut(), id).await;
        Self::finish(tx, outcome).await
    }

    async fn user_review_queue(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PullRequestSummary>, Error> {
        let mut tx = self.begin().await?;
        let outcome = Self::review_queue_in(tx.as_mut(), user_id).await;
        Self::finish(tx, outcome).await
    }

    async fn statistics(&self) -> Result<Statistics, Error> {
        let mut tx = self.begin().await?;
        let outcome = tx.statistics().await.map_err(map_store_error);
        Self::finish(tx, outcome).await
    }
}

#[cfg(test)]
#[path = "review_service_tests.rs"]
mod tests;
