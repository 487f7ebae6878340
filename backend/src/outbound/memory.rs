//! In-process review store.
//!
//! Transactions are serialised behind a single async mutex. Each transaction
//! works on a private copy of the state; commit swaps the copy in, while
//! rollback or dropping the transaction discards it. Used when no database
//! is configured and by behaviour tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::ports::{ReviewStore, ReviewStoreError, ReviewTransaction};
use crate::domain::{
    PullRequestId, PullRequestRecord, PullRequestStatus, PullRequestSummary, PullRequestTotals,
    ReviewAssignment, Statistics, TeamName, User, UserAssignmentStats, UserId,
};

#[derive(Debug, Clone, Default)]
struct ReviewState {
    teams: BTreeSet<TeamName>,
    users: BTreeMap<UserId, User>,
    pull_requests: BTreeMap<PullRequestId, PullRequestRecord>,
    reviewers: BTreeSet<(PullRequestId, UserId)>,
}

impl ReviewState {
    fn reviewers_of<'a>(&'a self, id: &'a PullRequestId) -> impl Iterator<Item = &'a UserId> + 'a {
        self.reviewers
            .iter()
            .filter(move |(pr, _)| pr == id)
            .map(|(_, reviewer)| reviewer)
    }

    fn status_of(&self, id: &PullRequestId) -> Option<PullRequestStatus> {
        self.pull_requests.get(id).map(|record| record.status)
    }
}

/// Review store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReviewStore {
    state: Arc<Mutex<ReviewState>>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn begin(&self) -> Result<Box<dyn ReviewTransaction>, ReviewStoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction { guard, working }))
    }

    async fn ping(&self) -> Result<(), ReviewStoreError> {
        Ok(())
    }
}

struct InMemoryTransaction {
    guard: OwnedMutexGuard<ReviewState>,
    working: ReviewState,
}

#[async_trait]
impl ReviewTransaction for InMemoryTransaction {
    async fn team_exists(&mut self, team: &TeamName) -> Result<bool, ReviewStoreError> {
        Ok(self.working.teams.contains(team))
    }

    async fn insert_team(&mut self, team: &TeamName) -> Result<(), ReviewStoreError> {
        if !self.working.teams.insert(team.clone()) {
            return Err(ReviewStoreError::conflict(format!("team {team} exists")));
        }
        Ok(())
    }

    async fn upsert_user(&mut self, user: &User) -> Result<(), ReviewStoreError> {
        if !self.working.teams.contains(&user.team_name) {
            return Err(ReviewStoreError::query(format!(
                "team {} does not exist",
                user.team_name
            )));
        }
        self.working.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, ReviewStoreError> {
        Ok(self.working.users.get(id).cloned())
    }

    async fn list_team_members(&mut self, team: &TeamName) -> Result<Vec<User>, ReviewStoreError> {
        Ok(self
            .working
            .users
            .values()
            .filter(|user| &user.team_name == team)
            .cloned()
            .collect())
    }

    async fn set_user_active(
        &mut self,
        id: &UserId,
        is_active: bool,
    ) -> Result<Option<User>, ReviewStoreError> {
        Ok(self.working.users.get_mut(id).map(|user| {
            user.is_active = is_active;
            user.clone()
        }))
    }

    async fn pull_request_exists(&mut self, id: &PullRequestId) -> Result<bool, ReviewStoreError> {
        Ok(self.working.pull_requests.contains_key(id))
    }

    async fn insert_pull_request(
        &mut self,
        record: &PullRequestRecord,
    ) -> Result<(), ReviewStoreError> {
        if self.working.pull_requests.contains_key(&record.id) {
            return Err(ReviewStoreError::conflict(format!(
                "pull request {} exists",
                record.id
            )));
        }
        if !self.working.users.contains_key(&record.author_id) {
            return Err(ReviewStoreError::query(format!(
                "author {} does not exist",
                record.author_id
            )));
        }
        self.working
            .pull_requests
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_pull_request(
        &mut self,
        id: &PullRequestId,
    ) -> Result<Option<PullRequestRecord>, ReviewStoreError> {
        Ok(self.working.pull_requests.get(id).cloned())
    }

    async fn lock_pull_request(
        &mut self,
        id: &PullRequestId,
    ) -> Result<Option<PullRequestRecord>, ReviewStoreError> {
        // The store-wide mutex already excludes concurrent writers.
        self.find_pull_request(id).await
    }

    async fn mark_merged(
        &mut self,
        id: &PullRequestId,
        merged_at: DateTime<Utc>,
    ) -> Result<(), ReviewStoreError> {
        let record = self
            .working
            .pull_requests
            .get_mut(id)
            .ok_or_else(|| ReviewStoreError::query(format!("pull request {id} does not exist")))?;
        record.status = PullRequestStatus::Merged;
        record.merged_at = Some(merged_at);
        Ok(())
    }

    async fn list_reviewers(
        &mut self,
        id: &PullRequestId,
    ) -> Result<Vec<UserId>, ReviewStoreError> {
        Ok(self.working.reviewers_of(id).cloned().collect())
    }

    async fn is_reviewer(
        &mut self,
        id: &PullRequestId,
        reviewer: &UserId,
    ) -> Result<bool, ReviewStoreError> {
        Ok(self
            .working
            .reviewers
            .contains(&(id.clone(), reviewer.clone())))
    }

    async fn insert_reviewer(
        &mut self,
        id: &PullRequestId,
        reviewer: &UserId,
    ) -> Result<(), ReviewStoreError> {
        if !self.working.users.contains_key(reviewer) {
            return Err(ReviewStoreError::query(format!(
                "reviewer {reviewer} does not exist"
            )));
        }
        if !self
            .working
            .reviewers
            .insert((id.clone(), reviewer.clone()))
        {
            return Err(ReviewStoreError::conflict(format!(
                "{reviewer} already reviews {id}"
            )));
        }
        Ok(())
    }

    async fn replace_reviewer(
        &mut self,
        id: &PullRequestId,
        old: &UserId,
        new: &UserId,
    ) -> Result<bool, ReviewStoreError> {
        let replacement = (id.clone(), new.clone());
        if self.working.reviewers.contains(&replacement) {
            return Err(ReviewStoreError::conflict(format!(
                "{new} already reviews {id}"
            )));
        }
        if !self.working.reviewers.remove(&(id.clone(), old.clone())) {
            return Ok(false);
        }
        self.working.reviewers.insert(replacement);
        Ok(true)
    }

    async fn active_team_members_excluding(
        &mut self,
        team: &TeamName,
        exclude: &[UserId],
    ) -> Result<Vec<UserId>, ReviewStoreError> {
        Ok(self
            .working
            .users
            .values()
            .filter(|user| &user.team_name == team && user.is_active)
            .filter(|user| !exclude.contains(&user.id))
            .map(|user| user.id.clone())
            .collect())
    }

    async fn open_assignments_of_inactive(
        &mut self,
        users: &[UserId],
    ) -> Result<Vec<ReviewAssignment>, ReviewStoreError> {
        let state = &self.working;
        Ok(state
            .reviewers
            .iter()
            .filter(|(pr, reviewer)| {
                users.contains(reviewer)
                    && state.status_of(pr) == Some(PullRequestStatus::Open)
                    && state.users.get(reviewer).is_some_and(|u| !u.is_active)
            })
            .map(|(pr, reviewer)| ReviewAssignment {
                pull_request_id: pr.clone(),
                reviewer_id: reviewer.clone(),
            })
            .collect())
    }

    async fn pull_requests_reviewed_by(
        &mut self,
        reviewer: &UserId,
    ) -> Result<Vec<PullRequestSummary>, ReviewStoreError> {
        let state = &self.working;
        let mut records: Vec<&PullRequestRecord> = state
            .reviewers
            .iter()
            .filter(|(_, assigned)| assigned == reviewer)
            .filter_map(|(pr, _)| state.pull_requests.get(pr))
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records
            .into_iter()
            .cloned()
            .map(PullRequestSummary::from)
            .collect())
    }

    async fn statistics(&mut self) -> Result<Statistics, ReviewStoreError> {
        let state = &self.working;
        let users = state
            .users
            .values()
            .map(|user| {
                let mut stats = UserAssignmentStats {
                    user_id: user.id.clone(),
                    username: user.username.clone(),
                    total_assignments: 0,
                    open_prs: 0,
                    merged_prs: 0,
                };
                for (pr, _) in state.reviewers.iter().filter(|(_, r)| r == &user.id) {
                    stats.total_assignments += 1;
                    match state.status_of(pr) {
                        Some(PullRequestStatus::Open) => stats.open_prs += 1,
                        Some(PullRequestStatus::Merged) => stats.merged_prs += 1,
                        None => {}
                    }
                }
                stats
            })
            .collect();

        let mut totals = PullRequestTotals::default();
        for record in state.pull_requests.values() {
            totals.total_prs += 1;
            match record.status {
                PullRequestStatus::Open => totals.open_prs += 1,
                PullRequestStatus::Merged => totals.merged_prs += 1,
            }
            if state.reviewers_of(&record.id).next().is_some() {
                totals.prs_with_reviewers += 1;
            } else {
                totals.prs_without_reviewers += 1;
            }
        }
        Ok(Statistics::new(users, totals))
    }

    async fn commit(self: Box<Self>) -> Result<(), ReviewStoreError> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), ReviewStoreError> {
        drop(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PullRequestName, Username};
    use rstest::{fixture, rstest};

    fn team() -> TeamName {
        TeamName::new("backend").expect("team")
    }

    fn user(id: &str, active: bool) -> User {
        User {
            id: UserId::new(id).expect("id"),
            username: Username::new(format!("name-{id}")).expect("name"),
            team_name: team(),
            is_active: active,
        }
    }

    fn pr(id: &str, author: &str, created_at: DateTime<Utc>) -> PullRequestRecord {
        PullRequestRecord::open(
            PullRequestId::new(id).expect("pr id"),
            PullRequestName::new("Test").expect("pr name"),
            UserId::new(author).expect("author"),
            created_at,
        )
    }

    #[fixture]
    async fn seeded() -> InMemoryReviewStore {
        let store = InMemoryReviewStore::new();
        let mut tx = store.begin().await.expect("begin");
        tx.insert_team(&team()).await.expect("team");
        for (id, active) in [("u1", true), ("u2", true), ("u3", false)] {
            tx.upsert_user(&user(id, active)).await.expect("user");
        }
        tx.commit().await.expect("commit");
        store
    }

    #[rstest]
    #[tokio::test]
    async fn dropped_transaction_discards_changes(#[future] seeded: InMemoryReviewStore) {
        let store = seeded.await;
        {
            let mut tx = store.begin().await.expect("begin");
            tx.set_user_active(&UserId::new("u1").expect("id"), false)
                .await
                .expect("update");
        }
        let mut tx = store.begin().await.expect("begin");
        let u1 = tx
            .find_user(&UserId::new("u1").expect("id"))
            .await
            .expect("find")
            .expect("exists");
        assert!(u1.is_active);
    }

    #[rstest]
    #[tokio::test]
    async fn rollback_discards_changes_and_releases_lock(#[future] seeded: InMemoryReviewStore) {
        let store = seeded.await;
        let mut tx = store.begin().await.expect("begin");
        tx.set_user_active(&UserId::new("u2").expect("id"), false)
            .await
            .expect("update");
        tx.rollback().await.expect("rollback");

        let mut tx = store.begin().await.expect("begin after rollback");
        let u2 = tx
            .find_user(&UserId::new("u2").expect("id"))
            .await
            .expect("find")
            .expect("exists");
        assert!(u2.is_active);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_team_is_a_conflict(#[future] seeded: InMemoryReviewStore) {
        let store = seeded.await;
        let mut tx = store.begin().await.expect("begin");
        let err = tx.insert_team(&team()).await.expect_err("duplicate");
        assert!(err.is_conflict());
    }

    #[rstest]
    #[tokio::test]
    async fn candidate_pool_skips_inactive_and_excluded(#[future] seeded: InMemoryReviewStore) {
        let store = seeded.await;
        let mut tx = store.begin().await.expect("begin");
        let pool = tx
            .active_team_members_excluding(&team(), &[UserId::new("u1").expect("id")])
            .await
            .expect("pool");
        assert_eq!(pool, vec![UserId::new("u2").expect("id")]);
    }

    #[rstest]
    #[tokio::test]
    async fn replace_reviewer_rewrites_pair(#[future] seeded: InMemoryReviewStore) {
        let store = seeded.await;
        let mut tx = store.begin().await.expect("begin");
        let record = pr("pr-1", "u1", Utc::now());
        tx.insert_pull_request(&record).await.expect("pr");
        let u2 = UserId::new("u2").expect("id");
        let u3 = UserId::new("u3").expect("id");
        tx.insert_reviewer(&record.id, &u2).await.expect("reviewer");

        assert!(tx.replace_reviewer(&record.id, &u2, &u3).await.expect("replace"));
        assert_eq!(tx.list_reviewers(&record.id).await.expect("list"), vec![u3.clone()]);
        assert!(!tx.replace_reviewer(&record.id, &u2, &u3).await.is_ok_and(|done| done));
    }

    #[rstest]
    #[tokio::test]
    async fn open_assignments_ignore_merged_and_active(#[future] seeded: InMemoryReviewStore) {
        let store = seeded.await;
        let mut tx = store.begin().await.expect("begin");
        let now = Utc::now();
        let open = pr("pr-open", "u1", now);
        let merged = pr("pr-merged", "u1", now);
        let u2 = UserId::new("u2").expect("id");
        let u3 = UserId::new("u3").expect("id");
        for record in [&open, &merged] {
            tx.insert_pull_request(record).await.expect("pr");
            tx.insert_reviewer(&record.id, &u2).await.expect("u2");
            tx.insert_reviewer(&record.id, &u3).await.expect("u3");
        }
        tx.mark_merged(&merged.id, now).await.expect("merge");

        let pending = tx
            .open_assignments_of_inactive(&[u2.clone(), u3.clone()])
            .await
            .expect("query");
        assert_eq!(
            pending,
            vec![ReviewAssignment {
                pull_request_id: open.id.clone(),
                reviewer_id: u3,
            }]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn statistics_count_assignments(#[future] seeded: InMemoryReviewStore) {
        let store = seeded.await;
        let mut tx = store.begin().await.expect("begin");
        let now = Utc::now();
        let first = pr("pr-1", "u1", now);
        let second = pr("pr-2", "u1", now);
        tx.insert_pull_request(&first).await.expect("pr");
        tx.insert_pull_request(&second).await.expect("pr");
        tx.insert_reviewer(&first.id, &UserId::new("u2").expect("id"))
            .await
            .expect("reviewer");
        tx.mark_merged(&first.id, now).await.expect("merge");

        let stats = tx.statistics().await.expect("stats");
        assert_eq!(stats.pull_requests.total_prs, 2);
        assert_eq!(stats.pull_requests.merged_prs, 1);
        assert_eq!(stats.pull_requests.prs_with_reviewers, 1);
        assert_eq!(stats.pull_requests.prs_without_reviewers, 1);
        let top = stats.user_assignments.first().expect("users");
        assert_eq!(top.user_id.as_str(), "u2");
        assert_eq!((top.total_assignments, top.merged_prs), (1, 1));
    }
}
