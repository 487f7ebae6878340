//! Integration tests for the PostgreSQL review store.
//!
//! Set `PR_REVIEWER_TEST_DATABASE_URL` to a disposable database to run them;
//! they are skipped when the variable is unset. Tables are truncated before
//! each test, so never point it at data you care about.

use std::sync::Arc;

use diesel::QueryableByName;
use diesel::sql_types::Integer;
use diesel_async::RunQueryDsl;
use mockable::DefaultClock;
use pr_reviewer::domain::ports::{
    CreatePullRequestRequest, CreateTeamRequest, FixtureRandomSource, ReviewCommand, ReviewQuery,
    ReviewStore, ReviewTransaction,
};
use pr_reviewer::domain::{
    DEFAULT_MAX_REVIEWERS, ErrorCode, PullRequestId, PullRequestName, PullRequestStatus,
    ReviewService, ReviewerSelector, TeamMember, TeamName, UserId, Username,
};
use pr_reviewer::outbound::persistence::{
    DbPool, DieselReviewStore, PoolConfig, run_pending_migrations,
};
use rstest::rstest;
use tokio::sync::{Mutex, MutexGuard};

const DATABASE_URL_VAR: &str = "PR_REVIEWER_TEST_DATABASE_URL";

static DATABASE_LOCK: Mutex<()> = Mutex::const_new(());

struct Harness {
    pool: DbPool,
    store: Arc<DieselReviewStore>,
    service: ReviewService<DieselReviewStore>,
    _guard: MutexGuard<'static, ()>,
}

async fn harness() -> Option<Harness> {
    harness_with_pool_size(2).await
}

async fn harness_with_pool_size(max_size: u32) -> Option<Harness> {
    let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
        eprintln!("SKIP-TEST-DATABASE: {DATABASE_URL_VAR} is unset");
        return None;
    };
    let guard = DATABASE_LOCK.lock().await;
    run_pending_migrations(&url)
        .await
        .expect("migrations should apply");
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(max_size))
        .await
        .expect("pool should build");

    let mut conn = pool.get_owned().await.expect("connection");
    diesel::sql_query("TRUNCATE pr_reviewers, pull_requests, users, teams")
        .execute(&mut *conn)
        .await
        .expect("truncate tables");
    drop(conn);

    let store = Arc::new(DieselReviewStore::new(pool.clone()));
    let service = ReviewService::new(
        store.clone(),
        ReviewerSelector::new(Arc::new(FixtureRandomSource), DEFAULT_MAX_REVIEWERS),
        Arc::new(DefaultClock),
    );
    Some(Harness {
        pool,
        store,
        service,
        _guard: guard,
    })
}

#[derive(QueryableByName)]
struct BackendPid {
    #[diesel(sql_type = Integer)]
    pid: i32,
}

async fn backend_pid(pool: &DbPool) -> i32 {
    let mut conn = pool.get_owned().await.expect("connection");
    diesel::sql_query("SELECT pg_backend_pid() AS pid")
        .get_result::<BackendPid>(&mut *conn)
        .await
        .expect("backend pid")
        .pid
}

fn uid(id: &str) -> UserId {
    UserId::new(id).expect("user id")
}

fn pr_id(id: &str) -> PullRequestId {
    PullRequestId::new(id).expect("pull request id")
}

async fn seed(harness: &Harness) {
    let members = ["u1", "u2", "u3", "u4"]
        .iter()
        .map(|id| TeamMember {
            user_id: uid(id),
            username: Username::new(format!("User {id}")).expect("username"),
            is_active: true,
        })
        .collect();
    harness
        .service
        .create_team(CreateTeamRequest {
            name: TeamName::new("backend").expect("team"),
            members,
        })
        .await
        .expect("team");
    harness
        .service
        .create_pull_request(CreatePullRequestRequest {
            id: pr_id("pr-1"),
            name: PullRequestName::new("Add search").expect("name"),
            author_id: uid("u1"),
        })
        .await
        .expect("pull request");
}

#[rstest]
#[tokio::test]
async fn lifecycle_round_trips_through_postgres() {
    let Some(harness) = harness().await else {
        return;
    };
    seed(&harness).await;

    let stored = harness
        .service
        .get_pull_request(&pr_id("pr-1"))
        .await
        .expect("fetch");
    let reviewers: Vec<_> = stored.assigned_reviewers.iter().map(UserId::as_str).collect();
    assert_eq!(reviewers, ["u2", "u3"]);

    let outcome = harness
        .service
        .reassign_reviewer(&pr_id("pr-1"), &uid("u2"))
        .await
        .expect("reassign");
    assert_eq!(outcome.replaced_by.as_str(), "u4");

    let first = harness.service.merge_pull_request(&pr_id("pr-1")).await.expect("merge");
    let second = harness.service.merge_pull_request(&pr_id("pr-1")).await.expect("merge");
    assert_eq!(first.status, PullRequestStatus::Merged);
    assert_eq!(first.merged_at, second.merged_at);
    assert_eq!(first, second);

    let queue = harness.service.user_review_queue(&uid("u4")).await.expect("queue");
    assert_eq!(queue.len(), 1);

    let stats = harness.service.statistics().await.expect("stats");
    assert_eq!(stats.pull_requests.total_prs, 1);
    assert_eq!(stats.pull_requests.merged_prs, 1);
    assert_eq!(stats.pull_requests.prs_with_reviewers, 1);
}

#[rstest]
#[tokio::test]
async fn duplicate_ids_map_to_domain_codes() {
    let Some(harness) = harness().await else {
        return;
    };
    seed(&harness).await;

    let err = harness
        .service
        .create_team(CreateTeamRequest {
            name: TeamName::new("backend").expect("team"),
            members: Vec::new(),
        })
        .await
        .expect_err("duplicate team");
    assert_eq!(err.code(), ErrorCode::TeamExists);

    let err = harness
        .service
        .create_pull_request(CreatePullRequestRequest {
            id: pr_id("pr-1"),
            name: PullRequestName::new("Again").expect("name"),
            author_id: uid("u1"),
        })
        .await
        .expect_err("duplicate pull request");
    assert_eq!(err.code(), ErrorCode::PrExists);
}

#[rstest]
#[tokio::test]
async fn dropped_transaction_rolls_back() {
    let Some(harness) = harness().await else {
        return;
    };
    seed(&harness).await;

    {
        let mut tx = harness.store.begin().await.expect("begin");
        tx.set_user_active(&uid("u2"), false).await.expect("update");
    }

    let team = harness
        .service
        .get_team(&TeamName::new("backend").expect("team"))
        .await
        .expect("team");
    let u2 = team
        .members
        .iter()
        .find(|member| member.user_id.as_str() == "u2")
        .expect("u2 present");
    assert!(u2.is_active);
}

#[rstest]
#[tokio::test]
async fn explicit_rollback_discards_changes() {
    let Some(harness) = harness().await else {
        return;
    };
    seed(&harness).await;

    let mut tx = harness.store.begin().await.expect("begin");
    tx.set_user_active(&uid("u2"), false).await.expect("update");
    tx.rollback().await.expect("rollback");

    let team = harness
        .service
        .get_team(&TeamName::new("backend").expect("team"))
        .await
        .expect("team");
    assert!(team.members.iter().all(|member| member.is_active));
}

#[rstest]
#[tokio::test]
async fn failed_operations_keep_pooled_connection() {
    let Some(harness) = harness_with_pool_size(1).await else {
        return;
    };
    seed(&harness).await;
    let before = backend_pid(&harness.pool).await;

    let missing = harness
        .service
        .reassign_reviewer(&pr_id("ghost"), &uid("u2"))
        .await
        .expect_err("unknown pull request");
    assert_eq!(missing.code(), ErrorCode::NotFound);
    let unassigned = harness
        .service
        .reassign_reviewer(&pr_id("pr-1"), &uid("u1"))
        .await
        .expect_err("author is not a reviewer");
    assert_eq!(unassigned.code(), ErrorCode::NotAssigned);
    let duplicate = harness
        .service
        .create_team(CreateTeamRequest {
            name: TeamName::new("backend").expect("team"),
            members: Vec::new(),
        })
        .await
        .expect_err("duplicate team");
    assert_eq!(duplicate.code(), ErrorCode::TeamExists);

    assert_eq!(backend_pid(&harness.pool).await, before);
}

#[rstest]
#[tokio::test]
async fn deactivation_reassigns_open_reviews() {
    let Some(harness) = harness().await else {
        return;
    };
    seed(&harness).await;

    let outcome = harness
        .service
        .deactivate_team_members(&TeamName::new("backend").expect("team"), &[uid("u3")])
        .await
        .expect("deactivate");
    assert_eq!(outcome.deactivated.len(), 1);
    assert_eq!(outcome.report.reassigned(), 1);

    let stored = harness
        .service
        .get_pull_request(&pr_id("pr-1"))
        .await
        .expect("fetch");
    let reviewers: Vec<_> = stored.assigned_reviewers.iter().map(UserId::as_str).collect();
    assert_eq!(reviewers, ["u2", "u4"]);
}

#[rstest]
#[tokio::test]
async fn ping_reaches_database() {
    let Some(harness) = harness().await else {
        return;
    };
    harness.store.ping().await.expect("ping");
}
