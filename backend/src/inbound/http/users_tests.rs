//! Tests for user handlers.

use std::sync::Arc;

use actix_web::{App, http::StatusCode, test as actix_test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{
    MockReviewCommand, MockReviewQuery, ReassignmentAttempt, SafeReassignReport,
};
use crate::domain::{
    Error, PullRequestId, PullRequestName, PullRequestStatus, PullRequestSummary, ReviewAssignment,
    User, Username,
};

fn uid(id: &str) -> UserId {
    UserId::new(id).expect("user id")
}

fn assignment(pr: &str, reviewer: &str) -> ReviewAssignment {
    ReviewAssignment {
        pull_request_id: PullRequestId::new(pr).expect("pr id"),
        reviewer_id: uid(reviewer),
    }
}

#[fixture]
fn queries() -> MockReviewQuery {
    MockReviewQuery::new()
}

#[fixture]
fn commands() -> MockReviewCommand {
    MockReviewCommand::new()
}

async fn call(
    commands: MockReviewCommand,
    queries: MockReviewQuery,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let state = HttpState::new(Arc::new(commands), Arc::new(queries));
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(set_is_active)
            .service(bulk_deactivate)
            .service(get_review),
    )
    .await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body: Value = actix_test::read_body_json(response).await;
    (status, body)
}

#[rstest]
#[actix_web::test]
async fn set_is_active_returns_user(mut commands: MockReviewCommand, queries: MockReviewQuery) {
    commands
        .expect_set_user_active()
        .withf(|id, active| id.as_str() == "u2" && !*active)
        .times(1)
        .returning(|id, active| {
            Ok(User {
                id: id.clone(),
                username: Username::new("Bob").expect("username"),
                team_name: TeamName::new("backend").expect("team"),
                is_active: active,
            })
        });

    let (status, body) = call(
        commands,
        queries,
        actix_test::TestRequest::post()
            .uri("/users/setIsActive")
            .set_json(json!({"user_id": "u2", "is_active": false})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"user": {"user_id": "u2", "username": "Bob", "team_name": "backend", "is_active": false}})
    );
}

#[rstest]
#[actix_web::test]
async fn set_is_active_maps_unknown_user(mut commands: MockReviewCommand, queries: MockReviewQuery) {
    commands
        .expect_set_user_active()
        .returning(|_, _| Err(Error::not_found("user not found")));

    let (status, body) = call(
        commands,
        queries,
        actix_test::TestRequest::post()
            .uri("/users/setIsActive")
            .set_json(json!({"user_id": "ghost", "is_active": true})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[rstest]
#[actix_web::test]
async fn set_is_active_requires_flag(commands: MockReviewCommand, queries: MockReviewQuery) {
    let (status, body) = call(
        commands,
        queries,
        actix_test::TestRequest::post()
            .uri("/users/setIsActive")
            .set_json(json!({"user_id": "u1"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["field"], "is_active");
}

#[rstest]
#[actix_web::test]
async fn bulk_deactivate_summarises_outcome(
    mut commands: MockReviewCommand,
    queries: MockReviewQuery,
) {
    commands
        .expect_deactivate_team_members()
        .withf(|team, ids| team.as_str() == "backend" && ids.len() == 3)
        .times(1)
        .returning(|_, _| {
            Ok(TeamDeactivation {
                deactivated: vec![uid("u2"), uid("u3")],
                report: SafeReassignReport {
                    attempts: vec![
                        ReassignmentAttempt {
                            assignment: assignment("pr-1", "u2"),
                            result: Ok(uid("u4")),
                        },
                        ReassignmentAttempt {
                            assignment: assignment("pr-2", "u3"),
                            result: Err(Error::no_candidate(
                                "no active replacement candidate in team",
                            )),
                        },
                    ],
                },
            })
        });

    let (status, body) = call(
        commands,
        queries,
        actix_test::TestRequest::post()
            .uri("/users/bulkDeactivate")
            .set_json(json!({"team_name": "backend", "user_ids": ["u2", "u3", "u9"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "deactivated_count": 2,
            "reassigned_prs": 1,
            "failed_reassignments": [{
                "pull_request_id": "pr-2",
                "reviewer_id": "u3",
                "code": "NO_CANDIDATE",
                "message": "no active replacement candidate in team",
            }],
        })
    );
}

#[rstest]
#[actix_web::test]
async fn bulk_deactivate_rejects_blank_ids(commands: MockReviewCommand, queries: MockReviewQuery) {
    let (status, body) = call(
        commands,
        queries,
        actix_test::TestRequest::post()
            .uri("/users/bulkDeactivate")
            .set_json(json!({"team_name": "backend", "user_ids": ["u1", " "]})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["index"], 1);
}

#[rstest]
#[actix_web::test]
async fn get_review_lists_assignments(commands: MockReviewCommand, mut queries: MockReviewQuery) {
    queries
        .expect_user_review_queue()
        .withf(|id| id.as_str() == "u2")
        .returning(|_| {
            Ok(vec![PullRequestSummary {
                id: PullRequestId::new("pr-1").expect("pr id"),
                name: PullRequestName::new("Add search").expect("name"),
                author_id: uid("u1"),
                status: PullRequestStatus::Open,
            }])
        });

    let (status, body) = call(
        commands,
        queries,
        actix_test::TestRequest::get().uri("/users/getReview?user_id=u2"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "user_id": "u2",
            "pull_requests": [{
                "pull_request_id": "pr-1",
                "pull_request_name": "Add search",
                "author_id": "u1",
                "status": "OPEN",
            }],
        })
    );
}

#[rstest]
#[actix_web::test]
async fn get_review_maps_unknown_user(commands: MockReviewCommand, mut queries: MockReviewQuery) {
    queries
        .expect_user_review_queue()
        .returning(|_| Err(Error::not_found("user not found")));

    let (status, body) = call(
        commands,
        queries,
        actix_test::TestRequest::get().uri("/users/getReview?user_id=nobody"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "user not found");
}
