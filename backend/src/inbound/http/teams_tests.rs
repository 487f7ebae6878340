//! Tests for team handlers.

use std::sync::Arc;

use actix_web::{App, http::StatusCode, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{MockReviewCommand, MockReviewQuery};
use crate::domain::{Team, UserId, Username};

fn member(id: &str, name: &str, active: bool) -> TeamMember {
    TeamMember {
        user_id: UserId::new(id).expect("user id"),
        username: Username::new(name).expect("username"),
        is_active: active,
    }
}

fn backend_team() -> Team {
    Team {
        name: TeamName::new("backend").expect("team"),
        members: vec![member("u1", "Alice", true), member("u2", "Bob", false)],
    }
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
            .service(create_team)
            .service(get_team),
    )
    .await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

#[rstest]
#[actix_web::test]
async fn create_team_returns_created_envelope() {
    let mut commands = MockReviewCommand::new();
    commands
        .expect_create_team()
        .withf(|request| {
            request.name.as_str() == "backend"
                && request.members.len() == 2
                && !request.members[1].is_active
        })
        .times(1)
        .returning(|_| Ok(backend_team()));

    let (status, body) = call(
        commands,
        MockReviewQuery::new(),
        actix_test::TestRequest::post().uri("/team/add").set_json(json!({
            "team_name": "backend",
            "members": [
                {"user_id": "u1", "username": "Alice", "is_active": true},
                {"user_id": "u2", "username": "Bob", "is_active": false},
            ],
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["team"]["team_name"], "backend");
    assert_eq!(body["team"]["members"][1]["is_active"], false);
}

#[rstest]
#[actix_web::test]
async fn create_team_maps_duplicate_to_bad_request() {
    let mut commands = MockReviewCommand::new();
    commands
        .expect_create_team()
        .returning(|_| Err(Error::team_exists("team_name already exists")));

    let (status, body) = call(
        commands,
        MockReviewQuery::new(),
        actix_test::TestRequest::post()
            .uri("/team/add")
            .set_json(json!({"team_name": "backend", "members": []})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TEAM_EXISTS");
}

#[rstest]
#[case(json!({"members": []}), "team_name")]
#[case(json!({"team_name": "backend"}), "members")]
#[case(json!({"team_name": "backend", "members": [{"user_id": "u1", "username": "A"}]}), "is_active")]
#[actix_web::test]
async fn create_team_rejects_missing_fields(#[case] payload: Value, #[case] field: &str) {
    let (status, body) = call(
        MockReviewCommand::new(),
        MockReviewQuery::new(),
        actix_test::TestRequest::post().uri("/team/add").set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    assert_eq!(body["error"]["details"]["field"], field);
}

#[rstest]
#[actix_web::test]
async fn get_team_returns_bare_team() {
    let mut queries = MockReviewQuery::new();
    queries
        .expect_get_team()
        .withf(|name| name.as_str() == "backend")
        .returning(|_| Ok(backend_team()));

    let (status, body) = call(
        MockReviewCommand::new(),
        queries,
        actix_test::TestRequest::get().uri("/team/get?team_name=backend"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team_name"], "backend");
    assert_eq!(body["members"][0]["user_id"], "u1");
}

#[rstest]
#[actix_web::test]
async fn get_team_requires_name() {
    let (status, body) = call(
        MockReviewCommand::new(),
        MockReviewQuery::new(),
        actix_test::TestRequest::get().uri("/team/get"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "missing required field: team_name");
}

#[rstest]
#[actix_web::test]
async fn get_team_maps_not_found() {
    let mut queries = MockReviewQuery::new();
    queries
        .expect_get_team()
        .returning(|_| Err(Error::not_found("team not found")));

    let (status, body) = call(
        MockReviewCommand::new(),
        queries,
        actix_test::TestRequest::get().uri("/team/get?team_name=ghost"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "team not found");
}
