//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn internal_error() -> Error {
    Error::internal("connection string leaked")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"secret": "x"}))
}

async fn body_of(error: &Error) -> (StatusCode, Option<String>, Value) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body()).await.expect("read body");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, header, value)
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::team_exists("dup"), StatusCode::BAD_REQUEST)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::pr_exists("dup"), StatusCode::CONFLICT)]
#[case(Error::pr_merged("merged"), StatusCode::CONFLICT)]
#[case(Error::not_assigned("nope"), StatusCode::CONFLICT)]
#[case(Error::no_candidate("none"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), expected);
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(internal_error: Error) {
    let (status, header, body) = body_of(&internal_error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(
        body,
        json!({
            "error": {"code": "INTERNAL_ERROR", "message": "Internal server error"},
            "traceId": TRACE_ID,
        })
    );
}

#[rstest]
#[actix_web::test]
async fn domain_errors_keep_message_and_details() {
    let error = Error::invalid_request("team_name must not be empty")
        .with_details(json!({"field": "team_name"}));
    let (status, header, body) = body_of(&error).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(header.is_none());
    assert_eq!(
        body,
        json!({
            "error": {
                "code": "INVALID_REQUEST",
                "message": "team_name must not be empty",
                "details": {"field": "team_name"},
            }
        })
    );
}

#[rstest]
#[actix_web::test]
async fn conflict_codes_are_preserved() {
    let (_, _, body) = body_of(&Error::no_candidate("no active replacement candidate in team")).await;
    assert_eq!(body["error"]["code"], "NO_CANDIDATE");
}

#[rstest]
#[actix_web::test]
async fn malformed_json_uses_error_envelope() {
    use actix_web::{App, post, test as actix_test, web};

    #[post("/echo")]
    async fn echo(body: web::Json<Value>) -> web::Json<Value> {
        body
    }

    let app = actix_test::init_service(
        App::new()
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(echo),
    )
    .await;
    let request = actix_test::TestRequest::post()
        .uri("/echo")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    assert_eq!(body["error"]["message"], "invalid request body");
}
