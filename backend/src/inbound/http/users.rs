//! User HTTP handlers.
//!
//! ```text
//! POST /users/setIsActive
//! POST /users/bulkDeactivate
//! GET  /users/getReview?user_id=
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{ReassignmentAttempt, TeamDeactivation};
use crate::domain::{TeamName, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{ErrorResponse, PullRequestShortDto, UserDto};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    identifier_list, missing_field_error, required, required_flag,
};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SetActiveRequest {
    pub user_id: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserDto,
}

/// Request payload for `POST /users/bulkDeactivate`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct BulkDeactivateRequest {
    pub team_name: Option<String>,
    pub user_ids: Option<Vec<String>>,
}

/// Reassignment that left an inactive reviewer in place.
#[derive(Debug, Serialize, ToSchema)]
pub struct FailedReassignmentDto {
    pub pull_request_id: String,
    pub reviewer_id: String,
    pub code: String,
    pub message: String,
}

impl FailedReassignmentDto {
    fn from_attempt(attempt: &ReassignmentAttempt) -> Option<Self> {
        let error = attempt.result.as_ref().err()?;
        Some(Self {
            pull_request_id: attempt.assignment.pull_request_id.to_string(),
            reviewer_id: attempt.assignment.reviewer_id.to_string(),
            code: error.code().as_str().to_owned(),
            message: error.message().to_owned(),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkDeactivateResponse {
    /// Users that belonged to the team and are now inactive.
    pub deactivated_count: usize,
    /// Open pull requests whose inactive reviewer was replaced.
    pub reassigned_prs: usize,
    pub failed_reassignments: Vec<FailedReassignmentDto>,
}

impl From<TeamDeactivation> for BulkDeactivateResponse {
    fn from(value: TeamDeactivation) -> Self {
        Self {
            deactivated_count: value.deactivated.len(),
            reassigned_prs: value.report.reassigned(),
            failed_reassignments: value
                .report
                .attempts
                .iter()
                .filter_map(FailedReassignmentDto::from_attempt)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReviewQueueQuery {
    /// Reviewer whose assignments are listed.
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewQueueResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShortDto>,
}

/// Toggle a user's active flag.
#[utoipa::path(
    post,
    path = "/users/setIsActive",
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Updated user", body = UserEnvelope),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tags = ["users"],
    operation_id = "setUserActive"
)]
#[post("/users/setIsActive")]
pub async fn set_is_active(
    state: web::Data<HttpState>,
    payload: web::Json<SetActiveRequest>,
) -> ApiResult<web::Json<UserEnvelope>> {
    let SetActiveRequest { user_id, is_active } = payload.into_inner();
    let user_id: UserId = required(user_id, "user_id")?;
    let is_active = required_flag(is_active, "is_active")?;
    let user = state.commands.set_user_active(&user_id, is_active).await?;
    Ok(web::Json(UserEnvelope { user: user.into() }))
}

/// Deactivate team members and move their open reviews to active teammates.
///
/// Reassignment is best effort: individual failures are reported in
/// `failed_reassignments` without failing the request.
#[utoipa::path(
    post,
    path = "/users/bulkDeactivate",
    request_body = BulkDeactivateRequest,
    responses(
        (status = 200, description = "Deactivation summary", body = BulkDeactivateResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tags = ["users"],
    operation_id = "bulkDeactivateUsers"
)]
#[post("/users/bulkDeactivate")]
pub async fn bulk_deactivate(
    state: web::Data<HttpState>,
    payload: web::Json<BulkDeactivateRequest>,
) -> ApiResult<web::Json<BulkDeactivateResponse>> {
    let BulkDeactivateRequest {
        team_name,
        user_ids,
    } = payload.into_inner();
    let team: TeamName = required(team_name, "team_name")?;
    let user_ids = user_ids.ok_or_else(|| missing_field_error("user_ids"))?;
    let user_ids: Vec<UserId> = identifier_list(user_ids, "user_ids")?;
    let outcome = state
        .commands
        .deactivate_team_members(&team, &user_ids)
        .await?;
    Ok(web::Json(outcome.into()))
}

/// List pull requests assigned to a reviewer.
#[utoipa::path(
    get,
    path = "/users/getReview",
    params(ReviewQueueQuery),
    responses(
        (status = 200, description = "Assigned pull requests", body = ReviewQueueResponse),
        (status = 400, description = "Missing user_id", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tags = ["users"],
    operation_id = "getUserReviews"
)]
#[get("/users/getReview")]
pub async fn get_review(
    state: web::Data<HttpState>,
    query: web::Query<ReviewQueueQuery>,
) -> ApiResult<web::Json<ReviewQueueResponse>> {
    let user_id: UserId = required(query.into_inner().user_id, "user_id")?;
    let pull_requests = state.queries.user_review_queue(&user_id).await?;
    Ok(web::Json(ReviewQueueResponse {
        user_id: user_id.into_inner(),
        pull_requests: pull_requests.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
