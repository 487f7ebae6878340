//! Pull request HTTP handlers.
//!
//! ```text
//! POST /pullRequest/create
//! POST /pullRequest/merge
//! POST /pullRequest/reassign
//! GET  /pullRequest/get?pull_request_id=
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::CreatePullRequestRequest;
use crate::domain::{PullRequestId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{ErrorResponse, PullRequestDto, PullRequestEnvelope};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::required;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatePullRequestBody {
    pub pull_request_id: Option<String>,
    pub pull_request_name: Option<String>,
    pub author_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MergePullRequestBody {
    pub pull_request_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReassignBody {
    pub pull_request_id: Option<String>,
    /// Reviewer to replace.
    pub old_user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReassignResponse {
    pub pr: PullRequestDto,
    pub replaced_by: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PullRequestQuery {
    pub pull_request_id: Option<String>,
}

/// Open a pull request and assign up to two reviewers from the author's team.
#[utoipa::path(
    post,
    path = "/pullRequest/create",
    request_body = CreatePullRequestBody,
    responses(
        (status = 201, description = "Pull request created", body = PullRequestEnvelope),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Author not found", body = ErrorResponse),
        (status = 409, description = "Pull request exists", body = ErrorResponse)
    ),
    tags = ["pullRequests"],
    operation_id = "createPullRequest"
)]
#[post("/pullRequest/create")]
pub async fn create_pull_request(
    state: web::Data<HttpState>,
    payload: web::Json<CreatePullRequestBody>,
) -> ApiResult<HttpResponse> {
    let CreatePullRequestBody {
        pull_request_id,
        pull_request_name,
        author_id,
    } = payload.into_inner();
    let request = CreatePullRequestRequest {
        id: required(pull_request_id, "pull_request_id")?,
        name: required(pull_request_name, "pull_request_name")?,
        author_id: required(author_id, "author_id")?,
    };
    let pr = state.commands.create_pull_request(request).await?;
    Ok(HttpResponse::Created().json(PullRequestEnvelope::from(pr)))
}

/// Merge a pull request. Repeated merges return the stored state.
#[utoipa::path(
    post,
    path = "/pullRequest/merge",
    request_body = MergePullRequestBody,
    responses(
        (status = 200, description = "Merged pull request", body = PullRequestEnvelope),
        (status = 404, description = "Pull request not found", body = ErrorResponse)
    ),
    tags = ["pullRequests"],
    operation_id = "mergePullRequest"
)]
#[post("/pullRequest/merge")]
pub async fn merge_pull_request(
    state: web::Data<HttpState>,
    payload: web::Json<MergePullRequestBody>,
) -> ApiResult<web::Json<PullRequestEnvelope>> {
    let id: PullRequestId = required(payload.into_inner().pull_request_id, "pull_request_id")?;
    let pr = state.commands.merge_pull_request(&id).await?;
    Ok(web::Json(pr.into()))
}

/// Replace one reviewer with another active member of their team.
#[utoipa::path(
    post,
    path = "/pullRequest/reassign",
    request_body = ReassignBody,
    responses(
        (status = 200, description = "Reviewer replaced", body = ReassignResponse),
        (status = 404, description = "Pull request or reviewer not found", body = ErrorResponse),
        (status = 409, description = "Merged, not assigned, or no candidate", body = ErrorResponse)
    ),
    tags = ["pullRequests"],
    operation_id = "reassignReviewer"
)]
#[post("/pullRequest/reassign")]
pub async fn reassign_reviewer(
    state: web::Data<HttpState>,
    payload: web::Json<ReassignBody>,
) -> ApiResult<web::Json<ReassignResponse>> {
    let ReassignBody {
        pull_request_id,
        old_user_id,
    } = payload.into_inner();
    let id: PullRequestId = required(pull_request_id, "pull_request_id")?;
    let old: UserId = required(old_user_id, "old_user_id")?;
    let outcome = state.commands.reassign_reviewer(&id, &old).await?;
    Ok(web::Json(ReassignResponse {
        pr: outcome.pull_request.into(),
        replaced_by: outcome.replaced_by.into_inner(),
    }))
}

#[utoipa::path(
    get,
    path = "/pullRequest/get",
    params(PullRequestQuery),
    responses(
        (status = 200, description = "Pull request", body = PullRequestEnvelope),
        (status = 404, description = "Pull request not found", body = ErrorResponse)
    ),
    tags = ["pullRequests"],
    operation_id = "getPullRequest"
)]
#[get("/pullRequest/get")]
pub async fn get_pull_request(
    state: web::Data<HttpState>,
    query: web::Query<PullRequestQuery>,
) -> ApiResult<web::Json<PullRequestEnvelope>> {
    let id: PullRequestId = required(query.into_inner().pull_request_id, "pull_request_id")?;
    let pr = state.queries.get_pull_request(&id).await?;
    Ok(web::Json(pr.into()))
}

#[cfg(test)]
#[path = "pull_requests_tests.rs"]
mod tests;
