//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every HTTP endpoint from the inbound layer together
//! with the DTO schemas they exchange. The generated document is served by
//! Swagger UI in debug builds and exported via
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::inbound::http::dto::{
    ErrorDetail, ErrorResponse, PullRequestDto, PullRequestEnvelope, PullRequestShortDto,
    PullRequestTotalsDto, StatisticsDto, TeamDto, TeamMemberDto, UserAssignmentStatsDto, UserDto,
};
use crate::inbound::http::pull_requests::{
    CreatePullRequestBody, MergePullRequestBody, ReassignBody, ReassignResponse,
};
use crate::inbound::http::teams::{TeamEnvelope, TeamMemberRequest, TeamRequest};
use crate::inbound::http::users::{
    BulkDeactivateRequest, BulkDeactivateResponse, FailedReassignmentDto, ReviewQueueResponse,
    SetActiveRequest, UserEnvelope,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "PR reviewer assignment API",
        description = "Teams, users and pull requests with automatic reviewer assignment."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::teams::create_team,
        crate::inbound::http::teams::get_team,
        crate::inbound::http::users::set_is_active,
        crate::inbound::http::users::bulk_deactivate,
        crate::inbound::http::users::get_review,
        crate::inbound::http::pull_requests::create_pull_request,
        crate::inbound::http::pull_requests::merge_pull_request,
        crate::inbound::http::pull_requests::reassign_reviewer,
        crate::inbound::http::pull_requests::get_pull_request,
        crate::inbound::http::stats::get_statistics,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorDetail,
        ErrorResponse,
        TeamMemberDto,
        TeamDto,
        TeamEnvelope,
        TeamMemberRequest,
        TeamRequest,
        UserDto,
        UserEnvelope,
        SetActiveRequest,
        BulkDeactivateRequest,
        BulkDeactivateResponse,
        FailedReassignmentDto,
        ReviewQueueResponse,
        PullRequestDto,
        PullRequestEnvelope,
        PullRequestShortDto,
        CreatePullRequestBody,
        MergePullRequestBody,
        ReassignBody,
        ReassignResponse,
        StatisticsDto,
        UserAssignmentStatsDto,
        PullRequestTotalsDto,
    )),
    tags(
        (name = "teams", description = "Team registration and lookup"),
        (name = "users", description = "User activity and review queues"),
        (name = "pullRequests", description = "Pull request lifecycle and reviewer assignment"),
        (name = "stats", description = "Assignment statistics"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
