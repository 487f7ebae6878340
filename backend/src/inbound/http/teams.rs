//! Team HTTP handlers.
//!
//! ```text
//! POST /team/add
//! GET  /team/get?team_name=
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::CreateTeamRequest;
use crate::domain::{Error, TeamMember, TeamName};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{ErrorResponse, TeamDto};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_field_error, required, required_flag};

/// Member entry of a team registration payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TeamMemberRequest {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub is_active: Option<bool>,
}

/// Request payload for `POST /team/add`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TeamRequest {
    pub team_name: Option<String>,
    pub members: Option<Vec<TeamMemberRequest>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamEnvelope {
    pub team: TeamDto,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TeamQuery {
    /// Name of the team to fetch.
    pub team_name: Option<String>,
}

fn parse_member(member: TeamMemberRequest) -> Result<TeamMember, Error> {
    Ok(TeamMember {
        user_id: required(member.user_id, "user_id")?,
        username: required(member.username, "username")?,
        is_active: required_flag(member.is_active, "is_active")?,
    })
}

fn parse_team_request(payload: TeamRequest) -> Result<CreateTeamRequest, Error> {
    let name: TeamName = required(payload.team_name, "team_name")?;
    let members = payload
        .members
        .ok_or_else(|| missing_field_error("members"))?
        .into_iter()
        .map(parse_member)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CreateTeamRequest { name, members })
}

/// Register a team and upsert its members.
#[utoipa::path(
    post,
    path = "/team/add",
    request_body = TeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamEnvelope),
        (status = 400, description = "Invalid request or team exists", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    ),
    tags = ["teams"],
    operation_id = "createTeam"
)]
#[post("/team/add")]
pub async fn create_team(
    state: web::Data<HttpState>,
    payload: web::Json<TeamRequest>,
) -> ApiResult<HttpResponse> {
    let request = parse_team_request(payload.into_inner())?;
    let team = state.commands.create_team(request).await?;
    Ok(HttpResponse::Created().json(TeamEnvelope { team: team.into() }))
}

/// Fetch a team with its members.
#[utoipa::path(
    get,
    path = "/team/get",
    params(TeamQuery),
    responses(
        (status = 200, description = "Team", body = TeamDto),
        (status = 400, description = "Missing team_name", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tags = ["teams"],
    operation_id = "getTeam"
)]
#[get("/team/get")]
pub async fn get_team(
    state: web::Data<HttpState>,
    query: web::Query<TeamQuery>,
) -> ApiResult<web::Json<TeamDto>> {
    let name: TeamName = required(query.into_inner().team_name, "team_name")?;
    let team = state.queries.get_team(&name).await?;
    Ok(web::Json(team.into()))
}

#[cfg(test)]
#[path = "teams_tests.rs"]
mod tests;
