//! Assignment statistics endpoint.

use actix_web::{get, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{ErrorResponse, StatisticsDto};
use crate::inbound::http::state::HttpState;

/// Per-reviewer assignment counts and pull request totals.
#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Statistics", body = StatisticsDto),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    ),
    tags = ["stats"],
    operation_id = "getStatistics"
)]
#[get("/stats")]
pub async fn get_statistics(state: web::Data<HttpState>) -> ApiResult<web::Json<StatisticsDto>> {
    let stats = state.queries.statistics().await?;
    Ok(web::Json(stats.into()))
}
