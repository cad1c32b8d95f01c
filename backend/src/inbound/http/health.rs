//! Liveness probe.

use actix_web::{get, HttpResponse};
use serde_json::json;

use super::envelope::{ok, ApiResult};

/// Report that the service is up.
#[utoipa::path(
    get,
    path = "/api/v1/healthcheck",
    responses((status = 200, description = "Service is healthy")),
    tags = ["health"],
    operation_id = "healthcheck"
)]
#[get("/healthcheck")]
pub async fn healthcheck() -> ApiResult<HttpResponse> {
    Ok(ok(json!({ "status": "ok" }), "service is healthy"))
}
