use axum::{extract::{Path, State}, Json};
use crate::state::AppState;
use utoipa;
use types::SolveResult;

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}",
        params(("id" = String, Path, description = "Job ID")),
        responses((status = 200, description = "Job status", body = jobs::JobStatus))
    )]
pub async fn status(State(state): State<AppState>, Path(id): Path<String>) -> Json<serde_json::Value> {
    let st = state.jobs.get(&id);
    Json(match st {
        None => serde_json::json!({"status": "not_found"}),
        Some(s) => serde_json::to_value(s).unwrap_or_else(|e| serde_json::json!({"status": "error", "message": e.to_string()})),
    })
}

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}/result",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "Solve result (if ready)", body = SolveResult)
        )
    )]
pub async fn result(State(state): State<AppState>, Path(id): Path<String>) -> Json<serde_json::Value> {
    let st = state.jobs.get(&id);
    Json(match st {
        Some(jobs::JobStatus::Solved { result }) => serde_json::to_value(result).unwrap_or_else(|e| serde_json::json!({"status": "error", "message": e.to_string()})),
        Some(_) => serde_json::json!({"status": "not_ready"}),
        None => serde_json::json!({"status": "not_found"}),
    })
}

#[utoipa::path(
        post,
        path = "/v1/jobs/{id}/cancel",
        params(("id" = String, Path, description = "Job ID")),
        responses((status = 200, description = "Cancellation requested; the job keeps its best-so-far timetable"))
    )]
pub async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> Json<serde_json::Value> {
    Json(if state.jobs.cancel(&id) {
        serde_json::json!({"status": "cancelling"})
    } else {
        serde_json::json!({"status": "not_found"})
    })
}
