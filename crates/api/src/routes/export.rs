use axum::{response::IntoResponse, Json};
use http::header;
use serde::Deserialize;
use utoipa::ToSchema;

use sched_core::export::to_csv_string;
use types::{Assignment, Instance};

#[derive(Deserialize, ToSchema)]
pub struct ExportIn {
    pub instance: Instance,
    pub assignments: Vec<Assignment>,
}

#[utoipa::path(
    post,
    path = "/v1/export",
    request_body = ExportIn,
    responses((status = 200, description = "Timetable as CSV, one row per assignment", content_type = "text/csv"))
)]
pub async fn export(Json(input): Json<ExportIn>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        to_csv_string(&input.instance, &input.assignments),
    )
}
