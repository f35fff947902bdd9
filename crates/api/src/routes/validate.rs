use axum::{http::StatusCode, Json};
use sched_core::{validate, validate_config, ValidationError};
use serde::Serialize;
use types::SolveEnvelope;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationReport {
    pub ok: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/v1/validate",
    request_body = SolveEnvelope,
    responses(
    (status = 200, description = "Validation result for instance and engine options", body = ValidationReport)
    )
)]
pub async fn validate_handler(Json(env): Json<SolveEnvelope>) -> (StatusCode, Json<ValidationReport>) {
    let mut errs: Vec<String> = match validate(&env.instance) {
        Ok(()) => vec![],
        Err(ValidationError::Issues(issues)) => issues,
    };
    if let Err(e) = validate_config(&env.params.ga_config()) {
        errs.push(e.to_string());
    }
    (StatusCode::OK, Json(ValidationReport { ok: errs.is_empty(), errors: errs }))
}
