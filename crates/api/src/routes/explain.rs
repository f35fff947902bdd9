use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use sched_core::{scoring::explain as score, Problem};
use types::{Assignment, Instance, Violation, ViolationWeights};

#[derive(Deserialize, ToSchema)]
pub struct ExplainIn {
    pub instance: Instance,
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub weights: ViolationWeights,
}

#[derive(Serialize, ToSchema)]
pub struct ExplainOut {
    pub fitness: i64,
    pub penalty: u64,
    pub hard_violations: bool,
    pub violations: Vec<Violation>,
}

#[utoipa::path(
    post,
    path = "/v1/explain",
    request_body = ExplainIn,
    responses(
    (status = 200, description = "Weighted violation breakdown for provided timetable", body = ExplainOut),
    (status = 400, description = "Unknown ids or empty tables")
    )
)]
pub async fn explain(Json(input): Json<ExplainIn>) -> Result<Json<ExplainOut>, ApiError> {
    let problem = Problem::new(input.instance)?;
    let eval = score(&problem, &input.weights, &input.assignments)?;
    Ok(Json(ExplainOut {
        fitness: eval.fitness(),
        penalty: eval.penalty,
        hard_violations: eval.counts.has_hard(),
        violations: eval.violations(&input.weights),
    }))
}
