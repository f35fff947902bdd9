use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{CourseId, DayOfWeek, InstructorId, RoomId, TimeslotId, ViolationKind};

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub course_id: CourseId,
    pub time_slot_id: TimeslotId,
    pub room_id: RoomId,
    pub instructor_id: Option<InstructorId>,
}

/// Flat export row, one per assignment.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct AssignmentRow {
    pub course_id: String,
    pub time_slot_id: String,
    pub day: Option<DayOfWeek>,
    pub start: String,
    pub room_id: String,
    pub instructor_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub count: u64,
    pub weight: u32,
    pub penalty: u64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Every course placed with no hard violation.
    Feasible,
    /// Every course placed but hard violations remain.
    Conflicted,
    /// Some courses could not be placed.
    Incomplete,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Completed,
    Converged,
    Stalled,
    Cancelled,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolveResult {
    pub status: SolveStatus,
    pub stop: StopReason,
    /// Negated weighted penalty; zero is a conflict-free timetable.
    pub fitness: i64,
    pub assignments: Vec<Assignment>,
    pub violations: Vec<Violation>,
    #[serde(default)]
    pub fitness_trace: Vec<i64>,
    #[serde(default)]
    pub unscheduled: Vec<CourseId>,
    #[serde(default)]
    pub unqualified: Vec<CourseId>,
    pub stats: serde_json::Value,
}
