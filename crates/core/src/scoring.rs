//! Weighted constraint-violation evaluator.
//!
//! Conflicts are found by grouping genes on (room, slot), (instructor, slot)
//! and (student, slot) keys, so one evaluation is linear in the number of
//! genes plus registrations.

use std::collections::HashMap;
use types::{Assignment, Violation, ViolationKind, ViolationWeights};

use crate::{EngineError, Gene, Problem};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViolationCounts {
    pub room_double_booking: u64,
    pub instructor_double_booking: u64,
    pub student_clash: u64,
    pub room_capacity: u64,
    pub unassigned_instructor: u64,
    /// Hours above max load, summed over instructors.
    pub instructor_overload: u64,
    pub instructor_unavailable: u64,
    pub room_type_mismatch: u64,
}

impl ViolationCounts {
    pub fn get(&self, kind: ViolationKind) -> u64 {
        match kind {
            ViolationKind::RoomDoubleBooking => self.room_double_booking,
            ViolationKind::InstructorDoubleBooking => self.instructor_double_booking,
            ViolationKind::StudentClash => self.student_clash,
            ViolationKind::RoomCapacity => self.room_capacity,
            ViolationKind::UnassignedInstructor => self.unassigned_instructor,
            ViolationKind::InstructorOverload => self.instructor_overload,
            ViolationKind::InstructorUnavailable => self.instructor_unavailable,
            ViolationKind::RoomTypeMismatch => self.room_type_mismatch,
        }
    }

    pub fn has_hard(&self) -> bool {
        ViolationKind::ALL
            .iter()
            .any(|&k| k.is_hard() && self.get(k) > 0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub counts: ViolationCounts,
    pub penalty: u64,
}

impl Evaluation {
    /// Higher is better; zero is the maximum.
    pub fn fitness(&self) -> i64 {
        -(self.penalty.min(i64::MAX as u64) as i64)
    }

    /// Non-zero kinds with their weighted penalty.
    pub fn violations(&self, weights: &ViolationWeights) -> Vec<Violation> {
        ViolationKind::ALL
            .iter()
            .filter_map(|&kind| {
                let count = self.counts.get(kind);
                if count == 0 {
                    return None;
                }
                let weight = weights.weight(kind);
                Some(Violation {
                    kind,
                    count,
                    weight,
                    penalty: count * weight as u64,
                })
            })
            .collect()
    }
}

/// Excess occupants per key: a key used `k` times contributes `k - 1`.
fn excess<K: std::hash::Hash + Eq>(keys: impl Iterator<Item = K>) -> u64 {
    let mut seen: HashMap<K, u64> = HashMap::new();
    let mut total = 0u64;
    for k in keys {
        let n = seen.entry(k).or_insert(0);
        if *n > 0 {
            total += 1;
        }
        *n += 1;
    }
    total
}

pub fn count_violations(problem: &Problem, genes: &[Gene]) -> ViolationCounts {
    let mut counts = ViolationCounts {
        room_double_booking: excess(genes.iter().map(|g| (g.room, g.slot))),
        instructor_double_booking: excess(
            genes
                .iter()
                .filter_map(|g| g.instructor.map(|t| (t, g.slot))),
        ),
        ..Default::default()
    };

    let mut load = vec![0u64; problem.instructor_count()];
    let mut slot_of: Vec<Option<usize>> = vec![None; problem.course_count()];

    for g in genes {
        slot_of[g.course] = Some(g.slot);
        if problem.room_capacity(g.room) < problem.enrollment(g.course) {
            counts.room_capacity += 1;
        }
        if !problem.room_type_ok(g.course, g.room) {
            counts.room_type_mismatch += 1;
        }
        match g.instructor {
            None => counts.unassigned_instructor += 1,
            Some(t) => {
                load[t] += problem.course_hours(g.course) as u64;
                if !problem.is_available(t, g.slot) {
                    counts.instructor_unavailable += 1;
                }
            }
        }
    }

    counts.instructor_overload = load
        .iter()
        .enumerate()
        .map(|(t, &l)| l.saturating_sub(problem.max_load(t) as u64))
        .sum();

    let mut slots: Vec<usize> = Vec::new();
    for courses in problem.registrations() {
        slots.clear();
        slots.extend(courses.iter().filter_map(|&c| slot_of[c]));
        slots.sort_unstable();
        counts.student_clash += slots.windows(2).filter(|w| w[0] == w[1]).count() as u64;
    }

    counts
}

pub fn evaluate(problem: &Problem, weights: &ViolationWeights, genes: &[Gene]) -> Evaluation {
    let counts = count_violations(problem, genes);
    let penalty = ViolationKind::ALL
        .iter()
        .map(|&k| counts.get(k) * weights.weight(k) as u64)
        .sum();
    Evaluation { counts, penalty }
}

/// Scores an id-based timetable, e.g. one edited by hand after export.
pub fn explain(
    problem: &Problem,
    weights: &ViolationWeights,
    assignments: &[Assignment],
) -> Result<Evaluation, EngineError> {
    let genes = assignments
        .iter()
        .map(|a| problem.to_gene(a))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(evaluate(problem, weights, &genes))
}
