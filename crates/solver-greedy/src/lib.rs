use async_trait::async_trait;
use sched_core::scoring::evaluate;
use sched_core::{CancelToken, Gene, Problem, SolveEnvelope, SolveResult, Solver};
use tracing::info;
use types::{SolveStatus, StopReason, ViolationWeights};

pub struct GreedySolver;
impl GreedySolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GreedySolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Solver for GreedySolver {
    async fn solve(&self, env: SolveEnvelope, _cancel: CancelToken) -> anyhow::Result<SolveResult> {
        info!("greedy run over {} courses", env.instance.courses.len());
        let problem = Problem::new(env.instance)?;
        let plan = plan(&problem);
        Ok(plan.into_result(&problem, &env.params.ga_config().violation_weights))
    }
}

/// Output of one greedy pass. `genes` is in course input order.
#[derive(Clone, Debug)]
pub struct GreedyPlan {
    pub genes: Vec<Gene>,
    pub unscheduled: Vec<usize>,
}

impl GreedyPlan {
    pub fn into_result(self, problem: &Problem, weights: &ViolationWeights) -> SolveResult {
        let eval = evaluate(problem, weights, &self.genes);
        let status = if !self.unscheduled.is_empty() {
            SolveStatus::Incomplete
        } else if eval.counts.has_hard() {
            SolveStatus::Conflicted
        } else {
            SolveStatus::Feasible
        };
        SolveResult {
            status,
            stop: StopReason::Completed,
            fitness: eval.fitness(),
            assignments: self.genes.iter().map(|g| problem.to_assignment(g)).collect(),
            violations: eval.violations(weights),
            fitness_trace: vec![eval.fitness()],
            unscheduled: self
                .unscheduled
                .iter()
                .map(|&c| problem.course_id(c).clone())
                .collect(),
            unqualified: problem
                .unqualified_courses()
                .into_iter()
                .map(|c| problem.course_id(c).clone())
                .collect(),
            stats: serde_json::json!({
                "method": "greedy",
                "timeslots": problem.slot_count(),
                "courses": problem.course_count(),
                "rooms": problem.room_count(),
                "placed": self.genes.len(),
            }),
        }
    }
}

struct Occupancy {
    rooms: usize,
    instructors: usize,
    room: Vec<bool>,
    instructor: Vec<bool>,
    load: Vec<u32>,
}

impl Occupancy {
    fn new(p: &Problem) -> Self {
        Self {
            rooms: p.room_count(),
            instructors: p.instructor_count(),
            room: vec![false; p.slot_count() * p.room_count()],
            instructor: vec![false; p.slot_count() * p.instructor_count()],
            load: vec![0; p.instructor_count()],
        }
    }

    fn free_room(&self, p: &Problem, course: usize, slot: usize) -> Option<usize> {
        (0..self.rooms).find(|&r| !self.room[slot * self.rooms + r] && p.room_fits(course, r))
    }

    fn free_instructor(&self, p: &Problem, course: usize, slot: usize) -> Option<usize> {
        let hours = p.course_hours(course);
        p.qualified(course).iter().copied().find(|&t| {
            !self.instructor[slot * self.instructors + t]
                && p.is_available(t, slot)
                && self.load[t] + hours <= p.max_load(t)
        })
    }

    fn book(&mut self, p: &Problem, g: &Gene) {
        self.room[g.slot * self.rooms + g.room] = true;
        if let Some(t) = g.instructor {
            self.instructor[g.slot * self.instructors + t] = true;
            self.load[t] += p.course_hours(g.course);
        }
    }
}

/// Deterministic first-fit allocation.
///
/// Slots are walked in (day, start) order and courses in input order. The
/// first pass only places a course when a fitting room and a free, available,
/// under-load qualified instructor exist in the slot. The second pass places
/// what is left into any free fitting room without an instructor. Courses that
/// fit nowhere are reported as unscheduled.
pub fn plan(problem: &Problem) -> GreedyPlan {
    let mut occ = Occupancy::new(problem);
    let mut placed: Vec<Option<Gene>> = vec![None; problem.course_count()];

    for staffed in [true, false] {
        for &slot in problem.canonical_slots() {
            for course in 0..problem.course_count() {
                if placed[course].is_some() {
                    continue;
                }
                let Some(room) = occ.free_room(problem, course, slot) else {
                    continue;
                };
                let instructor = if staffed {
                    match occ.free_instructor(problem, course, slot) {
                        Some(t) => Some(t),
                        None => continue,
                    }
                } else {
                    None
                };
                let g = Gene {
                    course,
                    slot,
                    room,
                    instructor,
                };
                occ.book(problem, &g);
                placed[course] = Some(g);
            }
        }
    }

    let unscheduled: Vec<usize> = (0..problem.course_count())
        .filter(|&c| placed[c].is_none())
        .collect();
    if !unscheduled.is_empty() {
        info!(count = unscheduled.len(), "greedy left courses unscheduled");
    }
    GreedyPlan {
        genes: placed.into_iter().flatten().collect(),
        unscheduled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Instance;

    fn three_courses_one_slot() -> Problem {
        let inst: Instance = serde_json::from_value(serde_json::json!({
            "courses": [
                {"id": "C1", "theoryHours": 1, "enrollment": 25},
                {"id": "C2", "theoryHours": 1, "enrollment": 20},
                {"id": "C3", "theoryHours": 1, "enrollment": 15}
            ],
            "instructors": [
                {"id": "T1", "qualifications": ["C1", "C2", "C3"], "maxLoad": 2}
            ],
            "rooms": [
                {"id": "R1", "capacity": 30},
                {"id": "R2", "capacity": 50}
            ],
            "timeslots": [{"id": "mon.1", "day": "mon", "start": "09:00"}]
        }))
        .unwrap();
        Problem::new(inst).unwrap()
    }

    #[test]
    fn single_slot_places_two_and_reports_one() {
        let p = three_courses_one_slot();
        let plan = plan(&p);
        assert_eq!(plan.genes.len(), 2);
        assert_eq!(plan.unscheduled, vec![2]);

        assert_eq!(plan.genes[0].course, 0);
        assert_eq!(plan.genes[0].room, 0);
        assert_eq!(plan.genes[0].instructor, Some(0));
        assert_eq!(plan.genes[1].course, 1);
        assert_eq!(plan.genes[1].room, 1);
        assert_eq!(plan.genes[1].instructor, None);

        let res = plan.into_result(&p, &ViolationWeights::default());
        assert_eq!(res.status, SolveStatus::Incomplete);
        assert_eq!(res.unscheduled, vec!["C3".into()]);
        assert_eq!(res.assignments.len(), 2);
    }

    #[test]
    fn spreads_over_slots_before_leaving_staff_empty() {
        let inst: Instance = serde_json::from_value(serde_json::json!({
            "courses": [
                {"id": "C1", "theoryHours": 1, "enrollment": 25},
                {"id": "C2", "theoryHours": 1, "enrollment": 20},
                {"id": "C3", "theoryHours": 1, "enrollment": 15}
            ],
            "instructors": [
                {"id": "T1", "qualifications": ["C1", "C2", "C3"], "maxLoad": 3}
            ],
            "rooms": [{"id": "R1", "capacity": 30}, {"id": "R2", "capacity": 50}],
            "timeslots": [
                {"id": "tue.1", "day": "tue", "start": "09:00"},
                {"id": "mon.2", "day": "mon", "start": "11:00"},
                {"id": "mon.1", "day": "mon", "start": "09:00"}
            ]
        }))
        .unwrap();
        let p = Problem::new(inst).unwrap();
        let plan = plan(&p);
        assert!(plan.unscheduled.is_empty());
        let slots: Vec<usize> = plan.genes.iter().map(|g| g.slot).collect();
        assert_eq!(slots, vec![2, 1, 0]);
        assert!(plan.genes.iter().all(|g| g.instructor == Some(0)));
        let res = plan.into_result(&p, &ViolationWeights::default());
        assert_eq!(res.status, SolveStatus::Feasible);
        assert_eq!(res.fitness, 0);
    }

    #[test]
    fn respects_capacity_and_load() {
        let inst: Instance = serde_json::from_value(serde_json::json!({
            "courses": [
                {"id": "BIG", "theoryHours": 2, "enrollment": 80},
                {"id": "C2", "theoryHours": 3, "enrollment": 20},
                {"id": "C3", "theoryHours": 3, "enrollment": 20}
            ],
            "instructors": [
                {"id": "T1", "qualifications": ["BIG", "C2", "C3"], "maxLoad": 4},
                {"id": "T2", "qualifications": ["C3"], "maxLoad": 4}
            ],
            "rooms": [{"id": "R1", "capacity": 30}],
            "timeslots": [
                {"id": "mon.1", "day": "mon", "start": "09:00"},
                {"id": "mon.2", "day": "mon", "start": "11:00"}
            ]
        }))
        .unwrap();
        let p = Problem::new(inst).unwrap();
        let plan = plan(&p);
        assert_eq!(plan.unscheduled, vec![0]);
        assert_eq!(plan.genes[0].course, 1);
        assert_eq!(plan.genes[0].instructor, Some(0));
        assert_eq!(plan.genes[1].course, 2);
        assert_eq!(plan.genes[1].instructor, Some(1));
    }

    #[tokio::test]
    async fn solver_trait_wraps_plan() {
        let p = three_courses_one_slot();
        let env = SolveEnvelope {
            instance: p.instance().clone(),
            params: Default::default(),
        };
        let res = GreedySolver::new()
            .solve(env, CancelToken::new())
            .await
            .unwrap();
        assert_eq!(res.unscheduled.len(), 1);
        assert_eq!(res.stats["method"], "greedy");
    }
}
