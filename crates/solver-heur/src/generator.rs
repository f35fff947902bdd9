use rand::seq::SliceRandom;
use rand::Rng;
use sched_core::{Gene, Problem};

/// Uniform slot and room; instructor drawn from the course's qualified set,
/// left empty when that set is empty.
pub fn random_gene<R: Rng>(problem: &Problem, course: usize, rng: &mut R) -> Gene {
    Gene {
        course,
        slot: rng.gen_range(0..problem.slot_count()),
        room: rng.gen_range(0..problem.room_count()),
        instructor: problem.qualified(course).choose(rng).copied(),
    }
}

/// One gene per course, in course input order.
pub fn random_individual<R: Rng>(problem: &Problem, rng: &mut R) -> Vec<Gene> {
    (0..problem.course_count())
        .map(|c| random_gene(problem, c, rng))
        .collect()
}

/// Expands a partial plan (e.g. greedy output with unscheduled courses) into
/// a full individual, filling missing courses with random genes.
pub fn complete_seed<R: Rng>(problem: &Problem, partial: &[Gene], rng: &mut R) -> Vec<Gene> {
    let mut slots: Vec<Option<Gene>> = vec![None; problem.course_count()];
    for g in partial {
        if g.course < slots.len() {
            slots[g.course] = Some(*g);
        }
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(c, g)| g.unwrap_or_else(|| random_gene(problem, c, rng)))
        .collect()
}
