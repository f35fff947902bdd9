pub mod export;
pub mod problem;
pub mod scoring;

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub use problem::{Gene, Problem};
pub use types::{
    Assignment, Course, GaConfig, Instance, Instructor, Room, SolveEnvelope, SolveParams,
    SolveResult, TimeSlot, TimeslotId,
};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid instance: {}", .0.join("; "))]
    Issues(Vec<String>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("empty input: no {0} supplied")]
    EmptyInput(&'static str),
    #[error("unknown {kind} id: {id}")]
    UnknownReference { kind: &'static str, id: String },
    #[error("invalid instance: {}", .0.join("; "))]
    InvalidInstance(Vec<String>),
}

pub fn validate(inst: &Instance) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    if inst.timeslots.is_empty() {
        errors.push("timeslots is empty".into());
    }
    if inst.courses.is_empty() {
        errors.push("courses is empty".into());
    }
    if inst.rooms.is_empty() {
        errors.push("rooms is empty".into());
    }
    if inst.instructors.is_empty() {
        errors.push("instructors is empty".into());
    }

    errors.extend(uniqueness_errors(inst));

    let instructors: HashSet<_> = inst.instructors.iter().map(|t| &t.id.0).collect();
    let courses: HashSet<_> = inst.courses.iter().map(|c| &c.id.0).collect();
    let times: HashSet<_> = inst.timeslots.iter().map(|t| &t.id.0).collect();

    for t in &inst.instructors {
        for slot in &t.availability {
            if !times.contains(&slot.0) {
                errors.push(format!("instructor {} has unknown slot {}", t.id, slot));
            }
        }
        for c in &t.qualifications {
            if !courses.contains(&c.0) {
                errors.push(format!("instructor {} qualifies for unknown course {}", t.id, c));
            }
        }
    }

    for c in &inst.courses {
        for t in &c.qualified_instructors {
            if !instructors.contains(&t.0) {
                errors.push(format!(
                    "course {} references missing instructor {}",
                    c.id, t
                ));
            }
        }
    }

    for r in &inst.registrations {
        for c in &r.courses {
            if !courses.contains(&c.0) {
                errors.push(format!(
                    "student {} registered for unknown course {}",
                    r.student_id, c
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Issues(errors))
    }
}

/// Duplicate ids in any table and timeslots sharing a (day, start) pair.
pub(crate) fn uniqueness_errors(inst: &Instance) -> Vec<String> {
    fn chk_unique<'a>(name: &str, ids: impl Iterator<Item = &'a String>, errors: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                errors.push(format!("duplicate {name} id: {id}"));
            }
        }
    }

    let mut errors = Vec::new();
    chk_unique("instructor", inst.instructors.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("room", inst.rooms.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("course", inst.courses.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("timeslot", inst.timeslots.iter().map(|x| &x.id.0), &mut errors);

    let mut day_start = HashSet::new();
    for t in &inst.timeslots {
        if !day_start.insert((t.day, t.start.as_str())) {
            errors.push(format!(
                "timeslot {} repeats day/start {:?} {}",
                t.id, t.day, t.start
            ));
        }
    }
    errors
}

pub fn validate_config(cfg: &GaConfig) -> Result<(), EngineError> {
    let fail = |msg: String| Err(EngineError::Configuration(msg));
    if cfg.population_size < 2 {
        return fail(format!(
            "population_size must be at least 2, got {}",
            cfg.population_size
        ));
    }
    if cfg.generations == 0 {
        return fail("generations must be positive".into());
    }
    if cfg.elite_count > cfg.tournament_pool {
        return fail(format!(
            "elite_count {} exceeds tournament_pool {}",
            cfg.elite_count, cfg.tournament_pool
        ));
    }
    if cfg.tournament_pool > cfg.population_size {
        return fail(format!(
            "tournament_pool {} exceeds population_size {}",
            cfg.tournament_pool, cfg.population_size
        ));
    }
    if cfg.tournament_pool < 2 && cfg.elite_count < cfg.population_size {
        return fail("tournament_pool must hold at least 2 parents".into());
    }
    if !(0.0..=1.0).contains(&cfg.mutation_rate) {
        return fail(format!(
            "mutation_rate must lie in [0, 1], got {}",
            cfg.mutation_rate
        ));
    }
    if cfg.stall_generations == Some(0) {
        return fail("stall_generations must be positive when set".into());
    }
    Ok(())
}

/// Cooperative stop flag shared between a running search and its caller.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[async_trait]
pub trait Solver: Send + Sync + 'static {
    async fn solve(&self, env: SolveEnvelope, cancel: CancelToken) -> anyhow::Result<SolveResult>;
}
