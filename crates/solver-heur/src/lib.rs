pub mod evolution;
pub mod generator;
pub mod operators;

use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::{
    validate_config, CancelToken, EngineError, GaConfig, Gene, Problem, SolveEnvelope,
    SolveResult, Solver,
};
use tracing::warn;
use types::SolveStatus;

pub use evolution::{evolve, Outcome, Scored};

pub struct HeurSolver;
impl HeurSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HeurSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Solver for HeurSolver {
    async fn solve(&self, env: SolveEnvelope, cancel: CancelToken) -> anyhow::Result<SolveResult> {
        let cfg = env.params.ga_config();
        validate_config(&cfg)?;
        let problem = Problem::new(env.instance)?;
        let outcome = self.improve_from(&problem, &cfg, &[], &cancel)?;
        Ok(into_result(&problem, &cfg, outcome, "ga"))
    }
}

impl HeurSolver {
    /// Evolves a population that starts from `base`, a possibly partial plan
    /// (courses missing from it get random genes). An empty `base` gives a
    /// purely random start. Seed completion and the search share one run
    /// seed, drawn here when `cfg` carries none.
    pub fn improve_from(
        &self,
        problem: &Problem,
        cfg: &GaConfig,
        base: &[Gene],
        cancel: &CancelToken,
    ) -> Result<Outcome, EngineError> {
        for c in problem.unqualified_courses() {
            warn!(course = %problem.course_id(c), "no qualified instructor");
        }
        let run_seed = cfg.random_seed.unwrap_or_else(rand::random);
        let cfg = GaConfig {
            random_seed: Some(run_seed),
            ..cfg.clone()
        };
        let seeds = if base.is_empty() {
            Vec::new()
        } else {
            let mut rng = ChaCha8Rng::seed_from_u64(run_seed ^ 0x9E37_79B9_7F4A_7C15);
            vec![generator::complete_seed(problem, base, &mut rng)]
        };
        evolve(problem, &cfg, seeds, cancel)
    }
}

pub fn into_result(problem: &Problem, cfg: &GaConfig, outcome: Outcome, method: &str) -> SolveResult {
    let weights = &cfg.violation_weights;
    let eval = &outcome.best.eval;
    SolveResult {
        status: if eval.counts.has_hard() {
            SolveStatus::Conflicted
        } else {
            SolveStatus::Feasible
        },
        stop: outcome.stop,
        fitness: eval.fitness(),
        assignments: outcome
            .best
            .genes
            .iter()
            .map(|g| problem.to_assignment(g))
            .collect(),
        violations: eval.violations(weights),
        fitness_trace: outcome.trace,
        unscheduled: vec![],
        unqualified: problem
            .unqualified_courses()
            .into_iter()
            .map(|c| problem.course_id(c).clone())
            .collect(),
        stats: serde_json::json!({
            "method": method,
            "seed": outcome.seed,
            "population": cfg.population_size,
            "generations": outcome.generations,
            "penalty": eval.penalty,
        }),
    }
}
