use async_trait::async_trait;
use jobs::InMemJobs;
use sched_core::{validate_config, CancelToken, Problem, SolveEnvelope, SolveResult, Solver};
use solver_greedy::GreedySolver;
use solver_heur::HeurSolver;
use std::sync::Arc;
use tracing::info;
use types::SolverKind;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs<DispatchSolver>>,
}

#[derive(Clone)]
pub struct DispatchSolver {
    greedy: Arc<GreedySolver>,
    heur: Arc<HeurSolver>,
}

impl DispatchSolver {
    pub fn new() -> Self {
        Self {
            greedy: Arc::new(GreedySolver::new()),
            heur: Arc::new(HeurSolver::new()),
        }
    }

    fn hybrid(&self, env: SolveEnvelope, cancel: CancelToken) -> anyhow::Result<SolveResult> {
        let cfg = env.params.ga_config();
        validate_config(&cfg)?;
        let problem = Problem::new(env.instance)?;

        let plan = solver_greedy::plan(&problem);
        let greedy_fitness =
            sched_core::scoring::evaluate(&problem, &cfg.violation_weights, &plan.genes).fitness();
        info!(
            placed = plan.genes.len(),
            unscheduled = plan.unscheduled.len(),
            greedy_fitness,
            "greedy seed ready"
        );

        let outcome = self.heur.improve_from(&problem, &cfg, &plan.genes, &cancel)?;
        let mut res = solver_heur::into_result(&problem, &cfg, outcome, "greedy+ga");
        res.stats["greedy_unscheduled"] = serde_json::json!(plan.unscheduled.len());
        res.stats["greedy_fitness"] = serde_json::json!(greedy_fitness);
        Ok(res)
    }
}

#[async_trait]
impl Solver for DispatchSolver {
    async fn solve(&self, env: SolveEnvelope, cancel: CancelToken) -> anyhow::Result<SolveResult> {
        match env.params.solver {
            SolverKind::Greedy => self.greedy.solve(env, cancel).await,
            SolverKind::Genetic => self.heur.solve(env, cancel).await,
            SolverKind::Hybrid => self.hybrid(env, cancel),
        }
    }
}

impl AppState {
    pub fn new_default() -> Self {
        let jobs = InMemJobs::new(DispatchSolver::new());
        Self {
            jobs: Arc::new(jobs),
        }
    }
}
