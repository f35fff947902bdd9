use parking_lot::RwLock;
use sched_core::{CancelToken, SolveEnvelope, SolveResult, Solver};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status")]
pub enum JobStatus {
    Queued,
    Running,
    Solved { result: SolveResult },
    Failed { message: String },
}

struct Entry {
    status: JobStatus,
    cancel: CancelToken,
}

#[derive(Clone)]
pub struct InMemJobs<S: Solver> {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
    solver: Arc<S>,
}

impl<S: Solver> InMemJobs<S> {
    pub fn new(solver: S) -> Self {
        Self {
            inner: Default::default(),
            solver: Arc::new(solver),
        }
    }

    pub fn enqueue(&self, env: SolveEnvelope) -> JobId {
        let id = Uuid::new_v4().to_string();
        let cancel = CancelToken::new();
        self.inner.write().insert(
            id.clone(),
            Entry {
                status: JobStatus::Queued,
                cancel: cancel.clone(),
            },
        );

        let map = self.inner.clone();
        let solver = self.solver.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            set_status(&map, &id_for_task, JobStatus::Running);
            match solver.solve(env, cancel).await {
                Ok(res) => {
                    info!(job = %id_for_task, fitness = res.fitness, "job solved");
                    set_status(&map, &id_for_task, JobStatus::Solved { result: res });
                }
                Err(e) => {
                    error!(?e, job = %id_for_task, "job failed");
                    set_status(
                        &map,
                        &id_for_task,
                        JobStatus::Failed {
                            message: e.to_string(),
                        },
                    );
                }
            }
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).map(|e| e.status.clone())
    }

    /// Asks a running job to stop after its current generation. Returns
    /// `false` for unknown ids.
    pub fn cancel(&self, id: &str) -> bool {
        match self.inner.read().get(id) {
            Some(e) => {
                e.cancel.cancel();
                true
            }
            None => false,
        }
    }
}

fn set_status(map: &RwLock<HashMap<String, Entry>>, id: &str, status: JobStatus) {
    if let Some(e) = map.write().get_mut(id) {
        e.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use types::{SolveStatus, StopReason};

    /// Spins until cancelled, then reports how it stopped.
    struct WaitForCancel;

    #[async_trait]
    impl Solver for WaitForCancel {
        async fn solve(&self, _env: SolveEnvelope, cancel: CancelToken) -> anyhow::Result<SolveResult> {
            while !cancel.is_cancelled() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            Ok(SolveResult {
                status: SolveStatus::Conflicted,
                stop: StopReason::Cancelled,
                fitness: -1,
                assignments: vec![],
                violations: vec![],
                fitness_trace: vec![-1],
                unscheduled: vec![],
                unqualified: vec![],
                stats: serde_json::json!({}),
            })
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl Solver for AlwaysFails {
        async fn solve(&self, _env: SolveEnvelope, _cancel: CancelToken) -> anyhow::Result<SolveResult> {
            anyhow::bail!("boom")
        }
    }

    fn env() -> SolveEnvelope {
        serde_json::from_value(serde_json::json!({
            "instance": {"courses": [], "instructors": [], "rooms": [], "timeslots": []}
        }))
        .unwrap()
    }

    async fn wait_done<S: Solver>(jobs: &InMemJobs<S>, id: &str) -> JobStatus {
        for _ in 0..200 {
            match jobs.get(id) {
                Some(s @ (JobStatus::Solved { .. } | JobStatus::Failed { .. })) => return s,
                _ => tokio::time::sleep(Duration::from_millis(5)).await,
            }
        }
        panic!("job {id} never finished");
    }

    #[tokio::test]
    async fn cancel_reaches_running_solver() {
        let jobs = InMemJobs::new(WaitForCancel);
        let id = jobs.enqueue(env());
        assert!(jobs.get(&id.0).is_some());
        assert!(jobs.cancel(&id.0));
        match wait_done(&jobs, &id.0).await {
            JobStatus::Solved { result } => assert_eq!(result.stop, StopReason::Cancelled),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!jobs.cancel("missing"));
    }

    #[tokio::test]
    async fn failures_are_recorded() {
        let jobs = InMemJobs::new(AlwaysFails);
        let id = jobs.enqueue(env());
        match wait_done(&jobs, &id.0).await {
            JobStatus::Failed { message } => assert_eq!(message, "boom"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(jobs.get("missing").is_none());
    }
}
