//! Generational loop: evaluate, rank, keep the elite, breed from the top of
//! the ranking, mutate, repeat.

use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use sched_core::scoring::{evaluate, Evaluation};
use sched_core::{validate_config, CancelToken, EngineError, Gene, GaConfig, Problem};
use tracing::{debug, info};
use types::StopReason;

use crate::generator::random_individual;
use crate::operators::{crossover, mutate};

#[derive(Clone, Debug)]
pub struct Scored {
    pub genes: Vec<Gene>,
    pub eval: Evaluation,
}

#[derive(Clone, Debug)]
pub struct Outcome {
    pub best: Scored,
    /// Best fitness of the initial population, then one entry per generation.
    pub trace: Vec<i64>,
    pub generations: usize,
    pub stop: StopReason,
    pub seed: u64,
}

fn evaluate_all(problem: &Problem, cfg: &GaConfig, individuals: Vec<Vec<Gene>>) -> Vec<Scored> {
    let weights = &cfg.violation_weights;
    let score = |genes: Vec<Gene>| {
        let eval = evaluate(problem, weights, &genes);
        Scored { genes, eval }
    };
    if cfg.parallel {
        individuals.into_par_iter().map(score).collect()
    } else {
        individuals.into_iter().map(score).collect()
    }
}

/// Stable sort on penalty: equal scores keep their population order.
fn rank(pop: &mut [Scored]) {
    pop.sort_by_key(|s| s.eval.penalty);
}

fn breed(problem: &Problem, cfg: &GaConfig, pop: &[Scored], rng: &mut ChaCha8Rng) -> Vec<Vec<Gene>> {
    let need = cfg.population_size.saturating_sub(cfg.elite_count);
    let pool = cfg.tournament_pool.min(pop.len());
    let mut children = Vec::with_capacity(need);
    while children.len() < need {
        let picks = index::sample(rng, pool, 2);
        let (p1, p2) = (&pop[picks.index(0)].genes, &pop[picks.index(1)].genes);
        let (mut a, mut b) = crossover(p1, p2, rng);
        mutate(problem, &mut a, cfg.mutation_rate, rng);
        children.push(a);
        if children.len() < need {
            mutate(problem, &mut b, cfg.mutation_rate, rng);
            children.push(b);
        }
    }
    children
}

/// Runs the search. `seeds` are complete individuals placed ahead of the
/// random ones (extra seeds beyond the population size are dropped).
pub fn evolve(
    problem: &Problem,
    cfg: &GaConfig,
    seeds: Vec<Vec<Gene>>,
    cancel: &CancelToken,
) -> Result<Outcome, EngineError> {
    run(problem, cfg, seeds, || cancel.is_cancelled())
}

/// `stop_requested` is polled once before every generation.
fn run<F: FnMut() -> bool>(
    problem: &Problem,
    cfg: &GaConfig,
    seeds: Vec<Vec<Gene>>,
    mut stop_requested: F,
) -> Result<Outcome, EngineError> {
    validate_config(cfg)?;
    for s in &seeds {
        if s.len() != problem.course_count() || s.iter().enumerate().any(|(i, g)| g.course != i) {
            return Err(EngineError::Configuration(
                "seed individual must hold one gene per course in course order".into(),
            ));
        }
    }

    let seed = cfg.random_seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    info!(
        seed,
        courses = problem.course_count(),
        population = cfg.population_size,
        generations = cfg.generations,
        "starting genetic search"
    );

    let mut initial: Vec<Vec<Gene>> = seeds.into_iter().take(cfg.population_size).collect();
    while initial.len() < cfg.population_size {
        initial.push(random_individual(problem, &mut rng));
    }
    let mut pop = evaluate_all(problem, cfg, initial);
    rank(&mut pop);

    let mut trace = vec![pop[0].eval.fitness()];
    let mut best_penalty = pop[0].eval.penalty;
    let mut since_improvement = 0usize;
    let mut generations = 0usize;
    let mut stop = StopReason::Completed;

    if best_penalty == 0 {
        stop = StopReason::Converged;
    } else {
        for gen in 1..=cfg.generations {
            if stop_requested() {
                stop = StopReason::Cancelled;
                break;
            }
            let offspring = breed(problem, cfg, &pop, &mut rng);
            let offspring = evaluate_all(problem, cfg, offspring);
            pop.truncate(cfg.elite_count);
            pop.extend(offspring);
            rank(&mut pop);

            generations = gen;
            let best = pop[0].eval.penalty;
            trace.push(pop[0].eval.fitness());
            debug!(generation = gen, best_penalty = best, "generation done");

            if best == 0 {
                stop = StopReason::Converged;
                break;
            }
            if best < best_penalty {
                best_penalty = best;
                since_improvement = 0;
            } else {
                since_improvement += 1;
                if cfg.stall_generations.is_some_and(|k| since_improvement >= k) {
                    stop = StopReason::Stalled;
                    break;
                }
            }
        }
    }

    let best = pop.swap_remove(0);
    info!(
        generations,
        penalty = best.eval.penalty,
        stop = ?stop,
        "genetic search finished"
    );
    Ok(Outcome {
        best,
        trace,
        generations,
        stop,
        seed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> Problem {
        let inst: types::Instance = serde_json::from_value(serde_json::json!({
            "courses": [
                {"id": "C1", "theoryHours": 2, "enrollment": 30},
                {"id": "C2", "theoryHours": 2, "enrollment": 25},
                {"id": "C3", "theoryHours": 2, "enrollment": 20},
                {"id": "C4", "theoryHours": 2, "enrollment": 20},
                {"id": "C5", "theoryHours": 2, "enrollment": 15},
                {"id": "C6", "theoryHours": 2, "enrollment": 15}
            ],
            "instructors": [
                {"id": "T1", "qualifications": ["C1", "C2", "C3"], "maxLoad": 8},
                {"id": "T2", "qualifications": ["C3", "C4", "C5", "C6"], "maxLoad": 8}
            ],
            "rooms": [{"id": "R1", "capacity": 30}, {"id": "R2", "capacity": 20}],
            "timeslots": [
                {"id": "mon.1", "day": "mon", "start": "09:00"},
                {"id": "mon.2", "day": "mon", "start": "11:00"},
                {"id": "tue.1", "day": "tue", "start": "09:00"}
            ],
            "registrations": [
                {"studentId": "S1", "courses": ["C1", "C4"]},
                {"studentId": "S2", "courses": ["C2", "C5", "C6"]}
            ]
        }))
        .unwrap();
        Problem::new(inst).unwrap()
    }

    fn cfg(seed: u64) -> GaConfig {
        GaConfig {
            population_size: 16,
            generations: 25,
            elite_count: 4,
            tournament_pool: 8,
            random_seed: Some(seed),
            parallel: false,
            ..GaConfig::default()
        }
    }

    #[test]
    fn elite_best_never_regresses() {
        let p = problem();
        let out = evolve(&p, &cfg(5), vec![], &CancelToken::new()).unwrap();
        assert_eq!(out.trace.len(), out.generations + 1);
        for w in out.trace.windows(2) {
            assert!(w[1] >= w[0], "trace regressed: {:?}", out.trace);
        }
        assert_eq!(*out.trace.last().unwrap(), out.best.eval.fitness());
    }

    #[test]
    fn same_seed_same_result_in_both_modes() {
        let p = problem();
        let a = evolve(&p, &cfg(42), vec![], &CancelToken::new()).unwrap();
        let b = evolve(&p, &cfg(42), vec![], &CancelToken::new()).unwrap();
        let mut par = cfg(42);
        par.parallel = true;
        let c = evolve(&p, &par, vec![], &CancelToken::new()).unwrap();
        assert_eq!(a.best.genes, b.best.genes);
        assert_eq!(a.trace, b.trace);
        assert_eq!(a.best.genes, c.best.genes);
        assert_eq!(a.trace, c.trace);
    }

    /// Course C7 has no qualified instructor, so the penalty never reaches 0.
    fn unsolvable_problem() -> Problem {
        let mut inst = problem().instance().clone();
        let mut extra = inst.courses[0].clone();
        extra.id = "C7".into();
        inst.courses.push(extra);
        Problem::new(inst).unwrap()
    }

    #[test]
    fn cancelled_run_returns_initial_best() {
        let p = unsolvable_problem();
        let token = CancelToken::new();
        token.cancel();
        let out = evolve(&p, &cfg(9), vec![], &token).unwrap();
        assert_eq!(out.stop, StopReason::Cancelled);
        assert_eq!(out.generations, 0);
        assert_eq!(out.trace.len(), 1);
        assert_eq!(out.best.genes.len(), 7);
    }

    #[test]
    fn cancel_mid_run_keeps_best_so_far() {
        let p = unsolvable_problem();
        let mut checks = 0;
        let out = run(&p, &cfg(11), vec![], || {
            checks += 1;
            checks > 5
        })
        .unwrap();
        assert_eq!(out.stop, StopReason::Cancelled);
        assert_eq!(out.generations, 5);
        assert_eq!(out.trace.len(), 6);
        assert_eq!(out.trace.last(), Some(&out.best.eval.fitness()));
        assert!(out.best.eval.penalty > 0);
    }

    #[test]
    fn rejects_bad_config_and_seeds() {
        let p = problem();
        let mut bad = cfg(1);
        bad.population_size = 1;
        assert!(matches!(
            evolve(&p, &bad, vec![], &CancelToken::new()),
            Err(EngineError::Configuration(_))
        ));

        let short = vec![Gene {
            course: 0,
            slot: 0,
            room: 0,
            instructor: None,
        }];
        assert!(matches!(
            evolve(&p, &cfg(1), vec![short], &CancelToken::new()),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn stall_limit_stops_early() {
        let p = problem();
        let mut c = cfg(3);
        c.generations = 500;
        c.stall_generations = Some(3);
        let out = evolve(&p, &c, vec![], &CancelToken::new()).unwrap();
        assert!(matches!(out.stop, StopReason::Stalled | StopReason::Converged));
        assert!(out.generations < 500);
    }
}
