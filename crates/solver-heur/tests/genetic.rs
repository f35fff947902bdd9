use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::{CancelToken, EngineError, Gene, Problem, Solver};
use solver_heur::generator::random_individual;
use solver_heur::operators::{crossover, mutate};
use solver_heur::HeurSolver;
use types::{GaConfig, Instance, SolveEnvelope, SolveParams, SolveStatus, SolverKind, StopReason};

fn instance(courses: usize, qualified: bool) -> Instance {
    let course_rows: Vec<_> = (0..courses)
        .map(|i| {
            serde_json::json!({
                "id": format!("C{i}"),
                "theoryHours": 2,
                "enrollment": 20 + (i % 3) * 5,
            })
        })
        .collect();
    let quals: Vec<String> = if qualified {
        (0..courses).map(|i| format!("C{i}")).collect()
    } else {
        vec![]
    };
    serde_json::from_value(serde_json::json!({
        "courses": course_rows,
        "instructors": [
            {"id": "T1", "qualifications": quals, "maxLoad": 40},
            {"id": "T2", "qualifications": quals, "maxLoad": 40}
        ],
        "rooms": [{"id": "R1", "capacity": 40}, {"id": "R2", "capacity": 40}],
        "timeslots": [
            {"id": "mon.1", "day": "mon", "start": "09:00"},
            {"id": "mon.2", "day": "mon", "start": "11:00"},
            {"id": "tue.1", "day": "tue", "start": "09:00"},
            {"id": "tue.2", "day": "tue", "start": "11:00"}
        ]
    }))
    .unwrap()
}

fn envelope(inst: Instance, seed: u64) -> SolveEnvelope {
    SolveEnvelope {
        instance: inst,
        params: SolveParams {
            solver: SolverKind::Genetic,
            config: Some(GaConfig {
                population_size: 20,
                generations: 40,
                elite_count: 4,
                tournament_pool: 10,
                random_seed: Some(seed),
                ..GaConfig::default()
            }),
        },
    }
}

proptest! {
    #[test]
    fn course_set_survives_variation(
        courses in 1usize..30,
        seed in any::<u64>(),
        rate in 0.0f64..=1.0,
    ) {
        let problem = Problem::new(instance(courses, true)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let p1 = random_individual(&problem, &mut rng);
        let p2 = random_individual(&problem, &mut rng);
        let (mut a, mut b) = crossover(&p1, &p2, &mut rng);
        mutate(&problem, &mut a, rate, &mut rng);
        mutate(&problem, &mut b, rate, &mut rng);

        let expected: Vec<usize> = (0..courses).collect();
        for child in [&p1, &p2, &a, &b] {
            let ids: Vec<usize> = child.iter().map(|g| g.course).collect();
            prop_assert_eq!(&ids, &expected);
            for g in child.iter() {
                let t = g.instructor.unwrap();
                prop_assert!(problem.qualified(g.course).contains(&t));
            }
        }
    }
}

#[tokio::test]
async fn seeded_runs_are_reproducible() {
    let solver = HeurSolver::new();
    let a = solver
        .solve(envelope(instance(10, true), 77), CancelToken::new())
        .await
        .unwrap();
    let b = solver
        .solve(envelope(instance(10, true), 77), CancelToken::new())
        .await
        .unwrap();
    assert_eq!(a.assignments, b.assignments);
    assert_eq!(a.fitness_trace, b.fitness_trace);
    assert_eq!(a.assignments.len(), 10);
    let ids: Vec<String> = a.assignments.iter().map(|x| x.course_id.0.clone()).collect();
    let expected: Vec<String> = (0..10).map(|i| format!("C{i}")).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn easy_instance_reaches_zero_penalty() {
    let res = HeurSolver::new()
        .solve(envelope(instance(4, true), 3), CancelToken::new())
        .await
        .unwrap();
    assert_eq!(res.fitness, 0);
    assert_eq!(res.status, SolveStatus::Feasible);
    assert_eq!(res.stop, StopReason::Converged);
    assert!(res.violations.is_empty());
}

#[tokio::test]
async fn unqualified_courses_are_reported_not_fatal() {
    let res = HeurSolver::new()
        .solve(envelope(instance(5, false), 8), CancelToken::new())
        .await
        .unwrap();
    assert_eq!(res.unqualified.len(), 5);
    assert!(res.assignments.iter().all(|a| a.instructor_id.is_none()));
    assert_eq!(res.status, SolveStatus::Conflicted);
    assert!(res.fitness < 0);
}

#[tokio::test]
async fn empty_and_invalid_inputs_fail_fast() {
    let mut inst = instance(3, true);
    inst.timeslots.clear();
    let err = HeurSolver::new()
        .solve(envelope(inst, 1), CancelToken::new())
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<EngineError>(),
        Some(&EngineError::EmptyInput("timeslots"))
    );

    let mut env = envelope(instance(3, true), 1);
    env.params.config.as_mut().unwrap().mutation_rate = -0.5;
    let err = HeurSolver::new()
        .solve(env, CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::Configuration(_))
    ));
}

#[tokio::test]
async fn duplicate_course_and_slot_time_are_rejected() {
    let mut inst = instance(2, true);
    inst.courses[1].id = "C0".into();
    inst.timeslots[1].start = "09:00".into();
    let err = HeurSolver::new()
        .solve(envelope(inst, 2), CancelToken::new())
        .await
        .unwrap_err();
    let Some(EngineError::InvalidInstance(issues)) = err.downcast_ref::<EngineError>() else {
        panic!("expected an invalid instance error, got {err}");
    };
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0], "duplicate course id: C0");
    assert!(issues[1].starts_with("timeslot mon.2 repeats day/start"));
}

#[test]
fn unseeded_partial_start_replays_from_reported_seed() {
    let problem = Problem::new(instance(6, true)).unwrap();
    let base = vec![Gene {
        course: 0,
        slot: 0,
        room: 0,
        instructor: Some(0),
    }];
    let cfg = GaConfig {
        population_size: 10,
        generations: 8,
        elite_count: 2,
        tournament_pool: 6,
        parallel: false,
        random_seed: None,
        ..GaConfig::default()
    };
    let solver = HeurSolver::new();
    let first = solver
        .improve_from(&problem, &cfg, &base, &CancelToken::new())
        .unwrap();

    let replay_cfg = GaConfig {
        random_seed: Some(first.seed),
        ..cfg
    };
    let replay = solver
        .improve_from(&problem, &replay_cfg, &base, &CancelToken::new())
        .unwrap();
    assert_eq!(first.best.genes, replay.best.genes);
    assert_eq!(first.trace, replay.trace);
}
