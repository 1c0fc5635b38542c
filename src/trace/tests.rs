use crate::cycles::Cycle;
use crate::error::KaprekarError;
use crate::test_utils::{cancelled_trigger, init_logger, w};
use crate::trace::{
    TraceConfig, TraceOutcome, TraceState, TrajectoryTracer, cycle_summary, default_max_steps,
    trace, trace_batch, trace_with,
};
use crate::transform::{NodeKind, Transformer};
use cancel_this::CancelAtomic;
use computation_process::{Computable, Incomplete, Stateful};

#[test]
fn four_digit_trajectory_reaches_6174() {
    init_logger();
    let transformer = Transformer::new(w(4));
    let trajectory = trace(&transformer, 3524, usize::MAX).unwrap();
    assert_eq!(trajectory.nodes(), &[3524, 3087, 8352, 6174]);
    assert_eq!(trajectory.seed(), 3524);
    assert_eq!(trajectory.cycle_start(), 3);
    assert_eq!(trajectory.tail(), &[3524, 3087, 8352]);
    assert_eq!(trajectory.cycle(), &[6174]);
    assert_eq!(trajectory.to_cycle(), Cycle::from_orbit(vec![6174]));
    let edges: Vec<_> = trajectory.edges().collect();
    assert_eq!(
        edges,
        vec![(3524, 3087), (3087, 8352), (8352, 6174), (6174, 6174)]
    );
}

#[test]
fn three_digit_trajectory_reaches_495() {
    let transformer = Transformer::new(w(3));
    let trajectory = trace(&transformer, 852, usize::MAX).unwrap();
    assert_eq!(trajectory.nodes(), &[852, 594, 495]);
    assert_eq!(trajectory.cycle(), &[495]);
}

#[test]
fn fixed_point_seed_has_empty_tail() {
    let transformer = Transformer::new(w(4));
    let trajectory = trace(&transformer, 6174, usize::MAX).unwrap();
    assert_eq!(trajectory.nodes(), &[6174]);
    assert!(trajectory.tail().is_empty());
    assert_eq!(trajectory.edges().collect::<Vec<_>>(), vec![(6174, 6174)]);
}

#[test]
fn two_digit_trajectory_enters_the_long_cycle() {
    let transformer = Transformer::new(w(2));
    let trajectory = trace(&transformer, 1, usize::MAX).unwrap();
    assert_eq!(trajectory.nodes(), &[1, 9, 81, 63, 27, 45]);
    assert_eq!(trajectory.cycle_start(), 1);
    assert_eq!(trajectory.to_cycle().nodes(), &[9, 81, 63, 27, 45]);
}

#[test]
fn every_trajectory_closes_a_valid_cycle() {
    for width in 2..=4 {
        let transformer = Transformer::bounded(w(width), 1 << 14);
        for seed in 0..w(width).state_space() {
            let trajectory = trace(&transformer, seed, usize::MAX).unwrap();
            let mut seen = trajectory.nodes().to_vec();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), trajectory.len(), "repeated node for {}", seed);
            let last = trajectory.nodes()[trajectory.len() - 1];
            assert_eq!(
                transformer.next_value(last).unwrap(),
                trajectory.nodes()[trajectory.cycle_start()]
            );
            assert!(
                trajectory
                    .to_cycle()
                    .is_valid_for(&transformer, NodeKind::Value)
            );
        }
    }
}

#[test]
fn step_limit_is_reported() {
    let transformer = Transformer::new(w(4));
    // Three new values and one application closing the cycle.
    assert!(trace(&transformer, 3524, 4).is_ok());
    assert_eq!(
        trace(&transformer, 3524, 3).unwrap_err(),
        KaprekarError::CycleNotFound {
            seed: 3524,
            max_steps: 3
        }
    );
    assert!(matches!(
        trace(&transformer, 3524, 0),
        Err(KaprekarError::CycleNotFound { max_steps: 0, .. })
    ));
}

#[test]
fn seeds_must_fit_the_width() {
    let transformer = Transformer::new(w(3));
    assert_eq!(
        trace(&transformer, 1000, usize::MAX).unwrap_err(),
        KaprekarError::InvalidValue {
            value: 1000,
            width: 3
        }
    );
    let config = TraceConfig::new(transformer);
    assert!(TraceState::new(&config, 1000).is_err());
    assert!(cycle_summary(&config, 1000).is_err());
}

#[test]
fn signature_trajectories() {
    init_logger();
    let config = TraceConfig::signatures(Transformer::new(w(4)));
    let trajectory = trace_with(&config, 3524).unwrap();
    assert_eq!(trajectory.node_kind(), NodeKind::Signature);
    assert_eq!(trajectory.nodes(), &[2345, 378, 2358, 1467]);
    assert_eq!(trajectory.cycle(), &[1467]);

    // Any member of a class starts at the same signature.
    let other = trace_with(&config, 4253).unwrap();
    assert_eq!(other.nodes(), trajectory.nodes());
}

#[test]
fn default_limits_cover_the_node_space() {
    assert_eq!(default_max_steps(w(4), NodeKind::Value), 10_000);
    assert_eq!(default_max_steps(w(4), NodeKind::Signature), 715);
    let config = TraceConfig::from(w(4));
    assert_eq!(config.max_steps, 10_000);
    assert_eq!(config.node_kind, NodeKind::Value);
}

#[test]
fn brent_agrees_with_recorded_trajectories() {
    for width in 2..=4 {
        for kind in [NodeKind::Value, NodeKind::Signature] {
            let mut config = TraceConfig::new(Transformer::bounded(w(width), 1 << 14));
            config.node_kind = kind;
            for seed in (0..w(width).state_space()).step_by(7) {
                let trajectory = trace_with(&config, seed).unwrap();
                let summary = cycle_summary(&config, seed).unwrap();
                assert_eq!(summary.tail_length, trajectory.cycle_start());
                assert_eq!(summary.cycle_length, trajectory.cycle().len());
                assert_eq!(summary.entry, trajectory.cycle()[0]);
            }
        }
    }
}

#[test]
fn brent_on_the_two_digit_cycle() {
    let config = TraceConfig::from(w(2));
    let summary = cycle_summary(&config, 1).unwrap();
    assert_eq!(summary.tail_length, 1);
    assert_eq!(summary.cycle_length, 5);
    assert_eq!(summary.entry, 9);

    let mut limited = config.clone();
    limited.max_steps = 1;
    assert!(matches!(
        cycle_summary(&limited, 1),
        Err(KaprekarError::CycleNotFound { seed: 1, .. })
    ));
}

#[test]
fn batches_keep_seed_order_and_isolate_failures() {
    init_logger();
    let config = TraceConfig::new(Transformer::bounded(w(4), 4096));
    let seeds = [3524, 10_000, 6174, 1];
    let results = trace_batch(&config, &seeds);
    assert_eq!(results.len(), 4);
    assert_eq!(results[0].as_ref().unwrap().seed(), 3524);
    assert!(matches!(
        results[1],
        Err(KaprekarError::InvalidValue { value: 10_000, .. })
    ));
    assert_eq!(results[2].as_ref().unwrap().nodes(), &[6174]);
    assert_eq!(results[3].as_ref().unwrap().cycle(), &[6174]);
    for (seed, result) in seeds.iter().zip(&results) {
        if let Ok(trajectory) = result {
            assert_eq!(trajectory, &trace_with(&config, *seed).unwrap());
        }
    }
}

#[test]
fn tracer_can_be_driven_step_by_step() {
    let config = TraceConfig::new(Transformer::new(w(4)));
    let state = TraceState::new(&config, 3524).unwrap();
    let mut tracer = TrajectoryTracer::configure(config.clone(), state);
    let outcome = loop {
        match tracer.try_compute() {
            Ok(outcome) => break outcome,
            Err(_) => {
                // Suspended after every map application.
            }
        }
    };
    assert_eq!(
        outcome,
        TraceOutcome::Closed(trace_with(&config, 3524).unwrap())
    );
}

#[test]
fn cancelled_trace_stops() {
    init_logger();
    let config = TraceConfig::new(Transformer::new(w(4)));
    let result = cancel_this::on_trigger(cancelled_trigger(), || trace_with(&config, 3524));
    assert!(matches!(result, Err(KaprekarError::Cancelled(_))));
    let result = cancel_this::on_trigger(cancelled_trigger(), || cycle_summary(&config, 3524));
    assert!(matches!(result, Err(KaprekarError::Cancelled(_))));
    // The trigger no longer applies once the action is done.
    assert!(trace_with(&config, 3524).is_ok());
}

#[test]
fn batch_workers_observe_cancellation_of_the_caller() {
    init_logger();
    let config = TraceConfig::new(Transformer::bounded(w(4), 4096));
    let seeds: Vec<u64> = (0..200).collect();
    let results = cancel_this::on_trigger(cancelled_trigger(), || {
        Ok::<_, KaprekarError>(trace_batch(&config, &seeds))
    })
    .unwrap();
    assert_eq!(results.len(), 200);
    assert!(
        results
            .iter()
            .all(|it| matches!(it, Err(KaprekarError::Cancelled(_))))
    );
    assert!(trace_batch(&config, &seeds).iter().all(|it| it.is_ok()));
}

#[test]
fn tracer_suspended_before_cancellation_can_resume() {
    let config = TraceConfig::new(Transformer::new(w(4)));
    let state = TraceState::new(&config, 3524).unwrap();
    let mut tracer = TrajectoryTracer::configure(config.clone(), state);
    let trigger = CancelAtomic::new();
    let outcome = cancel_this::on_trigger(trigger.clone(), || {
        // One map application, then cancel.
        assert!(tracer.try_compute().is_err());
        trigger.cancel();
        Ok::<_, KaprekarError>(tracer.try_compute())
    })
    .unwrap();
    assert!(matches!(outcome, Err(Incomplete::Cancelled(_))));
    assert_eq!(tracer.state().steps(), 1);

    // Without the trigger, the same computation finishes from where it stopped.
    let outcome = loop {
        match tracer.try_compute() {
            Ok(outcome) => break outcome,
            Err(Incomplete::Suspended) => continue,
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    };
    assert_eq!(
        outcome,
        TraceOutcome::Closed(trace_with(&config, 3524).unwrap())
    );
}

#[cfg(feature = "serde")]
#[test]
fn malformed_trajectories_are_rejected() {
    use crate::trace::Trajectory;

    let trajectory = trace(&Transformer::new(w(4)), 3524, usize::MAX).unwrap();
    let json = serde_json::to_value(&trajectory).unwrap();
    let decoded: Trajectory = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(decoded, trajectory);

    let mut empty = json.clone();
    empty["nodes"] = serde_json::json!([]);
    empty["cycle_start"] = serde_json::json!(0);
    assert!(serde_json::from_value::<Trajectory>(empty).is_err());

    let mut past_end = json.clone();
    past_end["cycle_start"] = serde_json::json!(4);
    assert!(serde_json::from_value::<Trajectory>(past_end).is_err());

    let mut too_wide = json;
    too_wide["nodes"] = serde_json::json!([3524, 10_000]);
    too_wide["cycle_start"] = serde_json::json!(1);
    assert!(serde_json::from_value::<Trajectory>(too_wide).is_err());
}

#[cfg(feature = "serde")]
#[test]
fn malformed_trace_states_are_rejected() {
    let config = TraceConfig::new(Transformer::new(w(4)));
    let state = TraceState::new(&config, 3524).unwrap();
    let mut tracer = TrajectoryTracer::configure(config, state);
    assert!(tracer.try_compute().is_err());
    let json = serde_json::to_value(tracer.state()).unwrap();
    let decoded: TraceState = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(&decoded, tracer.state());

    let mut empty = json.clone();
    empty["nodes"] = serde_json::json!([]);
    empty["positions"] = serde_json::json!({});
    assert!(serde_json::from_value::<TraceState>(empty).is_err());

    let mut unindexed = json.clone();
    unindexed["positions"] = serde_json::json!({ "3524": 1, "3087": 0 });
    assert!(serde_json::from_value::<TraceState>(unindexed).is_err());

    let mut past_end = json;
    past_end["cycle_start"] = serde_json::json!(7);
    assert!(serde_json::from_value::<TraceState>(past_end).is_err());
}
