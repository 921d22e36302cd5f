use noteflow_core::action::{
    finally, parallel_all, race, run_once, sequence, start_end, wait_ticks, wait_until, Action,
    CoopScheduler, Resource, ResourceSet,
};
use noteflow_core::coordinator::{
    edge_transition, pivot_mode_for, AimingTarget, AttachmentState, Edge, EdgeDetector, ALL_STATES,
};
use noteflow_core::pivot::{PivotMode, PivotPolicy, PivotTuning};

use std::cell::RefCell;
use std::rc::Rc;

fn tuning() -> PivotTuning {
    PivotTuning::new(0.0, 10.0, 0.0, 2.0, 6.0, 9.0, 0.05).expect("valid tuning")
}

#[test]
fn possession_round_trip_holds_for_any_edge_sequence() {
    // From Intake or Aiming, a rising edge always lands in Aiming and the
    // next falling edge always returns to Intake, regardless of interleaved
    // no-op edges.
    let mut state = AttachmentState::Intake;
    let script = [
        (Edge::Falling, AttachmentState::Intake), // falling while empty: no-op
        (Edge::Rising, AttachmentState::Aiming),
        (Edge::Rising, AttachmentState::Aiming), // double-acquire: no-op
        (Edge::Falling, AttachmentState::Intake),
        (Edge::Rising, AttachmentState::Aiming),
        (Edge::Falling, AttachmentState::Intake),
    ];

    for (edge, expected) in script {
        if let Some(next) = edge_transition(state, edge) {
            state = next;
        }
        assert_eq!(state, expected);
    }
}

#[test]
fn shooting_and_continuous_fire_are_idempotent_under_edges() {
    for state in ALL_STATES {
        if !state.is_edge_immune() {
            continue;
        }
        for edge in [Edge::Rising, Edge::Falling] {
            assert_eq!(
                edge_transition(state, edge),
                None,
                "{state:?} must ignore {edge:?}"
            );
        }
    }
}

#[test]
fn edge_detector_feeds_one_edge_per_sample_change() {
    let mut detector = EdgeDetector::new(false);
    let samples = [false, true, true, false, true, false, false];
    let edges: Vec<_> = samples
        .into_iter()
        .filter_map(|s| detector.update(s))
        .collect();

    assert_eq!(
        edges,
        [Edge::Rising, Edge::Falling, Edge::Rising, Edge::Falling]
    );
}

#[test]
fn stored_setpoint_always_equals_clamp_of_write() {
    let mut policy = PivotPolicy::new(tuning(), PivotMode::Speaker);

    let writes = [-50.0, 1.9, 2.0, 3.3, 6.0, 6.1, 1e9];
    for v in writes {
        policy.set_precise(v).expect("finite write");
        assert_eq!(policy.setpoint(), v.clamp(2.0, 6.0));
    }
}

#[test]
fn nan_write_is_rejected_and_state_preserved() {
    let mut policy = PivotPolicy::new(tuning(), PivotMode::Speaker);
    policy.set_precise(4.5).unwrap();

    assert!(policy.set_precise(f64::NAN).is_err());
    assert_eq!(policy.setpoint(), 4.5);
    assert_eq!(policy.mode(), PivotMode::Speaker);
}

#[test]
fn mode_for_state_is_total() {
    for state in ALL_STATES {
        for target in [AimingTarget::Speaker, AimingTarget::Amp] {
            // Must not panic, and intake-family states pin the arm down.
            let mode = pivot_mode_for(state, target);
            if matches!(
                state,
                AttachmentState::Intake | AttachmentState::ContinuousFire
            ) {
                assert_eq!(mode, PivotMode::Intake);
            }
        }
    }
}

#[test]
fn shoot_shaped_composition_times_out_deterministically() {
    // A sequence + parallel + race skeleton shaped like the shoot action:
    // if the possession predicate never goes false, the timeout arm must end
    // the whole action and the cleanup must still run.
    let cleanup_ran = Rc::new(RefCell::new(false));
    let cleanup_flag = Rc::clone(&cleanup_ran);

    let ready = Rc::new(RefCell::new(false));
    let r1 = Rc::clone(&ready);
    let r2 = Rc::clone(&ready);

    let action = finally(
        sequence(vec![
            run_once(ResourceSet::of(&[Resource::Shooter, Resource::Pivot]), || {}),
            parallel_all(vec![
                wait_until(move || *r1.borrow()),
                wait_until(move || *r2.borrow()),
            ]),
            run_once(ResourceSet::of(&[Resource::Feeder]), || {}),
            race(vec![
                wait_ticks(5),
                sequence(vec![wait_until(|| false), wait_ticks(2)]),
            ]),
        ]),
        move || *cleanup_flag.borrow_mut() = true,
    );

    assert!(action.requires().contains(Resource::Shooter));
    assert!(action.requires().contains(Resource::Feeder));
    assert!(action.requires().contains(Resource::Pivot));
    assert!(!action.requires().contains(Resource::Intake));

    let mut sched = CoopScheduler::new();
    sched.schedule(action);

    // Tick 1: the run-once fires. Tick 2: waits unsatisfied.
    sched.tick();
    sched.tick();
    assert_eq!(sched.active_count(), 1);

    // Readiness arrives; parallel completes, feed stage runs, race counts down.
    *ready.borrow_mut() = true;
    for _ in 0..3 {
        sched.tick();
    }
    assert_eq!(sched.active_count(), 1);
    assert!(!*cleanup_ran.borrow());

    // Timeout arm expires; the action must retire itself.
    for _ in 0..5 {
        sched.tick();
    }
    assert_eq!(sched.active_count(), 0);
    assert!(*cleanup_ran.borrow());
}

#[test]
fn contention_cleanup_runs_before_replacement_starts() {
    let order = Rc::new(RefCell::new(Vec::<&'static str>::new()));
    let o1 = Rc::clone(&order);
    let o2 = Rc::clone(&order);
    let o3 = Rc::clone(&order);

    let mut sched = CoopScheduler::new();
    let feeder = ResourceSet::of(&[Resource::Feeder]);

    sched.schedule(start_end(
        feeder,
        move || o1.borrow_mut().push("incumbent-start"),
        move || o2.borrow_mut().push("incumbent-cleanup"),
    ));
    sched.schedule(start_end(
        feeder,
        move || o3.borrow_mut().push("replacement-start"),
        || {},
    ));

    assert_eq!(
        order.borrow().as_slice(),
        ["incumbent-start", "incumbent-cleanup", "replacement-start"]
    );
}

#[test]
fn external_cancel_and_timeout_share_the_cleanup_path() {
    let cleanups = Rc::new(RefCell::new(0u32));

    // Timeout path.
    let c1 = Rc::clone(&cleanups);
    let mut sched = CoopScheduler::new();
    sched.schedule(finally(wait_ticks(2), move || *c1.borrow_mut() += 1));
    sched.tick();
    sched.tick();
    assert_eq!(*cleanups.borrow(), 1);

    // External-cancel path (contention on the same resource).
    let c2 = Rc::clone(&cleanups);
    sched.schedule(finally(
        sequence(vec![
            run_once(ResourceSet::of(&[Resource::Shooter]), || {}),
            wait_ticks(100),
        ]),
        move || *c2.borrow_mut() += 1,
    ));
    sched.tick();
    sched.cancel_requiring(ResourceSet::of(&[Resource::Shooter]));
    assert_eq!(*cleanups.borrow(), 2);
    assert_eq!(sched.active_count(), 0);
}
