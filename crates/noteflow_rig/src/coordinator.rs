use std::cell::RefCell;
use std::rc::Rc;

use noteflow_core::action::{
    finally, parallel_all, race, run_once, sequence, start_end, wait_ticks, wait_until,
    BoxedAction, CoopScheduler, Resource, ResourceSet,
};
use noteflow_core::coordinator::{
    edge_transition, pivot_mode_for, AimingTarget, AttachmentState, Edge, FeederPort, FeederState,
    IntakePort, IntakeState, PivotPort, ShooterPort, ShooterState,
};
use noteflow_core::pivot::PivotMode;
use tracing::{debug, trace, warn};

use crate::events::StateEvent;
use crate::timing::ShotTiming;

/// Shared port handles. One scheduler thread, so plain `Rc<RefCell<_>>`
/// ownership; actions and the coordinator take short borrows, never across a
/// suspension point.
pub type SharedIntake = Rc<RefCell<dyn IntakePort>>;
pub type SharedFeeder = Rc<RefCell<dyn FeederPort>>;
pub type SharedShooter = Rc<RefCell<dyn ShooterPort>>;
pub type SharedPivot = Rc<RefCell<dyn PivotPort>>;

/// Mutable coordinator guts, behind one RefCell so action closures share it.
struct Inner {
    intake: SharedIntake,
    feeder: SharedFeeder,
    shooter: SharedShooter,
    pivot: SharedPivot,

    state: AttachmentState,
    target: AimingTarget,

    // State-change stream for display/telemetry.
    //
    // broadcast is used so:
    // - state changes never block on a slow consumer
    // - lagging receivers drop old events rather than stalling the tick
    events: tokio::sync::broadcast::Sender<StateEvent>,
}

impl Inner {
    /// The only writer of `state`. Self-transitions are no-ops; a real
    /// transition applies the entered state's actuator effects.
    fn set_state(&mut self, next: AttachmentState) {
        if self.state == next {
            return;
        }

        let prev = self.state;
        self.state = next;

        debug!(from = prev.label(), to = next.label(), "attachment state");
        let _ = self.events.send(StateEvent { from: prev, to: next });

        self.pivot
            .borrow_mut()
            .set_mode(pivot_mode_for(next, self.target));

        // Acquiring a note halts the feed path; the pivot comes up to aim.
        if next == AttachmentState::Aiming {
            self.intake.borrow_mut().set_state(IntakeState::Stopped);
            self.feeder.borrow_mut().set_state(FeederState::Stopped);
        }
    }

    /// Intake only while in intake mode; a held note must stay staged.
    fn start_intaking(&mut self) {
        if self.state == AttachmentState::Intake {
            self.intake.borrow_mut().set_state(IntakeState::Intaking);
            self.feeder.borrow_mut().set_state(FeederState::Intaking);
        }
    }

    /// Reverse the feed path to clear a jam; never while a shot is in flight.
    fn unjam(&mut self) {
        if self.state != AttachmentState::Shooting {
            self.intake.borrow_mut().set_state(IntakeState::Reversed);
            self.feeder.borrow_mut().set_state(FeederState::Reversed);
        }
    }

    /// Stop the feed path, but never yank the feeder out of an active shot.
    fn stop_intaking(&mut self) {
        if self.state != AttachmentState::Shooting {
            self.feeder.borrow_mut().set_state(FeederState::Stopped);
        }
        self.intake.borrow_mut().set_state(IntakeState::Stopped);
    }

    /// Soft set: suppressed while a shot owns the shooter.
    fn soft_set_shooter(&mut self, state: ShooterState) {
        if self.state != AttachmentState::Shooting {
            self.shooter.borrow_mut().set_state(state);
        }
    }

    fn enter_shot(&mut self) {
        self.set_state(AttachmentState::Shooting);
        self.shooter.borrow_mut().set_state(ShooterState::Shooting);
    }

    fn feed_shot(&mut self) {
        self.feeder.borrow_mut().set_state(FeederState::Shooting);
    }

    /// Shot termination cleanup; identical for natural finish, timeout and
    /// cancellation.
    fn finish_shot(&mut self) {
        self.set_state(AttachmentState::Aiming);
        self.shooter.borrow_mut().set_state(ShooterState::Stopped);
        self.feeder.borrow_mut().set_state(FeederState::Stopped);
    }

    fn begin_continuous_fire(&mut self) {
        self.set_state(AttachmentState::ContinuousFire);
        self.intake.borrow_mut().set_state(IntakeState::Intaking);
        self.feeder.borrow_mut().set_state(FeederState::Shooting);
        self.shooter.borrow_mut().set_state(ShooterState::Shooting);
    }

    fn end_continuous_fire(&mut self) {
        self.set_state(AttachmentState::Intake);
        self.intake.borrow_mut().set_state(IntakeState::Stopped);
        self.feeder.borrow_mut().set_state(FeederState::Stopped);
        self.shooter.borrow_mut().set_state(ShooterState::Stopped);
    }

    /// Update the aiming target; outside intake mode the pivot re-aims
    /// immediately (and the active setpoint re-clamps into the new range).
    fn set_target(&mut self, target: AimingTarget) {
        self.target = target;
        if self.state != AttachmentState::Intake {
            let mode = match target {
                AimingTarget::Speaker => PivotMode::Speaker,
                AimingTarget::Amp => PivotMode::Amp,
            };
            self.pivot.borrow_mut().set_mode(mode);
        }
    }

    fn set_pivot_mode(&mut self, mode: PivotMode) {
        self.pivot.borrow_mut().set_mode(mode);
    }

    /// Distance-compensated precise setpoint. A rejected (non-finite) write
    /// is logged and the prior setpoint stays in effect.
    fn set_precise_pivot(&mut self, setpoint: f64) {
        if let Err(err) = self.pivot.borrow_mut().set_precise_setpoint(setpoint) {
            warn!(%err, setpoint, "pivot setpoint rejected");
        }
    }

    fn possession(&self) -> bool {
        self.feeder.borrow().possession_sensor()
    }
}

/// The attachment coordinator: owns the coordination state machine and hands
/// out the composed actions that drive the shared actuators.
///
/// Cheap to clone; clones share the same live state.
#[derive(Clone)]
pub struct AttachmentCoordinator {
    inner: Rc<RefCell<Inner>>,
    timing: ShotTiming,
}

impl AttachmentCoordinator {
    /// Starts in Intake targeting the Speaker.
    pub fn new(
        intake: SharedIntake,
        feeder: SharedFeeder,
        shooter: SharedShooter,
        pivot: SharedPivot,
        timing: ShotTiming,
    ) -> Self {
        let (events, _rx) = tokio::sync::broadcast::channel(32);

        Self {
            inner: Rc::new(RefCell::new(Inner {
                intake,
                feeder,
                shooter,
                pivot,
                state: AttachmentState::Intake,
                target: AimingTarget::Speaker,
                events,
            })),
            timing,
        }
    }

    // ---------------- Queries ----------------

    /// Current coordination state (for display).
    pub fn state(&self) -> AttachmentState {
        self.inner.borrow().state
    }

    /// Current aiming target.
    pub fn target(&self) -> AimingTarget {
        self.inner.borrow().target
    }

    /// Raw possession reading (for display/telemetry).
    pub fn possession(&self) -> bool {
        self.inner.borrow().possession()
    }

    /// Subscribe to state-change events.
    pub fn subscribe_state_events(&self) -> tokio::sync::broadcast::Receiver<StateEvent> {
        self.inner.borrow().events.subscribe()
    }

    // ---------------- Direct operations ----------------

    /// Set the auto-aiming target. Should match whatever the drivebase is
    /// targeting.
    pub fn set_target(&self, target: AimingTarget) {
        self.inner.borrow_mut().set_target(target);
    }

    /// Precise pivot override for distance-compensated speaker shots.
    pub fn set_speaker_rotations(&self, rotations: f64) {
        self.inner.borrow_mut().set_precise_pivot(rotations);
    }

    /// Dispatch one possession edge. The rig calls this before stepping the
    /// scheduler, so the transition is visible to every action this tick.
    pub fn handle_edge(&self, scheduler: &mut CoopScheduler, edge: Edge) {
        let state = self.inner.borrow().state;

        let Some(next) = edge_transition(state, edge) else {
            // Expected overlap (e.g. edges during a shot); not an anomaly.
            trace!(state = state.label(), edge = edge.label(), "edge ignored");
            return;
        };

        if next == AttachmentState::Aiming {
            // Note acquired: whatever held the feed path lets go (its cleanup
            // runs now) before the state flips.
            scheduler.cancel_requiring(ResourceSet::of(&[Resource::Intake, Resource::Feeder]));
        }

        self.inner.borrow_mut().set_state(next);
    }

    // ---------------- Composed actions ----------------

    /// Run the intake until cancelled. Guarded: does nothing while a note is
    /// held.
    pub fn intake_action(&self) -> BoxedAction {
        let on_start = {
            let inner = Rc::clone(&self.inner);
            move || inner.borrow_mut().start_intaking()
        };
        let on_end = {
            let inner = Rc::clone(&self.inner);
            move || inner.borrow_mut().stop_intaking()
        };
        start_end(
            ResourceSet::of(&[Resource::Intake, Resource::Feeder]),
            on_start,
            on_end,
        )
    }

    /// Reverse the intakers until cancelled, to clear a jam.
    pub fn unjam_action(&self) -> BoxedAction {
        let on_start = {
            let inner = Rc::clone(&self.inner);
            move || inner.borrow_mut().unjam()
        };
        let on_end = {
            let inner = Rc::clone(&self.inner);
            move || inner.borrow_mut().stop_intaking()
        };
        start_end(
            ResourceSet::of(&[Resource::Intake, Resource::Feeder]),
            on_start,
            on_end,
        )
    }

    /// Pre-spool the flywheels until cancelled. Soft on both edges: never
    /// touches an in-flight shot.
    pub fn spin_up_action(&self) -> BoxedAction {
        let on_start = {
            let inner = Rc::clone(&self.inner);
            move || inner.borrow_mut().soft_set_shooter(ShooterState::Spinning)
        };
        let on_end = {
            let inner = Rc::clone(&self.inner);
            move || inner.borrow_mut().soft_set_shooter(ShooterState::Stopped)
        };
        start_end(ResourceSet::of(&[Resource::Shooter]), on_start, on_end)
    }

    /// The full shot: spool, wait for shooter + pivot readiness, feed, then
    /// end on whichever comes first: the shot-time bound, or the beam break
    /// clearing plus a trailing lag. Cleanup returns to Aiming on every path.
    pub fn shoot_action(&self) -> BoxedAction {
        let enter = {
            let inner = Rc::clone(&self.inner);
            move || inner.borrow_mut().enter_shot()
        };
        let shooter_ready = {
            let inner = Rc::clone(&self.inner);
            move || inner.borrow().shooter.borrow().is_ready()
        };
        let pivot_ready = {
            let inner = Rc::clone(&self.inner);
            move || inner.borrow().pivot.borrow().is_ready()
        };
        let feed = {
            let inner = Rc::clone(&self.inner);
            move || inner.borrow_mut().feed_shot()
        };
        let note_cleared = {
            let inner = Rc::clone(&self.inner);
            move || !inner.borrow().possession()
        };
        let cleanup = {
            let inner = Rc::clone(&self.inner);
            move || inner.borrow_mut().finish_shot()
        };

        finally(
            sequence(vec![
                run_once(
                    ResourceSet::of(&[Resource::Shooter, Resource::Pivot]),
                    enter,
                ),
                parallel_all(vec![wait_until(shooter_ready), wait_until(pivot_ready)]),
                run_once(ResourceSet::of(&[Resource::Feeder]), feed),
                race(vec![
                    wait_ticks(self.timing.max_shoot_ticks()),
                    sequence(vec![
                        wait_until(note_cleared),
                        wait_ticks(self.timing.end_lag_ticks()),
                    ]),
                ]),
            ]),
            cleanup,
        )
    }

    /// Stream notes straight through until cancelled. Bypasses the soft
    /// guards and ignores possession edges for its whole duration.
    pub fn continuous_fire_action(&self) -> BoxedAction {
        let on_start = {
            let inner = Rc::clone(&self.inner);
            move || inner.borrow_mut().begin_continuous_fire()
        };
        let on_end = {
            let inner = Rc::clone(&self.inner);
            move || inner.borrow_mut().end_continuous_fire()
        };
        start_end(
            ResourceSet::of(&[Resource::Intake, Resource::Feeder, Resource::Shooter]),
            on_start,
            on_end,
        )
    }

    /// One-shot target select, for bindings and autonomous routines.
    pub fn set_target_action(&self, target: AimingTarget) -> BoxedAction {
        let inner = Rc::clone(&self.inner);
        run_once(ResourceSet::EMPTY, move || {
            inner.borrow_mut().set_target(target)
        })
    }

    /// One-shot named pivot position, for autonomous routines.
    pub fn set_pivot_mode_action(&self, mode: PivotMode) -> BoxedAction {
        let inner = Rc::clone(&self.inner);
        run_once(ResourceSet::of(&[Resource::Pivot]), move || {
            inner.borrow_mut().set_pivot_mode(mode)
        })
    }

    /// One-shot precise pivot override (clamped to the active range).
    pub fn set_speaker_rotations_action(&self, rotations: f64) -> BoxedAction {
        let inner = Rc::clone(&self.inner);
        run_once(ResourceSet::of(&[Resource::Pivot]), move || {
            inner.borrow_mut().set_precise_pivot(rotations)
        })
    }
}
