//! Simulated actuator ports.
//!
//! Plain state-holding implementations of the port contracts, plus a
//! ready-wired harness. No physics: readiness and possession are flags the
//! test (or the demo tool) flips to script a scenario.

use std::cell::RefCell;
use std::rc::Rc;

use noteflow_core::coordinator::{
    FeederPort, FeederState, IntakePort, IntakeState, PivotPort, ShooterPort, ShooterState,
};
use noteflow_core::error::Result;
use noteflow_core::pivot::{PivotMode, PivotPolicy, PivotTuning};

use crate::coordinator::{
    AttachmentCoordinator, SharedFeeder, SharedIntake, SharedPivot, SharedShooter,
};
use crate::rig::AttachmentRig;
use crate::timing::ShotTiming;

/// Simulated intake roller.
#[derive(Debug, Default)]
pub struct SimIntake {
    pub state: IntakeState,
}

impl IntakePort for SimIntake {
    fn set_state(&mut self, state: IntakeState) {
        self.state = state;
    }
}

/// Simulated feeder, with a scriptable beam break.
#[derive(Debug, Default)]
pub struct SimFeeder {
    pub state: FeederState,
    pub note_present: bool,
}

impl FeederPort for SimFeeder {
    fn set_state(&mut self, state: FeederState) {
        self.state = state;
    }

    fn possession_sensor(&self) -> bool {
        self.note_present
    }
}

/// Simulated flywheel shooter, with scriptable readiness.
#[derive(Debug, Default)]
pub struct SimShooter {
    pub state: ShooterState,
    pub ready: bool,
}

impl ShooterPort for SimShooter {
    fn set_state(&mut self, state: ShooterState) {
        self.state = state;
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Simulated pivot: the real envelope policy over a scriptable measured
/// angle.
#[derive(Debug)]
pub struct SimPivot {
    policy: PivotPolicy,
    pub measured: f64,
}

impl SimPivot {
    pub fn new(tuning: PivotTuning, initial_mode: PivotMode) -> Self {
        let policy = PivotPolicy::new(tuning, initial_mode);
        let measured = policy.setpoint();
        Self { policy, measured }
    }

    pub fn policy(&self) -> &PivotPolicy {
        &self.policy
    }

    /// Teleport the arm onto its setpoint (the "PID converged" shortcut).
    pub fn settle(&mut self) {
        self.measured = self.policy.setpoint();
    }
}

impl PivotPort for SimPivot {
    fn set_mode(&mut self, mode: PivotMode) {
        self.policy.set_mode(mode);
    }

    fn set_precise_setpoint(&mut self, setpoint: f64) -> Result<()> {
        self.policy.set_precise(setpoint)
    }

    fn is_ready(&self) -> bool {
        self.policy.is_ready(self.measured)
    }
}

/// A representative tuning for simulation: envelope 0..=10 rotations, intake
/// flat at 0, speaker band 2..=6, amp at 9, 0.05 readiness tolerance.
pub fn reference_tuning() -> PivotTuning {
    PivotTuning::new(0.0, 10.0, 0.0, 2.0, 6.0, 9.0, 0.05)
        .expect("reference tuning is statically valid")
}

/// Fully wired simulated attachment: the rig plus concrete handles to every
/// sim port, so scenarios can script sensors and inspect actuator states.
pub struct SimHarness {
    pub intake: Rc<RefCell<SimIntake>>,
    pub feeder: Rc<RefCell<SimFeeder>>,
    pub shooter: Rc<RefCell<SimShooter>>,
    pub pivot: Rc<RefCell<SimPivot>>,
    pub rig: AttachmentRig,
}

impl SimHarness {
    pub fn new(timing: ShotTiming) -> Self {
        let intake = Rc::new(RefCell::new(SimIntake::default()));
        let feeder = Rc::new(RefCell::new(SimFeeder::default()));
        let shooter = Rc::new(RefCell::new(SimShooter::default()));
        let pivot = Rc::new(RefCell::new(SimPivot::new(
            reference_tuning(),
            PivotMode::Intake,
        )));

        let intake_port: SharedIntake = intake.clone();
        let feeder_port: SharedFeeder = feeder.clone();
        let shooter_port: SharedShooter = shooter.clone();
        let pivot_port: SharedPivot = pivot.clone();
        let coordinator =
            AttachmentCoordinator::new(intake_port, feeder_port, shooter_port, pivot_port, timing);

        Self {
            intake,
            feeder,
            shooter,
            pivot,
            rig: AttachmentRig::new(coordinator),
        }
    }

    // ---------------- Scenario scripting ----------------

    pub fn set_note_present(&self, present: bool) {
        self.feeder.borrow_mut().note_present = present;
    }

    pub fn set_shooter_ready(&self, ready: bool) {
        self.shooter.borrow_mut().ready = ready;
    }

    /// Converge the simulated arm onto its commanded setpoint.
    pub fn settle_pivot(&self) {
        self.pivot.borrow_mut().settle();
    }

    // ---------------- Inspection ----------------

    pub fn intake_state(&self) -> IntakeState {
        self.intake.borrow().state
    }

    pub fn feeder_state(&self) -> FeederState {
        self.feeder.borrow().state
    }

    pub fn shooter_state(&self) -> ShooterState {
        self.shooter.borrow().state
    }

    pub fn pivot_mode(&self) -> PivotMode {
        self.pivot.borrow().policy().mode()
    }

    pub fn pivot_setpoint(&self) -> f64 {
        self.pivot.borrow().policy().setpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harness_starts_idle_in_intake() {
        let harness = SimHarness::new(ShotTiming::default());

        assert_eq!(
            harness.rig.coordinator().state(),
            noteflow_core::coordinator::AttachmentState::Intake
        );
        assert_eq!(harness.intake_state(), IntakeState::Stopped);
        assert_eq!(harness.feeder_state(), FeederState::Stopped);
        assert_eq!(harness.shooter_state(), ShooterState::Stopped);
        assert_eq!(harness.pivot_mode(), PivotMode::Intake);
        assert!(!harness.rig.coordinator().possession());
    }

    #[test]
    fn sim_pivot_tracks_policy_readiness() {
        let mut pivot = SimPivot::new(reference_tuning(), PivotMode::Speaker);

        pivot.set_precise_setpoint(4.0).unwrap();
        assert!(!pivot.is_ready());

        pivot.settle();
        assert!(pivot.is_ready());
    }
}
