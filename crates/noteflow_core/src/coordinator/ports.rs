//! Port contracts toward the actuator layer.
//!
//! Capability contracts, not hardware detail: the coordinator issues discrete
//! state commands and reads back readiness/possession. Implementors (real
//! motor controllers, simulations) own PID, encoders and telemetry.

use crate::error::Result;
use crate::pivot::PivotMode;

use super::actuator::{FeederState, IntakeState, ShooterState};

/// Intake roller port.
pub trait IntakePort {
    fn set_state(&mut self, state: IntakeState);
}

/// Note feeder port. Also hosts the possession beam break, since the sensor
/// physically sits in the feeder path.
pub trait FeederPort {
    fn set_state(&mut self, state: FeederState);

    /// Raw beam-break reading: true while a note occupies the feeder path.
    fn possession_sensor(&self) -> bool;
}

/// Flywheel shooter port.
pub trait ShooterPort {
    fn set_state(&mut self, state: ShooterState);

    /// True once the flywheels have converged to the commanded speed.
    fn is_ready(&self) -> bool;
}

/// Pivot port: mode selects the envelope, the precise setpoint is what is
/// actually driven (see [`crate::pivot::PivotPolicy`]).
pub trait PivotPort {
    fn set_mode(&mut self, mode: PivotMode);

    /// Write an exact setpoint, clamped to the active range. Non-finite
    /// values are rejected; the prior setpoint stays in effect.
    fn set_precise_setpoint(&mut self, setpoint: f64) -> Result<()>;

    /// True once the arm is within tolerance of the commanded setpoint.
    fn is_ready(&self) -> bool;
}
