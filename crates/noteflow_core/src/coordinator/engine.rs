use crate::pivot::PivotMode;

use super::edge::Edge;
use super::state::{AimingTarget, AttachmentState};

/// Sensor-driven transition table.
///
/// The only state changes a possession edge may cause:
/// - `(Intake, Rising) -> Aiming` (note acquired)
/// - `(Aiming, Falling) -> Intake` (note lost or unjammed back out)
///
/// Everything else is `None`:
/// - a rising edge while already Aiming is ignored (the mechanism cannot hold
///   two notes at once)
/// - Shooting and ContinuousFire ignore both edges; those actions own
///   possession transitions themselves
pub fn edge_transition(state: AttachmentState, edge: Edge) -> Option<AttachmentState> {
    use AttachmentState::*;
    use Edge::*;

    match (state, edge) {
        (Intake, Rising) => Some(Aiming),
        (Aiming, Falling) => Some(Intake),
        _ => None,
    }
}

/// Pivot mode a state commands on entry.
///
/// Intake and ContinuousFire drop the arm to the intake angle; Aiming and
/// Shooting track the selected target's range.
pub fn pivot_mode_for(state: AttachmentState, target: AimingTarget) -> PivotMode {
    use AttachmentState::*;

    match state {
        Intake | ContinuousFire => PivotMode::Intake,
        Aiming | Shooting => match target {
            AimingTarget::Speaker => PivotMode::Speaker,
            AimingTarget::Amp => PivotMode::Amp,
        },
    }
}

//
// Tests
//
