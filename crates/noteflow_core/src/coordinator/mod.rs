//! noteflow_core::coordinator
//!
//! Pure (hardware-agnostic) attachment coordination semantics.
//! This module intentionally contains **no** motor or scheduler code.
//!
//! Key ideas:
//! - One coordination state at a time; possession edges are the only
//!   sensor-driven transitions (`edge_transition`)
//! - Shooting/ContinuousFire are edge-immune: their actions own termination
//! - Actuator vocabulary is a closed enum per actuator, commanded through
//!   small port traits
//! - The wrapper layer owns the live state value, the ports and the side
//!   effects; this module owns the tables they follow

mod actuator;
mod edge;
mod engine;
mod ports;
mod state;

pub use actuator::{FeederState, IntakeState, ShooterState};
pub use edge::{Edge, EdgeDetector};
pub use engine::{edge_transition, pivot_mode_for};
pub use ports::{FeederPort, IntakePort, PivotPort, ShooterPort};
pub use state::{AimingTarget, AttachmentState, ALL_STATES};
