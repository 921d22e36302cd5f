//! noteflow_rig: the wrapper layer around noteflow_core.
//!
//! Responsibilities:
//! - Hold the live coordinator: current state, aiming target, port handles
//! - Wire the possession sensor to the state machine as explicit edges
//! - Expose composed operator/autonomous actions over the core composer
//! - Provide a state-event stream for display/telemetry adapters
//! - Provide simulated ports so the whole stack runs without hardware
//!
//! The core crate stays pure; everything stateful or runtime-flavored lives
//! here.

mod coordinator;
mod events;
mod rig;
mod timing;

/// Simulated actuator ports + a ready-wired harness for tests and tools.
pub mod sim;

pub use coordinator::{
    AttachmentCoordinator, SharedFeeder, SharedIntake, SharedPivot, SharedShooter,
};
pub use events::StateEvent;
pub use rig::AttachmentRig;
pub use timing::ShotTiming;
