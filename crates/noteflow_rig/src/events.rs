//! Coordination event types.
//!
//! Wrapper-side state-change stream. Display/telemetry adapters subscribe and
//! render; nothing in the control path depends on a receiver being present.

use noteflow_core::coordinator::AttachmentState;

/// Emitted after a successful state change.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StateEvent {
    pub from: AttachmentState,
    pub to: AttachmentState,
}
