/// Attachment coordination states.
///
/// Exactly one is active at any instant. The coordinator owns the value and is
/// the only writer; everyone else reads it for guards and display.
///
/// - Intake: pivot down, waiting to acquire a note
/// - Aiming: holding a note, pivot tracking the current target
/// - Shooting: a shoot action is in flight and owns termination
/// - ContinuousFire: streaming notes straight through, no per-note state churn
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttachmentState {
    Intake,
    Aiming,
    Shooting,
    ContinuousFire,
}

/// Internal, compact IDs used for error payloads and event streams.
///
/// These are stable, lightweight identifiers for debugging/telemetry inside
/// noteflow; they are **not** a wire format.
impl AttachmentState {
    pub const fn id(self) -> u8 {
        match self {
            AttachmentState::Intake => 0,
            AttachmentState::Aiming => 1,
            AttachmentState::Shooting => 2,
            AttachmentState::ContinuousFire => 3,
        }
    }

    /// True for states that ignore possession edges entirely: the running
    /// action owns possession transitions itself.
    pub const fn is_edge_immune(self) -> bool {
        matches!(
            self,
            AttachmentState::Shooting | AttachmentState::ContinuousFire
        )
    }

    /// Stable, human-readable label for display adapters.
    pub const fn label(self) -> &'static str {
        match self {
            AttachmentState::Intake => "Intake",
            AttachmentState::Aiming => "Aiming",
            AttachmentState::Shooting => "Shooting",
            AttachmentState::ContinuousFire => "ContinuousFire",
        }
    }
}

/// Canonical list of all attachment states.
pub const ALL_STATES: [AttachmentState; 4] = [
    AttachmentState::Intake,
    AttachmentState::Aiming,
    AttachmentState::Shooting,
    AttachmentState::ContinuousFire,
];

/// Which goal the pivot aims for while in Aiming/Shooting.
///
/// Set by the outside world (operator or autonomous routine); read by the
/// coordinator when it computes the pivot mode for a state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AimingTarget {
    Speaker,
    Amp,
}

impl AimingTarget {
    pub const fn label(self) -> &'static str {
        match self {
            AimingTarget::Speaker => "Speaker",
            AimingTarget::Amp => "Amp",
        }
    }
}
