//! Pivot envelope policy.
//!
//! Two-level control: a *mode* (named range) establishes the envelope, a
//! *precise setpoint* inside it is what the arm actually drives to. Switching
//! mode re-clamps the existing setpoint instead of resetting it, so a
//! Speaker -> Amp change mid-match moves the arm the short way, without a
//! visible jump through some default angle.

use crate::error::{CoreError, Result};

/// Named pivot ranges.
///
/// Intake and Amp are fixed points; Speaker is a band because the shot angle
/// varies with distance.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PivotMode {
    Intake,
    Speaker,
    Amp,
}

impl PivotMode {
    pub const fn id(self) -> u8 {
        match self {
            PivotMode::Intake => 0,
            PivotMode::Speaker => 1,
            PivotMode::Amp => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PivotMode::Intake => "Intake",
            PivotMode::Speaker => "Speaker",
            PivotMode::Amp => "Amp",
        }
    }
}

/// Canonical list of pivot modes.
pub const ALL_MODES: [PivotMode; 3] = [PivotMode::Intake, PivotMode::Speaker, PivotMode::Amp];

/// An angular band the setpoint is clamped into while its mode is active.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PivotRange {
    low: f64,
    high: f64,
}

impl PivotRange {
    /// Build a range, clamped into the global safety envelope.
    ///
    /// `low = max(global_min, raw_low)`, `high = min(global_max, raw_high)`.
    /// Rejected if the clamped limits cross: a crossed range means the tuning
    /// asks for angles the mechanism must never reach.
    pub fn clamped(raw_low: f64, raw_high: f64, global_min: f64, global_max: f64) -> Result<Self> {
        if !raw_low.is_finite() || !raw_high.is_finite() {
            return Err(CoreError::error()
                .domain(crate::error::Domain::Pivot)
                .kind(crate::error::ErrorKind::InvalidRange)
                .msg("pivot range limits must be finite")
                .build());
        }

        let low = global_min.max(raw_low);
        let high = global_max.min(raw_high);

        if low > high {
            return Err(CoreError::collapsed_pivot_range(low, high));
        }

        Ok(Self { low, high })
    }

    /// A single-angle range (used for Intake and Amp).
    pub fn point(angle: f64, global_min: f64, global_max: f64) -> Result<Self> {
        Self::clamped(angle, angle, global_min, global_max)
    }

    pub const fn low(&self) -> f64 {
        self.low
    }

    pub const fn high(&self) -> f64 {
        self.high
    }

    /// Clamp a finite value into this range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.low, self.high)
    }
}

/// Validated pivot tuning: global envelope, one range per mode, readiness
/// tolerance. Injected configuration, not global state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PivotTuning {
    intake: PivotRange,
    speaker: PivotRange,
    amp: PivotRange,
    position_deadzone: f64,
}

impl PivotTuning {
    /// Build and validate a tuning set. Every named range is clamped into
    /// `[global_min, global_max]`; a range that collapses is rejected here,
    /// at definition time, never at runtime.
    pub fn new(
        global_min: f64,
        global_max: f64,
        intake_angle: f64,
        speaker_min: f64,
        speaker_max: f64,
        amp_angle: f64,
        position_deadzone: f64,
    ) -> Result<Self> {
        if !(global_min.is_finite() && global_max.is_finite()) || global_min > global_max {
            return Err(CoreError::error()
                .domain(crate::error::Domain::Pivot)
                .kind(crate::error::ErrorKind::InvalidRange)
                .msg("global pivot envelope is invalid")
                .build());
        }
        if !position_deadzone.is_finite() || position_deadzone <= 0.0 {
            return Err(CoreError::error()
                .domain(crate::error::Domain::Pivot)
                .kind(crate::error::ErrorKind::InvalidArgument)
                .msg("position deadzone must be a positive finite tolerance")
                .build());
        }

        Ok(Self {
            intake: PivotRange::point(intake_angle, global_min, global_max)?,
            speaker: PivotRange::clamped(speaker_min, speaker_max, global_min, global_max)?,
            amp: PivotRange::point(amp_angle, global_min, global_max)?,
            position_deadzone,
        })
    }

    pub const fn range(&self, mode: PivotMode) -> PivotRange {
        match mode {
            PivotMode::Intake => self.intake,
            PivotMode::Speaker => self.speaker,
            PivotMode::Amp => self.amp,
        }
    }

    pub const fn position_deadzone(&self) -> f64 {
        self.position_deadzone
    }
}

/// Mode + setpoint policy the pivot port implementations embed.
///
/// Holds the last commanded setpoint; every write is clamped to the active
/// mode's range, and a non-finite write is rejected leaving the prior
/// setpoint in effect (the caller logs it; not fatal).
#[derive(Debug, Clone)]
pub struct PivotPolicy {
    tuning: PivotTuning,
    mode: PivotMode,
    setpoint: f64,
}

impl PivotPolicy {
    /// Start in the given mode with the setpoint at the mode's low limit.
    pub fn new(tuning: PivotTuning, initial_mode: PivotMode) -> Self {
        let setpoint = tuning.range(initial_mode).low();
        Self {
            tuning,
            mode: initial_mode,
            setpoint,
        }
    }

    pub const fn mode(&self) -> PivotMode {
        self.mode
    }

    /// Last commanded setpoint; always inside the active range.
    pub const fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Switch the active envelope and re-clamp the existing setpoint into it.
    pub fn set_mode(&mut self, mode: PivotMode) {
        self.mode = mode;
        self.setpoint = self.tuning.range(mode).clamp(self.setpoint);
    }

    /// Command an exact setpoint. Non-finite values are rejected; in-range
    /// values pass through; out-of-range values clamp silently (policy, not
    /// failure).
    pub fn set_precise(&mut self, setpoint: f64) -> Result<()> {
        if !setpoint.is_finite() {
            return Err(CoreError::non_finite_setpoint(setpoint));
        }

        self.setpoint = self.tuning.range(self.mode).clamp(setpoint);
        Ok(())
    }

    /// Ready = within tolerance of the last commanded setpoint, not of the
    /// mode's endpoints.
    pub fn is_ready(&self, measured: f64) -> bool {
        (self.setpoint - measured).abs() < self.tuning.position_deadzone()
    }
}

//
// Tests
//
