use std::time::Duration;

use noteflow_core::error::{CoreError, Domain, ErrorKind, Result};

/// Shot/tick timing tuning. Injected configuration, validated at
/// construction.
///
/// The core composer counts scheduler ticks; wall-clock tuning is converted
/// exactly once here, rounding up so a bound is never shorter than asked for.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShotTiming {
    max_shoot_time: Duration,
    beam_break_end_lag: Duration,
    tick_period: Duration,
}

impl ShotTiming {
    pub fn new(
        max_shoot_time: Duration,
        beam_break_end_lag: Duration,
        tick_period: Duration,
    ) -> Result<Self> {
        if tick_period.is_zero() {
            return Err(CoreError::error()
                .domain(Domain::Config)
                .kind(ErrorKind::InvalidArgument)
                .msg("tick period must be non-zero")
                .build());
        }
        if max_shoot_time.is_zero() {
            return Err(CoreError::error()
                .domain(Domain::Config)
                .kind(ErrorKind::InvalidArgument)
                .msg("max shoot time must be non-zero")
                .build());
        }

        Ok(Self {
            max_shoot_time,
            beam_break_end_lag,
            tick_period,
        })
    }

    pub const fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Upper bound on a shot, in ticks. Forces termination even if the
    /// mechanism never reports ready or the note never clears.
    pub fn max_shoot_ticks(&self) -> u32 {
        self.ticks_for(self.max_shoot_time)
    }

    /// Trailing lag after the beam break clears, in ticks, letting the note
    /// fully leave the feeder before the shot ends.
    pub fn end_lag_ticks(&self) -> u32 {
        self.ticks_for(self.beam_break_end_lag)
    }

    fn ticks_for(&self, duration: Duration) -> u32 {
        (duration.as_secs_f64() / self.tick_period.as_secs_f64()).ceil() as u32
    }
}

impl Default for ShotTiming {
    /// 50 Hz control loop, 2 s shot bound, 250 ms trailing lag.
    fn default() -> Self {
        Self {
            max_shoot_time: Duration::from_secs(2),
            beam_break_end_lag: Duration::from_millis(250),
            tick_period: Duration::from_millis(20),
        }
    }
}
