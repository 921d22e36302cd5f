use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Convenient result alias for noteflow_core.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Log/handling importance. Intended to map cleanly onto logging levels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Where an error came from (helps triage and routing).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Domain {
    Coordinator,
    Pivot,
    Action,
    Config,
    Other,
}

/// Stable error "kind" for matching/branching.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidSetpoint,
    InvalidRange,
    InvalidState,
    Timeout,
    Other,
}

/// Optional structured payload for rich context without forcing allocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,

    /// Generic key/value context (usually no heap alloc if using &str).
    Context {
        key: &'static str,
        value: Cow<'static, str>,
    },

    /// Pivot-specific context: the rejected raw setpoint.
    PivotSetpoint { setpoint: f64 },

    /// A named range whose limits collapsed after envelope clamping.
    PivotRange { low: f64, high: f64 },
}

/// The one error type that crosses module boundaries in noteflow_core.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{severity:?}: {message}")]
pub struct CoreError {
    pub domain: Domain,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: Cow<'static, str>,
    pub payload: Payload,
}

impl CoreError {
    /// Fully-specified constructor (rarely needed at call sites).
    pub fn new(
        domain: Domain,
        kind: ErrorKind,
        severity: Severity,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            domain,
            kind,
            severity,
            message: message.into(),
            payload: Payload::None,
        }
    }

    // ---------------- Fluent entry points ----------------

    #[inline]
    pub fn trace() -> ErrB {
        ErrB::new(Severity::Trace)
    }
    #[inline]
    pub fn debug() -> ErrB {
        ErrB::new(Severity::Debug)
    }
    #[inline]
    pub fn info() -> ErrB {
        ErrB::new(Severity::Info)
    }
    #[inline]
    pub fn warn() -> ErrB {
        ErrB::new(Severity::Warn)
    }
    #[inline]
    pub fn error() -> ErrB {
        ErrB::new(Severity::Error)
    }
    #[inline]
    pub fn fatal() -> ErrB {
        ErrB::new(Severity::Fatal)
    }

    /// Construct a Pivot InvalidSetpoint error (non-finite write).
    ///
    /// Policy: the caller logs this and keeps the prior setpoint; it is never
    /// fatal.
    pub fn non_finite_setpoint(setpoint: f64) -> Self {
        CoreError::warn()
            .domain(Domain::Pivot)
            .kind(ErrorKind::InvalidSetpoint)
            .msg("non-finite pivot setpoint rejected")
            .payload(Payload::PivotSetpoint { setpoint })
            .build()
    }

    /// Construct a Pivot InvalidRange error (named range rejected at
    /// definition time because `low > high` after envelope clamping).
    pub fn collapsed_pivot_range(low: f64, high: f64) -> Self {
        CoreError::error()
            .domain(Domain::Pivot)
            .kind(ErrorKind::InvalidRange)
            .msg("pivot range collapsed by global envelope")
            .payload(Payload::PivotRange { low, high })
            .build()
    }
}

/// Fluent builder that behaves like iterator chains (takes self, returns Self).
/// Defaults:
/// - domain = Other
/// - kind = Other
/// - message = ""
/// - payload = None
#[derive(Debug, Clone)]
pub struct ErrB {
    domain: Domain,
    kind: ErrorKind,
    severity: Severity,
    message: Cow<'static, str>,
    payload: Payload,
}

impl ErrB {
    #[inline]
    fn new(severity: Severity) -> Self {
        Self {
            domain: Domain::Other,
            kind: ErrorKind::Other,
            severity,
            message: Cow::Borrowed(""),
            payload: Payload::None,
        }
    }

    // -------- Guided setters --------

    /// Set/override the domain (defaults to Domain::Other).
    #[inline]
    pub fn domain(mut self, d: Domain) -> Self {
        self.domain = d;
        self
    }

    /// Set/override the kind (defaults to ErrorKind::Other).
    #[inline]
    pub fn kind(mut self, k: ErrorKind) -> Self {
        self.kind = k;
        self
    }

    /// Set/override the message (defaults to "").
    #[inline]
    pub fn msg(mut self, m: impl Into<Cow<'static, str>>) -> Self {
        self.message = m.into();
        self
    }

    /// Formatting-friendly message setter.
    /// Note: still allocates once because we store as Cow<'static, str>.
    #[inline]
    pub fn msgf(mut self, args: fmt::Arguments<'_>) -> Self {
        self.message = Cow::Owned(args.to_string());
        self
    }

    /// Only one payload: this replaces any previous payload (default is None).
    #[inline]
    pub fn payload(mut self, p: Payload) -> Self {
        self.payload = p;
        self
    }

    // -------- Finish --------
    #[inline]
    pub fn build(self) -> CoreError {
        CoreError {
            domain: self.domain,
            kind: self.kind,
            severity: self.severity,
            message: self.message,
            payload: self.payload,
        }
    }
}

impl From<ErrB> for CoreError {
    fn from(b: ErrB) -> Self {
        b.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_setpoint_carries_payload() {
        let e = CoreError::non_finite_setpoint(f64::NAN);
        assert_eq!(e.domain, Domain::Pivot);
        assert_eq!(e.kind, ErrorKind::InvalidSetpoint);

        match e.payload {
            Payload::PivotSetpoint { setpoint } => assert!(setpoint.is_nan()),
            _ => panic!("expected PivotSetpoint payload"),
        }
    }

    #[test]
    fn builder_defaults_are_other() {
        let e = CoreError::warn().msg("something").build();
        assert_eq!(e.domain, Domain::Other);
        assert_eq!(e.kind, ErrorKind::Other);
        assert_eq!(e.severity, Severity::Warn);
        assert_eq!(e.payload, Payload::None);
    }
}
