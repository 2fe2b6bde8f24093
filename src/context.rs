//! Trace Context
//!
//! The read-only view of the active trace that every correlation component
//! consumes. Readers touch the ambient execution context once, at the call
//! boundary; everything downstream takes `&TraceContext` explicitly.

use std::fmt;

/// Trace/span identity of the current unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TraceContext {
    pub trace_id: u128,
    pub span_id: u64,
    pub sampled: bool,
    pub valid: bool,
}

impl TraceContext {
    /// Build a context from raw ids. Valid only when both ids are non-zero.
    pub const fn new(trace_id: u128, span_id: u64, sampled: bool) -> Self {
        TraceContext {
            trace_id,
            span_id,
            sampled,
            valid: trace_id != 0 && span_id != 0,
        }
    }

    /// No active trace
    pub const fn invalid() -> Self {
        TraceContext {
            trace_id: 0,
            span_id: 0,
            sampled: false,
            valid: false,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// 32 lowercase hex characters, zero-padded
    pub fn trace_id_hex(&self) -> String {
        format!("{:032x}", self.trace_id)
    }

    /// 16 lowercase hex characters, zero-padded
    pub fn span_id_hex(&self) -> String {
        format!("{:016x}", self.span_id)
    }

    /// W3C trace-flags byte as rendered in a traceparent
    pub fn flags_hex(&self) -> &'static str {
        if self.sampled {
            "01"
        } else {
            "00"
        }
    }

    /// `00-<trace id>-<span id>-<flags>`, or `None` without an active trace
    pub fn traceparent(&self) -> Option<String> {
        if !self.valid {
            return None;
        }
        Some(self.to_string())
    }
}

impl fmt::Display for TraceContext {
    /// Renders the traceparent form regardless of validity
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "00-{:032x}-{:016x}-{}",
            self.trace_id,
            self.span_id,
            self.flags_hex()
        )
    }
}

/// Accessor for the ambient trace context
pub trait TraceContextReader: Send + Sync {
    fn current(&self) -> TraceContext;
}

/// Reader for processes without a trace pipeline - never reports a trace
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsentContext;

impl TraceContextReader for AbsentContext {
    #[inline]
    fn current(&self) -> TraceContext {
        TraceContext::invalid()
    }
}

/// Reader that always reports the same context
#[derive(Debug, Clone, Copy)]
pub struct FixedContext(pub TraceContext);

impl TraceContextReader for FixedContext {
    #[inline]
    fn current(&self) -> TraceContext {
        self.0
    }
}

impl<R: TraceContextReader + ?Sized> TraceContextReader for std::sync::Arc<R> {
    fn current(&self) -> TraceContext {
        (**self).current()
    }
}
