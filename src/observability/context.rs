//! OpenTelemetry Trace Context Reader
//!
//! Reads the active trace from the current `tracing` span through the
//! `tracing-opentelemetry` bridge.

use opentelemetry::trace::{SpanContext, TraceContextExt};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::context::{TraceContext, TraceContextReader};

/// Convert an OpenTelemetry span context
pub fn from_span_context(sc: &SpanContext) -> TraceContext {
    if !sc.is_valid() {
        return TraceContext::invalid();
    }
    TraceContext {
        trace_id: u128::from_be_bytes(sc.trace_id().to_bytes()),
        span_id: u64::from_be_bytes(sc.span_id().to_bytes()),
        sampled: sc.is_sampled(),
        valid: true,
    }
}

/// Reader over `tracing::Span::current()`
#[derive(Debug, Clone, Copy, Default)]
pub struct OtelContextReader;

impl TraceContextReader for OtelContextReader {
    fn current(&self) -> TraceContext {
        let cx = tracing::Span::current().context();
        let span = cx.span();
        from_span_context(span.span_context())
    }
}

/// Reader matching the enabled trace pipeline
pub fn context_reader() -> OtelContextReader {
    OtelContextReader
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{SpanId, TraceFlags, TraceId, TraceState};

    #[test]
    fn test_from_span_context() {
        let sc = SpanContext::new(
            TraceId::from_bytes(1u128.to_be_bytes()),
            SpanId::from_bytes(2u64.to_be_bytes()),
            TraceFlags::SAMPLED,
            false,
            TraceState::default(),
        );
        let cx = from_span_context(&sc);
        assert!(cx.is_valid());
        assert_eq!(
            cx.traceparent().unwrap(),
            "00-00000000000000000000000000000001-0000000000000002-01"
        );
    }

    #[test]
    fn test_invalid_span_context() {
        assert!(!from_span_context(&SpanContext::empty_context()).is_valid());
    }

    #[test]
    fn test_reader_without_subscriber_is_absent() {
        assert!(!OtelContextReader.current().is_valid());
    }
}
