//! Span Classification in the OpenTelemetry Pipeline
//!
//! Registers `SqlSpanClassifier` as an SDK span processor. It only looks at
//! spans as they start; end, flush and shutdown do nothing.

use opentelemetry::trace::{Span as _, TraceResult};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::trace::{Span, SpanProcessor};

use crate::classify::{is_database_span, SqlSpanClassifier, SPAN_TYPE_KEY, SQL_SPAN_TYPE};

impl SpanProcessor for SqlSpanClassifier {
    fn on_start(&self, span: &mut Span, _cx: &Context) {
        // non-recording spans carry no data
        let Some(data) = span.exported_data() else {
            return;
        };
        if is_database_span(&data.name, data.attributes.iter().map(|kv| kv.key.as_str())) {
            span.set_attribute(KeyValue::new(SPAN_TYPE_KEY, SQL_SPAN_TYPE));
        }
    }

    fn on_end(&self, _span: SpanData) {}

    fn force_flush(&self) -> TraceResult<()> {
        Ok(())
    }

    fn shutdown(&mut self) -> TraceResult<()> {
        Ok(())
    }
}
