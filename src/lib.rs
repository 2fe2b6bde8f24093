//! Trace correlation for logs, SQL statements and spans
//!
//! - `log`: trace-correlated structured logging
//! - `sql`: Datadog DBM correlation comments on outgoing SQL
//! - `classify`: tagging of database spans
//! - `context`: the trace context all of the above consume

pub mod attr;
pub mod classify;
pub mod config;
pub mod context;
pub mod log;
pub mod sql;

// Observability: feature-gated Datadog integration
#[cfg(feature = "datadog")]
pub mod observability;

#[cfg(not(feature = "datadog"))]
#[path = "observability_noop.rs"]
pub mod observability;

pub use attr::{Attr, AttrValue};
pub use classify::{SpanLifecycle, SpanRecord, SqlSpanClassifier};
pub use config::DatadogConfig;
pub use context::{TraceContext, TraceContextReader};
pub use log::{Level, LogSink, Logger, TraceSink, TraceSinkConfig};
pub use sql::{ServiceIdentity, SqlCommenter};
