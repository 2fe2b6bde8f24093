//! Structured Logging with Trace Correlation
//!
//! - `LogSink`: capability interface (write, attach attributes, open group)
//! - `TraceSink`: decorator that stamps trace/span/sampling onto records
//! - `Logger`: explicit front-end handed to call sites
//!
//! # Usage
//!
//! ```rust
//! use otel_dbm::context::TraceContext;
//! use otel_dbm::log::{JsonSink, Level, Logger, TraceSink, TraceSinkConfig};
//!
//! let sink = TraceSink::new(JsonSink::new(Vec::new(), Level::Info), &TraceSinkConfig::default());
//! let logger = Logger::new(sink);
//! logger.info(&TraceContext::new(1, 2, true), "query finished", []);
//! ```

pub mod logger;
pub mod record;
pub mod sink;
pub mod trace_sink;

pub use logger::Logger;
pub use record::{Level, LogRecord, SourceLocation};
pub use sink::{CapturedRecord, JsonSink, LogSink, MemorySink, NoopSink};
pub use trace_sink::{
    TraceKeys, TraceSink, TraceSinkConfig, DEFAULT_SPAN_ID_KEY, DEFAULT_TRACE_ID_KEY,
    DEFAULT_TRACE_SAMPLED_KEY,
};
