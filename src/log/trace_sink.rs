//! Trace-Correlated Log Sink
//!
//! Wraps any `LogSink` and appends the active trace id, span id and sampling
//! decision to every record written while a trace is active. Records written
//! without an active trace pass through untouched.
//!
//! ```text
//! Logger ──▶ TraceSink ──(+trace_id, span_id, trace_sampled)──▶ inner sink
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use std::sync::Arc;

use super::record::{Level, LogRecord};
use super::sink::LogSink;
use crate::attr::Attr;
use crate::context::TraceContext;

pub const DEFAULT_TRACE_ID_KEY: &str = "trace_id";
pub const DEFAULT_SPAN_ID_KEY: &str = "span_id";
pub const DEFAULT_TRACE_SAMPLED_KEY: &str = "trace_sampled";

/// Optional overrides for the attribute keys written by `TraceSink`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSinkConfig {
    pub trace_id_key: Option<String>,
    pub span_id_key: Option<String>,
    pub trace_sampled_key: Option<String>,
}

impl TraceSinkConfig {
    pub fn with_trace_id_key(mut self, key: impl Into<String>) -> Self {
        self.trace_id_key = Some(key.into());
        self
    }

    pub fn with_span_id_key(mut self, key: impl Into<String>) -> Self {
        self.span_id_key = Some(key.into());
        self
    }

    pub fn with_trace_sampled_key(mut self, key: impl Into<String>) -> Self {
        self.trace_sampled_key = Some(key.into());
        self
    }
}

/// Attribute keys after defaults are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceKeys {
    pub trace_id: String,
    pub span_id: String,
    pub trace_sampled: String,
}

impl Default for TraceKeys {
    fn default() -> Self {
        TraceKeys::resolve(&TraceSinkConfig::default())
    }
}

impl TraceKeys {
    /// Apply defaults to unset or empty overrides
    pub fn resolve(config: &TraceSinkConfig) -> Self {
        fn pick(key: &Option<String>, default: &str) -> String {
            match key.as_deref() {
                Some(k) if !k.is_empty() => k.to_string(),
                _ => default.to_string(),
            }
        }

        TraceKeys {
            trace_id: pick(&config.trace_id_key, DEFAULT_TRACE_ID_KEY),
            span_id: pick(&config.span_id_key, DEFAULT_SPAN_ID_KEY),
            trace_sampled: pick(&config.trace_sampled_key, DEFAULT_TRACE_SAMPLED_KEY),
        }
    }
}

/// Log sink decorator adding trace correlation attributes
#[derive(Debug, Clone)]
pub struct TraceSink<S> {
    inner: S,
    keys: Arc<TraceKeys>,
}

impl<S: LogSink> TraceSink<S> {
    pub fn new(inner: S, config: &TraceSinkConfig) -> Self {
        TraceSink {
            inner,
            keys: Arc::new(TraceKeys::resolve(config)),
        }
    }

    /// Decorator with the default keys
    pub fn with_defaults(inner: S) -> Self {
        TraceSink::new(inner, &TraceSinkConfig::default())
    }

    pub fn keys(&self) -> &TraceKeys {
        &self.keys
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Trace attributes for `cx`, empty without an active trace
    pub fn trace_attrs(&self, cx: &TraceContext) -> Option<[Attr; 3]> {
        if !cx.is_valid() {
            return None;
        }
        Some([
            Attr::new(self.keys.trace_id.as_str(), cx.trace_id_hex()),
            Attr::new(self.keys.span_id.as_str(), cx.span_id_hex()),
            Attr::new(self.keys.trace_sampled.as_str(), cx.sampled),
        ])
    }
}

impl<S: LogSink> LogSink for TraceSink<S> {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn handle(&self, cx: &TraceContext, mut record: LogRecord) -> io::Result<()> {
        if let Some(attrs) = self.trace_attrs(cx) {
            record.add_attrs(attrs);
        }
        self.inner.handle(cx, record)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        TraceSink {
            inner: self.inner.with_attrs(attrs),
            keys: self.keys.clone(),
        }
    }

    fn with_group(&self, name: &str) -> Self {
        TraceSink {
            inner: self.inner.with_group(name),
            keys: self.keys.clone(),
        }
    }
}
