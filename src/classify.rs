//! Span Classification
//!
//! Tags spans that represent database operations with `type = "sql"` when
//! they start, so dashboards and filters can pick them out without
//! re-deriving the classification. A span is a database span when
//! - its name carries the SQL driver's operation prefix
//!   (`sql.conn.query`, `sql.conn.exec`, `sql.conn.ping`, `sql.conn.prepare`), or
//! - the driver instrumentation already set `db.system` on it.

use std::time::SystemTime;

use crate::attr::{Attr, AttrValue};

/// Name prefix of spans generated by the SQL driver instrumentation
pub const DRIVER_SPAN_PREFIX: &str = "sql.conn.";

/// Attribute set by driver instrumentation naming the database product
pub const DB_SYSTEM_KEY: &str = "db.system";

pub const SPAN_TYPE_KEY: &str = "type";
pub const SQL_SPAN_TYPE: &str = "sql";

/// Whether a span with this name and these attribute keys is a database span
#[inline]
pub fn is_database_span<'a, I>(name: &str, mut attribute_keys: I) -> bool
where
    I: Iterator<Item = &'a str>,
{
    name.starts_with(DRIVER_SPAN_PREFIX) || attribute_keys.any(|key| key == DB_SYSTEM_KEY)
}

/// A span as seen by lifecycle observers
#[derive(Debug, Clone, PartialEq)]
pub struct SpanRecord {
    pub name: String,
    pub attributes: Vec<Attr>,
    pub start_time: SystemTime,
    pub end_time: Option<SystemTime>,
}

impl SpanRecord {
    pub fn new(name: impl Into<String>) -> Self {
        SpanRecord {
            name: name.into(),
            attributes: Vec::new(),
            start_time: SystemTime::now(),
            end_time: None,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.push(Attr::new(key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.iter().find(|a| a.key == key).map(|a| &a.value)
    }

    /// Set `key`, replacing an existing value in place
    pub fn set_attr(&mut self, key: &str, value: impl Into<AttrValue>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.key == key) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attr::new(key, value)),
        }
    }

    pub fn end(&mut self) {
        self.end_time = Some(SystemTime::now());
    }
}

/// Observer of span start/end inside a trace pipeline
pub trait SpanLifecycle: Send + Sync {
    fn on_start(&self, span: &mut SpanRecord);
    fn on_end(&self, span: &SpanRecord);
    fn shutdown(&self);
    fn force_flush(&self);
}

/// Stateless classifier tagging database spans at start
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlSpanClassifier;

impl SqlSpanClassifier {
    pub fn new() -> Self {
        SqlSpanClassifier
    }

    pub fn classify(&self, span: &SpanRecord) -> bool {
        is_database_span(&span.name, span.attributes.iter().map(|a| a.key.as_str()))
    }
}

impl SpanLifecycle for SqlSpanClassifier {
    fn on_start(&self, span: &mut SpanRecord) {
        if self.classify(span) {
            span.set_attr(SPAN_TYPE_KEY, SQL_SPAN_TYPE);
        }
    }

    fn on_end(&self, _span: &SpanRecord) {}

    fn shutdown(&self) {}

    fn force_flush(&self) {}
}
