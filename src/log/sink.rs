//! Log Sink Capability
//!
//! `LogSink` is the narrow interface every sink implements: write a record,
//! and derive a new sink with extra fixed attributes or an open group.
//! Deriving never mutates the receiver.
//!
//! Provided sinks:
//! - `JsonSink`: JSON Lines to any `Write`, one object per record
//! - `MemorySink`: captures records in memory for tests
//! - `NoopSink`: discards everything

use chrono::SecondsFormat;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::io::{self, Write};
use std::sync::Arc;

use super::record::{Level, LogRecord};
use crate::attr::Attr;
use crate::context::TraceContext;

/// A structured log destination
pub trait LogSink: Send + Sync {
    /// Whether records at `level` would be written
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    /// Write one record. `cx` is the trace context of the caller.
    fn handle(&self, cx: &TraceContext, record: LogRecord) -> io::Result<()>;

    /// New sink that adds `attrs` to every record it writes
    fn with_attrs(&self, attrs: Vec<Attr>) -> Self
    where
        Self: Sized;

    /// New sink that nests all later attributes under `name`
    fn with_group(&self, name: &str) -> Self
    where
        Self: Sized;
}

// ============================================================================
// JSON sink
// ============================================================================

/// Attribute attached ahead of time, remembered with the groups open when
/// it was attached
#[derive(Debug, Clone)]
struct GroupedAttr {
    groups: Arc<[String]>,
    attr: Attr,
}

/// JSON Lines sink
///
/// Every record becomes one object with `time`, `level`, optionally
/// `source`, and `msg`, followed by the attributes in the order they were
/// attached. Opening a group nests subsequent attributes in an object named
/// after the group.
pub struct JsonSink<W: Write + Send> {
    writer: Arc<Mutex<W>>,
    min_level: Level,
    add_source: bool,
    preformatted: Arc<Vec<GroupedAttr>>,
    groups: Arc<[String]>,
}

impl<W: Write + Send> Clone for JsonSink<W> {
    fn clone(&self) -> Self {
        JsonSink {
            writer: self.writer.clone(),
            min_level: self.min_level,
            add_source: self.add_source,
            preformatted: self.preformatted.clone(),
            groups: self.groups.clone(),
        }
    }
}

impl JsonSink<io::Stdout> {
    /// JSON Lines on stdout
    pub fn stdout(min_level: Level) -> Self {
        JsonSink::new(io::stdout(), min_level)
    }
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(writer: W, min_level: Level) -> Self {
        JsonSink {
            writer: Arc::new(Mutex::new(writer)),
            min_level,
            add_source: false,
            preformatted: Arc::new(Vec::new()),
            groups: Arc::from(Vec::new()),
        }
    }

    /// Emit a `source` object (`file`, `line`) for records that carry one
    pub fn with_source(mut self, add_source: bool) -> Self {
        self.add_source = add_source;
        self
    }

    /// Render a record to its JSON object without writing it
    pub fn render(&self, record: &LogRecord) -> Value {
        let mut root = Map::new();
        root.insert(
            "time".to_string(),
            Value::String(record.time.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        root.insert(
            "level".to_string(),
            Value::String(record.level.as_str().to_string()),
        );
        if let Some(source) = record.source.filter(|_| self.add_source) {
            let mut loc = Map::new();
            loc.insert("file".to_string(), Value::String(source.file.to_string()));
            loc.insert("line".to_string(), Value::from(source.line));
            root.insert("source".to_string(), Value::Object(loc));
        }
        root.insert("msg".to_string(), Value::String(record.message.clone()));

        for grouped in self.preformatted.iter() {
            insert_at(&mut root, &grouped.groups, &grouped.attr);
        }
        for attr in record.attrs() {
            insert_at(&mut root, &self.groups, attr);
        }

        Value::Object(root)
    }

    /// Run `f` with exclusive access to the underlying writer
    pub fn with_writer<T>(&self, f: impl FnOnce(&mut W) -> T) -> T {
        let mut guard = self.writer.lock();
        f(&mut guard)
    }
}

fn insert_at(root: &mut Map<String, Value>, groups: &[String], attr: &Attr) {
    let mut map = root;
    for group in groups {
        let slot = map
            .entry(group.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        // a plain attribute with the group's name is shadowed by the group
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Some(inner) = slot.as_object_mut() else {
            return;
        };
        map = inner;
    }
    map.insert(attr.key.clone(), attr.value.to_json());
}

impl<W: Write + Send> LogSink for JsonSink<W> {
    fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    fn handle(&self, _cx: &TraceContext, record: LogRecord) -> io::Result<()> {
        if !self.enabled(record.level) {
            return Ok(());
        }
        let line = self.render(&record);
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, &line)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }
        let mut preformatted = Vec::with_capacity(self.preformatted.len() + attrs.len());
        preformatted.extend(self.preformatted.iter().cloned());
        preformatted.extend(attrs.into_iter().map(|attr| GroupedAttr {
            groups: self.groups.clone(),
            attr,
        }));

        JsonSink {
            writer: self.writer.clone(),
            min_level: self.min_level,
            add_source: self.add_source,
            preformatted: Arc::new(preformatted),
            groups: self.groups.clone(),
        }
    }

    fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        let mut groups: Vec<String> = self.groups.to_vec();
        groups.push(name.to_string());

        JsonSink {
            writer: self.writer.clone(),
            min_level: self.min_level,
            add_source: self.add_source,
            preformatted: self.preformatted.clone(),
            groups: Arc::from(groups),
        }
    }
}

// ============================================================================
// Memory sink
// ============================================================================

/// A record as seen by `MemorySink`, with group-qualified keys (`group.key`)
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRecord {
    pub level: Level,
    pub message: String,
    pub attrs: Vec<Attr>,
}

impl CapturedRecord {
    pub fn get(&self, key: &str) -> Option<&crate::attr::AttrValue> {
        self.attrs.iter().rev().find(|a| a.key == key).map(|a| &a.value)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.attrs.iter().map(|a| a.key.as_str()).collect()
    }
}

/// In-memory sink for testing - every derived sink shares the same buffer
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
    preformatted: Vec<Attr>,
    prefix: String,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured records
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records.lock().clone()
    }

    pub fn last(&self) -> Option<CapturedRecord> {
        self.records.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn qualify(&self, attr: Attr) -> Attr {
        if self.prefix.is_empty() {
            attr
        } else {
            Attr {
                key: format!("{}{}", self.prefix, attr.key),
                value: attr.value,
            }
        }
    }
}

impl LogSink for MemorySink {
    fn handle(&self, _cx: &TraceContext, record: LogRecord) -> io::Result<()> {
        let mut attrs = self.preformatted.clone();
        attrs.extend(record.attrs().iter().cloned().map(|a| self.qualify(a)));

        self.records.lock().push(CapturedRecord {
            level: record.level,
            message: record.message,
            attrs,
        });
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        let mut derived = self.clone();
        let qualified: Vec<Attr> = attrs.into_iter().map(|a| self.qualify(a)).collect();
        derived.preformatted.extend(qualified);
        derived
    }

    fn with_group(&self, name: &str) -> Self {
        let mut derived = self.clone();
        if !name.is_empty() {
            derived.prefix = format!("{}{}.", self.prefix, name);
        }
        derived
    }
}

/// Sink that drops every record
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    #[inline]
    fn enabled(&self, _level: Level) -> bool {
        false
    }

    #[inline]
    fn handle(&self, _cx: &TraceContext, _record: LogRecord) -> io::Result<()> {
        Ok(())
    }

    fn with_attrs(&self, _attrs: Vec<Attr>) -> Self {
        NoopSink
    }

    fn with_group(&self, _name: &str) -> Self {
        NoopSink
    }
}
