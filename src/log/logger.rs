//! Logger Front-End
//!
//! An explicitly constructed logger, cloned to call sites. There is no
//! process-wide default instance.

use std::io;
use std::panic::Location;

use super::record::{Level, LogRecord};
use super::sink::LogSink;
use crate::attr::Attr;
use crate::context::TraceContext;

/// Front-end over a `LogSink`
#[derive(Debug, Clone)]
pub struct Logger<S> {
    sink: S,
}

impl<S: LogSink> Logger<S> {
    pub fn new(sink: S) -> Self {
        Logger { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Logger whose records all carry `attrs`
    pub fn with<I: IntoIterator<Item = Attr>>(&self, attrs: I) -> Self {
        Logger {
            sink: self.sink.with_attrs(attrs.into_iter().collect()),
        }
    }

    /// Logger whose later attributes are nested under `name`
    pub fn with_group(&self, name: &str) -> Self {
        Logger {
            sink: self.sink.with_group(name),
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.sink.enabled(level)
    }

    /// Write a record and report sink failures. The record carries the
    /// caller's file and line.
    #[track_caller]
    pub fn try_log<I>(&self, cx: &TraceContext, level: Level, message: &str, attrs: I) -> io::Result<()>
    where
        I: IntoIterator<Item = Attr>,
    {
        if !self.sink.enabled(level) {
            return Ok(());
        }
        let mut record = LogRecord::new(level, message).with_source(Location::caller());
        record.add_attrs(attrs);
        self.sink.handle(cx, record)
    }

    /// Write a record; sink failures are reported through `tracing` and
    /// otherwise dropped
    #[track_caller]
    pub fn log<I>(&self, cx: &TraceContext, level: Level, message: &str, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        if let Err(e) = self.try_log(cx, level, message, attrs) {
            tracing::warn!(error = %e, "log sink write failed");
        }
    }

    #[track_caller]
    pub fn debug<I: IntoIterator<Item = Attr>>(&self, cx: &TraceContext, message: &str, attrs: I) {
        self.log(cx, Level::Debug, message, attrs)
    }

    #[track_caller]
    pub fn info<I: IntoIterator<Item = Attr>>(&self, cx: &TraceContext, message: &str, attrs: I) {
        self.log(cx, Level::Info, message, attrs)
    }

    #[track_caller]
    pub fn warn<I: IntoIterator<Item = Attr>>(&self, cx: &TraceContext, message: &str, attrs: I) {
        self.log(cx, Level::Warn, message, attrs)
    }

    #[track_caller]
    pub fn error<I: IntoIterator<Item = Attr>>(&self, cx: &TraceContext, message: &str, attrs: I) {
        self.log(cx, Level::Error, message, attrs)
    }
}
