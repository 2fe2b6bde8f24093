//! SQL Correlation Comments
//!
//! Prepends a Datadog Database Monitoring comment to outgoing statements so
//! that query samples on the database side can be joined back to the trace
//! that issued them:
//!
//! ```text
//! /*dddbs='testdb',dde='staging',ddps='api',ddpv='1.0.0',traceparent='00-…-…-01'*/ SELECT 1
//! ```
//!
//! The statement body is never inspected. Annotating an already annotated
//! statement prepends a second block; call once per outgoing statement.

use std::borrow::Cow;

use super::identity::ServiceIdentity;
use crate::context::{TraceContext, TraceContextReader};

pub const DB_SERVICE_KEY: &str = "dddbs";
pub const ENVIRONMENT_KEY: &str = "dde";
pub const PROCESS_SERVICE_KEY: &str = "ddps";
pub const PROCESS_VERSION_KEY: &str = "ddpv";
pub const TRACEPARENT_KEY: &str = "traceparent";

/// Values embedded in one correlation comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationMetadata {
    pub db_service: String,
    pub environment: String,
    pub process_service: String,
    pub process_version: String,
    pub traceparent: String,
}

impl CorrelationMetadata {
    /// Metadata for the active trace, or `None` without one
    pub fn resolve(identity: &ServiceIdentity, cx: &TraceContext) -> Option<Self> {
        let traceparent = cx.traceparent()?;
        Some(CorrelationMetadata {
            db_service: identity.db_service.clone(),
            environment: identity.environment().to_string(),
            process_service: identity.service.clone(),
            process_version: identity.version.clone(),
            traceparent,
        })
    }

    /// Key/value pairs in wire order, empty values dropped
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (DB_SERVICE_KEY, self.db_service.as_str()),
            (ENVIRONMENT_KEY, self.environment.as_str()),
            (PROCESS_SERVICE_KEY, self.process_service.as_str()),
            (PROCESS_VERSION_KEY, self.process_version.as_str()),
            (TRACEPARENT_KEY, self.traceparent.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
    }

    /// `/*key='value',...*/`, or `None` when every value is empty
    pub fn to_comment(&self) -> Option<String> {
        let mut comment = String::from("/*");
        let mut any = false;
        for (key, value) in self.pairs() {
            if any {
                comment.push(',');
            }
            comment.push_str(key);
            comment.push_str("='");
            comment.push_str(&escape_value(value));
            comment.push('\'');
            any = true;
        }
        if !any {
            return None;
        }
        comment.push_str("*/");
        Some(comment)
    }
}

/// Escape single quotes so a value cannot close its quoted slot
///
/// Values come from configuration and trace ids, not from request input.
pub fn escape_value(value: &str) -> Cow<'_, str> {
    if value.contains('\'') {
        Cow::Owned(value.replace('\'', "\\'"))
    } else {
        Cow::Borrowed(value)
    }
}

/// Annotate `statement` for the trace in `cx`
///
/// Returns the statement unchanged (borrowed) without an active trace or
/// when there is nothing to embed.
pub fn annotate<'a>(statement: &'a str, cx: &TraceContext, identity: &ServiceIdentity) -> Cow<'a, str> {
    let Some(comment) = CorrelationMetadata::resolve(identity, cx).and_then(|m| m.to_comment())
    else {
        return Cow::Borrowed(statement);
    };

    let mut annotated = String::with_capacity(comment.len() + 1 + statement.len());
    annotated.push_str(&comment);
    annotated.push(' ');
    annotated.push_str(statement);
    Cow::Owned(annotated)
}

/// Annotator bound to one service identity
#[derive(Debug, Clone)]
pub struct SqlCommenter {
    identity: ServiceIdentity,
}

impl SqlCommenter {
    pub fn new(identity: ServiceIdentity) -> Self {
        SqlCommenter { identity }
    }

    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    pub fn annotate<'a>(&self, statement: &'a str, cx: &TraceContext) -> Cow<'a, str> {
        let annotated = annotate(statement, cx, &self.identity);
        if let Cow::Owned(_) = annotated {
            tracing::trace!(traceparent = %cx, "annotated sql statement");
        }
        annotated
    }

    /// Read the ambient context through `reader`, then annotate
    pub fn annotate_current<'a, R>(&self, statement: &'a str, reader: &R) -> Cow<'a, str>
    where
        R: TraceContextReader + ?Sized,
    {
        self.annotate(statement, &reader.current())
    }
}
