//! SQL Correlation
//!
//! Embeds service identity and the W3C traceparent into outgoing SQL text.

pub mod comment;
pub mod identity;

pub use comment::{annotate, escape_value, CorrelationMetadata, SqlCommenter};
pub use identity::{resolve_environment, ServiceIdentity, DEFAULT_ENVIRONMENT};
